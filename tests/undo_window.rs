#![cfg(feature = "ssr")]
//! Drives the client delete state machine against a real review service,
//! with a tokio task standing in for the browser timer.

use codereview::db::Database;
use codereview::models::review::ReviewInput;
use codereview::service::ReviewService;
use codereview::state::{DeleteTicket, ReviewsState, UNDO_WINDOW};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Aborts the scheduled commit when dropped, like clearing a browser timeout.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn schedule(ticket: DeleteTicket, fired: mpsc::UnboundedSender<DeleteTicket>) -> AbortOnDrop {
    AbortOnDrop(tokio::spawn(async move {
        sleep(UNDO_WINDOW).await;
        let _ = fired.send(ticket);
    }))
}

async fn seeded() -> (ReviewService, ReviewsState<AbortOnDrop>) {
    let db = Database::new(":memory:").unwrap();
    db.create_schema().await.unwrap();
    let service = ReviewService::new(db);
    for (username, rating) in [("alice", 4), ("bob", 2)] {
        service
            .create(&ReviewInput {
                username: Some(username.into()),
                repository: Some("owner/repo".into()),
                rating: Some(rating),
                comment: None,
            })
            .await
            .unwrap();
    }
    let mut state = ReviewsState::new();
    state.apply_loaded(service.list_all().await.unwrap());
    (service, state)
}

#[tokio::test(start_paused = true)]
async fn undo_inside_window_keeps_server_count() {
    let (service, mut state) = seeded().await;
    let id = state.reviews()[0].id.clone();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.stage_delete(&id, |ticket| schedule(ticket, tx.clone())).unwrap();
    drop(tx);
    assert_eq!(state.visible().len(), 1);

    sleep(Duration::from_millis(1000)).await;
    let restored = state.undo_delete().unwrap();
    assert_eq!(restored.id, id);

    // The timer task was aborted, so its sender is gone without firing.
    sleep(UNDO_WINDOW * 2).await;
    assert_eq!(rx.recv().await, None);
    assert_eq!(state.visible().len(), 2);
    assert_eq!(service.list_all().await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn elapsed_window_commits_delete() {
    let (service, mut state) = seeded().await;
    let id = state.reviews()[1].id.clone();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.stage_delete(&id, |ticket| schedule(ticket, tx)).unwrap();

    sleep(UNDO_WINDOW - Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(service.list_all().await.unwrap().len(), 2);

    let ticket = rx.recv().await.unwrap();
    let review = state.commit_delete(ticket).unwrap();
    assert_eq!(review.id, id);
    assert!(state.undo_delete().is_none());

    service.delete(&review.id).await.unwrap();
    state.delete_committed(ticket);

    assert!(state.recently_deleted().is_none());
    let remaining = service.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining.iter().all(|r| r.id != id));
}

#[tokio::test(start_paused = true)]
async fn failed_commit_is_left_unreconciled() {
    let (service, mut state) = seeded().await;
    let id = state.reviews()[0].id.clone();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.stage_delete(&id, |ticket| schedule(ticket, tx)).unwrap();

    // Someone else removes it first, so our commit gets a 404.
    service.delete(&id).await.unwrap();

    let ticket = rx.recv().await.unwrap();
    let review = state.commit_delete(ticket).unwrap();
    let err = service.delete(&review.id).await.unwrap_err();
    state.delete_failed(ticket, &err.to_string());

    assert!(state.recently_deleted().is_some());
    assert!(!state.can_undo());
    assert_eq!(state.visible().len(), 1);
}
