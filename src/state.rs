//! Client-side projection of the review collection.
//!
//! [`ReviewsState`] owns the authoritative list as last seen by the browser,
//! the active filter and sort key, and the single undo slot for deletes. It
//! only changes through its action methods; the view is derived on demand.
//!
//! A delete moves through `Staged -> {undone, Committing}` and then
//! `Committing -> {cleared, Failed}`. The undo timer is whatever handle type
//! `H` the caller supplies; dropping it must cancel the scheduled commit.
use crate::models::review::{NewReview, Review, SortOrder};
use chrono::Utc;
use leptos::logging::{error, log};
use std::time::Duration;
use uuid::Uuid;

/// How long a staged delete can still be undone.
pub const UNDO_WINDOW: Duration = Duration::from_millis(5000);

const PLACEHOLDER_PREFIX: &str = "local-";

/// Identifies one staged delete, so a timer that fires late cannot commit a
/// different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeleteTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    /// Removed locally, undo still possible.
    Staged,
    /// Request sent; cannot be recalled.
    Committing,
    /// Server refused or was unreachable. Only logged.
    Failed,
}

#[derive(Debug)]
pub struct RecentlyDeleted<H> {
    pub review: Review,
    pub phase: DeletePhase,
    ticket: DeleteTicket,
    timer: Option<H>,
}

/// Result of staging a delete.
#[derive(Debug)]
pub struct StagedDelete {
    pub ticket: DeleteTicket,
    /// An earlier staged delete that was pushed out of the undo slot. Its
    /// timer is already cancelled; the caller must commit it right away.
    pub flushed: Option<(DeleteTicket, Review)>,
}

#[derive(Debug)]
pub struct ReviewsState<H> {
    reviews: Vec<Review>,
    filter: String,
    sort: SortOrder,
    recently_deleted: Option<RecentlyDeleted<H>>,
    next_ticket: u64,
}

impl<H> Default for ReviewsState<H> {
    fn default() -> Self {
        ReviewsState {
            reviews: Vec::new(),
            filter: String::new(),
            sort: SortOrder::default(),
            recently_deleted: None,
            next_ticket: 0,
        }
    }
}

impl<H> ReviewsState<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn recently_deleted(&self) -> Option<&RecentlyDeleted<H>> {
        self.recently_deleted.as_ref()
    }

    /// True while the undo toast should be offered.
    pub fn can_undo(&self) -> bool {
        matches!(
            self.recently_deleted,
            Some(RecentlyDeleted {
                phase: DeletePhase::Staged,
                ..
            })
        )
    }

    /// Filtered and sorted view of the current list.
    pub fn visible(&self) -> Vec<Review> {
        let mut view = filter_reviews(&self.reviews, &self.filter);
        sort_reviews(&mut view, self.sort);
        view
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub fn apply_loaded(&mut self, mut reviews: Vec<Review>) {
        sort_reviews(&mut reviews, SortOrder::Newest);
        log!("[STATE] Loaded {} reviews", reviews.len());
        self.reviews = reviews;
    }

    /// Shows `review` immediately under a local id until the server answers.
    /// Returns the placeholder id to hand back to `apply_created` or
    /// `create_failed`.
    pub fn begin_create(&mut self, review: &NewReview) -> String {
        let now = Utc::now();
        let placeholder = Review {
            id: format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4()),
            username: review.username.clone(),
            repository: review.repository.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: now,
            updated_at: now,
            upvotes: 0,
            downvotes: 0,
        };
        let id = placeholder.id.clone();
        self.reviews.insert(0, placeholder);
        id
    }

    /// Replaces the placeholder (if any) with the server's record and keeps
    /// the list newest-first.
    pub fn apply_created(&mut self, review: Review, placeholder: Option<&str>) {
        if let Some(local_id) = placeholder {
            self.reviews.retain(|r| r.id != local_id);
        }
        self.reviews.retain(|r| r.id != review.id);
        self.reviews.insert(0, review);
        sort_reviews(&mut self.reviews, SortOrder::Newest);
    }

    pub fn create_failed(&mut self, placeholder: &str) {
        self.reviews.retain(|r| r.id != placeholder);
    }

    /// Replaces the entry with the same id in place. Returns `false` when the
    /// review is not in the list (e.g. it was deleted meanwhile).
    pub fn apply_updated(&mut self, review: Review) -> bool {
        match self.reviews.iter_mut().find(|r| r.id == review.id) {
            Some(slot) => {
                *slot = review;
                true
            }
            None => false,
        }
    }

    /// Removes the review from the list and parks it in the undo slot.
    /// `schedule` is called with the new ticket and must return the handle of
    /// a timer that calls `commit_delete` with that ticket after
    /// [`UNDO_WINDOW`].
    pub fn stage_delete(
        &mut self,
        id: &str,
        schedule: impl FnOnce(DeleteTicket) -> H,
    ) -> Option<StagedDelete> {
        if is_placeholder(id) {
            return None;
        }
        let index = self.reviews.iter().position(|r| r.id == id)?;
        let review = self.reviews.remove(index);

        let flushed = match self.recently_deleted.take() {
            Some(previous) if previous.phase == DeletePhase::Staged => {
                log!(
                    "[STATE] Flushing staged delete of {} to stage {}",
                    previous.review.id,
                    id
                );
                Some((previous.ticket, previous.review))
            }
            _ => None,
        };

        let ticket = DeleteTicket(self.next_ticket);
        self.next_ticket += 1;
        let timer = schedule(ticket);
        self.recently_deleted = Some(RecentlyDeleted {
            review,
            phase: DeletePhase::Staged,
            ticket,
            timer: Some(timer),
        });
        log!("[STATE] Staged delete of {}", id);

        Some(StagedDelete { ticket, flushed })
    }

    /// Puts the staged review back and cancels its timer. No-op once the
    /// delete request has been sent.
    pub fn undo_delete(&mut self) -> Option<Review> {
        if !self.can_undo() {
            return None;
        }
        let staged = self.recently_deleted.take()?;
        drop(staged.timer);
        log!("[STATE] Undid delete of {}", staged.review.id);
        self.reviews.insert(0, staged.review.clone());
        Some(staged.review)
    }

    /// Called when the undo timer fires. Returns the review whose delete
    /// request must now be sent, or `None` if the ticket is stale.
    pub fn commit_delete(&mut self, ticket: DeleteTicket) -> Option<Review> {
        match &mut self.recently_deleted {
            Some(pending) if pending.ticket == ticket && pending.phase == DeletePhase::Staged => {
                // The timer handle stays in place: this may run inside its own
                // callback.
                pending.phase = DeletePhase::Committing;
                log!("[STATE] Committing delete of {}", pending.review.id);
                Some(pending.review.clone())
            }
            _ => None,
        }
    }

    pub fn delete_committed(&mut self, ticket: DeleteTicket) {
        if self.slot_matches(ticket) {
            self.recently_deleted = None;
        }
    }

    /// Records a failed commit. The review stays out of the list and in the
    /// slot; nothing is retried.
    pub fn delete_failed(&mut self, ticket: DeleteTicket, reason: &str) {
        if let Some(pending) = self.recently_deleted.as_mut() {
            if pending.ticket == ticket {
                error!(
                    "[STATE] Failed to delete review {}: {}",
                    pending.review.id, reason
                );
                pending.phase = DeletePhase::Failed;
                pending.timer = None;
            }
        }
    }

    fn slot_matches(&self, ticket: DeleteTicket) -> bool {
        self.recently_deleted
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket)
    }
}

pub fn is_placeholder(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

/// Reviews whose username or repository contains `filter`, ignoring case and
/// surrounding whitespace. Input order is preserved.
pub fn filter_reviews(reviews: &[Review], filter: &str) -> Vec<Review> {
    let needle = filter.trim().to_lowercase();
    reviews
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.username.to_lowercase().contains(&needle)
                || r.repository.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Stable sort, so ties keep their insertion order.
pub fn sort_reviews(reviews: &mut [Review], order: SortOrder) {
    match order {
        SortOrder::Newest => reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Highest => reviews.sort_by(|a, b| b.rating.cmp(&a.rating)),
        SortOrder::Lowest => reviews.sort_by(|a, b| a.rating.cmp(&b.rating)),
    }
}

/// Splits `text` into runs, flagging the ones that match `filter`
/// case-insensitively.
pub fn highlight_segments(text: &str, filter: &str) -> Vec<(String, bool)> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return vec![(text.to_string(), false)];
    }

    // Full lowercase form of each char, with the source char behind every
    // lowered byte so multi-char forms like `İ` map back to the text.
    let chars: Vec<char> = text.chars().collect();
    let mut lowered = String::new();
    let mut origin = Vec::new();
    for (idx, c) in chars.iter().enumerate() {
        for lower in c.to_lowercase() {
            lowered.push(lower);
            origin.extend(std::iter::repeat(idx).take(lower.len_utf8()));
        }
    }

    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut next = 0;
    for (start, matched) in lowered.match_indices(&needle) {
        let first = origin[start];
        let last = origin[start + matched.len() - 1];
        // A match that begins inside an already consumed char is skipped.
        if first < next {
            continue;
        }
        plain.extend(&chars[next..first]);
        if !plain.is_empty() {
            segments.push((std::mem::take(&mut plain), false));
        }
        segments.push((chars[first..=last].iter().collect(), true));
        next = last + 1;
    }
    plain.extend(&chars[next..]);
    if !plain.is_empty() {
        segments.push((plain, false));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration as ChronoDuration};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Timer stand-in that records whether it was cancelled.
    struct FakeTimer(Rc<Cell<bool>>);

    impl Drop for FakeTimer {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    fn review(id: &str, username: &str, rating: u8, age_secs: i64) -> Review {
        let base = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let created = base - ChronoDuration::seconds(age_secs);
        Review {
            id: id.into(),
            username: username.into(),
            repository: "owner/repo".into(),
            rating,
            comment: None,
            created_at: created,
            updated_at: created,
            upvotes: 0,
            downvotes: 0,
        }
    }

    fn ids(reviews: &[Review]) -> Vec<&str> {
        reviews.iter().map(|r| r.id.as_str()).collect()
    }

    fn loaded() -> ReviewsState<FakeTimer> {
        let mut state = ReviewsState::new();
        state.apply_loaded(vec![
            review("a", "alice", 2, 30),
            review("b", "bob", 5, 20),
            review("c", "albert", 3, 10),
        ]);
        state
    }

    #[test]
    fn load_sorts_newest_first() {
        let state = loaded();
        assert_eq!(ids(state.reviews()), ["c", "b", "a"]);
    }

    #[test]
    fn filter_matches_username_or_repository_case_insensitively() {
        let reviews = vec![
            review("1", "alice", 1, 3),
            review("2", "bob", 1, 2),
            review("3", "albert", 1, 1),
        ];
        let names: Vec<_> = filter_reviews(&reviews, " AL ")
            .into_iter()
            .map(|r| r.username)
            .collect();
        assert_eq!(names, ["alice", "albert"]);
        assert_eq!(filter_reviews(&reviews, "OWNER/").len(), 3);
        assert_eq!(filter_reviews(&reviews, "").len(), 3);
    }

    #[test]
    fn visible_view_combines_filter_and_sort() {
        let mut state = loaded();
        state.set_filter("al");
        state.set_sort(SortOrder::Oldest);
        assert_eq!(ids(&state.visible()), ["a", "c"]);
        state.set_sort(SortOrder::Highest);
        assert_eq!(ids(&state.visible()), ["c", "a"]);
    }

    #[test]
    fn rating_sorts_are_stable() {
        let mut reviews = vec![
            review("x", "u", 2, 0),
            review("y", "u", 5, 0),
            review("z", "u", 3, 0),
            review("w", "u", 5, 0),
        ];
        sort_reviews(&mut reviews, SortOrder::Highest);
        assert_eq!(ids(&reviews), ["y", "w", "z", "x"]);
        sort_reviews(&mut reviews, SortOrder::Lowest);
        assert_eq!(ids(&reviews), ["x", "z", "y", "w"]);
    }

    #[test]
    fn created_review_replaces_placeholder_at_head() {
        let mut state = loaded();
        let local = state.begin_create(&NewReview {
            username: "dora".into(),
            repository: "dora/tools".into(),
            rating: 4,
            comment: None,
        });
        assert!(is_placeholder(&local));
        assert_eq!(state.reviews()[0].id, local);

        let mut saved = review("d", "dora", 4, 0);
        saved.created_at = Utc::now();
        state.apply_created(saved, Some(&local));
        assert_eq!(ids(state.reviews()), ["d", "c", "b", "a"]);
    }

    #[test]
    fn failed_create_rolls_back_placeholder() {
        let mut state = loaded();
        let local = state.begin_create(&NewReview {
            username: "dora".into(),
            repository: "dora/tools".into(),
            rating: 4,
            comment: None,
        });
        state.create_failed(&local);
        assert_eq!(ids(state.reviews()), ["c", "b", "a"]);
    }

    #[test]
    fn update_replaces_matching_entry_in_place() {
        let mut state = loaded();
        let mut edited = review("b", "bob", 1, 20);
        edited.comment = Some("Needs more tests".into());
        assert!(state.apply_updated(edited.clone()));
        assert_eq!(ids(state.reviews()), ["c", "b", "a"]);
        assert_eq!(state.reviews()[1], edited);
        assert!(!state.apply_updated(review("zz", "nobody", 1, 0)));
    }

    #[test]
    fn undo_restores_review_and_cancels_timer() {
        let mut state = loaded();
        let cancelled = Rc::new(Cell::new(false));
        let flag = cancelled.clone();
        let staged = state.stage_delete("b", |_| FakeTimer(flag)).unwrap();
        assert!(staged.flushed.is_none());
        assert_eq!(ids(state.reviews()), ["c", "a"]);
        assert!(state.can_undo());
        assert!(!cancelled.get());

        let restored = state.undo_delete().unwrap();
        assert_eq!(restored.id, "b");
        assert!(cancelled.get());
        assert!(state.recently_deleted().is_none());
        assert_eq!(state.reviews().len(), 3);

        // A timer that fires anyway must not commit.
        assert!(state.commit_delete(staged.ticket).is_none());
    }

    #[test]
    fn commit_then_success_clears_slot() {
        let mut state = loaded();
        let staged = state
            .stage_delete("a", |_| FakeTimer(Rc::new(Cell::new(false))))
            .unwrap();
        let to_delete = state.commit_delete(staged.ticket).unwrap();
        assert_eq!(to_delete.id, "a");
        assert!(!state.can_undo());
        assert!(state.undo_delete().is_none());
        assert!(state.commit_delete(staged.ticket).is_none());

        state.delete_committed(staged.ticket);
        assert!(state.recently_deleted().is_none());
        assert_eq!(ids(state.reviews()), ["c", "b"]);
    }

    #[test]
    fn failed_commit_keeps_slot_without_restoring() {
        let mut state = loaded();
        let staged = state
            .stage_delete("a", |_| FakeTimer(Rc::new(Cell::new(false))))
            .unwrap();
        state.commit_delete(staged.ticket).unwrap();
        state.delete_failed(staged.ticket, "500 Internal Server Error");

        let slot = state.recently_deleted().unwrap();
        assert_eq!(slot.phase, DeletePhase::Failed);
        assert_eq!(slot.review.id, "a");
        assert!(!state.can_undo());
        assert_eq!(ids(state.reviews()), ["c", "b"]);
    }

    #[test]
    fn second_stage_flushes_the_first() {
        let mut state = loaded();
        let first_cancelled = Rc::new(Cell::new(false));
        let flag = first_cancelled.clone();
        let first = state.stage_delete("a", |_| FakeTimer(flag)).unwrap();
        let second = state
            .stage_delete("b", |_| FakeTimer(Rc::new(Cell::new(false))))
            .unwrap();

        let (ticket, flushed) = second.flushed.unwrap();
        assert_eq!(ticket, first.ticket);
        assert_eq!(flushed.id, "a");
        assert!(first_cancelled.get());
        assert_ne!(first.ticket, second.ticket);
        assert!(state.commit_delete(first.ticket).is_none());
        assert_eq!(state.recently_deleted().unwrap().review.id, "b");
        assert_eq!(ids(state.reviews()), ["c"]);
    }

    #[test]
    fn placeholders_and_unknown_ids_cannot_be_staged() {
        let mut state = loaded();
        let local = state.begin_create(&NewReview {
            username: "dora".into(),
            repository: "dora/tools".into(),
            rating: 4,
            comment: None,
        });
        assert!(state
            .stage_delete(&local, |_| FakeTimer(Rc::new(Cell::new(false))))
            .is_none());
        assert!(state
            .stage_delete("missing", |_| FakeTimer(Rc::new(Cell::new(false))))
            .is_none());
        assert!(state.recently_deleted().is_none());
    }

    #[test]
    fn highlight_splits_matches() {
        assert_eq!(
            highlight_segments("Alice/alpha", "al"),
            vec![
                ("Al".to_string(), true),
                ("ice/".to_string(), false),
                ("al".to_string(), true),
                ("pha".to_string(), false),
            ]
        );
        assert_eq!(
            highlight_segments("bob", ""),
            vec![("bob".to_string(), false)]
        );
    }

    #[test]
    fn highlight_agrees_with_filter_on_multi_char_lowercase() {
        let mut istanbul = review("a", "İstanbul", 4, 0);
        istanbul.repository = "city/guide".into();
        let needle = "i\u{307}stan";

        assert_eq!(ids(&filter_reviews(&[istanbul.clone()], needle)), vec!["a"]);
        assert_eq!(
            highlight_segments(&istanbul.username, needle),
            vec![("İstan".to_string(), true), ("bul".to_string(), false)]
        );
        assert_eq!(
            highlight_segments(&istanbul.username, "STAN"),
            vec![
                ("İ".to_string(), false),
                ("stan".to_string(), true),
                ("bul".to_string(), false),
            ]
        );
    }
}
