/// Main application entry point for the code review tool.
/// Owns the page state and wires the form, list and undo toast to it.
use crate::client;
use crate::components::{
    review_form::ReviewForm, reviews_list::ReviewsList, skeleton_loader::SkeletonLoader,
    undo_toast::UndoToast,
};
use crate::models::review::{Review, SortOrder};
use crate::state::{DeleteTicket, ReviewsState, UNDO_WINDOW};
use gloo_timers::callback::Timeout;
use leptos::logging::{error, log};
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

/// Page state in the browser: the undo timer is a JS timeout, cleared on drop.
pub type PageState = ReviewsState<Timeout>;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/codereview.css"/>
        <Title text="Code Review App"/>
        <Router>
            <main>
                <Routes>
                    <Route path="" view=ReviewsPage/>
                </Routes>
            </main>
        </Router>
    }
}

fn undo_window_ms() -> u32 {
    u32::try_from(UNDO_WINDOW.as_millis()).unwrap_or(u32::MAX)
}

// Fired by the undo timer once the window has passed.
fn commit_staged(state: RwSignal<PageState>, ticket: DeleteTicket) {
    let Some(review) = state.try_update(|s| s.commit_delete(ticket)).flatten() else {
        return;
    };
    spawn_local(async move {
        match client::delete_review(&review.id).await {
            Ok(()) => state.update(|s| s.delete_committed(ticket)),
            Err(err) => state.update(|s| s.delete_failed(ticket, &err.to_string())),
        }
    });
}

// A delete pushed out of the undo slot by a newer one goes out immediately.
fn commit_flushed(review: Review) {
    spawn_local(async move {
        if let Err(err) = client::delete_review(&review.id).await {
            error!("[APP] Failed to delete review {}: {}", review.id, err);
        }
    });
}

#[component]
fn ReviewsPage() -> impl IntoView {
    let state = create_rw_signal(PageState::new());
    let editing = create_rw_signal(None::<Review>);
    let loading = create_rw_signal(true);
    let dark_mode = create_rw_signal(false);

    create_effect(move |_| {
        spawn_local(async move {
            match client::fetch_reviews().await {
                Ok(reviews) => state.update(|s| s.apply_loaded(reviews)),
                Err(err) => error!("[APP] Fetch error: {}", err),
            }
            loading.set(false);
        });
    });

    let visible = create_memo(move |_| state.with(|s| s.visible()));
    let filter = Signal::derive(move || state.with(|s| s.filter().to_string()));
    let can_undo = Signal::derive(move || state.with(|s| s.can_undo()));

    let on_delete = Callback::new(move |id: String| {
        let staged = state
            .try_update(|s| {
                s.stage_delete(&id, |ticket| {
                    Timeout::new(undo_window_ms(), move || commit_staged(state, ticket))
                })
            })
            .flatten();
        match staged {
            Some(staged) => {
                if let Some((_, review)) = staged.flushed {
                    commit_flushed(review);
                }
            }
            None => log!("[APP] Ignoring delete of unknown or unsaved review {}", id),
        }
    });

    let on_undo = Callback::new(move |()| {
        state.update(|s| {
            s.undo_delete();
        });
    });

    let on_edit = Callback::new(move |review: Review| editing.set(Some(review)));

    view! {
        <div class="container" class:dark-mode=move || dark_mode.get()>
            <div class="toolbar">
                <button class="mode-toggle" on:click=move |_| dark_mode.update(|d| *d = !*d)>
                    {move || if dark_mode.get() { "Light Mode" } else { "Dark Mode" }}
                </button>
            </div>
            <h1 class="title">"Code Review App"</h1>
            <ReviewForm state=state editing=editing/>
            <div class="controls">
                <input
                    type="text"
                    class="search"
                    placeholder="Search by user or repo"
                    prop:value=move || filter.get()
                    on:input=move |ev| state.update(|s| s.set_filter(event_target_value(&ev)))
                />
                <select
                    class="sort"
                    prop:value=move || state.with(|s| s.sort().to_string())
                    on:change=move |ev| {
                        match event_target_value(&ev).parse::<SortOrder>() {
                            Ok(order) => state.update(|s| s.set_sort(order)),
                            Err(err) => error!("[APP] {}", err),
                        }
                    }
                >
                    {SortOrder::ALL
                        .into_iter()
                        .map(|order| view! { <option value=order.as_str()>{order.label()}</option> })
                        .collect_view()}
                </select>
            </div>
            <Show
                when=move || !loading.get()
                fallback=|| view! { <SkeletonLoader/> }
            >
                <ReviewsList
                    reviews=visible
                    filter=filter
                    on_edit=on_edit
                    on_delete=on_delete
                />
            </Show>
            <UndoToast visible=can_undo on_undo=on_undo/>
        </div>
    }
}
