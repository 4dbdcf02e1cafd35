/// Card list of reviews, with the active search text highlighted.
use crate::components::star_rating::StarRating;
use crate::models::review::Review;
use crate::state::{highlight_segments, is_placeholder};
use leptos::*;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn highlighted(text: &str, filter: &str) -> View {
    highlight_segments(text, filter)
        .into_iter()
        .map(|(part, hit)| {
            if hit {
                view! { <mark>{part}</mark> }.into_view()
            } else {
                part.into_view()
            }
        })
        .collect_view()
}

#[component]
pub fn ReviewsList(
    #[prop(into)] reviews: Signal<Vec<Review>>,
    #[prop(into)] filter: Signal<String>,
    on_edit: Callback<Review>,
    on_delete: Callback<String>,
) -> impl IntoView {
    view! {
        <Show
            when=move || reviews.with(|r| !r.is_empty())
            fallback=|| view! { <p class="empty">"No reviews yet."</p> }
        >
            <div class="review-grid">
                <For
                    each=move || reviews.get()
                    key=|review| (review.id.clone(), review.updated_at)
                    children=move |review| {
                        view! {
                            <ReviewCard
                                review=review
                                filter=filter
                                on_edit=on_edit
                                on_delete=on_delete
                            />
                        }
                    }
                />
            </div>
        </Show>
    }
}

#[component]
fn ReviewCard(
    review: Review,
    filter: Signal<String>,
    on_edit: Callback<Review>,
    on_delete: Callback<String>,
) -> impl IntoView {
    // Placeholders have no server id yet, so they cannot be edited or deleted.
    let pending = is_placeholder(&review.id);
    let username = review.username.clone();
    let repository = review.repository.clone();
    let id = review.id.clone();
    let created = review.created_at.format(DATE_FORMAT).to_string();
    let updated = review
        .was_edited()
        .then(|| review.updated_at.format(DATE_FORMAT).to_string());
    let comment = review
        .comment
        .clone()
        .unwrap_or_else(|| "No comment".to_string());
    let rating = review.rating;

    view! {
        <div class="card" class:pending=pending>
            <div class="review-header">
                <div>
                    <strong class="highlight">
                        {move || highlighted(&username, &filter.get())}
                    </strong>
                    " reviewed "
                    <em>{move || highlighted(&repository, &filter.get())}</em>
                    <StarRating rating=rating/>
                </div>
                <div class="actions">
                    <button
                        class="button edit-button"
                        disabled=pending
                        on:click=move |_| on_edit.call(review.clone())
                    >
                        "Edit"
                    </button>
                    <button
                        class="button delete-button"
                        disabled=pending
                        on:click=move |_| on_delete.call(id.clone())
                    >
                        "Delete"
                    </button>
                </div>
            </div>
            <div class="review-comment">{comment}</div>
            <div class="review-dates">
                "Created: " {created}
                {updated.map(|at| view! { <span>" | Updated: " {at}</span> })}
            </div>
        </div>
    }
}
