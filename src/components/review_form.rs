use crate::app::PageState;
use crate::client;
use crate::components::star_rating::StarRating;
use crate::models::review::{Review, ReviewDraft};
use crate::validation::{self, Field, ValidationErrors};
use gloo_timers::callback::Timeout;
use leptos::ev::SubmitEvent;
use leptos::logging::error;
use leptos::*;

const SUCCESS_BANNER_MS: u32 = 3000;
const SUBMIT_FAILED: &str = "Failed to submit review. Please try again.";

fn field_error(errors: RwSignal<ValidationErrors>, field: Field) -> impl IntoView {
    move || {
        errors.with(|e| {
            e.get(field)
                .map(|message| view! { <p class="error-text">{message.to_string()}</p> })
        })
    }
}

/// Shows `message` in the success banner for `duration_ms`. The banner timer
/// lives in `timer`; replacing it drops, and so clears, any earlier one.
pub fn flash_success(
    success: RwSignal<Option<String>>,
    timer: StoredValue<Option<Timeout>>,
    message: &str,
    duration_ms: u32,
) {
    success.set(Some(message.to_string()));
    timer.set_value(Some(Timeout::new(duration_ms, move || success.set(None))));
}

/// Create/edit form. Form rules are checked before any request; a failed
/// request keeps the fields as typed.
#[component]
pub fn ReviewForm(state: RwSignal<PageState>, editing: RwSignal<Option<Review>>) -> impl IntoView {
    let username = create_rw_signal(String::new());
    let repository = create_rw_signal(String::new());
    let rating = create_rw_signal(0u8);
    let comment = create_rw_signal(String::new());
    let errors = create_rw_signal(ValidationErrors::default());
    let submit_error = create_rw_signal(None::<String>);
    let success = create_rw_signal(None::<String>);
    let banner_timer = store_value(None::<Timeout>);
    let submitting = create_rw_signal(false);

    let load_draft = move |draft: ReviewDraft| {
        username.set(draft.username);
        repository.set(draft.repository);
        rating.set(draft.rating);
        comment.set(draft.comment);
    };

    create_effect(move |_| {
        if let Some(review) = editing.get() {
            load_draft(ReviewDraft::from_review(&review));
        }
    });

    let reset = move || {
        load_draft(ReviewDraft::default());
        errors.set(ValidationErrors::default());
        submit_error.set(None);
        editing.set(None);
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();

        let draft = ReviewDraft {
            username: username.get_untracked(),
            repository: repository.get_untracked(),
            rating: rating.get_untracked(),
            comment: comment.get_untracked(),
        };
        let input = match validation::validate_draft(&draft) {
            Ok(input) => input,
            Err(field_errors) => {
                errors.set(field_errors);
                return;
            }
        };
        errors.set(ValidationErrors::default());
        submit_error.set(None);
        submitting.set(true);

        let target = editing.get_untracked();
        spawn_local(async move {
            let outcome = match target {
                Some(review) => client::update_review(&review.id, &input)
                    .await
                    .map(|saved| {
                        state.update(|s| {
                            s.apply_updated(saved);
                        });
                        "Review updated successfully!"
                    }),
                None => {
                    let placeholder = validation::validate_new(&input)
                        .ok()
                        .and_then(|new_review| state.try_update(|s| s.begin_create(&new_review)));
                    match client::create_review(&input).await {
                        Ok(saved) => {
                            state.update(|s| s.apply_created(saved, placeholder.as_deref()));
                            Ok("Review submitted successfully!")
                        }
                        Err(err) => {
                            if let Some(local_id) = placeholder.as_deref() {
                                state.update(|s| s.create_failed(local_id));
                            }
                            Err(err)
                        }
                    }
                }
            };
            submitting.set(false);

            match outcome {
                Ok(message) => {
                    flash_success(success, banner_timer, message, SUCCESS_BANNER_MS);
                    reset();
                }
                Err(err) => {
                    error!("[FORM] Error submitting review: {}", err);
                    submit_error.set(Some(SUBMIT_FAILED.to_string()));
                }
            }
        });
    };

    view! {
        <form class="form-container" on:submit=on_submit>
            {move || success.get().map(|message| view! { <div class="success-banner">{message}</div> })}
            <div>
                <input
                    type="text"
                    class="input-field"
                    placeholder="Username"
                    prop:value=move || username.get()
                    on:input=move |ev| username.set(event_target_value(&ev))
                />
                {field_error(errors, Field::Username)}
            </div>
            <div>
                <input
                    type="text"
                    class="input-field"
                    placeholder="Repository (e.g., owner/repo)"
                    prop:value=move || repository.get()
                    on:input=move |ev| repository.set(event_target_value(&ev))
                />
                {field_error(errors, Field::Repository)}
            </div>
            <div>
                <label class="rating-label">"Rating:"</label>
                <StarRating rating=rating on_change=Callback::new(move |value| rating.set(value))/>
                {field_error(errors, Field::Rating)}
            </div>
            <div>
                <textarea
                    class="textarea-field"
                    placeholder="Comment"
                    rows="4"
                    prop:value=move || comment.get()
                    on:input=move |ev| comment.set(event_target_value(&ev))
                ></textarea>
                {field_error(errors, Field::Comment)}
            </div>
            {move || submit_error.get().map(|message| view! { <p class="error-text">{message}</p> })}
            <button type="submit" class="submit-button" disabled=move || submitting.get()>
                {move || {
                    if submitting.get() {
                        "Submitting..."
                    } else if editing.with(Option::is_some) {
                        "Update Review"
                    } else {
                        "Submit Review"
                    }
                }}
            </button>
            <Show when=move || editing.with(Option::is_some)>
                <button type="button" class="cancel-button" on:click=move |_| reset()>
                    "Cancel"
                </button>
            </Show>
        </form>
    }
}
