use leptos::*;

/// Five clickable stars. Without `on_change` the widget is read-only.
#[component]
pub fn StarRating(
    #[prop(into)] rating: MaybeSignal<u8>,
    #[prop(optional)] on_change: Option<Callback<u8>>,
) -> impl IntoView {
    let read_only = on_change.is_none();

    view! {
        <div class="star-rating" class:read-only=read_only>
            {(1..=5u8)
                .map(|value| {
                    let rating = rating.clone();
                    let on_change = on_change.clone();
                    view! {
                        <span
                            class="star"
                            class:filled=move || value <= rating.get()
                            on:click=move |_| {
                                if let Some(on_change) = on_change.as_ref() {
                                    on_change.call(value);
                                }
                            }
                        >
                            "★"
                        </span>
                    }
                })
                .collect_view()}
        </div>
    }
}
