use leptos::*;

#[component]
pub fn SkeletonLoader() -> impl IntoView {
    view! {
        <div class="skeleton-list">
            {(0..3)
                .map(|_| {
                    view! {
                        <div class="skeleton-card">
                            <div class="skeleton-line short"></div>
                            <div class="skeleton-line medium"></div>
                            <div class="skeleton-line"></div>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}
