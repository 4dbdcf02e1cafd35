use leptos::*;

/// Offered while a delete is still inside its undo window.
#[component]
pub fn UndoToast(#[prop(into)] visible: Signal<bool>, on_undo: Callback<()>) -> impl IntoView {
    view! {
        <Show when=move || visible.get()>
            <div class="undo-popup">
                <span>"Review deleted"</span>
                <button class="undo-button" on:click=move |_| on_undo.call(())>
                    "Undo"
                </button>
            </div>
        </Show>
    }
}
