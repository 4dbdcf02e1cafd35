#![cfg(target_arch = "wasm32")]
// Run with: wasm-pack test --headless --firefox --no-default-features --features wasm-test
use codereview::components::review_form::flash_success;
use gloo_timers::callback::Timeout;
use gloo_timers::future::sleep;
use leptos::*;
use std::time::Duration;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn second_submit_keeps_its_banner_for_the_full_duration() {
    let runtime = create_runtime();
    let success = create_rw_signal(None::<String>);
    let timer = store_value(None::<Timeout>);

    flash_success(success, timer, "Review submitted successfully!", 50);
    sleep(Duration::from_millis(30)).await;
    flash_success(success, timer, "Review updated successfully!", 100);

    // Past the first banner's deadline; its timer must not clear the second.
    sleep(Duration::from_millis(40)).await;
    assert_eq!(
        success.get_untracked().as_deref(),
        Some("Review updated successfully!")
    );

    sleep(Duration::from_millis(100)).await;
    assert_eq!(success.get_untracked(), None);

    runtime.dispose();
}
