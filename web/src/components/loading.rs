use leptos::prelude::*;
use thaw::{Spinner, SpinnerSize};

/// Placeholder shown while the tracking data is on its way.
#[component]
pub fn LoadingView(message: Option<String>) -> impl IntoView {
    view! {
        <div class="loading-container">
            <div class="loading-skeleton">
                <div class="skeleton-map"></div>
                <div class="skeleton-line"></div>
                <div class="skeleton-line short"></div>
            </div>
            <Spinner size=SpinnerSize::Large />
            <p class="loading-message">
                {message.unwrap_or_else(|| "Loading tracking details...".to_string())}
            </p>
        </div>
    }
}
