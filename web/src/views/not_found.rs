use leptos::prelude::*;

/// Shown for any path other than the tracking page.
#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="not-found">
            <div class="not-found-card">
                <div class="not-found-code">"404"</div>
                <h1>"Page Not Found"</h1>
                <p>
                    "Tracking links look like /tracking?areaId=...&driverId=...&vehicleId=... "
                    "Ask the dispatcher to share the link again if this one is broken."
                </p>
                <button
                    class="not-found-back"
                    on:click=move |_| {
                        if let Some(window) = web_sys::window() {
                            if let Ok(history) = window.history() {
                                let _ = history.back();
                            }
                        }
                    }
                >
                    "Go Back"
                </button>
            </div>
        </div>
    }
}
