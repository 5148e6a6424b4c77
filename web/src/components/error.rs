use leptos::prelude::*;
use thaw::{MessageBar, MessageBarIntent};

#[component]
pub fn ErrorView(message: Option<String>) -> impl IntoView {
    view! {
        <div class="error-container">
            <MessageBar intent=MessageBarIntent::Error>
                {format!(
                    "Error: {}",
                    message.unwrap_or_else(|| "Unable to load tracking details.".to_string())
                )}
            </MessageBar>
        </div>
    }
}
