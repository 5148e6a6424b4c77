use leptos::prelude::*;
use shared_types::{Area, Checkpoint, DispatchLog, DispatchStatus, Driver};

use crate::components::TrackingProgressBar;

#[component]
pub fn TrackingSidebar(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] area: Signal<Option<Area>>,
    #[prop(into)] driver: Signal<Option<Driver>>,
    #[prop(into)] checkpoints: Signal<Vec<Checkpoint>>,
    #[prop(into)] dispatches: Signal<DispatchLog>,
    vehicle_id: Option<String>,
) -> impl IntoView {
    let area_name = move || area.with(|a| a.as_ref().map(|a| a.name.clone()).unwrap_or_default());
    let driver_name = move || driver.with(|d| d.as_ref().map(|d| d.name.clone()).unwrap_or_default());
    let driver_phone = move || driver.with(|d| d.as_ref().map(Driver::phone_display).unwrap_or_default());
    let vehicle = vehicle_id.unwrap_or_else(|| "-".to_string());

    view! {
        <aside class="sidebar" class:open=move || open.get()>
            <h2>"Details"</h2>
            <p>"Area Name: " {area_name}</p>
            <p>"Driver Name: " {driver_name}</p>
            <p>"Driver Phone: " {driver_phone}</p>
            <p>"Vehicle No: " {vehicle}</p>
            <hr />
            <div>
                <h3>"Route Progress"</h3>
                <TrackingProgressBar points=checkpoints circle_size=40.0 />
            </div>
            <Show when=move || dispatches.with(|log| !log.is_empty())>
                <hr />
                <div class="notification-log">
                    <h3>"Notifications"</h3>
                    <ul>
                        {move || dispatches.with(|log| log.entries().to_vec()).into_iter().map(|dispatch| {
                            let (class, status) = match dispatch.status {
                                DispatchStatus::Pending => ("pending", "sending...".to_string()),
                                DispatchStatus::Delivered => ("delivered", "sent".to_string()),
                                DispatchStatus::Failed(reason) => ("failed", format!("failed: {}", reason)),
                            };
                            view! {
                                <li class=format!("notification {}", class)>
                                    <strong>{dispatch.milestone.label()}</strong>
                                    " "
                                    <span>{status}</span>
                                </li>
                            }
                        }).collect_view()}
                    </ul>
                </div>
            </Show>
        </aside>
    }
}
