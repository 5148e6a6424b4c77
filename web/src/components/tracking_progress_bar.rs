use leptos::prelude::*;
use shared_types::{Checkpoint, CheckpointKind};

#[component]
pub fn TrackingProgressBar(
    #[prop(into)] points: Signal<Vec<Checkpoint>>,
    #[prop(optional, default = 40.0)] circle_size: f64,
) -> impl IntoView {
    let visited = move || points.with(|p| p.iter().filter(|c| c.is_visited).count());
    let total = move || points.with(|p| p.len());

    view! {
        <div class="progress-bar">
            <p class="progress-summary">
                {move || format!("{} of {} checkpoints reached", visited(), total())}
            </p>
            <ol class="progress-track">
                {move || points.get().into_iter().enumerate().map(|(index, point)| {
                    let symbol = match point.kind {
                        CheckpointKind::Start => "S".to_string(),
                        CheckpointKind::End => "E".to_string(),
                        // Start occupies slot 0, so dustbins are numbered from 1
                        CheckpointKind::Dustbin => index.to_string(),
                    };
                    let visited_at = point.visited_at_label();

                    view! {
                        <li class="progress-point" class:visited=point.is_visited>
                            <div
                                class="progress-circle"
                                style=format!(
                                    "width: {0}px; height: {0}px; line-height: {0}px;",
                                    circle_size
                                )
                            >
                                {if point.is_visited { "✓".to_string() } else { symbol }}
                            </div>
                            <div class="progress-label">
                                <span class="progress-name">{point.label}</span>
                                {visited_at.map(|at| view! {
                                    <span class="progress-time">{at}</span>
                                })}
                            </div>
                        </li>
                    }
                }).collect_view()}
            </ol>
        </div>
    }
}
