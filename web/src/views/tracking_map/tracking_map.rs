use leptos::logging::{error, log, warn};
use leptos::{prelude::*, task::spawn_local};
use leptos_router::hooks::use_query_map;
use shared_types::{
    build_checkpoints, Area, ChannelEvent, DispatchLog, Driver, Geofence, GeofenceTracker,
    LatLong, LoadError, Milestone, Notification, TrackingConfig, TrackingParams,
};
use thaw::{Button, ButtonAppearance};

use crate::{
    channel::TrackingChannel,
    components::{ErrorView, LoadingView},
    server::{fetch_tracking_data, get_tracking_config, send_notification},
    utils::auth::get_auth_token,
    views::tracking_map::{RouteMap, TrackingSidebar},
};

#[derive(Debug, Clone, PartialEq)]
enum PagePhase {
    Loading,
    Failed(String),
    Ready,
}

/// Numbers loads so that only the one for the current link writes into the page.
#[derive(Clone, Copy)]
struct LoadGuard(StoredValue<u64>);

impl LoadGuard {
    fn new() -> Self {
        LoadGuard(StoredValue::new(0))
    }

    fn begin(&self) -> u64 {
        self.0.update_value(|generation| *generation += 1);
        self.0.get_value()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.0.try_get_value() == Some(generation)
    }
}

/// Page state that the live channel writes into.
#[derive(Clone, Copy)]
struct LiveState {
    area: RwSignal<Option<Area>>,
    tracker: RwSignal<GeofenceTracker>,
    vehicle_position: RwSignal<Option<LatLong>>,
    dispatches: RwSignal<DispatchLog>,
}

impl LiveState {
    fn new(area: RwSignal<Option<Area>>) -> Self {
        LiveState {
            area,
            tracker: RwSignal::new(GeofenceTracker::default()),
            vehicle_position: RwSignal::new(None),
            dispatches: RwSignal::new(DispatchLog::default()),
        }
    }

    fn reset(&self, geofence: Geofence) {
        self.tracker.set(GeofenceTracker::new(geofence));
        self.vehicle_position.set(None);
        self.dispatches.update(DispatchLog::clear);
    }

    /// Folds one event into the page. Returns the milestone it completed
    /// together with the vehicle that reported it.
    ///
    /// Every coordinate is checked against the geofence. The link's vehicle
    /// only decides which updates move the marker.
    fn apply(&self, event: ChannelEvent, vehicle_id: Option<&str>) -> Option<(Milestone, String)> {
        match event {
            ChannelEvent::CoordinatesUpdated(update) => {
                if update.is_for(vehicle_id) {
                    log!(
                        "Received coordinates for vehicle {}: {}, {}",
                        update.vehicle_id,
                        update.latitude,
                        update.longitude
                    );
                    self.vehicle_position.set(Some(LatLong {
                        lat: update.latitude,
                        long: update.longitude,
                    }));
                }
                let milestone = self.tracker.try_update(|t| t.observe(&update)).flatten()?;
                Some((milestone, update.vehicle_id))
            }
            ChannelEvent::DustbinVisited(visit) => {
                log!("Dustbin {} visited: {}", visit.id, visit.is_visited);
                self.area.update(|area| match area {
                    Some(area) => {
                        if !area.apply_visit(&visit) {
                            warn!("Visit for unknown dustbin {}", visit.id);
                        }
                    }
                    None => warn!("Visit for dustbin {} before area loaded", visit.id),
                });
                None
            }
        }
    }
}

/// Sends the milestone notification in the background and records how it went.
fn dispatch_notification(
    milestone: Milestone,
    vehicle_id: String,
    dispatches: RwSignal<DispatchLog>,
) {
    let Some(id) = dispatches.try_update(|log| log.begin(milestone)) else {
        return;
    };
    let notification = Notification::for_milestone(milestone, vehicle_id);

    spawn_local(async move {
        let outcome = send_notification(notification, get_auth_token()).await;
        match &outcome {
            Ok(()) => log!("Notification created for {}", milestone.label()),
            Err(e) => error!("Error creating {} notification: {}", milestone.label(), e),
        }
        let settled = dispatches.try_update(|log| log.settle(id, outcome));
        if settled != Some(true) {
            log!("{} notification finished after the page was reset", milestone.label());
        }
    });
}

#[component]
pub fn TrackingMap() -> impl IntoView {
    let query = use_query_map();
    let params = Memo::new(move |_| {
        query.with(|q| TrackingParams::from_lookup(|name| q.get(name)))
    });

    let phase = RwSignal::new(PagePhase::Loading);
    let area = RwSignal::new(None::<Area>);
    let driver = RwSignal::new(None::<Driver>);
    let config = RwSignal::new(None::<TrackingConfig>);
    let live = LiveState::new(area);
    let loads = LoadGuard::new();
    let sidebar_open = RwSignal::new(false);

    Effect::new(move |_| {
        spawn_local(async move {
            let tracking_config = match get_tracking_config().await {
                Ok(c) => c,
                Err(e) => {
                    warn!("Falling back to default tracking config: {}", e);
                    TrackingConfig::default()
                }
            };
            config.set(Some(tracking_config));
        });
    });

    // Load area and driver whenever the link changes
    Effect::new(move |_| {
        let request = params.with(|p| p.authorize(get_auth_token()));
        let generation = loads.begin();
        area.set(None);
        driver.set(None);
        phase.set(PagePhase::Loading);

        let request = match request {
            Ok(request) => request,
            Err(e) => {
                error!("Error loading tracking page: {}", e);
                phase.set(PagePhase::Failed(e.to_string()));
                return;
            }
        };

        spawn_local(async move {
            let outcome = fetch_tracking_data(request)
                .await
                .unwrap_or_else(|e| Err(LoadError::Unavailable(e.to_string())));
            if !loads.is_current(generation) {
                log!("Dropping tracking data requested for an earlier link");
                return;
            }
            match outcome {
                Ok(data) => {
                    log!("Loaded area {} for driver {}", data.area.name, data.driver.name);
                    area.set(Some(data.area));
                    driver.set(Some(data.driver));
                    phase.set(PagePhase::Ready);
                }
                Err(e) => {
                    error!("Error fetching tracking data: {}", e);
                    phase.set(PagePhase::Failed(e.to_string()));
                }
            }
        });
    });

    // One channel per mounted page and link; cleanup closes it
    Effect::new(move |_| {
        let Some(tracking_config) = config.get() else {
            return;
        };
        let vehicle_id = params.with(|p| p.vehicle_id.clone());
        live.reset(tracking_config.geofence);

        let on_event = move |event: ChannelEvent| {
            if let Some((milestone, vehicle)) = live.apply(event, vehicle_id.as_deref()) {
                dispatch_notification(milestone, vehicle, live.dispatches);
            }
        };

        match TrackingChannel::open(&tracking_config.socket_url, on_event) {
            Ok(channel) => {
                let channel = StoredValue::new_local(Some(channel));
                on_cleanup(move || {
                    channel.update_value(|c| {
                        if let Some(c) = c.take() {
                            c.close();
                        }
                    });
                });
            }
            Err(e) => error!("Could not open tracking channel: {}", e),
        }
    });

    let checkpoints = Signal::derive(move || {
        let tracker = live.tracker.get();
        area.with(|a| {
            a.as_ref()
                .map(|a| build_checkpoints(a, tracker.departed(), tracker.arrived()))
                .unwrap_or_default()
        })
    });

    let toggle_sidebar = move |_| sidebar_open.update(|open| *open = !*open);

    view! {
        {move || match phase.get() {
            PagePhase::Loading => view! { <LoadingView message=None /> }.into_any(),
            PagePhase::Failed(message) => view! { <ErrorView message=Some(message) /> }.into_any(),
            PagePhase::Ready => {
                let vehicle_id = params.with_untracked(|p| p.vehicle_id.clone());
                let geofence = config
                    .with(|c| c.as_ref().map(|c| c.geofence))
                    .unwrap_or_default();

                view! {
                    <div class=move || {
                        if sidebar_open.get() {
                            "tracking-map-container sidebar-open"
                        } else {
                            "tracking-map-container"
                        }
                    }>
                        <div class="map-container">
                            <RouteMap
                                geofence=geofence
                                area=area
                                vehicle_position=live.vehicle_position
                                vehicle_id=vehicle_id.clone()
                            />
                            <Button
                                class="toggle-sidebar-button"
                                appearance=ButtonAppearance::Primary
                                on_click=toggle_sidebar
                            >
                                {move || if sidebar_open.get() { "Close Sidebar" } else { "Open Sidebar" }}
                            </Button>
                        </div>
                        <TrackingSidebar
                            open=sidebar_open
                            area=area
                            driver=driver
                            checkpoints=checkpoints
                            dispatches=live.dispatches
                            vehicle_id=vehicle_id
                        />
                    </div>
                }.into_any()
            }
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{CoordinatesUpdated, Dustbin, DustbinVisited};

    fn at(vehicle: &str, lat: f64, long: f64) -> ChannelEvent {
        ChannelEvent::CoordinatesUpdated(CoordinatesUpdated {
            vehicle_id: vehicle.to_string(),
            latitude: lat,
            longitude: long,
        })
    }

    fn live_with_area() -> LiveState {
        let area = RwSignal::new(Some(Area {
            id: "a1".to_string(),
            name: "Ward 7".to_string(),
            dustbins: vec![
                Dustbin {
                    id: "d1".to_string(),
                    is_visited: false,
                    visited_timestamp: None,
                    location: None,
                },
                Dustbin {
                    id: "d2".to_string(),
                    is_visited: false,
                    visited_timestamp: None,
                    location: None,
                },
            ],
        }));
        LiveState::new(area)
    }

    #[test]
    fn test_departure_then_arrival() {
        let owner = Owner::new();
        owner.set();
        let live = live_with_area();

        assert_eq!(live.apply(at("WB-01", 23.0, 87.0), Some("WB-01")), None);
        assert_eq!(
            live.vehicle_position.get_untracked(),
            Some(LatLong { lat: 23.0, long: 87.0 })
        );

        assert_eq!(
            live.apply(at("WB-01", 23.2057, 87.0286), Some("WB-01")),
            Some((Milestone::Departure, "WB-01".to_string()))
        );
        assert!(live.tracker.get_untracked().departed());

        assert_eq!(
            live.apply(at("WB-01", 23.2057, 87.0286), Some("WB-01")),
            Some((Milestone::Arrival, "WB-01".to_string()))
        );
        assert!(live.tracker.get_untracked().arrived());
        assert_eq!(live.apply(at("WB-01", 23.2057, 87.0286), Some("WB-01")), None);
    }

    #[test]
    fn test_other_vehicle_at_depot_still_departs() {
        let owner = Owner::new();
        owner.set();
        let live = live_with_area();

        assert_eq!(
            live.apply(at("OTHER", 23.2057, 87.0286), Some("WB-01")),
            Some((Milestone::Departure, "OTHER".to_string()))
        );
        assert!(live.tracker.get_untracked().departed());
        assert_eq!(live.vehicle_position.get_untracked(), None);

        assert_eq!(live.apply(at("OTHER", 22.0, 88.0), Some("WB-01")), None);
        assert_eq!(live.vehicle_position.get_untracked(), None);
    }

    #[test]
    fn test_reset_clears_previous_link_state() {
        let owner = Owner::new();
        owner.set();
        let live = live_with_area();

        live.apply(at("WB-01", 23.2057, 87.0286), None);
        live.dispatches.update(|log| {
            log.begin(Milestone::Departure);
        });
        assert!(!live.dispatches.with_untracked(DispatchLog::is_empty));

        live.reset(Geofence::default());
        assert!(live.dispatches.with_untracked(DispatchLog::is_empty));
        assert_eq!(live.vehicle_position.get_untracked(), None);
        assert!(!live.tracker.get_untracked().departed());
    }

    #[test]
    fn test_only_latest_load_is_current() {
        let owner = Owner::new();
        owner.set();
        let loads = LoadGuard::new();

        let first = loads.begin();
        assert!(loads.is_current(first));
        let second = loads.begin();
        assert!(!loads.is_current(first));
        assert!(loads.is_current(second));
    }

    #[test]
    fn test_visits_merge_into_area() {
        let owner = Owner::new();
        owner.set();
        let live = live_with_area();

        let visit = DustbinVisited {
            id: "d2".to_string(),
            is_visited: true,
            visited_timestamp: Some("2024-03-01T08:15:00Z".parse().unwrap()),
        };
        assert_eq!(live.apply(ChannelEvent::DustbinVisited(visit), None), None);

        let area = live.area.get_untracked().unwrap();
        assert!(!area.dustbins[0].is_visited);
        assert!(area.dustbins[1].is_visited);
        assert_eq!(area.visited_count(), 1);
    }

    #[test]
    fn test_reset_applies_new_geofence() {
        let owner = Owner::new();
        owner.set();
        let live = live_with_area();
        let fence = Geofence {
            lat: 12.9716,
            long: 77.5946,
            precision: 4,
        };
        live.reset(fence);

        assert_eq!(live.apply(at("WB-01", 23.2057, 87.0286), None), None);
        assert_eq!(
            live.apply(at("WB-01", 12.9716, 77.5946), None),
            Some((Milestone::Departure, "WB-01".to_string()))
        );
    }
}
