use leptos::prelude::*;
use leptos_leaflet::prelude::*;
use shared_types::{Area, Geofence, LatLong};
use thaw::{Label, LabelSize};

const VISITED_FILL: &str = "%2316a34a";
const PENDING_FILL: &str = "%23f97316";
const DEPOT_FILL: &str = "%235b21b6";
const VEHICLE_FILL: &str = "%230284c7";

fn pin_icon(fill_color: &str) -> String {
    format!(
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='28' height='42' viewBox='0 0 28 42'%3E%3Cdefs%3E%3Cfilter id='shadow' x='-50%25' y='-50%25' width='200%25' height='200%25'%3E%3CfeDropShadow dx='0' dy='1' stdDeviation='1.5' flood-color='%23000' flood-opacity='0.25'/%3E%3C/filter%3E%3C/defs%3E%3Cpath fill='{}' stroke='%23ffffff' stroke-width='1.5' filter='url(%23shadow)' d='M14 2C8.5 2 4 6.5 4 12c0 8.5 10 26 10 26s10-17.5 10-26c0-5.5-4.5-10-10-10zm0 13.5c-1.9 0-3.5-1.6-3.5-3.5s1.6-3.5 3.5-3.5 3.5 1.6 3.5 3.5-1.6 3.5-3.5 3.5z'/%3E%3C/svg%3E",
        fill_color
    )
}

/// Map of the collection route: depot, dustbins and the live vehicle.
#[component]
pub fn RouteMap(
    geofence: Geofence,
    #[prop(into)] area: Signal<Option<Area>>,
    #[prop(into)] vehicle_position: Signal<Option<LatLong>>,
    vehicle_id: Option<String>,
) -> impl IntoView {
    let vehicle_label = vehicle_id.unwrap_or_else(|| "Collection vehicle".to_string());

    view! {
        <MapContainer
            style="height: 100%; width: 100%; flex: 1"
            center=Position::new(geofence.lat, geofence.long)
            zoom=15.0
            set_view=true
        >
            <TileLayer
                url="https://tile.openstreetmap.org/{z}/{x}/{y}.png"
                attribution="&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
            />

            <Marker
                position=Position::new(geofence.lat, geofence.long)
                draggable=false
                icon_url=Some(pin_icon(DEPOT_FILL))
                icon_size=Some((28.0, 42.0))
                icon_anchor=Some((14.0, 42.0))
            >
                <Popup>
                    <Label size=LabelSize::Large>"Collection point"</Label>
                </Popup>
            </Marker>

            {move || area.with(|area| {
                area.as_ref().map(|area| {
                    area.dustbins.iter().enumerate().filter_map(|(index, dustbin)| {
                        let location = dustbin.location?;
                        let fill = if dustbin.is_visited { VISITED_FILL } else { PENDING_FILL };
                        let status = match (dustbin.is_visited, dustbin.visited_timestamp) {
                            (true, Some(at)) => format!("Visited at {}", at.format("%H:%M UTC")),
                            (true, None) => "Visited".to_string(),
                            (false, _) => "Not visited yet".to_string(),
                        };
                        Some(view! {
                            <Marker
                                position=Position::new(location.lat(), location.long())
                                draggable=false
                                icon_url=Some(pin_icon(fill))
                                icon_size=Some((28.0, 42.0))
                                icon_anchor=Some((14.0, 42.0))
                            >
                                <Popup>
                                    <Label size=LabelSize::Large>{format!("Point {}", index + 1)}</Label>
                                    <p>{status}</p>
                                </Popup>
                            </Marker>
                        })
                    }).collect_view()
                })
            })}

            {move || vehicle_position.get().map(|position| {
                let label = vehicle_label.clone();
                view! {
                    <Marker
                        position=Position::new(position.lat, position.long)
                        draggable=false
                        icon_url=Some(pin_icon(VEHICLE_FILL))
                        icon_size=Some((28.0, 42.0))
                        icon_anchor=Some((14.0, 42.0))
                    >
                        <Popup>
                            <Label size=LabelSize::Large>{label}</Label>
                            <p>{format!("{:.5}, {:.5}", position.lat, position.long)}</p>
                        </Popup>
                    </Marker>
                }
            })}
        </MapContainer>
    }
}
