use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Area;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointKind {
    Start,
    Dustbin,
    End,
}

/// One unit of the route progress bar.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Checkpoint {
    pub kind: CheckpointKind,
    pub label: String,
    pub is_visited: bool,
    pub visited_timestamp: Option<DateTime<Utc>>,
}

impl Checkpoint {
    pub fn visited_at_label(&self) -> Option<String> {
        self.visited_timestamp
            .map(|ts| ts.format("%d %b %H:%M UTC").to_string())
    }
}

/// Start, one point per dustbin in route order, then End.
pub fn build_checkpoints(area: &Area, departed: bool, arrived: bool) -> Vec<Checkpoint> {
    let mut points = Vec::with_capacity(area.dustbins.len() + 2);
    points.push(Checkpoint {
        kind: CheckpointKind::Start,
        label: "Start".to_string(),
        is_visited: departed,
        visited_timestamp: None,
    });
    points.extend(area.dustbins.iter().enumerate().map(|(index, dustbin)| Checkpoint {
        kind: CheckpointKind::Dustbin,
        label: format!("Point {}", index + 1),
        is_visited: dustbin.is_visited,
        visited_timestamp: dustbin.visited_timestamp,
    }));
    points.push(Checkpoint {
        kind: CheckpointKind::End,
        label: "End".to_string(),
        is_visited: arrived,
        visited_timestamp: None,
    });
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dustbin;

    fn area_with(count: usize) -> Area {
        Area {
            id: "a1".to_string(),
            name: "Ward 3".to_string(),
            dustbins: (0..count)
                .map(|i| Dustbin {
                    id: format!("d{i}"),
                    is_visited: i % 2 == 0,
                    visited_timestamp: None,
                    location: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_length_is_dustbins_plus_two() {
        for count in [0, 1, 5] {
            let points = build_checkpoints(&area_with(count), false, false);
            assert_eq!(points.len(), count + 2);
        }
    }

    #[test]
    fn test_order_is_start_dustbins_end() {
        let points = build_checkpoints(&area_with(3), true, false);
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Start", "Point 1", "Point 2", "Point 3", "End"]);
        assert_eq!(points[0].kind, CheckpointKind::Start);
        assert_eq!(points[4].kind, CheckpointKind::End);
        assert!(points[1..4].iter().all(|p| p.kind == CheckpointKind::Dustbin));
    }

    #[test]
    fn test_visited_flags_come_from_tracker_and_dustbins() {
        let points = build_checkpoints(&area_with(2), true, false);
        let flags: Vec<_> = points.iter().map(|p| p.is_visited).collect();
        assert_eq!(flags, vec![true, true, false, false]);
    }

    #[test]
    fn test_visited_at_label() {
        let mut area = area_with(1);
        area.dustbins[0].visited_timestamp = Some("2024-03-01T08:15:00Z".parse().unwrap());
        let points = build_checkpoints(&area, false, false);
        assert_eq!(points[1].visited_at_label().as_deref(), Some("01 Mar 08:15 UTC"));
        assert_eq!(points[0].visited_at_label(), None);
    }
}
