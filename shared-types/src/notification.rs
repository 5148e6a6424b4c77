use serde::{Deserialize, Serialize};

use crate::geofence::Milestone;

/// Body of `POST /updates/notifications`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub driver_id: String,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn for_milestone(milestone: Milestone, driver_id: impl Into<String>) -> Self {
        Notification {
            driver_id: driver_id.into(),
            title: milestone.title().to_string(),
            message: milestone.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    Pending,
    Delivered,
    Failed(String),
}

/// One background notification request and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDispatch {
    pub id: u64,
    pub milestone: Milestone,
    pub status: DispatchStatus,
}

impl NotificationDispatch {
    pub fn pending(id: u64, milestone: Milestone) -> Self {
        NotificationDispatch {
            id,
            milestone,
            status: DispatchStatus::Pending,
        }
    }

    pub fn settle<E: std::fmt::Display>(&mut self, outcome: Result<(), E>) {
        self.status = match outcome {
            Ok(()) => DispatchStatus::Delivered,
            Err(err) => DispatchStatus::Failed(err.to_string()),
        };
    }
}

/// Dispatches of the current page session, oldest first. Ids keep growing
/// across `clear` so a request started before a reset can never settle a
/// record created after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchLog {
    next_id: u64,
    entries: Vec<NotificationDispatch>,
}

impl DispatchLog {
    /// Records a pending dispatch and returns its id.
    pub fn begin(&mut self, milestone: Milestone) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(NotificationDispatch::pending(id, milestone));
        id
    }

    /// Settles the dispatch with `id`. Returns `false` when it is no longer
    /// in the log.
    pub fn settle<E: std::fmt::Display>(&mut self, id: u64, outcome: Result<(), E>) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.settle(outcome);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[NotificationDispatch] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_body_uses_camel_case() {
        let body = Notification::for_milestone(Milestone::Departure, "WB-01");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "driverId": "WB-01",
                "title": "Garbage Vehicle Out of Collection Point",
                "message": "The garbage vehicle has left the collection point to start collecting garbage.",
            })
        );
    }

    #[test]
    fn test_dispatch_settles_once_outcome_is_known() {
        let mut dispatch = NotificationDispatch::pending(0, Milestone::Arrival);
        assert_eq!(dispatch.status, DispatchStatus::Pending);

        dispatch.settle(Err("502 Bad Gateway"));
        assert_eq!(
            dispatch.status,
            DispatchStatus::Failed("502 Bad Gateway".to_string())
        );

        dispatch.settle::<String>(Ok(()));
        assert_eq!(dispatch.status, DispatchStatus::Delivered);
    }

    #[test]
    fn test_arrival_dispatch_follows_failed_departure() {
        let mut log = DispatchLog::default();
        let departure = log.begin(Milestone::Departure);
        assert!(log.settle(departure, Err("connection reset")));

        let arrival = log.begin(Milestone::Arrival);
        assert_ne!(departure, arrival);
        assert!(log.settle::<String>(arrival, Ok(())));

        let statuses: Vec<_> = log
            .entries()
            .iter()
            .map(|entry| (entry.milestone, entry.status.clone()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (
                    Milestone::Departure,
                    DispatchStatus::Failed("connection reset".to_string())
                ),
                (Milestone::Arrival, DispatchStatus::Delivered),
            ]
        );
    }

    #[test]
    fn test_pending_until_settled() {
        let mut log = DispatchLog::default();
        let id = log.begin(Milestone::Departure);
        assert_eq!(log.entries()[0].status, DispatchStatus::Pending);
        assert!(log.settle::<String>(id, Ok(())));
        assert_eq!(log.entries()[0].status, DispatchStatus::Delivered);
    }

    #[test]
    fn test_settle_after_clear_touches_nothing() {
        let mut log = DispatchLog::default();
        let stale = log.begin(Milestone::Departure);
        log.clear();
        assert!(log.is_empty());

        let fresh = log.begin(Milestone::Departure);
        assert!(!log.settle(stale, Err("late failure")));
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].id, fresh);
        assert_eq!(log.entries()[0].status, DispatchStatus::Pending);
    }
}
