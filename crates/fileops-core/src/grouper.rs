//! Time-window event grouping.
//!
//! Partitions a timestamp-ordered event sequence into batches. The window is
//! anchored at each batch's *first* event, so a group is capped in total
//! duration; a slow drip of events spaced just under the window apart cannot
//! chain into one unbounded group.

use crate::event::FileEvent;

/// Partitions `events` into groups of events within `window_ms` of each
/// group's first event.
///
/// The input must already be sorted ascending by timestamp. Order is
/// preserved: concatenating the output groups reproduces the input exactly.
/// Empty input yields an empty output.
#[must_use]
pub fn group_events_by_time(events: Vec<FileEvent>, window_ms: i64) -> Vec<Vec<FileEvent>> {
    let mut groups = Vec::new();
    let mut current: Vec<FileEvent> = Vec::new();

    for event in events {
        match current.first() {
            None => current.push(event),
            Some(anchor) => {
                let elapsed = (event.timestamp - anchor.timestamp).num_milliseconds();
                if elapsed <= window_ms {
                    current.push(event);
                } else {
                    groups.push(std::mem::take(&mut current));
                    current.push(event);
                }
            }
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn ts(offset_ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::milliseconds(offset_ms)
    }

    fn event(path: &str, offset_ms: i64) -> FileEvent {
        FileEvent::new(path, EventKind::Modify, ts(offset_ms))
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(group_events_by_time(Vec::new(), 500).is_empty());
    }

    #[test]
    fn events_within_window_share_a_group() {
        let events = vec![event("a", 0), event("b", 10), event("c", 20)];
        let groups = group_events_by_time(events, 50);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn event_past_window_starts_a_new_group() {
        let events = vec![event("a", 0), event("b", 10), event("c", 20)];
        let groups = group_events_by_time(events, 5);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn window_is_anchored_at_first_event_not_previous() {
        // Events 40ms apart with a 50ms window: a previous-event anchor would
        // chain all of them; a first-event anchor closes the group at 40ms.
        let events = vec![event("a", 0), event("b", 40), event("c", 80), event("d", 120)];
        let groups = group_events_by_time(events, 50);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2); // 0, 40
        assert_eq!(groups[1].len(), 2); // 80, 120
    }

    #[test]
    fn boundary_event_at_exactly_window_is_included() {
        let events = vec![event("a", 0), event("b", 50), event("c", 51)];
        let groups = group_events_by_time(events, 50);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn partition_is_complete_and_window_bounded() {
        let offsets = [0, 3, 7, 52, 53, 110, 111, 112, 400];
        let events: Vec<_> = offsets
            .iter()
            .enumerate()
            .map(|(i, &off)| event(&format!("f{i}"), off))
            .collect();
        let window_ms = 50;

        let groups = group_events_by_time(events.clone(), window_ms);

        // Concatenation reproduces the input.
        let flattened: Vec<_> = groups.iter().flatten().cloned().collect();
        assert_eq!(flattened, events);

        // Every event sits within the window of its group's anchor.
        for group in &groups {
            let anchor = group[0].timestamp;
            for event in group {
                assert!((event.timestamp - anchor).num_milliseconds() <= window_ms);
            }
        }

        // Adjacent groups are separated by more than the window.
        for pair in groups.windows(2) {
            let gap = (pair[1][0].timestamp - pair[0][0].timestamp).num_milliseconds();
            assert!(gap > window_ms);
        }
    }
}
