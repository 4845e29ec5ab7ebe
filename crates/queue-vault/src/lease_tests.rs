//! Tests for the lease index.

use super::*;
use chrono::Duration;

#[test]
fn test_pop_due_returns_entries_in_time_order() {
    let now = Timestamp::now();
    let mut index = LeaseIndex::new();

    index.schedule(now.plus(Duration::seconds(-10)), 3);
    index.schedule(now.plus(Duration::seconds(-30)), 1);
    index.schedule(now.plus(Duration::seconds(-20)), 2);

    assert_eq!(index.pop_due(now), Some(1));
    assert_eq!(index.pop_due(now), Some(2));
    assert_eq!(index.pop_due(now), Some(3));
    assert_eq!(index.pop_due(now), None);
}

#[test]
fn test_pop_due_leaves_future_entries() {
    let now = Timestamp::now();
    let mut index = LeaseIndex::new();

    index.schedule(now.plus(Duration::seconds(-1)), 1);
    index.schedule(now.plus(Duration::seconds(60)), 2);

    assert_eq!(index.pop_due(now), Some(1));
    assert_eq!(index.pop_due(now), None);
    assert_eq!(index.len(), 1);
    assert_eq!(index.next_due(), Some(now.plus(Duration::seconds(60))));
}

#[test]
fn test_ties_break_by_sequence() {
    let now = Timestamp::now();
    let due = now.plus(Duration::seconds(-5));
    let mut index = LeaseIndex::new();

    index.schedule(due, 9);
    index.schedule(due, 4);

    assert_eq!(index.pop_due(now), Some(4));
    assert_eq!(index.pop_due(now), Some(9));
}

#[test]
fn test_clear_discards_everything() {
    let now = Timestamp::now();
    let mut index = LeaseIndex::new();

    index.schedule(now, 1);
    index.schedule(now, 2);
    index.clear();

    assert_eq!(index.len(), 0);
    assert_eq!(index.pop_due(now.plus(Duration::seconds(1))), None);
}
