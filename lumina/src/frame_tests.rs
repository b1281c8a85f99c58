//! Unit tests for the frames-in-flight slot bookkeeping
//!
//! Exercises the CPU-side ring tracker without requiring GPU: cursor
//! advance, in-flight accounting, and the re-record gate.

use super::*;

// ============================================================================
// RING ADVANCE TESTS
// ============================================================================

#[test]
fn test_tracker_advances_round_robin() {
    let mut tracker = SlotTracker::new(3);

    assert_eq!(tracker.current(), 0);
    tracker.advance();
    assert_eq!(tracker.current(), 1);
    tracker.advance();
    assert_eq!(tracker.current(), 2);
    tracker.advance();
    assert_eq!(tracker.current(), 0);
}

#[test]
fn test_tracker_single_slot_ring() {
    let mut tracker = SlotTracker::new(1);

    assert_eq!(tracker.current(), 0);
    tracker.advance();
    assert_eq!(tracker.current(), 0);
}

#[test]
fn test_tracker_advances_on_abandoned_iterations() {
    // An iteration abandoned before submit (stale acquire) still advances,
    // so the next iteration uses the next slot.
    let mut tracker = SlotTracker::new(2);

    tracker.advance();
    assert_eq!(tracker.current(), 1);
    assert_eq!(tracker.in_flight_count(), 0);
}

// ============================================================================
// IN-FLIGHT ACCOUNTING TESTS
// ============================================================================

#[test]
fn test_in_flight_never_exceeds_ring_size() {
    let mut tracker = SlotTracker::new(3);

    // Steady state: wait, submit, advance, three times over.
    for _ in 0..9 {
        let slot = tracker.current();
        tracker.fence_observed(slot);
        tracker.submitted(slot);
        tracker.advance();
        assert!(tracker.in_flight_count() <= 3);
    }
    assert_eq!(tracker.in_flight_count(), 3);
}

#[test]
fn test_fence_observation_gates_recording() {
    let mut tracker = SlotTracker::new(2);

    let slot = tracker.current();
    assert!(tracker.can_record(slot));

    tracker.submitted(slot);
    assert!(!tracker.can_record(slot));

    tracker.fence_observed(slot);
    assert!(tracker.can_record(slot));
}

#[test]
#[should_panic(expected = "resubmitted before its fence was observed")]
fn test_resubmit_without_fence_observation_panics() {
    let mut tracker = SlotTracker::new(2);

    tracker.submitted(0);
    tracker.submitted(0);
}

#[test]
fn test_stale_acquire_leaves_slot_recordable() {
    // begin_frame observes the fence, then sees a stale acquire and bails
    // without submitting. The slot must remain free for its next turn.
    let mut tracker = SlotTracker::new(3);

    let slot = tracker.current();
    tracker.fence_observed(slot);
    tracker.advance();

    assert!(tracker.can_record(slot));
    assert_eq!(tracker.in_flight_count(), 0);
}
