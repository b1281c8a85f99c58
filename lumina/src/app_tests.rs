//! Unit tests for the frame loop's recreation decision

use super::*;

#[test]
fn test_no_recreation_in_steady_state() {
    assert!(!needs_recreation(SurfaceStatus::Ok, false));
}

#[test]
fn test_stale_present_forces_recreation() {
    assert!(needs_recreation(SurfaceStatus::Stale, false));
}

#[test]
fn test_resize_forces_recreation_despite_successful_present() {
    // The present succeeded, but the window no longer matches the images.
    assert!(needs_recreation(SurfaceStatus::Ok, true));
}

#[test]
fn test_suboptimal_alone_does_not_force_recreation() {
    // Suboptimal frames are still presentable; only a size change or a
    // stale report triggers the rebuild.
    assert!(!needs_recreation(SurfaceStatus::Suboptimal, false));
}

#[test]
fn test_stale_and_resize_together() {
    assert!(needs_recreation(SurfaceStatus::Stale, true));
}

#[test]
fn test_zero_area_window_pauses_drawing() {
    assert!(window_is_minimized(PhysicalSize::new(0, 0)));
    assert!(window_is_minimized(PhysicalSize::new(800, 0)));
    assert!(window_is_minimized(PhysicalSize::new(0, 600)));
}

#[test]
fn test_nonzero_window_draws() {
    assert!(!window_is_minimized(PhysicalSize::new(1, 1)));
    assert!(!window_is_minimized(PhysicalSize::new(800, 600)));
}
