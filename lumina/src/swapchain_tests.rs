//! Unit tests for swapchain parameter resolution and status classification
//!
//! Tests pure decision logic without requiring GPU: extent resolution,
//! image-count clamping, surface-format preference and the mapping of
//! acquire/present results onto recoverable vs fatal outcomes.

use super::*;

fn caps(
    current: (u32, u32),
    min_extent: (u32, u32),
    max_extent: (u32, u32),
    min_images: u32,
    max_images: u32,
) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        current_extent: vk::Extent2D {
            width: current.0,
            height: current.1,
        },
        min_image_extent: vk::Extent2D {
            width: min_extent.0,
            height: min_extent.1,
        },
        max_image_extent: vk::Extent2D {
            width: max_extent.0,
            height: max_extent.1,
        },
        min_image_count: min_images,
        max_image_count: max_images,
        ..Default::default()
    }
}

// ============================================================================
// EXTENT RESOLUTION TESTS
// ============================================================================

#[test]
fn test_resolve_extent_definite_wins_over_hint() {
    let caps = caps((800, 600), (1, 1), (4096, 4096), 1, 0);
    let hint = vk::Extent2D {
        width: 1920,
        height: 1080,
    };

    let extent = resolve_extent(&caps, hint);
    assert_eq!(extent.width, 800);
    assert_eq!(extent.height, 600);
}

#[test]
fn test_resolve_extent_sentinel_uses_hint() {
    let caps = caps((u32::MAX, u32::MAX), (1, 1), (4096, 4096), 1, 0);
    let hint = vk::Extent2D {
        width: 1280,
        height: 720,
    };

    let extent = resolve_extent(&caps, hint);
    assert_eq!(extent.width, 1280);
    assert_eq!(extent.height, 720);
}

#[test]
fn test_resolve_extent_sentinel_clamps_per_axis() {
    let caps = caps((u32::MAX, u32::MAX), (100, 100), (1000, 1000), 1, 0);

    // Width below minimum, height above maximum.
    let extent = resolve_extent(
        &caps,
        vk::Extent2D {
            width: 10,
            height: 5000,
        },
    );
    assert_eq!(extent.width, 100);
    assert_eq!(extent.height, 1000);
}

// ============================================================================
// IMAGE COUNT TESTS
// ============================================================================

#[test]
fn test_resolve_image_count_min_plus_one() {
    let caps = caps((800, 600), (1, 1), (4096, 4096), 2, 8);
    assert_eq!(resolve_image_count(&caps), 3);
}

#[test]
fn test_resolve_image_count_clamped_by_max() {
    let caps = caps((800, 600), (1, 1), (4096, 4096), 3, 3);
    assert_eq!(resolve_image_count(&caps), 3);
}

#[test]
fn test_resolve_image_count_zero_max_means_unbounded() {
    let caps = caps((800, 600), (1, 1), (4096, 4096), 1, 0);
    assert_eq!(resolve_image_count(&caps), 2);
}

// ============================================================================
// SURFACE FORMAT TESTS
// ============================================================================

#[test]
fn test_select_surface_format_prefers_bgra_unorm() {
    let formats = [
        vk::SurfaceFormatKHR {
            format: vk::Format::R16G16B16A16_SFLOAT,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
    ];

    assert_eq!(
        select_surface_format(&formats).format,
        vk::Format::B8G8R8A8_UNORM
    );
}

#[test]
fn test_select_surface_format_accepts_rgba_unorm() {
    let formats = [
        vk::SurfaceFormatKHR {
            format: vk::Format::R16G16B16A16_SFLOAT,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
    ];

    assert_eq!(
        select_surface_format(&formats).format,
        vk::Format::R8G8B8A8_UNORM
    );
}

#[test]
fn test_select_surface_format_falls_back_to_first() {
    let formats = [
        vk::SurfaceFormatKHR {
            format: vk::Format::R16G16B16A16_SFLOAT,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
            format: vk::Format::A2B10G10R10_UNORM_PACK32,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
    ];

    assert_eq!(
        select_surface_format(&formats).format,
        vk::Format::R16G16B16A16_SFLOAT
    );
}

// ============================================================================
// ACQUIRE / PRESENT CLASSIFICATION TESTS
// ============================================================================

#[test]
fn test_classify_acquire_success() {
    assert_eq!(
        classify_acquire(Ok((2, false))).unwrap(),
        AcquireOutcome::Acquired(2)
    );
}

#[test]
fn test_classify_acquire_suboptimal_still_acquired() {
    // A suboptimal acquire still delivered an image; it is usable.
    assert_eq!(
        classify_acquire(Ok((0, true))).unwrap(),
        AcquireOutcome::Acquired(0)
    );
}

#[test]
fn test_classify_acquire_out_of_date_is_stale() {
    assert_eq!(
        classify_acquire(Err(vk::Result::ERROR_OUT_OF_DATE_KHR)).unwrap(),
        AcquireOutcome::Stale
    );
}

#[test]
fn test_classify_acquire_device_lost_is_fatal() {
    let result = classify_acquire(Err(vk::Result::ERROR_DEVICE_LOST));
    assert!(matches!(result, Err(Error::DeviceError(_))));
}

#[test]
fn test_classify_present_success() {
    assert_eq!(classify_present(Ok(false)).unwrap(), SurfaceStatus::Ok);
}

#[test]
fn test_classify_present_suboptimal() {
    assert_eq!(
        classify_present(Ok(true)).unwrap(),
        SurfaceStatus::Suboptimal
    );
}

#[test]
fn test_classify_present_out_of_date_is_stale() {
    assert_eq!(
        classify_present(Err(vk::Result::ERROR_OUT_OF_DATE_KHR)).unwrap(),
        SurfaceStatus::Stale
    );
}

#[test]
fn test_classify_present_surface_lost_is_fatal() {
    let result = classify_present(Err(vk::Result::ERROR_SURFACE_LOST_KHR));
    assert!(matches!(result, Err(Error::DeviceError(_))));
}
