//! Unit tests for memory-type catalog matching
//!
//! Tests the catalog scan without requiring GPU. The catalog structs are
//! plain data and can be built by hand.

use super::*;

fn catalog(types: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
    let mut props = vk::PhysicalDeviceMemoryProperties {
        memory_type_count: types.len() as u32,
        ..Default::default()
    };
    for (i, &flags) in types.iter().enumerate() {
        props.memory_types[i].property_flags = flags;
    }
    props
}

// ============================================================================
// MEMORY TYPE SELECTION TESTS
// ============================================================================

#[test]
fn test_find_memory_type_exact_match() {
    let props = catalog(&[
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    ]);

    assert_eq!(
        find_memory_type(&props, !0, vk::MemoryPropertyFlags::DEVICE_LOCAL),
        Some(0)
    );
    assert_eq!(
        find_memory_type(
            &props,
            !0,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
        ),
        Some(1)
    );
}

#[test]
fn test_find_memory_type_superset_satisfies() {
    // A type with MORE capabilities than requested still matches.
    let props = catalog(&[vk::MemoryPropertyFlags::DEVICE_LOCAL
        | vk::MemoryPropertyFlags::HOST_VISIBLE
        | vk::MemoryPropertyFlags::HOST_COHERENT]);

    assert_eq!(
        find_memory_type(&props, !0, vk::MemoryPropertyFlags::HOST_VISIBLE),
        Some(0)
    );
}

#[test]
fn test_find_memory_type_respects_type_bits() {
    // Type 0 has the right flags but is excluded by the requirements mask.
    let props = catalog(&[
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
    ]);

    assert_eq!(
        find_memory_type(&props, 0b10, vk::MemoryPropertyFlags::DEVICE_LOCAL),
        Some(1)
    );
}

#[test]
fn test_find_memory_type_first_match_wins() {
    let props = catalog(&[
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    ]);

    assert_eq!(
        find_memory_type(&props, !0, vk::MemoryPropertyFlags::HOST_VISIBLE),
        Some(0)
    );
}

#[test]
fn test_find_memory_type_no_match() {
    let props = catalog(&[vk::MemoryPropertyFlags::DEVICE_LOCAL]);

    assert_eq!(
        find_memory_type(&props, !0, vk::MemoryPropertyFlags::HOST_VISIBLE),
        None
    );
}

#[test]
fn test_find_memory_type_partial_flags_insufficient() {
    // HOST_VISIBLE alone does not satisfy HOST_VISIBLE | HOST_COHERENT.
    let props = catalog(&[vk::MemoryPropertyFlags::HOST_VISIBLE]);

    assert_eq!(
        find_memory_type(
            &props,
            !0,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
        ),
        None
    );
}

#[test]
fn test_find_memory_type_empty_catalog() {
    let props = catalog(&[]);

    assert_eq!(
        find_memory_type(&props, !0, vk::MemoryPropertyFlags::DEVICE_LOCAL),
        None
    );
}
