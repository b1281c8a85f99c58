//! Unit tests for the vertex layout and static triangle geometry

use super::*;

#[test]
fn test_vertex_is_28_bytes() {
    // float[3] position + float[4] color, tightly packed.
    assert_eq!(std::mem::size_of::<Vertex>(), 28);
}

#[test]
fn test_vertex_attribute_offsets() {
    let attributes = Vertex::attribute_descriptions();

    assert_eq!(attributes[0].offset, 0);
    assert_eq!(attributes[0].format, vk::Format::R32G32B32_SFLOAT);
    assert_eq!(attributes[1].offset, 12);
    assert_eq!(attributes[1].format, vk::Format::R32G32B32A32_SFLOAT);
}

#[test]
fn test_vertex_binding_stride_matches_size() {
    let binding = Vertex::binding_description();

    assert_eq!(binding.binding, 0);
    assert_eq!(binding.stride, 28);
    assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);
}

#[test]
fn test_triangle_upload_payload() {
    let bytes: &[u8] = bytemuck::cast_slice(&TRIANGLE_VERTICES);
    assert_eq!(bytes.len(), 84);
}

#[test]
fn test_triangle_vertex_colors_are_opaque_primaries() {
    assert_eq!(TRIANGLE_VERTICES[0].color, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(TRIANGLE_VERTICES[1].color, [0.0, 1.0, 0.0, 1.0]);
    assert_eq!(TRIANGLE_VERTICES[2].color, [0.0, 0.0, 1.0, 1.0]);
}
