//! Renderer configuration

use std::path::PathBuf;

/// Configuration for the presentation pipeline
///
/// Plain data; pass to [`crate::run`] once at startup.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window title
    pub window_title: String,

    /// Initial window width in pixels
    pub width: u32,

    /// Initial window height in pixels
    pub height: u32,

    /// Number of frames that may be in flight on the GPU at once.
    /// This is the sole backpressure between CPU submission and GPU drain.
    pub frames_in_flight: usize,

    /// Background clear color (RGBA)
    pub clear_color: [f32; 4],

    /// Enable VK_LAYER_KHRONOS_validation and the debug messenger
    pub enable_validation: bool,

    /// Directory containing the compiled SPIR-V shaders
    /// (triangle.vert.spv / triangle.frag.spv)
    pub shader_dir: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            window_title: "Lumina".to_string(),
            width: 800,
            height: 600,
            frames_in_flight: 3,
            clear_color: [0.5, 0.5, 0.5, 1.0],
            enable_validation: false,
            shader_dir: PathBuf::from("shaders"),
        }
    }
}
