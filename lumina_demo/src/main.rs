//! Lumina demo - renders a colored triangle in a resizable window
//!
//! Run from the workspace root after compiling the SPIR-V (see the
//! .vert/.frag sources in lumina/shaders/ for the glslangValidator
//! invocation).

use lumina::{run, RendererConfig};
use std::path::PathBuf;

fn main() {
    let config = RendererConfig {
        window_title: "Lumina Triangle".to_string(),
        enable_validation: cfg!(debug_assertions),
        shader_dir: PathBuf::from("lumina/shaders"),
        ..Default::default()
    };

    if let Err(e) = run(config) {
        eprintln!("lumina_demo: {}", e);
        std::process::exit(1);
    }
}
