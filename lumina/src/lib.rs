/*!
# Lumina

A small Vulkan frame-presentation pipeline built on Ash.

Lumina opens a window, brings up a Vulkan device, and drives a frame loop
that renders a static colored triangle with a fixed number of frames in
flight. It handles the unglamorous parts correctly: swapchain recreation on
resize and surface invalidation, fence-based CPU/GPU command-buffer
ownership, staged vertex upload into device-local memory, and deterministic
teardown.

## Architecture

- **VulkanContext**: instance, device, queue and command pool bring-up
- **SwapchainState**: presentable image set, acquire/present, recreation
- **FrameSync**: the frames-in-flight ring of fences, semaphores and
  command buffers
- **GpuBuffer**: buffer allocation against the memory-type catalog
- **TrianglePipeline**: render pass and graphics pipeline
- **run**: the winit event loop and frame loop driver

## Example

```no_run
use lumina::{run, RendererConfig};

fn main() {
    let config = RendererConfig::default();
    if let Err(e) = run(config) {
        eprintln!("renderer failed: {}", e);
    }
}
```
*/

// Internal modules
mod app;
mod buffer;
mod config;
mod context;
mod debug;
mod error;
mod frame;
mod pipeline;
mod swapchain;

pub mod log;

pub use app::run;
pub use buffer::{upload_vertex_data, GpuBuffer};
pub use config::RendererConfig;
pub use context::VulkanContext;
pub use error::{Error, Result};
pub use frame::{FrameBegin, FrameSlot, FrameSync};
pub use pipeline::{TrianglePipeline, Vertex, TRIANGLE_VERTICES};
pub use swapchain::{AcquireOutcome, SurfaceStatus, SwapchainState};
