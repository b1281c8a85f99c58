//! Frame loop driver and winit application shell
//!
//! Owns the per-iteration sequence: fence wait, image acquire, command
//! recording, submit, present, recreation decision, ring advance. The
//! swapchain is recreated when presentation reports it stale or when the
//! observed window size changed, after a device-idle barrier.

use ash::vk;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::buffer::{upload_vertex_data, GpuBuffer};
use crate::config::RendererConfig;
use crate::context::VulkanContext;
use crate::error::{Error, Result};
use crate::frame::{FrameBegin, FrameSync};
use crate::pipeline::{TrianglePipeline, TRIANGLE_VERTICES};
use crate::swapchain::{select_surface_format, SurfaceStatus, SwapchainState};
use crate::{render_debug, render_error, render_info};

/// Whether the swapchain must be rebuilt after this iteration
///
/// Two independent triggers: the presentation engine reported the chain
/// stale, or the window size no longer matches the images. A successful
/// present does not veto a resize-driven rebuild.
pub(crate) fn needs_recreation(status: SurfaceStatus, resized: bool) -> bool {
    status == SurfaceStatus::Stale || resized
}

/// A zero-area window (minimized, or collapsed by the compositor) cannot
/// back a swapchain; drawing pauses until a nonzero size arrives.
pub(crate) fn window_is_minimized(size: PhysicalSize<u32>) -> bool {
    size.width == 0 || size.height == 0
}

/// Run the renderer until the window is closed
///
/// Blocks on the platform event loop; returns the first fatal renderer
/// error, or `Ok(())` on a clean quit.
pub fn run(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| {
        render_error!("lumina::app", "Failed to create event loop: {}", e);
        Error::InitializationFailed(format!("Failed to create event loop: {}", e))
    })?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        config,
        renderer: None,
        window: None,
        minimized: false,
        failure: None,
    };

    event_loop.run_app(&mut app).map_err(|e| {
        render_error!("lumina::app", "Event loop failed: {}", e);
        Error::InitializationFailed(format!("Event loop failed: {}", e))
    })?;

    match app.failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// winit application state
///
/// `renderer` is declared before `window` so the GPU objects drop while the
/// surface's window is still alive.
struct App {
    config: RendererConfig,
    renderer: Option<FrameRenderer>,
    window: Option<Window>,
    /// While minimized no frames are drawn and the loop parks on Wait;
    /// close requests are still honored.
    minimized: bool,
    failure: Option<Error>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(e) => {
                render_error!("lumina::app", "Failed to create window: {}", e);
                self.failure = Some(Error::InitializationFailed(format!(
                    "Failed to create window: {}",
                    e
                )));
                event_loop.exit();
                return;
            }
        };

        match FrameRenderer::new(&window, &self.config) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.window = Some(window);
            }
            Err(e) => {
                render_error!("lumina::app", "Renderer initialization failed: {}", e);
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                render_info!("lumina::app", "Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.minimized = window_is_minimized(size);
                if self.minimized {
                    render_debug!("lumina::app", "Window minimized, pausing rendering");
                }
            }
            WindowEvent::RedrawRequested => {
                if self.minimized {
                    return;
                }
                if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
                    if let Err(e) = renderer.draw_frame(window) {
                        render_error!("lumina::app", "Frame failed: {}", e);
                        self.failure = Some(e);
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.minimized {
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            event_loop.set_control_flow(ControlFlow::Poll);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

/// All GPU state for the triangle renderer
///
/// Field order is teardown order: the frame ring and swapchain go first,
/// the context last.
pub(crate) struct FrameRenderer {
    frames: FrameSync,
    swapchain: SwapchainState,
    vertex_buffer: GpuBuffer,
    pipeline: TrianglePipeline,
    ctx: VulkanContext,

    clear_color: [f32; 4],
    /// Window size as of the last (re)creation, for resize detection
    last_size: PhysicalSize<u32>,
}

impl FrameRenderer {
    pub(crate) fn new(window: &Window, config: &RendererConfig) -> Result<Self> {
        let ctx = VulkanContext::new(window, config)?;

        let surface_format = select_surface_format(&ctx.surface_formats()?);

        let pipeline =
            TrianglePipeline::new(&ctx.device, surface_format.format, &config.shader_dir)?;

        let vertex_buffer = upload_vertex_data(&ctx, bytemuck::cast_slice(&TRIANGLE_VERTICES))?;

        let frames = FrameSync::new(&ctx, config.frames_in_flight)?;

        let size = window.inner_size();
        let swapchain = SwapchainState::new(
            &ctx,
            pipeline.render_pass,
            surface_format,
            vk::Extent2D {
                width: size.width,
                height: size.height,
            },
        )?;

        render_info!(
            "lumina::app",
            "Renderer ready: {} frames in flight, {} swapchain images",
            frames.frames_in_flight(),
            swapchain.image_count()
        );

        Ok(Self {
            frames,
            swapchain,
            vertex_buffer,
            pipeline,
            ctx,
            clear_color: config.clear_color,
            last_size: size,
        })
    }

    /// One frame loop iteration
    ///
    /// An acquire-stale abandons the iteration before any recording; the
    /// slot's fence stays signaled so the retry after recreation does not
    /// deadlock. The ring advances on every path.
    pub(crate) fn draw_frame(&mut self, window: &Window) -> Result<()> {
        let size = window.inner_size();
        let resized = size != self.last_size;

        match self.frames.begin_frame(&self.swapchain)? {
            FrameBegin::SwapchainStale => {
                self.recreate_swapchain(size)?;
            }
            FrameBegin::Acquired { slot, image_index } => {
                self.record_commands(slot, image_index)?;

                let status = self.frames.submit_and_present(
                    &self.swapchain,
                    self.ctx.queue,
                    slot,
                    image_index,
                )?;

                if needs_recreation(status, resized) {
                    self.recreate_swapchain(size)?;
                }
            }
        }

        self.frames.advance();
        Ok(())
    }

    fn record_commands(&self, slot: usize, image_index: u32) -> Result<()> {
        let command_buffer = self.frames.slot(slot).command_buffer;
        let extent = self.swapchain.extent;

        unsafe {
            self.ctx
                .device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| {
                    render_error!("lumina::app", "Command buffer reset failed: {:?}", e);
                    Error::DeviceError(format!("Command buffer reset failed: {:?}", e))
                })?;

            let begin_info = vk::CommandBufferBeginInfo::default();
            self.ctx
                .device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| {
                    render_error!("lumina::app", "Command buffer begin failed: {:?}", e);
                    Error::DeviceError(format!("Command buffer begin failed: {:?}", e))
                })?;

            let clear_values = [vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            }];

            let render_pass_begin = vk::RenderPassBeginInfo::default()
                .render_pass(self.pipeline.render_pass)
                .framebuffer(self.swapchain.framebuffer(image_index))
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent,
                })
                .clear_values(&clear_values);

            self.ctx.device.cmd_begin_render_pass(
                command_buffer,
                &render_pass_begin,
                vk::SubpassContents::INLINE,
            );

            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            self.ctx
                .device
                .cmd_set_viewport(command_buffer, 0, &[viewport]);

            let scissor = vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            };
            self.ctx.device.cmd_set_scissor(command_buffer, 0, &[scissor]);

            self.ctx.device.cmd_bind_pipeline(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline.pipeline,
            );

            self.ctx.device.cmd_bind_vertex_buffers(
                command_buffer,
                0,
                &[self.vertex_buffer.buffer],
                &[0],
            );

            self.ctx
                .device
                .cmd_draw(command_buffer, TRIANGLE_VERTICES.len() as u32, 1, 0, 0);

            self.ctx.device.cmd_end_render_pass(command_buffer);

            self.ctx
                .device
                .end_command_buffer(command_buffer)
                .map_err(|e| {
                    render_error!("lumina::app", "Command buffer end failed: {:?}", e);
                    Error::DeviceError(format!("Command buffer end failed: {:?}", e))
                })?;
        }

        Ok(())
    }

    fn recreate_swapchain(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        render_debug!(
            "lumina::app",
            "Recreating swapchain at {}x{}",
            size.width,
            size.height
        );

        // No frame may reference the old images during teardown.
        self.ctx.wait_idle()?;
        self.swapchain.recreate(
            &self.ctx,
            vk::Extent2D {
                width: size.width,
                height: size.height,
            },
        )?;
        self.last_size = size;
        Ok(())
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        // Let in-flight frames drain before field drops destroy their
        // objects.
        self.ctx.wait_idle().ok();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
