//! Swapchain lifecycle: creation, acquisition, presentation, recreation
//!
//! Owns the presentable image set: the swapchain itself, one color view per
//! image and one framebuffer per view, all bound to the fixed render pass.
//! Recreation tears the old instance down completely before building the
//! replacement; the caller must hold a device-idle barrier first.

use ash::vk;

use crate::context::VulkanContext;
use crate::error::{Error, Result};
use crate::render_debug;
use crate::render_error;

/// Presentation-engine status reported by acquire and present
///
/// `Stale` and `Suboptimal` are transient: the frame loop recovers by
/// recreating the swapchain. Any other non-success result is a fatal
/// [`Error::DeviceError`] and never reaches this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    /// Swapchain matches the surface
    Ok,
    /// Presentation succeeded but the swapchain no longer matches optimally
    Suboptimal,
    /// Swapchain no longer matches the surface; recreation required
    Stale,
}

/// Result of an image acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image index was acquired and the acquire semaphore will signal
    Acquired(u32),
    /// The swapchain is stale; no image was acquired, abandon the iteration
    Stale,
}

/// Classify an acquire result: out-of-date is recoverable, everything else
/// non-success is fatal
pub(crate) fn classify_acquire(
    result: std::result::Result<(u32, bool), vk::Result>,
) -> Result<AcquireOutcome> {
    match result {
        Ok((image_index, _suboptimal)) => Ok(AcquireOutcome::Acquired(image_index)),
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::Stale),
        Err(e) => Err(Error::DeviceError(format!(
            "Failed to acquire swapchain image: {:?}",
            e
        ))),
    }
}

/// Classify a present result the same way
pub(crate) fn classify_present(
    result: std::result::Result<bool, vk::Result>,
) -> Result<SurfaceStatus> {
    match result {
        Ok(false) => Ok(SurfaceStatus::Ok),
        Ok(true) => Ok(SurfaceStatus::Suboptimal),
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(SurfaceStatus::Stale),
        Err(e) => Err(Error::DeviceError(format!(
            "Failed to present swapchain image: {:?}",
            e
        ))),
    }
}

/// Resolve the swapchain extent from the surface capabilities
///
/// A definite `current_extent` wins; the sentinel `u32::MAX` means the
/// surface takes its size from the swapchain, so the window-size hint is
/// clamped to the reported bounds per axis.
pub(crate) fn resolve_extent(
    caps: &vk::SurfaceCapabilitiesKHR,
    hint: vk::Extent2D,
) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width: hint.width.clamp(
                caps.min_image_extent.width,
                caps.max_image_extent.width,
            ),
            height: hint.height.clamp(
                caps.min_image_extent.height,
                caps.max_image_extent.height,
            ),
        }
    }
}

/// Resolve the image count: one more than the minimum, clamped by the
/// maximum when the surface declares one (zero means unbounded)
pub(crate) fn resolve_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        count.min(caps.max_image_count)
    } else {
        count
    }
}

/// Pick the surface format: prefer 8-bit UNORM BGRA/RGBA, else the first
/// reported format
pub(crate) fn select_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_UNORM || f.format == vk::Format::R8G8B8A8_UNORM
        })
        .copied()
        .unwrap_or(formats[0])
}

/// The presentable image set and its per-image framebuffers
pub struct SwapchainState {
    device: ash::Device,
    loader: ash::khr::swapchain::Device,

    /// Fixed render pass every framebuffer is bound to
    render_pass: vk::RenderPass,
    /// Negotiated at startup, stable across recreation
    pub surface_format: vk::SurfaceFormatKHR,

    swapchain: vk::SwapchainKHR,
    image_views: Vec<vk::ImageView>,
    framebuffers: Vec<vk::Framebuffer>,
    pub extent: vk::Extent2D,
}

impl SwapchainState {
    /// Create the swapchain, views and framebuffers against the surface
    ///
    /// # Arguments
    ///
    /// * `ctx` - Device context (surface, capabilities queries)
    /// * `render_pass` - Fixed render pass the framebuffers bind to
    /// * `surface_format` - Negotiated color format
    /// * `hint` - Window size, used only when the surface reports no
    ///   definite extent
    pub fn new(
        ctx: &VulkanContext,
        render_pass: vk::RenderPass,
        surface_format: vk::SurfaceFormatKHR,
        hint: vk::Extent2D,
    ) -> Result<Self> {
        let mut state = Self {
            device: ctx.device.clone(),
            loader: ash::khr::swapchain::Device::new(&ctx.instance, &ctx.device),
            render_pass,
            surface_format,
            swapchain: vk::SwapchainKHR::null(),
            image_views: Vec::new(),
            framebuffers: Vec::new(),
            extent: vk::Extent2D::default(),
        };
        state.build(ctx, hint)?;
        Ok(state)
    }

    /// Tear down and rebuild against the (possibly resized) surface
    ///
    /// The caller must have issued a device-idle barrier: no frame may be
    /// in flight against the images being destroyed. The old framebuffers
    /// and views are fully destroyed before any replacement exists, so two
    /// swapchain instances never reference the surface concurrently.
    pub fn recreate(&mut self, ctx: &VulkanContext, hint: vk::Extent2D) -> Result<()> {
        self.destroy_parts();
        self.build(ctx, hint)
    }

    fn build(&mut self, ctx: &VulkanContext, hint: vk::Extent2D) -> Result<()> {
        let caps = ctx.surface_capabilities()?;
        let extent = resolve_extent(&caps, hint);
        let image_count = resolve_image_count(&caps);

        unsafe {
            let swapchain_create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(ctx.surface)
                .min_image_count(image_count)
                .image_format(self.surface_format.format)
                .image_color_space(self.surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(caps.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(vk::PresentModeKHR::FIFO)
                .clipped(true);

            let swapchain = self
                .loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(|e| {
                    render_error!("lumina::swapchain", "Failed to create swapchain: {:?}", e);
                    Error::SwapchainCreationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;
            self.swapchain = swapchain;
            self.extent = extent;

            let images = self.loader.get_swapchain_images(swapchain).map_err(|e| {
                render_error!("lumina::swapchain", "Failed to get swapchain images: {:?}", e);
                self.destroy_parts();
                Error::SwapchainCreationFailed(format!(
                    "Failed to get swapchain images: {:?}",
                    e
                ))
            })?;

            for &image in &images {
                let view_create_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(self.surface_format.format)
                    .components(vk::ComponentMapping {
                        r: vk::ComponentSwizzle::IDENTITY,
                        g: vk::ComponentSwizzle::IDENTITY,
                        b: vk::ComponentSwizzle::IDENTITY,
                        a: vk::ComponentSwizzle::IDENTITY,
                    })
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });

                let view = match self.device.create_image_view(&view_create_info, None) {
                    Ok(view) => view,
                    Err(e) => {
                        render_error!("lumina::swapchain", "Failed to create image view: {:?}", e);
                        self.destroy_parts();
                        return Err(Error::SwapchainCreationFailed(format!(
                            "Failed to create image view: {:?}",
                            e
                        )));
                    }
                };
                self.image_views.push(view);
            }

            for i in 0..self.image_views.len() {
                let attachments = [self.image_views[i]];
                let framebuffer_create_info = vk::FramebufferCreateInfo::default()
                    .render_pass(self.render_pass)
                    .attachments(&attachments)
                    .width(extent.width)
                    .height(extent.height)
                    .layers(1);

                let framebuffer =
                    match self.device.create_framebuffer(&framebuffer_create_info, None) {
                        Ok(framebuffer) => framebuffer,
                        Err(e) => {
                            render_error!(
                                "lumina::swapchain",
                                "Failed to create framebuffer: {:?}",
                                e
                            );
                            self.destroy_parts();
                            return Err(Error::SwapchainCreationFailed(format!(
                                "Failed to create framebuffer: {:?}",
                                e
                            )));
                        }
                    };
                self.framebuffers.push(framebuffer);
            }
        }

        render_debug!(
            "lumina::swapchain",
            "Swapchain ready: {} images at {}x{}",
            self.framebuffers.len(),
            extent.width,
            extent.height
        );
        Ok(())
    }

    /// Request the next presentable image, signaling `semaphore` when it
    /// becomes available
    pub fn acquire(&self, semaphore: vk::Semaphore) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                semaphore,
                vk::Fence::null(),
            )
        };
        classify_acquire(result)
    }

    /// Present `image_index`, gated on `wait_semaphore`
    pub fn present(
        &self,
        queue: vk::Queue,
        image_index: u32,
        wait_semaphore: vk::Semaphore,
    ) -> Result<SurfaceStatus> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [wait_semaphore];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe { self.loader.queue_present(queue, &present_info) };
        classify_present(result)
    }

    /// Framebuffer for an acquired image index
    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    /// Number of presentable images
    pub fn image_count(&self) -> usize {
        self.framebuffers.len()
    }

    /// Destruction order matters: framebuffers reference views, views
    /// reference the swapchain's images.
    fn destroy_parts(&mut self) {
        unsafe {
            for framebuffer in self.framebuffers.drain(..) {
                self.device.destroy_framebuffer(framebuffer, None);
            }
            for view in self.image_views.drain(..) {
                self.device.destroy_image_view(view, None);
            }
            if self.swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(self.swapchain, None);
                self.swapchain = vk::SwapchainKHR::null();
            }
        }
    }
}

impl Drop for SwapchainState {
    fn drop(&mut self) {
        unsafe {
            // Final teardown may race in-flight frames; recreation paths
            // have already waited, this covers process exit.
            self.device.device_wait_idle().ok();
        }
        self.destroy_parts();
    }
}

#[cfg(test)]
#[path = "swapchain_tests.rs"]
mod tests;
