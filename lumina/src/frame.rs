//! Per-frame CPU/GPU synchronization: the frames-in-flight ring
//!
//! Each slot owns an acquire semaphore (image available), a release
//! semaphore (rendering finished, consumed by present), a completion fence
//! and a reusable primary command buffer. The fence is the ownership
//! handoff: between fence-wait and submit the CPU owns the command buffer;
//! between submit and the next fence-wait the GPU does. Waiting is
//! unbounded; a GPU that never drains is fatal, not recoverable.

use ash::vk;

use crate::context::VulkanContext;
use crate::error::{Error, Result};
use crate::render_error;
use crate::swapchain::{AcquireOutcome, SurfaceStatus, SwapchainState};

/// Outcome of [`FrameSync::begin_frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBegin {
    /// Slot fence waited, image acquired; the slot's command buffer may be
    /// re-recorded
    Acquired { slot: usize, image_index: u32 },
    /// Acquisition reported a stale swapchain. The slot's fence was NOT
    /// reset (it stays signaled, so the next wait is a no-op) and the
    /// iteration must be abandoned.
    SwapchainStale,
}

/// CPU-side bookkeeping for the slot ring, separate from the GPU objects
///
/// Tracks which slots have work submitted whose fence has not yet been
/// observed signaled, and enforces that a command buffer is only handed out
/// for re-recording after that observation.
#[derive(Debug)]
pub(crate) struct SlotTracker {
    in_flight: Vec<bool>,
    current: usize,
}

impl SlotTracker {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            in_flight: vec![false; count],
            current: 0,
        }
    }

    /// Index of the slot this iteration uses
    pub(crate) fn current(&self) -> usize {
        self.current
    }

    /// The slot's fence has been observed signaled; its command buffer may
    /// be reused
    pub(crate) fn fence_observed(&mut self, slot: usize) {
        self.in_flight[slot] = false;
    }

    /// Work for the slot was submitted with its fence attached
    ///
    /// A slot may only be submitted after its previous fence signal was
    /// observed; violating that races the CPU against in-flight GPU reads.
    pub(crate) fn submitted(&mut self, slot: usize) {
        debug_assert!(
            !self.in_flight[slot],
            "slot {} resubmitted before its fence was observed",
            slot
        );
        self.in_flight[slot] = true;
    }

    /// Whether the slot's command buffer may be re-recorded
    pub(crate) fn can_record(&self, slot: usize) -> bool {
        !self.in_flight[slot]
    }

    /// Number of slots with unobserved submissions; never exceeds the ring
    /// size
    pub(crate) fn in_flight_count(&self) -> usize {
        self.in_flight.iter().filter(|f| **f).count()
    }

    /// Advance the ring, exactly once per iteration (including iterations
    /// abandoned after a stale acquire)
    pub(crate) fn advance(&mut self) {
        self.current = (self.current + 1) % self.in_flight.len();
    }
}

/// One element of the frames-in-flight ring
pub struct FrameSlot {
    pub acquire_semaphore: vk::Semaphore,
    pub release_semaphore: vk::Semaphore,
    pub fence: vk::Fence,
    pub command_buffer: vk::CommandBuffer,
}

/// Fixed ring of frame slots plus the ring cursor
///
/// Created once at startup; slots live for the process lifetime and are
/// cycled round-robin.
pub struct FrameSync {
    device: ash::Device,
    slots: Vec<FrameSlot>,
    tracker: SlotTracker,
}

impl FrameSync {
    /// Create `frames_in_flight` slots (fences start signaled so the first
    /// wait on each slot is a no-op)
    pub fn new(ctx: &VulkanContext, frames_in_flight: usize) -> Result<Self> {
        if frames_in_flight == 0 {
            render_error!("lumina::frame", "frames_in_flight must be at least 1");
            return Err(Error::InitializationFailed(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }

        unsafe {
            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(ctx.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(frames_in_flight as u32);

            let command_buffers = ctx.device.allocate_command_buffers(&alloc_info).map_err(|e| {
                render_error!("lumina::frame", "Failed to allocate command buffers: {:?}", e);
                Error::InitializationFailed(format!(
                    "Failed to allocate command buffers: {:?}",
                    e
                ))
            })?;

            let semaphore_create_info = vk::SemaphoreCreateInfo::default();
            let fence_create_info =
                vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

            let mut slots = Vec::with_capacity(frames_in_flight);
            for &command_buffer in &command_buffers {
                let acquire_semaphore = ctx
                    .device
                    .create_semaphore(&semaphore_create_info, None)
                    .map_err(|e| {
                        render_error!("lumina::frame", "Failed to create semaphore: {:?}", e);
                        Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                    })?;
                let release_semaphore = ctx
                    .device
                    .create_semaphore(&semaphore_create_info, None)
                    .map_err(|e| {
                        render_error!("lumina::frame", "Failed to create semaphore: {:?}", e);
                        Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                    })?;
                let fence = ctx
                    .device
                    .create_fence(&fence_create_info, None)
                    .map_err(|e| {
                        render_error!("lumina::frame", "Failed to create fence: {:?}", e);
                        Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
                    })?;

                slots.push(FrameSlot {
                    acquire_semaphore,
                    release_semaphore,
                    fence,
                    command_buffer,
                });
            }

            Ok(Self {
                device: ctx.device.clone(),
                slots,
                tracker: SlotTracker::new(frames_in_flight),
            })
        }
    }

    /// The slot at `index`
    pub fn slot(&self, index: usize) -> &FrameSlot {
        &self.slots[index]
    }

    /// Number of slots in the ring
    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Wait for the current slot, then acquire the next presentable image
    ///
    /// The fence wait is the sole steady-state backpressure: it suspends
    /// the CPU until the GPU has drained the oldest in-flight frame. On a
    /// stale swapchain the fence is left signaled and no image is acquired.
    pub fn begin_frame(&mut self, swapchain: &SwapchainState) -> Result<FrameBegin> {
        let slot = self.tracker.current();
        let fence = self.slots[slot].fence;

        unsafe {
            self.device
                .wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| {
                    render_error!("lumina::frame", "Fence wait failed: {:?}", e);
                    Error::DeviceError(format!("Fence wait failed: {:?}", e))
                })?;
        }
        self.tracker.fence_observed(slot);

        match swapchain.acquire(self.slots[slot].acquire_semaphore)? {
            AcquireOutcome::Stale => Ok(FrameBegin::SwapchainStale),
            AcquireOutcome::Acquired(image_index) => {
                unsafe {
                    // The fence now belongs to the upcoming submission.
                    self.device.reset_fences(&[fence]).map_err(|e| {
                        render_error!("lumina::frame", "Fence reset failed: {:?}", e);
                        Error::DeviceError(format!("Fence reset failed: {:?}", e))
                    })?;
                }
                debug_assert!(self.tracker.can_record(slot));
                Ok(FrameBegin::Acquired { slot, image_index })
            }
        }
    }

    /// Submit the slot's recorded commands and present the image
    ///
    /// The submission waits on the acquire semaphore at the
    /// color-attachment-output stage only, letting vertex work start before
    /// the image is actually available, and signals the release semaphore
    /// plus the slot fence. Present is gated on the release semaphore. The
    /// returned status feeds the driver's recreation decision.
    pub fn submit_and_present(
        &mut self,
        swapchain: &SwapchainState,
        queue: vk::Queue,
        slot: usize,
        image_index: u32,
    ) -> Result<SurfaceStatus> {
        let frame = &self.slots[slot];

        let wait_semaphores = [frame.acquire_semaphore];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [frame.command_buffer];
        let signal_semaphores = [frame.release_semaphore];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .queue_submit(queue, &[submit_info], frame.fence)
                .map_err(|e| {
                    render_error!("lumina::frame", "Queue submit failed: {:?}", e);
                    Error::DeviceError(format!("Queue submit failed: {:?}", e))
                })?;
        }
        self.tracker.submitted(slot);

        swapchain.present(queue, image_index, self.slots[slot].release_semaphore)
    }

    /// Advance the ring cursor; call exactly once per iteration
    pub fn advance(&mut self) {
        self.tracker.advance();
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        unsafe {
            // Command buffers are freed with the pool by VulkanContext.
            for slot in &self.slots {
                self.device.destroy_semaphore(slot.acquire_semaphore, None);
                self.device.destroy_semaphore(slot.release_semaphore, None);
                self.device.destroy_fence(slot.fence, None);
            }
        }
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
