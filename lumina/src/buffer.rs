//! GPU buffer allocation and the one-time vertex upload
//!
//! Backing memory is selected by a linear scan of the device's memory-type
//! catalog: the first type whose capability flags are a superset of the
//! requested visibility and whose bit is allowed by the buffer's memory
//! requirements wins. Allocation is bound at offset 0; one allocation per
//! buffer. This is one-time setup, not a general-purpose allocator.

use ash::vk;

use crate::context::VulkanContext;
use crate::error::{Error, Result};
use crate::render_debug;
use crate::render_error;

/// A GPU buffer plus its backing device memory
///
/// Destroys both on drop; the device handle is a cheap clone of the
/// function table.
pub struct GpuBuffer {
    device: ash::Device,
    pub buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
}

/// Scan the memory catalog for the first type that is allowed by
/// `type_bits` and whose property flags contain all of `required`
pub(crate) fn find_memory_type(
    catalog: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    required: vk::MemoryPropertyFlags,
) -> Option<u32> {
    (0..catalog.memory_type_count).find(|&i| {
        let allowed = type_bits & (1 << i) != 0;
        let flags = catalog.memory_types[i as usize].property_flags;
        allowed && flags.contains(required)
    })
}

impl GpuBuffer {
    /// Create a buffer and bind freshly allocated memory to it
    ///
    /// # Arguments
    ///
    /// * `device` - Logical device
    /// * `catalog` - Memory-type capability catalog from the physical device
    /// * `size` - Requested byte size (must be nonzero; the true allocation
    ///   may be larger due to alignment)
    /// * `usage` - Buffer usage flags (transfer src/dst, vertex input)
    /// * `required` - Memory visibility the backing allocation must satisfy
    pub fn new(
        device: &ash::Device,
        catalog: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        required: vk::MemoryPropertyFlags,
    ) -> Result<Self> {
        if size == 0 {
            render_error!("lumina::buffer", "Refusing to create zero-sized buffer");
            return Err(Error::AllocationFailed("zero-sized buffer".to_string()));
        }

        unsafe {
            let buffer_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = device.create_buffer(&buffer_info, None).map_err(|e| {
                render_error!("lumina::buffer", "Failed to create buffer: {:?}", e);
                Error::AllocationFailed(format!("Failed to create buffer: {:?}", e))
            })?;

            let requirements = device.get_buffer_memory_requirements(buffer);

            let memory_type_index = match find_memory_type(
                catalog,
                requirements.memory_type_bits,
                required,
            ) {
                Some(index) => index,
                None => {
                    render_error!(
                        "lumina::buffer",
                        "No memory type satisfies {:?} within mask {:#x}",
                        required,
                        requirements.memory_type_bits
                    );
                    device.destroy_buffer(buffer, None);
                    return Err(Error::NoCompatibleMemoryType);
                }
            };

            let allocate_info = vk::MemoryAllocateInfo::default()
                .allocation_size(requirements.size)
                .memory_type_index(memory_type_index);

            let memory = match device.allocate_memory(&allocate_info, None) {
                Ok(memory) => memory,
                Err(e) => {
                    render_error!("lumina::buffer", "Failed to allocate {} bytes: {:?}", requirements.size, e);
                    device.destroy_buffer(buffer, None);
                    return Err(Error::AllocationFailed(format!(
                        "Failed to allocate memory: {:?}",
                        e
                    )));
                }
            };

            if let Err(e) = device.bind_buffer_memory(buffer, memory, 0) {
                render_error!("lumina::buffer", "Failed to bind buffer memory: {:?}", e);
                device.free_memory(memory, None);
                device.destroy_buffer(buffer, None);
                return Err(Error::AllocationFailed(format!(
                    "Failed to bind buffer memory: {:?}",
                    e
                )));
            }

            Ok(Self {
                device: device.clone(),
                buffer,
                memory,
                size,
            })
        }
    }

    /// Map the backing memory, copy `data` into it, and unmap
    ///
    /// Only valid on host-visible buffers.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        unsafe {
            let mapped = self
                .device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .map_err(|e| {
                    render_error!("lumina::buffer", "Failed to map buffer memory: {:?}", e);
                    Error::AllocationFailed(format!("Failed to map memory: {:?}", e))
                })?;

            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped as *mut u8, data.len());

            self.device.unmap_memory(self.memory);
            Ok(())
        }
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// One-time synchronous upload of static vertex data
///
/// Stages through a host-visible buffer, records a single copy into a
/// scratch command buffer, submits it and blocks until the queue drains.
/// The staging buffer is destroyed before returning; the device-local
/// buffer lives for the process lifetime and never receives another write.
/// Intentionally synchronous: it runs once before the frame loop starts.
pub fn upload_vertex_data(ctx: &VulkanContext, data: &[u8]) -> Result<GpuBuffer> {
    let size = data.len() as vk::DeviceSize;

    let staging = GpuBuffer::new(
        &ctx.device,
        &ctx.memory_props,
        size,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    )?;
    staging.write(data)?;

    let vertex_buffer = GpuBuffer::new(
        &ctx.device,
        &ctx.memory_props,
        size,
        vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
    )?;

    unsafe {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(ctx.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let command_buffers = ctx.device.allocate_command_buffers(&alloc_info).map_err(|e| {
            render_error!("lumina::buffer", "Failed to allocate upload command buffer: {:?}", e);
            Error::InitializationFailed(format!(
                "Failed to allocate upload command buffer: {:?}",
                e
            ))
        })?;
        let command_buffer = command_buffers[0];

        let upload = (|| -> Result<()> {
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            ctx.device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to begin upload: {:?}", e))
                })?;

            let region = vk::BufferCopy::default().size(size);
            ctx.device
                .cmd_copy_buffer(command_buffer, staging.buffer, vertex_buffer.buffer, &[region]);

            ctx.device.end_command_buffer(command_buffer).map_err(|e| {
                Error::InitializationFailed(format!("Failed to end upload: {:?}", e))
            })?;

            let command_buffers = [command_buffer];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

            ctx.device
                .queue_submit(ctx.queue, &[submit_info], vk::Fence::null())
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to submit upload: {:?}", e))
                })?;

            // Setup-only blocking point: the staging buffer may not be
            // destroyed while the copy is in flight.
            ctx.device.queue_wait_idle(ctx.queue).map_err(|e| {
                Error::InitializationFailed(format!("Upload wait-idle failed: {:?}", e))
            })?;

            Ok(())
        })();

        ctx.device
            .free_command_buffers(ctx.command_pool, &command_buffers);

        if let Err(e) = upload {
            render_error!("lumina::buffer", "Vertex upload failed: {}", e);
            return Err(e);
        }
    }

    render_debug!("lumina::buffer", "Uploaded {} bytes of vertex data", data.len());
    Ok(vertex_buffer)
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
