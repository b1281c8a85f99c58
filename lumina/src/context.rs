//! VulkanContext - instance, device, and queue bring-up
//!
//! Owns every long-lived device-level object that is not part of the
//! swapchain or the per-frame synchronization ring: entry, instance,
//! optional debug messenger, surface, physical device, logical device,
//! the combined graphics+present queue, the memory-type catalog snapshot
//! and the command pool the frame ring allocates from.

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::config::RendererConfig;
use crate::error::{Error, Result};
use crate::render_error;
use crate::render_info;

/// Shared GPU context for the presentation pipeline
///
/// Constructed once at startup and passed by reference to every component;
/// no ambient globals.
pub struct VulkanContext {
    pub entry: ash::Entry,
    pub instance: ash::Instance,

    /// Debug utils loader + messenger (only when validation is enabled)
    debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,

    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,

    pub physical_device: vk::PhysicalDevice,

    /// Memory-type capability catalog, snapshot at device selection time
    pub memory_props: vk::PhysicalDeviceMemoryProperties,

    pub device: ash::Device,

    /// Combined graphics + present queue family
    pub queue_family_index: u32,
    pub queue: vk::Queue,

    /// Command pool for the frame ring and one-shot uploads
    /// (RESET_COMMAND_BUFFER so per-frame buffers can be re-recorded)
    pub command_pool: vk::CommandPool,
}

impl VulkanContext {
    /// Create the full device context against a window surface
    ///
    /// # Arguments
    ///
    /// * `window` - Window providing display/window handles for the surface
    /// * `config` - Renderer configuration (validation switch)
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: &RendererConfig,
    ) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                render_error!("lumina::context", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            let app_info = vk::ApplicationInfo::default()
                .application_name(c"Lumina Application")
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Lumina")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_0);

            let display_handle = window.display_handle().map_err(|e| {
                render_error!("lumina::context", "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let window_handle = window.window_handle().map_err(|e| {
                render_error!("lumina::context", "Failed to get window handle: {}", e);
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;

            let mut extension_names =
                ash_window::enumerate_required_extensions(display_handle.as_raw())
                    .map_err(|e| {
                        render_error!("lumina::context", "Failed to get required extensions: {}", e);
                        Error::InitializationFailed(format!(
                            "Failed to get required extensions: {}",
                            e
                        ))
                    })?
                    .to_vec();

            if config.enable_validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            let layer_names = if config.enable_validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                render_error!("lumina::context", "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            let debug_utils = if config.enable_validation {
                let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);

                let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                    .message_severity(
                        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                            | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                    )
                    .message_type(
                        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                    )
                    .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

                let messenger = loader
                    .create_debug_utils_messenger(&debug_info, None)
                    .map_err(|e| {
                        render_error!(
                            "lumina::context",
                            "Failed to create debug messenger: {:?}",
                            e
                        );
                        Error::InitializationFailed(format!(
                            "Failed to create debug messenger: {:?}",
                            e
                        ))
                    })?;

                Some((loader, messenger))
            } else {
                None
            };

            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                render_error!("lumina::context", "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let (physical_device, queue_family_index) =
                select_physical_device(&instance, &surface_loader, surface)?;

            let memory_props = instance.get_physical_device_memory_properties(physical_device);

            // Create logical device with a single graphics+present queue
            let queue_priorities = [1.0];
            let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_family_index)
                .queue_priorities(&queue_priorities)];

            let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
            let device_features = vk::PhysicalDeviceFeatures::default();

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    render_error!("lumina::context", "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let queue = device.get_device_queue(queue_family_index, 0);

            let pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(queue_family_index)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = device
                .create_command_pool(&pool_create_info, None)
                .map_err(|e| {
                    render_error!("lumina::context", "Failed to create command pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
                })?;

            render_info!(
                "lumina::context",
                "Vulkan device ready (queue family {})",
                queue_family_index
            );

            Ok(Self {
                entry,
                instance,
                debug_utils,
                surface,
                surface_loader,
                physical_device,
                memory_props,
                device,
                queue_family_index,
                queue,
                command_pool,
            })
        }
    }

    /// Device-idle barrier: blocks until all submitted GPU work completes
    ///
    /// Required before destroying resources that may still be in use
    /// (swapchain recreation, final teardown).
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle().map_err(|e| {
                render_error!("lumina::context", "Device wait-idle failed: {:?}", e);
                Error::DeviceError(format!("Device wait-idle failed: {:?}", e))
            })
        }
    }

    /// Query the current surface capabilities (extent bounds, image counts)
    pub fn surface_capabilities(&self) -> Result<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| {
                    render_error!(
                        "lumina::context",
                        "Failed to get surface capabilities: {:?}",
                        e
                    );
                    Error::SwapchainCreationFailed(format!(
                        "Failed to get surface capabilities: {:?}",
                        e
                    ))
                })
        }
    }

    /// Query the supported surface formats
    pub fn surface_formats(&self) -> Result<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
                .map_err(|e| {
                    render_error!("lumina::context", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to get surface formats: {:?}",
                        e
                    ))
                })
        }
    }
}

/// Pick the first physical device with a queue family that both supports
/// graphics and can present to the surface
fn select_physical_device(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<(vk::PhysicalDevice, u32)> {
    unsafe {
        let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
            render_error!(
                "lumina::context",
                "Failed to enumerate physical devices: {:?}",
                e
            );
            Error::InitializationFailed(format!(
                "Failed to enumerate physical devices: {:?}",
                e
            ))
        })?;

        for physical_device in physical_devices {
            let queue_families =
                instance.get_physical_device_queue_family_properties(physical_device);

            for (index, family) in queue_families.iter().enumerate() {
                if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                    continue;
                }

                let present_support = surface_loader
                    .get_physical_device_surface_support(
                        physical_device,
                        index as u32,
                        surface,
                    )
                    .unwrap_or(false);

                if present_support {
                    return Ok((physical_device, index as u32));
                }
            }
        }

        render_error!("lumina::context", "No Vulkan device with a graphics+present queue found");
        Err(Error::InitializationFailed(
            "No Vulkan device with a graphics+present queue found".to_string(),
        ))
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_command_pool(self.command_pool, None);
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            if let Some((loader, messenger)) = self.debug_utils.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}
