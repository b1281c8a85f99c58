//! Fixed render pass and triangle graphics pipeline
//!
//! Single color attachment, single subpass, clear on load, ready for
//! present on store. The pipeline uses dynamic viewport and scissor so the
//! swapchain can be resized without rebuilding pipeline state.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::fs::File;
use std::path::Path;

use crate::error::{Error, Result};
use crate::render_error;

/// Vertex layout for the fixed triangle: position + color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub(crate) fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: std::mem::size_of::<Vertex>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    pub(crate) fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 2] {
        [
            vk::VertexInputAttributeDescription {
                location: 0,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: std::mem::offset_of!(Vertex, position) as u32,
            },
            vk::VertexInputAttributeDescription {
                location: 1,
                binding: 0,
                format: vk::Format::R32G32B32A32_SFLOAT,
                offset: std::mem::offset_of!(Vertex, color) as u32,
            },
        ]
    }
}

/// The static triangle geometry, uploaded once and never mutated
pub const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex {
        position: [0.0, -0.5, 0.0],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    Vertex {
        position: [-0.5, 0.5, 0.0],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.5, 0.5, 0.0],
        color: [0.0, 0.0, 1.0, 1.0],
    },
];

/// Render pass, pipeline layout and graphics pipeline for the triangle
pub struct TrianglePipeline {
    device: ash::Device,
    pub render_pass: vk::RenderPass,
    pipeline_layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
}

impl TrianglePipeline {
    /// Build the render pass and pipeline against the negotiated surface
    /// format, loading SPIR-V from `shader_dir`
    pub fn new(
        device: &ash::Device,
        surface_format: vk::Format,
        shader_dir: &Path,
    ) -> Result<Self> {
        let render_pass = create_render_pass(device, surface_format)?;

        let vertex_shader = load_shader_module(device, &shader_dir.join("triangle.vert.spv"));
        let fragment_shader = load_shader_module(device, &shader_dir.join("triangle.frag.spv"));

        let (vertex_shader, fragment_shader) = match (vertex_shader, fragment_shader) {
            (Ok(v), Ok(f)) => (v, f),
            (v, f) => {
                unsafe {
                    if let Ok(module) = v {
                        device.destroy_shader_module(module, None);
                    }
                    if let Ok(module) = f {
                        device.destroy_shader_module(module, None);
                    }
                    device.destroy_render_pass(render_pass, None);
                }
                return Err(Error::InitializationFailed(
                    "Failed to load triangle shaders".to_string(),
                ));
            }
        };

        let result = create_pipeline(device, render_pass, vertex_shader, fragment_shader);

        // Shader modules are only needed during pipeline creation.
        unsafe {
            device.destroy_shader_module(vertex_shader, None);
            device.destroy_shader_module(fragment_shader, None);
        }

        let (pipeline_layout, pipeline) = match result {
            Ok(parts) => parts,
            Err(e) => {
                unsafe {
                    device.destroy_render_pass(render_pass, None);
                }
                return Err(e);
            }
        };

        Ok(Self {
            device: device.clone(),
            render_pass,
            pipeline_layout,
            pipeline,
        })
    }
}

impl Drop for TrianglePipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.pipeline_layout, None);
            self.device.destroy_render_pass(self.render_pass, None);
        }
    }
}

fn create_render_pass(device: &ash::Device, format: vk::Format) -> Result<vk::RenderPass> {
    let attachments = [vk::AttachmentDescription::default()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)];

    let color_attachments = [vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];

    let subpasses = [vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_attachments)];

    let render_pass_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses);

    unsafe {
        device.create_render_pass(&render_pass_info, None).map_err(|e| {
            render_error!("lumina::pipeline", "Failed to create render pass: {:?}", e);
            Error::InitializationFailed(format!("Failed to create render pass: {:?}", e))
        })
    }
}

/// Read a compiled SPIR-V file and wrap it in a shader module
///
/// Shaders are compiled offline:
/// `glslangValidator shaders/triangle.vert -V -o shaders/triangle.vert.spv`
fn load_shader_module(device: &ash::Device, path: &Path) -> Result<vk::ShaderModule> {
    let mut file = File::open(path).map_err(|e| {
        render_error!(
            "lumina::pipeline",
            "Failed to open shader {}: {}",
            path.display(),
            e
        );
        Error::InitializationFailed(format!("Failed to open shader {}: {}", path.display(), e))
    })?;

    let code = ash::util::read_spv(&mut file).map_err(|e| {
        render_error!(
            "lumina::pipeline",
            "Failed to read SPIR-V {}: {}",
            path.display(),
            e
        );
        Error::InitializationFailed(format!("Failed to read SPIR-V {}: {}", path.display(), e))
    })?;

    let create_info = vk::ShaderModuleCreateInfo::default().code(&code);

    unsafe {
        device.create_shader_module(&create_info, None).map_err(|e| {
            render_error!("lumina::pipeline", "Failed to create shader module: {:?}", e);
            Error::InitializationFailed(format!("Failed to create shader module: {:?}", e))
        })
    }
}

fn create_pipeline(
    device: &ash::Device,
    render_pass: vk::RenderPass,
    vertex_shader: vk::ShaderModule,
    fragment_shader: vk::ShaderModule,
) -> Result<(vk::PipelineLayout, vk::Pipeline)> {
    unsafe {
        let layout_info = vk::PipelineLayoutCreateInfo::default();
        let pipeline_layout = device.create_pipeline_layout(&layout_info, None).map_err(|e| {
            render_error!("lumina::pipeline", "Failed to create pipeline layout: {:?}", e);
            Error::InitializationFailed(format!("Failed to create pipeline layout: {:?}", e))
        })?;

        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex_shader)
                .name(c"main"),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment_shader)
                .name(c"main"),
        ];

        let vertex_bindings = [Vertex::binding_description()];
        let vertex_attributes = Vertex::attribute_descriptions();

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST);

        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .line_width(1.0);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)];

        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .attachments(&color_blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(pipeline_layout)
            .render_pass(render_pass)
            .subpass(0);

        let pipeline = match device.create_graphics_pipelines(
            vk::PipelineCache::null(),
            &[pipeline_info],
            None,
        ) {
            Ok(pipelines) => pipelines[0],
            Err((_, e)) => {
                render_error!("lumina::pipeline", "Failed to create graphics pipeline: {:?}", e);
                device.destroy_pipeline_layout(pipeline_layout, None);
                return Err(Error::InitializationFailed(format!(
                    "Failed to create graphics pipeline: {:?}",
                    e
                )));
            }
        };

        Ok((pipeline_layout, pipeline))
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
