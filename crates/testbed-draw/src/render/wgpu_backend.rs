//! wgpu implementation of [`GraphicsContext`].
//!
//! # Mapping
//!
//! | Graphics context op | wgpu |
//! |---------------------|------|
//! | compile shader | `create_shader_module` in a validation error scope |
//! | link program | `create_render_pipeline` + uniform buffer + bind group, in an error scope |
//! | draw | write uniform and vertices, one render pass, submit |
//!
//! Every draw records into its own encoder and is submitted before the next
//! one starts. Batches reuse a single vertex buffer per kind, and
//! `Queue::write_buffer` is ordered against submissions, so a batch that
//! auto-flushes several times in a frame never overwrites data still in use.
//!
//! wgpu has no programmable point size. Point programs therefore draw six
//! vertices per point instance and the vertex shader expands them into a
//! quad `size` pixels wide.

use std::sync::Arc;

use super::gfx::{
    AttributeFormat, BlendMode, DrawCall, GraphicsContext, ProgramLayout, ShaderStage, Topology,
};
use crate::camera::Mat4;
use crate::error::RenderError;

/// Uniform block shared by every vertex stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
struct Globals {
    projection_matrix: Mat4,
    viewport: [f32; 2],
    _pad: [f32; 2],
}

/// A compiled shader stage.
pub struct WgpuShader {
    module: wgpu::ShaderModule,
    stage: ShaderStage,
}

/// A linked program: pipeline plus its projection uniform binding.
pub struct WgpuProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    topology: Topology,
}

/// Vertex buffer sized for one batch.
pub struct WgpuBuffer {
    buffer: wgpu::Buffer,
    size: u64,
}

/// wgpu-backed graphics context.
///
/// The caller owns the device, queue and surface; this context only
/// borrows shared handles and draws into whatever view was last passed to
/// [`set_target`](Self::set_target).
pub struct WgpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    target: Option<wgpu::TextureView>,
    check_errors: bool,
}

impl WgpuContext {
    /// Create a context drawing into views of `format`.
    ///
    /// Graphics error checking defaults to on in debug builds.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            format,
            target: None,
            check_errors: cfg!(debug_assertions),
        }
    }

    /// Wrap every draw in a validation error scope.
    pub fn with_error_checks(mut self, enabled: bool) -> Self {
        self.check_errors = enabled;
        self
    }

    /// Bind the view the next draws render into.
    pub fn set_target(&mut self, view: wgpu::TextureView) {
        self.target = Some(view);
    }

    /// Unbind and return the current view.
    pub fn take_target(&mut self) -> Option<wgpu::TextureView> {
        self.target.take()
    }

    /// Clear the bound target to `color`.
    ///
    /// # Errors
    ///
    /// [`RenderError::NoTarget`] if no view is bound.
    pub fn clear(&mut self, color: wgpu::Color) -> Result<(), RenderError> {
        let view = self.target.as_ref().ok_or(RenderError::NoTarget)?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("debug_draw_clear"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("debug_draw_clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Run `f` inside a validation scope and return the captured error, if any.
    fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let error = pollster::block_on(self.device.pop_error_scope());
        (value, error)
    }
}

fn vertex_format(format: AttributeFormat) -> wgpu::VertexFormat {
    match format {
        AttributeFormat::Float32 => wgpu::VertexFormat::Float32,
        AttributeFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        AttributeFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
    }
}

fn blend_state(blend: BlendMode) -> wgpu::BlendState {
    match blend {
        BlendMode::Replace => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
    }
}

impl GraphicsContext for WgpuContext {
    type Shader = WgpuShader;
    type Program = WgpuProgram;
    type Buffer = WgpuBuffer;

    fn compile_shader(
        &mut self,
        label: &str,
        stage: ShaderStage,
        source: &str,
    ) -> Result<WgpuShader, RenderError> {
        let module_label = format!("{label} {stage}");
        let (module, error) = self.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&module_label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });

        match error {
            None => Ok(WgpuShader { module, stage }),
            Some(e) => Err(RenderError::ShaderCompile {
                label: label.to_owned(),
                stage,
                log: e.to_string(),
            }),
        }
    }

    fn link_program(
        &mut self,
        label: &str,
        vertex: WgpuShader,
        fragment: WgpuShader,
        layout: &ProgramLayout,
    ) -> Result<WgpuProgram, RenderError> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(RenderError::ShaderLink {
                label: label.to_owned(),
                log: "stages attached in the wrong slots".to_owned(),
            });
        }

        let attributes: Vec<wgpu::VertexAttribute> = layout
            .attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: vertex_format(a.format),
                offset: a.offset,
                shader_location: a.location,
            })
            .collect();

        // Points are per-instance data drawn as quads.
        let (step_mode, topology) = match layout.topology {
            Topology::Points => (
                wgpu::VertexStepMode::Instance,
                wgpu::PrimitiveTopology::TriangleList,
            ),
            Topology::Lines => (wgpu::VertexStepMode::Vertex, wgpu::PrimitiveTopology::LineList),
            Topology::Triangles => (
                wgpu::VertexStepMode::Vertex,
                wgpu::PrimitiveTopology::TriangleList,
            ),
        };

        let format = self.format;
        let ((pipeline, uniform_buffer, bind_group), error) = self.scoped(|device| {
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label} projection")),
                size: std::mem::size_of::<Globals>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{label} bind group layout")),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{label} bind group")),
                layout: &bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{label} pipeline layout")),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(ShaderStage::Vertex.entry_point()),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: layout.stride,
                        step_mode,
                        attributes: &attributes,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(ShaderStage::Fragment.entry_point()),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(blend_state(layout.blend)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

            (pipeline, uniform_buffer, bind_group)
        });

        // Stage modules are no longer needed once the pipeline exists.
        drop(vertex);
        drop(fragment);

        if let Some(e) = error {
            uniform_buffer.destroy();
            return Err(RenderError::ShaderLink {
                label: label.to_owned(),
                log: e.to_string(),
            });
        }

        Ok(WgpuProgram {
            pipeline,
            uniform_buffer,
            bind_group,
            topology: layout.topology,
        })
    }

    fn create_vertex_buffer(&mut self, label: &str, size: u64) -> Result<WgpuBuffer, RenderError> {
        let (buffer, error) = self.scoped(|device| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        match error {
            None => Ok(WgpuBuffer { buffer, size }),
            Some(e) => Err(RenderError::Graphics {
                operation: format!("create buffer '{label}'"),
                message: e.to_string(),
            }),
        }
    }

    fn draw(
        &mut self,
        program: &WgpuProgram,
        buffer: &WgpuBuffer,
        call: DrawCall<'_>,
    ) -> Result<(), RenderError> {
        let requested = call.vertices.len() as u64;
        if requested > buffer.size {
            return Err(RenderError::BufferOverflow {
                capacity: buffer.size,
                requested,
            });
        }
        let view = self.target.as_ref().ok_or(RenderError::NoTarget)?;

        if self.check_errors {
            self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        }

        let globals = Globals {
            projection_matrix: call.projection,
            viewport: call.viewport,
            _pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&program.uniform_buffer, 0, bytemuck::bytes_of(&globals));
        self.queue.write_buffer(&buffer.buffer, 0, call.vertices);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("debug_draw_flush"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("debug_draw_flush_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &program.bind_group, &[]);
            pass.set_vertex_buffer(0, buffer.buffer.slice(..requested));
            match program.topology {
                Topology::Points => pass.draw(0..6, 0..call.vertex_count),
                Topology::Lines | Topology::Triangles => pass.draw(0..call.vertex_count, 0..1),
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        if self.check_errors {
            if let Some(e) = pollster::block_on(self.device.pop_error_scope()) {
                tracing::warn!(kind = %call.kind, error = %e, "graphics error after flush");
                return Err(RenderError::Graphics {
                    operation: format!("draw {}", call.kind),
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }

    fn destroy_shader(&mut self, shader: WgpuShader) {
        drop(shader);
    }

    fn destroy_buffer(&mut self, buffer: WgpuBuffer) {
        buffer.buffer.destroy();
    }

    fn destroy_program(&mut self, program: WgpuProgram) {
        program.uniform_buffer.destroy();
    }
}
