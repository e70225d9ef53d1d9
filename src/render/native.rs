use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Zeroable};
use log::{error, info, warn};
use wgpu::util::DeviceExt;
use winit::window::{Window, WindowId};

use super::validate::{self, StageInterface};
use super::{
    BufferHandle, BufferKind, DrawUniforms, GraphicsDevice, HandleAllocator, IndexFormat,
    LightUniforms, MaterialUniforms, ObjectUniforms, PrimitiveKind, ProgramHandle, ShaderHandle,
    ShaderStage, VertexArrayHandle, VertexLayout,
};
use crate::error::{ViewerError, ViewerResult};

/// [`GraphicsDevice`] on a wgpu surface.
///
/// Draws issued between `begin_frame` and `end_frame` are queued and replayed
/// into a single render pass when the frame ends. Pipelines are created on
/// first use per program, vertex layout, primitive and restart setting.
/// Uniforms of every queued draw are packed into one reused buffer and
/// selected with dynamic offsets.
pub struct WgpuDevice {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    surface_ready: bool,
    depth: DepthBuffer,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    offsets: UniformOffsets,
    arena: Option<UniformArena>,
    handles: HandleAllocator,
    shaders: HashMap<ShaderHandle, ShaderObject>,
    programs: HashMap<ProgramHandle, ProgramObject>,
    buffers: HashMap<BufferHandle, wgpu::Buffer>,
    vertex_arrays: HashMap<VertexArrayHandle, VertexLayout>,
    pipelines: HashMap<PipelineKey, Option<wgpu::RenderPipeline>>,
    program: Option<ProgramHandle>,
    vertex_array: Option<VertexArrayHandle>,
    uniforms: DrawUniforms,
    restart: Option<u32>,
    clear_color: wgpu::Color,
    in_frame: bool,
    pending: Vec<PendingDraw>,
}

struct ShaderObject {
    stage: ShaderStage,
    label: String,
    compiled: Option<(StageInterface, Rc<wgpu::ShaderModule>)>,
}

struct ProgramObject {
    label: String,
    attached: Vec<ShaderHandle>,
    linked: Option<LinkedProgram>,
}

struct LinkedProgram {
    vertex: Rc<wgpu::ShaderModule>,
    vertex_entry: String,
    fragment: Rc<wgpu::ShaderModule>,
    fragment_entry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramHandle,
    vertex_array: VertexArrayHandle,
    primitive: PrimitiveKind,
    restart: bool,
}

struct PendingDraw {
    key: PipelineKey,
    count: u32,
    uniforms: DrawUniforms,
}

/// Uniform buffer holding `slots` per-draw sections, `stride` bytes apart.
struct UniformArena {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    slots: u64,
}

impl WgpuDevice {
    const MIN_UNIFORM_SLOTS: u64 = 16;

    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("viewer-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw-uniform-layout"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<ObjectUniforms>()),
                uniform_entry(1, std::mem::size_of::<MaterialUniforms>()),
                uniform_entry(2, std::mem::size_of::<LightUniforms>()),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("viewer-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let offsets =
            UniformOffsets::new(u64::from(device.limits().min_uniform_buffer_offset_alignment));

        info!(
            "wgpu device ready: {:?} {}x{}",
            surface_format, config.width, config.height
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            surface_ready: true,
            depth,
            uniform_layout,
            pipeline_layout,
            offsets,
            arena: None,
            handles: HandleAllocator::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            pipelines: HashMap::new(),
            program: None,
            vertex_array: None,
            uniforms: DrawUniforms::object(ObjectUniforms::zeroed()),
            restart: None,
            clear_color: wgpu::Color::BLACK,
            in_frame: false,
            pending: Vec::new(),
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Runs `create` inside an error scope and waits for the scope's verdict.
    fn scoped<T>(
        &self,
        filter: wgpu::ErrorFilter,
        create: impl FnOnce(&wgpu::Device) -> T,
    ) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(filter);
        let value = create(&self.device);
        let error = pollster::block_on(self.device.pop_error_scope());
        (value, error)
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) -> bool {
        if let Some(pipeline) = self.pipelines.get(&key) {
            return pipeline.is_some();
        }
        let pipeline = self.create_pipeline(&key);
        let ready = pipeline.is_some();
        self.pipelines.insert(key, pipeline);
        ready
    }

    fn create_pipeline(&self, key: &PipelineKey) -> Option<wgpu::RenderPipeline> {
        let program = self.programs.get(&key.program)?;
        let linked = program.linked.as_ref()?;
        let layout = self.vertex_arrays.get(&key.vertex_array)?;

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = layout
            .attributes
            .iter()
            .map(|attribute| {
                [wgpu::VertexAttribute {
                    format: vertex_format(attribute.components),
                    offset: 0,
                    shader_location: attribute.location,
                }]
            })
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = layout
            .attributes
            .iter()
            .zip(&attributes)
            .map(|(attribute, formats)| wgpu::VertexBufferLayout {
                array_stride: attribute.stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: formats,
            })
            .collect();

        let strip_index_format = match layout.index {
            Some((_, format)) if key.restart && key.primitive.is_strip() => {
                Some(index_format(format))
            }
            _ => None,
        };

        let (pipeline, failure) = self.scoped(wgpu::ErrorFilter::Validation, |device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&program.label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &linked.vertex,
                    entry_point: Some(&linked.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },
                primitive: wgpu::PrimitiveState {
                    topology: topology(key.primitive),
                    strip_index_format,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthBuffer::FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &linked.fragment,
                    entry_point: Some(&linked.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            })
        });
        match failure {
            Some(err) => {
                error!("pipeline for `{}` rejected: {err}", program.label);
                None
            }
            None => Some(pipeline),
        }
    }

    /// Grows the uniform arena to hold at least `slots` draws. The buffer and
    /// bind group are only recreated when it grows.
    fn reserve_uniform_slots(&mut self, slots: u64) {
        if self.arena.as_ref().is_some_and(|arena| arena.slots >= slots) {
            return;
        }
        let slots = slots.next_power_of_two().max(Self::MIN_UNIFORM_SLOTS);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw-uniforms"),
            size: self.offsets.stride * slots,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-uniform-bind-group"),
            layout: &self.uniform_layout,
            entries: &[
                uniform_binding(&buffer, 0, 0, std::mem::size_of::<ObjectUniforms>()),
                uniform_binding(
                    &buffer,
                    1,
                    self.offsets.material,
                    std::mem::size_of::<MaterialUniforms>(),
                ),
                uniform_binding(
                    &buffer,
                    2,
                    self.offsets.light,
                    std::mem::size_of::<LightUniforms>(),
                ),
            ],
        });
        self.arena = Some(UniformArena {
            buffer,
            bind_group,
            slots,
        });
    }

    fn pack_uniforms(&self, draws: &[PendingDraw]) -> Vec<u8> {
        let stride = self.offsets.stride;
        let mut contents = vec![0u8; (stride * draws.len() as u64) as usize];
        for (slot, draw) in draws.iter().enumerate() {
            let base = stride * slot as u64;
            write_at(&mut contents, base, bytes_of(&draw.uniforms.object));
            write_at(
                &mut contents,
                base + self.offsets.material,
                bytes_of(&draw.uniforms.material),
            );
            write_at(
                &mut contents,
                base + self.offsets.light,
                bytes_of(&draw.uniforms.light),
            );
        }
        contents
    }
}

impl GraphicsDevice for WgpuDevice {
    fn create_shader(&mut self, stage: ShaderStage, label: &str) -> ShaderHandle {
        let shader = ShaderHandle::from_raw(self.handles.next());
        self.shaders.insert(
            shader,
            ShaderObject {
                stage,
                label: label.to_string(),
                compiled: None,
            },
        );
        shader
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<(), String> {
        let Some(object) = self.shaders.get(&shader) else {
            return Err(format!("shader {} does not exist", shader.raw()));
        };
        let interface = validate::compile_wgsl(source, object.stage)?;
        let (module, failure) = self.scoped(wgpu::ErrorFilter::Validation, |device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&object.label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });
        if let Some(err) = failure {
            return Err(err.to_string());
        }
        if let Some(object) = self.shaders.get_mut(&shader) {
            object.compiled = Some((interface, Rc::new(module)));
        }
        Ok(())
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
    }

    fn create_program(&mut self, label: &str) -> ProgramHandle {
        let program = ProgramHandle::from_raw(self.handles.next());
        self.programs.insert(
            program,
            ProgramObject {
                label: label.to_string(),
                attached: Vec::new(),
                linked: None,
            },
        );
        program
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if let Some(object) = self.programs.get_mut(&program) {
            object.attached.push(shader);
        }
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String> {
        let Some(object) = self.programs.get(&program) else {
            return Err(format!("program {} does not exist", program.raw()));
        };
        let mut compiled = Vec::with_capacity(object.attached.len());
        for shader in &object.attached {
            match self.shaders.get(shader) {
                Some(ShaderObject {
                    compiled: Some((interface, module)),
                    ..
                }) => compiled.push((interface, module)),
                Some(stage) => return Err(format!("stage `{}` is not compiled", stage.label)),
                None => return Err(format!("shader {} does not exist", shader.raw())),
            }
        }
        let interfaces: Vec<&StageInterface> = compiled.iter().map(|(i, _)| *i).collect();
        let stages = validate::check_link(&interfaces)?;
        let (vertex_interface, vertex) = compiled[stages.vertex];
        let (fragment_interface, fragment) = compiled[stages.fragment];
        let linked = LinkedProgram {
            vertex: Rc::clone(vertex),
            vertex_entry: vertex_interface.entry_point.clone(),
            fragment: Rc::clone(fragment),
            fragment_entry: fragment_interface.entry_point.clone(),
        };
        if let Some(object) = self.programs.get_mut(&program) {
            object.linked = Some(linked);
        }
        self.pipelines.retain(|key, _| key.program != program);
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.pipelines.retain(|key, _| key.program != program);
        if self.program == Some(program) {
            self.program = None;
        }
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        contents: &[u8],
        label: &str,
    ) -> ViewerResult<BufferHandle> {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        let (buffer, failure) = self.scoped(wgpu::ErrorFilter::OutOfMemory, |device| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
        });
        if let Some(err) = failure {
            return Err(ViewerError::exhausted(format!("buffer `{label}`"), err.to_string()));
        }
        let handle = BufferHandle::from_raw(self.handles.next());
        self.buffers.insert(handle, buffer);
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(buffer) = self.buffers.remove(&buffer) {
            buffer.destroy();
        }
    }

    fn create_vertex_array(
        &mut self,
        layout: VertexLayout,
        label: &str,
    ) -> ViewerResult<VertexArrayHandle> {
        let missing = layout
            .attributes
            .iter()
            .map(|attribute| attribute.buffer)
            .chain(layout.index.map(|(buffer, _)| buffer))
            .find(|buffer| !self.buffers.contains_key(buffer));
        if let Some(buffer) = missing {
            return Err(ViewerError::invalid_geometry(
                label,
                format!("buffer {} does not exist", buffer.raw()),
            ));
        }
        let handle = VertexArrayHandle::from_raw(self.handles.next());
        self.vertex_arrays.insert(handle, layout);
        Ok(handle)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.vertex_arrays.remove(&vertex_array);
        self.pipelines.retain(|key, _| key.vertex_array != vertex_array);
        if self.vertex_array == Some(vertex_array) {
            self.vertex_array = None;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            self.surface_ready = false;
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, width, height);
        self.surface_ready = true;
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        let [r, g, b, a] = clear_color.map(f64::from);
        self.clear_color = wgpu::Color { r, g, b, a };
        self.pending.clear();
        self.in_frame = true;
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.program = program;
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.vertex_array = vertex_array;
    }

    fn set_uniforms(&mut self, uniforms: &DrawUniforms) {
        self.uniforms = *uniforms;
    }

    fn set_primitive_restart(&mut self, restart_index: Option<u32>) {
        self.restart = restart_index;
    }

    fn draw(&mut self, primitive: PrimitiveKind, count: u32) {
        if !self.in_frame {
            warn!("draw issued outside a frame, ignored");
            return;
        }
        let (Some(program), Some(vertex_array)) = (self.program, self.vertex_array) else {
            warn!("draw issued without a program and vertex array bound, ignored");
            return;
        };
        if let (Some(requested), Some(layout)) = (self.restart, self.vertex_arrays.get(&vertex_array)) {
            if let Some((_, format)) = layout.index {
                if requested != format.restart_index() {
                    warn!(
                        "restart index {requested:#x} unsupported, using {:#x}",
                        format.restart_index()
                    );
                }
            }
        }
        let key = PipelineKey {
            program,
            vertex_array,
            primitive,
            restart: self.restart.is_some(),
        };
        if !self.ensure_pipeline(key) {
            return;
        }
        self.pending.push(PendingDraw {
            key,
            count,
            uniforms: self.uniforms,
        });
    }

    fn end_frame(&mut self) -> ViewerResult<()> {
        self.in_frame = false;
        let draws = std::mem::take(&mut self.pending);
        if !self.surface_ready {
            return Ok(());
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(ViewerError::Surface("out of memory".into()));
            }
            Err(err) => return Err(ViewerError::Surface(err.to_string())),
        };
        if !draws.is_empty() {
            self.reserve_uniform_slots(draws.len() as u64);
            if let Some(arena) = &self.arena {
                self.queue
                    .write_buffer(&arena.buffer, 0, &self.pack_uniforms(&draws));
            }
        }
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("viewer-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (index, draw) in draws.iter().enumerate() {
                let (Some(Some(pipeline)), Some(layout), Some(arena)) = (
                    self.pipelines.get(&draw.key),
                    self.vertex_arrays.get(&draw.key.vertex_array),
                    self.arena.as_ref(),
                ) else {
                    continue;
                };
                let vertex_buffers: Option<Vec<&wgpu::Buffer>> = layout
                    .attributes
                    .iter()
                    .map(|attribute| self.buffers.get(&attribute.buffer))
                    .collect();
                let Some(vertex_buffers) = vertex_buffers else {
                    continue;
                };

                pass.set_pipeline(pipeline);
                let base = (self.offsets.stride * index as u64) as u32;
                pass.set_bind_group(0, &arena.bind_group, &[base, base, base]);
                for (slot, buffer) in vertex_buffers.into_iter().enumerate() {
                    pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                match layout.index {
                    Some((handle, format)) => {
                        let Some(index) = self.buffers.get(&handle) else {
                            continue;
                        };
                        pass.set_index_buffer(index.slice(..), index_format(format));
                        pass.draw_indexed(0..draw.count, 0, 0..1);
                    }
                    None => pass.draw(0..draw.count, 0..1),
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Byte offsets of the three uniform blocks inside one per-draw section, and
/// the distance between consecutive sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UniformOffsets {
    material: u64,
    light: u64,
    total: u64,
    stride: u64,
}

impl UniformOffsets {
    fn new(alignment: u64) -> Self {
        let alignment = alignment.max(1);
        let material = align_to(std::mem::size_of::<ObjectUniforms>() as u64, alignment);
        let light = align_to(
            material + std::mem::size_of::<MaterialUniforms>() as u64,
            alignment,
        );
        let total = light + std::mem::size_of::<LightUniforms>() as u64;
        Self {
            material,
            light,
            total,
            stride: align_to(total, alignment),
        }
    }
}

fn align_to(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

fn write_at(contents: &mut [u8], offset: u64, bytes: &[u8]) {
    let start = offset as usize;
    contents[start..start + bytes.len()].copy_from_slice(bytes);
}

fn uniform_entry(binding: u32, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

fn uniform_binding(
    buffer: &wgpu::Buffer,
    binding: u32,
    offset: u64,
    size: usize,
) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer,
            offset,
            size: wgpu::BufferSize::new(size as u64),
        }),
    }
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn topology(primitive: PrimitiveKind) -> wgpu::PrimitiveTopology {
    match primitive {
        PrimitiveKind::Points => wgpu::PrimitiveTopology::PointList,
        PrimitiveKind::Lines => wgpu::PrimitiveTopology::LineList,
        PrimitiveKind::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveKind::Triangles => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveKind::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

fn index_format(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::U16 => wgpu::IndexFormat::Uint16,
        IndexFormat::U32 => wgpu::IndexFormat::Uint32,
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
