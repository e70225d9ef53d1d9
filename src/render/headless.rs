//! Recording device for tests and display-less runs.
//!
//! Compiles and links for real (through naga), tracks every live object and
//! the bound state, and keeps a log of every command it received. Nothing is
//! rasterized.

use std::collections::HashMap;

use log::warn;

use super::validate::{self, StageInterface};
use super::{
    BufferHandle, BufferKind, DrawUniforms, GraphicsDevice, HandleAllocator, PrimitiveKind,
    ProgramHandle, ShaderHandle, ShaderStage, VertexArrayHandle, VertexLayout,
};
use crate::error::{ViewerError, ViewerResult};
use crate::transform::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateShader { shader: ShaderHandle, stage: ShaderStage },
    CompileShader { shader: ShaderHandle, ok: bool },
    DeleteShader(ShaderHandle),
    CreateProgram(ProgramHandle),
    AttachShader { program: ProgramHandle, shader: ShaderHandle },
    LinkProgram { program: ProgramHandle, ok: bool },
    DeleteProgram(ProgramHandle),
    CreateBuffer { buffer: BufferHandle, kind: BufferKind, size: usize },
    DeleteBuffer(BufferHandle),
    CreateVertexArray(VertexArrayHandle),
    DeleteVertexArray(VertexArrayHandle),
    Resize(Viewport),
    BeginFrame { clear_color: [f32; 4] },
    UseProgram(Option<ProgramHandle>),
    BindVertexArray(Option<VertexArrayHandle>),
    SetUniforms(DrawUniforms),
    SetPrimitiveRestart(Option<u32>),
    Draw(DrawCall),
    EndFrame,
}

/// A draw the device accepted, with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub frame: u64,
    pub program: ProgramHandle,
    pub vertex_array: VertexArrayHandle,
    pub primitive: PrimitiveKind,
    pub count: u32,
    pub indexed: bool,
    pub restart: Option<u32>,
    pub uniforms: Option<DrawUniforms>,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    label: String,
    interface: Option<StageInterface>,
}

#[derive(Debug)]
struct ProgramObject {
    label: String,
    attached: Vec<ShaderHandle>,
    linked: bool,
}

#[derive(Debug)]
struct BufferObject {
    kind: BufferKind,
    size: usize,
}

#[derive(Debug)]
pub struct HeadlessDevice {
    handles: HandleAllocator,
    shaders: HashMap<ShaderHandle, ShaderObject>,
    programs: HashMap<ProgramHandle, ProgramObject>,
    buffers: HashMap<BufferHandle, BufferObject>,
    vertex_arrays: HashMap<VertexArrayHandle, VertexLayout>,
    memory_budget: Option<usize>,
    allocated: usize,
    viewport: Viewport,
    in_frame: bool,
    frames: u64,
    program: Option<ProgramHandle>,
    vertex_array: Option<VertexArrayHandle>,
    uniforms: Option<DrawUniforms>,
    restart: Option<u32>,
    clear_color: [f32; 4],
    commands: Vec<DeviceCommand>,
    draws: Vec<DrawCall>,
    total_draws: u64,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            handles: HandleAllocator::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            memory_budget: None,
            allocated: 0,
            viewport: Viewport::default(),
            in_frame: false,
            frames: 0,
            program: None,
            vertex_array: None,
            uniforms: None,
            restart: None,
            clear_color: [0.0; 4],
            commands: Vec::new(),
            draws: Vec::new(),
            total_draws: 0,
        }
    }

    /// A device whose buffer allocations fail once `bytes` are in use.
    pub fn with_memory_budget(bytes: usize) -> Self {
        Self {
            memory_budget: Some(bytes),
            ..Self::new()
        }
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Draws recorded since the last [`HeadlessDevice::clear_history`].
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Every draw accepted since the device was created.
    pub fn total_draws(&self) -> u64 {
        self.total_draws
    }

    /// Drops the recorded command and draw logs. Object state, bindings and
    /// counters are kept.
    pub fn clear_history(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn bound_program(&self) -> Option<ProgramHandle> {
        self.program
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayHandle> {
        self.vertex_array
    }

    pub fn primitive_restart(&self) -> Option<u32> {
        self.restart
    }

    pub fn allocated_bytes(&self) -> usize {
        self.allocated
    }

    pub fn is_shader_live(&self, shader: ShaderHandle) -> bool {
        self.shaders.contains_key(&shader)
    }

    pub fn is_program_linked(&self, program: ProgramHandle) -> bool {
        self.programs.get(&program).is_some_and(|p| p.linked)
    }

    pub fn is_vertex_array_live(&self, vertex_array: VertexArrayHandle) -> bool {
        self.vertex_arrays.contains_key(&vertex_array)
    }

    /// Number of shader, program, buffer and vertex array objects not yet
    /// deleted.
    pub fn live_objects(&self) -> usize {
        self.shaders.len() + self.programs.len() + self.buffers.len() + self.vertex_arrays.len()
    }

    fn record(&mut self, command: DeviceCommand) {
        self.commands.push(command);
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_shader(&mut self, stage: ShaderStage, label: &str) -> ShaderHandle {
        let shader = ShaderHandle::from_raw(self.handles.next());
        self.shaders.insert(
            shader,
            ShaderObject {
                stage,
                label: label.to_string(),
                interface: None,
            },
        );
        self.record(DeviceCommand::CreateShader { shader, stage });
        shader
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<(), String> {
        let Some(object) = self.shaders.get_mut(&shader) else {
            return Err(format!("shader {} does not exist", shader.raw()));
        };
        let result = validate::compile_wgsl(source, object.stage);
        object.interface = result.as_ref().ok().cloned();
        let ok = result.is_ok();
        self.record(DeviceCommand::CompileShader { shader, ok });
        result.map(|_| ())
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(&shader).is_some() {
            self.record(DeviceCommand::DeleteShader(shader));
        }
    }

    fn create_program(&mut self, label: &str) -> ProgramHandle {
        let program = ProgramHandle::from_raw(self.handles.next());
        self.programs.insert(
            program,
            ProgramObject {
                label: label.to_string(),
                attached: Vec::new(),
                linked: false,
            },
        );
        self.record(DeviceCommand::CreateProgram(program));
        program
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if let Some(object) = self.programs.get_mut(&program) {
            object.attached.push(shader);
            self.record(DeviceCommand::AttachShader { program, shader });
        }
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String> {
        let Some(object) = self.programs.get(&program) else {
            return Err(format!("program {} does not exist", program.raw()));
        };

        let mut stages = Vec::with_capacity(object.attached.len());
        let mut result = Ok(());
        for shader in &object.attached {
            match self.shaders.get(shader) {
                Some(ShaderObject {
                    interface: Some(interface),
                    ..
                }) => stages.push(interface),
                Some(stage) => {
                    result = Err(format!("stage `{}` is not compiled", stage.label));
                    break;
                }
                None => {
                    result = Err(format!("shader {} does not exist", shader.raw()));
                    break;
                }
            }
        }
        let result = result.and_then(|()| validate::check_link(&stages).map(|_| ()));
        let ok = result.is_ok();

        if let Some(object) = self.programs.get_mut(&program) {
            object.linked = ok;
            if !ok {
                warn!("headless link of `{}` rejected", object.label);
            }
        }
        self.record(DeviceCommand::LinkProgram { program, ok });
        result
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program).is_some() {
            if self.program == Some(program) {
                self.program = None;
            }
            self.record(DeviceCommand::DeleteProgram(program));
        }
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        contents: &[u8],
        label: &str,
    ) -> ViewerResult<BufferHandle> {
        let size = contents.len();
        if let Some(budget) = self.memory_budget {
            if self.allocated + size > budget {
                return Err(ViewerError::exhausted(
                    format!("buffer `{label}`"),
                    format!(
                        "{size} bytes requested, {} of {budget} bytes in use",
                        self.allocated
                    ),
                ));
            }
        }
        let buffer = BufferHandle::from_raw(self.handles.next());
        self.buffers.insert(buffer, BufferObject { kind, size });
        self.allocated += size;
        self.record(DeviceCommand::CreateBuffer { buffer, kind, size });
        Ok(buffer)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(object) = self.buffers.remove(&buffer) {
            self.allocated -= object.size;
            self.record(DeviceCommand::DeleteBuffer(buffer));
        }
    }

    fn create_vertex_array(
        &mut self,
        layout: VertexLayout,
        label: &str,
    ) -> ViewerResult<VertexArrayHandle> {
        let index_ok = layout.index.map_or(true, |(buffer, _)| {
            self.buffers
                .get(&buffer)
                .is_some_and(|b| b.kind == BufferKind::Index)
        });
        let attributes_ok = layout.attributes.iter().all(|attribute| {
            self.buffers
                .get(&attribute.buffer)
                .is_some_and(|b| b.kind == BufferKind::Vertex)
        });
        if !index_ok || !attributes_ok {
            return Err(ViewerError::invalid_geometry(
                label,
                "layout references a missing or mistyped buffer",
            ));
        }
        let vertex_array = VertexArrayHandle::from_raw(self.handles.next());
        self.vertex_arrays.insert(vertex_array, layout);
        self.record(DeviceCommand::CreateVertexArray(vertex_array));
        Ok(vertex_array)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if self.vertex_arrays.remove(&vertex_array).is_some() {
            if self.vertex_array == Some(vertex_array) {
                self.vertex_array = None;
            }
            self.record(DeviceCommand::DeleteVertexArray(vertex_array));
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.record(DeviceCommand::Resize(self.viewport));
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        self.in_frame = true;
        self.clear_color = clear_color;
        self.record(DeviceCommand::BeginFrame { clear_color });
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.program = program;
        self.record(DeviceCommand::UseProgram(program));
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.vertex_array = vertex_array;
        self.record(DeviceCommand::BindVertexArray(vertex_array));
    }

    fn set_uniforms(&mut self, uniforms: &DrawUniforms) {
        self.uniforms = Some(*uniforms);
        self.record(DeviceCommand::SetUniforms(*uniforms));
    }

    fn set_primitive_restart(&mut self, restart_index: Option<u32>) {
        self.restart = restart_index;
        self.record(DeviceCommand::SetPrimitiveRestart(restart_index));
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
        if !self.is_program_linked(program) {
            warn!("draw issued with unlinked program {}, ignored", program.raw());
            return;
        }
        let Some(layout) = self.vertex_arrays.get(&vertex_array) else {
            warn!("draw issued with deleted vertex array {}, ignored", vertex_array.raw());
            return;
        };
        let call = DrawCall {
            frame: self.frames,
            program,
            vertex_array,
            primitive,
            count,
            indexed: layout.index.is_some(),
            restart: self.restart,
            uniforms: self.uniforms,
        };
        self.total_draws += 1;
        self.draws.push(call.clone());
        self.record(DeviceCommand::Draw(call));
    }

    fn end_frame(&mut self) -> ViewerResult<()> {
        self.in_frame = false;
        self.frames += 1;
        self.record(DeviceCommand::EndFrame);
        Ok(())
    }
}
