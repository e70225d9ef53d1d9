//! GPU resource seam.
//!
//! Core code talks to the GPU through [`GraphicsDevice`], a small
//! handle-based API: shader stages and programs, static buffers, vertex
//! layouts, and immediate draw submission inside a frame. [`native`] backs
//! it with wgpu and a window surface; [`headless`] records every command and
//! is used for tests and for running without a display.

pub mod geometry;
pub mod headless;
pub mod native;
pub mod program;
pub mod shaders;
pub mod validate;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::error::ViewerResult;
use crate::lighting::{LightingMode, Material, SceneLight, AMBIENT_STRENGTH, SPECULAR_STRENGTH};

pub use geometry::{AttributeData, GeometryBuffer, IndexData};
pub use headless::HeadlessDevice;
pub use native::WgpuDevice;
pub use program::GpuProgram;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for "no object".
            pub const NULL: Self = Self(0);

            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }

            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

gpu_handle!(
    /// A compiled (or failed) shader stage object.
    ShaderHandle
);
gpu_handle!(
    /// A program object: attached stages plus link result.
    ProgramHandle
);
gpu_handle!(
    /// A static vertex or index buffer.
    BufferHandle
);
gpu_handle!(
    /// A vertex layout binding attribute locations to buffers.
    VertexArrayHandle
);

/// Hands out non-null handle values.
#[derive(Debug)]
pub(crate) struct HandleAllocator {
    next: u32,
}

impl HandleAllocator {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn next(&mut self) -> u32 {
        let raw = self.next;
        self.next += 1;
        raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl PrimitiveKind {
    pub fn is_strip(self) -> bool {
        matches!(self, Self::LineStrip | Self::TriangleStrip)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    /// The only restart value the GPU understands for this format.
    pub fn restart_index(self) -> u32 {
        match self {
            Self::U16 => u32::from(u16::MAX),
            Self::U32 => u32::MAX,
        }
    }
}

/// One attribute of a vertex layout: `components` tightly packed `f32`s per
/// vertex read from `buffer` into shader input `location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub buffer: BufferHandle,
}

impl VertexAttribute {
    pub fn stride(&self) -> u64 {
        u64::from(self.components) * std::mem::size_of::<f32>() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
    pub index: Option<(BufferHandle, IndexFormat)>,
}

/// Per-object block at binding 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub obj_mat: [[f32; 4]; 4],
    pub mv_mat: [[f32; 4]; 4],
    pub mvp_mat: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub camera_origin: [f32; 4],
}

impl ObjectUniforms {
    pub fn new(obj_mat: Mat4, mv_mat: Mat4, mvp_mat: Mat4, color: Vec4, camera_origin: Vec4) -> Self {
        Self {
            obj_mat: obj_mat.to_cols_array_2d(),
            mv_mat: mv_mat.to_cols_array_2d(),
            mvp_mat: mvp_mat.to_cols_array_2d(),
            color: color.into(),
            camera_origin: camera_origin.into(),
        }
    }
}

/// `Material` block at binding 1.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub ambient: [f32; 3],
    pub _pad0: f32,
    pub diffuse: [f32; 3],
    pub _pad1: f32,
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            ambient: material.ambient.into(),
            _pad0: 0.0,
            diffuse: material.diffuse.into(),
            _pad1: 0.0,
            specular: material.specular.into(),
            shininess: material.shininess,
        }
    }
}

/// Light block at binding 2.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniforms {
    pub position: [f32; 3],
    pub cutoff_cosine: f32,
    pub direction: [f32; 3],
    pub att_constant: f32,
    pub color: [f32; 3],
    pub att_linear: f32,
    pub object_color: [f32; 3],
    pub att_quadratic: f32,
    pub ambient_strength: f32,
    pub specular_strength: f32,
    pub mode: u32,
    pub _pad: u32,
}

impl From<&SceneLight> for LightUniforms {
    fn from(light: &SceneLight) -> Self {
        let source = &light.source;
        Self {
            position: source.position.into(),
            cutoff_cosine: source.cutoff_cosine,
            direction: source.direction.into(),
            att_constant: source.attenuation.constant,
            color: light.color.into(),
            att_linear: source.attenuation.linear,
            object_color: light.object_color.into(),
            att_quadratic: source.attenuation.quadratic,
            ambient_strength: AMBIENT_STRENGTH,
            specular_strength: SPECULAR_STRENGTH,
            mode: match light.mode {
                LightingMode::PerFragment => 0,
                LightingMode::Flat => 1,
            },
            _pad: 0,
        }
    }
}

/// Uniform values for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub object: ObjectUniforms,
    pub material: MaterialUniforms,
    pub light: LightUniforms,
}

impl DrawUniforms {
    /// Object block only; material and light stay zeroed.
    pub fn object(object: ObjectUniforms) -> Self {
        Self {
            object,
            material: MaterialUniforms::zeroed(),
            light: LightUniforms::zeroed(),
        }
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from(self.object.color)
    }

    pub fn camera_origin(&self) -> Vec3 {
        Vec4::from(self.object.camera_origin).truncate()
    }
}

/// Handle-based GPU API the program manager, geometry and drawables use.
///
/// Creation calls never leave anything bound. Draw state (`use_program`,
/// `bind_vertex_array`, `set_uniforms`, `set_primitive_restart`) only matters
/// between `begin_frame` and `end_frame`.
pub trait GraphicsDevice {
    fn create_shader(&mut self, stage: ShaderStage, label: &str) -> ShaderHandle;
    /// Compiles `source` into `shader`; `Err` carries the diagnostic log.
    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<(), String>;
    fn delete_shader(&mut self, shader: ShaderHandle);

    fn create_program(&mut self, label: &str) -> ProgramHandle;
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    /// Links the attached stages; `Err` carries the diagnostic log.
    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String>;
    fn delete_program(&mut self, program: ProgramHandle);

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        contents: &[u8],
        label: &str,
    ) -> ViewerResult<BufferHandle>;
    fn delete_buffer(&mut self, buffer: BufferHandle);
    fn create_vertex_array(
        &mut self,
        layout: VertexLayout,
        label: &str,
    ) -> ViewerResult<VertexArrayHandle>;
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    fn resize(&mut self, width: u32, height: u32);
    /// Starts a frame cleared to `clear_color` with depth 1.
    fn begin_frame(&mut self, clear_color: [f32; 4]);
    fn use_program(&mut self, program: Option<ProgramHandle>);
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>);
    fn set_uniforms(&mut self, uniforms: &DrawUniforms);
    fn set_primitive_restart(&mut self, restart_index: Option<u32>);
    /// Draws `count` vertices, or indices when the bound layout has an index
    /// buffer.
    fn draw(&mut self, primitive: PrimitiveKind, count: u32);
    /// Submits and presents the frame.
    fn end_frame(&mut self) -> ViewerResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_blocks_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 224);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 48);
        assert_eq!(std::mem::size_of::<LightUniforms>(), 80);
    }

    #[test]
    fn restart_index_is_all_ones() {
        assert_eq!(IndexFormat::U16.restart_index(), 0xFFFF);
        assert_eq!(IndexFormat::U32.restart_index(), 0xFFFF_FFFF);
    }

    #[test]
    fn null_handles_are_null() {
        assert!(ShaderHandle::NULL.is_null());
        assert!(!ProgramHandle::from_raw(3).is_null());
    }

    #[test]
    fn light_block_encodes_mode() {
        let mut light = SceneLight::default();
        assert_eq!(LightUniforms::from(&light).mode, 0);
        light.mode = LightingMode::Flat;
        assert_eq!(LightUniforms::from(&light).mode, 1);
    }
}
