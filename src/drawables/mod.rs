//! Things the viewer draws each frame.
//!
//! A drawable owns its geometry and program. The viewer asks it to `bind`
//! (false means its program failed to link and the draw is skipped) and then
//! to `draw` with the frame's matrices and light.

mod axis;
mod cube;
mod lit_mesh;
mod triangle;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::error::ViewerResult;
use crate::lighting::{LightingResult, Material, SceneLight};
use crate::obj::MeshData;
use crate::render::GraphicsDevice;
use crate::transform::Transforms;

pub use axis::AxisGizmo;
pub use cube::RestartCube;
pub use lit_mesh::LitMesh;
pub use triangle::{pulse_color, ClipTriangle};

/// Per-frame inputs shared by every drawable.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub transforms: &'a Transforms,
    pub light: &'a SceneLight,
    /// Seconds since the viewer started.
    pub elapsed: f32,
}

pub trait Drawable {
    fn name(&self) -> &str;

    /// Makes the drawable's program current; `false` skips this frame's draw.
    fn bind(&mut self, device: &mut dyn GraphicsDevice) -> bool;

    fn draw(&mut self, device: &mut dyn GraphicsDevice, frame: &FrameContext<'_>);

    fn release(self: Box<Self>, device: &mut dyn GraphicsDevice);

    /// The single-sample lighting evaluated during the last draw, if any.
    fn lighting(&self) -> Option<LightingResult> {
        None
    }
}

/// Built-in drawables selectable from `scene.drawables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawableKind {
    Axis,
    Mesh,
    Cube,
    Triangle,
}

/// Shared inputs for building drawables.
#[derive(Debug, Clone, Copy)]
pub struct DrawableAssets<'a> {
    pub mesh: &'a MeshData,
    pub material: Material,
    pub animate_cube: bool,
    /// Model matrix of the mesh and the static cube.
    pub model: Mat4,
}

impl DrawableKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Axis => "axis",
            Self::Mesh => "mesh",
            Self::Cube => "cube",
            Self::Triangle => "triangle",
        }
    }

    /// Uploads geometry and builds the program for this drawable.
    pub fn build(
        self,
        device: &mut dyn GraphicsDevice,
        assets: &DrawableAssets<'_>,
    ) -> ViewerResult<Box<dyn Drawable>> {
        Ok(match self {
            Self::Axis => Box::new(AxisGizmo::new(device)?),
            Self::Mesh => {
                let mut mesh = LitMesh::new(device, assets.mesh, assets.material)?;
                mesh.set_model_matrix(assets.model);
                Box::new(mesh)
            }
            Self::Cube => {
                let mut cube = RestartCube::new(device, assets.animate_cube)?;
                cube.set_model_matrix(assets.model);
                Box::new(cube)
            }
            Self::Triangle => Box::new(ClipTriangle::new(device)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::{load_obj_from_str, DEFAULT_CUBE_OBJ};
    use crate::render::HeadlessDevice;

    #[test]
    fn every_kind_builds_and_releases_cleanly() {
        let mut device = HeadlessDevice::new();
        let mesh = load_obj_from_str(DEFAULT_CUBE_OBJ).unwrap();
        let assets = DrawableAssets {
            mesh: &mesh,
            material: Material::default(),
            animate_cube: true,
            model: Mat4::IDENTITY,
        };
        for kind in [
            DrawableKind::Axis,
            DrawableKind::Mesh,
            DrawableKind::Cube,
            DrawableKind::Triangle,
        ] {
            let mut drawable = kind.build(&mut device, &assets).unwrap();
            assert_eq!(drawable.name(), kind.name());
            assert!(drawable.bind(&mut device));
            drawable.release(&mut device);
        }
        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn kinds_parse_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            kinds: Vec<DrawableKind>,
        }
        let parsed: Wrapper =
            toml::from_str(r#"kinds = ["axis", "mesh", "cube", "triangle"]"#).unwrap();
        assert_eq!(
            parsed.kinds,
            vec![
                DrawableKind::Axis,
                DrawableKind::Mesh,
                DrawableKind::Cube,
                DrawableKind::Triangle
            ]
        );
        assert!(toml::from_str::<Wrapper>(r#"kinds = ["teapot"]"#).is_err());
    }
}
