use glam::{Mat4, Vec3, Vec4};

use super::{Drawable, FrameContext};
use crate::error::ViewerResult;
use crate::render::{
    program, shaders, AttributeData, DrawUniforms, GeometryBuffer, GpuProgram, GraphicsDevice,
    IndexData, IndexFormat, ObjectUniforms, PrimitiveKind,
};

const HALF: f32 = 0.5;

//   4---------7
//  /|        /|
// 5---------6 |
// | 0-------|-3
// |/        |/
// 1---------2
const CORNERS: [Vec3; 8] = [
    Vec3::new(-HALF, -HALF, -HALF),
    Vec3::new(-HALF, -HALF, HALF),
    Vec3::new(HALF, -HALF, HALF),
    Vec3::new(HALF, -HALF, -HALF),
    Vec3::new(-HALF, HALF, -HALF),
    Vec3::new(-HALF, HALF, HALF),
    Vec3::new(HALF, HALF, HALF),
    Vec3::new(HALF, HALF, -HALF),
];

/// Corner order of each face's four-vertex strip, with that face's normal.
const FACES: [([usize; 4], Vec3); 6] = [
    ([1, 0, 2, 3], Vec3::NEG_Y),
    ([5, 6, 4, 7], Vec3::Y),
    ([1, 5, 0, 4], Vec3::NEG_X),
    ([2, 3, 6, 7], Vec3::X),
    ([0, 4, 3, 7], Vec3::NEG_Z),
    ([1, 2, 5, 6], Vec3::Z),
];

const STATIC_COLOR: Vec4 = Vec4::new(0.1, 1.0, 1.0, 0.0);

/// Unit cube drawn as six triangle strips in one indexed draw, separated by
/// the primitive restart index. Optionally draws a second, animated copy.
pub struct RestartCube {
    geometry: GeometryBuffer,
    program: GpuProgram,
    obj_mat: Mat4,
    animated: bool,
}

impl RestartCube {
    pub fn new(device: &mut dyn GraphicsDevice, animated: bool) -> ViewerResult<Self> {
        let (positions, normals, indices) = strip_geometry();
        let geometry = GeometryBuffer::upload(
            device,
            &[
                AttributeData::new(0, 3, &positions),
                AttributeData::new(1, 3, &normals),
            ],
            Some(&IndexData::U16(indices)),
            "cube",
        )?;
        let program = program::build(device, shaders::CUBE_VERTEX, shaders::CUBE_FRAGMENT, "cube");
        Ok(Self {
            geometry,
            program,
            obj_mat: Mat4::IDENTITY,
            animated,
        })
    }

    pub fn set_model_matrix(&mut self, obj_mat: Mat4) {
        self.obj_mat = obj_mat;
    }

    fn draw_copy(
        &self,
        device: &mut dyn GraphicsDevice,
        frame: &FrameContext<'_>,
        obj_mat: Mat4,
        color: Vec4,
    ) {
        let transforms = frame.transforms;
        device.set_uniforms(&DrawUniforms::object(ObjectUniforms::new(
            obj_mat,
            transforms.view,
            transforms.model_view_projection,
            color,
            transforms.camera_origin_world,
        )));
        self.geometry.bind_and_draw(
            device,
            PrimitiveKind::TriangleStrip,
            self.geometry.draw_count(),
            Some(IndexFormat::U16.restart_index()),
        );
    }
}

/// Model matrix of the orbiting copy at `t` seconds.
pub fn orbit_matrix(t: f32) -> Mat4 {
    let scale = ((t.sin() * 2.0 + 2.0) + 1.0) / 2.0;
    Mat4::from_translation(Vec3::new(0.0, t.cos() * 2.0 + 2.0, 2.0))
        * Mat4::from_rotation_y(t)
        * Mat4::from_translation(Vec3::new(1.0, 0.0, 3.0))
        * Mat4::from_scale(Vec3::splat(scale))
}

/// Colour of the orbiting copy at `t` seconds.
pub fn orbit_color(t: f32) -> Vec4 {
    Vec4::new(t.sin() * 0.5 + 0.5, t.cos() * 0.5 + 0.5, 0.0, 0.0)
}

fn strip_geometry() -> (Vec<f32>, Vec<f32>, Vec<u16>) {
    let mut positions = Vec::with_capacity(FACES.len() * 12);
    let mut normals = Vec::with_capacity(FACES.len() * 12);
    let mut indices = Vec::with_capacity(FACES.len() * 5);
    let restart = IndexFormat::U16.restart_index() as u16;
    for (face, (corners, normal)) in FACES.iter().enumerate() {
        for (corner, &index) in corners.iter().enumerate() {
            positions.extend_from_slice(&CORNERS[index].to_array());
            normals.extend_from_slice(&normal.to_array());
            indices.push((face * 4 + corner) as u16);
        }
        indices.push(restart);
    }
    (positions, normals, indices)
}

impl Drawable for RestartCube {
    fn name(&self) -> &str {
        "cube"
    }

    fn bind(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        self.program.bind(device)
    }

    fn draw(&mut self, device: &mut dyn GraphicsDevice, frame: &FrameContext<'_>) {
        self.draw_copy(device, frame, self.obj_mat, STATIC_COLOR);
        if self.animated {
            let t = frame.elapsed;
            self.draw_copy(device, frame, orbit_matrix(t), orbit_color(t));
        }
        device.use_program(None);
    }

    fn release(self: Box<Self>, device: &mut dyn GraphicsDevice) {
        self.geometry.destroy(device);
        self.program.destroy(device);
    }
}
