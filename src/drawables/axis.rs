use glam::{Mat4, Vec4};

use super::{Drawable, FrameContext};
use crate::error::ViewerResult;
use crate::render::{
    program, shaders, AttributeData, DrawUniforms, GeometryBuffer, GpuProgram, GraphicsDevice,
    IndexData, ObjectUniforms, PrimitiveKind,
};

#[rustfmt::skip]
const POSITIONS: [f32; 18] = [
    0.0, 0.0, 0.0,  1.0, 0.0, 0.0,
    0.0, 0.0, 0.0,  0.0, 1.0, 0.0,
    0.0, 0.0, 0.0,  0.0, 0.0, 1.0,
];

#[rustfmt::skip]
const COLORS: [f32; 24] = [
    1.0, 0.0, 0.0, 1.0,  1.0, 0.0, 0.0, 1.0,
    0.0, 1.0, 0.0, 1.0,  0.0, 1.0, 0.0, 1.0,
    0.0, 0.0, 1.0, 1.0,  0.0, 0.0, 1.0, 1.0,
];

/// Unit-length red/green/blue lines along +X/+Y/+Z.
pub struct AxisGizmo {
    geometry: GeometryBuffer,
    program: GpuProgram,
}

impl AxisGizmo {
    pub fn new(device: &mut dyn GraphicsDevice) -> ViewerResult<Self> {
        let geometry = GeometryBuffer::upload(
            device,
            &[
                AttributeData::new(0, 3, &POSITIONS),
                AttributeData::new(1, 4, &COLORS),
            ],
            Some(&IndexData::U16((0..6).collect())),
            "axis",
        )?;
        let program = program::build(device, shaders::AXIS_VERTEX, shaders::AXIS_FRAGMENT, "axis");
        Ok(Self { geometry, program })
    }
}

impl Drawable for AxisGizmo {
    fn name(&self) -> &str {
        "axis"
    }

    fn bind(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        self.program.bind(device)
    }

    fn draw(&mut self, device: &mut dyn GraphicsDevice, frame: &FrameContext<'_>) {
        let transforms = frame.transforms;
        device.set_uniforms(&DrawUniforms::object(ObjectUniforms::new(
            Mat4::IDENTITY,
            transforms.view,
            transforms.model_view_projection,
            Vec4::ONE,
            transforms.camera_origin_world,
        )));
        self.geometry
            .bind_and_draw(device, PrimitiveKind::Lines, self.geometry.draw_count(), None);
        device.use_program(None);
    }

    fn release(self: Box<Self>, device: &mut dyn GraphicsDevice) {
        self.geometry.destroy(device);
        self.program.destroy(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::SceneLight;
    use crate::render::HeadlessDevice;
    use crate::transform::Transforms;

    #[test]
    fn draws_six_indexed_line_vertices() {
        let mut device = HeadlessDevice::new();
        let mut axis = AxisGizmo::new(&mut device).unwrap();
        let transforms = Transforms::default();
        let light = SceneLight::default();
        let frame = FrameContext {
            transforms: &transforms,
            light: &light,
            elapsed: 0.0,
        };

        device.begin_frame([0.5, 0.5, 0.5, 1.0]);
        assert!(axis.bind(&mut device));
        axis.draw(&mut device, &frame);
        device.end_frame().unwrap();

        let draw = &device.draws()[0];
        assert_eq!(draw.primitive, PrimitiveKind::Lines);
        assert_eq!(draw.count, 6);
        assert!(draw.indexed);
        assert_eq!(draw.restart, None);
        assert_eq!(device.bound_program(), None);
    }
}
