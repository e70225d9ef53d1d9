use glam::{Mat4, Vec4};

use super::{Drawable, FrameContext};
use crate::error::ViewerResult;
use crate::render::{
    program, shaders, AttributeData, DrawUniforms, GeometryBuffer, GpuProgram, GraphicsDevice,
    ObjectUniforms, PrimitiveKind,
};

#[rustfmt::skip]
const POSITIONS: [f32; 9] = [
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
     0.0,  0.5, 0.0,
];

/// A single clip-space triangle whose colour steps once per whole second.
/// Ignores the camera.
pub struct ClipTriangle {
    geometry: GeometryBuffer,
    program: GpuProgram,
}

impl ClipTriangle {
    pub fn new(device: &mut dyn GraphicsDevice) -> ViewerResult<Self> {
        let geometry =
            GeometryBuffer::upload(device, &[AttributeData::new(0, 3, &POSITIONS)], None, "triangle")?;
        let program = program::build(
            device,
            shaders::TRIANGLE_VERTEX,
            shaders::TRIANGLE_FRAGMENT,
            "triangle",
        );
        Ok(Self { geometry, program })
    }
}

/// Colour at `elapsed` seconds, sampled at the last whole second.
pub fn pulse_color(elapsed: f32) -> Vec4 {
    let t = elapsed.max(0.0).floor();
    Vec4::new(t.sin() * 0.5 + 0.5, t.cos() * 0.5 + 0.5, 0.0, 1.0)
}

impl Drawable for ClipTriangle {
    fn name(&self) -> &str {
        "triangle"
    }

    fn bind(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        self.program.bind(device)
    }

    fn draw(&mut self, device: &mut dyn GraphicsDevice, frame: &FrameContext<'_>) {
        let transforms = frame.transforms;
        device.set_uniforms(&DrawUniforms::object(ObjectUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            pulse_color(frame.elapsed),
            transforms.camera_origin_world,
        )));
        self.geometry
            .bind_and_draw(device, PrimitiveKind::Triangles, self.geometry.draw_count(), None);
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
    fn color_holds_within_a_second() {
        assert_eq!(pulse_color(0.0), Vec4::new(0.5, 1.0, 0.0, 1.0));
        assert_eq!(pulse_color(0.9), pulse_color(0.0));
        assert_eq!(pulse_color(1.5), pulse_color(1.0));
        assert_ne!(pulse_color(1.0), pulse_color(0.0));
    }

    #[test]
    fn draws_three_vertices_with_the_pulse_color() {
        let mut device = HeadlessDevice::new();
        let mut triangle = ClipTriangle::new(&mut device).unwrap();
        let transforms = Transforms::default();
        let light = SceneLight::default();
        let frame = FrameContext {
            transforms: &transforms,
            light: &light,
            elapsed: 2.25,
        };

        device.begin_frame([0.0; 4]);
        assert!(triangle.bind(&mut device));
        triangle.draw(&mut device, &frame);
        device.end_frame().unwrap();

        let draw = &device.draws()[0];
        assert_eq!(draw.primitive, PrimitiveKind::Triangles);
        assert_eq!(draw.count, 3);
        assert!(!draw.indexed);
        assert_eq!(draw.uniforms.unwrap().color(), pulse_color(2.0));
    }
}
