use glam::{Mat4, Vec4};

use crate::camera::CameraState;

/// Vertical field of view, degrees.
pub const FOV_DEGREES: f32 = 65.0;
pub const Z_NEAR: f32 = 1.0;
pub const Z_FAR: f32 = 50.0;

/// Framebuffer size pushed by the host on resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or zero for a zero-height viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Per-frame matrices handed to drawables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub model_view_projection: Mat4,
    pub inverse_view: Mat4,
    pub camera_origin_world: Vec4,
}

impl Default for Transforms {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            model_view_projection: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            camera_origin_world: Vec4::W,
        }
    }
}

/// Derives projection and view matrices from the viewport and camera state.
#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
    viewport: Viewport,
    transforms: Transforms,
}

impl TransformPipeline {
    pub fn new(viewport: Viewport) -> Self {
        let mut pipeline = Self::default();
        pipeline.on_resize(viewport.width, viewport.height);
        pipeline
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.transforms.projection = perspective(
            FOV_DEGREES.to_radians(),
            self.viewport.aspect(),
            Z_NEAR,
            Z_FAR,
        );
    }

    /// Recomputes every camera-dependent matrix from `camera`.
    pub fn on_frame_begin(&mut self, camera: &CameraState) -> &Transforms {
        let view = view_matrix(camera);
        let inverse_view = view.inverse();
        self.transforms.view = view;
        self.transforms.model_view_projection = self.transforms.projection * view;
        self.transforms.inverse_view = inverse_view;
        self.transforms.camera_origin_world = inverse_view * Vec4::W;
        &self.transforms
    }
}

/// `translate(pan) * rotate_x(pitch) * rotate_y(yaw)`.
pub fn view_matrix(camera: &CameraState) -> Mat4 {
    Mat4::from_translation(camera.pan_offset)
        * Mat4::from_rotation_x(camera.pitch())
        * Mat4::from_rotation_y(camera.yaw())
}

/// Right-handed perspective projection with a `[0, 1]` depth range.
///
/// A zero aspect collapses the x axis instead of dividing by zero.
pub fn perspective(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    if aspect > 0.0 {
        return Mat4::perspective_rh(fov_y, aspect, z_near, z_far);
    }
    let focal = 1.0 / (0.5 * fov_y).tan();
    let range = z_far / (z_near - z_far);
    Mat4::from_cols(
        Vec4::ZERO,
        Vec4::new(0.0, focal, 0.0, 0.0),
        Vec4::new(0.0, 0.0, range, -1.0),
        Vec4::new(0.0, 0.0, range * z_near, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::{Vec2, Vec3};

    use super::*;

    fn camera(pan: Vec3, yaw: f32, pitch: f32) -> CameraState {
        CameraState {
            rotation: Vec2::new(yaw, pitch),
            ..CameraState::with_pan(pan)
        }
    }

    fn assert_vec3_near(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-5),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn view_applies_pan_then_pitch_then_yaw() {
        let view = view_matrix(&camera(Vec3::X, FRAC_PI_2, 0.0));
        assert_vec3_near(view.transform_point3(Vec3::ZERO), Vec3::X);
        assert_vec3_near(view.transform_point3(Vec3::NEG_Z), Vec3::ZERO);
        assert_vec3_near(view.transform_point3(Vec3::X), Vec3::new(1.0, 0.0, -1.0));
    }

    #[test]
    fn rotation_order_is_significant() {
        let state = camera(Vec3::new(0.0, -5.0, -15.0), 0.7, 0.4);
        let expected = view_matrix(&state);
        let swapped = Mat4::from_translation(state.pan_offset)
            * Mat4::from_rotation_y(state.yaw())
            * Mat4::from_rotation_x(state.pitch());
        assert!(!expected.abs_diff_eq(swapped, 1e-4));
    }

    #[test]
    fn mvp_is_projection_times_view() {
        let mut pipeline = TransformPipeline::new(Viewport::new(1280, 720));
        let state = camera(Vec3::new(2.0, -1.0, -9.0), 1.3, -0.6);
        let transforms = *pipeline.on_frame_begin(&state);
        assert_eq!(
            transforms.model_view_projection,
            transforms.projection * transforms.view
        );
        assert_eq!(transforms.view, view_matrix(&state));
    }

    #[test]
    fn view_tracks_the_latest_camera_state() {
        let mut pipeline = TransformPipeline::new(Viewport::new(800, 600));
        pipeline.on_frame_begin(&camera(Vec3::ZERO, 0.0, 0.0));
        let moved = camera(Vec3::new(0.0, 0.0, -4.0), 0.2, 0.1);
        let transforms = pipeline.on_frame_begin(&moved);
        assert_eq!(transforms.view, view_matrix(&moved));
    }

    #[test]
    fn camera_origin_is_the_inverse_view_origin() {
        let mut pipeline = TransformPipeline::new(Viewport::new(800, 600));
        let transforms = *pipeline.on_frame_begin(&camera(Vec3::new(0.0, -5.0, -15.0), 0.0, 0.0));
        assert_vec3_near(
            transforms.camera_origin_world.truncate(),
            Vec3::new(0.0, 5.0, 15.0),
        );
        assert!((transforms.camera_origin_world.w - 1.0).abs() < 1e-6);
        assert!(transforms
            .inverse_view
            .mul_mat4(&transforms.view)
            .abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn zero_height_uses_zero_aspect() {
        let mut pipeline = TransformPipeline::new(Viewport::new(640, 480));
        pipeline.on_resize(640, 0);
        assert_eq!(pipeline.viewport().aspect(), 0.0);
        let projection = pipeline.transforms().projection;
        assert!(projection.is_finite());
        assert_eq!(projection.x_axis, Vec4::ZERO);

        let transforms = pipeline.on_frame_begin(&CameraState::default());
        assert!(transforms.model_view_projection.is_finite());
        assert_eq!(
            transforms.model_view_projection,
            transforms.projection * transforms.view
        );
    }

    #[test]
    fn zero_width_is_defined() {
        let mut pipeline = TransformPipeline::new(Viewport::new(640, 480));
        pipeline.on_resize(0, 480);
        assert!(pipeline.transforms().projection.is_finite());
    }

    #[test]
    fn projection_uses_fixed_constants() {
        let pipeline = TransformPipeline::new(Viewport::new(1600, 900));
        let expected =
            Mat4::perspective_rh(FOV_DEGREES.to_radians(), 1600.0 / 900.0, Z_NEAR, Z_FAR);
        assert_eq!(pipeline.transforms().projection, expected);
    }
}
