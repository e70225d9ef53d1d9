use anyhow::{Context, Result};
use log::{debug, info};

use crate::camera::{CameraController, CameraState};
use crate::clock::{FrameReport, FrameStats};
use crate::config::ViewerConfig;
use crate::drawables::{Drawable, DrawableAssets, FrameContext};
use crate::error::ViewerResult;
use crate::input::PointerEvent;
use crate::lighting::SceneLight;
use crate::obj::{load_obj_file, load_obj_from_str, MeshData, DEFAULT_CUBE_OBJ};
use crate::render::GraphicsDevice;
use crate::transform::{TransformPipeline, Transforms, Viewport};

/// The interactive scene: camera, transforms, light and drawables on top of
/// one graphics device.
///
/// Everything runs on the caller's thread. Dropping the viewer releases all
/// GPU objects it created.
pub struct Viewer<D: GraphicsDevice> {
    device: D,
    camera: CameraController,
    transforms: TransformPipeline,
    light: SceneLight,
    drawables: Vec<Box<dyn Drawable>>,
    clear_color: [f32; 4],
    stats: FrameStats,
    elapsed: f32,
    frames: u64,
}

impl<D: GraphicsDevice> Viewer<D> {
    /// Builds the configured drawables on `device`. Running out of GPU memory
    /// while uploading aborts construction; shader failures do not.
    pub fn new(mut device: D, config: &ViewerConfig) -> Result<Self> {
        let mesh = load_mesh(config)?;
        let viewport = Viewport::new(config.window.width, config.window.height);
        device.resize(viewport.width, viewport.height);

        let mut viewer = Self {
            device,
            camera: CameraController::new(config.camera.initial_pan),
            transforms: TransformPipeline::new(viewport),
            light: config.lighting,
            drawables: Vec::with_capacity(config.scene.drawables.len()),
            clear_color: config.scene.clear_color,
            stats: FrameStats::new(),
            elapsed: 0.0,
            frames: 0,
        };

        let assets = DrawableAssets {
            mesh: &mesh,
            material: config.material,
            animate_cube: config.scene.animate_cube,
            model: config.scene.transform.matrix(),
        };
        for kind in &config.scene.drawables {
            let drawable = kind
                .build(&mut viewer.device, &assets)
                .with_context(|| format!("failed to build the `{}` drawable", kind.name()))?;
            viewer.register(drawable);
        }
        info!(
            "viewer ready: {} drawable(s), {}x{}",
            viewer.drawables.len(),
            viewport.width,
            viewport.height
        );
        Ok(viewer)
    }

    /// Appends a drawable to the end of the draw order.
    pub fn register(&mut self, drawable: Box<dyn Drawable>) {
        debug!("registered drawable `{}`", drawable.name());
        self.drawables.push(drawable);
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.transforms.on_resize(width, height);
        self.device.resize(width, height);
    }

    pub fn on_pointer_event(&mut self, event: PointerEvent) {
        self.camera.on_pointer_event(event);
    }

    /// Draws one frame `delta` seconds after the previous one.
    pub fn render(&mut self, delta: f32) -> ViewerResult<()> {
        self.elapsed += delta;
        let transforms = *self.transforms.on_frame_begin(self.camera.state());
        let frame = FrameContext {
            transforms: &transforms,
            light: &self.light,
            elapsed: self.elapsed,
        };

        self.device.begin_frame(self.clear_color);
        for drawable in &mut self.drawables {
            if drawable.bind(&mut self.device) {
                drawable.draw(&mut self.device, &frame);
            }
        }
        let result = self.device.end_frame();
        self.frames += 1;
        self.stats.record(delta);
        result
    }

    /// Releases every drawable's GPU objects. Safe to call more than once.
    pub fn shutdown(&mut self) {
        for drawable in self.drawables.drain(..) {
            debug!("releasing drawable `{}`", drawable.name());
            drawable.release(&mut self.device);
        }
    }

    pub fn camera(&self) -> &CameraState {
        self.camera.state()
    }

    pub fn transforms(&self) -> &Transforms {
        self.transforms.transforms()
    }

    pub fn viewport(&self) -> Viewport {
        self.transforms.viewport()
    }

    pub fn light(&self) -> &SceneLight {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut SceneLight {
        &mut self.light
    }

    pub fn drawables(&self) -> &[Box<dyn Drawable>] {
        &self.drawables
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn last_frame_report(&self) -> Option<FrameReport> {
        self.stats.last_report()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: GraphicsDevice> Drop for Viewer<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load_mesh(config: &ViewerConfig) -> Result<MeshData> {
    match &config.scene.mesh {
        Some(path) => load_obj_file(path),
        None => load_obj_from_str(DEFAULT_CUBE_OBJ).context("built-in cube mesh is invalid"),
    }
}
