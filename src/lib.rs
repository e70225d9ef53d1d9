//! An orbit-camera 3D viewer with Phong lighting.
//!
//! The crate is split so that everything above the graphics device can be
//! driven without a window: pointer input feeds a [`CameraController`], the
//! [`TransformPipeline`] turns its state into matrices each frame, and the
//! [`Viewer`] hands those to its drawables through the [`GraphicsDevice`]
//! trait. [`WgpuDevice`] renders to a window, [`HeadlessDevice`] records
//! commands for tests and off-screen runs.

pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod drawables;
pub mod error;
pub mod input;
pub mod lighting;
pub mod logging;
pub mod obj;
pub mod render;
pub mod transform;
pub mod viewer;

pub use app::{run_windowed, WindowInitError};
pub use camera::{CameraController, CameraState};
pub use clock::{FrameClock, FrameReport, FrameStats};
pub use config::{ModelTransform, ViewerConfig};
pub use drawables::{Drawable, DrawableKind, FrameContext};
pub use error::{ViewerError, ViewerResult};
pub use input::{PointerButton, PointerEvent, PointerTracker};
pub use lighting::{LightSource, LightingMode, LightingResult, Material, SceneLight};
pub use logging::{init_logging, LoggingConfig};
pub use obj::{load_obj_file, load_obj_from_str, MeshData};
pub use render::{GraphicsDevice, GpuProgram, HeadlessDevice, WgpuDevice};
pub use transform::{TransformPipeline, Transforms, Viewport};
pub use viewer::Viewer;
