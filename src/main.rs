use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;

use phong_viewer::{
    init_logging, run_windowed, HeadlessDevice, PointerButton, PointerTracker, Viewer,
    ViewerConfig, WindowInitError,
};

const HEADLESS_FRAMES: u64 = 120;
const HEADLESS_DT: f32 = 1.0 / 60.0;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mut config = match &options.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(mesh) = &options.mesh {
        config.scene.mesh = Some(mesh.clone());
    }
    init_logging(&config.logging);

    if options.headless {
        return run_headless(&config, options.frames.unwrap_or(HEADLESS_FRAMES));
    }
    match run_windowed(config.clone(), options.frames) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --headless mode (set DISPLAY or install a GPU driver to enable rendering)."
            );
            run_headless(&config, options.frames.unwrap_or(HEADLESS_FRAMES))
        }
        Err(err) => Err(err),
    }
}

/// Renders `frames` frames off-screen while replaying a primary-button drag,
/// then prints where the camera and light ended up.
fn run_headless(config: &ViewerConfig, frames: u64) -> Result<()> {
    let mut viewer =
        Viewer::new(HeadlessDevice::new(), config).context("failed to start the viewer")?;
    println!(
        "Loaded {} drawable(s): {}",
        viewer.drawables().len(),
        viewer
            .drawables()
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut pointer = PointerTracker::new();
    let start = Vec2::new(config.window.width as f32, config.window.height as f32) * 0.5;
    viewer.on_pointer_event(pointer.moved(start));
    viewer.on_pointer_event(pointer.button_down(PointerButton::Primary));
    for frame in 0..frames {
        let offset = Vec2::new(frame as f32, frame as f32 * 0.25);
        viewer.on_pointer_event(pointer.moved(start + offset));
        viewer.render(HEADLESS_DT)?;
        viewer.device_mut().clear_history();
    }
    viewer.on_pointer_event(pointer.button_up(PointerButton::Primary));

    print_summary(&viewer);
    viewer.shutdown();
    Ok(())
}

fn print_summary(viewer: &Viewer<HeadlessDevice>) {
    let camera = viewer.camera();
    println!(
        "Rendered {} frame(s), {} draw call(s)",
        viewer.frames(),
        viewer.device().total_draws()
    );
    if let Some(report) = viewer.last_frame_report() {
        println!(
            "Average {:.3} ms/frame ({:.1} FPS)",
            report.ms_per_frame, report.fps
        );
    }
    println!(
        "Camera yaw={:.3} pitch={:.3} pan=({:.2}, {:.2}, {:.2})",
        camera.yaw(),
        camera.pitch(),
        camera.pan_offset.x,
        camera.pan_offset.y,
        camera.pan_offset.z
    );
    for drawable in viewer.drawables() {
        if let Some(lighting) = drawable.lighting() {
            println!(
                " - {} color=({:.2}, {:.2}, {:.2}) inside_cone={}",
                drawable.name(),
                lighting.color.x,
                lighting.color.y,
                lighting.color.z,
                lighting.inside_cone
            );
        }
    }
}

struct CliOptions {
    config: Option<PathBuf>,
    mesh: Option<PathBuf>,
    headless: bool,
    frames: Option<u64>,
}

impl CliOptions {
    const USAGE: &'static str =
        "Usage: phong-viewer [--config FILE.toml] [--mesh FILE.obj] [--headless] [--frames N]";

    fn parse() -> Result<Self> {
        let mut options = Self {
            config: None,
            mesh: None,
            headless: false,
            frames: None,
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => options.config = Some(Self::value(&mut args, &arg)?.into()),
                "--mesh" => options.mesh = Some(Self::value(&mut args, &arg)?.into()),
                "--headless" => options.headless = true,
                "--frames" => {
                    let value = Self::value(&mut args, &arg)?;
                    let frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count `{value}`"))?;
                    options.frames = Some(frames);
                }
                "-h" | "--help" => {
                    println!("{}", Self::USAGE);
                    std::process::exit(0);
                }
                other => return Err(anyhow!("Unknown argument: {other}. {}", Self::USAGE)),
            }
        }
        Ok(options)
    }

    fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
        args.next()
            .ok_or_else(|| anyhow!("{flag} expects a value. {}", Self::USAGE))
    }
}
