use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::{Builder, NamedTempFile};

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut tmp = Builder::new().suffix(suffix).tempfile().expect("temp file");
    tmp.write_all(contents.as_bytes()).expect("write temp file");
    tmp
}

#[test]
fn headless_run_prints_summary() {
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.args(["--headless", "--frames", "3"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded 2 drawable(s): axis, mesh"))
        .stdout(contains("Rendered 3 frame(s), 6 draw call(s)"))
        .stdout(contains("Camera yaw=0.010"))
        .stdout(contains("pan=(0.00, -5.00, -15.00)"))
        .stdout(contains(" - mesh color="));
}

#[test]
fn config_file_selects_drawables() {
    let config = write_temp(
        ".toml",
        r#"
[scene]
drawables = ["cube"]
animate_cube = false

[camera]
initial_pan = [0.0, 0.0, -10.0]
"#,
    );
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.arg("--config")
        .arg(config.path())
        .args(["--headless", "--frames", "2"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded 1 drawable(s): cube"))
        .stdout(contains("Rendered 2 frame(s), 2 draw call(s)"))
        .stdout(contains("pan=(0.00, 0.00, -10.00)"));
}

#[test]
fn mesh_flag_loads_obj_file() {
    let mesh = write_temp(
        ".obj",
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
    );
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.arg("--mesh")
        .arg(mesh.path())
        .args(["--headless", "--frames", "1"]);
    cmd.assert()
        .success()
        .stdout(contains("Rendered 1 frame(s), 2 draw call(s)"));
}

#[test]
fn unknown_drawable_is_rejected() {
    let config = write_temp(".toml", "[scene]\ndrawables = [\"teapot\"]\n");
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.arg("--config").arg(config.path()).arg("--headless");
    cmd.assert()
        .failure()
        .stderr(contains("failed to parse config"));
}

#[test]
fn missing_mesh_is_reported() {
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.args(["--mesh", "does/not/exist.obj", "--headless"]);
    cmd.assert()
        .failure()
        .stderr(contains("unable to read does/not/exist.obj"));
}

#[test]
fn unknown_argument_prints_usage() {
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.arg("--fullscreen");
    cmd.assert()
        .failure()
        .stderr(contains("Usage: phong-viewer"));
}

#[test]
fn long_headless_run_reports_frame_rate() {
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.args(["--headless", "--frames", "90"]);
    cmd.assert()
        .success()
        .stdout(contains("Rendered 90 frame(s), 180 draw call(s)"))
        .stdout(contains("ms/frame"));
}

#[test]
fn triangle_drawable_is_selectable() {
    let config = write_temp(".toml", "[scene]\ndrawables = [\"axis\", \"triangle\"]\n");
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.arg("--config")
        .arg(config.path())
        .args(["--headless", "--frames", "2"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded 2 drawable(s): axis, triangle"))
        .stdout(contains("Rendered 2 frame(s), 4 draw call(s)"));
}

#[test]
fn zero_attenuation_constant_is_rejected() {
    let config = write_temp(".toml", "[lighting.source.attenuation]\nconstant = 0.0\n");
    let mut cmd = Command::cargo_bin("phong-viewer").expect("binary exists");
    cmd.arg("--config").arg(config.path()).arg("--headless");
    cmd.assert()
        .failure()
        .stderr(contains("attenuation constant"));
}
