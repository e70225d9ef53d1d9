use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::DEFAULT_PAN;
use crate::drawables::DrawableKind;
use crate::error::{ViewerError, ViewerResult};
use crate::lighting::{Material, SceneLight};
use crate::logging::LoggingConfig;

/// Viewer settings, read from TOML. Every section and key is optional.
///
/// ```toml
/// [window]
/// title = "Phong Viewer"
/// width = 1280
/// height = 720
///
/// [scene]
/// drawables = ["axis", "mesh"]
/// mesh = "models/teapot.obj"
///
/// [scene.transform]
/// translation = [0.0, 1.0, 0.0]
/// rotation = [0.0, 45.0, 0.0]
/// scale = 2.0
///
/// [lighting]
/// mode = "flat"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub logging: LoggingConfig,
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    pub lighting: SceneLight,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Phong Viewer".into(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub initial_pan: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_pan: DEFAULT_PAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Draw order.
    pub drawables: Vec<DrawableKind>,
    /// OBJ file for the `mesh` drawable; a built-in unit cube when absent.
    pub mesh: Option<PathBuf>,
    pub clear_color: [f32; 4],
    pub animate_cube: bool,
    /// Placement of the mesh and the static cube.
    pub transform: ModelTransform,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            drawables: vec![DrawableKind::Axis, DrawableKind::Mesh],
            mesh: None,
            clear_color: [0.5, 0.5, 0.5, 1.0],
            animate_cube: true,
            transform: ModelTransform::default(),
        }
    }
}

/// Translation, XYZ Euler rotation in degrees, and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl ModelTransform {
    pub fn matrix(&self) -> Mat4 {
        let radians = self.rotation * std::f32::consts::PI / 180.0;
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, radians.x, radians.y, radians.z),
            self.translation,
        )
    }
}

impl ViewerConfig {
    pub fn from_toml_str(contents: &str) -> ViewerResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|err| ViewerError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`. A relative `scene.mesh` is resolved against the config
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if let (Some(mesh), Some(dir)) = (config.scene.mesh.as_mut(), path.parent()) {
            if mesh.is_relative() {
                *mesh = dir.join(&*mesh);
            }
        }
        Ok(config)
    }

    fn validate(&self) -> ViewerResult<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ViewerError::Config(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        let attenuation = &self.lighting.source.attenuation;
        if attenuation.constant.is_nan() || attenuation.constant <= 0.0 {
            return Err(ViewerError::Config(format!(
                "light attenuation constant {} must be positive",
                attenuation.constant
            )));
        }
        if attenuation.linear < 0.0 || attenuation.quadratic < 0.0 {
            return Err(ViewerError::Config(format!(
                "light attenuation linear {} and quadratic {} must not be negative",
                attenuation.linear, attenuation.quadratic
            )));
        }
        if self.scene.transform.scale.is_nan() || self.scene.transform.scale <= 0.0 {
            return Err(ViewerError::Config(format!(
                "model scale {} must be positive",
                self.scene.transform.scale
            )));
        }
        if self.material.shininess < 0.0 {
            return Err(ViewerError::Config(format!(
                "material shininess {} must not be negative",
                self.material.shininess
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::lighting::LightingMode;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.window.title, "Phong Viewer");
        assert_eq!(
            config.scene.drawables,
            vec![DrawableKind::Axis, DrawableKind::Mesh]
        );
        assert_eq!(config.camera.initial_pan, Vec3::new(0.0, -5.0, -15.0));
        assert_eq!(config.lighting.mode, LightingMode::PerFragment);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ViewerConfig::from_toml_str(
            r#"
            [window]
            width = 640

            [camera]
            initial_pan = [1, 2, -3]

            [lighting]
            mode = "flat"

            [lighting.source]
            cutoff_cosine = 0.5

            [material]
            shininess = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.camera.initial_pan, Vec3::new(1.0, 2.0, -3.0));
        assert_eq!(config.lighting.mode, LightingMode::Flat);
        assert_eq!(config.lighting.source.cutoff_cosine, 0.5);
        assert_eq!(config.lighting.source.direction, Vec3::NEG_Y);
        assert_eq!(config.material.shininess, 8.0);
        assert_eq!(config.material.ambient, Material::default().ambient);
    }

    #[test]
    fn unknown_drawables_are_rejected() {
        let err = ViewerConfig::from_toml_str("[scene]\ndrawables = [\"axis\", \"teapot\"]\n")
            .unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
        assert!(err.to_string().contains("teapot"), "{err}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ViewerConfig::from_toml_str("[window]\nfullscreen = true\n").is_err());
    }

    #[test]
    fn zero_window_size_is_rejected() {
        assert!(ViewerConfig::from_toml_str("[window]\nheight = 0\n").is_err());
    }

    #[test]
    fn degenerate_attenuation_is_rejected() {
        for section in [
            "[lighting.source.attenuation]\nconstant = 0.0\n",
            "[lighting.source.attenuation]\nconstant = -1.0\n",
            "[lighting.source.attenuation]\nlinear = -0.1\n",
            "[lighting.source.attenuation]\nquadratic = -0.5\n",
        ] {
            let err = ViewerConfig::from_toml_str(section).unwrap_err();
            assert!(matches!(err, ViewerError::Config(_)), "{section}");
        }
        let config =
            ViewerConfig::from_toml_str("[lighting.source.attenuation]\nlinear = 0.0\n").unwrap();
        assert_eq!(config.lighting.source.attenuation.factor(0.0), 1.0);
    }

    #[test]
    fn model_transform_builds_trs_matrix() {
        let config = ViewerConfig::from_toml_str(
            "[scene.transform]\ntranslation = [1, 2, 3]\nrotation = [0, 90, 0]\nscale = 2.0\n",
        )
        .unwrap();
        let m = config.scene.transform.matrix();
        assert!(m
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
        assert!(m
            .transform_vector3(Vec3::X)
            .abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
        assert_eq!(ModelTransform::default().matrix(), Mat4::IDENTITY);
        assert!(ViewerConfig::from_toml_str("[scene.transform]\nscale = 0.0\n").is_err());
    }

    #[test]
    fn load_resolves_mesh_relative_to_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scene]\nmesh = \"cube.obj\"").unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        let expected = file.path().parent().unwrap().join("cube.obj");
        assert_eq!(config.scene.mesh, Some(expected));
    }
}
