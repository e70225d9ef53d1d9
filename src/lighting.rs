//! Phong lighting for a single hybrid point/spot light.
//!
//! The same terms are evaluated per fragment in the lit-mesh shader; this
//! CPU evaluation produces the flat `color` uniform from one sample per draw.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Fraction of the light colour used as the stored ambient term.
pub const AMBIENT_STRENGTH: f32 = 0.6;
/// Scale applied to the specular term.
pub const SPECULAR_STRENGTH: f32 = 0.5;

/// Surface response, constant for the lifetime of a drawable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::new(1.0, 0.5, 0.31),
            diffuse: Vec3::new(1.0, 0.5, 0.31),
            specular: Vec3::splat(0.5),
            shininess: 32.0,
        }
    }
}

/// `1 / (constant + linear * d + quadratic * d^2)` falloff coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

/// One point light with a spot cone.
///
/// `ambient`, `diffuse` and `specular` are outputs rewritten by every
/// [`LightSource::evaluate`] call, not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSource {
    pub position: Vec3,
    pub direction: Vec3,
    #[serde(skip)]
    pub ambient: Vec3,
    #[serde(skip)]
    pub diffuse: Vec3,
    #[serde(skip)]
    pub specular: Vec3,
    pub attenuation: Attenuation,
    pub cutoff_cosine: f32,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            ambient: Vec3::splat(AMBIENT_STRENGTH),
            diffuse: Vec3::ZERO,
            specular: Vec3::ZERO,
            attenuation: Attenuation::default(),
            cutoff_cosine: 12.5_f32.to_radians().cos(),
        }
    }
}

/// Which lighting result the lit mesh shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingMode {
    /// Terms evaluated in the fragment shader over interpolated inputs.
    #[default]
    PerFragment,
    /// The CPU single-sample colour, uploaded as `color`.
    Flat,
}

/// The scene's one light plus the colours it is evaluated with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLight {
    pub source: LightSource,
    pub color: Vec3,
    pub object_color: Vec3,
    pub mode: LightingMode,
}

impl Default for SceneLight {
    fn default() -> Self {
        Self {
            source: LightSource::default(),
            color: Vec3::new(0.9, 0.1, 0.1),
            object_color: Vec3::new(0.9, 0.1, 0.1),
            mode: LightingMode::default(),
        }
    }
}

/// Per-draw sample the lighting is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub normal: Vec3,
    pub frag_pos: Vec3,
    pub view_direction: Vec3,
}

/// Everything one evaluation produced; `color` is what gets uploaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingResult {
    /// `light_color * material.ambient`; reported, not used in `color`.
    pub ambient_base: Vec3,
    pub attenuation: f32,
    pub theta: f32,
    pub inside_cone: bool,
    pub color: Vec4,
}

/// Strict spot test: a fragment exactly on the cone edge is outside.
pub fn inside_cone(theta: f32, cutoff_cosine: f32) -> bool {
    theta > cutoff_cosine
}

/// Mirrors `incident` about `normal` (`I - 2 (N . I) N`).
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

impl LightSource {
    /// Direction the surface sees the light from.
    pub fn light_dir(&self) -> Vec3 {
        (-self.direction).normalize_or_zero()
    }

    /// Updates the ambient/diffuse/specular terms for `sample` and returns the
    /// lit colour of an object painted `object_color`.
    pub fn evaluate(
        &mut self,
        material: &Material,
        sample: &SurfaceSample,
        light_color: Vec3,
        object_color: Vec3,
    ) -> LightingResult {
        let ambient_base = light_color * material.ambient;
        self.ambient = AMBIENT_STRENGTH * light_color;

        let normal = sample.normal.normalize_or_zero();
        let light_dir = self.light_dir();
        let diff = normal.dot(light_dir).max(0.0);
        self.diffuse = light_color * (diff * material.diffuse);

        let reflect_dir = reflect(-light_dir, normal);
        let spec = sample
            .view_direction
            .dot(reflect_dir)
            .max(0.0)
            .powf(material.shininess);
        self.specular = SPECULAR_STRENGTH * (spec * material.specular);

        let distance = (self.position - sample.frag_pos).length();
        let attenuation = self.attenuation.factor(distance);
        self.ambient *= attenuation;
        self.diffuse *= attenuation;
        self.specular *= attenuation;

        let theta = light_dir.dot((-self.direction).normalize_or_zero());
        let inside = inside_cone(theta, self.cutoff_cosine);
        let result = if inside {
            (self.ambient + self.diffuse + self.specular) * object_color
        } else {
            self.ambient * object_color
        };

        LightingResult {
            ambient_base,
            attenuation,
            theta,
            inside_cone: inside,
            color: result.extend(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Vec3 = Vec3::new(0.9, 0.1, 0.1);

    fn sample_at(frag_pos: Vec3) -> SurfaceSample {
        SurfaceSample {
            normal: Vec3::Y,
            frag_pos,
            view_direction: Vec3::Y,
        }
    }

    #[test]
    fn attenuation_at_zero_distance_is_inverse_constant() {
        let attenuation = Attenuation {
            constant: 4.0,
            linear: 0.7,
            quadratic: 1.8,
        };
        assert_eq!(attenuation.factor(0.0), 0.25);

        let mut light = LightSource {
            attenuation,
            ..LightSource::default()
        };
        let result = light.evaluate(&Material::default(), &sample_at(Vec3::ZERO), RED, RED);
        assert_eq!(result.attenuation, 0.25);
    }

    #[test]
    fn attenuation_falls_off_with_distance() {
        let attenuation = Attenuation::default();
        let expected = 1.0 / (1.0 + 0.09 * 10.0 + 0.032 * 100.0);
        assert!((attenuation.factor(10.0) - expected).abs() < 1e-6);
        assert!(attenuation.factor(10.0) < attenuation.factor(1.0));
    }

    #[test]
    fn cone_edge_is_outside() {
        assert!(!inside_cone(0.5, 0.5));
        assert!(inside_cone(0.5001, 0.5));
    }

    #[test]
    fn theta_equal_to_cutoff_gives_ambient_only() {
        let mut light = LightSource {
            cutoff_cosine: 1.0,
            ..LightSource::default()
        };
        let material = Material::default();
        let result = light.evaluate(&material, &sample_at(Vec3::ZERO), RED, RED);
        assert_eq!(result.theta, 1.0);
        assert!(!result.inside_cone);
        let ambient_only = (AMBIENT_STRENGTH * RED * result.attenuation) * RED;
        assert!(result.color.truncate().abs_diff_eq(ambient_only, 1e-6));
    }

    #[test]
    fn inside_cone_sums_all_terms() {
        let mut light = LightSource::default();
        let material = Material::default();
        let result = light.evaluate(&material, &sample_at(Vec3::ZERO), RED, RED);
        assert!(result.inside_cone);
        // Light shines straight down onto an up-facing surface; the viewer
        // looks along the reflection, so diffuse and specular peak.
        assert!(light.diffuse.abs_diff_eq(RED * material.diffuse, 1e-6));
        assert!(light.specular.abs_diff_eq(SPECULAR_STRENGTH * material.specular, 1e-6));
        let expected = (light.ambient + light.diffuse + light.specular) * RED;
        assert!(result.color.truncate().abs_diff_eq(expected, 1e-6));
        assert_eq!(result.color.w, 1.0);
    }

    #[test]
    fn back_facing_surface_gets_no_diffuse() {
        let mut light = LightSource::default();
        let sample = SurfaceSample {
            normal: Vec3::NEG_Y,
            frag_pos: Vec3::ZERO,
            view_direction: Vec3::Y,
        };
        light.evaluate(&Material::default(), &sample, RED, RED);
        assert_eq!(light.diffuse, Vec3::ZERO);
    }

    #[test]
    fn terms_scale_with_attenuation() {
        let mut near = LightSource::default();
        let mut far = LightSource::default();
        let material = Material::default();
        near.evaluate(&material, &sample_at(Vec3::ZERO), RED, RED);
        let result = far.evaluate(&material, &sample_at(Vec3::new(0.0, -4.0, 0.0)), RED, RED);
        assert!(far.ambient.abs_diff_eq(near.ambient * result.attenuation, 1e-6));
        assert!(far.diffuse.abs_diff_eq(near.diffuse * result.attenuation, 1e-6));
    }

    #[test]
    fn ambient_base_uses_material_ambient() {
        let mut light = LightSource::default();
        let material = Material::default();
        let result = light.evaluate(&material, &sample_at(Vec3::ZERO), RED, RED);
        assert_eq!(result.ambient_base, RED * material.ambient);
    }

    #[test]
    fn zero_direction_does_not_produce_nan() {
        let mut light = LightSource {
            direction: Vec3::ZERO,
            ..LightSource::default()
        };
        let result = light.evaluate(&Material::default(), &sample_at(Vec3::ZERO), RED, RED);
        assert!(result.color.is_finite());
        assert!(!result.inside_cone);
    }

    #[test]
    fn reflect_mirrors_about_normal() {
        let reflected = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(reflected, Vec3::new(1.0, 1.0, 0.0));
    }
}
