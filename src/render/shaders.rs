//! WGSL sources for the built-in drawables.
//!
//! Every stage is a complete module: it declares the uniform blocks it reads
//! from bind group 0 (object at binding 0, material at 1, light at 2).

macro_rules! object_block {
    () => {
        r#"
struct ObjectUniforms {
    obj_mat: mat4x4<f32>,
    mv_mat: mat4x4<f32>,
    mvp_mat: mat4x4<f32>,
    color: vec4<f32>,
    camera_origin: vec4<f32>,
}

@group(0) @binding(0) var<uniform> per_object: ObjectUniforms;
"#
    };
}

macro_rules! lighting_blocks {
    () => {
        r#"
struct Material {
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
    shininess: f32,
}

struct Light {
    position: vec3<f32>,
    cutoff_cosine: f32,
    direction: vec3<f32>,
    att_constant: f32,
    color: vec3<f32>,
    att_linear: f32,
    object_color: vec3<f32>,
    att_quadratic: f32,
    ambient_strength: f32,
    specular_strength: f32,
    mode: u32,
    padding: u32,
}

@group(0) @binding(1) var<uniform> surface: Material;
@group(0) @binding(2) var<uniform> light: Light;
"#
    };
}

pub const AXIS_VERTEX: &str = concat!(
    object_block!(),
    r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = per_object.mvp_mat * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}
"#
);

pub const AXIS_FRAGMENT: &str = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

pub const CUBE_VERTEX: &str = concat!(
    object_block!(),
    r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_normal: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = per_object.mvp_mat * per_object.obj_mat * vec4<f32>(position, 1.0);
    out.view_normal = per_object.mv_mat * per_object.obj_mat * vec4<f32>(normal, 0.0);
    return out;
}
"#
);

/// Half-lambert against the view-space up axis plus a constant 0.3 floor.
pub const CUBE_FRAGMENT: &str = concat!(
    object_block!(),
    r#"
@fragment
fn fs_main(@location(0) view_normal: vec4<f32>) -> @location(0) vec4<f32> {
    let up = per_object.mv_mat * vec4<f32>(0.0, 1.0, 0.0, 0.0);
    let base = per_object.color.xyz;
    return vec4<f32>(base * dot(view_normal, up) + base * 0.3, 1.0);
}
"#
);

pub const LIT_MESH_VERTEX: &str = concat!(
    object_block!(),
    r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) frag_pos: vec3<f32>,
    @location(2) view_normal: vec4<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = per_object.obj_mat * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = per_object.mvp_mat * world;
    out.world_normal = (per_object.obj_mat * vec4<f32>(in.normal, 0.0)).xyz;
    out.frag_pos = world.xyz;
    out.view_normal = per_object.mv_mat * per_object.obj_mat * vec4<f32>(in.normal, 0.0);
    return out;
}
"#
);

/// Phong with a point light limited to a spot cone. `mode == 1` shades with
/// the uploaded single-sample colour instead.
pub const LIT_MESH_FRAGMENT: &str = concat!(
    object_block!(),
    lighting_blocks!(),
    r#"
struct FragmentInput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) frag_pos: vec3<f32>,
    @location(2) view_normal: vec4<f32>,
}

fn normalize_or_zero(v: vec3<f32>) -> vec3<f32> {
    let len = length(v);
    if (len > 0.0) {
        return v / len;
    }
    return vec3<f32>(0.0, 0.0, 0.0);
}

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    if (light.mode == 1u) {
        let up = per_object.mv_mat * vec4<f32>(0.0, 1.0, 0.0, 0.0);
        let base = per_object.color.xyz;
        return vec4<f32>(base * dot(in.view_normal, up) + base * 0.3, 1.0);
    }

    let normal = normalize_or_zero(in.world_normal);
    let light_dir = normalize_or_zero(-light.direction);

    var ambient = light.ambient_strength * light.color;
    let diff = max(dot(normal, light_dir), 0.0);
    var diffuse = light.color * (diff * surface.diffuse);

    let view_dir = normalize_or_zero(per_object.camera_origin.xyz - in.frag_pos);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), surface.shininess);
    var specular = light.specular_strength * (spec * surface.specular);

    let dist = length(light.position - in.frag_pos);
    let attenuation = 1.0 / (light.att_constant + light.att_linear * dist + light.att_quadratic * dist * dist);
    ambient = ambient * attenuation;
    diffuse = diffuse * attenuation;
    specular = specular * attenuation;

    let theta = dot(light_dir, normalize_or_zero(-light.direction));
    var result = ambient * light.object_color;
    if (theta > light.cutoff_cosine) {
        result = (ambient + diffuse + specular) * light.object_color;
    }
    return vec4<f32>(result, 1.0);
}
"#
);

/// Positions are already in clip space.
pub const TRIANGLE_VERTEX: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
"#;

pub const TRIANGLE_FRAGMENT: &str = concat!(
    object_block!(),
    r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return per_object.color;
}
"#
);
