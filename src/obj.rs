use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Triangle soup in three parallel streams of equal length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Unit cube used when no mesh file is configured.
pub const DEFAULT_CUBE_OBJ: &str = "\
v -0.5 -0.5  0.5
v  0.5 -0.5  0.5
v  0.5  0.5  0.5
v -0.5  0.5  0.5
v -0.5 -0.5 -0.5
v  0.5 -0.5 -0.5
v  0.5  0.5 -0.5
v -0.5  0.5 -0.5
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
vn 0 0 -1
vn -1 0 0
vn 1 0 0
vn 0 1 0
vn 0 -1 0
f 1/1/1 2/2/1 3/3/1 4/4/1
f 6/1/2 5/2/2 8/3/2 7/4/2
f 5/1/3 1/2/3 4/3/3 8/4/3
f 2/1/4 6/2/4 7/3/4 3/4/4
f 4/1/5 3/2/5 7/3/5 8/4/5
f 5/1/6 6/2/6 2/3/6 1/4/6
";

pub fn load_obj_file(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("unable to read {}", path.display()))?;
    load_obj_from_str(&contents).with_context(|| format!("failed to parse OBJ mesh {}", path.display()))
}

/// Parses OBJ text and expands every face corner into its own vertex.
///
/// Polygons are fan-triangulated. Corners without a texture coordinate get
/// `(0, 0)`; faces without normals get their flat face normal.
pub fn load_obj_from_str(data: &str) -> Result<MeshData> {
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut normals = Vec::new();
    let mut triangles: Vec<[FaceIndex; 3]> = Vec::new();

    for (line_no, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "v" => positions.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid vertex on line {}", line_no + 1))?,
            ),
            "vt" => uvs.push(
                parse_vec2(parts)
                    .with_context(|| format!("invalid texture coordinate on line {}", line_no + 1))?,
            ),
            "vn" => normals.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid normal on line {}", line_no + 1))?,
            ),
            "f" => {
                let polygon = parse_face(parts)
                    .with_context(|| format!("invalid face on line {}", line_no + 1))?;
                triangulate_face(&polygon, &mut triangles);
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(anyhow!("OBJ file does not define any vertices"));
    }

    expand_triangles(&positions, &uvs, &normals, &triangles)
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec3> {
    let mut next = || -> Result<f32> {
        Ok(parts
            .next()
            .ok_or_else(|| anyhow!("missing vector component"))?
            .parse::<f32>()?)
    };
    Ok(Vec3::new(next()?, next()?, next()?))
}

fn parse_vec2<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec2> {
    let mut next = || -> Result<f32> {
        Ok(parts
            .next()
            .ok_or_else(|| anyhow!("missing texture component"))?
            .parse::<f32>()?)
    };
    Ok(Vec2::new(next()?, next()?))
}

fn parse_face<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Vec<FaceIndex>> {
    let mut indices = Vec::new();
    for part in parts {
        let mut segments = part.split('/');
        let v = segments
            .next()
            .ok_or_else(|| anyhow!("missing vertex index"))?
            .parse::<i32>()?;
        let vt = parse_optional_index(segments.next())?;
        let vn = parse_optional_index(segments.next())?;
        indices.push(FaceIndex { v, vt, vn });
    }
    if indices.len() < 3 {
        return Err(anyhow!("faces must reference at least 3 vertices"));
    }
    Ok(indices)
}

fn parse_optional_index(segment: Option<&str>) -> Result<i32> {
    match segment {
        None | Some("") => Ok(0),
        Some(value) => Ok(value.parse::<i32>()?),
    }
}

fn triangulate_face(polygon: &[FaceIndex], triangles: &mut Vec<[FaceIndex; 3]>) {
    for i in 1..(polygon.len() - 1) {
        triangles.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
}

#[derive(Debug, Clone, Copy)]
struct FaceIndex {
    v: i32,
    vt: i32,
    vn: i32,
}

fn expand_triangles(
    positions: &[Vec3],
    uvs: &[Vec2],
    normals: &[Vec3],
    triangles: &[[FaceIndex; 3]],
) -> Result<MeshData> {
    let mut mesh = MeshData::default();

    for triangle in triangles {
        let mut corners = [Vec3::ZERO; 3];
        for (corner, idx) in corners.iter_mut().zip(triangle) {
            let position = fix_index(idx.v, positions.len())
                .ok_or_else(|| anyhow!("invalid vertex index {}", idx.v))?;
            *corner = positions[position];
        }
        let face_normal = (corners[1] - corners[0])
            .cross(corners[2] - corners[0])
            .normalize_or_zero();

        for (corner, idx) in corners.iter().zip(triangle) {
            let uv = fix_index(idx.vt, uvs.len())
                .map(|i| uvs[i])
                .unwrap_or(Vec2::ZERO);
            let normal = fix_index(idx.vn, normals.len())
                .map(|i| normals[i])
                .unwrap_or(face_normal);
            mesh.positions.push(*corner);
            mesh.uvs.push(uv);
            mesh.normals.push(normal);
        }
    }

    Ok(mesh)
}

fn fix_index(index: i32, len: usize) -> Option<usize> {
    if index > 0 {
        let zero_based = index as usize - 1;
        (zero_based < len).then_some(zero_based)
    } else if index < 0 {
        let abs = index.unsigned_abs() as usize;
        (abs <= len).then_some(len - abs)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_triangle() {
        let obj = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.positions[1], Vec3::X);
        assert_eq!(mesh.uvs, vec![Vec2::ZERO; 3]);
    }

    #[test]
    fn computes_missing_normals_per_face() {
        let obj = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_from_str(obj).unwrap();
        for normal in &mesh.normals {
            assert_eq!(*normal, Vec3::Z);
        }
    }

    #[test]
    fn streams_stay_parallel_for_quads() {
        let mesh = load_obj_from_str(DEFAULT_CUBE_OBJ).unwrap();
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.uvs.len(), 36);
        assert_eq!(mesh.normals.len(), 36);
        assert_eq!(mesh.normals[0], Vec3::Z);
        assert_eq!(mesh.uvs[2], Vec2::ONE);
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf -3//-1 -2//-1 -1//-1\n";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.positions[2], Vec3::Y);
        assert_eq!(mesh.normals[0], Vec3::Z);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert!(load_obj_from_str(obj).is_err());
    }

    #[test]
    fn rejects_empty_files() {
        assert!(load_obj_from_str("# nothing here\n").is_err());
    }
}
