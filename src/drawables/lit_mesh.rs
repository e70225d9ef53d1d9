use glam::{Mat4, Vec3};

use super::{Drawable, FrameContext};
use crate::error::{ViewerError, ViewerResult};
use crate::lighting::{LightingResult, Material, SurfaceSample};
use crate::obj::MeshData;
use crate::render::{
    program, shaders, AttributeData, DrawUniforms, GeometryBuffer, GpuProgram, GraphicsDevice,
    LightUniforms, MaterialUniforms, ObjectUniforms, PrimitiveKind,
};

/// An imported triangle mesh shaded by the scene light.
pub struct LitMesh {
    geometry: GeometryBuffer,
    program: GpuProgram,
    material: Material,
    obj_mat: Mat4,
    sample_normal: Vec3,
    lighting: Option<LightingResult>,
}

impl LitMesh {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        mesh: &MeshData,
        material: Material,
    ) -> ViewerResult<Self> {
        let Some(&sample_normal) = mesh.normals.first() else {
            return Err(ViewerError::Mesh("mesh has no vertices".into()));
        };
        let positions: Vec<f32> = mesh.positions.iter().flat_map(|p| p.to_array()).collect();
        let normals: Vec<f32> = mesh.normals.iter().flat_map(|n| n.to_array()).collect();
        let uvs: Vec<f32> = mesh.uvs.iter().flat_map(|uv| uv.to_array()).collect();

        let geometry = GeometryBuffer::upload(
            device,
            &[
                AttributeData::new(0, 3, &positions),
                AttributeData::new(1, 3, &normals),
                AttributeData::new(2, 2, &uvs),
            ],
            None,
            "mesh",
        )?;
        let program = program::build(
            device,
            shaders::LIT_MESH_VERTEX,
            shaders::LIT_MESH_FRAGMENT,
            "mesh",
        );
        Ok(Self {
            geometry,
            program,
            material,
            obj_mat: Mat4::IDENTITY,
            sample_normal,
            lighting: None,
        })
    }

    pub fn set_model_matrix(&mut self, obj_mat: Mat4) {
        self.obj_mat = obj_mat;
    }
}

impl Drawable for LitMesh {
    fn name(&self) -> &str {
        "mesh"
    }

    fn bind(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        self.program.bind(device)
    }

    fn draw(&mut self, device: &mut dyn GraphicsDevice, frame: &FrameContext<'_>) {
        let transforms = frame.transforms;
        let light = frame.light;

        let frag_pos = self.obj_mat.transform_point3(Vec3::ZERO);
        let sample = SurfaceSample {
            normal: self.sample_normal,
            frag_pos,
            view_direction: (transforms.camera_origin_world.truncate() - frag_pos)
                .normalize_or_zero(),
        };
        let mut source = light.source;
        let lighting = source.evaluate(&self.material, &sample, light.color, light.object_color);
        self.lighting = Some(lighting);

        device.set_uniforms(&DrawUniforms {
            object: ObjectUniforms::new(
                self.obj_mat,
                transforms.view,
                transforms.model_view_projection,
                lighting.color,
                transforms.camera_origin_world,
            ),
            material: MaterialUniforms::from(&self.material),
            light: LightUniforms::from(light),
        });
        self.geometry
            .bind_and_draw(device, PrimitiveKind::Triangles, self.geometry.draw_count(), None);
        device.use_program(None);
    }

    fn release(self: Box<Self>, device: &mut dyn GraphicsDevice) {
        self.geometry.destroy(device);
        self.program.destroy(device);
    }

    fn lighting(&self) -> Option<LightingResult> {
        self.lighting
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;
    use crate::lighting::SceneLight;
    use crate::obj::{load_obj_from_str, DEFAULT_CUBE_OBJ};
    use crate::render::HeadlessDevice;
    use crate::transform::Transforms;

    #[test]
    fn uploads_color_from_single_sample_lighting() {
        let mut device = HeadlessDevice::new();
        let mesh = load_obj_from_str(DEFAULT_CUBE_OBJ).unwrap();
        let mut lit = LitMesh::new(&mut device, &mesh, Material::default()).unwrap();
        let transforms = Transforms {
            camera_origin_world: Vec4::new(0.0, 5.0, 15.0, 1.0),
            ..Transforms::default()
        };
        let light = SceneLight::default();
        let frame = FrameContext {
            transforms: &transforms,
            light: &light,
            elapsed: 0.0,
        };

        device.begin_frame([0.0; 4]);
        assert!(lit.bind(&mut device));
        lit.draw(&mut device, &frame);
        device.end_frame().unwrap();

        let draw = &device.draws()[0];
        assert_eq!(draw.primitive, PrimitiveKind::Triangles);
        assert_eq!(draw.count, 36);
        assert!(!draw.indexed);

        let lighting = lit.lighting().unwrap();
        let uniforms = draw.uniforms.unwrap();
        assert_eq!(uniforms.color(), lighting.color);
        assert_eq!(uniforms.camera_origin(), Vec3::new(0.0, 5.0, 15.0));
        assert_eq!(uniforms.material, MaterialUniforms::from(&Material::default()));
        // Light at the origin pointing down: the sample sits inside the cone.
        assert!(lighting.inside_cone);
    }

    #[test]
    fn empty_meshes_are_rejected() {
        let mut device = HeadlessDevice::new();
        let err = LitMesh::new(&mut device, &MeshData::default(), Material::default())
            .err()
            .unwrap();
        assert!(matches!(err, ViewerError::Mesh(_)));
        assert_eq!(device.live_objects(), 0);
    }
}
