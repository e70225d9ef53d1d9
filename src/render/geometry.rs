use super::{
    BufferHandle, BufferKind, GraphicsDevice, IndexFormat, PrimitiveKind, VertexArrayHandle,
    VertexAttribute, VertexLayout,
};
use crate::error::{ViewerError, ViewerResult};

/// One tightly packed `f32` attribute stream.
#[derive(Debug, Clone, Copy)]
pub struct AttributeData<'a> {
    pub location: u32,
    pub components: u32,
    pub data: &'a [f32],
}

impl<'a> AttributeData<'a> {
    pub fn new(location: u32, components: u32, data: &'a [f32]) -> Self {
        Self {
            location,
            components,
            data,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self.components {
            0 => 0,
            components => self.data.len() / components as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn format(&self) -> IndexFormat {
        match self {
            Self::U16(_) => IndexFormat::U16,
            Self::U32(_) => IndexFormat::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U16(indices) => indices.len(),
            Self::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bytes(&self) -> &[u8] {
        match self {
            Self::U16(indices) => bytemuck::cast_slice(indices),
            Self::U32(indices) => bytemuck::cast_slice(indices),
        }
    }
}

/// Static vertex data on the GPU: one buffer per attribute, an optional index
/// buffer, and the layout tying them to shader locations.
#[derive(Debug)]
pub struct GeometryBuffer {
    vertex_array: VertexArrayHandle,
    attribute_buffers: Vec<BufferHandle>,
    index: Option<(BufferHandle, IndexFormat)>,
    vertex_count: u32,
    index_count: u32,
}

impl GeometryBuffer {
    /// Uploads every attribute (and the indices, if any) as static buffers.
    ///
    /// Buffers created before a failure are released again, so an `Err`
    /// leaves nothing allocated.
    pub fn upload(
        device: &mut dyn GraphicsDevice,
        attributes: &[AttributeData<'_>],
        indices: Option<&IndexData>,
        label: &str,
    ) -> ViewerResult<Self> {
        let vertex_count = validate_attributes(attributes, label)?;

        let mut created = Vec::with_capacity(attributes.len() + 1);
        let result = upload_buffers(device, attributes, indices, label, &mut created);
        match result {
            Ok((layout, index)) => match device.create_vertex_array(layout, label) {
                Ok(vertex_array) => {
                    let attribute_buffers = match index {
                        Some(_) => created[..created.len() - 1].to_vec(),
                        None => created,
                    };
                    Ok(Self {
                        vertex_array,
                        attribute_buffers,
                        index,
                        vertex_count,
                        index_count: indices.map_or(0, |i| i.len() as u32),
                    })
                }
                Err(err) => {
                    release_all(device, &created);
                    Err(err)
                }
            },
            Err(err) => {
                release_all(device, &created);
                Err(err)
            }
        }
    }

    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_format(&self) -> Option<IndexFormat> {
        self.index.map(|(_, format)| format)
    }

    /// Element count of a full draw: indices when indexed, else vertices.
    pub fn draw_count(&self) -> u32 {
        if self.index.is_some() {
            self.index_count
        } else {
            self.vertex_count
        }
    }

    /// Binds the layout, draws `count` elements and unbinds again. Primitive
    /// restart is only enabled for the duration of this call.
    pub fn bind_and_draw(
        &self,
        device: &mut dyn GraphicsDevice,
        primitive: PrimitiveKind,
        count: u32,
        restart: Option<u32>,
    ) {
        device.bind_vertex_array(Some(self.vertex_array));
        if restart.is_some() {
            device.set_primitive_restart(restart);
        }
        device.draw(primitive, count);
        if restart.is_some() {
            device.set_primitive_restart(None);
        }
        device.bind_vertex_array(None);
    }

    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        device.delete_vertex_array(self.vertex_array);
        for buffer in self.attribute_buffers {
            device.delete_buffer(buffer);
        }
        if let Some((buffer, _)) = self.index {
            device.delete_buffer(buffer);
        }
    }
}

fn validate_attributes(attributes: &[AttributeData<'_>], label: &str) -> ViewerResult<u32> {
    let invalid = |reason: String| ViewerError::invalid_geometry(label, reason);

    let Some(first) = attributes.first() else {
        return Err(invalid("no attributes".into()));
    };
    for attribute in attributes {
        if !(1..=4).contains(&attribute.components) {
            return Err(invalid(format!(
                "attribute {} has {} components",
                attribute.location, attribute.components
            )));
        }
        if attribute.data.len() % attribute.components as usize != 0 {
            return Err(invalid(format!(
                "attribute {} length {} is not a multiple of {}",
                attribute.location,
                attribute.data.len(),
                attribute.components
            )));
        }
        if attribute.vertex_count() != first.vertex_count() {
            return Err(invalid(format!(
                "attribute {} has {} vertices, attribute {} has {}",
                attribute.location,
                attribute.vertex_count(),
                first.location,
                first.vertex_count()
            )));
        }
    }
    Ok(first.vertex_count() as u32)
}

fn upload_buffers(
    device: &mut dyn GraphicsDevice,
    attributes: &[AttributeData<'_>],
    indices: Option<&IndexData>,
    label: &str,
    created: &mut Vec<BufferHandle>,
) -> ViewerResult<(VertexLayout, Option<(BufferHandle, IndexFormat)>)> {
    let mut layout = VertexLayout {
        attributes: Vec::with_capacity(attributes.len()),
        index: None,
    };
    for attribute in attributes {
        let buffer = device.create_buffer(
            BufferKind::Vertex,
            bytemuck::cast_slice(attribute.data),
            &format!("{label}.attr{}", attribute.location),
        )?;
        created.push(buffer);
        layout.attributes.push(VertexAttribute {
            location: attribute.location,
            components: attribute.components,
            buffer,
        });
    }
    if let Some(indices) = indices {
        let buffer = device.create_buffer(BufferKind::Index, indices.bytes(), &format!("{label}.index"))?;
        created.push(buffer);
        layout.index = Some((buffer, indices.format()));
    }
    let index = layout.index;
    Ok((layout, index))
}

fn release_all(device: &mut dyn GraphicsDevice, buffers: &[BufferHandle]) {
    for &buffer in buffers {
        device.delete_buffer(buffer);
    }
}
