use std::ops::DerefMut;

use bytemuck::Pod;
use glam::{Vec2, Vec3, Vec4};

use super::layout::{AttribState, Attribute, CustomAttr, Layout};
use super::offsets::MeshOffsets;
use crate::buffer::{MappedBuffer, VboError};
use crate::color::{Color, ColorA};

/// Writes vertices into the interleaved dynamic data of a mesh, one vertex at a time.
///
/// Usually obtained from [`VboMesh::map_vertex_buffer`], in which case `B` is the mapped dynamic
/// buffer and dropping the iterator unmaps it. Writing an attribute which is not dynamic in the
/// mesh's layout panics.
///
/// ```rust,no_run
/// # use glmesh::mesh::VboMesh;
/// # use glmesh::glam::Vec3;
/// # fn fill(mesh: &mut VboMesh) -> Result<(), glmesh::mesh::MeshError> {
/// let mut iter = mesh.map_vertex_buffer()?;
/// while !iter.is_done() {
///     let x = iter.index() as f32;
///     iter.set_position(Vec3::new(x, 0.0, 0.0));
///     iter.advance();
/// }
/// iter.finish()?;
/// # Ok(())
/// # }
/// ```
///
/// [`VboMesh::map_vertex_buffer`]: struct.VboMesh.html#method.map_vertex_buffer
pub struct VertexIter<B> {
    data: B,
    cursor: usize,
    stride: usize,
    layout: Layout,
    offsets: MeshOffsets,
}

impl<B: DerefMut<Target = [u8]>> VertexIter<B> {
    /// Creates a iterator over the dynamic vertices stored in `data`, which has to be laid out
    /// as described by `offsets`.
    pub fn new(data: B, layout: &Layout, offsets: &MeshOffsets) -> VertexIter<B> {
        assert!(offsets.dynamic_stride > 0, "Layout has no dynamic vertex data");

        VertexIter {
            data,
            cursor: 0,
            stride: offsets.dynamic_stride,
            layout: layout.clone(),
            offsets: offsets.clone(),
        }
    }

    pub fn set_position(&mut self, v: Vec3) { self.write(Attribute::Positions, &v) }
    pub fn set_normal(&mut self, n: Vec3) { self.write(Attribute::Normals, &n) }
    pub fn set_color_rgb(&mut self, c: Color) { self.write(Attribute::ColorsRgb, &c) }
    pub fn set_color_rgba(&mut self, c: ColorA) { self.write(Attribute::ColorsRgba, &c) }
    pub fn set_tex_coord_2d(&mut self, unit: usize, t: Vec2) { self.write(Attribute::TexCoords2d(unit), &t) }
    pub fn set_tex_coord_3d(&mut self, unit: usize, t: Vec3) { self.write(Attribute::TexCoords3d(unit), &t) }

    pub fn set_custom_float(&mut self, index: usize, v: f32) { self.write_custom(index, CustomAttr::Float, &v) }
    pub fn set_custom_vec2(&mut self, index: usize, v: Vec2) { self.write_custom(index, CustomAttr::Float2, &v) }
    pub fn set_custom_vec3(&mut self, index: usize, v: Vec3) { self.write_custom(index, CustomAttr::Float3, &v) }
    pub fn set_custom_vec4(&mut self, index: usize, v: Vec4) { self.write_custom(index, CustomAttr::Float4, &v) }

    /// Moves on to the next vertex.
    pub fn advance(&mut self) {
        self.cursor += self.stride;
    }

    /// Returns true once the iterator has moved past the last vertex.
    pub fn is_done(&self) -> bool {
        self.cursor + self.stride > self.data.len()
    }

    /// The index of the vertex currently being written.
    pub fn index(&self) -> usize {
        self.cursor / self.stride
    }

    /// The distance in bytes between consecutive vertices.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The raw bytes of the current vertex.
    pub fn vertex_bytes(&mut self) -> &mut [u8] {
        let end = self.cursor + self.stride;
        &mut self.data[self.cursor..end]
    }

    /// Gives back the underlying storage.
    pub fn into_inner(self) -> B {
        self.data
    }

    fn write<T: Pod>(&mut self, attr: Attribute, value: &T) {
        assert!(self.layout.state(attr) == AttribState::Dynamic,
                "{:?} is not a dynamic attribute of this mesh", attr);

        let offset = self.offsets.of(attr);
        self.write_at(offset, value);
    }

    fn write_custom<T: Pod>(&mut self, index: usize, kind: CustomAttr, value: &T) {
        let (declared, _) = self.layout.custom_dynamic()[index];
        assert!(declared == kind,
                "Dynamic custom attribute {} is a {:?}, not a {:?}", index, declared, kind);

        let offset = self.offsets.custom_dynamic[index];
        self.write_at(offset, value);
    }

    fn write_at<T: Pod>(&mut self, offset: usize, value: &T) {
        let bytes = bytemuck::bytes_of(value);
        let start = self.cursor + offset;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl<'a> VertexIter<MappedBuffer<'a>> {
    /// Unmaps the dynamic buffer, reporting whether its contents survived.
    pub fn finish(self) -> Result<(), VboError> {
        self.data.unmap()
    }
}
