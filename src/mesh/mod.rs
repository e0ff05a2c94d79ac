//! Meshes stored as a set of OpenGL buffers, described by a [`Layout`].
//!
//! A [`VboMesh`] owns up to three buffers: one for indices, one for static vertex data and one for
//! dynamic vertex data. Dynamic data is always interleaved. Static data is planar when the mesh is
//! created from raw counts and interleaved when it is created from a [`TriMesh`].
//!
//! Vertex data reaches shaders through generic vertex attributes. [`AttribLocations`] decides
//! which attribute location each builtin attribute is bound to, custom attributes have their
//! locations assigned per mesh.

mod layout;
mod offsets;
mod tri_mesh;
mod vertex_iter;

pub use self::layout::*;
pub use self::offsets::MeshOffsets;
pub use self::tri_mesh::*;
pub use self::vertex_iter::*;

use std::ptr;

use bytemuck::Pod;
use gl::types::*;
use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::buffer::{BufferTarget, BufferUsage, MappedBuffer, PrimitiveMode, Vbo, VboError};
use crate::color::{Color, ColorA};
use self::offsets::write_strided;

/// Errors raised when uploading data to a [`VboMesh`].
#[derive(Error, Debug)]
pub enum MeshError {
    #[error(transparent)]
    Vbo(#[from] VboError),
    #[error("{0:?} is not part of the mesh layout")]
    MissingAttribute(Attribute),
    #[error("Can not store {given} elements of {attribute:?}, the mesh only has room for {capacity}")]
    TooManyElements { attribute: Attribute, given: usize, capacity: usize },
    #[error("Source mesh has {given} elements of {attribute:?}, expected {expected}")]
    SourceMismatch { attribute: Attribute, expected: usize, given: usize },
    #[error("Mesh has no dynamic vertex data")]
    NoDynamicBuffer,
}

/// The generic vertex attribute locations builtin attributes are bound to. Texture coordinates
/// for unit `n` are bound to `tex_coord_base + n`.
///
/// The defaults match shaders declaring
/// ```glsl
/// layout(location = 0) in vec3 position;
/// layout(location = 1) in vec3 normal;
/// layout(location = 2) in vec4 color; // or vec3
/// layout(location = 3) in vec2 tex_coord_0;
/// ```
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttribLocations {
    pub position: GLuint,
    pub normal: GLuint,
    pub color: GLuint,
    pub tex_coord_base: GLuint,
}

impl Default for AttribLocations {
    fn default() -> AttribLocations {
        AttribLocations {
            position: 0,
            normal: 1,
            color: 2,
            tex_coord_base: 3,
        }
    }
}

impl AttribLocations {
    fn of(&self, attr: Attribute) -> Option<GLuint> {
        match attr {
            Attribute::Indices => None,
            Attribute::Positions => Some(self.position),
            Attribute::Normals => Some(self.normal),
            Attribute::ColorsRgb | Attribute::ColorsRgba => Some(self.color),
            Attribute::TexCoords2d(unit) | Attribute::TexCoords3d(unit) => Some(self.tex_coord_base + unit as GLuint),
        }
    }
}

/// The data needed for a call to `gl::VertexAttribPointer` for a floating point attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribPointer {
    /// The vertex attribute to which this binding will serve values.
    pub location: GLuint,
    /// Number of floats per vertex
    pub components: usize,
    /// The distance, in bytes, between each set of primitives. 0 means tightly packed.
    pub stride: usize,
    /// The index, in bytes, of the first byte of data
    pub offset: usize,
}

impl AttribPointer {
    /// Calls `gl::EnableVertexAttribArray` and `gl::VertexAttribPointer`. The buffer to pull
    /// data from has to be bound to `gl::ARRAY_BUFFER`.
    fn enable(&self) {
        unsafe {
            gl::EnableVertexAttribArray(self.location);
            gl::VertexAttribPointer(
                self.location, self.components as GLint,
                gl::FLOAT, gl::FALSE,
                self.stride as GLsizei, self.offset as *const GLvoid,
            );
        }
    }
}

/// Lists the attribute pointers of a mesh, together with whether each reads from the static or
/// the dynamic buffer. Custom attributes whose location is unset (negative) are skipped.
pub fn attrib_pointers(layout: &Layout, offsets: &MeshOffsets, locations: &AttribLocations,
                       custom_static_locations: &[GLint], custom_dynamic_locations: &[GLint])
    -> Vec<(AttribState, AttribPointer)>
{
    let mut result = Vec::new();

    for &(state, stride, custom, custom_locations, custom_offsets) in [
        (AttribState::Static, offsets.static_stride, layout.custom_static(), custom_static_locations, &offsets.custom_static),
        (AttribState::Dynamic, offsets.dynamic_stride, layout.custom_dynamic(), custom_dynamic_locations, &offsets.custom_dynamic),
    ].iter() {
        for attr in layout.vertex_attributes(state) {
            if let Some(location) = locations.of(attr) {
                result.push((state, AttribPointer {
                    location,
                    components: attr.components(),
                    stride,
                    offset: offsets.of(attr),
                }));
            }
        }

        for ((kind, _), (&location, &offset)) in custom.iter().zip(custom_locations.iter().zip(custom_offsets.iter())) {
            if location >= 0 {
                result.push((state, AttribPointer {
                    location: location as GLuint,
                    components: kind.components(),
                    stride,
                    offset,
                }));
            }
        }
    }

    result
}

/// Where the data for one attribute goes: which buffer, and at which offset and stride. A
/// stride of 0 means the attribute is stored as one planar block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UploadTarget {
    state: AttribState,
    offset: usize,
    stride: usize,
}

/// Checks an upload of `len` elements of `attr` against the layout of a mesh.
fn upload_target(layout: &Layout, offsets: &MeshOffsets, num_vertices: usize, attr: Attribute, len: usize)
    -> Result<UploadTarget, MeshError>
{
    debug_assert!(attr != Attribute::Indices, "Indices are uploaded through buffer_indices");

    let state = layout.state(attr);
    let stride = match state {
        AttribState::Static  => offsets.static_stride,
        AttribState::Dynamic => offsets.dynamic_stride,
        AttribState::Unset   => return Err(MeshError::MissingAttribute(attr)),
    };

    if len > num_vertices {
        return Err(MeshError::TooManyElements { attribute: attr, given: len, capacity: num_vertices });
    }

    Ok(UploadTarget { state, offset: offsets.of(attr), stride })
}

/// Checks an upload of `len` indices, returning the usage hint for the index buffer.
fn index_usage(layout: &Layout, num_indices: usize, len: usize) -> Result<BufferUsage, MeshError> {
    let usage = match layout.state(Attribute::Indices) {
        AttribState::Static  => BufferUsage::StaticDraw,
        AttribState::Dynamic => BufferUsage::StreamDraw,
        AttribState::Unset   => return Err(MeshError::MissingAttribute(Attribute::Indices)),
    };

    if len > num_indices {
        return Err(MeshError::TooManyElements { attribute: Attribute::Indices, given: len, capacity: num_indices });
    }
    Ok(usage)
}

/// Reuses `adopted` if its storage holds at least `bytes` bytes. Otherwise allocates storage on
/// it, or on a new buffer if none was given.
fn adopt_or_create(adopted: Option<Vbo>, target: BufferTarget, bytes: usize, usage: BufferUsage) -> Vbo {
    let vbo = match adopted {
        Some(vbo) if vbo.size() >= bytes => return vbo,
        Some(vbo) => {
            log::debug!("Reallocating adopted buffer {}, {} bytes is too small for {}", vbo.id(), vbo.size(), bytes);
            vbo
        },
        None => Vbo::new(target),
    };
    vbo.allocate(bytes, usage);
    vbo
}

struct VertexArray {
    array: GLuint,
}

impl VertexArray {
    fn new() -> VertexArray {
        let mut array = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut array);
        }
        VertexArray { array }
    }

    fn bind(&self) {
        unsafe {
            gl::BindVertexArray(self.array);
        }
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.array);
        }
    }
}

/// A complete mesh stored in OpenGL buffers.
///
/// # Example - Raw vertex data
/// ```rust,no_run
/// use glmesh::buffer::PrimitiveMode;
/// use glmesh::mesh::{Layout, VboMesh};
/// use glmesh::glam::Vec2;
///
/// # fn main() -> Result<(), glmesh::mesh::MeshError> {
/// const VERTICES_X: usize = 250;
/// const VERTICES_Z: usize = 50;
///
/// let mut layout = Layout::new();
/// layout.set_static_indices();
/// layout.set_dynamic_positions();
/// layout.set_static_tex_coords_2d(0);
///
/// let quads = (VERTICES_X - 1) * (VERTICES_Z - 1);
/// let mesh = VboMesh::new(VERTICES_X * VERTICES_Z, quads * 6, layout, PrimitiveMode::Triangles);
///
/// let mut indices = Vec::new();
/// let mut tex_coords = Vec::new();
/// for x in 0..VERTICES_X {
///     for z in 0..VERTICES_Z {
///         if x + 1 < VERTICES_X && z + 1 < VERTICES_Z {
///             let corner = |dx: usize, dz: usize| ((x + dx) * VERTICES_Z + z + dz) as u32;
///             indices.extend_from_slice(&[corner(0, 0), corner(1, 0), corner(1, 1)]);
///             indices.extend_from_slice(&[corner(0, 0), corner(1, 1), corner(0, 1)]);
///         }
///         tex_coords.push(Vec2::new(x as f32 / VERTICES_X as f32, z as f32 / VERTICES_Z as f32));
///     }
/// }
///
/// mesh.buffer_indices(&indices)?;
/// mesh.buffer_tex_coords_2d(0, &tex_coords)?;
/// # Ok(())
/// # }
/// ```
pub struct VboMesh {
    num_vertices: usize,
    num_indices: usize,
    primitive_mode: PrimitiveMode,

    layout: Layout,
    offsets: MeshOffsets,
    locations: AttribLocations,
    custom_static_locations: Vec<GLint>,
    custom_dynamic_locations: Vec<GLint>,

    index_vbo: Option<Vbo>,
    static_vbo: Option<Vbo>,
    dynamic_vbo: Option<Vbo>,
    vao: VertexArray,
}

impl VboMesh {
    /// Creates a mesh with room for the given number of vertices and indices. Dynamic data is
    /// stored interleaved and static data is planar.
    pub fn new(num_vertices: usize, num_indices: usize, layout: Layout, primitive_mode: PrimitiveMode) -> VboMesh {
        VboMesh::with_buffers(num_vertices, num_indices, layout, primitive_mode, None, None, None)
    }

    /// Same as [`new`](#method.new), but adopts the given buffers instead of creating new ones
    /// where they are passed. Adopted buffers keep their contents, unless their storage is too
    /// small for the layout, in which case it is reallocated.
    pub fn with_buffers(num_vertices: usize, num_indices: usize, layout: Layout, primitive_mode: PrimitiveMode,
                        index_vbo: Option<Vbo>, static_vbo: Option<Vbo>, dynamic_vbo: Option<Vbo>)
        -> VboMesh
    {
        VboMesh::initialize(num_vertices, num_indices, layout, primitive_mode,
                            [index_vbo, static_vbo, dynamic_vbo], true)
    }

    /// Uploads the given triangle mesh. Static data is stored interleaved. If `layout` is `None`
    /// or has no attributes set it is inferred from the data present in `mesh`.
    pub fn from_tri_mesh(mesh: &TriMesh, layout: Option<Layout>) -> Result<VboMesh, MeshError> {
        let layout = match layout {
            Some(layout) if !layout.is_defaults() => layout,
            _ => mesh.infer_layout(),
        };

        let vbo_mesh = VboMesh::initialize(mesh.num_vertices(), mesh.num_indices(), layout,
                                           PrimitiveMode::Triangles, [None, None, None], false);

        if vbo_mesh.layout.has_static_indices() {
            vbo_mesh.buffer_indices(&mesh.indices)?;
        }
        if let Some(ref static_vbo) = vbo_mesh.static_vbo {
            let data = mesh.pack_static(&vbo_mesh.layout, &vbo_mesh.offsets)?;
            static_vbo.buffer_sub_data(0, &data);
        }

        VboMesh::unbind_buffers();
        Ok(vbo_mesh)
    }

    /// Uploads the given two dimensional triangle mesh, in the `z = 0` plane. See
    /// [`from_tri_mesh`](#method.from_tri_mesh).
    pub fn from_tri_mesh_2d(mesh: &TriMesh2d, layout: Option<Layout>) -> Result<VboMesh, MeshError> {
        VboMesh::from_tri_mesh(&TriMesh::from(mesh), layout)
    }

    fn initialize(num_vertices: usize, num_indices: usize, mut layout: Layout, primitive_mode: PrimitiveMode,
                  buffers: [Option<Vbo>; 3], static_planar: bool)
        -> VboMesh
    {
        let offsets = MeshOffsets::compute(&layout, num_vertices, static_planar);
        offsets.apply_to(&mut layout);

        let [index_vbo, static_vbo, dynamic_vbo] = buffers;

        let index_vbo = if layout.has_indices() {
            let usage = if layout.has_static_indices() { BufferUsage::StaticDraw } else { BufferUsage::StreamDraw };
            Some(adopt_or_create(index_vbo, BufferTarget::ElementArray, num_indices * 4, usage))
        } else {
            None
        };

        let static_vbo = if layout.needs_static_buffer() {
            Some(adopt_or_create(static_vbo, BufferTarget::Array, offsets.static_bytes, BufferUsage::StaticDraw))
        } else {
            None
        };

        let dynamic_vbo = if layout.needs_dynamic_buffer() {
            Some(adopt_or_create(dynamic_vbo, BufferTarget::Array, offsets.dynamic_bytes, BufferUsage::StreamDraw))
        } else {
            None
        };

        log::debug!("Created mesh with {} vertices, {} indices, static stride {}, dynamic stride {}",
                    num_vertices, num_indices, offsets.static_stride, offsets.dynamic_stride);

        VboMesh {
            num_vertices,
            num_indices,
            primitive_mode,

            custom_static_locations: vec![-1; layout.custom_static().len()],
            custom_dynamic_locations: vec![-1; layout.custom_dynamic().len()],
            layout,
            offsets,
            locations: AttribLocations::default(),

            index_vbo,
            static_vbo,
            dynamic_vbo,
            vao: VertexArray::new(),
        }
    }

    pub fn num_indices(&self) -> usize { self.num_indices }
    pub fn num_vertices(&self) -> usize { self.num_vertices }
    pub fn primitive_mode(&self) -> PrimitiveMode { self.primitive_mode }
    pub fn layout(&self) -> &Layout { &self.layout }
    pub fn offsets(&self) -> &MeshOffsets { &self.offsets }

    pub fn index_vbo(&self) -> Option<&Vbo> { self.index_vbo.as_ref() }
    pub fn static_vbo(&self) -> Option<&Vbo> { self.static_vbo.as_ref() }
    pub fn dynamic_vbo(&self) -> Option<&Vbo> { self.dynamic_vbo.as_ref() }

    pub fn tex_coord_offset(&self, unit: usize) -> usize {
        self.offsets.tex_coord[unit]
    }

    /// Overrides the byte offset texture coordinates for the given unit are read from.
    pub fn set_tex_coord_offset(&mut self, unit: usize, offset: usize) {
        self.offsets.tex_coord[unit] = offset;
    }

    pub fn attrib_locations(&self) -> AttribLocations {
        self.locations
    }

    pub fn set_attrib_locations(&mut self, locations: AttribLocations) {
        self.locations = locations;
    }

    /// Assigns the attribute location the static custom attribute at `index` is bound to. Panics
    /// if the layout has no such attribute.
    pub fn set_custom_static_location(&mut self, index: usize, location: GLuint) {
        self.custom_static_locations[index] = location as GLint;
    }

    /// Assigns the attribute location the dynamic custom attribute at `index` is bound to. Panics
    /// if the layout has no such attribute.
    pub fn set_custom_dynamic_location(&mut self, index: usize, location: GLuint) {
        self.custom_dynamic_locations[index] = location as GLint;
    }

    /// Replaces the contents of the index buffer.
    pub fn buffer_indices(&self, indices: &[u32]) -> Result<(), MeshError> {
        let usage = index_usage(&self.layout, self.num_indices, indices.len())?;
        let vbo = self.index_vbo.as_ref().ok_or(MeshError::MissingAttribute(Attribute::Indices))?;
        vbo.buffer_data(indices, usage);
        Ok(())
    }

    pub fn buffer_positions(&self, positions: &[Vec3]) -> Result<(), MeshError> {
        self.buffer_attribute(Attribute::Positions, positions)
    }

    pub fn buffer_normals(&self, normals: &[Vec3]) -> Result<(), MeshError> {
        self.buffer_attribute(Attribute::Normals, normals)
    }

    pub fn buffer_tex_coords_2d(&self, unit: usize, tex_coords: &[Vec2]) -> Result<(), MeshError> {
        self.buffer_attribute(Attribute::TexCoords2d(unit), tex_coords)
    }

    pub fn buffer_tex_coords_3d(&self, unit: usize, tex_coords: &[Vec3]) -> Result<(), MeshError> {
        self.buffer_attribute(Attribute::TexCoords3d(unit), tex_coords)
    }

    pub fn buffer_colors_rgb(&self, colors: &[Color]) -> Result<(), MeshError> {
        self.buffer_attribute(Attribute::ColorsRgb, colors)
    }

    pub fn buffer_colors_rgba(&self, colors: &[ColorA]) -> Result<(), MeshError> {
        self.buffer_attribute(Attribute::ColorsRgba, colors)
    }

    /// Writes one attribute for the first `data.len()` vertices. Planar data is written directly,
    /// interleaved data is scattered through a mapping of the buffer.
    fn buffer_attribute<T: Pod>(&self, attr: Attribute, data: &[T]) -> Result<(), MeshError> {
        let target = upload_target(&self.layout, &self.offsets, self.num_vertices, attr, data.len())?;
        let vbo = match target.state {
            AttribState::Static => self.static_vbo.as_ref(),
            _ => self.dynamic_vbo.as_ref(),
        };
        let vbo = vbo.ok_or(MeshError::MissingAttribute(attr))?;

        if target.stride == 0 {
            vbo.buffer_sub_data(target.offset, data);
        } else {
            // Other attributes share the buffer, so existing bytes have to survive
            let mut mapped = vbo.map_read_write()?;
            write_strided(&mut mapped, target.offset, target.stride, attr.bytes(), bytemuck::cast_slice(data));
            mapped.unmap()?;
        }
        Ok(())
    }

    /// Maps the dynamic buffer for writing, returning a iterator over its vertices.
    pub fn map_vertex_buffer(&self) -> Result<VertexIter<MappedBuffer<'_>>, MeshError> {
        let vbo = self.dynamic_vbo.as_ref().ok_or(MeshError::NoDynamicBuffer)?;
        let mapped = vbo.map_read_write()?;
        Ok(VertexIter::new(mapped, &self.layout, &self.offsets))
    }

    fn pointers(&self) -> Vec<(AttribState, AttribPointer)> {
        attrib_pointers(&self.layout, &self.offsets, &self.locations,
                        &self.custom_static_locations, &self.custom_dynamic_locations)
    }

    /// Binds the index buffer, if this mesh has one.
    pub fn bind_index_buffer(&self) {
        if let Some(ref vbo) = self.index_vbo {
            vbo.bind();
        }
    }

    /// Enables the vertex attribute arrays used by this mesh on its vertex array object.
    pub fn enable_attributes(&self) {
        self.vao.bind();
        for (_, pointer) in self.pointers() {
            unsafe { gl::EnableVertexAttribArray(pointer.location); }
        }
    }

    /// Disables the vertex attribute arrays used by this mesh on its vertex array object.
    pub fn disable_attributes(&self) {
        self.vao.bind();
        for (_, pointer) in self.pointers() {
            unsafe { gl::DisableVertexAttribArray(pointer.location); }
        }
    }

    /// Binds the vertex array object of this mesh and points every attribute at its buffer. After
    /// this the mesh is ready to be drawn.
    pub fn bind_all_data(&self) {
        self.vao.bind();

        for (state, pointer) in self.pointers() {
            let vbo = match state {
                AttribState::Static => self.static_vbo.as_ref(),
                _ => self.dynamic_vbo.as_ref(),
            };
            if let Some(vbo) = vbo {
                vbo.bind();
                pointer.enable();
            }
        }

        self.bind_index_buffer();
    }

    /// Unbinds any vertex array object and any array or element array buffer.
    pub fn unbind_buffers() {
        unsafe {
            gl::BindVertexArray(0);
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, 0);
        }
    }

    /// Draws this mesh with its primitive mode, using the index buffer if there is one.
    pub fn draw(&self) {
        self.bind_all_data();

        unsafe {
            if self.index_vbo.is_some() {
                gl::DrawElements(self.primitive_mode as GLenum, self.num_indices as GLsizei,
                                 gl::UNSIGNED_INT, ptr::null());
            } else {
                gl::DrawArrays(self.primitive_mode as GLenum, 0, self.num_vertices as GLsizei);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_attributes_use_default_locations() {
        let mut layout = Layout::new();
        layout.set_static_indices();
        layout.set_static_positions();
        layout.set_dynamic_colors_rgba();
        layout.set_dynamic_tex_coords_2d(2);

        let offsets = MeshOffsets::compute(&layout, 8, true);
        let pointers = attrib_pointers(&layout, &offsets, &AttribLocations::default(), &[], &[]);

        assert_eq!(vec![
            (AttribState::Static, AttribPointer { location: 0, components: 3, stride: 0, offset: 0 }),
            (AttribState::Dynamic, AttribPointer { location: 2, components: 4, stride: 24, offset: 0 }),
            (AttribState::Dynamic, AttribPointer { location: 5, components: 2, stride: 24, offset: 16 }),
        ], pointers);
    }

    #[test]
    fn unset_custom_locations_are_skipped() {
        let mut layout = Layout::new();
        layout.set_dynamic_positions();
        layout.add_dynamic_custom_float();
        layout.add_dynamic_custom_vec2();

        let offsets = MeshOffsets::compute(&layout, 1, true);
        let pointers = attrib_pointers(&layout, &offsets, &AttribLocations::default(), &[], &[-1, 7]);

        assert_eq!(2, pointers.len());
        assert_eq!(AttribPointer { location: 7, components: 2, stride: 24, offset: 16 }, pointers[1].1);
    }

    #[test]
    fn custom_locations_follow_configuration() {
        let mut layout = Layout::new();
        layout.set_static_normals();
        let locations = AttribLocations { normal: 9, ..AttribLocations::default() };

        let offsets = MeshOffsets::compute(&layout, 4, false);
        let pointers = attrib_pointers(&layout, &offsets, &locations, &[], &[]);
        assert_eq!(AttribPointer { location: 9, components: 3, stride: 12, offset: 0 }, pointers[0].1);
    }

    fn interleaved_layout() -> (Layout, MeshOffsets) {
        let mut layout = Layout::new();
        layout.set_static_indices();
        layout.set_dynamic_positions();
        layout.set_dynamic_colors_rgba();
        let offsets = MeshOffsets::compute(&layout, 4, true);
        (layout, offsets)
    }

    #[test]
    fn uploading_absent_attribute_fails() {
        let (layout, offsets) = interleaved_layout();
        match upload_target(&layout, &offsets, 4, Attribute::Normals, 4) {
            Err(MeshError::MissingAttribute(Attribute::Normals)) => (),
            other => panic!("Expected missing normals, got {:?}", other),
        }
    }

    #[test]
    fn uploading_more_than_vertex_count_fails() {
        let (layout, offsets) = interleaved_layout();
        match upload_target(&layout, &offsets, 4, Attribute::Positions, 5) {
            Err(MeshError::TooManyElements { attribute, given, capacity }) => {
                assert_eq!(Attribute::Positions, attribute);
                assert_eq!(5, given);
                assert_eq!(4, capacity);
            },
            other => panic!("Expected too many elements, got {:?}", other),
        }
        assert!(upload_target(&layout, &offsets, 4, Attribute::Positions, 3).is_ok());
    }

    #[test]
    fn interleaved_uploads_use_dynamic_stride() {
        let (layout, offsets) = interleaved_layout();
        let target = upload_target(&layout, &offsets, 4, Attribute::ColorsRgba, 4).unwrap();
        assert_eq!(UploadTarget { state: AttribState::Dynamic, offset: 12, stride: 28 }, target);
    }

    #[test]
    fn planar_uploads_have_no_stride() {
        let mut layout = Layout::new();
        layout.set_static_positions();
        layout.set_static_normals();
        let offsets = MeshOffsets::compute(&layout, 4, true);

        let target = upload_target(&layout, &offsets, 4, Attribute::Normals, 4).unwrap();
        assert_eq!(UploadTarget { state: AttribState::Static, offset: 48, stride: 0 }, target);
    }

    #[test]
    fn replaced_color_format_can_not_be_uploaded() {
        let mut layout = Layout::new();
        layout.set_static_colors_rgba();
        layout.set_static_colors_rgb();
        let offsets = MeshOffsets::compute(&layout, 2, true);

        match upload_target(&layout, &offsets, 2, Attribute::ColorsRgba, 2) {
            Err(MeshError::MissingAttribute(Attribute::ColorsRgba)) => (),
            other => panic!("Expected missing rgba colors, got {:?}", other),
        }
        assert!(upload_target(&layout, &offsets, 2, Attribute::ColorsRgb, 2).is_ok());
    }

    #[test]
    fn index_uploads_follow_index_state() {
        let (mut layout, _) = interleaved_layout();
        assert_eq!(BufferUsage::StaticDraw, index_usage(&layout, 6, 6).unwrap());

        match index_usage(&layout, 6, 7) {
            Err(MeshError::TooManyElements { attribute: Attribute::Indices, given: 7, capacity: 6 }) => (),
            other => panic!("Expected too many indices, got {:?}", other),
        }

        layout.set_dynamic_indices();
        assert_eq!(BufferUsage::StreamDraw, index_usage(&layout, 6, 3).unwrap());

        match index_usage(&Layout::new(), 6, 3) {
            Err(MeshError::MissingAttribute(Attribute::Indices)) => (),
            other => panic!("Expected missing indices, got {:?}", other),
        }
    }

    #[test]
    fn large_enough_buffers_are_adopted_as_is() {
        let adopted = Vbo::detached(BufferTarget::Array, 64);
        let vbo = adopt_or_create(Some(adopted.clone()), BufferTarget::Array, 48, BufferUsage::StaticDraw);
        assert_eq!(adopted, vbo);
        assert_eq!(64, vbo.size());
    }

    #[test]
    fn errors_describe_the_attribute() {
        let err = MeshError::TooManyElements { attribute: Attribute::Normals, given: 5, capacity: 4 };
        assert_eq!("Can not store 5 elements of Normals, the mesh only has room for 4", err.to_string());
        assert_eq!("OpenGL Vbo exception: Map failure", MeshError::from(VboError::MapFailed).to_string());
    }
}
