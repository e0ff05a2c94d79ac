use glam::{Vec2, Vec3};

use super::MeshError;
use super::layout::{AttribState, Attribute, Layout};
use super::offsets::{MeshOffsets, write_strided};
use crate::color::{Color, ColorA};

/// A indexed triangle mesh stored in client memory. Every per-vertex list is either empty or has
/// one entry per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors_rgb: Vec<Color>,
    pub colors_rgba: Vec<ColorA>,
    pub tex_coords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

/// A indexed triangle mesh with two dimensional positions. Converted to a [`TriMesh`] in the
/// `z = 0` plane before being uploaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh2d {
    pub positions: Vec<Vec2>,
    pub colors_rgb: Vec<Color>,
    pub colors_rgba: Vec<ColorA>,
    pub tex_coords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl TriMesh {
    pub fn new() -> TriMesh {
        TriMesh::default()
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn append_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// The layout used when uploading this mesh without an explicit layout: static indices and
    /// positions, plus static normals, colors and unit 0 texture coordinates if present.
    pub fn infer_layout(&self) -> Layout {
        let mut layout = Layout::new();
        layout.set_static_indices();
        layout.set_static_positions();

        if !self.normals.is_empty() {
            layout.set_static_normals();
        }
        if !self.colors_rgba.is_empty() {
            layout.set_static_colors_rgba();
        } else if !self.colors_rgb.is_empty() {
            layout.set_static_colors_rgb();
        }
        if !self.tex_coords.is_empty() {
            layout.set_static_tex_coords_2d(0);
        }
        layout
    }

    /// The raw bytes this mesh provides for the given attribute, if any.
    fn source(&self, attr: Attribute) -> Option<(&[u8], usize)> {
        let source: (&[u8], usize) = match attr {
            Attribute::Positions      => (bytemuck::cast_slice(&self.positions), self.positions.len()),
            Attribute::Normals        => (bytemuck::cast_slice(&self.normals), self.normals.len()),
            Attribute::ColorsRgb      => (bytemuck::cast_slice(&self.colors_rgb), self.colors_rgb.len()),
            Attribute::ColorsRgba     => (bytemuck::cast_slice(&self.colors_rgba), self.colors_rgba.len()),
            Attribute::TexCoords2d(0) => (bytemuck::cast_slice(&self.tex_coords), self.tex_coords.len()),
            _ => return None,
        };
        Some(source)
    }

    /// Packs the static vertex data of this mesh into a single buffer, laid out as described by
    /// `offsets`. Fails if the layout asks for static data this mesh does not have for every
    /// vertex.
    pub(crate) fn pack_static(&self, layout: &Layout, offsets: &MeshOffsets) -> Result<Vec<u8>, MeshError> {
        let expected = self.num_vertices();
        let mut data = vec![0u8; offsets.static_bytes];

        for attr in layout.vertex_attributes(AttribState::Static) {
            let (bytes, given) = self.source(attr).unwrap_or((&[][..], 0));
            if given != expected {
                return Err(MeshError::SourceMismatch { attribute: attr, expected, given });
            }

            let stride = if offsets.static_stride == 0 { attr.bytes() } else { offsets.static_stride };
            write_strided(&mut data, offsets.of(attr), stride, attr.bytes(), bytes);
        }

        Ok(data)
    }
}

impl<'a> From<&'a TriMesh2d> for TriMesh {
    fn from(mesh: &'a TriMesh2d) -> TriMesh {
        TriMesh {
            positions: mesh.positions.iter().map(|p| p.extend(0.0)).collect(),
            normals: Vec::new(),
            colors_rgb: mesh.colors_rgb.clone(),
            colors_rgba: mesh.colors_rgba.clone(),
            tex_coords: mesh.tex_coords.clone(),
            indices: mesh.indices.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TriMesh {
        let mut mesh = TriMesh::new();
        mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        mesh.tex_coords = vec![Vec2::ZERO, Vec2::X, Vec2::Y];
        mesh.append_triangle(0, 1, 2);
        mesh
    }

    #[test]
    fn inferred_layout_follows_present_data() {
        let mut mesh = triangle();
        let layout = mesh.infer_layout();
        assert!(layout.has_static_indices());
        assert!(layout.has_static_positions());
        assert!(layout.has_static_tex_coords_2d(0));
        assert!(!layout.has_normals());
        assert!(!layout.has_colors_rgb());

        mesh.colors_rgb = vec![Color::default(); 3];
        mesh.colors_rgba = vec![ColorA::default(); 3];
        assert!(mesh.infer_layout().has_static_colors_rgba());
        assert!(!mesh.infer_layout().has_colors_rgb());
    }

    #[test]
    fn packs_interleaved_vertices() {
        let mesh = triangle();
        let layout = mesh.infer_layout();
        let offsets = MeshOffsets::compute(&layout, mesh.num_vertices(), false);
        assert_eq!(20, offsets.static_stride);

        let data = mesh.pack_static(&layout, &offsets).unwrap();
        let floats: Vec<f32> = data.chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(vec![
            0.0, 0.0, 0.0, 0.0, 0.0,
            1.0, 0.0, 0.0, 1.0, 0.0,
            0.0, 1.0, 0.0, 0.0, 1.0,
        ], floats);
    }

    #[test]
    fn missing_static_data_is_an_error() {
        let mesh = triangle();
        let mut layout = mesh.infer_layout();
        layout.set_static_normals();
        let offsets = MeshOffsets::compute(&layout, mesh.num_vertices(), false);

        match mesh.pack_static(&layout, &offsets) {
            Err(MeshError::SourceMismatch { attribute, expected, given }) => {
                assert_eq!(Attribute::Normals, attribute);
                assert_eq!(3, expected);
                assert_eq!(0, given);
            },
            other => panic!("Expected a source mismatch, got {:?}", other),
        }
    }

    #[test]
    fn flat_mesh_lies_in_xy_plane() {
        let flat = TriMesh2d {
            positions: vec![Vec2::new(1.0, 2.0)],
            indices: vec![0],
            ..TriMesh2d::default()
        };
        let mesh = TriMesh::from(&flat);
        assert_eq!(vec![Vec3::new(1.0, 2.0, 0.0)], mesh.positions);
        assert_eq!(vec![0], mesh.indices);
    }
}
