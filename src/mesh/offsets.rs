use super::layout::{AttribState, Attribute, Layout, MAX_TEXTURE_UNIT};

/// Byte offsets of every attribute of a mesh within its static and dynamic buffers.
///
/// Each builtin attribute is either static or dynamic, so one offset per attribute is enough.
/// Dynamic data is always interleaved. Static data is either interleaved, in which case
/// `static_stride` is the size of one vertex, or planar, in which case every attribute is a
/// contiguous block and `static_stride` is 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshOffsets {
    pub position: usize,
    pub normal: usize,
    pub color_rgb: usize,
    pub color_rgba: usize,
    pub tex_coord: [usize; MAX_TEXTURE_UNIT + 1],
    pub custom_static: Vec<usize>,
    pub custom_dynamic: Vec<usize>,

    pub static_stride: usize,
    pub dynamic_stride: usize,
    /// Total size of the static buffer
    pub static_bytes: usize,
    /// Total size of the dynamic buffer
    pub dynamic_bytes: usize,
}

impl MeshOffsets {
    /// Lays out the vertex data described by `layout` for `num_vertices` vertices. Attributes
    /// are placed in the order positions, normals, colors, texture coordinates by unit and
    /// finally custom attributes.
    pub fn compute(layout: &Layout, num_vertices: usize, static_planar: bool) -> MeshOffsets {
        let mut offsets = MeshOffsets::default();

        if layout.needs_static_buffer() {
            // Planar blocks span all vertices, interleaved slots span one
            let block = if static_planar { num_vertices } else { 1 };

            let mut offset = 0;
            for attr in layout.vertex_attributes(AttribState::Static) {
                offsets.set(attr, offset);
                offset += attr.bytes() * block;
            }
            for &(custom, _) in layout.custom_static() {
                offsets.custom_static.push(offset);
                offset += custom.bytes() * block;
            }

            if static_planar {
                offsets.static_stride = 0;
                offsets.static_bytes = offset;
            } else {
                offsets.static_stride = offset;
                offsets.static_bytes = offset * num_vertices;
            }
        }

        if layout.needs_dynamic_buffer() {
            let mut offset = 0;
            for attr in layout.vertex_attributes(AttribState::Dynamic) {
                offsets.set(attr, offset);
                offset += attr.bytes();
            }
            for &(custom, _) in layout.custom_dynamic() {
                offsets.custom_dynamic.push(offset);
                offset += custom.bytes();
            }

            offsets.dynamic_stride = offset;
            offsets.dynamic_bytes = offset * num_vertices;
        }

        offsets
    }

    /// The offset of the given attribute within whichever buffer stores it. Indices live in their
    /// own buffer and always start at 0.
    pub fn of(&self, attr: Attribute) -> usize {
        match attr {
            Attribute::Indices => 0,
            Attribute::Positions => self.position,
            Attribute::Normals => self.normal,
            Attribute::ColorsRgb => self.color_rgb,
            Attribute::ColorsRgba => self.color_rgba,
            Attribute::TexCoords2d(unit) | Attribute::TexCoords3d(unit) => self.tex_coord[unit],
        }
    }

    fn set(&mut self, attr: Attribute, offset: usize) {
        match attr {
            Attribute::Indices => (),
            Attribute::Positions => self.position = offset,
            Attribute::Normals => self.normal = offset,
            Attribute::ColorsRgb => self.color_rgb = offset,
            Attribute::ColorsRgba => self.color_rgba = offset,
            Attribute::TexCoords2d(unit) | Attribute::TexCoords3d(unit) => self.tex_coord[unit] = offset,
        }
    }

    /// Stores the computed custom attribute offsets in the `(type, offset)` lists of `layout`.
    pub fn apply_to(&self, layout: &mut Layout) {
        for (entry, offset) in layout.custom_static.iter_mut().zip(self.custom_static.iter()) {
            entry.1 = *offset;
        }
        for (entry, offset) in layout.custom_dynamic.iter_mut().zip(self.custom_dynamic.iter()) {
            entry.1 = *offset;
        }
    }
}

/// Copies consecutive `element_bytes` sized elements from `src` into `dest`, placing element `i`
/// at `offset + i*stride`.
pub(crate) fn write_strided(dest: &mut [u8], offset: usize, stride: usize, element_bytes: usize, src: &[u8]) {
    for (i, element) in src.chunks_exact(element_bytes).enumerate() {
        let start = offset + i*stride;
        dest[start..start + element_bytes].copy_from_slice(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::layout::CustomAttr;

    #[test]
    fn planar_static_blocks_follow_each_other() {
        let mut layout = Layout::new();
        layout.set_static_positions();
        layout.set_static_tex_coords_2d(0);
        layout.add_static_custom(CustomAttr::Float);

        let offsets = MeshOffsets::compute(&layout, 10, true);
        assert_eq!(0, offsets.position);
        assert_eq!(120, offsets.tex_coord[0]);
        assert_eq!(vec![200], offsets.custom_static);
        assert_eq!(0, offsets.static_stride);
        assert_eq!(240, offsets.static_bytes);
        assert_eq!(0, offsets.dynamic_bytes);
    }

    #[test]
    fn interleaved_static_uses_vertex_stride() {
        let mut layout = Layout::new();
        layout.set_static_positions();
        layout.set_static_normals();
        layout.set_static_colors_rgba();

        let offsets = MeshOffsets::compute(&layout, 4, false);
        assert_eq!(0, offsets.position);
        assert_eq!(12, offsets.normal);
        assert_eq!(24, offsets.color_rgba);
        assert_eq!(40, offsets.static_stride);
        assert_eq!(160, offsets.static_bytes);
    }

    #[test]
    fn static_and_dynamic_offsets_are_independent() {
        let mut layout = Layout::new();
        layout.set_static_positions();
        layout.set_dynamic_normals();
        layout.set_dynamic_tex_coords_3d(1);
        layout.add_dynamic_custom(CustomAttr::Float2);

        let offsets = MeshOffsets::compute(&layout, 3, true);
        assert_eq!(36, offsets.static_bytes);
        assert_eq!(0, offsets.normal);
        assert_eq!(12, offsets.tex_coord[1]);
        assert_eq!(vec![24], offsets.custom_dynamic);
        assert_eq!(32, offsets.dynamic_stride);
        assert_eq!(96, offsets.dynamic_bytes);
    }

    #[test]
    fn offsets_are_written_back_to_layout() {
        let mut layout = Layout::new();
        layout.set_dynamic_positions();
        layout.add_dynamic_custom_vec4();
        layout.add_dynamic_custom_float();

        let offsets = MeshOffsets::compute(&layout, 1, true);
        offsets.apply_to(&mut layout);
        assert_eq!(&[(CustomAttr::Float4, 12), (CustomAttr::Float, 28)], layout.custom_dynamic());
    }

    #[test]
    fn strided_write_leaves_gaps_untouched() {
        let mut dest = vec![0xffu8; 12];
        write_strided(&mut dest, 2, 6, 2, &[1, 2, 3, 4]);
        assert_eq!(vec![0xff, 0xff, 1, 2, 0xff, 0xff, 0xff, 0xff, 3, 4, 0xff, 0xff], dest);
    }
}
