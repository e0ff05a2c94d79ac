//! Layouts, offsets and vertex writing, exercised without a OpenGL context.

use glmesh::glam::{Vec2, Vec3, Vec4};
use glmesh::mesh::{attrib_pointers, AttribLocations, AttribState, Attribute, Layout, MeshOffsets, TriMesh, VertexIter, MAX_TEXTURE_UNIT};
use glmesh::ColorA;

fn full_dynamic_layout() -> Layout {
    let mut layout = Layout::new();
    layout.set_dynamic_positions();
    layout.set_dynamic_normals();
    layout.set_dynamic_colors_rgba();
    for unit in 0..=MAX_TEXTURE_UNIT {
        if unit % 2 == 0 {
            layout.set_dynamic_tex_coords_2d(unit);
        } else {
            layout.set_dynamic_tex_coords_3d(unit);
        }
    }
    layout.add_dynamic_custom_vec4();
    layout
}

/// Every attribute has to fit inside the vertex, and no two attributes may share a byte.
fn assert_disjoint(ranges: &mut Vec<(usize, usize)>, limit: usize) {
    ranges.sort();
    for pair in ranges.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "Attributes {:?} and {:?} overlap", pair[0], pair[1]);
    }
    if let Some(last) = ranges.last() {
        assert!(last.1 <= limit, "Attribute {:?} ends past {}", last, limit);
    }
}

#[test]
fn interleaved_offsets_never_overlap() {
    let layout = full_dynamic_layout();
    let offsets = MeshOffsets::compute(&layout, 16, true);

    let mut ranges: Vec<(usize, usize)> = layout.vertex_attributes(AttribState::Dynamic)
        .into_iter()
        .map(|attr| (offsets.of(attr), offsets.of(attr) + attr.bytes()))
        .collect();
    for (&(kind, _), &offset) in layout.custom_dynamic().iter().zip(offsets.custom_dynamic.iter()) {
        ranges.push((offset, offset + kind.bytes()));
    }

    // 12 + 12 + 16 + 8 + 12 + 8 + 12 + 16
    assert_eq!(96, offsets.dynamic_stride);
    assert_eq!(96 * 16, offsets.dynamic_bytes);
    assert_disjoint(&mut ranges, offsets.dynamic_stride);
}

#[test]
fn planar_blocks_never_overlap() {
    let mut layout = Layout::new();
    layout.set_static_positions();
    layout.set_static_colors_rgb();
    layout.set_static_tex_coords_3d(3);
    layout.add_static_custom_vec2();

    let vertices = 7;
    let offsets = MeshOffsets::compute(&layout, vertices, true);

    let mut ranges: Vec<(usize, usize)> = layout.vertex_attributes(AttribState::Static)
        .into_iter()
        .map(|attr| (offsets.of(attr), offsets.of(attr) + attr.bytes() * vertices))
        .collect();
    ranges.push((offsets.custom_static[0], offsets.custom_static[0] + 8 * vertices));

    assert_eq!(0, offsets.static_stride);
    assert_eq!((12 + 12 + 12 + 8) * vertices, offsets.static_bytes);
    assert_disjoint(&mut ranges, offsets.static_bytes);
}

#[test]
fn vertex_iter_fills_every_vertex() {
    let layout = full_dynamic_layout();
    let offsets = MeshOffsets::compute(&layout, 4, true);
    let mut iter = VertexIter::new(vec![0u8; offsets.dynamic_bytes], &layout, &offsets);

    let mut visited = 0;
    while !iter.is_done() {
        let i = iter.index() as f32;
        iter.set_position(Vec3::splat(i));
        iter.set_normal(Vec3::Y);
        iter.set_color_rgba(ColorA::rgba(1.0, 1.0, 1.0, 0.5));
        iter.set_tex_coord_2d(0, Vec2::new(i, 0.0));
        iter.set_tex_coord_3d(1, Vec3::ZERO);
        iter.set_tex_coord_2d(2, Vec2::ONE);
        iter.set_tex_coord_3d(3, Vec3::ONE);
        iter.set_custom_vec4(0, Vec4::new(i, i, i, i));
        iter.advance();
        visited += 1;
    }
    assert_eq!(4, visited);

    let data = iter.into_inner();
    let vertex = &data[3 * 96..4 * 96];
    let custom = offsets.custom_dynamic[0];
    assert_eq!(&3.0f32.to_ne_bytes(), &vertex[custom + 12..custom + 16]);
    assert_eq!(&0.5f32.to_ne_bytes(), &vertex[offsets.color_rgba + 12..offsets.color_rgba + 16]);
}

#[test]
fn tri_mesh_layout_maps_to_default_locations() {
    let mut mesh = TriMesh::new();
    mesh.positions = vec![Vec3::ZERO; 4];
    mesh.normals = vec![Vec3::Z; 4];
    mesh.tex_coords = vec![Vec2::ZERO; 4];
    mesh.append_triangle(0, 1, 2);
    mesh.append_triangle(2, 3, 0);

    let layout = mesh.infer_layout();
    let offsets = MeshOffsets::compute(&layout, mesh.num_vertices(), false);
    let pointers = attrib_pointers(&layout, &offsets, &AttribLocations::default(), &[], &[]);

    let locations: Vec<u32> = pointers.iter().map(|(_, p)| p.location).collect();
    assert_eq!(vec![0, 1, 3], locations);
    assert!(pointers.iter().all(|(state, p)| *state == AttribState::Static && p.stride == 32));
    assert_eq!(24, offsets.of(Attribute::TexCoords2d(0)));
    assert_eq!(2, mesh.num_triangles());
}
