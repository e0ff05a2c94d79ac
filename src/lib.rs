
//! Shared-ownership wrappers around OpenGL vertex buffers, mesh vertex layouts and GLSL programs.
//!
//! All GL objects in this crate assume that a context is current on the calling thread, and that
//! function pointers have been loaded through [`graphics::load_with`]. The handle types are
//! reference counted with `Rc`, so they can be cloned freely but never leave the context thread.
//! The underlying GL object is deleted once, when the last clone is dropped.
//!
//! # Example
//! ```rust,no_run
//! use glmesh::buffer::PrimitiveMode;
//! use glmesh::mesh::{Layout, VboMesh};
//! use glmesh::shader::GlslProg;
//! use glmesh::glam::Vec3;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut layout = Layout::new();
//! layout.set_static_indices();
//! layout.set_dynamic_positions();
//!
//! let mesh = VboMesh::new(3, 3, layout, PrimitiveMode::Triangles);
//! mesh.buffer_indices(&[0, 1, 2])?;
//!
//! {
//!     let mut iter = mesh.map_vertex_buffer()?;
//!     while !iter.is_done() {
//!         let i = iter.index() as f32;
//!         iter.set_position(Vec3::new(i, i * 2.0, 0.0));
//!         iter.advance();
//!     }
//! }
//!
//! let shader = GlslProg::new(VERT_SRC, Some(FRAG_SRC), None)?;
//! shader.uniform("scale", &2.0f32);
//! mesh.draw();
//! # Ok(())
//! # }
//! # const VERT_SRC: &str = "";
//! # const FRAG_SRC: &str = "";
//! ```

pub mod color;
pub mod graphics;
pub mod buffer;
pub mod mesh;
pub mod shader;

pub use crate::color::*;

pub use glam;
