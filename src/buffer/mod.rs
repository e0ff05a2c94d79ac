//! Utilities for storing data in GPU buffers.

mod primitives;
mod vbo;

pub use self::primitives::*;
pub use self::vbo::*;

use gl::types::*;
use thiserror::Error;

/// Errors raised by [`Vbo`] operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VboError {
    /// The raw enum passed as a buffer target does not name a buffer binding point.
    #[error("OpenGL Vbo exception: Invalid Target ({0:#x})")]
    InvalidTarget(GLenum),
    /// `glMapBuffer` returned a null pointer.
    #[error("OpenGL Vbo exception: Map failure")]
    MapFailed,
    /// The buffer already has a live mapping guard.
    #[error("OpenGL Vbo exception: Buffer is already mapped")]
    AlreadyMapped,
    /// `glUnmapBuffer` reported that the buffer contents were corrupted while mapped.
    #[error("OpenGL Vbo exception: Unmap failure")]
    UnmapFailed,
}
