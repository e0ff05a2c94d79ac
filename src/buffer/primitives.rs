//! Basic enums used by all buffers

use std::convert::TryFrom;
use gl::types::*;

use super::VboError;

/// Represents different types of primitives which can be drawn on the GPU.
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimitiveMode {
    Points                      = gl::POINTS,
    LineStrip                   = gl::LINE_STRIP,
    LineLoop                    = gl::LINE_LOOP,
    Lines                       = gl::LINES,
    LineStripAdjacency          = gl::LINE_STRIP_ADJACENCY,
    LinesAdjacency              = gl::LINES_ADJACENCY,
    TriangleStrip               = gl::TRIANGLE_STRIP,
    TriangleFan                 = gl::TRIANGLE_FAN,
    Triangles                   = gl::TRIANGLES,
    TriangleStripAdjacency      = gl::TRIANGLE_STRIP_ADJACENCY,
    TrianglesAdjacency          = gl::TRIANGLES_ADJACENCY,
}

/// Represents different gl buffer usage hints. Note that these are hints,
/// and drivers will not necessarily respect these.
///
/// The first part of the name indicates how frequently the data will be used:
///
/// * Static - Data is set once and used often
/// * Dynamic - Data is set frequently and used frequently
/// * Stream - Data is set once and used at most a few times
///
/// The second part indicates how it will be used:
///
/// * Draw - Data will be set by the application and read by the GPU
/// * Read - Data is set by the GPU and read by the application
/// * Copy - Data is set and read by the GPU
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw  = gl::STATIC_DRAW,
    DynamicDraw = gl::DYNAMIC_DRAW,
    StreamDraw  = gl::STREAM_DRAW,
    StaticRead  = gl::STATIC_READ,
    DynamicRead = gl::DYNAMIC_READ,
    StreamRead  = gl::STREAM_READ,
    StaticCopy  = gl::STATIC_COPY,
    DynamicCopy = gl::DYNAMIC_COPY,
    StreamCopy  = gl::STREAM_COPY,
}

/// Represents a target to which a buffer can be bound
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferTarget {
    Array               = gl::ARRAY_BUFFER,
    ElementArray        = gl::ELEMENT_ARRAY_BUFFER,
    PixelPack           = gl::PIXEL_PACK_BUFFER,
    PixelUnpack         = gl::PIXEL_UNPACK_BUFFER,
    TransformFeedback   = gl::TRANSFORM_FEEDBACK_BUFFER,
    Uniform             = gl::UNIFORM_BUFFER,
    Texture             = gl::TEXTURE_BUFFER,
    CopyRead            = gl::COPY_READ_BUFFER,
    CopyWrite           = gl::COPY_WRITE_BUFFER,
    DrawIndirect        = gl::DRAW_INDIRECT_BUFFER,
    AtomicCounter       = gl::ATOMIC_COUNTER_BUFFER,
    DispatchIndirect    = gl::DISPATCH_INDIRECT_BUFFER,
}

const ALL_TARGETS: [BufferTarget; 12] = [
    BufferTarget::Array, BufferTarget::ElementArray,
    BufferTarget::PixelPack, BufferTarget::PixelUnpack,
    BufferTarget::TransformFeedback, BufferTarget::Uniform,
    BufferTarget::Texture, BufferTarget::CopyRead,
    BufferTarget::CopyWrite, BufferTarget::DrawIndirect,
    BufferTarget::AtomicCounter, BufferTarget::DispatchIndirect,
];

impl TryFrom<GLenum> for BufferTarget {
    type Error = VboError;

    fn try_from(value: GLenum) -> Result<BufferTarget, VboError> {
        ALL_TARGETS.iter()
            .copied()
            .find(|target| *target as GLenum == value)
            .ok_or(VboError::InvalidTarget(value))
    }
}

/// How a mapped buffer will be accessed from the CPU.
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapAccess {
    ReadOnly    = gl::READ_ONLY,
    WriteOnly   = gl::WRITE_ONLY,
    ReadWrite   = gl::READ_WRITE,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_targets_round_trip() {
        for target in ALL_TARGETS.iter() {
            assert_eq!(Ok(*target), BufferTarget::try_from(*target as GLenum));
        }
    }

    #[test]
    fn non_buffer_enum_is_invalid_target() {
        assert_eq!(Err(VboError::InvalidTarget(gl::TEXTURE_2D)), BufferTarget::try_from(gl::TEXTURE_2D));
    }
}
