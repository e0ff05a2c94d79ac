use std::cell::Cell;
use std::convert::TryFrom;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::rc::Rc;
use std::slice;

use bytemuck::Pod;
use gl::types::*;

use super::{BufferTarget, BufferUsage, MapAccess, VboError};

/// A OpenGL buffer object. Cloning a `Vbo` gives another handle to the same GPU buffer, the
/// buffer is deleted when the last handle is dropped.
///
/// All methods take `&self`, as the data lives on the GPU and is shared between all handles.
#[derive(Debug, Clone)]
pub struct Vbo {
    obj: Rc<VboObj>,
}

#[derive(Debug)]
struct VboObj {
    target: BufferTarget,
    id: GLuint,
    // Bytes allocated by the last call to `glBufferData`
    size: Cell<usize>,
    mapped: Cell<bool>,
}

impl Vbo {
    /// Creates a new buffer object through `glGenBuffers`. No storage is allocated until
    /// [`buffer_data`] or [`allocate`] is called.
    ///
    /// [`buffer_data`]: #method.buffer_data
    /// [`allocate`]:    #method.allocate
    pub fn new(target: BufferTarget) -> Vbo {
        let mut id = 0;
        unsafe {
            gl::GenBuffers(1, &mut id);
        }
        log::debug!("Created buffer {} for {:?}", id, target);

        Vbo {
            obj: Rc::new(VboObj { target, id, size: Cell::new(0), mapped: Cell::new(false) }),
        }
    }

    /// A handle which owns no OpenGL object, with the given size. Lets tests drive the
    /// bookkeeping without a context.
    #[cfg(test)]
    pub(crate) fn detached(target: BufferTarget, size: usize) -> Vbo {
        Vbo {
            obj: Rc::new(VboObj { target, id: 0, size: Cell::new(size), mapped: Cell::new(false) }),
        }
    }

    /// Creates a new buffer for a raw OpenGL target enum, such as `gl::ARRAY_BUFFER`. Fails if
    /// the enum is not a buffer binding point.
    pub fn with_raw_target(target: GLenum) -> Result<Vbo, VboError> {
        BufferTarget::try_from(target).map(Vbo::new)
    }

    /// Binds this buffer to its target.
    pub fn bind(&self) {
        unsafe {
            gl::BindBuffer(self.obj.target as GLenum, self.obj.id);
        }
    }

    /// Binds buffer 0 to the target of this buffer.
    pub fn unbind(&self) {
        unsafe {
            gl::BindBuffer(self.obj.target as GLenum, 0);
        }
    }

    /// Replaces the storage of this buffer with the given data. Any previous contents are lost.
    /// Panics if the buffer is mapped.
    pub fn buffer_data<T: Pod>(&self, data: &[T], usage: BufferUsage) {
        self.assert_unmapped();
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let data_ptr = if bytes.is_empty() { ptr::null() } else { bytes.as_ptr() as *const GLvoid };

        self.bind();
        unsafe {
            gl::BufferData(self.obj.target as GLenum, bytes.len() as GLsizeiptr, data_ptr, usage as GLenum);
        }
        self.obj.size.set(bytes.len());
    }

    /// Allocates `bytes` bytes of uninitialized storage for this buffer. Any previous contents
    /// are lost. Panics if the buffer is mapped.
    pub fn allocate(&self, bytes: usize, usage: BufferUsage) {
        self.assert_unmapped();
        self.bind();
        unsafe {
            gl::BufferData(self.obj.target as GLenum, bytes as GLsizeiptr, ptr::null(), usage as GLenum);
        }
        self.obj.size.set(bytes);
    }

    /// Overwrites part of this buffer, starting `offset` bytes from the start of the buffer. The
    /// written range has to fit within the storage allocated for this buffer. Panics if the
    /// buffer is mapped.
    pub fn buffer_sub_data<T: Pod>(&self, offset: usize, data: &[T]) {
        self.assert_unmapped();
        let bytes: &[u8] = bytemuck::cast_slice(data);
        if bytes.is_empty() {
            return;
        }
        debug_assert!(offset + bytes.len() <= self.size(),
                      "Writing {} bytes at {} overflows buffer of {} bytes",
                      bytes.len(), offset, self.size());

        self.bind();
        unsafe {
            gl::BufferSubData(
                self.obj.target as GLenum,
                offset as GLintptr, bytes.len() as GLsizeiptr,
                bytes.as_ptr() as *const GLvoid,
            );
        }
    }

    /// Maps the storage of this buffer for reading. The returned guard dereferences to the mapped
    /// bytes and unmaps the buffer when dropped.
    pub fn map_read(&self) -> Result<ReadMapping<'_>, VboError> {
        self.map_raw(MapAccess::ReadOnly).map(ReadMapping)
    }

    /// Maps the storage of this buffer for writing. The contents of the mapped bytes are
    /// undefined until written, use [`map_read_write`](#method.map_read_write) to modify existing
    /// data.
    pub fn map_write(&self) -> Result<MappedBuffer<'_>, VboError> {
        self.map_raw(MapAccess::WriteOnly).map(MappedBuffer)
    }

    /// Maps the storage of this buffer for reading and writing.
    pub fn map_read_write(&self) -> Result<MappedBuffer<'_>, VboError> {
        self.map_raw(MapAccess::ReadWrite).map(MappedBuffer)
    }

    /// Returns true while a mapping guard for this buffer exists, on any handle.
    pub fn is_mapped(&self) -> bool {
        self.obj.mapped.get()
    }

    fn map_raw(&self, access: MapAccess) -> Result<Mapping<'_>, VboError> {
        if self.is_mapped() {
            return Err(VboError::AlreadyMapped);
        }

        self.bind();
        let data = unsafe { gl::MapBuffer(self.obj.target as GLenum, access as GLenum) as *mut u8 };
        if data.is_null() {
            return Err(VboError::MapFailed);
        }
        self.obj.mapped.set(true);

        Ok(Mapping {
            vbo: self,
            data,
            len: self.size(),
            mapped: true,
        })
    }

    // Respecifying or writing the storage would leave a live mapping dangling
    fn assert_unmapped(&self) {
        assert!(!self.is_mapped(), "Buffer {} can not be modified while it is mapped", self.obj.id);
    }

    /// The target this buffer binds to.
    pub fn target(&self) -> BufferTarget {
        self.obj.target
    }

    /// The OpenGL name of this buffer.
    pub fn id(&self) -> GLuint {
        self.obj.id
    }

    /// The number of bytes currently allocated for this buffer.
    pub fn size(&self) -> usize {
        self.obj.size.get()
    }

    fn unmap_raw(&self) -> Result<(), VboError> {
        self.obj.mapped.set(false);
        self.bind();
        let intact = unsafe { gl::UnmapBuffer(self.obj.target as GLenum) };
        if intact == gl::FALSE {
            Err(VboError::UnmapFailed)
        } else {
            Ok(())
        }
    }
}

impl PartialEq for Vbo {
    fn eq(&self, other: &Vbo) -> bool {
        Rc::ptr_eq(&self.obj, &other.obj)
    }
}

impl Drop for VboObj {
    fn drop(&mut self) {
        if self.id != 0 {
            unsafe {
                gl::DeleteBuffers(1, &self.id);
            }
        }
    }
}

// Shared by both guard types. Unmaps on drop unless unmapped explicitly.
struct Mapping<'a> {
    vbo: &'a Vbo,
    data: *mut u8,
    len: usize,
    mapped: bool,
}

impl<'a> Mapping<'a> {
    fn unmap(mut self) -> Result<(), VboError> {
        self.mapped = false;
        self.vbo.unmap_raw()
    }

    fn bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.data, self.len) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.data, self.len) }
    }
}

impl<'a> Drop for Mapping<'a> {
    fn drop(&mut self) {
        if self.mapped {
            if let Err(err) = self.vbo.unmap_raw() {
                log::warn!("Buffer {}: {}", self.vbo.id(), err);
            }
        }
    }
}

/// The storage of a [`Vbo`] mapped for writing. Derefs to the mapped bytes.
///
/// While the guard exists the buffer can not be mapped again, and calls which respecify or
/// write its storage panic.
pub struct MappedBuffer<'a>(Mapping<'a>);

impl<'a> MappedBuffer<'a> {
    /// Unmaps the buffer, reporting whether its contents survived the mapping. Dropping the
    /// guard also unmaps, but can only log a failure.
    pub fn unmap(self) -> Result<(), VboError> {
        self.0.unmap()
    }

    /// The buffer this mapping belongs to.
    pub fn vbo(&self) -> &Vbo {
        self.0.vbo
    }
}

impl<'a> Deref for MappedBuffer<'a> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.0.bytes()
    }
}

impl<'a> DerefMut for MappedBuffer<'a> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.0.bytes_mut()
    }
}

/// The storage of a [`Vbo`] mapped for reading. Only derefs to shared bytes.
pub struct ReadMapping<'a>(Mapping<'a>);

impl<'a> ReadMapping<'a> {
    /// Unmaps the buffer, reporting whether its contents survived the mapping.
    pub fn unmap(self) -> Result<(), VboError> {
        self.0.unmap()
    }

    /// The buffer this mapping belongs to.
    pub fn vbo(&self) -> &Vbo {
        self.0.vbo
    }
}

impl<'a> Deref for ReadMapping<'a> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.0.bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_a_mapped_buffer_fails() {
        let vbo = Vbo::detached(BufferTarget::Array, 16);
        vbo.obj.mapped.set(true);

        let other = vbo.clone();
        assert!(other.is_mapped());
        assert_eq!(Some(VboError::AlreadyMapped), other.map_write().err());
        assert_eq!(Some(VboError::AlreadyMapped), other.map_read().err());
    }

    #[test]
    #[should_panic(expected = "can not be modified while it is mapped")]
    fn reallocating_a_mapped_buffer_panics() {
        let vbo = Vbo::detached(BufferTarget::Array, 16);
        vbo.obj.mapped.set(true);
        vbo.clone().allocate(32, BufferUsage::StaticDraw);
    }

    #[test]
    #[should_panic(expected = "can not be modified while it is mapped")]
    fn writing_a_mapped_buffer_panics() {
        let vbo = Vbo::detached(BufferTarget::Array, 16);
        vbo.obj.mapped.set(true);
        vbo.buffer_sub_data(0, &[1.0f32]);
    }

    #[test]
    fn clones_share_one_buffer() {
        let vbo = Vbo::detached(BufferTarget::ElementArray, 12);
        let other = vbo.clone();
        assert_eq!(vbo, other);
        assert_eq!(12, other.size());
        assert_ne!(vbo, Vbo::detached(BufferTarget::ElementArray, 12));
    }
}
