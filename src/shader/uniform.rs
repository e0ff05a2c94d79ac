use gl::types::*;
use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use crate::color::{Color, ColorA};

/// Everything which implements this trait can be stored into the uniform value of a shader.
///
/// Setting a uniform at location -1 is silently ignored by OpenGL.
pub trait UniformValue: Sized {
    unsafe fn set_uniform(data: &Self, location: GLint);
    unsafe fn set_uniform_slice(slice: &[Self], location: GLint);
}

/// Square float matrices, which can optionally be transposed when uploaded.
pub trait UniformMatrix: Sized {
    unsafe fn set_matrices(slice: &[Self], location: GLint, transpose: bool);
}

// Types stored as `count` consecutive primitives. `$single` receives the components, `$array`
// receives a pointer to the first primitive.
macro_rules! impl_uniform_vec {
    ($ty:ty, $primitive:ty, $single:path, $array:path, $($field:tt),+) => {
        impl UniformValue for $ty {
            unsafe fn set_uniform(value: &$ty, location: GLint) {
                $single(location, $(value.$field),+);
            }

            unsafe fn set_uniform_slice(slice: &[$ty], location: GLint) {
                $array(location, slice.len() as GLsizei, slice.as_ptr() as *const $primitive);
            }
        }
    }
}

impl_uniform_vec!((f32, f32), GLfloat, gl::Uniform2f, gl::Uniform2fv, 0, 1);
impl_uniform_vec!((f32, f32, f32), GLfloat, gl::Uniform3f, gl::Uniform3fv, 0, 1, 2);
impl_uniform_vec!((f32, f32, f32, f32), GLfloat, gl::Uniform4f, gl::Uniform4fv, 0, 1, 2, 3);
impl_uniform_vec!((i32, i32), GLint, gl::Uniform2i, gl::Uniform2iv, 0, 1);
impl_uniform_vec!((i32, i32, i32), GLint, gl::Uniform3i, gl::Uniform3iv, 0, 1, 2);
impl_uniform_vec!((i32, i32, i32, i32), GLint, gl::Uniform4i, gl::Uniform4iv, 0, 1, 2, 3);

impl_uniform_vec!(Vec2, GLfloat, gl::Uniform2f, gl::Uniform2fv, x, y);
impl_uniform_vec!(Vec3, GLfloat, gl::Uniform3f, gl::Uniform3fv, x, y, z);
impl_uniform_vec!(Vec4, GLfloat, gl::Uniform4f, gl::Uniform4fv, x, y, z, w);
impl_uniform_vec!(IVec2, GLint, gl::Uniform2i, gl::Uniform2iv, x, y);
impl_uniform_vec!(IVec3, GLint, gl::Uniform3i, gl::Uniform3iv, x, y, z);
impl_uniform_vec!(IVec4, GLint, gl::Uniform4i, gl::Uniform4iv, x, y, z, w);
impl_uniform_vec!(UVec2, GLuint, gl::Uniform2ui, gl::Uniform2uiv, x, y);
impl_uniform_vec!(UVec3, GLuint, gl::Uniform3ui, gl::Uniform3uiv, x, y, z);
impl_uniform_vec!(UVec4, GLuint, gl::Uniform4ui, gl::Uniform4uiv, x, y, z, w);

impl_uniform_vec!(Color, GLfloat, gl::Uniform3f, gl::Uniform3fv, r, g, b);
impl_uniform_vec!(ColorA, GLfloat, gl::Uniform4f, gl::Uniform4fv, r, g, b, a);

impl UniformValue for f32 {
    unsafe fn set_uniform(value: &f32, location: GLint) {
        gl::Uniform1f(location, *value);
    }

    unsafe fn set_uniform_slice(slice: &[f32], location: GLint) {
        gl::Uniform1fv(location, slice.len() as GLsizei, slice.as_ptr());
    }
}

impl UniformValue for i32 {
    unsafe fn set_uniform(value: &i32, location: GLint) {
        gl::Uniform1i(location, *value);
    }

    unsafe fn set_uniform_slice(slice: &[i32], location: GLint) {
        gl::Uniform1iv(location, slice.len() as GLsizei, slice.as_ptr());
    }
}

impl UniformValue for u32 {
    unsafe fn set_uniform(value: &u32, location: GLint) {
        gl::Uniform1ui(location, *value);
    }

    unsafe fn set_uniform_slice(slice: &[u32], location: GLint) {
        gl::Uniform1uiv(location, slice.len() as GLsizei, slice.as_ptr());
    }
}

macro_rules! impl_uniform_matrix {
    ($ty:ty, $array:path) => {
        impl UniformMatrix for $ty {
            unsafe fn set_matrices(slice: &[$ty], location: GLint, transpose: bool) {
                $array(location, slice.len() as GLsizei, transpose as GLboolean, slice.as_ptr() as *const GLfloat);
            }
        }

        impl UniformValue for $ty {
            unsafe fn set_uniform(value: &$ty, location: GLint) {
                <$ty as UniformMatrix>::set_matrices(std::slice::from_ref(value), location, false);
            }

            unsafe fn set_uniform_slice(slice: &[$ty], location: GLint) {
                <$ty as UniformMatrix>::set_matrices(slice, location, false);
            }
        }
    }
}

impl_uniform_matrix!(Mat2, gl::UniformMatrix2fv);
impl_uniform_matrix!(Mat3, gl::UniformMatrix3fv);
impl_uniform_matrix!(Mat4, gl::UniformMatrix4fv);
