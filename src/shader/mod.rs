//! GLSL shader programs.

mod uniform;

pub use self::uniform::*;

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CString, NulError};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::ptr;
use std::rc::Rc;

use gl::types::*;
use thiserror::Error;

/// The programmable stages a [`GlslProg`] can be built from.
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex   = gl::VERTEX_SHADER,
    Geometry = gl::GEOMETRY_SHADER,
    Fragment = gl::FRAGMENT_SHADER,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            ShaderStage::Vertex   => "Vertex",
            ShaderStage::Geometry => "Geometry",
            ShaderStage::Fragment => "Fragment",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ShaderError {
    /// A stage failed to compile. Contains the info log of the shader.
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    /// The program failed to link. Contains the info log of the program.
    #[error("Shader program failed to link:\n{log}")]
    Link { log: String },
    #[error("Glsl: Attempt to use null shader")]
    NullProgram,
    #[error("Shader source contains a nul byte")]
    InvalidSource(#[from] NulError),
    #[error("Could not read shader source {}: {source}", .path.display())]
    Io { path: PathBuf, #[source] source: io::Error },
}

/// Compiles a single shader stage. On failure the shader is deleted and its info log returned.
pub fn compile(source: &str, stage: ShaderStage) -> Result<GLuint, ShaderError> {
    let c_str = CString::new(source.as_bytes())?;

    unsafe {
        let shader = gl::CreateShader(stage as GLenum);
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut status = gl::FALSE as GLint;
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != (gl::TRUE as GLint) {
            let log = shader_log(shader);
            gl::DeleteShader(shader);
            return Err(ShaderError::Compile { stage, log });
        }

        Ok(shader)
    }
}

/// Returns the info log of the given shader object.
pub fn shader_log(shader: GLuint) -> String {
    unsafe {
        let mut log_len = 0;
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut log_len);
        read_log(log_len, |len, written, buffer| gl::GetShaderInfoLog(shader, len, written, buffer))
    }
}

fn program_log(program: GLuint) -> String {
    unsafe {
        let mut log_len = 0;
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut log_len);
        read_log(log_len, |len, written, buffer| gl::GetProgramInfoLog(program, len, written, buffer))
    }
}

unsafe fn read_log<F>(log_len: GLint, read: F) -> String
    where F: FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
{
    if log_len <= 0 {
        return String::new();
    }

    let mut buffer = vec![0u8; log_len as usize];
    let mut written = 0;
    read(log_len, &mut written, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.max(0) as usize); // Skips null terminator

    String::from_utf8_lossy(&buffer).into_owned()
}

/// A linked GLSL program. Cloning gives another handle to the same program, the program and its
/// shaders are deleted when the last handle is dropped.
///
/// Geometry shaders have to declare their input and output primitives in source, through
/// `layout(...) in;` and `layout(..., max_vertices = n) out;`.
#[derive(Debug, Clone)]
pub struct GlslProg {
    obj: Rc<ProgramObj>,
}

#[derive(Debug)]
struct ProgramObj {
    handle: GLuint,
    shaders: Vec<GLuint>,
    uniform_locations: RefCell<HashMap<String, GLint>>,
}

impl GlslProg {
    /// Compiles the given sources and links them into a program. The geometry and fragment
    /// stages are optional.
    pub fn new(vertex_source: &str,
               fragment_source: Option<&str>,
               geometry_source: Option<&str>)
        -> Result<GlslProg, ShaderError>
    {
        let handle = unsafe { gl::CreateProgram() };
        if handle == 0 {
            return Err(ShaderError::NullProgram);
        }

        // Deletes the program and any attached shaders if we bail out early
        let mut obj = ProgramObj {
            handle,
            shaders: Vec::with_capacity(3),
            uniform_locations: RefCell::new(HashMap::new()),
        };

        let stages = [
            (ShaderStage::Vertex, Some(vertex_source)),
            (ShaderStage::Geometry, geometry_source),
            (ShaderStage::Fragment, fragment_source),
        ];
        for &(stage, source) in stages.iter() {
            if let Some(source) = source {
                let shader = compile(source, stage)?;
                unsafe { gl::AttachShader(handle, shader); }
                obj.shaders.push(shader);
            }
        }

        unsafe {
            gl::LinkProgram(handle);

            let mut status = gl::FALSE as GLint;
            gl::GetProgramiv(handle, gl::LINK_STATUS, &mut status);
            if status != (gl::TRUE as GLint) {
                return Err(ShaderError::Link { log: program_log(handle) });
            }
        }

        log::debug!("Linked program {} from {} shader stages", handle, obj.shaders.len());
        Ok(GlslProg { obj: Rc::new(obj) })
    }

    /// Same as [`new`](#method.new), but reads the sources from the given files.
    pub fn from_files<P: AsRef<Path>>(vertex_path: P,
                                      fragment_path: Option<P>,
                                      geometry_path: Option<P>)
        -> Result<GlslProg, ShaderError>
    {
        let vertex = read_source(vertex_path.as_ref())?;
        let fragment = fragment_path.map(|p| read_source(p.as_ref())).transpose()?;
        let geometry = geometry_path.map(|p| read_source(p.as_ref())).transpose()?;

        GlslProg::new(&vertex, fragment.as_deref(), geometry.as_deref())
    }

    /// Binds this program, replacing the previously bound program.
    pub fn bind(&self) {
        unsafe {
            gl::UseProgram(self.obj.handle);
        }
    }

    /// Binds program 0.
    pub fn unbind() {
        unsafe {
            gl::UseProgram(0);
        }
    }

    /// The OpenGL name of this program.
    pub fn handle(&self) -> GLuint {
        self.obj.handle
    }

    /// Returns the location of the named uniform, or -1 if the program has no active uniform by
    /// that name. Lookups are cached, and missing uniforms are only reported once.
    pub fn uniform_location(&self, name: &str) -> GLint {
        if let Some(location) = self.obj.uniform_locations.borrow().get(name) {
            return *location;
        }

        let location = match CString::new(name) {
            Ok(c_name) => unsafe { gl::GetUniformLocation(self.obj.handle, c_name.as_ptr()) },
            Err(_) => -1,
        };
        if location < 0 {
            log::warn!("Program {} has no uniform \"{}\"", self.obj.handle, name);
        }

        self.obj.uniform_locations.borrow_mut().insert(name.to_owned(), location);
        location
    }

    /// Returns the location of the named vertex attribute, or -1 if the program has no active
    /// attribute by that name.
    pub fn attrib_location(&self, name: &str) -> GLint {
        match CString::new(name) {
            Ok(c_name) => unsafe { gl::GetAttribLocation(self.obj.handle, c_name.as_ptr()) },
            Err(_) => -1,
        }
    }

    /// Returns the info log of the given shader object.
    pub fn shader_log(&self, shader: GLuint) -> String {
        shader_log(shader)
    }

    /// Binds this program and sets the named uniform. Uniforms the program does not have are
    /// ignored.
    pub fn uniform<T: UniformValue>(&self, name: &str, value: &T) {
        self.bind();
        let location = self.uniform_location(name);
        unsafe { T::set_uniform(value, location); }
    }

    /// Binds this program and sets the named uniform array.
    pub fn uniform_slice<T: UniformValue>(&self, name: &str, values: &[T]) {
        self.bind();
        let location = self.uniform_location(name);
        unsafe { T::set_uniform_slice(values, location); }
    }

    /// Binds this program and sets the named matrix uniform, optionally transposing it.
    pub fn uniform_matrix<M: UniformMatrix>(&self, name: &str, value: &M, transpose: bool) {
        self.bind();
        let location = self.uniform_location(name);
        unsafe { M::set_matrices(std::slice::from_ref(value), location, transpose); }
    }

    /// Binds this program and sets the named matrix array uniform, optionally transposing each
    /// matrix.
    pub fn uniform_matrices<M: UniformMatrix>(&self, name: &str, values: &[M], transpose: bool) {
        self.bind();
        let location = self.uniform_location(name);
        unsafe { M::set_matrices(values, location, transpose); }
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Io { path: path.to_owned(), source })
}

impl Drop for ProgramObj {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.handle);
            for shader in self.shaders.iter() {
                gl::DeleteShader(*shader);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_errors_name_the_stage() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Geometry,
            log: "0:1(1): error: syntax error".to_string(),
        };
        assert_eq!("Geometry shader failed to compile:\n0:1(1): error: syntax error", err.to_string());
    }

    #[test]
    fn null_program_message() {
        assert_eq!("Glsl: Attempt to use null shader", ShaderError::NullProgram.to_string());
    }

    #[test]
    fn sources_with_nul_bytes_are_rejected_before_reaching_the_driver() {
        match compile("void main() {}\0", ShaderStage::Vertex) {
            Err(ShaderError::InvalidSource(_)) => (),
            other => panic!("Expected invalid source, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_source_file_is_io_error() {
        let path = std::env::temp_dir().join("glmesh-does-not-exist.vert");
        match GlslProg::from_files(&path, None, None) {
            Err(ShaderError::Io { path: reported, .. }) => assert_eq!(path, reported),
            Err(other) => panic!("Expected io error, got {}", other),
            Ok(_) => panic!("Expected io error"),
        }
    }

    #[test]
    fn stages_map_to_gl_enums() {
        assert_eq!(gl::VERTEX_SHADER, ShaderStage::Vertex as GLenum);
        assert_eq!(gl::FRAGMENT_SHADER, ShaderStage::Fragment as GLenum);
    }
}
