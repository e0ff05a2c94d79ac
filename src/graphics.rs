//! Wrappers for global OpenGL state: loading function pointers and reading back errors.

use gl::types::*;
use std::os::raw::c_void;

/// Loads all OpenGL function pointers through the given loader, usually the `get_proc_address`
/// of whatever windowing library created the context. This has to be called once, with the
/// context current, before any other function in this crate is used.
pub fn load_with<F>(loader: F)
    where F: FnMut(&'static str) -> *const c_void,
{
    gl::load_with(loader);
    log::debug!("Loaded OpenGL function pointers");
}

/// Logs all pending OpenGL errors at the error level, clearing them.
pub fn print_errors() {
    unsafe {
        while let Some(error) = get_error_message(gl::GetError()) {
            log::error!("OpenGL error: {}", error);
        }
    }
}

/// Retrieves the string associated with the given OpenGL error. Returns `None` if no error
/// occurred.
pub fn get_error_message(error: GLenum) -> Option<String> {
    let value = match error {
        gl::INVALID_VALUE                   => "Invalid value",
        gl::INVALID_ENUM                    => "Invalid enum",
        gl::INVALID_OPERATION               => "Invalid operation",
        gl::INVALID_FRAMEBUFFER_OPERATION   => "Invalid framebuffer operation",
        gl::OUT_OF_MEMORY                   => "Out of memory",
        gl::STACK_OVERFLOW                  => "Stack overflow",
        gl::STACK_UNDERFLOW                 => "Stack underflow",

        gl::NO_ERROR                        => return None,
        _                                   => return Some(format!("Invalid error code: {:x}", error)),
    };
    Some(String::from(value))
}
