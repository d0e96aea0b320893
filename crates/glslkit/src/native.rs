//! Production driver over loaded OpenGL function pointers.
//!
//! [`NativeGl::load`] resolves the core entry points through the `gl` crate
//! and the `NV_gpu_shader5` 64-bit uniform entry points directly from the
//! platform loader, since those are a vendor extension outside the core
//! bindings. The caller must have created a context and made it current on
//! this thread before loading (window/context setup is out of scope here).

use std::ffi::{CStr, CString};
use std::os::raw::c_void;

use gl::types::{GLchar, GLenum, GLint, GLsizei, GLuint};
use tracing::warn;

use crate::driver::{
    ApiInfo, DriverError, FeedbackBufferMode, GlDriver, ProgramParameter, RawId,
};
use crate::shader::Stage;
use crate::uniform::UniformValue;

type I64vFn = unsafe extern "system" fn(GLint, GLsizei, *const i64);
type U64vFn = unsafe extern "system" fn(GLint, GLsizei, *const u64);

/// `NV_gpu_shader5` entry points, absent on drivers without the extension.
#[derive(Default)]
struct Nv64 {
    uniform1i64v: Option<I64vFn>,
    uniform2i64v: Option<I64vFn>,
    uniform3i64v: Option<I64vFn>,
    uniform4i64v: Option<I64vFn>,
    uniform1ui64v: Option<U64vFn>,
    uniform2ui64v: Option<U64vFn>,
    uniform3ui64v: Option<U64vFn>,
    uniform4ui64v: Option<U64vFn>,
}

/// [`GlDriver`] over the real, current GL context.
pub struct NativeGl {
    nv64: Nv64,
}

impl NativeGl {
    /// Loads every needed entry point through `loader` (typically
    /// `glfwGetProcAddress`/`eglGetProcAddress` from the windowing layer).
    pub fn load<F>(mut loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        gl::load_with(|symbol| loader(symbol));
        let nv64 = Nv64 {
            uniform1i64v: load_fn(&mut loader, "glUniform1i64vNV"),
            uniform2i64v: load_fn(&mut loader, "glUniform2i64vNV"),
            uniform3i64v: load_fn(&mut loader, "glUniform3i64vNV"),
            uniform4i64v: load_fn(&mut loader, "glUniform4i64vNV"),
            uniform1ui64v: load_fn(&mut loader, "glUniform1ui64vNV"),
            uniform2ui64v: load_fn(&mut loader, "glUniform2ui64vNV"),
            uniform3ui64v: load_fn(&mut loader, "glUniform3ui64vNV"),
            uniform4ui64v: load_fn(&mut loader, "glUniform4ui64vNV"),
        };
        Self { nv64 }
    }

    fn uniform_i64v(&self, components: u32, location: GLint, count: GLsizei, data: *const i64) {
        let entry = match components {
            1 => self.nv64.uniform1i64v,
            2 => self.nv64.uniform2i64v,
            3 => self.nv64.uniform3i64v,
            _ => self.nv64.uniform4i64v,
        };
        match entry {
            Some(f) => unsafe { f(location, count, data) },
            None => warn!("64-bit integer uniforms need GL_NV_gpu_shader5; assignment skipped"),
        }
    }

    fn uniform_u64v(&self, components: u32, location: GLint, count: GLsizei, data: *const u64) {
        let entry = match components {
            1 => self.nv64.uniform1ui64v,
            2 => self.nv64.uniform2ui64v,
            3 => self.nv64.uniform3ui64v,
            _ => self.nv64.uniform4ui64v,
        };
        match entry {
            Some(f) => unsafe { f(location, count, data) },
            None => warn!("64-bit integer uniforms need GL_NV_gpu_shader5; assignment skipped"),
        }
    }
}

fn load_fn<T>(loader: &mut impl FnMut(&str) -> *const c_void, symbol: &str) -> Option<T> {
    let ptr = loader(symbol);
    if ptr.is_null() {
        return None;
    }
    // fn pointer and data pointer have the same representation on every
    // platform GL runs on
    Some(unsafe { std::mem::transmute_copy(&ptr) })
}

fn stage_to_gl(stage: Stage) -> GLenum {
    match stage {
        Stage::Vertex => gl::VERTEX_SHADER,
        Stage::TessControl => gl::TESS_CONTROL_SHADER,
        Stage::TessEval => gl::TESS_EVALUATION_SHADER,
        Stage::Geometry => gl::GEOMETRY_SHADER,
        Stage::Fragment => gl::FRAGMENT_SHADER,
        Stage::Compute => gl::COMPUTE_SHADER,
    }
}

fn param_to_gl(param: ProgramParameter) -> GLenum {
    match param {
        ProgramParameter::DeleteStatus => gl::DELETE_STATUS,
        ProgramParameter::LinkStatus => gl::LINK_STATUS,
        ProgramParameter::ValidateStatus => gl::VALIDATE_STATUS,
        ProgramParameter::InfoLogLength => gl::INFO_LOG_LENGTH,
        ProgramParameter::AttachedShaders => gl::ATTACHED_SHADERS,
        ProgramParameter::ActiveAtomicCounterBuffers => gl::ACTIVE_ATOMIC_COUNTER_BUFFERS,
        ProgramParameter::ActiveAttributes => gl::ACTIVE_ATTRIBUTES,
        ProgramParameter::ActiveAttributeMaxLength => gl::ACTIVE_ATTRIBUTE_MAX_LENGTH,
        ProgramParameter::ActiveUniforms => gl::ACTIVE_UNIFORMS,
        ProgramParameter::ActiveUniformMaxLength => gl::ACTIVE_UNIFORM_MAX_LENGTH,
        ProgramParameter::BinaryLength => gl::PROGRAM_BINARY_LENGTH,
        ProgramParameter::TransformFeedbackBufferMode => gl::TRANSFORM_FEEDBACK_BUFFER_MODE,
        ProgramParameter::TransformFeedbackVaryings => gl::TRANSFORM_FEEDBACK_VARYINGS,
        ProgramParameter::TransformFeedbackVaryingMaxLength => {
            gl::TRANSFORM_FEEDBACK_VARYING_MAX_LENGTH
        }
        ProgramParameter::GeometryVerticesOut => gl::GEOMETRY_VERTICES_OUT,
        ProgramParameter::GeometryInputType => gl::GEOMETRY_INPUT_TYPE,
        ProgramParameter::GeometryOutputType => gl::GEOMETRY_OUTPUT_TYPE,
    }
}

/// Builds a C string, truncating at the first interior NUL instead of
/// failing (names with NULs can only come from corrupt input).
fn to_cstring(text: &str) -> CString {
    let bytes = text.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    // no interior NULs by construction
    unsafe { CString::from_vec_unchecked(bytes[..end].to_vec()) }
}

fn gl_string(name: GLenum) -> String {
    let ptr = unsafe { gl::GetString(name) };
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr as *const _) }
        .to_string_lossy()
        .into_owned()
}

fn gl_string_i(name: GLenum, index: u32) -> String {
    let ptr = unsafe { gl::GetStringi(name, index) };
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr as *const _) }
        .to_string_lossy()
        .into_owned()
}

impl GlDriver for NativeGl {
    fn create_shader(&self, stage: Stage) -> RawId {
        unsafe { gl::CreateShader(stage_to_gl(stage)) }
    }

    fn shader_source(&self, shader: RawId, source: &str) {
        let source = to_cstring(source);
        let ptr = source.as_ptr();
        unsafe { gl::ShaderSource(shader, 1, &ptr, std::ptr::null()) };
    }

    fn compile_shader(&self, shader: RawId) {
        unsafe { gl::CompileShader(shader) };
    }

    fn compile_succeeded(&self, shader: RawId) -> bool {
        let mut status: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: RawId) -> String {
        let mut len: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len) };
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len as usize];
        let mut written: GLsizei = 0;
        unsafe { gl::GetShaderInfoLog(shader, len, &mut written, buf.as_mut_ptr() as *mut GLchar) };
        buf.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn delete_shader(&self, shader: RawId) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> RawId {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: RawId, shader: RawId) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&self, program: RawId) {
        unsafe { gl::LinkProgram(program) };
    }

    fn link_succeeded(&self, program: RawId) -> bool {
        let mut status: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn validate_program(&self, program: RawId) {
        unsafe { gl::ValidateProgram(program) };
    }

    fn validation_succeeded(&self, program: RawId) -> bool {
        let mut status: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::VALIDATE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: RawId) -> String {
        let mut len: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len) };
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(program, len, &mut written, buf.as_mut_ptr() as *mut GLchar)
        };
        buf.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn delete_program(&self, program: RawId) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn use_program(&self, program: RawId) {
        unsafe { gl::UseProgram(program) };
    }

    fn program_parameter(&self, program: RawId, param: ProgramParameter) -> i32 {
        let mut value: GLint = 0;
        unsafe { gl::GetProgramiv(program, param_to_gl(param), &mut value) };
        value
    }

    fn uniform_location(&self, program: RawId, name: &str) -> i32 {
        let name = to_cstring(name);
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn subroutine_index(&self, program: RawId, stage: Stage, name: &str) -> u32 {
        let name = to_cstring(name);
        unsafe { gl::GetSubroutineIndex(program, stage_to_gl(stage), name.as_ptr()) }
    }

    fn subroutine_uniform_location(&self, program: RawId, stage: Stage, name: &str) -> i32 {
        let name = to_cstring(name);
        unsafe { gl::GetSubroutineUniformLocation(program, stage_to_gl(stage), name.as_ptr()) }
    }

    fn uniform_block_index(&self, program: RawId, name: &str) -> u32 {
        let name = to_cstring(name);
        unsafe { gl::GetUniformBlockIndex(program, name.as_ptr()) }
    }

    fn storage_block_index(&self, program: RawId, name: &str) -> u32 {
        let name = to_cstring(name);
        unsafe { gl::GetProgramResourceIndex(program, gl::SHADER_STORAGE_BLOCK, name.as_ptr()) }
    }

    fn uniform_block_binding(&self, program: RawId, block: u32, binding: u32) {
        unsafe { gl::UniformBlockBinding(program, block, binding) };
    }

    fn storage_block_binding(&self, program: RawId, block: u32, binding: u32) {
        unsafe { gl::ShaderStorageBlockBinding(program, block, binding) };
    }

    fn load_subroutines(&self, stage: Stage, indices: &[u32]) {
        unsafe {
            gl::UniformSubroutinesuiv(
                stage_to_gl(stage),
                indices.len() as GLsizei,
                indices.as_ptr(),
            )
        };
    }

    fn transform_feedback_varyings(&self, program: RawId, names: &[&str], mode: FeedbackBufferMode) {
        let owned: Vec<CString> = names.iter().map(|n| to_cstring(n)).collect();
        let ptrs: Vec<*const GLchar> = owned.iter().map(|n| n.as_ptr()).collect();
        let mode = match mode {
            FeedbackBufferMode::Interleaved => gl::INTERLEAVED_ATTRIBS,
            FeedbackBufferMode::Separate => gl::SEPARATE_ATTRIBS,
        };
        unsafe {
            gl::TransformFeedbackVaryings(program, ptrs.len() as GLsizei, ptrs.as_ptr(), mode)
        };
    }

    fn set_uniform(&self, location: i32, value: &UniformValue<'_>) {
        use UniformValue::*;
        let n = |len: usize| len as GLsizei;
        unsafe {
            match *value {
                Int(v) => gl::Uniform1i(location, v),
                IntVec2(v) => gl::Uniform2iv(location, 1, v.as_ptr()),
                IntVec3(v) => gl::Uniform3iv(location, 1, v.as_ptr()),
                IntVec4(v) => gl::Uniform4iv(location, 1, v.as_ptr()),
                IntSlice(s) => gl::Uniform1iv(location, n(s.len()), s.as_ptr()),
                IntVec2Slice(s) => gl::Uniform2iv(location, n(s.len()), s.as_ptr().cast()),
                IntVec3Slice(s) => gl::Uniform3iv(location, n(s.len()), s.as_ptr().cast()),
                IntVec4Slice(s) => gl::Uniform4iv(location, n(s.len()), s.as_ptr().cast()),

                UInt(v) => gl::Uniform1ui(location, v),
                UIntVec2(v) => gl::Uniform2uiv(location, 1, v.as_ptr()),
                UIntVec3(v) => gl::Uniform3uiv(location, 1, v.as_ptr()),
                UIntVec4(v) => gl::Uniform4uiv(location, 1, v.as_ptr()),
                UIntSlice(s) => gl::Uniform1uiv(location, n(s.len()), s.as_ptr()),
                UIntVec2Slice(s) => gl::Uniform2uiv(location, n(s.len()), s.as_ptr().cast()),
                UIntVec3Slice(s) => gl::Uniform3uiv(location, n(s.len()), s.as_ptr().cast()),
                UIntVec4Slice(s) => gl::Uniform4uiv(location, n(s.len()), s.as_ptr().cast()),

                Int64(v) => self.uniform_i64v(1, location, 1, &v),
                Int64Vec2(v) => self.uniform_i64v(2, location, 1, v.as_ptr()),
                Int64Vec3(v) => self.uniform_i64v(3, location, 1, v.as_ptr()),
                Int64Vec4(v) => self.uniform_i64v(4, location, 1, v.as_ptr()),
                Int64Slice(s) => self.uniform_i64v(1, location, n(s.len()), s.as_ptr()),
                Int64Vec2Slice(s) => self.uniform_i64v(2, location, n(s.len()), s.as_ptr().cast()),
                Int64Vec3Slice(s) => self.uniform_i64v(3, location, n(s.len()), s.as_ptr().cast()),
                Int64Vec4Slice(s) => self.uniform_i64v(4, location, n(s.len()), s.as_ptr().cast()),

                UInt64(v) => self.uniform_u64v(1, location, 1, &v),
                UInt64Vec2(v) => self.uniform_u64v(2, location, 1, v.as_ptr()),
                UInt64Vec3(v) => self.uniform_u64v(3, location, 1, v.as_ptr()),
                UInt64Vec4(v) => self.uniform_u64v(4, location, 1, v.as_ptr()),
                UInt64Slice(s) => self.uniform_u64v(1, location, n(s.len()), s.as_ptr()),
                UInt64Vec2Slice(s) => self.uniform_u64v(2, location, n(s.len()), s.as_ptr().cast()),
                UInt64Vec3Slice(s) => self.uniform_u64v(3, location, n(s.len()), s.as_ptr().cast()),
                UInt64Vec4Slice(s) => self.uniform_u64v(4, location, n(s.len()), s.as_ptr().cast()),

                Float(v) => gl::Uniform1f(location, v),
                Vec2(v) => gl::Uniform2fv(location, 1, v.as_ptr()),
                Vec3(v) => gl::Uniform3fv(location, 1, v.as_ptr()),
                Vec4(v) => gl::Uniform4fv(location, 1, v.as_ptr()),
                FloatSlice(s) => gl::Uniform1fv(location, n(s.len()), s.as_ptr()),
                Vec2Slice(s) => gl::Uniform2fv(location, n(s.len()), s.as_ptr().cast()),
                Vec3Slice(s) => gl::Uniform3fv(location, n(s.len()), s.as_ptr().cast()),
                Vec4Slice(s) => gl::Uniform4fv(location, n(s.len()), s.as_ptr().cast()),

                Double(v) => gl::Uniform1d(location, v),
                DVec2(v) => gl::Uniform2dv(location, 1, v.as_ptr()),
                DVec3(v) => gl::Uniform3dv(location, 1, v.as_ptr()),
                DVec4(v) => gl::Uniform4dv(location, 1, v.as_ptr()),
                DoubleSlice(s) => gl::Uniform1dv(location, n(s.len()), s.as_ptr()),
                DVec2Slice(s) => gl::Uniform2dv(location, n(s.len()), s.as_ptr().cast()),
                DVec3Slice(s) => gl::Uniform3dv(location, n(s.len()), s.as_ptr().cast()),
                DVec4Slice(s) => gl::Uniform4dv(location, n(s.len()), s.as_ptr().cast()),

                Mat2(m) => gl::UniformMatrix2fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat2x3(m) => gl::UniformMatrix2x3fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat2x4(m) => gl::UniformMatrix2x4fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat3x2(m) => gl::UniformMatrix3x2fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat3(m) => gl::UniformMatrix3fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat3x4(m) => gl::UniformMatrix3x4fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat4x2(m) => gl::UniformMatrix4x2fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat4x3(m) => gl::UniformMatrix4x3fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat4(m) => gl::UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr().cast()),
                Mat2Slice(s) => {
                    gl::UniformMatrix2fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                Mat2x3Slice(s) => {
                    gl::UniformMatrix2x3fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                Mat2x4Slice(s) => {
                    gl::UniformMatrix2x4fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                Mat3x2Slice(s) => {
                    gl::UniformMatrix3x2fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                Mat3Slice(s) => {
                    gl::UniformMatrix3fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                Mat3x4Slice(s) => {
                    gl::UniformMatrix3x4fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                Mat4x2Slice(s) => {
                    gl::UniformMatrix4x2fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                Mat4x3Slice(s) => {
                    gl::UniformMatrix4x3fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                Mat4Slice(s) => {
                    gl::UniformMatrix4fv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }

                DMat2(m) => gl::UniformMatrix2dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat2x3(m) => gl::UniformMatrix2x3dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat2x4(m) => gl::UniformMatrix2x4dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat3x2(m) => gl::UniformMatrix3x2dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat3(m) => gl::UniformMatrix3dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat3x4(m) => gl::UniformMatrix3x4dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat4x2(m) => gl::UniformMatrix4x2dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat4x3(m) => gl::UniformMatrix4x3dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat4(m) => gl::UniformMatrix4dv(location, 1, gl::FALSE, m.as_ptr().cast()),
                DMat2Slice(s) => {
                    gl::UniformMatrix2dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                DMat2x3Slice(s) => {
                    gl::UniformMatrix2x3dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                DMat2x4Slice(s) => {
                    gl::UniformMatrix2x4dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                DMat3x2Slice(s) => {
                    gl::UniformMatrix3x2dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                DMat3Slice(s) => {
                    gl::UniformMatrix3dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                DMat3x4Slice(s) => {
                    gl::UniformMatrix3x4dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                DMat4x2Slice(s) => {
                    gl::UniformMatrix4x2dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                DMat4x3Slice(s) => {
                    gl::UniformMatrix4x3dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
                DMat4Slice(s) => {
                    gl::UniformMatrix4dv(location, n(s.len()), gl::FALSE, s.as_ptr().cast())
                }
            }
        }
    }

    fn poll_error(&self) -> Option<DriverError> {
        let code = unsafe { gl::GetError() };
        match code {
            gl::NO_ERROR => None,
            gl::INVALID_ENUM => Some(DriverError::InvalidEnum),
            gl::INVALID_VALUE => Some(DriverError::InvalidValue),
            gl::INVALID_OPERATION => Some(DriverError::InvalidOperation),
            gl::INVALID_FRAMEBUFFER_OPERATION => Some(DriverError::InvalidFramebufferOperation),
            gl::OUT_OF_MEMORY => Some(DriverError::OutOfMemory),
            gl::STACK_UNDERFLOW => Some(DriverError::StackUnderflow),
            gl::STACK_OVERFLOW => Some(DriverError::StackOverflow),
            other => Some(DriverError::Unknown(other)),
        }
    }

    fn api_info(&self) -> ApiInfo {
        let mut num_extensions: GLint = 0;
        unsafe { gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions) };
        let extensions = (0..num_extensions.max(0) as u32)
            .map(|i| gl_string_i(gl::EXTENSIONS, i))
            .collect();

        let mut invocations: GLint = 0;
        let mut count = [0 as GLint; 3];
        let mut size = [0 as GLint; 3];
        unsafe {
            gl::GetIntegerv(gl::MAX_COMPUTE_WORK_GROUP_INVOCATIONS, &mut invocations);
            for i in 0..3 {
                gl::GetIntegeri_v(gl::MAX_COMPUTE_WORK_GROUP_COUNT, i as GLuint, &mut count[i]);
                gl::GetIntegeri_v(gl::MAX_COMPUTE_WORK_GROUP_SIZE, i as GLuint, &mut size[i]);
            }
        }

        ApiInfo {
            vendor: gl_string(gl::VENDOR),
            renderer: gl_string(gl::RENDERER),
            version: gl_string(gl::VERSION),
            shading_language_version: gl_string(gl::SHADING_LANGUAGE_VERSION),
            extensions,
            max_compute_work_group_invocations: invocations,
            max_compute_work_group_count: count,
            max_compute_work_group_size: size,
        }
    }
}
