//! The driver seam.
//!
//! Every call the lifecycle makes into the graphics driver goes through the
//! [`GlDriver`] trait, so the "current context" the original design kept as
//! hidden global state is an explicit, injectable handle. The production
//! implementation is [`NativeGl`](crate::native::NativeGl) over loaded GL
//! function pointers; [`MockGl`](crate::mock::MockGl) provides an in-memory
//! driver for tests.
//!
//! Raw object ids are plain `u32`s with `0` meaning "no object"; deleting
//! id 0 must be a no-op. Name lookups keep the driver's sentinel encoding
//! (`-1` for uniform locations, [`INVALID_INDEX`] for blocks/subroutines);
//! the typed wrappers above this trait translate the sentinels into
//! `Option`s.

use crate::shader::Stage;
use crate::uniform::UniformValue;

/// A raw shader or program object id. `0` is the "no object" sentinel.
pub type RawId = u32;

/// The id of a never-created or already-released object.
pub const NO_OBJECT: RawId = 0;

/// The location reported for a uniform name that is not active in a program.
pub const NO_LOCATION: i32 = -1;

/// The index reported for an unknown block or subroutine name
/// (`GL_INVALID_INDEX`).
pub const INVALID_INDEX: u32 = u32::MAX;

/// Integer program properties readable through
/// [`GlDriver::program_parameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramParameter {
    DeleteStatus,
    LinkStatus,
    ValidateStatus,
    InfoLogLength,
    AttachedShaders,
    ActiveAtomicCounterBuffers,
    ActiveAttributes,
    ActiveAttributeMaxLength,
    ActiveUniforms,
    ActiveUniformMaxLength,
    BinaryLength,
    TransformFeedbackBufferMode,
    TransformFeedbackVaryings,
    TransformFeedbackVaryingMaxLength,
    GeometryVerticesOut,
    GeometryInputType,
    GeometryOutputType,
}

/// How captured transform-feedback varyings are laid out across buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackBufferMode {
    Interleaved,
    Separate,
}

/// Errors drained from the driver's error queue
/// (see [`Context::drain_errors`](crate::context::Context::drain_errors)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    StackUnderflow,
    StackOverflow,
    Unknown(u32),
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::InvalidEnum => write!(f, "GL_INVALID_ENUM"),
            DriverError::InvalidValue => write!(f, "GL_INVALID_VALUE"),
            DriverError::InvalidOperation => write!(f, "GL_INVALID_OPERATION"),
            DriverError::InvalidFramebufferOperation => {
                write!(f, "GL_INVALID_FRAMEBUFFER_OPERATION")
            }
            DriverError::OutOfMemory => write!(f, "GL_OUT_OF_MEMORY"),
            DriverError::StackUnderflow => write!(f, "GL_STACK_UNDERFLOW"),
            DriverError::StackOverflow => write!(f, "GL_STACK_OVERFLOW"),
            DriverError::Unknown(code) => write!(f, "unrecognized GL error {code:#x}"),
        }
    }
}

/// Implementation-dependent strings and limits, reported by
/// [`Context::dump_info`](crate::context::Context::dump_info).
#[derive(Debug, Clone, Default)]
pub struct ApiInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language_version: String,
    pub extensions: Vec<String>,
    pub max_compute_work_group_invocations: i32,
    pub max_compute_work_group_count: [i32; 3],
    pub max_compute_work_group_size: [i32; 3],
}

/// The exact set of driver entry points the shader/program lifecycle needs.
///
/// All calls are synchronous and assume the calling thread owns the device
/// context for the lifetime of the process; there is no locking discipline
/// at this layer.
pub trait GlDriver {
    // ========================================================================
    // Shader objects
    // ========================================================================

    /// Requests a new shader object for `stage`. Returns [`NO_OBJECT`] on
    /// failure.
    fn create_shader(&self, stage: Stage) -> RawId;
    fn shader_source(&self, shader: RawId, source: &str);
    fn compile_shader(&self, shader: RawId);
    fn compile_succeeded(&self, shader: RawId) -> bool;
    fn shader_info_log(&self, shader: RawId) -> String;
    /// Releases a shader object. Must accept [`NO_OBJECT`] as a no-op.
    fn delete_shader(&self, shader: RawId);

    // ========================================================================
    // Program objects
    // ========================================================================

    /// Requests a new program object. Returns [`NO_OBJECT`] on failure.
    fn create_program(&self) -> RawId;
    fn attach_shader(&self, program: RawId, shader: RawId);
    fn link_program(&self, program: RawId);
    fn link_succeeded(&self, program: RawId) -> bool;
    fn validate_program(&self, program: RawId);
    fn validation_succeeded(&self, program: RawId) -> bool;
    fn program_info_log(&self, program: RawId) -> String;
    /// Releases a program object. Must accept [`NO_OBJECT`] as a no-op.
    fn delete_program(&self, program: RawId);
    /// Binds `program` as the active program; [`NO_OBJECT`] unbinds.
    fn use_program(&self, program: RawId);
    fn program_parameter(&self, program: RawId, param: ProgramParameter) -> i32;

    // ========================================================================
    // Name lookups (sentinel results pass through untranslated)
    // ========================================================================

    fn uniform_location(&self, program: RawId, name: &str) -> i32;
    fn subroutine_index(&self, program: RawId, stage: Stage, name: &str) -> u32;
    fn subroutine_uniform_location(&self, program: RawId, stage: Stage, name: &str) -> i32;
    fn uniform_block_index(&self, program: RawId, name: &str) -> u32;
    fn storage_block_index(&self, program: RawId, name: &str) -> u32;

    // ========================================================================
    // Bindings and dispatch
    // ========================================================================

    fn uniform_block_binding(&self, program: RawId, block: u32, binding: u32);
    fn storage_block_binding(&self, program: RawId, block: u32, binding: u32);
    /// Selects subroutine indices for every subroutine uniform of `stage` in
    /// the currently enabled program.
    fn load_subroutines(&self, stage: Stage, indices: &[u32]);
    fn transform_feedback_varyings(&self, program: RawId, names: &[&str], mode: FeedbackBufferMode);
    /// The single typed uniform entry point: dispatches `value` to the
    /// driver call matching its shape, element type and count. `location`
    /// is never the `-1` sentinel; the wrappers filter that out.
    fn set_uniform(&self, location: i32, value: &UniformValue<'_>);

    // ========================================================================
    // Context-wide queries
    // ========================================================================

    /// Pops one pending error from the driver's error queue.
    fn poll_error(&self) -> Option<DriverError>;
    fn api_info(&self) -> ApiInfo;
}
