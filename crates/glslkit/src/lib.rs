//! GLSL shader-program lifecycle management.
//!
//! The crate wraps the raw compile/link/use object model behind owning
//! types: [`Shader`] for a single compiled stage, [`Program`] for a linked
//! pipeline, [`Uniform`] for a resolved uniform location, and
//! [`FixedBuffer`] for the fixed-capacity byte and element storage the
//! loaders hand around. All driver traffic goes through the [`GlDriver`]
//! trait on a [`Context`], so the same lifecycle runs against the real GL
//! ([`NativeGl`]) and against the in-memory test driver ([`MockGl`]).
//!
//! ```no_run
//! use glslkit::{Context, NativeGl, Program, Shader, Stage};
//!
//! # fn get_proc_address(_: &str) -> *const std::ffi::c_void { std::ptr::null() }
//! # fn main() -> Result<(), glslkit::Error> {
//! let ctx = Context::new(NativeGl::load(get_proc_address));
//! let vs = Shader::from_file(&ctx, Stage::Vertex, "shaders/quad.vert")?;
//! let fs = Shader::from_file(&ctx, Stage::Fragment, "shaders/quad.frag")?;
//! let program = Program::from_stages(&ctx, &vs, &fs)?;
//! program.enable();
//! program.uniform("u_time").set(0.0f32);
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod context;
pub mod driver;
pub mod error;
pub mod fileio;
pub mod mock;
pub mod native;
pub mod program;
pub mod shader;
pub mod uniform;

pub use buffer::{FixedBuffer, RawParts};
pub use context::{Context, InfoCategories, LinkPolicy};
pub use driver::{
    ApiInfo, DriverError, FeedbackBufferMode, GlDriver, ProgramParameter, RawId, INVALID_INDEX,
    NO_LOCATION, NO_OBJECT,
};
pub use error::Error;
pub use mock::MockGl;
pub use native::NativeGl;
pub use program::Program;
pub use shader::{Shader, Stage};
pub use uniform::{Uniform, UniformValue};
