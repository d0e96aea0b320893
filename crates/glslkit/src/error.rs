//! Errors reported by the shader/program lifecycle.
//!
//! Compilation failure is recoverable: the caller gets the driver's full
//! info log and may retry with different source. Link failure is recoverable
//! under [`LinkPolicy::Lenient`](crate::context::LinkPolicy) and terminates
//! the process under `LinkPolicy::Strict`.

use crate::driver::RawId;
use crate::shader::Stage;

/// Errors that can occur while building shaders and programs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A shader stage failed to compile. Carries the driver's info log.
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: Stage, log: String },
    /// Program linking failed. The program object has been released and the
    /// owning [`Program`](crate::program::Program) reset to the unlinked state.
    #[error("program link failed: {log}")]
    Link { log: String },
    /// `glValidateProgram` reported the program unusable in the current state.
    #[error("program {id} failed validation: {log}")]
    Validate { id: RawId, log: String },
    /// The driver refused to hand out a new shader or program object.
    #[error("driver returned no {kind} object")]
    ObjectCreation { kind: &'static str },
}
