//! Shader stage compilation.

use std::path::Path;

use tracing::{debug, error, warn};

use crate::context::Context;
use crate::driver::{RawId, NO_OBJECT};
use crate::error::Error;
use crate::fileio;

/// One point in the rendering/compute pipeline requiring separately
/// compiled code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    TessControl,
    TessEval,
    Geometry,
    Fragment,
    Compute,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::TessControl => "tessellation-control",
            Stage::TessEval => "tessellation-evaluation",
            Stage::Geometry => "geometry",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A compiled shader stage.
///
/// Holds exactly one compiled shader object whose compile status was
/// verified at construction time; the object is released when the unit is
/// dropped. Move-only.
pub struct Shader {
    ctx: Context,
    id: RawId,
    stage: Stage,
}

impl Shader {
    /// Compiles `source` for `stage`.
    ///
    /// On success any non-empty compiler message is logged as a warning and
    /// the unit is returned. On failure the info log is drained, the shader
    /// object released, and the log handed back in [`Error::Compile`] —
    /// compilation failure is recoverable, the caller decides whether to
    /// retry or substitute.
    pub fn from_source(ctx: &Context, stage: Stage, source: &str) -> Result<Self, Error> {
        let id = compile(ctx, stage, source)?;
        Ok(Self {
            ctx: ctx.clone(),
            id,
            stage,
        })
    }

    /// Reads `path` fully (null-terminated, as the driver-facing text) and
    /// compiles it. A failed read degrades to an empty source string, which
    /// then fails compilation through the ordinary recoverable path.
    pub fn from_file(ctx: &Context, stage: Stage, path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("creating {stage} shader from {}", path.display());
        let buffer = fileio::read_all(path, true);
        let text = buffer.split_last().map(|(_, text)| text).unwrap_or(&[]);
        Self::from_source(ctx, stage, &String::from_utf8_lossy(text))
    }

    pub fn id(&self) -> RawId {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.ctx.driver().delete_shader(self.id);
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .finish()
    }
}

fn compile(ctx: &Context, stage: Stage, source: &str) -> Result<RawId, Error> {
    debug!("compiling {stage} shader");
    let driver = ctx.driver();
    let id = driver.create_shader(stage);
    if id == NO_OBJECT {
        return Err(Error::ObjectCreation { kind: "shader" });
    }
    driver.shader_source(id, source);
    driver.compile_shader(id);
    if driver.compile_succeeded(id) {
        let log = driver.shader_info_log(id);
        if !log.is_empty() {
            warn!("{stage} shader {id} compiler message: {log}");
        }
        debug!("{stage} shader {id} compiled");
        return Ok(id);
    }
    let log = driver.shader_info_log(id);
    error!("failed to compile {stage} shader {id}: {log}");
    driver.delete_shader(id);
    Err(Error::Compile { stage, log })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGl;

    const MINIMAL_FRAG: &str = "#version 330 core\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n";

    #[test]
    fn test_compile_valid_source() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let shader = Shader::from_source(&ctx, Stage::Fragment, MINIMAL_FRAG).unwrap();
        assert_ne!(shader.id(), NO_OBJECT);
        assert_eq!(shader.stage(), Stage::Fragment);
    }

    #[test]
    fn test_compiling_twice_yields_independent_shaders() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let first = Shader::from_source(&ctx, Stage::Fragment, MINIMAL_FRAG).unwrap();
        let second = Shader::from_source(&ctx, Stage::Fragment, MINIMAL_FRAG).unwrap();
        assert_ne!(first.id(), second.id());

        let first_id = first.id();
        let second_id = second.id();
        drop(first);
        assert!(!mock.shader_alive(first_id));
        assert!(mock.shader_alive(second_id));
    }

    #[test]
    fn test_compile_failure_is_recoverable_and_releases_object() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let result = Shader::from_source(&ctx, Stage::Vertex, "#version 330\n#error broken\n");
        match result {
            Err(Error::Compile { stage, log }) => {
                assert_eq!(stage, Stage::Vertex);
                assert!(log.contains("#error"));
            }
            other => panic!("expected compile error, got {other:?}"),
        }
        assert!(mock.all_shaders_released());
    }

    #[test]
    fn test_empty_source_fails_compilation() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        assert!(Shader::from_source(&ctx, Stage::Vertex, "").is_err());
    }

    #[test]
    fn test_from_missing_file_fails_via_recoverable_path() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let result = Shader::from_file(&ctx, Stage::Vertex, "/nonexistent/glslkit/a.vert");
        assert!(matches!(result, Err(Error::Compile { .. })));
    }

    #[test]
    fn test_from_file_compiles_contents() {
        use std::io::Write;
        let path = std::env::temp_dir().join(format!("glslkit_shader_{}.vert", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(MINIMAL_FRAG.as_bytes()).unwrap();
        drop(file);

        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let shader = Shader::from_file(&ctx, Stage::Vertex, &path).unwrap();
        assert_eq!(mock.shader_source_of(shader.id()), MINIMAL_FRAG);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_drop_releases_shader_object() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let shader = Shader::from_source(&ctx, Stage::Compute, MINIMAL_FRAG).unwrap();
        let id = shader.id();
        drop(shader);
        assert!(!mock.shader_alive(id));
    }
}
