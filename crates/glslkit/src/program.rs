//! Program creation, linking, validation and introspection.
//!
//! A [`Program`] owns exactly one program object. Its lifecycle is
//! `Empty → Linking → {Linked | Fatal}`: before a successful link the id is
//! 0, after one it stays valid until the program is dropped or relinked,
//! and a failed link releases the object and zeroes the id — then either
//! reports [`Error::Link`] or, under [`LinkPolicy::Strict`], terminates the
//! process. There is no recovery transition out of the fatal state.

use tracing::{debug, error};

use crate::context::{Context, LinkPolicy};
use crate::driver::{FeedbackBufferMode, ProgramParameter, RawId, INVALID_INDEX, NO_LOCATION, NO_OBJECT};
use crate::error::Error;
use crate::shader::{Shader, Stage};
use crate::uniform::Uniform;

/// A linked combination of compiled stages, usable by the device.
///
/// Move-only owner of the underlying program object. The borrowed
/// [`Shader`] units are only needed during construction; the program does
/// not keep them alive afterwards.
pub struct Program {
    ctx: Context,
    id: RawId,
}

impl Program {
    /// An empty, not-yet-linked program. Use [`Program::relink`] to give it
    /// stages later.
    pub fn new(ctx: &Context) -> Self {
        Self {
            ctx: ctx.clone(),
            id: NO_OBJECT,
        }
    }

    /// Links a compute-only program.
    pub fn from_compute(ctx: &Context, cs: &Shader) -> Result<Self, Error> {
        Self::link_stages(ctx, &[cs])
    }

    /// Links the classic vertex + fragment combination.
    pub fn from_stages(ctx: &Context, vs: &Shader, fs: &Shader) -> Result<Self, Error> {
        Self::link_stages(ctx, &[vs, fs])
    }

    /// Links vertex + geometry + fragment.
    pub fn with_geometry(
        ctx: &Context,
        vs: &Shader,
        gs: &Shader,
        fs: &Shader,
    ) -> Result<Self, Error> {
        Self::link_stages(ctx, &[vs, gs, fs])
    }

    /// Links vertex + tessellation-control + tessellation-evaluation +
    /// fragment.
    pub fn with_tessellation(
        ctx: &Context,
        vs: &Shader,
        tcs: &Shader,
        tes: &Shader,
        fs: &Shader,
    ) -> Result<Self, Error> {
        Self::link_stages(ctx, &[vs, tcs, tes, fs])
    }

    /// Links all five graphics stages.
    pub fn with_tessellation_and_geometry(
        ctx: &Context,
        vs: &Shader,
        tcs: &Shader,
        tes: &Shader,
        gs: &Shader,
        fs: &Shader,
    ) -> Result<Self, Error> {
        Self::link_stages(ctx, &[vs, tcs, tes, gs, fs])
    }

    fn link_stages(ctx: &Context, shaders: &[&Shader]) -> Result<Self, Error> {
        let mut program = Self::new(ctx);
        program.relink(shaders)?;
        Ok(program)
    }

    /// Allocates a fresh program object (releasing any previously held one),
    /// attaches `shaders` in order, and links.
    pub fn relink(&mut self, shaders: &[&Shader]) -> Result<(), Error> {
        self.generate_id()?;
        for shader in shaders {
            self.attach(shader);
        }
        self.link()
    }

    fn generate_id(&mut self) -> Result<(), Error> {
        if self.id != NO_OBJECT {
            self.ctx.driver().delete_program(self.id);
        }
        self.id = self.ctx.driver().create_program();
        if self.id == NO_OBJECT {
            return Err(Error::ObjectCreation { kind: "program" });
        }
        Ok(())
    }

    /// Associates a compiled shader with the program object. Must precede
    /// [`Program::link`]; attaching after a link has no defined effect.
    pub fn attach(&self, shader: &Shader) {
        self.attach_raw(shader.id());
    }

    /// [`Program::attach`] for a raw shader id.
    pub fn attach_raw(&self, shader: RawId) {
        self.ctx.driver().attach_shader(self.id, shader);
    }

    /// Links the attached stages.
    ///
    /// On failure the driver's info log is drained and logged, the program
    /// object released and the id zeroed; then the link policy decides
    /// between returning [`Error::Link`] and terminating the process.
    pub fn link(&mut self) -> Result<(), Error> {
        debug!("linking program [{}]", self.id);
        let driver = self.ctx.driver();
        driver.link_program(self.id);
        if driver.link_succeeded(self.id) {
            debug!("program [{}] successfully linked", self.id);
            return Ok(());
        }
        let log = driver.program_info_log(self.id);
        error!("program [{}] link failed: {log}", self.id);
        driver.delete_program(self.id);
        self.id = NO_OBJECT;
        match self.ctx.link_policy() {
            LinkPolicy::Lenient => Err(Error::Link { log }),
            LinkPolicy::Strict => {
                error!("aborting: unrecoverable program link failure");
                std::process::exit(1);
            }
        }
    }

    /// Asks the driver whether the program can execute in the current
    /// device state (`glValidateProgram`).
    pub fn validate(&self) -> Result<(), Error> {
        let driver = self.ctx.driver();
        driver.validate_program(self.id);
        if driver.validation_succeeded(self.id) {
            return Ok(());
        }
        let log = driver.program_info_log(self.id);
        error!("program [{}] validation failed: {log}", self.id);
        Err(Error::Validate { id: self.id, log })
    }

    /// Resolves a uniform handle by name. Never fails: an absent or
    /// optimized-out name yields an inactive handle whose assignments are
    /// silent no-ops.
    pub fn uniform(&self, name: &str) -> Uniform {
        Uniform::resolve(&self.ctx, self.id, name)
    }

    /// The location of an active uniform, or `None` if the name is absent
    /// or was optimized out (the driver conflates the two).
    pub fn uniform_location(&self, name: &str) -> Option<i32> {
        let location = self.ctx.driver().uniform_location(self.id, name);
        (location != NO_LOCATION).then_some(location)
    }

    /// The index of a subroutine in the given stage, or `None` for an
    /// unknown name.
    pub fn subroutine_index(&self, stage: Stage, name: &str) -> Option<u32> {
        let index = self.ctx.driver().subroutine_index(self.id, stage, name);
        debug!(
            "program [{}] subroutine [{name}] in {stage} stage has index [{index}]",
            self.id
        );
        (index != INVALID_INDEX).then_some(index)
    }

    /// The location of a subroutine uniform in the given stage, or `None`
    /// for an unknown name.
    pub fn subroutine_uniform_location(&self, stage: Stage, name: &str) -> Option<i32> {
        let location = self
            .ctx
            .driver()
            .subroutine_uniform_location(self.id, stage, name);
        debug!(
            "program [{}] subroutine uniform [{name}] in {stage} stage has location [{location}]",
            self.id
        );
        (location != NO_LOCATION).then_some(location)
    }

    /// Binds the named uniform block to `binding`. The index lookup is not
    /// validated; an unknown name is logged and handed to the driver as-is,
    /// which raises a driver error rather than a typed one.
    pub fn bind_uniform_block(&self, name: &str, binding: u32) {
        let index = self.ctx.driver().uniform_block_index(self.id, name);
        debug!("program [{}] uniform block [{name}] has index [{index}]", self.id);
        self.ctx.driver().uniform_block_binding(self.id, index, binding);
    }

    /// Binds the named shader-storage block to `binding`. Same contract as
    /// [`Program::bind_uniform_block`].
    pub fn bind_storage_block(&self, name: &str, binding: u32) {
        let index = self.ctx.driver().storage_block_index(self.id, name);
        debug!(
            "program [{}] shader storage block [{name}] has index [{index}]",
            self.id
        );
        self.ctx.driver().storage_block_binding(self.id, index, binding);
    }

    /// Registers the varyings to capture in transform-feedback mode and
    /// relinks, as the registration only takes effect at link time.
    pub fn transform_feedback_varyings(
        &mut self,
        names: &[&str],
        mode: FeedbackBufferMode,
    ) -> Result<(), Error> {
        self.ctx
            .driver()
            .transform_feedback_varyings(self.id, names, mode);
        self.link()
    }

    /// Binds this program as the active one for subsequent draw/dispatch
    /// calls. Mutates global device state; the single-threaded caller owns
    /// the ordering.
    pub fn enable(&self) {
        self.ctx.driver().use_program(self.id);
    }

    /// Unbinds whatever program is active.
    pub fn disable(&self) {
        self.ctx.driver().use_program(NO_OBJECT);
    }

    /// Reads one integer program property.
    pub fn parameter(&self, param: ProgramParameter) -> i32 {
        self.ctx.driver().program_parameter(self.id, param)
    }

    /// Logs the standard introspection table for this program.
    pub fn dump_info(&self) {
        const TABLE: &[(ProgramParameter, &str)] = &[
            (ProgramParameter::DeleteStatus, "Program flagged for deletion"),
            (ProgramParameter::LinkStatus, "Last link operation"),
            (ProgramParameter::ValidateStatus, "Last validation operation"),
            (ProgramParameter::InfoLogLength, "Length of the log information"),
            (ProgramParameter::AttachedShaders, "The number of shader objects attached to program"),
            (ProgramParameter::ActiveAtomicCounterBuffers, "The number of active atomic counter buffers used by program"),
            (ProgramParameter::ActiveAttributes, "The number of active attribute variables for program"),
            (ProgramParameter::ActiveAttributeMaxLength, "The longest active attribute name for program"),
            (ProgramParameter::ActiveUniforms, "The number of active uniform variables for program"),
            (ProgramParameter::ActiveUniformMaxLength, "The length of the longest active uniform variable name for program"),
            (ProgramParameter::BinaryLength, "The length of the program binary, in bytes"),
            (ProgramParameter::TransformFeedbackBufferMode, "The buffer mode used when transform feedback is active"),
            (ProgramParameter::TransformFeedbackVaryings, "The number of varying variables captured in transform feedback mode"),
            (ProgramParameter::TransformFeedbackVaryingMaxLength, "The longest varying name used for transform feedback"),
            (ProgramParameter::GeometryVerticesOut, "The maximum number of vertices the geometry shader will output"),
            (ProgramParameter::GeometryInputType, "Geometry shader input primitive type"),
            (ProgramParameter::GeometryOutputType, "Geometry shader output primitive type"),
        ];
        for &(param, description) in TABLE {
            debug!("{description} : {}", self.parameter(param));
        }
    }

    pub fn id(&self) -> RawId {
        self.id
    }

    /// True once a link has succeeded and the program was not relinked away.
    pub fn is_linked(&self) -> bool {
        self.id != NO_OBJECT
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.ctx.driver().delete_program(self.id);
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGl;
    use crate::uniform::UniformValue;

    const VS: &str = "#version 330 core\nuniform mat4 mvp;\nuniform vec2 scale;\nvoid main() { gl_Position = vec4(0.0); }\n";
    const FS: &str = "#version 330 core\nuniform vec4 tint;\nout vec4 color;\nvoid main() { color = tint; }\n";

    fn linked_pair(mock: &MockGl) -> (Context, Program) {
        let ctx = Context::new(mock.clone());
        let vs = Shader::from_source(&ctx, Stage::Vertex, VS).unwrap();
        let fs = Shader::from_source(&ctx, Stage::Fragment, FS).unwrap();
        let program = Program::from_stages(&ctx, &vs, &fs).unwrap();
        (ctx, program)
    }

    #[test]
    fn test_link_valid_stage_combination() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        assert!(program.is_linked());
        assert!(program.id() > NO_OBJECT);
    }

    #[test]
    fn test_stages_attached_before_link() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let vs = Shader::from_source(&ctx, Stage::Vertex, VS).unwrap();
        let fs = Shader::from_source(&ctx, Stage::Fragment, FS).unwrap();
        let program = Program::from_stages(&ctx, &vs, &fs).unwrap();
        assert_eq!(mock.attach_order(program.id()), vec![vs.id(), fs.id()]);
        assert!(mock.attaches_preceded_link(program.id()));
    }

    #[test]
    fn test_duplicate_stage_fails_link_and_zeroes_id() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let fs1 = Shader::from_source(&ctx, Stage::Fragment, FS).unwrap();
        let fs2 = Shader::from_source(&ctx, Stage::Fragment, FS).unwrap();
        let mut program = Program::new(&ctx);
        let err = program.relink(&[&fs1, &fs2]).unwrap_err();
        assert!(matches!(err, Error::Link { .. }));
        assert_eq!(program.id(), NO_OBJECT);
        assert!(!program.is_linked());
        assert!(mock.all_programs_released());
    }

    #[test]
    fn test_five_stage_combination_links() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let vs = Shader::from_source(&ctx, Stage::Vertex, VS).unwrap();
        let tcs = Shader::from_source(&ctx, Stage::TessControl, FS).unwrap();
        let tes = Shader::from_source(&ctx, Stage::TessEval, FS).unwrap();
        let gs = Shader::from_source(&ctx, Stage::Geometry, FS).unwrap();
        let fs = Shader::from_source(&ctx, Stage::Fragment, FS).unwrap();
        let program =
            Program::with_tessellation_and_geometry(&ctx, &vs, &tcs, &tes, &gs, &fs).unwrap();
        assert_eq!(program.parameter(ProgramParameter::AttachedShaders), 5);
    }

    #[test]
    fn test_compute_only_program() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let cs = Shader::from_source(&ctx, Stage::Compute, "#version 430\nvoid main() {}\n").unwrap();
        let program = Program::from_compute(&ctx, &cs).unwrap();
        assert!(program.is_linked());
    }

    #[test]
    fn test_declared_uniform_resolves_and_undeclared_is_sentinel() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);

        let mvp = program.uniform("mvp");
        assert!(mvp.is_active());
        assert!(mvp.location().unwrap() >= 0);
        assert!(program.uniform_location("tint").is_some());

        let missing = program.uniform("no_such_uniform");
        assert!(!missing.is_active());
        assert_eq!(missing.location(), None);
        assert_eq!(missing.raw_location(), NO_LOCATION);
        assert_eq!(program.uniform_location("no_such_uniform"), None);
    }

    #[test]
    fn test_assign_through_missing_uniform_is_noop() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        program.uniform("no_such_uniform").set(1.0f32);
        assert!(mock.uniform_calls().is_empty());
    }

    #[test]
    fn test_uniform_dispatch_reaches_driver() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        program.enable();

        let mvp = program.uniform("mvp");
        mvp.set([[1.0f32, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]);
        program.uniform("scale").set([0.5f32, 0.25]);
        program.uniform("tint").set([1.0f32, 0.0, 0.0, 1.0]);

        let calls = mock.uniform_calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].1.starts_with("Mat4"));
        assert!(calls[1].1.starts_with("Vec2"));
        assert!(calls[2].1.starts_with("Vec4"));
    }

    #[test]
    fn test_uniform_value_dispatch_table() {
        // one value per shape family, through the same entry point
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        let mvp = program.uniform("mvp");

        let ints = [1i32, 2, 3];
        let vecs = [[1.0f32, 2.0], [3.0, 4.0]];
        let values: Vec<UniformValue<'_>> = vec![
            7i32.into(),
            [1i32, 2].into(),
            3u32.into(),
            [1u32, 2, 3, 4].into(),
            9i64.into(),
            4u64.into(),
            1.5f32.into(),
            [1.0f32, 2.0, 3.0].into(),
            2.5f64.into(),
            [1.0f64, 2.0].into(),
            ints.as_slice().into(),
            vecs.as_slice().into(),
            [[1.0f32, 2.0], [3.0, 4.0]].into(),
            [[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]].into(),
        ];
        let expected = [
            "Int(", "IntVec2", "UInt(", "UIntVec4", "Int64(", "UInt64(", "Float(", "Vec3",
            "Double(", "DVec2", "IntSlice", "Vec2Slice", "Mat2(", "DMat3(",
        ];
        for value in &values {
            mvp.set(*value);
        }
        let calls = mock.uniform_calls();
        assert_eq!(calls.len(), values.len());
        for (call, prefix) in calls.iter().zip(expected) {
            assert!(
                call.1.starts_with(prefix),
                "expected {prefix}, recorded {}",
                call.1
            );
        }
    }

    #[test]
    fn test_enable_disable_toggle_active_program() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        program.enable();
        assert_eq!(mock.current_program(), program.id());
        program.disable();
        assert_eq!(mock.current_program(), NO_OBJECT);
    }

    #[test]
    fn test_validate_linked_program() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_block_bindings_recorded() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let vs = Shader::from_source(
            &ctx,
            Stage::Vertex,
            "#version 430\nuniform Matrices {\n mat4 view;\n};\nbuffer Particles {\n vec4 p[];\n};\nvoid main() {}\n",
        )
        .unwrap();
        let fs = Shader::from_source(&ctx, Stage::Fragment, FS).unwrap();
        let program = Program::from_stages(&ctx, &vs, &fs).unwrap();

        program.bind_uniform_block("Matrices", 3);
        program.bind_storage_block("Particles", 1);
        assert_eq!(mock.uniform_block_bindings(program.id()).len(), 1);
        assert_eq!(mock.uniform_block_bindings(program.id())[0].1, 3);
        assert_eq!(mock.storage_block_bindings(program.id()), vec![(0, 1)]);
    }

    #[test]
    fn test_subroutine_lookups_map_sentinels() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        mock.define_subroutine(program.id(), Stage::Fragment, "shade_toon", 2);
        assert_eq!(
            program.subroutine_index(Stage::Fragment, "shade_toon"),
            Some(2)
        );
        assert_eq!(program.subroutine_index(Stage::Fragment, "missing"), None);
        assert_eq!(
            program.subroutine_uniform_location(Stage::Fragment, "missing"),
            None
        );
    }

    #[test]
    fn test_transform_feedback_varyings_relink() {
        let mock = MockGl::new();
        let (_ctx, mut program) = linked_pair(&mock);
        let id = program.id();
        program
            .transform_feedback_varyings(&["out_position", "out_velocity"], FeedbackBufferMode::Interleaved)
            .unwrap();
        assert_eq!(
            mock.feedback_varyings(id),
            vec!["out_position".to_string(), "out_velocity".to_string()]
        );
        assert!(program.is_linked());
    }

    #[test]
    fn test_relink_replaces_program_object() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        let vs = Shader::from_source(&ctx, Stage::Vertex, VS).unwrap();
        let fs = Shader::from_source(&ctx, Stage::Fragment, FS).unwrap();
        let mut program = Program::from_stages(&ctx, &vs, &fs).unwrap();
        let old_id = program.id();
        program.relink(&[&vs, &fs]).unwrap();
        assert!(!mock.program_alive(old_id));
        assert!(mock.program_alive(program.id()));
    }

    #[test]
    fn test_drop_releases_program_object() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        let id = program.id();
        drop(program);
        assert!(!mock.program_alive(id));
    }

    #[test]
    fn test_dump_info_queries_every_parameter() {
        let mock = MockGl::new();
        let (_ctx, program) = linked_pair(&mock);
        program.dump_info();
        assert_eq!(program.parameter(ProgramParameter::LinkStatus), 1);
        assert_eq!(program.parameter(ProgramParameter::AttachedShaders), 2);
        assert_eq!(program.parameter(ProgramParameter::ActiveUniforms), 3);
    }
}
