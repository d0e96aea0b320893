//! In-memory driver for tests.
//!
//! [`MockGl`] implements [`GlDriver`] without a device context: object ids
//! are handed out from a counter, compilation "succeeds" unless the source
//! is empty or contains `#error`, and linking follows the same structural
//! rules a real driver enforces for the supported stage combinations (at
//! least one stage, no stage attached twice, every attached shader valid).
//! Deleting a shader that is still attached to a live program is deferred,
//! as on a real driver: the object stays link-valid and is reclaimed when
//! the program holding it is deleted.
//! On link the sources of the attached shaders are scanned for `uniform`,
//! uniform-block and `buffer` declarations so name lookups behave like a
//! real active-variable table. Clones share state, which is how tests keep
//! a handle for inspection next to the [`Context`](crate::context::Context)
//! that owns the driver.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::driver::{
    ApiInfo, DriverError, FeedbackBufferMode, GlDriver, ProgramParameter, RawId, INVALID_INDEX,
    NO_LOCATION, NO_OBJECT,
};
use crate::shader::Stage;
use crate::uniform::UniformValue;

#[derive(Debug)]
struct ShaderObject {
    stage: Stage,
    source: String,
    compiled: bool,
    info_log: String,
    alive: bool,
    // deletion requested while still attached to a live program
    pending_delete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramEvent {
    Attach(RawId),
    Link,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<RawId>,
    events: Vec<ProgramEvent>,
    linked: bool,
    validated: bool,
    info_log: String,
    alive: bool,
    uniforms: HashMap<String, i32>,
    uniform_blocks: HashMap<String, u32>,
    storage_blocks: HashMap<String, u32>,
    subroutines: HashMap<(Stage, String), u32>,
    subroutine_uniforms: HashMap<(Stage, String), i32>,
    uniform_block_bindings: Vec<(u32, u32)>,
    storage_block_bindings: Vec<(u32, u32)>,
    varyings: Vec<String>,
}

#[derive(Default)]
struct MockState {
    next_id: RawId,
    shaders: HashMap<RawId, ShaderObject>,
    programs: HashMap<RawId, ProgramObject>,
    current_program: RawId,
    uniform_calls: Vec<(i32, String)>,
    subroutine_loads: Vec<(Stage, Vec<u32>)>,
    errors: VecDeque<DriverError>,
}

impl MockState {
    fn alloc_id(&mut self) -> RawId {
        self.next_id += 1;
        self.next_id
    }
}

/// A stateful fake of the driver seam. See the module docs.
#[derive(Clone, Default)]
pub struct MockGl {
    state: Rc<RefCell<MockState>>,
}

impl MockGl {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Inspection helpers for tests
    // ========================================================================

    /// True while the shader object exists and was not deleted.
    pub fn shader_alive(&self, shader: RawId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.alive)
    }

    /// True when every shader object ever created has been deleted.
    pub fn all_shaders_released(&self) -> bool {
        self.state.borrow().shaders.values().all(|s| !s.alive)
    }

    pub fn shader_source_of(&self, shader: RawId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.source.clone())
            .unwrap_or_default()
    }

    pub fn program_alive(&self, program: RawId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.alive)
    }

    pub fn all_programs_released(&self) -> bool {
        self.state.borrow().programs.values().all(|p| !p.alive)
    }

    /// The shader ids attached to `program`, in attachment order.
    pub fn attach_order(&self, program: RawId) -> Vec<RawId> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    /// True when every attach on `program` happened before its first link.
    pub fn attaches_preceded_link(&self, program: RawId) -> bool {
        let state = self.state.borrow();
        let Some(p) = state.programs.get(&program) else {
            return false;
        };
        let first_link = p.events.iter().position(|e| *e == ProgramEvent::Link);
        match first_link {
            Some(pos) => p.events[..pos]
                .iter()
                .all(|e| matches!(e, ProgramEvent::Attach(_))),
            None => false,
        }
    }

    pub fn current_program(&self) -> RawId {
        self.state.borrow().current_program
    }

    /// Every uniform dispatch received, as `(location, debug rendering)`.
    pub fn uniform_calls(&self) -> Vec<(i32, String)> {
        self.state.borrow().uniform_calls.clone()
    }

    pub fn subroutine_loads(&self) -> Vec<(Stage, Vec<u32>)> {
        self.state.borrow().subroutine_loads.clone()
    }

    pub fn uniform_block_bindings(&self, program: RawId) -> Vec<(u32, u32)> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.uniform_block_bindings.clone())
            .unwrap_or_default()
    }

    pub fn storage_block_bindings(&self, program: RawId) -> Vec<(u32, u32)> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.storage_block_bindings.clone())
            .unwrap_or_default()
    }

    pub fn feedback_varyings(&self, program: RawId) -> Vec<String> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.varyings.clone())
            .unwrap_or_default()
    }

    /// Queues a driver error for the next polls.
    pub fn push_error(&self, error: DriverError) {
        self.state.borrow_mut().errors.push_back(error);
    }

    /// Registers a subroutine (and a subroutine uniform of the same name)
    /// for lookups against `program`.
    pub fn define_subroutine(&self, program: RawId, stage: Stage, name: &str, index: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(p) = state.programs.get_mut(&program) {
            p.subroutines.insert((stage, name.to_string()), index);
            p.subroutine_uniforms
                .insert((stage, name.to_string()), index as i32);
        }
    }
}

/// Scans GLSL source for declarations a link would surface as active
/// variables. Good enough for lifecycle tests, not a GLSL parser.
fn scan_declarations(source: &str, program: &mut ProgramObject) {
    for line in source.lines() {
        let line = line.trim();
        let body = if let Some(rest) = line.strip_prefix("uniform ") {
            rest
        } else if let Some(rest) = line.strip_prefix("buffer ") {
            let name = rest.trim_end_matches('{').trim();
            let index = program.storage_blocks.len() as u32;
            program.storage_blocks.entry(name.to_string()).or_insert(index);
            continue;
        } else {
            continue;
        };
        if body.contains('{') {
            let name = body.trim_end_matches('{').trim();
            let index = program.uniform_blocks.len() as u32;
            program.uniform_blocks.entry(name.to_string()).or_insert(index);
            continue;
        }
        let Some(name) = body
            .trim_end_matches(';')
            .split_whitespace()
            .last()
            .map(|n| n.split('[').next().unwrap_or(n))
        else {
            continue;
        };
        let location = program.uniforms.len() as i32;
        program.uniforms.entry(name.to_string()).or_insert(location);
    }
}

impl GlDriver for MockGl {
    fn create_shader(&self, stage: Stage) -> RawId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: false,
                info_log: String::new(),
                alive: true,
                pending_delete: false,
            },
        );
        id
    }

    fn shader_source(&self, shader: RawId, source: &str) {
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(s) => s.source = source.to_string(),
            None => state.errors.push_back(DriverError::InvalidValue),
        }
    }

    fn compile_shader(&self, shader: RawId) {
        let mut state = self.state.borrow_mut();
        let Some(s) = state.shaders.get_mut(&shader) else {
            state.errors.push_back(DriverError::InvalidValue);
            return;
        };
        if s.source.is_empty() {
            s.compiled = false;
            s.info_log = "0:0: error: empty source".to_string();
        } else if let Some(line) = s.source.lines().find(|l| l.trim_start().starts_with("#error")) {
            s.compiled = false;
            s.info_log = format!("0:1: error: {}", line.trim());
        } else {
            s.compiled = true;
            s.info_log = s
                .source
                .lines()
                .find(|l| l.trim_start().starts_with("#warning"))
                .map(|l| format!("0:1: warning: {}", l.trim()))
                .unwrap_or_default();
        }
    }

    fn compile_succeeded(&self, shader: RawId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: RawId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: RawId) {
        if shader == NO_OBJECT {
            return;
        }
        let mut state = self.state.borrow_mut();
        // deletion of a shader attached to a live program is deferred: the
        // object stays link-valid until the last attachment goes away
        let attached = state
            .programs
            .values()
            .any(|p| p.alive && p.attached.contains(&shader));
        if let Some(s) = state.shaders.get_mut(&shader) {
            if attached {
                s.pending_delete = true;
            } else {
                s.alive = false;
            }
        }
    }

    fn create_program(&self) -> RawId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.programs.insert(
            id,
            ProgramObject {
                alive: true,
                ..ProgramObject::default()
            },
        );
        id
    }

    fn attach_shader(&self, program: RawId, shader: RawId) {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            state.errors.push_back(DriverError::InvalidValue);
            return;
        }
        match state.programs.get_mut(&program) {
            Some(p) => {
                p.attached.push(shader);
                p.events.push(ProgramEvent::Attach(shader));
            }
            None => state.errors.push_back(DriverError::InvalidValue),
        }
    }

    fn link_program(&self, program: RawId) {
        let mut state = self.state.borrow_mut();
        let Some(p) = state.programs.get(&program) else {
            state.errors.push_back(DriverError::InvalidValue);
            return;
        };

        let mut failure = None;
        if p.attached.is_empty() {
            failure = Some("error: no shader objects attached".to_string());
        }
        let mut seen = Vec::new();
        for &shader in &p.attached {
            match state.shaders.get(&shader) {
                Some(s) if s.alive && s.compiled => {
                    if seen.contains(&s.stage) {
                        failure = Some(format!(
                            "error: duplicate {} stage attached to program",
                            s.stage
                        ));
                        break;
                    }
                    seen.push(s.stage);
                }
                _ => {
                    failure = Some(format!("error: attached shader {shader} is not valid"));
                    break;
                }
            }
        }

        let sources: Vec<String> = p
            .attached
            .iter()
            .filter_map(|id| state.shaders.get(id).map(|s| s.source.clone()))
            .collect();

        let Some(p) = state.programs.get_mut(&program) else {
            return;
        };
        p.events.push(ProgramEvent::Link);
        match failure {
            Some(log) => {
                p.linked = false;
                p.info_log = log;
            }
            None => {
                p.linked = true;
                p.info_log = String::new();
                p.uniforms.clear();
                p.uniform_blocks.clear();
                p.storage_blocks.clear();
                for source in &sources {
                    scan_declarations(source, p);
                }
            }
        }
    }

    fn link_succeeded(&self, program: RawId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn validate_program(&self, program: RawId) {
        let mut state = self.state.borrow_mut();
        if let Some(p) = state.programs.get_mut(&program) {
            p.validated = p.linked;
        }
    }

    fn validation_succeeded(&self, program: RawId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.validated)
    }

    fn program_info_log(&self, program: RawId) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: RawId) {
        if program == NO_OBJECT {
            return;
        }
        let mut state = self.state.borrow_mut();
        let attached = match state.programs.get_mut(&program) {
            Some(p) => {
                p.alive = false;
                p.attached.clone()
            }
            None => return,
        };
        // reclaim shaders whose deletion was deferred on this attachment
        for shader in attached {
            let still_attached = state
                .programs
                .values()
                .any(|q| q.alive && q.attached.contains(&shader));
            if let Some(s) = state.shaders.get_mut(&shader) {
                if s.pending_delete && !still_attached {
                    s.alive = false;
                }
            }
        }
    }

    fn use_program(&self, program: RawId) {
        self.state.borrow_mut().current_program = program;
    }

    fn program_parameter(&self, program: RawId, param: ProgramParameter) -> i32 {
        let state = self.state.borrow();
        let Some(p) = state.programs.get(&program) else {
            return 0;
        };
        match param {
            ProgramParameter::DeleteStatus => (!p.alive) as i32,
            ProgramParameter::LinkStatus => p.linked as i32,
            ProgramParameter::ValidateStatus => p.validated as i32,
            ProgramParameter::InfoLogLength => p.info_log.len() as i32,
            ProgramParameter::AttachedShaders => p.attached.len() as i32,
            ProgramParameter::ActiveUniforms => p.uniforms.len() as i32,
            ProgramParameter::ActiveUniformMaxLength => {
                p.uniforms.keys().map(|n| n.len() as i32 + 1).max().unwrap_or(0)
            }
            ProgramParameter::TransformFeedbackVaryings => p.varyings.len() as i32,
            _ => 0,
        }
    }

    fn uniform_location(&self, program: RawId, name: &str) -> i32 {
        self.state
            .borrow()
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.uniforms.get(name).copied())
            .unwrap_or(NO_LOCATION)
    }

    fn subroutine_index(&self, program: RawId, stage: Stage, name: &str) -> u32 {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.subroutines.get(&(stage, name.to_string())).copied())
            .unwrap_or(INVALID_INDEX)
    }

    fn subroutine_uniform_location(&self, program: RawId, stage: Stage, name: &str) -> i32 {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| {
                p.subroutine_uniforms
                    .get(&(stage, name.to_string()))
                    .copied()
            })
            .unwrap_or(NO_LOCATION)
    }

    fn uniform_block_index(&self, program: RawId, name: &str) -> u32 {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.uniform_blocks.get(name).copied())
            .unwrap_or(INVALID_INDEX)
    }

    fn storage_block_index(&self, program: RawId, name: &str) -> u32 {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.storage_blocks.get(name).copied())
            .unwrap_or(INVALID_INDEX)
    }

    fn uniform_block_binding(&self, program: RawId, block: u32, binding: u32) {
        let mut state = self.state.borrow_mut();
        if block == INVALID_INDEX {
            state.errors.push_back(DriverError::InvalidValue);
            return;
        }
        if let Some(p) = state.programs.get_mut(&program) {
            p.uniform_block_bindings.push((block, binding));
        }
    }

    fn storage_block_binding(&self, program: RawId, block: u32, binding: u32) {
        let mut state = self.state.borrow_mut();
        if block == INVALID_INDEX {
            state.errors.push_back(DriverError::InvalidValue);
            return;
        }
        if let Some(p) = state.programs.get_mut(&program) {
            p.storage_block_bindings.push((block, binding));
        }
    }

    fn load_subroutines(&self, stage: Stage, indices: &[u32]) {
        self.state
            .borrow_mut()
            .subroutine_loads
            .push((stage, indices.to_vec()));
    }

    fn transform_feedback_varyings(
        &self,
        program: RawId,
        names: &[&str],
        _mode: FeedbackBufferMode,
    ) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.varyings = names.iter().map(|n| n.to_string()).collect();
        }
    }

    fn set_uniform(&self, location: i32, value: &UniformValue<'_>) {
        if location == NO_LOCATION {
            return;
        }
        self.state
            .borrow_mut()
            .uniform_calls
            .push((location, format!("{value:?}")));
    }

    fn poll_error(&self) -> Option<DriverError> {
        self.state.borrow_mut().errors.pop_front()
    }

    fn api_info(&self) -> ApiInfo {
        ApiInfo {
            vendor: "glslkit".to_string(),
            renderer: "mock driver".to_string(),
            version: "4.5.0 mock".to_string(),
            shading_language_version: "4.50 mock".to_string(),
            extensions: vec!["GL_NV_gpu_shader5".to_string()],
            max_compute_work_group_invocations: 1024,
            max_compute_work_group_count: [65535, 65535, 65535],
            max_compute_work_group_size: [1024, 1024, 64],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_never_reused() {
        let mock = MockGl::new();
        let a = mock.create_shader(Stage::Vertex);
        mock.delete_shader(a);
        let b = mock.create_shader(Stage::Vertex);
        assert_ne!(a, b);
    }

    #[test]
    fn test_delete_of_null_object_is_noop() {
        let mock = MockGl::new();
        mock.delete_shader(NO_OBJECT);
        mock.delete_program(NO_OBJECT);
        assert!(mock.poll_error().is_none());
    }

    #[test]
    fn test_scan_finds_uniforms_blocks_and_buffers() {
        let mut program = ProgramObject::default();
        scan_declarations(
            "#version 430\nuniform mat4 mvp;\nuniform float weights[4];\nuniform Matrices {\n mat4 view;\n};\nbuffer Particles {\n vec4 p[];\n};\n",
            &mut program,
        );
        assert_eq!(program.uniforms.len(), 2);
        assert!(program.uniforms.contains_key("mvp"));
        assert!(program.uniforms.contains_key("weights"));
        assert_eq!(program.uniform_blocks.get("Matrices"), Some(&0));
        assert_eq!(program.storage_blocks.get("Particles"), Some(&0));
    }

    #[test]
    fn test_deleting_attached_shader_is_deferred() {
        let mock = MockGl::new();
        let shader = mock.create_shader(Stage::Vertex);
        mock.shader_source(shader, "void main() {}");
        mock.compile_shader(shader);
        let program = mock.create_program();
        mock.attach_shader(program, shader);

        // still attached: the object survives and links remain valid
        mock.delete_shader(shader);
        assert!(mock.shader_alive(shader));
        mock.link_program(program);
        assert!(mock.link_succeeded(program));

        // reclaimed with the last attachment
        mock.delete_program(program);
        assert!(!mock.shader_alive(shader));
    }

    #[test]
    fn test_warning_directive_compiles_with_log() {
        let mock = MockGl::new();
        let id = mock.create_shader(Stage::Vertex);
        mock.shader_source(id, "#version 330\n#warning deprecated path\nvoid main() {}\n");
        mock.compile_shader(id);
        assert!(mock.compile_succeeded(id));
        assert!(mock.shader_info_log(id).contains("warning"));
    }
}
