//! A failed link under `LinkPolicy::Strict` must terminate the process, so
//! the scenario runs in a spawned copy of this test binary and the parent
//! only checks the exit status.

use std::process::Command;

use glslkit::{Context, LinkPolicy, MockGl, Program, Shader, Stage};

const CHILD_VAR: &str = "GLSLKIT_STRICT_LINK_CHILD";

#[test]
fn test_strict_link_failure_terminates_process() {
    if std::env::var_os(CHILD_VAR).is_some() {
        run_failing_strict_link();
    }

    let exe = std::env::current_exe().expect("test binary path");
    let status = Command::new(exe)
        .args(["test_strict_link_failure_terminates_process", "--exact"])
        .env(CHILD_VAR, "1")
        .status()
        .expect("spawn child test process");

    assert!(
        !status.success(),
        "strict link failure should have terminated the child, got {status}"
    );
}

/// Links a program with two shaders of the same stage, which the driver
/// rejects as an invalid stage combination. Under the strict policy this
/// must not return.
fn run_failing_strict_link() {
    let ctx = Context::with_policy(MockGl::default(), LinkPolicy::Strict);
    let a = Shader::from_source(&ctx, Stage::Fragment, "void main() {}")
        .expect("fragment shader compiles");
    let b = Shader::from_source(&ctx, Stage::Fragment, "void main() {}")
        .expect("fragment shader compiles");

    let mut program = Program::new(&ctx);
    let _ = program.relink(&[&a, &b]);

    unreachable!("strict link policy returned from a failed link");
}
