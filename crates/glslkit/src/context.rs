//! The explicit context handle.
//!
//! The driver's "current context" global is threaded through every wrapper
//! as a [`Context`] value: a cheap-to-clone handle over the injected
//! [`GlDriver`] plus the link-failure policy. The model is single-threaded
//! and synchronous — one thread owns the device context for the process
//! lifetime, so the handle is `Rc`-based and deliberately not `Send`.

use std::rc::Rc;

use tracing::{error, info};

use crate::driver::{DriverError, GlDriver};
use crate::shader::Stage;

/// What [`Program::link`](crate::program::Program::link) does when the
/// driver reports a failed link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Return [`Error::Link`](crate::error::Error::Link) and let the caller
    /// decide. The default.
    #[default]
    Lenient,
    /// Log the diagnostic and terminate the process. Opt-in fail-fast mode
    /// for development: a failed link usually means a mismatched stage
    /// interface, a configuration defect rather than a runtime condition.
    Strict,
}

bitflags::bitflags! {
    /// Categories selectable in [`Context::dump_info`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InfoCategories: u32 {
        /// Vendor, renderer, API and GLSL version strings.
        const BASIC = 0x0000_0001;
        /// The full extension list.
        const EXTENSIONS = 0x0000_0002;
        /// Compute work-group limits.
        const COMPUTE = 0x0000_0004;
    }
}

/// Handle to the graphics device context.
///
/// Clones share the same driver; cloning is how shaders, programs and
/// uniform handles keep their back-reference.
#[derive(Clone)]
pub struct Context {
    driver: Rc<dyn GlDriver>,
    link_policy: LinkPolicy,
}

impl Context {
    /// Wraps `driver` with the default lenient link policy.
    pub fn new(driver: impl GlDriver + 'static) -> Self {
        Self::with_policy(driver, LinkPolicy::default())
    }

    pub fn with_policy(driver: impl GlDriver + 'static, link_policy: LinkPolicy) -> Self {
        Self {
            driver: Rc::new(driver),
            link_policy,
        }
    }

    pub(crate) fn driver(&self) -> &dyn GlDriver {
        self.driver.as_ref()
    }

    pub fn link_policy(&self) -> LinkPolicy {
        self.link_policy
    }

    /// Drains the driver's error queue, logging every pending error, and
    /// returns them.
    pub fn drain_errors(&self) -> Vec<DriverError> {
        let mut errors = Vec::new();
        while let Some(e) = self.driver.poll_error() {
            error!("driver error: {e}");
            errors.push(e);
        }
        errors
    }

    /// Logs implementation-dependent information for the selected
    /// `categories`.
    pub fn dump_info(&self, categories: InfoCategories) {
        let api = self.driver.api_info();
        if categories.contains(InfoCategories::BASIC) {
            info!("GL_VENDOR = {}", api.vendor);
            info!("GL_RENDERER = {}", api.renderer);
            info!("GL_VERSION = {}", api.version);
            info!("GL_SHADING_LANGUAGE_VERSION = {}", api.shading_language_version);
        }
        if categories.contains(InfoCategories::EXTENSIONS) {
            info!("GL_NUM_EXTENSIONS = {}", api.extensions.len());
            for (i, ext) in api.extensions.iter().enumerate() {
                info!("\t#{i} : {ext}");
            }
        }
        if categories.contains(InfoCategories::COMPUTE) {
            info!(
                "GL_MAX_COMPUTE_WORK_GROUP_INVOCATIONS = {}",
                api.max_compute_work_group_invocations
            );
            let [cx, cy, cz] = api.max_compute_work_group_count;
            info!("GL_MAX_COMPUTE_WORK_GROUP_COUNT = {cx} x {cy} x {cz}");
            let [sx, sy, sz] = api.max_compute_work_group_size;
            info!("GL_MAX_COMPUTE_WORK_GROUP_SIZE = {sx} x {sy} x {sz}");
        }
    }

    /// Selects subroutine `indices` for every subroutine uniform of `stage`
    /// in the currently enabled program.
    pub fn load_subroutines(&self, stage: Stage, indices: &[u32]) {
        self.driver.load_subroutines(stage, indices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGl;

    #[test]
    fn test_drain_errors_empties_queue() {
        let mock = MockGl::new();
        mock.push_error(DriverError::InvalidValue);
        mock.push_error(DriverError::OutOfMemory);
        let ctx = Context::new(mock.clone());
        assert_eq!(
            ctx.drain_errors(),
            vec![DriverError::InvalidValue, DriverError::OutOfMemory]
        );
        assert!(ctx.drain_errors().is_empty());
    }

    #[test]
    fn test_default_policy_is_lenient() {
        let ctx = Context::new(MockGl::new());
        assert_eq!(ctx.link_policy(), LinkPolicy::Lenient);
    }

    #[test]
    fn test_dump_info_covers_all_categories() {
        // exercises the query path; output goes to tracing
        let ctx = Context::new(MockGl::new());
        ctx.dump_info(InfoCategories::all());
    }

    #[test]
    fn test_load_subroutines_forwards_to_driver() {
        let mock = MockGl::new();
        let ctx = Context::new(mock.clone());
        ctx.load_subroutines(Stage::Fragment, &[2, 0, 1]);
        assert_eq!(
            mock.subroutine_loads(),
            vec![(Stage::Fragment, vec![2, 0, 1])]
        );
    }
}
