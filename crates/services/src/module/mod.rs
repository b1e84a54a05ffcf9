mod service;
mod session;

// Public API of the module orchestrator.
pub use crate::error::ModuleError;
pub use service::{ModuleService, ModuleStep};
pub use session::ModuleSession;
