//! Case session: the state a user builds up (case, geometry, properties file)
//! and the actions that drive the runner and the file helpers with it.
pub mod config;
pub mod error;
pub mod job;
pub mod session;

pub mod prelude {
    pub use crate::config::{SessionConfig, ToolsConfig, Viewer};
    pub use crate::error::CoreError;
    pub use crate::job::{Job, JobGuard, JobKind, JobSlot};
    pub use crate::session::{CaseSession, PropertiesView};
}
