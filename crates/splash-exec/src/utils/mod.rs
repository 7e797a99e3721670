mod perms;
pub use perms::ensure_executable;

#[cfg(unix)]
mod group;
#[cfg(unix)]
pub(crate) use group::signal_group;

mod tools;
pub use tools::{probe_tool, spawn_detached};
