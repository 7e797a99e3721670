//! Line-level editing of case dictionaries and scripts.
//!
//! Everything here is plain text substitution: values are swapped token by
//! token and every other byte of the file is left as it was.
mod error;
pub use error::{PropsError, PropsResult};

mod file;
pub use file::{read_text, write_text};

mod grammar;
pub use grammar::{EntryMatch, EntryPattern};

mod document;
pub use document::{ConfigFile, UpdateReport, parse_config};

mod variant;
pub use variant::{VariantReport, rename_variant};

mod control;
pub use control::{END_TIME, WRITE_NOW, request_stop, restore_end_time, touch};

mod mesh_script;
pub use mesh_script::{read_mesh_params, update_mesh_params};
