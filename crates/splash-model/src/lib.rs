mod domain;
pub use domain::{ConfigEntry, Fuel, KeySet, MeshType, VariantFile};
pub use domain::{MESH_PARAMS, MIXTURE_KEYS, THERMO_TYPE_KEYS, mesh_param_help};

mod error;
pub use error::{ModelError, ModelResult};

mod request;
pub use request::RunRequest;
