mod entry;
pub use entry::ConfigEntry;

mod keys;
pub use keys::{KeySet, MIXTURE_KEYS, THERMO_TYPE_KEYS};

mod fuel;
pub use fuel::Fuel;

mod variant;
pub use variant::VariantFile;

mod mesh;
pub use mesh::{MESH_PARAMS, MeshType, mesh_param_help};
