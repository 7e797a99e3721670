use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown fuel: {0} (expected: methanol|ammonia|dodecane)")]
    UnknownFuel(String),

    #[error("unknown mesh type: {0} (expected: cartesian|polyhedral|tetrahedral)")]
    UnknownMeshType(String),

    #[error("invalid variant file name: {0}")]
    InvalidVariant(String),

    #[error("invalid value for '{key}': {value:?} (must be non-empty, without whitespace or ';')")]
    InvalidValue { key: String, value: String },

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
