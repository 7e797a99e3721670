use std::{fmt, path::Path};

use crate::{ModelError, ModelResult};

/// File name of the form `<base>.<token>`, e.g. `physicalProperties.methanol`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantFile {
    base: String,
    token: String,
}

impl VariantFile {
    pub fn new(base: impl Into<String>, token: impl Into<String>) -> ModelResult<Self> {
        let base = base.into();
        let token = token.into();
        if base.is_empty() || token.is_empty() || token.contains(['/', '\\']) {
            return Err(ModelError::InvalidVariant(format!("{base}.{token}")));
        }
        Ok(Self { base, token })
    }

    /// Split a file name at its first `.`.
    ///
    /// `physicalProperties.methanol` gives base `physicalProperties`, token `methanol`.
    pub fn parse(file_name: &str) -> ModelResult<Self> {
        match file_name.split_once('.') {
            Some((base, token)) => Self::new(base, token),
            None => Err(ModelError::InvalidVariant(file_name.to_string())),
        }
    }

    /// Parse the final component of `path`.
    pub fn from_path(path: &Path) -> ModelResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ModelError::InvalidVariant(path.display().to_string()))?;
        Self::parse(name)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Same base with a different token.
    pub fn with_token(&self, token: impl Into<String>) -> ModelResult<Self> {
        Self::new(self.base.clone(), token)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.base, self.token)
    }
}

impl fmt::Display for VariantFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base, self.token)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::VariantFile;

    #[test]
    fn parse_splits_at_first_dot() {
        let v = VariantFile::parse("physicalProperties.methanol").unwrap();
        assert_eq!(v.base(), "physicalProperties");
        assert_eq!(v.token(), "methanol");
        assert_eq!(v.file_name(), "physicalProperties.methanol");
    }

    #[test]
    fn from_path_ignores_dots_in_parent_dirs() {
        let path = Path::new("/home/user/OpenFOAM-11/cases/pipe.v2/constant/physicalProperties.ammonia");
        let v = VariantFile::from_path(path).unwrap();
        assert_eq!(v.token(), "ammonia");
    }

    #[test]
    fn rejects_names_without_token() {
        assert!(VariantFile::parse("physicalProperties").is_err());
        assert!(VariantFile::parse("physicalProperties.").is_err());
        assert!(VariantFile::parse(".hidden").is_err());
    }

    #[test]
    fn with_token_keeps_base() {
        let v = VariantFile::parse("physicalProperties.methanol").unwrap();
        let next = v.with_token("dodecane").unwrap();
        assert_eq!(next.to_string(), "physicalProperties.dodecane");
    }
}
