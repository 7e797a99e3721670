use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::ModelError;

/// Fuel variants shipped with the case templates.
///
/// The lowercase name doubles as the variant token in file names
/// (`physicalProperties.methanol`) and inside the dictionaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Fuel {
    Methanol,
    Ammonia,
    Dodecane,
}

impl Fuel {
    pub const ALL: [Fuel; 3] = [Fuel::Methanol, Fuel::Ammonia, Fuel::Dodecane];

    /// Variant token used in file names and dictionary bodies.
    pub fn token(&self) -> &'static str {
        match self {
            Fuel::Methanol => "methanol",
            Fuel::Ammonia => "ammonia",
            Fuel::Dodecane => "dodecane",
        }
    }
}

impl FromStr for Fuel {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        Fuel::ALL
            .into_iter()
            .find(|fuel| fuel.token() == norm)
            .ok_or_else(|| ModelError::UnknownFuel(s.to_string()))
    }
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for Fuel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for Fuel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("Methanol".parse::<Fuel>().unwrap(), Fuel::Methanol);
        assert_eq!(" AMMONIA ".parse::<Fuel>().unwrap(), Fuel::Ammonia);
        assert_eq!("dodecane".parse::<Fuel>().unwrap(), Fuel::Dodecane);
    }

    #[test]
    fn rejects_unknown_fuel() {
        for input in ["", "ethanol", "methanol2"] {
            assert!(
                matches!(input.parse::<Fuel>(), Err(ModelError::UnknownFuel(_))),
                "expected UnknownFuel for {input:?}"
            );
        }
    }

    #[test]
    fn display_is_the_variant_token() {
        assert_eq!(Fuel::Ammonia.to_string(), "ammonia");
    }

    #[test]
    fn serde_accepts_any_case() {
        let parsed: Fuel = serde_json::from_str(r#""Dodecane""#).unwrap();
        assert_eq!(parsed, Fuel::Dodecane);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#""dodecane""#);
    }
}
