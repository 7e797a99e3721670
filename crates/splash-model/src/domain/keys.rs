use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Keys of the `thermoType` block.
pub const THERMO_TYPE_KEYS: &[&str] = &[
    "type",
    "mixture",
    "transport",
    "thermo",
    "equationOfState",
    "specie",
    "energy",
];

/// Keys of the `mixture` block.
pub const MIXTURE_KEYS: &[&str] = &[
    "molWeight", "rho", "rho0", "p0", "B", "gamma", "Cv", "Cp", "Hf", "mu", "Pr",
];

/// The two closed sets of property keys the helper can extract and rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeySet {
    /// Thermodynamic model selection (`type`, `transport`, ...).
    ThermoType,
    /// Physical constants of the mixture (`rho`, `mu`, ...).
    Mixture,
}

impl KeySet {
    pub const ALL: [KeySet; 2] = [KeySet::ThermoType, KeySet::Mixture];

    pub fn keys(self) -> &'static [&'static str] {
        match self {
            KeySet::ThermoType => THERMO_TYPE_KEYS,
            KeySet::Mixture => MIXTURE_KEYS,
        }
    }

    pub fn contains(self, key: &str) -> bool {
        self.keys().contains(&key)
    }

    /// Union of both sets, thermo-type keys first.
    pub fn all_keys() -> Vec<&'static str> {
        Self::ALL.iter().flat_map(|set| set.keys().iter().copied()).collect()
    }
}

impl fmt::Display for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeySet::ThermoType => "thermoType",
            KeySet::Mixture => "mixture",
        })
    }
}

impl FromStr for KeySet {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thermotype" | "thermo-type" => Ok(KeySet::ThermoType),
            "mixture" => Ok(KeySet::Mixture),
            _ => Err(ModelError::Invalid(format!("unknown key set: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_do_not_overlap() {
        for key in THERMO_TYPE_KEYS {
            assert!(!KeySet::Mixture.contains(key), "{key} is in both sets");
        }
    }

    #[test]
    fn all_keys_preserves_order() {
        let all = KeySet::all_keys();
        assert_eq!(all.len(), THERMO_TYPE_KEYS.len() + MIXTURE_KEYS.len());
        assert_eq!(all.first(), Some(&"type"));
        assert_eq!(all.last(), Some(&"Pr"));
    }

    #[test]
    fn parses_set_names() {
        assert_eq!("thermoType".parse::<KeySet>().unwrap(), KeySet::ThermoType);
        assert_eq!("MIXTURE".parse::<KeySet>().unwrap(), KeySet::Mixture);
        assert!("species".parse::<KeySet>().is_err());
    }
}
