use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Parameters exposed by the Cartesian meshing script, in form order.
pub const MESH_PARAMS: &[&str] = &[
    "minCellSize",
    "maxCellSize",
    "boundaryCellSize",
    "nLayers",
    "thicknessRatio",
    "maxFirstLayerThickness",
];

/// Short help text shown next to a mesh parameter.
pub fn mesh_param_help(param: &str) -> String {
    match param {
        "minCellSize" => "Minimum cell size in meters. A first guess is half the size of the smallest geometric feature.".into(),
        "maxCellSize" => "Maximum cell size in meters. A first guess is the size of the smallest geometric feature.".into(),
        "boundaryCellSize" => "Cell size near boundaries. A first guess is a fifth of the smallest geometric feature.".into(),
        other => format!("{other}: provide a value within the range accepted by the mesher."),
    }
}

/// Mesh families offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeshType {
    #[default]
    Cartesian,
    Polyhedral,
    Tetrahedral,
}

impl MeshType {
    /// Only the Cartesian mesher ships with the case templates.
    pub fn is_supported(&self) -> bool {
        matches!(self, MeshType::Cartesian)
    }
}

impl FromStr for MeshType {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cartesian" => Ok(MeshType::Cartesian),
            "polyhedral" => Ok(MeshType::Polyhedral),
            "tetrahedral" => Ok(MeshType::Tetrahedral),
            _ => Err(ModelError::UnknownMeshType(s.to_string())),
        }
    }
}

impl fmt::Display for MeshType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeshType::Cartesian => "cartesian",
            MeshType::Polyhedral => "polyhedral",
            MeshType::Tetrahedral => "tetrahedral",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_cartesian() {
        assert_eq!(MeshType::default(), MeshType::Cartesian);
        assert!(MeshType::default().is_supported());
    }

    #[test]
    fn only_cartesian_is_supported() {
        assert!(!MeshType::Polyhedral.is_supported());
        assert!(!MeshType::Tetrahedral.is_supported());
    }

    #[test]
    fn parse_roundtrips_through_display() {
        for ty in [MeshType::Cartesian, MeshType::Polyhedral, MeshType::Tetrahedral] {
            assert_eq!(ty.to_string().parse::<MeshType>().unwrap(), ty);
        }
        assert!("hex".parse::<MeshType>().is_err());
    }

    #[test]
    fn unknown_params_get_generic_help() {
        assert!(mesh_param_help("minCellSize").contains("Minimum"));
        assert!(mesh_param_help("nLayers").starts_with("nLayers:"));
    }
}
