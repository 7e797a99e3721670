//! Parameters baked into the meshing script as
//! `foamDictionary system/meshDict -entry <param> -set <value>` lines.
use std::collections::BTreeMap;

use regex::Regex;
use splash_model::ConfigEntry;

use crate::PropsResult;

fn set_entry() -> PropsResult<Regex> {
    Ok(Regex::new(r"-entry\s+(?P<param>\S+)\s+-set\s+(?P<value>\S+)")?)
}

/// Current `param -> value` pairs; the last line for a parameter wins.
pub fn read_mesh_params(script: &str) -> PropsResult<BTreeMap<String, String>> {
    let re = set_entry()?;
    Ok(script
        .lines()
        .filter_map(|line| {
            let caps = re.captures(line)?;
            Some((caps["param"].to_string(), caps["value"].to_string()))
        })
        .collect())
}

/// Rewrite the value after `-set` for each parameter in `values`.
///
/// Returns the new script text and the parameters that had no line to update.
/// Empty values are ignored so a blank form field keeps the current setting.
/// Any other value must be a single token; nothing is rewritten otherwise.
pub fn update_mesh_params(
    script: &str,
    values: &BTreeMap<String, String>,
) -> PropsResult<(String, Vec<String>)> {
    for (param, value) in values {
        let value = value.trim();
        if !value.is_empty() {
            ConfigEntry::validate_value(param, value)?;
        }
    }

    let re = set_entry()?;
    let mut seen: Vec<&str> = Vec::new();
    let mut out = String::with_capacity(script.len());
    for line in script.split_inclusive('\n') {
        let replacement = re.captures(line).and_then(|caps| {
            let param = caps.name("param")?;
            let value = values.get(param.as_str()).filter(|v| !v.trim().is_empty())?;
            seen.push(param.as_str());
            let range = caps.name("value")?.range();
            let mut line = line.to_string();
            line.replace_range(range, value.trim());
            Some(line)
        });
        out.push_str(replacement.as_deref().unwrap_or(line));
    }

    let missing = values
        .iter()
        .filter(|(param, value)| !value.trim().is_empty() && !seen.contains(&param.as_str()))
        .map(|(param, _)| param.clone())
        .collect();
    Ok((out, missing))
}

#[cfg(test)]
mod tests {
    use splash_model::ModelError;

    use super::*;
    use crate::PropsError;

    const SCRIPT: &str = "\
#!/bin/sh
cd ${0%/*} || exit 1
foamDictionary system/meshDict -entry minCellSize -set 0.005
foamDictionary system/meshDict -entry maxCellSize -set 0.02
foamDictionary system/meshDict -entry nLayers -set 3
cartesianMesh | tee log.cartesianMesh
checkMesh > meshChecked
";

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn reads_every_set_line() {
        let params = read_mesh_params(SCRIPT).unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params["minCellSize"], "0.005");
        assert_eq!(params["nLayers"], "3");
    }

    #[test]
    fn updates_only_the_value_token() {
        let (text, missing) = update_mesh_params(SCRIPT, &values(&[("maxCellSize", "0.04")])).unwrap();
        assert!(missing.is_empty());
        assert!(text.contains("-entry maxCellSize -set 0.04\n"));
        assert_eq!(text.lines().count(), SCRIPT.lines().count());
        assert_eq!(read_mesh_params(&text).unwrap()["minCellSize"], "0.005");
    }

    #[test]
    fn blank_values_keep_current_setting() {
        let (text, missing) = update_mesh_params(SCRIPT, &values(&[("nLayers", "  ")])).unwrap();
        assert_eq!(text, SCRIPT);
        assert!(missing.is_empty());
    }

    #[test]
    fn multi_token_values_are_rejected() {
        let err = update_mesh_params(SCRIPT, &values(&[("maxCellSize", "0.04"), ("nLayers", "3 4")]))
            .unwrap_err();
        assert!(
            matches!(
                &err,
                PropsError::Model(ModelError::InvalidValue { key, value })
                    if key == "nLayers" && value == "3 4"
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn reports_params_without_a_line() {
        let (text, missing) =
            update_mesh_params(SCRIPT, &values(&[("thicknessRatio", "1.2"), ("nLayers", "5")]))
                .unwrap();
        assert_eq!(missing, vec!["thicknessRatio".to_string()]);
        assert!(text.contains("-entry nLayers -set 5\n"));
    }
}
