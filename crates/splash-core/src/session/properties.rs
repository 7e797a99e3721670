use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::Serialize;
use splash_model::{Fuel, KeySet, MIXTURE_KEYS, THERMO_TYPE_KEYS, VariantFile};
use splash_props::{ConfigFile, UpdateReport, VariantReport, parse_config, read_text, rename_variant};
use tracing::{debug, info, warn};

use crate::{
    error::CoreError,
    session::{CaseSession, existing_dir},
};

/// Current values of a properties file, grouped by block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertiesView {
    pub file: PathBuf,
    /// Token after the first `.` of the file name, e.g. `methanol`.
    pub variant: String,
    /// `variant` read as a known fuel.
    pub fuel: Option<Fuel>,
    pub thermo: BTreeMap<String, String>,
    pub mixture: BTreeMap<String, String>,
}

impl CaseSession {
    /// Find `<case>/<constant_dir>/<properties_base>.*`.
    ///
    /// With several variants present the lexically first one wins.
    pub fn locate_properties(&self) -> Result<PathBuf, CoreError> {
        let constant = existing_dir(&self.require_case()?.join(&self.config.constant_dir))?;
        let prefix = format!("{}.", self.config.properties_base);
        let mut found: Vec<PathBuf> = std::fs::read_dir(&constant)
            .map_err(|e| CoreError::io(&constant, e))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        found.sort();
        if found.len() > 1 {
            debug!(count = found.len(), "several properties variants; taking the first");
        }
        found
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound(constant.join(format!("{prefix}*"))))
    }

    /// Select a properties file and return its current values.
    ///
    /// The file name must start with the configured base name
    /// (`physicalProperties`).
    pub fn select_properties(&mut self, file: &Path) -> Result<PropertiesView, CoreError> {
        let is_properties = file
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&self.config.properties_base));
        if !is_properties {
            return Err(CoreError::NotAPropertiesFile {
                path: file.to_path_buf(),
                base: self.config.properties_base.clone(),
            });
        }
        let view = read_view(file)?;
        info!(file = ?file, variant = %view.variant, "properties file selected");
        self.properties_file = Some(file.to_path_buf());
        Ok(view)
    }

    /// Re-read the selected properties file.
    pub fn properties(&self) -> Result<PropertiesView, CoreError> {
        read_view(self.require_properties()?)
    }

    /// Rewrite recognized keys of both blocks in place.
    ///
    /// Keys without a matching line, and keys outside the recognized sets,
    /// are skipped and listed in the report.
    pub fn update_properties(
        &self,
        updates: &BTreeMap<String, String>,
    ) -> Result<UpdateReport, CoreError> {
        let path = self.require_properties()?;
        let keys = KeySet::all_keys();
        let file = ConfigFile::read(path, keys.as_slice())?;
        let (next, report) = file.apply_updates(updates)?;
        if report.lines_rewritten > 0 {
            next.write(path)?;
        }
        for key in report.unmatched.iter().chain(&report.unrecognized) {
            warn!(key = %key, file = ?path, "property not updated");
        }
        info!(file = ?path, lines = report.lines_rewritten, "properties updated");
        Ok(report)
    }

    /// Switch the case to `fuel`.
    ///
    /// Substitutes the current variant token, exactly as it appears in the
    /// file name, with the fuel's lowercase token in every file of the
    /// properties file's directory and renames the file; the session then
    /// follows the renamed file.
    pub fn swap_fuel(&mut self, fuel: Fuel) -> Result<VariantReport, CoreError> {
        let path = self.require_properties()?.to_path_buf();
        let variant = VariantFile::from_path(&path)?;
        let current = variant.token();
        let dir = path.parent().unwrap_or(Path::new("."));

        let report = rename_variant(dir, variant.base(), current, fuel.token())?;
        if let Some((_, to)) = &report.renamed {
            self.properties_file = Some(to.clone());
        }
        info!(
            from = %current,
            to = %fuel,
            files = report.files_rewritten.len(),
            "fuel swapped"
        );
        Ok(report)
    }
}

fn read_view(file: &Path) -> Result<PropertiesView, CoreError> {
    let variant = VariantFile::from_path(file)?;
    let text = read_text(file)?;
    Ok(PropertiesView {
        file: file.to_path_buf(),
        variant: variant.token().to_string(),
        fuel: variant.token().parse().ok(),
        thermo: parse_config(&text, THERMO_TYPE_KEYS)?,
        mixture: parse_config(&text, MIXTURE_KEYS)?,
    })
}
