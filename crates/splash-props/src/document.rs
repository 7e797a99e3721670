use std::{collections::BTreeMap, path::Path};

use splash_model::ConfigEntry;
use tracing::debug;

use crate::{EntryPattern, PropsResult, file};

/// Extract the current value of every recognized key found in `text`.
///
/// When a key appears on several lines, the last one wins. Keys that never
/// match are absent from the result; absence means "no current value".
pub fn parse_config<K: AsRef<str>>(text: &str, keys: &[K]) -> PropsResult<BTreeMap<String, String>> {
    Ok(ConfigFile::parse(text, keys)?.values())
}

/// A properties dictionary held as raw lines.
///
/// Lines keep their terminators, so [`ConfigFile::to_text`] reproduces the
/// input byte for byte.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    lines: Vec<String>,
    /// Recognized key -> index of the last line it matched.
    key_lines: BTreeMap<String, usize>,
    pattern: EntryPattern,
}

/// What [`ConfigFile::apply_updates`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Number of lines whose value token was replaced.
    pub lines_rewritten: usize,
    /// Recognized keys that had an update but no matching line. Skipped.
    pub unmatched: Vec<String>,
    /// Update keys outside the recognized set. Skipped.
    pub unrecognized: Vec<String>,
}

impl UpdateReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty() && self.unrecognized.is_empty()
    }
}

impl ConfigFile {
    pub fn parse<K: AsRef<str>>(text: &str, keys: &[K]) -> PropsResult<Self> {
        let pattern = EntryPattern::new(keys)?;
        let lines = text.split_inclusive('\n').map(str::to_string).collect();
        Ok(Self::from_lines(lines, pattern))
    }

    pub fn read<K: AsRef<str>>(path: &Path, keys: &[K]) -> PropsResult<Self> {
        let text = file::read_text(path)?;
        Self::parse(&text, keys)
    }

    fn from_lines(lines: Vec<String>, pattern: EntryPattern) -> Self {
        let mut key_lines = BTreeMap::new();
        for (idx, line) in lines.iter().enumerate() {
            if let Some(m) = pattern.find(line) {
                key_lines.insert(m.key.to_string(), idx);
            }
        }
        Self {
            lines,
            key_lines,
            pattern,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Index of the last line holding `key`.
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.key_lines.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let idx = self.line_of(key)?;
        self.pattern.find(&self.lines[idx]).map(|m| m.value)
    }

    /// Key -> value, last occurrence winning.
    pub fn values(&self) -> BTreeMap<String, String> {
        self.key_lines
            .keys()
            .filter_map(|key| Some((key.clone(), self.get(key)?.to_string())))
            .collect()
    }

    /// Current entries in file order of their winning line.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        let mut by_line: Vec<(usize, &str)> = self
            .key_lines
            .iter()
            .map(|(key, idx)| (*idx, key.as_str()))
            .collect();
        by_line.sort_unstable();
        by_line
            .into_iter()
            .filter_map(|(_, key)| ConfigEntry::new(key, self.get(key)?).ok())
            .collect()
    }

    /// Rewrite the value token of every line whose key has an update.
    ///
    /// Lines are re-matched one by one, so nothing depends on offsets recorded
    /// at parse time. Keys, spacing, `;` and comments stay as they were, and
    /// lines without an update are copied unchanged.
    pub fn apply_updates(
        &self,
        updates: &BTreeMap<String, String>,
    ) -> PropsResult<(ConfigFile, UpdateReport)> {
        for (key, value) in updates {
            ConfigEntry::validate_value(key, value)?;
        }

        let mut report = UpdateReport::default();
        let mut touched: Vec<&str> = Vec::new();
        let mut lines = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let rewritten = self.pattern.find(line).and_then(|m| {
                let value = updates.get(m.key)?;
                touched.push(m.key);
                let mut out = line.clone();
                out.replace_range(m.value_range, value);
                Some(out)
            });
            match rewritten {
                Some(out) => {
                    report.lines_rewritten += 1;
                    lines.push(out);
                }
                None => lines.push(line.clone()),
            }
        }

        for key in updates.keys() {
            if touched.contains(&key.as_str()) {
                continue;
            }
            if self.pattern.recognizes(key) {
                debug!(key = %key, "no line to rewrite; skipped");
                report.unmatched.push(key.clone());
            } else {
                debug!(key = %key, "not a recognized key; skipped");
                report.unrecognized.push(key.clone());
            }
        }

        Ok((Self::from_lines(lines, self.pattern.clone()), report))
    }

    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    pub fn write(&self, path: &Path) -> PropsResult<()> {
        file::write_text(path, &self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use splash_model::{KeySet, MIXTURE_KEYS, ModelError, THERMO_TYPE_KEYS};

    use super::*;
    use crate::PropsError;

    const PROPERTIES: &str = "\
FoamFile
{
    version     2.0;
    object      physicalProperties.methanol;
}

thermoType
{
    type            heRhoThermo;
    mixture         pureMixture;
    transport       const;
    thermo          hConst;
    equationOfState rhoConst;
    specie          specie;
    energy          sensibleInternalEnergy;
}

mixture
{
    specie
    {
        molWeight   32.04; // methanol
    }
    equationOfState
    {
        rho         791;
    }
    thermodynamics
    {
        Cp          2530;
        Hf          0;
    }
    transport
    {
        mu          5.9e-4;
        Pr          7.2;
    }
}
";

    fn updates(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn extracts_both_key_sets() {
        let thermo = parse_config(PROPERTIES, THERMO_TYPE_KEYS).unwrap();
        assert_eq!(thermo.get("type").map(String::as_str), Some("heRhoThermo"));
        assert_eq!(thermo.get("energy").map(String::as_str), Some("sensibleInternalEnergy"));
        assert_eq!(thermo.len(), THERMO_TYPE_KEYS.len());

        let mixture = parse_config(PROPERTIES, MIXTURE_KEYS).unwrap();
        assert_eq!(mixture.get("molWeight").map(String::as_str), Some("32.04"));
        assert_eq!(mixture.get("mu").map(String::as_str), Some("5.9e-4"));
        assert!(!mixture.contains_key("rho0"), "absent keys are not reported");
        assert!(!mixture.contains_key("gamma"));
    }

    #[test]
    fn last_occurrence_wins() {
        let text = "rho 1;\nmu 2;\nrho 3;\n";
        let values = parse_config(text, &["rho", "mu"]).unwrap();
        assert_eq!(values["rho"], "3");
        assert_eq!(values["mu"], "2");

        let file = ConfigFile::parse(text, &["rho"]).unwrap();
        assert_eq!(file.line_of("rho"), Some(2));
    }

    #[test]
    fn no_occurrence_means_absent() {
        let values = parse_config("// nothing here\n", &["rho"]).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn untouched_text_roundtrips_byte_for_byte() {
        let text = "a\r\nrho 1; // c\n\n  mu\t2;";
        let file = ConfigFile::parse(text, &["rho", "mu"]).unwrap();
        assert_eq!(file.to_text(), text);
        assert_eq!(file.get("mu"), Some("2"));
    }

    #[test]
    fn apply_updates_replaces_only_value_tokens() {
        let keys = KeySet::all_keys();
        let file = ConfigFile::parse(PROPERTIES, keys.as_slice()).unwrap();
        let (next, report) = file
            .apply_updates(&updates(&[("rho", "800"), ("type", "hePsiThermo"), ("molWeight", "17.03")]))
            .unwrap();

        assert_eq!(report.lines_rewritten, 3);
        assert!(report.is_clean());

        let text = next.to_text();
        assert!(text.contains("        rho         800;\n"));
        assert!(text.contains("    type            hePsiThermo;\n"));
        assert!(text.contains("        molWeight   17.03; // methanol\n"));

        // Everything else is identical, line for line.
        assert_eq!(next.lines().len(), file.lines().len());
        for (before, after) in file.lines().iter().zip(next.lines()) {
            let changed = ["rho ", "type ", "molWeight "]
                .iter()
                .any(|k| before.trim_start().starts_with(k));
            if !changed {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn apply_then_parse_recovers_updates() {
        let keys = KeySet::all_keys();
        let file = ConfigFile::parse(PROPERTIES, keys.as_slice()).unwrap();
        let before = file.values();
        let wanted = updates(&[("Cp", "2200"), ("Pr", "6.9"), ("transport", "sutherland")]);

        let (next, _) = file.apply_updates(&wanted).unwrap();
        let reparsed = parse_config(&next.to_text(), keys.as_slice()).unwrap();
        for (key, value) in &before {
            let expected = wanted.get(key).unwrap_or(value);
            assert_eq!(&reparsed[key], expected, "key {key}");
        }
        assert_eq!(reparsed.len(), before.len());
    }

    #[test]
    fn duplicate_keys_are_all_rewritten() {
        let file = ConfigFile::parse("rho 1;\nrho 2;\n", &["rho"]).unwrap();
        let (next, report) = file.apply_updates(&updates(&[("rho", "9")])).unwrap();
        assert_eq!(next.to_text(), "rho 9;\nrho 9;\n");
        assert_eq!(report.lines_rewritten, 2);
    }

    #[test]
    fn unmatched_and_unknown_keys_are_skipped() {
        let file = ConfigFile::parse("rho 1;\n", &["rho", "mu"]).unwrap();
        let (next, report) = file
            .apply_updates(&updates(&[("mu", "2"), ("nu", "3")]))
            .unwrap();
        assert_eq!(next.to_text(), "rho 1;\n");
        assert_eq!(report.unmatched, vec!["mu".to_string()]);
        assert_eq!(report.unrecognized, vec!["nu".to_string()]);
        assert!(!report.is_clean());
    }

    #[test]
    fn rejects_values_that_would_break_the_line() {
        let file = ConfigFile::parse("rho 1;\n", &["rho"]).unwrap();
        let err = file.apply_updates(&updates(&[("rho", "1 000")])).unwrap_err();
        assert!(matches!(err, PropsError::Model(ModelError::InvalidValue { .. })));
    }

    #[test]
    fn entries_follow_file_order() {
        let file = ConfigFile::parse("mu 1;\nrho 2;\n", &["rho", "mu"]).unwrap();
        let keys: Vec<_> = file.entries().iter().map(|e| e.key().to_string()).collect();
        assert_eq!(keys, vec!["mu", "rho"]);
    }

    #[test]
    fn read_and_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("physicalProperties.methanol");
        std::fs::write(&path, "rho 1;\n").unwrap();

        let file = ConfigFile::read(&path, &["rho"]).unwrap();
        let (next, _) = file.apply_updates(&updates(&[("rho", "2")])).unwrap();
        next.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "rho 2;\n");

        let missing = ConfigFile::read(&dir.path().join("nope"), &["rho"]).unwrap_err();
        assert!(matches!(missing, PropsError::NotFound(_)));
    }
}
