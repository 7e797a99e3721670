use std::ops::Range;

use regex::Regex;

/// Matcher for `<key> <value>;` lines over a fixed key set.
///
/// Accepted shape: optional indentation, the key, whitespace, a value token
/// without whitespace or `;`, optional whitespace, `;`, then optionally a
/// `//` comment. Anything else on the line means no match.
#[derive(Debug, Clone)]
pub struct EntryPattern {
    keys: Vec<String>,
    re: Option<Regex>,
}

/// A matched line: which key, and where its value sits in the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMatch<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub value_range: Range<usize>,
}

impl EntryPattern {
    pub fn new<K: AsRef<str>>(keys: &[K]) -> Result<Self, regex::Error> {
        let mut keys: Vec<&str> = keys.iter().map(AsRef::as_ref).filter(|k| !k.is_empty()).collect();
        // Longest first keeps `rho0` from being read as `rho` followed by junk.
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        keys.dedup();
        if keys.is_empty() {
            return Ok(Self {
                keys: Vec::new(),
                re: None,
            });
        }

        let alternation = keys.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
        let re = Regex::new(&format!(
            r"^\s*(?P<key>{alternation})\s+(?P<value>[^\s;]+)\s*;\s*(?://.*)?$"
        ))?;
        Ok(Self {
            keys: keys.into_iter().map(str::to_string).collect(),
            re: Some(re),
        })
    }

    /// Whether `key` belongs to the recognized set.
    pub fn recognizes(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Match a single line. A trailing `\n` or `\r\n` is ignored.
    pub fn find<'a>(&self, line: &'a str) -> Option<EntryMatch<'a>> {
        let body = line.strip_suffix('\n').unwrap_or(line);
        let body = body.strip_suffix('\r').unwrap_or(body);
        let caps = self.re.as_ref()?.captures(body)?;
        let key = caps.name("key")?;
        let value = caps.name("value")?;
        Some(EntryMatch {
            key: key.as_str(),
            value: value.as_str(),
            value_range: value.range(),
        })
    }
}
