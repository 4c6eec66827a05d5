//! Host blacklist — `.urlignore` entries are substrings matched against
//! request origin hosts.

use std::path::Path;

/// Default blacklist file looked up in the working directory.
pub const DEFAULT_FILE: &str = ".urlignore";

#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: Vec<String>,
}

impl Blacklist {
    /// Load entries from a file; a missing file means an empty blacklist.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no blacklist file, filtering nothing");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read blacklist {}: {}", path.display(), e))?;
        Ok(Self::from_lines(content.lines()))
    }

    /// Build from entry lines, skipping blanks.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            entries: lines
                .into_iter()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Whether a host is matched by any entry.
    pub fn on_blacklist(&self, host: &str) -> bool {
        self.entries.iter().any(|entry| host.contains(entry.as_str()))
    }
}
