use crate::{
    constants::{
        ALIAS_GROUPS, EXCLUDED_NAMES, FALLBACK_HEADS, KNOWN_COMMANDS,
        NAME_PREFIXES, NAME_SUFFIXES,
    },
    functions::read_text,
    types::Error,
};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// Names that refer to the same character across scripts.
///
/// Every group is expanded through all `prefixes × name × suffixes`
/// combinations (both including the empty string) before matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasMergeSpec {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
    pub excluded: Vec<String>,
    pub groups: Vec<Vec<String>>,
}

impl AliasMergeSpec {
    /// No aliases: only composite names are split.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
            suffixes: Vec::new(),
            excluded: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl Default for AliasMergeSpec {
    fn default() -> Self {
        Self {
            prefixes: owned(NAME_PREFIXES),
            suffixes: owned(NAME_SUFFIXES),
            excluded: owned(EXCLUDED_NAMES),
            groups: ALIAS_GROUPS.iter().map(|group| owned(group)).collect(),
        }
    }
}

/// Static configuration of a counting run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exact, case-sensitive stage direction names.
    pub known_commands: IndexSet<String>,
    /// Display names of character IDs missing from the handbook.
    pub fallback_heads: IndexMap<String, String>,
    pub alias: AliasMergeSpec,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            known_commands: KNOWN_COMMANDS.iter().map(|c| (*c).to_owned()).collect(),
            fallback_heads: FALLBACK_HEADS
                .iter()
                .map(|(id, name)| ((*id).to_owned(), (*name).to_owned()))
                .collect(),
            alias: AliasMergeSpec::default(),
        }
    }
}

impl Config {
    /// Loads a JSON configuration. Missing fields take their defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = read_text(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
