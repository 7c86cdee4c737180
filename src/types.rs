use bitflags::bitflags;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::{
    fmt::{self, Display, Formatter, Write},
    io,
    ops::AddAssign,
    path::PathBuf,
};
use strum_macros::EnumIs;
use thiserror::Error;

/// Per-story mapping from speaker to their raw token tally.
pub type SpeakerCounterMap = IndexMap<String, Counter>;
/// Flat mapping from speaker to their folded totals.
pub type SpeakerTable = IndexMap<String, SpeakerTotals>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}: IO error occurred: {1}")]
    Io(PathBuf, io::Error),
    #[error("{0} is not a directory!")]
    NotADirectory(PathBuf),
    #[error("{0} not found! Can't determine the game data version.")]
    MissingVersionFile(PathBuf),
    #[error("Couldn't parse data version from `{0}`.")]
    InvalidVersion(String),
    #[error("Parsing game table failed with: {0}")]
    JsonParse(#[from] sonic_rs::Error),
    #[error("Serializing data failed with: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Game tables and stories aren't loaded. Run an update first.")]
    NotLoaded,
}

/// One `[command]text` pair extracted from a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine<'a> {
    pub command: Option<&'a str>,
    pub text: Option<&'a str>,
}

/// Multiset of tokens. Equality ignores insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Counter(IndexMap<String, u64>);

impl Counter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, count: u64) {
        if let Some(value) = self.0.get_mut(key) {
            *value += count;
        } else {
            self.0.insert(key.to_owned(), count);
        }
    }

    pub fn add_char(&mut self, char: char) {
        let mut buffer = [0u8; 4];
        self.add(char.encode_utf8(&mut buffer), 1);
    }

    /// Element-wise addition of `other` into `self`.
    pub fn update(&mut self, other: Counter) {
        if self.0.is_empty() {
            *self = other;
            return;
        }

        for (key, count) in other.0 {
            *self.0.entry(key).or_default() += count;
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Totals of a single speaker.
///
/// `merged` marks entries produced by name merging, so that a repeated merge
/// doesn't split them again.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerTotals {
    pub words: u64,
    pub punctuation: u64,
    pub ellipsis: u64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub merged: bool,
}

impl SpeakerTotals {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.words + self.punctuation + self.ellipsis
    }
}

impl AddAssign<&SpeakerTotals> for SpeakerTotals {
    fn add_assign(&mut self, rhs: &SpeakerTotals) {
        self.words += rhs.words;
        self.punctuation += rhs.punctuation;
        self.ellipsis += rhs.ellipsis;
    }
}

/// Rolled-up statistics of a [`CountNode`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub words: u64,
    #[serde(default)]
    pub punctuation: u64,
    #[serde(default)]
    pub ellipsis: u64,
    #[serde(default)]
    pub commands: u64,
    #[serde(default)]
    pub counter: SpeakerTable,
}

impl InfoRecord {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Default::default()
        }
    }

    /// Adds the totals and per-speaker breakdown of `other` into `self`.
    /// Name and type are left untouched.
    pub fn fold(&mut self, other: &InfoRecord) {
        self.words += other.words;
        self.punctuation += other.punctuation;
        self.ellipsis += other.ellipsis;
        self.commands += other.commands;

        for (name, totals) in &other.counter {
            if let Some(existing) = self.counter.get_mut(name) {
                *existing += totals;
            } else {
                self.counter.insert(name.clone(), totals.clone());
            }
        }
    }

    /// Totals summed over `counter`, independent of the stored fields.
    #[must_use]
    pub fn counter_totals(&self) -> SpeakerTotals {
        let mut sum = SpeakerTotals::default();

        for totals in self.counter.values() {
            sum += totals;
        }

        sum
    }
}

/// Node of the aggregate tree.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountNode {
    #[serde(default)]
    pub info: InfoRecord,
    #[serde(default)]
    pub items: IndexMap<String, CountNode>,
}

impl CountNode {
    #[must_use]
    pub fn new(info: InfoRecord) -> Self {
        Self {
            info,
            items: IndexMap::new(),
        }
    }

    /// Returns the child under `key`, creating it with `info` first if needed.
    /// `info` is only evaluated on creation.
    pub fn child_mut<F: FnOnce() -> InfoRecord>(
        &mut self,
        key: &str,
        info: F,
    ) -> &mut CountNode {
        if !self.items.contains_key(key) {
            self.items.insert(key.to_owned(), CountNode::new(info()));
        }

        &mut self.items[key]
    }

    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&CountNode> {
        path.iter()
            .try_fold(self, |node, key| node.items.get(*key))
    }
}

/// Deduplicated diagnostics collected during a counting pass.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    pub commands: IndexSet<String>,
    pub heads: IndexSet<String>,
    pub files: IndexSet<String>,
}

impl Diagnostics {
    pub fn record_command(&mut self, command: &str) {
        if !self.commands.contains(command) {
            self.commands.insert(command.to_owned());
        }
    }

    pub fn record_head(&mut self, head: &str) {
        if !self.heads.contains(head) {
            self.heads.insert(head.to_owned());
        }
    }

    pub fn record_file(&mut self, file: &str) {
        if !self.files.contains(file) {
            self.files.insert(file.to_owned());
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.heads.is_empty() && self.files.is_empty()
    }

    /// Renders `entries` as newline-delimited `"entry",` lines.
    #[must_use]
    pub fn render(entries: &IndexSet<String>) -> String {
        let mut output = String::with_capacity(entries.len() * 16);

        for entry in entries {
            let _ = writeln!(output, "\"{entry}\",");
        }

        output
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Switches of a counting run.
    pub struct CountFlags: u8 {
        /// Collect unknown commands, heads and files.
        const Debug = 1 << 0;

        /// Count the text of story info files as well as the scripts.
        const CountInfo = 1 << 1;
    }
}

impl Default for CountFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Classification of a command's head token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum CommandKind {
    /// Pure stage direction.
    Known,
    Header,
    Dialog,
    PopupDialog,
    Name,
    Decision,
    Sticker,
    Narration,
    Multiline,
    Unknown,
}

/// A story script with the text of its info file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub info: String,
    pub txt: String,
}

impl StoryRecord {
    #[must_use]
    pub fn new(info: String, txt: String) -> Self {
        Self { info, txt }
    }

    /// Texts to count: only the script, or every field in count-info mode.
    pub fn texts(&self, count_info: bool) -> impl Iterator<Item = &str> {
        let info = count_info.then_some(self.info.as_str());
        info.into_iter().chain(std::iter::once(self.txt.as_str()))
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DataDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Display for DataDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Version and date of the game data, read from `data_version.txt`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataVersion {
    pub version: SmallVec<[u32; 4]>,
    pub date: DataDate,
}

impl DataVersion {
    /// Whether `self` is newer than `other` in either version or date.
    #[must_use]
    pub fn is_newer_than(&self, other: &DataVersion) -> bool {
        self.version > other.version || self.date > other.date
    }

    #[must_use]
    pub fn version_string(&self) -> String {
        self.version
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}
