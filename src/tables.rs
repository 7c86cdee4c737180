use crate::{
    constants::{
        ACTIVITY_TABLE_FILE, CODENAME_LABEL, EXCEL_DIR, HANDBOOK_INFO_TABLE_FILE,
        STORY_DIR, STORY_REVIEW_TABLE_FILE, STORY_VARIABLES_FILE,
    },
    functions::read_text,
    types::Error,
};
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InfoUnlockData {
    /// Empty for mini stories, `null` for operator records.
    pub story_code: Option<String>,
    pub story_sort: i64,
    pub story_name: String,
    /// Key of the story script.
    pub story_txt: String,
    pub avg_tag: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryReviewEntry {
    pub name: String,
    pub entry_type: String,
    pub act_type: String,
    pub info_unlock_datas: Vec<InfoUnlockData>,
}

impl InfoUnlockData {
    /// Key of the unlock under its group: the story code, the sort number for
    /// an empty code, or the last `_` segment of the group ID for a missing one.
    #[must_use]
    pub fn code(&self, story_id: &str) -> String {
        match self.story_code.as_deref() {
            Some("") => self.story_sort.to_string(),
            Some(code) => code.to_owned(),
            None => story_id.rsplit('_').next().unwrap_or(story_id).to_owned(),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HandbookStory {
    story_text: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct HandbookStorySection {
    stories: Vec<HandbookStory>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HandbookEntry {
    story_text_audio: Vec<HandbookStorySection>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HandbookInfoTable {
    handbook_dict: IndexMap<String, HandbookEntry>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ActivityTable {
    basic_info: IndexMap<String, BasicInfo>,
}

/// Game tables the counter consults.
#[derive(Debug, Default, Clone)]
pub struct Tables {
    pub story_review: IndexMap<String, StoryReviewEntry>,
    /// Character ID to display name, taken from the handbook.
    pub characters: IndexMap<String, String>,
    pub story_variables: IndexMap<String, String>,
    pub basic_info: IndexMap<String, BasicInfo>,
}

fn load_table<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let content = read_text(path)?;
    Ok(sonic_rs::from_str(&content)?)
}

/// Display name of a handbook entry: first line of the first story, without
/// the codename label.
fn handbook_name(entry: &HandbookEntry) -> Option<String> {
    let story_text = &entry.story_text_audio.first()?.stories.first()?.story_text;
    let first_line = story_text.split('\n').next()?;
    Some(first_line.replace(CODENAME_LABEL, ""))
}

impl Tables {
    /// Loads every table from a game data directory.
    pub fn load(data_dir: &Path) -> Result<Self, Error> {
        let excel_dir = data_dir.join(EXCEL_DIR);

        let story_review = load_table(&excel_dir.join(STORY_REVIEW_TABLE_FILE))?;

        let handbook: HandbookInfoTable =
            load_table(&excel_dir.join(HANDBOOK_INFO_TABLE_FILE))?;
        let activity: ActivityTable = load_table(&excel_dir.join(ACTIVITY_TABLE_FILE))?;
        let variables: IndexMap<String, Value> =
            load_table(&data_dir.join(STORY_DIR).join(STORY_VARIABLES_FILE))?;

        Ok(Self {
            story_review,
            characters: Self::characters_from_handbook(handbook),
            story_variables: variables
                .into_iter()
                .map(|(key, value)| match value {
                    Value::String(string) => (key, string),
                    other => (key, other.to_string()),
                })
                .collect(),
            basic_info: activity.basic_info,
        })
    }

    fn characters_from_handbook(handbook: HandbookInfoTable) -> IndexMap<String, String> {
        handbook
            .handbook_dict
            .iter()
            .filter_map(|(id, entry)| Some((id.clone(), handbook_name(entry)?)))
            .collect()
    }
}
