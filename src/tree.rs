use crate::{
    aggregator::{Aggregator, StoryCounts},
    constants::{localization::STORY_NOT_FOUND_MSG, *},
    tables::Tables,
    types::*,
};
use indexmap::IndexMap;
use log::{info, warn};
use std::collections::HashSet;

/// Splits every speaker's tally into words, punctuation and ellipsis and sums
/// them into a record for one story.
#[must_use]
pub fn story_info(counts: &StoryCounts) -> InfoRecord {
    let mut record = InfoRecord {
        commands: counts.commands,
        ..Default::default()
    };

    for (speaker, counter) in &counts.speakers {
        let mut totals = SpeakerTotals::default();

        for (key, count) in counter.iter() {
            let mut chars = key.chars();

            match (chars.next(), chars.next()) {
                (Some(ELLIPSIS), None) => totals.ellipsis += count,
                (Some(char), None) if PUNCTUATION.contains(&char) => {
                    totals.punctuation += count;
                }
                _ => totals.words += count,
            }
        }

        record.words += totals.words;
        record.punctuation += totals.punctuation;
        record.ellipsis += totals.ellipsis;
        record.counter.insert(speaker.clone(), totals);
    }

    record
}

fn basic_info_record(tables: &Tables, segment: &str) -> InfoRecord {
    tables
        .basic_info
        .get(segment)
        .map(|basic| InfoRecord {
            name: Some(basic.name.clone()),
            kind: Some(basic.kind.clone()),
            ..Default::default()
        })
        .unwrap_or_default()
}

/// Builds the aggregate tree from all stories.
pub struct TreeBuilder<'a> {
    aggregator: Aggregator<'a>,
    debug: bool,
    processed: usize,
}

impl<'a> TreeBuilder<'a> {
    #[must_use]
    pub fn new(aggregator: Aggregator<'a>) -> Self {
        Self {
            aggregator,
            debug: false,
            processed: 0,
        }
    }

    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    fn parse(&mut self, story: &StoryRecord, diagnostics: &mut Diagnostics) -> StoryCounts {
        self.processed += 1;

        if self.processed % PROGRESS_STEP == 0 {
            info!("Counted {} stories", self.processed);
        }

        self.aggregator.parse_story(story, diagnostics)
    }

    /// Rebuilds the whole tree.
    ///
    /// Stories referenced by the review table are keyed by
    /// `entry type / group / story code / avg tag`. The rest are keyed by
    /// their path segments. Both fold into the same root.
    pub fn build(
        &mut self,
        tables: &Tables,
        stories: &IndexMap<String, StoryRecord>,
        diagnostics: &mut Diagnostics,
    ) -> CountNode {
        let mut root = CountNode::default();
        let mut consumed: HashSet<&str> = HashSet::new();

        for (story_id, entry) in &tables.story_review {
            for unlock in &entry.info_unlock_datas {
                let story_key = unlock.story_txt.as_str();
                consumed.insert(story_key);

                let Some(story) = stories.get(story_key) else {
                    warn!("{STORY_NOT_FOUND_MSG}: {story_key}");

                    if self.debug {
                        diagnostics.record_file(story_key);
                    }

                    continue;
                };

                let counts = self.parse(story, diagnostics);

                if counts.is_empty() {
                    continue;
                }

                let record = story_info(&counts);
                root.info.fold(&record);

                let entry_node = root.child_mut(&entry.entry_type, || {
                    InfoRecord::named(&entry.act_type)
                });
                entry_node.info.fold(&record);

                let group_node =
                    entry_node.child_mut(story_id, || InfoRecord::named(&entry.name));
                group_node.info.fold(&record);

                let story_node = group_node.child_mut(&unlock.code(story_id), || {
                    InfoRecord::named(&unlock.story_name)
                });
                story_node.info.fold(&record);

                let avg_tag = unlock.avg_tag.as_deref().unwrap_or_default();
                let avg_node = story_node.child_mut(avg_tag, InfoRecord::default);
                avg_node.info.fold(&record);
            }
        }

        let remaining = stories
            .keys()
            .map(String::as_str)
            .filter(|key| !consumed.contains(key));

        for story_key in remaining {
            let parts: Vec<&str> = story_key.split('/').collect();

            if parts.iter().any(|part| EXCLUDED_DIRNAMES.contains(*part)) {
                continue;
            }

            let counts = self.parse(&stories[story_key], diagnostics);

            if counts.is_empty() {
                continue;
            }

            let record = story_info(&counts);
            root.info.fold(&record);

            let mut node = &mut root;
            for part in parts {
                node = node.child_mut(part, || basic_info_record(tables, part));
                node.info.fold(&record);
            }
        }

        info!("Counted {} stories", self.processed);
        root
    }
}
