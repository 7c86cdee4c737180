use crate::{
    constants::ASIDE_COMMAND, resolver::LineResolver, tokenizer::Tokenizer, types::*,
};

/// Result of counting one story.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoryCounts {
    pub commands: u64,
    pub speakers: SpeakerCounterMap,
}

impl StoryCounts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    /// Merges another story's counts into `self`.
    pub fn merge(&mut self, other: StoryCounts) {
        self.commands += other.commands;

        for (speaker, counter) in other.speakers {
            self.speakers.entry(speaker).or_default().update(counter);
        }
    }
}

/// Runs the line resolver over whole stories.
pub struct Aggregator<'a> {
    resolver: LineResolver<'a>,
    tokenizer: Tokenizer,
    count_info: bool,
}

impl<'a> Aggregator<'a> {
    #[must_use]
    pub fn new(resolver: LineResolver<'a>) -> Self {
        Self {
            resolver,
            tokenizer: Tokenizer::new(),
            count_info: false,
        }
    }

    /// Count the info text of stories too.
    #[must_use]
    pub fn count_info(mut self, enabled: bool) -> Self {
        self.count_info = enabled;
        self
    }

    pub fn parse_story(
        &self,
        story: &StoryRecord,
        diagnostics: &mut Diagnostics,
    ) -> StoryCounts {
        let mut counts = StoryCounts::default();

        for script in story.texts(self.count_info) {
            self.parse_script_into(script, &mut counts, diagnostics);
        }

        counts
    }

    pub fn parse_script(&self, script: &str, diagnostics: &mut Diagnostics) -> StoryCounts {
        let mut counts = StoryCounts::default();
        self.parse_script_into(script, &mut counts, diagnostics);
        counts
    }

    fn parse_script_into(
        &self,
        script: &str,
        counts: &mut StoryCounts,
        diagnostics: &mut Diagnostics,
    ) {
        for line in self.tokenizer.lines(script) {
            let command = line.command.unwrap_or(ASIDE_COMMAND);
            let text = line.text.unwrap_or_default();

            let resolution = self.resolver.resolve(command, text, diagnostics);

            if resolution.is_command {
                counts.commands += 1;
            }

            if resolution.tally.total() > 0 {
                counts
                    .speakers
                    .entry(resolution.speaker)
                    .or_default()
                    .update(resolution.tally);
            }
        }
    }
}
