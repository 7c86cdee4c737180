use crate::{
    config::Config,
    constants::{localization::*, *},
    functions::get_attribute,
    tables::Tables,
    tokenizer::Tokenizer,
    types::*,
};
use log::{debug, warn};
use regex::Regex;
use std::{borrow::Cow, cell::LazyCell};

thread_local! {
    static HEAD_RE: LazyCell<Regex> =
        LazyCell::new(|| unsafe { Regex::new(r"^\w+").unwrap_unchecked() });
}

/// Outcome of resolving one script line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub is_command: bool,
    pub speaker: String,
    /// Empty when the line contributes no text.
    pub tally: Counter,
}

impl Resolution {
    fn command() -> Self {
        Self {
            is_command: true,
            ..Default::default()
        }
    }

    fn ignored() -> Self {
        Self::default()
    }
}

/// Head token of a command: its leading identifier, or the whole command if
/// it doesn't start with one.
#[must_use]
pub fn command_head(command: &str) -> &str {
    HEAD_RE
        .with(|re| re.find(command).map(|m| m.end()))
        .map_or(command, |end| &command[..end])
}

/// Decides what a line is and who says it.
pub struct LineResolver<'a> {
    config: &'a Config,
    tables: &'a Tables,
    tokenizer: Tokenizer,
    debug: bool,
}

impl<'a> LineResolver<'a> {
    #[must_use]
    pub fn new(config: &'a Config, tables: &'a Tables) -> Self {
        Self {
            config,
            tables,
            tokenizer: Tokenizer::new(),
            debug: false,
        }
    }

    /// Collect unknown commands and heads into diagnostics.
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    #[must_use]
    pub fn classify<'c>(&self, command: &'c str) -> (CommandKind, &'c str) {
        let head = command_head(command);

        if self.config.known_commands.contains(head)
            || command.starts_with(CHARACTER_SLOT_PREFIX)
        {
            return (CommandKind::Known, head);
        }

        let kind = match head {
            "HEADER" | "Title" | "Div" => CommandKind::Header,
            "PopupDialog" => CommandKind::PopupDialog,
            "Dialog" | "VoiceWithin" | "dialog" | "warp" => CommandKind::Dialog,
            "name" => CommandKind::Name,
            _ if command.starts_with(NAME_PAREN_PREFIX) => CommandKind::Name,
            "Decision" | "decision" => CommandKind::Decision,
            "Sticker" | "Subtitle" => CommandKind::Sticker,
            "narration" | "Narration" | "isAvatarRight" => CommandKind::Narration,
            "multiline" => CommandKind::Multiline,
            _ => CommandKind::Unknown,
        };

        (kind, head)
    }

    /// Resolves one `[command]text` pair.
    ///
    /// Malformed commands are never an error: a dialogue or name command
    /// without attributes counts as a command without text.
    pub fn resolve(
        &self,
        command: &str,
        text: &str,
        diagnostics: &mut Diagnostics,
    ) -> Resolution {
        let (kind, head) = self.classify(command);
        let mut text = Cow::Borrowed(text);
        let mut is_command = true;

        let speaker: String = match kind {
            CommandKind::Known => return Resolution::command(),
            CommandKind::Header => return Resolution::ignored(),
            CommandKind::Dialog | CommandKind::PopupDialog => {
                let Some(attribute) = get_attribute(command) else {
                    return Resolution::command();
                };

                self.dialog_speaker(command, attribute, kind.is_popup_dialog(), diagnostics)
            }
            CommandKind::Name => {
                let Some(attribute) = get_attribute(command) else {
                    return Resolution::command();
                };

                is_command = false;

                if attribute.is_empty() {
                    ASIDE_NAME.to_owned()
                } else {
                    attribute.to_owned()
                }
            }
            CommandKind::Decision => {
                for part in command.split(',').filter(|p| p.contains(OPTION_KEY)) {
                    let Some(value) = part.split('=').nth(1) else {
                        continue;
                    };

                    let text = text.to_mut();
                    for option in value.trim_matches([' ', '"']).split(';') {
                        text.push_str(option);
                    }
                }

                DOCTOR_NAME.to_owned()
            }
            CommandKind::Sticker => {
                for part in command.split(',').filter(|p| p.contains(TEXT_KEY)) {
                    if let Some(value) = part.split("text=").nth(1) {
                        text.to_mut().push_str(value.trim_matches([' ', '"']));
                    }
                }

                ASIDE_NAME.to_owned()
            }
            CommandKind::Narration => ASIDE_NAME.to_owned(),
            CommandKind::Multiline => {
                let Some(attribute) = get_attribute(command) else {
                    return Resolution::command();
                };

                attribute.to_owned()
            }
            CommandKind::Unknown => {
                if self.debug {
                    debug!("Unknown command: {command}");
                    diagnostics.record_command(head);
                }

                return Resolution::command();
            }
        };

        Resolution {
            is_command,
            speaker,
            tally: self.tokenizer.tokenize(&text),
        }
    }

    /// Speaker of a dialogue line with the given `head` attribute.
    fn dialog_speaker(
        &self,
        command: &str,
        head: &str,
        popup: bool,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let head = if popup {
            let variable = head.trim_start_matches(VARIABLE_SIGIL);

            match self.tables.story_variables.get(variable) {
                Some(value) => value.as_str(),
                None => {
                    warn!("{VARIABLE_NOT_FOUND_MSG}: {variable}");

                    if self.debug {
                        diagnostics.record_head(head);
                    }

                    head
                }
            }
        } else {
            head
        };

        if head.starts_with(CHARACTER_ID_PREFIX) {
            if let Some(name) = self
                .tables
                .characters
                .get(head)
                .or_else(|| self.config.fallback_heads.get(head))
            {
                return name.clone();
            }

            warn!("{HEAD_NOT_FOUND_MSG}: {head}");

            if self.debug {
                diagnostics.record_head(head);
            }

            return head.to_owned();
        }

        if !command.contains(HEAD_KEY) {
            if self.debug {
                diagnostics.record_head(&format!("{NO_HEAD_PREFIX}{head}"));
            }

            return ASIDE_NAME.to_owned();
        }

        if self.debug {
            diagnostics.record_head(head);
        }

        head.to_owned()
    }
}
