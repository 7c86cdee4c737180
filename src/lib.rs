//!Library for counting words, punctuation and commands per character across Arknights story scripts.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod constants;
mod functions;
pub mod merge;
pub mod report;
pub mod resolver;
pub mod service;
pub mod tables;
pub mod tokenizer;
pub mod tree;
pub mod types;

pub use functions::{
    collect_txt_files, get_attribute, parse_data_version, read_text, story_key,
};
pub use service::{GameDataService, Stage};
pub use types::{CountFlags, CountNode, Diagnostics, Error, InfoRecord, SpeakerTotals};
