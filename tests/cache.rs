use arknights_word_count::{
    cache::CacheData,
    parse_data_version,
    types::{CountNode, Error, InfoRecord, SpeakerTotals},
};
use std::fs::write;
use tempfile::TempDir;

fn sample_tree() -> CountNode {
    let mut root = CountNode::default();
    root.info.words = 12;
    root.info.commands = 3;
    root.info.counter.insert(
        "Dr./博士".to_owned(),
        SpeakerTotals {
            words: 12,
            punctuation: 2,
            ellipsis: 1,
            merged: true,
        },
    );

    let entry = root.child_mut("MAINLINE", || InfoRecord::named("主线"));
    entry.info.kind = Some("MAIN".to_owned());
    entry.child_mut("main_0", InfoRecord::default).info.words = 12;

    root
}

#[test]
fn cache_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/count.cache");

    let version = parse_data_version("Arknights 2024/01/19 Version:2.1.21").unwrap();
    let cache = CacheData::new(version, sample_tree());

    cache.store(&path).unwrap();
    let loaded = CacheData::load(&path).unwrap();

    assert_eq!(loaded, cache);
    assert!(loaded.count.info.counter["Dr./博士"].merged);
    assert_eq!(
        loaded.count.get(&["MAINLINE"]).unwrap().info.name.as_deref(),
        Some("主线")
    );
}

#[test]
fn corrupt_cache_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("count.cache");
    write(&path, b"not a cache").unwrap();

    assert!(CacheData::load(&path).is_err());
}

#[test]
fn missing_cache_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let result = CacheData::load(&dir.path().join("missing.cache"));

    assert!(matches!(result, Err(Error::Io(_, _))));
}
