use arknights_word_count::{
    aggregator::{Aggregator, StoryCounts},
    config::Config,
    resolver::LineResolver,
    tables::{BasicInfo, InfoUnlockData, StoryReviewEntry, Tables},
    tree::{story_info, TreeBuilder},
    types::{CountNode, Counter, Diagnostics, StoryRecord},
};
use indexmap::IndexMap;

fn unlock(code: Option<&str>, sort: i64, name: &str, txt: &str, tag: Option<&str>) -> InfoUnlockData {
    InfoUnlockData {
        story_code: code.map(str::to_owned),
        story_sort: sort,
        story_name: name.to_owned(),
        story_txt: txt.to_owned(),
        avg_tag: tag.map(str::to_owned),
    }
}

fn fixture() -> (Tables, IndexMap<String, StoryRecord>) {
    let mut tables = Tables::default();

    tables.story_review.insert(
        "act1".to_owned(),
        StoryReviewEntry {
            name: "活动一".to_owned(),
            entry_type: "ACTIVITY_STORY".to_owned(),
            act_type: "SIDE".to_owned(),
            info_unlock_datas: vec![
                unlock(Some("1-1"), 1, "开始", "activities/act1/level_a_beg", Some("行动前")),
                unlock(Some("1-1"), 1, "开始", "activities/act1/level_a_end", Some("行动后")),
                unlock(Some(""), 3, "空白", "activities/act1/empty", None),
                unlock(Some("1-2"), 4, "丢失", "activities/act1/missing", None),
            ],
        },
    );
    tables.basic_info.insert(
        "obt".to_owned(),
        BasicInfo {
            name: "开放测试".to_owned(),
            kind: "OBT".to_owned(),
        },
    );

    let stories = [
        ("activities/act1/level_a_beg", "[name=\"陈\"]走吧。"),
        ("activities/act1/level_a_end", "[name=\"陈\"]好……\n[Delay(time=1)]"),
        ("activities/act1/empty", "[Delay(time=1)]"),
        ("activities/act2/nothing", "[HEADER(key=\"x\")]"),
        ("obt/tutorial/level_t", "[name=\"A\"]教程"),
        ("obt/main/level_main_01", "[name=\"阿米娅\"]博士。"),
    ]
    .into_iter()
    .map(|(key, txt)| (key.to_owned(), StoryRecord::new(String::new(), txt.to_owned())))
    .collect();

    (tables, stories)
}

fn build(debug: bool) -> (CountNode, Diagnostics) {
    let config = Config::default();
    let (tables, stories) = fixture();
    let mut diagnostics = Diagnostics::default();

    let resolver = LineResolver::new(&config, &tables).debug(debug);
    let root = TreeBuilder::new(Aggregator::new(resolver))
        .debug(debug)
        .build(&tables, &stories, &mut diagnostics);

    (root, diagnostics)
}

fn assert_additive(key: &str, node: &CountNode) {
    let from_counter = node.info.counter_totals();

    assert_eq!(node.info.words, from_counter.words, "{key}");
    assert_eq!(node.info.punctuation, from_counter.punctuation, "{key}");
    assert_eq!(node.info.ellipsis, from_counter.ellipsis, "{key}");

    if node.items.is_empty() {
        return;
    }

    let sum = |field: fn(&CountNode) -> u64| node.items.values().map(field).sum::<u64>();

    assert_eq!(node.info.words, sum(|n| n.info.words), "{key}");
    assert_eq!(node.info.punctuation, sum(|n| n.info.punctuation), "{key}");
    assert_eq!(node.info.ellipsis, sum(|n| n.info.ellipsis), "{key}");
    assert_eq!(node.info.commands, sum(|n| n.info.commands), "{key}");

    for (child_key, child) in &node.items {
        assert_additive(child_key, child);
    }
}

#[test]
fn story_info_splits_punctuation_and_ellipsis() {
    let mut counter = Counter::new();
    counter.add("走", 2);
    counter.add("Hello", 1);
    counter.add("。", 1);
    counter.add("，", 1);
    counter.add("…", 1);

    let mut counts = StoryCounts {
        commands: 3,
        ..Default::default()
    };
    counts.speakers.insert("陈".to_owned(), counter);

    let info = story_info(&counts);

    assert_eq!(info.words, 3);
    assert_eq!(info.punctuation, 2);
    assert_eq!(info.ellipsis, 1);
    assert_eq!(info.commands, 3);
    assert_eq!(info.counter["陈"].total(), 6);
}

#[test]
fn root_totals_include_both_passes() {
    let (root, _) = build(false);

    assert_eq!(root.info.words, 5);
    assert_eq!(root.info.punctuation, 2);
    assert_eq!(root.info.ellipsis, 1);
    assert_eq!(root.info.commands, 1);

    assert_additive("root", &root);
}

#[test]
fn unlock_records_build_named_nodes() {
    let (root, _) = build(false);

    let entry = root.get(&["ACTIVITY_STORY"]).unwrap();
    assert_eq!(entry.info.name.as_deref(), Some("SIDE"));

    let group = root.get(&["ACTIVITY_STORY", "act1"]).unwrap();
    assert_eq!(group.info.name.as_deref(), Some("活动一"));

    let story = root.get(&["ACTIVITY_STORY", "act1", "1-1"]).unwrap();
    assert_eq!(story.info.name.as_deref(), Some("开始"));
    assert_eq!(story.items.len(), 2);

    let before = root.get(&["ACTIVITY_STORY", "act1", "1-1", "行动前"]).unwrap();
    assert_eq!(before.info.words, 2);
    assert_eq!(before.info.punctuation, 1);

    let after = root.get(&["ACTIVITY_STORY", "act1", "1-1", "行动后"]).unwrap();
    assert_eq!(after.info.ellipsis, 1);
    assert_eq!(after.info.commands, 1);
}

#[test]
fn empty_stories_create_no_nodes() {
    let (root, _) = build(false);

    assert!(root.get(&["ACTIVITY_STORY", "act1", "3"]).is_none());
    assert!(root.get(&["activities"]).is_none());
}

#[test]
fn unattributed_stories_are_keyed_by_path() {
    let (root, _) = build(false);

    let obt = root.get(&["obt"]).unwrap();
    assert_eq!(obt.info.name.as_deref(), Some("开放测试"));
    assert_eq!(obt.info.kind.as_deref(), Some("OBT"));

    let level = root.get(&["obt", "main", "level_main_01"]).unwrap();
    assert_eq!(level.info.words, 2);
    assert_eq!(level.info.counter["阿米娅"].punctuation, 1);
}

#[test]
fn excluded_directories_are_skipped() {
    let (root, _) = build(false);
    assert!(root.get(&["obt", "tutorial"]).is_none());
}

#[test]
fn missing_stories_are_recorded_in_debug() {
    let (_, diagnostics) = build(true);
    assert!(diagnostics.files.contains("activities/act1/missing"));

    let (_, diagnostics) = build(false);
    assert!(diagnostics.files.is_empty());
}

#[test]
fn unlock_codes() {
    let empty = unlock(Some(""), 7, "", "", None);
    assert_eq!(empty.code("act1"), "7");

    let missing = unlock(None, 7, "", "", None);
    assert_eq!(missing.code("story_12fce_set_1"), "1");

    let present = unlock(Some("EP-1"), 7, "", "", None);
    assert_eq!(present.code("act1"), "EP-1");
}
