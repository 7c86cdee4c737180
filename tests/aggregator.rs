use arknights_word_count::{
    aggregator::Aggregator,
    config::Config,
    constants::ASIDE_NAME,
    resolver::LineResolver,
    tables::Tables,
    types::{Diagnostics, StoryRecord},
};

#[test]
fn unknown_command_does_not_abort_the_story() {
    let config = Config::default();
    let tables = Tables::default();
    let aggregator = Aggregator::new(LineResolver::new(&config, &tables).debug(true));
    let mut diagnostics = Diagnostics::default();

    let script = "[totallyMadeUpCommand]\n[name=\"艾丽妮\"]Hello";
    let counts = aggregator.parse_script(script, &mut diagnostics);

    // `name=` lines carry text and aren't commands.
    assert_eq!(counts.commands, 1);
    assert_eq!(counts.speakers.len(), 1);
    assert_eq!(counts.speakers["艾丽妮"].get("Hello"), 1);
    assert_eq!(counts.speakers["艾丽妮"].total(), 1);

    assert_eq!(diagnostics.commands.len(), 1);
    assert!(diagnostics.commands.contains("totallyMadeUpCommand"));
}

#[test]
fn lines_without_command_go_to_the_aside() {
    let config = Config::default();
    let tables = Tables::default();
    let aggregator = Aggregator::new(LineResolver::new(&config, &tables));
    let mut diagnostics = Diagnostics::default();

    let counts = aggregator.parse_script("风很大。\n雨也很大。", &mut diagnostics);

    assert_eq!(counts.commands, 0);
    assert_eq!(counts.speakers[ASIDE_NAME].get("大"), 2);
    assert_eq!(counts.speakers[ASIDE_NAME].total(), 9);
}

#[test]
fn speakers_accumulate_across_lines() {
    let config = Config::default();
    let tables = Tables::default();
    let aggregator = Aggregator::new(LineResolver::new(&config, &tables));
    let mut diagnostics = Diagnostics::default();

    let script = "[name=\"陈\"]走。\n[Delay(time=1)]\n[name=\"陈\"]快走。";
    let counts = aggregator.parse_script(script, &mut diagnostics);

    assert_eq!(counts.commands, 1);
    assert_eq!(counts.speakers["陈"].get("走"), 2);
    assert_eq!(counts.speakers["陈"].get("。"), 2);
}

#[test]
fn empty_lines_create_no_speakers() {
    let config = Config::default();
    let tables = Tables::default();
    let aggregator = Aggregator::new(LineResolver::new(&config, &tables));
    let mut diagnostics = Diagnostics::default();

    let counts = aggregator.parse_script("[Delay(time=1)]\n[name=\"陈\"]\n[HEADER(key=\"x\")]", &mut diagnostics);

    assert!(counts.is_empty());
    assert_eq!(counts.commands, 1);
}

#[test]
fn info_text_is_counted_only_on_request() {
    let config = Config::default();
    let tables = Tables::default();
    let mut diagnostics = Diagnostics::default();
    let story = StoryRecord::new("简介".to_owned(), "[name=\"陈\"]走".to_owned());

    let plain = Aggregator::new(LineResolver::new(&config, &tables));
    let counts = plain.parse_story(&story, &mut diagnostics);
    assert!(!counts.speakers.contains_key(ASIDE_NAME));

    let with_info = Aggregator::new(LineResolver::new(&config, &tables)).count_info(true);
    let counts = with_info.parse_story(&story, &mut diagnostics);
    assert_eq!(counts.speakers[ASIDE_NAME].total(), 2);
    assert_eq!(counts.speakers["陈"].total(), 1);
}

#[test]
fn parsing_twice_gives_the_same_counts() {
    let config = Config::default();
    let tables = Tables::default();
    let aggregator = Aggregator::new(LineResolver::new(&config, &tables));
    let mut diagnostics = Diagnostics::default();

    let script = "[name=\"陈\"]走……\n[Decision(options=\"好;不\")]\n[Delay(time=1)]";

    assert_eq!(
        aggregator.parse_script(script, &mut diagnostics),
        aggregator.parse_script(script, &mut diagnostics)
    );
}

#[test]
fn merged_counts_add_up() {
    let config = Config::default();
    let tables = Tables::default();
    let aggregator = Aggregator::new(LineResolver::new(&config, &tables));
    let mut diagnostics = Diagnostics::default();

    let mut first = aggregator.parse_script("[name=\"陈\"]走\n[Delay(time=1)]", &mut diagnostics);
    let second = aggregator.parse_script("[name=\"陈\"]走走\n[Delay(time=1)]", &mut diagnostics);

    first.merge(second);

    assert_eq!(first.commands, 2);
    assert_eq!(first.speakers["陈"].get("走"), 3);
}
