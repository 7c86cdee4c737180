use arknights_word_count::{
    collect_txt_files, get_attribute, parse_data_version, read_text, story_key,
    types::{Diagnostics, Error},
};
use encoding_rs::GB18030;
use std::fs::{create_dir_all, write};
use tempfile::TempDir;

#[test]
fn attribute_is_the_first_value() {
    assert_eq!(get_attribute("Dialog(head=\"char_002_amiya\", delay=1)"), Some("char_002_amiya"));
    assert_eq!(get_attribute("name='陈'"), Some("陈"));
    assert_eq!(get_attribute("multiline(name=\"W\")"), Some("W"));
    assert_eq!(get_attribute("Dialog"), None);
    assert_eq!(get_attribute("Dialog(delay, head=\"x\")"), None);
}

#[test]
fn data_version_is_parsed() {
    let version = parse_data_version("Arknights 2024/01/19 Version:2.1.21\n").unwrap();

    assert_eq!(version.version.as_slice(), &[2, 1, 21]);
    assert_eq!(version.date.to_string(), "2024-01-19");
    assert_eq!(version.version_string(), "2.1.21");
}

#[test]
fn newer_data_versions_compare() {
    let old = parse_data_version("x 2024/01/19 v:2.1.21").unwrap();
    let later_date = parse_data_version("x 2024/02/01 v:2.1.21").unwrap();
    let later_version = parse_data_version("x 2023/12/01 v:2.1.41").unwrap();

    assert!(later_date.is_newer_than(&old));
    assert!(later_version.is_newer_than(&old));
    assert!(!old.is_newer_than(&old));
}

#[test]
fn malformed_data_version_is_rejected() {
    assert!(matches!(
        parse_data_version("no version here"),
        Err(Error::InvalidVersion(_))
    ));
    assert!(matches!(
        parse_data_version("x 2024/13 v:2.1"),
        Err(Error::InvalidVersion(_))
    ));
}

#[test]
fn text_encodings_are_detected() {
    let dir = TempDir::new().unwrap();

    let bom = dir.path().join("bom.txt");
    write(&bom, "\u{FEFF}你好".as_bytes()).unwrap();
    assert_eq!(read_text(&bom).unwrap(), "你好");

    let gb = dir.path().join("gb.txt");
    let (encoded, _, _) = GB18030.encode("罗德岛");
    write(&gb, &encoded).unwrap();
    assert_eq!(read_text(&gb).unwrap(), "罗德岛");
}

#[test]
fn txt_files_are_collected_recursively() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();

    create_dir_all(base.join("a/b")).unwrap();
    write(base.join("a/b/two.txt"), "").unwrap();
    write(base.join("a/one.txt"), "").unwrap();
    write(base.join("a/skip.json"), "").unwrap();

    let files = collect_txt_files(base).unwrap();
    let keys: Vec<String> = files
        .iter()
        .map(|file| story_key(file, base).unwrap())
        .collect();

    assert_eq!(keys, ["a/b/two", "a/one"]);
    assert!(collect_txt_files(&base.join("missing")).unwrap().is_empty());
}

#[test]
fn diagnostics_render_as_quoted_lines() {
    let mut diagnostics = Diagnostics::default();
    diagnostics.record_command("madeUp");
    diagnostics.record_command("madeUp");
    diagnostics.record_command("other");

    assert_eq!(
        Diagnostics::render(&diagnostics.commands),
        "\"madeUp\",\n\"other\",\n"
    );
    assert!(!diagnostics.is_empty());
}
