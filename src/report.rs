use crate::{
    config::AliasMergeSpec,
    constants::*,
    merge::MergeResolver,
    types::{CountNode, DataVersion, Error, InfoRecord, SpeakerTotals},
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::{
    cmp::Reverse,
    fmt::{self, Display, Formatter},
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Single cell of a report sheet.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(u64),
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Int(int) => write!(f, "{int}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Int(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Int(value as u64)
    }
}

pub type Row = Vec<Cell>;
pub type Sheet = Vec<Row>;

/// Heading of the overview sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportInfo {
    pub title: String,
    pub data: Vec<(String, String)>,
}

impl ReportInfo {
    #[must_use]
    pub fn new(
        title: &str,
        program_version: &str,
        version: &DataVersion,
        document_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.to_owned(),
            data: vec![
                (PROGRAM_VERSION_LABEL.to_owned(), program_version.to_owned()),
                (DATA_VERSION_LABEL.to_owned(), version.version_string()),
                (DATA_DATE_LABEL.to_owned(), version.date.to_string()),
                (
                    DOCUMENT_DATE_LABEL.to_owned(),
                    document_date.format("%Y/%m/%d").to_string(),
                ),
            ],
        }
    }
}

/// Rendered sheets, keyed by sheet name in output order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub sheets: IndexMap<String, Sheet>,
}

fn indent(tab: usize) -> Row {
    vec![Cell::Empty; tab]
}

// Displayed punctuation includes ellipses.
const fn info_punctuation(info: &InfoRecord) -> u64 {
    info.punctuation + info.ellipsis
}

const fn totals_punctuation(totals: &SpeakerTotals) -> u64 {
    totals.punctuation + totals.ellipsis
}

/// Pads every row to the length of the longest one.
pub fn amend_sheet(sheet: &mut Sheet) {
    let width = sheet.iter().map(Vec::len).max().unwrap_or_default();

    for row in sheet.iter_mut() {
        row.resize(width, Cell::Empty);
    }
}

/// Places amended sheets side by side, separated by one empty column.
#[must_use]
pub fn merge_sheets(sheets: Vec<Sheet>) -> Sheet {
    let mut sheets = sheets.into_iter();
    let Some(mut merged) = sheets.next() else {
        return Sheet::new();
    };

    for sheet in sheets {
        let width = merged.first().map_or(0, Vec::len);
        let added = sheet.first().map_or(0, Vec::len) + 1;
        let height = sheet.len();

        for (index, row) in sheet.into_iter().enumerate() {
            let mut content = Vec::with_capacity(row.len() + 1);
            content.push(Cell::Empty);
            content.extend(row);

            if let Some(existing) = merged.get_mut(index) {
                existing.extend(content);
            } else {
                let mut padded = indent(width);
                padded.extend(content);
                merged.push(padded);
            }
        }

        for row in merged.iter_mut().skip(height) {
            row.resize(width + added, Cell::Empty);
        }
    }

    merged
}

/// Appends the title and `label：value` rows of `info`, then an empty row.
fn add_info_data(info: &ReportInfo, sheet: &mut Sheet) {
    sheet.push(vec![Cell::from(info.title.as_str())]);

    for (label, value) in &info.data {
        sheet.push(vec![Cell::from(format!("{label}：")), Cell::from(value.as_str())]);
    }

    sheet.push(Row::new());
}

/// Appends the speakers of `info` sorted by words, descending.
/// `limit` of [`None`] lists every speaker.
pub fn gen_sorted_counter_data(
    tab: usize,
    info: &InfoRecord,
    sheet: &mut Sheet,
    limit: Option<usize>,
    show_counter: bool,
) {
    let mut header = indent(tab);
    if show_counter {
        header.push(Cell::from("Counter"));
    }
    header.extend(
        ["Index", "Name", WORDS_LABEL, PUNCTUATION_LABEL, ELLIPSIS_LABEL].map(Cell::from),
    );
    sheet.push(header);

    let mut speakers: Vec<(&String, &SpeakerTotals)> = info.counter.iter().collect();
    speakers.sort_by_key(|(_, totals)| Reverse(totals.words));

    let limit = limit.unwrap_or(speakers.len());

    for (index, (name, totals)) in speakers.into_iter().take(limit).enumerate() {
        let mut row = indent(tab);
        if show_counter {
            row.push(Cell::Empty);
        }
        row.extend([
            Cell::from(index + 1),
            Cell::from(name.as_str()),
            Cell::Int(totals.words),
            Cell::Int(totals_punctuation(totals)),
            Cell::Int(totals.ellipsis),
        ]);
        sheet.push(row);
    }
}

/// Appends the non-empty fields of `info` as `label, value` rows, and its top
/// speakers if there's more than one.
pub fn gen_info_data(tab: usize, info: &InfoRecord, sheet: &mut Sheet, limit: Option<usize>) {
    let text = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(Cell::from)
    };
    let int = |value: u64| (value > 0).then_some(Cell::Int(value));

    let fields = [
        ("Title", text(&info.name)),
        ("Type", text(&info.kind)),
        (WORDS_LABEL, int(info.words)),
        (PUNCTUATION_LABEL, int(info_punctuation(info))),
        (ELLIPSIS_LABEL, int(info.ellipsis)),
        (COMMANDS_LABEL, int(info.commands)),
    ];

    for (label, value) in fields {
        if let Some(value) = value {
            let mut row = indent(tab);
            row.extend([Cell::from(label), value]);
            sheet.push(row);
        }
    }

    if info.counter.len() != 1 {
        gen_sorted_counter_data(tab, info, sheet, limit, true);
    }
}

#[derive(Clone, Copy)]
enum SortKey {
    Words,
    Commands,
}

fn gen_overview_data(sheet: &mut Sheet, items: &IndexMap<String, CountNode>, key: SortKey) {
    sheet.push(
        [
            "Index",
            "Name",
            WORDS_LABEL,
            PUNCTUATION_LABEL,
            ELLIPSIS_LABEL,
            COMMANDS_LABEL,
        ]
        .map(Cell::from)
        .to_vec(),
    );

    let mut sorted: Vec<(&String, &CountNode)> = items.iter().collect();
    sorted.sort_by_key(|(_, node)| match key {
        SortKey::Words => Reverse(node.info.words),
        SortKey::Commands => Reverse(node.info.commands),
    });

    for (index, (key, node)) in sorted.into_iter().enumerate() {
        let info = &node.info;

        sheet.push(vec![
            Cell::from(index + 1),
            Cell::from(info.name.as_deref().unwrap_or(key)),
            Cell::Int(info.words),
            Cell::Int(info_punctuation(info)),
            Cell::Int(info.ellipsis),
            Cell::Int(info.commands),
        ]);
    }
}

fn simple_row(index: Option<&str>, info: &InfoRecord) -> Row {
    vec![
        Cell::Empty,
        index.map(Cell::from).unwrap_or_default(),
        info.name.as_deref().map(Cell::from).unwrap_or_default(),
        Cell::Int(info.words),
        Cell::Int(info_punctuation(info)),
        Cell::Int(info.ellipsis),
        Cell::Int(info.commands),
    ]
}

fn gen_simple_data(sheet: &mut Sheet, node: &CountNode) {
    let title_bar = [
        "Title",
        WORDS_LABEL,
        PUNCTUATION_LABEL,
        ELLIPSIS_LABEL,
        COMMANDS_LABEL,
    ]
    .map(Cell::from);

    if let Some(last) = sheet.last_mut() {
        last.push(Cell::Empty);
        last.extend(title_bar.clone());
    }
    sheet.push(simple_row(None, &node.info));

    for (item_key, item) in &node.items {
        sheet.push(Row::new());

        let mut title = vec![Cell::from(item_key.as_str()), Cell::Empty];
        title.extend(title_bar.clone());
        sheet.push(title);

        if item.items.len() > 1 {
            sheet.push(simple_row(None, &item.info));
        }

        for (key, child) in &item.items {
            sheet.push(simple_row(Some(key.as_str()), &child.info));
        }
    }
}

fn gen_detail_data(tab: usize, node: &CountNode, sheet: &mut Sheet) {
    let info = &node.info;

    if info.words + info_punctuation(info) == 0 {
        return;
    }

    if node.items.len() == 1 {
        if let Some(name) = &info.name {
            let mut row = indent(tab);
            row.extend([Cell::from("Title"), Cell::from(name.as_str())]);
            sheet.push(row);
        }
    } else {
        gen_info_data(tab, info, sheet, Some(DETAIL_TOP_SPEAKERS));
    }

    for (key, child) in &node.items {
        let mut row = indent(tab);
        row.push(Cell::from(key.as_str()));
        sheet.push(row);

        gen_detail_data(tab + 1, child, sheet);
    }
}

/// Renders a count tree into the overview, simple and per-entry-type detail
/// sheets.
pub struct ReportBuilder<'a> {
    resolver: MergeResolver<'a>,
}

impl<'a> ReportBuilder<'a> {
    #[must_use]
    pub fn new(spec: &'a AliasMergeSpec) -> Self {
        Self {
            resolver: MergeResolver::new(spec),
        }
    }

    /// Builds every sheet. `count` itself is left untouched: aliases are merged
    /// on a copy of its root speaker table.
    #[must_use]
    pub fn build(&self, count: &CountNode, info: &ReportInfo) -> Report {
        let mut root = count.info.clone();
        self.resolver.merge(&mut root.counter);

        let mut overview_sheets = Vec::with_capacity(count.items.len() + 3);
        let mut simple_sheets = Vec::with_capacity(count.items.len());
        let mut detail_sheets = IndexMap::with_capacity(count.items.len());
        let mut groups: IndexMap<String, CountNode> = IndexMap::new();

        let mut sheet = Sheet::new();
        add_info_data(info, &mut sheet);
        sheet.push(vec![Cell::from("ALL")]);
        gen_info_data(0, &root, &mut sheet, Some(OVERVIEW_TOP_SPEAKERS));
        amend_sheet(&mut sheet);
        overview_sheets.push(sheet);

        for (entry_type, node) in &count.items {
            let mut detail = vec![vec![Cell::from(entry_type.as_str())]];
            gen_detail_data(0, node, &mut detail);
            amend_sheet(&mut detail);
            detail_sheets.insert(entry_type.clone(), detail);

            let mut simple = vec![vec![Cell::from(entry_type.as_str())]];
            gen_simple_data(&mut simple, node);
            amend_sheet(&mut simple);
            simple_sheets.push(simple);

            let mut overview = vec![vec![Cell::from(entry_type.as_str())]];
            gen_overview_data(&mut overview, &node.items, SortKey::Words);
            amend_sheet(&mut overview);
            overview_sheets.push(overview);

            for (group_key, group) in &node.items {
                if let Some(existing) = groups.get_mut(group_key) {
                    existing.info.words += group.info.words;
                    existing.info.punctuation += group.info.punctuation;
                    existing.info.ellipsis += group.info.ellipsis;
                    existing.info.commands += group.info.commands;
                } else {
                    groups.insert(group_key.clone(), CountNode::new(group.info.clone()));
                }
            }
        }

        let mut merged = vec![vec![Cell::from("Merged")]];
        gen_overview_data(&mut merged, &groups, SortKey::Commands);
        amend_sheet(&mut merged);
        overview_sheets.push(merged);

        let mut counter = vec![vec![Cell::from("Counter")]];
        gen_sorted_counter_data(0, &root, &mut counter, None, false);
        amend_sheet(&mut counter);
        overview_sheets.push(counter);

        let mut sheets = IndexMap::with_capacity(detail_sheets.len() + 2);
        sheets.insert(OVERVIEW_SHEET.to_owned(), merge_sheets(overview_sheets));
        sheets.insert(SIMPLE_SHEET.to_owned(), merge_sheets(simple_sheets));
        sheets.extend(detail_sheets);

        Report { sheets }
    }
}

fn write_csv_cell<W: Write>(writer: &mut W, cell: &Cell) -> std::io::Result<()> {
    let text = cell.to_string();

    if text.contains([',', '"', '\n']) {
        write!(writer, "\"{}\"", text.replace('"', "\"\""))
    } else {
        writer.write_all(text.as_bytes())
    }
}

fn write_sheet(path: &Path, sheet: &Sheet) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    for row in sheet {
        for (index, cell) in row.iter().enumerate() {
            if index > 0 {
                writer.write_all(b",")?;
            }
            write_csv_cell(&mut writer, cell)?;
        }
        writer.write_all(b"\n")?;
    }

    writer.flush()
}

/// Writes one CSV per sheet, named `<output stem>_<YYYYMMDD>_<sheet>.csv`,
/// next to `output`. Returns the written paths.
pub fn write_csv(report: &Report, output: &Path, date: NaiveDate) -> Result<Vec<PathBuf>, Error> {
    let dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    create_dir_all(dir).map_err(|e| Error::Io(dir.to_path_buf(), e))?;

    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let stamp = date.format("%Y%m%d");

    let mut written = Vec::with_capacity(report.sheets.len());

    for (name, sheet) in &report.sheets {
        let name = name.replace(['/', '\\'], "_");
        let path = dir.join(format!("{stem}_{stamp}_{name}.{CSV_EXTENSION}"));

        write_sheet(&path, sheet).map_err(|e| Error::Io(path.clone(), e))?;
        written.push(path);
    }

    Ok(written)
}
