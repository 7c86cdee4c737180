use crate::{
    constants::{ATTRIBUTE_TRIM, TXT_EXTENSION},
    types::{DataDate, DataVersion, Error},
};
use encoding_rs::{Encoding, GB18030, UTF_8};
use std::{
    fs::{read, read_dir},
    path::{Path, PathBuf},
};

/// Reads a text file, dropping its Byte Order Mark if there's any.
///
/// Files without a BOM are decoded as UTF-8 and fall back to GB18030 when
/// they aren't valid UTF-8.
pub fn read_text<P: AsRef<Path>>(file_path: P) -> Result<String, Error> {
    let file_path = file_path.as_ref();
    let bytes = read(file_path).map_err(|e| Error::Io(file_path.to_path_buf(), e))?;

    if let Some((encoding, bom_length)) = Encoding::for_bom(&bytes) {
        let (content, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return Ok(content.into_owned());
    }

    let (content, had_errors) = UTF_8.decode_without_bom_handling(&bytes);

    if !had_errors {
        return Ok(content.into_owned());
    }

    let (content, _) = GB18030.decode_without_bom_handling(&bytes);
    Ok(content.into_owned())
}

/// Value of the first `key=value` pair of a command's arguments, with quotes,
/// spaces and closing parentheses trimmed.
///
/// Returns [`None`] if the first argument has no `=`.
#[inline]
pub fn get_attribute(command: &str) -> Option<&str> {
    let first = command.split(',').next()?;
    let value = first.split('=').nth(1)?;
    Some(value.trim_matches(ATTRIBUTE_TRIM))
}

/// Parses `data_version.txt` contents.
///
/// The version is the dotted number after the last `:`, the date is the
/// second-to-last whitespace separated token in `YYYY/MM/DD` form.
pub fn parse_data_version(content: &str) -> Result<DataVersion, Error> {
    let invalid = || Error::InvalidVersion(content.trim().to_owned());

    let version_str = content.rsplit(':').next().ok_or_else(invalid)?.trim();
    let version = version_str
        .split('.')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;

    let tokens: Vec<&str> = content.split_whitespace().collect();
    let date_str = tokens
        .len()
        .checked_sub(2)
        .and_then(|i| tokens.get(i))
        .ok_or_else(invalid)?;

    let mut parts = date_str.trim().split(['/', '-']);
    let mut next = || parts.next().and_then(|part| part.parse::<u16>().ok());

    let date = match (next(), next(), next()) {
        (Some(year), Some(month), Some(day)) => DataDate {
            year,
            month: u8::try_from(month).map_err(|_| invalid())?,
            day: u8::try_from(day).map_err(|_| invalid())?,
        },
        _ => return Err(invalid()),
    };

    Ok(DataVersion { version, date })
}

/// Recursively collects `.txt` files under `dir`, sorted by path.
///
/// A missing directory yields no files.
pub fn collect_txt_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();

    if !dir.is_dir() {
        return Ok(files);
    }

    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = read_dir(&current).map_err(|e| Error::Io(current.clone(), e))?;

        for entry in entries.flatten() {
            let path = entry.path();

            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == TXT_EXTENSION) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Story key of `file`: its path relative to `base`, without extension, with
/// `/` separators.
pub fn story_key(file: &Path, base: &Path) -> Option<String> {
    let relative = file.strip_prefix(base).ok()?.with_extension("");
    let parts: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect();

    Some(parts.join("/"))
}
