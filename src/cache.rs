use crate::types::{CountNode, DataVersion, Error};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use serde::{Deserialize, Serialize};
use std::{
    fs::{create_dir_all, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Counts persisted between runs, tagged with the data version they were
/// counted from.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheData {
    pub version: DataVersion,
    pub count: CountNode,
}

impl CacheData {
    #[must_use]
    pub fn new(version: DataVersion, count: CountNode) -> Self {
        Self { version, count }
    }

    /// Reads a zlib-compressed JSON cache.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
        let decoder = ZlibDecoder::new(BufReader::new(file));
        Ok(serde_json::from_reader(decoder)?)
    }

    /// Writes the cache, creating parent directories if needed.
    pub fn store(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent).map_err(|e| Error::Io(parent.to_path_buf(), e))?;
        }

        let file = File::create(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
        let mut encoder = ZlibEncoder::new(BufWriter::new(file), Compression::default());

        serde_json::to_writer(&mut encoder, self)?;

        encoder
            .finish()
            .and_then(|mut writer| writer.flush())
            .map_err(|e| Error::Io(path.to_path_buf(), e))
    }
}
