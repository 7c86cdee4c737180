use crate::{
    aggregator::Aggregator,
    cache::CacheData,
    config::Config,
    constants::{localization::*, *},
    functions::{collect_txt_files, parse_data_version, read_text, story_key},
    report::{write_csv, Report, ReportBuilder, ReportInfo},
    resolver::LineResolver,
    tables::Tables,
    tree::TreeBuilder,
    types::*,
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use log::{info, warn};
use std::{
    collections::HashSet,
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};

/// Scoped log section.
///
/// Logs its message on creation and `Done.` when dropped, indented by four
/// spaces per `depth`. A lowercase message is closed with `done.` instead.
pub struct Stage {
    depth: usize,
    lowercase: bool,
}

impl Stage {
    #[must_use]
    pub fn enter(depth: usize, message: &str) -> Self {
        info!("{}{message}", "    ".repeat(depth));

        Self {
            depth,
            lowercase: message.starts_with(|c: char| c.is_lowercase()),
        }
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        let done = if self.lowercase { "done." } else { "Done." };
        info!("{}{done}", "    ".repeat(self.depth));
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Game tables and story texts of a data directory.
#[derive(Debug, Default, Clone)]
pub struct Sources {
    pub tables: Tables,
    pub stories: IndexMap<String, StoryRecord>,
}

/// Counts words of one Arknights game data directory.
///
/// The service owns the loaded sources, the latest count tree and the
/// diagnostics of the last counting pass. The tree is persisted to the cache
/// file after every full pass, and reused on the next run while the game data
/// isn't newer than it.
///
/// # Example
/// ```no_run
/// use arknights_word_count::{CountFlags, GameDataService};
///
/// let mut service = GameDataService::open("./gamedata", "./tmp/count.cache").unwrap();
/// service.set_flags(CountFlags::Debug);
///
/// if service.need_update() {
///     service.update().unwrap();
/// }
/// ```
pub struct GameDataService {
    data_dir: PathBuf,
    cache_path: PathBuf,
    config: Config,
    flags: CountFlags,
    version: DataVersion,
    cache: Option<CacheData>,
    sources: Option<Sources>,
    diagnostics: Diagnostics,
    need_update: bool,
    updated: bool,
    counted: bool,
}

impl GameDataService {
    /// Opens a game data directory.
    ///
    /// Reads the data version and the cache at `cache_path`, if it exists. An
    /// unreadable cache is ignored and will be rebuilt by the next count.
    ///
    /// # Errors
    /// - [`Error::NotADirectory`] if `data_dir` isn't a directory.
    /// - [`Error::MissingVersionFile`] if `excel/data_version.txt` doesn't exist.
    /// - [`Error::InvalidVersion`] if the version file can't be parsed.
    pub fn open<P: AsRef<Path>, C: AsRef<Path>>(
        data_dir: P,
        cache_path: C,
    ) -> Result<Self, Error> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let cache_path = cache_path.as_ref().to_path_buf();

        if !data_dir.is_dir() {
            return Err(Error::NotADirectory(data_dir));
        }

        let version_path = data_dir.join(EXCEL_DIR).join(DATA_VERSION_FILE);

        if !version_path.is_file() {
            return Err(Error::MissingVersionFile(version_path));
        }

        let _stage = Stage::enter(0, LOADING_MSG);

        let version = parse_data_version(&read_text(&version_path)?)?;

        let cache = if cache_path.is_file() {
            CacheData::load(&cache_path)
                .inspect_err(|e| warn!("{CACHE_UNREADABLE_MSG}: {e}"))
                .ok()
        } else {
            None
        };

        let need_update = match &cache {
            Some(cache) if !version.is_newer_than(&cache.version) => false,
            Some(_) => {
                info!("{CACHE_IS_STALE_MSG}");
                true
            }
            None => true,
        };

        Ok(Self {
            data_dir,
            cache_path,
            config: Config::default(),
            flags: CountFlags::empty(),
            version,
            cache,
            sources: None,
            diagnostics: Diagnostics::default(),
            need_update,
            updated: false,
            counted: false,
        })
    }

    /// Sets the counting switches.
    ///
    /// - [`CountFlags::Debug`] collects unknown commands, heads and files, and
    ///   writes them next to the cache file.
    /// - [`CountFlags::CountInfo`] counts the text of story info files too.
    pub fn set_flags(&mut self, flags: CountFlags) {
        self.flags = flags;
    }

    /// Replaces the default known commands, fallback heads and alias tables.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    #[must_use]
    pub fn version(&self) -> &DataVersion {
        &self.version
    }

    /// Whether the game data is newer than the cached counts, or there are none.
    #[must_use]
    pub fn need_update(&self) -> bool {
        self.need_update
    }

    /// Latest count tree, either from the cache or from the last count.
    #[must_use]
    pub fn count_tree(&self) -> Option<&CountNode> {
        self.cache.as_ref().map(|cache| &cache.count)
    }

    #[must_use]
    pub fn sources(&self) -> Option<&Sources> {
        self.sources.as_ref()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn diagnostics_path(&self, suffix: &str) -> PathBuf {
        let stem = self
            .cache_path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();

        self.cache_path.with_file_name(format!("{stem}{suffix}"))
    }

    fn write_diagnostics(&self) -> Result<(), Error> {
        let lists = [
            (&self.diagnostics.commands, UNKNOWN_COMMANDS_SUFFIX),
            (&self.diagnostics.heads, UNKNOWN_HEADS_SUFFIX),
            (&self.diagnostics.files, UNKNOWN_FILES_SUFFIX),
        ];

        for (entries, suffix) in lists {
            if entries.is_empty() {
                continue;
            }

            let path = self.diagnostics_path(suffix);

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir_all(parent).map_err(|e| Error::Io(parent.to_path_buf(), e))?;
            }

            write(&path, Diagnostics::render(entries))
                .map_err(|e| Error::Io(path.clone(), e))?;
        }

        Ok(())
    }

    /// Reads one story file. An unreadable file is warned about, recorded
    /// and skipped.
    fn read_story(&mut self, path: &Path) -> Option<String> {
        read_text(path)
            .inspect_err(|e| {
                warn!("{STORY_UNREADABLE_MSG}: {e}");
                self.diagnostics.record_file(&display_path(path));
            })
            .ok()
    }

    /// Reads every story under `story/`.
    ///
    /// Info files under `story/[uc]info` are paired with the script at the same
    /// relative path. Scripts without an info file get an empty one.
    /// Unreadable files are skipped.
    fn crawl_stories(&mut self, depth: usize) -> Result<IndexMap<String, StoryRecord>, Error> {
        let _stage = Stage::enter(depth, UPDATING_STORY_MSG);

        let story_dir = self.data_dir.join(STORY_DIR);
        let info_dir = story_dir.join(INFO_DIR);

        let info_files = collect_txt_files(&info_dir)?;
        let mut script_files = collect_txt_files(&story_dir.join(ACTIVITIES_DIR))?;
        script_files.extend(collect_txt_files(&story_dir.join(OBT_DIR))?);

        let available: HashSet<&Path> = script_files.iter().map(PathBuf::as_path).collect();
        let mut paired: HashSet<PathBuf> = HashSet::new();
        let mut stories = IndexMap::with_capacity(script_files.len());

        for info_file in &info_files {
            let Some(key) = story_key(info_file, &info_dir) else {
                continue;
            };
            let Ok(relative) = info_file.strip_prefix(&info_dir) else {
                continue;
            };

            let script = story_dir.join(relative);

            let txt = if available.contains(script.as_path()) {
                let txt = self.read_story(&script);
                paired.insert(script);

                let Some(txt) = txt else {
                    continue;
                };
                txt
            } else {
                self.diagnostics.record_file(&display_path(&script));
                String::new()
            };

            let Some(info) = self.read_story(info_file) else {
                continue;
            };

            stories.insert(key, StoryRecord::new(info, txt));
        }

        for script in script_files.iter().filter(|file| !paired.contains(*file)) {
            let Some(key) = story_key(script, &story_dir) else {
                continue;
            };

            if let Some(txt) = self.read_story(script) {
                stories.insert(key, StoryRecord::new(String::new(), txt));
            }
        }

        info!("Loaded {} stories", stories.len());
        Ok(stories)
    }

    fn load_sources(&mut self, depth: usize) -> Result<(), Error> {
        let tables = Tables::load(&self.data_dir)?;
        let stories = self.crawl_stories(depth)?;

        self.sources = Some(Sources { tables, stories });
        Ok(())
    }

    /// Reloads the game tables and stories, then counts them.
    ///
    /// Does nothing if it was already called on this service.
    pub fn update(&mut self) -> Result<(), Error> {
        if self.updated {
            return Ok(());
        }
        self.updated = true;

        let _stage = Stage::enter(0, UPDATING_MSG);

        self.load_sources(1)?;
        self.count_at(1)
    }

    /// Counts the loaded stories into a new tree and stores it to the cache.
    ///
    /// Loads the sources first if [`GameDataService::update`] wasn't called.
    /// Does nothing if it was already called on this service.
    pub fn count(&mut self) -> Result<(), Error> {
        self.count_at(0)
    }

    fn count_at(&mut self, depth: usize) -> Result<(), Error> {
        if self.counted {
            return Ok(());
        }
        self.counted = true;

        let _stage = Stage::enter(depth, COUNTING_MSG);

        if self.sources.is_none() {
            self.load_sources(depth + 1)?;
        }

        let sources = self.sources.as_ref().ok_or(Error::NotLoaded)?;
        let debug = self.flags.contains(CountFlags::Debug);

        let resolver = LineResolver::new(&self.config, &sources.tables).debug(debug);
        let aggregator =
            Aggregator::new(resolver).count_info(self.flags.contains(CountFlags::CountInfo));

        let count = TreeBuilder::new(aggregator).debug(debug).build(
            &sources.tables,
            &sources.stories,
            &mut self.diagnostics,
        );

        let cache = CacheData::new(self.version.clone(), count);
        cache.store(&self.cache_path)?;

        self.cache = Some(cache);
        self.need_update = false;

        self.write_diagnostics()
    }

    /// Renders the latest count tree into report sheets.
    ///
    /// # Errors
    /// [`Error::NotLoaded`] if there's neither a cache nor a finished count.
    pub fn report(&self, document_date: NaiveDate) -> Result<Report, Error> {
        let count = self.count_tree().ok_or(Error::NotLoaded)?;

        let info = ReportInfo::new(
            env!("CARGO_PKG_DESCRIPTION"),
            env!("CARGO_PKG_VERSION"),
            &self.version,
            document_date,
        );

        Ok(ReportBuilder::new(&self.config.alias).build(count, &info))
    }

    /// Writes the report as CSV files next to `output`. Returns their paths.
    pub fn dump<P: AsRef<Path>>(
        &self,
        output: P,
        document_date: NaiveDate,
    ) -> Result<Vec<PathBuf>, Error> {
        let _stage = Stage::enter(0, DUMPING_MSG);

        let report = self.report(document_date)?;
        write_csv(&report, output.as_ref(), document_date)
    }
}
