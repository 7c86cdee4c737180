use anyhow::{Context, Result};
use arknights_word_count::{
    config::Config,
    constants::{DEFAULT_CACHE_PATH, DEFAULT_DATA_DIR, DEFAULT_OUTPUT_PATH},
    CountFlags, GameDataService,
};
use chrono::Local;
use clap::Parser;
use log::info;
use simplelog::{ColorChoice, CombinedLogger, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Arknights game data directory.
    data_dir: Option<PathBuf>,

    /// Reload stories and count them.
    #[arg(short, long)]
    update: bool,

    /// Count words.
    #[arg(short, long)]
    count: bool,

    /// Collect unknown commands, heads and files.
    #[arg(short, long)]
    debug: bool,

    /// Count the words of story info files too.
    #[arg(long)]
    count_info: bool,

    /// Don't write the report.
    #[arg(long)]
    no_dump: bool,

    /// JSON file overriding known commands, fallback heads and aliases.
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_CACHE_PATH)]
    cache: PathBuf,

    /// Report path. Sheets are written as `<stem>_<date>_<sheet>.csv` next to it.
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    CombinedLogger::init(vec![TermLogger::new(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])?;

    let data_dir = args.data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let mut service = GameDataService::open(&data_dir, &args.cache)
        .with_context(|| format!("Couldn't open {}", data_dir.display()))?;

    if let Some(path) = &args.config {
        service.set_config(Config::from_path(path)?);
    }

    let mut flags = CountFlags::empty();
    flags.set(CountFlags::Debug, args.debug);
    flags.set(CountFlags::CountInfo, args.count_info);
    service.set_flags(flags);

    if args.update || service.need_update() {
        service.update()?;
    } else {
        info!("No need to update!");
    }

    if args.count {
        service.count()?;
    }

    if args.no_dump {
        return Ok(());
    }

    let written = service.dump(&args.output, Local::now().date_naive())?;

    for path in written {
        info!("Wrote {}", path.display());
    }

    Ok(())
}
