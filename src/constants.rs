use const_format::formatcp;
use phf::phf_set;

pub(crate) mod localization {
    pub const LOADING_MSG: &str = "loading...";
    pub const UPDATING_MSG: &str = "updating...";
    pub const UPDATING_STORY_MSG: &str = "updating story...";
    pub const COUNTING_MSG: &str = "counting words...";
    pub const DUMPING_MSG: &str = "start dumping...";

    pub const CACHE_IS_STALE_MSG: &str =
        "Cached counts are older than the game data, an update is required.";
    pub const CACHE_UNREADABLE_MSG: &str =
        "Couldn't read the cache file, it will be rebuilt";
    pub const HEAD_NOT_FOUND_MSG: &str = "Character was not found in handbook";
    pub const VARIABLE_NOT_FOUND_MSG: &str = "Story variable was not found";
    pub const STORY_NOT_FOUND_MSG: &str =
        "Story is referenced by the review table, but wasn't loaded";
    pub const STORY_UNREADABLE_MSG: &str = "Couldn't read story file, skipping it";
    pub const NO_HEAD_PREFIX: &str = "no head: ";
}

/// Speaker used for lines without an explicit character.
pub const ASIDE_NAME: &str = "『旁白』";
/// Speaker of every decision/branch line.
pub const DOCTOR_NAME: &str = "Dr.";
/// Command given to lines that have none.
pub const ASIDE_COMMAND: &str = formatcp!("name=\"{ASIDE_NAME}\"");

/// Reported separately from the rest of the punctuation.
pub const ELLIPSIS: char = '…';
pub const ELLIPSIS_STR: &str = "…";

pub const CHARACTER_ID_PREFIX: &str = "char";
pub const CHARACTER_SLOT_PREFIX: &str = "[character";
pub const NAME_PAREN_PREFIX: &str = "(name";
pub const CODENAME_LABEL: &str = "【代号】";
pub const VARIABLE_SIGIL: char = '$';

pub const ATTRIBUTE_TRIM: &[char] = &[' ', '\'', '"', ')'];
pub const OPTION_KEY: &str = "option";
pub const TEXT_KEY: &str = "text";
pub const HEAD_KEY: &str = "head";

/// Separators of names like `A&B`, which are counted for every part.
pub const NAME_SEPARATORS: &[char] = &['&', '＆', '/'];
pub const MERGED_NAME_SEPARATOR: &str = "/";

/// Directories whose stories are never counted in the path-keyed tree.
pub const EXCLUDED_DIRNAMES: phf::Set<&'static str> = phf_set! {
    "guide", "tutorial", "training", "act1bossrush", "bossrush",
};

/// ASCII punctuation plus the Chinese punctuation set, without [`ELLIPSIS`].
pub const PUNCTUATION: phf::Set<char> = phf_set! {
    '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    ':', ';', '<', '=', '>', '?', '@', '[', '\\', ']', '^', '_', '`', '{', '|',
    '}', '~',
    '＂', '＃', '＄', '％', '＆', '＇', '（', '）', '＊', '＋', '，', '－', '／',
    '：', '；', '＜', '＝', '＞', '＠', '［', '＼', '］', '＾', '＿', '｀', '｛',
    '｜', '｝', '～', '｟', '｠', '｢', '｣', '､', '\u{3000}', '、', '〃', '〈',
    '〉', '《', '》', '「', '」', '『', '』', '【', '】', '〔', '〕', '〖', '〗',
    '〘', '〙', '〚', '〛', '〜', '〝', '〞', '〟', '〰', '〾', '〿', '–', '—',
    '‘', '’', '‛', '“', '”', '„', '‟', '‧', '﹏', '﹑', '﹔', '·',
    '！', '？', '｡', '。',
};

/// Stage directions. Script authors misspell these consistently, so the
/// typos are part of the vocabulary.
pub const KNOWN_COMMANDS: &[&str] = &[
    "AddItem", "background", "Background", "backgroundtween", "backgroundTween",
    "Backgroundtween", "BackgroundTween", "bgeffect", "bgEffect", "blocker",
    "Blocker", "cameraEffect", "CameraEffect", "camerashake", "CameraShake",
    "cgitem", "chaa", "character", "Character", "characteraction",
    "Characteraction", "CharacterCutin", "charslot", "Charslot", "charslsot",
    "Condition", "ConsumeGuideOnStoryEnd", "curtain", "dalay", "daley", "dealy",
    "delat", "delau", "delay", "Delay", "delay9ti", "delayt", "dialo", "effect",
    "Effect", "End", "fadetime", "GotoPage", "gridbg", "header", "hidecgitem",
    "hideitem", "hideItem", "HideItem", "image", "Image", "imagerotate",
    "imageTween", "ImageTween", "largebg", "largebgtween", "musicvolume",
    "Musicvolume", "MusicVolume", "musicvolune", "Obtain", "OptionBranch",
    "palysound", "playmusic", "playMusic", "PlayMusic", "playsound", "playSound",
    "PlaySound", "predicate", "Predicate", "SetConditionProgress", "showitem",
    "Showitem", "ShowItem", "skipnode", "SkipToThis", "soundvolume",
    "soundVolume", "SoundVolume", "StartBattle", "stickerclear", "stopmucis",
    "stopmusic", "Stopmusic", "StopMusic", "stopsound", "stopSound", "Stopsound",
    "StopSound", "subtitle", "theater", "timerclear", "timersticker", "Tutorial",
    "verticalbg", "Video", "withdraw",
];

/// Known character IDs that have no handbook entry.
pub const FALLBACK_HEADS: &[(&str, &str)] = &[("char_340_shwazr6", "黑")];

pub const NAME_PREFIXES: &[&str] = &["发言人", "审判官", "大审判官", "无言的", "小"];
pub const NAME_SUFFIXES: &[&str] = &["骑士", "？"];
pub const EXCLUDED_NAMES: &[&str] = &["小黑", "教宗骑士", "感染者骑士"];
pub const ALIAS_GROUPS: &[&[&str]] = &[
    &["？？？？", "？？？", "？？", "？"],
    &["“焰尾”索娜", "“焰尾”骑士", "索娜"],
    &["伊万杰利斯塔十一世", "教宗"],
    &["博士", "Dr."],
    &["埃尼斯", "苍苔"],
    &["塞诺蜜", "砾"],
    &["审判官艾丽妮", "艾丽妮"],
    &["微光守夜人", "不叫微光守夜人的黎博利", "菲亚梅塔"],
    &["恩希欧迪斯", "银灰"],
    &["玛嘉烈", "临光"],
    &["玛莉娅", "瑕光"],
    &["祖玛玛", "森蚺"],
    &["阿黛尔", "艾雅法拉"],
    &["陈晖洁", "陈"],
];

pub const EXCEL_DIR: &str = "excel";
pub const STORY_DIR: &str = "story";
pub const INFO_DIR: &str = "[uc]info";
pub const ACTIVITIES_DIR: &str = "activities";
pub const OBT_DIR: &str = "obt";
pub const TXT_EXTENSION: &str = "txt";

pub const DATA_VERSION_FILE: &str = "data_version.txt";
pub const ACTIVITY_TABLE_FILE: &str = "activity_table.json";
pub const HANDBOOK_INFO_TABLE_FILE: &str = "handbook_info_table.json";
pub const STORY_REVIEW_TABLE_FILE: &str = "story_review_table.json";
pub const STORY_VARIABLES_FILE: &str = "story_variables.json";

pub const UNKNOWN_COMMANDS_SUFFIX: &str =
    formatcp!("_unknown_commands.{TXT_EXTENSION}");
pub const UNKNOWN_HEADS_SUFFIX: &str = formatcp!("_unknown_heads.{TXT_EXTENSION}");
pub const UNKNOWN_FILES_SUFFIX: &str = formatcp!("_unknown_files.{TXT_EXTENSION}");

pub const DEFAULT_CACHE_PATH: &str = "./tmp/Arknights_Word_Count.cache";
pub const DEFAULT_OUTPUT_PATH: &str = "./docs/Arknights_Word_Count.xlsx";
pub const CSV_EXTENSION: &str = "csv";

pub const PROGRESS_STEP: usize = 1000;

pub const WORDS_LABEL: &str = "字词数";
pub const PUNCTUATION_LABEL: &str = "标点数";
pub const ELLIPSIS_LABEL: &str = "省略号";
pub const COMMANDS_LABEL: &str = "指令数";

pub const PROGRAM_VERSION_LABEL: &str = "程序版本";
pub const DATA_VERSION_LABEL: &str = "数据版本";
pub const DATA_DATE_LABEL: &str = "数据日期";
pub const DOCUMENT_DATE_LABEL: &str = "文档日期";

pub const OVERVIEW_SHEET: &str = "概观";
pub const SIMPLE_SHEET: &str = "总览";

/// Speakers listed under the `ALL` block of the overview.
pub const OVERVIEW_TOP_SPEAKERS: usize = 13;
/// Speakers listed under every node of a detail sheet.
pub const DETAIL_TOP_SPEAKERS: usize = 10;

pub const DEFAULT_DATA_DIR: &str = "./ArknightsGameData/zh_CN/gamedata";
