//! Log File Schema Registry
//!
//! Static definitions for the supported tracking database file formats.
//! A tracking database is one plain-text file per calendar day. The first
//! non-blank line declares a format version; every subsequent line is a
//! comment (`#`), a string-table definition (`d`), or a data record whose
//! space-separated columns follow the layout registered here.
//!
//! ## Column Layout
//!
//! | index | column       | since |
//! |-------|--------------|-------|
//! | 0     | type         | 3.0   |
//! | 1     | startTime    | 3.0   |
//! | 2     | duration     | 3.0   |
//! | 3     | language     | 3.0   |
//! | 4     | path/command | 3.0   |
//! | 5     | project      | 3.0   |
//! | 6     | computer     | 3.0   |
//! | 7     | vcsType      | 4.0   |
//! | 8     | vcsRepo      | 4.0   |
//! | 9     | vcsBranch    | 4.0   |
//! | 10    | line         | 4.0   |
//! | 11    | char         | 4.0   |
//! | 12    | r1           | 4.0 (optional) |
//! | 13    | r2           | 4.0 (optional) |
//!
//! Version 3.0 lines have exactly [`COLUMN_COUNT_3`] columns. Version 4.0
//! lines have between [`COLUMN_COUNT_4_MIN`] and [`COLUMN_COUNT_4_MAX`].
//! Everything in this module is immutable process-wide configuration;
//! unknown version strings are a schema error, never silently tolerated.

/// Column separator inside one data line.
pub const SPLIT_COLUMN: char = ' ';

/// Line separator inside one database file.
pub const SPLIT_LINE: char = '\n';

/// Version strings this engine understands.
pub const SUPPORTED_VERSIONS: &[&str] = &["3.0", "4.0"];

/// Column count of a version 3.0 data line.
pub const COLUMN_COUNT_3: usize = 7;

/// Minimum column count of a version 4.0 data line (3.0 columns + required
/// VCS/position columns).
pub const COLUMN_COUNT_4_MIN: usize = COLUMN_COUNT_3 + 5;

/// Maximum column count of a version 4.0 data line (adds the optional chat
/// payload columns `r1`/`r2`).
pub const COLUMN_COUNT_4_MAX: usize = COLUMN_COUNT_4_MIN + 2;

/// Column indexes, in the fixed order data lines use.
pub mod col {
    pub const TYPE: usize = 0;
    pub const START_TIME: usize = 1;
    pub const DURATION: usize = 2;
    pub const LANGUAGE: usize = 3;
    /// File path for file activity, command for terminal activity.
    pub const TARGET: usize = 4;
    pub const PROJECT: usize = 5;
    pub const COMPUTER: usize = 6;
    pub const VCS_TYPE: usize = 7;
    pub const VCS_REPO: usize = 8;
    pub const VCS_BRANCH: usize = 9;
}

/// A registered database file format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V3,
    V4,
}

impl Version {
    /// Look up a version header. Returns `None` for unregistered versions.
    pub fn from_header(header: &str) -> Option<Self> {
        match header {
            "3.0" => Some(Version::V3),
            "4.0" => Some(Version::V4),
            _ => None,
        }
    }

    /// Minimum number of columns a data line of this version may carry.
    pub fn min_columns(self) -> usize {
        match self {
            Version::V3 => COLUMN_COUNT_3,
            Version::V4 => COLUMN_COUNT_4_MIN,
        }
    }

    /// Maximum number of columns a data line of this version may carry.
    pub fn max_columns(self) -> usize {
        match self {
            Version::V3 => COLUMN_COUNT_3,
            Version::V4 => COLUMN_COUNT_4_MAX,
        }
    }
}

/// Group-by dimension flags. Combine with `|`; [`group_by::ALL`] enables
/// every dimension.
pub mod group_by {
    pub const NONE: u32 = 0;
    pub const COMPUTER: u32 = 1 << 0;
    pub const PROJECT: u32 = 1 << 1;
    pub const FILE: u32 = 1 << 2;
    pub const LANGUAGE: u32 = 1 << 3;
    pub const TERMINAL: u32 = 1 << 4;
    pub const VCS: u32 = 1 << 5;
    pub const HOUR: u32 = 1 << 6;
    pub const DAY: u32 = 1 << 7;
    pub const ALL: u32 = COMPUTER | PROJECT | FILE | LANGUAGE | TERMINAL | VCS | HOUR | DAY;
}

/// Flag set converted once into enabled booleans; immutable for the duration
/// of one analysis pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupByRules {
    pub computer: bool,
    pub project: bool,
    pub file: bool,
    pub language: bool,
    pub terminal: bool,
    pub vcs: bool,
    pub hour: bool,
    pub day: bool,
}

impl GroupByRules {
    pub fn from_flags(flags: u32) -> Self {
        Self {
            computer: flags & group_by::COMPUTER != 0,
            project: flags & group_by::PROJECT != 0,
            file: flags & group_by::FILE != 0,
            language: flags & group_by::LANGUAGE != 0,
            terminal: flags & group_by::TERMINAL != 0,
            vcs: flags & group_by::VCS != 0,
            hour: flags & group_by::HOUR != 0,
            day: flags & group_by::DAY != 0,
        }
    }
}
