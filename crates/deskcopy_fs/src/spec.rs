//! Copy specification models and top-level error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::conf::{TUP_PATTERNS_EXCLUDE_DEFAULT, TUP_PATTERNS_EXCLUDE_WEB};
use crate::report::ReportCopy;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Symlink handling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopySymlinkStrategy {
    /// Follow the link and copy the target bytes/entries.
    Dereference,
    /// Create a symbolic link at destination (do not copy target bytes).
    CopySymlinks,
    /// Ignore symlink entries.
    SkipSymlinks,
}

/// Pattern matching mode for the exclusion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes), read like
    /// `fnmatch`: an unclosed `[` and braces are literal characters.
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Exact base name match.
    Literal,
}

/// Terminal state of a project copy that did not fail.
#[derive(Debug)]
pub enum EnumProjectCopyOutcome {
    /// Tree copied into `path_dir_dst`.
    Done {
        /// Final destination directory.
        path_dir_dst: PathBuf,
        /// Counters and diagnostics of the copy.
        report: ReportCopy,
    },
    /// Destination existed and the user declined to overwrite it.
    Cancelled {
        /// Destination directory left untouched.
        path_dir_dst: PathBuf,
    },
}

impl EnumProjectCopyOutcome {
    /// Destination directory of this run, copied or not.
    pub fn path_dir_dst(&self) -> &PathBuf {
        match self {
            Self::Done { path_dir_dst, .. } => path_dir_dst,
            Self::Cancelled { path_dir_dst } => path_dir_dst,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `copy_tree`.
#[derive(Debug, Clone)]
pub struct SpecCopyOptions {
    /// Exclude patterns applied to file and directory basenames at every depth.
    pub patterns_exclude: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumCopyPatternMode,
    /// Symlink handling behavior.
    pub rule_symlink: EnumCopySymlinkStrategy,
    /// Copy permissions, timestamps and xattrs (best-effort).
    pub if_preserve_metadata: bool,
    /// Stop the walk at the first recorded per-entry error.
    pub if_fail_fast: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            patterns_exclude: None,
            rule_pattern: EnumCopyPatternMode::Glob,
            rule_symlink: EnumCopySymlinkStrategy::CopySymlinks,
            if_preserve_metadata: true,
            if_fail_fast: false,
        }
    }
}

/// Input options for `copy_project`.
#[derive(Debug, Clone)]
pub struct SpecProjectCopyOptions {
    /// Exclude patterns applied to every entry basename.
    pub patterns_exclude: Vec<String>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumCopyPatternMode,
    /// Symlink handling behavior.
    pub rule_symlink: EnumCopySymlinkStrategy,
    /// Destination base directory; `None` probes for a desktop folder.
    pub path_dir_desktop: Option<PathBuf>,
}

impl Default for SpecProjectCopyOptions {
    fn default() -> Self {
        Self {
            patterns_exclude: TUP_PATTERNS_EXCLUDE_DEFAULT
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rule_pattern: EnumCopyPatternMode::Glob,
            rule_symlink: EnumCopySymlinkStrategy::Dereference,
            path_dir_desktop: None,
        }
    }
}

impl SpecProjectCopyOptions {
    /// Defaults with the web-project exclusion preset
    /// ([`TUP_PATTERNS_EXCLUDE_WEB`]).
    pub fn web() -> Self {
        Self {
            patterns_exclude: TUP_PATTERNS_EXCLUDE_WEB.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Derive engine options for one project copy.
    pub fn to_copy_options(&self) -> SpecCopyOptions {
        SpecCopyOptions {
            patterns_exclude: Some(self.patterns_exclude.clone()),
            rule_pattern: self.rule_pattern,
            rule_symlink: self.rule_symlink,
            if_preserve_metadata: true,
            if_fail_fast: true,
        }
    }
}

/// One copy failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// IO error category, `Other` for non-IO failures.
    pub kind: io::ErrorKind,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors (input validation / setup stage).
#[derive(Debug)]
pub enum CopyTreeError {
    /// Invalid exclusion pattern.
    InvalidPattern(String),
    /// Source path is not a directory.
    SourceNotDirectory(PathBuf),
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    SourceDestinationOverlap {
        /// Normalized source directory.
        source: PathBuf,
        /// Normalized destination directory.
        destination: PathBuf,
    },
    /// Destination directory initialization failed.
    DestinationInitFailed {
        /// Destination path that failed initialization.
        path: PathBuf,
        /// Underlying IO error category.
        kind: io::ErrorKind,
        /// Underlying IO error text.
        message: String,
    },
}

impl fmt::Display for CopyTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern(msg) => write!(f, "{msg}"),
            Self::SourceNotDirectory(path) => {
                write!(f, "Source is not a directory: {}", path.display())
            }
            Self::SourceDestinationOverlap {
                source,
                destination,
            } => write!(
                f,
                "Source and destination directories overlap: {} <-> {}",
                source.display(),
                destination.display()
            ),
            Self::DestinationInitFailed { path, message, .. } => {
                write!(
                    f,
                    "Failed to initialize destination {}: {message}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for CopyTreeError {}

/// Errors ending a project copy in the `Failed` state.
#[derive(Debug)]
pub enum ProjectCopyError {
    /// Source path has no usable final segment.
    InvalidProjectName(PathBuf),
    /// Source path is missing or not a directory.
    SourceNotFound(PathBuf),
    /// Resolved destination base is missing or not a directory.
    DestinationNotFound(PathBuf),
    /// Destination would live inside the source, or the reverse.
    SourceDestinationOverlap {
        /// Project source directory.
        source: PathBuf,
        /// Computed destination directory.
        destination: PathBuf,
    },
    /// Invalid exclusion pattern.
    InvalidPattern(String),
    /// Permission denied while deleting or copying.
    PermissionError {
        /// Offending path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// Any other IO or environment failure.
    UnexpectedError {
        /// Offending path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
}

impl ProjectCopyError {
    /// Classify an IO failure on `path` into the permission/unexpected split.
    pub fn from_io(path: PathBuf, kind: io::ErrorKind, message: String) -> Self {
        match kind {
            io::ErrorKind::PermissionDenied => Self::PermissionError { path, message },
            _ => Self::UnexpectedError { path, message },
        }
    }
}

impl fmt::Display for ProjectCopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProjectName(path) => write!(
                f,
                "Unable to determine the project name from: {}",
                path.display()
            ),
            Self::SourceNotFound(path) => {
                write!(f, "Source directory not found: {}", path.display())
            }
            Self::DestinationNotFound(path) => write!(
                f,
                "Desktop path '{}' is invalid or was not found",
                path.display()
            ),
            Self::SourceDestinationOverlap {
                source,
                destination,
            } => write!(
                f,
                "Source and destination directories overlap: {} <-> {}",
                source.display(),
                destination.display()
            ),
            Self::InvalidPattern(msg) => write!(f, "{msg}"),
            Self::PermissionError { path, message } => {
                write!(f, "Permission problem on {}: {message}", path.display())
            }
            Self::UnexpectedError { path, message } => {
                write!(f, "Unexpected error on {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ProjectCopyError {}

impl From<CopyTreeError> for ProjectCopyError {
    fn from(e: CopyTreeError) -> Self {
        match e {
            CopyTreeError::InvalidPattern(msg) => Self::InvalidPattern(msg),
            CopyTreeError::SourceNotDirectory(path) => Self::SourceNotFound(path),
            CopyTreeError::SourceDestinationOverlap {
                source,
                destination,
            } => Self::SourceDestinationOverlap {
                source,
                destination,
            },
            CopyTreeError::DestinationInitFailed {
                path,
                kind,
                message,
            } => Self::from_io(path, kind, message),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
