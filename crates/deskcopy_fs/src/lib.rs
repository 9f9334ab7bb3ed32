//! `deskcopy_fs`:
//! Copy a project directory to the desktop, skipping excluded entries.
//!
//! Modules:
//! - `copy`    : traversal and copy orchestration
//! - `project` : desktop copy with overwrite confirmation
//! - `desktop` : desktop folder discovery
//! - `prompt`  : yes/no overwrite prompt
//! - `spec`    : enums/options/errors
//! - `report`  : run-time report model
//! - `conf`    : constants and presets
//! - `util`    : shared helper functions

pub mod conf;
pub mod copy;
pub mod desktop;
pub mod project;
pub mod prompt;
pub mod report;
pub mod spec;
mod util;

pub use copy::copy_tree;
pub use desktop::{resolve_desktop_path, resolve_desktop_path_from};
pub use project::{copy_project, derive_project_name};
pub use prompt::{ConfirmOverwrite, ConsolePrompt};
pub use report::{ReportCopy, ReportCopyBuilder};
pub use spec::{
    CopyTreeError, EnumCopyPatternMode, EnumCopySymlinkStrategy, EnumProjectCopyOutcome,
    ProjectCopyError, SpecCopyError, SpecCopyOptions, SpecProjectCopyOptions,
};
