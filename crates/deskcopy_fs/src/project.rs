//! Copy the current project to the desktop, with overwrite confirmation.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;

use crate::copy::copy_tree;
use crate::desktop::resolve_desktop_path;
use crate::prompt::ConfirmOverwrite;
use crate::spec::{EnumProjectCopyOutcome, ProjectCopyError, SpecProjectCopyOptions};
use crate::util::{SpecCopyPatterns, is_overlap};

/// Copy `dir_source` to `<desktop>/<project name>`, skipping excluded entries.
///
/// When the destination already exists `confirm` decides between deleting it
/// and returning [`EnumProjectCopyOutcome::Cancelled`] without further I/O.
/// Name, base and pattern validation all happen before anything is deleted.
/// A failure after the delete leaves the destination absent or partial.
pub fn copy_project<P, C>(
    dir_source: P,
    spec_options: &SpecProjectCopyOptions,
    confirm: &mut C,
) -> Result<EnumProjectCopyOutcome, ProjectCopyError>
where
    P: AsRef<Path>,
    C: ConfirmOverwrite + ?Sized,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    log::info!("Project source directory: {}", path_dir_src.display());

    let c_project_name = derive_project_name(&path_dir_src)?;
    log::info!("Project name: {}", c_project_name.to_string_lossy());
    if !path_dir_src.is_dir() {
        return Err(ProjectCopyError::SourceNotFound(path_dir_src));
    }

    let path_dir_desktop = spec_options
        .path_dir_desktop
        .clone()
        .unwrap_or_else(resolve_desktop_path);
    if !path_dir_desktop.is_dir() {
        return Err(ProjectCopyError::DestinationNotFound(path_dir_desktop));
    }

    let path_dir_dst = path_dir_desktop.join(&c_project_name);
    log::info!("Destination directory: {}", path_dir_dst.display());

    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(ProjectCopyError::SourceDestinationOverlap {
            source: path_dir_src,
            destination: path_dir_dst,
        });
    }
    SpecCopyPatterns::from_raw(Some(&spec_options.patterns_exclude), spec_options.rule_pattern)?;

    if fs::symlink_metadata(&path_dir_dst).is_ok() {
        let b_overwrite = confirm
            .confirm_overwrite(&path_dir_dst)
            .map_err(|e| ProjectCopyError::UnexpectedError {
                path: path_dir_dst.clone(),
                message: e.to_string(),
            })?;
        if !b_overwrite {
            log::info!("Operation cancelled.");
            return Ok(EnumProjectCopyOutcome::Cancelled { path_dir_dst });
        }
        log::info!("Removing existing folder...");
        remove_existing(&path_dir_dst)?;
    }

    log::info!(
        "Copying '{}' to '{}' (excluding {:?})...",
        path_dir_src.display(),
        path_dir_dst.display(),
        spec_options.patterns_exclude
    );
    let report = copy_tree(&path_dir_src, &path_dir_dst, spec_options.to_copy_options())?;
    if let Some(spec_error) = report.first_error() {
        return Err(ProjectCopyError::from_io(
            spec_error.path.clone(),
            spec_error.kind,
            spec_error.exception.clone(),
        ));
    }

    log::info!("Copy completed successfully.");
    log::info!(
        "The project (without {:?}) is in: {}",
        spec_options.patterns_exclude,
        path_dir_dst.display()
    );
    log::debug!("{report}");
    Ok(EnumProjectCopyOutcome::Done {
        path_dir_dst,
        report,
    })
}

/// Final path component of `path_dir_src`, which must be non-empty.
///
/// The raw OS bytes are kept so the copy lands under the exact same name.
pub fn derive_project_name(path_dir_src: &Path) -> Result<OsString, ProjectCopyError> {
    path_dir_src
        .file_name()
        .filter(|name| !name.is_empty())
        .map(OsStr::to_os_string)
        .ok_or_else(|| ProjectCopyError::InvalidProjectName(path_dir_src.to_path_buf()))
}

fn remove_existing(path_dst: &Path) -> Result<(), ProjectCopyError> {
    let meta_dst = fs::symlink_metadata(path_dst)
        .map_err(|e| ProjectCopyError::from_io(path_dst.to_path_buf(), e.kind(), e.to_string()))?;
    let res_remove = if meta_dst.is_dir() {
        fs::remove_dir_all(path_dst)
    } else {
        fs::remove_file(path_dst)
    };
    res_remove
        .map_err(|e| ProjectCopyError::from_io(path_dst.to_path_buf(), e.kind(), e.to_string()))
}
