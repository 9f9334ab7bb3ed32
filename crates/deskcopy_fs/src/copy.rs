//! Filesystem tree traversal and copy orchestration.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{CopyTreeError, EnumCopySymlinkStrategy, SpecCopyOptions};
use crate::util::{
    SpecCopyPatterns, apply_metadata, copy_file_bytes, create_symbolic_link,
    derive_destination_path, derive_dir_identifier, is_overlap, should_error_broken_symlink,
};

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: String,
    if_is_symlink: bool,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: String,
    if_is_symlink: bool,
}

#[derive(Debug)]
struct SpecCopyContext {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    spec_cp_options: SpecCopyOptions,
    spec_cp_pats: SpecCopyPatterns,
    builder_cp_report: ReportCopyBuilder,
    set_ancestor_dirs: HashSet<(u64, u64)>,
}

impl SpecCopyContext {
    fn should_stop(&self) -> bool {
        self.spec_cp_options.if_fail_fast && self.builder_cp_report.has_errors()
    }
}

/// Copy a directory tree from `dir_source` to `dir_destination`.
///
/// Every file or directory whose basename matches
/// [`SpecCopyOptions::patterns_exclude`] is skipped; an excluded directory is
/// never opened, so nothing below it is read or written.
///
/// This function performs:
/// 1. Pattern compilation and input validation.
/// 2. Destination root initialization.
/// 3. Depth-first traversal, copying entries as they are visited.
/// 4. Report aggregation.
///
/// Returns [`ReportCopy`] when the run completes (with possible per-entry errors
/// stored in the report; with `if_fail_fast` the walk stops after the first).
/// Returns [`CopyTreeError`] only for top-level setup and validation failures,
/// none of which touch the filesystem except `DestinationInitFailed`.
pub fn copy_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_cp_options: SpecCopyOptions,
) -> Result<ReportCopy, CopyTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    let spec_cp_pats = SpecCopyPatterns::from_raw(
        spec_cp_options.patterns_exclude.as_deref(),
        spec_cp_options.rule_pattern,
    )?;

    if !path_dir_src.is_dir() {
        return Err(CopyTreeError::SourceNotDirectory(path_dir_src));
    }
    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(CopyTreeError::SourceDestinationOverlap {
            source: path_dir_src,
            destination: path_dir_dst,
        });
    }
    fs::create_dir_all(&path_dir_dst).map_err(|e| CopyTreeError::DestinationInitFailed {
        path: path_dir_dst.clone(),
        kind: e.kind(),
        message: e.to_string(),
    })?;
    let meta_dir_dst =
        fs::symlink_metadata(&path_dir_dst).map_err(|e| CopyTreeError::DestinationInitFailed {
            path: path_dir_dst.clone(),
            kind: e.kind(),
            message: e.to_string(),
        })?;
    if meta_dir_dst.file_type().is_symlink() {
        return Err(CopyTreeError::DestinationInitFailed {
            path: path_dir_dst,
            kind: std::io::ErrorKind::InvalidInput,
            message: "Destination root path must not be a symbolic link.".to_string(),
        });
    }

    log::debug!(
        "copy_tree {} -> {} (exclude={:?})",
        path_dir_src.display(),
        path_dir_dst.display(),
        spec_cp_options.patterns_exclude
    );

    let mut spec_cp_ctx = SpecCopyContext {
        path_dir_src: path_dir_src.clone(),
        path_dir_dst: path_dir_dst.clone(),
        spec_cp_options,
        spec_cp_pats,
        builder_cp_report: ReportCopyBuilder::default(),
        set_ancestor_dirs: HashSet::new(),
    };

    walk_directory(&path_dir_src, &mut spec_cp_ctx);
    if !spec_cp_ctx.should_stop() {
        apply_dir_metadata(&path_dir_src, &path_dir_dst, &mut spec_cp_ctx);
    }

    let report = spec_cp_ctx.builder_cp_report.build();
    log::debug!("{report}");
    Ok(report)
}

fn apply_dir_metadata(path_dir_src: &Path, path_dir_dst: &Path, spec_cp_ctx: &mut SpecCopyContext) {
    if !spec_cp_ctx.spec_cp_options.if_preserve_metadata {
        return;
    }
    if let Err(e) = apply_metadata(path_dir_src, path_dir_dst) {
        spec_cp_ctx.builder_cp_report.add_warning(format!(
            "Failed to preserve metadata of {} ({e})",
            path_dir_dst.display()
        ));
    }
}

fn walk_directory(path_root: &Path, spec_cp_ctx: &mut SpecCopyContext) {
    if spec_cp_ctx.should_stop() {
        return;
    }

    // Only ancestors are tracked, so two links to one directory both copy.
    let mut tuple_dirs_identifier = None;
    if spec_cp_ctx.spec_cp_options.rule_symlink == EnumCopySymlinkStrategy::Dereference {
        match fs::metadata(path_root) {
            Ok(stat_root) => {
                tuple_dirs_identifier = derive_dir_identifier(&stat_root);
                if let Some(tuple_id) = tuple_dirs_identifier
                    && !spec_cp_ctx.set_ancestor_dirs.insert(tuple_id)
                {
                    spec_cp_ctx
                        .builder_cp_report
                        .add_warning(format!("Symlink loop detected: {}", path_root.display()));
                    return;
                }
            }
            Err(e) => {
                spec_cp_ctx
                    .builder_cp_report
                    .add_io_error(path_root.to_path_buf(), &e);
                return;
            }
        }
    }

    walk_directory_entries(path_root, spec_cp_ctx);

    if let Some(tuple_id) = tuple_dirs_identifier {
        spec_cp_ctx.set_ancestor_dirs.remove(&tuple_id);
    }
}

fn walk_directory_entries(path_root: &Path, spec_cp_ctx: &mut SpecCopyContext) {
    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            spec_cp_ctx
                .builder_cp_report
                .add_io_error(path_root.to_path_buf(), &e);
            return;
        }
    };
    let (mut l_dirs, mut l_files) = collect_dir_entries(path_root, iter_entries, spec_cp_ctx);

    l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
    l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

    for _dir_entry in l_dirs {
        if spec_cp_ctx.should_stop() {
            return;
        }
        let path_next = _dir_entry.path_dir_src_sub.clone();
        if let Some(path_dir_dst_sub) = handle_dir_entry(_dir_entry, spec_cp_ctx) {
            walk_directory(&path_next, spec_cp_ctx);
            if !spec_cp_ctx.should_stop() {
                apply_dir_metadata(&path_next, &path_dir_dst_sub, spec_cp_ctx);
            }
        }
    }

    for _file_entry in l_files {
        if spec_cp_ctx.should_stop() {
            return;
        }
        handle_file_entry(_file_entry, spec_cp_ctx);
    }
}

/// Split the entries of `path_root` into directories and files to copy.
///
/// A failing entry is recorded and skipped; its siblings are still collected.
fn collect_dir_entries<I>(
    path_root: &Path,
    iter_entries: I,
    spec_cp_ctx: &mut SpecCopyContext,
) -> (Vec<SpecDirEntry>, Vec<SpecFileEntry>)
where
    I: IntoIterator<Item = io::Result<fs::DirEntry>>,
{
    let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();

    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx
                    .builder_cp_report
                    .add_io_error(path_root.to_path_buf(), &e);
                continue;
            }
        };

        let path_entry = entry.path();
        let c_name = entry.file_name().to_string_lossy().to_string();

        spec_cp_ctx.builder_cp_report.add_scanned();
        if spec_cp_ctx.spec_cp_pats.is_active() && spec_cp_ctx.spec_cp_pats.should_exclude(&c_name) {
            log::debug!("excluded {}", path_entry.display());
            spec_cp_ctx.builder_cp_report.add_excluded();
            continue;
        }
        spec_cp_ctx.builder_cp_report.add_matched();

        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx.builder_cp_report.add_io_error(path_entry, &e);
                continue;
            }
        };

        let b_is_symlink = cfg_file_type.is_symlink();
        let b_is_dir = cfg_file_type.is_dir() || (b_is_symlink && path_entry.is_dir());
        if b_is_dir {
            l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
                name_dir: c_name,
                if_is_symlink: b_is_symlink,
            });
        } else if cfg_file_type.is_file() || b_is_symlink {
            l_files.push(SpecFileEntry {
                path_file_src: path_entry,
                name_file: c_name,
                if_is_symlink: b_is_symlink,
            });
        } else {
            spec_cp_ctx
                .builder_cp_report
                .add_warning(format!("Special file skipped: {}", path_entry.display()));
            spec_cp_ctx.builder_cp_report.add_skipped();
        }
    }

    (l_dirs, l_files)
}

/// Create the destination for one directory entry.
///
/// Returns the destination directory when the walk should descend into it.
fn handle_dir_entry(
    spec_dir_entry: SpecDirEntry,
    spec_cp_ctx: &mut SpecCopyContext,
) -> Option<PathBuf> {
    let path_dir_dst_sub = derive_destination_path(
        &spec_dir_entry.path_dir_src_sub,
        &spec_dir_entry.name_dir,
        &spec_cp_ctx.path_dir_src,
        &spec_cp_ctx.path_dir_dst,
    );

    if spec_dir_entry.if_is_symlink {
        match spec_cp_ctx.spec_cp_options.rule_symlink {
            EnumCopySymlinkStrategy::SkipSymlinks => {
                spec_cp_ctx.builder_cp_report.add_skipped();
                return None;
            }
            EnumCopySymlinkStrategy::CopySymlinks => {
                create_symbolic_link(
                    &spec_dir_entry.path_dir_src_sub,
                    &path_dir_dst_sub,
                    &mut spec_cp_ctx.builder_cp_report,
                );
                return None;
            }
            EnumCopySymlinkStrategy::Dereference => {}
        }
    }

    if let Err(e) = fs::create_dir_all(&path_dir_dst_sub) {
        spec_cp_ctx
            .builder_cp_report
            .add_io_error(path_dir_dst_sub, &e);
        return None;
    }
    spec_cp_ctx.builder_cp_report.add_copied();
    Some(path_dir_dst_sub)
}

fn handle_file_entry(spec_file_entry: SpecFileEntry, spec_cp_ctx: &mut SpecCopyContext) {
    let enum_rule_symlink = spec_cp_ctx.spec_cp_options.rule_symlink;
    let path_file_dst = derive_destination_path(
        &spec_file_entry.path_file_src,
        &spec_file_entry.name_file,
        &spec_cp_ctx.path_dir_src,
        &spec_cp_ctx.path_dir_dst,
    );

    if spec_file_entry.if_is_symlink {
        if enum_rule_symlink == EnumCopySymlinkStrategy::SkipSymlinks {
            spec_cp_ctx.builder_cp_report.add_skipped();
            return;
        }

        if should_error_broken_symlink(&spec_file_entry.path_file_src, enum_rule_symlink) {
            spec_cp_ctx.builder_cp_report.add_error(
                spec_file_entry.path_file_src.clone(),
                format!(
                    "Broken symlink: {}",
                    spec_file_entry.path_file_src.display()
                ),
            );
            return;
        }

        if enum_rule_symlink == EnumCopySymlinkStrategy::CopySymlinks {
            create_symbolic_link(
                &spec_file_entry.path_file_src,
                &path_file_dst,
                &mut spec_cp_ctx.builder_cp_report,
            );
            return;
        }

        let meta_file_src_target = match fs::metadata(&spec_file_entry.path_file_src) {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx
                    .builder_cp_report
                    .add_io_error(spec_file_entry.path_file_src, &e);
                return;
            }
        };
        if !meta_file_src_target.file_type().is_file() {
            spec_cp_ctx.builder_cp_report.add_warning(format!(
                "Special file target skipped: {}",
                spec_file_entry.path_file_src.display()
            ));
            spec_cp_ctx.builder_cp_report.add_skipped();
            return;
        }
    }

    if let Err(e) = copy_file_bytes(&spec_file_entry.path_file_src, &path_file_dst) {
        spec_cp_ctx
            .builder_cp_report
            .add_io_error(spec_file_entry.path_file_src, &e);
        return;
    }
    if spec_cp_ctx.spec_cp_options.if_preserve_metadata
        && let Err(e) = apply_metadata(&spec_file_entry.path_file_src, &path_file_dst)
    {
        spec_cp_ctx.builder_cp_report.add_warning(format!(
            "Failed to preserve metadata of {} ({e})",
            path_file_dst.display()
        ));
    }
    spec_cp_ctx.builder_cp_report.add_copied();
}
