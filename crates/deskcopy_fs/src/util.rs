use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::report::ReportCopyBuilder;
use crate::spec::{CopyTreeError, EnumCopyPatternMode, EnumCopySymlinkStrategy};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeCopyPatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

/// Compiled exclusion list, evaluated against entry basenames.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpecCopyPatterns {
    pub(crate) patterns_exclude: Option<TypeCopyPatternSeq>,
}

impl SpecCopyPatterns {
    pub(crate) fn from_raw(
        patterns_exclude: Option<&[String]>,
        rule_pattern: EnumCopyPatternMode,
    ) -> Result<Self, CopyTreeError> {
        Ok(Self {
            patterns_exclude: _compile(patterns_exclude, rule_pattern)?,
        })
    }

    pub(crate) fn is_active(&self) -> bool {
        self.patterns_exclude.is_some()
    }

    /// `true` when `name` matches any exclusion pattern.
    pub(crate) fn should_exclude(&self, name: &str) -> bool {
        let Some(patterns) = self.patterns_exclude.as_ref() else {
            return false;
        };
        match patterns {
            TypeCopyPatternSeq::Literal(v) => v.iter().any(|p| p == name),
            TypeCopyPatternSeq::Glob(v) => v.iter().any(|p| p.is_match(name)),
            TypeCopyPatternSeq::Regex(v) => v.iter().any(|p| p.is_match(name)),
        }
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumCopyPatternMode,
) -> Result<Option<TypeCopyPatternSeq>, CopyTreeError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumCopyPatternMode::Literal => Ok(Some(TypeCopyPatternSeq::Literal(patterns.to_vec()))),
        EnumCopyPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(&_escape_glob_literals(pattern))
                    .map_err(|e| {
                        CopyTreeError::InvalidPattern(format!("Invalid exclusion pattern: {e}"))
                    })?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypeCopyPatternSeq::Glob(l_glob)))
        }
        EnumCopyPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| {
                    CopyTreeError::InvalidPattern(format!("Invalid exclusion pattern: {e}"))
                })?;
                l_regex.push(regex);
            }
            Ok(Some(TypeCopyPatternSeq::Regex(l_regex)))
        }
    }
}

/// Rewrite `pattern` so `globset` reads it like `fnmatch`: an unclosed `[`
/// and any `{` or `}` outside a class become single-character classes.
fn _escape_glob_literals(pattern: &str) -> String {
    let l_chars: Vec<char> = pattern.chars().collect();
    let mut c_escaped = String::with_capacity(pattern.len());
    let mut n_idx = 0;
    while n_idx < l_chars.len() {
        match l_chars[n_idx] {
            '[' => {
                let mut n_end = n_idx + 1;
                if l_chars.get(n_end) == Some(&'!') {
                    n_end += 1;
                }
                if l_chars.get(n_end) == Some(&']') {
                    n_end += 1;
                }
                while n_end < l_chars.len() && l_chars[n_end] != ']' {
                    n_end += 1;
                }
                if n_end < l_chars.len() {
                    c_escaped.extend(&l_chars[n_idx..=n_end]);
                    n_idx = n_end + 1;
                    continue;
                }
                c_escaped.push_str("[[]");
            }
            '{' => c_escaped.push_str("[{]"),
            '}' => c_escaped.push_str("[}]"),
            ch => c_escaped.push(ch),
        }
        n_idx += 1;
    }
    c_escaped
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Resolve `path` through its deepest existing ancestor, so paths that do
/// not exist yet still compare against canonical ones.
fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let path_abs = _absolutize_path(path);
    let mut l_tail = Vec::new();
    let mut path_cursor = path_abs.as_path();
    while let (Some(parent), Some(name)) = (path_cursor.parent(), path_cursor.file_name()) {
        l_tail.push(name.to_os_string());
        if let Ok(mut resolved) = fs::canonicalize(parent) {
            for name in l_tail.iter().rev() {
                resolved.push(name);
            }
            return resolved;
        }
        path_cursor = parent;
    }
    path_abs
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

/// Stable identity of a directory, used to spot symlink cycles.
#[cfg(unix)]
pub(crate) fn derive_dir_identifier(stat_dir: &fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((stat_dir.dev(), stat_dir.ino()))
}

#[cfg(not(unix))]
pub(crate) fn derive_dir_identifier(_stat_dir: &fs::Metadata) -> Option<(u64, u64)> {
    None
}

pub(crate) fn should_error_broken_symlink(
    path_symlink: &Path,
    rule_symlink: EnumCopySymlinkStrategy,
) -> bool {
    rule_symlink == EnumCopySymlinkStrategy::Dereference && !path_symlink.exists()
}

pub(crate) fn create_symbolic_link(
    path_src: &Path,
    path_dst: &Path,
    builder_cp_report: &mut ReportCopyBuilder,
) {
    let target = match fs::read_link(path_src) {
        Ok(v) => v,
        Err(e) => {
            builder_cp_report.add_io_error(path_src.to_path_buf(), &e);
            return;
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::symlink;
        match symlink(&target, path_dst) {
            Ok(_) => builder_cp_report.add_copied(),
            Err(e) => builder_cp_report.add_io_error(path_dst.to_path_buf(), &e),
        }
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        let res = if path_src.is_dir() {
            symlink_dir(&target, path_dst)
        } else {
            symlink_file(&target, path_dst)
        };
        match res {
            Ok(_) => builder_cp_report.add_copied(),
            Err(e) => builder_cp_report.add_io_error(path_dst.to_path_buf(), &e),
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        builder_cp_report.add_error(
            path_dst.to_path_buf(),
            "Symbolic links are unsupported on this platform".to_string(),
        );
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Metadata

/// Copy file bytes; `fs::copy` already carries permission bits.
pub(crate) fn copy_file_bytes(path_file_src: &Path, path_file_dst: &Path) -> io::Result<u64> {
    fs::copy(path_file_src, path_file_dst)
}

/// Apply permissions, access/modification times and (Linux) xattrs of
/// `path_src` onto `path_dst`. Works for files and directories.
pub(crate) fn apply_metadata(path_src: &Path, path_dst: &Path) -> io::Result<()> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_src)?;
    fs::set_permissions(path_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    {
        copy_xattrs_linux(path_src, path_dst);
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_src: &Path, path_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_dst, &name, &raw_value);
    }
}

/// Join `path_dir_dst` with the position of `path_src` below `path_dir_src`.
pub(crate) fn derive_destination_path(
    path_src: &Path,
    path_item_name: &str,
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> PathBuf {
    path_dir_dst.join(
        path_src
            .strip_prefix(path_dir_src)
            .unwrap_or(Path::new(path_item_name)),
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{SpecCopyPatterns, _escape_glob_literals, derive_destination_path, is_overlap};
    use crate::spec::{CopyTreeError, EnumCopyPatternMode};

    fn compile(patterns: &[&str], rule_pattern: EnumCopyPatternMode) -> SpecCopyPatterns {
        let l_patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        SpecCopyPatterns::from_raw(Some(&l_patterns), rule_pattern).expect("compile patterns")
    }

    #[test]
    fn glob_matches_basename_like_fnmatch() {
        let spec_cp_pats = compile(&["node_modules", "*.log", ".env*.local"], EnumCopyPatternMode::Glob);
        assert!(spec_cp_pats.should_exclude("node_modules"));
        assert!(spec_cp_pats.should_exclude("debug.log"));
        assert!(spec_cp_pats.should_exclude(".log"));
        assert!(spec_cp_pats.should_exclude(".env.development.local"));
        assert!(!spec_cp_pats.should_exclude("node_modules_backup"));
        assert!(!spec_cp_pats.should_exclude("log.txt"));
    }

    #[test]
    fn literal_is_exact_name() {
        let spec_cp_pats = compile(&["build"], EnumCopyPatternMode::Literal);
        assert!(spec_cp_pats.should_exclude("build"));
        assert!(!spec_cp_pats.should_exclude("build.rs"));
        assert!(!spec_cp_pats.should_exclude("*"));
    }

    #[test]
    fn regex_matches_basename() {
        let spec_cp_pats = compile(&[r"^tmp_\d+$"], EnumCopyPatternMode::Regex);
        assert!(spec_cp_pats.should_exclude("tmp_42"));
        assert!(!spec_cp_pats.should_exclude("tmp_x"));
    }

    #[test]
    fn empty_list_is_inactive() {
        let spec_cp_pats =
            SpecCopyPatterns::from_raw(Some(&[]), EnumCopyPatternMode::Glob).expect("compile");
        assert!(!spec_cp_pats.is_active());
        assert!(!spec_cp_pats.should_exclude("anything"));
    }

    #[test]
    fn glob_unclosed_bracket_and_braces_are_literal() {
        let spec_cp_pats = compile(&["[", "a[b", "{x,y}", "[!]]z"], EnumCopyPatternMode::Glob);
        assert!(spec_cp_pats.should_exclude("["));
        assert!(spec_cp_pats.should_exclude("a[b"));
        assert!(spec_cp_pats.should_exclude("{x,y}"));
        assert!(!spec_cp_pats.should_exclude("x"));
        assert!(spec_cp_pats.should_exclude("az"));
        assert!(!spec_cp_pats.should_exclude("]z"));

        assert_eq!(_escape_glob_literals("[ab]*.log"), "[ab]*.log");
        assert_eq!(_escape_glob_literals("x[y"), "x[[]y");
    }

    #[test]
    fn invalid_glob_and_regex_are_rejected() {
        let err =
            SpecCopyPatterns::from_raw(Some(&["[z-a]".to_string()]), EnumCopyPatternMode::Glob)
                .expect_err("invalid glob");
        assert!(matches!(err, CopyTreeError::InvalidPattern(_)));

        let err = SpecCopyPatterns::from_raw(Some(&["(".to_string()]), EnumCopyPatternMode::Regex)
            .expect_err("invalid regex");
        assert!(matches!(err, CopyTreeError::InvalidPattern(_)));
    }

    #[test]
    fn overlap_detects_missing_nested_destination() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("proj");
        std::fs::create_dir_all(&src).expect("mkdir");

        assert!(is_overlap(&src, &src.join("not").join("yet")));
        assert!(is_overlap(&src.join("inner"), &src));
        assert!(!is_overlap(&src, &tmp.path().join("other")));
    }

    #[test]
    fn destination_path_keeps_relative_structure() {
        let path_dst = derive_destination_path(
            Path::new("/source/dir/a/file.txt"),
            "file.txt",
            Path::new("/source/dir"),
            Path::new("/destination/dir"),
        );
        assert_eq!(path_dst, Path::new("/destination/dir/a/file.txt"));
    }
}
