//! Desktop-copy constants and default presets.

/// Desktop folder names probed under the home directory, in order.
///
/// English first, then French; add locales by appending here.
pub const TUP_DESKTOP_DIR_NAMES: [&str; 5] =
    ["Desktop", "Bureau", "Schreibtisch", "Escritorio", "Scrivania"];

/// Entries excluded from a project copy when no other list is given.
pub const TUP_PATTERNS_EXCLUDE_DEFAULT: [&str; 1] = ["node_modules"];

/// Wider exclusion preset for web projects (build output, VCS, logs, local env).
pub const TUP_PATTERNS_EXCLUDE_WEB: [&str; 5] =
    ["node_modules", ".next", ".git", "*.log", ".env*.local"];

/// Answer accepted as "yes" by the overwrite prompt (case-insensitive).
pub const C_TOKEN_AFFIRMATIVE: &str = "y";
