use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use deskcopy_fs::{
    ConsolePrompt, EnumProjectCopyOutcome, ProjectCopyError, SpecProjectCopyOptions,
    copy_project, resolve_desktop_path_from,
};

fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, txt).expect("write text");
}

/// Relative path -> file content (`None` for directories).
fn snapshot(path_root: &Path) -> BTreeMap<PathBuf, Option<String>> {
    fn visit(path_root: &Path, path_dir: &Path, dict_tree: &mut BTreeMap<PathBuf, Option<String>>) {
        for entry in std::fs::read_dir(path_dir).expect("read dir") {
            let path_entry = entry.expect("entry").path();
            let path_rel = path_entry
                .strip_prefix(path_root)
                .expect("relative")
                .to_path_buf();
            if path_entry.is_dir() {
                dict_tree.insert(path_rel, None);
                visit(path_root, &path_entry, dict_tree);
            } else {
                let content = std::fs::read_to_string(&path_entry).expect("read file");
                dict_tree.insert(path_rel, Some(content));
            }
        }
    }

    let mut dict_tree = BTreeMap::new();
    visit(path_root, path_root, &mut dict_tree);
    dict_tree
}

fn answer(input: &'static str) -> ConsolePrompt<Cursor<&'static [u8]>, Vec<u8>> {
    ConsolePrompt::new(Cursor::new(input.as_bytes()), Vec::new())
}

struct Fixture {
    _tmp: tempfile::TempDir,
    path_dir_src: PathBuf,
    path_dir_desktop: PathBuf,
}

impl Fixture {
    /// `proj/` with `node_modules/x.txt`, `src/a.txt` and `README.md`.
    fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_dir_src = tmp.path().join("code/proj");
        let path_dir_desktop = tmp.path().join("home/Desktop");
        write_text(&path_dir_src.join("node_modules/x.txt"), "dep");
        write_text(&path_dir_src.join("src/a.txt"), "a");
        write_text(&path_dir_src.join("README.md"), "readme");
        std::fs::create_dir_all(&path_dir_desktop).expect("mkdir desktop");
        Self {
            _tmp: tmp,
            path_dir_src,
            path_dir_desktop,
        }
    }

    fn options(&self) -> SpecProjectCopyOptions {
        SpecProjectCopyOptions {
            path_dir_desktop: Some(self.path_dir_desktop.clone()),
            ..SpecProjectCopyOptions::default()
        }
    }

    fn path_dir_dst(&self) -> PathBuf {
        self.path_dir_desktop.join("proj")
    }
}

#[test]
fn node_modules_is_left_behind() {
    let fixture = Fixture::new();
    let outcome = copy_project(&fixture.path_dir_src, &fixture.options(), &mut answer(""))
        .expect("copy project");

    let EnumProjectCopyOutcome::Done { path_dir_dst, report } = outcome else {
        panic!("expected a completed copy");
    };
    assert_eq!(path_dir_dst, fixture.path_dir_dst());
    assert_eq!(report.cnt_excluded, 1);

    let dict_tree = snapshot(&path_dir_dst);
    let l_paths: Vec<&PathBuf> = dict_tree.keys().collect();
    assert_eq!(
        l_paths,
        vec![
            &PathBuf::from("README.md"),
            &PathBuf::from("src"),
            &PathBuf::from("src/a.txt"),
        ]
    );
}

#[test]
fn declined_overwrite_leaves_destination_untouched() {
    let fixture = Fixture::new();
    write_text(&fixture.path_dir_dst().join("notes.txt"), "unrelated");
    let dict_before = snapshot(&fixture.path_dir_dst());

    let outcome = copy_project(&fixture.path_dir_src, &fixture.options(), &mut answer("n\n"))
        .expect("cancel is not an error");

    assert!(outcome.is_cancelled());
    assert_eq!(snapshot(&fixture.path_dir_dst()), dict_before);
}

#[test]
fn confirmed_overwrite_twice_is_idempotent() {
    let fixture = Fixture::new();
    copy_project(&fixture.path_dir_src, &fixture.options(), &mut answer("")).expect("first");
    let dict_once = snapshot(&fixture.path_dir_dst());

    write_text(&fixture.path_dir_dst().join("stale.txt"), "stale");
    let outcome = copy_project(&fixture.path_dir_src, &fixture.options(), &mut answer("Y\n"))
        .expect("second");
    assert!(!outcome.is_cancelled());
    assert_eq!(snapshot(&fixture.path_dir_dst()), dict_once);

    let outcome = copy_project(&fixture.path_dir_src, &fixture.options(), &mut answer("y\n"))
        .expect("third");
    assert!(!outcome.is_cancelled());
    assert_eq!(snapshot(&fixture.path_dir_dst()), dict_once);
}

#[test]
fn root_source_fails_before_any_mutation() {
    let fixture = Fixture::new();
    let err = copy_project(Path::new("/"), &fixture.options(), &mut answer("y\n"))
        .expect_err("root has no project name");

    assert!(matches!(err, ProjectCopyError::InvalidProjectName(_)));
    assert!(snapshot(&fixture.path_dir_desktop).is_empty());
}

#[test]
fn resolver_prefers_desktop_then_falls_back_to_home() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let l_names = ["Desktop", "Bureau"];

    assert_eq!(resolve_desktop_path_from(tmp.path(), &l_names), tmp.path());

    std::fs::create_dir(tmp.path().join("Desktop")).expect("mkdir Desktop");
    assert_eq!(
        resolve_desktop_path_from(tmp.path(), &l_names),
        tmp.path().join("Desktop")
    );
}

#[test]
fn custom_exclusions_apply_recursively() {
    let fixture = Fixture::new();
    write_text(&fixture.path_dir_src.join("src/.next/cache.bin"), "c");
    write_text(&fixture.path_dir_src.join("src/server.log"), "l");

    let spec_options = SpecProjectCopyOptions {
        patterns_exclude: vec!["node_modules".to_string(), ".next".to_string(), "*.log".to_string()],
        ..fixture.options()
    };
    copy_project(&fixture.path_dir_src, &spec_options, &mut answer("")).expect("copy project");

    let dict_tree = snapshot(&fixture.path_dir_dst());
    assert!(dict_tree.keys().all(|p| {
        !p.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name == "node_modules" || name == ".next" || name.ends_with(".log")
        })
    }));
    assert!(dict_tree.contains_key(Path::new("src/a.txt")));
}

#[test]
fn web_preset_leaves_build_output_and_secrets_behind() {
    let fixture = Fixture::new();
    write_text(&fixture.path_dir_src.join(".next/build.json"), "{}");
    write_text(&fixture.path_dir_src.join(".git/HEAD"), "ref");
    write_text(&fixture.path_dir_src.join(".env.local"), "KEY=1");
    write_text(&fixture.path_dir_src.join("src/debug.log"), "log");
    write_text(&fixture.path_dir_src.join(".env"), "PUBLIC=1");

    let spec_options = SpecProjectCopyOptions {
        path_dir_desktop: Some(fixture.path_dir_desktop.clone()),
        ..SpecProjectCopyOptions::web()
    };
    copy_project(&fixture.path_dir_src, &spec_options, &mut answer("")).expect("copy project");

    let dict_tree = snapshot(&fixture.path_dir_dst());
    let l_paths: Vec<&PathBuf> = dict_tree.keys().collect();
    assert_eq!(
        l_paths,
        vec![
            &PathBuf::from(".env"),
            &PathBuf::from("README.md"),
            &PathBuf::from("src"),
            &PathBuf::from("src/a.txt"),
        ]
    );
}
