use classmap::structure::{ExtractOptions, Extractor, extract_project};
use classmap::{AggregateReport, ExtractError};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn temp_repo_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("classmap-{label}-{nanos}-{counter}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn copy_dir(src: &Path, dst: &Path) {
    fs::create_dir_all(dst).unwrap();
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();
        let target = dst.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&path, &target);
        } else {
            fs::copy(&path, &target).unwrap();
        }
    }
}

fn setup_repo(fixture: &str) -> PathBuf {
    let repo_root = temp_repo_dir(fixture);
    copy_dir(&fixture_path(fixture), &repo_root);
    repo_root
}

fn without_loops() -> ExtractOptions {
    ExtractOptions {
        track_loops: false,
        ..ExtractOptions::default()
    }
}

fn extract_source(source: &str, options: ExtractOptions) -> AggregateReport {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("module.py"), source).unwrap();
    extract_project(dir.path(), options).unwrap()
}

#[test]
fn fixture_project_report() {
    let repo_root = setup_repo("py_project");
    let report = extract_project(&repo_root, ExtractOptions::default()).unwrap();

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "lines_of_code": 33,
            "num_classes": 4,
            "num_methods": 4,
            "num_variables": 3,
            "for_loops": 1,
            "classes": {
                "Base": {
                    "methods": ["save"],
                    "attributes": ["registry"],
                    "loops": 0,
                    "Model": {
                        "methods": ["__init__", "load"],
                        "attributes": ["table"],
                        "loops": 1
                    }
                },
                "Command": {
                    "methods": [],
                    "attributes": ["verbose"],
                    "loops": 0
                }
            }
        })
    );
    let keys: Vec<_> = report.classes.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Base", "Command"]);

    let _ = fs::remove_dir_all(&repo_root);
}

#[test]
fn extraction_is_deterministic() {
    let repo_a = setup_repo("py_project");
    let repo_b = setup_repo("py_project");
    let first = extract_project(&repo_a, ExtractOptions::default()).unwrap();
    let again = extract_project(&repo_a, ExtractOptions::default()).unwrap();
    let copy = extract_project(&repo_b, ExtractOptions::default()).unwrap();

    let first = serde_json::to_string_pretty(&first).unwrap();
    assert_eq!(first, serde_json::to_string_pretty(&again).unwrap());
    assert_eq!(first, serde_json::to_string_pretty(&copy).unwrap());

    let _ = fs::remove_dir_all(&repo_a);
    let _ = fs::remove_dir_all(&repo_b);
}

#[test]
fn empty_directory_reports_zeroes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.md"), "# class A: pass\n").unwrap();
    let report = extract_project(dir.path(), ExtractOptions::default()).unwrap();
    assert_eq!(report.lines_of_code, 0);
    assert_eq!(report.class_count, 0);
    assert_eq!(report.method_count, 0);
    assert_eq!(report.variable_count, 0);
    assert_eq!(report.loop_count, Some(0));
    assert!(report.classes.is_empty());
}

#[test]
fn single_pass_class() {
    let report = extract_source("class A: pass", without_loops());
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "lines_of_code": 1,
            "num_classes": 1,
            "num_methods": 0,
            "num_variables": 0,
            "classes": {"A": {"methods": [], "attributes": []}}
        })
    );
}

#[test]
fn derived_class_nests_under_its_base() {
    let source = "class A:\n    def m(self):\n        pass\n\nclass B(A):\n    x = 1\n";
    let report = extract_source(source, without_loops());
    let classes = serde_json::to_value(&report.classes).unwrap();
    assert_eq!(classes["A"]["B"], json!({"methods": [], "attributes": ["x"]}));
    assert_eq!(classes["A"]["methods"], json!(["m"]));
    assert!(classes.get("B").is_none());
}

#[test]
fn undefined_base_only_gets_a_nested_slot() {
    let report = extract_source("class B(A):\n    x = 1\n", without_loops());
    let entry = &report.classes["A"];
    assert!(entry.record.is_none());
    assert_eq!(report.nested("A", "B").unwrap().attributes, vec!["x"]);
}

#[test]
fn grandchild_nests_only_under_immediate_base() {
    let source = "class A: pass\nclass B(A): pass\nclass C(B): pass\n";
    let report = extract_source(source, without_loops());
    assert!(report.top_level("A").is_some());
    assert!(report.nested("A", "B").is_some());
    assert!(report.nested("B", "C").is_some());
    assert!(report.nested("A", "C").is_none());
}

#[test]
fn only_first_simple_base_places_the_class() {
    let source = "class C(B1, B2):\n    pass\nclass D(mod.Base, B2):\n    pass\nclass E(mod.Base):\n    pass\n";
    let report = extract_source(source, without_loops());
    assert!(report.nested("B1", "C").is_some());
    assert!(report.nested("B2", "D").is_some());
    assert!(report.top_level("E").is_some());
    assert!(!report.classes["B2"].subclasses.contains_key("C"));
}

#[test]
fn methods_and_attributes_keep_source_order() {
    let source = r#"
class Session:
    zeta = 1
    alpha = beta = 2
    first, second = 3, 4

    def send(self):
        pass

    def close(self):
        pass

    def __enter__(self):
        return self
"#;
    let report = extract_source(source, without_loops());
    let record = report.top_level("Session").unwrap();
    assert_eq!(record.methods, vec!["send", "close", "__enter__"]);
    assert_eq!(record.attributes, vec!["zeta", "alpha", "beta"]);
    assert_eq!(report.variable_count, 3);
}

#[test]
fn tuple_unpacking_contributes_nothing() {
    let report = extract_source("class P:\n    a, b = 1, 2\n", without_loops());
    assert_eq!(report.variable_count, 0);
    assert!(report.top_level("P").unwrap().attributes.is_empty());
}

#[test]
fn nested_bodies_are_not_attributed_to_the_outer_class() {
    let source = r#"
class Outer:
    def method(self):
        inner_var = 1
        for item in []:
            pass

    class Inner:
        flag = True

    if True:
        hidden = 2
"#;
    let report = extract_source(source, ExtractOptions::default());
    let outer = report.top_level("Outer").unwrap();
    assert_eq!(outer.methods, vec!["method"]);
    assert!(outer.attributes.is_empty());
    assert_eq!(outer.loop_count, Some(0));
    assert_eq!(report.top_level("Inner").unwrap().attributes, vec!["flag"]);
    assert_eq!(report.class_count, 2);
    assert_eq!(report.loop_count, Some(0));
}

#[test]
fn syntax_error_file_is_skipped_but_counted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_bad.py"), "def broken(:\n    pass\n").unwrap();
    fs::write(dir.path().join("b_good.py"), "class Good:\n    def ok(self):\n        pass\n")
        .unwrap();
    let report = extract_project(dir.path(), without_loops()).unwrap();
    assert_eq!(report.lines_of_code, 5);
    assert_eq!(report.class_count, 1);
    assert_eq!(report.top_level("Good").unwrap().methods, vec!["ok"]);
}

#[test]
fn first_file_in_path_order_wins_a_slot() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b/one.py"), "class Dup:\n    late = 1\n").unwrap();
    fs::write(dir.path().join("a.py"), "class Dup:\n    early = 1\n").unwrap();
    let report = extract_project(dir.path(), without_loops()).unwrap();
    assert_eq!(report.class_count, 2);
    assert_eq!(report.variable_count, 2);
    assert_eq!(report.top_level("Dup").unwrap().attributes, vec!["early"]);
}

#[test]
fn commit_message_is_carried() {
    let options = ExtractOptions {
        commit_message: Some("Fix typo".to_string()),
        ..without_loops()
    };
    let report = extract_source("x = 1\n", options);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["commit_message"], "Fix typo");
}

#[test]
fn invalid_utf8_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ok.py"), "class A: pass\n").unwrap();
    fs::write(dir.path().join("z.py"), [0x78, 0x20, 0x3d, 0x20, 0xff, 0x0a]).unwrap();
    let err = extract_project(dir.path(), ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractError::Decode { .. }));
}

#[test]
fn extractor_reuses_its_parser_across_runs() {
    let repo_root = setup_repo("py_project");
    let mut extractor = Extractor::new(ExtractOptions::default()).unwrap();
    let first = extractor.extract(&repo_root).unwrap();
    let second = extractor.extract(&repo_root).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.class_count, 4);
    let _ = fs::remove_dir_all(&repo_root);
}

#[test]
fn python2_files_are_skipped_but_counted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a_print.py"),
        "class Legacy:\n    def show(self):\n        print 'x'\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("b_except.py"),
        "class Guard:\n    limit = 1\n    def run(self):\n        try:\n            pass\n        except ValueError, e:\n            pass\n",
    )
    .unwrap();
    let report = extract_project(dir.path(), ExtractOptions::default()).unwrap();
    assert_eq!(report.lines_of_code, 10);
    assert_eq!(report.class_count, 0);
    assert_eq!(report.method_count, 0);
    assert_eq!(report.variable_count, 0);
    assert!(report.classes.is_empty());
}

#[cfg(unix)]
#[test]
fn symlinked_source_is_extracted() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("real")).unwrap();
    fs::write(dir.path().join("real/impl.txt"), "class S:\n    x = 1\n").unwrap();
    std::os::unix::fs::symlink(dir.path().join("real/impl.txt"), dir.path().join("linked.py"))
        .unwrap();
    let report = extract_project(dir.path(), without_loops()).unwrap();
    assert_eq!(report.lines_of_code, 2);
    assert_eq!(report.class_count, 1);
    assert_eq!(report.top_level("S").unwrap().attributes, vec!["x"]);
}

#[cfg(unix)]
#[test]
fn dangling_symlink_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.py"), "class A: pass\n").unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing.py"), dir.path().join("ghost.py"))
        .unwrap();
    let err = extract_project(dir.path(), ExtractOptions::default()).unwrap_err();
    match err {
        ExtractError::Read { path, .. } => assert_eq!(path, dir.path().join("ghost.py")),
        other => panic!("unexpected error: {other}"),
    }
}
