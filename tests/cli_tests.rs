//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONVERT_SCRIPT: &str = "\
rule('convert').command('tool $in $out');
single('*.psd').toExt('.png').using('convert');
";

fn assetman() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("assetman"))
}

/// A build dir with a `src/` subdirectory holding `files` and `assets.js`.
fn workspace(script: &str, files: &[&str]) -> TempDir {
    let tmp = TempDir::new().expect("temp dir");
    let src = tmp.path().join("src");
    fs::create_dir_all(&src).expect("mkdir src");
    fs::write(src.join("assets.js"), script).expect("write script");
    for file in files {
        let path = src.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, "").expect("write source file");
    }
    tmp
}

fn read_graph(dir: &Path) -> String {
    fs::read_to_string(dir.join("build.ninja")).expect("read build.ninja")
}

#[test]
fn test_cli_version() {
    let mut cmd = assetman();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("assetman"));
}

#[test]
fn test_cli_help() {
    let mut cmd = assetman();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SRC_PATH"))
        .stdout(predicate::str::contains("refresh-file-list").not());

    let mut cmd = assetman();
    cmd.arg("-h");
    cmd.assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_generate_end_to_end() {
    let tmp = workspace(CONVERT_SCRIPT, &["foo.psd", "bar.psd"]);

    let mut cmd = assetman();
    cmd.current_dir(tmp.path()).arg("src");
    cmd.assert().success();

    let graph = read_graph(tmp.path());
    assert!(graph.contains("rule convert\n  command = tool $in $out\n"), "{graph}");
    assert!(graph.contains("build bar.png: convert src/bar.psd\n"), "{graph}");
    assert!(graph.contains("build foo.png: convert src/foo.psd\n"), "{graph}");
    assert!(graph.contains("build .dirty: phony\n"), "{graph}");
    assert!(graph.contains("build .src_files: COMPARE_ECHO .dirty\n"), "{graph}");
    assert!(graph.contains("  patterns = '*.psd'\n"), "{graph}");
    assert!(graph.contains("build build.ninja: GENERATE src/assets.js .src_files\n"), "{graph}");
    assert!(graph.contains("build clean: CLEAN\n"), "{graph}");
    assert!(graph.contains("  generator = 1\n"), "{graph}");
    assert!(graph.contains("  restat = 1\n"), "{graph}");
    assert!(graph.ends_with("default bar.png foo.png\n"), "{graph}");
}

#[test]
fn test_generate_is_deterministic() {
    let tmp = workspace(CONVERT_SCRIPT, &["b.psd", "a.psd", "nested/c.psd"]);

    assetman().current_dir(tmp.path()).arg("src").assert().success();
    let first = read_graph(tmp.path());
    assetman().current_dir(tmp.path()).arg("src").assert().success();
    let second = read_graph(tmp.path());

    similar_asserts::assert_eq!(first, second);
}

#[test]
fn test_generate_from_build_bundle() {
    let script = "\
rule('convert').command('convert $in $out');
rule('atlas').command('binpack $in -o $name');
single('images/*.psd').toExt('.png').using('convert');
bundle('images/*.png')
  .fromBuild(true)
  .to(['atlas.png', 'atlas.csv'])
  .assign('name', 'atlas')
  .using('atlas');
";
    let tmp = workspace(script, &["images/hero.psd", "images/stale.png"]);

    assetman().current_dir(tmp.path()).arg("src").assert().success();

    let graph = read_graph(tmp.path());
    assert!(
        graph.contains("build atlas.png atlas.csv: atlas images/hero.png\n  name = atlas\n"),
        "{graph}"
    );
    assert!(!graph.contains("stale.png"), "{graph}");
    assert!(graph.ends_with("default images/hero.png atlas.png atlas.csv\n"), "{graph}");
}

#[test]
fn test_missing_description_fails() {
    let tmp = TempDir::new().expect("temp dir");
    fs::create_dir_all(tmp.path().join("src")).expect("mkdir");

    assetman()
        .current_dir(tmp.path())
        .arg("src")
        .assert()
        .failure()
        .stderr(predicate::str::contains("src/assets.js"));
    assert!(!tmp.path().join("build.ninja").exists());
}

#[test]
fn test_malformed_description_fails_with_position() {
    let tmp = workspace("rule('convert').command('x')\nsingle('*.psd'.toExt('.png')", &[]);

    assetman()
        .current_dir(tmp.path())
        .arg("src")
        .assert()
        .failure()
        .stderr(predicate::str::contains("src/assets.js"))
        .stderr(predicate::str::contains("2:"));
}

#[test]
fn test_sandbox_rejects_foreign_calls() {
    let tmp = workspace("require('child_process')", &[]);

    assetman()
        .current_dir(tmp.path())
        .arg("src")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown function 'require'"));
}

#[test]
fn test_zero_target_bundle_warns() {
    let script = "rule('pack').command('pack $in');\nbundle('*.png').using('pack');\n";
    let tmp = workspace(script, &["a.png"]);

    assetman()
        .current_dir(tmp.path())
        .arg("src")
        .assert()
        .success()
        .stderr(predicate::str::contains("No targets specified for bundle clause with pattern: *.png"));

    let graph = read_graph(tmp.path());
    assert!(!graph.contains(": pack"), "{graph}");
    assert!(graph.ends_with("\ndefault build.ninja\n"), "{graph}");
}

#[test]
fn test_description_cannot_inject_build_lines() {
    let script = "\
rule('c').command('tool $in $out');
single('*.psd').toExt('.png').assign('name', 'a\\nbuild evil: c').using('c');
";
    let tmp = workspace(script, &["foo.psd"]);

    assetman()
        .current_dir(tmp.path())
        .arg("src")
        .assert()
        .failure()
        .stderr(predicate::str::contains("single('*.psd') has a line break in the value of 'name'"));
    assert!(!tmp.path().join("build.ninja").exists());

    let tmp = workspace("rule('my rule').command('x')", &[]);
    assetman()
        .current_dir(tmp.path())
        .arg("src")
        .assert()
        .failure()
        .stderr(predicate::str::contains("rule name 'my rule' is not valid"));
}

#[test]
fn test_duplicate_output_fails() {
    let script = "\
rule('a').command('x $in $out');
rule('b').command('y $in $out');
single('*.psd').toExt('.png').using('a');
single('*.tif').toExt('.png').using('b');
";
    let tmp = workspace(script, &["foo.psd", "foo.tif"]);

    assetman()
        .current_dir(tmp.path())
        .arg("src")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'foo.png'"))
        .stderr(predicate::str::contains("more than one edge"));
}

#[test]
fn test_unknown_rule_fails() {
    let tmp = workspace("single('*.psd').toExt('.png').using('convert')", &["foo.psd"]);

    assetman()
        .current_dir(tmp.path())
        .arg("src")
        .assert()
        .failure()
        .stderr(predicate::str::contains("undeclared rule 'convert'"));
}

#[test]
fn test_settings_file_overrides_names() {
    let tmp = workspace("", &["foo.psd"]);
    let src = tmp.path().join("src");
    fs::write(src.join("pipeline.js"), CONVERT_SCRIPT).expect("write pipeline");
    fs::write(src.join("assetman.toml"), "script = 'pipeline.js'\ngenerator = 'assetman'\n")
        .expect("write settings");

    assetman().current_dir(tmp.path()).arg("src").assert().success();

    let graph = read_graph(tmp.path());
    assert!(graph.contains("build foo.png: convert src/foo.psd\n"), "{graph}");
    assert!(graph.contains("  command = assetman src\n"), "{graph}");
    assert!(
        graph.contains("build build.ninja: GENERATE src/pipeline.js src/assetman.toml .src_files\n"),
        "{graph}"
    );
}

#[test]
fn test_refresh_file_list_is_idempotent() {
    let tmp = workspace("", &["foo.psd", "nested/bar.psd", "skip.txt"]);
    let list = tmp.path().join(".src_files");

    let refresh = |dir: &Path| {
        assetman()
            .current_dir(dir)
            .args(["refresh-file-list", "--root", "src", "--output", ".src_files", "**/*.psd"])
            .assert()
            .success();
    };

    refresh(tmp.path());
    let first = fs::read_to_string(&list).expect("read list");
    assert_eq!(first, "foo.psd\nnested/bar.psd");
    let mtime = fs::metadata(&list).expect("stat").modified().expect("mtime");

    std::thread::sleep(std::time::Duration::from_millis(20));
    refresh(tmp.path());
    assert_eq!(fs::read_to_string(&list).expect("read list"), first);
    assert_eq!(fs::metadata(&list).expect("stat").modified().expect("mtime"), mtime);

    fs::write(tmp.path().join("src/new.psd"), "").expect("write");
    refresh(tmp.path());
    assert_eq!(
        fs::read_to_string(&list).expect("read list"),
        "foo.psd\nnested/bar.psd\nnew.psd"
    );
}
