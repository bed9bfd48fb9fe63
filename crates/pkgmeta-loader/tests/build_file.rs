//! Loading build files from disk and evaluating them end to end.

use pkgmeta_loader::{BuildFile, LoadError, BUILD_FILE_NAME};
use pkgmeta_schema::{PackageFormat, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};

fn write_build_file(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join(BUILD_FILE_NAME);
    fs::write(&path, content).unwrap();
    path
}

const MULTI_FORMAT: &str = r#"
[[package]]
name = "demo-deb"
format = "deb"
package_name = "demo"
version = "2.0.0"
maintainer = "Foo Bar <foo@example.com>"
section = "utils"
depends = ["libc6 (>= 2.31)", "default-mta | mail-transport-agent"]
dependencies = [":etc", ":state"]

[package.fields]
Bugs = "https://example.com/bugs"
Empty = ""

[[package]]
name = "demo-apk"
format = "apk"
package_name = "demo"
version = "2.0.0"
depends = ["so:libc.musl-x86_64.so.1", "!conflicting"]
dependencies = [":etc"]

[[package]]
name = "demo-arch"
format = "archlinux"
package_name = "demo"
version = "2.0.0"
pkgbase = "demo-base"
conflicts = ["tcpdump<5"]

[[content]]
name = "etc"
kind = "files"
description = "Demo configuration"

[[content.entries]]
src = "demo.conf"
dst = "/etc/demo.conf"
content_type = "config"

[[content]]
name = "state"
kind = "dirs"

[[content.entries]]
dst = "/var/lib/demo"
file_mode = 0o750
"#;

#[test]
fn loads_and_evaluates_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_build_file(dir.path(), MULTI_FORMAT);

    let file = BuildFile::load(&path).unwrap();
    assert_eq!(file.dir(), dir.path().display().to_string());
    let evaluation = file.evaluate().unwrap();
    assert_eq!(evaluation.packages.len(), 3);
    assert_eq!(evaluation.entities.len(), 2);

    let deb = evaluation.package("demo-deb").unwrap();
    assert_eq!(deb.descriptor.format(), PackageFormat::Deb);
    let fields = deb.config.get("deb.fields").unwrap();
    assert_eq!(fields["Bugs"], "https://example.com/bugs");
    assert!(fields.get("Empty").is_none());
    let contents = deb.config.get("contents").unwrap().as_array().unwrap();
    assert_eq!(contents.len(), 2);
    assert_eq!(contents[0]["type"], "config");
    assert_eq!(contents[1]["type"], "dir");
    assert_eq!(contents[1]["file_info"]["mode"], 0o750);

    let apk = evaluation.package("demo-apk").unwrap();
    assert_eq!(
        apk.config.get("contents").unwrap().as_array().unwrap().len(),
        1
    );

    let arch = evaluation.package("demo-arch").unwrap();
    assert_eq!(
        arch.config.get("archlinux.pkgbase").unwrap(),
        "demo-base"
    );
    assert_eq!(arch.config.get("contents").unwrap().as_array().unwrap().len(), 0);
}

#[test]
fn entities_carry_the_generator_description() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_build_file(dir.path(), MULTI_FORMAT);
    let evaluation = BuildFile::load(path).unwrap().evaluate().unwrap();
    let etc = evaluation
        .entities
        .iter()
        .find(|e| e.dst() == "/etc/demo.conf")
        .unwrap();
    assert_eq!(etc.description(), Some("Demo configuration"));
    assert!(etc.address().is_generated());
    assert!(etc.address().ends_with(":etc#/etc/demo.conf"));
}

#[test]
fn invalid_targets_are_reported_together() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_build_file(
        dir.path(),
        r#"
[[package]]
name = "bad-rpm"
format = "rpm"
package_name = "demo"
version = "1.0.0"
depends = ["bash < 5"]
ghost_contents = ["relative/path"]

[[content]]
name = "links"
kind = "symlinks"

[[content.entries]]
dst = "/usr/bin/demo"
"#,
    );

    let err = BuildFile::load(path).unwrap().evaluate().unwrap_err();
    let LoadError::Invalid(failures) = &err else {
        panic!("expected invalid targets, got {err}");
    };
    assert_eq!(failures.len(), 2);
    assert!(failures[0].address.ends_with(":links"));
    assert!(failures[1].address.ends_with(":bad-rpm"));
    assert_eq!(failures[1].errors.len(), 2);
    assert!(failures[1]
        .errors
        .iter()
        .any(|e| matches!(e, ValidationError::Relationship { field, .. } if field == "depends")));

    let text = err.to_string();
    assert!(text.contains("2 invalid target(s)"));
    assert!(text.contains("bad-rpm"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = BuildFile::load(dir.path().join(BUILD_FILE_NAME));
    assert!(matches!(result, Err(LoadError::Io(_))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_build_file(dir.path(), "[[package]\nname = ");
    assert!(matches!(BuildFile::load(path), Err(LoadError::ParseToml(_))));
}
