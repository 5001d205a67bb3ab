//! Integration tests for freezer

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Command with a private log directory and no inherited Python environment
fn freezer_cmd(log_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("freezer");
    cmd.env("FREEZER_LOG_DIR", log_dir)
        .env_remove("FREEZER_RULES")
        .env_remove("VIRTUAL_ENV")
        .env_remove("CONDA_PREFIX")
        .env_remove("RUST_LOG");
    cmd
}

struct Project {
    dir: TempDir,
}

impl Project {
    fn new(dirs: &[&str], files: &[&str]) -> io::Result<Self> {
        let dir = TempDir::new()?;
        for d in dirs {
            fs::create_dir_all(dir.path().join(d))?;
        }
        for f in files {
            let path = dir.path().join(f);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "")?;
        }
        Ok(Project { dir })
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn logs(&self) -> PathBuf {
        self.dir.path().join(".logs")
    }

    fn command(&self) -> Command {
        freezer_cmd(&self.logs())
    }
}

#[test]
fn test_version() {
    let Ok(logs) = TempDir::new() else {
        return;
    };
    freezer_cmd(logs.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("freezer"));
}

#[test]
fn test_help() {
    let Ok(logs) = TempDir::new() else {
        return;
    };
    freezer_cmd(logs.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bundle manifest resolver"));
}

#[test]
fn test_invalid_command() {
    let Ok(logs) = TempDir::new() else {
        return;
    };
    freezer_cmd(logs.path()).arg("invalid").assert().failure();
}

#[test]
fn test_resolve_models_only_project() {
    let Ok(project) = Project::new(&["models"], &["main_ui.py"]) else {
        return;
    };
    project
        .command()
        .arg("resolve")
        .arg(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("dest = \"models\""))
        .stdout(predicate::str::contains("console = true"))
        .stdout(predicate::str::contains("\"numpy\""))
        .stdout(predicate::str::contains("kind = \"plugin\"").not())
        .stderr(predicate::str::contains("Environment: not found"))
        .stderr(predicate::str::contains("Included resources: models"))
        .stderr(predicate::str::contains("Skipping GUI toolkit plugins"));
}

#[test]
fn test_resolve_missing_venv_reports_not_found() {
    let Ok(project) = Project::new(&["models"], &["main_ui.py"]) else {
        return;
    };
    project
        .command()
        .arg("resolve")
        .arg(project.root())
        .args(["--venv", "no-such-venv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no-such-venv").not())
        .stderr(predicate::str::contains("Environment: not found"))
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_resolve_relative_venv_is_made_absolute() {
    let Ok(project) = Project::new(
        &["models", "envs/app/lib/site-packages/adbutils/binaries"],
        &["main_ui.py"],
    ) else {
        return;
    };
    project
        .command()
        .current_dir(project.root())
        .args(["resolve", ".", "--venv", "envs/app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("environment = \"envs/app\"").not())
        .stdout(predicate::str::contains("envs/app\""))
        .stdout(predicate::str::contains("dest = \"adbutils/binaries\""))
        .stderr(predicate::str::contains("Environment: not found").not());
}

#[test]
fn test_resolve_missing_entry_script_fails() {
    let Ok(project) = Project::new(&["models"], &[]) else {
        return;
    };
    project
        .command()
        .arg("resolve")
        .arg(project.root())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Entry script not found"))
        .stderr(predicate::str::contains("main_ui.py"));
}

#[test]
fn test_resolve_writes_json_manifest() {
    let Ok(project) = Project::new(
        &["models", "quanka", ".venv/lib/site-packages/adbutils/binaries"],
        &["main_ui.py", "LICENSE", "config.json"],
    ) else {
        return;
    };
    let output = project.root().join("build").join("bundle.json");

    project
        .command()
        .arg("resolve")
        .arg(project.root())
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains(".venv"));

    let Ok(content) = fs::read_to_string(&output) else {
        panic!("manifest was not written");
    };
    assert!(content.contains("\"dest\": \"models\""));
    assert!(content.contains("\"dest\": \"adbutils/binaries\""));
    assert!(content.contains("\"kind\": \"doc\""));
    assert!(!content.contains("\"dest\": \"quanka\""));
}

#[test]
fn test_resolve_with_project_rules_file() {
    let Ok(project) = Project::new(&["assets"], &["app.py"]) else {
        return;
    };
    let rules = "entry-script = \"app.py\"\ncore-dirs = [\"assets\"]\n";
    if fs::write(project.root().join("freezer.toml"), rules).is_err() {
        return;
    }

    project
        .command()
        .args(["resolve", "--format", "json"])
        .arg(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"app\""))
        .stdout(predicate::str::contains("\"dest\": \"assets\""));
}

#[test]
fn test_exclusions_lists_defaults() {
    let Ok(project) = Project::new(&[], &[]) else {
        return;
    };
    project
        .command()
        .arg("exclusions")
        .arg(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("quanka"))
        .stdout(predicate::str::contains("config.json"));
}

#[test]
fn test_rules_prints_toml() {
    let Ok(project) = Project::new(&[], &[]) else {
        return;
    };
    project
        .command()
        .arg("rules")
        .arg(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("entry-script = \"main_ui.py\""))
        .stdout(predicate::str::contains("[toolkit]"));
}

#[test]
fn test_invalid_rules_file_fails() {
    let Ok(project) = Project::new(&[], &["main_ui.py"]) else {
        return;
    };
    let rules = project.root().join("broken.toml");
    if fs::write(&rules, "core-dirs = 3").is_err() {
        return;
    }
    project
        .command()
        .arg("resolve")
        .arg(project.root())
        .arg("--rules")
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse rules file"));
}

#[test]
fn test_rules_file_from_environment_variable() {
    let Ok(project) = Project::new(&[], &[]) else {
        return;
    };
    let rules = project.root().join("custom.toml");
    if fs::write(&rules, "entry-script = \"launcher.py\"\n").is_err() {
        return;
    }
    project
        .command()
        .env("FREEZER_RULES", &rules)
        .arg("rules")
        .arg(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("entry-script = \"launcher.py\""));
}
