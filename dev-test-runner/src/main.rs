//! Runs the JSON fixture suites under `fixtures/` (or the directory given as
//! the first argument) through the matcher and reports every disagreement.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use json_conform::{path_de, Schema, Validator};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Suite {
    description: String,
    schema: Schema,
    #[serde(default)]
    valid: Vec<Value>,
    #[serde(default)]
    invalid: Vec<Value>,
}

fn suite_files(dir: &Path) -> Result<Vec<PathBuf>, glob::PatternError> {
    let pattern = format!("{}/**/*.json", dir.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(Result::ok).collect();
    files.sort();
    Ok(files)
}

fn main() -> ExitCode {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("fixtures"));
    let validator: Validator = Validator::default();

    let files = match suite_files(&dir) {
        Ok(x) => x,
        Err(error) => {
            eprintln!("{} {}: {error}", "bad fixture directory".red(), dir.display());
            return ExitCode::FAILURE;
        }
    };

    let mut cases = 0usize;
    let mut mismatches = 0usize;
    for file in files {
        let bytes = match std::fs::read(&file) {
            Ok(x) => x,
            Err(error) => {
                eprintln!("{} {}: {error}", "unreadable".red(), file.display());
                mismatches += 1;
                continue;
            }
        };
        let suites = match path_de::from_slice_with_path::<Vec<Suite>>(&bytes) {
            Ok(x) => x,
            Err(error) => {
                eprintln!("{} {}: {error}", "malformed".red(), file.display());
                mismatches += 1;
                continue;
            }
        };
        for suite in suites {
            let expectations = suite
                .valid
                .iter()
                .map(|v| (v, true))
                .chain(suite.invalid.iter().map(|v| (v, false)));
            for (value, expected) in expectations {
                cases += 1;
                let actual = validator.matches_schema(value, &suite.schema);
                if actual != expected {
                    mismatches += 1;
                    eprintln!(
                        "{} {} :: {} → expected {expected}, got {actual}",
                        "✗".red().bold(),
                        file.display(),
                        suite.description,
                    );
                    eprintln!("    value: {value}");
                }
            }
        }
    }

    if mismatches == 0 {
        eprintln!("{} {cases} cases", "✓".green().bold());
        ExitCode::SUCCESS
    } else {
        eprintln!("{} {mismatches} problems across {cases} cases", "✗".red().bold());
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_directory_is_an_error() {
        assert!(suite_files(Path::new("fixtures[")).is_err());
        let files = suite_files(Path::new("../fixtures")).unwrap();
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e == "json")));
    }
}
