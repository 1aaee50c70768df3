//! Minimal CLI: check documents against a schema, vet options, vet tags
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use json_conform::{
    extend_object, is_valid_options, is_valid_type_tag, path_de, Options, Schema, Validator,
    DEFAULT_MAX_DEPTH,
};
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, info};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON/NDJSON documents against a declarative structural schema
#[derive(Parser, Debug)]
#[command(name = "json-conform", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// check every input document against a schema
    Check(CheckCmd),
    /// merge options documents, then validate and normalize the result
    Options(OptionsCmd),
    /// report whether the given literal(s) form a valid type-tag set
    Tag(TagCmd),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckCmd {
    #[command(flatten)]
    input_settings: InputSettings,

    /// schema file (one node or an array of alternatives)
    #[arg(short, long)]
    schema: PathBuf,

    /// maximum schema nesting before a document is reported as an error
    #[arg(long, env = "JSON_CONFORM_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// only print failures
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Parser, Debug)]
struct OptionsCmd {
    /// options documents, merged left to right (later keys win)
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct TagCmd {
    /// tag literals, e.g. `string` or `5`; several form a sequence
    #[arg(num_args = 1.., required = true)]
    tags: Vec<String>,
}

/// One document pulled from the inputs, labelled for reporting.
struct Document {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source_path_str})"))?;
            if self.ndjson {
                for (index, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let label = format!("{source_path_str}:{}", index + 1);
                    let value = path_de::from_str_with_path::<Value>(line)
                        .with_context(|| format!("failed to parse JSON line ({label})"))?;
                    out.push(self.select(label, value)?);
                }
            } else {
                let value = path_de::from_str_with_path::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                out.push(self.select(source_path_str, value)?);
            }
        }
        debug!(documents = out.len(), "inputs loaded");
        Ok(out)
    }

    fn select(&self, source: String, value: Value) -> Result<Document> {
        let Some(pointer) = self.json_pointer.as_deref() else {
            return Ok(Document { source, value });
        };
        match value.pointer(pointer) {
            Some(found) => Ok(Document { source, value: found.clone() }),
            None => bail!("JSON pointer {pointer} selects nothing in {source}"),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => target.run(),
            Command::Options(target) => target.run(),
            Command::Tag(target) => target.run(),
        }
    }
}

impl CheckCmd {
    fn run(&self) -> Result<ExitCode> {
        let schema_src = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read schema file ({})", self.schema.display()))?;
        let schema = path_de::from_str_with_path::<Schema>(&schema_src)
            .with_context(|| format!("failed to parse schema file ({})", self.schema.display()))?;
        let documents = self.input_settings.load()?;

        let validator: Validator = Validator::default().with_max_depth(self.max_depth);
        let outcomes = documents
            .par_iter()
            .map(|doc| validator.try_matches_schema(&doc.value, &schema))
            .collect::<Vec<_>>();

        let mut failed = 0usize;
        for (doc, outcome) in documents.iter().zip(outcomes) {
            match outcome {
                Ok(true) => {
                    if !self.quiet {
                        println!("{} {}", "PASS".green().bold(), doc.source);
                    }
                }
                Ok(false) => {
                    failed += 1;
                    println!("{} {}", "FAIL".red().bold(), doc.source);
                }
                Err(error) => {
                    failed += 1;
                    println!("{} {} ({error})", "ERROR".yellow().bold(), doc.source);
                }
            }
        }
        info!(total = documents.len(), failed, "check finished");
        if !self.quiet {
            eprintln!("{} of {} documents conform", documents.len() - failed, documents.len());
        }
        Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

impl OptionsCmd {
    fn run(&self) -> Result<ExitCode> {
        let mut layers = Vec::new();
        for path in resolve_file_path_patterns(&self.input)? {
            let src = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read options file ({})", path.display()))?;
            let layer = path_de::from_str_with_path::<Value>(&src)
                .with_context(|| format!("failed to parse options file ({})", path.display()))?;
            if !layer.is_object() {
                eprintln!("{} {} is not a mapping; skipped", "warning:".yellow(), path.display());
            }
            layers.push(layer);
        }
        let mut merged = Map::new();
        extend_object(&mut merged, &layers);
        let merged = Value::Object(merged);

        let permissive = is_valid_options(Some(&merged));
        eprintln!("well-formed: {permissive}");
        match Options::new(&merged) {
            Ok(options) => {
                println!("{}", serde_json::to_string_pretty(&options.to_value())?);
                Ok(ExitCode::SUCCESS)
            }
            Err(error) => {
                println!("{} {error}", "INVALID".red().bold());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

impl TagCmd {
    fn run(&self) -> Result<ExitCode> {
        // bare words are tag names; anything that parses as JSON is taken as JSON
        let literal = |raw: &String| {
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.clone()))
        };
        let candidate = match self.tags.as_slice() {
            [single] => literal(single),
            many => Value::Array(many.iter().map(literal).collect()),
        };
        if is_valid_type_tag(&candidate) {
            println!("{} {candidate}", "VALID".green().bold());
            Ok(ExitCode::SUCCESS)
        } else {
            println!("{} {candidate}", "INVALID".red().bold());
            Ok(ExitCode::FAILURE)
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            out.push(entry?);
        }
        if out.len() == before {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}
