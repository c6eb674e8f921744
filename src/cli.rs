use crate::config::load_config;
use crate::extract::{extract_structure, summarize};
use crate::layout_dump::write_layout_dump;
use crate::optimize::optimize;
use crate::pipeline::{GenerateOptions, generate};
use crate::recover::recover_elements;
use crate::validate::validate;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "drawgen",
    version,
    about = "Turns generated diagram structures into whiteboard elements"
)]
pub struct Args {
    /// Input file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// What to do with the input
    #[arg(short = 'm', long = "mode", value_enum, default_value = "generate")]
    pub mode: Mode,

    /// Named theme, overriding the config file
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write the computed layout as JSON to this path (generate mode)
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Structure text in, element list out
    Generate,
    /// Check an element list and print the verdict
    Validate,
    /// Salvage elements from damaged element-list text
    Recover,
    /// Rebuild a structure from an element list
    Extract,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(theme) = args.theme.as_deref() {
        config = config.with_theme_name(theme)?;
    }
    let input = read_input(args.input.as_deref())?;

    match args.mode {
        Mode::Generate => {
            let options = GenerateOptions::new(config);
            let generated = generate(&input, &options);
            if let Some(path) = args.dump_layout.as_deref() {
                write_layout_dump(
                    path,
                    &generated.layout,
                    &generated.nodes,
                    &generated.structure.edges,
                )?;
            }
            write_output(&generated.elements_json(), args.output.as_deref())?;
        }
        Mode::Validate => {
            let validation = validate(&input);
            write_output(&serde_json::to_string_pretty(&validation)?, args.output.as_deref())?;
            if !validation.passed {
                return Err(anyhow::anyhow!(
                    "validation failed with {} error(s)",
                    validation.errors.len()
                ));
            }
        }
        Mode::Recover => {
            let elements = optimize(recover_elements(&input));
            if elements.is_empty() {
                return Err(anyhow::anyhow!("No elements could be recovered from input"));
            }
            write_output(&serde_json::to_string_pretty(&elements)?, args.output.as_deref())?;
        }
        Mode::Extract => {
            let elements: Vec<serde_json::Value> = serde_json::from_str(&input)?;
            let structure = extract_structure(&elements)
                .ok_or_else(|| anyhow::anyhow!("No labelled shapes found in input"))?;
            log::info!(summary = summarize(&structure).as_str(); "extracted structure");
            write_output(&serde_json::to_string_pretty(&structure)?, args.output.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second init (tests, embedding) is harmless.
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(contents: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::write(path, contents)?,
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
