use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use cubesym_mcu_db::{group_key, read_mcu_file, ReadOptions};
use cubesym_symbol::{generate_symbols, LayoutSelection, LibraryWriter, LogSink};
use globset::{Glob, GlobMatcher};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use log::{debug, info};
use walkdir::WalkDir;

use crate::config::{FileConfig, GenerateSettings};

#[derive(Args, Debug, Clone)]
#[command(about = "Generate KiCad symbol libraries from an MCU database directory")]
pub struct GenerateArgs {
    /// Directory holding the per-chip XML files (`db/mcu` of an STM32Cube install)
    #[arg(value_name = "DB_DIR", value_hint = clap::ValueHint::DirPath)]
    pub db_dir: PathBuf,

    /// Directory the `.kicad_sym` libraries are written to
    #[arg(short, long, value_name = "OUT_DIR", value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// File name pattern selecting definitions [default: STM32*.xml]
    #[arg(long)]
    pub pattern: Option<String>,

    /// Symbol variants per chip: single, multi or both [default: both]
    #[arg(long, value_name = "MODE")]
    pub layout: Option<LayoutSelection>,

    /// Label pins with their names only, without alternate functions
    #[arg(long)]
    pub short_pins: bool,

    /// Leading file name characters that pick the library a chip goes into [default: 7]
    #[arg(long, value_name = "N")]
    pub group_prefix_len: Option<usize>,

    /// TOML file with defaults for the options above
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Do not draw a progress bar
    #[arg(long)]
    pub quiet: bool,
}

impl GenerateArgs {
    fn settings(&self) -> Result<GenerateSettings> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        GenerateSettings::resolve(
            file,
            self.layout,
            self.short_pins,
            self.group_prefix_len,
            self.pattern.clone(),
        )
    }
}

/// Definition files directly inside `dir` whose names match `matcher`, sorted
/// by name.
pub fn collect_definitions(dir: &Path, matcher: &GlobMatcher) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_type().is_file() && matcher.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn progress_bar(total: u64, hidden: bool) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("|{bar:40.green/gray}| {spinner:.green} [{pos}/{len}] {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    if hidden {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        bar.enable_steady_tick(Duration::from_millis(100));
    }
    bar
}

#[derive(Debug, Default)]
struct Summary {
    chips: usize,
    symbols: usize,
    libraries: Vec<PathBuf>,
}

fn write_library(
    path: &Path,
    sources: &[PathBuf],
    settings: &GenerateSettings,
    bar: &ProgressBar,
    summary: &mut Summary,
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = LibraryWriter::new(BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let options = ReadOptions {
        collect_signals: settings.collect_signals,
    };

    for source in sources {
        let name = source.file_name().unwrap_or_default().to_string_lossy();
        bar.set_message(name.to_string());

        let mcu = read_mcu_file(source, &options)
            .with_context(|| format!("Failed to load {}", source.display()))?;
        debug!("Generating symbols for {}", mcu.ref_name);

        let mut sink = LogSink::new(mcu.ref_name.clone());
        let symbols = generate_symbols(&mcu, settings.layout, settings.labels(), &mut sink)
            .with_context(|| format!("Failed to lay out {}", mcu.ref_name))?;
        for symbol in &symbols {
            writer
                .write_symbol(symbol)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        summary.chips += 1;
        bar.inc(1);
    }

    summary.symbols += writer.symbols_written();
    writer
        .finish()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    summary.libraries.push(path.to_path_buf());
    Ok(())
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let settings = args.settings()?;
    debug!("Settings: {settings:?}");

    let matcher = Glob::new(&settings.pattern)
        .with_context(|| format!("Invalid file pattern '{}'", settings.pattern))?
        .compile_matcher();

    if !args.db_dir.is_dir() {
        anyhow::bail!("{} is not a directory", args.db_dir.display());
    }
    let sources = collect_definitions(&args.db_dir, &matcher)?;
    if sources.is_empty() {
        anyhow::bail!(
            "No files matching '{}' found in {}",
            settings.pattern,
            args.db_dir.display()
        );
    }
    info!("Found {} MCU definitions", sources.len());

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let groups = sources
        .iter()
        .chunk_by(|path| group_key(path, settings.group_prefix_len));

    let bar = progress_bar(sources.len() as u64, args.quiet);
    let mut summary = Summary::default();

    for (key, members) in &groups {
        let members: Vec<PathBuf> = members.cloned().collect();
        let Some(key) = key else {
            anyhow::bail!("Cannot derive a library name from {}", members[0].display());
        };
        let path = args.output.join(format!("{key}.kicad_sym"));
        debug!("Library {} <- {} files", path.display(), members.len());

        if let Err(e) = write_library(&path, &members, &settings, &bar, &mut summary) {
            bar.abandon_with_message(format!("{} {}", "✗".red(), key));
            return Err(e);
        }
    }

    bar.finish_and_clear();

    println!(
        "{} Generated {} symbols for {} chips into {} libraries",
        "✓".green(),
        summary.symbols.to_string().bold(),
        summary.chips.to_string().bold(),
        summary.libraries.len().to_string().bold()
    );
    println!(
        "  {}",
        summary
            .libraries
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy())
            .join(", ")
            .dimmed()
    );

    Ok(())
}
