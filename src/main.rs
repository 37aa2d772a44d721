use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use intermediarygen::setup::{MappingJob, MappingLoader, ProjectAcceptor};
use intermediarygen::symbol::ClassEntry;
use intermediarygen::{
    setup_project, Config, IntermediaryGenerator, NameStore, OsName, ProjectInputs, Side,
    SymbolKind, SymbolProvider,
};

/// intermediarygen - deterministic intermediary naming and project setup
#[derive(Parser, Debug)]
#[command(name = "intermediarygen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate intermediary names for one side of a comparison
    Generate {
        /// Symbol hierarchy dump (JSON array of classes with members)
        #[arg(long, value_name = "FILE")]
        symbols: PathBuf,

        /// Counter file to load (with --continued) and save
        #[arg(long, value_name = "FILE")]
        counter_file: Option<PathBuf>,

        /// Continue numbering from the counter file instead of starting at 1
        #[arg(long)]
        continued: bool,

        /// Existing name assignments to respect (JSON object, id -> name)
        #[arg(long, value_name = "FILE")]
        names: Option<PathBuf>,

        /// Where to write the resulting name assignments (JSON)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Side to generate for
        #[arg(long, default_value = "b")]
        side: String,
    },

    /// Resolve two release manifests into a comparison project
    Setup {
        /// Release manifest for side A
        #[arg(long, value_name = "FILE")]
        manifest_a: PathBuf,

        /// Release manifest for side B
        #[arg(long, value_name = "FILE")]
        manifest_b: PathBuf,

        /// Directory to search for artifacts (can be given multiple times)
        #[arg(short, long, value_name = "DIR")]
        dir: Vec<PathBuf>,

        /// Manifest OS name (linux, osx, windows); defaults to this machine
        #[arg(long)]
        os: Option<String>,

        /// Where to write the resolved project inputs (JSON)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let result = match cli.command {
        Command::Generate {
            symbols,
            counter_file,
            continued,
            names,
            output,
            side,
        } => run_generate(&config, symbols, counter_file, continued, names, output, &side),
        Command::Setup {
            manifest_a,
            manifest_b,
            dir,
            os,
            output,
        } => run_setup(&config, manifest_a, manifest_b, dir, os, output),
    };

    if let Err(ref err) = result {
        // Blocking-alert equivalent: one highlighted terminal message.
        eprintln!("{} {:#}", "error:".red().bold(), err);
    }

    result
}

/// Symbol provider backed by a JSON hierarchy dump.
struct JsonSymbolProvider {
    classes: Vec<ClassEntry>,
}

impl JsonSymbolProvider {
    fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read symbol dump {}", path.display()))?;

        let classes = serde_json::from_str(&contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to parse symbol dump {}", path.display()))?;

        Ok(Self { classes })
    }
}

impl SymbolProvider for JsonSymbolProvider {
    fn classes(&self, _side: Side) -> Vec<ClassEntry> {
        self.classes.clone()
    }
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    config: &Config,
    symbols: PathBuf,
    counter_file: Option<PathBuf>,
    continued: bool,
    names: Option<PathBuf>,
    output: Option<PathBuf>,
    side: &str,
) -> Result<()> {
    let side = parse_side(side)?;

    let counter_file = counter_file
        .or_else(|| config.counter_file.clone())
        .ok_or_else(|| miette::miette!("no counter file given (--counter-file or config)"))?;

    let provider = JsonSymbolProvider::load(&symbols)?;

    let mut store = NameStore::new();
    if let Some(path) = names {
        let contents = std::fs::read_to_string(&path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read name store {}", path.display()))?;
        let existing: BTreeMap<String, String> =
            serde_json::from_str(&contents).into_diagnostic()?;

        for (id, name) in existing {
            store.insert(intermediarygen::SymbolId::new(id), name);
        }
    }

    let generator = if continued {
        IntermediaryGenerator::continued(side, &counter_file)
    } else {
        IntermediaryGenerator::new(side, &counter_file)
    };

    let report = generator.generate(&provider, &mut store).into_diagnostic()?;

    for assignment in &report.assignments {
        let mapped = match &assignment.mapped_name {
            Some(name) => format!(" ({})", name),
            None => String::new(),
        };
        println!(
            "{} {} -> {}{}",
            assignment.kind.display_name(),
            assignment.old_name,
            assignment.new_name.green(),
            mapped.dimmed()
        );
    }

    println!(
        "{} {} classes, {} methods, {} fields",
        "assigned:".bold(),
        report.count_of(SymbolKind::Class),
        report.count_of(SymbolKind::Method),
        report.count_of(SymbolKind::Field),
    );

    if let Some(path) = output {
        let map: BTreeMap<&str, &str> = store
            .iter()
            .map(|(id, name)| (id.as_str(), name))
            .collect();
        let json = serde_json::to_string_pretty(&map).into_diagnostic()?;
        std::fs::write(&path, json).into_diagnostic()?;
        println!("Names written to: {}", path.display());
    }

    Ok(())
}

/// There is no matching engine on the CLI side, so project "loading" only
/// logs what a host would now open.
struct AcceptingHost;

impl ProjectAcceptor for AcceptingHost {
    fn create_project(&mut self, inputs: &ProjectInputs) -> Result<bool, anyhow::Error> {
        info!(
            inputs_a = inputs.inputs_a.len(),
            inputs_b = inputs.inputs_b.len(),
            "project inputs accepted"
        );
        Ok(true)
    }
}

/// Loader that only announces the files the host would now import.
struct AnnouncingLoader;

impl MappingLoader for AnnouncingLoader {
    fn load(&mut self, job: &MappingJob) -> Result<(), anyhow::Error> {
        info!(path = %job.path.display(), side = %job.side, "mapping file ready");
        Ok(())
    }
}

fn run_setup(
    config: &Config,
    manifest_a: PathBuf,
    manifest_b: PathBuf,
    mut dirs: Vec<PathBuf>,
    os: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    if dirs.is_empty() {
        dirs = config.input_dirs.clone();
    }
    if dirs.is_empty() {
        // Interactive fallback: ask for one directory to search.
        let dir: String = Input::new()
            .with_prompt("Directory to search for artifacts")
            .interact_text()
            .into_diagnostic()?;
        dirs.push(PathBuf::from(dir));
    }

    let os = match os {
        Some(name) => OsName::parse(&name)
            .ok_or_else(|| miette::miette!("unknown OS name: {} (expected linux, osx or windows)", name))?,
        None => config.os_name(),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").into_diagnostic()?);
    spinner.set_message("resolving artifacts...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut acceptor = AcceptingHost;
    let mut loader = AnnouncingLoader;

    let result = setup_project(&manifest_a, &manifest_b, &dirs, os, &mut acceptor, &mut loader);
    spinner.finish_and_clear();
    let inputs = result.into_diagnostic()?;

    print_paths("inputs A", &inputs.inputs_a);
    print_paths("inputs B", &inputs.inputs_b);
    print_paths("shared classpath", &inputs.shared_classpath);
    print_paths("classpath A", &inputs.classpath_a);
    print_paths("classpath B", &inputs.classpath_b);
    print_paths("mappings A", &inputs.mappings_a);
    print_paths("mappings B", &inputs.mappings_b);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&inputs).into_diagnostic()?;
        std::fs::write(&path, json).into_diagnostic()?;
        println!("Project inputs written to: {}", path.display());
    }

    Ok(())
}

fn print_paths(label: &str, paths: &[PathBuf]) {
    println!("{}:", label.bold());
    for path in paths {
        println!("  {}", path.display());
    }
}

fn parse_side(s: &str) -> Result<Side> {
    match s {
        "a" | "A" => Ok(Side::A),
        "b" | "B" => Ok(Side::B),
        other => Err(miette::miette!("unknown side: {} (expected a or b)", other)),
    }
}
