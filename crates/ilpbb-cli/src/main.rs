mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use ilpbb_problems::ProblemKind;
use ilpbb_search::{BnbOutcome, BnbSettings, BranchAndBound, SimplexOracle};

use crate::report::{format_number, status_label, ResultRow};

#[derive(Parser)]
#[command(name = "ilpbb")]
#[command(about = "Depth-first branch-and-bound for 0/1 benchmark programs", long_about = None)]
struct Cli {
    /// Log search progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single instance file
    Solve {
        /// Instance family and formulation
        kind: Kind,
        /// The instance file
        file: PathBuf,
        #[command(flatten)]
        options: SearchOptions,
    },
    /// Solve every file in a directory, in name order
    Batch {
        /// Instance family and formulation
        kind: Kind,
        /// Directory of instance files
        dir: PathBuf,
        #[command(flatten)]
        options: SearchOptions,
        /// Also write the results to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SearchOptions {
    /// Integrality tolerance
    #[arg(short, long, default_value_t = 1e-6)]
    tolerance: f64,
    /// Time limit in seconds
    #[arg(short = 'l', long, default_value_t = 120.0)]
    time_limit: f64,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Gap,
    UflStrong,
    UflWeak,
    AtspMtz,
    AtspMcf,
}

impl From<Kind> for ProblemKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Gap => ProblemKind::Gap,
            Kind::UflStrong => ProblemKind::UflStrong,
            Kind::UflWeak => ProblemKind::UflWeak,
            Kind::AtspMtz => ProblemKind::AtspMtz,
            Kind::AtspMcf => ProblemKind::AtspMcf,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Solve { kind, file, options } => {
            let kind = ProblemKind::from(kind);
            let outcome = match solve_file(kind, &file, &options, cli.verbose) {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            let row = ResultRow::new(file_name(&file), &outcome);
            match options.format {
                Format::Json => {
                    print_json(&serde_json::json!({
                        "kind": kind,
                        "result": row,
                        "termination": outcome.termination,
                        "stats": outcome.stats,
                    }));
                    return;
                }
                Format::Csv => {
                    print_csv(std::slice::from_ref(&row));
                    return;
                }
                Format::Table => {}
            }

            println!("File: {}", row.file);
            println!("Status: {}", status_label(outcome.termination, outcome.has_solution()));
            println!("Best objective: {}", format_number(outcome.best_objective));
            println!("Best bound: {}", format_number(outcome.best_bound));
            println!("Gap: {}%", format_number(outcome.gap_percent));
            println!("Nodes explored: {}", outcome.nodes_explored);
            println!("Time: {:.3}s", outcome.elapsed.as_secs_f64());
            println!();
            println!("Nodes pruned: {}", outcome.stats.nodes_pruned);
            println!("Nodes infeasible: {}", outcome.stats.nodes_infeasible);
            println!("Nodes timed out: {}", outcome.stats.nodes_timed_out);
            println!("Nodes branched: {}", outcome.stats.nodes_branched);
            println!("Incumbent updates: {}", outcome.stats.incumbent_updates);
            println!("Max depth: {}", outcome.stats.max_depth);

            if let Some(incumbent) = &outcome.incumbent {
                println!();
                println!("Nonzero variables:");
                for (name, value) in incumbent.model.variables.iter().zip(&incumbent.values) {
                    if value.abs() > 1e-6 {
                        println!("  {:20} {:10.4}", name, value);
                    }
                }
            }
        }
        Commands::Batch {
            kind,
            dir,
            options,
            output,
        } => {
            let files = match list_files(&dir) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error reading directory {}: {}", dir.display(), e);
                    std::process::exit(1);
                }
            };

            let mut rows = Vec::new();
            let mut failed = false;
            for file in &files {
                match solve_file(kind.into(), file, &options, cli.verbose) {
                    Ok(outcome) => rows.push(ResultRow::new(file_name(file), &outcome)),
                    Err(e) => {
                        eprintln!("✗ {}: {}", file.display(), e);
                        failed = true;
                    }
                }
            }

            match options.format {
                Format::Json => print_json(&rows),
                Format::Csv => print_csv(&rows),
                Format::Table => print!("{}", report::table(&rows)),
            }

            if let Some(path) = output {
                let written = std::fs::File::create(&path)
                    .map_err(csv::Error::from)
                    .and_then(|file| report::write_csv(file, &rows));
                if let Err(e) = written {
                    eprintln!("Error writing {}: {}", path.display(), e);
                    std::process::exit(1);
                }
                log::info!("Results written to {}", path.display());
            }

            if failed {
                std::process::exit(1);
            }
        }
    }
}

fn solve_file(kind: ProblemKind, file: &Path, options: &SearchOptions, verbose: bool) -> Result<BnbOutcome, String> {
    let source = std::fs::read_to_string(file).map_err(|e| format!("reading {}: {}", file.display(), e))?;
    let problem = kind.build(&source).map_err(|e| e.to_string())?;

    log::info!(
        "{}: {} variables, {} constraints",
        file.display(),
        problem.num_variables(),
        problem.num_constraints()
    );

    let settings = BnbSettings::new()
        .with_tolerance(options.tolerance)
        .with_time_limit_secs(options.time_limit)
        .with_verbose(verbose);

    BranchAndBound::new(settings)
        .solve(problem, &mut SimplexOracle::new())
        .map_err(|e| e.to_string())
}

fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_csv(rows: &[ResultRow]) {
    if let Err(e) = report::write_csv(std::io::stdout().lock(), rows) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
    );
}
