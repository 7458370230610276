mod error;
mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ps_network::{IndexMap, Partition};
use ps_solver::{OrderingPolicy, SolverConfig, SolverResult, solve_partition, solve_partitions};
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::report::{BatchEntry, SolveReport};

#[derive(Parser)]
#[command(name = "partsolve")]
#[command(about = "partsolve - Sparse nodal solves for network partitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one partition assembled from all given source files
    Solve {
        /// Partition source files (YAML or JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Solver configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Column ordering (natural, min_degree_a_plus_at, min_degree_at_a)
        #[arg(long)]
        ordering: Option<OrderingPolicy>,
        /// Threshold pivoting tolerance in (0, 1]
        #[arg(long)]
        pivot_tolerance: Option<f64>,
        /// Relative pivot floor below which a column is singular, in [0, 1)
        #[arg(long)]
        singular_tolerance: Option<f64>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the index map, dense matrix and right-hand side without solving
    Inspect {
        /// Partition source files (YAML or JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Solve each file as an independent partition, in parallel
    Batch {
        /// One partition per file
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Solver configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            files,
            config,
            ordering,
            pivot_tolerance,
            singular_tolerance,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(ordering) = ordering {
                config.ordering = ordering;
            }
            if let Some(tol) = pivot_tolerance {
                config.pivot_tolerance = tol;
            }
            if let Some(tol) = singular_tolerance {
                config.singular_tolerance = tol;
            }
            config.validate()?;
            cmd_solve(&files, &config, json)
        }
        Commands::Inspect { files } => cmd_inspect(&files),
        Commands::Batch {
            files,
            config,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            cmd_batch(&files, &config, json)
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<SolverConfig> {
    match path {
        Some(path) => Ok(ps_project::load_solver_config(path)?),
        None => Ok(SolverConfig::default()),
    }
}

fn cmd_solve(files: &[PathBuf], config: &SolverConfig, json: bool) -> CliResult<()> {
    let partition = ps_project::load_partition(files)?;
    info!(ordering = %config.ordering, "solving partition");
    let solution = solve_partition(&partition, config)?;
    let report = SolveReport::new(partition.name.clone(), &solution);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_text();
    }
    Ok(())
}

fn cmd_inspect(files: &[PathBuf]) -> CliResult<()> {
    let partition = ps_project::load_partition(files)?;
    let index = IndexMap::build(partition.branches(), partition.reference);

    println!("Reference node: {}", index.reference());
    println!(
        "Branches: {} interior, {} boundary",
        partition.interior().len(),
        partition.boundary().len()
    );
    if index.is_empty() {
        println!("No unknowns besides the reference node");
        return Ok(());
    }

    println!("Index map:");
    for (node, idx) in index.iter() {
        println!("  {node} -> {idx}");
    }

    let matrix = ps_assembly::assemble_matrix(partition.branches(), &index)?;
    let rhs = ps_assembly::build_rhs(&partition.injections, &index, index.len())?;
    println!("Matrix ({} stored entries):", matrix.nnz());
    print!("{}", matrix.to_dense());
    println!("Right-hand side:");
    for (i, b) in rhs.iter().enumerate() {
        println!("  [{i}] {b}");
    }
    Ok(())
}

fn cmd_batch(files: &[PathBuf], config: &SolverConfig, json: bool) -> CliResult<()> {
    let mut entries: Vec<BatchEntry> = Vec::with_capacity(files.len());
    let mut loaded: Vec<(usize, Partition)> = Vec::new();
    for (slot, file) in files.iter().enumerate() {
        entries.push(BatchEntry {
            file: file.display().to_string(),
            report: None,
            error: None,
        });
        match ps_project::load_partition(std::slice::from_ref(file)) {
            Ok(p) => loaded.push((slot, p)),
            Err(e) => entries[slot].error = Some(e.to_string()),
        }
    }

    let (slots, partitions): (Vec<usize>, Vec<Partition>) = loaded.into_iter().unzip();
    let results: Vec<SolverResult<_>> = solve_partitions(&partitions, config);
    for ((slot, partition), result) in slots.into_iter().zip(&partitions).zip(results) {
        match result {
            Ok(solution) => {
                entries[slot].report = Some(SolveReport::new(partition.name.clone(), &solution));
            }
            Err(e) => entries[slot].error = Some(e.to_string()),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            match (&entry.report, &entry.error) {
                (Some(report), _) => {
                    let mark = if report.residual.passed { "✓" } else { "!" };
                    println!(
                        "{mark} {}: {} unknowns, residual {:.3e}",
                        entry.file,
                        report.nodes.len(),
                        report.residual.max_abs
                    );
                }
                (None, Some(err)) => println!("✗ {}: {err}", entry.file),
                (None, None) => {}
            }
        }
    }

    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    if failed > 0 {
        return Err(CliError::BatchFailed {
            failed,
            total: entries.len(),
        });
    }
    Ok(())
}
