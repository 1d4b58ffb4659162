mod menu;
mod report;
mod svg;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flair_lang::{CompiledProblem, Compiler};
use flair_solver::{BoundingBox, Prices, RenderPlan, Solver, Viewport, candidate_vertices};
use tracing::{Level, debug};

/// The Flair Furniture case, used when no problem file is given
const FLAIR_SOURCE: &str = "\
maximize 7 x1 + 5 x2
carpentry: 4x1 + 3x2 <= 240
painting:  2x1 + x2 <= 100
chairs:    x2 <= 60
tables_nonneg: x1 >= 0
chairs_nonneg: x2 >= 0
";

#[derive(Parser)]
#[command(name = "flair")]
#[command(about = "Two-product production-mix optimizer", long_about = None)]
struct Cli {
    /// Log solver progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProblemArgs {
    /// A .flair problem file; defaults to the Flair Furniture case
    file: Option<PathBuf>,
    /// Override the price per table (x1)
    #[arg(long)]
    table: Option<f64>,
    /// Override the price per chair (x2)
    #[arg(long)]
    chair: Option<f64>,
    /// Constraint such as "4x1 + 3x2 <= 240"; replaces the default case
    #[arg(short = 'c', long = "constraint", conflicts_with = "file")]
    constraints: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem and print the optimal production mix
    Solve {
        #[command(flatten)]
        problem: ProblemArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a .flair file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// List the feasible vertices of a problem
    Vertices {
        #[command(flatten)]
        problem: ProblemArgs,
    },
    /// Write an SVG chart of the feasible region and optimum
    Plot {
        #[command(flatten)]
        problem: ProblemArgs,
        /// Output file
        #[arg(short, long, default_value = "flair.svg")]
        output: PathBuf,
    },
    /// Interactive six-option menu
    Menu {
        /// Where option 5 writes its chart
        #[arg(short, long, default_value = "flair.svg")]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_problem(args: &ProblemArgs) -> Result<CompiledProblem> {
    let compiler = Compiler::new();
    let mut compiled = match &args.file {
        Some(path) => compiler
            .compile_file(path)
            .with_context(|| format!("cannot load {}", path.display()))?,
        None => compiler.compile_source(FLAIR_SOURCE)?,
    };

    if args.file.is_none() && !args.constraints.is_empty() {
        compiled.problem.constraints.clear();
        compiled.labels.clear();
        for (i, line) in args.constraints.iter().enumerate() {
            let (label, constraint) = compiler.compile_constraint(line)?;
            compiled.problem.add_constraint(constraint);
            compiled.labels.push(label.unwrap_or_else(|| format!("c{}", i + 1)));
        }
    }

    if args.table.is_some() || args.chair.is_some() {
        let current = compiled.problem.prices;
        compiled.problem.prices = Prices::new(
            args.table.unwrap_or(current.table),
            args.chair.unwrap_or(current.chair),
        )
        .context("invalid price override")?;
    }

    debug!(
        constraints = compiled.problem.num_constraints(),
        table = compiled.problem.prices.table,
        chair = compiled.problem.prices.chair,
        "problem loaded"
    );
    Ok(compiled)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Solve { problem, json } => {
            let compiled = load_problem(&problem)?;
            let result = Solver::new().solve(&compiled.problem);

            if json {
                let report = report::solution_json(&compiled, result.as_ref().map_err(|e| *e));
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", compiled.problem.prices)?;
                let constraints = &compiled.problem.constraints;
                report::write_constraints(&mut out, &compiled.labels, constraints)?;
                writeln!(out)?;
                match &result {
                    Ok(solution) => {
                        report::write_vertex_table(&mut out, solution)?;
                        writeln!(out)?;
                        report::write_solution(&mut out, solution, &compiled.labels)?;
                    }
                    Err(e) => report::write_solve_error(&mut out, *e)?,
                }
                out.flush()?;
            }

            if result.is_err() {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => match Compiler::new().compile_file(&file) {
            Ok(compiled) => {
                println!("✓ {} is valid", file.display());
                println!("  objective: {}", compiled.problem.prices);
                println!("  {} constraints", compiled.problem.num_constraints());
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        },
        Commands::Vertices { problem } => {
            let compiled = load_problem(&problem)?;
            let constraints = &compiled.problem.constraints;
            let bounds = BoundingBox::derive(constraints, None);
            let vertices = candidate_vertices(constraints, &bounds);
            if vertices.is_empty() {
                println!("No feasible vertices.");
                std::process::exit(1);
            }
            for p in vertices {
                println!(
                    "{:>10} {:>10}  Z = {}",
                    report::format_number(p.x1, 2),
                    report::format_number(p.x2, 2),
                    report::format_number(compiled.problem.prices.objective(p), 2)
                );
            }
        }
        Commands::Plot { problem, output } => {
            let compiled = load_problem(&problem)?;
            // An unbounded or infeasible problem still gets a chart, without an optimum.
            let solution = Solver::new().solve(&compiled.problem).ok();
            let plan = RenderPlan::build(&compiled.problem, solution.as_ref(), Viewport::default());

            let file = File::create(&output)
                .with_context(|| format!("cannot create {}", output.display()))?;
            let mut writer = BufWriter::new(file);
            svg::write_svg(&mut writer, &plan)?;
            writer.flush()?;
            println!("Chart written to {}", output.display());
        }
        Commands::Menu { output } => {
            let stdin = io::stdin().lock();
            let stdout = io::stdout().lock();
            let mut menu = menu::Menu::new(stdin, stdout, output);
            menu.run()?;
            debug!(status = ?menu.session().status(), "menu closed");
        }
    }

    Ok(())
}
