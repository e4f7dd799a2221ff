use std::path::PathBuf;

use ariadne::Source;
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use vscript_symtab::script::{Driver, RunReport, Script, ScriptError};
use vscript_symtab::SymtabError;

#[derive(Debug, Error)]
enum RunError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Failed to read script")]
    Script(#[from] ScriptError),

    #[error("Symbol table error: {0}")]
    Symtab(#[from] SymtabError),

    #[error("Check failed with {0} error(s)")]
    Check(usize),
}

#[derive(Parser)]
#[command(name = "vscript")]
#[command(about = "Scope and overload checker for vscript declaration scripts")]
struct Cli {
    /// Log filter, overrides RUST_LOG (e.g. `vscript_symtab=trace`)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a declaration script through the symbol table
    Check {
        /// Path to the declaration script
        path: PathBuf,

        /// Print the global bindings and allocated slots afterwards
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> Result<(), RunError> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    match cli.command {
        Commands::Check { path, dump } => check(path, dump),
    }
}

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn check(path: PathBuf, dump: bool) -> Result<(), RunError> {
    tracing::info!(path = %path.display(), "checking script");
    let src = std::fs::read_to_string(&path)?;
    let mut cache = (0usize, Source::from(src.clone()));

    let mut script = match Script::parse(&src, 0) {
        Ok(script) => script,
        Err(err) => {
            if let Some(report) = err.report() {
                report.eprint(&mut cache)?;
            }
            return Err(err.into());
        }
    };

    let run = Driver::new().run(&mut script)?;
    let symbols = &script.ast.symbols;

    for recovered in &run.recovered {
        recovered.report(symbols).eprint(&mut cache)?;
    }
    for error in run.diagnostics.iter() {
        error.report(symbols).eprint(&mut cache)?;
    }

    if dump {
        print_dump(&script, &run);
    }

    if run.diagnostics.is_empty() {
        Ok(())
    } else {
        Err(RunError::Check(run.diagnostics.len()))
    }
}

fn print_dump(script: &Script, run: &RunReport) {
    println!("bindings:");
    for (depth, entry) in run.context.bindings() {
        let decl = script.ast.get(entry.decl);
        println!(
            "{:indent$}{} {} ({})",
            "",
            decl.tag(),
            script.ast.name(entry.name),
            decl.loc,
            indent = 2 * (depth + 1)
        );
    }

    if !run.allocations.is_empty() {
        println!("locations:");
        for alloc in &run.allocations {
            let kind = if alloc.reusable { "temp" } else { "slot" };
            println!("  {kind} {} ({})", alloc.location, alloc.loc);
        }
    }
}
