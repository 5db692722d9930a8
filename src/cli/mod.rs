//! The polmatrix Command-Line Interface.
//!
//! Stands in for the configuration layer of a test framework: it gathers the
//! raw option strings, hands them to the expander, and prints the resulting
//! dimensions, cases, or fingerprint.

use std::io::IsTerminal;
use std::process;

use clap::Parser;
use termcolor::{ColorChoice, StandardStream};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, MatrixArgs};
use crate::compose::compose_dimension;
use crate::groups::TestGroups;
use crate::matrix::{parse_dimensions, DimensionKind, MatrixExpander, ParameterMatrix};
use crate::names::split_names;
use crate::options::SessionOptions;
use crate::policy::CompositeMode;
use crate::MatrixError;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = MatrixArgs::parse();
    init_tracing(args.verbose);

    if let Err(e) = dispatch(&args) {
        eprintln!("{:?}", miette::Report::new(e));
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "polmatrix=debug" } else { "polmatrix=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Dispatch to the appropriate subcommand handler.
pub fn dispatch(args: &MatrixArgs) -> Result<(), MatrixError> {
    let options = load_options(args)?;
    let groups = match &args.groups {
        Some(path) => TestGroups::load(path)?,
        None => TestGroups::new(),
    };
    let expander = MatrixExpander::new(&options, &groups);
    let color = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(color);

    match &args.command {
        Command::Expand { dims, json } => {
            let matrix = expand(&expander, dims.as_deref())?;
            if *json {
                output::print_json(&mut stdout, &matrix)
            } else {
                output::print_dimensions(&mut stdout, &matrix)
            }
        }
        Command::Cases { dims, json } => {
            let matrix = expand(&expander, dims.as_deref())?;
            if *json {
                let cases: Vec<_> = matrix.cases().collect();
                output::print_json(&mut stdout, &cases)
            } else {
                output::print_case_ids(&mut stdout, &matrix)
            }
        }
        Command::Composites { list, mode } => {
            let mode = CompositeMode::from_selector(mode);
            let composites = compose_dimension(split_names(list), mode, true);
            output::print_list(&mut stdout, &composites)
        }
        Command::Resolve { list } => output::print_list(&mut stdout, &groups.resolve(&split_names(list))),
        Command::Fingerprint { dims } => {
            let matrix = expand(&expander, dims.as_deref())?;
            output::print_list(&mut stdout, &[matrix.fingerprint()])
        }
    }
}

/// File options first, then command-line overrides.
fn load_options(args: &MatrixArgs) -> Result<SessionOptions, MatrixError> {
    let mut options = match &args.options {
        Some(path) => SessionOptions::load(path)?,
        None => SessionOptions::default(),
    };
    args.session.apply(&mut options);
    debug!(?options, "effective session options");
    Ok(options)
}

fn expand(expander: &MatrixExpander<'_>, dims: Option<&str>) -> Result<ParameterMatrix, MatrixError> {
    match dims {
        Some(raw) => Ok(expander.expand(&parse_dimensions(raw)?)),
        None => Ok(expander.expand(&DimensionKind::ALL)),
    }
}
