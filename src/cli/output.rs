//! Handles all user-facing output for the CLI.
//!
//! Text output goes through `termcolor` so headers are highlighted on a
//! terminal and plain when piped; JSON output is pretty-printed with
//! `serde_json`. Every printer takes a writer so tests can capture output in a
//! `termcolor::Buffer`.

use std::io::Write;

use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::diagnostics::MatrixError;
use crate::matrix::{Dimension, ParamValue, ParameterMatrix};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints each dimension as a colored header followed by its values.
pub fn print_dimensions<W: WriteColor>(out: &mut W, matrix: &ParameterMatrix) -> Result<(), MatrixError> {
    for dimension in &matrix.dimensions {
        print_dimension(out, dimension).map_err(stdout_error)?;
    }
    Ok(())
}

/// Prints one case identifier per line, followed by a dimmed total.
pub fn print_case_ids<W: WriteColor>(out: &mut W, matrix: &ParameterMatrix) -> Result<(), MatrixError> {
    let mut total = 0usize;
    for case in matrix.cases() {
        writeln!(out, "{}", display_id(&case.id)).map_err(stdout_error)?;
        total += 1;
    }
    out.set_color(ColorSpec::new().set_dimmed(true))
        .map_err(stdout_error)?;
    writeln!(out, "{total} case(s)").map_err(stdout_error)?;
    out.reset().map_err(stdout_error)?;
    Ok(())
}

/// Prints a plain list, one entry per line.
pub fn print_list<W: Write, S: AsRef<str>>(out: &mut W, items: &[S]) -> Result<(), MatrixError> {
    for item in items {
        writeln!(out, "{}", item.as_ref()).map_err(stdout_error)?;
    }
    Ok(())
}

/// Pretty-prints any serializable value as JSON.
pub fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), MatrixError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| MatrixError::options(format!("failed to encode JSON: {e}"), None))?;
    writeln!(out, "{text}").map_err(stdout_error)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_dimension<W: WriteColor>(out: &mut W, dimension: &Dimension) -> std::io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(out, "{}", dimension.kind)?;
    out.reset()?;
    writeln!(out, " ({})", dimension.values.len())?;
    for value in &dimension.values {
        writeln!(out, "  {}", display_value(value))?;
    }
    Ok(())
}

/// Quotes empty strings so the "no value" entries stay visible.
fn display_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Text(text) if text.is_empty() => "''".to_string(),
        ParamValue::Text(text) => text.clone(),
        ParamValue::Flag(flag) => flag.to_string(),
        ParamValue::Cache(cache) if cache.is_neutral() => "('', '')".to_string(),
        ParamValue::Cache(cache) => format!("({}, {})", cache.kind, cache.size),
    }
}

fn display_id(id: &str) -> &str {
    if id.is_empty() {
        "<default>"
    } else {
        id
    }
}

fn stdout_error(e: std::io::Error) -> MatrixError {
    MatrixError::io("write", "<stdout>", e)
}
