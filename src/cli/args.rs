//! Defines the command-line arguments and subcommands for the polmatrix CLI.
//!
//! Session option flags mirror the fields of
//! [`SessionOptions`](crate::options::SessionOptions). A flag that is given
//! overrides the same field read from `--options FILE`; a flag left out keeps
//! the file's value (or the built-in default).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::options::SessionOptions;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "polmatrix",
    version,
    about = "Expands policy, test, and rule-cache options into a test parameter matrix."
)]
pub struct MatrixArgs {
    /// YAML or JSON file with session options.
    #[arg(long, global = true, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// YAML or JSON file mapping test group names to their tests.
    #[arg(long, global = true, value_name = "FILE")]
    pub groups: Option<PathBuf>,

    /// Log expansion details to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub session: SessionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Per-field overrides for the session options.
#[derive(Debug, Default, Args)]
pub struct SessionArgs {
    /// Which sim to use (renode, qemu).
    #[arg(long, global = true)]
    pub sim: Option<String>,
    /// What runtime the tests are compiled for.
    #[arg(long, global = true)]
    pub runtime: Option<String>,
    /// Path to SOC config file.
    #[arg(long, global = true)]
    pub soc: Option<String>,
    /// Which test(s) or test group(s) to run.
    #[arg(long, global = true)]
    pub test: Option<String>,
    /// Which global policies to use.
    #[arg(long, global = true)]
    pub gpolicies: Option<String>,
    /// Which policies to use.
    #[arg(long, global = true)]
    pub policies: Option<String>,
    /// Which rule caches to use (ideal, finite, dmhc). Empty for none.
    #[arg(long, global = true)]
    pub rule_cache: Option<String>,
    /// Sizes of rule cache, if one is used.
    #[arg(long, global = true)]
    pub rule_cache_size: Option<String>,
    /// Optional policy module prefix; composites are only built when set.
    #[arg(long, global = true)]
    pub module: Option<String>,
    /// What composite policies to build (simple, full, else none).
    #[arg(long, global = true)]
    pub composite: Option<String>,
    /// Pass debug options to testing tasks ('debug' to activate).
    #[arg(long, global = true)]
    pub isp_debug: Option<String>,
    /// Which processor architecture to use.
    #[arg(long, global = true)]
    pub arch: Option<String>,
    /// Extra argument to pass to the run step (repeatable).
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
    /// Per-test timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl SessionArgs {
    /// Overwrites every field of `options` that was given on the command line.
    pub fn apply(&self, options: &mut SessionOptions) {
        let fields = [
            (&self.sim, &mut options.sim),
            (&self.runtime, &mut options.runtime),
            (&self.soc, &mut options.soc),
            (&self.test, &mut options.test),
            (&self.gpolicies, &mut options.gpolicies),
            (&self.policies, &mut options.policies),
            (&self.rule_cache, &mut options.rule_cache),
            (&self.rule_cache_size, &mut options.rule_cache_size),
            (&self.module, &mut options.module),
            (&self.composite, &mut options.composite),
            (&self.isp_debug, &mut options.isp_debug),
            (&self.arch, &mut options.arch),
        ];
        for (flag, field) in fields {
            if let Some(value) = flag {
                *field = value.clone();
            }
        }
        if !self.extra.is_empty() {
            options.extra = self.extra.clone();
        }
        if self.timeout.is_some() {
            options.timeout = self.timeout;
        }
    }
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every requested dimension and its ordered values.
    Expand {
        /// Comma-separated dimensions to emit (default: all).
        #[arg(long)]
        dims: Option<String>,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the identifier of every case in the Cartesian product.
    Cases {
        /// Comma-separated dimensions to cross (default: all).
        #[arg(long)]
        dims: Option<String>,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the composite policies for one comma-separated policy list.
    Composites {
        /// Policies, e.g. `heap,rwx,none`.
        #[arg(required = true)]
        list: String,
        /// Composition mode (simple, full, else none).
        #[arg(long, default_value = "simple")]
        mode: String,
    },
    /// Print the sorted tests a comma-separated list of tests and groups resolves to.
    Resolve {
        #[arg(required = true)]
        list: String,
    },
    /// Print the SHA-256 fingerprint of the expanded matrix.
    Fingerprint {
        /// Comma-separated dimensions to include (default: all).
        #[arg(long)]
        dims: Option<String>,
    },
}
