//! Command-line interface definitions for elfcat.

use std::fmt;
use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

/// Dump raw section and segment contents from ELF object files.
///
/// Every action flag is applied to every input file: files are processed in
/// the order given, and within one file the actions run in the order their
/// flags appeared on the command line. Extracted bytes go to stdout,
/// diagnostics to stderr.
#[derive(Parser)]
#[command(name = "elfcat", version, about)]
pub struct Cli {
    /// Dump the named section's logical contents (repeatable).
    #[arg(long, value_name = "NAME")]
    pub section_name: Vec<String>,

    /// Dump the section at this ordinal index (repeatable).
    #[arg(long, value_name = "INDEX")]
    pub section_index: Vec<u64>,

    /// Dump the program header (segment) at this ordinal index (repeatable).
    #[arg(long, value_name = "INDEX")]
    pub program_index: Vec<u64>,

    /// Trace each lookup and emitted range on stderr.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// ELF files to process.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// One requested extraction, in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `--section-name NAME`
    SectionName(String),
    /// `--section-index N`
    SectionIndex(u64),
    /// `--program-index N`
    ProgramIndex(u64),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SectionName(name) => write!(f, "--section-name {name}"),
            Self::SectionIndex(index) => write!(f, "--section-index {index}"),
            Self::ProgramIndex(index) => write!(f, "--program-index {index}"),
        }
    }
}

/// Parse the process arguments.
///
/// Returns the parsed options together with the action list in the order the
/// flags appeared, which clap's grouped-by-flag derive output does not
/// preserve on its own.
pub fn parse() -> (Cli, Vec<Action>) {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let actions = actions_in_order(&cli, &matches);
    (cli, actions)
}

/// Rebuild the interleaved action order from clap's argument indices.
fn actions_in_order(cli: &Cli, matches: &ArgMatches) -> Vec<Action> {
    let mut actions: Vec<(usize, Action)> = Vec::new();

    if let Some(indices) = matches.indices_of("section_name") {
        for (index, name) in indices.zip(&cli.section_name) {
            actions.push((index, Action::SectionName(name.clone())));
        }
    }
    if let Some(indices) = matches.indices_of("section_index") {
        for (index, &ordinal) in indices.zip(&cli.section_index) {
            actions.push((index, Action::SectionIndex(ordinal)));
        }
    }
    if let Some(indices) = matches.indices_of("program_index") {
        for (index, &ordinal) in indices.zip(&cli.program_index) {
            actions.push((index, Action::ProgramIndex(ordinal)));
        }
    }

    actions.sort_by_key(|&(index, _)| index);
    actions.into_iter().map(|(_, action)| action).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
