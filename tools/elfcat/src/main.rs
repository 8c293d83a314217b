//! elfcat — dump raw section and segment bytes from ELF object files.
//!
//! Each requested action is applied to every input file: files are processed
//! in argument order, and within one file the actions run in the order their
//! flags appeared. Extracted bytes are written verbatim to stdout; one
//! diagnostic line per failure goes to stderr, and the exit status reports
//! whether every action against every file succeeded.

mod cli;
mod dump;
mod emit;
mod verbose;
mod view;

use std::fs::File;
use std::io::{StdoutLock, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use cli::Action;
use verbose::vprintln;
use view::ElfView;

fn main() -> ExitCode {
    let (cli, actions) = cli::parse();
    verbose::init(cli.verbose);

    let mut out = std::io::stdout().lock();
    let mut failed = false;

    for path in &cli.files {
        if !process_file(path, &actions, &mut out) {
            failed = true;
        }
    }

    if let Err(err) = out.flush() {
        eprintln!("elfcat: flushing stdout: {err}");
        failed = true;
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Runs every action against one file.
///
/// Returns `false` if the file could not be opened or validated, or if any
/// action failed; a failed action does not stop the remaining ones.
fn process_file(path: &Path, actions: &[Action], out: &mut StdoutLock<'_>) -> bool {
    let (mut source, view) = match open_elf(path) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("elfcat: {}: {err:#}", path.display());
            return false;
        }
    };

    vprintln!(
        "{}: {:?} {:?}, machine {}, {} sections, {} segments",
        path.display(),
        view.header().class,
        view.header().encoding,
        view.header().machine,
        view.section_count(),
        view.segment_count(),
    );

    let mut ok = true;
    for action in actions {
        if let Err(err) = run_action(&mut source, &view, action, out) {
            eprintln!("elfcat: {}: {action}: {err:#}", path.display());
            ok = false;
        }
    }
    ok
}

/// Opens `path` and reads its metadata tables.
fn open_elf(path: &Path) -> Result<(File, ElfView)> {
    let mut file = File::open(path).context("opening file")?;
    let view = ElfView::read(&mut file)?;
    Ok((file, view))
}

/// Resolves one action against `view` and streams its bytes to `out`.
fn run_action(
    source: &mut File,
    view: &ElfView,
    action: &Action,
    out: &mut StdoutLock<'_>,
) -> Result<()> {
    match action {
        Action::SectionName(name) => {
            let (index, section) = view.section_by_name(name)?;
            vprintln!(
                "  {name}: section {index}, type {:#x}, offset {:#x}, size {:#x}",
                section.sh_type,
                section.offset,
                section.size,
            );
            dump::dump_section(source, out, section)
        }
        Action::SectionIndex(index) => {
            let section = view.section_by_index(*index)?;
            vprintln!(
                "  section {index}: type {:#x}, offset {:#x}, size {:#x}",
                section.sh_type,
                section.offset,
                section.size,
            );
            dump::dump_section(source, out, section)
        }
        Action::ProgramIndex(index) => {
            let segment = view.segment_by_index(*index)?;
            vprintln!(
                "  segment {index}: type {:#x}, offset {:#x}, filesz {:#x}, memsz {:#x}",
                segment.p_type,
                segment.offset,
                segment.filesz,
                segment.memsz,
            );
            dump::dump_segment(source, out, segment)
        }
    }
}
