//! Validated structural view of one ELF file.
//!
//! [`ElfView::read`] slurps the metadata tables — file header, section header
//! table, program header table, and the section-name string table — into
//! owned buffers in one pass, restoring the file position it found. Lookups
//! afterwards are pure table scans; the file handle is only touched again by
//! the emitter.

use std::fmt;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use anyhow::{Context, Result, anyhow, bail};
use elfcat_elf::{
    FileHeader, ParseError, ProgramHeader, ProgramHeaderIter, SHN_UNDEF, SHN_XINDEX, SHT_NOBITS,
    SectionHeader, SectionHeaderIter, Strtab,
};

// ---------------------------------------------------------------------------
// LookupError
// ---------------------------------------------------------------------------

/// Why a section or segment lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// No entry at the requested index, or no entry with the requested name.
    NotFound,
    /// The file has no section-name string table, so names cannot resolve.
    NoStringTable,
    /// A section's name offset points outside the string table.
    BadName {
        /// Ordinal index of the section with the unresolvable name.
        section: usize,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::NoStringTable => write!(f, "file has no section-name string table"),
            Self::BadName { section } => {
                write!(f, "section {section} has an unresolvable name offset")
            }
        }
    }
}

impl std::error::Error for LookupError {}

// ---------------------------------------------------------------------------
// ElfView
// ---------------------------------------------------------------------------

/// Parsed metadata tables for one ELF file.
#[derive(Debug)]
pub struct ElfView {
    header: FileHeader,
    sections: Vec<SectionHeader>,
    segments: Vec<ProgramHeader>,
    /// Raw contents of the section-name string table, if the file has one.
    shstrtab: Option<Vec<u8>>,
}

impl ElfView {
    /// Reads and validates the metadata tables from `source`.
    ///
    /// The read position of `source` is restored before returning, on success
    /// and failure alike, so construction is transparent to other users of
    /// the handle.
    ///
    /// # Errors
    ///
    /// Fails if `source` is not a supported ELF file or a metadata table
    /// cannot be read.
    pub fn read<S: Read + Seek>(source: &mut S) -> Result<Self> {
        let saved = source.stream_position().context("querying file position")?;
        let view = Self::read_tables(source);
        let restored = source.seek(SeekFrom::Start(saved));
        let view = view?;
        restored.context("restoring file position")?;
        Ok(view)
    }

    fn read_tables<S: Read + Seek>(source: &mut S) -> Result<Self> {
        source.seek(SeekFrom::Start(0)).context("seeking to file header")?;
        let mut buf = [0u8; FileHeader::MAX_LEN];
        let got = read_up_to(source, &mut buf).context("reading file header")?;
        let header =
            FileHeader::parse(&buf[..got]).map_err(|e| anyhow!("not a supported ELF file: {e}"))?;

        if header.shnum == 0 && header.shoff != 0 {
            bail!("extended section numbering (e_shnum == 0) is not supported");
        }

        let sections = read_section_table(source, &header)?;
        let segments = read_program_table(source, &header)?;
        let shstrtab = read_shstrtab(source, &header, &sections)?;

        Ok(Self {
            header,
            sections,
            segments,
            shstrtab,
        })
    }

    /// The parsed file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Number of entries in the section header table.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of entries in the program header table.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the section header at ordinal `index`.
    ///
    /// # Errors
    ///
    /// [`LookupError::NotFound`] if `index` is out of range.
    pub fn section_by_index(&self, index: u64) -> Result<&SectionHeader, LookupError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.sections.get(i))
            .ok_or(LookupError::NotFound)
    }

    /// Returns the first section whose name is exactly `name`, with its
    /// ordinal index.
    ///
    /// Scans in table order starting at index 1; index 0 is the reserved
    /// null entry and never has a name. Names compare as raw bytes.
    ///
    /// # Errors
    ///
    /// [`LookupError::NotFound`] if no section matches,
    /// [`LookupError::NoStringTable`] if names cannot resolve at all, and
    /// [`LookupError::BadName`] if a scanned entry's name offset is
    /// unresolvable.
    pub fn section_by_name(&self, name: &str) -> Result<(usize, &SectionHeader), LookupError> {
        let table = self.shstrtab.as_deref().ok_or(LookupError::NoStringTable)?;
        let strtab = Strtab::new(table);
        for (index, section) in self.sections.iter().enumerate().skip(1) {
            let section_name = strtab
                .get(section.name)
                .ok_or(LookupError::BadName { section: index })?;
            if section_name == name.as_bytes() {
                return Ok((index, section));
            }
        }
        Err(LookupError::NotFound)
    }

    /// Returns the program header at ordinal `index`.
    ///
    /// # Errors
    ///
    /// [`LookupError::NotFound`] if `index` is out of range.
    pub fn segment_by_index(&self, index: u64) -> Result<&ProgramHeader, LookupError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.segments.get(i))
            .ok_or(LookupError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Table readers
// ---------------------------------------------------------------------------

fn read_section_table<S: Read + Seek>(
    source: &mut S,
    header: &FileHeader,
) -> Result<Vec<SectionHeader>> {
    if header.shnum == 0 {
        return Ok(Vec::new());
    }
    let table = read_exact_at(
        source,
        header.shoff,
        usize::from(header.shnum) * usize::from(header.shentsize),
    )
    .context("reading section header table")?;
    let iter = SectionHeaderIter::new(
        &table,
        header.class,
        header.encoding,
        usize::from(header.shentsize),
        usize::from(header.shnum),
    )
    .map_err(|e| anyhow!("section header table: {e}"))?;
    iter.collect::<Result<Vec<_>, ParseError>>()
        .map_err(|e| anyhow!("section header table: {e}"))
}

fn read_program_table<S: Read + Seek>(
    source: &mut S,
    header: &FileHeader,
) -> Result<Vec<ProgramHeader>> {
    if header.phnum == 0 {
        return Ok(Vec::new());
    }
    let table = read_exact_at(
        source,
        header.phoff,
        usize::from(header.phnum) * usize::from(header.phentsize),
    )
    .context("reading program header table")?;
    let iter = ProgramHeaderIter::new(
        &table,
        header.class,
        header.encoding,
        usize::from(header.phentsize),
        usize::from(header.phnum),
    )
    .map_err(|e| anyhow!("program header table: {e}"))?;
    iter.collect::<Result<Vec<_>, ParseError>>()
        .map_err(|e| anyhow!("program header table: {e}"))
}

/// Reads the contents of the section-name string table, resolving the
/// `SHN_XINDEX` escape through section 0's `link` field.
fn read_shstrtab<S: Read + Seek>(
    source: &mut S,
    header: &FileHeader,
    sections: &[SectionHeader],
) -> Result<Option<Vec<u8>>> {
    let index = match header.shstrndx {
        SHN_UNDEF => return Ok(None),
        SHN_XINDEX => sections
            .first()
            .map_or(0, |null_section| null_section.link as usize),
        plain => usize::from(plain),
    };
    let Some(strtab) = sections.get(index) else {
        bail!("section-name string table index {index} is out of range");
    };
    if strtab.sh_type == SHT_NOBITS {
        bail!("section-name string table has no file-backed contents");
    }
    let len = usize::try_from(strtab.size)
        .map_err(|_| anyhow!("section-name string table size {} is implausible", strtab.size))?;
    let table = read_exact_at(source, strtab.offset, len)
        .context("reading section-name string table")?;
    Ok(Some(table))
}

// ---------------------------------------------------------------------------
// I/O helpers
// ---------------------------------------------------------------------------

/// Reads exactly `len` bytes at absolute `offset`.
fn read_exact_at<S: Read + Seek>(source: &mut S, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    source.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    source.read_exact(&mut buf)?;
    Ok(buf)
}

/// Fills `buf` from `source` until full or EOF; returns the bytes read.
fn read_up_to<S: Read>(source: &mut S, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
