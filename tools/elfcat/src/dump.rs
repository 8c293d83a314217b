//! Maps resolved sections and segments onto emitter calls.

use std::io::{Read, Seek, Write};

use anyhow::{Context, Result};
use elfcat_elf::{ProgramHeader, SHT_NOBITS, SectionHeader};

use crate::emit;

/// Writes a section's logical contents to `out`.
///
/// `SHT_NOBITS` sections occupy no file bytes; their contents are defined to
/// be zero, whatever their nominal file offset says.
///
/// # Errors
///
/// Propagates emitter read and write failures.
pub fn dump_section<S, W>(source: &mut S, out: &mut W, section: &SectionHeader) -> Result<()>
where
    S: Read + Seek,
    W: Write,
{
    if section.sh_type == SHT_NOBITS {
        emit::emit_zeros(out, section.size).context("writing zero fill")
    } else {
        emit::emit_range(source, out, section.offset, section.size)
            .context("copying section contents")
    }
}

/// Writes a segment's loaded memory image to `out`: the file-backed range
/// first, then the zero-initialized tail up to the memory size.
///
/// # Errors
///
/// Propagates emitter read and write failures.
pub fn dump_segment<S, W>(source: &mut S, out: &mut W, segment: &ProgramHeader) -> Result<()>
where
    S: Read + Seek,
    W: Write,
{
    emit::emit_range(source, out, segment.offset, segment.filesz)
        .context("copying segment contents")?;
    // A malformed memsz < filesz clamps to an empty tail.
    let tail = segment.memsz.saturating_sub(segment.filesz);
    emit::emit_zeros(out, tail).context("writing zero fill")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn plain_section(offset: u64, size: u64) -> SectionHeader {
        SectionHeader {
            name: 0,
            sh_type: 1, // SHT_PROGBITS
            flags: 0,
            addr: 0,
            offset,
            size,
            link: 0,
            info: 0,
            addralign: 0,
            entsize: 0,
        }
    }

    fn segment(offset: u64, filesz: u64, memsz: u64) -> ProgramHeader {
        ProgramHeader {
            p_type: 1,
            flags: 0,
            offset,
            vaddr: 0,
            paddr: 0,
            filesz,
            memsz,
            align: 0,
        }
    }

    #[test]
    fn section_streams_its_file_range() {
        let data: Vec<u8> = (0..=255).collect();
        let mut source = Cursor::new(data.clone());
        let mut out = Vec::new();
        dump_section(&mut source, &mut out, &plain_section(0x10, 0x20)).unwrap();
        assert_eq!(out, data[0x10..0x30]);
    }

    #[test]
    fn nobits_section_streams_zeros_ignoring_offset() {
        let mut source = Cursor::new(vec![0xffu8; 64]);
        let mut out = Vec::new();
        let section = SectionHeader {
            sh_type: SHT_NOBITS,
            ..plain_section(0x10, 40)
        };
        dump_section(&mut source, &mut out, &section).unwrap();
        assert_eq!(out, vec![0u8; 40]);
    }

    #[test]
    fn segment_streams_file_bytes_then_zero_tail() {
        let data: Vec<u8> = (1..=100).collect();
        let mut source = Cursor::new(data.clone());
        let mut out = Vec::new();
        dump_segment(&mut source, &mut out, &segment(0, 100, 150)).unwrap();
        assert_eq!(out.len(), 150);
        assert_eq!(&out[..100], &data[..]);
        assert_eq!(&out[100..], &[0u8; 50][..]);
    }

    #[test]
    fn segment_with_equal_sizes_has_no_tail() {
        let mut source = Cursor::new(vec![9u8; 30]);
        let mut out = Vec::new();
        dump_segment(&mut source, &mut out, &segment(10, 20, 20)).unwrap();
        assert_eq!(out, vec![9u8; 20]);
    }

    #[test]
    fn malformed_segment_tail_clamps_to_empty() {
        let mut source = Cursor::new(vec![5u8; 30]);
        let mut out = Vec::new();
        dump_segment(&mut source, &mut out, &segment(0, 20, 10)).unwrap();
        assert_eq!(out, vec![5u8; 20]);
    }
}
