//! ELF identification and file header parsing.
//!
//! The identification bytes select the file class (32/64-bit layout) and the
//! data encoding (byte order) that govern how every other structure in the
//! file is read; both are validated here and carried in [`FileHeader`].

use core::fmt;

// ---------------------------------------------------------------------------
// Identification constants
// ---------------------------------------------------------------------------

/// Number of identification bytes at the start of every ELF file.
pub const EI_NIDENT: usize = 16;

/// The four magic bytes: `0x7f 'E' 'L' 'F'`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Identification index of the file class byte.
const EI_CLASS: usize = 4;

/// Identification index of the data encoding byte.
const EI_DATA: usize = 5;

/// Identification index of the format version byte.
const EI_VERSION: usize = 6;

const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const ELFDATA2MSB: u8 = 2;
const EV_CURRENT: u8 = 1;

// ---------------------------------------------------------------------------
// Class / Encoding
// ---------------------------------------------------------------------------

/// File class: selects the 32- or 64-bit structure layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// ELFCLASS32.
    Elf32,
    /// ELFCLASS64.
    Elf64,
}

impl Class {
    /// Size in bytes of the file header for this class.
    #[must_use]
    pub fn file_header_len(self) -> usize {
        match self {
            Self::Elf32 => 52,
            Self::Elf64 => 64,
        }
    }

    /// Size in bytes of one section header table entry for this class.
    #[must_use]
    pub fn section_header_len(self) -> usize {
        match self {
            Self::Elf32 => 40,
            Self::Elf64 => 64,
        }
    }

    /// Size in bytes of one program header table entry for this class.
    #[must_use]
    pub fn program_header_len(self) -> usize {
        match self {
            Self::Elf32 => 32,
            Self::Elf64 => 56,
        }
    }
}

/// Byte order of every multi-byte field in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// ELFDATA2LSB (little-endian).
    Lsb,
    /// ELFDATA2MSB (big-endian).
    Msb,
}

// Field readers. Callers guarantee that `offset + width` is in bounds; the
// table iterators and `FileHeader::parse` check entry bounds up front.
impl Encoding {
    pub(crate) fn u16(self, data: &[u8], offset: usize) -> u16 {
        let bytes = [data[offset], data[offset + 1]];
        match self {
            Self::Lsb => u16::from_le_bytes(bytes),
            Self::Msb => u16::from_be_bytes(bytes),
        }
    }

    pub(crate) fn u32(self, data: &[u8], offset: usize) -> u32 {
        let bytes = [
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ];
        match self {
            Self::Lsb => u32::from_le_bytes(bytes),
            Self::Msb => u32::from_be_bytes(bytes),
        }
    }

    pub(crate) fn u64(self, data: &[u8], offset: usize) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&data[offset..offset + 8]);
        match self {
            Self::Lsb => u64::from_le_bytes(bytes),
            Self::Msb => u64::from_be_bytes(bytes),
        }
    }
}

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// Errors from structural validation of ELF metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The file does not start with the ELF magic bytes.
    BadMagic,
    /// The class byte is neither ELFCLASS32 nor ELFCLASS64.
    UnsupportedClass(u8),
    /// The encoding byte is neither ELFDATA2LSB nor ELFDATA2MSB.
    UnsupportedEncoding(u8),
    /// The identification version byte is not EV_CURRENT.
    UnsupportedVersion(u8),
    /// The buffer ends before the structure it should contain.
    Truncated,
    /// A header's entry size field is smaller than the entry layout requires.
    BadEntrySize {
        /// Minimum entry size for the file's class.
        expected: usize,
        /// Entry size declared in the file header.
        actual: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "missing ELF magic bytes"),
            Self::UnsupportedClass(class) => write!(f, "unsupported file class {class}"),
            Self::UnsupportedEncoding(enc) => write!(f, "unsupported data encoding {enc}"),
            Self::UnsupportedVersion(ver) => write!(f, "unsupported format version {ver}"),
            Self::Truncated => write!(f, "truncated metadata"),
            Self::BadEntrySize { expected, actual } => {
                write!(f, "table entry size {actual} (need at least {expected})")
            }
        }
    }
}

impl core::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// FileHeader
// ---------------------------------------------------------------------------

/// The parsed, validated ELF file header, normalized to 64-bit field widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// File class.
    pub class: Class,
    /// Data encoding.
    pub encoding: Encoding,
    /// Object file type (`ET_EXEC`, `ET_DYN`, ...), not validated.
    pub e_type: u16,
    /// Target machine, not validated.
    pub machine: u16,
    /// Entry point virtual address.
    pub entry: u64,
    /// File offset of the program header table, 0 if absent.
    pub phoff: u64,
    /// File offset of the section header table, 0 if absent.
    pub shoff: u64,
    /// Size of one program header table entry.
    pub phentsize: u16,
    /// Number of program header table entries.
    pub phnum: u16,
    /// Size of one section header table entry.
    pub shentsize: u16,
    /// Number of section header table entries.
    pub shnum: u16,
    /// Section header table index of the section-name string table.
    pub shstrndx: u16,
}

impl FileHeader {
    /// Largest file header size across both classes. Reading this many bytes
    /// from the start of a file is always enough for [`FileHeader::parse`].
    pub const MAX_LEN: usize = 64;

    /// Parses and validates a file header from the start of `data`.
    ///
    /// `data` may be shorter than [`Self::MAX_LEN`] for an ELFCLASS32 file,
    /// but must cover the whole header for the file's class.
    ///
    /// # Errors
    ///
    /// Fails if the identification bytes are missing or unsupported, or if
    /// `data` ends before the header for the identified class.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < EI_NIDENT {
            return Err(ParseError::Truncated);
        }
        if data[..4] != ELF_MAGIC {
            return Err(ParseError::BadMagic);
        }
        let class = match data[EI_CLASS] {
            ELFCLASS32 => Class::Elf32,
            ELFCLASS64 => Class::Elf64,
            other => return Err(ParseError::UnsupportedClass(other)),
        };
        let encoding = match data[EI_DATA] {
            ELFDATA2LSB => Encoding::Lsb,
            ELFDATA2MSB => Encoding::Msb,
            other => return Err(ParseError::UnsupportedEncoding(other)),
        };
        if data[EI_VERSION] != EV_CURRENT {
            return Err(ParseError::UnsupportedVersion(data[EI_VERSION]));
        }
        if data.len() < class.file_header_len() {
            return Err(ParseError::Truncated);
        }

        let e = encoding;
        let header = match class {
            Class::Elf32 => Self {
                class,
                encoding,
                e_type: e.u16(data, 16),
                machine: e.u16(data, 18),
                entry: e.u32(data, 24).into(),
                phoff: e.u32(data, 28).into(),
                shoff: e.u32(data, 32).into(),
                phentsize: e.u16(data, 42),
                phnum: e.u16(data, 44),
                shentsize: e.u16(data, 46),
                shnum: e.u16(data, 48),
                shstrndx: e.u16(data, 50),
            },
            Class::Elf64 => Self {
                class,
                encoding,
                e_type: e.u16(data, 16),
                machine: e.u16(data, 18),
                entry: e.u64(data, 24),
                phoff: e.u64(data, 32),
                shoff: e.u64(data, 40),
                phentsize: e.u16(data, 54),
                phnum: e.u16(data, 56),
                shentsize: e.u16(data, 58),
                shnum: e.u16(data, 60),
                shstrndx: e.u16(data, 62),
            },
        };
        Ok(header)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a valid ELF64 little-endian file header.
    fn make_ehdr64() -> [u8; 64] {
        let mut b = [0u8; 64];
        b[..4].copy_from_slice(&ELF_MAGIC);
        b[EI_CLASS] = ELFCLASS64;
        b[EI_DATA] = ELFDATA2LSB;
        b[EI_VERSION] = EV_CURRENT;
        b[16..18].copy_from_slice(&2u16.to_le_bytes()); // e_type = ET_EXEC
        b[18..20].copy_from_slice(&62u16.to_le_bytes()); // e_machine = EM_X86_64
        b[24..32].copy_from_slice(&0x40_1000u64.to_le_bytes()); // e_entry
        b[32..40].copy_from_slice(&64u64.to_le_bytes()); // e_phoff
        b[40..48].copy_from_slice(&0x2000u64.to_le_bytes()); // e_shoff
        b[54..56].copy_from_slice(&56u16.to_le_bytes()); // e_phentsize
        b[56..58].copy_from_slice(&3u16.to_le_bytes()); // e_phnum
        b[58..60].copy_from_slice(&64u16.to_le_bytes()); // e_shentsize
        b[60..62].copy_from_slice(&7u16.to_le_bytes()); // e_shnum
        b[62..64].copy_from_slice(&6u16.to_le_bytes()); // e_shstrndx
        b
    }

    /// Build a valid ELF32 big-endian file header.
    fn make_ehdr32_msb() -> [u8; 52] {
        let mut b = [0u8; 52];
        b[..4].copy_from_slice(&ELF_MAGIC);
        b[EI_CLASS] = ELFCLASS32;
        b[EI_DATA] = ELFDATA2MSB;
        b[EI_VERSION] = EV_CURRENT;
        b[16..18].copy_from_slice(&2u16.to_be_bytes());
        b[18..20].copy_from_slice(&8u16.to_be_bytes()); // e_machine = EM_MIPS
        b[24..28].copy_from_slice(&0x40_0000u32.to_be_bytes()); // e_entry
        b[28..32].copy_from_slice(&52u32.to_be_bytes()); // e_phoff
        b[32..36].copy_from_slice(&0x1000u32.to_be_bytes()); // e_shoff
        b[42..44].copy_from_slice(&32u16.to_be_bytes()); // e_phentsize
        b[44..46].copy_from_slice(&2u16.to_be_bytes()); // e_phnum
        b[46..48].copy_from_slice(&40u16.to_be_bytes()); // e_shentsize
        b[48..50].copy_from_slice(&5u16.to_be_bytes()); // e_shnum
        b[50..52].copy_from_slice(&4u16.to_be_bytes()); // e_shstrndx
        b
    }

    #[test]
    fn parse_elf64_lsb() {
        let hdr = FileHeader::parse(&make_ehdr64()).unwrap();
        assert_eq!(hdr.class, Class::Elf64);
        assert_eq!(hdr.encoding, Encoding::Lsb);
        assert_eq!(hdr.e_type, 2);
        assert_eq!(hdr.machine, 62);
        assert_eq!(hdr.entry, 0x40_1000);
        assert_eq!(hdr.phoff, 64);
        assert_eq!(hdr.shoff, 0x2000);
        assert_eq!(hdr.phentsize, 56);
        assert_eq!(hdr.phnum, 3);
        assert_eq!(hdr.shentsize, 64);
        assert_eq!(hdr.shnum, 7);
        assert_eq!(hdr.shstrndx, 6);
    }

    #[test]
    fn parse_elf32_msb() {
        let hdr = FileHeader::parse(&make_ehdr32_msb()).unwrap();
        assert_eq!(hdr.class, Class::Elf32);
        assert_eq!(hdr.encoding, Encoding::Msb);
        assert_eq!(hdr.machine, 8);
        assert_eq!(hdr.entry, 0x40_0000);
        assert_eq!(hdr.phoff, 52);
        assert_eq!(hdr.shoff, 0x1000);
        assert_eq!(hdr.shentsize, 40);
        assert_eq!(hdr.shnum, 5);
        assert_eq!(hdr.shstrndx, 4);
    }

    #[test]
    fn reject_bad_magic() {
        let mut b = make_ehdr64();
        b[0] = 0x7e;
        assert_eq!(FileHeader::parse(&b), Err(ParseError::BadMagic));
    }

    #[test]
    fn reject_unknown_class() {
        let mut b = make_ehdr64();
        b[EI_CLASS] = 3;
        assert_eq!(FileHeader::parse(&b), Err(ParseError::UnsupportedClass(3)));
    }

    #[test]
    fn reject_unknown_encoding() {
        let mut b = make_ehdr64();
        b[EI_DATA] = 0;
        assert_eq!(
            FileHeader::parse(&b),
            Err(ParseError::UnsupportedEncoding(0))
        );
    }

    #[test]
    fn reject_bad_version() {
        let mut b = make_ehdr64();
        b[EI_VERSION] = 2;
        assert_eq!(
            FileHeader::parse(&b),
            Err(ParseError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn reject_short_ident() {
        assert_eq!(FileHeader::parse(&[0x7f, b'E']), Err(ParseError::Truncated));
    }

    #[test]
    fn reject_header_shorter_than_class_requires() {
        // Valid ident claiming ELF64, but only 52 bytes of data.
        let b = make_ehdr64();
        assert_eq!(FileHeader::parse(&b[..52]), Err(ParseError::Truncated));
    }

    #[test]
    fn elf32_header_is_self_contained_at_52_bytes() {
        let b = make_ehdr32_msb();
        assert!(FileHeader::parse(&b[..52]).is_ok());
    }

    #[test]
    fn error_display() {
        let msg = format!("{}", ParseError::UnsupportedClass(9));
        assert!(msg.contains('9'));
        let msg = format!(
            "{}",
            ParseError::BadEntrySize {
                expected: 64,
                actual: 12
            }
        );
        assert!(msg.contains("64") && msg.contains("12"));
    }
}
