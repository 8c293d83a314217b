//! Minimal zero-copy ELF structural parser.
//!
//! Parses just enough of the ELF container format to locate raw byte ranges:
//! the identification and file header, the section header table, the program
//! header table, and string tables. Both file classes (ELFCLASS32 and
//! ELFCLASS64) and both data encodings (little- and big-endian) are accepted
//! and normalized into descriptors with 64-bit-wide offset and size fields.
//!
//! The crate performs no I/O and no allocation; everything operates on byte
//! slices the caller has already read. There is no symbol, relocation, or
//! dynamic-linking support.

#![cfg_attr(not(test), no_std)]

pub mod header;
pub mod program;
pub mod section;
pub mod strtab;

pub use header::{Class, Encoding, FileHeader, ParseError};
pub use program::{ProgramHeader, ProgramHeaderIter};
pub use section::{
    SHN_UNDEF, SHN_XINDEX, SHT_NOBITS, SHT_NULL, SHT_STRTAB, SectionHeader, SectionHeaderIter,
};
pub use strtab::Strtab;
