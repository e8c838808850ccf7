//! Single-file compression and multi-file archives behind one request/result contract.
//!
//! # Architecture
//!
//! - `copy.rs` - Bounded-buffer stream copy shared by every codec
//! - `naming.rs` - Output path resolution and archive entry naming
//! - `filter.rs` - Entry selection during extraction
//! - `codec/` - Gzip, bzip2, LZF and zstd single-file codecs
//! - `format.rs` / `detect.rs` - Archive formats and how to recognize them
//! - `create/` - Archive writers (tar family, zip)
//! - `extract/` - Archive readers (tar family, zip, rar)
//! - `request.rs` - Immutable per-call requests
//!
//! Every operation returns [`Result`]; the [`Error`] display string is the
//! human-readable failure message and [`Error::kind`] classifies it.

pub use codec::{Codec, Decoder, Encoder, SingleFileCodec};
pub use copy::buffered_copy;
pub use create::{ArchiveWriter, create_archive};
pub use entry::{ArchiveEntry, ArchiveReport};
pub use error::{Error, ErrorKind, Result};
pub use extract::{extract, extract_entry, list_entries};
pub use filter::ExtractionFilter;
pub use format::{ArchiveFormat, TarCompress};
pub use naming::{BaseDir, DECOMPRESSED_SUFFIX, OutputNamingPolicy, PathStripRule};
pub use request::{
    ArchiveRequest, CompressionRequest, DEFAULT_BUFFER_SIZE, DecompressionRequest,
    ExtractionRequest, InputSource, OutputDescriptor,
};

pub mod codec;
pub mod copy;
pub mod create;
pub mod detect;
pub mod entry;
pub mod extract;
pub mod filter;
pub mod format;
pub mod naming;
pub mod request;
mod error;
mod sanitize;
