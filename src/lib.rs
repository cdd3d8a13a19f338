//! This crate provides a schema-driven codec for DXF tagged-record streams.
//!
//! Every datum on the wire is a pair of lines: an integer group code identifying the datum's
//! role and wire type, then its value.  Records (CIRCLE, ARC, DICTIONARY, ...) are runs of
//! pairs between `0/<kind>` markers.  Instead of one hand-written parser per record kind,
//! a [`RecordSchema`] describes each kind's fields — group code, version range, default,
//! required flag — and one generic decoder/encoder pair does the rest.
//!
//! # Usage
//!
//! Put this in your `Cargo.toml`:
//!
//! ``` toml
//! [dependencies]
//! dxf-codec = "0.1.0"
//! ```
//!
//! Or if you want [serde](https://github.com/serde-rs/serde) support for the wire-level
//! types, enable the `serialize` feature.
//!
//! # Examples
//!
//! Decode records from a tag stream:
//!
//! ``` rust
//! # fn ex() -> dxf_codec::DxfResult<()> {
//! use dxf_codec::{decode_record, AcadVersion, CodePairPutBack, DecodeOutcome, SchemaRegistry};
//!
//! let text = "  0\r\nCIRCLE\r\n 10\r\n1.0\r\n 20\r\n2.0\r\n 40\r\n5.0\r\n  0\r\nEOF\r\n";
//! let mut source = CodePairPutBack::from_text(text);
//! match decode_record(&mut source, SchemaRegistry::builtin(), AcadVersion::R12)? {
//!     DecodeOutcome::Decoded(record) | DecodeOutcome::DecodedWithWarnings(record, _) => {
//!         assert_eq!(Some(5.0), record.f64_value("radius"));
//!         assert_eq!(Some("0"), record.string_value("layer")); // defaulted
//!     }
//!     _ => panic!("expected a record"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Encode a record back out:
//!
//! ``` rust
//! # fn ex() -> dxf_codec::DxfResult<()> {
//! use dxf_codec::{encode_record, AcadVersion, CodePairWriter, Record, SchemaRegistry};
//!
//! let schema = SchemaRegistry::builtin().lookup("CIRCLE").unwrap();
//! let mut record = Record::new(schema);
//! record.set_f64("radius", 2.5)?;
//! let mut buf = vec![];
//! let mut writer = CodePairWriter::new_ascii_writer(&mut buf);
//! encode_record(&record, AcadVersion::R2000, &mut writer)?;
//! # Ok(())
//! # }
//! ```
//!
//! The file-level declared version gates every version-conditional field; it is supplied by
//! the caller (e.g. from the `$ACADVER` header variable), never derived here.  Unknown
//! record kinds, unknown group codes, and out-of-version tags are recoverable: they attach
//! [`Diagnostic`]s to the result and decoding continues.  Only an I/O fault aborts.

#![warn(clippy::doc_markdown)]

#[cfg(feature = "serialize")]
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod helper_functions;

mod code_pair;
pub use crate::code_pair::CodePair;

mod code_pair_value;
pub use crate::code_pair_value::CodePairValue;

mod handle;
pub use crate::handle::Handle;

mod acad_version;
pub use crate::acad_version::AcadVersion;

mod expected_type;
pub use crate::expected_type::ExpectedType;

mod code_pair_iter;
pub use crate::code_pair_iter::{
    new_code_pair_iter_from_reader, BinaryCodePairIter, CodePairIter, DirectCodePairIter,
    TextCodePairIter,
};

mod code_pair_put_back;
pub use crate::code_pair_put_back::CodePairPutBack;

mod code_pair_writer;
pub use crate::code_pair_writer::CodePairWriter;

mod diagnostic;
pub use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};

mod schema;
pub use crate::schema::{
    is_end_marker, Constraint, FieldSchema, RecordSchema, COMMENT_CODE, END_MARKERS,
    RECORD_MARKER_CODE, SUBCLASS_MARKER_CODE,
};

mod catalog;

mod registry;
pub use crate::registry::SchemaRegistry;

mod record;
pub use crate::record::Record;

mod decoder;
pub use crate::decoder::{decode_record, DecodeOutcome};

mod encoder;
pub use crate::encoder::encode_record;

mod chain;
pub use crate::chain::{ChainIter, ChainNode, RecordChain};

mod binary_payload;
pub use crate::binary_payload::{chunk_bytes, reassemble_binary, BinaryPayload, MAX_CHUNK_BYTES};

mod dxf_error;
pub use crate::dxf_error::DxfError;

mod dxf_result;
pub use crate::dxf_result::DxfResult;
