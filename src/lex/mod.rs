//! Lexical layer over the raw document text.
//!
//! The parser never builds a token tree; every section parser drives a
//! [`Cursor`] directly over the document bytes, the way the schema is known
//! to be laid out.

mod cursor;

pub use cursor::*;
