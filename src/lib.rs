//! S-expressions as a wire format.
//!
//! # Syntax
//!
//! This crate implements the family of s-expression syntaxes descended from
//! Rivest's SPKI proposal. Two formats are provided, [`CSEXP`] and [`SX`];
//! they accept the same syntactic elements and differ only in whether the
//! input stream is decoded as UTF-8 ([`SX`]) or treated as raw octets
//! ([`CSEXP`]). The syntax is as follows:
//!
//! - **Lists** are sequences of values delimited by `(` and `)`.
//!
//! - **Bare tokens** are identifier-like atoms such as `rsa-with-md5`. The
//!   first character may be a letter or one of `_ . / : * + = -`; subsequent
//!   characters may also be decimal digits.
//!
//! - **Integers** are decimal digit runs, optionally preceded by `-`. They
//!   narrow to the smallest fitting variant of [`Value`].
//!
//! - **Quoted strings** are enclosed in double quotes and support the C
//!   escapes `\a \b \f \n \r \t \v`, `\xHH`, three-digit octal escapes, and
//!   backslash–newline line continuations.
//!
//! - **Netstrings** are length-prefixed verbatim byte strings: `5:hello`.
//!   The bytes after the `:` are read uninterpreted, so they may contain
//!   NULs, parentheses, or anything else.
//!
//! - **Base64 atoms** are enclosed in `|` markers: `|YXBwbGU=|`. Interior
//!   ASCII whitespace is ignored.
//!
//! - **Base64 envelopes** are enclosed in `{` and `}` and contain the base64
//!   encoding of further s-expression source, which is parsed in place.
//!
//! Netstrings, quoted strings, base64 atoms and hex atoms may carry a
//! decimal length hint prefix (`3|YXBw|`) that must match the decoded
//! length.
//!
//! Serialization always produces the canonical form: every string or byte
//! atom is rendered as a netstring and the only whitespace emitted is a
//! single space between atoms that would otherwise run their digits
//! together.
//!
//! # Parsing incrementally
//!
//! [`Format::parse`] handles the common case of a complete input. The
//! push-driven [`Parser`] accepts input in arbitrary chunks:
//!
//! ```
//! use csexp::SX;
//!
//! let mut parser = SX.parser();
//! parser.write(b"(greeting ").unwrap();
//! parser.write(b"5:hello)").unwrap();
//! let values = parser.close().unwrap();
//!
//! assert_eq!(SX.serialize(&values), b"(8:greeting5:hello)");
//! ```

pub(crate) mod b64;
pub mod format;
pub mod parser;
pub(crate) mod printer;
pub mod query;
pub mod value;

pub use format::{Format, CSEXP, SX};
pub use parser::{Error, Parser, Result};
pub use query::{by_selector, first_by_head, first_by_head_tail, has_head};
pub use value::Value;
