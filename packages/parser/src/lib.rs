//! # Droplet Parser
//!
//! Turns source text of a small indentation-based command language into a
//! [`droplet_model::Tree`].
//!
//! Every non-blank line becomes a block. Identifiers, numbers and strings
//! become sockets; everything else on the line is plain text. A line ending
//! in `:` followed by deeper lines owns an indent holding those lines.
//!
//! Lines that cannot be structured are kept as raw text inside an `error`
//! block unless [`ParseOptions::throw_error`] is set, in which case the
//! first problem is returned as a located [`ParseError`].

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, ParseResult};
pub use lexer::{lex_line, Token};
pub use parser::{parse, parse_into, ParseOptions};
