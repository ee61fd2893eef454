//! Type-encoding decoding for Objective-C style runtimes.
//!
//! A type encoding is a compact textual description of a value's shape, independent of
//! any compiled declaration. This module turns such strings into [`TypeNode`] trees and
//! back.
//!
//! # Grammar
//!
//! | Encoding | Node |
//! |----------|------|
//! | `c C s S i I l L q Q t T f d D B v * %` | [`TypeNode::Primitive`] |
//! | `^type` | [`TypeNode::Pointer`] |
//! | `[N type]` | [`TypeNode::ArrayOf`] |
//! | `{tag=fields}` / `{tag}` | [`TypeNode::Struct`] |
//! | `(tag=fields)` | [`TypeNode::Union`] |
//! | `bN` | [`TypeNode::Bitfield`] |
//! | `jtype` | [`TypeNode::Complex`] |
//! | `@`, `@"Class"`, `@?` | [`TypeNode::ObjectReference`] |
//! | `#` / `:` | [`TypeNode::ClassReference`] / [`TypeNode::SelectorReference`] |
//! | `?`, `![size,alignment type]` | [`TypeNode::Unknown`] |
//! | `r n N o O R V` + type | [`TypeNode::Qualified`] |
//!
//! The GC-invisible marker `|` is skipped wherever a qualifier may appear, and quoted member
//! names inside aggregates (`{S="x"i}`) are accepted and dropped.
//!
//! A decimal run directly after a top-level type is an offset annotation. It is accepted and
//! discarded by [`parse`], returned by [`EncodingParser::parse_offset`], and kept per argument
//! by [`parse_method`].
//!
//! # Examples
//!
//! ```rust
//! use objscope::encoding::{parse, PrimitiveKind, TypeNode};
//!
//! let node = parse("^{CGPoint=dd}")?;
//! match node {
//!     TypeNode::Pointer(inner) => match *inner {
//!         TypeNode::Struct(point) => {
//!             assert_eq!(point.tag(), Some("CGPoint"));
//!             assert_eq!(point.fields()[0], TypeNode::Primitive(PrimitiveKind::Double));
//!         }
//!         _ => unreachable!(),
//!     },
//!     _ => unreachable!(),
//! }
//! # Ok::<(), objscope::Error>(())
//! ```
//!
//! ```rust
//! use objscope::encoding::parse_prefix;
//!
//! // Walk a method encoding one type at a time
//! let (ret, rest) = parse_prefix("c24@0:8")?;
//! assert_eq!(ret.to_string(), "c");
//! assert_eq!(rest, "@0:8");
//! # Ok::<(), objscope::Error>(())
//! ```

mod cursor;
mod encoder;
mod method;
mod parser;
mod types;

pub use cursor::*;
pub use encoder::*;
pub use method::*;
pub use parser::*;
pub use types::*;

use crate::Result;

/// Parse a complete type encoding
///
/// The whole string must be consumed; only an offset annotation may follow the type.
///
/// ## Arguments
/// * 'encoding' - The encoding to decode
///
/// # Errors
/// Returns [`crate::Error::MalformedEncoding`] if the encoding is empty, malformed, or
/// followed by anything other than an offset annotation.
pub fn parse(encoding: &str) -> Result<TypeNode> {
    let (node, rest) = parse_prefix(encoding)?;
    if !rest.is_empty() {
        return Err(malformed_error!(
            encoding.len() - rest.len(),
            "Trailing characters after type: '{}'",
            rest
        ));
    }

    Ok(node)
}

/// Parse the first type of an encoding and skip its offset annotation
///
/// Returns the decoded type together with the unconsumed remainder, mirroring the cursor
/// semantics of `NSGetSizeAndAlignment`.
///
/// ## Arguments
/// * 'encoding' - The encoding to decode from
///
/// # Errors
/// Returns [`crate::Error::MalformedEncoding`] if the encoding is empty or its first type is
/// malformed.
pub fn parse_prefix(encoding: &str) -> Result<(TypeNode, &str)> {
    if encoding.is_empty() {
        return Err(malformed_error!(0, "Empty type encoding"));
    }

    let mut parser = EncodingParser::new(encoding);
    let node = parser.parse_type()?;
    parser.parse_offset()?;

    Ok((node, parser.remaining()))
}
