//! Canonical encoder for decoded type trees.
//!
//! Renders a [`TypeNode`] back into its textual type encoding. The output is canonical:
//! anonymous aggregates are written without a tag, qualifiers in a fixed order, and offset
//! annotations are never emitted. Decoding the output yields a tree equal to the input.
//!
//! # Examples
//!
//! ```rust
//! use objscope::encoding::{encode, parse};
//!
//! let node = parse("{CGRect={CGPoint=dd}{CGSize=dd}}16")?;
//! assert_eq!(encode(&node), "{CGRect={CGPoint=dd}{CGSize=dd}}");
//! # Ok::<(), objscope::Error>(())
//! ```

use std::fmt::{self, Write};

use crate::encoding::{types::QUALIFIER_CODES, Aggregate, ObjectKind, TypeNode};

/// Encode a type tree into its canonical type encoding
#[must_use]
pub fn encode(node: &TypeNode) -> String {
    let mut buffer = String::new();
    // Writing into a String can not fail
    let _ = write_type(node, &mut buffer);
    buffer
}

/// Write the canonical encoding of `node` into any formatter sink
///
/// # Errors
/// Propagates errors from the underlying writer.
pub fn write_type<W: Write>(node: &TypeNode, out: &mut W) -> fmt::Result {
    match node {
        TypeNode::Primitive(kind) => out.write_char(kind.code()),
        TypeNode::Pointer(inner) => {
            out.write_char('^')?;
            write_type(inner, out)
        }
        TypeNode::ArrayOf(count, element) => {
            write!(out, "[{count}")?;
            write_type(element, out)?;
            out.write_char(']')
        }
        TypeNode::Struct(aggregate) => write_aggregate(aggregate, '{', '}', out),
        TypeNode::Union(aggregate) => write_aggregate(aggregate, '(', ')', out),
        TypeNode::Bitfield(width) => write!(out, "b{width}"),
        TypeNode::Complex(inner) => {
            out.write_char('j')?;
            write_type(inner, out)
        }
        TypeNode::Qualified(qualifiers, inner) => {
            for (flag, code) in QUALIFIER_CODES {
                if qualifiers.contains(flag) {
                    out.write_char(code)?;
                }
            }
            write_type(inner, out)
        }
        TypeNode::ObjectReference(ObjectKind::Any) => out.write_char('@'),
        TypeNode::ObjectReference(ObjectKind::Block) => out.write_str("@?"),
        TypeNode::ObjectReference(ObjectKind::Named(name)) => write!(out, "@\"{name}\""),
        TypeNode::ClassReference => out.write_char('#'),
        TypeNode::SelectorReference => out.write_char(':'),
        TypeNode::Unknown => out.write_char('?'),
    }
}

fn write_aggregate<W: Write>(
    aggregate: &Aggregate,
    open: char,
    close: char,
    out: &mut W,
) -> fmt::Result {
    out.write_char(open)?;
    if let Some(tag) = aggregate.tag() {
        out.write_str(tag)?;
    }
    out.write_char('=')?;
    for field in aggregate.fields() {
        write_type(field, out)?;
    }
    out.write_char(close)
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoding::{parse, PrimitiveKind, Qualifiers},
        test::*,
    };

    #[test]
    fn test_encode_primitives_and_references() {
        assert_eq!(encode(&prim(PrimitiveKind::ULongLong)), "Q");
        assert_eq!(encode(&ptr(prim(PrimitiveKind::Void))), "^v");
        assert_eq!(encode(&TypeNode::ClassReference), "#");
        assert_eq!(encode(&TypeNode::SelectorReference), ":");
        assert_eq!(encode(&TypeNode::Unknown), "?");
        assert_eq!(
            encode(&TypeNode::ObjectReference(ObjectKind::Named("NSArray".into()))),
            "@\"NSArray\""
        );
        assert_eq!(encode(&TypeNode::ObjectReference(ObjectKind::Block)), "@?");
    }

    #[test]
    fn test_encode_aggregates() {
        let node = strukt(
            None,
            vec![
                array(4, prim(PrimitiveKind::Char)),
                union(Some("U"), vec![TypeNode::Bitfield(3), prim(PrimitiveKind::Float)]),
            ],
        );
        assert_eq!(encode(&node), "{=[4c](U=b3f)}");
        assert_eq!(node.to_string(), "{=[4c](U=b3f)}");
    }

    #[test]
    fn test_encode_qualifiers_in_canonical_order() {
        let node = TypeNode::Qualified(
            Qualifiers::ONEWAY | Qualifiers::CONST | Qualifiers::OUT,
            Box::new(TypeNode::Complex(Box::new(prim(PrimitiveKind::Float)))),
        );
        assert_eq!(encode(&node), "roVjf");
    }

    #[test]
    fn test_reencoding_reparses_to_the_same_tree() {
        let encodings = [
            "{CGRect={CGPoint=dd}{CGSize=dd}}",
            "{__CFString}",
            "^{?=i[3^(U=cs)]b5}",
            "rn^@\"NSError\"",
            "[0{E=}]",
            "{S=B*%:#@?jD}",
            "(?=tT)",
        ];

        for encoding in encodings {
            let tree = parse(encoding).unwrap();
            let reparsed = parse(&encode(&tree)).unwrap();
            assert_eq!(reparsed, tree, "{encoding}");
        }
    }
}
