//! Integration tests for type encodings and their layout.
//!
//! Exercises the public API the way a runtime would: encodings as emitted by the
//! compiler for common Foundation and CoreGraphics types, checked against the sizes a
//! C compiler assigns on each data model.

use objscope::prelude::*;

fn lp64(encoding: &str) -> Result<(u64, u64)> {
    let layout = size_and_alignment(encoding, &AbiModel::lp64())?;
    Ok((layout.size, layout.alignment))
}

#[test]
fn test_primitive_and_pointer_layout() -> Result<()> {
    let model = AbiModel::lp64();

    let int = TypeNode::Primitive(PrimitiveKind::Int);
    assert_eq!(layout(&int, &model), Layout::new(4, 4));

    let char_ptr = TypeNode::Pointer(Box::new(TypeNode::Primitive(PrimitiveKind::Char)));
    assert_eq!(layout(&char_ptr, &model), Layout::new(8, 8));
    assert_eq!(layout(&char_ptr, &AbiModel::ilp32()), Layout::new(4, 4));

    assert_eq!(lp64("q")?, (8, 8));
    assert_eq!(lp64("*")?, (8, 8));
    assert_eq!(lp64("v")?, (0, 1));
    Ok(())
}

#[test]
fn test_struct_union_and_array_layout() -> Result<()> {
    let model = AbiModel::lp64();

    let char_int = TypeNode::Struct(Aggregate::new(
        None,
        vec![
            TypeNode::Primitive(PrimitiveKind::Char),
            TypeNode::Primitive(PrimitiveKind::Int),
        ],
    ));
    assert_eq!(layout(&char_int, &model), Layout::new(8, 4));

    let char_double = TypeNode::Union(Aggregate::new(
        None,
        vec![
            TypeNode::Primitive(PrimitiveKind::Char),
            TypeNode::Primitive(PrimitiveKind::Double),
        ],
    ));
    assert_eq!(layout(&char_double, &model), Layout::new(8, 8));

    let chars = TypeNode::ArrayOf(10, Box::new(TypeNode::Primitive(PrimitiveKind::Char)));
    for model in [
        AbiModel::lp64(),
        AbiModel::llp64(),
        AbiModel::ilp32(),
        AbiModel::i386(),
    ] {
        assert_eq!(layout(&chars, &model), Layout::new(10, 1));
    }
    Ok(())
}

#[test]
fn test_foundation_structs() -> Result<()> {
    assert_eq!(lp64("{CGPoint=dd}")?, (16, 8));
    assert_eq!(lp64("{CGRect={CGPoint=dd}{CGSize=dd}}")?, (32, 8));
    assert_eq!(lp64("{_NSRange=QQ}")?, (16, 8));

    let range = size_and_alignment("{_NSRange=QQ}", &AbiModel::ilp32())?;
    assert_eq!(range, Layout::new(16, 8));

    let range = size_and_alignment("{_NSRange=II}", &AbiModel::i386())?;
    assert_eq!(range, Layout::new(8, 4));
    Ok(())
}

#[test]
fn test_empty_encoding_fails() {
    assert!(matches!(
        parse(""),
        Err(Error::MalformedEncoding { offset: 0, .. })
    ));
    assert!(size_and_alignment("", &AbiModel::lp64()).is_err());
}

#[test]
fn test_empty_struct() -> Result<()> {
    let node = parse("{S=}")?;
    match &node {
        TypeNode::Struct(aggregate) => {
            assert_eq!(aggregate.tag(), Some("S"));
            assert!(aggregate.is_empty());
        }
        other => panic!("expected struct, got {other:?}"),
    }
    assert_eq!(layout(&node, &AbiModel::lp64()), Layout::new(0, 1));
    Ok(())
}

#[test]
fn test_reencoding_is_stable() -> Result<()> {
    let encodings = [
        "i",
        "^^c",
        "[10c]",
        "{CGRect={CGPoint=dd}{CGSize=dd}}",
        "(U=ic)",
        "{S=cib2b7d}",
        "@\"NSString\"",
        "@?",
        "#",
        ":",
        "r*",
        "jf",
        "^?",
        "{Opaque}",
        "[4{P=^v[2S]}]",
    ];

    for encoding in encodings {
        let tree = parse(encoding)?;
        let reparsed = parse(&encode(&tree))?;
        assert_eq!(tree, reparsed, "re-encoding {encoding} changed its tree");
        assert_eq!(
            layout(&tree, &AbiModel::lp64()),
            layout(&reparsed, &AbiModel::lp64())
        );
    }
    Ok(())
}

#[test]
fn test_malformed_encodings_report_offsets() {
    let cases = [("{S=i", 0), ("[10i", 0), ("^", 1), ("ii", 1), ("{S=i)", 4)];

    for (encoding, expected) in cases {
        match parse(encoding) {
            Err(Error::MalformedEncoding { offset, .. }) => {
                assert_eq!(offset, expected, "offset for {encoding}")
            }
            other => panic!("{encoding} should be malformed, got {other:?}"),
        }
    }
}

#[test]
fn test_next_size_and_alignment_walks_signature() -> Result<()> {
    let model = AbiModel::lp64();

    let (first, rest) = next_size_and_alignment("i12@0:8", &model)?;
    assert_eq!(first, Layout::new(4, 4));
    assert_eq!(rest, "@0:8");

    let (second, rest) = next_size_and_alignment(rest, &model)?;
    assert_eq!(second, Layout::new(8, 8));
    assert_eq!(rest, ":8");

    let (third, rest) = next_size_and_alignment(rest, &model)?;
    assert_eq!(third, Layout::new(8, 8));
    assert!(rest.is_empty());
    Ok(())
}

#[test]
fn test_method_signature() -> Result<()> {
    let method = parse_method("v24@0:8@16")?;

    assert_eq!(method.return_type, TypeNode::Primitive(PrimitiveKind::Void));
    assert_eq!(method.frame_size, Some(24));
    let offsets: Vec<_> = method.arguments.iter().map(|arg| arg.offset).collect();
    assert_eq!(offsets, vec![Some(0), Some(8), Some(16)]);
    assert_eq!(method.explicit_argument_count(), 1);

    let oneway = parse_method("Vv16@0:8")?;
    assert!(oneway.is_oneway());
    Ok(())
}

#[test]
fn test_packing_and_model_validation() -> Result<()> {
    let packed = AbiModel::lp64().with_packing(Packing::Bytes(1))?;
    assert_eq!(size_and_alignment("{S=ci}", &packed)?, Layout::new(5, 1));

    assert!(matches!(
        AbiModel::new(6, 8),
        Err(Error::InvalidAbiModel(_))
    ));
    assert!(AbiModel::lp64().with_packing(Packing::Bytes(3)).is_err());
    Ok(())
}

#[test]
fn test_layout_many_keeps_order() {
    let encodings = ["c", "{S=ci}", "", "d"];
    let results = layout_many(&encodings, &AbiModel::lp64());

    assert_eq!(results.len(), 4);
    assert_eq!(results[0], Ok(Layout::new(1, 1)));
    assert_eq!(results[1], Ok(Layout::new(8, 4)));
    assert!(results[2].is_err());
    assert_eq!(results[3], Ok(Layout::new(8, 8)));
}

#[test]
fn test_deep_nesting_is_rejected() {
    let deep = format!("{}i", "^".repeat(10_000));
    assert!(matches!(
        parse(&deep),
        Err(Error::MalformedEncoding { .. })
    ));

    let mut parser = EncodingParser::new("^^^i").with_max_depth(2);
    assert!(parser.parse_type().is_err());
}
