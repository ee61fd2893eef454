use crate::{
    encoding::{EncodingParser, TypeNode},
    Result,
};

/// One argument of a method encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodArgument {
    /// The argument type, qualifiers included
    pub node: TypeNode,
    /// Frame offset annotation, if the encoding carried one
    pub offset: Option<i64>,
}

/// A decoded method type encoding, e.g. `v24@0:8@16`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEncoding {
    /// The return type
    pub return_type: TypeNode,
    /// Total argument frame size, annotated after the return type
    pub frame_size: Option<i64>,
    /// Arguments in order, including the implicit receiver and selector
    pub arguments: Vec<MethodArgument>,
}

impl MethodEncoding {
    /// Number of explicit arguments, i.e. without the receiver (`@`) and selector (`:`)
    /// that lead every Objective-C method encoding
    #[must_use]
    pub fn explicit_argument_count(&self) -> usize {
        let implicit = self
            .arguments
            .iter()
            .take(2)
            .zip([false, true])
            .take_while(|(arg, want_selector)| match arg.node.unqualified() {
                TypeNode::SelectorReference => *want_selector,
                TypeNode::ObjectReference(_) | TypeNode::ClassReference => !*want_selector,
                _ => false,
            })
            .count();

        if implicit == 2 {
            self.arguments.len() - 2
        } else {
            self.arguments.len()
        }
    }

    /// Returns `true` if the return type carries the `oneway` qualifier
    #[must_use]
    pub fn is_oneway(&self) -> bool {
        self.return_type
            .qualifiers()
            .contains(crate::encoding::Qualifiers::ONEWAY)
    }
}

/// Parse a method type encoding
///
/// ## Arguments
/// * 'encoding' - Return type followed by the argument types, each optionally followed by
///   its frame offset
///
/// # Errors
/// Returns [`crate::Error::MalformedEncoding`] if the encoding is empty or any type in it
/// is malformed.
///
/// # Example
///
/// ```rust
/// use objscope::encoding::{parse_method, PrimitiveKind, TypeNode};
///
/// let method = parse_method("v24@0:8@16")?;
/// assert_eq!(method.return_type, TypeNode::Primitive(PrimitiveKind::Void));
/// assert_eq!(method.frame_size, Some(24));
/// assert_eq!(method.arguments.len(), 3);
/// assert_eq!(method.explicit_argument_count(), 1);
/// # Ok::<(), objscope::Error>(())
/// ```
pub fn parse_method(encoding: &str) -> Result<MethodEncoding> {
    if encoding.is_empty() {
        return Err(malformed_error!(0, "Empty method encoding"));
    }

    let mut parser = EncodingParser::new(encoding);
    let return_type = parser.parse_type()?;
    let frame_size = parser.parse_offset()?;

    let mut arguments = Vec::new();
    while !parser.is_finished() {
        let node = parser.parse_type()?;
        let offset = parser.parse_offset()?;
        arguments.push(MethodArgument { node, offset });
    }

    Ok(MethodEncoding {
        return_type,
        frame_size,
        arguments,
    })
}
