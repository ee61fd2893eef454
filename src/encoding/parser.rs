use crate::{
    encoding::{Aggregate, Cursor, ObjectKind, PrimitiveKind, Qualifiers, TypeNode},
    Result,
};

/// Default maximum nesting depth of pointers, arrays and aggregates
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Recursive-descent decoder for type encodings
///
/// Every production is selected by its leading character, so a single left-to-right pass
/// without backtracking decodes any encoding.
///
/// # Example
///
/// ```rust
/// use objscope::encoding::{EncodingParser, PrimitiveKind, TypeNode};
///
/// let mut parser = EncodingParser::new("i16@0:8");
/// let ret = parser.parse_type()?;
/// assert_eq!(ret, TypeNode::Primitive(PrimitiveKind::Int));
/// assert_eq!(parser.parse_offset()?, Some(16));
/// assert_eq!(parser.remaining(), "@0:8");
/// # Ok::<(), objscope::Error>(())
/// ```
///
/// ## Notes:
/// - Nesting is guarded by a depth counter, pathological input fails with
///   [`crate::Error::MalformedEncoding`] instead of exhausting the stack
/// - The parser performs no semantic validation, `b0` or `[0i]` are accepted as written
pub struct EncodingParser<'a> {
    cursor: Cursor<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> EncodingParser<'a> {
    /// Create a new `EncodingParser` for an encoding string
    ///
    /// ## Arguments
    /// * 'encoding' - The encoding to decode
    #[must_use]
    pub fn new(encoding: &'a str) -> Self {
        EncodingParser {
            cursor: Cursor::new(encoding),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replace the maximum nesting depth
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Current byte offset into the encoding
    #[must_use]
    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    /// The unconsumed rest of the encoding
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        self.cursor.remaining()
    }

    /// Returns `true` once the whole encoding has been consumed
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.cursor.has_more_data()
    }

    /// Parse a single type, including any leading qualifiers
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedEncoding`] if the next type is not well-formed.
    pub fn parse_type(&mut self) -> Result<TypeNode> {
        if self.depth >= self.max_depth {
            return Err(malformed_error!(
                self.cursor.pos(),
                "Nesting exceeds the maximum depth of {}",
                self.max_depth
            ));
        }

        self.depth += 1;
        let result = self.parse_qualified();
        self.depth -= 1;
        result
    }

    /// Parse the optional offset annotation that may follow a type
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedEncoding`] for a dangling sign or an oversized value.
    pub fn parse_offset(&mut self) -> Result<Option<i64>> {
        self.cursor.read_signed_decimal("offset")
    }

    fn parse_qualified(&mut self) -> Result<TypeNode> {
        let mut qualifiers = Qualifiers::empty();
        loop {
            match self.cursor.peek_byte() {
                // GC-invisible marker, it does not change the type
                Some(b'|') => {}
                Some(byte) => match Qualifiers::from_code(byte) {
                    Some(flag) => qualifiers |= flag,
                    None => break,
                },
                None => break,
            }
            self.cursor.advance()?;
        }

        let node = self.parse_unqualified()?;
        if qualifiers.is_empty() {
            Ok(node)
        } else {
            Ok(TypeNode::Qualified(qualifiers, Box::new(node)))
        }
    }

    fn parse_unqualified(&mut self) -> Result<TypeNode> {
        let start = self.cursor.pos();
        let Some(current_byte) = self.cursor.peek_byte() else {
            return Err(malformed_error!(start, "Expected a type, found end of encoding"));
        };

        if let Some(kind) = PrimitiveKind::from_code(current_byte) {
            self.cursor.advance()?;
            return Ok(TypeNode::Primitive(kind));
        }

        match current_byte {
            b'^' | b'j' | b'[' | b'{' | b'(' | b'b' | b'@' | b'#' | b':' | b'?' | b'!' => {}
            b']' | b'}' | b')' => {
                return Err(malformed_error!(
                    start,
                    "Unmatched '{}'",
                    char::from(current_byte)
                ))
            }
            _ => {
                let found = self.cursor.remaining().chars().next().unwrap_or_default();
                return Err(malformed_error!(
                    start,
                    "Unsupported type code '{}'",
                    found.escape_default()
                ));
            }
        }

        self.cursor.advance()?;
        match current_byte {
            b'^' => Ok(TypeNode::Pointer(Box::new(self.parse_type()?))),
            b'j' => Ok(TypeNode::Complex(Box::new(self.parse_type()?))),
            b'[' => {
                let count = self.cursor.read_decimal("array count")?;
                let element = self.parse_type()?;
                if !self.cursor.eat(b']') {
                    return Err(self.unmatched(start, '['));
                }

                Ok(TypeNode::ArrayOf(count, Box::new(element)))
            }
            b'{' => Ok(TypeNode::Struct(self.parse_aggregate(start, b'}')?)),
            b'(' => Ok(TypeNode::Union(self.parse_aggregate(start, b')')?)),
            b'b' => {
                let width = self.cursor.read_decimal("bitfield width")?;
                let width = u32::try_from(width)
                    .map_err(|_| malformed_error!(start + 1, "Bitfield width {} is too large", width))?;

                Ok(TypeNode::Bitfield(width))
            }
            b'!' => self.parse_vector(start),
            b'@' => self.parse_object(),
            b'#' => Ok(TypeNode::ClassReference),
            b':' => Ok(TypeNode::SelectorReference),
            _ => Ok(TypeNode::Unknown),
        }
    }

    /// Parse the body of a struct or union, the opening delimiter is already consumed
    fn parse_aggregate(&mut self, start: usize, close: u8) -> Result<Aggregate> {
        let open = if close == b'}' { '{' } else { '(' };

        let Some(raw_tag) = self.cursor.take_until(|b| b == b'=' || b == close) else {
            return Err(self.unmatched(start, open));
        };
        let tag = match raw_tag {
            "" | "?" => None,
            name => Some(name.to_string()),
        };

        let mut fields = Vec::new();
        if self.cursor.eat(b'=') {
            loop {
                match self.cursor.peek_byte() {
                    None => return Err(self.unmatched(start, open)),
                    Some(byte) if byte == close => break,
                    Some(b'"') => self.skip_field_name()?,
                    Some(_) => fields.push(self.parse_type()?),
                }
            }
        }

        // Only the closing delimiter can remain here
        self.cursor.advance()?;
        Ok(Aggregate::new(tag, fields))
    }

    /// Skip a quoted member name, the member type follows it
    fn skip_field_name(&mut self) -> Result<()> {
        let quote = self.cursor.pos();
        self.cursor.advance()?;
        if self.cursor.take_until(|b| b == b'"').is_none() {
            return Err(self.unmatched(quote, '"'));
        }

        self.cursor.advance()
    }

    /// Parse a vector `![size,alignment type]`, the `!` is already consumed
    ///
    /// Vectors are recognized but opaque, they decode to [`TypeNode::Unknown`].
    fn parse_vector(&mut self, start: usize) -> Result<TypeNode> {
        if !self.cursor.eat(b'[') {
            return Err(malformed_error!(self.cursor.pos(), "Expected '[' after vector marker"));
        }

        self.cursor.read_decimal("vector size")?;
        if !self.cursor.eat(b',') {
            return Err(malformed_error!(self.cursor.pos(), "Expected ',' in vector"));
        }
        self.cursor.read_decimal("vector alignment")?;
        self.parse_type()?;
        if !self.cursor.eat(b']') {
            return Err(self.unmatched(start + 1, '['));
        }

        Ok(TypeNode::Unknown)
    }

    /// Parse what follows `@`: nothing, a quoted class name or a block marker
    fn parse_object(&mut self) -> Result<TypeNode> {
        let quote = self.cursor.pos();
        if self.cursor.eat(b'"') {
            let Some(name) = self.cursor.take_until(|b| b == b'"') else {
                return Err(self.unmatched(quote, '"'));
            };
            self.cursor.advance()?;

            return Ok(TypeNode::ObjectReference(ObjectKind::Named(name.to_string())));
        }

        if self.cursor.eat(b'?') {
            return Ok(TypeNode::ObjectReference(ObjectKind::Block));
        }

        Ok(TypeNode::ObjectReference(ObjectKind::Any))
    }

    fn unmatched(&self, start: usize, open: char) -> crate::Error {
        malformed_error!(start, "Unmatched '{}'", open)
    }
}
