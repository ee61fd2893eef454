use thiserror::Error;

use crate::runtime::SymbolKind;

macro_rules! malformed_error {
    // Single string version
    ($offset:expr, $msg:expr) => {
        crate::Error::MalformedEncoding {
            offset: $offset,
            message: $msg.to_string(),
        }
    };

    // Format string with arguments version
    ($offset:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::MalformedEncoding {
            offset: $offset,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Lookups in the symbol tables never fail: a missing name or handle is reported as `None`,
/// not as an error. Layout computation is total as well, so every variant below originates
/// either from the type-encoding parser, from a registration, or from configuration.
///
/// # Error Categories
///
/// ## Encoding Errors
/// - [`Error::MalformedEncoding`] - Syntax violation in a type encoding
///
/// ## Symbol Table Errors
/// - [`Error::ConflictingRegistration`] - Name or handle already bound differently
/// - [`Error::EmptyName`] - Symbol names must be non-empty
/// - [`Error::NilHandle`] - The nil handle cannot be bound to a name
/// - [`Error::HandleExhausted`] - No fresh handle left to intern a name
/// - [`Error::AlreadyInitialized`] - The process-wide registry was initialized twice
///
/// ## Configuration Errors
/// - [`Error::InvalidAbiModel`] - Unsupported ABI parameters
///
/// # Examples
///
/// ```rust
/// use objscope::{encoding::parse, Error};
///
/// match parse("{S=i") {
///     Ok(node) => println!("parsed {node}"),
///     Err(Error::MalformedEncoding { offset, message }) => {
///         eprintln!("bad encoding at {offset}: {message}");
///     }
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The type encoding does not follow the encoding grammar.
    ///
    /// # Fields
    ///
    /// * `offset` - Byte offset into the encoding where decoding failed
    /// * `message` - Description of what was expected or found
    #[error("Malformed encoding at offset {offset}: {message}")]
    MalformedEncoding {
        /// Byte offset of the offending character
        offset: usize,
        /// What went wrong at that offset
        message: String,
    },

    /// A registration would rebind an existing name or handle to something else.
    ///
    /// Only raised under [`crate::runtime::ConflictPolicy::Reject`], or under
    /// [`crate::runtime::ConflictPolicy::Replace`] when the handle already names a
    /// different symbol.
    #[error("Conflicting {kind} registration for '{name}' - {message}")]
    ConflictingRegistration {
        /// The table in which the conflict happened
        kind: SymbolKind,
        /// The name that was being registered
        name: String,
        /// Rendered description of the existing binding
        message: String,
    },

    /// Symbol names must contain at least one character.
    #[error("Empty {0} name can not be registered")]
    EmptyName(SymbolKind),

    /// The nil handle (raw value 0) never refers to a runtime entity.
    #[error("The nil {0} handle can not be registered")]
    NilHandle(SymbolKind),

    /// The handle counter used by interning ran out of values.
    #[error("No free {0} handle left to intern a new name")]
    HandleExhausted(SymbolKind),

    /// The requested ABI parameters are not supported.
    #[error("Invalid ABI model - {0}")]
    InvalidAbiModel(String),

    /// [`crate::runtime::init`] was called after the registry already existed.
    #[error("The process-wide registry has already been initialized")]
    AlreadyInitialized,
}
