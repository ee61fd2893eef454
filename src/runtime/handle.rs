use std::{fmt, hash::Hash};

use strum::{Display, EnumIter};

/// The three independent symbol namespaces of the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SymbolKind {
    /// Class names
    Class,
    /// Selector (method) names
    Selector,
    /// Protocol names
    Protocol,
}

/// An opaque, comparable identifier for a runtime entity of one [`SymbolKind`].
///
/// Handles are arena-style integers rather than addresses. The raw value `0` is the nil
/// handle, it never refers to anything and can not be registered.
pub trait RuntimeHandle: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The namespace this handle belongs to
    const KIND: SymbolKind;

    /// Creates a handle from a raw value
    fn from_raw(raw: u32) -> Self;

    /// Returns the raw value
    fn raw(self) -> u32;

    /// Returns true if this is the nil handle (value 0)
    fn is_nil(self) -> bool {
        self.raw() == 0
    }
}

macro_rules! runtime_handle {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// Creates a new handle from a raw 32-bit value
            #[must_use]
            pub const fn new(value: u32) -> Self {
                $name(value)
            }

            /// Returns the raw handle value
            #[must_use]
            pub const fn value(&self) -> u32 {
                self.0
            }
        }

        impl RuntimeHandle for $name {
            const KIND: SymbolKind = $kind;

            fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            fn raw(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                $name(value)
            }
        }

        impl From<$name> for u32 {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "(0x{:08x})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{:08x}", self.0)
            }
        }
    };
}

runtime_handle!(
    /// Handle of a class object
    ClassHandle,
    SymbolKind::Class,
    "Class"
);

runtime_handle!(
    /// Handle of a registered selector
    SelectorHandle,
    SymbolKind::Selector,
    "Selector"
);

runtime_handle!(
    /// Handle of a protocol object
    ProtocolHandle,
    SymbolKind::Protocol,
    "Protocol"
);
