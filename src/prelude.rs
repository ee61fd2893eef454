//! # objscope Prelude
//!
//! The most commonly used types and functions of objscope, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all objscope operations
pub use crate::Error;

/// The result type used throughout objscope
pub use crate::Result;

// ================================================================================================
// Type Encodings
// ================================================================================================

/// Parsed encoding tree and its building blocks
pub use crate::encoding::{Aggregate, ObjectKind, PrimitiveKind, Qualifiers, TypeNode};

/// Parsing and formatting entry points
pub use crate::encoding::{encode, parse, parse_method, parse_prefix, EncodingParser};

/// Method signatures
pub use crate::encoding::{MethodArgument, MethodEncoding};

// ================================================================================================
// Layout
// ================================================================================================

/// ABI data models and results
pub use crate::layout::{AbiModel, Layout, LayoutComputer, Packing};

/// `NSGetSizeAndAlignment` style entry points
pub use crate::layout::{layout, layout_many, next_size_and_alignment, size_and_alignment};

// ================================================================================================
// Runtime Registry
// ================================================================================================

/// Handles of runtime entities
pub use crate::runtime::{ClassHandle, ProtocolHandle, RuntimeHandle, SelectorHandle, SymbolKind};

/// Symbol tables and the registry
pub use crate::runtime::{ConflictPolicy, Registry, RegistryConfig, SymbolTable};

/// Diagnostics
pub use crate::runtime::{DiagnosticSink, Diagnostics, LogSink, StderrSink};
