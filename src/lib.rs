// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # objscope
//!
//! Introspection core of an Objective-C style object runtime, in pure Rust.
//!
//! `objscope` understands the compact type encoding strings the runtime attaches to
//! methods, instance variables and properties, computes the size and alignment a C
//! compiler would give each encoded type, and keeps the bidirectional name ⇄ handle
//! tables behind `NSClassFromString`, `NSSelectorFromString` and `NSProtocolFromString`.
//!
//! ## Features
//!
//! - **Type encodings** - Recursive-descent parser and encoder for `@encode` strings,
//!   including method signatures with frame offsets and parameter qualifiers
//! - **ABI layout** - `NSGetSizeAndAlignment` over a configurable data model (LP64,
//!   LLP64, ILP32, i386) with optional `#pragma pack` style packing
//! - **Symbol registry** - Concurrent class, selector and protocol tables with explicit
//!   conflict handling
//! - **Pluggable diagnostics** - Rendered lines go to an injected sink, the `log` facade by
//!   default
//!
//! ## Quick Start
//!
//! ```rust
//! use objscope::prelude::*;
//!
//! let node = parse("{CGPoint=dd}")?;
//! assert_eq!(node.to_string(), "{CGPoint=dd}");
//!
//! let layout = size_and_alignment("{S=ci}", &AbiModel::lp64())?;
//! assert_eq!((layout.size, layout.alignment), (8, 4));
//!
//! let (layout, rest) = next_size_and_alignment("i12@0:8", &AbiModel::lp64())?;
//! assert_eq!(layout.size, 4);
//! assert_eq!(rest, "@0:8");
//! # Ok::<(), objscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`encoding`] - Type encoding model, parser and encoder
//! - [`layout`] - ABI models and the layout computer
//! - [`runtime`] - Handles, symbol tables, the process-wide registry and diagnostics
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], carrying an [`Error`]. Lookups that simply
//! find nothing return `None` instead.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and functions.
///
/// # Example
///
/// ```rust
/// use objscope::prelude::*;
///
/// let registry = Registry::default();
/// let selector = registry.selector_from_string("init")?;
/// assert_eq!(registry.string_from_selector(selector).as_deref(), Some("init"));
/// # Ok::<(), objscope::Error>(())
/// ```
pub mod prelude;

/// Type encoding strings.
///
/// Parsing an encoding yields a [`encoding::TypeNode`] tree; formatting the tree yields the
/// canonical encoding again.
///
/// # Example
///
/// ```rust
/// use objscope::encoding::{parse_method, PrimitiveKind, TypeNode};
///
/// let method = parse_method("v24@0:8@16")?;
/// assert_eq!(method.return_type, TypeNode::Primitive(PrimitiveKind::Void));
/// assert_eq!(method.arguments.len(), 3);
/// # Ok::<(), objscope::Error>(())
/// ```
pub mod encoding;

/// Size and alignment of encoded types.
pub mod layout;

/// Symbol tables, handles and diagnostics.
pub mod runtime;

/// `objscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`]. Used consistently throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// `objscope` Error type
///
/// Covers malformed encodings, invalid ABI models and symbol registration failures.
pub use error::Error;

pub use encoding::{encode, parse, parse_method, TypeNode};
pub use layout::{layout, next_size_and_alignment, size_and_alignment, AbiModel, Layout};
pub use runtime::{global, init, Registry, RegistryConfig};
