//! Size and alignment computation for decoded type encodings.
//!
//! The layout computer walks a [`TypeNode`] tree and derives its byte size and alignment
//! under an [`AbiModel`]. It only reads trees, performs no I/O and is total: every tree
//! has a layout. The string entry points compose it with the parser and therefore forward
//! [`crate::Error::MalformedEncoding`].
//!
//! # Rules
//!
//! - **Primitives** take their size from [`AbiModel::primitive`]
//! - **References** (pointers, objects, classes, selectors) are pointer-sized
//! - **Arrays** are `count * element.size` with the element alignment
//! - **Structs** place members in order, each rounded up to its alignment, and pad the
//!   total to the largest member alignment (1 for an empty struct)
//! - **Unions** take the largest member size padded to the largest member alignment
//! - **Bitfields** occupy `ceil(width / 8)` bytes with alignment 1. Inside a struct,
//!   consecutive bitfields share one run of bits that is flushed to whole bytes before the
//!   next ordinary member, at a zero-width bitfield and at the end of the struct. This does
//!   not reproduce the storage-unit rules of platform C compilers.
//! - **Unknown** types have size 0 and alignment 1
//!
//! Arithmetic saturates at `u64::MAX`, so absurd array counts can not make layout fail.
//!
//! # Examples
//!
//! ```rust
//! use objscope::layout::{size_and_alignment, AbiModel, Layout};
//!
//! let model = AbiModel::lp64();
//! assert_eq!(size_and_alignment("{S=ci}", &model)?, Layout::new(8, 4));
//! assert_eq!(size_and_alignment("(U=cd)", &model)?, Layout::new(8, 8));
//! assert_eq!(size_and_alignment("[10c]", &AbiModel::ilp32())?, Layout::new(10, 1));
//! # Ok::<(), objscope::Error>(())
//! ```

mod model;

pub use model::*;

use rayon::prelude::*;

use crate::{
    encoding::{parse, parse_prefix, Aggregate, TypeNode},
    Result,
};

/// Size and alignment of a type, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Size in bytes, including trailing padding
    pub size: u64,
    /// Alignment in bytes, always at least 1
    pub alignment: u64,
}

impl Layout {
    /// Layout of something without storage
    pub const EMPTY: Layout = Layout {
        size: 0,
        alignment: 1,
    };

    /// Create a layout from a size and alignment
    #[must_use]
    pub const fn new(size: u64, alignment: u64) -> Self {
        Layout { size, alignment }
    }
}

/// Round `value` up to the next multiple of `alignment`, saturating at the top of the range
#[must_use]
pub fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }

    match value % alignment {
        0 => value,
        rem => value.saturating_add(alignment - rem),
    }
}

/// Walks type trees and computes layouts under a fixed model
#[derive(Debug, Clone, Copy)]
pub struct LayoutComputer<'a> {
    model: &'a AbiModel,
}

impl<'a> LayoutComputer<'a> {
    /// Create a computer for `model`
    #[must_use]
    pub fn new(model: &'a AbiModel) -> Self {
        LayoutComputer { model }
    }

    /// Compute the layout of a standalone value of type `node`
    #[must_use]
    pub fn compute(&self, node: &TypeNode) -> Layout {
        match node {
            TypeNode::Primitive(kind) => self.model.primitive(*kind),
            TypeNode::Pointer(_)
            | TypeNode::ObjectReference(_)
            | TypeNode::ClassReference
            | TypeNode::SelectorReference => self.model.pointer(),
            TypeNode::ArrayOf(count, element) => {
                let element = self.compute(element);
                Layout::new(count.saturating_mul(element.size), element.alignment)
            }
            TypeNode::Struct(aggregate) => self.struct_layout(aggregate).0,
            TypeNode::Union(aggregate) => self.union_layout(aggregate),
            TypeNode::Bitfield(width) => Layout::new(u64::from(*width).div_ceil(8), 1),
            TypeNode::Complex(element) => {
                let element = self.compute(element);
                Layout::new(element.size.saturating_mul(2), element.alignment)
            }
            TypeNode::Qualified(_, inner) => self.compute(inner),
            TypeNode::Unknown => Layout::EMPTY,
        }
    }

    /// Byte offsets of the members of a struct, in declaration order
    ///
    /// A bitfield reports the offset of the byte its bit run starts in.
    #[must_use]
    pub fn field_offsets(&self, aggregate: &Aggregate) -> Vec<u64> {
        self.struct_layout(aggregate).1
    }

    fn struct_layout(&self, aggregate: &Aggregate) -> (Layout, Vec<u64>) {
        let packing = self.model.packing();
        let mut offsets = Vec::with_capacity(aggregate.len());
        let mut offset = 0u64;
        let mut max_align = 1u64;
        // Bits consumed in the currently open bitfield run
        let mut run_bits = 0u64;

        for field in aggregate.fields() {
            if let TypeNode::Bitfield(width) = field.unqualified() {
                let run_start = offset;
                offsets.push(run_start.saturating_add(run_bits / 8));
                if *width == 0 {
                    offset = offset.saturating_add(run_bits.div_ceil(8));
                    run_bits = 0;
                } else {
                    run_bits = run_bits.saturating_add(u64::from(*width));
                }
                continue;
            }

            if run_bits > 0 {
                offset = offset.saturating_add(run_bits.div_ceil(8));
                run_bits = 0;
            }

            let layout = self.compute(field);
            let align = packing.cap(layout.alignment);
            max_align = max_align.max(align);

            offset = align_up(offset, align);
            offsets.push(offset);
            offset = offset.saturating_add(layout.size);
        }

        if run_bits > 0 {
            offset = offset.saturating_add(run_bits.div_ceil(8));
        }

        (
            Layout::new(align_up(offset, max_align), max_align),
            offsets,
        )
    }

    fn union_layout(&self, aggregate: &Aggregate) -> Layout {
        let packing = self.model.packing();
        let mut max_size = 0u64;
        let mut max_align = 1u64;

        for field in aggregate.fields() {
            let layout = self.compute(field);
            max_size = max_size.max(layout.size);
            max_align = max_align.max(packing.cap(layout.alignment));
        }

        Layout::new(align_up(max_size, max_align), max_align)
    }
}

/// Compute the layout of a type tree
#[must_use]
pub fn layout(node: &TypeNode, model: &AbiModel) -> Layout {
    LayoutComputer::new(model).compute(node)
}

/// Parse a complete type encoding and compute its layout
///
/// # Errors
/// Returns [`crate::Error::MalformedEncoding`] if the encoding does not parse.
pub fn size_and_alignment(encoding: &str, model: &AbiModel) -> Result<Layout> {
    Ok(layout(&parse(encoding)?, model))
}

/// Compute the layout of the first type in an encoding and return the remainder
///
/// This is the `NSGetSizeAndAlignment` contract: the offset annotation after the type is
/// skipped, so repeated calls walk a method encoding argument by argument.
///
/// # Errors
/// Returns [`crate::Error::MalformedEncoding`] if the first type does not parse.
///
/// # Example
///
/// ```rust
/// use objscope::layout::{next_size_and_alignment, AbiModel, Layout};
///
/// let model = AbiModel::lp64();
/// let (ret, rest) = next_size_and_alignment("i12@0:8", &model)?;
/// assert_eq!(ret, Layout::new(4, 4));
/// assert_eq!(rest, "@0:8");
/// # Ok::<(), objscope::Error>(())
/// ```
pub fn next_size_and_alignment<'a>(
    encoding: &'a str,
    model: &AbiModel,
) -> Result<(Layout, &'a str)> {
    let (node, rest) = parse_prefix(encoding)?;
    Ok((layout(&node, model), rest))
}

/// Compute layouts for many encodings in parallel
///
/// Results are returned in input order; a malformed encoding only fails its own slot.
#[must_use]
pub fn layout_many(encodings: &[&str], model: &AbiModel) -> Vec<Result<Layout>> {
    encodings
        .par_iter()
        .map(|encoding| size_and_alignment(encoding, model))
        .collect()
}
