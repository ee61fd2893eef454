//! ABI models parameterizing the layout computation.
//!
//! Sizes and alignments of most primitives are fixed, a handful depend on the platform:
//! pointer width, the width of `long`, the alignment of 8-byte scalars inside aggregates
//! (4 on i386 System V) and the representation of `long double`. [`AbiModel`] captures
//! these parameters, with presets for the common data models.
//!
//! | Preset | pointer | long | 8-byte scalar align | long double |
//! |--------|---------|------|---------------------|-------------|
//! | [`AbiModel::lp64`] | 8 | 8 | 8 | 16 / 16 |
//! | [`AbiModel::llp64`] | 8 | 4 | 8 | 8 / 8 |
//! | [`AbiModel::ilp32`] | 4 | 4 | 8 | 8 / 8 |
//! | [`AbiModel::i386`] | 4 | 4 | 4 | 12 / 4 |

use crate::{
    encoding::PrimitiveKind,
    layout::Layout,
    Error::InvalidAbiModel,
    Result,
};

/// Largest explicit packing granularity accepted by [`Packing::Bytes`]
pub const MAX_PACKING: u64 = 16;

/// Structure packing granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Packing {
    #[default]
    /// Members use their natural alignment
    Natural,
    /// Member alignment is capped at this many bytes, like `#pragma pack(n)`
    Bytes(u64),
}

impl Packing {
    /// Apply the packing cap to a member alignment
    #[must_use]
    pub fn cap(self, alignment: u64) -> u64 {
        match self {
            Packing::Natural => alignment,
            Packing::Bytes(limit) => alignment.min(limit),
        }
    }
}

/// Platform parameters needed to turn a type encoding into concrete sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbiModel {
    pointer_width: u64,
    long_width: u64,
    wide_scalar_alignment: u64,
    long_double: Layout,
    packing: Packing,
}

impl AbiModel {
    /// Create a model with natural alignment from a pointer and `long` width
    ///
    /// ## Arguments
    /// * 'pointer_width' - Size of a pointer in bytes, 4 or 8
    /// * 'long_width' - Size of `long` in bytes, 4 or 8
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAbiModel`] if either width is not 4 or 8.
    pub fn new(pointer_width: u64, long_width: u64) -> Result<Self> {
        if !matches!(pointer_width, 4 | 8) {
            return Err(InvalidAbiModel(format!(
                "pointer width must be 4 or 8 bytes, got {pointer_width}"
            )));
        }
        if !matches!(long_width, 4 | 8) {
            return Err(InvalidAbiModel(format!(
                "long width must be 4 or 8 bytes, got {long_width}"
            )));
        }

        let long_double = if pointer_width == 8 && long_width == 8 {
            Layout::new(16, 16)
        } else {
            Layout::new(8, 8)
        };

        Ok(AbiModel {
            pointer_width,
            long_width,
            wide_scalar_alignment: 8,
            long_double,
            packing: Packing::Natural,
        })
    }

    /// 64-bit Unix data model: 8-byte pointers and `long`
    #[must_use]
    pub fn lp64() -> Self {
        AbiModel {
            pointer_width: 8,
            long_width: 8,
            wide_scalar_alignment: 8,
            long_double: Layout::new(16, 16),
            packing: Packing::Natural,
        }
    }

    /// 64-bit Windows data model: 8-byte pointers, 4-byte `long`
    #[must_use]
    pub fn llp64() -> Self {
        AbiModel {
            long_width: 4,
            long_double: Layout::new(8, 8),
            ..Self::lp64()
        }
    }

    /// Generic 32-bit data model: 4-byte pointers and `long`
    #[must_use]
    pub fn ilp32() -> Self {
        AbiModel {
            pointer_width: 4,
            long_width: 4,
            wide_scalar_alignment: 8,
            long_double: Layout::new(8, 8),
            packing: Packing::Natural,
        }
    }

    /// i386 System V: like [`AbiModel::ilp32`], but 8-byte scalars are 4-byte aligned and
    /// `long double` is the 12-byte x87 format
    #[must_use]
    pub fn i386() -> Self {
        AbiModel {
            wide_scalar_alignment: 4,
            long_double: Layout::new(12, 4),
            ..Self::ilp32()
        }
    }

    /// The model of the platform this crate was compiled for
    #[must_use]
    pub fn host() -> Self {
        if cfg!(target_pointer_width = "64") {
            if cfg!(target_os = "windows") {
                Self::llp64()
            } else {
                Self::lp64()
            }
        } else if cfg!(target_arch = "x86") {
            Self::i386()
        } else {
            Self::ilp32()
        }
    }

    /// Replace the structure packing granularity
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAbiModel`] if an explicit packing is not a power of two
    /// between 1 and [`MAX_PACKING`].
    pub fn with_packing(mut self, packing: Packing) -> Result<Self> {
        if let Packing::Bytes(limit) = packing {
            if !limit.is_power_of_two() || limit > MAX_PACKING {
                return Err(InvalidAbiModel(format!(
                    "packing must be a power of two up to {MAX_PACKING}, got {limit}"
                )));
            }
        }

        self.packing = packing;
        Ok(self)
    }

    /// Replace the alignment used for 8-byte scalars (`long long`, `double`)
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAbiModel`] unless the alignment is 4 or 8.
    pub fn with_wide_scalar_alignment(mut self, alignment: u64) -> Result<Self> {
        if !matches!(alignment, 4 | 8) {
            return Err(InvalidAbiModel(format!(
                "8-byte scalar alignment must be 4 or 8, got {alignment}"
            )));
        }

        self.wide_scalar_alignment = alignment;
        Ok(self)
    }

    /// Replace the size and alignment of `long double`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAbiModel`] if the alignment is not a power of two or does
    /// not divide the size.
    pub fn with_long_double(mut self, layout: Layout) -> Result<Self> {
        if !layout.alignment.is_power_of_two() || layout.size % layout.alignment != 0 {
            return Err(InvalidAbiModel(format!(
                "long double layout {}/{} is not self-consistent",
                layout.size, layout.alignment
            )));
        }

        self.long_double = layout;
        Ok(self)
    }

    /// Size and alignment of pointers
    #[must_use]
    pub fn pointer_width(&self) -> u64 {
        self.pointer_width
    }

    /// Size of `long`
    #[must_use]
    pub fn long_width(&self) -> u64 {
        self.long_width
    }

    /// Alignment of 8-byte scalars
    #[must_use]
    pub fn wide_scalar_alignment(&self) -> u64 {
        self.wide_scalar_alignment
    }

    /// The structure packing granularity
    #[must_use]
    pub fn packing(&self) -> Packing {
        self.packing
    }

    /// Size and alignment of a primitive under this model
    #[must_use]
    pub fn primitive(&self, kind: PrimitiveKind) -> Layout {
        match kind {
            PrimitiveKind::Char | PrimitiveKind::UChar | PrimitiveKind::Bool => Layout::new(1, 1),
            PrimitiveKind::Short | PrimitiveKind::UShort => Layout::new(2, 2),
            PrimitiveKind::Int | PrimitiveKind::UInt | PrimitiveKind::Float => Layout::new(4, 4),
            PrimitiveKind::Long | PrimitiveKind::ULong => Layout::new(
                self.long_width,
                self.long_width.min(self.wide_scalar_alignment),
            ),
            PrimitiveKind::LongLong | PrimitiveKind::ULongLong | PrimitiveKind::Double => {
                Layout::new(8, self.wide_scalar_alignment)
            }
            PrimitiveKind::Int128 | PrimitiveKind::UInt128 => {
                if self.wide_scalar_alignment < 8 {
                    Layout::new(16, self.wide_scalar_alignment)
                } else {
                    Layout::new(16, 16)
                }
            }
            PrimitiveKind::LongDouble => self.long_double,
            PrimitiveKind::Void => Layout::EMPTY,
            PrimitiveKind::CString | PrimitiveKind::Atom => self.pointer(),
        }
    }

    /// Size and alignment of any pointer-sized reference
    #[must_use]
    pub fn pointer(&self) -> Layout {
        Layout::new(self.pointer_width, self.pointer_width)
    }
}

impl Default for AbiModel {
    fn default() -> Self {
        Self::host()
    }
}
