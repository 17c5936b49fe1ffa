//! Primitive element types
//!
//! Semantic types of the values flowing through target-function calls,
//! independent of how a particular architecture represents them. The
//! dispatch engine classifies these to decide which coercions apply and
//! lowers them to IR types when building call signatures.

use std::fmt;

use crate::ir::IrType;

/// Semantic element type of an operand or result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Predicate (single bit)
    Pred,

    // Signed integers
    S8,
    S16,
    S32,
    S64,

    // Unsigned integers
    U8,
    U16,
    U32,
    U64,

    // Floating point
    F16,
    F32,
    F64,
}

impl PrimitiveType {
    /// Every primitive type, in declaration order
    pub const ALL: [PrimitiveType; 12] = [
        PrimitiveType::Pred,
        PrimitiveType::S8,
        PrimitiveType::S16,
        PrimitiveType::S32,
        PrimitiveType::S64,
        PrimitiveType::U8,
        PrimitiveType::U16,
        PrimitiveType::U32,
        PrimitiveType::U64,
        PrimitiveType::F16,
        PrimitiveType::F32,
        PrimitiveType::F64,
    ];

    /// Check if this is a floating point type
    pub fn is_floating_point(&self) -> bool {
        matches!(
            self,
            PrimitiveType::F16 | PrimitiveType::F32 | PrimitiveType::F64
        )
    }

    /// Check if this is a signed integer type
    pub fn is_signed_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveType::S8 | PrimitiveType::S16 | PrimitiveType::S32 | PrimitiveType::S64
        )
    }

    /// Check if this is an unsigned integer type
    pub fn is_unsigned_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveType::U8 | PrimitiveType::U16 | PrimitiveType::U32 | PrimitiveType::U64
        )
    }

    /// Check if this is an integer type
    pub fn is_integral(&self) -> bool {
        self.is_signed_integral() || self.is_unsigned_integral()
    }

    /// Lower to the IR representation
    pub fn to_ir_type(&self) -> IrType {
        match self {
            PrimitiveType::Pred => IrType::I1,
            PrimitiveType::S8 | PrimitiveType::U8 => IrType::I8,
            PrimitiveType::S16 | PrimitiveType::U16 => IrType::I16,
            PrimitiveType::S32 | PrimitiveType::U32 => IrType::I32,
            PrimitiveType::S64 | PrimitiveType::U64 => IrType::I64,
            PrimitiveType::F16 => IrType::F16,
            PrimitiveType::F32 => IrType::F32,
            PrimitiveType::F64 => IrType::F64,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Pred => write!(f, "pred"),
            PrimitiveType::S8 => write!(f, "s8"),
            PrimitiveType::S16 => write!(f, "s16"),
            PrimitiveType::S32 => write!(f, "s32"),
            PrimitiveType::S64 => write!(f, "s64"),
            PrimitiveType::U8 => write!(f, "u8"),
            PrimitiveType::U16 => write!(f, "u16"),
            PrimitiveType::U32 => write!(f, "u32"),
            PrimitiveType::U64 => write!(f, "u64"),
            PrimitiveType::F16 => write!(f, "f16"),
            PrimitiveType::F32 => write!(f, "f32"),
            PrimitiveType::F64 => write!(f, "f64"),
        }
    }
}
