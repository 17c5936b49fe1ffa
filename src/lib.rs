//! Target-intrinsic resolution and call emission for GPU code generation
//!
//! Given an abstract, hardware-agnostic target-function request (read a
//! thread index, shuffle a register down the warp, barrier), resolve it to
//! the operation the current GPU architecture actually has — a native
//! intrinsic on one family, a fixed-signature device-library routine on the
//! other — adapt operand and result types across the seam, and emit the
//! call through an IR builder.
//!
//! # Architecture
//!
//! ```text
//! CallRequest → Target Catalog (resolve) → Dispatch Engine (emit) → IR
//! ```
//!
//! The catalog ([`target`]) is constant data: one descriptor per
//! (function, architecture) pair. The engine ([`emit`]) selects the
//! descriptor for the module's target triple, coerces operands to a library
//! routine's fixed signature, synthesizes the suffixed linkage name,
//! declares the callee idempotently, and reconciles the result type.
//!
//! # Example
//!
//! ```
//! use gpu_intrin::{Axis, IrBuilder, Module, emit_thread_id};
//!
//! let mut module = Module::new("kernel", "nvptx64-nvidia-cuda");
//! let mut b = IrBuilder::new(&mut module);
//! let tid = emit_thread_id(Axis::X, &mut b);
//! assert_eq!(b.type_of(tid), gpu_intrin::IrType::I32);
//! ```
//!
//! Misuse — an unknown target triple, an operand-count mismatch, a type
//! pair no coercion covers — is a build-time bug, not a runtime condition,
//! and aborts compilation with a descriptive panic (see [`diagnostics`]).

pub mod diagnostics;
pub mod emit;
pub mod ir;
pub mod target;
pub mod types;

// Re-exports for convenience
pub use diagnostics::DispatchError;
pub use emit::{
    Axis, Coercion, emit_barrier, emit_block_id, emit_shfl_down, emit_target_call, emit_thread_id,
};
pub use ir::{FnAttribute, FunctionType, Instruction, IrBuilder, IrType, Module, ValueId};
pub use target::{GpuArch, Intrinsic, OperandSlot, TargetFunctionId, TargetOp, TargetOpPair, resolve};
pub use types::PrimitiveType;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
