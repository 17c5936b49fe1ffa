//! Dispatch and adaptation engine
//!
//! Turns an abstract target-function request into an emitted call for the
//! architecture the module is being compiled for. Native intrinsics are
//! called with the operands forwarded untouched; library routines get their
//! operands adapted to the routine's fixed signature (dropping ignored
//! slots, truncating floats to signed integers) and their result reconciled
//! with the caller's requested type.
//!
//! All misuse is fatal: either an emission fully succeeds and returns a
//! value, or compilation aborts with a message naming the offender.

use crate::diagnostics::{DispatchError, fatal};
use crate::ir::{FnAttribute, FunctionType, IrBuilder, IrType, ValueId};
use crate::target::{GpuArch, OperandSlot, TargetFunctionId, TargetOp, resolve};
use crate::types::PrimitiveType;

/// Value-level conversion between a caller's type and a descriptor's type
///
/// The closed set of reconciliations the engine performs. Adding a coercion
/// is one new variant plus one new arm per use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Types already agree; pass the value through
    Identity,
    /// Floating point to signed integer truncation
    FpToSi,
    /// Signed integer to floating point conversion
    SiToFp,
    /// No rule reconciles the pair
    Unsupported,
}

impl Coercion {
    pub fn classify(from: PrimitiveType, to: PrimitiveType) -> Coercion {
        if from == to {
            Coercion::Identity
        } else if from.is_floating_point() && to.is_signed_integral() {
            Coercion::FpToSi
        } else if from.is_signed_integral() && to.is_floating_point() {
            Coercion::SiToFp
        } else {
            Coercion::Unsupported
        }
    }
}

/// Linkage-name suffix for a library routine, chosen from the requested
/// result type. Any other result type aborts compilation.
fn linkage_suffix(output_type: PrimitiveType) -> &'static str {
    match output_type {
        PrimitiveType::S32 => "_i32",
        PrimitiveType::S64 => "_i64",
        PrimitiveType::F32 => "_f32",
        PrimitiveType::F64 => "_f64",
        other => fatal(DispatchError::BadResultType { ty: other }),
    }
}

/// Intrinsic linkage name with overload types appended
fn mangle_intrinsic(name: &str, overloads: &[IrType]) -> String {
    let mut mangled = name.to_string();
    for ty in overloads {
        mangled.push('.');
        mangled.push_str(ty.mangle());
    }
    mangled
}

/// Emit a call to the given target function for the module's architecture
///
/// `operands` and `input_types` describe the caller's view of the request;
/// `output_type` is the type the caller wants back. `attributes` are
/// attached to a library callee's declaration; `overloads` parameterize an
/// overloaded intrinsic's name. On the intrinsic path the input/output
/// types are not consulted: operands pass through unmodified and the
/// intrinsic's own result type stands.
pub fn emit_target_call(
    function_id: TargetFunctionId,
    operands: &[ValueId],
    input_types: &[PrimitiveType],
    output_type: PrimitiveType,
    attributes: &[FnAttribute],
    overloads: &[IrType],
    b: &mut IrBuilder<'_>,
) -> ValueId {
    let arch = GpuArch::from_triple(&b.module().target_triple);
    let op = *resolve(function_id).for_arch(arch);
    tracing::debug!(function = %function_id, %arch, "emitting target function call");

    match op {
        TargetOp::Intrinsic(intrinsic) => {
            let mangled = mangle_intrinsic(intrinsic.name(), overloads);
            let params: Vec<IrType> = operands.iter().map(|&v| b.type_of(v)).collect();
            let ret = intrinsic.result_type();
            b.module_mut()
                .get_or_insert_function(&mangled, FunctionType::new(params, ret));
            b.build_intrinsic_call(intrinsic, overloads, operands, ret)
        }
        TargetOp::LibraryCall {
            base_name,
            input_types: slots,
            output_type: native_output,
        } => {
            if operands.len() != slots.len() {
                fatal(DispatchError::OperandCountMismatch {
                    function: function_id.to_string(),
                    expected: slots.len(),
                    got: operands.len(),
                });
            }
            if input_types.len() != slots.len() {
                fatal(DispatchError::OperandCountMismatch {
                    function: function_id.to_string(),
                    expected: slots.len(),
                    got: input_types.len(),
                });
            }

            let mut converted = Vec::with_capacity(slots.len());
            let mut ir_params = Vec::with_capacity(slots.len());
            for (index, slot) in slots.iter().enumerate() {
                let to = match slot {
                    OperandSlot::Ignored => continue,
                    OperandSlot::Fixed(ty) => *ty,
                };
                let from = input_types[index];
                match Coercion::classify(from, to) {
                    Coercion::Identity => converted.push(operands[index]),
                    Coercion::FpToSi => {
                        converted.push(b.build_fp_to_si(operands[index], to.to_ir_type()));
                    }
                    Coercion::SiToFp | Coercion::Unsupported => {
                        fatal(DispatchError::UnhandledConversion { from, to })
                    }
                }
                ir_params.push(to.to_ir_type());
            }

            let callee_name = format!("{base_name}{}", linkage_suffix(output_type));
            let callee_ty = FunctionType::new(ir_params, native_output.to_ir_type());
            let callee = b.module_mut().get_or_insert_function(&callee_name, callee_ty);
            for &attr in attributes {
                callee.add_attribute(attr);
            }

            let result = b.build_call(&callee_name, &converted, native_output.to_ir_type());

            match Coercion::classify(native_output, output_type) {
                Coercion::Identity => result,
                Coercion::SiToFp => b.build_si_to_fp(result, output_type.to_ir_type()),
                Coercion::FpToSi | Coercion::Unsupported => {
                    fatal(DispatchError::UnhandledConversion {
                        from: native_output,
                        to: output_type,
                    })
                }
            }
        }
    }
}

/// Thread or block index axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Read the thread index along the given axis
pub fn emit_thread_id(axis: Axis, b: &mut IrBuilder<'_>) -> ValueId {
    let id = match axis {
        Axis::X => TargetFunctionId::ThreadIdX,
        Axis::Y => TargetFunctionId::ThreadIdY,
        Axis::Z => TargetFunctionId::ThreadIdZ,
    };
    emit_target_call(id, &[], &[], PrimitiveType::S32, &[], &[], b)
}

/// Read the block index along the given axis
pub fn emit_block_id(axis: Axis, b: &mut IrBuilder<'_>) -> ValueId {
    let id = match axis {
        Axis::X => TargetFunctionId::BlockIdX,
        Axis::Y => TargetFunctionId::BlockIdY,
        Axis::Z => TargetFunctionId::BlockIdZ,
    };
    emit_target_call(id, &[], &[], PrimitiveType::S32, &[], &[], b)
}

/// Emit a block-level execution barrier
pub fn emit_barrier(b: &mut IrBuilder<'_>) -> ValueId {
    // Result type is not consulted on the intrinsic path; the barrier
    // intrinsic itself is void.
    emit_target_call(
        TargetFunctionId::Barrier,
        &[],
        &[],
        PrimitiveType::S32,
        &[],
        &[],
        b,
    )
}

/// Shuffle a 32-bit value down the warp by `offset` lanes
///
/// Picks the f32 or i32 flavor from `element_type`; U32 rides the i32
/// flavor since a shuffle moves the bit pattern unchanged. The operand
/// list follows the abstract shuffle shape (mask, value, offset, width-1);
/// architectures without all four parameters drop the extras.
pub fn emit_shfl_down(
    element_type: PrimitiveType,
    value: ValueId,
    offset: ValueId,
    b: &mut IrBuilder<'_>,
) -> ValueId {
    let (function_id, logical) = match element_type {
        PrimitiveType::F32 => (TargetFunctionId::ShflDownF32, PrimitiveType::F32),
        PrimitiveType::S32 | PrimitiveType::U32 => {
            (TargetFunctionId::ShflDownI32, PrimitiveType::S32)
        }
        other => fatal(DispatchError::UnsupportedShuffleType { ty: other }),
    };

    // Full-warp mask and a width operand covering all 32 lanes.
    let mask = b.const_int(-1, IrType::I32);
    let width = b.const_int(31, IrType::I32);

    emit_target_call(
        function_id,
        &[mask, value, offset, width],
        &[
            PrimitiveType::S32,
            logical,
            PrimitiveType::S32,
            PrimitiveType::S32,
        ],
        logical,
        &[FnAttribute::Convergent],
        &[],
        b,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_closed_set() {
        use PrimitiveType::*;
        assert_eq!(Coercion::classify(S32, S32), Coercion::Identity);
        assert_eq!(Coercion::classify(F32, S32), Coercion::FpToSi);
        assert_eq!(Coercion::classify(S32, F32), Coercion::SiToFp);
        assert_eq!(Coercion::classify(U32, S32), Coercion::Unsupported);
        assert_eq!(Coercion::classify(F32, U32), Coercion::Unsupported);
        assert_eq!(Coercion::classify(S64, S32), Coercion::Unsupported);
    }

    fn any_primitive() -> impl Strategy<Value = PrimitiveType> {
        proptest::sample::select(PrimitiveType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn classify_identity_iff_equal(a in any_primitive(), c in any_primitive()) {
            let coercion = Coercion::classify(a, c);
            prop_assert_eq!(coercion == Coercion::Identity, a == c);
        }

        #[test]
        fn classify_float_int_pairs_are_inverse(a in any_primitive(), c in any_primitive()) {
            let forward = Coercion::classify(a, c);
            let backward = Coercion::classify(c, a);
            match forward {
                Coercion::FpToSi => prop_assert_eq!(backward, Coercion::SiToFp),
                Coercion::SiToFp => prop_assert_eq!(backward, Coercion::FpToSi),
                Coercion::Identity => prop_assert_eq!(backward, Coercion::Identity),
                Coercion::Unsupported => prop_assert_eq!(backward, Coercion::Unsupported),
            }
        }

        #[test]
        fn classify_never_touches_unsigned(a in any_primitive(), c in any_primitive()) {
            if a.is_unsigned_integral() || c.is_unsigned_integral() {
                let coercion = Coercion::classify(a, c);
                prop_assert!(
                    coercion == Coercion::Identity || coercion == Coercion::Unsupported
                );
            }
        }
    }

    #[test]
    fn test_linkage_suffixes() {
        assert_eq!(linkage_suffix(PrimitiveType::S32), "_i32");
        assert_eq!(linkage_suffix(PrimitiveType::S64), "_i64");
        assert_eq!(linkage_suffix(PrimitiveType::F32), "_f32");
        assert_eq!(linkage_suffix(PrimitiveType::F64), "_f64");
    }

    #[test]
    #[should_panic(expected = "bad result type u32")]
    fn test_linkage_suffix_rejects_unsigned() {
        linkage_suffix(PrimitiveType::U32);
    }

    #[test]
    fn test_intrinsic_mangling() {
        assert_eq!(
            mangle_intrinsic("llvm.nvvm.read.ptx.sreg.tid.x", &[]),
            "llvm.nvvm.read.ptx.sreg.tid.x"
        );
        assert_eq!(
            mangle_intrinsic("llvm.some.overloaded", &[IrType::I32, IrType::F32]),
            "llvm.some.overloaded.i32.f32"
        );
    }
}
