//! Target catalog
//!
//! Static mapping from abstract target functions to the native intrinsic or
//! device-library routine implementing them on each supported GPU
//! architecture. The catalog is constant data: [`resolve`] is a pure,
//! exhaustive match over [`TargetFunctionId`], so adding an operation or an
//! architecture is a data addition, not a control-flow rewrite.

use std::fmt;

use crate::diagnostics::{DispatchError, fatal};
use crate::types::PrimitiveType;

/// GPU architecture family being compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuArch {
    /// NVIDIA (nvptx / nvptx64 triples)
    Nvptx,
    /// AMD (amdgcn triples)
    Amdgpu,
}

impl GpuArch {
    /// Both supported families
    pub const ALL: [GpuArch; 2] = [GpuArch::Nvptx, GpuArch::Amdgpu];

    /// Determine the architecture family from a target triple
    ///
    /// Only the architecture component (before the first `-`) is inspected.
    /// Any architecture other than nvptx/nvptx64/amdgcn aborts compilation.
    pub fn from_triple(triple: &str) -> GpuArch {
        let arch = triple.split('-').next().unwrap_or(triple);
        match arch {
            "nvptx" | "nvptx64" => GpuArch::Nvptx,
            "amdgcn" => GpuArch::Amdgpu,
            _ => fatal(DispatchError::UnsupportedTriple {
                triple: triple.to_string(),
            }),
        }
    }
}

impl fmt::Display for GpuArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuArch::Nvptx => write!(f, "nvptx"),
            GpuArch::Amdgpu => write!(f, "amdgpu"),
        }
    }
}

/// Abstract, architecture-independent target function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFunctionId {
    ThreadIdX,
    ThreadIdY,
    ThreadIdZ,
    BlockIdX,
    BlockIdY,
    BlockIdZ,
    /// Warp shuffle-down of a 32-bit float
    ShflDownF32,
    /// Warp shuffle-down of a 32-bit integer
    ShflDownI32,
    /// Block-level execution barrier
    Barrier,
}

impl TargetFunctionId {
    /// Every abstract target function, for exhaustive iteration
    pub const ALL: [TargetFunctionId; 9] = [
        TargetFunctionId::ThreadIdX,
        TargetFunctionId::ThreadIdY,
        TargetFunctionId::ThreadIdZ,
        TargetFunctionId::BlockIdX,
        TargetFunctionId::BlockIdY,
        TargetFunctionId::BlockIdZ,
        TargetFunctionId::ShflDownF32,
        TargetFunctionId::ShflDownI32,
        TargetFunctionId::Barrier,
    ];
}

impl fmt::Display for TargetFunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFunctionId::ThreadIdX => write!(f, "thread.id.x"),
            TargetFunctionId::ThreadIdY => write!(f, "thread.id.y"),
            TargetFunctionId::ThreadIdZ => write!(f, "thread.id.z"),
            TargetFunctionId::BlockIdX => write!(f, "block.id.x"),
            TargetFunctionId::BlockIdY => write!(f, "block.id.y"),
            TargetFunctionId::BlockIdZ => write!(f, "block.id.z"),
            TargetFunctionId::ShflDownF32 => write!(f, "shfl.down.f32"),
            TargetFunctionId::ShflDownI32 => write!(f, "shfl.down.i32"),
            TargetFunctionId::Barrier => write!(f, "barrier"),
        }
    }
}

/// Native intrinsic recognized directly by the code generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    // NVPTX special-register reads
    NvvmReadPtxSregTidX,
    NvvmReadPtxSregTidY,
    NvvmReadPtxSregTidZ,
    NvvmReadPtxSregCtaidX,
    NvvmReadPtxSregCtaidY,
    NvvmReadPtxSregCtaidZ,
    // NVPTX warp shuffles
    NvvmShflSyncDownF32,
    NvvmShflSyncDownI32,
    // NVPTX barrier
    NvvmBarrier0,

    // AMDGPU work-item / work-group id reads
    AmdgcnWorkitemIdX,
    AmdgcnWorkitemIdY,
    AmdgcnWorkitemIdZ,
    AmdgcnWorkgroupIdX,
    AmdgcnWorkgroupIdY,
    AmdgcnWorkgroupIdZ,
    // AMDGPU barrier
    AmdgcnSBarrier,
}

impl Intrinsic {
    /// Full linkage symbol of the intrinsic
    pub fn name(&self) -> &'static str {
        match self {
            Intrinsic::NvvmReadPtxSregTidX => "llvm.nvvm.read.ptx.sreg.tid.x",
            Intrinsic::NvvmReadPtxSregTidY => "llvm.nvvm.read.ptx.sreg.tid.y",
            Intrinsic::NvvmReadPtxSregTidZ => "llvm.nvvm.read.ptx.sreg.tid.z",
            Intrinsic::NvvmReadPtxSregCtaidX => "llvm.nvvm.read.ptx.sreg.ctaid.x",
            Intrinsic::NvvmReadPtxSregCtaidY => "llvm.nvvm.read.ptx.sreg.ctaid.y",
            Intrinsic::NvvmReadPtxSregCtaidZ => "llvm.nvvm.read.ptx.sreg.ctaid.z",
            Intrinsic::NvvmShflSyncDownF32 => "llvm.nvvm.shfl.sync.down.f32",
            Intrinsic::NvvmShflSyncDownI32 => "llvm.nvvm.shfl.sync.down.i32",
            Intrinsic::NvvmBarrier0 => "llvm.nvvm.barrier0",
            Intrinsic::AmdgcnWorkitemIdX => "llvm.amdgcn.workitem.id.x",
            Intrinsic::AmdgcnWorkitemIdY => "llvm.amdgcn.workitem.id.y",
            Intrinsic::AmdgcnWorkitemIdZ => "llvm.amdgcn.workitem.id.z",
            Intrinsic::AmdgcnWorkgroupIdX => "llvm.amdgcn.workgroup.id.x",
            Intrinsic::AmdgcnWorkgroupIdY => "llvm.amdgcn.workgroup.id.y",
            Intrinsic::AmdgcnWorkgroupIdZ => "llvm.amdgcn.workgroup.id.z",
            Intrinsic::AmdgcnSBarrier => "llvm.amdgcn.s.barrier",
        }
    }

    /// Result type of the intrinsic, as fixed by its declaration
    pub fn result_type(&self) -> crate::ir::IrType {
        use crate::ir::IrType;
        match self {
            Intrinsic::NvvmShflSyncDownF32 => IrType::F32,
            Intrinsic::NvvmBarrier0 | Intrinsic::AmdgcnSBarrier => IrType::Void,
            _ => IrType::I32,
        }
    }
}

/// One slot of a library routine's fixed input signature
///
/// `Ignored` marks a position the routine does not take: the operand at
/// that position is dropped from the emitted call entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSlot {
    Ignored,
    Fixed(PrimitiveType),
}

/// How one architecture implements one target function
///
/// Exactly one implementation strategy exists per reachable
/// (function, architecture) pair; the enum makes that structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOp {
    /// Single native instruction; operands pass through untouched
    Intrinsic(Intrinsic),
    /// Device-library routine with a fixed signature
    LibraryCall {
        base_name: &'static str,
        input_types: &'static [OperandSlot],
        output_type: PrimitiveType,
    },
}

/// The per-architecture descriptors for one target function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetOpPair {
    pub nvptx: TargetOp,
    pub amdgpu: TargetOp,
}

impl TargetOpPair {
    fn intrinsics(nvptx: Intrinsic, amdgpu: Intrinsic) -> Self {
        Self {
            nvptx: TargetOp::Intrinsic(nvptx),
            amdgpu: TargetOp::Intrinsic(amdgpu),
        }
    }

    pub fn for_arch(&self, arch: GpuArch) -> &TargetOp {
        match arch {
            GpuArch::Nvptx => &self.nvptx,
            GpuArch::Amdgpu => &self.amdgpu,
        }
    }
}

/// Fixed signature of `__ockl_readuplane_*`: the routine takes only the
/// 32-bit value and the lane delta; the leading mask and trailing width
/// operands of the abstract shuffle request are dropped.
const READUPLANE_INPUTS: &[OperandSlot] = &[
    OperandSlot::Ignored,
    OperandSlot::Fixed(PrimitiveType::S32),
    OperandSlot::Fixed(PrimitiveType::S32),
    OperandSlot::Ignored,
];

/// Resolve a target function to its per-architecture descriptors
///
/// AMDGPU has no native shuffle-down instruction, so both shuffle flavors
/// route through `__ockl_readuplane`, which operates on 32-bit integers
/// regardless of the logical element type.
pub fn resolve(function_id: TargetFunctionId) -> TargetOpPair {
    match function_id {
        TargetFunctionId::ThreadIdX => {
            TargetOpPair::intrinsics(Intrinsic::NvvmReadPtxSregTidX, Intrinsic::AmdgcnWorkitemIdX)
        }
        TargetFunctionId::ThreadIdY => {
            TargetOpPair::intrinsics(Intrinsic::NvvmReadPtxSregTidY, Intrinsic::AmdgcnWorkitemIdY)
        }
        TargetFunctionId::ThreadIdZ => {
            TargetOpPair::intrinsics(Intrinsic::NvvmReadPtxSregTidZ, Intrinsic::AmdgcnWorkitemIdZ)
        }
        TargetFunctionId::BlockIdX => TargetOpPair::intrinsics(
            Intrinsic::NvvmReadPtxSregCtaidX,
            Intrinsic::AmdgcnWorkgroupIdX,
        ),
        TargetFunctionId::BlockIdY => TargetOpPair::intrinsics(
            Intrinsic::NvvmReadPtxSregCtaidY,
            Intrinsic::AmdgcnWorkgroupIdY,
        ),
        TargetFunctionId::BlockIdZ => TargetOpPair::intrinsics(
            Intrinsic::NvvmReadPtxSregCtaidZ,
            Intrinsic::AmdgcnWorkgroupIdZ,
        ),
        TargetFunctionId::ShflDownF32 => TargetOpPair {
            nvptx: TargetOp::Intrinsic(Intrinsic::NvvmShflSyncDownF32),
            amdgpu: TargetOp::LibraryCall {
                base_name: "__ockl_readuplane",
                input_types: READUPLANE_INPUTS,
                output_type: PrimitiveType::S32,
            },
        },
        TargetFunctionId::ShflDownI32 => TargetOpPair {
            nvptx: TargetOp::Intrinsic(Intrinsic::NvvmShflSyncDownI32),
            amdgpu: TargetOp::LibraryCall {
                base_name: "__ockl_readuplane",
                input_types: READUPLANE_INPUTS,
                output_type: PrimitiveType::S32,
            },
        },
        TargetFunctionId::Barrier => {
            TargetOpPair::intrinsics(Intrinsic::NvvmBarrier0, Intrinsic::AmdgcnSBarrier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arch_from_triple() {
        assert_eq!(GpuArch::from_triple("nvptx64-nvidia-cuda"), GpuArch::Nvptx);
        assert_eq!(GpuArch::from_triple("nvptx-nvidia-cuda"), GpuArch::Nvptx);
        assert_eq!(GpuArch::from_triple("amdgcn-amd-amdhsa"), GpuArch::Amdgpu);
    }

    #[test]
    #[should_panic(expected = "invalid target triple `x86_64-unknown-linux-gnu`")]
    fn test_arch_from_host_triple_is_fatal() {
        GpuArch::from_triple("x86_64-unknown-linux-gnu");
    }

    #[test]
    fn test_catalog_is_total_and_well_formed() {
        for id in TargetFunctionId::ALL {
            let pair = resolve(id);
            for arch in GpuArch::ALL {
                match pair.for_arch(arch) {
                    TargetOp::Intrinsic(intrinsic) => {
                        assert!(intrinsic.name().starts_with("llvm."), "{id} on {arch}");
                    }
                    TargetOp::LibraryCall {
                        base_name,
                        input_types,
                        ..
                    } => {
                        assert!(!base_name.is_empty(), "{id} on {arch}");
                        assert!(
                            input_types
                                .iter()
                                .any(|slot| matches!(slot, OperandSlot::Fixed(_))),
                            "{id} on {arch}: all slots ignored"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_index_reads_are_native_on_both_arches() {
        let pair = resolve(TargetFunctionId::ThreadIdX);
        assert_eq!(
            pair.nvptx,
            TargetOp::Intrinsic(Intrinsic::NvvmReadPtxSregTidX)
        );
        assert_eq!(pair.amdgpu, TargetOp::Intrinsic(Intrinsic::AmdgcnWorkitemIdX));

        let pair = resolve(TargetFunctionId::BlockIdZ);
        assert_eq!(
            pair.nvptx,
            TargetOp::Intrinsic(Intrinsic::NvvmReadPtxSregCtaidZ)
        );
        assert_eq!(
            pair.amdgpu,
            TargetOp::Intrinsic(Intrinsic::AmdgcnWorkgroupIdZ)
        );
    }

    #[test]
    fn test_each_axis_has_its_own_register() {
        let x = resolve(TargetFunctionId::ThreadIdX);
        let y = resolve(TargetFunctionId::ThreadIdY);
        let z = resolve(TargetFunctionId::ThreadIdZ);
        assert_ne!(x.nvptx, z.nvptx);
        assert_ne!(y.amdgpu, z.amdgpu);
    }

    #[test]
    fn test_shuffle_down_routes_through_readuplane_on_amdgpu() {
        for id in [TargetFunctionId::ShflDownF32, TargetFunctionId::ShflDownI32] {
            let pair = resolve(id);
            assert!(matches!(pair.nvptx, TargetOp::Intrinsic(_)));
            match pair.amdgpu {
                TargetOp::LibraryCall {
                    base_name,
                    input_types,
                    output_type,
                } => {
                    assert_eq!(base_name, "__ockl_readuplane");
                    assert_eq!(input_types.len(), 4);
                    assert_eq!(input_types[0], OperandSlot::Ignored);
                    assert_eq!(input_types[1], OperandSlot::Fixed(PrimitiveType::S32));
                    assert_eq!(input_types[2], OperandSlot::Fixed(PrimitiveType::S32));
                    assert_eq!(input_types[3], OperandSlot::Ignored);
                    assert_eq!(output_type, PrimitiveType::S32);
                }
                TargetOp::Intrinsic(_) => panic!("{id}: expected a library call on amdgpu"),
            }
        }
    }

    #[test]
    fn test_intrinsic_result_types() {
        use crate::ir::IrType;
        assert_eq!(Intrinsic::NvvmReadPtxSregTidX.result_type(), IrType::I32);
        assert_eq!(Intrinsic::NvvmShflSyncDownF32.result_type(), IrType::F32);
        assert_eq!(Intrinsic::NvvmShflSyncDownI32.result_type(), IrType::I32);
        assert_eq!(Intrinsic::NvvmBarrier0.result_type(), IrType::Void);
        assert_eq!(Intrinsic::AmdgcnSBarrier.result_type(), IrType::Void);
    }
}
