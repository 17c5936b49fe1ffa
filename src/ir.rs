//! IR construction facility
//!
//! A minimal model of the pieces of an LLVM-like module the dispatch engine
//! touches: named function declarations, SSA values, call emission, and the
//! two value conversions the engine inserts. The builder borrows the module
//! mutably for the duration of one emission and is never retained.

use std::fmt;

use indexmap::IndexMap;

use crate::target::Intrinsic;

/// Low-level value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    I1,
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
}

impl IrType {
    /// Suffix used when overload types participate in an intrinsic name
    pub fn mangle(&self) -> &'static str {
        match self {
            IrType::Void => "void",
            IrType::I1 => "i1",
            IrType::I8 => "i8",
            IrType::I16 => "i16",
            IrType::I32 => "i32",
            IrType::I64 => "i64",
            IrType::F16 => "f16",
            IrType::F32 => "f32",
            IrType::F64 => "f64",
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::I1 => write!(f, "i1"),
            IrType::I8 => write!(f, "i8"),
            IrType::I16 => write!(f, "i16"),
            IrType::I32 => write!(f, "i32"),
            IrType::I64 => write!(f, "i64"),
            IrType::F16 => write!(f, "half"),
            IrType::F32 => write!(f, "float"),
            IrType::F64 => write!(f, "double"),
        }
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub params: Vec<IrType>,
    pub ret: IrType,
}

impl FunctionType {
    pub fn new(params: Vec<IrType>, ret: IrType) -> Self {
        Self { params, ret }
    }
}

/// Function attribute attachable to a declared callee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnAttribute {
    NoUnwind,
    ReadNone,
    ReadOnly,
    Convergent,
    Speculatable,
    WillReturn,
}

/// A function declaration in the module
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub ty: FunctionType,
    pub attributes: Vec<FnAttribute>,
}

impl FunctionDecl {
    /// Attach an attribute; repeated attachment is a no-op
    pub fn add_attribute(&mut self, attr: FnAttribute) {
        if !self.attributes.contains(&attr) {
            self.attributes.push(attr);
        }
    }
}

/// Module under construction
///
/// Holds the target triple the code is being generated for and the function
/// declarations emitted so far, in declaration order.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub target_triple: String,
    functions: IndexMap<String, FunctionDecl>,
}

impl Module {
    pub fn new(name: impl Into<String>, target_triple: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_triple: target_triple.into(),
            functions: IndexMap::new(),
        }
    }

    /// Declare a function, or return the existing declaration
    ///
    /// A second request under the same name reuses the first declaration;
    /// the signature of the later request is ignored.
    pub fn get_or_insert_function(&mut self, name: &str, ty: FunctionType) -> &mut FunctionDecl {
        self.functions
            .entry(name.to_string())
            .or_insert_with(|| FunctionDecl {
                name: name.to_string(),
                ty,
                attributes: Vec::new(),
            })
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.get(name)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Declared functions in declaration order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.values()
    }
}

/// Value identifier (SSA value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Instructions the builder can emit
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    ConstInt {
        value: i64,
        ty: IrType,
    },
    ConstFloat {
        value: f64,
        ty: IrType,
    },
    /// Call to a named callee declared in the module
    Call {
        callee: String,
        args: Vec<ValueId>,
        ty: IrType,
    },
    /// Call to a native target intrinsic
    IntrinsicCall {
        intrinsic: Intrinsic,
        overloads: Vec<IrType>,
        args: Vec<ValueId>,
        ty: IrType,
    },
    /// Floating point to signed integer truncation
    FpToSi {
        value: ValueId,
        to: IrType,
    },
    /// Signed integer to floating point conversion
    SiToFp {
        value: ValueId,
        to: IrType,
    },
}

impl Instruction {
    /// Result type of the instruction
    pub fn ty(&self) -> IrType {
        match self {
            Instruction::ConstInt { ty, .. } => *ty,
            Instruction::ConstFloat { ty, .. } => *ty,
            Instruction::Call { ty, .. } => *ty,
            Instruction::IntrinsicCall { ty, .. } => *ty,
            Instruction::FpToSi { to, .. } => *to,
            Instruction::SiToFp { to, .. } => *to,
        }
    }
}

/// Instruction builder for a single insertion point
///
/// Borrows the module for the duration of the emission; value ids index
/// into the builder's instruction list.
pub struct IrBuilder<'m> {
    module: &'m mut Module,
    instructions: Vec<Instruction>,
}

impl<'m> IrBuilder<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        Self {
            module,
            instructions: Vec::new(),
        }
    }

    pub fn module(&self) -> &Module {
        self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        self.module
    }

    fn push(&mut self, inst: Instruction) -> ValueId {
        let id = ValueId(self.instructions.len() as u32);
        self.instructions.push(inst);
        id
    }

    pub fn const_int(&mut self, value: i64, ty: IrType) -> ValueId {
        self.push(Instruction::ConstInt { value, ty })
    }

    pub fn const_float(&mut self, value: f64, ty: IrType) -> ValueId {
        self.push(Instruction::ConstFloat { value, ty })
    }

    pub fn build_call(&mut self, callee: &str, args: &[ValueId], ret: IrType) -> ValueId {
        self.push(Instruction::Call {
            callee: callee.to_string(),
            args: args.to_vec(),
            ty: ret,
        })
    }

    pub fn build_intrinsic_call(
        &mut self,
        intrinsic: Intrinsic,
        overloads: &[IrType],
        args: &[ValueId],
        ret: IrType,
    ) -> ValueId {
        self.push(Instruction::IntrinsicCall {
            intrinsic,
            overloads: overloads.to_vec(),
            args: args.to_vec(),
            ty: ret,
        })
    }

    pub fn build_fp_to_si(&mut self, value: ValueId, to: IrType) -> ValueId {
        self.push(Instruction::FpToSi { value, to })
    }

    pub fn build_si_to_fp(&mut self, value: ValueId, to: IrType) -> ValueId {
        self.push(Instruction::SiToFp { value, to })
    }

    /// Result type of an already-emitted value
    pub fn type_of(&self, value: ValueId) -> IrType {
        self.instructions[value.0 as usize].ty()
    }

    /// Instructions emitted so far, in order
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_or_insert_is_idempotent() {
        let mut module = Module::new("test", "nvptx64-nvidia-cuda");
        module.get_or_insert_function("f", FunctionType::new(vec![IrType::I32], IrType::I32));
        module.get_or_insert_function("f", FunctionType::new(vec![IrType::I32], IrType::I32));

        assert_eq!(module.function_count(), 1);
        let decl = module.get_function("f").unwrap();
        assert_eq!(decl.ty.params, vec![IrType::I32]);
    }

    #[test]
    fn test_attributes_deduplicated() {
        let mut module = Module::new("test", "nvptx64-nvidia-cuda");
        let decl = module.get_or_insert_function("f", FunctionType::new(vec![], IrType::Void));
        decl.add_attribute(FnAttribute::Convergent);
        decl.add_attribute(FnAttribute::Convergent);
        decl.add_attribute(FnAttribute::NoUnwind);

        assert_eq!(
            module.get_function("f").unwrap().attributes,
            vec![FnAttribute::Convergent, FnAttribute::NoUnwind]
        );
    }

    #[test]
    fn test_builder_tracks_value_types() {
        let mut module = Module::new("test", "nvptx64-nvidia-cuda");
        let mut b = IrBuilder::new(&mut module);

        let x = b.const_float(1.5, IrType::F32);
        let y = b.build_fp_to_si(x, IrType::I32);
        let z = b.build_si_to_fp(y, IrType::F64);

        assert_eq!(b.type_of(x), IrType::F32);
        assert_eq!(b.type_of(y), IrType::I32);
        assert_eq!(b.type_of(z), IrType::F64);
        assert_eq!(b.instructions().len(), 3);
    }

    #[test]
    fn test_ir_type_display() {
        assert_eq!(format!("{}", IrType::I32), "i32");
        assert_eq!(format!("{}", IrType::F32), "float");
        assert_eq!(format!("{}", IrType::F64), "double");
        assert_eq!(IrType::F32.mangle(), "f32");
    }
}
