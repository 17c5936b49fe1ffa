//! Fatal-error vocabulary
//!
//! Every error this library can raise is a programmer or configuration
//! error: the caller requested an operation/type combination the catalog
//! was never designed to support, or the module targets an architecture
//! the catalog does not know. These are build-time bugs, not runtime
//! conditions, so there is no `Result` surface; [`fatal`] logs the error
//! and panics with its rendered message.

use thiserror::Error;

use crate::types::PrimitiveType;

/// Unrecoverable misuse of the dispatch engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid target triple `{triple}`: expected an nvptx or amdgcn architecture")]
    UnsupportedTriple { triple: String },

    #[error(
        "operand count mismatch for {function}: descriptor expects {expected}, caller supplied {got}"
    )]
    OperandCountMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("unhandled conversion from {from} to {to}")]
    UnhandledConversion {
        from: PrimitiveType,
        to: PrimitiveType,
    },

    #[error("bad result type {ty}: no linkage-name suffix for this type")]
    BadResultType { ty: PrimitiveType },

    #[error("unsupported warp shuffle element type {ty}")]
    UnsupportedShuffleType { ty: PrimitiveType },
}

/// Abort compilation with a descriptive message
pub fn fatal(err: DispatchError) -> ! {
    tracing::error!(error = %err, "fatal dispatch error");
    panic!("{err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = DispatchError::UnsupportedTriple {
            triple: "x86_64-unknown-linux-gnu".to_string(),
        };
        assert!(format!("{err}").contains("x86_64-unknown-linux-gnu"));

        let err = DispatchError::UnhandledConversion {
            from: PrimitiveType::S64,
            to: PrimitiveType::S32,
        };
        assert_eq!(format!("{err}"), "unhandled conversion from s64 to s32");

        let err = DispatchError::BadResultType {
            ty: PrimitiveType::U32,
        };
        assert!(format!("{err}").contains("u32"));
    }
}
