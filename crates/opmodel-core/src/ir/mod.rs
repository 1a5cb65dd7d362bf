pub mod grouping;
pub mod operations;
pub mod type_ref;
pub mod types;

pub use operations::*;
pub use type_ref::IrType;
pub use types::{IrInfo, IrModule, IrServer, IrSpec, NormalizedName};
