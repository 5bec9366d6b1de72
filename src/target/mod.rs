mod args;
mod trackable;

pub use args::{arg, optional_arg};
pub use trackable::{OperationDecl, TargetKind, Trackable};
