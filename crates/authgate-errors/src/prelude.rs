pub use crate::{
    class::{ErrorKind, RetryClass, Severity},
    code::{codes, spec_of, CodeSpec, ErrorCode, REGISTRY},
    labels::labels,
    model::{ErrorBuilder, ErrorObj},
    render::{AuditErrorView, PublicErrorView},
};
