//! CLI subcommands. Each returns the text destined for stdout; warnings go
//! to stderr as they are found.

pub(crate) mod check_binding;
pub(crate) mod plan;
pub(crate) mod resolve;
pub(crate) mod validate;
