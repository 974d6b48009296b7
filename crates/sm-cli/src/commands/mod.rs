//! CLI command implementations

pub(crate) mod common;
pub(crate) mod ls;
pub(crate) mod prepare;
pub(crate) mod run;
