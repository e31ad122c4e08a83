//! CLI command implementations

pub mod init;
pub mod plan;
pub mod rating;
pub mod register;
pub mod validate;
