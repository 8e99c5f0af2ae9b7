//! Command implementations for the satchel CLI.
//!
//! - [`build`] - produce and write every artifact
//! - [`check`] - validate settings and inputs without building

pub mod build;
pub mod check;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
