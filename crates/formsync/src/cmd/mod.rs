//! Command implementations for the formsync CLI

pub mod dry_run;
pub mod run;
