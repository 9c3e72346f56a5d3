//! Command implementations

pub mod apply;
pub mod common;
pub mod drop;
pub mod force;
pub mod run;
pub mod version;
