//! Command implementations.

pub mod compare;
pub mod config;
pub mod dupes;
pub mod hash;
