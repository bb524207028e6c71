//! sitedb-core
//!
//! Domain types, error taxonomy, capability traits and configuration shared by
//! the retrieval, embedding and generation crates.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod loader;
pub mod traits;
pub mod types;
