//! Configuration loading and management for the child support engine.
//!
//! Rates are year-indexed: each file under `rates/` carries the self-support
//! amount, the fixed and minimum annual rates, the parenting payment
//! threshold and the cost-of-children bracket tables for one year.
//!
//! # Example
//!
//! ```no_run
//! use child_support_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/child_support").unwrap();
//! println!("Loaded scheme: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CohortTables, CostBracket, CostOfChildrenTables, CostTableKind, MixedAgeTables, RateConfig,
    SchemeConfig, SchemeMetadata,
};
