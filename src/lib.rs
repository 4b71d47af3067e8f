//! Child support assessment engine for the Australian statutory formulas
//!
//! This crate computes annual child support liabilities between two parents
//! and any non-parent carers under formulas 1 to 6, from incomes, care
//! arrangements and year-indexed rate tables. Every result carries an audit
//! trace of the decisions taken.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
