//! Shared types and domain logic for the Cafe Inventory Management Platform
//!
//! This crate contains the entity models, the stock forecasting and
//! reconciliation math, and boundary validation shared by the backend
//! and any other components of the system.

pub mod forecast;
pub mod models;
pub mod types;
pub mod validation;

pub use forecast::*;
pub use models::*;
pub use types::*;
pub use validation::*;
