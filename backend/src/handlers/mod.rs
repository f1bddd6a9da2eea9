//! HTTP handlers for the Cafe Inventory Management Platform

mod catalog;
mod dashboard;
mod health;
mod order;
mod stocktake;

pub use catalog::*;
pub use dashboard::*;
pub use health::*;
pub use order::*;
pub use stocktake::*;
