//! Domain models for the Cafe Inventory Management Platform

mod item;
mod order;
mod stock;
mod supplier;

pub use item::*;
pub use order::*;
pub use stock::*;
pub use supplier::*;
