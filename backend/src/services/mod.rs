//! Business logic services for the Cafe Inventory Management Platform

pub mod catalog;
pub mod dashboard;
pub mod order;
pub mod stocktake;

pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use order::OrderService;
pub use stocktake::StocktakeService;
