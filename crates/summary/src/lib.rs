pub mod aggregate;
pub mod handler;
pub mod models;
pub mod month_range;
pub mod service;
