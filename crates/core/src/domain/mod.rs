pub mod dataset;
pub mod stock;
