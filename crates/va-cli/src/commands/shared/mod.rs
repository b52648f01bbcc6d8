pub mod report;
pub mod views;
