pub mod dataset;
pub mod daterange;
pub mod format;
pub mod platform;
