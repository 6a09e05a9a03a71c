//! Value model shared by data sources and expressions.
//!
//! - **Value**: a single element, with Python-style rendering and casts
//! - **DataType**: the types values can be cast to
//! - **Data**: array-like containers (plain arrays, index-carrying series
//!   and partitioned data) plus the element-wise and broadcasting helpers
//!   every expression function is built on

pub mod data;
pub mod value;

pub use data::{Data, Series};
pub use value::{DataType, Value};
