//! Export module for handing search results to external tools.
//!
//! Supports:
//! - **CSV**: spreadsheets and dataframe tools
//! - **JSON**: web tools and downstream services

pub mod csv;
pub mod json;

pub use csv::{
    escape_csv, export_intervals_csv, export_records_csv, write_intervals_csv, write_records_csv,
};
pub use json::{intervals_to_json, to_json};
