pub mod export_parser;

pub use export_parser::{LoadError, parse_export, parse_export_str, parse_timestamp};
