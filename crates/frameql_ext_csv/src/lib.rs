pub mod extension;
pub mod reader;
pub mod schema;

pub use extension::CsvExtension;
