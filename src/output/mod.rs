//! Output: the CSV log and console formatting

pub mod console;
pub mod csv;

pub use console::ConsoleFormatter;
pub use csv::CsvLog;
