//! Exporters for the projected sheet.

pub mod csv;

pub use self::csv::{default_file_name, export_to_dir, export_to_file, render_csv, write_csv};
