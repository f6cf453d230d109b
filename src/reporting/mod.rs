pub mod exporter;
pub mod naming;

pub use exporter::{write_csv, write_zip, ArchiveStats, ClientExport, Exporter};
pub use naming::{export_file_stem, sanitize_filename};
