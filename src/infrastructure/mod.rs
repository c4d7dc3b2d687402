pub mod pdf_reader;

pub use pdf_reader::{extract_pages, PdfReader};
