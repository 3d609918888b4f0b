mod pdf_page_source;
mod text_sanitizer;

pub use pdf_page_source::PdfPageSource;
pub use text_sanitizer::sanitize_extracted_text;
