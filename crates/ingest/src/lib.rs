pub mod csv;
pub mod institution;
pub mod pdf;
pub mod router;

pub use self::csv::CsvError;
pub use self::pdf::PdfError;
pub use router::{parse_bytes, parse_file, IngestError, MAX_FILE_BYTES};
