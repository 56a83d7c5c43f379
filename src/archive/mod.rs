pub mod extractor;
pub mod fetcher;

pub use extractor::{ArchiveExtractor, ExtractionSummary};
pub use fetcher::{ArchiveFetcher, ArchiveLink, FetchSummary};
