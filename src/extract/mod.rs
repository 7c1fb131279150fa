pub mod fetcher;
pub mod params;
pub mod writer;

pub use fetcher::{CellValue, DataFetcher, ExtractResult};
pub use params::{ConfigParameters, ExtractJob};
pub use writer::{ExtractWriter, GeneratedFile};
