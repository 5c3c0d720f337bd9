pub mod error;
pub mod records;
pub mod select;

pub use error::IngestError;
pub use records::{load_records, read_records, CsvLoad};
pub use select::{select_species, species_counts, IngestReport};
