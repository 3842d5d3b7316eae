pub mod preprocess;
pub mod table;

pub use preprocess::{PreparedQuery, QueryPreprocessor};
pub use table::GenreTable;
