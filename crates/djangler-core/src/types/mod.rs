pub mod hit;
pub mod metadata;
pub mod result;

pub use hit::{QueryHit, ScoredSection, SectionHit, SongMetadata, UNKNOWN_SECTION, keys};
pub use metadata::{Metadata, MetadataExt, MetadataValue};
pub use result::RankedResult;
