pub mod normalize;
pub mod types;

pub use types::{CertEvent, CertstreamMessage, DomainBatch, EnrichedRecord, FilteredBatch};
