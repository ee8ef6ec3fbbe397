//! Stages of the signing pipeline.

pub mod combine;
pub mod generate;
pub mod multi_hash;
pub mod single_hash;

pub use combine::CombineResults;
pub use generate::Generate;
pub use multi_hash::MultiHash;
pub use single_hash::SingleHash;
