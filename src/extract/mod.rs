pub mod counter;
pub mod listings;

pub use counter::CounterExtractor;
pub use listings::{extract_listings, Listing};
