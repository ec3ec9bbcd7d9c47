pub mod portfolio;
pub mod sync_tracker;

pub use portfolio::*;
pub use sync_tracker::*;
