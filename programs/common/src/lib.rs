pub mod types;
pub mod math;
pub mod error;
pub mod allocation;
pub mod custody;
pub mod registry;
pub mod valuation;

pub use types::*;
pub use math::*;
pub use error::*;
pub use allocation::*;
pub use custody::*;
pub use registry::*;
pub use valuation::*;
