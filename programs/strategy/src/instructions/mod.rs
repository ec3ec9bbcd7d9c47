//! Strategy instruction handlers
//!
//! Handlers mutate the strategy they are given and return an error without
//! touching anything else; callers run them on a draft copy when a failure
//! must leave no trace.

pub mod configure;
pub mod deposit;
pub mod withdraw;
pub mod toggle;

pub use configure::*;
pub use deposit::*;
pub use withdraw::*;
pub use toggle::*;
