//! Fleet maintenance data model
//!
//! - `UnitRecord`: a tipper's hour-meter and service state
//! - `ServiceEvent`: a logged maintenance action against one unit

mod service;
mod unit;

pub use service::*;
pub use unit::*;
