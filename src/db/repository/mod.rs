//! Repository layer: entity-scoped database operations.
//!
//! Functions take a `&Connection` so callers can pass either a plain
//! connection or a `Transaction` (which derefs to one).

mod patient;
mod prescription;
mod staff;
mod visit;

pub use patient::*;
pub use prescription::*;
pub use staff::*;
pub use visit::*;
