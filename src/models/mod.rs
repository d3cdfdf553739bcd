pub mod enums;
pub mod patient;
pub mod prescription;
pub mod staff;
pub mod visit;

pub use enums::Role;
pub use patient::*;
pub use prescription::*;
pub use staff::*;
pub use visit::*;
