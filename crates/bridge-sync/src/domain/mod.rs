//! Domain layer: pure decisions with no I/O.

pub mod errors;
pub mod placement;
pub mod transition;
pub mod value_objects;

pub use errors::*;
pub use placement::Placement;
pub use transition::{Step, Transition};
pub use value_objects::*;
