pub mod medicine;
pub mod pharmacy;

pub use medicine::*;
pub use pharmacy::*;
