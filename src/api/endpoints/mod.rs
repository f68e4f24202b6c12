pub mod prescription;
pub mod query;
pub mod safety;
pub mod translate;
