pub mod extract;
pub mod inference;
pub mod ocr;
pub mod preprocess;
pub mod processor;
pub mod similarity;

pub use processor::{PipelineError, PrescriptionProcessor, PrescriptionResult};
