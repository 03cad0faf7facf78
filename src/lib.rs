pub mod assessment;
pub mod config;
pub mod core;
pub mod course;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod structure;

pub use config::ExtractionTuning;
pub use core::course::{AssessmentTask, CourseTerm, ExtractedCourseData, SectionOption};
pub use core::document::DocumentStructure;
pub use error::{ExtractionError, Result};
