pub mod confidence;
pub mod course;
pub mod document;
pub mod geometry;
pub mod model;
