// Media boundary
//
// - File: input selection, media-type checks and payload encoding
// - Resources: transient preview handles owned by the pipeline

pub mod file;
pub mod resources;

pub use file::*;
pub use resources::*;
