//! WebGPU rendering module
//!
//! The runner frame is a flat list of colored triangles built on the CPU.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, field_to_ndc};
pub use shapes::runner_scene;
pub use vertex::Vertex;
