//! Rendering module
//!
//! `scene` mirrors the simulation as a retained set of circle nodes;
//! `sdf_pipeline` draws that scene with a single SDF fragment shader.

pub mod scene;
pub mod sdf_pipeline;

pub use scene::{JoinResult, Scene, Scoreboard, ShapeAttrs, ShapeNode, feedback_opacity};
pub use sdf_pipeline::{MAX_CIRCLES, SdfRenderState};
