//! Scene graph
//!
//! Nodes live in a generational pool owned by a [`Scene`]. Handles replace
//! pointers, so parent links, child lists and the scene's own lists are all
//! plain [`NodeHandle`] values.

mod config;
mod error;
mod graph;
mod handle;
mod hierarchy;
mod model;
mod node;
mod pool;
mod transform;

pub use config::SceneConfig;
pub use error::SceneError;
pub use graph::{Scene, TransformStats};
pub use handle::{NodeHandle, NodeId};
pub use model::Model;
pub use node::{CameraLens, EmitterState, LightSource, Node, NodeKind, Owner, Trs};
pub use pool::Pool;
