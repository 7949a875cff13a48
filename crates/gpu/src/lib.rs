pub mod backend;
pub mod error;
pub mod recording;
pub mod renderer;
pub mod scene_graph;

pub use backend::*;
pub use error::*;
pub use recording::*;
pub use renderer::*;
pub use scene_graph::*;
