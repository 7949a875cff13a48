//! Interactive emissions globe: capability gating, the render loop, and the
//! lifecycle that owns every acquired resource.

pub mod capability;
pub mod config;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod render_loop;

pub use capability::*;
pub use config::*;
pub use error::*;
pub use host::*;
pub use lifecycle::*;
pub use render_loop::*;
