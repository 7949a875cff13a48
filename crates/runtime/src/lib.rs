pub mod event_bus;
pub mod frame;
pub mod journal;
pub mod metrics;
pub mod task;

pub use event_bus::*;
pub use frame::*;
pub use journal::*;
pub use metrics::*;
pub use task::*;
