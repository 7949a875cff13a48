//! Emission records and the pure data path feeding the globe:
//! records → per-country rollups → render points.

pub mod aggregate;
pub mod encode;
pub mod error;
pub mod filter;
pub mod format;
pub mod lookup;
pub mod record;

pub use aggregate::*;
pub use encode::*;
pub use error::*;
pub use filter::*;
pub use lookup::*;
pub use record::*;
