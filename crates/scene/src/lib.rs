pub mod camera;
pub mod interaction;
pub mod picking;
pub mod projection;
pub mod selection;

pub use camera::*;
pub use interaction::*;
pub use picking::*;
pub use projection::*;
pub use selection::*;
