pub mod camera;
pub mod frame_extract;

pub use camera::*;
pub use frame_extract::*;
