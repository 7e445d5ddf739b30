pub mod mat4;
pub mod precision;
pub mod quat;
pub mod sphere;
pub mod vec;

pub use mat4::*;
pub use precision::*;
pub use quat::*;
pub use sphere::*;
pub use vec::*;
