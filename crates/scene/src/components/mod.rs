pub mod drawable3d;
pub mod marker;
pub mod material;
pub mod pulse;
pub mod transform;
pub mod visibility;

pub use drawable3d::*;
pub use marker::*;
pub use material::*;
pub use pulse::*;
pub use transform::*;
pub use visibility::*;
