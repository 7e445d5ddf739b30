pub mod components;
pub mod entity;
pub mod picking;
pub mod prefabs;
pub mod starfield;
pub mod world;

pub use world::*;
