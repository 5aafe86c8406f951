pub mod animation;
pub mod behavior;
pub mod entity;
pub mod level;
pub mod tile;
pub mod units;
