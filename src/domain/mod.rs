pub mod entity;
pub mod geom;
pub mod ghost;
pub mod physics;
pub mod player;
pub mod tile;
