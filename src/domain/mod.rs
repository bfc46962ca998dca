pub mod ai;
pub mod animation;
pub mod entity;
pub mod geom;
pub mod hazard;
pub mod particle;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod rules;
pub mod tile;
pub mod tilemap;
