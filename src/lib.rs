pub mod animation;
pub mod config;
pub mod field;
pub mod render;

pub use animation::Animation;
pub use config::{Config, ConfigError};
pub use field::{Link, Particle, ParticleField, Pointer, Rgba};
pub use render::{render, Surface};
