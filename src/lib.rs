//! Núcleo de un motor de raycasting en punto fijo: rejilla de 64x64 tiles,
//! puertas que alteran la rejilla, búfer de oclusión por columnas, sprites en
//! perspectiva e IA de enemigos al estilo Doom.

pub mod archetype;
pub mod combat;
pub mod config;
pub mod depth;
pub mod door;
pub mod enemy;
pub mod error;
pub mod event;
pub mod fixed;
pub mod level;
pub mod map;
pub mod particle;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod raycaster;
pub mod render;
pub mod rng;
pub mod sprite;
pub mod teleport;
pub mod world;

pub use config::EngineConfig;
pub use error::{ConfigError, LevelError};
pub use level::LevelDesc;
pub use world::{Frame, TickInput, World};
