//! Planets, the chunks and entities on them, and the world tying them together.

pub mod chunk;
pub mod entity;
pub mod planet;
pub mod world;

pub use self::chunk::{Block, Chunk};
pub use self::entity::{Entity, EntityId};
pub use self::planet::Planet;
pub use self::world::{SharedPlanet, World};
