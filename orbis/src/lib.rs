#![forbid(unsafe_code)]

//! # `orbis`: shared planet storage
//!
//! The persistent, mutable world store shared between the game server's network dispatch threads,
//! chunk preparation workers, and scripting callbacks.
//!
//! # Layout
//!
//! A world is a set of planets. Each planet is:
//!
//!  * A sparse map of fixed size chunks, each a flat array of compact block ids
//!  * A reference counted class cache turning those ids back into classes
//!  * A loose octree over the bounding cuboids of the entities currently on the planet
//!
//! Block storage never holds a class directly. A block is a small integer handed out by the
//! planet's `ClassCache`, with 0 reserved for "no block", so a chunk stays compact no matter how
//! large the class definitions are.
//!
//! # Locking
//!
//! Every planet inside a `World` sits behind a `spin::RwLock`, so planet data cannot be touched
//! without a guard. On top of that the `LockFacility` hands out recursive, thread-owned locks for
//! the world, the account manager, and each planet. Those are held across several calls (a script
//! callback editing many blocks, a session answering a view request) and are always taken by the
//! caller; nothing in this crate locks on the caller's behalf.
//!
//! When both are needed, take the world lock first, then the planet lock.

pub mod cache;
pub mod class;
pub mod config;
pub mod cuboid;
pub mod error;
pub mod lock;
pub mod octree;
pub mod position;
pub mod world;

pub use self::cache::ClassCache;
pub use self::class::{Class, ClassRef, ClassRegistry};
pub use self::config::PlanetSettings;
pub use self::cuboid::Cuboid;
pub use self::error::Error;
pub use self::lock::{LockFacility, RefLock};
pub use self::octree::LooseOctree;
pub use self::world::{Block, Chunk, Entity, EntityId, Planet, SharedPlanet, World};
