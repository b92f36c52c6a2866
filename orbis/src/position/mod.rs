mod block;
mod chunk;

/// Absolute positioning on a planet.
///
/// A planet coordinate is a point in block units, with the origin at the corner of chunk (0, 0, 0).
/// A planet of size `S` chunks made of chunks of `C` blocks spans `[0, S*C)` on each axis.
/// Anything outside of that is still a valid coordinate, it simply names a chunk the planet doesn't have.
pub type Coordinate = cgmath::Vector3<f32>;

pub use self::block::BlockPosition;
pub use self::chunk::ChunkPosition;
