use cgmath::Vector3;
use std::fmt::{Debug, Display, Formatter, Result};

/// The position of a chunk on a planet, measured in chunks.
///
/// Components are signed: coordinate transforms can name chunks on the negative side of the
/// planet, which then simply fail the bounds check.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
pub struct ChunkPosition {
	// Field order gives Z, then Y, then X ordering.
	z: i32,
	y: i32,
	x: i32
}

impl ChunkPosition {
	pub fn new(x: i32, y: i32, z: i32) -> Self {
		ChunkPosition { x, y, z }
	}

	/// Returns the X component.
	pub fn x(&self) -> i32 {
		self.x
	}

	/// Returns the Y component.
	pub fn y(&self) -> i32 {
		self.y
	}

	/// Returns the Z component.
	pub fn z(&self) -> i32 {
		self.z
	}

	/// Returns true if every component is in `0..size` on its axis.
	pub fn within(&self, size: Vector3<u16>) -> bool {
		   self.x >= 0 && self.x < size.x as i32
		&& self.y >= 0 && self.y < size.y as i32
		&& self.z >= 0 && self.z < size.z as i32
	}
}

impl From<(i32, i32, i32)> for ChunkPosition {
	fn from((x, y, z): (i32, i32, i32)) -> Self {
		ChunkPosition::new(x, y, z)
	}
}

impl Display for ChunkPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "({}, {}, {})", self.x, self.y, self.z)
	}
}

impl Debug for ChunkPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "ChunkPosition {{ x: {}, y: {}, z: {} }}", self.x, self.y, self.z)
	}
}
