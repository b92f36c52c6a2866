use cgmath::Vector3;
use std::fmt::{Debug, Display, Formatter, Result};

/// The position of a block inside of a chunk.
/// Each component must be less than the chunk size on the corresponding axis; that is checked by
/// whoever indexes the chunk, not here.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct BlockPosition {
	x: u8,
	y: u8,
	z: u8
}

impl BlockPosition {
	pub fn new(x: u8, y: u8, z: u8) -> Self {
		BlockPosition { x, y, z }
	}

	pub fn x(&self) -> u8 {
		self.x
	}

	pub fn y(&self) -> u8 {
		self.y
	}

	pub fn z(&self) -> u8 {
		self.z
	}

	/// Returns true if every component is below the chunk size on its axis.
	pub fn within(&self, chunk_size: Vector3<u8>) -> bool {
		self.x < chunk_size.x && self.y < chunk_size.y && self.z < chunk_size.z
	}

	/// Returns the index into a flat array laid out as `(Z * height + Y) * width + X`.
	pub fn zyx(&self, chunk_size: Vector3<u8>) -> usize {
		let (width, height) = (chunk_size.x as usize, chunk_size.y as usize);

		((self.z as usize) * height + self.y as usize) * width + self.x as usize
	}
}

impl Display for BlockPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "({}, {}, {})", self.x, self.y, self.z)
	}
}

impl Debug for BlockPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "BlockPosition {{ x: {}, y: {}, z: {} }}", self.x, self.y, self.z)
	}
}
