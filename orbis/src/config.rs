use crate::error::Error;
use cgmath::Vector3;

/// Construction parameters for a planet.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlanetSettings {
	/// Planet extent, in chunks.
	pub size: Vector3<u16>,
	/// Extent of every chunk on the planet, in blocks.
	pub chunk_size: Vector3<u8>
}

impl PlanetSettings {
	pub fn new(size: Vector3<u16>, chunk_size: Vector3<u8>) -> Self {
		PlanetSettings { size, chunk_size }
	}

	pub fn validate(&self) -> Result<(), Error> {
		let PlanetSettings { size, chunk_size } = self;

		if size.x == 0 || size.y == 0 || size.z == 0 {
			return Err(Error::InvalidSize);
		}

		if chunk_size.x == 0 || chunk_size.y == 0 || chunk_size.z == 0 {
			return Err(Error::InvalidSize);
		}

		Ok(())
	}

	/// Planet extent in blocks.
	pub fn block_extent(&self) -> Vector3<u32> {
		Vector3::new(
			self.size.x as u32 * self.chunk_size.x as u32,
			self.size.y as u32 * self.chunk_size.y as u32,
			self.size.z as u32 * self.chunk_size.z as u32
		)
	}
}

impl Default for PlanetSettings {
	fn default() -> Self {
		PlanetSettings {
			size: Vector3::new(1, 1, 1),
			chunk_size: Vector3::new(16, 16, 16)
		}
	}
}
