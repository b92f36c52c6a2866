use crate::position::BlockPosition;
use cgmath::Vector3;

/// Compact block value stored in a chunk: 0 is "no block", anything else is an id handed out by
/// the owning planet's `ClassCache`.
pub type Block = u16;

/// A fixed size grid of blocks. Owns no class data, only the ids.
#[derive(Clone)]
pub struct Chunk {
	size: Vector3<u8>,
	blocks: Box<[Block]>
}

impl Chunk {
	pub fn new(size: Vector3<u8>) -> Self {
		let volume = size.x as usize * size.y as usize * size.z as usize;

		Chunk {
			size,
			blocks: vec![0; volume].into_boxed_slice()
		}
	}

	pub fn size(&self) -> Vector3<u8> {
		self.size
	}

	/// Stores a block id. The position must lie within the chunk.
	pub fn set_block(&mut self, position: BlockPosition, block: Block) {
		debug_assert!(position.within(self.size), "{:?} outside of a chunk of size {:?}", position, self.size);

		self.blocks[position.zyx(self.size)] = block;
	}

	/// Returns the block id at the position, or 0 if there is no block.
	pub fn get_block(&self, position: BlockPosition) -> Block {
		debug_assert!(position.within(self.size), "{:?} outside of a chunk of size {:?}", position, self.size);

		self.blocks[position.zyx(self.size)]
	}

	pub fn is_block_set(&self, position: BlockPosition) -> bool {
		self.get_block(position) != 0
	}

	pub fn reset_block(&mut self, position: BlockPosition) {
		self.set_block(position, 0);
	}

	/// Empties every cell.
	pub fn clear(&mut self) {
		for block in self.blocks.iter_mut() {
			*block = 0;
		}
	}

	/// Returns the cells in ZYX order, see `BlockPosition::zyx`.
	pub fn raw_data(&self) -> &[Block] {
		&self.blocks
	}

	pub fn num_set_blocks(&self) -> usize {
		self.blocks.iter().filter(|&&block| block != 0).count()
	}
}

impl std::fmt::Debug for Chunk {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "Chunk {{ size: {:?}, set: {} }}", self.size, self.num_set_blocks())
	}
}
