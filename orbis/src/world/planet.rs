use crate::cache::ClassCache;
use crate::class::{Class, ClassRef};
use crate::config::PlanetSettings;
use crate::cuboid::Cuboid;
use crate::error::Error;
use crate::octree::{LooseOctree, NodeId};
use crate::position::{BlockPosition, ChunkPosition, Coordinate};
use crate::world::chunk::{Block, Chunk};
use crate::world::entity::{Entity, EntityId};
use cgmath::Vector3;
use rustc_hash::FxHashMap;

/// One voxel world: sparse chunk storage, the class cache backing it, and a spatial index over
/// the entities currently on it.
///
/// A planet has no synchronization of its own. Inside a `World` it is only reachable through a
/// `spin::RwLock`, and callers are expected to also hold the planet's lock in the `LockFacility`
/// while working with it.
#[derive(Debug, Clone)]
pub struct Planet {
	id: String,
	size: Vector3<u16>,
	chunk_size: Vector3<u8>,
	chunks: FxHashMap<ChunkPosition, Chunk>,
	class_cache: ClassCache,
	entity_tree: LooseOctree<EntityId>,
	entity_nodes: FxHashMap<EntityId, NodeId>,
	/// Sorted. The authoritative set of entities on this planet; the tree only accelerates queries.
	entities: Vec<EntityId>
}

impl Planet {
	pub fn new<S>(id: S, settings: &PlanetSettings) -> Result<Self, Error> where S: Into<String> {
		let id = id.into();

		if id.is_empty() {
			return Err(Error::InvalidPlanetId);
		}

		settings.validate()?;

		let extent = settings.block_extent();
		let tree_size = extent.x.max(extent.y).max(extent.z).next_power_of_two();

		Ok(Planet {
			id,
			size: settings.size,
			chunk_size: settings.chunk_size,
			chunks: FxHashMap::default(),
			class_cache: ClassCache::new(),
			entity_tree: LooseOctree::new(tree_size),
			entity_nodes: FxHashMap::default(),
			entities: Vec::new()
		})
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// Planet extent in chunks.
	pub fn size(&self) -> Vector3<u16> {
		self.size
	}

	pub fn chunk_size(&self) -> Vector3<u8> {
		self.chunk_size
	}

	/// Planet extent in blocks.
	pub fn block_extent(&self) -> Vector3<u32> {
		PlanetSettings::new(self.size, self.chunk_size).block_extent()
	}

	/// Drops every chunk, entity and cached class. The id and dimensions stay the same.
	pub fn clear(&mut self) {
		self.chunks.clear();
		self.class_cache.clear();
		self.entity_tree.clear();
		self.entity_nodes.clear();
		self.entities.clear();
	}

	/// Splits an absolute coordinate into a chunk position and the block position inside of it.
	///
	/// The pair is always computed, the returned flag only reports whether the chunk lies within
	/// the planet. Coordinates are floored first, so `-0.5` lands in chunk -1.
	pub fn transform(&self, coordinate: Coordinate) -> (ChunkPosition, BlockPosition, bool) {
		fn split(value: f32, chunk_size: u8) -> (i32, u8) {
			let value = value.floor() as i64;
			let chunk_size = chunk_size as i64;

			let chunk = value.div_euclid(chunk_size).max(i32::min_value() as i64).min(i32::max_value() as i64);

			(chunk as i32, value.rem_euclid(chunk_size) as u8)
		}

		let (chunk_x, block_x) = split(coordinate.x, self.chunk_size.x);
		let (chunk_y, block_y) = split(coordinate.y, self.chunk_size.y);
		let (chunk_z, block_z) = split(coordinate.z, self.chunk_size.z);

		let chunk = ChunkPosition::new(chunk_x, chunk_y, chunk_z);
		let block = BlockPosition::new(block_x, block_y, block_z);

		(chunk, block, chunk.within(self.size))
	}

	// Chunks

	pub fn has_chunk(&self, position: ChunkPosition) -> bool {
		self.chunks.contains_key(&position)
	}

	/// Creates an empty chunk. The position must be within the planet, and no chunk may exist there
	/// yet. In release builds a violation leaves the planet untouched.
	pub fn create_chunk(&mut self, position: ChunkPosition) {
		if !position.within(self.size) {
			debug_assert!(false, "creating chunk {} outside of planet {}", position, self.id);
			log::warn!("Planet {}: refusing to create chunk {} outside of the planet", self.id, position);
			return;
		}

		if self.chunks.contains_key(&position) {
			debug_assert!(false, "chunk {} on planet {} already exists", position, self.id);
			log::warn!("Planet {}: chunk {} already exists, keeping it", self.id, position);
			return;
		}

		log::trace!("Planet {}: creating chunk {}", self.id, position);
		self.chunks.insert(position, Chunk::new(self.chunk_size));
	}

	pub fn get_chunk(&self, position: ChunkPosition) -> Option<&Chunk> {
		self.chunks.get(&position)
	}

	pub fn num_chunks(&self) -> usize {
		self.chunks.len()
	}

	/// Iterates over the existing chunks in no particular order.
	pub fn chunks(&self) -> impl Iterator<Item=(ChunkPosition, &Chunk)> {
		self.chunks.iter().map(|(position, chunk)| (*position, chunk))
	}

	// Blocks

	/// Returns the class cache backing the block ids of this planet.
	pub fn class_cache(&self) -> &ClassCache {
		&self.class_cache
	}

	/// Sets a block. The chunk must exist; in release builds setting a block in a missing chunk
	/// does nothing.
	pub fn set_block(&mut self, chunk_position: ChunkPosition, block_position: BlockPosition, class: ClassRef) {
		let chunk = match self.chunks.get_mut(&chunk_position) {
			Some(chunk) => chunk,
			None => {
				debug_assert!(false, "setting a block in missing chunk {} on planet {}", chunk_position, self.id);
				log::warn!("Planet {}: set_block in missing chunk {}", self.id, chunk_position);
				return;
			}
		};

		if !block_position.within(self.chunk_size) {
			debug_assert!(false, "{:?} is outside of a chunk of size {:?}", block_position, self.chunk_size);
			log::warn!("Planet {}: set_block at {} outside of the chunk", self.id, block_position);
			return;
		}

		let old = chunk.get_block(block_position);

		if old != 0 {
			if let Some(old_class) = self.class_cache.class(old) {
				self.class_cache.forget(old_class);
			}
		}

		let id = self.class_cache.cache(class);
		chunk.set_block(block_position, id);
	}

	/// Returns the class of a block, or None if the cell or its chunk is empty.
	pub fn find_block(&self, chunk_position: ChunkPosition, block_position: BlockPosition) -> Option<ClassRef> {
		if !block_position.within(self.chunk_size) {
			return None;
		}

		self.chunks.get(&chunk_position)
			.map(|chunk| chunk.get_block(block_position))
			.and_then(|block| self.class_cache.class(block))
	}

	/// Removes a block, returning whether there was one. Resetting an empty cell is a no-op.
	pub fn reset_block(&mut self, chunk_position: ChunkPosition, block_position: BlockPosition) -> bool {
		if !block_position.within(self.chunk_size) {
			return false;
		}

		let chunk = match self.chunks.get_mut(&chunk_position) {
			Some(chunk) => chunk,
			None => return false
		};

		let old: Block = chunk.get_block(block_position);

		if old == 0 {
			return false;
		}

		if let Some(old_class) = self.class_cache.class(old) {
			self.class_cache.forget(old_class);
		}

		chunk.reset_block(block_position);
		true
	}

	/// Sets the block at an absolute coordinate, creating its chunk if needed.
	pub fn set_block_at(&mut self, coordinate: Coordinate, class: ClassRef) -> Result<(), Error> {
		let (chunk, block, valid) = self.transform(coordinate);

		if !valid {
			return Err(Error::OutOfBounds(coordinate));
		}

		if !self.has_chunk(chunk) {
			self.create_chunk(chunk);
		}

		self.set_block(chunk, block, class);
		Ok(())
	}

	pub fn find_block_at(&self, coordinate: Coordinate) -> Option<ClassRef> {
		let (chunk, block, valid) = self.transform(coordinate);

		if !valid {
			return None;
		}

		self.find_block(chunk, block)
	}

	/// Removes the block at an absolute coordinate. Returns `Ok(false)` if there was none.
	pub fn reset_block_at(&mut self, coordinate: Coordinate) -> Result<bool, Error> {
		let (chunk, block, valid) = self.transform(coordinate);

		if !valid {
			return Err(Error::OutOfBounds(coordinate));
		}

		Ok(self.reset_block(chunk, block))
	}

	// Entities

	pub fn num_entities(&self) -> usize {
		self.entities.len()
	}

	pub fn has_entity(&self, entity: EntityId) -> bool {
		self.entities.binary_search(&entity).is_ok()
	}

	/// Returns the n-th entity id in ascending order.
	pub fn entity_id(&self, index: usize) -> Option<EntityId> {
		self.entities.get(index).copied()
	}

	/// Ids of every entity on this planet, sorted.
	pub fn entities(&self) -> &[EntityId] {
		&self.entities
	}

	/// Indexes an entity. The class must be the entity's class, and the entity must not be on the
	/// planet yet; in release builds adding it twice does nothing.
	pub fn add_entity(&mut self, entity: &Entity, class: &Class) {
		let index = match self.entities.binary_search(&entity.id()) {
			Ok(_) => {
				debug_assert!(false, "entity #{} is already on planet {}", entity.id(), self.id);
				log::warn!("Planet {}: entity #{} added twice", self.id, entity.id());
				return;
			},
			Err(index) => index
		};

		let cuboid = self.entity_cuboid(entity, class);
		let node = self.entity_tree.insert(entity.id(), cuboid);

		self.entities.insert(index, entity.id());
		self.entity_nodes.insert(entity.id(), node);
	}

	/// Removes an entity from the planet. The entity must be on it; in release builds removing an
	/// absent entity does nothing.
	pub fn remove_entity(&mut self, entity: EntityId) {
		match self.entities.binary_search(&entity) {
			Ok(index) => { self.entities.remove(index); },
			Err(_) => {
				debug_assert!(false, "entity #{} is not on planet {}", entity, self.id);
				log::warn!("Planet {}: removing entity #{} which is not on the planet", self.id, entity);
				return;
			}
		}

		if let Some(node) = self.entity_nodes.remove(&entity) {
			self.entity_tree.erase(node, &entity);
		}
	}

	/// Re-indexes an entity after it moved or changed size. Does nothing if it isn't on the planet.
	pub fn update_entity(&mut self, entity: &Entity, class: &Class) {
		let node = match self.entity_nodes.get(&entity.id()) {
			Some(&node) => node,
			None => return
		};

		self.entity_tree.erase(node, &entity.id());

		let cuboid = self.entity_cuboid(entity, class);
		let node = self.entity_tree.insert(entity.id(), cuboid);

		self.entity_nodes.insert(entity.id(), node);
	}

	/// Returns the cuboid the entity is indexed with: its bounding cuboid snapped outwards to whole
	/// blocks, clamped to the planet, and at least one block large on every axis.
	pub fn entity_cuboid(&self, entity: &Entity, class: &Class) -> Cuboid<u32> {
		self.snap(&entity.bounding_cuboid(class))
	}

	/// Appends the ids of every entity whose indexed cuboid intersects the area to `results`.
	/// The area is snapped to whole blocks like entity bounds are.
	pub fn search_entities(&self, area: &Cuboid<f32>, results: &mut Vec<EntityId>) {
		let extent = self.block_extent();
		let planet = Cuboid::new(0.0, 0.0, 0.0, extent.x as f32, extent.y as f32, extent.z as f32);

		// Snapping would clamp an area outside of the planet onto its edge.
		if Cuboid::intersection(&planet, area).is_none() {
			return;
		}

		self.entity_tree.search(&self.snap(area), results);
	}

	fn snap(&self, cuboid: &Cuboid<f32>) -> Cuboid<u32> {
		fn axis(min: f32, length: f32, extent: u32) -> (u32, u32) {
			let extent = extent as i64;

			let low = (min.floor() as i64).max(0).min(extent - 1);
			let high = ((min + length).ceil() as i64).min(extent).max(low + 1);

			(low as u32, (high - low) as u32)
		}

		let extent = self.block_extent();

		let (x, width) = axis(cuboid.x, cuboid.width, extent.x);
		let (y, height) = axis(cuboid.y, cuboid.height, extent.y);
		let (z, depth) = axis(cuboid.z, cuboid.depth, extent.z);

		Cuboid::new(x, y, z, width, height, depth)
	}
}
