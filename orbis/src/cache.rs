use crate::class::ClassRef;
use crate::world::Block;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::hash_map::Entry;

/// A reference counted two-way mapping between classes and the compact ids stored in chunks.
///
/// Id 0 is never handed out, it is the "no block" value. Ids freed by `forget` become holes, and
/// the smallest hole is always reused before the id space grows.
#[derive(Debug, Clone)]
pub struct ClassCache {
	/// Indexed by id. Slot 0 is permanently vacant.
	entries: Vec<Option<ClassRef>>,
	reverse: FxHashMap<ClassRef, (Block, usize)>,
	holes: BinaryHeap<Reverse<Block>>,
	num_holes: usize
}

impl ClassCache {
	pub fn new() -> Self {
		ClassCache {
			entries: vec![None],
			reverse: FxHashMap::default(),
			holes: BinaryHeap::new(),
			num_holes: 0
		}
	}

	pub fn clear(&mut self) {
		self.entries.truncate(1);
		self.reverse.clear();
		self.holes.clear();
		self.num_holes = 0;
	}

	/// Number of distinct classes currently cached.
	pub fn len(&self) -> usize {
		self.reverse.len()
	}

	pub fn is_empty(&self) -> bool {
		self.reverse.is_empty()
	}

	pub fn num_holes(&self) -> usize {
		self.num_holes
	}

	pub fn is_id_valid(&self, id: Block) -> bool {
		self.class(id).is_some()
	}

	pub fn class(&self, id: Block) -> Option<ClassRef> {
		self.entries.get(id as usize).and_then(|entry| *entry)
	}

	/// Returns the number of outstanding `cache` calls for this class, or 0 if it isn't cached.
	pub fn use_count(&self, class: ClassRef) -> usize {
		self.reverse.get(&class).map(|&(_, uses)| uses).unwrap_or(0)
	}

	/// Returns the id of the class, if it is currently cached. Doesn't change the use count.
	pub fn id(&self, class: ClassRef) -> Option<Block> {
		self.reverse.get(&class).map(|&(id, _)| id)
	}

	/// Records one more use of the class and returns its id, allocating one if needed.
	/// ### Panics
	/// If every id is in use.
	pub fn cache(&mut self, class: ClassRef) -> Block {
		match self.reverse.entry(class) {
			Entry::Occupied(mut occupied) => {
				let (id, uses) = occupied.get_mut();
				*uses += 1;

				*id
			},
			Entry::Vacant(vacant) => {
				let id = match Self::take_hole(&mut self.holes, &self.entries) {
					Some(hole) => {
						self.num_holes -= 1;
						self.entries[hole as usize] = Some(class);

						hole
					},
					None => {
						assert!(self.entries.len() <= Block::max_value() as usize, "ClassCache is out of ids");

						self.entries.push(Some(class));
						(self.entries.len() - 1) as Block
					}
				};

				vacant.insert((id, 1));
				id
			}
		}
	}

	/// Records one less use of the class. Once nothing uses it anymore, it is evicted and its id freed.
	///
	/// The class must be cached. In release builds, forgetting an uncached class does nothing.
	pub fn forget(&mut self, class: ClassRef) {
		let id = match self.reverse.entry(class) {
			Entry::Occupied(mut occupied) => {
				let (id, uses) = occupied.get_mut();
				*uses -= 1;

				if *uses > 0 {
					return;
				}

				let id = *id;
				occupied.remove();
				id
			},
			Entry::Vacant(_) => {
				debug_assert!(false, "forgetting {} which is not cached", class);
				log::warn!("ClassCache: forgetting {} which is not cached", class);
				return;
			}
		};

		self.entries[id as usize] = None;

		if id as usize == self.entries.len() - 1 {
			// Freeing the highest id: shrink instead of leaving trailing holes behind.
			self.entries.pop();

			while self.entries.len() > 1 && self.entries.last() == Some(&None) {
				self.entries.pop();
				self.num_holes -= 1;
			}
		} else {
			self.holes.push(Reverse(id));
			self.num_holes += 1;
		}
	}

	/// Iterates over every cached `(id, class)` pair, in id order.
	pub fn iter(&self) -> impl Iterator<Item=(Block, ClassRef)> + '_ {
		self.entries.iter()
			.enumerate()
			.filter_map(|(id, entry)| entry.map(|class| (id as Block, class)))
	}

	/// Pops the smallest hole that is still a hole. Holes cut off by shrinking stay in the heap
	/// until they surface here.
	fn take_hole(holes: &mut BinaryHeap<Reverse<Block>>, entries: &[Option<ClassRef>]) -> Option<Block> {
		while let Some(Reverse(hole)) = holes.pop() {
			if entries.get(hole as usize) == Some(&None) {
				return Some(hole);
			}
		}

		None
	}
}

impl Default for ClassCache {
	fn default() -> Self {
		ClassCache::new()
	}
}
