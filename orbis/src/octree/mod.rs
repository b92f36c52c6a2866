//! Loose octree over integer cuboids.
//!
//! Every node's containment bound is its own volume doubled and centered on itself, so anything no
//! larger than a node that straddles the node's edge still fits in it. Nodes live in an arena and
//! are addressed by `NodeId`. Nodes are created lazily by `insert` and are never removed again,
//! so a `NodeId` stays valid until the tree is cleared.

mod quadrant;

pub use self::quadrant::Quadrant;

use crate::cuboid::Cuboid;
use cgmath::Vector3;

/// Stable handle to a node of a `LooseOctree`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone)]
struct NodeData<T> {
	position: Vector3<u32>,
	size: u32,
	children: [Option<NodeId>; 8],
	data: Vec<(T, Cuboid<u32>)>
}

impl<T> NodeData<T> {
	fn new(position: Vector3<u32>, size: u32) -> Self {
		NodeData {
			position,
			size,
			children: [None; 8],
			data: Vec::new()
		}
	}

	fn is_subdivided(&self) -> bool {
		self.children.iter().any(Option::is_some)
	}
}

/// A loose bound in doubled coordinates, keeping the half-size margins of size 1 nodes integral.
#[derive(Debug, Copy, Clone)]
struct LooseBound {
	min: Vector3<i64>,
	max: Vector3<i64>
}

impl LooseBound {
	fn of(position: Vector3<u32>, size: u32) -> Self {
		let size = size as i64;
		let doubled = |axis: u32| (axis as i64) * 2;

		LooseBound {
			min: Vector3::new(doubled(position.x) - size, doubled(position.y) - size, doubled(position.z) - size),
			max: Vector3::new(doubled(position.x) + size * 3, doubled(position.y) + size * 3, doubled(position.z) + size * 3)
		}
	}

	fn doubled(cuboid: &Cuboid<u32>) -> (Vector3<i64>, Vector3<i64>) {
		let min = cuboid.min();
		let max = cuboid.max();

		(
			Vector3::new(min.x as i64 * 2, min.y as i64 * 2, min.z as i64 * 2),
			Vector3::new(max.x as i64 * 2, max.y as i64 * 2, max.z as i64 * 2)
		)
	}

	fn contains(&self, cuboid: &Cuboid<u32>) -> bool {
		let (min, max) = LooseBound::doubled(cuboid);

		   min.x >= self.min.x && max.x <= self.max.x
		&& min.y >= self.min.y && max.y <= self.max.y
		&& min.z >= self.min.z && max.z <= self.max.z
	}

	fn intersects(&self, cuboid: &Cuboid<u32>) -> bool {
		let (min, max) = LooseBound::doubled(cuboid);

		   min.x < self.max.x && self.min.x < max.x
		&& min.y < self.max.y && self.min.y < max.y
		&& min.z < self.max.z && self.min.z < max.z
	}
}

#[derive(Debug, Clone)]
pub struct LooseOctree<T> {
	nodes: Vec<NodeData<T>>
}

impl<T> LooseOctree<T> {
	/// Creates a tree spanning `0..size` on every axis. The size must be a power of two; in release
	/// builds other sizes are rounded up to the next one.
	pub fn new(size: u32) -> Self {
		debug_assert!(size.is_power_of_two(), "octree size {} is not a power of two", size);

		LooseOctree {
			nodes: vec![NodeData::new(Vector3::new(0, 0, 0), size.next_power_of_two())]
		}
	}

	pub fn size(&self) -> u32 {
		self.nodes[0].size
	}

	/// The exact (non-loose) volume of the root node.
	pub fn bounds(&self) -> Cuboid<u32> {
		let size = self.size();

		Cuboid::new(0, 0, 0, size, size, size)
	}

	pub fn root(&self) -> Node<T> {
		Node { tree: self, id: NodeId::ROOT }
	}

	pub fn node(&self, id: NodeId) -> Option<Node<T>> {
		if id.0 < self.nodes.len() {
			Some(Node { tree: self, id })
		} else {
			None
		}
	}

	/// Number of allocated nodes, including the root.
	pub fn num_nodes(&self) -> usize {
		self.nodes.len()
	}

	/// Drops every node except for an empty root. Previously returned `NodeId`s become invalid.
	pub fn clear(&mut self) {
		self.nodes.truncate(1);
		self.nodes[0] = NodeData::new(Vector3::new(0, 0, 0), self.nodes[0].size);
	}

	/// Inserts the value at the shallowest node whose loose bound is the only one among its
	/// siblings to contain the cuboid, subdividing on the way down. Returns the owning node.
	///
	/// The cuboid should lie within `bounds()`. Cuboids that don't are kept at the root.
	pub fn insert(&mut self, value: T, cuboid: Cuboid<u32>) -> NodeId {
		let mut current = NodeId::ROOT;

		if self.bounds().contains_cuboid(&cuboid) {
			while let Some(quadrant) = self.route(current, &cuboid) {
				current = self.ensure_child(current, quadrant);
			}
		} else {
			debug_assert!(false, "inserting {:?} outside of the octree bounds {:?}", cuboid, self.bounds());
			log::warn!("LooseOctree: {:?} is outside of the tree bounds {:?}, keeping it at the root", cuboid, self.bounds());
		}

		self.nodes[current.0].data.push((value, cuboid));
		current
	}

	/// Appends every value whose cuboid intersects the query to `results`, without clearing it.
	///
	/// Values are visited depth first: a node's own entries in insertion order, then its children
	/// in quadrant order.
	pub fn search(&self, query: &Cuboid<u32>, results: &mut Vec<T>) where T: Clone {
		self.search_node(NodeId::ROOT, query, results);
	}

	fn search_node(&self, id: NodeId, query: &Cuboid<u32>, results: &mut Vec<T>) where T: Clone {
		let node = &self.nodes[id.0];

		results.extend(
			node.data.iter()
				.filter(|(_, cuboid)| cuboid.intersects(query))
				.map(|(value, _)| value.clone())
		);

		for child in node.children.iter().filter_map(|child| *child) {
			let child_node = &self.nodes[child.0];

			if LooseBound::of(child_node.position, child_node.size).intersects(query) {
				self.search_node(child, query, results);
			}
		}
	}

	/// Removes every entry equal to `value` stored directly in the node. Returns the number of
	/// removed entries. Emptied nodes are kept.
	pub fn erase(&mut self, node: NodeId, value: &T) -> usize where T: PartialEq {
		let data = match self.nodes.get_mut(node.0) {
			Some(node) => &mut node.data,
			None => {
				debug_assert!(false, "erasing from {:?} which is not part of this octree", node);
				return 0;
			}
		};

		let before = data.len();
		data.retain(|(stored, _)| stored != value);

		before - data.len()
	}

	/// Removes every entry equal to `value` whose cuboid intersects the query, wherever it is
	/// stored. Returns the number of removed entries.
	pub fn erase_within(&mut self, value: &T, query: &Cuboid<u32>) -> usize where T: PartialEq {
		let mut removed = 0;
		let mut pending = vec![NodeId::ROOT];

		while let Some(id) = pending.pop() {
			let node = &mut self.nodes[id.0];

			let before = node.data.len();
			node.data.retain(|(stored, cuboid)| !(stored == value && cuboid.intersects(query)));
			removed += before - node.data.len();

			let children = node.children;

			for child in children.iter().filter_map(|child| *child) {
				let child_node = &self.nodes[child.0];

				if LooseBound::of(child_node.position, child_node.size).intersects(query) {
					pending.push(child);
				}
			}
		}

		removed
	}

	/// Picks the child the cuboid belongs in, or None if it has to stay at this node.
	fn route(&self, id: NodeId, cuboid: &Cuboid<u32>) -> Option<Quadrant> {
		let node = &self.nodes[id.0];

		if node.size <= 1 {
			return None;
		}

		let child_size = node.size / 2;

		if cuboid.width > child_size || cuboid.height > child_size || cuboid.depth > child_size {
			return None;
		}

		let mut candidates = Quadrant::ALL.iter().copied().filter(|quadrant| {
			LooseBound::of(node.position + quadrant.offset(child_size), child_size).contains(cuboid)
		});

		match (candidates.next(), candidates.next()) {
			(Some(quadrant), None) => Some(quadrant),
			_ => None
		}
	}

	fn ensure_child(&mut self, parent: NodeId, quadrant: Quadrant) -> NodeId {
		let (position, size, existing) = {
			let parent = &self.nodes[parent.0];
			let child_size = parent.size / 2;

			(parent.position + quadrant.offset(child_size), child_size, parent.children[quadrant.index()])
		};

		if let Some(child) = existing {
			return child;
		}

		let child = NodeId(self.nodes.len());

		self.nodes.push(NodeData::new(position, size));
		self.nodes[parent.0].children[quadrant.index()] = Some(child);

		child
	}
}

/// Read only view of a single node.
#[derive(Debug)]
pub struct Node<'a, T> {
	tree: &'a LooseOctree<T>,
	id: NodeId
}

impl<'a, T> Clone for Node<'a, T> {
	fn clone(&self) -> Self {
		Node { tree: self.tree, id: self.id }
	}
}

impl<'a, T> Copy for Node<'a, T> {}

impl<'a, T> Node<'a, T> {
	fn data_ref(&self) -> &'a NodeData<T> {
		&self.tree.nodes[self.id.0]
	}

	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn size(&self) -> u32 {
		self.data_ref().size
	}

	/// Minimum corner of the node's exact volume.
	pub fn position(&self) -> Vector3<u32> {
		self.data_ref().position
	}

	pub fn is_subdivided(&self) -> bool {
		self.data_ref().is_subdivided()
	}

	pub fn has_child(&self, quadrant: Quadrant) -> bool {
		self.data_ref().children[quadrant.index()].is_some()
	}

	pub fn child(&self, quadrant: Quadrant) -> Option<Node<'a, T>> {
		self.data_ref().children[quadrant.index()].map(|id| Node { tree: self.tree, id })
	}

	/// Entries stored directly in this node, in insertion order.
	pub fn data(&self) -> &'a [(T, Cuboid<u32>)] {
		&self.data_ref().data
	}

	pub fn num_data(&self) -> usize {
		self.data_ref().data.len()
	}

	pub fn values(&self) -> impl Iterator<Item=&'a T> + 'a {
		self.data().iter().map(|(value, _)| value)
	}
}
