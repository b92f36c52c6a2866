use crate::class::{Class, ClassRef};
use crate::cuboid::Cuboid;
use crate::position::Coordinate;
use cgmath::Vector3;

pub type EntityId = u32;

/// A dynamic object in the world. Entities are owned by the `World`; planets only know their ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
	id: EntityId,
	class: ClassRef,
	position: Coordinate,
	rotation: Vector3<f32>,
	name: Option<String>,
	amount: u32
}

impl Entity {
	pub fn new(id: EntityId, class: ClassRef) -> Self {
		Entity {
			id,
			class,
			position: Vector3::new(0.0, 0.0, 0.0),
			rotation: Vector3::new(0.0, 0.0, 0.0),
			name: None,
			amount: 1
		}
	}

	pub fn id(&self) -> EntityId {
		self.id
	}

	pub fn class(&self) -> ClassRef {
		self.class
	}

	pub fn position(&self) -> Coordinate {
		self.position
	}

	pub fn set_position(&mut self, position: Coordinate) {
		self.position = position;
	}

	pub fn rotation(&self) -> Vector3<f32> {
		self.rotation
	}

	pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
		self.rotation = rotation;
	}

	/// The custom name, if one was set.
	pub fn name(&self) -> Option<&str> {
		self.name.as_ref().map(String::as_str)
	}

	/// The custom name, falling back to the class name.
	pub fn display_name<'a>(&'a self, class: &'a Class) -> &'a str {
		self.name().unwrap_or_else(|| class.name())
	}

	pub fn set_name<S>(&mut self, name: S) where S: Into<String> {
		self.name = Some(name.into());
	}

	pub fn reset_name(&mut self) {
		self.name = None;
	}

	pub fn amount(&self) -> u32 {
		self.amount
	}

	/// Sets the stack size. Zero is not a valid amount and is ignored.
	pub fn set_amount(&mut self, amount: u32) {
		debug_assert!(amount > 0, "entity #{} given an amount of 0", self.id);

		if amount > 0 {
			self.amount = amount;
		}
	}

	/// Returns the bounding cuboid in planet coordinates.
	///
	/// The class origin is placed at the entity position, and the class bounding box is scaled
	/// from there. A class without a bounding box occupies one unit cube.
	pub fn bounding_cuboid(&self, class: &Class) -> Cuboid<f32> {
		let scale = class.scale();
		let origin = class.origin();

		let corner = Vector3::new(
			self.position.x - origin.x * scale.x,
			self.position.y - origin.y * scale.y,
			self.position.z - origin.z * scale.z
		);

		match class.bounding_box() {
			Some(bounds) => Cuboid::new(
				corner.x + bounds.x * scale.x,
				corner.y + bounds.y * scale.y,
				corner.z + bounds.z * scale.z,
				bounds.width * scale.x,
				bounds.height * scale.y,
				bounds.depth * scale.z
			),
			None => Cuboid::new(corner.x, corner.y, corner.z, 1.0, 1.0, 1.0)
		}
	}
}
