use crate::cuboid::Cuboid;
use crate::error::Error;
use cgmath::Vector3;
use rustc_hash::FxHashMap;
use std::fmt::{self, Display, Formatter};

/// Interned handle to a class in a `ClassRegistry`.
///
/// Two handles are the same class if and only if they compare equal; the class definition itself
/// is never compared by value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassRef(u32);

impl ClassRef {
	pub fn index(&self) -> usize {
		self.0 as usize
	}
}

impl Display for ClassRef {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "class#{}", self.0)
	}
}

/// A block or entity class.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
	id: String,
	name: String,
	origin: Vector3<f32>,
	scale: Vector3<f32>,
	bounding_box: Option<Cuboid<f32>>
}

impl Class {
	pub fn new<S>(id: S) -> Self where S: Into<String> {
		Class {
			id: id.into(),
			name: String::new(),
			origin: Vector3::new(0.0, 0.0, 0.0),
			scale: Vector3::new(1.0, 1.0, 1.0),
			bounding_box: None
		}
	}

	/// Resource id, for example `fw.base/grass`.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn set_name<S>(&mut self, name: S) where S: Into<String> {
		self.name = name.into();
	}

	pub fn origin(&self) -> Vector3<f32> {
		self.origin
	}

	pub fn set_origin(&mut self, origin: Vector3<f32>) {
		self.origin = origin;
	}

	pub fn scale(&self) -> Vector3<f32> {
		self.scale
	}

	pub fn set_scale(&mut self, scale: Vector3<f32>) {
		self.scale = scale;
	}

	/// Model space bounding box, before scaling.
	pub fn bounding_box(&self) -> Option<&Cuboid<f32>> {
		self.bounding_box.as_ref()
	}

	pub fn set_bounding_box(&mut self, bounding_box: Cuboid<f32>) {
		self.bounding_box = Some(bounding_box);
	}

	pub fn disable_bounding_box(&mut self) {
		self.bounding_box = None;
	}
}

/// Arena of class definitions, addressed by `ClassRef` or by resource id.
#[derive(Debug, Default)]
pub struct ClassRegistry {
	classes: Vec<Class>,
	by_id: FxHashMap<String, ClassRef>
}

impl ClassRegistry {
	pub fn new() -> Self {
		ClassRegistry::default()
	}

	pub fn add(&mut self, class: Class) -> Result<ClassRef, Error> {
		if self.by_id.contains_key(class.id()) {
			return Err(Error::DuplicateClass(class.id().to_owned()));
		}

		let handle = ClassRef(self.classes.len() as u32);

		self.by_id.insert(class.id().to_owned(), handle);
		self.classes.push(class);

		Ok(handle)
	}

	/// Returns the class behind a handle handed out by this registry.
	/// ### Panics
	/// If the handle came from a different registry, or the registry was cleared since.
	pub fn get(&self, class: ClassRef) -> &Class {
		&self.classes[class.index()]
	}

	pub fn find(&self, id: &str) -> Option<ClassRef> {
		self.by_id.get(id).copied()
	}

	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	pub fn clear(&mut self) {
		self.classes.clear();
		self.by_id.clear();
	}

	pub fn iter(&self) -> impl Iterator<Item=(ClassRef, &Class)> {
		self.classes.iter().enumerate().map(|(index, class)| (ClassRef(index as u32), class))
	}
}
