use cgmath::Vector3;
use std::ops::{Add, Sub};

/// An axis aligned box, stored as its minimum corner plus its extent on each axis.
///
/// Every containment and intersection test treats the box as half open: `[x, x + width)`.
/// Two boxes sharing only a face do not intersect, and a box with any zero extent intersects nothing.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Cuboid<T> {
	pub x: T,
	pub y: T,
	pub z: T,
	pub width: T,
	pub height: T,
	pub depth: T
}

impl<T> Cuboid<T> where T: Copy + PartialOrd + Add<Output=T> + Sub<Output=T> {
	pub fn new(x: T, y: T, z: T, width: T, height: T, depth: T) -> Self {
		Cuboid { x, y, z, width, height, depth }
	}

	/// Builds a cuboid spanning `min..max`. Components of `max` that are below `min` produce a zero extent.
	pub fn from_bounds(min: Vector3<T>, max: Vector3<T>) -> Self {
		fn extent<T>(min: T, max: T) -> T where T: Copy + PartialOrd + Sub<Output=T> {
			if max > min { max - min } else { min - min }
		}

		Cuboid {
			x: min.x,
			y: min.y,
			z: min.z,
			width: extent(min.x, max.x),
			height: extent(min.y, max.y),
			depth: extent(min.z, max.z)
		}
	}

	pub fn min(&self) -> Vector3<T> {
		Vector3::new(self.x, self.y, self.z)
	}

	/// Returns the exclusive upper corner.
	pub fn max(&self) -> Vector3<T> {
		Vector3::new(self.x + self.width, self.y + self.height, self.z + self.depth)
	}

	pub fn size(&self) -> Vector3<T> {
		Vector3::new(self.width, self.height, self.depth)
	}

	pub fn contains(&self, point: Vector3<T>) -> bool {
		let max = self.max();

		   point.x >= self.x && point.x < max.x
		&& point.y >= self.y && point.y < max.y
		&& point.z >= self.z && point.z < max.z
	}

	/// Returns true if `other` lies completely inside of this cuboid.
	pub fn contains_cuboid(&self, other: &Cuboid<T>) -> bool {
		let (max, other_max) = (self.max(), other.max());

		   other.x >= self.x && other_max.x <= max.x
		&& other.y >= self.y && other_max.y <= max.y
		&& other.z >= self.z && other_max.z <= max.z
	}

	pub fn intersects(&self, other: &Cuboid<T>) -> bool {
		let (max, other_max) = (self.max(), other.max());

		   self.x < other_max.x && other.x < max.x
		&& self.y < other_max.y && other.y < max.y
		&& self.z < other_max.z && other.z < max.z
	}

	/// Returns the overlapping part of both cuboids, or None if they don't intersect.
	pub fn intersection(first: &Cuboid<T>, second: &Cuboid<T>) -> Option<Cuboid<T>> {
		if !first.intersects(second) {
			return None;
		}

		fn larger<T: PartialOrd>(a: T, b: T) -> T { if a > b { a } else { b } }
		fn smaller<T: PartialOrd>(a: T, b: T) -> T { if a < b { a } else { b } }

		let (first_max, second_max) = (first.max(), second.max());

		let min = Vector3::new(
			larger(first.x, second.x),
			larger(first.y, second.y),
			larger(first.z, second.z)
		);

		let max = Vector3::new(
			smaller(first_max.x, second_max.x),
			smaller(first_max.y, second_max.y),
			smaller(first_max.z, second_max.z)
		);

		Some(Cuboid::from_bounds(min, max))
	}
}

#[cfg(test)]
mod test {
	use super::Cuboid;
	use cgmath::Vector3;

	#[test]
	fn test_default() {
		let cuboid = Cuboid::<f32>::default();

		assert_eq!(cuboid, Cuboid::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
	}

	#[test]
	fn test_contains() {
		let cuboid = Cuboid::new(1, 2, 3, 4, 5, 6);

		assert!(cuboid.contains(Vector3::new(1, 2, 3)));
		assert!(cuboid.contains(Vector3::new(4, 6, 8)));

		assert!(!cuboid.contains(Vector3::new(5, 2, 3)));
		assert!(!cuboid.contains(Vector3::new(1, 7, 3)));
		assert!(!cuboid.contains(Vector3::new(1, 2, 9)));
		assert!(!cuboid.contains(Vector3::new(0, 2, 3)));
	}

	#[test]
	fn test_contains_cuboid() {
		let outer = Cuboid::new(0, 0, 0, 10, 10, 10);

		assert!(outer.contains_cuboid(&outer));
		assert!(outer.contains_cuboid(&Cuboid::new(1, 2, 3, 4, 5, 6)));
		assert!(!outer.contains_cuboid(&Cuboid::new(5, 5, 5, 6, 1, 1)));
	}

	#[test]
	fn test_intersection() {
		let one = Cuboid::new(0.0, 0.0, 0.0, 10.0, 10.0, 10.0);

		// Fully covered.
		assert_eq!(
			Cuboid::intersection(&one, &Cuboid::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0)),
			Some(Cuboid::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0))
		);

		// Larger on a single axis.
		assert_eq!(
			Cuboid::intersection(&one, &Cuboid::new(-5.0, 1.0, 1.0, 20.0, 8.0, 8.0)),
			Some(Cuboid::new(0.0, 1.0, 1.0, 10.0, 8.0, 8.0))
		);
		assert_eq!(
			Cuboid::intersection(&one, &Cuboid::new(1.0, -5.0, 1.0, 8.0, 20.0, 8.0)),
			Some(Cuboid::new(1.0, 0.0, 1.0, 8.0, 10.0, 8.0))
		);
		assert_eq!(
			Cuboid::intersection(&one, &Cuboid::new(1.0, 1.0, -5.0, 8.0, 8.0, 20.0)),
			Some(Cuboid::new(1.0, 1.0, 0.0, 8.0, 8.0, 10.0))
		);

		// Same cuboid.
		assert_eq!(Cuboid::intersection(&one, &one), Some(one));

		// Touching faces only.
		assert_eq!(Cuboid::intersection(&one, &Cuboid::new(10.0, 0.0, 0.0, 5.0, 5.0, 5.0)), None);
	}

	#[test]
	fn test_empty_never_intersects() {
		let one = Cuboid::new(0, 0, 0, 4, 4, 4);
		let flat = Cuboid::new(1, 1, 1, 0, 2, 2);

		assert!(!one.intersects(&flat));
		assert!(!flat.intersects(&flat));
	}
}
