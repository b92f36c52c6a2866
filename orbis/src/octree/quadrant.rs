use cgmath::Vector3;

/// One of the eight children of an octree node.
///
/// The discriminant is bit coded: bit 0 is set on the right (+X) half, bit 1 on the near (+Z)
/// half, and bit 2 on the top (+Y) half.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
	LeftBottomFar   = 0,
	RightBottomFar  = 1,
	LeftBottomNear  = 2,
	RightBottomNear = 3,
	LeftTopFar      = 4,
	RightTopFar     = 5,
	LeftTopNear     = 6,
	RightTopNear    = 7
}

impl Quadrant {
	/// Every quadrant, in discriminant order.
	pub const ALL: [Quadrant; 8] = [
		Quadrant::LeftBottomFar,
		Quadrant::RightBottomFar,
		Quadrant::LeftBottomNear,
		Quadrant::RightBottomNear,
		Quadrant::LeftTopFar,
		Quadrant::RightTopFar,
		Quadrant::LeftTopNear,
		Quadrant::RightTopNear
	];

	pub fn from_index(index: u8) -> Option<Quadrant> {
		Quadrant::ALL.get(index as usize).copied()
	}

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn right(self) -> bool {
		(self as u8) & 1 != 0
	}

	pub fn near(self) -> bool {
		(self as u8) & 2 != 0
	}

	pub fn top(self) -> bool {
		(self as u8) & 4 != 0
	}

	/// Offset of the child's minimum corner from its parent's, given the child size.
	pub fn offset(self, child_size: u32) -> Vector3<u32> {
		Vector3::new(
			if self.right() { child_size } else { 0 },
			if self.top()   { child_size } else { 0 },
			if self.near()  { child_size } else { 0 }
		)
	}
}
