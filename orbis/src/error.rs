use crate::position::Coordinate;
use crate::world::EntityId;
use std::fmt::{self, Display, Formatter};

/// Failures reported by the checked entry points used by the session and scripting layers.
///
/// Precondition violations of the unchecked planet and lock operations are not represented here,
/// those are debug assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
	InvalidPlanetId,
	InvalidSize,
	DuplicatePlanet(String),
	UnknownPlanet(String),
	DuplicateClass(String),
	UnknownClass(String),
	UnknownEntity(EntityId),
	OutOfBounds(Coordinate),
	PlanetLocked(String)
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Error::InvalidPlanetId => write!(f, "planet id must not be empty"),
			Error::InvalidSize => write!(f, "planet and chunk sizes must be non-zero on every axis"),
			Error::DuplicatePlanet(id) => write!(f, "planet {} already exists", id),
			Error::UnknownPlanet(id) => write!(f, "unknown planet {}", id),
			Error::DuplicateClass(id) => write!(f, "class {} already exists", id),
			Error::UnknownClass(id) => write!(f, "unknown class {}", id),
			Error::UnknownEntity(id) => write!(f, "unknown entity #{}", id),
			Error::OutOfBounds(coord) => write!(f, "coordinate ({}, {}, {}) is outside of the planet", coord.x, coord.y, coord.z),
			Error::PlanetLocked(id) => write!(f, "planet {} is still locked", id)
		}
	}
}

impl std::error::Error for Error {}
