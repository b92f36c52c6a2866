use crate::class::{Class, ClassRef, ClassRegistry};
use crate::config::PlanetSettings;
use crate::error::Error;
use crate::lock::LockFacility;
use crate::position::Coordinate;
use crate::world::entity::{Entity, EntityId};
use crate::world::planet::Planet;
use rustc_hash::FxHashMap;
use spin::RwLock;
use std::sync::Arc;

/// A planet shared between threads. Readers and writers go through the `RwLock` guards.
pub type SharedPlanet = Arc<RwLock<Planet>>;

/// Global storage: planets, classes, entities, and which planet each entity is on.
///
/// Structural changes go through `&mut World`, so callers sharing a world wrap it themselves and
/// hold the world lock of the `LockFacility` while changing it.
#[derive(Debug)]
pub struct World {
	locks: Arc<LockFacility>,
	planets: FxHashMap<String, SharedPlanet>,
	classes: ClassRegistry,
	entities: FxHashMap<EntityId, Entity>,
	links: FxHashMap<EntityId, String>,
	next_entity_id: EntityId
}

impl World {
	pub fn new(locks: Arc<LockFacility>) -> Self {
		World {
			locks,
			planets: FxHashMap::default(),
			classes: ClassRegistry::new(),
			entities: FxHashMap::default(),
			links: FxHashMap::default(),
			next_entity_id: 0
		}
	}

	pub fn lock_facility(&self) -> &Arc<LockFacility> {
		&self.locks
	}

	// Planets

	pub fn num_planets(&self) -> usize {
		self.planets.len()
	}

	pub fn planets(&self) -> impl Iterator<Item=(&str, &SharedPlanet)> {
		self.planets.iter().map(|(id, planet)| (id.as_str(), planet))
	}

	pub fn find_planet(&self, id: &str) -> Option<SharedPlanet> {
		self.planets.get(id).cloned()
	}

	/// Creates a planet and registers its lock.
	///
	/// A lock left behind by a wipe while it was held is taken over once released; while it is
	/// still held, the planet is refused with `Error::PlanetLocked`.
	pub fn create_planet(&mut self, id: &str, settings: &PlanetSettings) -> Result<SharedPlanet, Error> {
		if self.planets.contains_key(id) {
			return Err(Error::DuplicatePlanet(id.to_owned()));
		}

		let planet = Arc::new(RwLock::new(Planet::new(id, settings)?));

		if !self.locks.has_planet_lock(id) {
			self.locks.create_planet_lock(id);
		} else if self.locks.is_planet_locked(id) {
			return Err(Error::PlanetLocked(id.to_owned()));
		} else {
			log::debug!("World: reusing the lock left behind for planet {}", id);
		}

		self.planets.insert(id.to_owned(), planet.clone());

		log::debug!("World: created planet {} ({:?} chunks of {:?})", id, settings.size, settings.chunk_size);

		Ok(planet)
	}

	/// Destroys a planet, unlinking every entity on it and deregistering its lock. Refused while
	/// the planet's lock is held.
	pub fn destroy_planet(&mut self, id: &str) -> Result<(), Error> {
		if !self.planets.contains_key(id) {
			return Err(Error::UnknownPlanet(id.to_owned()));
		}

		if !self.locks.try_destroy_planet_lock(id) {
			return Err(Error::PlanetLocked(id.to_owned()));
		}

		self.links.retain(|_, planet| planet != id);
		self.planets.remove(id);

		log::debug!("World: destroyed planet {}", id);

		Ok(())
	}

	// Classes

	pub fn add_class(&mut self, class: Class) -> Result<ClassRef, Error> {
		self.classes.add(class)
	}

	pub fn find_class(&self, id: &str) -> Option<ClassRef> {
		self.classes.find(id)
	}

	/// ### Panics
	/// If the handle was not handed out by this world, or the world was wiped since.
	pub fn class(&self, class: ClassRef) -> &Class {
		self.classes.get(class)
	}

	pub fn classes(&self) -> &ClassRegistry {
		&self.classes
	}

	pub fn num_classes(&self) -> usize {
		self.classes.len()
	}

	// Entities

	pub fn num_entities(&self) -> usize {
		self.entities.len()
	}

	/// Creates an entity of the class at the origin, not linked to any planet.
	pub fn create_entity(&mut self, class_id: &str) -> Result<EntityId, Error> {
		let class = self.classes.find(class_id).ok_or_else(|| Error::UnknownClass(class_id.to_owned()))?;

		let id = self.next_entity_id;
		self.next_entity_id += 1;

		self.entities.insert(id, Entity::new(id, class));

		Ok(id)
	}

	pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
		self.entities.get(&id)
	}

	/// Position changes made through this are not seen by the planet's spatial index; use
	/// `move_entity` for those.
	pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
		self.entities.get_mut(&id)
	}

	/// Deletes an entity, unlinking it from its planet first.
	pub fn delete_entity(&mut self, id: EntityId) -> Result<(), Error> {
		if !self.entities.contains_key(&id) {
			return Err(Error::UnknownEntity(id));
		}

		self.detach(id);
		self.entities.remove(&id);

		Ok(())
	}

	/// Moves an entity, re-indexing it on its planet if it is linked to one.
	pub fn move_entity(&mut self, id: EntityId, position: Coordinate) -> Result<(), Error> {
		let entity = self.entities.get_mut(&id).ok_or(Error::UnknownEntity(id))?;
		entity.set_position(position);

		let planets = &self.planets;

		if let Some(planet) = self.links.get(&id).and_then(|planet| planets.get(planet)) {
			planet.write().update_entity(entity, self.classes.get(entity.class()));
		}

		Ok(())
	}

	// Links

	/// Puts an entity on a planet, taking it off the planet it was on before.
	pub fn link_entity_to_planet(&mut self, entity: EntityId, planet: &str) -> Result<(), Error> {
		if !self.entities.contains_key(&entity) {
			return Err(Error::UnknownEntity(entity));
		}

		if !self.planets.contains_key(planet) {
			return Err(Error::UnknownPlanet(planet.to_owned()));
		}

		self.detach(entity);
		self.links.insert(entity, planet.to_owned());

		if let (Some(shared), Some(entity)) = (self.planets.get(planet), self.entities.get(&entity)) {
			shared.write().add_entity(entity, self.classes.get(entity.class()));
		}

		Ok(())
	}

	pub fn find_linked_planet(&self, entity: EntityId) -> Option<&str> {
		self.links.get(&entity).map(String::as_str)
	}

	/// Takes an entity off its planet. Returns false if it wasn't linked.
	pub fn unlink_entity_from_planet(&mut self, entity: EntityId) -> bool {
		self.detach(entity)
	}

	fn detach(&mut self, entity: EntityId) -> bool {
		let planet = match self.links.remove(&entity) {
			Some(planet) => planet,
			None => return false
		};

		if let Some(shared) = self.planets.get(&planet) {
			shared.write().remove_entity(entity);
		}

		true
	}

	/// Drops every planet, entity and class, deregistering the planet locks.
	///
	/// Locks of planets that are still held stay registered, and are taken over by `create_planet`
	/// once released.
	pub fn wipe(&mut self) {
		for id in self.planets.keys() {
			if !self.locks.try_destroy_planet_lock(id) {
				log::warn!("World: planet {} is still locked while wiping, leaving its lock registered", id);
			}
		}

		self.planets.clear();
		self.entities.clear();
		self.links.clear();
		self.classes.clear();
	}
}

impl Drop for World {
	fn drop(&mut self) {
		self.wipe();
	}
}

#[cfg(test)]
mod test {
	use super::World;
	use crate::class::Class;
	use crate::config::PlanetSettings;
	use crate::cuboid::Cuboid;
	use crate::error::Error;
	use crate::lock::LockFacility;
	use cgmath::Vector3;
	use rayon::prelude::*;
	use std::sync::{mpsc, Arc};
	use std::thread;

	fn init_logging() {
		let _ = env_logger::builder().is_test(true).try_init();
	}

	fn world() -> World {
		init_logging();

		let mut world = World::new(Arc::new(LockFacility::new()));
		let settings = PlanetSettings::new(Vector3::new(2, 1, 2), Vector3::new(16, 16, 16));

		world.create_planet("earth", &settings).unwrap();
		world.create_planet("mars", &settings).unwrap();
		world.add_class(Class::new("fw.base/crate")).unwrap();

		world
	}

	fn entities_on(world: &World, planet: &str) -> Vec<u32> {
		let planet = world.find_planet(planet).unwrap();
		let planet = planet.read();

		let mut results = Vec::new();
		planet.search_entities(&Cuboid::new(0.0, 0.0, 0.0, 32.0, 16.0, 32.0), &mut results);

		assert_eq!(results.len(), planet.num_entities());
		results
	}

	#[test]
	fn test_planets() {
		let mut world = world();

		assert_eq!(world.num_planets(), 2);
		assert_eq!(world.lock_facility().num_planet_locks(), 2);
		assert_eq!(world.find_planet("earth").unwrap().read().id(), "earth");
		assert!(world.find_planet("venus").is_none());

		let mut ids: Vec<_> = world.planets().map(|(id, _)| id.to_owned()).collect();
		ids.sort();
		assert_eq!(ids, vec!["earth", "mars"]);

		assert_eq!(
			world.create_planet("earth", &PlanetSettings::default()).err(),
			Some(Error::DuplicatePlanet("earth".to_owned()))
		);
		assert_eq!(world.create_planet("", &PlanetSettings::default()).err(), Some(Error::InvalidPlanetId));
		assert_eq!(world.num_planets(), 2);
		assert_eq!(world.lock_facility().num_planet_locks(), 2);
	}

	#[test]
	fn test_destroy_planet() {
		let mut world = world();
		let entity = world.create_entity("fw.base/crate").unwrap();
		world.link_entity_to_planet(entity, "mars").unwrap();

		world.lock_facility().lock_planet("mars", true);
		assert_eq!(world.destroy_planet("mars"), Err(Error::PlanetLocked("mars".to_owned())));

		world.lock_facility().lock_planet("mars", false);
		assert_eq!(world.destroy_planet("mars"), Ok(()));

		assert_eq!(world.num_planets(), 1);
		assert_eq!(world.lock_facility().num_planet_locks(), 1);
		assert_eq!(world.find_linked_planet(entity), None);
		assert!(world.find_entity(entity).is_some());

		assert_eq!(world.destroy_planet("mars"), Err(Error::UnknownPlanet("mars".to_owned())));
	}

	#[test]
	fn test_classes() {
		let mut world = world();

		let stone = world.add_class(Class::new("fw.base/stone")).unwrap();

		assert_eq!(world.num_classes(), 2);
		assert_eq!(world.find_class("fw.base/stone"), Some(stone));
		assert_eq!(world.class(stone).id(), "fw.base/stone");
		assert_eq!(world.add_class(Class::new("fw.base/stone")), Err(Error::DuplicateClass("fw.base/stone".to_owned())));
	}

	#[test]
	fn test_entities() {
		let mut world = world();

		assert_eq!(world.create_entity("fw.base/crate"), Ok(0));
		assert_eq!(world.create_entity("fw.base/crate"), Ok(1));
		assert_eq!(world.create_entity("fw.base/nothing"), Err(Error::UnknownClass("fw.base/nothing".to_owned())));
		assert_eq!(world.num_entities(), 2);

		world.find_entity_mut(1).unwrap().set_name("Loot");
		assert_eq!(world.find_entity(1).unwrap().name(), Some("Loot"));

		assert_eq!(world.delete_entity(0), Ok(()));
		assert_eq!(world.delete_entity(0), Err(Error::UnknownEntity(0)));
		assert!(world.find_entity(0).is_none());

		// Ids are never reused.
		assert_eq!(world.create_entity("fw.base/crate"), Ok(2));
	}

	#[test]
	fn test_links() {
		let mut world = world();
		let first = world.create_entity("fw.base/crate").unwrap();
		let second = world.create_entity("fw.base/crate").unwrap();

		world.link_entity_to_planet(first, "earth").unwrap();
		world.link_entity_to_planet(second, "earth").unwrap();
		assert_eq!(world.find_linked_planet(first), Some("earth"));
		assert_eq!(entities_on(&world, "earth").len(), 2);

		// Relinking moves the entity.
		world.link_entity_to_planet(first, "mars").unwrap();
		assert_eq!(world.find_linked_planet(first), Some("mars"));
		assert_eq!(entities_on(&world, "earth"), vec![second]);
		assert_eq!(entities_on(&world, "mars"), vec![first]);

		assert!(world.unlink_entity_from_planet(first));
		assert!(!world.unlink_entity_from_planet(first));
		assert_eq!(world.find_linked_planet(first), None);
		assert!(entities_on(&world, "mars").is_empty());

		world.delete_entity(second).unwrap();
		assert!(entities_on(&world, "earth").is_empty());

		assert_eq!(world.link_entity_to_planet(second, "earth"), Err(Error::UnknownEntity(second)));
		assert_eq!(world.link_entity_to_planet(first, "venus"), Err(Error::UnknownPlanet("venus".to_owned())));
	}

	#[test]
	fn test_move_entity() {
		let mut world = world();
		let entity = world.create_entity("fw.base/crate").unwrap();

		world.link_entity_to_planet(entity, "earth").unwrap();
		world.move_entity(entity, Vector3::new(20.0, 5.0, 20.0)).unwrap();

		assert_eq!(world.find_entity(entity).unwrap().position(), Vector3::new(20.0, 5.0, 20.0));

		let planet = world.find_planet("earth").unwrap();
		let mut results = Vec::new();

		planet.read().search_entities(&Cuboid::new(0.0, 0.0, 0.0, 4.0, 4.0, 4.0), &mut results);
		assert!(results.is_empty());

		planet.read().search_entities(&Cuboid::new(20.0, 5.0, 20.0, 1.0, 1.0, 1.0), &mut results);
		assert_eq!(results, vec![entity]);

		assert_eq!(world.move_entity(99, Vector3::new(0.0, 0.0, 0.0)), Err(Error::UnknownEntity(99)));
	}

	#[test]
	fn test_wipe() {
		let mut world = world();
		let locks = world.lock_facility().clone();
		let entity = world.create_entity("fw.base/crate").unwrap();
		world.link_entity_to_planet(entity, "earth").unwrap();

		world.wipe();

		assert_eq!(world.num_planets(), 0);
		assert_eq!(world.num_entities(), 0);
		assert_eq!(world.num_classes(), 0);
		assert_eq!(world.find_linked_planet(entity), None);
		assert_eq!(locks.num_planet_locks(), 0);
	}

	#[test]
	fn test_recreate_after_locked_wipe() {
		let mut world = world();
		let locks = world.lock_facility().clone();

		locks.lock_planet("earth", true);
		world.wipe();
		assert_eq!(locks.num_planet_locks(), 1);

		assert_eq!(
			world.create_planet("earth", &PlanetSettings::default()).err(),
			Some(Error::PlanetLocked("earth".to_owned()))
		);
		assert_eq!(world.num_planets(), 0);

		locks.lock_planet("earth", false);
		assert!(world.create_planet("earth", &PlanetSettings::default()).is_ok());
		assert_eq!(locks.num_planet_locks(), 1);

		assert_eq!(world.destroy_planet("earth"), Ok(()));
		assert_eq!(locks.num_planet_locks(), 0);
	}

	#[test]
	fn test_destroy_planet_locked_elsewhere() {
		let mut world = world();
		let locks = world.lock_facility().clone();

		let (locked, on_locked) = mpsc::channel();
		let (release, on_release) = mpsc::channel::<()>();

		let holder = {
			let locks = locks.clone();

			thread::spawn(move || {
				let _guard = locks.acquire_planet("mars").unwrap();
				locked.send(()).unwrap();
				on_release.recv().unwrap();
			})
		};

		on_locked.recv().unwrap();
		assert_eq!(world.destroy_planet("mars"), Err(Error::PlanetLocked("mars".to_owned())));
		assert!(world.find_planet("mars").is_some());
		assert_eq!(locks.num_planet_locks(), 2);

		release.send(()).unwrap();
		holder.join().unwrap();

		assert_eq!(world.destroy_planet("mars"), Ok(()));
		assert!(world.find_planet("mars").is_none());
	}

	#[test]
	fn test_drop_deregisters_locks() {
		let locks = {
			let world = world();
			world.lock_facility().clone()
		};

		assert_eq!(locks.num_planet_locks(), 0);
	}

	#[test]
	fn test_parallel_block_edits() {
		let world = world();
		let class = world.find_class("fw.base/crate").unwrap();
		let locks = world.lock_facility();
		let planet = world.find_planet("earth").unwrap();

		(0..32u32).into_par_iter().for_each(|x| {
			let _guard = locks.acquire_planet("earth").unwrap();

			for z in 0..32 {
				let coordinate = Vector3::new(x as f32, 0.0, z as f32);
				planet.write().set_block_at(coordinate, class).unwrap();
			}
		});

		let planet = planet.read();

		assert_eq!(planet.num_chunks(), 4);
		assert_eq!(planet.class_cache().use_count(class), 32 * 32);
		assert_eq!(planet.chunks().map(|(_, chunk)| chunk.num_set_blocks()).sum::<usize>(), 32 * 32);
	}
}
