//! Process wide locks for the world, the account manager, and every planet.
//!
//! Every lock is a `RefLock`: recursive for the thread holding it, exclusive against all others.
//! Locks can be taken with explicit `lock_*(true)` / `lock_*(false)` pairs, for ownership that
//! spans several calls, or through the `acquire_*` guards that release on drop.
//!
//! Callers needing both the world and a planet lock must take the world lock first.

mod reflock;

pub use self::reflock::{RefLock, RefLockGuard};

use rustc_hash::FxHashMap;
use spin::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug)]
pub struct LockFacility {
	world: RefLock,
	account_manager: RefLock,
	planets: Mutex<FxHashMap<String, Arc<RefLock>>>
}

impl LockFacility {
	pub fn new() -> Self {
		LockFacility {
			world: RefLock::new(),
			account_manager: RefLock::new(),
			planets: Mutex::new(FxHashMap::default())
		}
	}

	pub fn lock_world(&self, acquire: bool) {
		Self::set_locked(&self.world, acquire);
	}

	pub fn lock_account_manager(&self, acquire: bool) {
		Self::set_locked(&self.account_manager, acquire);
	}

	pub fn is_world_locked(&self) -> bool {
		self.world.is_locked()
	}

	pub fn is_account_manager_locked(&self) -> bool {
		self.account_manager.is_locked()
	}

	pub fn acquire_world(&self) -> RefLockGuard {
		self.world.guard()
	}

	pub fn acquire_account_manager(&self) -> RefLockGuard {
		self.account_manager.guard()
	}

	/// Registers the lock of a planet. Registering a planet twice keeps the existing lock.
	pub fn create_planet_lock(&self, planet: &str) {
		let mut planets = self.planets.lock();

		if planets.contains_key(planet) {
			debug_assert!(false, "lock for planet {} already exists", planet);
			log::warn!("LockFacility: lock for planet {} already exists", planet);
			return;
		}

		log::debug!("LockFacility: created lock for planet {}", planet);
		planets.insert(planet.to_owned(), Arc::new(RefLock::new()));
	}

	/// Removes the lock of a planet. A lock that is still held is kept, and false is returned.
	pub fn destroy_planet_lock(&self, planet: &str) -> bool {
		let mut planets = self.planets.lock();

		let held = match planets.get(planet) {
			Some(lock) => lock.is_locked(),
			None => {
				debug_assert!(false, "destroying lock for unknown planet {}", planet);
				log::warn!("LockFacility: no lock for planet {}", planet);

				return false;
			}
		};

		if held {
			debug_assert!(false, "destroying lock for planet {} while it is held", planet);
			log::error!("LockFacility: lock for planet {} is still held, not destroying it", planet);

			return false;
		}

		planets.remove(planet);
		log::debug!("LockFacility: destroyed lock for planet {}", planet);

		true
	}

	/// Removes the lock of a planet unless it is held, checking and removing under one registry
	/// lock. Returns false only if the lock is held; a planet without lock counts as removed.
	pub fn try_destroy_planet_lock(&self, planet: &str) -> bool {
		let mut planets = self.planets.lock();

		if planets.get(planet).map(|lock| lock.is_locked()).unwrap_or(false) {
			return false;
		}

		if planets.remove(planet).is_some() {
			log::debug!("LockFacility: destroyed lock for planet {}", planet);
		}

		true
	}

	pub fn has_planet_lock(&self, planet: &str) -> bool {
		self.planets.lock().contains_key(planet)
	}

	/// Locks or unlocks a planet. The planet lock must have been created.
	pub fn lock_planet(&self, planet: &str, acquire: bool) {
		match self.planet_lock(planet) {
			Some(lock) => Self::set_locked(&lock, acquire),
			None => {
				debug_assert!(false, "locking unknown planet {}", planet);
				log::error!("LockFacility: lock_planet({}, {}) on a planet without lock", planet, acquire);
			}
		}
	}

	/// Locks a planet until the guard is dropped. Returns None if the planet has no lock.
	pub fn acquire_planet(&self, planet: &str) -> Option<PlanetLockGuard> {
		let lock = self.planet_lock(planet)?;
		lock.lock();

		Some(PlanetLockGuard { lock, _not_send: PhantomData })
	}

	/// Returns false for planets without a lock.
	pub fn is_planet_locked(&self, planet: &str) -> bool {
		self.planets.lock().get(planet).map(|lock| lock.is_locked()).unwrap_or(false)
	}

	pub fn num_planet_locks(&self) -> usize {
		self.planets.lock().len()
	}

	/// Number of planets whose lock is currently held.
	pub fn num_locked_planets(&self) -> usize {
		self.planets.lock().values().filter(|lock| lock.is_locked()).count()
	}

	/// The registry guard is released before the returned lock is waited on.
	fn planet_lock(&self, planet: &str) -> Option<Arc<RefLock>> {
		self.planets.lock().get(planet).cloned()
	}

	fn set_locked(lock: &RefLock, acquire: bool) {
		if acquire {
			lock.lock();
		} else {
			lock.unlock();
		}
	}
}

impl Default for LockFacility {
	fn default() -> Self {
		LockFacility::new()
	}
}

impl Drop for LockFacility {
	fn drop(&mut self) {
		if self.world.is_locked() {
			log::warn!("LockFacility: dropped while the world is locked");
		}

		if self.account_manager.is_locked() {
			log::warn!("LockFacility: dropped while the account manager is locked");
		}

		let planets = self.planets.lock();

		if !planets.is_empty() {
			log::warn!("LockFacility: dropped with {} planet lock(s) still registered", planets.len());
		}

		for (planet, lock) in planets.iter().filter(|(_, lock)| lock.is_locked()) {
			log::warn!("LockFacility: planet {} is still locked ({} uses)", planet, lock.usage_count());
		}
	}
}

/// Holds a planet lock until dropped. Keeps working if the planet's lock is destroyed meanwhile,
/// although destroying a held lock is refused anyway.
///
/// The guard stays on the thread that locked:
///
/// ```compile_fail
/// use orbis::LockFacility;
/// use std::thread;
///
/// let locks = LockFacility::new();
/// locks.create_planet_lock("earth");
///
/// let guard = locks.acquire_planet("earth").unwrap();
/// thread::spawn(move || drop(guard)).join().unwrap();
/// ```
#[derive(Debug)]
pub struct PlanetLockGuard {
	lock: Arc<RefLock>,
	_not_send: PhantomData<*const ()>
}

impl Drop for PlanetLockGuard {
	fn drop(&mut self) {
		self.lock.unlock();
	}
}

#[cfg(test)]
mod test {
	use super::LockFacility;
	use rayon::prelude::*;
	use std::sync::{mpsc, Arc};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::thread;

	fn init_logging() {
		let _ = env_logger::builder().is_test(true).try_init();
	}

	#[test]
	fn test_initial_state() {
		init_logging();
		let locks = LockFacility::new();

		assert!(!locks.is_world_locked());
		assert!(!locks.is_account_manager_locked());
		assert_eq!(locks.num_planet_locks(), 0);
		assert_eq!(locks.num_locked_planets(), 0);
	}

	#[test]
	fn test_world_is_counted() {
		init_logging();
		let locks = LockFacility::new();

		locks.lock_world(true);
		locks.lock_world(true);
		assert!(locks.is_world_locked());

		locks.lock_world(false);
		assert!(locks.is_world_locked());

		locks.lock_world(false);
		assert!(!locks.is_world_locked());
	}

	#[test]
	fn test_account_manager() {
		init_logging();
		let locks = LockFacility::new();

		{
			let _guard = locks.acquire_account_manager();
			assert!(locks.is_account_manager_locked());
			assert!(!locks.is_world_locked());
		}

		assert!(!locks.is_account_manager_locked());
	}

	#[test]
	fn test_planet_locks() {
		init_logging();
		let locks = LockFacility::new();

		locks.create_planet_lock("earth");
		locks.create_planet_lock("mars");
		assert_eq!(locks.num_planet_locks(), 2);
		assert!(!locks.is_planet_locked("earth"));

		locks.lock_planet("earth", true);
		locks.lock_planet("earth", true);
		assert!(locks.is_planet_locked("earth"));
		assert!(!locks.is_planet_locked("mars"));
		assert_eq!(locks.num_locked_planets(), 1);

		locks.lock_planet("mars", true);
		assert_eq!(locks.num_locked_planets(), 2);

		locks.lock_planet("earth", false);
		locks.lock_planet("earth", false);
		locks.lock_planet("mars", false);
		assert_eq!(locks.num_locked_planets(), 0);

		assert!(locks.destroy_planet_lock("earth"));
		assert_eq!(locks.num_planet_locks(), 1);
		assert!(!locks.is_planet_locked("earth"));

		assert!(locks.destroy_planet_lock("mars"));
		assert_eq!(locks.num_planet_locks(), 0);
	}

	#[test]
	fn test_try_destroy_planet_lock() {
		init_logging();
		let locks = Arc::new(LockFacility::new());
		locks.create_planet_lock("earth");

		let holder = locks.clone();
		let (locked, on_locked) = mpsc::channel();
		let (release, on_release) = mpsc::channel::<()>();

		let handle = thread::spawn(move || {
			let _guard = holder.acquire_planet("earth").unwrap();
			locked.send(()).unwrap();
			on_release.recv().unwrap();
		});

		on_locked.recv().unwrap();
		assert!(!locks.try_destroy_planet_lock("earth"));
		assert!(locks.has_planet_lock("earth"));

		release.send(()).unwrap();
		handle.join().unwrap();

		assert!(locks.try_destroy_planet_lock("earth"));
		assert!(!locks.has_planet_lock("earth"));
		assert!(locks.try_destroy_planet_lock("earth"));
	}

	#[test]
	fn test_planet_guard() {
		init_logging();
		let locks = LockFacility::new();

		assert!(locks.acquire_planet("earth").is_none());

		locks.create_planet_lock("earth");

		{
			let _outer = locks.acquire_planet("earth").unwrap();
			let _inner = locks.acquire_planet("earth").unwrap();

			assert!(locks.is_planet_locked("earth"));
			assert_eq!(locks.num_locked_planets(), 1);
		}

		assert!(!locks.is_planet_locked("earth"));
		assert!(locks.destroy_planet_lock("earth"));
	}

	#[test]
	fn test_world_then_planet() {
		init_logging();
		let locks = LockFacility::new();
		locks.create_planet_lock("earth");

		let world = locks.acquire_world();
		let planet = locks.acquire_planet("earth").unwrap();

		assert!(locks.is_world_locked());
		assert!(locks.is_planet_locked("earth"));

		drop(planet);
		drop(world);

		assert!(!locks.is_world_locked());
		assert!(locks.destroy_planet_lock("earth"));
	}

	#[test]
	fn test_held_by_other_thread() {
		init_logging();
		let locks = Arc::new(LockFacility::new());
		locks.create_planet_lock("earth");

		locks.lock_planet("earth", true);

		let observer = locks.clone();
		let seen = thread::spawn(move || observer.is_planet_locked("earth")).join().unwrap();
		assert!(seen);

		locks.lock_planet("earth", false);
		assert!(locks.destroy_planet_lock("earth"));
	}

	#[test]
	fn test_world_lock_excludes_workers() {
		init_logging();
		let locks = LockFacility::new();
		let inside = AtomicUsize::new(0);
		let entered = AtomicUsize::new(0);

		(0..64).into_par_iter().for_each(|_| {
			let _world = locks.acquire_world();

			assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
			thread::yield_now();
			inside.fetch_sub(1, Ordering::SeqCst);

			entered.fetch_add(1, Ordering::SeqCst);
		});

		assert_eq!(entered.load(Ordering::SeqCst), 64);
		assert!(!locks.is_world_locked());
	}

	#[test]
	fn test_planet_locks_are_independent() {
		init_logging();
		let locks = LockFacility::new();
		let planets = ["earth", "mars", "venus"];

		for planet in &planets {
			locks.create_planet_lock(planet);
		}

		let inside: Vec<AtomicUsize> = planets.iter().map(|_| AtomicUsize::new(0)).collect();

		(0..96usize).into_par_iter().for_each(|task| {
			let index = task % planets.len();
			let _planet = locks.acquire_planet(planets[index]).unwrap();

			// Recursive locking from the owning thread never waits.
			locks.lock_planet(planets[index], true);

			assert_eq!(inside[index].fetch_add(1, Ordering::SeqCst), 0);
			thread::yield_now();
			inside[index].fetch_sub(1, Ordering::SeqCst);

			locks.lock_planet(planets[index], false);
		});

		assert_eq!(locks.num_locked_planets(), 0);

		for planet in &planets {
			assert!(locks.destroy_planet_lock(planet));
		}
	}
}
