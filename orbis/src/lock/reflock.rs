use spin::Mutex;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
struct State {
	owner: Option<ThreadId>,
	usage: usize
}

/// A recursive lock owned by a single thread at a time.
///
/// The owning thread may lock it any number of times and must unlock it as often; other threads
/// spin until the usage count drops back to zero. Unlike a guard based mutex, the lock protects
/// no data of its own and can be held across calls.
#[derive(Debug)]
pub struct RefLock {
	state: Mutex<State>
}

impl RefLock {
	pub fn new() -> Self {
		RefLock {
			state: Mutex::new(State::default())
		}
	}

	/// Locks, spinning while another thread holds the lock.
	pub fn lock(&self) {
		let current = thread::current().id();

		while !self.try_lock_as(current) {
			thread::yield_now();
		}
	}

	/// Locks if the lock is free or already held by this thread.
	pub fn try_lock(&self) -> bool {
		self.try_lock_as(thread::current().id())
	}

	fn try_lock_as(&self, current: ThreadId) -> bool {
		let mut state = self.state.lock();

		match state.owner {
			Some(owner) if owner != current => false,
			_ => {
				state.owner = Some(current);
				state.usage += 1;

				true
			}
		}
	}

	/// Undoes one `lock`. Only the owning thread may unlock; anything else is ignored in release
	/// builds.
	pub fn unlock(&self) {
		let current = thread::current().id();
		let mut state = self.state.lock();

		if state.owner != Some(current) {
			debug_assert!(false, "unlocking a RefLock not held by this thread");
			log::error!("RefLock: unlock from a thread that does not hold the lock ({:?}), ignoring", state.owner);
			return;
		}

		state.usage -= 1;

		if state.usage == 0 {
			state.owner = None;
		}
	}

	/// Locks and returns a guard that unlocks on drop.
	pub fn guard(&self) -> RefLockGuard {
		self.lock();

		RefLockGuard { lock: self, _not_send: PhantomData }
	}

	pub fn usage_count(&self) -> usize {
		self.state.lock().usage
	}

	pub fn is_locked(&self) -> bool {
		self.state.lock().owner.is_some()
	}

	pub fn is_held_by_current_thread(&self) -> bool {
		self.state.lock().owner == Some(thread::current().id())
	}
}

impl Default for RefLock {
	fn default() -> Self {
		RefLock::new()
	}
}

/// Unlocks on drop. Only the locking thread may unlock, so the guard cannot leave it:
///
/// ```compile_fail
/// use orbis::RefLock;
/// use std::thread;
///
/// let lock: &'static RefLock = Box::leak(Box::new(RefLock::new()));
/// let guard = lock.guard();
///
/// thread::spawn(move || drop(guard));
/// ```
#[derive(Debug)]
pub struct RefLockGuard<'l> {
	lock: &'l RefLock,
	_not_send: PhantomData<*const ()>
}

impl<'l> Drop for RefLockGuard<'l> {
	fn drop(&mut self) {
		self.lock.unlock();
	}
}
