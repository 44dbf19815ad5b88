//! Mark-and-sweep garbage collection system.
//!
//! The heap owns every allocated object. `Gc<T>` handles are cheap reference
//! counted pointers with identity equality; `WeakGc<T>` is a non-owning link
//! (used for prototypes and movie parents). Objects stay alive while they are
//! reachable from a `Guard` root through `Traceable` edges. Collection only
//! runs when the host asks for it, never in the middle of executing actions.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use rustc_hash::{FxHashMap, FxHashSet};

// ============================================================================
// Traceable / Reset
// ============================================================================

/// Trait for types that can be traced by the garbage collector.
///
/// Implementations call `visitor` for every `Gc<Self>` they hold, including
/// upgraded weak links that should keep their target reachable.
pub trait Traceable: Sized + Reset {
    fn trace<F: FnMut(&Gc<Self>)>(&self, visitor: F);
}

/// Trait for types that can drop all their outgoing references.
///
/// The sweep phase resets every unreachable object before releasing it, which
/// breaks reference cycles between collected objects.
pub trait Reset {
    fn reset(&mut self);
}

// ============================================================================
// GcBox / Gc / WeakGc
// ============================================================================

/// Internal storage for a GC-managed object.
pub struct GcBox<T> {
    id: usize,
    data: RefCell<T>,
    /// Cleared when the sweep phase releases the object
    live: Cell<bool>,
}

/// A smart pointer to a GC-managed object.
pub struct Gc<T: Traceable> {
    inner: Rc<GcBox<T>>,
}

impl<T: Traceable> Gc<T> {
    /// Borrow the inner data immutably
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.data.borrow()
    }

    /// Borrow the inner data mutably
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.data.borrow_mut()
    }

    /// Borrow immutably unless the object is currently borrowed mutably
    pub fn try_borrow(&self) -> Option<Ref<'_, T>> {
        self.inner.data.try_borrow().ok()
    }

    /// Unique object id, stable for the object's lifetime
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Check if two Gc pointers point to the same object
    pub fn ptr_eq(a: &Gc<T>, b: &Gc<T>) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Create a non-owning link to this object
    pub fn downgrade(&self) -> WeakGc<T> {
        WeakGc {
            id: self.inner.id,
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// False once the collector has released the object
    pub fn is_live(&self) -> bool {
        self.inner.live.get()
    }
}

impl<T: Traceable> Clone for Gc<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Traceable> PartialEq for Gc<T> {
    fn eq(&self, other: &Self) -> bool {
        Gc::ptr_eq(self, other)
    }
}

impl<T: Traceable> Eq for Gc<T> {}

impl<T: Traceable> std::hash::Hash for Gc<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<T: Traceable> std::fmt::Debug for Gc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gc").field("id", &self.inner.id).finish()
    }
}

/// A non-owning link to a GC-managed object.
pub struct WeakGc<T: Traceable> {
    id: usize,
    inner: Weak<GcBox<T>>,
}

impl<T: Traceable> WeakGc<T> {
    /// Get a strong handle if the object is still alive
    pub fn upgrade(&self) -> Option<Gc<T>> {
        let inner = self.inner.upgrade()?;
        if inner.live.get() {
            Some(Gc { inner })
        } else {
            None
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl<T: Traceable> Clone for WeakGc<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Traceable> std::fmt::Debug for WeakGc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakGc").field("id", &self.id).finish()
    }
}

// ============================================================================
// Space - the internal memory arena
// ============================================================================

struct Space<T: Traceable> {
    /// Every live allocation, owned by the heap
    objects: Vec<Gc<T>>,
    /// Root sets, one per live guard
    roots: FxHashMap<usize, Vec<Gc<T>>>,
    next_object_id: usize,
    next_guard_id: usize,
    collections: usize,
    last_collected: usize,
}

impl<T: Traceable> Space<T> {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
            roots: FxHashMap::default(),
            next_object_id: 0,
            next_guard_id: 0,
            collections: 0,
            last_collected: 0,
        }
    }

    fn alloc(&mut self, data: T) -> Gc<T> {
        let id = self.next_object_id;
        self.next_object_id += 1;
        let gc = Gc {
            inner: Rc::new(GcBox {
                id,
                data: RefCell::new(data),
                live: Cell::new(true),
            }),
        };
        self.objects.push(gc.clone());
        gc
    }

    /// Mark phase: trace from the guard roots to find all reachable objects
    fn mark(&self) -> FxHashSet<usize> {
        let mut marked = FxHashSet::default();
        let mut stack: Vec<Gc<T>> = self.roots.values().flatten().cloned().collect();

        while let Some(obj) = stack.pop() {
            if !marked.insert(obj.id()) {
                continue;
            }
            // An object borrowed mutably right now is being worked on by the
            // host, so it is live; its children were marked through other paths
            // or will be on the next cycle.
            let Ok(data) = obj.inner.data.try_borrow() else {
                continue;
            };
            data.trace(|child| {
                if !marked.contains(&child.id()) {
                    stack.push(child.clone());
                }
            });
        }
        marked
    }

    /// Sweep phase: release every unmarked object. Returns the number released.
    fn sweep(&mut self, marked: &FxHashSet<usize>) -> usize {
        let (live, dead): (Vec<Gc<T>>, Vec<Gc<T>>) = std::mem::take(&mut self.objects)
            .into_iter()
            .partition(|obj| marked.contains(&obj.id()));
        self.objects = live;

        // Reset everything first so cycles between dead objects are broken
        // before the handles are dropped.
        for obj in &dead {
            obj.inner.live.set(false);
            if let Ok(mut data) = obj.inner.data.try_borrow_mut() {
                data.reset();
            }
        }
        dead.len()
    }

    fn collect(&mut self) -> usize {
        let marked = self.mark();
        let collected = self.sweep(&marked);
        self.collections += 1;
        self.last_collected = collected;
        collected
    }

    fn stats(&self) -> GcStats {
        GcStats {
            live_objects: self.objects.len(),
            rooted_objects: self.roots.values().map(Vec::len).sum(),
            guards: self.roots.len(),
            collections: self.collections,
            last_collected: self.last_collected,
        }
    }
}

// ============================================================================
// Heap - the public wrapper
// ============================================================================

/// The public entry point for allocating and collecting objects.
pub struct Heap<T: Traceable> {
    inner: Rc<RefCell<Space<T>>>,
}

impl<T: Traceable> Heap<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Space::new())),
        }
    }

    /// Allocate an object without rooting it.
    ///
    /// The object survives a collection only if it is reachable from a root
    /// by then.
    pub fn alloc(&self, data: T) -> Gc<T> {
        self.inner.borrow_mut().alloc(data)
    }

    /// Create a new root set
    pub fn create_guard(&self) -> Guard<T> {
        let mut space = self.inner.borrow_mut();
        let id = space.next_guard_id;
        space.next_guard_id += 1;
        space.roots.insert(id, Vec::new());
        Guard {
            id,
            space: Rc::downgrade(&self.inner),
        }
    }

    /// Run a mark-and-sweep cycle. Returns the number of released objects.
    pub fn collect(&self) -> usize {
        self.inner.borrow_mut().collect()
    }

    pub fn stats(&self) -> GcStats {
        self.inner.borrow().stats()
    }
}

impl<T: Traceable> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Traceable> Clone for Heap<T> {
    fn clone(&self) -> Self {
        Heap {
            inner: Rc::clone(&self.inner),
        }
    }
}

// ============================================================================
// Guard - root anchor for objects
// ============================================================================

/// A root anchor that keeps objects alive across collections.
///
/// Objects added to a guard stay rooted until they are unguarded, the guard
/// is cleared, or the guard is dropped.
pub struct Guard<T: Traceable> {
    id: usize,
    space: Weak<RefCell<Space<T>>>,
}

impl<T: Traceable> Guard<T> {
    /// Allocate a new object and root it in this guard.
    ///
    /// Returns `None` if the heap has already been dropped.
    pub fn alloc(&self, data: T) -> Option<Gc<T>> {
        let space = self.space.upgrade()?;
        let mut space = space.borrow_mut();
        let obj = space.alloc(data);
        space.roots.entry(self.id).or_default().push(obj.clone());
        Some(obj)
    }

    /// Add an existing object to this guard's roots.
    pub fn guard(&self, obj: &Gc<T>) {
        if let Some(space) = self.space.upgrade() {
            space
                .borrow_mut()
                .roots
                .entry(self.id)
                .or_default()
                .push(obj.clone());
        }
    }

    /// Remove one rooting of `obj`. Returns true if it was rooted here.
    pub fn unguard(&self, obj: &Gc<T>) -> bool {
        let Some(space) = self.space.upgrade() else {
            return false;
        };
        let mut space = space.borrow_mut();
        let Some(roots) = space.roots.get_mut(&self.id) else {
            return false;
        };
        if let Some(pos) = roots.iter().position(|r| Gc::ptr_eq(r, obj)) {
            roots.swap_remove(pos);
            return true;
        }
        false
    }

    pub fn clear(&self) {
        if let Some(space) = self.space.upgrade() {
            if let Some(roots) = space.borrow_mut().roots.get_mut(&self.id) {
                roots.clear();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.space
            .upgrade()
            .and_then(|space| space.borrow().roots.get(&self.id).map(Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Traceable> Drop for Guard<T> {
    fn drop(&mut self) {
        if let Some(space) = self.space.upgrade() {
            // Take the roots out first so dropping them happens after the
            // space borrow ends.
            let roots = space.borrow_mut().roots.remove(&self.id);
            drop(roots);
        }
    }
}

// ============================================================================
// GcStats
// ============================================================================

/// Statistics about the garbage collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcStats {
    /// Objects currently owned by the heap
    pub live_objects: usize,
    /// Root entries across all guards
    pub rooted_objects: usize,
    /// Number of live guards
    pub guards: usize,
    /// Completed collection cycles
    pub collections: usize,
    /// Objects released by the most recent cycle
    pub last_collected: usize,
}

// ============================================================================
// Tests
// ============================================================================
