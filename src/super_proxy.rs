//! The `super` proxy
//!
//! A super object has no properties of its own. Reads go to the prototype of
//! its search object, writes and deletes are dropped, and using it as a value
//! yields the instance it was created for.

use crate::interpreter::Context;
use crate::object::{AsObject, ObjectKind};
use crate::value::{AsString, CheapClone, ObjRef};

/// State of a super proxy
#[derive(Debug, Clone)]
pub struct SuperData {
    /// The concrete instance `this` refers to
    pub thisp: ObjRef,
    /// Search object; lookups start at its prototype
    pub object: Option<ObjRef>,
}

impl SuperData {
    /// First-level super for `thisp`: the search object is the instance's
    /// own prototype.
    pub fn new(thisp: ObjRef) -> Self {
        let object = thisp.borrow().prototype();
        Self { thisp, object }
    }

    /// Where reads through this proxy start: the search object's prototype
    pub fn lookup_start(&self) -> Option<ObjRef> {
        self.object.as_ref().and_then(|obj| obj.borrow().prototype())
    }
}

impl Context {
    /// Allocate a first-level super proxy for a call with `thisp`
    pub(crate) fn create_super(&mut self, thisp: &ObjRef) -> ObjRef {
        let data = SuperData::new(thisp.cheap_clone());
        self.alloc(AsObject::with_kind(None, ObjectKind::Super(data)))
    }

    /// The super proxy for a method reached through `super_ref`.
    ///
    /// The new search object is one prototype further up. From version 7 on,
    /// prototypes that do not define `method` themselves are skipped so a
    /// repeated `super.method()` reaches the next override instead of the
    /// same one again.
    pub(crate) fn chain_super(&mut self, super_ref: &ObjRef, method: &AsString) -> Option<ObjRef> {
        let data = super_ref.borrow().as_super()?.clone();
        let mut object = data.lookup_start();
        if self.version() > 6 {
            if let Some(start) = object.clone() {
                if let Some(owner) = self.find_owner(&start, method) {
                    if owner != start {
                        object = Some(owner);
                    }
                }
            }
        }
        let chained = SuperData {
            thisp: data.thisp,
            object,
        };
        Some(self.alloc(AsObject::with_kind(None, ObjectKind::Super(chained))))
    }
}
