//! Property access with ActionScript semantics
//!
//! Layered over the own-property table of [`AsObject`]: prototype chain
//! walks, version visibility, case folding, the `__proto__` pseudo
//! property, array length maintenance, movie clip properties and the
//! read-only behaviour of super proxies.

use rustc_hash::FxHashSet;

use crate::object::{AsObject, ObjectKind, VariableFlags};
use crate::value::{AsString, CheapClone, ObjRef, Value};

use super::Context;

/// Prototype links followed before a lookup gives up
pub const MAX_PROTOTYPE_DEPTH: usize = 256;

/// Movie clip properties addressed by GetProperty/SetProperty index
pub const PROPERTY_NAMES: [&str; 22] = [
    "_x",
    "_y",
    "_xscale",
    "_yscale",
    "_currentframe",
    "_totalframes",
    "_alpha",
    "_visible",
    "_width",
    "_height",
    "_rotation",
    "_target",
    "_framesloaded",
    "_name",
    "_droptarget",
    "_url",
    "_highquality",
    "_focusrect",
    "_soundbuftime",
    "_quality",
    "_xmouse",
    "_ymouse",
];

/// Which dotted path form to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathStyle {
    /// `_level0.a.b`
    Dots,
    /// `/a/b`
    Slashes,
}

impl Context {
    // ═══════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════

    /// Own value of `obj` visible to the executing version
    fn own_value(&self, obj: &AsObject, name: &AsString) -> Option<Value> {
        obj.get_own(name, self.case_sensitive())
            .filter(|var| var.flags.visible_in(self.version()))
            .map(|var| var.value.clone())
    }

    fn names_equal(&self, a: &AsString, b: &AsString) -> bool {
        a == b || (!self.case_sensitive() && a.as_str().eq_ignore_ascii_case(b.as_str()))
    }

    /// Read `name` from `obj` and its prototypes.
    ///
    /// `None` means the property does not exist; callers map it to
    /// Undefined.
    pub fn get_member(&self, obj: &ObjRef, name: &AsString) -> Option<Value> {
        let start = {
            let o = obj.borrow();
            match &o.kind {
                ObjectKind::Super(data) => match data.lookup_start() {
                    Some(start) => start,
                    None => return None,
                },
                _ => obj.cheap_clone(),
            }
        };

        if self.names_equal(name, &self.names.proto) {
            return start.borrow().prototype().map(Value::Object);
        }
        if let Some(value) = self.special_member(&start, name) {
            return Some(value);
        }

        let mut current = start;
        for _ in 0..MAX_PROTOTYPE_DEPTH {
            let next = {
                let o = current.borrow();
                if let Some(value) = self.own_value(&o, name) {
                    return Some(value);
                }
                o.prototype()
            };
            current = next?;
        }
        tracing::warn!(name = name.as_str(), "prototype chain too deep");
        None
    }

    /// The object on `obj`'s prototype chain holding `name` itself
    pub(crate) fn find_owner(&self, obj: &ObjRef, name: &AsString) -> Option<ObjRef> {
        let mut current = obj.cheap_clone();
        for _ in 0..MAX_PROTOTYPE_DEPTH {
            let next = {
                let o = current.borrow();
                if self.own_value(&o, name).is_some() {
                    drop(o);
                    return Some(current);
                }
                o.prototype()
            };
            current = next?;
        }
        None
    }

    /// Whether `name` resolves on `obj`, including movie properties
    pub(crate) fn has_member(&self, obj: &ObjRef, name: &AsString) -> bool {
        self.get_member(obj, name).is_some()
    }

    /// Properties computed from the object's kind rather than stored
    fn special_member(&self, obj: &ObjRef, name: &AsString) -> Option<Value> {
        let o = obj.borrow();
        match &o.kind {
            ObjectKind::Movie(movie) => {
                let key = name.as_str();
                let matches = |s: &str| {
                    if self.case_sensitive() {
                        key == s
                    } else {
                        key.eq_ignore_ascii_case(s)
                    }
                };
                let timeline = &movie.timeline;
                if matches("_currentframe") {
                    Some(Value::Number((timeline.current_frame() + 1) as f64))
                } else if matches("_totalframes") {
                    Some(Value::Number(timeline.n_frames() as f64))
                } else if matches("_framesloaded") {
                    Some(Value::Number(timeline.frames_loaded() as f64))
                } else if matches("_name") {
                    Some(Value::String(movie.name.cheap_clone()))
                } else if matches("_parent") {
                    movie.parent().map(Value::Object)
                } else if matches("_target") {
                    Some(Value::String(AsString::from(
                        self.movie_path(obj, PathStyle::Slashes),
                    )))
                } else {
                    None
                }
            }
            ObjectKind::Boxed(Value::String(s)) if self.names_equal(name, &self.names.length) => {
                Some(Value::Number(s.char_count() as f64))
            }
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Writes
    // ═══════════════════════════════════════════════════════════════

    /// Write `name` on `obj` itself. Super proxies and constants ignore
    /// the write.
    pub fn set_member(&mut self, obj: &ObjRef, name: &AsString, value: Value) {
        if obj.borrow().is_super() {
            tracing::debug!(name = name.as_str(), "write through super ignored");
            return;
        }
        if self.names_equal(name, &self.names.proto) {
            let proto = value.as_object().cloned();
            obj.borrow_mut().set_prototype(proto.as_ref());
            return;
        }
        if self.set_special_member(obj, name, &value) {
            return;
        }

        let is_array = matches!(obj.borrow().kind, ObjectKind::Array);
        if is_array && self.names_equal(name, &self.names.length) {
            self.set_array_length(obj, &value);
            return;
        }

        let case_sensitive = self.case_sensitive();
        if !obj
            .borrow_mut()
            .set_own(name.cheap_clone(), value, case_sensitive)
        {
            tracing::debug!(name = name.as_str(), "write to constant ignored");
            return;
        }
        if is_array {
            if let Ok(index) = name.as_str().parse::<usize>() {
                self.grow_array(obj, index + 1);
            }
        }
    }

    fn set_special_member(&mut self, obj: &ObjRef, name: &AsString, value: &Value) -> bool {
        if !obj.borrow().is_movie() {
            return false;
        }
        let key = name.as_str();
        let matches = |s: &str| key.eq_ignore_ascii_case(s);
        if matches("_name") {
            let name = match value {
                Value::String(s) => s.cheap_clone(),
                _ => return true,
            };
            if let Some(movie) = obj.borrow_mut().as_movie_mut() {
                movie.name = name;
            }
            return true;
        }
        [
            "_currentframe",
            "_totalframes",
            "_framesloaded",
            "_parent",
            "_target",
        ]
        .iter()
        .any(|s| matches(s))
    }

    /// Current `length` of an array object
    pub(crate) fn array_length(&self, array: &ObjRef) -> usize {
        let len = self.own_value(&array.borrow(), &self.names.length);
        match len {
            Some(Value::Number(n)) if n >= 0.0 && n.is_finite() => n as usize,
            _ => 0,
        }
    }

    fn grow_array(&mut self, array: &ObjRef, min_len: usize) {
        if self.array_length(array) < min_len {
            self.store_length(array, min_len);
        }
    }

    fn store_length(&self, array: &ObjRef, len: usize) {
        array.borrow_mut().define(
            self.names.length.cheap_clone(),
            Value::Number(len as f64),
            VariableFlags::HIDDEN | VariableFlags::PERMANENT,
        );
    }

    /// Setting `length` drops the elements past the new end
    fn set_array_length(&mut self, array: &ObjRef, value: &Value) {
        let n = value.primitive_to_number(self.version());
        if !n.is_finite() || n < 0.0 {
            return;
        }
        let new_len = n as usize;
        let old_len = self.array_length(array);
        for index in new_len..old_len {
            let key = self.intern(&index.to_string());
            array.borrow_mut().delete_own(&key, true);
        }
        self.store_length(array, new_len);
    }

    /// Delete an own property. Super proxies and permanent properties
    /// refuse.
    pub fn delete_member(&mut self, obj: &ObjRef, name: &AsString) -> bool {
        let case_sensitive = self.case_sensitive();
        let mut o = obj.borrow_mut();
        if o.is_super() {
            return false;
        }
        o.delete_own(name, case_sensitive)
    }

    /// Change the flags of an own property
    pub fn set_member_flags(
        &mut self,
        obj: &ObjRef,
        name: &AsString,
        set: VariableFlags,
        unset: VariableFlags,
    ) -> bool {
        let case_sensitive = self.case_sensitive();
        let mut o = obj.borrow_mut();
        if o.is_super() {
            return false;
        }
        o.set_flags(name, set, unset, case_sensitive)
    }

    // ═══════════════════════════════════════════════════════════════
    // Enumeration
    // ═══════════════════════════════════════════════════════════════

    /// Enumerable property names of `obj` and its prototypes, own
    /// properties first, each name once
    pub fn enumerate_names(&self, obj: &ObjRef) -> Vec<AsString> {
        let mut seen: FxHashSet<AsString> = FxHashSet::default();
        let mut names = Vec::new();
        let mut current = Some(obj.cheap_clone());
        let version = self.version();
        for _ in 0..MAX_PROTOTYPE_DEPTH {
            let Some(cur) = current else { break };
            let o = cur.borrow();
            for (key, var) in &o.properties {
                if seen.insert(key.cheap_clone())
                    && !var.flags.contains(VariableFlags::HIDDEN)
                    && var.flags.visible_in(version)
                {
                    names.push(key.cheap_clone());
                }
            }
            current = o.prototype();
        }
        names
    }

    // ═══════════════════════════════════════════════════════════════
    // Movie paths
    // ═══════════════════════════════════════════════════════════════

    /// Path of a movie from the root in the requested style
    pub(crate) fn movie_path(&self, movie: &ObjRef, style: PathStyle) -> String {
        let mut segments = Vec::new();
        let mut current = Some(movie.cheap_clone());
        while let Some(cur) = current {
            let o = cur.borrow();
            let Some(clip) = o.as_movie() else { break };
            let parent = clip.parent();
            if parent.is_some() {
                segments.push(clip.name.as_str().to_string());
            }
            current = parent;
        }
        segments.reverse();
        match style {
            PathStyle::Dots => {
                let mut path = String::from("_level0");
                for segment in segments {
                    path.push('.');
                    path.push_str(&segment);
                }
                path
            }
            PathStyle::Slashes => {
                if segments.is_empty() {
                    "/".to_string()
                } else {
                    segments.iter().fold(String::new(), |mut path, segment| {
                        path.push('/');
                        path.push_str(segment);
                        path
                    })
                }
            }
        }
    }

    /// Parent movie of `obj`, if it is an attached movie
    pub(crate) fn movie_parent(&self, obj: &ObjRef) -> Option<ObjRef> {
        obj.borrow().as_movie().and_then(|m| m.parent())
    }
}
