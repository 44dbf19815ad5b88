//! ActionScript object model
//!
//! An object is an insertion-ordered property table, a non-owning prototype
//! link and a `kind` selecting its polymorphic behaviour (functions, super
//! proxies, movies, boxed primitives). Operations that depend on the
//! executing version or that call back into script live on the context in
//! `interpreter::property`; this module only knows about own properties.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::VmError;
use crate::gc::{Gc, Reset, Traceable, WeakGc};
use crate::interpreter::Context;
use crate::movie::MovieClip;
use crate::script::Script;
use crate::super_proxy::SuperData;
use crate::value::{AsString, ObjRef, Value};

/// Property table preserving insertion order for enumeration
pub type PropertyMap = IndexMap<AsString, Variable, FxBuildHasher>;

// ═══════════════════════════════════════════════════════════════════════════════
// Variable
// ═══════════════════════════════════════════════════════════════════════════════

/// Property attribute flags, bit-compatible with `ASSetPropFlags`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableFlags(u16);

impl VariableFlags {
    pub const NONE: VariableFlags = VariableFlags(0);
    /// Not listed by Enumerate
    pub const HIDDEN: VariableFlags = VariableFlags(1 << 0);
    /// Cannot be deleted
    pub const PERMANENT: VariableFlags = VariableFlags(1 << 1);
    /// Read-only
    pub const CONSTANT: VariableFlags = VariableFlags(1 << 2);
    /// Invisible to scripts older than version 6
    pub const VERSION_6_UP: VariableFlags = VariableFlags(1 << 7);
    /// Invisible to scripts older than version 7
    pub const VERSION_7_UP: VariableFlags = VariableFlags(1 << 10);

    pub const fn from_bits(bits: u16) -> Self {
        VariableFlags(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: VariableFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: VariableFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: VariableFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: VariableFlags) {
        self.0 &= !other.0;
    }

    /// Whether a script of `version` can see the property
    pub const fn visible_in(self, version: u8) -> bool {
        if self.intersects(VariableFlags::VERSION_7_UP) && version < 7 {
            return false;
        }
        !(self.intersects(VariableFlags::VERSION_6_UP) && version < 6)
    }
}

impl BitOr for VariableFlags {
    type Output = VariableFlags;

    fn bitor(self, rhs: Self) -> Self {
        VariableFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for VariableFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A property slot: value plus attribute flags
#[derive(Debug, Clone)]
pub struct Variable {
    pub value: Value,
    pub flags: VariableFlags,
}

impl Variable {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            flags: VariableFlags::NONE,
        }
    }

    pub fn with_flags(value: Value, flags: VariableFlags) -> Self {
        Self { value, flags }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Signature of a native function: `(context, this, arguments)`
pub type NativeFn = fn(&mut Context, &Value, &[Value]) -> Result<Value, VmError>;

/// Function representation
#[derive(Debug, Clone)]
pub enum Function {
    /// Function defined by DefineFunction/DefineFunction2
    Script(ScriptFunction),
    /// Native Rust function
    Native(NativeFunction),
}

impl Function {
    pub fn name(&self) -> Option<&str> {
        match self {
            Function::Script(f) => f.script.name.as_ref().map(AsString::as_str),
            Function::Native(f) => Some(f.name.as_str()),
        }
    }
}

/// A script function closes over the scope chain and target that were
/// active when it was defined.
#[derive(Clone)]
pub struct ScriptFunction {
    pub script: Rc<Script>,
    /// Definition-time scope chain, innermost first
    pub scope_chain: Vec<ObjRef>,
    /// Movie the function was defined in; its frames run against it
    pub target: ObjRef,
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.script.name)
            .field("scope_depth", &self.scope_chain.len())
            .finish()
    }
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: AsString,
    pub func: NativeFn,
    /// Used instead of `func` when invoked through `new`
    pub construct: Option<NativeFn>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AsObject
// ═══════════════════════════════════════════════════════════════════════════════

/// Polymorphic object behaviour
#[derive(Debug, Default)]
pub enum ObjectKind {
    #[default]
    Ordinary,
    /// Array: numeric properties plus a maintained `length`
    Array,
    Function(Function),
    /// Ephemeral `super` proxy, holds no storage of its own
    Super(SuperData),
    /// Host-bound movie clip
    Movie(MovieClip),
    /// Boolean/Number/String wrapper created by to_object
    Boxed(Value),
}

/// An ActionScript object
#[derive(Debug, Default)]
pub struct AsObject {
    /// Prototype link (`__proto__`), non-owning
    pub prototype: Option<WeakGc<AsObject>>,
    pub properties: PropertyMap,
    pub kind: ObjectKind,
}

impl AsObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prototype(prototype: Option<&ObjRef>) -> Self {
        Self {
            prototype: prototype.map(Gc::downgrade),
            properties: PropertyMap::default(),
            kind: ObjectKind::Ordinary,
        }
    }

    pub fn with_kind(prototype: Option<&ObjRef>, kind: ObjectKind) -> Self {
        Self {
            prototype: prototype.map(Gc::downgrade),
            properties: PropertyMap::default(),
            kind,
        }
    }

    /// The prototype if it is still alive
    pub fn prototype(&self) -> Option<ObjRef> {
        self.prototype.as_ref().and_then(WeakGc::upgrade)
    }

    pub fn set_prototype(&mut self, prototype: Option<&ObjRef>) {
        self.prototype = prototype.map(Gc::downgrade);
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    pub fn is_movie(&self) -> bool {
        matches!(self.kind, ObjectKind::Movie(_))
    }

    pub fn is_super(&self) -> bool {
        matches!(self.kind, ObjectKind::Super(_))
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_movie(&self) -> Option<&MovieClip> {
        match &self.kind {
            ObjectKind::Movie(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_movie_mut(&mut self) -> Option<&mut MovieClip> {
        match &mut self.kind {
            ObjectKind::Movie(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_super(&self) -> Option<&SuperData> {
        match &self.kind {
            ObjectKind::Super(s) => Some(s),
            _ => None,
        }
    }

    /// Short label used by Debug output and diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ObjectKind::Ordinary => "object",
            ObjectKind::Array => "array",
            ObjectKind::Function(_) => "function",
            ObjectKind::Super(_) => "super",
            ObjectKind::Movie(_) => "movieclip",
            ObjectKind::Boxed(_) => "boxed",
        }
    }

    /// Find the stored key matching `name`.
    ///
    /// Exact match first; when case-insensitive, an ASCII case-insensitive
    /// scan follows.
    pub fn find_key(&self, name: &AsString, case_sensitive: bool) -> Option<AsString> {
        if let Some((key, _)) = self.properties.get_key_value(name) {
            return Some(key.clone());
        }
        if case_sensitive {
            return None;
        }
        self.properties
            .keys()
            .find(|key| key.as_str().eq_ignore_ascii_case(name.as_str()))
            .cloned()
    }

    pub fn get_own(&self, name: &AsString, case_sensitive: bool) -> Option<&Variable> {
        if let Some(var) = self.properties.get(name) {
            return Some(var);
        }
        if case_sensitive {
            return None;
        }
        self.properties
            .iter()
            .find(|(key, _)| key.as_str().eq_ignore_ascii_case(name.as_str()))
            .map(|(_, var)| var)
    }

    pub fn get_own_mut(&mut self, name: &AsString, case_sensitive: bool) -> Option<&mut Variable> {
        let key = self.find_key(name, case_sensitive)?;
        self.properties.get_mut(&key)
    }

    pub fn has_own(&self, name: &AsString, case_sensitive: bool) -> bool {
        self.get_own(name, case_sensitive).is_some()
    }

    /// Write an own property, respecting CONSTANT. Returns false if the
    /// write was refused.
    pub fn set_own(&mut self, name: AsString, value: Value, case_sensitive: bool) -> bool {
        if let Some(var) = self.get_own_mut(&name, case_sensitive) {
            if var.flags.contains(VariableFlags::CONSTANT) {
                return false;
            }
            var.value = value;
            return true;
        }
        self.properties.insert(name, Variable::new(value));
        true
    }

    /// Define a property unconditionally, replacing value and flags
    pub fn define(&mut self, name: AsString, value: Value, flags: VariableFlags) {
        self.properties.insert(name, Variable::with_flags(value, flags));
    }

    /// Remove an own property unless it is PERMANENT. Returns true if a
    /// property was removed.
    pub fn delete_own(&mut self, name: &AsString, case_sensitive: bool) -> bool {
        let Some(key) = self.find_key(name, case_sensitive) else {
            return false;
        };
        let permanent = self
            .properties
            .get(&key)
            .is_some_and(|var| var.flags.contains(VariableFlags::PERMANENT));
        if permanent {
            return false;
        }
        self.properties.shift_remove(&key).is_some()
    }

    /// Set and clear flags on an own property
    pub fn set_flags(
        &mut self,
        name: &AsString,
        set: VariableFlags,
        unset: VariableFlags,
        case_sensitive: bool,
    ) -> bool {
        match self.get_own_mut(name, case_sensitive) {
            Some(var) => {
                var.flags.remove(unset);
                var.flags.insert(set);
                true
            }
            None => false,
        }
    }
}

impl Reset for AsObject {
    fn reset(&mut self) {
        self.prototype = None;
        self.properties.clear();
        self.kind = ObjectKind::Ordinary;
    }
}

impl Traceable for AsObject {
    fn trace<F: FnMut(&Gc<Self>)>(&self, mut visitor: F) {
        if let Some(proto) = self.prototype() {
            visitor(&proto);
        }
        for var in self.properties.values() {
            if let Value::Object(obj) = &var.value {
                visitor(obj);
            }
        }
        match &self.kind {
            ObjectKind::Ordinary | ObjectKind::Array => {}
            ObjectKind::Function(Function::Script(f)) => {
                for obj in &f.scope_chain {
                    visitor(obj);
                }
                visitor(&f.target);
            }
            ObjectKind::Function(Function::Native(_)) => {}
            ObjectKind::Super(data) => {
                visitor(&data.thisp);
                if let Some(obj) = &data.object {
                    visitor(obj);
                }
            }
            ObjectKind::Movie(movie) => {
                if let Some(parent) = movie.parent() {
                    visitor(&parent);
                }
            }
            ObjectKind::Boxed(Value::Object(obj)) => visitor(obj),
            ObjectKind::Boxed(_) => {}
        }
    }
}
