//! String dictionary for interning AsString instances.
//!
//! Every string the VM creates goes through a context's dictionary, so equal
//! content shares one `Rc<str>` and comparison hits the pointer fast path.

use rustc_hash::FxHashMap;

use crate::value::{AsString, CheapClone};

/// A dictionary for deduplicating AsString instances.
///
/// Strings inserted into the dictionary are stored once and subsequent
/// requests for the same string return a cheap clone of the existing instance.
pub struct StringDict {
    /// Map from string content to shared AsString instance.
    /// Using Box<str> as key to avoid double-indirection through Rc.
    strings: FxHashMap<Box<str>, AsString>,
}

impl StringDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
        }
    }

    /// Create a dictionary pre-populated with common strings.
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for s in COMMON_STRINGS {
            dict.get_or_insert(s);
        }
        dict
    }

    /// Get an existing string or insert a new one.
    /// Returns a cheap clone of the shared AsString instance.
    pub fn get_or_insert(&mut self, s: &str) -> AsString {
        if let Some(existing) = self.strings.get(s) {
            return existing.cheap_clone();
        }
        let as_str = AsString::from(s);
        self.strings.insert(s.into(), as_str.cheap_clone());
        as_str
    }

    /// Get an existing string without inserting.
    pub fn get(&self, s: &str) -> Option<AsString> {
        self.strings.get(s).map(|s| s.cheap_clone())
    }

    /// Insert an AsString that was created elsewhere.
    /// If the string already exists, returns the existing instance.
    pub fn insert(&mut self, as_str: AsString) -> AsString {
        if let Some(existing) = self.strings.get(as_str.as_str()) {
            return existing.cheap_clone();
        }
        self.strings
            .insert(as_str.as_str().into(), as_str.cheap_clone());
        as_str
    }

    /// Number of unique strings in the dictionary.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-interned handles for names the interpreter looks up on hot paths.
pub struct Names {
    pub empty: AsString,
    pub length: AsString,
    pub prototype: AsString,
    pub proto: AsString,
    pub constructor: AsString,
    pub constructor_hidden: AsString,
    pub to_string: AsString,
    pub value_of: AsString,
    pub this: AsString,
    pub arguments: AsString,
    pub callee: AsString,
    pub caller: AsString,
    pub super_: AsString,
    pub global: AsString,
    pub root: AsString,
    pub level0: AsString,
    pub parent: AsString,
    pub undefined: AsString,
    pub null: AsString,
    pub true_: AsString,
    pub false_: AsString,
    pub nan: AsString,
    pub error: AsString,
    pub unnamed_function: AsString,
    pub type_function: AsString,
    pub type_object: AsString,
}

impl Names {
    pub fn new(dict: &mut StringDict) -> Self {
        Self {
            empty: dict.get_or_insert(""),
            length: dict.get_or_insert("length"),
            prototype: dict.get_or_insert("prototype"),
            proto: dict.get_or_insert("__proto__"),
            constructor: dict.get_or_insert("constructor"),
            constructor_hidden: dict.get_or_insert("__constructor__"),
            to_string: dict.get_or_insert("toString"),
            value_of: dict.get_or_insert("valueOf"),
            this: dict.get_or_insert("this"),
            arguments: dict.get_or_insert("arguments"),
            callee: dict.get_or_insert("callee"),
            caller: dict.get_or_insert("caller"),
            super_: dict.get_or_insert("super"),
            global: dict.get_or_insert("_global"),
            root: dict.get_or_insert("_root"),
            level0: dict.get_or_insert("_level0"),
            parent: dict.get_or_insert("_parent"),
            undefined: dict.get_or_insert("undefined"),
            null: dict.get_or_insert("null"),
            true_: dict.get_or_insert("true"),
            false_: dict.get_or_insert("false"),
            nan: dict.get_or_insert("NaN"),
            error: dict.get_or_insert("#ERROR#"),
            unnamed_function: dict.get_or_insert("unnamed_function"),
            type_function: dict.get_or_insert("[type Function]"),
            type_object: dict.get_or_insert("[type Object]"),
        }
    }
}

/// Strings that appear frequently in ActionScript code and runtime.
const COMMON_STRINGS: &[&str] = &[
    // Object properties
    "length",
    "prototype",
    "constructor",
    "__constructor__",
    "__proto__",
    "__resolve",
    // Common methods
    "toString",
    "valueOf",
    "hasOwnProperty",
    "call",
    "apply",
    "push",
    "pop",
    "join",
    "charAt",
    "charCodeAt",
    "indexOf",
    "substr",
    "substring",
    "toUpperCase",
    "toLowerCase",
    // Type names
    "undefined",
    "null",
    "boolean",
    "number",
    "string",
    "object",
    "function",
    "movieclip",
    // Built-in constructors
    "Object",
    "Function",
    "Array",
    "String",
    "Number",
    "Boolean",
    "ASSetPropFlags",
    // Special identifiers
    "this",
    "arguments",
    "callee",
    "caller",
    "super",
    "_global",
    "_root",
    "_level0",
    "_parent",
    // Movie properties
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
