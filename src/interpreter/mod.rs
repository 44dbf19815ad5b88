//! The execution context
//!
//! A [`Context`] owns the object heap, the interned strings, the global
//! object with its builtin prototypes, the root movie and the frame stack.
//! Scripts run against it through [`Context::execute`]; the dispatch loop
//! lives in `run`, one handler per action in `actions`.

mod actions;
pub mod builtins;
mod call;
mod coerce;
mod property;
mod run;
mod scope;
pub mod table;

use std::rc::Rc;

use crate::config::VmConfig;
use crate::error::VmError;
use crate::frame::{Frame, ReturnTarget};
use crate::gc::{GcStats, Guard, Heap};
use crate::host::Host;
use crate::movie::{MovieClip, SimpleTimeline, Timeline};
use crate::object::{AsObject, Function, NativeFn, NativeFunction, ObjectKind, VariableFlags};
use crate::script::Script;
use crate::string_dict::{Names, StringDict};
use crate::value::{AsString, CheapClone, ObjRef, Value};

pub use table::{ACTIONS, ActionSpec};

/// Builtin prototypes, rooted for the lifetime of the context
pub(crate) struct Prototypes {
    pub object: ObjRef,
    pub function: ObjRef,
    pub array: ObjRef,
    pub string: ObjRef,
    pub number: ObjRef,
    pub boolean: ObjRef,
    pub movie: ObjRef,
}

/// An ActionScript execution context
pub struct Context {
    pub(crate) config: VmConfig,
    pub(crate) heap: Heap<AsObject>,
    /// Roots the global object, the prototypes and the root movie
    root_guard: Guard<AsObject>,
    pub(crate) strings: StringDict,
    pub(crate) names: Names,
    pub(crate) global: ObjRef,
    pub(crate) root: ObjRef,
    pub(crate) protos: Prototypes,

    // ═══════════════════════════════════════════════════════════════
    // Execution state
    // ═══════════════════════════════════════════════════════════════
    pub(crate) frames: Vec<Frame>,
    pub(crate) host: Box<dyn Host>,
    /// Value handed back by the frame or native that returned to the host
    pub(crate) host_return: Value,
}

impl Context {
    /// Create a context with the default configuration
    pub fn new(host: impl Host + 'static) -> Self {
        Self::build(VmConfig::default(), Box::new(host))
    }

    /// Create a context with a validated configuration
    pub fn with_config(config: VmConfig, host: impl Host + 'static) -> Result<Self, VmError> {
        config.validate()?;
        Ok(Self::build(config, Box::new(host)))
    }

    fn build(config: VmConfig, host: Box<dyn Host>) -> Self {
        let heap = Heap::new();
        let root_guard = heap.create_guard();
        let mut strings = StringDict::with_common_strings();
        let names = Names::new(&mut strings);

        let rooted = |data: AsObject| {
            let obj = heap.alloc(data);
            root_guard.guard(&obj);
            obj
        };

        let object = rooted(AsObject::new());
        let protos = Prototypes {
            function: rooted(AsObject::with_prototype(Some(&object))),
            array: rooted(AsObject::with_prototype(Some(&object))),
            string: rooted(AsObject::with_prototype(Some(&object))),
            number: rooted(AsObject::with_prototype(Some(&object))),
            boolean: rooted(AsObject::with_prototype(Some(&object))),
            movie: rooted(AsObject::with_prototype(Some(&object))),
            object,
        };
        let global = rooted(AsObject::with_prototype(Some(&protos.object)));
        let root = rooted(AsObject::with_kind(
            Some(&protos.movie),
            ObjectKind::Movie(MovieClip::new(
                names.level0.cheap_clone(),
                None,
                Box::new(SimpleTimeline::new(1)),
            )),
        ));

        let mut ctx = Self {
            config,
            heap,
            root_guard,
            strings,
            names,
            global,
            root,
            protos,
            frames: Vec::new(),
            host,
            host_return: Value::Undefined,
        };
        builtins::install(&mut ctx);
        tracing::debug!(version = ctx.config.version, "context created");
        ctx
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// SWF version of the context
    pub fn version(&self) -> u8 {
        self.config.version
    }

    pub(crate) fn case_sensitive(&self) -> bool {
        self.config.is_case_sensitive()
    }

    pub fn intern(&mut self, s: &str) -> AsString {
        self.strings.get_or_insert(s)
    }

    pub fn global(&self) -> ObjRef {
        self.global.cheap_clone()
    }

    /// The `_root` / `_level0` movie
    pub fn root_movie(&self) -> ObjRef {
        self.root.cheap_clone()
    }

    /// Replace the root movie. The previous root stays alive only while
    /// something references it.
    pub fn set_root_movie(&mut self, movie: &ObjRef) {
        self.root_guard.unguard(&self.root);
        self.root_guard.guard(movie);
        self.root = movie.cheap_clone();
    }

    /// Number of frames currently executing
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn host_mut(&mut self) -> &mut dyn Host {
        self.host.as_mut()
    }

    // ═══════════════════════════════════════════════════════════════
    // Allocation
    // ═══════════════════════════════════════════════════════════════

    /// Allocate an unrooted object. It survives collection only while
    /// reachable from a root.
    pub(crate) fn alloc(&self, data: AsObject) -> ObjRef {
        self.heap.alloc(data)
    }

    /// A new ordinary object inheriting from Object.prototype
    pub fn create_object(&mut self) -> ObjRef {
        self.alloc(AsObject::with_prototype(Some(&self.protos.object)))
    }

    /// A new array holding `elements`
    pub fn create_array(&mut self, elements: Vec<Value>) -> ObjRef {
        let array = self.alloc(AsObject::with_kind(
            Some(&self.protos.array),
            ObjectKind::Array,
        ));
        {
            let mut obj = array.borrow_mut();
            let len = elements.len();
            for (i, value) in elements.into_iter().enumerate() {
                let key = self.strings.get_or_insert(&i.to_string());
                obj.define(key, value, VariableFlags::NONE);
            }
            obj.define(
                self.names.length.cheap_clone(),
                Value::Number(len as f64),
                VariableFlags::HIDDEN | VariableFlags::PERMANENT,
            );
        }
        array
    }

    /// A new function object wrapping `function`.
    ///
    /// The function gets a fresh `prototype` object whose hidden
    /// `constructor` points back at it.
    pub(crate) fn create_function(&mut self, function: Function) -> ObjRef {
        let func = self.alloc(AsObject::with_kind(
            Some(&self.protos.function),
            ObjectKind::Function(function),
        ));
        let prototype = self.create_object();
        prototype.borrow_mut().define(
            self.names.constructor.cheap_clone(),
            Value::Object(func.cheap_clone()),
            VariableFlags::HIDDEN,
        );
        func.borrow_mut().define(
            self.names.prototype.cheap_clone(),
            Value::Object(prototype),
            VariableFlags::HIDDEN | VariableFlags::PERMANENT,
        );
        func
    }

    /// A native function object
    pub fn create_native_function(&mut self, name: &str, func: NativeFn) -> ObjRef {
        let name = self.intern(name);
        self.create_function(Function::Native(NativeFunction {
            name,
            func,
            construct: None,
        }))
    }

    /// Define a native method on `obj`, hidden from enumeration
    pub fn define_native(&mut self, obj: &ObjRef, name: &str, func: NativeFn) -> ObjRef {
        self.define_native_with(obj, name, func, VariableFlags::HIDDEN)
    }

    pub(crate) fn define_native_with(
        &mut self,
        obj: &ObjRef,
        name: &str,
        func: NativeFn,
        flags: VariableFlags,
    ) -> ObjRef {
        let function = self.create_native_function(name, func);
        let key = self.intern(name);
        obj.borrow_mut()
            .define(key, Value::Object(function.cheap_clone()), flags);
        function
    }

    /// A movie clip named `name`, attached to `parent` when given
    pub fn create_movie(
        &mut self,
        name: &str,
        parent: Option<&ObjRef>,
        timeline: impl Timeline + 'static,
    ) -> ObjRef {
        let name = self.intern(name);
        let movie = self.alloc(AsObject::with_kind(
            Some(&self.protos.movie),
            ObjectKind::Movie(MovieClip::new(name.cheap_clone(), parent, Box::new(timeline))),
        ));
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .define(name, Value::Object(movie.cheap_clone()), VariableFlags::NONE);
        }
        movie
    }

    // ═══════════════════════════════════════════════════════════════
    // Execution
    // ═══════════════════════════════════════════════════════════════

    /// Run a top-level script against the root movie
    pub fn execute(&mut self, script: &Rc<Script>) -> Result<Value, VmError> {
        let root = self.root_movie();
        self.execute_in(script, &root)
    }

    /// Run a top-level script against `target`.
    ///
    /// Returns the value of a top-level Return, Undefined otherwise. Faults
    /// inside the script are logged and skipped; only exceeding the
    /// recursion limit is reported as an error.
    pub fn execute_in(&mut self, script: &Rc<Script>, target: &ObjRef) -> Result<Value, VmError> {
        if self.frames.len() >= self.config.max_call_depth {
            return Err(VmError::RecursionLimit(self.config.max_call_depth));
        }
        let base = self.frames.len();
        self.frames.push(Frame::new(
            script.cheap_clone(),
            target.cheap_clone(),
            ReturnTarget::Host,
        ));
        self.run(base)?;
        Ok(std::mem::take(&mut self.host_return))
    }

    /// Call `function` synchronously with `this` and `args`
    pub fn call_function(
        &mut self,
        function: &Value,
        this: &Value,
        args: &[Value],
    ) -> Result<Value, VmError> {
        let base = self.frames.len();
        self.invoke(call::Invocation {
            function: function.clone(),
            this: this.as_object().cloned(),
            args: args.to_vec(),
            return_target: ReturnTarget::Host,
            construct: false,
            super_ref: None,
        })?;
        if self.frames.len() > base {
            self.run(base)?;
        }
        Ok(std::mem::take(&mut self.host_return))
    }

    /// Call the method `name` of `obj`
    pub fn call_method(
        &mut self,
        obj: &ObjRef,
        name: &str,
        args: &[Value],
    ) -> Result<Value, VmError> {
        let name = self.intern(name);
        let method = self.get_member(obj, &name).unwrap_or_default();
        self.call_function(&method, &Value::Object(obj.cheap_clone()), args)
    }

    pub(crate) fn frame(&self) -> Result<&Frame, VmError> {
        self.frames.last().ok_or(VmError::NoFrame)
    }

    pub(crate) fn frame_mut(&mut self) -> Result<&mut Frame, VmError> {
        self.frames.last_mut().ok_or(VmError::NoFrame)
    }

    // ═══════════════════════════════════════════════════════════════
    // Garbage collection
    // ═══════════════════════════════════════════════════════════════

    /// Collect every object unreachable from the context roots and the
    /// executing frames. Returns the number of objects freed.
    pub fn collect(&mut self) -> usize {
        let frame_guard = self.heap.create_guard();
        let mut roots = Vec::new();
        for frame in &self.frames {
            frame.collect_roots(&mut roots);
        }
        if let Value::Object(obj) = &self.host_return {
            roots.push(obj.cheap_clone());
        }
        for obj in &roots {
            frame_guard.guard(obj);
        }
        let freed = self.heap.collect();
        tracing::debug!(freed, "garbage collected");
        freed
    }

    pub fn gc_stats(&self) -> GcStats {
        self.heap.stats()
    }

    /// A guard keeping host-held objects alive across collections
    pub fn create_guard(&self) -> Guard<AsObject> {
        self.heap.create_guard()
    }
}
