//! Function invocation
//!
//! Natives run to completion inside [`Context::invoke`]. Script functions
//! only get a frame pushed; the dispatch loop picks it up and the return
//! value is delivered to the slot the caller reserved.

use crate::error::VmError;
use crate::frame::{Frame, ReturnTarget};
use crate::object::{AsObject, Function, ScriptFunction, VariableFlags};
use crate::script::FunctionFlags;
use crate::value::{CheapClone, ObjRef, Value};

use super::Context;

/// Everything needed to start a call
pub(crate) struct Invocation {
    pub function: Value,
    pub this: Option<ObjRef>,
    pub args: Vec<Value>,
    pub return_target: ReturnTarget,
    /// Invoked through `new`: the result is the instance
    pub construct: bool,
    /// Super proxy for the callee instead of a fresh one
    pub super_ref: Option<ObjRef>,
}

impl Context {
    /// Hand a result to whoever waits for it
    pub(crate) fn deliver(&mut self, target: ReturnTarget, value: Value) -> Result<(), VmError> {
        match target {
            ReturnTarget::Caller(slot) => self.frame_mut()?.stack.set(slot, value),
            ReturnTarget::Host => {
                self.host_return = value;
                Ok(())
            }
            ReturnTarget::Discard => Ok(()),
        }
    }

    /// Start a call.
    ///
    /// Calling something that is not a function delivers Undefined.
    /// Calling a super proxy calls the constructor of the superclass.
    pub(crate) fn invoke(&mut self, call: Invocation) -> Result<(), VmError> {
        let Some(func_obj) = call.function.as_object().cloned() else {
            tracing::warn!(value = ?call.function, "value is not a function");
            return self.deliver(call.return_target, Value::Undefined);
        };
        if func_obj.borrow().is_super() {
            return self.call_super_constructor(&func_obj, call.args, call.return_target);
        }
        let function = func_obj.borrow().as_function().cloned();
        match function {
            None => {
                tracing::warn!(value = ?call.function, "object is not a function");
                self.deliver(call.return_target, Value::Undefined)
            }
            Some(Function::Native(native)) => {
                let this = call.this.map(Value::Object).unwrap_or_default();
                let func = match native.construct {
                    Some(construct) if call.construct => construct,
                    _ => native.func,
                };
                tracing::trace!(name = native.name.as_str(), "native call");
                // Popped operands are unreachable from the frames while the
                // native runs
                let guard = self.heap.create_guard();
                guard.guard(&func_obj);
                for value in std::iter::once(&this).chain(&call.args) {
                    if let Value::Object(obj) = value {
                        guard.guard(obj);
                    }
                }
                let result = func(self, &this, &call.args);
                drop(guard);
                let result = result?;
                let result = if call.construct && !result.is_object() {
                    this
                } else {
                    result
                };
                self.deliver(call.return_target, result)
            }
            Some(Function::Script(script_fn)) => self.push_function_frame(&func_obj, script_fn, call),
        }
    }

    /// Call the superclass constructor through a super proxy
    fn call_super_constructor(
        &mut self,
        super_ref: &ObjRef,
        args: Vec<Value>,
        return_target: ReturnTarget,
    ) -> Result<(), VmError> {
        let Some(data) = super_ref.borrow().as_super().cloned() else {
            return self.deliver(return_target, Value::Undefined);
        };
        let name = self.names.constructor_hidden.cheap_clone();
        let constructor = data
            .object
            .as_ref()
            .and_then(|obj| self.get_member(obj, &name))
            .unwrap_or_default();
        let chained = self.chain_super(super_ref, &name);
        self.invoke(Invocation {
            function: constructor,
            this: Some(data.thisp),
            args,
            return_target,
            construct: false,
            super_ref: chained,
        })
    }

    /// Push the frame of a script function call
    fn push_function_frame(
        &mut self,
        func_obj: &ObjRef,
        function: ScriptFunction,
        call: Invocation,
    ) -> Result<(), VmError> {
        let limit = self.config.max_call_depth;
        if self.frames.len() >= limit {
            tracing::error!(limit, "recursion limit reached");
            return Err(VmError::RecursionLimit(limit));
        }

        let script = function.script;
        let flags = script.flags;
        let mut frame = Frame::new(
            script.cheap_clone(),
            function.target.cheap_clone(),
            call.return_target,
        );
        let activation = self.alloc(AsObject::new());
        frame.scope_chain.push(activation.cheap_clone());
        frame.scope_chain.extend(function.scope_chain);
        frame.activation = Some(activation.cheap_clone());
        frame.var_object = Some(activation.cheap_clone());
        frame.function = Some(func_obj.cheap_clone());
        frame.thisp = call.this.clone();
        frame.construct = call.construct;
        frame.super_ref = match (call.super_ref, &call.this) {
            (Some(super_ref), _) => Some(super_ref),
            (None, Some(thisp))
                if self.version() > 5 && !flags.contains(FunctionFlags::SUPPRESS_SUPER) =>
            {
                Some(self.create_super(thisp))
            }
            _ => None,
        };

        // arguments object
        let caller = self
            .frames
            .last()
            .and_then(|f| f.function.clone())
            .map(Value::Object)
            .unwrap_or(Value::Null);
        let arguments = self.create_array(call.args.clone());
        {
            let mut args_obj = arguments.borrow_mut();
            args_obj.define(
                self.names.callee.cheap_clone(),
                Value::Object(func_obj.cheap_clone()),
                VariableFlags::HIDDEN,
            );
            args_obj.define(self.names.caller.cheap_clone(), caller, VariableFlags::HIDDEN);
        }
        let arguments_local = !script.function2
            || !(flags.contains(FunctionFlags::SUPPRESS_ARGUMENTS)
                || flags.contains(FunctionFlags::PRELOAD_ARGUMENTS));
        if arguments_local {
            activation.borrow_mut().define(
                self.names.arguments.cheap_clone(),
                Value::Object(arguments.cheap_clone()),
                VariableFlags::NONE,
            );
        }

        if script.function2 {
            let this_value = call
                .this
                .clone()
                .map(Value::Object)
                .unwrap_or_default();
            let preloads = [
                (FunctionFlags::PRELOAD_THIS, this_value),
                (
                    FunctionFlags::PRELOAD_ARGUMENTS,
                    Value::Object(arguments.cheap_clone()),
                ),
                (
                    FunctionFlags::PRELOAD_SUPER,
                    frame.super_ref.clone().map(Value::Object).unwrap_or_default(),
                ),
                (FunctionFlags::PRELOAD_ROOT, Value::Object(self.root_movie())),
                (
                    FunctionFlags::PRELOAD_PARENT,
                    self.movie_parent(&frame.target)
                        .map(Value::Object)
                        .unwrap_or_default(),
                ),
                (FunctionFlags::PRELOAD_GLOBAL, Value::Object(self.global())),
            ];
            let mut register = 1;
            for (flag, value) in preloads {
                if flags.contains(flag) {
                    if let Err(err) = frame.set_register(register, value) {
                        tracing::warn!(%err, "preload register out of range");
                    }
                    register += 1;
                }
            }
        }

        let case_sensitive = self.case_sensitive();
        for (i, argument) in script.arguments.iter().enumerate() {
            let value = call.args.get(i).cloned().unwrap_or_default();
            if script.function2 && argument.preload != 0 {
                if let Err(err) = frame.set_register(argument.preload as usize, value) {
                    tracing::warn!(%err, "argument register out of range");
                }
            } else {
                activation
                    .borrow_mut()
                    .set_own(argument.name.cheap_clone(), value, case_sensitive);
            }
        }

        tracing::debug!(
            name = script.name.as_ref().map(|n| n.as_str()).unwrap_or("anonymous"),
            depth = self.frames.len() + 1,
            "enter function"
        );
        self.frames.push(frame);
        Ok(())
    }

    /// Create an instance of `constructor` and start the constructor call.
    ///
    /// The instance inherits from `constructor.prototype` and remembers its
    /// constructor in the hidden `__constructor__` (and, before version 6,
    /// `constructor`) property.
    pub(crate) fn construct(
        &mut self,
        constructor: &Value,
        args: Vec<Value>,
        return_target: ReturnTarget,
    ) -> Result<(), VmError> {
        let Some(ctor) = constructor.as_object().filter(|c| c.borrow().is_callable()) else {
            tracing::warn!(value = ?constructor, "cannot construct a non-function");
            return self.deliver(return_target, Value::Undefined);
        };
        let prototype_name = self.names.prototype.cheap_clone();
        let prototype = self
            .get_member(ctor, &prototype_name)
            .and_then(|p| p.as_object().cloned());
        let instance = self.alloc(AsObject::with_prototype(prototype.as_ref()));
        {
            let mut obj = instance.borrow_mut();
            obj.define(
                self.names.constructor_hidden.cheap_clone(),
                constructor.clone(),
                VariableFlags::HIDDEN,
            );
            if self.version() < 6 {
                obj.define(
                    self.names.constructor.cheap_clone(),
                    constructor.clone(),
                    VariableFlags::HIDDEN,
                );
            }
        }
        self.invoke(Invocation {
            function: constructor.clone(),
            this: Some(instance),
            args,
            return_target,
            construct: true,
            super_ref: None,
        })
    }
}
