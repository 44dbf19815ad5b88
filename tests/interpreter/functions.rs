//! Function definition, calls, closures and the call protocol

use super::{RecordingHost, as_str, create_context, eval, exec, member, script, traces};
use asvm::{
    ActionBuilder, Context, FunctionFlags, Value, VmConfig, VmError, opcode,
};

/// `name(args...)`, arguments given left to right
fn call(b: &mut ActionBuilder, name: &str, args: &[f64]) {
    for arg in args.iter().rev() {
        b.push_number(*arg);
    }
    b.push_number(args.len() as f64)
        .push_str(name)
        .emit(opcode::CALL_FUNCTION);
}

#[test]
fn test_define_and_call_function() {
    let result = eval(7, |b| {
        b.define_function("sub", &["a", "b"], |f| {
            f.push_str("a")
                .emit(opcode::GET_VARIABLE)
                .push_str("b")
                .emit(opcode::GET_VARIABLE)
                .emit(opcode::SUBTRACT)
                .emit(opcode::RETURN);
        });
        call(b, "sub", &[10.0, 3.0]);
        b.emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(7.0));
}

#[test]
fn test_missing_arguments_are_undefined() {
    let out = traces(7, |b| {
        b.define_function("show", &["a", "b"], |f| {
            f.push_str("b").emit(opcode::GET_VARIABLE).emit(opcode::TRACE);
        });
        call(b, "show", &[1.0]);
        b.emit(opcode::POP);
    });
    assert_eq!(out, vec!["undefined"]);
}

#[test]
fn test_function_without_return_yields_undefined() {
    let out = traces(7, |b| {
        b.define_function("noop", &[], |_| {});
        call(b, "noop", &[]);
        b.emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["undefined"]);
}

#[test]
fn test_calling_a_non_function_pushes_undefined() {
    let out = traces(7, |b| {
        call(b, "missing", &[1.0]);
        b.emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["undefined"]);
}

#[test]
fn test_define_function2_recursive_factorial() {
    let result = eval(7, |b| {
        b.define_function2("fact", 3, FunctionFlags::NONE, &[(1, "n")], |f| {
            f.push_register(1).push_number(2.0).emit(opcode::LESS2);
            let base = f.emit_if();
            f.push_register(1)
                .push_register(1)
                .emit(opcode::DECREMENT)
                .push_number(1.0)
                .push_str("fact")
                .emit(opcode::CALL_FUNCTION)
                .emit(opcode::MULTIPLY)
                .emit(opcode::RETURN);
            f.patch_jump(base);
            f.push_number(1.0).emit(opcode::RETURN);
        });
        call(b, "fact", &[5.0]);
        b.emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(120.0));
}

#[test]
fn test_define_function2_preloads_registers() {
    let result = eval(7, |b| {
        // this in r1, arguments in r2
        b.define_function2(
            "m",
            3,
            FunctionFlags::PRELOAD_THIS | FunctionFlags::PRELOAD_ARGUMENTS,
            &[],
            |f| {
                f.push_register(1)
                    .push_str("k")
                    .emit(opcode::GET_MEMBER)
                    .push_register(2)
                    .push_str("length")
                    .emit(opcode::GET_MEMBER)
                    .emit(opcode::ADD2)
                    .emit(opcode::RETURN);
            },
        );
        b.push_str("o")
            .push_str("k")
            .push_number(40.0)
            .push_str("m")
            .push_str("m")
            .emit(opcode::GET_VARIABLE)
            .push_number(2.0)
            .emit(opcode::INIT_OBJECT)
            .emit(opcode::SET_VARIABLE);
        b.push_number(1.0)
            .push_number(1.0)
            .push_number(2.0)
            .push_str("o")
            .emit(opcode::GET_VARIABLE)
            .push_str("m")
            .emit(opcode::CALL_METHOD)
            .emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(42.0));
}

#[test]
fn test_recursion_limit_is_fatal() {
    let config = VmConfig {
        max_call_depth: 16,
        ..VmConfig::with_version(7)
    };
    let mut ctx = Context::with_config(config, RecordingHost::default())
        .expect("valid configuration");
    let runaway = script(7, |b| {
        b.define_function("loop", &[], |f| {
            call(f, "loop", &[]);
            f.emit(opcode::RETURN);
        });
        call(b, "loop", &[]);
    });
    assert_eq!(ctx.execute(&runaway), Err(VmError::RecursionLimit(16)));
    assert_eq!(ctx.frame_depth(), 0);

    // The context stays usable
    let result = exec(&mut ctx, 7, |b| {
        b.push_number(1.0).emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(1.0));
}

#[test]
fn test_arguments_object() {
    let out = traces(7, |b| {
        b.define_function("count", &[], |f| {
            f.push_str("arguments")
                .emit(opcode::GET_VARIABLE)
                .push_str("length")
                .emit(opcode::GET_MEMBER)
                .emit(opcode::TRACE)
                .push_str("arguments")
                .emit(opcode::GET_VARIABLE)
                .push_str("1")
                .emit(opcode::GET_MEMBER)
                .emit(opcode::TRACE);
        });
        call(b, "count", &[7.0, 8.0, 9.0]);
        b.emit(opcode::POP);
    });
    assert_eq!(out, vec!["3", "8"]);
}

#[test]
fn test_closure_captures_defining_scope() {
    let out = traces(7, |b| {
        b.define_function("make", &[], |f| {
            f.push_str("x").push_number(10.0).emit(opcode::DEFINE_LOCAL);
            f.define_function("", &[], |inner| {
                inner
                    .push_str("x")
                    .emit(opcode::GET_VARIABLE)
                    .emit(opcode::RETURN);
            });
            f.emit(opcode::RETURN);
        });
        b.push_str("f");
        call(b, "make", &[]);
        b.emit(opcode::SET_VARIABLE);
        call(b, "f", &[]);
        b.emit(opcode::TRACE);
        // The local did not leak into the timeline
        b.push_str("x").emit(opcode::GET_VARIABLE).emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["10", "undefined"]);
}

#[test]
fn test_locals_shadow_timeline_variables() {
    let out = traces(7, |b| {
        b.push_str("v").push_str("timeline").emit(opcode::SET_VARIABLE);
        b.define_function("f", &[], |f| {
            f.push_str("v").push_str("local").emit(opcode::DEFINE_LOCAL);
            f.push_str("v").emit(opcode::GET_VARIABLE).emit(opcode::TRACE);
        });
        call(b, "f", &[]);
        b.emit(opcode::POP);
        b.push_str("v").emit(opcode::GET_VARIABLE).emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["local", "timeline"]);
}

#[test]
fn test_set_variable_in_function_updates_timeline() {
    let out = traces(7, |b| {
        b.push_str("counter").push_number(1.0).emit(opcode::SET_VARIABLE);
        b.define_function("bump", &[], |f| {
            f.push_str("counter")
                .push_str("counter")
                .emit(opcode::GET_VARIABLE)
                .emit(opcode::INCREMENT)
                .emit(opcode::SET_VARIABLE);
        });
        call(b, "bump", &[]);
        b.emit(opcode::POP);
        b.push_str("counter").emit(opcode::GET_VARIABLE).emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["2"]);
}

#[test]
fn test_function_call_sets_this() {
    let result = eval(7, |b| {
        b.define_function("getx", &[], |f| {
            f.push_str("this")
                .emit(opcode::GET_VARIABLE)
                .push_str("x")
                .emit(opcode::GET_MEMBER)
                .emit(opcode::RETURN);
        });
        b.push_str("o")
            .push_str("x")
            .push_number(7.0)
            .push_number(1.0)
            .emit(opcode::INIT_OBJECT)
            .emit(opcode::SET_VARIABLE);
        b.push_str("o")
            .emit(opcode::GET_VARIABLE)
            .push_number(1.0)
            .push_str("getx")
            .emit(opcode::GET_VARIABLE)
            .push_str("call")
            .emit(opcode::CALL_METHOD)
            .emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(7.0));
}

#[test]
fn test_function_apply_spreads_array() {
    let result = eval(7, |b| {
        b.define_function("sub", &["a", "b"], |f| {
            f.push_str("a")
                .emit(opcode::GET_VARIABLE)
                .push_str("b")
                .emit(opcode::GET_VARIABLE)
                .emit(opcode::SUBTRACT)
                .emit(opcode::RETURN);
        });
        // apply(null, [9, 4])
        b.push_number(4.0)
            .push_number(9.0)
            .push_number(2.0)
            .emit(opcode::INIT_ARRAY)
            .push_null()
            .push_number(2.0)
            .push_str("sub")
            .emit(opcode::GET_VARIABLE)
            .push_str("apply")
            .emit(opcode::CALL_METHOD)
            .emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(5.0));
}

#[test]
fn test_new_object_runs_constructor() {
    let result = eval(7, |b| {
        b.define_function("Point", &["x"], |f| {
            f.push_str("this")
                .emit(opcode::GET_VARIABLE)
                .push_str("x")
                .push_str("x")
                .emit(opcode::GET_VARIABLE)
                .emit(opcode::SET_MEMBER);
        });
        b.push_number(4.0)
            .push_number(1.0)
            .push_str("Point")
            .emit(opcode::NEW_OBJECT)
            .push_str("x")
            .emit(opcode::GET_MEMBER)
            .emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(4.0));
}

#[test]
fn test_constructor_return_value_is_ignored() {
    let out = traces(7, |b| {
        b.define_function("C", &[], |f| {
            f.push_number(5.0).emit(opcode::RETURN);
        });
        b.push_number(0.0)
            .push_str("C")
            .emit(opcode::NEW_OBJECT)
            .emit(opcode::TYPE_OF)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["object"]);
}

#[test]
fn test_anonymous_function_is_pushed() {
    let out = traces(7, |b| {
        b.push_str("f");
        b.define_function("", &[], |f| {
            f.push_str("called").emit(opcode::TRACE);
        });
        b.emit(opcode::SET_VARIABLE);
        call(b, "f", &[]);
        b.emit(opcode::POP);
        b.push_str("f")
            .emit(opcode::GET_VARIABLE)
            .emit(opcode::TYPE_OF)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["called", "function"]);
}

fn native_double(ctx: &mut Context, _this: &Value, args: &[Value]) -> Result<Value, VmError> {
    let n = match args.first() {
        Some(value) => ctx.to_number(value)?,
        None => f64::NAN,
    };
    Ok(Value::Number(n * 2.0))
}

#[test]
fn test_host_native_functions() {
    let (mut ctx, _) = create_context(7);
    let global = ctx.global();
    ctx.define_native(&global, "double", native_double);
    let result = exec(&mut ctx, 7, |b| {
        call(b, "double", &[21.0]);
        b.emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(42.0));
}

#[test]
fn test_host_calls_into_script() {
    let (mut ctx, _) = create_context(7);
    exec(&mut ctx, 7, |b| {
        b.push_str("greet");
        b.define_function("", &["who"], |f| {
            f.push_str("hi ")
                .push_str("who")
                .emit(opcode::GET_VARIABLE)
                .emit(opcode::ADD2)
                .emit(opcode::RETURN);
        });
        b.emit(opcode::SET_VARIABLE);
    });
    let root = ctx.root_movie();
    let greet = member(&mut ctx, &root, "greet");
    let who = Value::String(ctx.intern("there"));
    let result = ctx
        .call_function(&greet, &Value::Undefined, &[who])
        .expect("call succeeded");
    assert_eq!(as_str(&result).as_deref(), Some("hi there"));

    let result = ctx
        .call_method(&root, "greet", &[Value::Number(1.0)])
        .expect("call succeeded");
    assert_eq!(as_str(&result).as_deref(), Some("hi 1"));
}

#[test]
fn test_builtin_methods_on_primitives() {
    let out = traces(7, |b| {
        b.push_number(0.0)
            .push_str("hello")
            .push_str("toUpperCase")
            .emit(opcode::CALL_METHOD)
            .emit(opcode::TRACE);
        b.push_number(16.0)
            .push_number(1.0)
            .push_number(255.0)
            .push_str("toString")
            .emit(opcode::CALL_METHOD)
            .emit(opcode::TRACE);
        b.push_str("hello")
            .push_str("length")
            .emit(opcode::GET_MEMBER)
            .emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["HELLO", "ff", "5"]);
}

#[test]
fn test_array_builtins() {
    let out = traces(7, |b| {
        b.push_str("arr")
            .push_str("b")
            .push_str("a")
            .push_number(2.0)
            .emit(opcode::INIT_ARRAY)
            .emit(opcode::SET_VARIABLE);
        b.push_str("c")
            .push_number(1.0)
            .push_str("arr")
            .emit(opcode::GET_VARIABLE)
            .push_str("push")
            .emit(opcode::CALL_METHOD)
            .emit(opcode::TRACE);
        b.push_str("-")
            .push_number(1.0)
            .push_str("arr")
            .emit(opcode::GET_VARIABLE)
            .push_str("join")
            .emit(opcode::CALL_METHOD)
            .emit(opcode::TRACE);
        b.push_str("arr").emit(opcode::GET_VARIABLE).emit(opcode::TRACE);
    });
    assert_eq!(out, vec!["3", "a-b-c", "a,b,c"]);
}
