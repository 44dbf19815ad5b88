//! Garbage collection of script objects

use super::{create_context, exec, member};
use asvm::{Context, Value, VmError, opcode};

fn live(ctx: &Context) -> usize {
    ctx.gc_stats().live_objects
}

#[test]
fn test_unreachable_objects_are_freed() {
    let (mut ctx, _) = create_context(7);
    ctx.collect();
    let baseline = live(&ctx);

    exec(&mut ctx, 7, |b| {
        b.push_number(0.0)
            .emit(opcode::INIT_OBJECT)
            .emit(opcode::POP)
            .push_number(0.0)
            .emit(opcode::INIT_ARRAY)
            .emit(opcode::POP);
    });
    assert_eq!(live(&ctx), baseline + 2);
    assert_eq!(ctx.collect(), 2);
    assert_eq!(live(&ctx), baseline);
}

#[test]
fn test_cycles_are_collected() {
    let (mut ctx, _) = create_context(7);
    ctx.collect();
    let baseline = live(&ctx);

    exec(&mut ctx, 7, |b| {
        for name in ["a", "b"] {
            b.push_str(name)
                .push_number(0.0)
                .emit(opcode::INIT_OBJECT)
                .emit(opcode::SET_VARIABLE);
        }
        for (from, to) in [("a", "b"), ("b", "a")] {
            b.push_str(from)
                .emit(opcode::GET_VARIABLE)
                .push_str("other")
                .push_str(to)
                .emit(opcode::GET_VARIABLE)
                .emit(opcode::SET_MEMBER);
        }
    });
    ctx.collect();
    assert_eq!(live(&ctx), baseline + 2);

    exec(&mut ctx, 7, |b| {
        b.push_str("a")
            .emit(opcode::DELETE2)
            .emit(opcode::POP)
            .push_str("b")
            .emit(opcode::DELETE2)
            .emit(opcode::POP);
    });
    assert_eq!(ctx.collect(), 2);
    assert_eq!(live(&ctx), baseline);
}

#[test]
fn test_timeline_variables_survive() {
    let (mut ctx, _) = create_context(7);
    exec(&mut ctx, 7, |b| {
        b.push_str("keep")
            .push_str("n")
            .push_number(5.0)
            .push_number(1.0)
            .emit(opcode::INIT_OBJECT)
            .emit(opcode::SET_VARIABLE);
    });
    ctx.collect();

    let root = ctx.root_movie();
    let kept = member(&mut ctx, &root, "keep");
    let obj = kept.as_object().cloned().expect("object variable");
    assert!(obj.is_live());
    assert_eq!(member(&mut ctx, &obj, "n"), Value::Number(5.0));
}

#[test]
fn test_guard_roots_host_objects() {
    let (mut ctx, _) = create_context(7);
    let guard = ctx.create_guard();
    let obj = ctx.create_object();
    guard.guard(&obj);

    ctx.collect();
    assert!(obj.is_live());

    guard.unguard(&obj);
    ctx.collect();
    assert!(!obj.is_live());
}

#[test]
fn test_function_calls_leave_no_garbage() {
    let (mut ctx, _) = create_context(7);
    exec(&mut ctx, 7, |b| {
        b.define_function("work", &["x"], |f| {
            f.push_number(0.0)
                .emit(opcode::INIT_OBJECT)
                .emit(opcode::POP)
                .push_str("x")
                .emit(opcode::GET_VARIABLE)
                .emit(opcode::RETURN);
        });
    });
    ctx.collect();
    let baseline = live(&ctx);

    let result = exec(&mut ctx, 7, |b| {
        for i in 0..10 {
            b.push_number(i as f64)
                .push_number(1.0)
                .push_str("work")
                .emit(opcode::CALL_FUNCTION)
                .emit(opcode::POP);
        }
        b.push_str("done").emit(opcode::RETURN);
    });
    assert_eq!(result, Value::String("done".into()));
    assert!(live(&ctx) > baseline);
    ctx.collect();
    assert_eq!(live(&ctx), baseline);
}

fn native_collect(ctx: &mut Context, _this: &Value, _args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Number(ctx.collect() as f64))
}

#[test]
fn test_collection_during_execution_keeps_frames_alive() {
    let (mut ctx, log) = create_context(7);
    let global = ctx.global();
    ctx.define_native(&global, "collect", native_collect);

    exec(&mut ctx, 7, |b| {
        b.define_function("f", &[], |f| {
            f.push_str("local")
                .push_str("v")
                .push_str("in local")
                .push_number(1.0)
                .emit(opcode::INIT_OBJECT)
                .emit(opcode::DEFINE_LOCAL);
            f.push_str("in register")
                .emit(opcode::TRACE)
                .push_number(0.0)
                .emit(opcode::INIT_ARRAY)
                .store_register(1)
                .emit(opcode::POP);
            f.push_number(0.0)
                .push_str("collect")
                .emit(opcode::CALL_FUNCTION)
                .emit(opcode::POP);
            f.push_str("local")
                .emit(opcode::GET_VARIABLE)
                .push_str("v")
                .emit(opcode::GET_MEMBER)
                .emit(opcode::TRACE);
            f.push_register(1).emit(opcode::TYPE_OF).emit(opcode::TRACE);
        });
        b.push_number(0.0)
            .push_str("f")
            .emit(opcode::CALL_FUNCTION)
            .emit(opcode::POP);
    });
    assert_eq!(
        log.borrow().traces,
        vec!["in register", "in local", "object"]
    );
}

/// Collect, then read `x` from the first argument
fn native_collect_then_read_arg(
    ctx: &mut Context,
    _this: &Value,
    args: &[Value],
) -> Result<Value, VmError> {
    ctx.collect();
    let x = ctx.intern("x");
    Ok(match args.first() {
        Some(Value::Object(obj)) => ctx.get_member(obj, &x).unwrap_or_default(),
        _ => Value::Undefined,
    })
}

/// Collect, then read `x` from `this`
fn native_collect_then_read_this(
    ctx: &mut Context,
    this: &Value,
    _args: &[Value],
) -> Result<Value, VmError> {
    ctx.collect();
    let x = ctx.intern("x");
    Ok(match this {
        Value::Object(obj) => ctx.get_member(obj, &x).unwrap_or_default(),
        _ => Value::Undefined,
    })
}

#[test]
fn test_native_arguments_survive_collection() {
    let (mut ctx, log) = create_context(7);
    let global = ctx.global();
    ctx.define_native(&global, "readArg", native_collect_then_read_arg);
    ctx.define_native(&global, "readThis", native_collect_then_read_this);

    exec(&mut ctx, 7, |b| {
        // readArg({ x: 5 })
        b.push_str("x")
            .push_number(5.0)
            .push_number(1.0)
            .emit(opcode::INIT_OBJECT)
            .push_number(1.0)
            .push_str("readArg")
            .emit(opcode::CALL_FUNCTION)
            .emit(opcode::TRACE);
        // ({ x: 7, read: readThis }).read()
        b.push_number(0.0)
            .push_str("x")
            .push_number(7.0)
            .push_str("read")
            .push_str("readThis")
            .emit(opcode::GET_VARIABLE)
            .push_number(2.0)
            .emit(opcode::INIT_OBJECT)
            .push_str("read")
            .emit(opcode::CALL_METHOD)
            .emit(opcode::TRACE);
    });
    assert_eq!(log.borrow().traces, vec!["5", "7"]);
}
