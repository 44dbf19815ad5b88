//! Integration tests for the VM, organized by feature
//!
//! Scripts are assembled with `ActionBuilder` and executed through the
//! public `Context` API. A recording host captures everything the VM hands
//! to the player.

mod arithmetic;
mod constant_pool;
mod functions;
mod gc;
mod movie;
mod push;
mod super_chain;

use std::cell::RefCell;
use std::rc::Rc;

use asvm::{
    ActionBuilder, Context, DisplayRequest, Host, ObjRef, Script, UrlMethod, Value, VmConfig,
};

/// Everything a script handed to the host
#[derive(Debug, Default)]
pub struct HostLog {
    pub traces: Vec<String>,
    pub urls: Vec<(String, String, UrlMethod)>,
    pub display: Vec<DisplayRequest>,
    pub frame_calls: Vec<(String, usize)>,
}

/// Host recording into a shared log, with a fixed clock and random value
#[derive(Clone, Default)]
pub struct RecordingHost {
    pub log: Rc<RefCell<HostLog>>,
    pub random: f64,
    pub time: f64,
}

impl Host for RecordingHost {
    fn trace(&mut self, message: &str) {
        self.log.borrow_mut().traces.push(message.to_string());
    }

    fn get_url(&mut self, url: &str, target: &str, method: UrlMethod) {
        self.log
            .borrow_mut()
            .urls
            .push((url.to_string(), target.to_string(), method));
    }

    fn display(&mut self, request: DisplayRequest) {
        self.log.borrow_mut().display.push(request);
    }

    fn call_frame(&mut self, movie: &ObjRef, frame: usize) {
        let name = movie
            .borrow()
            .as_movie()
            .map(|m| m.name.to_string())
            .unwrap_or_default();
        self.log.borrow_mut().frame_calls.push((name, frame));
    }

    fn time_millis(&mut self) -> f64 {
        self.time
    }

    fn random(&mut self) -> f64 {
        self.random
    }
}

/// A context of `version` with a recording host
#[allow(clippy::expect_used)]
pub fn create_context(version: u8) -> (Context, Rc<RefCell<HostLog>>) {
    let host = RecordingHost::default();
    let log = host.log.clone();
    let ctx = Context::with_config(VmConfig::with_version(version), host)
        .expect("valid test configuration");
    (ctx, log)
}

/// Assemble a script of `version`
pub fn script(version: u8, build: impl FnOnce(&mut ActionBuilder)) -> Rc<Script> {
    let mut builder = ActionBuilder::new(version);
    build(&mut builder);
    Rc::new(Script::new(None, builder.finish(), version))
}

/// Execute a script in `ctx`, failing the test on a fatal error
#[allow(clippy::expect_used)]
pub fn exec(ctx: &mut Context, version: u8, build: impl FnOnce(&mut ActionBuilder)) -> Value {
    let script = script(version, build);
    ctx.execute(&script).expect("script execution failed")
}

/// Run a script in a fresh context and return its top-level Return value
pub fn eval(version: u8, build: impl FnOnce(&mut ActionBuilder)) -> Value {
    let (mut ctx, _) = create_context(version);
    exec(&mut ctx, version, build)
}

/// Run a script in a fresh context and return the traced lines
pub fn traces(version: u8, build: impl FnOnce(&mut ActionBuilder)) -> Vec<String> {
    let (mut ctx, log) = create_context(version);
    exec(&mut ctx, version, build);
    let traces = log.borrow().traces.clone();
    traces
}

/// String content of a value, None for non-strings
pub fn as_str(value: &Value) -> Option<String> {
    value.as_string().map(|s| s.to_string())
}

/// A member of `obj` by name
pub fn member(ctx: &mut Context, obj: &ObjRef, name: &str) -> Value {
    let key = ctx.intern(name);
    ctx.get_member(obj, &key).unwrap_or_default()
}
