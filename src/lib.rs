//! ActionScript 1/2 bytecode virtual machine for SWF players
//!
//! Executes the action records of SWF versions 1 through 7 against a
//! host-provided movie tree. Container parsing, rendering and sound stay
//! with the player; the VM reaches it through [`Host`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use asvm::{ActionBuilder, Context, NoOpHost, Script, opcode};
//!
//! let mut code = ActionBuilder::new(7);
//! code.push_number(1.0).push_number(2.0).emit(opcode::ADD2).emit(opcode::RETURN);
//! let script = Rc::new(Script::new(None, code.finish(), 7));
//!
//! let mut ctx = Context::new(NoOpHost);
//! let result = ctx.execute(&script).unwrap();
//! assert_eq!(result, asvm::Value::Number(3.0));
//! ```

pub mod builder;
pub mod config;
pub mod constant_pool;
pub mod disasm;
pub mod error;
pub mod frame;
pub mod gc;
pub mod host;
pub mod interpreter;
pub mod movie;
pub mod object;
pub mod opcode;
pub mod reader;
pub mod script;
pub mod stack;
pub mod string_dict;
pub mod super_proxy;
pub mod value;

pub use builder::{ActionBuilder, JumpPlaceholder, PushValue};
pub use config::VmConfig;
pub use constant_pool::ConstantPool;
pub use disasm::disassemble;
pub use error::VmError;
pub use gc::{GcStats, Guard};
pub use host::{DisplayRequest, Host, NoOpHost, UrlMethod};
pub use interpreter::{ACTIONS, ActionSpec, Context};
pub use movie::{SimpleTimeline, Timeline};
pub use object::{AsObject, NativeFn, VariableFlags};
pub use script::{FunctionFlags, Script};
pub use value::{AsString, CheapClone, ObjRef, Value};

#[cfg(feature = "std")]
pub use host::StdHost;
