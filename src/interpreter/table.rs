//! The action table
//!
//! One entry per action code with its name, an operand printer for the
//! disassembler, the stack depth it needs and one handler per version
//! bucket. Buckets cover versions 3 (and older), 4, 5, 6 and 7 (and newer).

use crate::disasm;
use crate::opcode as op;

use super::actions::ActionHandler;
use super::actions::{arithmetic, control, movie, objects, stack, strings};

/// Renders the operands of an action
pub type PrintFn = fn(&[u8]) -> Option<String>;

/// Number of version buckets
pub const VERSION_BUCKETS: usize = 5;

type Handlers = [Option<ActionHandler>; VERSION_BUCKETS];

/// Table entry for one action code
#[derive(Clone, Copy)]
pub struct ActionSpec {
    pub name: &'static str,
    pub print: Option<PrintFn>,
    /// Values that must be on the stack; missing ones are padded with
    /// Undefined
    pub min_stack: i32,
    /// Net change of the stack depth, for diagnostics
    pub stack_delta: i32,
    pub(crate) handlers: Handlers,
}

impl ActionSpec {
    /// Whether the action has a handler for scripts of `version`
    pub fn supported_in(&self, version: u8) -> bool {
        self.handlers
            .get(version_bucket(version))
            .is_some_and(Option::is_some)
    }
}

impl std::fmt::Debug for ActionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSpec")
            .field("name", &self.name)
            .field("min_stack", &self.min_stack)
            .field("stack_delta", &self.stack_delta)
            .finish()
    }
}

/// Bucket index for a script version
pub const fn version_bucket(version: u8) -> usize {
    let clamped = if version < 3 {
        3
    } else if version > 7 {
        7
    } else {
        version
    };
    (clamped - 3) as usize
}

const UNKNOWN: ActionSpec = ActionSpec {
    name: "",
    print: None,
    min_stack: 0,
    stack_delta: 0,
    handlers: [None; VERSION_BUCKETS],
};

const fn spec(name: &'static str, min_stack: i32, stack_delta: i32, handlers: Handlers) -> ActionSpec {
    ActionSpec {
        name,
        print: None,
        min_stack,
        stack_delta,
        handlers,
    }
}

const fn printed(spec: ActionSpec, print: PrintFn) -> ActionSpec {
    ActionSpec {
        print: Some(print),
        ..spec
    }
}

/// Available from version 3 on
const fn v3(h: ActionHandler) -> Handlers {
    [Some(h); VERSION_BUCKETS]
}

const fn v4(h: ActionHandler) -> Handlers {
    [None, Some(h), Some(h), Some(h), Some(h)]
}

const fn v5(h: ActionHandler) -> Handlers {
    [None, None, Some(h), Some(h), Some(h)]
}

const fn v6(h: ActionHandler) -> Handlers {
    [None, None, None, Some(h), Some(h)]
}

const fn v7(h: ActionHandler) -> Handlers {
    [None, None, None, None, Some(h)]
}

/// Named but unsupported in every version
const NONE: Handlers = [None; VERSION_BUCKETS];

/// The table of all 256 action codes
pub static ACTIONS: [ActionSpec; 256] = build();

#[allow(clippy::indexing_slicing)]
const fn build() -> [ActionSpec; 256] {
    let mut t = [UNKNOWN; 256];

    // ═══════════════════════════════════════════════════════════════
    // Version 1-3
    // ═══════════════════════════════════════════════════════════════
    t[op::END as usize] = spec("End", 0, 0, NONE);
    t[op::NEXT_FRAME as usize] = spec("NextFrame", 0, 0, v3(movie::next_frame));
    t[op::PREVIOUS_FRAME as usize] = spec("PreviousFrame", 0, 0, v3(movie::next_frame));
    t[op::PLAY as usize] = spec("Play", 0, 0, v3(movie::play));
    t[op::STOP as usize] = spec("Stop", 0, 0, v3(movie::play));
    t[op::TOGGLE_QUALITY as usize] = spec("ToggleQuality", 0, 0, v3(movie::player_request));
    t[op::STOP_SOUNDS as usize] = spec("StopSounds", 0, 0, v3(movie::player_request));
    t[op::GOTO_FRAME as usize] = printed(
        spec("GotoFrame", 0, 0, v3(movie::goto_frame)),
        disasm::print_u16,
    );
    t[op::GET_URL as usize] = printed(
        spec("GetURL", 0, 0, v3(movie::get_url)),
        disasm::print_get_url,
    );
    t[op::WAIT_FOR_FRAME as usize] = printed(
        spec("WaitForFrame", 0, 0, v3(control::wait_for_frame)),
        disasm::print_wait_for_frame,
    );
    t[op::SET_TARGET as usize] = printed(
        spec("SetTarget", 0, 0, v3(movie::set_target)),
        disasm::print_string,
    );
    t[op::GOTO_LABEL as usize] = printed(
        spec("GotoLabel", 0, 0, v3(movie::goto_label)),
        disasm::print_string,
    );

    // ═══════════════════════════════════════════════════════════════
    // Version 4
    // ═══════════════════════════════════════════════════════════════
    t[op::ADD as usize] = spec("Add", 2, -1, v4(arithmetic::binary));
    t[op::SUBTRACT as usize] = spec("Subtract", 2, -1, v4(arithmetic::binary));
    t[op::MULTIPLY as usize] = spec("Multiply", 2, -1, v4(arithmetic::binary));
    t[op::DIVIDE as usize] = spec(
        "Divide",
        2,
        -1,
        [
            None,
            Some(arithmetic::divide_v4),
            Some(arithmetic::divide_v5),
            Some(arithmetic::divide_v5),
            Some(arithmetic::divide_v7),
        ],
    );
    t[op::EQUALS as usize] = spec("Equals", 2, -1, v4(arithmetic::equals));
    t[op::LESS as usize] = spec("Less", 2, -1, v4(arithmetic::less));
    t[op::AND as usize] = spec("And", 2, -1, v4(arithmetic::logical));
    t[op::OR as usize] = spec("Or", 2, -1, v4(arithmetic::logical));
    t[op::NOT as usize] = spec("Not", 1, 0, v4(arithmetic::not));
    t[op::STRING_EQUALS as usize] = spec("StringEquals", 2, -1, v4(strings::string_equals));
    t[op::STRING_LENGTH as usize] = spec("StringLength", 1, 0, v4(strings::string_length));
    t[op::STRING_EXTRACT as usize] = spec("StringExtract", 3, -2, v4(strings::string_extract));
    t[op::POP as usize] = spec("Pop", 1, -1, v4(stack::pop));
    t[op::TO_INTEGER as usize] = spec("ToInteger", 1, 0, v4(arithmetic::to_integer_action));
    t[op::GET_VARIABLE as usize] = spec("GetVariable", 1, 0, v4(objects::get_variable));
    t[op::SET_VARIABLE as usize] = spec("SetVariable", 2, -2, v4(objects::set_variable));
    t[op::SET_TARGET2 as usize] = spec("SetTarget2", 1, -1, v4(movie::set_target2));
    t[op::STRING_ADD as usize] = spec("StringAdd", 2, -1, v4(strings::string_add));
    t[op::GET_PROPERTY as usize] = spec("GetProperty", 2, -1, v4(movie::get_property));
    t[op::SET_PROPERTY as usize] = spec("SetProperty", 3, -3, v4(movie::set_property));
    t[op::CLONE_SPRITE as usize] = spec("CloneSprite", 3, -3, v4(movie::clone_sprite));
    t[op::REMOVE_SPRITE as usize] = spec("RemoveSprite", 1, -1, v4(movie::remove_sprite));
    t[op::TRACE as usize] = spec("Trace", 1, -1, v4(movie::trace));
    t[op::START_DRAG as usize] = spec("StartDrag", 3, -3, v4(movie::start_drag));
    t[op::END_DRAG as usize] = spec("EndDrag", 0, 0, v4(movie::end_drag));
    t[op::STRING_LESS as usize] = spec("StringLess", 2, -1, v4(strings::string_compare));
    t[op::RANDOM_NUMBER as usize] = spec("RandomNumber", 1, 0, v4(movie::random_number));
    t[op::MB_STRING_LENGTH as usize] = spec("MBStringLength", 1, 0, v4(strings::string_length));
    t[op::CHAR_TO_ASCII as usize] = spec("CharToAscii", 1, 0, v4(strings::char_to_ascii));
    t[op::ASCII_TO_CHAR as usize] = spec("AsciiToChar", 1, 0, v4(strings::ascii_to_char));
    t[op::GET_TIME as usize] = spec("GetTime", 0, 1, v4(movie::get_time));
    t[op::MB_STRING_EXTRACT as usize] =
        spec("MBStringExtract", 3, -2, v4(strings::string_extract));
    t[op::MB_CHAR_TO_ASCII as usize] = spec("MBCharToAscii", 1, 0, v4(strings::char_to_ascii));
    t[op::MB_ASCII_TO_CHAR as usize] = spec("MBAsciiToChar", 1, 0, v4(strings::ascii_to_char));
    t[op::WAIT_FOR_FRAME2 as usize] = printed(
        spec("WaitForFrame2", 1, -1, v4(control::wait_for_frame2)),
        disasm::print_u8,
    );
    t[op::PUSH as usize] = printed(spec("Push", 0, 1, v4(stack::push)), disasm::print_push);
    t[op::JUMP as usize] = printed(spec("Jump", 0, 0, v4(control::jump)), disasm::print_i16);
    t[op::GET_URL2 as usize] = printed(
        spec("GetURL2", 2, -2, v4(movie::get_url2)),
        disasm::print_u8,
    );
    t[op::IF as usize] = printed(
        spec(
            "If",
            1,
            -1,
            [
                None,
                Some(control::if_v4),
                Some(control::if_v5),
                Some(control::if_v5),
                Some(control::if_v5),
            ],
        ),
        disasm::print_i16,
    );
    t[op::CALL as usize] = spec("Call", 1, -1, v4(movie::call));
    t[op::GOTO_FRAME2 as usize] = printed(
        spec("GotoFrame2", 1, -1, v4(movie::goto_frame2)),
        disasm::print_goto_frame2,
    );

    // ═══════════════════════════════════════════════════════════════
    // Version 5
    // ═══════════════════════════════════════════════════════════════
    t[op::DELETE as usize] = spec("Delete", 2, -1, v5(objects::delete));
    t[op::DELETE2 as usize] = spec("Delete2", 1, 0, v5(objects::delete2));
    t[op::DEFINE_LOCAL as usize] = spec("DefineLocal", 2, -2, v5(objects::define_local));
    t[op::CALL_FUNCTION as usize] = spec("CallFunction", 2, -1, v5(control::call_function));
    t[op::RETURN as usize] = spec("Return", 1, -1, v5(control::return_action));
    t[op::MODULO as usize] = spec(
        "Modulo",
        2,
        -1,
        [
            None,
            None,
            Some(arithmetic::modulo_v5),
            Some(arithmetic::modulo_v5),
            Some(arithmetic::modulo_v7),
        ],
    );
    t[op::NEW_OBJECT as usize] = spec("NewObject", 2, -1, v5(objects::new_object));
    t[op::DEFINE_LOCAL2 as usize] = spec("DefineLocal2", 1, -1, v5(objects::define_local2));
    t[op::INIT_ARRAY as usize] = spec("InitArray", 1, 0, v5(objects::init_array));
    t[op::INIT_OBJECT as usize] = spec("InitObject", 1, 0, v5(objects::init_object));
    t[op::TYPE_OF as usize] = spec("TypeOf", 1, 0, v5(objects::type_of));
    t[op::TARGET_PATH as usize] = spec("TargetPath", 1, 0, v5(objects::target_path));
    t[op::ENUMERATE as usize] = spec("Enumerate", 1, 0, v5(objects::enumerate));
    t[op::ADD2 as usize] = spec("Add2", 2, -1, v5(arithmetic::add2));
    t[op::LESS2 as usize] = spec("Less2", 2, -1, v5(arithmetic::less2));
    t[op::EQUALS2 as usize] = spec("Equals2", 2, -1, v5(arithmetic::equals2));
    t[op::TO_NUMBER as usize] = spec("ToNumber", 1, 0, v5(arithmetic::to_number));
    t[op::TO_STRING as usize] = spec("ToString", 1, 0, v5(arithmetic::to_string));
    t[op::PUSH_DUPLICATE as usize] = spec("PushDuplicate", 1, 1, v5(stack::push_duplicate));
    t[op::STACK_SWAP as usize] = spec("StackSwap", 2, 0, v5(stack::stack_swap));
    t[op::GET_MEMBER as usize] = spec("GetMember", 2, -1, v5(objects::get_member));
    t[op::SET_MEMBER as usize] = spec("SetMember", 3, -3, v5(objects::set_member));
    t[op::INCREMENT as usize] = spec("Increment", 1, 0, v5(arithmetic::increment));
    t[op::DECREMENT as usize] = spec("Decrement", 1, 0, v5(arithmetic::increment));
    t[op::CALL_METHOD as usize] = spec("CallMethod", 3, -2, v5(control::call_method));
    t[op::NEW_METHOD as usize] = spec("NewMethod", 3, -2, v5(objects::new_method));
    t[op::BIT_AND as usize] = spec("BitAnd", 2, -1, v5(arithmetic::bitwise));
    t[op::BIT_OR as usize] = spec("BitOr", 2, -1, v5(arithmetic::bitwise));
    t[op::BIT_XOR as usize] = spec("BitXor", 2, -1, v5(arithmetic::bitwise));
    t[op::BIT_LSHIFT as usize] = spec("BitLShift", 2, -1, v5(arithmetic::bitwise));
    t[op::BIT_RSHIFT as usize] = spec("BitRShift", 2, -1, v5(arithmetic::bitwise));
    t[op::BIT_URSHIFT as usize] = spec("BitURShift", 2, -1, v5(arithmetic::bitwise));
    t[op::STORE_REGISTER as usize] = printed(
        spec("StoreRegister", 1, 0, v5(stack::store_register)),
        disasm::print_u8,
    );
    t[op::CONSTANT_POOL as usize] = printed(
        spec("ConstantPool", 0, 0, v5(stack::constant_pool)),
        disasm::print_constant_pool,
    );
    t[op::WITH as usize] = printed(spec("With", 1, -1, v5(control::with)), disasm::print_u16);
    t[op::DEFINE_FUNCTION as usize] = printed(
        spec("DefineFunction", 0, 0, v5(control::define_function)),
        disasm::print_define_function,
    );

    // ═══════════════════════════════════════════════════════════════
    // Version 6
    // ═══════════════════════════════════════════════════════════════
    t[op::INSTANCE_OF as usize] = spec("InstanceOf", 2, -1, v6(objects::instance_of));
    t[op::ENUMERATE2 as usize] = spec("Enumerate2", 1, 0, v6(objects::enumerate2));
    t[op::STRICT_EQUALS as usize] = spec("StrictEquals", 2, -1, v6(arithmetic::strict_equals));
    t[op::GREATER as usize] = spec("Greater", 2, -1, v6(arithmetic::greater));
    t[op::STRING_GREATER as usize] = spec("StringGreater", 2, -1, v6(strings::string_compare));

    // ═══════════════════════════════════════════════════════════════
    // Version 7
    // ═══════════════════════════════════════════════════════════════
    t[op::CAST as usize] = spec("Cast", 2, -1, v7(objects::cast));
    t[op::EXTENDS as usize] = spec("Extends", 2, -2, v7(objects::extends));
    t[op::DEFINE_FUNCTION2 as usize] = printed(
        spec("DefineFunction2", 0, 0, v7(control::define_function)),
        disasm::print_define_function2,
    );
    // Exceptions are not implemented
    t[op::THROW as usize] = spec("Throw", 1, -1, NONE);
    t[op::IMPLEMENTS as usize] = spec("Implements", 2, -2, NONE);
    t[op::TRY as usize] = spec("Try", 0, 0, NONE);

    t
}
