//! Action codes of SWF versions 1 through 7.
//!
//! Codes with the high bit set carry a u16 length and operand bytes.

pub const END: u8 = 0x00;
pub const NEXT_FRAME: u8 = 0x04;
pub const PREVIOUS_FRAME: u8 = 0x05;
pub const PLAY: u8 = 0x06;
pub const STOP: u8 = 0x07;
pub const TOGGLE_QUALITY: u8 = 0x08;
pub const STOP_SOUNDS: u8 = 0x09;
pub const ADD: u8 = 0x0A;
pub const SUBTRACT: u8 = 0x0B;
pub const MULTIPLY: u8 = 0x0C;
pub const DIVIDE: u8 = 0x0D;
pub const EQUALS: u8 = 0x0E;
pub const LESS: u8 = 0x0F;
pub const AND: u8 = 0x10;
pub const OR: u8 = 0x11;
pub const NOT: u8 = 0x12;
pub const STRING_EQUALS: u8 = 0x13;
pub const STRING_LENGTH: u8 = 0x14;
pub const STRING_EXTRACT: u8 = 0x15;
pub const POP: u8 = 0x17;
pub const TO_INTEGER: u8 = 0x18;
pub const GET_VARIABLE: u8 = 0x1C;
pub const SET_VARIABLE: u8 = 0x1D;
pub const SET_TARGET2: u8 = 0x20;
pub const STRING_ADD: u8 = 0x21;
pub const GET_PROPERTY: u8 = 0x22;
pub const SET_PROPERTY: u8 = 0x23;
pub const CLONE_SPRITE: u8 = 0x24;
pub const REMOVE_SPRITE: u8 = 0x25;
pub const TRACE: u8 = 0x26;
pub const START_DRAG: u8 = 0x27;
pub const END_DRAG: u8 = 0x28;
pub const STRING_LESS: u8 = 0x29;
pub const THROW: u8 = 0x2A;
pub const CAST: u8 = 0x2B;
pub const IMPLEMENTS: u8 = 0x2C;
pub const RANDOM_NUMBER: u8 = 0x30;
pub const MB_STRING_LENGTH: u8 = 0x31;
pub const CHAR_TO_ASCII: u8 = 0x32;
pub const ASCII_TO_CHAR: u8 = 0x33;
pub const GET_TIME: u8 = 0x34;
pub const MB_STRING_EXTRACT: u8 = 0x35;
pub const MB_CHAR_TO_ASCII: u8 = 0x36;
pub const MB_ASCII_TO_CHAR: u8 = 0x37;
pub const DELETE: u8 = 0x3A;
pub const DELETE2: u8 = 0x3B;
pub const DEFINE_LOCAL: u8 = 0x3C;
pub const CALL_FUNCTION: u8 = 0x3D;
pub const RETURN: u8 = 0x3E;
pub const MODULO: u8 = 0x3F;
pub const NEW_OBJECT: u8 = 0x40;
pub const DEFINE_LOCAL2: u8 = 0x41;
pub const INIT_ARRAY: u8 = 0x42;
pub const INIT_OBJECT: u8 = 0x43;
pub const TYPE_OF: u8 = 0x44;
pub const TARGET_PATH: u8 = 0x45;
pub const ENUMERATE: u8 = 0x46;
pub const ADD2: u8 = 0x47;
pub const LESS2: u8 = 0x48;
pub const EQUALS2: u8 = 0x49;
pub const TO_NUMBER: u8 = 0x4A;
pub const TO_STRING: u8 = 0x4B;
pub const PUSH_DUPLICATE: u8 = 0x4C;
pub const STACK_SWAP: u8 = 0x4D;
pub const GET_MEMBER: u8 = 0x4E;
pub const SET_MEMBER: u8 = 0x4F;
pub const INCREMENT: u8 = 0x50;
pub const DECREMENT: u8 = 0x51;
pub const CALL_METHOD: u8 = 0x52;
pub const NEW_METHOD: u8 = 0x53;
pub const INSTANCE_OF: u8 = 0x54;
pub const ENUMERATE2: u8 = 0x55;
pub const BIT_AND: u8 = 0x60;
pub const BIT_OR: u8 = 0x61;
pub const BIT_XOR: u8 = 0x62;
pub const BIT_LSHIFT: u8 = 0x63;
pub const BIT_RSHIFT: u8 = 0x64;
pub const BIT_URSHIFT: u8 = 0x65;
pub const STRICT_EQUALS: u8 = 0x66;
pub const GREATER: u8 = 0x67;
pub const STRING_GREATER: u8 = 0x68;
pub const EXTENDS: u8 = 0x69;
pub const GOTO_FRAME: u8 = 0x81;
pub const GET_URL: u8 = 0x83;
pub const STORE_REGISTER: u8 = 0x87;
pub const CONSTANT_POOL: u8 = 0x88;
pub const WAIT_FOR_FRAME: u8 = 0x8A;
pub const SET_TARGET: u8 = 0x8B;
pub const GOTO_LABEL: u8 = 0x8C;
pub const WAIT_FOR_FRAME2: u8 = 0x8D;
pub const DEFINE_FUNCTION2: u8 = 0x8E;
pub const TRY: u8 = 0x8F;
pub const WITH: u8 = 0x94;
pub const PUSH: u8 = 0x96;
pub const JUMP: u8 = 0x99;
pub const GET_URL2: u8 = 0x9A;
pub const DEFINE_FUNCTION: u8 = 0x9B;
pub const IF: u8 = 0x9D;
pub const CALL: u8 = 0x9E;
pub const GOTO_FRAME2: u8 = 0x9F;

/// Push record types
pub mod push {
    pub const STRING: u8 = 0;
    pub const FLOAT: u8 = 1;
    pub const NULL: u8 = 2;
    pub const UNDEFINED: u8 = 3;
    pub const REGISTER: u8 = 4;
    pub const BOOLEAN: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const INTEGER: u8 = 7;
    pub const CONSTANT8: u8 = 8;
    pub const CONSTANT16: u8 = 9;
}

/// Whether the action carries a length and operand bytes
pub const fn has_operands(action: u8) -> bool {
    action & 0x80 != 0
}
