//! Host integration traits.
//!
//! The VM reaches the surrounding player only through [`Host`]: trace output,
//! navigation, display-list requests, frame calls, time and randomness. Every
//! method has a default so a host implements only what it supports.

#[cfg(feature = "std")]
mod std_impl;

#[cfg(feature = "std")]
pub use std_impl::StdHost;

use crate::value::ObjRef;

/// HTTP method requested by GetURL2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMethod {
    None,
    Get,
    Post,
}

impl UrlMethod {
    /// Decode the low two bits of the GetURL2 flags
    pub fn from_flags(flags: u8) -> Self {
        match flags & 0x03 {
            1 => UrlMethod::Get,
            2 => UrlMethod::Post,
            _ => UrlMethod::None,
        }
    }
}

/// Display-list requests the VM cannot carry out itself
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayRequest {
    CloneSprite {
        source: String,
        target: String,
        depth: i32,
    },
    RemoveSprite {
        target: String,
    },
    StartDrag {
        target: String,
        lock_center: bool,
        /// `(x1, y1, x2, y2)` when constrained
        constraint: Option<(f64, f64, f64, f64)>,
    },
    EndDrag,
    ToggleQuality,
    StopSounds,
}

/// Callbacks into the surrounding player.
pub trait Host {
    /// Output of the Trace action
    fn trace(&mut self, _message: &str) {}

    /// GetURL / GetURL2 navigation
    fn get_url(&mut self, _url: &str, _target: &str, _method: UrlMethod) {}

    fn display(&mut self, _request: DisplayRequest) {}

    /// Run the actions of `frame` (0-based) of `movie`
    fn call_frame(&mut self, _movie: &ObjRef, _frame: usize) {}

    /// Milliseconds since the player started
    fn time_millis(&mut self) -> f64 {
        0.0
    }

    /// A random number in `[0, 1)`
    fn random(&mut self) -> f64 {
        0.0
    }
}

/// A host that discards all output and answers with constants.
pub struct NoOpHost;

impl Host for NoOpHost {}
