//! Timeline, target and player actions
//!
//! Timeline changes go straight to the target movie's [`Timeline`];
//! everything the VM cannot do itself is forwarded to the host.
//!
//! [`Timeline`]: crate::movie::Timeline

use crate::error::VmError;
use crate::host::{DisplayRequest, UrlMethod};
use crate::interpreter::Context;
use crate::interpreter::property::PROPERTY_NAMES;
use crate::movie::Timeline;
use crate::opcode;
use crate::reader::ActionReader;
use crate::value::{CheapClone, ObjRef, Value, parse_number};

/// Run `f` on the timeline of the current target, if it is a movie
fn with_timeline(ctx: &mut Context, f: impl FnOnce(&mut dyn Timeline)) -> Result<(), VmError> {
    let target = ctx.frame()?.target.cheap_clone();
    let mut obj = target.borrow_mut();
    match obj.as_movie_mut() {
        Some(movie) => f(movie.timeline.as_mut()),
        None => tracing::warn!("target is not a movie"),
    }
    Ok(())
}

/// Clamp a signed frame index to the frames of `timeline`
fn clamp_frame(timeline: &dyn Timeline, frame: i64) -> usize {
    let last = timeline.n_frames().saturating_sub(1);
    usize::try_from(frame.max(0)).map_or(last, |frame| frame.min(last))
}

/// A signed frame index as a non-negative frame number
pub(crate) fn frame_number(frame: i64) -> usize {
    usize::try_from(frame.max(0)).unwrap_or(usize::MAX)
}

/// Move the current target to `frame`, clamped to the timeline
fn goto_and(ctx: &mut Context, frame: i64, play: bool) -> Result<(), VmError> {
    with_timeline(ctx, |timeline| {
        let frame = clamp_frame(timeline, frame);
        timeline.goto_frame(frame);
        if play {
            timeline.play();
        } else {
            timeline.stop();
        }
    })
}

/// 0-based frame named by a stack value: numbers count from 1, strings
/// are labels or numbers. The result is unclamped and may be negative.
pub(crate) fn frame_index(
    ctx: &mut Context,
    movie: &ObjRef,
    value: &Value,
) -> Result<Option<i64>, VmError> {
    let index = match value {
        Value::String(s) => {
            let label = movie
                .borrow()
                .as_movie()
                .and_then(|m| m.timeline.frame_for_label(s.as_str()));
            match label {
                Some(frame) => return Ok(Some(i64::try_from(frame).unwrap_or(i64::MAX))),
                None => parse_number(s.as_str(), ctx.version()),
            }
        }
        other => ctx.to_number(other)?,
    };
    if index.is_nan() {
        return Ok(None);
    }
    // Saturates for infinities and out of range values
    Ok(Some((index.floor() - 1.0) as i64))
}

/// Split `path:frame` into the movie and the frame part
fn split_frame_target(
    ctx: &mut Context,
    value: Value,
) -> Result<Option<(ObjRef, Value)>, VmError> {
    let target = ctx.frame()?.target.cheap_clone();
    if let Value::String(s) = &value {
        if let Some((path, frame)) = s.as_str().rsplit_once(':') {
            let frame = Value::String(ctx.intern(frame));
            return Ok(ctx.eval_path(&target, path)?.map(|movie| (movie, frame)));
        }
    }
    Ok(Some((target, value)))
}

pub(crate) fn next_frame(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    with_timeline(ctx, |timeline| {
        let current = timeline.current_frame();
        let frame = if action == opcode::NEXT_FRAME {
            (current + 1).min(timeline.n_frames().saturating_sub(1))
        } else {
            current.saturating_sub(1)
        };
        timeline.goto_frame(frame);
        timeline.stop();
    })
}

pub(crate) fn play(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    with_timeline(ctx, |timeline| {
        if action == opcode::PLAY {
            timeline.play();
        } else {
            timeline.stop();
        }
    })
}

pub(crate) fn goto_frame(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let frame = ActionReader::new(data).read_u16()?;
    goto_and(ctx, i64::from(frame), false)
}

pub(crate) fn goto_label(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let version = ctx.frame_version()?;
    let label = ActionReader::new(data).read_cstring(version)?;
    let target = ctx.frame()?.target.cheap_clone();
    let frame = target
        .borrow()
        .as_movie()
        .and_then(|m| m.timeline.frame_for_label(&label));
    match frame {
        Some(frame) => goto_and(ctx, i64::try_from(frame).unwrap_or(i64::MAX), false),
        None => {
            tracing::warn!(label = label.as_str(), "no such frame label");
            Ok(())
        }
    }
}

/// GotoFrame2: flag bit 0 plays after the jump, bit 1 adds a bias
pub(crate) fn goto_frame2(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let mut reader = ActionReader::new(data);
    let flags = reader.read_u8()?;
    let bias = if flags & 0x02 != 0 {
        i64::from(reader.read_u16()?)
    } else {
        0
    };
    let play = flags & 0x01 != 0;
    let value = ctx.pop()?;
    let Some((movie, frame)) = split_frame_target(ctx, value)? else {
        tracing::warn!("GotoFrame2 target not found");
        return Ok(());
    };
    let Some(index) = frame_index(ctx, &movie, &frame)? else {
        tracing::warn!(frame = ?frame, "GotoFrame2 frame not found");
        return Ok(());
    };
    let mut obj = movie.borrow_mut();
    let Some(clip) = obj.as_movie_mut() else {
        return Ok(());
    };
    let timeline = clip.timeline.as_mut();
    let frame = clamp_frame(timeline, index.saturating_add(bias));
    timeline.goto_frame(frame);
    if play {
        timeline.play();
    } else {
        timeline.stop();
    }
    Ok(())
}

/// Call: run the actions of a frame of some movie
pub(crate) fn call(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let Some((movie, frame)) = split_frame_target(ctx, value)? else {
        tracing::warn!("Call target not found");
        return Ok(());
    };
    match frame_index(ctx, &movie, &frame)? {
        Some(index) => ctx.host.call_frame(&movie, frame_number(index)),
        None => tracing::warn!(frame = ?frame, "Call frame not found"),
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Targets
// ═══════════════════════════════════════════════════════════════════════════════

/// Point the frame at a new target. Paths are relative to the frame's
/// original target; an empty path restores it.
fn retarget(ctx: &mut Context, target: Option<ObjRef>, path: &str) -> Result<(), VmError> {
    let frame = ctx.frame_mut()?;
    frame.target = match target {
        Some(obj) => obj,
        None => {
            tracing::warn!(path, "SetTarget target not found");
            frame.original_target.cheap_clone()
        }
    };
    Ok(())
}

pub(crate) fn set_target(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let version = ctx.frame_version()?;
    let path = ActionReader::new(data).read_cstring(version)?;
    set_target_path(ctx, &path)
}

fn set_target_path(ctx: &mut Context, path: &str) -> Result<(), VmError> {
    let original = ctx.frame()?.original_target.cheap_clone();
    if path.is_empty() {
        return retarget(ctx, Some(original), path);
    }
    let target = ctx.eval_path(&original, path)?;
    retarget(ctx, target, path)
}

pub(crate) fn set_target2(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    match ctx.pop()? {
        Value::Object(obj) => retarget(ctx, Some(obj), ""),
        other => {
            let path = ctx.to_string(&other)?;
            set_target_path(ctx, path.as_str())
        }
    }
}

/// Movie addressed by a GetProperty/SetProperty operand; empty means the
/// current target
fn property_target(ctx: &mut Context, value: &Value) -> Result<Option<ObjRef>, VmError> {
    if value.as_string().is_some_and(|s| s.is_empty()) {
        return Ok(Some(ctx.frame()?.target.cheap_clone()));
    }
    ctx.value_to_target(value)
}

pub(crate) fn get_property(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let index = ctx.pop_integer()?;
    let target = ctx.pop()?;
    let name = usize::try_from(index)
        .ok()
        .and_then(|i| PROPERTY_NAMES.get(i).copied());
    let value = match (property_target(ctx, &target)?, name) {
        (Some(movie), Some(name)) => {
            let name = ctx.intern(name);
            ctx.get_member(&movie, &name).unwrap_or_default()
        }
        (_, None) => {
            tracing::warn!(index, "unknown property index");
            Value::Undefined
        }
        (None, _) => Value::Undefined,
    };
    ctx.push(value)
}

pub(crate) fn set_property(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let index = ctx.pop_integer()?;
    let target = ctx.pop()?;
    let name = usize::try_from(index)
        .ok()
        .and_then(|i| PROPERTY_NAMES.get(i).copied());
    match (property_target(ctx, &target)?, name) {
        (Some(movie), Some(name)) => {
            let name = ctx.intern(name);
            ctx.set_member(&movie, &name, value);
        }
        (_, None) => tracing::warn!(index, "unknown property index"),
        (None, _) => tracing::warn!(target = ?target, "SetProperty target not found"),
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Host requests
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn get_url(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let version = ctx.frame_version()?;
    let mut reader = ActionReader::new(data);
    let url = reader.read_cstring(version)?;
    let target = reader.read_cstring(version)?;
    ctx.host.get_url(&url, &target, UrlMethod::None);
    Ok(())
}

pub(crate) fn get_url2(ctx: &mut Context, _action: u8, data: &[u8]) -> Result<(), VmError> {
    let flags = ActionReader::new(data).read_u8()?;
    let target = ctx.pop_string()?;
    let url = ctx.pop_string()?;
    ctx.host
        .get_url(url.as_str(), target.as_str(), UrlMethod::from_flags(flags));
    Ok(())
}

pub(crate) fn player_request(ctx: &mut Context, action: u8, _data: &[u8]) -> Result<(), VmError> {
    let request = if action == opcode::TOGGLE_QUALITY {
        DisplayRequest::ToggleQuality
    } else {
        DisplayRequest::StopSounds
    };
    ctx.host.display(request);
    Ok(())
}

pub(crate) fn clone_sprite(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let depth = ctx.pop_integer()?;
    let target = ctx.pop_string()?;
    let source = ctx.pop_string()?;
    ctx.host.display(DisplayRequest::CloneSprite {
        source: source.to_string(),
        target: target.to_string(),
        depth,
    });
    Ok(())
}

pub(crate) fn remove_sprite(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let target = ctx.pop_string()?;
    ctx.host.display(DisplayRequest::RemoveSprite {
        target: target.to_string(),
    });
    Ok(())
}

/// StartDrag pops the target, the lock flag and the constrain flag, then
/// the rectangle when constrained
pub(crate) fn start_drag(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let target = ctx.pop_string()?;
    let lock = ctx.pop()?;
    let constrain = ctx.pop()?;
    let lock_center = ctx.to_boolean(&lock);
    let constraint = if ctx.to_boolean(&constrain) {
        let y2 = ctx.pop_number()?;
        let x2 = ctx.pop_number()?;
        let y1 = ctx.pop_number()?;
        let x1 = ctx.pop_number()?;
        Some((x1, y1, x2, y2))
    } else {
        None
    };
    ctx.host.display(DisplayRequest::StartDrag {
        target: target.to_string(),
        lock_center,
        constraint,
    });
    Ok(())
}

pub(crate) fn end_drag(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    ctx.host.display(DisplayRequest::EndDrag);
    Ok(())
}

/// Trace prints `undefined` for Undefined in every version
pub(crate) fn trace(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let value = ctx.pop()?;
    let message = match value {
        Value::Undefined => ctx.names.undefined.cheap_clone(),
        other => ctx.to_string(&other)?,
    };
    ctx.host.trace(message.as_str());
    Ok(())
}

pub(crate) fn get_time(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let millis = ctx.host.time_millis();
    ctx.push(Value::Number(millis.floor()))
}

/// An integer in `[0, max)`
pub(crate) fn random_number(ctx: &mut Context, _action: u8, _data: &[u8]) -> Result<(), VmError> {
    let max = ctx.pop_integer()?;
    let n = if max <= 0 {
        0.0
    } else {
        (ctx.host.random() * max as f64).floor()
    };
    ctx.push(Value::Number(n))
}
