//! Timeline control, targets, movie paths and host requests

use std::cell::RefCell;
use std::rc::Rc;

use super::{HostLog, as_str, create_context, exec, member};
use asvm::{
    ActionBuilder, Context, DisplayRequest, ObjRef, SimpleTimeline, Timeline, UrlMethod, Value,
    opcode,
};

/// Index of `_currentframe` for GetProperty
const CURRENT_FRAME: f64 = 4.0;
const TARGET: f64 = 11.0;

/// A context whose root has `frames` frames and a three-frame child `clip`
fn movie_context(frames: usize) -> (Context, Rc<RefCell<HostLog>>, ObjRef) {
    let (mut ctx, log) = create_context(7);
    let root = ctx.create_movie(
        "_level0",
        None,
        SimpleTimeline::new(frames)
            .with_label("intro", 3)
            .with_label("outro", frames - 1),
    );
    ctx.set_root_movie(&root);
    let clip = ctx.create_movie("clip", Some(&root), SimpleTimeline::new(3));
    (ctx, log, clip)
}

fn current_frame(b: &mut ActionBuilder) {
    b.push_str("")
        .push_number(CURRENT_FRAME)
        .emit(opcode::GET_PROPERTY);
}

fn timeline_state(movie: &ObjRef) -> (usize, bool) {
    let obj = movie.borrow();
    match obj.as_movie() {
        Some(clip) => (clip.timeline.current_frame(), clip.timeline.is_playing()),
        None => (0, false),
    }
}

#[test]
fn test_goto_frame_and_current_frame() {
    let (mut ctx, _, _) = movie_context(10);
    let result = exec(&mut ctx, 7, |b| {
        b.goto_frame(2);
        current_frame(b);
        b.emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(3.0));
    assert_eq!(timeline_state(&ctx.root_movie()), (2, false));
}

#[test]
fn test_goto_frame_clamps_to_timeline() {
    let (mut ctx, _, _) = movie_context(10);
    exec(&mut ctx, 7, |b| {
        b.goto_frame(500);
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (9, false));
}

#[test]
fn test_goto_label() {
    let (mut ctx, _, _) = movie_context(10);
    let result = exec(&mut ctx, 7, |b| {
        b.goto_label("intro");
        current_frame(b);
        b.emit(opcode::RETURN);
    });
    assert_eq!(result, Value::Number(4.0));

    // Unknown labels leave the timeline alone
    exec(&mut ctx, 7, |b| {
        b.goto_label("missing");
    });
    assert_eq!(timeline_state(&ctx.root_movie()).0, 3);
}

#[test]
fn test_goto_frame2_with_bias_and_label() {
    let (mut ctx, _, clip) = movie_context(20);
    exec(&mut ctx, 7, |b| {
        b.push_number(2.0).goto_frame2(true, Some(10));
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (11, true));

    exec(&mut ctx, 7, |b| {
        b.push_str("outro").goto_frame2(false, None);
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (19, false));

    // path:frame addresses another movie
    exec(&mut ctx, 7, |b| {
        b.push_str("clip:3").goto_frame2(false, None);
    });
    assert_eq!(timeline_state(&clip), (2, false));
}

#[test]
fn test_goto_frame2_bias_applies_before_clamping() {
    let (mut ctx, _, _) = movie_context(20);
    // Frame 0 is index -1, the bias of 2 lands on index 1
    exec(&mut ctx, 7, |b| {
        b.push_number(0.0).goto_frame2(false, Some(2));
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (1, false));

    exec(&mut ctx, 7, |b| {
        b.push_number(-5.0).goto_frame2(false, Some(2));
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (0, false));
}

#[test]
fn test_goto_frame2_with_infinite_and_huge_frames() {
    let (mut ctx, _, _) = movie_context(20);
    exec(&mut ctx, 7, |b| {
        b.push_number(f64::INFINITY).goto_frame2(false, None);
    });
    assert_eq!(timeline_state(&ctx.root_movie()).0, 19);

    exec(&mut ctx, 7, |b| {
        b.push_number(f64::NEG_INFINITY).goto_frame2(false, None);
    });
    assert_eq!(timeline_state(&ctx.root_movie()).0, 0);

    exec(&mut ctx, 7, |b| {
        b.push_number(9_223_372_036_854_774_784.0)
            .goto_frame2(false, Some(5000));
    });
    assert_eq!(timeline_state(&ctx.root_movie()).0, 19);

    // Infinity out of a version 7 division by zero
    exec(&mut ctx, 7, |b| {
        b.push_number(1.0)
            .push_number(0.0)
            .emit(opcode::DIVIDE)
            .goto_frame2(true, Some(3));
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (19, true));
}

#[test]
fn test_goto_frame2_label_with_bias_and_play() {
    let (mut ctx, _, _) = movie_context(20);
    exec(&mut ctx, 7, |b| {
        b.emit(opcode::STOP);
    });
    assert!(!timeline_state(&ctx.root_movie()).1);

    // "intro" is frame 3
    exec(&mut ctx, 7, |b| {
        b.push_str("intro").goto_frame2(true, Some(2));
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (5, true));

    // "outro" is the last frame, so the bias is clamped away
    exec(&mut ctx, 7, |b| {
        b.emit(opcode::STOP).push_str("outro").goto_frame2(true, Some(2));
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (19, true));
}

#[test]
fn test_next_previous_play_stop() {
    let (mut ctx, _, _) = movie_context(3);
    exec(&mut ctx, 7, |b| {
        b.emit(opcode::NEXT_FRAME)
            .emit(opcode::NEXT_FRAME)
            .emit(opcode::NEXT_FRAME);
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (2, false));

    exec(&mut ctx, 7, |b| {
        b.emit(opcode::PREVIOUS_FRAME).emit(opcode::PLAY);
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (1, true));

    exec(&mut ctx, 7, |b| {
        b.emit(opcode::STOP);
    });
    assert_eq!(timeline_state(&ctx.root_movie()), (1, false));
}

#[test]
fn test_set_target_redirects_timeline_actions() {
    let (mut ctx, _, clip) = movie_context(5);
    exec(&mut ctx, 7, |b| {
        b.set_target("/clip")
            .emit(opcode::STOP)
            .set_target("")
            .emit(opcode::NEXT_FRAME);
    });
    assert_eq!(timeline_state(&clip), (0, false));
    assert_eq!(timeline_state(&ctx.root_movie()), (1, false));
}

#[test]
fn test_set_target_redirects_variables() {
    let (mut ctx, _, clip) = movie_context(5);
    exec(&mut ctx, 7, |b| {
        b.set_target("clip")
            .push_str("v")
            .push_number(1.0)
            .emit(opcode::SET_VARIABLE)
            .set_target("");
    });
    assert_eq!(member(&mut ctx, &clip, "v"), Value::Number(1.0));
    let root = ctx.root_movie();
    assert_eq!(member(&mut ctx, &root, "v"), Value::Undefined);
}

#[test]
fn test_set_target2_and_missing_target() {
    let (mut ctx, _, clip) = movie_context(5);
    exec(&mut ctx, 7, |b| {
        b.push_str("clip")
            .emit(opcode::GET_VARIABLE)
            .emit(opcode::SET_TARGET2)
            .emit(opcode::STOP)
            // An unknown target falls back to the original one
            .push_str("nowhere")
            .emit(opcode::SET_TARGET2)
            .emit(opcode::STOP);
    });
    assert!(!timeline_state(&clip).1);
    assert!(!timeline_state(&ctx.root_movie()).1);
}

#[test]
fn test_paths_and_target_properties() {
    let (mut ctx, log, _) = movie_context(5);
    exec(&mut ctx, 7, |b| {
        b.push_str("clip")
            .emit(opcode::GET_VARIABLE)
            .emit(opcode::TARGET_PATH)
            .emit(opcode::TRACE);
        b.push_str("clip")
            .push_number(TARGET)
            .emit(opcode::GET_PROPERTY)
            .emit(opcode::TRACE);
        b.push_str("clip")
            .emit(opcode::GET_VARIABLE)
            .push_str("_parent")
            .emit(opcode::GET_MEMBER)
            .emit(opcode::TARGET_PATH)
            .emit(opcode::TRACE);
        b.push_number(1.0).emit(opcode::TARGET_PATH).emit(opcode::TRACE);
        b.push_str("clip")
            .emit(opcode::GET_VARIABLE)
            .push_str("_name")
            .emit(opcode::GET_MEMBER)
            .emit(opcode::TRACE);
    });
    assert_eq!(
        log.borrow().traces,
        vec!["_level0.clip", "/clip", "_level0", "undefined", "clip"]
    );
}

#[test]
fn test_path_variables() {
    let (mut ctx, log, clip) = movie_context(5);
    exec(&mut ctx, 7, |b| {
        b.push_str("/clip:x")
            .push_number(5.0)
            .emit(opcode::SET_VARIABLE);
        b.push_str("_root.clip.y")
            .push_number(6.0)
            .emit(opcode::SET_VARIABLE);
        b.push_str("/clip:y").emit(opcode::GET_VARIABLE).emit(opcode::TRACE);
        b.push_str("/missing:y")
            .emit(opcode::GET_VARIABLE)
            .emit(opcode::TRACE);
    });
    assert_eq!(member(&mut ctx, &clip, "x"), Value::Number(5.0));
    assert_eq!(log.borrow().traces, vec!["6", "undefined"]);
}

#[test]
fn test_set_property_on_movie() {
    let (mut ctx, _, clip) = movie_context(5);
    exec(&mut ctx, 7, |b| {
        b.push_str("clip")
            .push_number(0.0)
            .push_number(50.0)
            .emit(opcode::SET_PROPERTY);
        // Read-only properties ignore writes
        b.push_str("clip")
            .push_number(CURRENT_FRAME)
            .push_number(3.0)
            .emit(opcode::SET_PROPERTY);
    });
    assert_eq!(member(&mut ctx, &clip, "_x"), Value::Number(50.0));
    assert_eq!(member(&mut ctx, &clip, "_currentframe"), Value::Number(1.0));
}

#[test]
fn test_get_url_requests() {
    let (mut ctx, log, _) = movie_context(5);
    exec(&mut ctx, 7, |b| {
        b.get_url("http://example.com", "_blank");
        b.push_str("page.html").push_str("_self").get_url2(2);
    });
    assert_eq!(
        log.borrow().urls,
        vec![
            (
                "http://example.com".to_string(),
                "_blank".to_string(),
                UrlMethod::None
            ),
            ("page.html".to_string(), "_self".to_string(), UrlMethod::Post),
        ]
    );
}

#[test]
fn test_display_requests() {
    let (mut ctx, log, _) = movie_context(5);
    exec(&mut ctx, 7, |b| {
        b.push_str("clip")
            .push_str("copy")
            .push_number(3.0)
            .emit(opcode::CLONE_SPRITE);
        b.push_str("copy").emit(opcode::REMOVE_SPRITE);
        b.push_number(0.0)
            .push_number(0.0)
            .push_number(100.0)
            .push_number(50.0)
            .push_bool(true)
            .push_bool(false)
            .push_str("clip")
            .emit(opcode::START_DRAG);
        b.emit(opcode::END_DRAG)
            .emit(opcode::TOGGLE_QUALITY)
            .emit(opcode::STOP_SOUNDS);
    });
    assert_eq!(
        log.borrow().display,
        vec![
            DisplayRequest::CloneSprite {
                source: "clip".to_string(),
                target: "copy".to_string(),
                depth: 3,
            },
            DisplayRequest::RemoveSprite {
                target: "copy".to_string(),
            },
            DisplayRequest::StartDrag {
                target: "clip".to_string(),
                lock_center: false,
                constraint: Some((0.0, 0.0, 100.0, 50.0)),
            },
            DisplayRequest::EndDrag,
            DisplayRequest::ToggleQuality,
            DisplayRequest::StopSounds,
        ]
    );
}

#[test]
fn test_call_forwards_frames_to_host() {
    let (mut ctx, log, _) = movie_context(10);
    exec(&mut ctx, 7, |b| {
        b.push_str("clip:2").emit(opcode::CALL);
        b.push_str("intro").emit(opcode::CALL);
        b.push_str("nowhere:1").emit(opcode::CALL);
    });
    assert_eq!(
        log.borrow().frame_calls,
        vec![("clip".to_string(), 1), ("_level0".to_string(), 3)]
    );
}

#[test]
fn test_movie_to_string_is_its_path() {
    let (mut ctx, _, _) = movie_context(5);
    let result = exec(&mut ctx, 7, |b| {
        b.push_str("clip")
            .emit(opcode::GET_VARIABLE)
            .push_str("")
            .emit(opcode::ADD2)
            .emit(opcode::RETURN);
    });
    assert_eq!(as_str(&result).as_deref(), Some("_level0.clip"));
}
