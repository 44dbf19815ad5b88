//! Host-bound movie clips
//!
//! The display list itself belongs to the player. The VM only needs a movie's
//! name, its parent link for path resolution and a [`Timeline`] to drive the
//! frame navigation actions.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::gc::{Gc, WeakGc};
use crate::object::AsObject;
use crate::value::{AsString, ObjRef};

/// Frame navigation surface of a movie clip.
///
/// Frame indices are 0-based throughout.
pub trait Timeline {
    /// Total number of frames
    fn n_frames(&self) -> usize;

    /// Number of frames already loaded
    fn frames_loaded(&self) -> usize {
        self.n_frames()
    }

    fn current_frame(&self) -> usize;

    fn goto_frame(&mut self, frame: usize);

    fn play(&mut self);

    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Resolve a frame label
    fn frame_for_label(&self, _label: &str) -> Option<usize> {
        None
    }
}

/// In-memory timeline with labels and a playing flag
#[derive(Debug, Clone)]
pub struct SimpleTimeline {
    n_frames: usize,
    frames_loaded: usize,
    current: usize,
    playing: bool,
    labels: FxHashMap<String, usize>,
}

impl SimpleTimeline {
    /// A fully loaded, playing timeline positioned on the first frame
    pub fn new(n_frames: usize) -> Self {
        Self {
            n_frames: n_frames.max(1),
            frames_loaded: n_frames.max(1),
            current: 0,
            playing: true,
            labels: FxHashMap::default(),
        }
    }

    pub fn with_label(mut self, label: &str, frame: usize) -> Self {
        self.labels.insert(label.to_string(), frame);
        self
    }

    pub fn with_frames_loaded(mut self, loaded: usize) -> Self {
        self.frames_loaded = loaded.min(self.n_frames);
        self
    }
}

impl Timeline for SimpleTimeline {
    fn n_frames(&self) -> usize {
        self.n_frames
    }

    fn frames_loaded(&self) -> usize {
        self.frames_loaded
    }

    fn current_frame(&self) -> usize {
        self.current
    }

    fn goto_frame(&mut self, frame: usize) {
        self.current = frame.min(self.n_frames.saturating_sub(1));
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn frame_for_label(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }
}

/// The movie-specific part of a movie clip object
pub struct MovieClip {
    pub name: AsString,
    parent: Option<WeakGc<AsObject>>,
    pub timeline: Box<dyn Timeline>,
}

impl MovieClip {
    pub fn new(name: AsString, parent: Option<&ObjRef>, timeline: Box<dyn Timeline>) -> Self {
        Self {
            name,
            parent: parent.map(Gc::downgrade),
            timeline,
        }
    }

    pub fn parent(&self) -> Option<ObjRef> {
        self.parent.as_ref().and_then(WeakGc::upgrade)
    }
}

impl fmt::Debug for MovieClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovieClip")
            .field("name", &self.name)
            .field("frame", &self.timeline.current_frame())
            .field("playing", &self.timeline.is_playing())
            .finish()
    }
}
