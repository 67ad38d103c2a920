//! Text rendering of track occupancy
//!
//! The renderer only reads [`TrackSnapshot`]s and never touches cell locks.
//! Each train gets a glyph (and optionally a colour) the first time it is
//! drawn; the assignment is cached so a train looks the same in every frame.

use std::collections::HashMap;
use std::fmt::Write;

use crate::simulation::{TrackSnapshot, TrainId};

const TRAIN_GLYPHS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// ANSI foreground colours, skipping black and white
const TRAIN_COLOURS: &[u8] = &[31, 32, 33, 34, 35, 36, 91, 92, 93, 94, 95, 96];

/// Frames a train may be missing before its glyph is recycled
const FORGET_AFTER_FRAMES: u64 = 50;

pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Display identity of one train
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainGlyph {
    pub glyph: char,
    pub colour: u8,
}

#[derive(Debug, Clone, Copy)]
struct CachedGlyph {
    glyph: TrainGlyph,
    last_seen: u64,
}

/// Draws frames and remembers per-train glyphs between them
#[derive(Debug, Default)]
pub struct Renderer {
    glyphs: HashMap<TrainId, CachedGlyph>,
    assigned: usize,
    frame: u64,
    colour: bool,
}

impl Renderer {
    pub fn new(colour: bool) -> Self {
        Self {
            colour,
            ..Self::default()
        }
    }

    /// Glyph for `train_id`, assigning one on first sight
    pub fn glyph_for(&mut self, train_id: TrainId) -> TrainGlyph {
        let frame = self.frame;
        let assigned = &mut self.assigned;
        let cached = self.glyphs.entry(train_id).or_insert_with(|| {
            let n = *assigned;
            *assigned += 1;
            CachedGlyph {
                glyph: TrainGlyph {
                    glyph: char::from(TRAIN_GLYPHS[n % TRAIN_GLYPHS.len()]),
                    colour: TRAIN_COLOURS[n % TRAIN_COLOURS.len()],
                },
                last_seen: frame,
            }
        });
        cached.last_seen = frame;
        cached.glyph
    }

    /// Number of trains with a cached glyph
    pub fn known_trains(&self) -> usize {
        self.glyphs.len()
    }

    /// Draw one frame, one line per grid row
    pub fn render(&mut self, snapshot: &TrackSnapshot) -> String {
        self.frame += 1;
        let mut out = String::with_capacity((snapshot.width + 1) * snapshot.height);

        for row in snapshot.rows() {
            for view in row {
                match view.occupant {
                    None => out.push(view.kind.glyph()),
                    Some(train_id) => {
                        let TrainGlyph { glyph, colour } = self.glyph_for(train_id);
                        if self.colour {
                            let _ = write!(out, "\x1b[{}m{}\x1b[0m", colour, glyph);
                        } else {
                            out.push(glyph);
                        }
                    }
                }
            }
            // Layout lines keep their trailing blanks; terminals don't need them.
            let trimmed = out.trim_end_matches(' ').len();
            out.truncate(trimmed);
            out.push('\n');
        }

        self.forget_departed();
        out
    }

    /// Drop glyphs of trains not drawn for a while
    fn forget_departed(&mut self) {
        let frame = self.frame;
        self.glyphs
            .retain(|_, cached| frame.saturating_sub(cached.last_seen) <= FORGET_AFTER_FRAMES);
    }
}
