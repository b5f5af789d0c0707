//! Procedural chart generation.
//!
//! Charts are a pure function of the difficulty, except for the first hard
//! pattern which draws its layer at random. Pass a seeded RNG to
//! [`generate_chart_with`] for reproducible charts.

use crate::models::engine::{CutDirection, HandSide, Note};
use crate::models::settings::Difficulty;
use rand::Rng;

/// Tempo of the built-in track.
pub const BPM: f64 = 140.0;
/// First beat carrying notes (gives the player a lead-in).
pub const START_BEAT: u32 = 8;
/// Beat index at which generation stops (exclusive).
pub const END_BEAT: u32 = 320;

/// Beats per pattern block in hard charts and between medium doubles.
const PHRASE_BEATS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartParams {
    pub bpm: f64,
    pub start_beat: u32,
    pub end_beat: u32,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            bpm: BPM,
            start_beat: START_BEAT,
            end_beat: END_BEAT,
        }
    }
}

/// Generates the default chart for `difficulty` using thread randomness.
pub fn generate_chart(difficulty: Difficulty) -> Vec<Note> {
    generate_chart_with(difficulty, &ChartParams::default(), &mut rand::rng())
}

/// Generates a chart sorted ascending by time with ids `0..len`.
pub fn generate_chart_with<R: Rng + ?Sized>(
    difficulty: Difficulty,
    params: &ChartParams,
    rng: &mut R,
) -> Vec<Note> {
    if !params.bpm.is_finite() || params.bpm <= 0.0 || params.end_beat <= params.start_beat {
        return Vec::new();
    }

    let seconds_per_beat = 60.0 / params.bpm;
    let step = difficulty.settings().beat_step as usize;
    let mut notes = Vec::new();

    for (k, i) in (params.start_beat..params.end_beat).step_by(step).enumerate() {
        let time = i as f64 * seconds_per_beat;
        match difficulty {
            Difficulty::Easy => notes.push(alternating_single(time, k)),
            Difficulty::Medium => {
                if i % PHRASE_BEATS == 0 {
                    push_double(&mut notes, time, 0, 3, 0);
                } else {
                    notes.push(alternating_single(time, k));
                }
            }
            Difficulty::Hard => match (i / PHRASE_BEATS) % 3 {
                0 => {
                    let (hand, lane) = if i % 2 == 0 {
                        (HandSide::Left, 0)
                    } else {
                        (HandSide::Right, 3)
                    };
                    let layer = if rng.random_bool(0.5) { 0 } else { 1 };
                    notes.push(Note::new(time, lane, layer, hand, CutDirection::Any));
                }
                1 => {
                    if i % 2 == 0 {
                        push_double(&mut notes, time, 1, 2, 1);
                    }
                }
                _ => {
                    let lane = (i % 4) as u8;
                    let hand = if lane < 2 {
                        HandSide::Left
                    } else {
                        HandSide::Right
                    };
                    notes.push(Note::new(time, lane, 1, hand, CutDirection::Any));
                }
            },
        }
    }

    // Doubles share a beat; keep emission order among equal times.
    notes.sort_by(|a, b| a.time.total_cmp(&b.time));
    for (id, note) in notes.iter_mut().enumerate() {
        note.id = id as u32;
    }
    notes
}

fn alternating_single(time: f64, k: usize) -> Note {
    if k % 2 == 0 {
        Note::new(time, 1, 0, HandSide::Left, CutDirection::Any)
    } else {
        Note::new(time, 2, 0, HandSide::Right, CutDirection::Any)
    }
}

fn push_double(notes: &mut Vec<Note>, time: f64, left_lane: u8, right_lane: u8, layer: u8) {
    notes.push(Note::new(
        time,
        left_lane,
        layer,
        HandSide::Left,
        CutDirection::Down,
    ));
    notes.push(Note::new(
        time,
        right_lane,
        layer,
        HandSide::Right,
        CutDirection::Down,
    ));
}
