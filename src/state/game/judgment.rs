//! Per-tick interception tests between hands and notes.

use crate::models::engine::{Contact, HitZone, MISS_Z, Note, PLAYER_Z, SPAWN_Z, Vec3};
use crate::tracking::HandFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeKind {
    Hit { good_cut: bool },
    Miss,
}

/// A note leaving play, emitted exactly once per note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgeEvent {
    pub note: Note,
    pub kind: JudgeKind,
    /// Song time of the tick that resolved the note.
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteState {
    Active,
    Hit,
    Missed,
}

/// A spawned, unresolved note and where it is right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotePlacement {
    pub note: Note,
    pub position: Vec3,
}

pub struct JudgmentEngine {
    chart: Vec<Note>,
    states: Vec<NoteState>,
    /// Index of the first unresolved note.
    head_index: usize,
    /// Note travel speed in units/s.
    speed: f32,
    zone: HitZone,
}

impl JudgmentEngine {
    pub fn new(zone: HitZone) -> Self {
        Self {
            chart: Vec::new(),
            states: Vec::new(),
            head_index: 0,
            speed: 1.0,
            zone,
        }
    }

    /// Replaces the live chart. `chart` must be sorted by time.
    pub fn bind(&mut self, chart: Vec<Note>, speed: f32) {
        self.states = vec![NoteState::Active; chart.len()];
        self.chart = chart;
        self.head_index = 0;
        self.speed = speed.max(f32::EPSILON);
    }

    pub fn clear(&mut self) {
        self.bind(Vec::new(), self.speed);
    }

    pub fn chart(&self) -> &[Note] {
        &self.chart
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Notes not yet hit or missed.
    pub fn remaining(&self) -> usize {
        self.states[self.head_index..]
            .iter()
            .filter(|s| **s == NoteState::Active)
            .count()
    }

    /// Resolves every note that was intercepted or passed the player at `now`.
    ///
    /// Notes are visited in chart order, so the same `(now, hands)` sequence
    /// always yields the same events.
    pub fn tick(&mut self, now: f64, hands: &HandFrame) -> Vec<JudgeEvent> {
        let mut events = Vec::new();
        let miss_line = PLAYER_Z + MISS_Z;

        for idx in self.head_index..self.chart.len() {
            if self.states[idx] != NoteState::Active {
                continue;
            }
            let note = self.chart[idx];
            let position = note.position_at(now, self.speed);

            if position.z < SPAWN_Z {
                // Sorted chart: nothing later has spawned either.
                break;
            }

            if position.z > miss_line {
                self.states[idx] = NoteState::Missed;
                events.push(JudgeEvent {
                    note,
                    kind: JudgeKind::Miss,
                    time: now,
                });
                continue;
            }

            let hand = hands.hand(note.hand);
            if !hand.detected {
                continue;
            }
            let distance = hand.position.distance(position);
            if let Contact::Hit { good_cut } =
                self.zone.judge(distance, hand.velocity, note.cut_direction)
            {
                self.states[idx] = NoteState::Hit;
                events.push(JudgeEvent {
                    note,
                    kind: JudgeKind::Hit { good_cut },
                    time: now,
                });
            }
        }

        while self.head_index < self.states.len()
            && self.states[self.head_index] != NoteState::Active
        {
            self.head_index += 1;
        }

        events
    }

    /// Spawned, unresolved notes with their positions at `now`.
    pub fn visible_notes(&self, now: f64) -> Vec<NotePlacement> {
        self.chart
            .iter()
            .zip(&self.states)
            .skip(self.head_index)
            .filter(|(_, state)| **state == NoteState::Active)
            .map(|(note, _)| NotePlacement {
                note: *note,
                position: note.position_at(now, self.speed),
            })
            .take_while(|p| p.position.z >= SPAWN_Z)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chart::{ChartParams, generate_chart_with};
    use crate::models::engine::{CutDirection, HandSide};
    use crate::models::settings::Difficulty;
    use crate::tracking::HandEstimate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SPEED: f32 = 10.0;

    fn engine(chart: Vec<Note>) -> JudgmentEngine {
        let mut chart = chart;
        for (i, n) in chart.iter_mut().enumerate() {
            n.id = i as u32;
        }
        let mut engine = JudgmentEngine::new(HitZone::new());
        engine.bind(chart, SPEED);
        engine
    }

    fn hand_at(position: Vec3, velocity: Vec3) -> HandEstimate {
        HandEstimate {
            position,
            velocity,
            confidence: 1.0,
            detected: true,
        }
    }

    fn note_spot(note: &Note) -> Vec3 {
        note.position_at(note.time, SPEED)
    }

    #[test]
    fn test_unintercepted_note_misses_once() {
        let mut engine = engine(vec![Note::new(1.0, 1, 0, HandSide::Left, CutDirection::Any)]);
        let hands = HandFrame::default();

        assert!(engine.tick(1.1, &hands).is_empty());
        let events = engine.tick(1.25, &hands);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, JudgeKind::Miss);
        assert!(engine.tick(1.3, &hands).is_empty());
        assert!(engine.tick(5.0, &hands).is_empty());
        assert_eq!(engine.remaining(), 0);
    }

    #[test]
    fn test_hand_on_note_hits_once() {
        let note = Note::new(1.0, 2, 1, HandSide::Right, CutDirection::Any);
        let mut engine = engine(vec![note]);
        let hands = HandFrame {
            timestamp: 0.0,
            left: HandEstimate::default(),
            right: hand_at(note_spot(&note), Vec3::ZERO),
        };

        // Too far away while still approaching.
        assert!(engine.tick(0.5, &hands).is_empty());

        let events = engine.tick(1.0, &hands);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, JudgeKind::Hit { good_cut: false });
        assert!(engine.tick(1.0, &hands).is_empty());
        assert!(engine.tick(2.0, &hands).is_empty());
    }

    #[test]
    fn test_wrong_hand_cannot_intercept() {
        let note = Note::new(1.0, 1, 0, HandSide::Left, CutDirection::Any);
        let mut engine = engine(vec![note]);
        let hands = HandFrame {
            timestamp: 0.0,
            left: HandEstimate::default(),
            right: hand_at(note_spot(&note), Vec3::ZERO),
        };
        assert!(engine.tick(1.0, &hands).is_empty());
        let events = engine.tick(1.5, &hands);
        assert_eq!(events[0].kind, JudgeKind::Miss);
    }

    #[test]
    fn test_undetected_hand_is_a_miss() {
        let note = Note::new(1.0, 1, 0, HandSide::Left, CutDirection::Any);
        let mut engine = engine(vec![note]);
        let mut lost = hand_at(note_spot(&note), Vec3::ZERO);
        lost.detected = false;
        let hands = HandFrame {
            timestamp: 0.0,
            left: lost,
            right: HandEstimate::default(),
        };
        assert!(engine.tick(1.0, &hands).is_empty());
        assert_eq!(engine.tick(1.5, &hands)[0].kind, JudgeKind::Miss);
    }

    #[test]
    fn test_direction_must_match() {
        let note = Note::new(1.0, 1, 1, HandSide::Left, CutDirection::Down);
        let mut engine = engine(vec![note]);
        let spot = note_spot(&note);

        let swinging_up = HandFrame {
            timestamp: 0.0,
            left: hand_at(spot, Vec3::new(0.0, 3.0, 0.0)),
            right: HandEstimate::default(),
        };
        assert!(engine.tick(1.0, &swinging_up).is_empty());

        let swinging_down = HandFrame {
            left: hand_at(spot, Vec3::new(0.0, -3.0, 0.0)),
            ..swinging_up
        };
        let events = engine.tick(1.01, &swinging_down);
        assert_eq!(events[0].kind, JudgeKind::Hit { good_cut: true });
    }

    #[test]
    fn test_simultaneous_misses_follow_chart_order() {
        let mut engine = engine(vec![
            Note::new(1.0, 0, 0, HandSide::Left, CutDirection::Down),
            Note::new(1.0, 3, 0, HandSide::Right, CutDirection::Down),
            Note::new(2.0, 1, 0, HandSide::Left, CutDirection::Any),
        ]);
        let events = engine.tick(3.0, &HandFrame::default());
        let ids: Vec<u32> = events.iter().map(|e| e.note.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_unspawned_notes_are_not_visible() {
        let engine = engine(vec![
            Note::new(1.0, 0, 0, HandSide::Left, CutDirection::Any),
            Note::new(100.0, 3, 0, HandSide::Right, CutDirection::Any),
        ]);
        let visible = engine.visible_notes(0.0);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].note.id, 0);
        assert!((visible[0].position.z - (PLAYER_Z - SPEED)).abs() < 1e-5);
    }

    #[test]
    fn test_outcome_does_not_depend_on_tick_rate() {
        let chart = generate_chart_with(
            Difficulty::Easy,
            &ChartParams {
                end_beat: 64,
                ..ChartParams::default()
            },
            &mut StdRng::seed_from_u64(0),
        );
        let left_spot = chart
            .iter()
            .find(|n| n.hand == HandSide::Left)
            .map(note_spot)
            .unwrap();
        let hands = HandFrame {
            timestamp: 0.0,
            left: hand_at(left_spot, Vec3::ZERO),
            right: HandEstimate::default(),
        };
        let end = chart.last().unwrap().time + 1.0;

        let run = |fps: f64| {
            let mut engine = JudgmentEngine::new(HitZone::new());
            engine.bind(chart.clone(), SPEED);
            let mut outcome = Vec::new();
            let mut frame = 0u64;
            loop {
                let now = frame as f64 / fps;
                if now > end {
                    break;
                }
                outcome.extend(engine.tick(now, &hands).into_iter().map(|e| (e.note.id, e.kind)));
                frame += 1;
            }
            outcome
        };

        let at_30 = run(30.0);
        assert_eq!(at_30.len(), chart.len());
        assert_eq!(at_30, run(60.0));
        assert_eq!(at_30, run(144.0));
        for (id, kind) in at_30 {
            let note = &chart[id as usize];
            match note.hand {
                HandSide::Left => assert_eq!(kind, JudgeKind::Hit { good_cut: false }),
                HandSide::Right => assert_eq!(kind, JudgeKind::Miss),
            }
        }
    }
}
