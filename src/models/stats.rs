//! Hit statistics and judgement types.

use serde::{Deserialize, Serialize};

/// Outcome of one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Judgement {
    /// Intercepted with a clean, fast, well-aligned swing.
    GoodCut,
    /// Intercepted.
    Hit,
    /// Passed the player without being intercepted.
    Miss,
}

/// Accumulated hit statistics for a play session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    pub good_cut: u32,
    pub hit: u32,
    pub miss: u32,
}

impl HitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::GoodCut => self.good_cut += 1,
            Judgement::Hit => self.hit += 1,
            Judgement::Miss => self.miss += 1,
        }
    }

    pub fn judged(&self) -> u32 {
        self.good_cut + self.hit + self.miss
    }

    /// Share of judged notes that were intercepted (0-100).
    pub fn calculate_accuracy(&self) -> f64 {
        let total = self.judged();
        if total == 0 {
            return 0.0;
        }
        (self.good_cut + self.hit) as f64 / total as f64 * 100.0
    }
}
