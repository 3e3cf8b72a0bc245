use std::fmt;

use crate::song::BeatDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSignature {
    pub numerator: u32,   // beats per measure (e.g., 3 in 3/4)
    pub denominator: u32, // beat unit (e.g., 4 in 3/4)
}

impl TimeSignature {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Regular beat map for scores that carry no explicit beat information.
///
/// The tempo is given in quarter notes per minute; the length of a beat follows
/// the signature's denominator (an eighth-note beat in 6/8 lasts half a quarter).
#[derive(Debug, Clone, Copy)]
pub struct BeatGrid {
    bpm: f64,
    signature: TimeSignature,
}

impl BeatGrid {
    pub const fn new(bpm: f64, signature: TimeSignature) -> Self {
        Self { bpm, signature }
    }

    /// Milliseconds per beat, or `None` when the grid can't produce beats.
    ///
    /// Beats shorter than 1 ms are rejected: they would share timestamps.
    pub fn beat_length_ms(&self) -> Option<f64> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 || self.signature.denominator == 0 {
            return None;
        }
        let ms_per_quarter = 60_000.0 / self.bpm;
        let beat_ms = ms_per_quarter * 4.0 / f64::from(self.signature.denominator);
        (beat_ms >= 1.0).then_some(beat_ms)
    }

    /// 1-based (measure, beat) for the beat with the given 0-based index.
    pub fn measure_beat(&self, beat_index: u64) -> (u32, u32) {
        let per_measure = u64::from(self.signature.numerator.max(1));
        let measure = beat_index / per_measure + 1;
        let beat = beat_index % per_measure + 1;
        (measure as u32, beat as u32)
    }

    /// All beats from time 0 through `length` inclusive.
    pub fn beats(&self, length: u64) -> Vec<BeatDescriptor> {
        let Some(beat_ms) = self.beat_length_ms() else {
            return Vec::new();
        };
        if self.signature.numerator == 0 {
            return Vec::new();
        }

        let mut beats = Vec::new();
        let mut index = 0u64;
        loop {
            let time = (index as f64 * beat_ms).round() as u64;
            if time > length {
                break;
            }
            let (measure, beat) = self.measure_beat(index);
            beats.push(BeatDescriptor {
                time,
                measure,
                beat,
                signature: self.signature,
            });
            index += 1;
        }
        beats
    }
}
