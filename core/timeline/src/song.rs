use crate::signature::TimeSignature;

/// One beat of the score's beat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatDescriptor {
    /// Time of the beat (msec)
    pub time: u64,
    /// Measure number, as numbered by the score source
    pub measure: u32,
    /// Beat within the measure (1-based)
    pub beat: u32,
    pub signature: TimeSignature,
}

/// Score data delivered by a loader.
///
/// `M` is the MIDI payload stored per timestamp; its format is defined by the
/// loader and is never inspected here.
#[derive(Debug, Clone, PartialEq)]
pub struct Song<M> {
    /// (time in msec, payload) pairs
    pub music: Vec<(u64, M)>,
    /// Total duration in msec
    pub length: u64,
    pub beats: Vec<BeatDescriptor>,
}

impl<M> Song<M> {
    pub fn new(length: u64) -> Self {
        Self {
            music: Vec::new(),
            length,
            beats: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_music(mut self, time: u64, payload: M) -> Self {
        self.music.push((time, payload));
        self
    }

    #[must_use]
    pub fn with_beat(mut self, beat: BeatDescriptor) -> Self {
        self.beats.push(beat);
        self
    }

    #[must_use]
    pub fn with_beats(mut self, beats: impl IntoIterator<Item = BeatDescriptor>) -> Self {
        self.beats.extend(beats);
        self
    }
}
