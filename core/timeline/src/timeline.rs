//! Merged, time-ordered event list built from a [`Song`].

use std::{collections::BTreeMap, fmt};

use log::debug;

use crate::{signature::TimeSignature, song::Song};

/// Musical position attached to a timestamp that falls on a beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatMarker {
    pub measure: u32,
    pub beat: u32,
    pub signature: TimeSignature,
}

/// Everything that happens at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBundle<M> {
    pub midi: Option<M>,
    pub time_tick: bool,
    pub beat: Option<BeatMarker>,
}

impl<M> EventBundle<M> {
    pub fn is_empty(&self) -> bool {
        self.midi.is_none() && !self.time_tick && self.beat.is_none()
    }
}

// Not derived: a derive would require `M: Default`.
impl<M> Default for EventBundle<M> {
    fn default() -> Self {
        Self {
            midi: None,
            time_tick: false,
            beat: None,
        }
    }
}

impl<M> fmt::Display for EventBundle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if self.time_tick {
            parts.push("time".to_owned());
        }
        if let Some(marker) = self.beat {
            parts.push(format!("beat({}:{})", marker.measure, marker.beat));
        }
        if self.midi.is_some() {
            parts.push("midi".to_owned());
        }
        write!(f, "<Event {}>", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry<M> {
    /// msec from the start of the song
    pub time: u64,
    pub bundle: EventBundle<M>,
}

/// Which synthetic events are merged in next to the song's MIDI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Emit a time tick every that many msec (`None` or 0 disables ticks)
    pub time_interval: Option<u64>,
    /// Copy the song's beat map into the timeline
    pub include_beats: bool,
}

impl BuildOptions {
    pub const fn music_only() -> Self {
        Self {
            time_interval: None,
            include_beats: false,
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            time_interval: Some(1000),
            include_beats: true,
        }
    }
}

/// Entries sorted by strictly increasing time; immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<M> {
    entries: Vec<TimelineEntry<M>>,
}

impl<M> Timeline<M> {
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a timeline from a borrowed song, cloning its payloads.
    pub fn build(song: &Song<M>, options: &BuildOptions) -> Self
    where
        M: Clone,
    {
        Self::merge(
            song.music.iter().map(|(time, midi)| (*time, midi.clone())),
            song,
            options,
        )
    }

    /// Builds a timeline, moving the song's payloads into it.
    pub fn from_song(mut song: Song<M>, options: &BuildOptions) -> Self {
        let music = std::mem::take(&mut song.music);
        Self::merge(music, &song, options)
    }

    fn merge(
        music: impl IntoIterator<Item = (u64, M)>,
        song: &Song<M>,
        options: &BuildOptions,
    ) -> Self {
        let mut bundles: BTreeMap<u64, EventBundle<M>> = BTreeMap::new();

        // a later payload at the same time replaces an earlier one
        for (time, midi) in music {
            bundles.entry(time).or_default().midi = Some(midi);
        }

        if let Some(interval) = options.time_interval.filter(|&i| i > 0) {
            match usize::try_from(interval) {
                Ok(step) => {
                    for time in (0..=song.length).step_by(step) {
                        bundles.entry(time).or_default().time_tick = true;
                    }
                }
                // wider than the address space: only time 0 is a multiple in range
                Err(_) => bundles.entry(0).or_default().time_tick = true,
            }
        }

        if options.include_beats {
            for descriptor in &song.beats {
                bundles.entry(descriptor.time).or_default().beat = Some(BeatMarker {
                    measure: descriptor.measure,
                    beat: descriptor.beat,
                    signature: descriptor.signature,
                });
            }
        }

        let entries: Vec<_> = bundles
            .into_iter()
            .map(|(time, bundle)| TimelineEntry { time, bundle })
            .collect();

        let timeline = Self { entries };
        debug!(
            "built timeline: {} entries, total time {} ms",
            timeline.len(),
            timeline.total_time()
        );
        timeline
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimelineEntry<M>> {
        self.entries.get(index)
    }

    pub fn time_at(&self, index: usize) -> Option<u64> {
        self.entries.get(index).map(|entry| entry.time)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEntry<M>> {
        self.entries.iter()
    }

    /// Time of the last entry, 0 when empty.
    pub fn total_time(&self) -> u64 {
        self.entries.last().map_or(0, |entry| entry.time)
    }

    /// Index of the first entry at or after `time`; `len()` if there is none.
    pub fn lower_bound(&self, time: u64) -> usize {
        self.entries.partition_point(|entry| entry.time < time)
    }
}

impl<M> Default for Timeline<M> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, M> IntoIterator for &'a Timeline<M> {
    type Item = &'a TimelineEntry<M>;
    type IntoIter = std::slice::Iter<'a, TimelineEntry<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
