//! Playback position over a [`Timeline`].

use log::{debug, trace, warn};

use crate::{
    hooks::PlaybackHooks,
    timeline::{EventBundle, Timeline},
};

/// Where a time seek landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekResult {
    /// New cursor position (`len()` when seeking past the last event)
    pub position: usize,
    /// msec between the requested time and the event at `position`
    pub offset: u64,
}

/// Owns a timeline and tracks the next event to play.
///
/// The cursor is `Active` while `position < len` and `Finished` once it
/// reaches `len`. An empty timeline is permanently finished.
#[derive(Debug, Clone)]
pub struct TimelineCursor<M> {
    timeline: Timeline<M>,
    position: usize,
    tempo_factor: f64,
}

impl<M> TimelineCursor<M> {
    pub const fn new(timeline: Timeline<M>) -> Self {
        Self {
            timeline,
            position: 0,
            tempo_factor: 1.0,
        }
    }

    /// Replaces the timeline and rewinds. The tempo factor is kept.
    pub fn load(&mut self, timeline: Timeline<M>) {
        debug!("cursor loaded {} entries", timeline.len());
        self.timeline = timeline;
        self.position = 0;
    }

    pub const fn timeline(&self) -> &Timeline<M> {
        &self.timeline
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.timeline.len()
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn total_time(&self) -> u64 {
        self.timeline.total_time()
    }

    /// Time of the last handled event, not a running clock.
    pub fn current_time(&self) -> u64 {
        self.position
            .checked_sub(1)
            .and_then(|last| self.timeline.time_at(last))
            .unwrap_or(0)
    }

    /// Moves to the first event at or after `time`.
    ///
    /// Nothing is dispatched. When `time` lies past the last event the cursor
    /// becomes finished and the caller has to check for it.
    pub fn seek(&mut self, time: u64) -> SeekResult {
        let result = if time == 0 {
            SeekResult {
                position: 0,
                offset: 0,
            }
        } else {
            let position = self.timeline.lower_bound(time);
            let offset = self
                .timeline
                .time_at(position)
                .map_or(0, |found| found - time);
            SeekResult { position, offset }
        };

        debug!(
            "seek to {time} ms: position {}, offset {} ms",
            result.position, result.offset
        );
        self.position = result.position;
        result
    }

    /// Moves to the given beat of a measure.
    ///
    /// Lands on the requested beat, or on the last beat of the measure before
    /// it when the measure has fewer beats. Returns `false` and leaves the
    /// position alone when no beat of the measure exists.
    pub fn seek_to_musical_position(&mut self, measure: u32, beat: u32) -> bool {
        let mut found = None;
        for (index, entry) in self.timeline.iter().enumerate() {
            let Some(marker) = entry.bundle.beat else {
                continue;
            };
            if marker.measure == measure {
                found = Some(index);
                if marker.beat >= beat {
                    break;
                }
            }
            if marker.measure > measure {
                break;
            }
        }

        match found {
            Some(position) => {
                debug!("seek to measure {measure} beat {beat}: position {position}");
                self.position = position;
                true
            }
            None => {
                warn!("measure {measure} not found in timeline");
                false
            }
        }
    }

    pub fn seek_to_measure(&mut self, measure: u32) -> bool {
        self.seek_to_musical_position(measure, 1)
    }

    /// Handles the event at the cursor and advances past it.
    ///
    /// Returns the msec (not adjusted by the tempo factor) to wait before the
    /// next call. Returns 0 when nothing is left; the step that handles the
    /// last event calls [`PlaybackHooks::on_finish`] and also returns 0.
    pub fn step_to_next_event<H>(&mut self, hooks: &mut H) -> u64
    where
        H: PlaybackHooks<M> + ?Sized,
    {
        let Some(entry) = self.timeline.get(self.position) else {
            return 0;
        };
        let time = entry.time;
        trace!("{time} ms: {}", entry.bundle);
        dispatch(time, &entry.bundle, hooks);

        self.position += 1;
        match self.timeline.time_at(self.position) {
            Some(next) => next - time,
            None => {
                hooks.on_finish();
                0
            }
        }
    }

    pub const fn tempo_factor(&self) -> f64 {
        self.tempo_factor
    }

    /// Stored for the caller; timeline times are never rescaled.
    pub const fn set_tempo_factor(&mut self, factor: f64) {
        self.tempo_factor = factor;
    }
}

impl<M> Default for TimelineCursor<M> {
    fn default() -> Self {
        Self::new(Timeline::empty())
    }
}

fn dispatch<M, H>(time: u64, bundle: &EventBundle<M>, hooks: &mut H)
where
    H: PlaybackHooks<M> + ?Sized,
{
    if let Some(midi) = &bundle.midi {
        hooks.on_midi_event(midi);
    }
    if bundle.time_tick {
        hooks.on_time_event(time);
    }
    if let Some(marker) = bundle.beat {
        hooks.on_beat_event(marker);
    }
}
