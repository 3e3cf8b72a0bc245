use crate::timeline::BeatMarker;

/// Receives the events dispatched by [`TimelineCursor::step_to_next_event`].
///
/// Every method defaults to doing nothing, so a sink only implements the
/// notifications it cares about.
///
/// [`TimelineCursor::step_to_next_event`]: crate::cursor::TimelineCursor::step_to_next_event
pub trait PlaybackHooks<M> {
    /// Play the MIDI stored at the current timestamp.
    fn on_midi_event(&mut self, _midi: &M) {}

    /// Periodic time report (msec).
    fn on_time_event(&mut self, _time: u64) {}

    fn on_beat_event(&mut self, _marker: BeatMarker) {}

    /// The last event has been handled.
    fn on_finish(&mut self) {}
}

impl<M> PlaybackHooks<M> for () {}

impl<M, H: PlaybackHooks<M> + ?Sized> PlaybackHooks<M> for &mut H {
    fn on_midi_event(&mut self, midi: &M) {
        (**self).on_midi_event(midi);
    }

    fn on_time_event(&mut self, time: u64) {
        (**self).on_time_event(time);
    }

    fn on_beat_event(&mut self, marker: BeatMarker) {
        (**self).on_beat_event(marker);
    }

    fn on_finish(&mut self) {
        (**self).on_finish();
    }
}
