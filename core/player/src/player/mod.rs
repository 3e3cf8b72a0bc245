use std::time::Duration;

use log::{info, warn};
use rtrb::RingBuffer;
use timeline::{BuildOptions, PlaybackHooks, SeekResult, Song, Timeline, TimelineCursor};

use crate::{
    config::PlayerConfig,
    error::{PlayerError, check_tempo_factor},
    player::command::{PlayerCommand, PlayerCommandConsumer, PlayerHandle},
};

pub mod command;

/// Drives a [`TimelineCursor`] for a timer owned by the caller.
///
/// The caller calls [`Player::start`], waits the returned delay, then keeps
/// calling [`Player::next_event`] and waiting whatever it returns until it
/// gets `None`. Delays are already scaled by the tempo factor.
pub struct Player<M, H> {
    cursor: TimelineCursor<M>,
    hooks: H,
    playing: bool,
    /// msec to wait before the event at the cursor, left by the last seek
    pending_offset: u64,
    commands: PlayerCommandConsumer,
}

impl<M, H> std::fmt::Debug for Player<M, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("position", &self.cursor.position())
            .field("entries", &self.cursor.timeline().len())
            .field("playing", &self.playing)
            .field("pending_offset", &self.pending_offset)
            .finish_non_exhaustive()
    }
}

impl<M, H: PlaybackHooks<M>> Player<M, H> {
    pub fn new(timeline: Timeline<M>, hooks: H, config: &PlayerConfig) -> (Self, PlayerHandle) {
        let (producer, consumer) = RingBuffer::new(config.command_capacity);
        let player = Self::with_consumer(timeline, hooks, consumer);
        (player, PlayerHandle::new(producer))
    }

    pub fn from_song(song: &Song<M>, hooks: H, config: &PlayerConfig) -> (Self, PlayerHandle)
    where
        M: Clone,
    {
        Self::new(Timeline::build(song, &config.build), hooks, config)
    }

    pub fn with_consumer(timeline: Timeline<M>, hooks: H, commands: PlayerCommandConsumer) -> Self {
        Self {
            cursor: TimelineCursor::new(timeline),
            hooks,
            playing: false,
            pending_offset: 0,
            commands,
        }
    }

    /// Rebuilds the timeline from `song`, stopping and rewinding.
    pub fn load_song(&mut self, song: &Song<M>, options: &BuildOptions)
    where
        M: Clone,
    {
        self.stop();
        self.cursor.load(Timeline::build(song, options));
        self.pending_offset = 0;
    }

    pub fn process_command(&mut self, cmd: PlayerCommand) {
        match cmd {
            PlayerCommand::Start => {
                self.begin();
            }
            PlayerCommand::Stop => self.stop(),
            PlayerCommand::Seek(time) => {
                self.seek(time);
            }
            PlayerCommand::SeekMeasure { measure, beat } => {
                self.seek_measure(measure, beat);
            }
            PlayerCommand::SetTempoFactor(factor) => {
                if let Err(err) = self.set_tempo_factor(factor) {
                    warn!("ignoring command: {err}");
                }
            }
        }
    }

    /// Starts playing. Returns the delay before the first [`Player::next_event`]
    /// call, or `None` if there is nothing left to play.
    pub fn start(&mut self) -> Option<Duration> {
        if !self.begin() {
            return None;
        }
        let offset = std::mem::take(&mut self.pending_offset);
        Some(self.delay_for(offset))
    }

    // Leaves the seek offset pending for the next `next_event` call.
    fn begin(&mut self) -> bool {
        if self.cursor.is_finished() {
            info!("nothing to play at position {}", self.cursor.position());
            return false;
        }
        if !self.playing {
            info!("start at {} ms", self.cursor.current_time());
            self.playing = true;
        }
        true
    }

    pub fn stop(&mut self) {
        if self.playing {
            info!("stop at {} ms", self.cursor.current_time());
            self.playing = false;
        }
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Handles pending commands and, while playing, the next event.
    ///
    /// Returns how long to wait before calling again, or `None` once playback
    /// stopped, either by command or because the song ended.
    pub fn next_event(&mut self) -> Option<Duration> {
        while let Ok(cmd) = self.commands.pop() {
            self.process_command(cmd);
        }

        if !self.playing {
            return None;
        }

        let offset = std::mem::take(&mut self.pending_offset);
        if offset > 0 {
            return Some(self.delay_for(offset));
        }

        let delta = self.cursor.step_to_next_event(&mut self.hooks);
        if self.cursor.is_finished() {
            info!("finished after {} ms", self.cursor.current_time());
            self.stop();
            return None;
        }
        Some(self.delay_for(delta))
    }

    /// Goes to a time (msec); the gap up to the next event is waited first.
    pub fn seek(&mut self, time: u64) -> SeekResult {
        let result = self.cursor.seek(time);
        self.pending_offset = result.offset;
        result
    }

    pub fn seek_measure(&mut self, measure: u32, beat: u32) -> bool {
        let found = self.cursor.seek_to_musical_position(measure, beat);
        if found {
            self.pending_offset = 0;
        }
        found
    }

    pub fn set_tempo_factor(&mut self, factor: f64) -> Result<(), PlayerError> {
        let factor = check_tempo_factor(factor)?;
        self.cursor.set_tempo_factor(factor);
        Ok(())
    }

    pub const fn tempo_factor(&self) -> f64 {
        self.cursor.tempo_factor()
    }

    /// Wall-clock wait for `msec` of song time at the current tempo factor.
    ///
    /// Saturates at `Duration::MAX` for very small factors.
    pub fn delay_for(&self, msec: u64) -> Duration {
        Duration::try_from_secs_f64(msec as f64 / 1000.0 / self.cursor.tempo_factor())
            .unwrap_or(Duration::MAX)
    }

    pub fn current_time(&self) -> u64 {
        self.cursor.current_time()
    }

    pub fn total_time(&self) -> u64 {
        self.cursor.total_time()
    }

    pub const fn cursor(&self) -> &TimelineCursor<M> {
        &self.cursor
    }

    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    pub const fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }
}

#[cfg(test)]
mod player_tests {
    use timeline::{BeatDescriptor, BeatMarker, TimeSignature};

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        midi: Vec<u8>,
        times: Vec<u64>,
        beats: Vec<(u32, u32)>,
        finishes: usize,
    }

    impl PlaybackHooks<u8> for Recorder {
        fn on_midi_event(&mut self, midi: &u8) {
            self.midi.push(*midi);
        }

        fn on_time_event(&mut self, time: u64) {
            self.times.push(time);
        }

        fn on_beat_event(&mut self, marker: BeatMarker) {
            self.beats.push((marker.measure, marker.beat));
        }

        fn on_finish(&mut self) {
            self.finishes += 1;
        }
    }

    fn beat(time: u64, measure: u32, beat: u32) -> BeatDescriptor {
        BeatDescriptor {
            time,
            measure,
            beat,
            signature: TimeSignature::new(2, 4),
        }
    }

    /// Entries at 0, 50 and 100.
    fn create_player() -> (Player<u8, Recorder>, PlayerHandle) {
        let song = Song::new(100)
            .with_music(0, 60)
            .with_music(100, 62)
            .with_beats([beat(0, 1, 1), beat(50, 1, 2), beat(100, 2, 1)]);
        let config = PlayerConfig {
            command_capacity: 8,
            build: BuildOptions {
                time_interval: Some(50),
                include_beats: true,
            },
        };
        Player::from_song(&song, Recorder::default(), &config)
    }

    fn millis(delay: Option<Duration>) -> Option<u64> {
        delay.map(|d| (d.as_secs_f64() * 1000.0).round() as u64)
    }

    #[test]
    fn test_plays_through_and_stops_at_end() {
        let (mut player, _) = create_player();

        assert_eq!(millis(player.start()), Some(0));
        assert!(player.is_playing());

        assert_eq!(millis(player.next_event()), Some(50));
        assert_eq!(millis(player.next_event()), Some(50));
        assert_eq!(player.next_event(), None);
        assert!(!player.is_playing());
        assert_eq!(player.next_event(), None);

        let hooks = player.into_hooks();
        assert_eq!(hooks.midi, vec![60, 62]);
        assert_eq!(hooks.times, vec![0, 50, 100]);
        assert_eq!(hooks.beats, vec![(1, 1), (1, 2), (2, 1)]);
        assert_eq!(hooks.finishes, 1);
    }

    #[test]
    fn test_nothing_happens_until_started() {
        let (mut player, _) = create_player();
        assert_eq!(player.next_event(), None);
        assert!(player.hooks().midi.is_empty());
        assert_eq!(player.current_time(), 0);
    }

    #[test]
    fn test_start_on_empty_timeline() {
        let (mut player, _) =
            Player::<u8, ()>::new(Timeline::empty(), (), &PlayerConfig::default());
        assert_eq!(player.start(), None);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_tempo_factor_scales_delays() {
        let (mut player, mut handle) = create_player();
        handle.set_tempo_factor(2.0).unwrap();
        handle.start().unwrap();

        // start command is picked up, then the first event is handled
        assert_eq!(millis(player.next_event()), Some(25));
        assert_eq!(player.tempo_factor(), 2.0);

        player.set_tempo_factor(0.5).unwrap();
        assert_eq!(millis(player.next_event()), Some(100));
    }

    #[test]
    fn test_tiny_tempo_factor_saturates_delay() {
        let (mut player, _) = create_player();
        assert!(player.set_tempo_factor(1e-300).is_ok());

        assert_eq!(player.start(), Some(Duration::ZERO));
        assert_eq!(player.next_event(), Some(Duration::MAX));
        assert_eq!(player.hooks().midi, vec![60]);
    }

    #[test]
    fn test_invalid_tempo_factor_keeps_previous() {
        let (mut player, _) = create_player();
        assert_eq!(
            player.set_tempo_factor(0.0),
            Err(PlayerError::InvalidTempoFactor(0.0))
        );
        assert!(player.set_tempo_factor(f64::NAN).is_err());
        assert_eq!(player.tempo_factor(), 1.0);
    }

    #[test]
    fn test_seek_waits_for_offset_first() {
        let (mut player, mut handle) = create_player();
        assert_eq!(millis(player.start()), Some(0));
        handle.seek(30).unwrap();

        assert_eq!(millis(player.next_event()), Some(20));
        assert!(player.hooks().times.is_empty());

        assert_eq!(millis(player.next_event()), Some(50));
        assert_eq!(player.hooks().times, vec![50]);
        assert_eq!(player.current_time(), 50);
    }

    #[test]
    fn test_start_after_seek_returns_offset() {
        let (mut player, _) = create_player();
        let result = player.seek(40);
        assert_eq!(result.position, 1);
        assert_eq!(millis(player.start()), Some(10));
        assert_eq!(millis(player.next_event()), Some(50));
        assert_eq!(player.hooks().times, vec![50]);
    }

    #[test]
    fn test_seek_past_end_stops_without_finish() {
        let (mut player, mut handle) = create_player();
        player.start();
        handle.seek(5000).unwrap();

        assert_eq!(player.next_event(), None);
        assert!(!player.is_playing());
        assert_eq!(player.hooks().finishes, 0);
    }

    #[test]
    fn test_seek_measure_command() {
        let (mut player, mut handle) = create_player();
        handle.seek_measure(2, 1).unwrap();
        handle.start().unwrap();

        assert_eq!(player.next_event(), None);
        assert_eq!(player.hooks().midi, vec![62]);
        assert_eq!(player.hooks().finishes, 1);
    }

    #[test]
    fn test_missing_measure_is_ignored() {
        let (mut player, _) = create_player();
        player.seek(50);
        assert!(!player.seek_measure(9, 1));
        assert_eq!(player.cursor().position(), 1);
    }

    #[test]
    fn test_stop_command_halts_dispatch() {
        let (mut player, mut handle) = create_player();
        player.start();
        assert_eq!(millis(player.next_event()), Some(50));

        handle.stop().unwrap();
        assert_eq!(player.next_event(), None);
        assert!(!player.is_playing());
        assert_eq!(player.hooks().midi, vec![60]);

        // resumes where it stopped
        assert_eq!(millis(player.start()), Some(0));
        assert_eq!(millis(player.next_event()), Some(50));
        assert_eq!(player.hooks().times, vec![0, 50]);
    }

    #[test]
    fn test_load_song_stops_and_rewinds() {
        let (mut player, _) = create_player();
        player.start();
        player.next_event();

        let song = Song::new(0).with_music(300, 72);
        player.load_song(&song, &BuildOptions::music_only());

        assert!(!player.is_playing());
        assert_eq!(player.cursor().position(), 0);
        assert_eq!(player.total_time(), 300);

        player.start();
        assert_eq!(player.next_event(), None);
        assert_eq!(player.hooks().midi, vec![60, 72]);
    }
}
