use std::thread;

use player::{Player, PlayerConfig};
use timeline::{BeatGrid, BeatMarker, PlaybackHooks, Song, TimeSignature};

struct ConsoleHooks;

impl PlaybackHooks<&'static str> for ConsoleHooks {
    fn on_midi_event(&mut self, midi: &&'static str) {
        println!("  midi  {midi}");
    }

    fn on_time_event(&mut self, time: u64) {
        println!("time  {:>5.1}s", time as f64 / 1000.0);
    }

    fn on_beat_event(&mut self, marker: BeatMarker) {
        println!(
            "  beat  {}:{} ({})",
            marker.measure, marker.beat, marker.signature
        );
    }

    fn on_finish(&mut self) {
        println!("done");
    }
}

fn main() {
    let length = 4000;
    let grid = BeatGrid::new(120.0, TimeSignature::new(3, 4));
    let song = [(0, "C4"), (500, "E4"), (1000, "G4"), (1500, "C5"), (3000, "C4")]
        .into_iter()
        .fold(Song::new(length), |song, (time, note)| {
            song.with_music(time, note)
        })
        .with_beats(grid.beats(length));

    let (mut player, mut handle) = Player::from_song(&song, ConsoleHooks, &PlayerConfig::default());

    // play at double speed, starting from the second measure
    if let Err(e) = handle
        .set_tempo_factor(2.0)
        .and_then(|()| handle.seek_measure(2, 1))
        .and_then(|()| handle.start())
    {
        eprintln!("Failed to queue commands: {e}");
        return;
    }

    let mut delay = player.next_event();
    while let Some(wait) = delay {
        thread::sleep(wait);
        delay = player.next_event();
    }
}
