pub mod cursor;
pub mod hooks;
pub mod signature;
pub mod song;
pub mod timeline;

pub use cursor::{SeekResult, TimelineCursor};
pub use hooks::PlaybackHooks;
pub use signature::{BeatGrid, TimeSignature};
pub use song::{BeatDescriptor, Song};
pub use timeline::{BeatMarker, BuildOptions, EventBundle, Timeline, TimelineEntry};
