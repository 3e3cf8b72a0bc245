use timeline::BuildOptions;

/// Settings applied when a player is created.
#[derive(Debug, Clone, Copy)]
pub struct PlayerConfig {
    /// Slots in the command ring between a `PlayerHandle` and its player
    pub command_capacity: usize,
    /// How songs are turned into timelines
    pub build: BuildOptions,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command_capacity: 32,
            build: BuildOptions::default(),
        }
    }
}
