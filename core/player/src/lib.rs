pub mod config;
pub mod error;
pub mod player;

pub use config::PlayerConfig;
pub use error::PlayerError;
pub use player::{
    Player,
    command::{PlayerCommand, PlayerHandle},
};
