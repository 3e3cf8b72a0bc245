use log::warn;
use rtrb::{Consumer, Producer};

use crate::error::{PlayerError, check_tempo_factor};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Start,
    Stop,
    /// Go to a time (msec)
    Seek(u64),
    SeekMeasure {
        measure: u32,
        beat: u32,
    },
    SetTempoFactor(f64),
}

pub type PlayerCommandConsumer = Consumer<PlayerCommand>;

/// Control side of a player, usable from another thread.
#[derive(Debug)]
pub struct PlayerHandle {
    producer: Producer<PlayerCommand>,
}

impl PlayerHandle {
    pub(crate) const fn new(producer: Producer<PlayerCommand>) -> Self {
        Self { producer }
    }

    pub fn send(&mut self, command: PlayerCommand) -> Result<(), PlayerError> {
        self.producer.push(command).map_err(|_| {
            warn!("dropping {command:?}: command queue full");
            PlayerError::CommandQueueFull
        })
    }

    pub fn start(&mut self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Start)
    }

    pub fn stop(&mut self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Stop)
    }

    pub fn seek(&mut self, time: u64) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Seek(time))
    }

    pub fn seek_measure(&mut self, measure: u32, beat: u32) -> Result<(), PlayerError> {
        self.send(PlayerCommand::SeekMeasure { measure, beat })
    }

    /// Rejects factors that are not finite and positive before queueing.
    pub fn set_tempo_factor(&mut self, factor: f64) -> Result<(), PlayerError> {
        let factor = check_tempo_factor(factor)?;
        self.send(PlayerCommand::SetTempoFactor(factor))
    }
}
