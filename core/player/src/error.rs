use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum PlayerError {
    /// The command ring is full; the player hasn't drained it yet
    CommandQueueFull,
    /// Tempo factors must be finite and greater than zero
    InvalidTempoFactor(f64),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandQueueFull => write!(f, "player command queue is full"),
            Self::InvalidTempoFactor(factor) => write!(f, "invalid tempo factor {factor}"),
        }
    }
}

impl std::error::Error for PlayerError {}

pub(crate) fn check_tempo_factor(factor: f64) -> Result<f64, PlayerError> {
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(PlayerError::InvalidTempoFactor(factor))
    }
}
