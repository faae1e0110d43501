//! EduFun Audio - Background music playback using kira
//!
//! Provides the looping background track, its volume/enabled state machine,
//! and the one-shot gate that defers playback until the user interacts.

mod config;
mod controller;
mod error;
mod music;
mod unlock;

pub use config::{clamp_volume, AudioPreference, DEFAULT_VOLUME};
pub use controller::AudioController;
pub use error::AudioError;
pub use music::{KiraMusic, MusicOutput, SilentOutput};
pub use unlock::{AutoplayGate, Interaction};
