//! Pub/sub channel between presentation surfaces
//!
//! The settings screen publishes preference changes; any other open surface
//! (the dashboard, say) subscribes and applies them to its own music.

use edufun_audio::AudioPreference;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 32;

/// Something another surface may need to mirror
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    /// Local audio preferences changed (slider, toggle or save)
    AudioChanged(AudioPreference),
    /// The session ended; surfaces should stop their music
    SignedOut,
}

/// Broadcast hub. Cloning yields another handle to the same channel.
#[derive(Debug, Clone)]
pub struct SettingsBus {
    sender: broadcast::Sender<SettingsEvent>,
}

impl Default for SettingsBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsEvent> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers. Having none is fine.
    pub fn publish(&self, event: SettingsEvent) {
        if self.sender.send(event).is_err() {
            debug!("No surfaces subscribed to settings events");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers() {
        let bus = SettingsBus::new();
        bus.publish(SettingsEvent::SignedOut);
    }

    #[tokio::test]
    async fn every_subscriber_receives() {
        let bus = SettingsBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        let pref = AudioPreference {
            music_volume: 0.3,
            ..Default::default()
        };
        bus.publish(SettingsEvent::AudioChanged(pref));

        assert_eq!(first.recv().await.unwrap(), SettingsEvent::AudioChanged(pref));
        assert_eq!(second.recv().await.unwrap(), SettingsEvent::AudioChanged(pref));
    }
}
