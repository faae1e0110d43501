/// User interactions that may unlock deferred playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interaction {
    Click,
    Key,
    Touch,
}

impl Interaction {
    pub const ALL: [Interaction; 3] = [Interaction::Click, Interaction::Key, Interaction::Touch];
}

/// One-shot gate holding back playback until the first user interaction.
///
/// One listener is registered per [`Interaction`] kind. Whichever fires first
/// wins and all listeners are dropped; every later interaction is ignored.
#[derive(Debug, Clone, Default)]
pub struct AutoplayGate {
    listening: Vec<Interaction>,
}

impl AutoplayGate {
    /// A gate listening for every interaction kind.
    pub fn armed() -> Self {
        Self {
            listening: Interaction::ALL.to_vec(),
        }
    }

    /// A gate that never fires.
    pub fn disarmed() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        !self.listening.is_empty()
    }

    /// Report an interaction. Returns `true` only for the first qualifying one.
    pub fn fire(&mut self, interaction: Interaction) -> bool {
        if !self.listening.contains(&interaction) {
            return false;
        }
        self.listening.clear();
        true
    }

    /// Drop all listeners without firing.
    pub fn disarm(&mut self) {
        self.listening.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_interaction_wins() {
        let mut gate = AutoplayGate::armed();
        assert!(gate.is_armed());
        assert!(gate.fire(Interaction::Key));
        assert!(!gate.is_armed());
        assert!(!gate.fire(Interaction::Click));
        assert!(!gate.fire(Interaction::Key));
        assert!(!gate.fire(Interaction::Touch));
    }

    #[test]
    fn disarmed_gate_never_fires() {
        let mut gate = AutoplayGate::disarmed();
        for interaction in Interaction::ALL {
            assert!(!gate.fire(interaction));
        }
    }

    #[test]
    fn disarm_drops_listeners() {
        let mut gate = AutoplayGate::armed();
        gate.disarm();
        assert!(!gate.fire(Interaction::Touch));
    }
}
