/// Background music switch.
///
/// No audio backend is linked in, so enabling the player only records the state
/// and reports that nothing can be played.
#[derive(Debug, Default)]
pub struct MusicPlayer {
    enabled: bool,
    warned: bool,
}

impl MusicPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        if enabled {
            log::info!("music on");
            if !self.warned {
                log::warn!("no audio output available; music stays silent");
                self.warned = true;
            }
        } else {
            log::info!("music off");
        }
    }

    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_state() {
        let mut player = MusicPlayer::new();
        assert!(!player.enabled);
        assert!(player.toggle());
        assert!(!player.toggle());
    }

    #[test]
    fn test_missing_output_is_reported_once() {
        let mut player = MusicPlayer::new();
        player.set_enabled(true);
        player.set_enabled(false);
        player.set_enabled(true);
        assert!(player.warned);
        assert!(player.enabled);
    }
}
