use crate::scene::SceneKind;
use crate::scene::presets::{BACKGROUND_PRESETS, Background, background_preset};

pub struct UiState {
    pub scene: SceneKind,
    pub auto_rotate: bool,
    /// Index into `BACKGROUND_PRESETS`.
    pub background: usize,
    pub music_enabled: bool,

    pub vsync_enabled: bool,
    pub show_stats: bool,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            scene: SceneKind::Heart,
            auto_rotate: true,
            background: 0,
            music_enabled: false,

            vsync_enabled: false,
            show_stats: true,
            show_help: true,
        }
    }
}

impl UiState {
    pub fn next_background(&self) -> Background {
        background_preset(self.background + 1)
    }

    pub fn cycle_background(&mut self) {
        self.background = (self.background + 1) % BACKGROUND_PRESETS.len();
    }
}

/// Numbers shown in the stats block, refreshed once per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub frame_ms: f32,
    pub particles: usize,
    pub mesh_draws: usize,
    pub meshes: usize,
}
