//! Command line configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::scene::SceneKind;
use crate::scene::presets::DEFAULT_VIEWER_MODEL;

/// Animated heart and petal scenes.
#[derive(Parser, Debug)]
#[command(name = "heart3d", version, about)]
struct Args {
    /// Scene shown at startup.
    #[arg(long, value_enum, default_value = "heart")]
    scene: SceneKind,

    /// Directory holding the OBJ models.
    #[arg(long, default_value = "assets/models")]
    assets: PathBuf,

    /// Model opened by the viewer scene. Defaults to the first petal model.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Seed for particle placement. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Start with vertical sync enabled.
    #[arg(long)]
    vsync: bool,

    /// Initial window width in pixels.
    #[arg(long, default_value_t = 1600)]
    width: u32,

    /// Initial window height in pixels.
    #[arg(long, default_value_t = 900)]
    height: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub scene: SceneKind,
    pub assets: PathBuf,
    pub viewer_model: PathBuf,
    pub seed: Option<u64>,
    pub vsync: bool,
    pub width: u32,
    pub height: u32,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let viewer_model = args
            .model
            .unwrap_or_else(|| args.assets.join(DEFAULT_VIEWER_MODEL));

        Self {
            scene: args.scene,
            assets: args.assets,
            viewer_model,
            seed: args.seed,
            vsync: args.vsync,
            width: args.width.max(1),
            height: args.height.max(1),
        }
    }
}

impl AppConfig {
    pub fn parse() -> Self {
        Args::parse().into()
    }

    #[cfg(test)]
    fn parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Args::try_parse_from(args).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::parse_from(["heart3d"]).unwrap();
        assert_eq!(config.scene, SceneKind::Heart);
        assert_eq!(config.assets, PathBuf::from("assets/models"));
        assert_eq!(config.viewer_model, PathBuf::from("assets/models/flower1.obj"));
        assert_eq!(config.seed, None);
        assert!(!config.vsync);
    }

    #[test]
    fn test_scene_names() {
        let config = AppConfig::parse_from(["heart3d", "--scene", "petal-tunnel", "--seed", "42"]).unwrap();
        assert_eq!(config.scene, SceneKind::PetalTunnel);
        assert_eq!(config.seed, Some(42));

        let config = AppConfig::parse_from(["heart3d", "--scene", "heart-trail"]).unwrap();
        assert_eq!(config.scene, SceneKind::HeartTrail);

        assert!(AppConfig::parse_from(["heart3d", "--scene", "teapot"]).is_err());
    }

    #[test]
    fn test_explicit_model_overrides_assets() {
        let config = AppConfig::parse_from([
            "heart3d",
            "--assets",
            "models",
            "--model",
            "elsewhere/rose.obj",
        ])
        .unwrap();
        assert_eq!(config.viewer_model, PathBuf::from("elsewhere/rose.obj"));
        assert_eq!(config.assets, PathBuf::from("models"));
    }
}
