// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::scenes::{MaterialChoice, SceneKind};

#[derive(Parser, Debug, Clone)]
#[command(name = "scene-lab")]
#[command(about = "Interactive 3D scene playground", long_about = None)]
pub struct Cli {
    /// Which scene to open
    #[arg(long, value_enum, env = "SCENE", default_value_t = SceneKind::Materials)]
    pub scene: SceneKind,

    /// Material used by the materials scene
    #[arg(long, value_enum, default_value_t = MaterialChoice::Standard)]
    pub material: MaterialChoice,

    /// Directory the texture paths are resolved against
    #[arg(long, default_value = "static")]
    pub assets: PathBuf,

    /// Hide the debug panel and stats overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["scene-lab"]).unwrap();
        assert_eq!(cli.scene, SceneKind::Materials);
        assert_eq!(cli.material, MaterialChoice::Standard);
        assert_eq!(cli.assets, PathBuf::from("static"));
        assert!(!cli.no_ui);
        assert_eq!((cli.width, cli.height), (800, 600));
    }

    #[test]
    fn test_scene_and_material_flags() {
        let cli = Cli::try_parse_from([
            "scene-lab",
            "--scene",
            "cube",
            "--material",
            "toon",
            "--no-ui",
        ])
        .unwrap();
        assert_eq!(cli.scene, SceneKind::Cube);
        assert_eq!(cli.material, MaterialChoice::Toon);
        assert!(cli.no_ui);
    }

    #[test]
    fn test_unknown_material_is_rejected() {
        assert!(Cli::try_parse_from(["scene-lab", "--material", "chrome"]).is_err());
    }
}
