// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;
use vrcam_core::{ConfigError, DisplayParameters, FrameState};

#[derive(Parser, Debug, Clone)]
#[command(name = "vrcam-terminal")]
#[command(about = "Terminal viewer for the VRCAM camera transform", long_about = None)]
pub struct Cli {
    /// JSON file with canvas size, pixel pitch and viewing distance
    #[arg(long)]
    pub display: Option<PathBuf>,

    /// Start with the orthographic projection
    #[arg(long)]
    pub orthographic: bool,

    /// Start with the overhead camera
    #[arg(long = "top-view")]
    pub top_view: bool,

    /// Edge length of the demo cube in millimeters
    #[arg(long = "cube-size", default_value_t = 200.0)]
    pub cube_size: f32,

    /// Log filter in env_logger syntax, overrides RUST_LOG
    #[arg(long = "log-filter")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn display_parameters(&self) -> Result<DisplayParameters, ConfigError> {
        match &self.display {
            Some(path) => DisplayParameters::from_json_file(path),
            None => Ok(DisplayParameters::default()),
        }
    }

    pub fn initial_state(&self) -> FrameState {
        FrameState {
            top_view: self.top_view,
            perspective_mat: !self.orthographic,
            ..FrameState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrcam_core::ProjectionMode;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["vrcam-terminal"]).unwrap();
        assert!(cli.display.is_none());
        assert_eq!(cli.cube_size, 200.0);
        assert_eq!(cli.initial_state().projection_mode(), ProjectionMode::Perspective);
        assert_eq!(cli.display_parameters().unwrap(), DisplayParameters::default());
    }

    #[test]
    fn test_mode_flags() {
        let cli = Cli::try_parse_from(["vrcam-terminal", "--orthographic"]).unwrap();
        assert_eq!(cli.initial_state().projection_mode(), ProjectionMode::Orthographic);

        let cli = Cli::try_parse_from(["vrcam-terminal", "--top-view", "--cube-size", "50"]).unwrap();
        assert_eq!(cli.initial_state().projection_mode(), ProjectionMode::TopView);
        assert_eq!(cli.cube_size, 50.0);
    }

    #[test]
    fn test_missing_display_file() {
        let cli = Cli::try_parse_from(["vrcam-terminal", "--display", "/nonexistent/display.json"])
            .unwrap();
        assert!(matches!(cli.display_parameters(), Err(ConfigError::Io(_))));
    }
}
