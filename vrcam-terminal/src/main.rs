/// VRCAM Terminal Viewer - camera transform demo
///
/// Renders a cube through the model/view/projection matrices built from the
/// display description and the keyboard-driven frame state.
use anyhow::Context;
use clap::Parser;
use vrcam_core::Mesh;
use vrcam_terminal::cli::Cli;
use vrcam_terminal::logging::{init_logging, LoggingConfig};
use vrcam_terminal::TerminalApp;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        env_filter: cli.log_filter.clone(),
    });

    let display = cli
        .display_parameters()
        .context("failed to load display parameters")?;
    log::info!("display {:?}", display);

    let cube = Mesh::cube(cli.cube_size);
    let mut app = TerminalApp::new(cube, display, cli.initial_state())?;
    app.run()?;

    Ok(())
}
