/// Terminal viewer driving the VRCAM camera transform each frame
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use vrcam_core::{CameraTransform, DisplayParameters, FrameState, Mesh};

pub mod cli;
pub mod logging;
pub mod renderer;

pub use renderer::AsciiRenderer;

const ROTATE_STEP: f32 = 0.1;
const MOVE_STEP: f32 = 20.0;
const CLIP_STEP: f32 = 5.0;

/// Apply one key press to the frame state. Returns `false` on quit.
pub fn apply_key(state: &mut FrameState, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Char('w') => state.model_rotation.rotate(-ROTATE_STEP, 0.0),
        KeyCode::Char('s') => state.model_rotation.rotate(ROTATE_STEP, 0.0),
        KeyCode::Char('a') => state.model_rotation.rotate(0.0, -ROTATE_STEP),
        KeyCode::Char('d') => state.model_rotation.rotate(0.0, ROTATE_STEP),
        KeyCode::Left => state.move_viewer(-MOVE_STEP, 0.0, 0.0),
        KeyCode::Right => state.move_viewer(MOVE_STEP, 0.0, 0.0),
        KeyCode::Up => state.move_viewer(0.0, MOVE_STEP, 0.0),
        KeyCode::Down => state.move_viewer(0.0, -MOVE_STEP, 0.0),
        KeyCode::Char('+') => state.move_viewer(0.0, 0.0, -MOVE_STEP),
        KeyCode::Char('-') => state.move_viewer(0.0, 0.0, MOVE_STEP),
        KeyCode::Char('i') => state.translate_model(0.0, 0.0, -MOVE_STEP),
        KeyCode::Char('k') => state.translate_model(0.0, 0.0, MOVE_STEP),
        KeyCode::Char('[') => state.adjust_clip(-CLIP_STEP, 0.0),
        KeyCode::Char(']') => state.adjust_clip(CLIP_STEP, 0.0),
        KeyCode::Char('t') => state.top_view = !state.top_view,
        KeyCode::Char('p') => state.perspective_mat = !state.perspective_mat,
        _ => {}
    }
    true
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    mesh: Mesh,
    state: FrameState,
    camera: CameraTransform,
    renderer: AsciiRenderer,
    last_error: Option<String>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, display: DisplayParameters, state: FrameState) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            mesh,
            state,
            camera: CameraTransform::new(display),
            // Bottom row is left for the status line
            renderer: AsciiRenderer::new(width as usize, height.saturating_sub(1) as usize),
            last_error: None,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                    self.running = apply_key(&mut self.state, code);
                }
            }

            self.update();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn update(&mut self) {
        // A rejected frame keeps the previous matrices, so keep drawing
        self.last_error = self
            .camera
            .update(&self.state)
            .err()
            .map(|err| err.to_string());
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.render_mesh(&self.mesh, &self.camera);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        let status = match &self.last_error {
            Some(err) => format!("last good frame shown: {}", err),
            None => format!(
                "{:?} | eye {:.0},{:.0},{:.0} | near {:.0} far {:.0} | FPS {:.1}",
                self.state.projection_mode(),
                self.state.viewer_position.x,
                self.state.viewer_position.y,
                self.state.viewer_position.z,
                self.state.clip_near,
                self.state.clip_far,
                self.fps
            ),
        };
        let color = if self.last_error.is_some() {
            Color::Red
        } else {
            Color::Yellow
        };
        queue!(
            stdout,
            cursor::MoveTo(0, self.renderer.height() as u16),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(color),
            Print(format!(
                "{} | WASD=Rotate Arrows=Move +/-=Zoom I/K=Push []=Near T=Top P=Persp Q=Quit",
                status
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrcam_core::ProjectionMode;

    #[test]
    fn test_apply_key_toggles_modes() {
        let mut state = FrameState::default();
        assert!(apply_key(&mut state, KeyCode::Char('p')));
        assert_eq!(state.projection_mode(), ProjectionMode::Orthographic);
        assert!(apply_key(&mut state, KeyCode::Char('t')));
        assert_eq!(state.projection_mode(), ProjectionMode::TopView);
    }

    #[test]
    fn test_apply_key_moves_viewer_and_model() {
        let mut state = FrameState::default();
        let start = state.viewer_position;
        apply_key(&mut state, KeyCode::Left);
        apply_key(&mut state, KeyCode::Char('+'));
        assert_eq!(state.viewer_position.x, start.x - MOVE_STEP);
        assert_eq!(state.viewer_position.z, start.z - MOVE_STEP);

        apply_key(&mut state, KeyCode::Char('d'));
        assert!((state.model_rotation.y - ROTATE_STEP).abs() < 1e-6);

        apply_key(&mut state, KeyCode::Char('k'));
        assert_eq!(state.model_translation.z, MOVE_STEP);
    }

    #[test]
    fn test_apply_key_quit() {
        let mut state = FrameState::default();
        assert!(!apply_key(&mut state, KeyCode::Char('q')));
        assert!(!apply_key(&mut state, KeyCode::Esc));
        assert!(apply_key(&mut state, KeyCode::Char('z')));
    }
}
