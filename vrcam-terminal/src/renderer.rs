/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Vector3;
use std::io::Write;
use vrcam_core::{CameraTransform, Mesh, Triangle};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Rasterizes meshes through the camera's current matrices into a character grid
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, camera: &CameraTransform) {
        // Headlight: light travels along the camera's view axis
        let model_view = camera.model_view();
        let normal_matrix = model_view.fixed_view::<3, 3>(0, 0).into_owned();

        for triangle in &mesh.triangles {
            let normal = (normal_matrix * triangle.face_normal()).normalize();
            let brightness = normal.dot(&Vector3::z()).max(0.0);
            self.render_triangle(triangle, camera, brightness);
        }
    }

    fn render_triangle(&mut self, triangle: &Triangle, camera: &CameraTransform, brightness: f32) {
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                &vertex.position,
                self.width as u32,
                self.height as u32,
            ) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        self.rasterize_triangle(&screen_coords, LUMINOSITY_RAMP[char_index]);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char) {
        let [v0, v1, v2] = *coords;

        // Bounding box clipped to the grid
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p)
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // NDC depth, smaller is nearer
                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_at(x, y);
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    _ => Color::Cyan,
                };
                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Barycentric coordinates of `p`, `None` for a degenerate triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);
    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    Some((w0, w1, 1.0 - w0 - w1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrcam_core::{DisplayParameters, FrameState};

    fn camera_for(state: &FrameState) -> CameraTransform {
        let mut camera = CameraTransform::new(DisplayParameters::default());
        camera.update(state).unwrap();
        camera
    }

    #[test]
    fn test_barycentric() {
        let (w0, w1, w2) =
            barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!((w0 - 0.5).abs() < 1e-6);
        assert!((w1 - 0.25).abs() < 1e-6);
        assert!((w2 - 0.25).abs() < 1e-6);

        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 0.0)).is_none());
    }

    #[test]
    fn test_cube_covers_screen_center() {
        let mut renderer = AsciiRenderer::new(80, 40);
        let camera = camera_for(&FrameState::default());
        renderer.render_mesh(&Mesh::cube(200.0), &camera);

        // The front face points straight at the viewer: brightest character
        assert_eq!(renderer.char_at(40, 20), '@');
        assert_eq!(renderer.char_at(0, 0), ' ');

        renderer.clear();
        assert_eq!(renderer.char_at(40, 20), ' ');
    }

    #[test]
    fn test_mesh_behind_viewer_is_not_drawn() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let mut state = FrameState::default();
        state.model_translation = nalgebra::Vector3::new(0.0, 0.0, 2000.0);
        let camera = camera_for(&state);
        renderer.render_mesh(&Mesh::cube(200.0), &camera);

        for y in 0..renderer.height() {
            for x in 0..renderer.width() {
                assert_eq!(renderer.char_at(x, y), ' ');
            }
        }
    }

    #[test]
    fn test_draw_emits_one_row_per_line() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_draw_zero_width_grid() {
        // Some headless terminals report zero columns
        let mut renderer = AsciiRenderer::new(0, 10);
        renderer.clear();
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 10);

        let camera = camera_for(&FrameState::default());
        renderer.render_mesh(&Mesh::cube(200.0), &camera);
    }
}
