/// VRCAM Web - WASM bindings for the camera transform
///
/// Exposes the per-frame update and the three matrices to a WebGL page. The
/// matrices come out as column-major `Float32Array`s, ready for
/// `uniformMatrix4fv(location, false, data)`.
use nalgebra::{Matrix4, Point3, Vector3};
use vrcam_core::{CameraTransform, DisplayParameters, FrameState, TransformError};
use wasm_bindgen::prelude::*;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn column_major(matrix: &Matrix4<f32>) -> Vec<f32> {
    matrix.as_slice().to_vec()
}

#[wasm_bindgen]
pub struct WebCamera {
    camera: CameraTransform,
    state: FrameState,
}

impl WebCamera {
    fn with_display(display: DisplayParameters) -> Self {
        Self {
            camera: CameraTransform::new(display),
            state: FrameState::default(),
        }
    }

    fn try_update(&mut self) -> Result<(), TransformError> {
        self.camera.update(&self.state)
    }
}

#[wasm_bindgen]
impl WebCamera {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_width: f32,
        canvas_height: f32,
        pixel_pitch: f32,
        distance_screen_viewer: f32,
    ) -> Result<WebCamera, JsValue> {
        let display = DisplayParameters::new(
            canvas_width,
            canvas_height,
            pixel_pitch,
            distance_screen_viewer,
        )
        .map_err(to_js_error)?;
        Ok(Self::with_display(display))
    }

    /// Build from a JSON display description
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<WebCamera, JsValue> {
        let display = DisplayParameters::from_json_str(json).map_err(to_js_error)?;
        Ok(Self::with_display(display))
    }

    #[wasm_bindgen(js_name = setModelTranslation)]
    pub fn set_model_translation(&mut self, x: f32, y: f32, z: f32) {
        self.state.model_translation = Vector3::new(x, y, z);
    }

    #[wasm_bindgen(js_name = setModelRotation)]
    pub fn set_model_rotation(&mut self, x: f32, y: f32) {
        self.state.model_rotation.x = x;
        self.state.model_rotation.y = y;
    }

    #[wasm_bindgen(js_name = setViewerPosition)]
    pub fn set_viewer_position(&mut self, x: f32, y: f32, z: f32) {
        self.state.viewer_position = Point3::new(x, y, z);
    }

    #[wasm_bindgen(js_name = setViewerTarget)]
    pub fn set_viewer_target(&mut self, x: f32, y: f32, z: f32) {
        self.state.viewer_target = Point3::new(x, y, z);
    }

    #[wasm_bindgen(js_name = setClipPlanes)]
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.state.clip_near = near;
        self.state.clip_far = far;
    }

    #[wasm_bindgen(js_name = setTopView)]
    pub fn set_top_view(&mut self, enabled: bool) {
        self.state.top_view = enabled;
    }

    #[wasm_bindgen(js_name = setPerspective)]
    pub fn set_perspective(&mut self, enabled: bool) {
        self.state.perspective_mat = enabled;
    }

    /// Recompute the matrices. On error the previous frame's matrices stay
    /// in place and the error is both logged and thrown.
    pub fn update(&mut self) -> Result<(), JsValue> {
        self.try_update().map_err(|err| {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "vrcam: keeping previous frame: {}",
                err
            )));
            to_js_error(err)
        })
    }

    #[wasm_bindgen(js_name = modelMat)]
    pub fn model_mat(&self) -> Vec<f32> {
        column_major(self.camera.model())
    }

    #[wasm_bindgen(js_name = viewMat)]
    pub fn view_mat(&self) -> Vec<f32> {
        column_major(self.camera.view())
    }

    #[wasm_bindgen(js_name = projectionMat)]
    pub fn projection_mat(&self) -> Vec<f32> {
        column_major(self.camera.projection())
    }

    #[wasm_bindgen(js_name = modelViewMat)]
    pub fn model_view_mat(&self) -> Vec<f32> {
        column_major(&self.camera.model_view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_camera() -> WebCamera {
        let mut camera =
            WebCamera::with_display(DisplayParameters::new(1000.0, 800.0, 0.3, 600.0).unwrap());
        camera.set_viewer_position(0.0, 0.0, 500.0);
        camera.set_viewer_target(0.0, 0.0, 0.0);
        camera.set_clip_planes(10.0, 1000.0);
        camera
    }

    #[test]
    fn test_matrices_are_column_major() {
        let mut camera = scenario_camera();
        camera.try_update().unwrap();

        let view = camera.view_mat();
        assert_eq!(view.len(), 16);
        // Translation lives in elements 12..15 for column-major storage
        assert!((view[14] + 500.0).abs() < 1e-4);
        assert_eq!(view[15], 1.0);

        let projection = camera.projection_mat();
        assert!((projection[0] - 4.0).abs() < 1e-4);
        // Row 3, column 2: the -1 that copies -z into w
        assert_eq!(projection[11], -1.0);
    }

    #[test]
    fn test_model_view_combines_setters() {
        let mut camera = scenario_camera();
        camera.set_model_translation(0.0, 10.0, 0.0);
        camera.try_update().unwrap();

        let model = camera.model_mat();
        assert!((model[13] - 10.0).abs() < 1e-4);
        let model_view = camera.model_view_mat();
        assert!((model_view[13] - 10.0).abs() < 1e-4);
        assert!((model_view[14] + 500.0).abs() < 1e-4);
    }

    #[test]
    fn test_rejected_update_keeps_previous_frame() {
        let mut camera = scenario_camera();
        camera.try_update().unwrap();
        let projection = camera.projection_mat();

        camera.set_clip_planes(0.0, 1000.0);
        assert!(camera.try_update().is_err());
        assert_eq!(camera.projection_mat(), projection);

        camera.set_top_view(true);
        camera.set_clip_planes(10.0, 1000.0);
        camera.try_update().unwrap();
        assert!((camera.view_mat()[14] + 1500.0).abs() < 1e-4);
    }
}
