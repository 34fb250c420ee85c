//! WebGPU client for 3D Pong
//!
//! Game logic lives in [`app::ClientApp`] and compiles everywhere. The
//! browser surface (wgpu renderer, DOM, `PongClient`) exists on wasm32 only.
//! The WebSocket itself is owned by JavaScript; this side only produces and
//! consumes frames.

pub mod app;
pub mod camera;
pub mod fsm;
pub mod mesh;
pub mod network;
pub mod scene;

#[cfg(target_arch = "wasm32")]
mod renderer;

#[cfg(target_arch = "wasm32")]
pub use web::PongClient;

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::app::ClientApp;
    use crate::camera::Camera;
    use crate::renderer::Renderer;
    use game_core::{Side, Viewport};
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    #[wasm_bindgen]
    pub struct PongClient {
        app: ClientApp,
        renderer: Renderer,
        canvas: HtmlCanvasElement,
        last_score: String,
    }

    #[wasm_bindgen]
    impl PongClient {
        /// Set up logging and WebGPU on `canvas`
        pub async fn create(canvas: HtmlCanvasElement) -> Result<PongClient, JsValue> {
            console_error_panic_hook::set_once();
            // A second client on the same page already installed the logger
            let _ = console_log::init_with_level(log::Level::Info);

            let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
            let viewport = css_viewport(&canvas);
            let app = ClientApp::new(seed, viewport);

            let camera = Camera::behind(Side::Two, aspect(viewport), app.config());
            let renderer = Renderer::new(canvas.clone(), &camera)
                .await
                .map_err(|e| JsValue::from_str(&e))?;

            log::info!("Client ready");
            Ok(PongClient {
                app,
                renderer,
                canvas,
                last_score: String::new(),
            })
        }

        /// Bytes to send on the room socket once it opens
        pub fn join_message(&mut self, code: &str) -> Result<Vec<u8>, JsValue> {
            self.app.join(code).map_err(|e| JsValue::from_str(&e))
        }

        pub fn handle_message(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
            self.app
                .handle_bytes(bytes)
                .map_err(|e| JsValue::from_str(&e))
        }

        pub fn pointer_moved(&mut self, x: f32, y: f32) {
            self.app.pointer_moved(x, y);
        }

        /// CSS size of the canvas; the backing store size is read off the element
        pub fn resize(&mut self, width: f32, height: f32) {
            self.app.resize(width, height);
            self.renderer
                .resize(self.canvas.width(), self.canvas.height());
        }

        /// Advance, render and refresh the score line
        pub fn frame(&mut self, now_ms: f64) -> Result<(), JsValue> {
            self.app.frame(now_ms);

            // No session draws an empty frame
            let scene = self.app.scene().unwrap_or_default();
            let camera = Camera::behind(
                self.app.viewpoint(),
                self.renderer.aspect(),
                self.app.config(),
            );
            self.renderer
                .draw(&scene, &camera)
                .map_err(|e| JsValue::from_str(&e))?;

            self.update_score_display();
            Ok(())
        }

        /// Frames queued since the last call, oldest first
        pub fn take_outgoing(&mut self) -> js_sys::Array {
            self.app
                .take_outgoing()
                .into_iter()
                .map(|bytes| JsValue::from(js_sys::Uint8Array::from(bytes.as_slice())))
                .collect()
        }

        pub fn disconnected(&mut self) {
            self.app.disconnected();
            self.update_score_display();
        }

        pub fn state_string(&self) -> String {
            self.app.state_string()
        }

        pub fn rtt_ms(&self) -> Option<u32> {
            self.app.rtt_ms()
        }

        /// Why the relay refused the last join, if it did
        pub fn rejection(&self) -> Option<String> {
            self.app.rejection_text()
        }
    }

    impl PongClient {
        fn update_score_display(&mut self) {
            let text = self.app.score_text();
            if text == self.last_score {
                return;
            }
            let element = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id("score-display"));
            if let Some(element) = element {
                element.set_text_content(Some(&text));
            }
            self.last_score = text;
        }
    }

    fn css_viewport(canvas: &HtmlCanvasElement) -> Viewport {
        let ratio = web_sys::window()
            .map(|window| window.device_pixel_ratio())
            .unwrap_or(1.0) as f32;
        Viewport::new(
            canvas.width() as f32 / ratio,
            canvas.height() as f32 / ratio,
        )
    }

    fn aspect(viewport: Viewport) -> f32 {
        viewport.width / viewport.height.max(1.0)
    }
}
