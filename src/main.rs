//! Arcade entry point
//!
//! Native: a headless runner that plays one game with an autopilot and
//! prints a summary. Web: binds `<canvas id="canvas">`, picks the game from
//! the URL hash and forwards DOM input to the engine.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::{Clamped, JsCast};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, KeyboardEvent, MouseEvent, TouchEvent};

    use arcade_engine::engine::scheduler::web::RafScheduler;
    use arcade_engine::input::Key;
    use arcade_engine::renderer::Framebuffer;
    use arcade_engine::{Cabinet, GameKind, HostBridge, Settings};

    /// The single engine instance bound to the page canvas
    struct Host {
        cabinet: Box<dyn Cabinet>,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl Host {
        fn blit(&self) {
            let Some(fb) = self.cabinet.surface() else {
                return;
            };
            match ImageData::new_with_u8_clamped_array_and_sh(Clamped(fb.as_bytes()), fb.width(), fb.height()) {
                Ok(image) => {
                    let _ = self.ctx.put_image_data(&image, 0.0, 0.0);
                }
                Err(e) => log::warn!("blit failed: {:?}", e),
            }
        }

        /// Client coordinates to surface pixels
        fn to_surface(&self, client_x: f64, client_y: f64) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let sx = self.canvas.width() as f64 / rect.width().max(1.0);
            let sy = self.canvas.height() as f64 / rect.height().max(1.0);
            Vec2::new(
                ((client_x - rect.left()) * sx) as f32,
                ((client_y - rect.top()) * sy) as f32,
            )
        }
    }

    type Shared = Rc<RefCell<Option<Host>>>;

    fn with_host(host: &Shared, f: impl FnOnce(&mut Host)) {
        if let Ok(mut slot) = host.try_borrow_mut() {
            if let Some(h) = slot.as_mut() {
                f(h);
                h.blit();
            }
        }
    }

    fn listen<E: JsCast + 'static>(target: &web_sys::EventTarget, name: &str, f: impl FnMut(E) + 'static) {
        let closure = Closure::<dyn FnMut(E)>::new(f);
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document.get_element_by_id("canvas").ok_or("no canvas")?.dyn_into()?;

        let hash = window.location().hash().unwrap_or_default();
        let kind = GameKind::from_slug(&hash).unwrap_or(GameKind::BrickBreaker);
        let (width, height) = kind.surface_size();
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d")?.ok_or("no 2d context")?.dyn_into()?;

        let settings = Settings::load();
        // Write back so the stored document lists every knob with its value
        settings.save();
        let host: Shared = Rc::new(RefCell::new(None));

        let weak = Rc::downgrade(&host);
        let scheduler = RafScheduler::new(move |handle, time| {
            if let Some(host) = weak.upgrade() {
                with_host(&host, |h| h.cabinet.on_frame(handle, time));
            }
        });

        let mut cabinet = kind.launch(&settings, Box::new(scheduler));
        let bridge = HostBridge::new()
            .on_score(|board| log::debug!("score {} / {}", board.score, board.rival_score))
            .on_lives(|lives| log::info!("lives {lives}"))
            .on_level(|level| log::info!("level {level}"))
            .on_running(|running| log::debug!("running {running}"));
        cabinet
            .init(Some(Framebuffer::new(width, height)), bridge)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        *host.borrow_mut() = Some(Host {
            cabinet,
            canvas: canvas.clone(),
            ctx,
        });
        with_host(&host, |_| {});

        setup_input(&window, &canvas, host.clone());
        log::info!("{} ready ({} quality)", kind.name(), settings.quality.as_str());
        Ok(())
    }

    fn setup_input(window: &web_sys::Window, canvas: &HtmlCanvasElement, host: Shared) {
        {
            let host = host.clone();
            listen(window, "keydown", move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom(&event.key()) {
                    event.prevent_default();
                    with_host(&host, |h| h.cabinet.handle_key_down(key));
                }
            });
        }
        {
            let host = host.clone();
            listen(window, "keyup", move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom(&event.key()) {
                    with_host(&host, |h| h.cabinet.handle_key_up(key));
                }
            });
        }
        {
            let host = host.clone();
            listen(canvas, "mousemove", move |event: MouseEvent| {
                with_host(&host, |h| {
                    let pos = h.to_surface(event.client_x() as f64, event.client_y() as f64);
                    h.cabinet.move_pointer(pos);
                });
            });
        }
        {
            let host = host.clone();
            listen(canvas, "mousedown", move |event: MouseEvent| {
                with_host(&host, |h| {
                    let pos = h.to_surface(event.client_x() as f64, event.client_y() as f64);
                    h.cabinet.tap(pos);
                });
            });
        }
        {
            let host = host.clone();
            listen(canvas, "touchstart", move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    with_host(&host, |h| {
                        let pos = h.to_surface(touch.client_x() as f64, touch.client_y() as f64);
                        h.cabinet.tap(pos);
                    });
                }
            });
        }
        {
            let host = host.clone();
            listen(canvas, "touchmove", move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    with_host(&host, |h| {
                        let pos = h.to_surface(touch.client_x() as f64, touch.client_y() as f64);
                        h.cabinet.move_pointer(pos);
                    });
                }
            });
        }

        // Auto-pause when the window loses focus
        listen(window, "blur", move |_event: web_sys::FocusEvent| {
            with_host(&host, |h| h.cabinet.pause());
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    web::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match headless::run(std::env::args().skip(1).collect()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("usage: arcade-engine [game] [frames] [--config path]");
            std::process::ExitCode::FAILURE
        }
    }
}
