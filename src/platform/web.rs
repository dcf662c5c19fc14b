//! Browser bindings
//!
//! `ArcadeHandle` is what the host page holds: it owns the engine, the
//! canvas surface, the animation-frame callback and every DOM listener, and
//! tears all of them down on `stop()`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, KeyboardEvent, PointerEvent, TouchEvent};

use crate::audio::WebAudioSink;
use crate::config::EngineConfig;
use crate::consts::SIM_DT;
use crate::engine::{GameEngine, HostCallbacks};
use crate::input::{InputEvent, SwipeDirection};
use crate::renderer::canvas::CanvasSurface;
use crate::sim::state::GamePhase;
use crate::sim::tick::Action;

/// Host callbacks backed by optional JS functions
/// (`onScoreChange`, `onStateChange`, `onClose`)
struct JsHost {
    on_score: Option<Function>,
    on_state: Option<Function>,
    on_close: Option<Function>,
}

impl JsHost {
    fn from_object(callbacks: &JsValue) -> Self {
        let get = |name: &str| {
            if callbacks.is_object() {
                Reflect::get(callbacks, &JsValue::from_str(name))
                    .ok()
                    .and_then(|v| v.dyn_into::<Function>().ok())
            } else {
                None
            }
        };
        Self {
            on_score: get("onScoreChange"),
            on_state: get("onStateChange"),
            on_close: get("onClose"),
        }
    }
}

impl HostCallbacks for JsHost {
    fn on_score_change(&mut self, score: u64) {
        if let Some(f) = &self.on_score {
            let _ = f.call1(&JsValue::NULL, &JsValue::from_f64(score as f64));
        }
    }

    fn on_state_change(&mut self, phase: GamePhase) {
        if let Some(f) = &self.on_state {
            let _ = f.call1(&JsValue::NULL, &JsValue::from_str(phase.as_str()));
        }
    }

    fn on_close(&mut self) {
        if let Some(f) = &self.on_close {
            let _ = f.call0(&JsValue::NULL);
        }
    }
}

/// Flags shared with callbacks without borrowing the runtime
#[derive(Default)]
struct Shared {
    stopped: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    resize_pending: Cell<bool>,
    touch_start: Cell<Option<(f32, f32)>>,
}

struct Runtime {
    engine: GameEngine,
    surface: CanvasSurface,
    last_time: f64,
}

impl Runtime {
    fn frame(&mut self, time: f64, shared: &Shared) {
        // Resizes land here, before anything reads the layout
        if shared.resize_pending.replace(false) {
            let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            let (w, h) = self.surface.fit_to_display(dpr);
            self.engine.resize(w as f32, h as f32);
        }

        let dt = if self.last_time > 0.0 {
            ((time - self.last_time) / 1000.0) as f32
        } else {
            SIM_DT
        };
        self.last_time = time;

        self.engine.update(dt);
        self.engine.render(&mut self.surface);
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<F>(target: &EventTarget, kind: &'static str, handler: F) -> Option<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }

    fn detach(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Canvas position of a client-space point
fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f32, f32) {
    let (client_x, client_y) = (f64::from(client_x), f64::from(client_y));
    let rect = canvas.get_bounding_client_rect();
    let sx = if rect.width() > 0.0 {
        canvas.width() as f64 / rect.width()
    } else {
        1.0
    };
    let sy = if rect.height() > 0.0 {
        canvas.height() as f64 / rect.height()
    } else {
        1.0
    };
    (
        ((client_x - rect.left()) * sx) as f32,
        ((client_y - rect.top()) * sy) as f32,
    )
}

fn is_game_key(code: &str) -> bool {
    matches!(
        code,
        "Space" | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight"
    )
}

#[wasm_bindgen]
pub struct ArcadeHandle {
    runtime: Rc<RefCell<Runtime>>,
    shared: Rc<Shared>,
    canvas: HtmlCanvasElement,
    frame: FrameClosure,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl ArcadeHandle {
    /// `options_json` is an `EngineConfig`; `callbacks` an object of optional functions
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        options_json: &str,
        callbacks: JsValue,
    ) -> Result<ArcadeHandle, JsValue> {
        console_error_panic_hook::set_once();
        // Several games per page share one logger
        let _ = console_log::init_with_level(log::Level::Info);

        let mut config = EngineConfig::from_json(options_json)
            .map_err(|e| JsValue::from_str(&format!("invalid options: {e}")))?;
        if config.seed.is_none() {
            config.seed = Some(js_sys::Date::now() as u64);
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("not a canvas"))?;
        let surface = CanvasSurface::new(canvas.clone())
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?;
        surface.fit_to_display(window.device_pixel_ratio());

        let engine = GameEngine::new(
            config,
            Box::new(WebAudioSink::new()),
            Box::new(JsHost::from_object(&callbacks)),
        );
        log::info!("Arcade initialized on #{}", canvas_id);

        Ok(Self {
            runtime: Rc::new(RefCell::new(Runtime {
                engine,
                surface,
                last_time: 0.0,
            })),
            shared: Rc::new(Shared::default()),
            canvas,
            frame: Rc::new(RefCell::new(None)),
            listeners: Vec::new(),
        })
    }

    /// Attach listeners and start the animation-frame loop
    pub fn start(&mut self) {
        let closed = self
            .runtime
            .try_borrow()
            .map(|rt| rt.engine.is_closed())
            .unwrap_or(true);
        if closed || self.shared.raf_id.get().is_some() {
            return;
        }
        self.shared.stopped.set(false);
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.last_time = 0.0;
        }
        if self.listeners.is_empty() {
            self.attach_listeners();
        }
        self.schedule_loop();
        log::info!("Arcade running");
    }

    /// Cancel the frame loop, remove listeners, close audio, fire `onClose`
    pub fn stop(&mut self) {
        self.shared.stopped.set(true);
        if let Some(id) = self.shared.raf_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.engine.close();
        }
    }

    pub fn key_down(&self, code: &str) {
        self.input(InputEvent::KeyDown(code.to_string()));
    }

    /// Canvas pixel coordinates
    pub fn pointer_down(&self, x: f32, y: f32) {
        self.input(InputEvent::PointerDown { x, y });
    }

    /// `direction` is "up" | "down" | "left" | "right"
    pub fn swipe(&self, direction: &str, magnitude: f32) {
        let direction = match direction.to_lowercase().as_str() {
            "up" => SwipeDirection::Up,
            "down" => SwipeDirection::Down,
            "left" => SwipeDirection::Left,
            "right" => SwipeDirection::Right,
            other => {
                log::warn!("Unknown swipe direction '{}'", other);
                return;
            }
        };
        self.input(InputEvent::Swipe {
            direction,
            magnitude,
        });
    }

    /// Restart button: new run from game over, otherwise back to the start screen
    pub fn restart(&self) {
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            if rt.engine.state().phase == GamePhase::GameOver {
                rt.engine.apply(Action::Restart);
            } else {
                rt.engine.reset();
            }
        }
    }

    /// Explicit backing-store size; applied at the start of the next frame
    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width.max(1));
        self.canvas.set_height(height.max(1));
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.engine.resize(width as f32, height as f32);
        }
    }

    pub fn set_muted(&self, muted: bool) {
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.engine.set_muted(muted);
        }
    }

    pub fn set_autopilot(&self, enabled: bool) {
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.engine.set_autopilot(enabled);
        }
    }

    pub fn score(&self) -> f64 {
        self.runtime
            .try_borrow()
            .map(|rt| rt.engine.state().score as f64)
            .unwrap_or(0.0)
    }

    pub fn best(&self) -> f64 {
        self.runtime
            .try_borrow()
            .map(|rt| rt.engine.scores().best() as f64)
            .unwrap_or(0.0)
    }

    pub fn hud_json(&self) -> String {
        self.runtime
            .try_borrow()
            .ok()
            .and_then(|rt| serde_json::to_string(&rt.engine.hud()).ok())
            .unwrap_or_default()
    }
}

impl ArcadeHandle {
    fn input(&self, event: InputEvent) {
        if self.shared.stopped.get() {
            return;
        }
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.engine.handle_input(&event);
        }
    }

    fn schedule_loop(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let runtime = self.runtime.clone();
        let shared = self.shared.clone();
        let frame = self.frame.clone();
        let raf_window = window.clone();

        let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            let closed = runtime
                .try_borrow()
                .map(|rt| rt.engine.is_closed())
                .unwrap_or(false);
            if shared.stopped.get() || closed {
                shared.raf_id.set(None);
                return;
            }
            // Queue the next frame before doing any work so a failing
            // frame body can never break the chain
            if let Some(cb) = frame.borrow().as_ref() {
                let id = raf_window
                    .request_animation_frame(cb.as_ref().unchecked_ref())
                    .ok();
                shared.raf_id.set(id);
            }
            if let Ok(mut rt) = runtime.try_borrow_mut() {
                rt.frame(time, &shared);
            }
        });

        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        self.shared.raf_id.set(id);
        *self.frame.borrow_mut() = Some(closure);
    }

    fn attach_listeners(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let canvas_target = self.canvas.clone();

        // Keyboard
        {
            let runtime = self.runtime.clone();
            let shared = self.shared.clone();
            let listener = Listener::attach(document.as_ref(), "keydown", move |event: Event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if shared.stopped.get() {
                    return;
                }
                let code = event.code();
                if is_game_key(&code) {
                    event.prevent_default();
                }
                if let Ok(mut rt) = runtime.try_borrow_mut() {
                    rt.engine.handle_input(&InputEvent::KeyDown(code));
                }
            });
            self.listeners.extend(listener);
        }

        // Mouse/pen taps (touch goes through the swipe detector below)
        {
            let runtime = self.runtime.clone();
            let shared = self.shared.clone();
            let canvas = self.canvas.clone();
            let listener = Listener::attach(&canvas_target, "pointerdown", move |event: Event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                if shared.stopped.get() || event.pointer_type() == "touch" {
                    return;
                }
                let (x, y) = canvas_point(&canvas, event.client_x(), event.client_y());
                if let Ok(mut rt) = runtime.try_borrow_mut() {
                    rt.engine.handle_input(&InputEvent::PointerDown { x, y });
                }
            });
            self.listeners.extend(listener);
        }

        // Touch start/end pairs become swipes or taps
        {
            let shared = self.shared.clone();
            let canvas = self.canvas.clone();
            let listener = Listener::attach(&canvas_target, "touchstart", move |event: Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let point = canvas_point(&canvas, touch.client_x(), touch.client_y());
                    shared.touch_start.set(Some(point));
                }
            });
            self.listeners.extend(listener);
        }
        {
            let runtime = self.runtime.clone();
            let shared = self.shared.clone();
            let canvas = self.canvas.clone();
            let listener = Listener::attach(&canvas_target, "touchend", move |event: Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                let Some(start) = shared.touch_start.take() else {
                    return;
                };
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                if shared.stopped.get() {
                    return;
                }
                let end = canvas_point(&canvas, touch.client_x(), touch.client_y());
                if let Ok(mut rt) = runtime.try_borrow_mut() {
                    rt.engine.handle_input(&InputEvent::from_touch(start, end));
                }
            });
            self.listeners.extend(listener);
        }

        // Window resize: flag it, the next frame recomputes the layout
        {
            let shared = self.shared.clone();
            let listener = Listener::attach(window.as_ref(), "resize", move |_event: Event| {
                shared.resize_pending.set(true);
            });
            self.listeners.extend(listener);
        }

        log::info!("Attached {} input listeners", self.listeners.len());
    }
}

impl Drop for ArcadeHandle {
    fn drop(&mut self) {
        self.stop();
        // Break the frame closure's reference to itself
        self.frame.borrow_mut().take();
    }
}
