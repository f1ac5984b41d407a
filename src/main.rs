//! Watchout entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, PointerEvent};

    use watchout::consts::*;
    use watchout::renderer::{Scene, SdfRenderState};
    use watchout::sim::{GamePhase, GameState, TickInput, tick};
    use watchout::{GameOptions, RenderError};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        scene: Scene,
        render_state: Option<SdfRenderState>,
        accumulator: f64,
        last_time: f64,
        input: TickInput,
        /// Pointer id of the drag in progress
        drag_pointer: Option<i32>,
    }

    impl Game {
        fn new(state: GameState) -> Self {
            Self {
                scene: Scene::from_state(&state),
                state,
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                drag_pointer: None,
            }
        }

        /// Pointer offset within the canvas to play field coordinates
        fn field_pos(&self, event: &PointerEvent) -> Vec2 {
            let padding = self.state.options.padding as f32;
            Vec2::new(
                event.offset_x() as f32 - padding,
                event.offset_y() as f32 - padding,
            )
        }

        fn hits_player(&self, pos: Vec2) -> bool {
            let player = &self.state.player;
            pos.distance(player.pos) <= player.radius + player.style.stroke_width
        }

        /// Run simulation ticks
        fn update(&mut self, dt_ms: f64) {
            self.accumulator += dt_ms.min(MAX_FRAME_MS);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT_MS);
                self.accumulator -= SIM_DT_MS;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.pause = false;
                self.input.stop = false;
            }

            self.flush_events();
            self.scene.sync_positions(&self.state.enemies);
        }

        /// Apply a command right away, without advancing the clock
        fn apply_now(&mut self, input: TickInput) {
            tick(&mut self.state, &input, 0.0);
            self.flush_events();
        }

        fn flush_events(&mut self) {
            for event in self.state.drain_events() {
                self.scene.apply_event(&event, &self.state);
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.scene) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Copy the scoreboard into the page when it changed
        fn update_hud(&mut self, document: &Document) {
            if !self.scene.scoreboard_dirty {
                return;
            }
            let board = &self.scene.scoreboard;
            for (selector, text) in [
                (".current", &board.current),
                (".high", &board.best),
                (".collisions", &board.collisions),
            ] {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            }
            self.scene.scoreboard_dirty = false;
        }
    }

    /// Options from the page, falling back to defaults when absent or rejected
    fn load_options(document: &Document) -> GameOptions {
        let Some(json) = document
            .get_element_by_id("game-options")
            .and_then(|el| el.text_content())
        else {
            return GameOptions::default();
        };

        match GameOptions::from_json(&json) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("Ignoring game options: {}", e);
                GameOptions::default()
            }
        }
    }

    async fn init_renderer(
        canvas: &HtmlCanvasElement,
        options: &GameOptions,
        pixel_ratio: f32,
    ) -> Result<SdfRenderState, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        SdfRenderState::new(surface, &adapter, options, pixel_ratio).await
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Watchout starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let options = load_options(&document);

        // Set canvas size
        let dpr = window.device_pixel_ratio() as f32;
        let (css_w, css_h) = options.canvas_size();
        canvas.set_width((css_w as f32 * dpr).round() as u32);
        canvas.set_height((css_h as f32 * dpr).round() as u32);
        let _ = canvas.set_attribute(
            "style",
            &format!("width:{}px;height:{}px;touch-action:none", css_w, css_h),
        );

        let seed = js_sys::Date::now() as u64;
        let state = match GameState::new(options.clone(), seed) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Cannot start game: {}", e);
                return;
            }
        };
        let game = Rc::new(RefCell::new(Game::new(state)));

        log::info!("Game initialized with seed: {}", seed);

        match init_renderer(&canvas, &options, dpr).await {
            Ok(render_state) => {
                game.borrow_mut().render_state = Some(render_state);
            }
            Err(e) => log::error!("Renderer unavailable, running without graphics: {}", e),
        }

        // Set up input handlers
        setup_input_handlers(&canvas, game.clone());

        // Set up auto-pause on visibility change
        setup_auto_pause(game.clone());

        setup_teardown(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Watchout running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Drag only starts on the player circle
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let pos = g.field_pos(&event);
                if g.drag_pointer.is_none() && g.hits_player(pos) {
                    event.prevent_default();
                    g.drag_pointer = Some(event.pointer_id());
                    g.input.drag = Some(pos);
                    let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if g.drag_pointer == Some(event.pointer_id()) {
                    let pos = g.field_pos(&event);
                    g.input.drag = Some(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release on up or cancel
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if g.drag_pointer == Some(event.pointer_id()) {
                    g.drag_pointer = None;
                    g.input.drag = None;
                    let _ = canvas_clone.release_pointer_capture(event.pointer_id());
                }
            });
            for name in ["pointerup", "pointercancel"] {
                let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.key() == "Escape" {
                    game.borrow_mut().input.pause = true;
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                SIM_DT_MS
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }

            if g.state.phase == GamePhase::Stopped {
                log::info!("Game loop ended");
                return;
            }
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let pause_if_running = |game: &Rc<RefCell<Game>>, reason: &str| {
            let mut g = game.borrow_mut();
            if g.state.phase == GamePhase::Running {
                g.apply_now(TickInput {
                    pause: true,
                    ..Default::default()
                });
                log::info!("Auto-paused ({})", reason);
            }
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    pause_if_running(&game, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                pause_if_running(&game, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Leaving the page stops every timer and the frame loop
    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().apply_now(TickInput {
                stop: true,
                ..Default::default()
            });
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use watchout::consts::*;
    use watchout::renderer::Scene;
    use watchout::sim::{Entity, GameState, TickInput, tick};
    use watchout::{ConfigError, GameOptions};

    /// Simulated play time
    const RUN_MS: f64 = 60_000.0;
    /// Enemies closer than this make the scripted player step away
    const DANGER_RADIUS: f32 = 60.0;
    /// Scripted drag distance per step
    const DODGE_STEP: f32 = 4.0;

    /// Step away from the nearest threatening enemy, or drift back toward the centre
    fn evasive_drag(player: &Entity, enemies: &[Entity], options: &GameOptions) -> Vec2 {
        let nearest = enemies
            .iter()
            .map(|e| (e.pos, e.pos.distance(player.pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let heading = match nearest {
            Some((pos, dist)) if dist < DANGER_RADIUS => (player.pos - pos).normalize_or_zero(),
            _ => {
                let centre = Vec2::new(options.width as f32, options.height as f32) * 0.4;
                (centre - player.pos).normalize_or_zero() * 0.25
            }
        };
        player.pos + heading * DODGE_STEP
    }

    pub fn run(options_path: Option<String>, seed: u64) -> Result<(), ConfigError> {
        let options = match options_path {
            Some(path) => GameOptions::load(std::path::Path::new(&path))?,
            None => GameOptions::default(),
        };

        let mut state = GameState::new(options, seed)?;
        let mut scene = Scene::from_state(&state);
        log::info!("Headless run: {:.0}s simulated, seed {}", RUN_MS / 1000.0, seed);

        let steps = (RUN_MS / SIM_DT_MS).round() as u64;
        for _ in 0..steps {
            let input = TickInput {
                drag: Some(evasive_drag(&state.player, &state.enemies, &state.options)),
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT_MS);
            for event in state.drain_events() {
                scene.apply_event(&event, &state);
            }
            scene.sync_positions(&state.enemies);
        }

        state.stop();
        log::info!(
            "Finished after {} ticks: score {} / best {} / collisions {}",
            state.time_ticks,
            scene.scoreboard.current,
            scene.scoreboard.best,
            scene.scoreboard.collisions
        );

        match serde_json::to_string_pretty(&state.stats) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Cannot serialize stats: {}", e),
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Watchout (native) starting...");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    if let Err(e) = headless::run(std::env::args().nth(1), seed) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
