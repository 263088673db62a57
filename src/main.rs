//! Learn Numbers entry point
//!
//! wasm32: canvas game loop in the browser.
//! Native: prepares the speech clips and plays a headless demo session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use learn_numbers::Settings;
    use learn_numbers::audio::{Cue, WebAudio};
    use learn_numbers::renderer::{CanvasRenderer, build_scene};
    use learn_numbers::sim::{InputEvent, Key, RoundController, TickInput};
    use learn_numbers::speech::SpeechCache;

    /// Cap on catch-up ticks per animation frame
    const MAX_SUBSTEPS: u32 = 4;

    /// Game instance holding all state
    struct Game {
        ctrl: RoundController,
        audio: WebAudio,
        renderer: CanvasRenderer,
        input: TickInput,
        frame_time: Duration,
        accumulator: Duration,
        last_time: f64,
    }

    impl Game {
        /// Canvas CSS pixel → logical screen point
        fn to_logical(&self, canvas: &HtmlCanvasElement, x: f32, y: f32) -> Vec2 {
            let css_w = canvas.client_width().max(1) as f32;
            let px_per_css = canvas.width() as f32 / css_w;
            self.renderer.to_logical(Vec2::new(x, y) * px_per_css)
        }

        /// Run fixed-rate ticks for the elapsed time
        fn update(&mut self, elapsed: Duration) {
            self.accumulator += elapsed.min(Duration::from_millis(250));

            let mut substeps = 0;
            while self.accumulator >= self.frame_time && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                if let Err(e) = self.ctrl.tick(&input, &mut self.audio, self.frame_time) {
                    log::error!("Tick failed: {e}");
                }
                self.accumulator -= self.frame_time;
                substeps += 1;

                // Events are one-shot; idle mode persists
                self.input.events.clear();
            }

            for event in self.ctrl.drain_events() {
                log::debug!("{event:?}");
            }
        }

        fn render(&self) {
            self.renderer.paint(&build_scene(&self.ctrl));
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("Learn Numbers starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        canvas.set_width((canvas.client_width() as f64 * dpr) as u32);
        canvas.set_height((canvas.client_height() as f64 * dpr) as u32);

        let mut settings = Settings::load();
        if let Err(e) = settings.validate() {
            log::warn!("{e}; using default settings");
            settings = Settings::default();
        }
        if settings.seed.is_none() {
            settings.seed = Some(js_sys::Date::now() as u64);
        }

        let mut audio = WebAudio::new(settings.effective_sfx_volume());
        if let Err(e) = audio.preload(&Cue::all(settings.max_level)) {
            log::warn!("Spoken prompts unavailable: {e}");
        }

        let ctrl =
            RoundController::new(&settings).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let logical = Vec2::new(settings.screen_width as f32, settings.screen_height as f32);
        let renderer =
            CanvasRenderer::new(canvas.clone(), logical).map_err(|e| JsValue::from_str(&e))?;

        let game = Rc::new(RefCell::new(Game {
            ctrl,
            audio,
            renderer,
            input: TickInput::default(),
            frame_time: settings.frame_time(),
            accumulator: Duration::ZERO,
            last_time: 0.0,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_resize(canvas.clone(), game.clone());

        request_animation_frame(game);
        log::info!("Learn Numbers running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse click
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                // Browsers only allow audio after a user gesture
                g.audio.resume();
                let (x, y) = (event.offset_x() as f32, event.offset_y() as f32);
                let pos = g.to_logical(&canvas_clone, x, y);
                g.input.events.push(InputEvent::PointerDown(pos));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    g.audio.resume();
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    let pos = g.to_logical(&canvas_clone, x, y);
                    g.input.events.push(InputEvent::PointerDown(pos));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = match event.key().as_str() {
                    "Escape" => Key::Escape,
                    "Enter" => Key::Enter,
                    " " => Key::Space,
                    "i" | "I" => {
                        g.input.idle_mode = !g.input.idle_mode;
                        log::info!("Idle mode: {}", g.input.idle_mode);
                        return;
                    }
                    _ => Key::Other,
                };
                g.audio.resume();
                g.input.events.push(InputEvent::KeyPressed(key));
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            canvas.set_width((canvas.client_width() as f64 * dpr) as u32);
            canvas.set_height((canvas.client_height() as f64 * dpr) as u32);
            game.borrow_mut().renderer.resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            let elapsed = if g.last_time > 0.0 {
                Duration::from_secs_f64(((time - g.last_time) / 1000.0).max(0.0))
            } else {
                g.frame_time
            };
            g.last_time = time;
            g.update(elapsed);
            g.render();
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Learn Numbers (native) starting...");

    match demo::run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    //! Headless demo: the game plays itself against a simulated mixer

    use learn_numbers::audio::{Cue, VirtualMixer};
    use learn_numbers::sim::{GameEvent, RoundController, TickInput};
    use learn_numbers::speech::{DiskSpeechCache, SpeechCache, ToneSynth};
    use learn_numbers::{GameError, Settings};

    /// Give up if a sequence takes longer than this many simulated seconds
    const MAX_SECS_PER_SEQUENCE: u32 = 300;

    pub fn run() -> Result<(), GameError> {
        let settings = Settings::load();
        settings.validate()?;

        // Every clip must exist before play starts
        let mut cache = DiskSpeechCache::new(&settings.speech_cache_dir, ToneSynth::default())?;
        let cues = Cue::all(settings.max_level);
        let ids = cache.preload(&cues)?;
        let mut mixer = VirtualMixer::new();
        for id in ids {
            if let Some(clip) = cache.clip(&id) {
                mixer.register(id, clip.length);
            }
        }
        log::info!(
            "{} speech clips ready in {}",
            cues.len(),
            cache.dir().display()
        );

        let mut ctrl = RoundController::new(&settings)?;
        let input = TickInput {
            events: Vec::new(),
            idle_mode: true,
        };
        let dt = settings.frame_time();
        let max_ticks = settings.demo_sequences.max(1) as u64
            * MAX_SECS_PER_SEQUENCE as u64
            * settings.frame_rate as u64;

        let mut completed = 0;
        let mut ticks = 0u64;
        while completed < settings.demo_sequences && ticks < max_ticks {
            ctrl.tick(&input, &mut mixer, dt)?;
            mixer.advance(dt);
            ticks += 1;

            for event in ctrl.drain_events() {
                match event {
                    GameEvent::AnswerAccepted { value, points } => {
                        log::info!("  picked {value}: +{points}");
                    }
                    GameEvent::AnswerRejected { value } => log::info!("  picked {value}: no good"),
                    GameEvent::SequenceCompleted { score, next_level } => {
                        completed += 1;
                        log::info!(
                            "Sequence {completed} done: {score} points, next level {next_level}"
                        );
                    }
                    _ => {}
                }
            }
        }

        if completed < settings.demo_sequences {
            log::warn!("Demo stopped after {ticks} ticks with {completed} sequences");
        }
        log::info!(
            "Demo finished: {} clips played over {:.1}s",
            mixer.history().len(),
            ticks as f64 * dt.as_secs_f64()
        );
        Ok(())
    }
}
