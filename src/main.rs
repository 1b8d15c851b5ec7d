//! Poem Arcade entry point
//!
//! Handles platform-specific initialization: DOM wiring and the frame loop
//! on the web, a headless autopilot run natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, DragEvent, Element, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent,
    };

    use poem_arcade::consts::{FIELD_HEIGHT, FIELD_WIDTH};
    use poem_arcade::renderer::{RenderState, runner_scene};
    use poem_arcade::{Arcade, ArcadeEvent, GameKind, SessionId, Settings, ui};

    const MODAL_ID: &str = "game-modal";
    const GAME_AREA_ID: &str = "game-area";

    #[derive(Debug, thiserror::Error)]
    enum RendererInitError {
        #[error("no surface: {0}")]
        Surface(#[from] wgpu::CreateSurfaceError),
        #[error("no adapter: {0}")]
        Adapter(#[from] wgpu::RequestAdapterError),
        #[error("no device: {0}")]
        Device(#[from] wgpu::RequestDeviceError),
    }

    /// Page-wide state shared by every callback
    struct Game {
        arcade: Arcade,
        settings: Settings,
        /// Renderer of the runner session that created it
        render: Option<(SessionId, RenderState)>,
        frame_loop_running: bool,
        /// Due time the outstanding `setTimeout` was aimed at
        timer_due: Option<f64>,
        /// Puzzle line being dragged
        drag_from: Option<usize>,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            Self {
                arcade: Arcade::new(settings.runner),
                settings,
                render: None,
                frame_loop_running: false,
                timer_due: None,
                drag_from: None,
            }
        }

        /// Draw the current runner frame, if a renderer is ready
        fn render(&mut self) {
            let Some(runner) = self.arcade.runner() else {
                return;
            };
            let Some((_, render_state)) = self.render.as_mut() else {
                return;
            };

            match render_state.render(&runner_scene(runner)) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    /// Milliseconds on the same clock as `requestAnimationFrame`
    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn set_style(el: &Element, property: &str, value: &str) {
        if let Some(el) = el.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(property, value);
        }
    }

    /// Element an event landed on, if it is one
    fn target_element(event: &web_sys::Event) -> Option<Element> {
        event.target()?.dyn_into::<Element>().ok()
    }

    /// `data-index` of the closest ancestor matching `selector`
    fn data_index(target: &Element, selector: &str) -> Option<usize> {
        target
            .closest(selector)
            .ok()
            .flatten()?
            .get_attribute("data-index")?
            .parse()
            .ok()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Poem Arcade starting...");

        let Some(document) = document() else {
            log::error!("No document");
            return;
        };

        let game = Rc::new(RefCell::new(Game::new(Settings::load())));

        setup_launch_buttons(&document, game.clone());
        setup_modal_dismissal(&document, game.clone());
        setup_game_area(&document, game.clone());
        setup_keyboard(game);

        log::info!("Poem Arcade ready");
    }

    fn setup_launch_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let Ok(buttons) = document.query_selector_all("[data-game]") else {
            return;
        };

        for i in 0..buttons.length() {
            let Some(button) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(name) = button.get_attribute("data-game") else {
                continue;
            };

            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                open(&game, &name);
            });
            let _ = button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_modal_dismissal(document: &Document, game: Rc<RefCell<Game>>) {
        // Close button
        if let Some(btn) = document.query_selector(".close-btn").ok().flatten() {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                close(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click on the backdrop (the modal itself, not its content)
        if let Some(modal) = document.get_element_by_id(MODAL_ID) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if target_element(&event).is_some_and(|el| el.id() == MODAL_ID) {
                    close(&game);
                }
            });
            let _ =
                modal.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Game input is delegated from `#game-area`, so listeners survive the
    /// markup being replaced on every launch
    fn setup_game_area(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(area) = document.get_element_by_id(GAME_AREA_ID) else {
            log::warn!("No #{} element", GAME_AREA_ID);
            return;
        };

        // Clicks: runner stage, puzzle check button, memory cards
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some(target) = target_element(&event) else {
                    return;
                };
                let now = now_ms();
                {
                    let mut g = game.borrow_mut();
                    match g.arcade.kind() {
                        Some(GameKind::Runner) => {
                            if target.closest(".runner-stage").ok().flatten().is_some() {
                                g.arcade.pointer_click(now);
                            }
                        }
                        Some(GameKind::Puzzle) => {
                            if target.id() == ui::PUZZLE_CHECK_ID {
                                g.arcade.check_puzzle(now);
                            }
                        }
                        Some(GameKind::Memory) => {
                            if let Some(index) = data_index(&target, ".memory-card") {
                                g.arcade.flip_card(index, now);
                            }
                        }
                        None => {}
                    }
                }
                after_update(&game);
            });
            let _ =
                area.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Puzzle drag and drop
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                let Some(target) = target_element(&event) else {
                    return;
                };
                if let Some(from) = data_index(&target, "li") {
                    game.borrow_mut().drag_from = Some(from);
                    set_style(&target, "opacity", "0.5");
                }
            });
            let _ = area.add_event_listener_with_callback(
                "dragstart",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                if let Some(target) = target_element(&event) {
                    set_style(&target, "opacity", "1");
                }
            });
            let _ =
                area.add_event_listener_with_callback("dragend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                event.prevent_default();
            });
            let _ =
                area.add_event_listener_with_callback("dragover", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                event.prevent_default();
                let to = target_element(&event).and_then(|t| data_index(&t, "li"));
                {
                    let mut g = game.borrow_mut();
                    let from = g.drag_from.take();
                    if let (Some(from), Some(to)) = (from, to) {
                        g.arcade.move_line(from, to);
                    }
                }
                after_update(&game);
            });
            let _ = area.add_event_listener_with_callback("drop", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            {
                let mut g = game.borrow_mut();
                if g.arcade.kind() != Some(GameKind::Runner) {
                    return;
                }
                let code = event.code();
                if code == g.settings.jump_key {
                    event.prevent_default();
                    g.arcade.key_jump();
                } else if code == g.settings.autopilot_key {
                    g.arcade.toggle_autopilot();
                }
            }
            after_update(&game);
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Launch a game in the modal
    fn open(game: &Rc<RefCell<Game>>, name: &str) {
        let Some(document) = document() else {
            return;
        };
        let seed = js_sys::Date::now() as u64;

        let (id, markup) = {
            let mut g = game.borrow_mut();
            let Some(id) = g.arcade.open_game(name, seed, now_ms()) else {
                return;
            };
            g.render = None;
            g.drag_from = None;

            let markup = match g.arcade.kind() {
                Some(GameKind::Runner) => ui::runner_markup(),
                Some(GameKind::Puzzle) => {
                    g.arcade.puzzle().map(ui::puzzle_markup).unwrap_or_default()
                }
                Some(GameKind::Memory) => {
                    g.arcade.memory().map(ui::memory_markup).unwrap_or_default()
                }
                None => String::new(),
            };
            (id, markup)
        };
        log::info!("Launching {} with seed {}", name, seed);

        if let Some(modal) = document.get_element_by_id(MODAL_ID) {
            set_style(&modal, "display", "flex");
        }
        if let Some(area) = document.get_element_by_id(GAME_AREA_ID) {
            area.set_inner_html(&markup);
        }

        if let Some(canvas) = document
            .get_element_by_id(ui::RUNNER_CANVAS_ID)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        {
            start_renderer(game.clone(), canvas, id);
        }

        after_update(game);
    }

    /// End the session and clear the modal
    fn close(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.arcade.close_game();
            g.arcade.drain_events();
            g.render = None;
            g.drag_from = None;
        }

        let Some(document) = document() else {
            return;
        };
        if let Some(modal) = document.get_element_by_id(MODAL_ID) {
            set_style(&modal, "display", "none");
        }
        if let Some(area) = document.get_element_by_id(GAME_AREA_ID) {
            area.set_inner_html("");
        }
    }

    fn start_renderer(game: Rc<RefCell<Game>>, canvas: HtmlCanvasElement, id: SessionId) {
        wasm_bindgen_futures::spawn_local(async move {
            match create_render_state(canvas).await {
                Ok(render_state) => {
                    let mut g = game.borrow_mut();
                    if g.arcade.session_id() == Some(id) {
                        g.render = Some((id, render_state));
                        g.render();
                    } else {
                        log::debug!("Dropping renderer of ended session {}", id);
                    }
                }
                Err(e) => log::error!("Runner renderer unavailable: {}", e),
            }
        });
    }

    async fn create_render_state(
        canvas: HtmlCanvasElement,
    ) -> Result<RenderState, RendererInitError> {
        // Backing store at device resolution, same field aspect
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let width = (FIELD_WIDTH as f64 * dpr) as u32;
        let height = (FIELD_HEIGHT as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        set_style(&canvas, "width", &format!("{}px", FIELD_WIDTH));
        set_style(&canvas, "height", &format!("{}px", FIELD_HEIGHT));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        Ok(RenderState::new(surface, &adapter, width, height).await?)
    }

    /// Push drained events to the DOM, then keep the frame loop and timer
    /// pump running as needed
    fn after_update(game: &Rc<RefCell<Game>>) {
        let events = game.borrow_mut().arcade.drain_events();
        if !events.is_empty() {
            apply_events(&game.borrow(), &events);
        }
        ensure_frame_loop(game);
        arm_timer(game);
    }

    fn apply_events(g: &Game, events: &[ArcadeEvent]) {
        let Some(document) = document() else {
            return;
        };

        for event in events {
            match event {
                ArcadeEvent::ScoreChanged { score } => {
                    if let Some(el) = document.get_element_by_id(ui::RUNNER_SCORE_ID) {
                        el.set_text_content(Some(&score.to_string()));
                    }
                }
                ArcadeEvent::RunnerOver { .. } => {
                    if let Some(el) = document.get_element_by_id(ui::RUNNER_OVER_ID) {
                        let _ = el.remove_attribute("hidden");
                    }
                }
                ArcadeEvent::RunnerRestarted => {
                    if let Some(el) = document.get_element_by_id(ui::RUNNER_OVER_ID) {
                        let _ = el.set_attribute("hidden", "");
                    }
                }
                ArcadeEvent::PuzzleChecked { outcome } => {
                    if let Some(el) = document.get_element_by_id(ui::PUZZLE_FEEDBACK_ID) {
                        let feedback = ui::puzzle_feedback(*outcome);
                        el.set_text_content(Some(feedback.text));
                        set_style(&el, "color", feedback.color);
                    }
                }
                ArcadeEvent::PuzzleLinesChanged => {
                    if let (Some(el), Some(puzzle)) = (
                        document.get_element_by_id(ui::PUZZLE_LIST_ID),
                        g.arcade.puzzle(),
                    ) {
                        el.set_inner_html(&ui::puzzle_lines_markup(puzzle.lines()));
                    }
                }
                ArcadeEvent::PuzzleLevelChanged { .. } => {
                    if let (Some(area), Some(puzzle)) = (
                        document.get_element_by_id(GAME_AREA_ID),
                        g.arcade.puzzle(),
                    ) {
                        area.set_inner_html(&ui::puzzle_markup(puzzle));
                    }
                }
                ArcadeEvent::CardRevealed { index } => refresh_card(&document, g, *index),
                ArcadeEvent::CardsMatched { cards, pairs } => {
                    for &index in cards {
                        refresh_card(&document, g, index);
                    }
                    if let (Some(el), Some(memory)) = (
                        document.get_element_by_id(ui::MEMORY_STATS_ID),
                        g.arcade.memory(),
                    ) {
                        el.set_text_content(Some(&ui::memory_stats(*pairs, memory.total_pairs())));
                    }
                }
                ArcadeEvent::CardsHidden { indices } => {
                    for &index in indices {
                        refresh_card(&document, g, index);
                    }
                }
                ArcadeEvent::MemoryCompleted => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(ui::MEMORY_COMPLETE_TEXT);
                    }
                }
            }
        }
    }

    fn refresh_card(document: &Document, g: &Game, index: usize) {
        let Some(memory) = g.arcade.memory() else {
            return;
        };
        let Some(card) = memory.cards().get(index) else {
            return;
        };
        let selector = format!("#{} [data-index=\"{}\"]", ui::MEMORY_GRID_ID, index);
        if let Some(el) = document.query_selector(&selector).ok().flatten() {
            let _ = el.set_attribute("class", ui::memory_card_class(card.face));
            el.set_text_content(Some(ui::memory_card_label(memory, index)));
        }
    }

    fn ensure_frame_loop(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.frame_loop_running || !g.arcade.wants_frames() {
                return;
            }
            g.frame_loop_running = true;
        }
        request_animation_frame(game.clone());
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
            g.arcade.frame(time);
            g.render();
        }
        after_update(&game);

        // The loop ends with the run (or the session) and is restarted by
        // the click that resets the runner
        let keep_running = game.borrow().arcade.wants_frames();
        if keep_running {
            request_animation_frame(game);
        } else {
            game.borrow_mut().frame_loop_running = false;
        }
    }

    /// Aim one `setTimeout` at the earliest scheduled task
    fn arm_timer(game: &Rc<RefCell<Game>>) {
        let due = {
            let mut g = game.borrow_mut();
            let Some(due) = g.arcade.next_timer_due() else {
                return;
            };
            if g.timer_due.is_some_and(|armed| armed <= due) {
                return;
            }
            g.timer_due = Some(due);
            due
        };

        let Some(window) = web_sys::window() else {
            return;
        };
        let delay = (due - now_ms()).max(0.0).ceil() as i32;
        let game = game.clone();
        let closure = Closure::once(move || on_timer(game));
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay,
        );
        closure.forget();
    }

    fn on_timer(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.timer_due = None;
            g.arcade.fire_timers(now_ms());
        }
        after_update(&game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Poem Arcade (native) starting...");
    log::info!("The games need a browser - run with `trunk serve` for the web version");

    demo_runner();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot run through the same session code the page uses
#[cfg(not(target_arch = "wasm32"))]
fn demo_runner() {
    use poem_arcade::consts::TICK_MS;
    use poem_arcade::{Arcade, ArcadeEvent, Settings};

    /// One simulated minute
    const DEMO_FRAMES: u32 = 60 * 60;

    let settings = Settings::load();
    let mut arcade = Arcade::new(settings.runner);
    let seed = 0x5eed;
    if arcade.open_game("runner", seed, 0.0).is_none() {
        log::error!("Runner unavailable");
        return;
    }
    arcade.toggle_autopilot();

    let mut now = 0.0;
    let mut cleared = 0;
    for _ in 0..DEMO_FRAMES {
        arcade.frame(now);
        cleared += arcade
            .drain_events()
            .iter()
            .filter(|e| matches!(e, ArcadeEvent::ScoreChanged { score } if *score > 0))
            .count();
        if !arcade.wants_frames() {
            break;
        }
        now += TICK_MS;
    }

    if let Some(runner) = arcade.runner() {
        println!(
            "\nSeed {:#x}: {} obstacles cleared, score {}, speed {:.1}, {}",
            seed,
            cleared,
            runner.score,
            runner.speed,
            if runner.is_active() {
                "still running"
            } else {
                "water spilled"
            }
        );
    }
    arcade.close_game();
}
