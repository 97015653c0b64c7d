//! Focus Flow entry point
//!
//! Web: wires the session to `requestAnimationFrame`, the keyboard, a 2D
//! canvas and the DOM HUD. Native: plays every level headlessly with the
//! assist policy and logs the results.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

    use focus_flow::consts::SCORE_ENDPOINT;
    use focus_flow::persistence::web::LocalStorage;
    use focus_flow::persistence::{MemoryStorage, Storage};
    use focus_flow::platform::web::RafScheduler;
    use focus_flow::report::web::HttpScoreSink;
    use focus_flow::sim::{AttentionSignal, EntityKind, Outcome};
    use focus_flow::snapshot::Layout;
    use focus_flow::{LaneCommand, LevelTable, Phase, Session, Tuning};

    /// Guest user id until the host page logs someone in
    const GUEST_USER_ID: u32 = 0;

    thread_local! {
        static GAME: RefCell<Weak<RefCell<Game>>> = RefCell::new(Weak::new());
    }

    /// Game instance: the session plus its browser surfaces
    struct Game {
        session: Session<RafScheduler>,
        ctx: Option<CanvasRenderingContext2d>,
        layout: Layout,
        document: Document,
    }

    impl Game {
        fn frame(&mut self, timestamp: f64) {
            self.session.on_frame(timestamp);
            self.redraw();
        }

        fn redraw(&self) {
            self.render();
            self.update_hud();
        }

        /// Draw the latest snapshot
        fn render(&self) {
            let Some(ctx) = &self.ctx else {
                return;
            };
            let size = self.layout.size;
            ctx.set_fill_style_str("#0b1020");
            ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);

            // Lane dividers
            ctx.set_fill_style_str("#1f2a44");
            let lane_w = self.layout.lane_width() as f64;
            for i in 1..focus_flow::consts::LANE_COUNT {
                ctx.fill_rect(lane_w * i as f64 - 1.0, 0.0, 2.0, size.y as f64);
            }

            let Some(snapshot) = self.session.snapshot() else {
                return;
            };
            let radius = (lane_w * 0.3).min(28.0);

            for entity in &snapshot.entities {
                let center = self.layout.entity_center(entity);
                match entity.kind {
                    EntityKind::Obstacle => {
                        ctx.set_fill_style_str("#ef4444");
                        ctx.fill_rect(
                            center.x as f64 - radius,
                            center.y as f64 - radius,
                            radius * 2.0,
                            radius * 2.0,
                        );
                    }
                    EntityKind::Collectible => {
                        ctx.set_fill_style_str("#facc15");
                        fill_circle(ctx, center.x as f64, center.y as f64, radius * 0.7);
                    }
                }
            }

            let player = self
                .layout
                .player_center(snapshot.player_lane, self.session.tuning());
            ctx.set_fill_style_str(if snapshot.outcome == Outcome::Failed {
                "#64748b"
            } else {
                "#38bdf8"
            });
            fill_circle(ctx, player.x as f64, player.y as f64, radius);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let doc = &self.document;
            let phase = self.session.phase();

            if let Some(snapshot) = self.session.snapshot() {
                set_text(doc, "#hud-score .hud-value", &snapshot.score.to_string());
                set_text(doc, "#hud-streak .hud-value", &format!("{}%", snapshot.streak));
                set_text(doc, "#hud-time .hud-value", &format!("{}s", snapshot.time_left_secs));
                set_text(doc, "#hud-level .hud-value", &snapshot.level.to_string());
            }

            let settings = self.session.settings();
            set_text(
                doc,
                "#hud-assist .hud-value",
                if settings.assist_mode { "ON" } else { "OFF" },
            );
            set_text(
                doc,
                "#hud-attention .hud-value",
                &format!("{:?}", self.session.attention()),
            );

            show(doc, "level-select", phase == Phase::LevelSelect);
            show(doc, "intro", matches!(phase, Phase::Intro { .. }));
            show(doc, "game-over", matches!(phase, Phase::GameOver { .. }));
            show(doc, "hud", matches!(phase, Phase::Playing { .. } | Phase::GameOver { .. }));

            match phase {
                Phase::LevelSelect => {
                    let lines: Vec<String> = self
                        .session
                        .levels()
                        .levels
                        .iter()
                        .map(|level| {
                            let lock = if self.session.progress().is_unlocked(level.id) {
                                ""
                            } else {
                                " (locked)"
                            };
                            let best = self
                                .session
                                .high_scores()
                                .best_for_level(level.id)
                                .map(|s| format!(" best {}", s))
                                .unwrap_or_default();
                            format!("{}. {}{}{}", level.id, level.name, lock, best)
                        })
                        .collect();
                    set_text(doc, "#level-list", &lines.join("\n"));
                }
                Phase::Intro { level } => {
                    if let Some(config) = self.session.levels().get(level) {
                        set_text(doc, "#intro-title", &config.name);
                        set_text(doc, "#intro-description", &config.description);
                    }
                }
                Phase::GameOver { outcome, .. } => {
                    let title = match outcome {
                        Outcome::Completed => "Level complete!",
                        _ => "Crashed!",
                    };
                    set_text(doc, "#game-over-title", title);
                    if let Some(snapshot) = self.session.snapshot() {
                        set_text(doc, "#final-score", &snapshot.score.to_string());
                    }
                }
                Phase::Playing { .. } => {}
            }
        }

        fn on_key(&mut self, key: &str) {
            let session = &mut self.session;
            match key {
                "ArrowLeft" => {
                    session.input(LaneCommand::Left);
                }
                "ArrowRight" => {
                    session.input(LaneCommand::Right);
                }
                "1" | "2" | "3" | "4" | "5" => {
                    if let Ok(id) = key.parse::<u32>() {
                        session.select_level(id);
                    }
                }
                "Enter" => match session.phase() {
                    Phase::Intro { .. } => {
                        session.start(js_sys::Date::now() as u64);
                    }
                    Phase::GameOver { .. } => {
                        session.acknowledge();
                    }
                    _ => {}
                },
                "Escape" => session.exit(),
                "a" | "A" => {
                    let enabled = !session.settings().assist_mode;
                    session.set_assist_mode(enabled);
                    log::info!("Assist mode: {}", enabled);
                }
                "c" | "C" => {
                    let enabled = !session.settings().camera_enabled;
                    session.set_camera_enabled(enabled);
                    log::info!("Camera attention: {}", enabled);
                }
                _ => return,
            }
            self.redraw();
        }
    }

    fn fill_circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) {
        ctx.begin_path();
        if ctx.arc(x, y, r, 0.0, TAU).is_ok() {
            ctx.fill();
        }
    }

    fn set_text(doc: &Document, selector: &str, text: &str) {
        if let Some(el) = doc.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn show(doc: &Document, id: &str, visible: bool) {
        if let Some(el) = doc.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Entry for the page's attention classifier ("focused", "distracted",
    /// "away", "unknown")
    #[wasm_bindgen]
    pub fn set_attention(signal: &str) {
        let Ok(signal) = signal.parse::<AttentionSignal>() else {
            log::warn!("Unknown attention signal: {}", signal);
            return;
        };
        if let Some(game) = GAME.with(|g| g.borrow().upgrade()) {
            game.borrow_mut().session.set_attention(signal);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger: {}", e).into());
        }

        log::info!("Focus Flow starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx = canvas
            .get_context("2d")?
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
        if ctx.is_none() {
            log::error!("2D canvas context unavailable");
        }

        let tuning = Tuning::default();
        let layout = Layout::new(width as f32, height as f32, &tuning);
        let storage: Box<dyn Storage> = match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => {
                log::warn!("LocalStorage unavailable, progress will not persist");
                Box::new(MemoryStorage::new())
            }
        };

        let scheduler = RafScheduler::new(|timestamp: f64| {
            if let Some(game) = GAME.with(|g| g.borrow().upgrade()) {
                game.borrow_mut().frame(timestamp);
            }
        });
        let session = Session::new(
            LevelTable::default(),
            tuning,
            scheduler,
            storage,
            Box::new(HttpScoreSink::new(SCORE_ENDPOINT, GUEST_USER_ID)),
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let game = Rc::new(RefCell::new(Game {
            session,
            ctx,
            layout,
            document,
        }));
        GAME.with(|g| *g.borrow_mut() = Rc::downgrade(&game));

        setup_keyboard(game.clone())?;
        setup_auto_exit(game.clone())?;

        game.borrow().redraw();
        log::info!("Focus Flow running!");

        // Handlers and the scheduler only hold weak references
        std::mem::forget(game);
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let weak = Rc::downgrade(&game);
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(game) = weak.upgrade() {
                game.borrow_mut().on_key(&event.key());
            }
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Leaving the tab abandons the round rather than letting it run unseen
    fn setup_auto_exit(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        {
            let weak = Rc::downgrade(&game);
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() != web_sys::VisibilityState::Hidden {
                    return;
                }
                if let Some(game) = weak.upgrade() {
                    let mut g = game.borrow_mut();
                    if matches!(g.session.phase(), Phase::Playing { .. }) {
                        g.session.exit();
                        g.redraw();
                        log::info!("Round abandoned (tab hidden)");
                    }
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        {
            let weak = Rc::downgrade(&game);
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if let Some(game) = weak.upgrade() {
                    let mut g = game.borrow_mut();
                    if matches!(g.session.phase(), Phase::Playing { .. }) {
                        g.session.exit();
                        g.redraw();
                        log::info!("Round abandoned (window blur)");
                    }
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Focus Flow (native) starting...");

    let mut args = std::env::args().skip(1);
    let levels = match args.next() {
        Some(path) => focus_flow::LevelTable::from_file(&path),
        None => Ok(focus_flow::LevelTable::default()),
    };
    let tuning = match args.next() {
        Some(path) => focus_flow::Tuning::from_file(&path),
        None => Ok(focus_flow::Tuning::default()),
    };

    let save_dir = args.next();

    match (levels, tuning) {
        (Ok(levels), Ok(tuning)) => headless::run(levels, tuning, save_dir),
        (Err(e), _) | (_, Err(e)) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use focus_flow::persistence::{FileStorage, MemoryStorage, Storage};
    use focus_flow::platform::ManualScheduler;
    use focus_flow::report::LogSink;
    use focus_flow::sim::AttentionSignal;
    use focus_flow::{LevelTable, Phase, Session, Tuning};

    /// ~60 Hz host frames
    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Play every level in order with the assist policy steering. Progress
    /// persists in `save_dir` when given.
    pub fn run(levels: LevelTable, tuning: Tuning, save_dir: Option<String>) {
        let storage: Box<dyn Storage> = match save_dir.map(FileStorage::new) {
            Some(Ok(storage)) => Box::new(storage),
            Some(Err(e)) => {
                log::warn!("Save directory unusable, progress will not persist: {}", e);
                Box::new(MemoryStorage::new())
            }
            None => Box::new(MemoryStorage::new()),
        };

        let ids: Vec<u32> = levels.levels.iter().map(|l| l.id).collect();
        let mut session = match Session::new(
            levels,
            tuning,
            ManualScheduler::new(),
            storage,
            Box::new(LogSink),
        ) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Invalid configuration: {}", e);
                return;
            }
        };
        session.set_assist_mode(true);
        session.set_camera_enabled(true);
        session.set_attention(AttentionSignal::Focused);

        for id in ids {
            if !session.select_level(id) {
                log::warn!("Level {} is still locked, stopping", id);
                break;
            }
            session.start(0x5EED ^ id as u64);

            let mut now = 0.0;
            while session.scheduler_mut().take_pending().is_some() {
                now += FRAME_MS;
                session.on_frame(now);
            }

            if let Phase::GameOver { outcome, .. } = session.phase() {
                log::info!("Level {}: {}", id, outcome.as_str());
            }
            session.acknowledge();
            if session.phase() != Phase::LevelSelect {
                session.exit();
            }
        }

        log::info!(
            "Headless run finished: {} level(s) unlocked, top score {}",
            session.progress().highest_unlocked,
            session.high_scores().top_score().unwrap_or(0)
        );
    }
}
