//! Galton Board entry point
//!
//! In the browser this wires the setup form and the WebGPU canvas to the
//! simulation and runs one tick per animation frame. Natively it plays a
//! single round headless and prints the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlButtonElement, HtmlCanvasElement, HtmlInputElement, HtmlOptionElement,
        HtmlSelectElement,
    };

    use galton_board::BoardConfig;
    use galton_board::input::{FormRow, parse_form};
    use galton_board::renderer::{RenderState, build_scene};
    use galton_board::sim::{GameEvent, GamePhase, GameState, PayoutSign, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        input: TickInput,
    }

    impl Game {
        fn new(config: BoardConfig, seed: u64) -> Self {
            Self {
                state: GameState::new(config, seed),
                render_state: None,
                input: TickInput::default(),
            }
        }

        /// Run one simulation tick, consuming the one-shot inputs
        fn update(&mut self) -> Vec<GameEvent> {
            let input = std::mem::take(&mut self.input);
            tick(&mut self.state, &input)
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = build_scene(&self.state);
                match render_state.render(&vertices) {
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

        /// Mirror score and phase into the DOM
        fn update_hud(&self, document: &Document) {
            let phase = self.state.phase;

            if let Some(el) = document.get_element_by_id("scoreValue") {
                el.set_text_content(Some(&self.state.score.to_string()));
            }
            set_hidden(document, "setup", phase != GamePhase::Setup);
            set_hidden(document, "score", phase == GamePhase::Setup);
            set_hidden(document, "resetBtn", !self.state.is_game_over());
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("no document")
    }

    /// Read the three (column, quantity) rows of the setup form
    fn read_form(document: &Document) -> Vec<FormRow> {
        let (Ok(cols), Ok(qtys)) = (
            document.query_selector_all(".colSel"),
            document.query_selector_all(".qtyInp"),
        ) else {
            return Vec::new();
        };

        (0..cols.length().min(qtys.length()))
            .filter_map(|i| {
                let col = cols.get(i)?.dyn_into::<HtmlSelectElement>().ok()?;
                let qty = qtys.get(i)?.dyn_into::<HtmlInputElement>().ok()?;
                Some(FormRow::new(col.value(), qty.value()))
            })
            .collect()
    }

    /// Re-stage allocations from the form and update the start button
    fn validate(game: &Rc<RefCell<Game>>) {
        let document = document();
        let rows = read_form(&document);
        let summary = game
            .borrow_mut()
            .state
            .stage_allocations(&parse_form(&rows));

        if let Some(el) = document.get_element_by_id("remaining") {
            el.set_text_content(Some(&format!("Remaining: {}", summary.remaining)));
        }
        if let Some(btn) = document
            .get_element_by_id("startBtn")
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        {
            btn.set_disabled(!summary.can_start());
        }
    }

    /// Clear quantities and select column 0 in every row
    fn reset_form(document: &Document) {
        if let Ok(qtys) = document.query_selector_all(".qtyInp") {
            for i in 0..qtys.length() {
                if let Some(inp) = qtys.get(i).and_then(|n| n.dyn_into::<HtmlInputElement>().ok()) {
                    inp.set_value("0");
                }
            }
        }
        if let Ok(cols) = document.query_selector_all(".colSel") {
            for i in 0..cols.length() {
                if let Some(sel) = cols.get(i).and_then(|n| n.dyn_into::<HtmlSelectElement>().ok()) {
                    sel.set_selected_index(0);
                }
            }
        }
    }

    fn payout_class(sign: PayoutSign) -> &'static str {
        match sign {
            PayoutSign::Positive => "payout-positive",
            PayoutSign::Negative => "payout-negative",
            PayoutSign::Neutral => "payout-neutral",
        }
    }

    /// Fill column selectors and the payout labels under the slots
    fn populate_slots(document: &Document, state: &GameState) -> Result<(), JsValue> {
        let cols = document.query_selector_all(".colSel")?;
        for i in 0..cols.length() {
            let Some(sel) = cols.get(i).and_then(|n| n.dyn_into::<HtmlSelectElement>().ok())
            else {
                continue;
            };
            sel.set_inner_html("");
            for slot in state.slots.iter() {
                let opt: HtmlOptionElement = document.create_element("option")?.dyn_into()?;
                opt.set_value(&slot.index.to_string());
                opt.set_text(&format!("{} ({})", slot.index, slot.payout));
                sel.append_child(&opt)?;
            }
        }

        if let Some(labels) = document.get_element_by_id("slot-labels") {
            labels.set_inner_html("");
            for slot in state.slots.iter() {
                let span = document.create_element("span")?;
                span.set_attribute("class", payout_class(slot.sign()))?;
                span.set_attribute("style", &state.config.slot_label_style())?;
                span.set_text_content(Some(&slot.payout.to_string()));
                labels.append_child(&span)?;
            }
        }
        Ok(())
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Galton Board starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let config = BoardConfig::load();
        let (board_w, board_h) = (config.width(), config.height);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        // Canvas matches the board in CSS pixels, backing store scaled by DPR
        let dpr = window.device_pixel_ratio();
        let width = (board_w as f64 * dpr) as u32;
        let height = (board_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        canvas.set_attribute(
            "style",
            &format!("width: {}px; height: {}px;", board_w, board_h),
        )?;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(config, seed)));
        log::info!("Board initialized with seed: {}", seed);

        populate_slots(&document, &game.borrow().state)?;

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to get adapter: {e}")))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, (board_w, board_h))
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to create device: {e}")))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_form_handlers(&document, game.clone())?;
        validate(&game);

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        request_animation_frame(game);

        log::info!("Galton Board running!");
        Ok(())
    }

    fn setup_form_handlers(doc: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Column selectors and quantity inputs re-validate on every change
        for (selector, event) in [(".colSel", "change"), (".qtyInp", "input")] {
            let nodes = doc.query_selector_all(selector)?;
            for i in 0..nodes.length() {
                let Some(node) = nodes.get(i) else { continue };
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    validate(&game);
                });
                node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
        }

        // Start: re-validate, then let the next tick apply it
        if let Some(btn) = doc.get_element_by_id("startBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                validate(&game);
                game.borrow_mut().input.start = true;
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Reset is applied immediately so the form can be re-staged right away
        if let Some(btn) = doc.get_element_by_id("resetBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().state.reset();
                reset_form(&document());
                validate(&game);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let document = document();
            let mut g = game.borrow_mut();

            for event in g.update() {
                match event {
                    GameEvent::StartRejected(e) => {
                        if let Some(el) = document.get_element_by_id("remaining") {
                            el.set_text_content(Some(&e.to_string()));
                        }
                    }
                    GameEvent::BallLanded { id, slot, payout } => {
                        log::debug!("Ball {} -> slot {} ({:+})", id, slot, payout);
                    }
                    _ => {}
                }
            }

            g.render();
            g.update_hud(&document);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    let result = wasm_game::run().await;
    if let Err(ref e) = result {
        log::error!("Startup failed: {:?}", e);
    }
    result
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;
    use std::str::FromStr;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use galton_board::BoardConfig;
    use galton_board::sim::{AllocationRequest, GamePhase, GameState, RoundSummary, run_to_completion};

    /// Play one Galton board round headless and report where the balls landed.
    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    struct Cli {
        /// RNG seed (defaults to the current time)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Board configuration JSON; missing fields use defaults
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Give up after this many frames
        #[arg(long, value_name = "FRAMES", default_value_t = 100_000)]
        max_ticks: u64,
        /// Balls to drop, as COLUMN:QUANTITY (at most three)
        #[arg(value_name = "COL:QTY", required = true, num_args = 1..=3)]
        drops: Vec<DropArg>,
    }

    /// A `COLUMN:QUANTITY` command-line argument
    #[derive(Clone, Copy, Debug)]
    struct DropArg {
        column: u32,
        quantity: u32,
    }

    impl FromStr for DropArg {
        type Err = String;

        fn from_str(value: &str) -> Result<Self, Self::Err> {
            let (column, quantity) = value
                .split_once(':')
                .ok_or_else(|| format!("expected COLUMN:QUANTITY, got `{value}`"))?;
            let column = column
                .trim()
                .parse()
                .map_err(|e| format!("invalid column `{column}`: {e}"))?;
            let quantity = quantity
                .trim()
                .parse()
                .map_err(|e| format!("invalid quantity `{quantity}`: {e}"))?;
            Ok(Self { column, quantity })
        }
    }

    impl From<DropArg> for AllocationRequest {
        fn from(arg: DropArg) -> Self {
            AllocationRequest::new(arg.column, arg.quantity)
        }
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    fn print_summary(summary: &RoundSummary) {
        println!(
            "seed {}: {} balls, score {:+} after {} frames",
            summary.seed, summary.settled, summary.score, summary.frames
        );
        println!("{:>4}  {:>6}  {:>5}", "slot", "payout", "balls");
        for tally in &summary.slots {
            println!("{:>4}  {:>6}  {:>5}", tally.slot, tally.payout, tally.balls);
        }
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let config = match &cli.config {
            Some(path) => BoardConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BoardConfig::default(),
        };

        let seed = cli.seed.unwrap_or_else(clock_seed);
        let mut state = GameState::new(config, seed);
        log::info!("Board initialized with seed: {}", seed);

        let requests: Vec<AllocationRequest> = cli.drops.iter().copied().map(Into::into).collect();
        let summary = state.stage_allocations(&requests);
        log::info!(
            "{} balls requested, {} remaining",
            summary.requested_total,
            summary.remaining
        );
        state.start().context("cannot start round")?;

        run_to_completion(&mut state, cli.max_ticks);
        if state.phase != GamePhase::Done {
            bail!(
                "round still running after {} frames ({} balls in flight)",
                cli.max_ticks,
                state.balls.len()
            );
        }

        let summary = state.summary();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_drop_arg_parse() {
            let arg: DropArg = "4:12".parse().unwrap();
            assert_eq!((arg.column, arg.quantity), (4, 12));
            assert!("4".parse::<DropArg>().is_err());
            assert!("x:1".parse::<DropArg>().is_err());
            assert!("1:-2".parse::<DropArg>().is_err());
        }

        #[test]
        fn test_cli_parses_drops() {
            let cli = Cli::try_parse_from(["galton-board", "--seed", "7", "2:5", "2:3"]).unwrap();
            assert_eq!(cli.seed, Some(7));
            assert_eq!(cli.drops.len(), 2);
            assert!(Cli::try_parse_from(["galton-board"]).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
