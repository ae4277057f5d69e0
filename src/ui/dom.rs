//! DOM presentation shell
//!
//! Builds the game markup inside a host element, copies `view::Screen`
//! values into it and turns clicks/taps into controller intents.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement};

use super::view::{self, Screen};
use crate::platform::{TaskKind, mix_seed};
use crate::platform::web::{AnimationFrameTask, IntervalTask, WebHaptics};
use crate::sim::{GameController, Intent};
use crate::tuning::Tuning;

const TULIP_ID_ATTR: &str = "data-tulip-id";

/// Install the panic hook and console logger (safe to call repeatedly)
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn element(doc: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = doc.create_element(tag)?.dyn_into()?;
    el.set_class_name(class);
    Ok(el)
}

fn text_element(doc: &Document, tag: &str, class: &str, text: &str) -> Result<HtmlElement, JsValue> {
    let el = element(doc, tag, class)?;
    el.set_text_content(Some(text));
    Ok(el)
}

fn place(el: &HtmlElement, left: &str, top: &str) -> Result<(), JsValue> {
    let style = el.style();
    style.set_property("left", left)?;
    style.set_property("top", top)
}

/// Walk up from the event target to the tulip button it landed on
fn tulip_id(event: &Event) -> Option<u32> {
    let target: Element = event.target()?.dyn_into().ok()?;
    let button = target.closest(&format!("[{TULIP_ID_ATTR}]")).ok()??;
    button.get_attribute(TULIP_ID_ATTR)?.parse().ok()
}

/// An event listener that is removed on teardown
struct Listener {
    target: EventTarget,
    events: &'static [&'static str],
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        events: &'static [&'static str],
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        for event in events {
            target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        }
        Ok(Self {
            target: target.clone(),
            events,
            closure,
        })
    }

    fn detach(&self) {
        for event in self.events {
            let _ = self
                .target
                .remove_event_listener_with_callback(event, self.closure.as_ref().unchecked_ref());
        }
    }
}

/// Elements the shell updates after mount
struct Elements {
    section: HtmlElement,
    container: HtmlElement,
    start_screen: HtmlElement,
    how_to: HtmlElement,
    instructions: HtmlElement,
    start_button: HtmlElement,
    playing: HtmlElement,
    score_value: HtmlElement,
    progress_fill: HtmlElement,
    game_area: HtmlElement,
    waiting: HtmlElement,
    confetti: HtmlElement,
    invite: HtmlElement,
    invite_title: HtmlElement,
    invite_message: HtmlElement,
    play_again: HtmlElement,
}

impl Elements {
    fn build(doc: &Document, root: &Element, tuning: &Tuning) -> Result<Self, JsValue> {
        let section = element(doc, "section", "game-section")?;
        let confetti = element(doc, "div", "confetti-container")?;
        let container = element(doc, "div", "container")?;

        let header = element(doc, "div", "game-header")?;
        header.append_child(&text_element(doc, "h2", "", view::HEADING)?)?;
        header.append_child(&text_element(doc, "p", "", &view::subtitle(tuning))?)?;
        container.append_child(&header)?;

        let start_screen = element(doc, "div", "start-screen")?;
        let start_card = element(doc, "div", "start-card")?;
        start_card.append_child(&text_element(doc, "div", "game-icon", "🎮")?)?;
        let how_to = text_element(doc, "h3", "", "Cách Chơi")?;
        let instructions = element(doc, "ul", "instructions")?;
        let start_button = element(doc, "button", "btn-primary")?;
        start_button.set_attribute("type", "button")?;
        start_card.append_child(&how_to)?;
        start_card.append_child(&instructions)?;
        start_card.append_child(&start_button)?;
        start_screen.append_child(&start_card)?;
        container.append_child(&start_screen)?;

        let playing = element(doc, "div", "playing")?;
        let score_board = element(doc, "div", "score-board")?;
        let badge = element(doc, "div", "score-badge")?;
        badge.append_child(&text_element(doc, "span", "score-label", view::SCORE_LABEL)?)?;
        let score_value = element(doc, "span", "score-value")?;
        badge.append_child(&score_value)?;
        let progress_bar = element(doc, "div", "progress-bar")?;
        let progress_fill = element(doc, "div", "progress-fill")?;
        progress_bar.append_child(&progress_fill)?;
        score_board.append_child(&badge)?;
        score_board.append_child(&progress_bar)?;
        let game_area = element(doc, "div", "game-area")?;
        let waiting = text_element(doc, "div", "waiting-message", view::WAITING_MESSAGE)?;
        game_area.append_child(&waiting)?;
        playing.append_child(&score_board)?;
        playing.append_child(&game_area)?;
        container.append_child(&playing)?;

        let invite = element(doc, "div", "invite-card")?;
        let invite_title = element(doc, "h2", "")?;
        let invite_message = element(doc, "p", "")?;
        let play_again = element(doc, "button", "btn-primary")?;
        play_again.set_attribute("type", "button")?;
        invite.append_child(&invite_title)?;
        invite.append_child(&invite_message)?;
        invite.append_child(&play_again)?;

        section.append_child(&confetti)?;
        section.append_child(&container)?;
        section.append_child(&invite)?;
        root.append_child(&section)?;

        Ok(Self {
            section,
            container,
            start_screen,
            how_to,
            instructions,
            start_button,
            playing,
            score_value,
            progress_fill,
            game_area,
            waiting,
            confetti,
            invite,
            invite_title,
            invite_message,
            play_again,
        })
    }
}

/// Shared state behind every host callback
struct Shell {
    document: Document,
    controller: RefCell<GameController>,
    elements: Elements,
    already_completed: bool,
    tulips: RefCell<HashMap<u32, HtmlElement>>,
    confetti_drawn: Cell<bool>,
    last_frame_ms: Cell<Option<f64>>,
    completion_pending: Rc<Cell<bool>>,
    on_complete: Option<js_sys::Function>,
    listeners: RefCell<Vec<Listener>>,
}

impl Shell {
    fn weak_handler(
        weak: Weak<Self>,
        mut handler: impl FnMut(&Rc<Self>, Event) + 'static,
    ) -> impl FnMut(Event) + 'static {
        move |event| {
            if let Some(shell) = weak.upgrade() {
                handler(&shell, event);
            }
        }
    }

    fn bind_inputs(shell: &Rc<Self>) -> Result<(), JsValue> {
        let el = &shell.elements;
        let listeners = vec![
            Listener::attach(
                &el.start_button,
                &["click"],
                Self::weak_handler(Rc::downgrade(shell), |shell, _| shell.dispatch(Intent::Start)),
            )?,
            Listener::attach(
                &el.play_again,
                &["click"],
                Self::weak_handler(Rc::downgrade(shell), |shell, _| shell.dispatch(Intent::Reset)),
            )?,
            // Click and touchstart of one tap both land here; the second is a
            // no-op because the tulip is gone by then.
            Listener::attach(
                &el.game_area,
                &["click", "touchstart"],
                Self::weak_handler(Rc::downgrade(shell), |shell, event| {
                    if let Some(id) = tulip_id(&event) {
                        event.prevent_default();
                        event.stop_propagation();
                        shell.dispatch(Intent::Catch(id));
                    }
                }),
            )?,
        ];
        shell.listeners.borrow_mut().extend(listeners);
        Ok(())
    }

    fn dispatch(self: &Rc<Self>, intent: Intent) {
        self.controller.borrow_mut().dispatch(intent);
        if let Err(e) = self.ensure_tasks() {
            log::warn!("Failed to start game loop: {:?}", e);
        }
        self.notify_completion();
        self.render_logged();
    }

    fn notify_completion(&self) {
        if self.completion_pending.replace(false) {
            if let Some(callback) = &self.on_complete {
                if let Err(e) = callback.call0(&JsValue::NULL) {
                    log::warn!("on_complete callback threw: {:?}", e);
                }
            }
        }
    }

    /// Start the spawn timer and frame loop on entry to Playing
    fn ensure_tasks(self: &Rc<Self>) -> Result<(), JsValue> {
        if !self.controller.borrow().needs_tasks() {
            return Ok(());
        }
        self.last_frame_ms.set(None);
        let period = self.controller.borrow().tuning().spawn_interval_ms;

        let weak = Rc::downgrade(self);
        let spawn = IntervalTask::start(period, move || {
            if let Some(shell) = weak.upgrade() {
                shell.on_spawn_timer();
            }
        })?;
        let weak: Weak<Self> = Rc::downgrade(self);
        let frame = AnimationFrameTask::start(move |ts| {
            if let Some(shell) = weak.upgrade() {
                shell.on_frame(ts);
            }
        })?;

        let mut controller = self.controller.borrow_mut();
        controller.install_task(TaskKind::Spawn, Box::new(spawn));
        controller.install_task(TaskKind::Frame, Box::new(frame));
        Ok(())
    }

    fn on_spawn_timer(&self) {
        if self.controller.borrow_mut().spawn().is_some() {
            self.render_logged();
        }
    }

    fn on_frame(&self, ts: f64) {
        let elapsed = self.last_frame_ms.get().map_or(0.0, |last| ts - last);
        self.last_frame_ms.set(Some(ts));
        if self.controller.borrow_mut().tick(elapsed) {
            self.render_logged();
        }
    }

    fn render_logged(&self) {
        if let Err(e) = self.render() {
            log::warn!("Render error: {:?}", e);
        }
    }

    fn render(&self) -> Result<(), JsValue> {
        let screen = {
            let controller = self.controller.borrow();
            view::build(controller.state(), controller.tuning(), self.already_completed)
        };
        let el = &self.elements;
        let won = matches!(screen, Screen::Victory(_));
        el.container.set_hidden(won);
        el.invite.set_hidden(!won);
        el.confetti.set_hidden(!won);
        el.start_screen.set_hidden(!matches!(screen, Screen::Start(_)));
        el.playing.set_hidden(!matches!(screen, Screen::Playing(_)));

        match screen {
            Screen::Start(start) => {
                self.clear_tulips();
                self.clear_confetti();
                el.start_button.set_text_content(Some(start.button_label));
                el.instructions.set_text_content(None);
                el.how_to.set_hidden(start.instructions.is_none());
                el.instructions.set_hidden(start.instructions.is_none());
                for line in start.instructions.iter().flatten() {
                    el.instructions
                        .append_child(&text_element(&self.document, "li", "", line)?)?;
                }
            }
            Screen::Playing(playing) => {
                self.clear_confetti();
                el.score_value.set_text_content(Some(&playing.score_text));
                el.progress_fill
                    .style()
                    .set_property("width", &playing.progress_width)?;
                el.waiting.set_hidden(playing.waiting_message.is_none());
                self.sync_tulips(&playing.tulips)?;
            }
            Screen::Victory(victory) => {
                self.clear_tulips();
                if !self.confetti_drawn.replace(true) {
                    for c in &victory.confetti {
                        let piece = text_element(&self.document, "div", "confetti", c.emoji)?;
                        piece.style().set_property("position", "absolute")?;
                        place(&piece, &c.left, &c.top)?;
                        piece.style().set_property("animation-delay", &c.delay)?;
                        el.confetti.append_child(&piece)?;
                    }
                }
                el.invite_title.set_text_content(Some(victory.title));
                el.invite_message.set_text_content(Some(victory.message));
                el.play_again
                    .set_text_content(Some(victory.play_again_label));
            }
        }
        Ok(())
    }

    /// Keyed update: move known tulips, create new ones, drop the rest
    fn sync_tulips(&self, tulips: &[view::TulipView]) -> Result<(), JsValue> {
        let mut nodes = self.tulips.borrow_mut();
        let live: HashSet<u32> = tulips.iter().map(|t| t.id).collect();
        nodes.retain(|id, node| {
            let keep = live.contains(id);
            if !keep {
                node.remove();
            }
            keep
        });

        for tulip in tulips {
            let node = match nodes.get(&tulip.id) {
                Some(node) => node.clone(),
                None => {
                    let node = text_element(&self.document, "button", "tulip", view::TULIP_EMOJI)?;
                    node.set_attribute("type", "button")?;
                    node.set_attribute("aria-label", view::TULIP_ARIA_LABEL)?;
                    node.set_attribute(TULIP_ID_ATTR, &tulip.id.to_string())?;
                    node.style().set_property("position", "absolute")?;
                    self.elements.game_area.append_child(&node)?;
                    nodes.insert(tulip.id, node.clone());
                    node
                }
            };
            place(&node, &tulip.left, &tulip.top)?;
        }
        Ok(())
    }

    fn clear_tulips(&self) {
        for (_, node) in self.tulips.borrow_mut().drain() {
            node.remove();
        }
    }

    fn clear_confetti(&self) {
        if self.confetti_drawn.replace(false) {
            self.elements.confetti.set_text_content(None);
        }
    }

    fn teardown(&self) {
        self.controller.borrow_mut().teardown();
        for listener in self.listeners.borrow_mut().drain(..) {
            listener.detach();
        }
        self.clear_tulips();
        self.elements.section.remove();
    }
}

/// The mini-game mounted into a page element
#[wasm_bindgen]
pub struct TulipCatcher {
    shell: Rc<Shell>,
}

#[wasm_bindgen]
impl TulipCatcher {
    /// Mount into the element with id `root_id`.
    ///
    /// `game_completed` is the page's hint that the invite was already
    /// unlocked. `tuning_json` optionally overrides gameplay numbers.
    #[wasm_bindgen(constructor)]
    pub fn new(
        root_id: &str,
        game_completed: bool,
        on_complete: Option<js_sys::Function>,
        tuning_json: Option<String>,
    ) -> Result<TulipCatcher, JsValue> {
        init_logging();

        let tuning = match tuning_json {
            Some(json) => {
                Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => Tuning::default(),
        };

        let document = document()?;
        let root = document
            .get_element_by_id(root_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{root_id}")))?;
        let elements = Elements::build(&document, &root, &tuning)?;

        let seed = mix_seed(js_sys::Date::now(), js_sys::Math::random());
        let mut controller = GameController::with_tuning(seed, tuning);
        controller.set_haptics(WebHaptics::detect());
        let completion_pending = Rc::new(Cell::new(false));
        let pending = completion_pending.clone();
        controller.on_complete(move || pending.set(true));

        let shell = Rc::new(Shell {
            document,
            controller: RefCell::new(controller),
            elements,
            already_completed: game_completed,
            tulips: RefCell::new(HashMap::new()),
            confetti_drawn: Cell::new(false),
            last_frame_ms: Cell::new(None),
            completion_pending,
            on_complete,
            listeners: RefCell::new(Vec::new()),
        });
        Shell::bind_inputs(&shell)?;
        shell.render()?;

        log::info!("Tulip Catcher mounted on #{} (seed {})", root_id, seed);
        Ok(TulipCatcher { shell })
    }

    /// Stop the game loop, detach listeners and remove the markup
    pub fn unmount(&self) {
        self.shell.teardown();
        log::info!("Tulip Catcher unmounted");
    }
}

impl Drop for TulipCatcher {
    fn drop(&mut self) {
        self.shell.controller.borrow_mut().teardown();
    }
}
