//! Interactive play session: parses commands, drives the engine, and
//! collects rendered output.

use saga_core::{ChapterId, SideSlot, SlideId};
use saga_engine::{Engine, EngineState, Intent, Outcome, Ports, Presenter, Transition};
use saga_profile::{ChapterUnlocks, PlayerProfile, Storage, StoredProfile, UnlockStore};
use tracing::debug;

use crate::journal::Journal;
use crate::presenter::TerminalPresenter;

const HELP: &str = "\
  next              continue (or serve, on a customer slide)
  path <slot>       open a side-path: loop, quest or weird
  leave             close the side-path
  reveal            reveal the quest step or the customer's puzzle
  step              next quest step
  forward | back    move through the customer's story
  pick <n>          pick a choice option
  answer <n>        answer the quiz
  end <n>           pick an ending
  goto <slide>      jump to a slide by id
  look              show the current slide again
  inventory         show items and wallet
  chapters          list unlocked chapters
  start <chapter>   start an unlocked chapter
  quit              leave the session";

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// An engine intent.
    Play(Intent),
    /// Serve the customer.
    Serve,
    /// Redraw the slide.
    Look,
    /// Show the inventory.
    Inventory,
    /// List unlocked chapters.
    Chapters,
    /// Start a chapter.
    Start(ChapterId),
    /// Show the command list.
    Help,
    /// End the session.
    Quit,
}

impl Command {
    /// Parse one line of input. Option numbers are 1-based.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut words = input.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        let command = match verb.as_str() {
            "next" | "n" => Self::Play(Intent::Advance),
            "serve" => Self::Serve,
            "path" => {
                let slot = arg.ok_or("usage: path <loop|quest|weird>")?;
                let slot = SideSlot::parse(slot).ok_or_else(|| format!("unknown side-path '{slot}'"))?;
                Self::Play(Intent::EnterSidePath(slot))
            }
            "leave" => Self::Play(Intent::LeaveSidePath),
            "reveal" => Self::Play(Intent::Reveal),
            "step" => Self::Play(Intent::QuestNext),
            "forward" => Self::Play(Intent::CustomerNext),
            "back" => Self::Play(Intent::CustomerBack),
            "pick" => Self::Play(Intent::SelectChoice(option_index(arg)?)),
            "answer" => Self::Play(Intent::SelectQuiz(option_index(arg)?)),
            "end" => Self::Play(Intent::SelectEnding(option_index(arg)?)),
            "goto" => Self::Play(Intent::GotoSlide(SlideId::new(
                arg.ok_or("usage: goto <slide>")?,
            ))),
            "look" | "l" => Self::Look,
            "inventory" | "i" => Self::Inventory,
            "chapters" => Self::Chapters,
            "start" => Self::Start(ChapterId::new(arg.ok_or("usage: start <chapter>")?)),
            "help" | "?" => Self::Help,
            "quit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(command)
    }
}

fn option_index(arg: Option<&str>) -> Result<usize, String> {
    let arg = arg.ok_or("expected an option number")?;
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("'{arg}' is not an option number")),
    }
}

/// One player at the terminal.
pub struct Session<'e, S: Storage> {
    engine: &'e Engine,
    profile: StoredProfile<S>,
    unlocks: UnlockStore<S>,
    state: Option<EngineState>,
    presenter: TerminalPresenter,
    journal: Journal,
}

impl<'e, S: Storage> Session<'e, S> {
    /// Create a session at chapter select.
    pub fn new(engine: &'e Engine, profile: StoredProfile<S>, unlocks: UnlockStore<S>) -> Self {
        Self {
            engine,
            profile,
            unlocks,
            state: None,
            presenter: TerminalPresenter::new(),
            journal: Journal::new(),
        }
    }

    /// The journal recorded so far.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Start an unlocked chapter.
    pub fn start(&mut self, chapter: &ChapterId) -> Result<String, String> {
        if !self.unlocks.is_unlocked(chapter) {
            return Err(format!("chapter '{chapter}' is locked"));
        }
        let mut ports = Ports::new(&mut self.profile, &mut self.unlocks);
        let transition = self
            .engine
            .start_chapter(chapter, &mut ports)
            .map_err(|e| e.to_string())?;
        self.apply(transition);
        Ok(self.presenter.take())
    }

    /// Handle one line of input and return what to print.
    pub fn process(&mut self, input: &str) -> Result<String, String> {
        match Command::parse(input)? {
            Command::Play(intent) => {
                let state = self.take_state()?;
                let mut ports = Ports::new(&mut self.profile, &mut self.unlocks);
                let transition = self.engine.dispatch(state, &intent, &mut ports);
                self.apply(transition);
            }
            Command::Serve => {
                let state = self.take_state()?;
                let mut ports = Ports::new(&mut self.profile, &mut self.unlocks);
                let transition = self.engine.serve(state, &mut ports);
                self.apply(transition);
            }
            Command::Look => match self.state.take() {
                Some(state) => {
                    self.render(&state);
                    self.state = Some(state);
                }
                None => self.presenter.line("No chapter in progress."),
            },
            Command::Inventory => self.show_inventory(),
            Command::Chapters => {
                let unlocked: Vec<String> = self
                    .unlocks
                    .unlocked()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                self.presenter.line(format!("Unlocked: {}", unlocked.join(", ")));
            }
            Command::Start(chapter) => return self.start(&chapter),
            Command::Help => self.presenter.line(HELP.trim_start()),
            Command::Quit => self.presenter.line("Goodbye."),
        }
        Ok(self.presenter.take())
    }

    fn take_state(&mut self) -> Result<EngineState, String> {
        self.state
            .take()
            .ok_or_else(|| "no chapter in progress (try 'start <chapter>')".to_string())
    }

    fn apply(&mut self, transition: Transition) {
        for event in &transition.events {
            self.presenter.notify(event);
            self.journal.record(event);
        }
        debug!(outcome = ?transition.outcome, "command applied");
        match &transition.outcome {
            Outcome::ChapterComplete(_) => {
                self.presenter
                    .line("Back at chapter select. Type 'chapters' or 'start <chapter>'.");
                self.state = None;
                return;
            }
            Outcome::Blocked(blocker) => self.presenter.line(format!("Cannot continue: {blocker}.")),
            Outcome::Unchanged => self.presenter.line("Nothing happens."),
            Outcome::Updated | Outcome::Moved | Outcome::Handled | Outcome::ChapterStarted(_) => {
                self.render(&transition.state);
            }
        }
        self.state = Some(transition.state);
    }

    fn render(&mut self, state: &EngineState) {
        match self.engine.view(state) {
            Some(view) => self.presenter.render(&view),
            None => self.presenter.line("This slide no longer exists."),
        }
    }

    fn show_inventory(&mut self) {
        let items = self.profile.list_items();
        if items.is_empty() {
            self.presenter.line("Your pockets are empty.");
        }
        for item in items {
            self.presenter.line(format!("{} x{}", item.id, item.qty));
        }
        self.presenter.line(format!("Wallet: {}", self.profile.currency()));
    }
}
