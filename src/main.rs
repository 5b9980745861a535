mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keyfall::{
    config::{Config, ConfigStore, FileConfigStore},
    curve::{GameVariant, Tier},
    history::{HistoryDb, HistoryEntry, HistoryTotals},
    rng::{RandomSource, SeededRandom, ThreadRandom},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    session::{GamePhase, GameSession, MemorySink, ResultSink},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use webbrowser::Browser;

const TICK_RATE_MS: u64 = 33;

/// terminal typing arcade: type the targets before they escape
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing arcade. Words fall (or balloons rise, or blocks stack); type them before they escape. Difficulty ramps over time, combos multiply your score, and every finished session lands in a local history database."
)]
pub struct Cli {
    /// mini-game to play
    #[clap(short = 'g', long, value_enum)]
    game: Option<GameVariant>,

    /// difficulty tier
    #[clap(short = 't', long, value_enum)]
    tier: Option<Tier>,

    /// seed for deterministic spawning (useful for practice runs)
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// persist the chosen game/tier/seed as the new default
    #[clap(long)]
    save_config: bool,

    /// print recent session history and exit
    #[clap(long)]
    history: bool,

    /// export the full session history to a csv file and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Playing,
    Results,
    History,
}

pub struct App {
    pub session: GameSession,
    pub screen: Screen,
    pub best_score: Option<u32>,
    pub history: Vec<HistoryEntry>,
    pub totals: Option<HistoryTotals>,
    clock: Instant,
}

impl App {
    pub fn new(variant: GameVariant, tier: Tier, seed: Option<u64>) -> Self {
        let rng: Box<dyn RandomSource> = match seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(ThreadRandom),
        };

        // a broken history store never blocks play
        let sink: Box<dyn ResultSink> = match HistoryDb::new() {
            Ok(db) => Box::new(db),
            Err(_) => Box::new(MemorySink::new()),
        };

        let mut session = GameSession::new(variant, tier, rng, sink);
        session.start();

        let mut app = Self {
            session,
            screen: Screen::Playing,
            best_score: None,
            history: Vec::new(),
            totals: None,
            clock: Instant::now(),
        };
        app.refresh_history();
        app
    }

    fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    fn refresh_history(&mut self) {
        if let Ok(db) = HistoryDb::new() {
            self.best_score = db
                .best_score(
                    &self.session.variant().to_string().to_lowercase(),
                    &self.session.tier().to_string().to_lowercase(),
                )
                .unwrap_or(None);
            self.history = db.recent(15).unwrap_or_default();
            self.totals = db.totals().ok();
        }
    }

    fn restart(&mut self) {
        self.session.restart();
        self.screen = Screen::Playing;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let stored = store.load();

    let variant = cli.game.unwrap_or_else(|| {
        GameVariant::from_str(&stored.variant, true).unwrap_or(GameVariant::Wordfall)
    });
    let tier = cli
        .tier
        .unwrap_or_else(|| Tier::from_str(&stored.tier, true).unwrap_or(Tier::Medium));
    let seed = cli.seed.or(stored.seed);

    if cli.save_config {
        store.save(&Config {
            variant: variant.to_string().to_lowercase(),
            tier: tier.to_string().to_lowercase(),
            seed,
        })?;
    }

    if cli.history {
        print_history()?;
        return Ok(());
    }

    if let Some(path) = cli.export_csv {
        let db = HistoryDb::new()?;
        db.export_csv(&path)?;
        println!("history written to {}", path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(variant, tier, seed);
    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn print_history() -> Result<(), Box<dyn Error>> {
    let db = HistoryDb::new()?;
    let entries = db.recent(20)?;

    if entries.is_empty() {
        println!("no sessions recorded yet");
        return Ok(());
    }

    for e in &entries {
        println!(
            "{}  {:<11} {:<7} {:>6} pts  {:>3}%  x{}",
            e.timestamp.format("%Y-%m-%d %H:%M"),
            e.kind,
            e.difficulty,
            e.score,
            e.accuracy,
            e.max_combo
        );
    }

    let totals = db.totals()?;
    println!(
        "\n{} sessions, {} words, {:.0}% average accuracy",
        totals.sessions, totals.words_typed, totals.avg_accuracy
    );

    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(events, ticker);

    loop {
        terminal.draw(|f| draw(app, f))?;

        match runner.step() {
            GameEvent::Tick => {
                if app.screen == Screen::Playing && app.session.phase() == GamePhase::Playing {
                    let now = app.now_ms();
                    app.session.tick(now);

                    if app.session.phase() == GamePhase::GameOver {
                        app.refresh_history();
                        app.screen = Screen::Results;
                    }
                }
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
            }
        }
    }

    // cancel anything still in flight before the terminal goes away
    app.session.dispose();
    Ok(())
}

/// Returns true when the app should exit
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.screen {
        Screen::Playing => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Tab => match app.session.phase() {
                GamePhase::Playing => app.session.pause(),
                GamePhase::Paused => app.session.resume(),
                _ => {}
            },
            KeyCode::Backspace => {
                if app.session.phase() == GamePhase::Playing {
                    let mut buffer = app.session.input().to_string();
                    buffer.pop();
                    app.session.on_input(&buffer);
                }
            }
            KeyCode::Char(c) => {
                if app.session.phase() == GamePhase::Playing {
                    let mut buffer = app.session.input().to_string();
                    buffer.push(c);
                    app.session.on_input(&buffer);
                }
            }
            _ => {}
        },
        Screen::Results => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('r') | KeyCode::Char('n') => app.restart(),
            KeyCode::Char('h') => {
                app.refresh_history();
                app.screen = Screen::History;
            }
            KeyCode::Char('t') => {
                if Browser::is_available() {
                    let state = app.session.state();
                    webbrowser::open(&format!(
                        "https://twitter.com/intent/tweet?text={}%20pts%20%2F%20{}%25%20acc%20%2F%20x{}%20combo%20in%20{}%0A%0Ahttps%3A%2F%2Fgithub.com%2Fmartintrojer%2Fkeyfall",
                        state.score,
                        state.accuracy(),
                        state.max_combo,
                        app.session.variant()
                    ))
                    .unwrap_or_default();
                }
            }
            _ => {}
        },
        Screen::History => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('b') | KeyCode::Backspace => app.screen = Screen::Results,
            KeyCode::Char('r') => app.restart(),
            _ => {}
        },
    }

    false
}

fn draw(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
