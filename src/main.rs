/// Entry point and frame loop.

mod config;
mod domain;
mod identity;
mod sim;
mod store;
mod ui;

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{KeyCode, KeyModifiers};
use rand::rngs::ThreadRng;

use config::{GameConfig, LogConfig};
use domain::grid;
use domain::guess::GuessOutcome;
use domain::wordlist;
use identity::{IdentityProvider, LocalIdentity, User};
use sim::app::{AppState, ChallengeRow, Screen};
use sim::boards;
use sim::event::SessionEvent;
use sim::session::Session;
use sim::submit::Submitter;
use store::{populate, DocumentStore, SharedStore};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const MESSAGE_TIME: Duration = Duration::from_secs(3);

// ── Key bindings ──

const KEYS_START: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_LOAD: &[KeyCode] = &[KeyCode::Char('l'), KeyCode::Char('L')];
const KEYS_BOARD: &[KeyCode] = &[KeyCode::Char('b'), KeyCode::Char('B')];
const KEYS_GLOBAL: &[KeyCode] = &[KeyCode::Char('g'), KeyCode::Char('G')];
const KEYS_POPULATE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_IDENTITY: &[KeyCode] = &[KeyCode::Char('i'), KeyCode::Char('I')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('j')];

/// Long-lived collaborators the key handlers need.
struct Services {
    config: GameConfig,
    store: SharedStore,
    identity: LocalIdentity,
    submitter: Submitter,
    rng: ThreadRng,
}

fn main() -> anyhow::Result<()> {
    let config = GameConfig::load();
    init_logging(&config.log)?;
    log::info!("starting wordgrid, store backend {:?}", config.store.backend);

    let words = match &config.game.word_list {
        Some(path) => wordlist::load_from_file(path).unwrap_or_else(|e| {
            log::warn!("{e}; using the built-in word list");
            wordlist::builtin()
        }),
        None => wordlist::builtin(),
    };

    let store = store::open(&config.store);
    let session = Session::new(
        words,
        config.game.auto_submit_every,
        Duration::from_millis(config.game.tick_ms),
    );
    let mut app = AppState::new(session, config.game.grid_size, store.is_configured());

    let identity = LocalIdentity::new(config.player.as_ref());
    app.identity_ready = identity.is_configured();
    // Identity changes land here and are applied at the top of each frame.
    let pending_user: Rc<RefCell<Option<Option<User>>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&pending_user);
    let _subscription = identity.on_change(Box::new(move |user: Option<&User>| {
        *sink.borrow_mut() = Some(user.cloned());
    }));

    let mut services = Services {
        submitter: Submitter::spawn(store.clone()),
        config,
        store,
        identity,
        rng: rand::rng(),
    };

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let result = game_loop(&mut app, &mut renderer, &mut services, &pending_user);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    result.context("game loop failed")?;

    let s = &app.session;
    println!();
    println!("Thanks for playing Wordgrid!");
    if !s.solutions().is_empty() {
        println!("Last game: {} of {} words", s.found().len(), s.solutions().len());
    }
    Ok(())
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_logging(cfg: &LogConfig) -> anyhow::Result<()> {
    if let Some(dir) = cfg.file.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.file)
        .with_context(|| format!("cannot open log file {}", cfg.file.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cfg.level.as_str()))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("logger init failed")?;
    Ok(())
}

fn game_loop(
    app: &mut AppState,
    renderer: &mut Renderer,
    services: &mut Services,
    pending_user: &RefCell<Option<Option<User>>>,
) -> std::io::Result<()> {
    let mut kb = InputState::new();

    loop {
        if let Some(user) = pending_user.borrow_mut().take() {
            app.session.set_user(user.clone());
            app.user = user;
        }

        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }

        let quit = match app.screen {
            Screen::Menu => handle_menu(app, &kb, services),
            Screen::Playing => {
                handle_playing(app, &kb, services);
                false
            }
            Screen::ChallengeList => {
                handle_challenge_list(app, &kb, services, renderer.list_rows());
                false
            }
            Screen::Leaderboard | Screen::GlobalBoard => {
                handle_board(app, &kb);
                false
            }
        };
        if quit {
            break;
        }

        let now = Instant::now();
        app.session.advance(now);
        dispatch_events(app, services);
        for notice in services.submitter.poll() {
            app.set_message(&notice.message(), Some(MESSAGE_TIME));
        }
        app.expire_message(now);

        renderer.render(app)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    // A game still running at quit gets its final submission queued;
    // dropping the submitter drains it.
    if app.session.stop() {
        dispatch_events(app, services);
    }
    Ok(())
}

// ── Screens ──

/// Returns true to quit.
fn handle_menu(app: &mut AppState, kb: &InputState, services: &mut Services) -> bool {
    if kb.any_pressed(KEYS_QUIT) {
        return true;
    }
    if kb.any_pressed(KEYS_START) {
        start_game(app, services, None);
        return false;
    }
    for n in grid::MIN_SIZE..=grid::MAX_SIZE {
        let digit = char::from_digit(n as u32, 10).unwrap_or('0');
        if kb.was_pressed(KeyCode::Char(digit)) {
            app.grid_size = n;
            app.set_message(&format!("Grid size set to {n}x{n}"), Some(MESSAGE_TIME));
        }
    }
    if kb.any_pressed(KEYS_LOAD) {
        open_challenge_list(app, services);
    } else if kb.any_pressed(KEYS_BOARD) {
        match app.session.challenge().cloned() {
            Some(c) => open_leaderboard(app, services, &c.id, &c.name, Screen::Menu),
            None => app.set_message("Load a challenge first", Some(MESSAGE_TIME)),
        }
    } else if kb.any_pressed(KEYS_GLOBAL) {
        open_global(app, services);
    } else if kb.any_pressed(KEYS_POPULATE) {
        populate_samples(app, services);
    } else if kb.any_pressed(KEYS_IDENTITY) {
        toggle_sign_in(app, services);
    }
    false
}

fn handle_playing(app: &mut AppState, kb: &InputState, services: &mut Services) {
    for key in &kb.keys {
        match key.code {
            KeyCode::Esc => {
                app.session.stop();
                app.input.clear();
                app.screen = Screen::Menu;
                return;
            }
            KeyCode::F(2) => {
                if let Some(c) = app.session.challenge().cloned() {
                    open_leaderboard(app, services, &c.id, &c.name, Screen::Playing);
                    return;
                }
            }
            KeyCode::Enter => {
                let guess = std::mem::take(&mut app.input);
                if !guess.is_empty() {
                    if let Err(e) = app.session.submit_guess(&guess) {
                        log::warn!("guess {guess:?} rejected: {e}");
                    }
                }
            }
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c)
                if c.is_alphabetic() && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.input.extend(c.to_uppercase());
            }
            _ => {}
        }
    }
}

fn handle_challenge_list(app: &mut AppState, kb: &InputState, services: &mut Services, visible: usize) {
    if kb.was_pressed(KeyCode::Esc) {
        app.screen = Screen::Menu;
        return;
    }
    if kb.any_pressed(KEYS_UP) {
        app.cursor_up();
    }
    if kb.any_pressed(KEYS_DOWN) {
        app.cursor_down();
    }
    app.clamp_scroll(visible);

    let selected = app.selected_challenge().map(|row| row.challenge.clone());
    if kb.was_pressed(KeyCode::Enter) {
        if let Some(c) = selected {
            // Fetch again so a challenge deleted since listing reports not-found.
            match services.store.get_challenge(&c.id) {
                Ok(challenge) => start_game(app, services, Some(challenge)),
                Err(e) => app.set_message(&format!("Could not load {}: {e}", c.name), Some(MESSAGE_TIME)),
            }
        }
    } else if kb.any_pressed(KEYS_BOARD) {
        if let Some(c) = selected {
            open_leaderboard(app, services, &c.id, &c.name, Screen::ChallengeList);
        }
    } else if kb.any_pressed(KEYS_POPULATE) {
        populate_samples(app, services);
        open_challenge_list(app, services);
    }
}

fn handle_board(app: &mut AppState, kb: &InputState) {
    if kb.was_pressed(KeyCode::Esc) {
        app.screen = if app.screen == Screen::Leaderboard { app.board_return } else { Screen::Menu };
        return;
    }
    if app.screen == Screen::GlobalBoard {
        if kb.any_pressed(KEYS_UP) {
            app.global_scroll = app.global_scroll.saturating_sub(1);
        }
        if kb.any_pressed(KEYS_DOWN) {
            app.global_scroll += 1;
        }
    }
}

// ── Actions ──

fn start_game(app: &mut AppState, services: &mut Services, challenge: Option<store::Challenge>) {
    if let Err(e) = app.session.start(app.grid_size, challenge, &mut services.rng, Instant::now()) {
        app.set_message(&e.to_string(), Some(MESSAGE_TIME));
        return;
    }
    app.reset_guess_line();
    app.screen = Screen::Playing;
}

fn open_challenge_list(app: &mut AppState, services: &mut Services) {
    match services.store.list_challenges(app.owner_id()) {
        Ok(challenges) => {
            app.challenges = challenges
                .into_iter()
                .map(|challenge| ChallengeRow {
                    high_score: services.store.get_high_score(&challenge.id),
                    challenge,
                })
                .collect();
            app.cursor = app.cursor.min(app.challenges.len().saturating_sub(1));
            app.scroll = 0;
            app.screen = Screen::ChallengeList;
        }
        Err(e) => app.set_message(&format!("Cannot list challenges: {e}"), Some(MESSAGE_TIME)),
    }
}

fn open_leaderboard(app: &mut AppState, services: &mut Services, id: &str, name: &str, back: Screen) {
    let limit = services.config.leaderboard.limit;
    match boards::leaderboard_with_demo(services.store.as_ref(), id, limit, &mut services.rng) {
        Ok(rows) => {
            app.board = rows;
            app.board_title = name.to_string();
            app.board_return = back;
            app.screen = Screen::Leaderboard;
        }
        Err(e) => app.set_message(&format!("Leaderboard unavailable: {e}"), Some(MESSAGE_TIME)),
    }
}

fn open_global(app: &mut AppState, services: &mut Services) {
    let limit = services.config.leaderboard.global_limit;
    let owner = app.owner_id();
    match boards::global_leaderboards(services.store.as_ref(), owner, limit, &mut services.rng) {
        Ok(global) => {
            app.global = global;
            app.global_scroll = 0;
            app.screen = Screen::GlobalBoard;
        }
        Err(e) => app.set_message(&format!("Leaderboard unavailable: {e}"), Some(MESSAGE_TIME)),
    }
}

fn populate_samples(app: &mut AppState, services: &mut Services) {
    let Some(owner) = app.user.as_ref().map(|u| u.id.clone()) else {
        app.set_message("Sign in (I) to add sample challenges", Some(MESSAGE_TIME));
        return;
    };
    if !services.store.is_configured() {
        app.set_message("Score store is not configured", Some(MESSAGE_TIME));
        return;
    }
    let report = populate::populate(services.store.as_ref(), Some(&owner));
    let msg = if report.failures == 0 {
        format!("Added {} sample challenges", report.created.len())
    } else {
        format!("Added {} sample challenges, {} failed", report.created.len(), report.failures)
    };
    app.set_message(&msg, Some(MESSAGE_TIME));
}

fn toggle_sign_in(app: &mut AppState, services: &mut Services) {
    if app.user.is_some() {
        services.identity.sign_out();
        app.set_message("Signed out", Some(MESSAGE_TIME));
        return;
    }
    match services.identity.sign_in() {
        Ok(user) => app.set_message(&format!("Signed in as {}", user.label()), Some(MESSAGE_TIME)),
        Err(e) => app.set_message(&format!("Sign-in failed: {e}"), Some(MESSAGE_TIME)),
    }
}

// ── Session events ──

fn dispatch_events(app: &mut AppState, services: &Services) {
    for event in app.session.take_events() {
        if let Some(sub) = event.submission() {
            services.submitter.submit(sub.clone());
            continue;
        }
        match event {
            SessionEvent::Started { size, solutions, challenge } => {
                let msg = match challenge {
                    Some(name) => format!("{name}: {solutions} words to find"),
                    None => format!("New {size}x{size} game: {solutions} words to find"),
                };
                app.set_message(&msg, Some(MESSAGE_TIME));
            }
            SessionEvent::Guessed { word, outcome } => {
                app.feedback = match outcome {
                    GuessOutcome::Duplicate => format!("{word} has already been found!"),
                    GuessOutcome::Correct => format!("{word} is correct!"),
                    GuessOutcome::Incorrect => format!("{word} is incorrect!"),
                };
            }
            SessionEvent::AllFound => {
                app.set_message("You found every word! Press ESC to finish.", None);
            }
            SessionEvent::Stopped { found, missed, elapsed } => {
                let msg = format!("Game over: {found} found, {missed} missed in {elapsed}s");
                app.set_message(&msg, Some(MESSAGE_TIME));
            }
            SessionEvent::AutoSubmit(_) | SessionEvent::FinalSubmit(_) => {}
        }
    }
}
