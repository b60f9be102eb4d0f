mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use pomoclock::{
    alert::{self, AlertKind, AlertSound},
    app_dirs::AppDirs,
    clock::PomodoroClock,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{
        CrosstermEventSource, FixedTicker, PomoEvent, PomoEventSource, Runner, TickScheduler,
    },
    timer::{ApplyChanges, Countdown, LengthField},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc::Sender,
    time::Duration,
};
use tracing::info;

const POLL_RATE_MS: u64 = 250;
const SESSION_BIG_STEP: i32 = 5;

/// pomodoro clock for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A pomodoro clock that alternates between a work session and a break, with adjustable lengths and an alert on every phase change."
)]
pub struct Cli {
    /// session length in minutes
    #[clap(short = 's', long, value_parser = clap::value_parser!(u32).range(1..))]
    session: Option<u32>,

    /// break length in minutes
    #[clap(short = 'b', long = "break", value_parser = clap::value_parser!(u32).range(1..))]
    break_minutes: Option<u32>,

    /// upper bound for the session length (uncapped by default)
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    session_cap: Option<u32>,

    /// whether length changes while running reset the countdown now or at the next phase
    #[clap(long, value_enum)]
    apply_changes: Option<ApplyChanges>,

    /// how to sound the phase alert
    #[clap(long, value_enum)]
    alert: Option<AlertKind>,

    /// player program for the command alert (e.g. paplay, aplay, afplay)
    #[clap(long)]
    alert_command: Option<String>,

    /// sound file for the command alert
    #[clap(long)]
    alert_file: Option<PathBuf>,

    /// path to the configuration file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// log level written to the log file
    #[clap(long, default_value_t = logging::DEFAULT_LOG_LEVEL.to_string())]
    log_level: String,

    /// log file path
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Layer command line flags over the loaded configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(session) = self.session {
            config.session_minutes = session;
        }
        if let Some(break_minutes) = self.break_minutes {
            config.break_minutes = break_minutes;
        }
        if self.session_cap.is_some() {
            config.session_max_minutes = self.session_cap;
        }
        if let Some(apply_changes) = self.apply_changes {
            config.apply_changes = apply_changes;
        }
        if let Some(alert) = self.alert {
            config.alert = alert;
        }
        if self.alert_command.is_some() {
            config.alert_command = self.alert_command.clone();
        }
        if self.alert_file.is_some() {
            config.alert_file = self.alert_file.clone();
        }
        config
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    pub clock: PomodoroClock<Box<dyn AlertSound>, FixedTicker>,
}

impl App {
    pub fn new(config: &Config, tx: Sender<PomoEvent>, alert: Box<dyn AlertSound>) -> Self {
        let countdown = Countdown::new(config.lengths(), config.limits(), config.apply_changes);
        let scheduler = TickScheduler::new(tx, FixedTicker::seconds());
        Self {
            clock: PomodoroClock::new(countdown, alert, scheduler),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit;
            }
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.clock.toggle();
            }
            KeyCode::Char('s') => {
                self.clock.skip();
            }
            KeyCode::Char('r') => self.clock.reset(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.clock.adjust(LengthField::Session, 1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.clock.adjust(LengthField::Session, -1);
            }
            KeyCode::PageUp | KeyCode::Char('K') => {
                self.clock.adjust(LengthField::Session, SESSION_BIG_STEP);
            }
            KeyCode::PageDown | KeyCode::Char('J') => {
                self.clock.adjust(LengthField::Session, -SESSION_BIG_STEP);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.clock.adjust(LengthField::Break, 1);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.clock.adjust(LengthField::Break, -1);
            }
            _ => {}
        }
        Control::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(e) = logging::init(&cli.log_level, &log_path) {
            eprintln!("logging disabled ({}): {e}", log_path.display());
        }
    }

    let config = cli.apply(cli.config_store().load());
    info!(
        "starting with session={}min break={}min apply={} alert={}",
        config.session_minutes, config.break_minutes, config.apply_changes, config.alert
    );

    let alert = alert::build_alert(
        config.alert,
        config.alert_command.as_deref(),
        config.alert_file.as_deref(),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let mut app = App::new(&config, events.sender(), alert);
    let result = start_tui(&mut terminal, &mut app, events);
    app.clock.teardown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: PomoEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: E,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        events,
        FixedTicker::new(Duration::from_millis(POLL_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            Some(PomoEvent::Tick(id)) => {
                app.clock.on_tick(id);
                terminal.draw(|f| ui(app, f))?;
            }
            Some(PomoEvent::Resize) => {
                terminal.draw(|f| ui(app, f))?;
            }
            Some(PomoEvent::Key(key)) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
            Some(PomoEvent::Closed) => break,
            None => {}
        }
    }

    info!("quitting");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pomoclock::{
        alert::RecordingAlert,
        timer::{Phase, RunState},
    };
    use std::sync::mpsc::{self, Receiver};

    fn test_app(config: &Config) -> (App, Receiver<PomoEvent>) {
        let (tx, rx) = mpsc::channel();
        let app = App::new(config, tx, Box::new(RecordingAlert::default()));
        (app, rx)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["pomoclock"]);

        assert_eq!(cli.session, None);
        assert_eq!(cli.break_minutes, None);
        assert_eq!(cli.session_cap, None);
        assert_eq!(cli.apply_changes, None);
        assert_eq!(cli.alert, None);
        assert_eq!(cli.log_level, "warn");
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_lengths() {
        let cli = Cli::parse_from(["pomoclock", "-s", "50", "-b", "10"]);
        assert_eq!(cli.session, Some(50));
        assert_eq!(cli.break_minutes, Some(10));

        let cli = Cli::parse_from(["pomoclock", "--session", "45", "--break", "15"]);
        assert_eq!(cli.session, Some(45));
        assert_eq!(cli.break_minutes, Some(15));
    }

    #[test]
    fn test_cli_rejects_zero_lengths() {
        assert!(Cli::try_parse_from(["pomoclock", "-s", "0"]).is_err());
        assert!(Cli::try_parse_from(["pomoclock", "--break", "0"]).is_err());
        assert!(Cli::try_parse_from(["pomoclock", "--session-cap", "0"]).is_err());
    }

    #[test]
    fn test_cli_value_enums() {
        let cli = Cli::parse_from([
            "pomoclock",
            "--apply-changes",
            "next-phase",
            "--alert",
            "none",
        ]);
        assert_eq!(cli.apply_changes, Some(ApplyChanges::NextPhase));
        assert_eq!(cli.alert, Some(AlertKind::None));

        assert!(Cli::try_parse_from(["pomoclock", "--alert", "trumpet"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "pomoclock",
            "-s",
            "40",
            "--session-cap",
            "60",
            "--alert-file",
            "/tmp/ding.wav",
        ]);
        let file_config = Config {
            session_minutes: 30,
            break_minutes: 10,
            ..Config::default()
        };

        let merged = cli.apply(file_config);
        assert_eq!(merged.session_minutes, 40);
        assert_eq!(merged.break_minutes, 10);
        assert_eq!(merged.session_max_minutes, Some(60));
        assert_eq!(merged.alert_file, Some(PathBuf::from("/tmp/ding.wav")));
    }

    #[test]
    fn test_app_new_defaults() {
        let (app, _rx) = test_app(&Config::default());
        let countdown = app.clock.countdown();
        assert_eq!(countdown.remaining(), 1500);
        assert_eq!(countdown.phase(), Phase::Session);
        assert_eq!(countdown.run_state(), RunState::Stopped);
        assert!(!app.clock.is_ticking());
    }

    #[test]
    fn test_space_toggles_run_state() {
        let (mut app, _rx) = test_app(&Config::default());
        assert_eq!(app.on_key(press(KeyCode::Char(' '))), Control::Continue);
        assert!(app.clock.countdown().is_running());
        assert!(app.clock.is_ticking());

        app.on_key(press(KeyCode::Enter));
        assert!(!app.clock.countdown().is_running());
        assert!(!app.clock.is_ticking());
    }

    #[test]
    fn test_length_keys() {
        let (mut app, _rx) = test_app(&Config::default());
        app.on_key(press(KeyCode::Up));
        app.on_key(press(KeyCode::Char('K')));
        assert_eq!(app.clock.countdown().lengths().session, 31);
        app.on_key(press(KeyCode::PageDown));
        app.on_key(press(KeyCode::Char('j')));
        assert_eq!(app.clock.countdown().lengths().session, 25);

        app.on_key(press(KeyCode::Right));
        assert_eq!(app.clock.countdown().lengths().break_time, 6);
        for _ in 0..10 {
            app.on_key(press(KeyCode::Char('h')));
        }
        assert_eq!(app.clock.countdown().lengths().break_time, 1);
    }

    #[test]
    fn test_skip_and_reset_keys() {
        let (mut app, _rx) = test_app(&Config::default());
        app.on_key(press(KeyCode::Char(' ')));
        app.on_key(press(KeyCode::Char('s')));
        assert_eq!(app.clock.countdown().phase(), Phase::Break);
        assert_eq!(app.clock.countdown().remaining(), 300);

        app.on_key(press(KeyCode::Char('r')));
        let countdown = app.clock.countdown();
        assert_eq!(countdown.phase(), Phase::Session);
        assert_eq!(countdown.run_state(), RunState::Stopped);
        assert_eq!(countdown.remaining(), 1500);
        assert!(!app.clock.is_ticking());
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _rx) = test_app(&Config::default());
        assert_eq!(app.on_key(press(KeyCode::Esc)), Control::Quit);
        assert_eq!(app.on_key(press(KeyCode::Char('q'))), Control::Quit);
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let (mut app, _rx) = test_app(&Config::default());
        let mut release = press(KeyCode::Char(' '));
        release.kind = KeyEventKind::Release;
        app.on_key(release);
        assert!(!app.clock.countdown().is_running());
    }

    #[test]
    fn test_app_uses_config_lengths() {
        let config = Config {
            session_minutes: 50,
            break_minutes: 10,
            ..Config::default()
        };
        let (app, _rx) = test_app(&config);
        assert_eq!(app.clock.countdown().display(), "50:00");
    }

    #[test]
    fn test_loop_exits_when_input_closes() {
        use pomoclock::runtime::TestEventSource;
        use ratatui::backend::TestBackend;

        let (mut app, _ticks) = test_app(&Config::default());
        let (tx, rx) = mpsc::channel();
        tx.send(PomoEvent::Key(press(KeyCode::Char(' ')))).unwrap();
        tx.send(PomoEvent::Closed).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        start_tui(&mut terminal, &mut app, TestEventSource::new(rx)).unwrap();

        assert!(app.clock.countdown().is_running());
        // the sender is still alive, so only the close event could end the loop
        drop(tx);
    }

    #[test]
    fn test_pomo_event_clone() {
        let key_event = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        let event = PomoEvent::Key(key_event);
        let cloned = event.clone();

        match (event, cloned) {
            (PomoEvent::Key(original), PomoEvent::Key(cloned)) => {
                assert_eq!(original.code, cloned.code);
                assert_eq!(original.modifiers, cloned.modifiers);
            }
            _ => panic!("Events should match"),
        }
    }
}
