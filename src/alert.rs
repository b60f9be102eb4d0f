//! Audible alert played on phase transitions.
//!
//! Playback is fire-and-forget: every implementation swallows its own
//! failures so a missing sound device can never stall the countdown.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// How often a finished player is looked for
const REAP_INTERVAL: Duration = Duration::from_millis(50);

/// Candidate players and stock sounds, probed in order
const SYSTEM_SOUNDS: [(&str, &str); 3] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("afplay", "/System/Library/Sounds/Glass.aiff"),
];

pub trait AlertSound {
    /// Start playback from the beginning.
    fn play(&mut self);

    /// Stop any playback in flight and rewind.
    fn stop(&mut self) {}
}

impl<A: AlertSound + ?Sized> AlertSound for Box<A> {
    fn play(&mut self) {
        (**self).play()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AlertKind {
    /// Ring the terminal bell
    #[default]
    Bell,
    /// Spawn an external player on a sound file
    Command,
    /// No sound at all
    None,
}

/// Writes BEL to the terminal.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> AlertSound for TerminalBell<W> {
    fn play(&mut self) {
        if let Err(e) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            warn!("terminal bell failed: {e}");
        }
    }
}

/// Plays a sound file through an external program such as `paplay`.
#[derive(Debug)]
pub struct CommandPlayer {
    program: String,
    file: PathBuf,
    child: Arc<Mutex<Option<Child>>>,
}

impl CommandPlayer {
    pub fn new<P: AsRef<Path>>(program: impl Into<String>, file: P) -> Self {
        Self {
            program: program.into(),
            file: file.as_ref().to_path_buf(),
            child: Arc::new(Mutex::new(None)),
        }
    }

    /// First stock player/sound pair whose sound file exists on this system
    pub fn detect() -> Option<Self> {
        SYSTEM_SOUNDS
            .iter()
            .find(|(_, file)| Path::new(file).exists())
            .map(|(program, file)| Self::new(*program, file))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    fn is_playing(&self) -> bool {
        self.child.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn kill_child(&mut self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        if let Some(mut child) = slot.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    /// Reap the player `pid` once it exits on its own, so it never lingers
    /// as a zombie until the next play.
    fn watch(slot: Arc<Mutex<Option<Child>>>, pid: u32) {
        std::thread::spawn(move || loop {
            std::thread::sleep(REAP_INTERVAL);
            let Ok(mut guard) = slot.lock() else {
                break;
            };
            match guard.as_mut() {
                Some(child) if child.id() == pid => match child.try_wait() {
                    Ok(None) => {}
                    Ok(Some(_)) | Err(_) => {
                        *guard = None;
                        break;
                    }
                },
                // killed or replaced by a newer play
                _ => break,
            }
        });
    }
}

impl AlertSound for CommandPlayer {
    fn play(&mut self) {
        // restart rather than overlap
        self.kill_child();

        match Command::new(&self.program)
            .arg(&self.file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                debug!("spawned {} for {}", self.program, self.file.display());
                let pid = child.id();
                if let Ok(mut slot) = self.child.lock() {
                    *slot = Some(child);
                }
                Self::watch(Arc::clone(&self.child), pid);
            }
            Err(e) => warn!("could not spawn {}: {e}", self.program),
        }
    }

    fn stop(&mut self) {
        self.kill_child();
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.kill_child();
    }
}

pub struct Silent;

impl AlertSound for Silent {
    fn play(&mut self) {}
}

/// Counts calls instead of making noise; used by tests
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingAlert {
    pub plays: usize,
    pub stops: usize,
}

impl AlertSound for RecordingAlert {
    fn play(&mut self) {
        self.plays += 1;
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// Build the alert for `kind`. A command alert with no usable player falls
/// back to the terminal bell.
pub fn build_alert(
    kind: AlertKind,
    program: Option<&str>,
    file: Option<&Path>,
) -> Box<dyn AlertSound> {
    match kind {
        AlertKind::Bell => Box::new(TerminalBell::stdout()),
        AlertKind::None => Box::new(Silent),
        AlertKind::Command => {
            let player = match (program, file) {
                (Some(program), Some(file)) => Some(CommandPlayer::new(program, file)),
                (None, Some(file)) => Some(CommandPlayer::new("paplay", file)),
                (Some(program), None) => CommandPlayer::detect()
                    .map(|detected| CommandPlayer::new(program, detected.file())),
                (None, None) => CommandPlayer::detect(),
            };

            match player {
                Some(player) => Box::new(player),
                None => {
                    warn!("no sound file found for command alert, using terminal bell");
                    Box::new(TerminalBell::stdout())
                }
            }
        }
    }
}
