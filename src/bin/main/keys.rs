use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    TogglePause,
    NextChunk,
    PreviousChunk,
    SpeedUp,
    SlowDown,
    Rewind,
    Quit,
}

/// Read raw-mode key events on a dedicated thread and forward mapped
/// commands. The thread ends with the channel or on quit.
pub fn spawn_key_thread(commands: UnboundedSender<Command>) {
    std::thread::spawn(move || {
        loop {
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(err) => {
                    debug!("input: read failed: {err}");
                    break;
                }
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            let Some(command) = map_key(key) else {
                continue;
            };
            if commands.send(command).is_err() || command == Command::Quit {
                break;
            }
        }
    });
}

fn map_key(key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Command::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(' ') | KeyCode::Char('k') => Some(Command::TogglePause),
        KeyCode::Left | KeyCode::Char('h') => Some(Command::PreviousChunk),
        KeyCode::Right | KeyCode::Char('l') => Some(Command::NextChunk),
        KeyCode::Up | KeyCode::Char('=') => Some(Command::SpeedUp),
        KeyCode::Down | KeyCode::Char('-') => Some(Command::SlowDown),
        KeyCode::Char('r') => Some(Command::Rewind),
        _ => None,
    }
}
