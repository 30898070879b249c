use std::{fs, io, path::PathBuf, process::ExitCode};

use clap::Parser;
use fleetread_core::{
    KeyValueStore, MemoryStore, SettingsPatch, SpeedReader, load_settings, save_settings,
};
use log::{info, warn};
use tokio::sync::mpsc;

#[path = "main/keys.rs"]
mod keys;
#[path = "main/screen.rs"]
mod screen;
#[path = "main/store.rs"]
mod store;

const WPM_STEP: u16 = 10;

#[derive(Debug, Parser)]
#[command(name = "fleetread", about = "Timed chunked reading in the terminal")]
struct Args {
    /// Text file to read.
    text: PathBuf,

    /// Override the stored words-per-minute rate.
    #[arg(long)]
    wpm: Option<u16>,

    /// Override the stored words-per-chunk size.
    #[arg(long)]
    wpc: Option<u16>,

    /// Disable the extra pause at paragraph ends.
    #[arg(long)]
    no_slight_pause: bool,

    /// Settings record location.
    #[arg(long, default_value = ".fleetread.json")]
    settings: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fleetread: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> io::Result<()> {
    let text = fs::read_to_string(&args.text)?;

    let mut store: Box<dyn KeyValueStore> = match store::FileStore::open(&args.settings) {
        Ok(file_store) => Box::new(file_store),
        Err(err) => {
            warn!(
                "storage: {} unavailable ({err}); settings will not persist",
                args.settings.display()
            );
            Box::new(MemoryStore::default())
        }
    };

    let reader = SpeedReader::new();
    let mut patch = load_settings(store.as_ref())
        .map(SettingsPatch::from)
        .unwrap_or_default();
    if let Some(wpm) = args.wpm {
        patch.words_per_minute = Some(wpm);
    }
    if let Some(wpc) = args.wpc {
        patch.words_per_chunk = Some(wpc);
    }
    if args.no_slight_pause {
        patch.slight_pause = Some(false);
    }
    reader.apply_settings(&patch, &screen::TermStyles);

    reader.load_text(&text);
    info!(
        "loaded {} words={} paragraphs={}",
        args.text.display(),
        reader.total_words(),
        reader.paragraph_count()
    );

    let mut events = reader.subscribe();
    let (commands_tx, mut commands) = mpsc::unbounded_channel();
    keys::spawn_key_thread(commands_tx);

    let mut terminal = screen::Terminal::open()?;
    terminal.draw(&reader)?;

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    keys::Command::Quit => break,
                    keys::Command::TogglePause => {
                        if !reader.toggle_paused() {
                            let runner = reader.clone();
                            tokio::spawn(async move { runner.start_reading().await });
                        }
                    }
                    keys::Command::NextChunk => reader.to_next_chunk(),
                    keys::Command::PreviousChunk => reader.to_previous_chunk(),
                    keys::Command::SpeedUp => {
                        reader.set_words_per_minute(
                            reader.words_per_minute().saturating_add(WPM_STEP),
                        );
                    }
                    keys::Command::SlowDown => {
                        reader.set_words_per_minute(
                            reader.words_per_minute().saturating_sub(WPM_STEP),
                        );
                    }
                    keys::Command::Rewind => reader.rewind(),
                }
                terminal.draw(&reader)?;
            }
            event = events.recv() => {
                if event.is_some() {
                    terminal.draw(&reader)?;
                }
            }
        }
    }

    drop(terminal);
    if let Err(err) = save_settings(store.as_mut(), &reader.settings()) {
        warn!("storage: failed to save settings: {err}");
    }
    Ok(())
}
