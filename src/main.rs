use std::{path::PathBuf, sync::mpsc, thread};

use clap::{Parser, Subcommand};
use egui::Vec2;

use pitwall::PitwallError;
use pitwall::race::producer::{ReplayProducer, SimulatedRaceProducer};
use pitwall::race::{self, SessionOutput};
use pitwall::strategy::StrategyEngine;
use pitwall::ui::config::AppConfig;
use pitwall::ui::{HISTORY_SECONDS, PitwallApp};
use pitwall::writer;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a live simulated session
    Live {
        /// Seed for the session simulation; a fixed seed replays the same race
        #[arg(short, long)]
        seed: Option<u64>,

        #[arg(short, long, default_value_t = HISTORY_SECONDS)]
        window: usize,

        /// Record the session to a JSON Lines file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replay a recorded session
    Replay {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn run_app(
    session_rx: mpsc::Receiver<SessionOutput>,
    app_config: AppConfig,
) -> Result<(), PitwallError> {
    let window_position = app_config.window_position.clone();

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(1100., 720.))
        .with_position(window_position);

    eframe::run_native(
        "Pitwall",
        native_options,
        Box::new(|cc| {
            Ok(Box::new(PitwallApp::new(
                session_rx,
                StrategyEngine::from_env(),
                app_config,
                cc,
            )))
        }),
    )
    .expect("could not start app");
    Ok(())
}

fn live(
    seed: Option<u64>,
    window_size: usize,
    output: Option<PathBuf>,
) -> Result<(), PitwallError> {
    let (session_tx, session_rx) = mpsc::channel::<SessionOutput>();

    // when recording we add a second channel and have the collector fan the
    // session out to both the app and the writer
    if let Some(output_file) = output {
        let (writer_tx, writer_rx) = mpsc::channel::<SessionOutput>();
        thread::spawn(move || {
            let producer = SimulatedRaceProducer::new(seed);
            race::run_session(producer, session_tx, Some(writer_tx))
                .expect("Error while running simulated session");
        });
        thread::spawn(move || writer::write_session(&output_file, writer_rx));
    } else {
        thread::spawn(move || {
            let producer = SimulatedRaceProducer::new(seed);
            race::run_session(producer, session_tx, None)
                .expect("Error while running simulated session");
        });
    }

    let app_config = AppConfig::from_local_file().unwrap_or(AppConfig {
        history_window_s: window_size,
        ..Default::default()
    });

    run_app(session_rx, app_config)
}

fn replay(input: &PathBuf) -> Result<(), PitwallError> {
    if !input.exists() {
        return Err(PitwallError::InvalidSessionFile {
            path: format!("{:?}", input),
        });
    }

    let producer = ReplayProducer::from_file(input)?;
    let (session_tx, session_rx) = mpsc::channel::<SessionOutput>();
    thread::spawn(move || {
        race::run_session(producer, session_tx, None).expect("Error while replaying session");
    });

    let app_config = AppConfig::from_local_file().unwrap_or_default();
    run_app(session_rx, app_config)
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");
    match &cli.command {
        Commands::Live {
            seed,
            window,
            output,
        } => live(*seed, *window, output.clone()).expect("Error while running live session"),
        Commands::Replay { input } => replay(input).expect("Error while replaying session"),
    };
}
