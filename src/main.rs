mod app;
mod clicker;
mod dispatch;
mod error;
mod hooks;
mod settings;
mod store;


use app::{AppState, TITLE_IDLE};
use clap::Parser;
use clicker::SystemPointer;
use dispatch::UiMessage;
use hooks::InputHooks;
use std::{path::PathBuf, sync::Arc};
use store::{SettingsStore, DEFAULT_CONFIG_FILE};

/// Repeats mouse clicks at a fixed interval. F6 starts, F7 stops, F8 toggles.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Settings file to load at start-up and write on "Save Settings"
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Do not install the global hotkey and location-picker hooks
    #[arg(long)]
    no_hotkeys: bool,
}

fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();
    setup_tracing();

    let (dispatcher, queue) = dispatch::channel();
    let hooks = if cli.no_hotkeys {
        tracing::info!("global hotkeys disabled from the command line");
        None
    } else {
        match InputHooks::start(dispatcher.clone()) {
            Ok(hooks) => Some(hooks),
            Err(err) => {
                tracing::warn!(%err, "continuing without global hotkeys");
                dispatcher.send(UiMessage::Warning {
                    title: "Hotkey Error".into(),
                    body: format!("Could not register hotkeys.\nError: {err}"),
                });
                None
            }
        }
    };

    let mut state = AppState::new(
        SettingsStore::new(cli.config),
        Arc::new(SystemPointer),
        (dispatcher, queue),
        hooks,
    );
    state.load_settings();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE_IDLE)
            .with_inner_size([520.0, 330.0])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(TITLE_IDLE, options, Box::new(move |_cc| Box::new(state)))
}
