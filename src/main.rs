use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::KeyEventKind;
use openwire::app::App;
use openwire::config::{Config, GeneralConfig, load_config, load_config_from_path};
use openwire::event::{Event, EventHandler};
use openwire::system::Sampler;
use openwire::{console, logging, ui};

#[derive(Parser)]
#[command(
    name = "openwire",
    version,
    about = "Network monitor: active connections, per-process bandwidth and interface totals"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Print one report to stdout and exit instead of starting the TUI
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Print one snapshot as JSON and exit
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Append tracing output to this file (filter with OPENWIRE_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli)?;

    if let Some(path) = &config.general.log_file {
        logging::init_file_logging(path)?;
    }

    if cli.once || cli.json {
        return run_console(config, cli.json).await;
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config).await;

    ratatui::restore();

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: Config) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms);
    let mut app = App::new(config);
    let mut events = EventHandler::new(tick_rate);

    terminal.draw(|frame| ui::draw(frame, &mut app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let should_draw = match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                    true
                } else {
                    false
                }
            }
            Event::Tick => {
                app.refresh_data();
                true
            }
            Event::Resize => true,
        };
        if should_draw {
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
        }
    }

    Ok(())
}

async fn run_console(config: Config, json: bool) -> Result<()> {
    let mut sampler = Sampler::primed();
    let report = async {
        if json {
            console::run_json(&mut sampler, &config.console).await
        } else {
            console::run(&mut sampler, &config.console).await
        }
    };

    tokio::select! {
        result = report => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            println!("\n\nInterrupted by user");
            Ok(())
        }
    }
}

fn load_config_for_cli(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(eyre!("config file not found: {}", path.display()));
        }
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        if rate == 0 {
            return Err(eyre!("--refresh-rate must be greater than 0"));
        }
        config.general.refresh_rate_ms = rate;
    }
    if let Some(path) = &cli.log_file {
        config.general.log_file = Some(path.clone());
    }
    if config.general.refresh_rate_ms == 0 {
        config.general.refresh_rate_ms = GeneralConfig::default().refresh_rate_ms;
    }

    Ok(config)
}
