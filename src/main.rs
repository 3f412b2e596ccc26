use clap::{Parser, Subcommand};
use std::path::PathBuf;
use web_buttons::launcher::{Feedback, Session};
use web_buttons::plugin::PluginManager;
use web_buttons::plugins::web_buttons::activate::Activator;
use web_buttons::plugins::web_buttons::WebButtonsPlugin;
use web_buttons::settings::{self, Settings, LOG_FILE, SETTINGS_FILE};

#[derive(Parser)]
#[command(name = "wb", about = "Named web buttons for launcher hosts", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding web_buttons.json and settings.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the result list for a query without changing anything
    Query {
        #[arg(default_value = "")]
        text: String,
    },
    /// Execute a query: run the command or trigger the button
    Run {
        #[arg(default_value = "")]
        text: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let data_dir = settings::data_dir(cli.data_dir);
    let (config, settings_error) = match Settings::load(&data_dir.join(SETTINGS_FILE)) {
        Ok(config) => (config, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let log_file = config.log_to_file.then(|| data_dir.join(LOG_FILE));
    web_buttons::logging::init(cli.debug || config.debug_logging, log_file);
    if let Some(e) = settings_error {
        tracing::warn!(error = %e, "settings unreadable, logging with defaults");
    }
    tracing::debug!(data_dir = %data_dir.display(), "starting");

    let feedback = match cli.command {
        Commands::Query { text } => {
            let mut plugins = PluginManager::new();
            plugins.register(Box::new(WebButtonsPlugin::new(&data_dir)));
            Feedback::items(plugins.search(&text))
        }
        Commands::Run { text } => {
            let mut session = Session::open(&data_dir);
            let activator = Activator::from_settings(&session.settings)?;
            session.run(&text, &activator)
        }
    };
    println!("{}", serde_json::to_string(&feedback)?);
    Ok(())
}
