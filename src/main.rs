use clap::Parser;
use tracing::{error, info};

use marketpulse_x::app::{Config, Orchestrator};
use marketpulse_x::cli::{output, Cli, Commands, ConfigCommand, TEMPLATE_CONFIG};
use marketpulse_x::error::Result;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(err) = dispatch(cli).await {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Config(ConfigCommand::Init(args)) => config_init(args),
        Commands::Config(ConfigCommand::Validate) => config_validate(&cli.config),
        Commands::Status => status(&cli.config).await,
        Commands::Run => run(&cli).await,
    }
}

fn config_init(args: &marketpulse_x::cli::ConfigInitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        output::error(&format!("{} already exists, pass --force to overwrite", args.path.display()));
        return Ok(());
    }
    std::fs::write(&args.path, TEMPLATE_CONFIG).map_err(marketpulse_x::error::Error::Io)?;
    output::success(&format!("wrote {}", args.path.display()));
    Ok(())
}

fn config_validate(path: &std::path::Path) -> Result<()> {
    Config::load(path)?;
    output::success(&format!("{} is valid", path.display()));
    Ok(())
}

async fn status(config_path: &std::path::Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let pool = marketpulse_x::core::db::create_pool(&config.database.path)?;
    let store = marketpulse_x::core::store::SqliteStore::new(pool);

    use marketpulse_x::core::store::{IntentStore, MarketStore, RuleStore};

    let markets = store.list_markets().await?;
    let rules = store.list_rules().await?;
    let open_intents = store.count_open_intents().await?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Markets");
    output::table(
        markets
            .iter()
            .map(|m| output::MarketRow {
                market_id: m.market_id().to_string(),
                title: m.title().to_string(),
                status: format!("{:?}", m.status()),
            })
            .collect(),
    );

    output::section("Rules");
    output::table(
        rules
            .iter()
            .map(|r| output::RuleRow {
                rule: r.rule_id().to_string(),
                rule_type: r.rule_type().as_str().to_string(),
                enabled: r.enabled(),
            })
            .collect(),
    );

    output::section("Intents");
    output::field("open", open_intents);
    println!();

    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(&cli.config)?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.init_logging();

    info!("marketpulse-x starting");
    match Orchestrator::run_with_shutdown(config).await {
        Ok(()) => {
            info!("marketpulse-x stopped");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "fatal error");
            Err(err)
        }
    }
}
