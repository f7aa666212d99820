use std::fs;
use std::io;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pricewatch_app::cli::{Cli, Command, ConfigCommand, ProductsCommand, SettingsCommand};
use pricewatch_app::commands;
use pricewatch_app::config::AppConfig;
use pricewatch_app::dashboard::{run_report, run_tracking};
use pricewatch_app::render::TerminalObserver;
use pricewatch_engine::{Product, ProductUpdate, ReqwestApi};
use pricewatch_logging::{pw_error, pw_info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config);
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }

    if !pricewatch_logging::initialize(config.log_destination.into(), cli.log_level()) {
        eprintln!("Logging could not be initialized");
    }
    pw_info!("Using tracker service at {}", config.base_url);

    let result = run(cli, config);
    if let Err(err) = &result {
        pw_error!("{:#}", err);
    }
    result
}

fn run(cli: Cli, mut config: AppConfig) -> Result<()> {
    match cli.command {
        Command::Scrape(args) => {
            run_tracking(&config, true, args.window(), TerminalObserver::new(io::stdout()))?;
        }
        Command::Track(args) => {
            run_tracking(&config, false, args.window(), TerminalObserver::new(io::stdout()))?;
        }
        Command::Report(args) => {
            if args.include_inactive {
                config.active_only = false;
            }
            run_report(&config, args.window(), args.export, TerminalObserver::new(io::stdout()))?;
        }
        Command::Config(ConfigCommand::Show) => {
            println!("{}", config.to_ron().context("Failed to serialize config")?);
        }
        Command::Config(ConfigCommand::Init { force }) => {
            if cli.config.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", cli.config.display());
            }
            let text = AppConfig::default()
                .to_ron()
                .context("Failed to serialize config")?;
            fs::write(&cli.config, text)
                .with_context(|| format!("Failed to write {}", cli.config.display()))?;
            println!("Wrote {}", cli.config.display());
        }
        command => run_remote(command, &config)?,
    }
    Ok(())
}

/// Commands that are a single request/response against the service.
fn run_remote(command: Command, config: &AppConfig) -> Result<()> {
    let api = ReqwestApi::new(&config.api_settings()).context("Failed to set up the HTTP client")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let mut out = io::stdout();

    runtime.block_on(async {
        match command {
            Command::Products(ProductsCommand::List { search }) => {
                commands::list_products(&api, search.as_deref(), &mut out).await
            }
            Command::Products(ProductsCommand::Add {
                id,
                name,
                store,
                url,
                pack_size,
            }) => {
                let product = Product {
                    id,
                    name,
                    store,
                    url,
                    active: true,
                    pack_size,
                };
                commands::add_product(&api, product, &mut out).await
            }
            Command::Products(ProductsCommand::Update {
                id,
                name,
                store,
                url,
                pack_size,
            }) => {
                let update = ProductUpdate {
                    name,
                    store,
                    url,
                    pack_size,
                };
                commands::update_product(&api, &id, update, &mut out).await
            }
            Command::Products(ProductsCommand::Toggle { id, active }) => {
                commands::toggle_product(&api, &id, active, &mut out).await
            }
            Command::Products(ProductsCommand::Delete { id }) => {
                commands::delete_product(&api, &id, &mut out).await
            }
            Command::Settings(SettingsCommand::Show) => commands::show_settings(&api, &mut out).await,
            Command::Settings(SettingsCommand::Set { stores }) => {
                commands::set_stores(&api, stores, &mut out).await
            }
            Command::TestProduct { id, save } => commands::test_product(&api, &id, save, &mut out).await,
            other => bail!("{other:?} does not talk to the service directly"),
        }
    })
}
