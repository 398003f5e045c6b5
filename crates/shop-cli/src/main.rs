use std::{env, fs, path::PathBuf};

use clap::Parser;
use cli::{Args, Commands};
use context::ShopContext;
use logging::setup_logging;
use miette::{Context, IntoDiagnostic};
use shop_config::config::{self, generate_default_config, get_config, Config, CONFIG_PATH};
use tracing::{info, warn};
use utils::COLOR;

mod categories;
mod cli;
mod context;
mod logging;
mod orders;
mod products;
mod users;
mod utils;

fn print_config() -> miette::Result<()> {
    let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
    let content = match fs::read_to_string(&config_path) {
        Ok(v) => v,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file {} not found", config_path.display());
            toml::to_string_pretty(&Config::default_config()).into_diagnostic()?
        }
        Err(err) => {
            return Err(err)
                .into_diagnostic()
                .with_context(|| format!("reading {}", config_path.display()));
        }
    };
    info!("{}", content);
    Ok(())
}

fn handle_cli() -> miette::Result<()> {
    let args = Args::parse();

    if args.no_color {
        let mut color = COLOR.write().unwrap();
        *color = false;
    }

    setup_logging(&args);

    if let Some(ref c) = args.config {
        let path = PathBuf::from(c);
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .into_diagnostic()
                .context("retrieving current directory")?
                .join(path)
        };
        *CONFIG_PATH.write().unwrap() = path;
    }

    match args.command {
        Commands::Config {
            init,
        } => {
            if init {
                generate_default_config()?;
            } else {
                print_config()?;
            }
        }
        command => {
            config::init()?;
            let mut ctx = ShopContext::open(get_config(), args.json)?;

            match command {
                Commands::Products {
                    action,
                } => products::handle(&mut ctx, action)?,
                Commands::Orders {
                    action,
                } => orders::handle(&mut ctx, action)?,
                Commands::Categories {
                    action,
                } => categories::handle(&mut ctx, action)?,
                Commands::Users {
                    action,
                } => users::handle(&mut ctx, action)?,
                Commands::Config {
                    ..
                } => unreachable!(),
            }
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}
