//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::SourceKind;
use crate::store::TopicStore;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
    pub force: bool,
}

/// Write the default configuration and create the database
pub async fn cmd_init(options: InitOptions) -> Result<Config> {
    let InitOptions {
        base_dir,
        config_path,
        force,
    } = options;

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    let mut config = Config::default();
    config.init_paths(Some(base_dir));
    config.paths.config_file = config_path;
    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    let store = TopicStore::connect(&config).await?;
    store.close().await;
    info!("Created database at {:?}", config.paths.db_file);

    Ok(config)
}

pub fn print_init(config: &Config) {
    println!("✓ Initialized newsledger at {:?}", config.paths.base_dir);
    println!("\nConfiguration: {:?}", config.paths.config_file);
    println!("Database: {:?}", config.paths.db_file);
    println!("\nAPI keys are read from the environment:");
    for (env, sources) in key_variables(config) {
        println!("  {:<20} {}", env, sources.join(", "));
    }
    println!("\nNext steps:");
    println!("  newsledger ingest \"Donald Trump\"   # Fetch and store a topic");
    println!("  newsledger report --csv out.csv    # Count records per source");
}

/// Each configured key variable with the sources reading it
fn key_variables(config: &Config) -> Vec<(&str, Vec<&'static str>)> {
    let mut vars: Vec<(&str, Vec<&'static str>)> = Vec::new();
    for source in SourceKind::ALL {
        let env = config.sources.api_key_env(source);
        match vars.iter_mut().find(|(name, _)| *name == env) {
            Some((_, sources)) => sources.push(source.display_name()),
            None => vars.push((env, vec![source.display_name()])),
        }
    }
    vars
}
