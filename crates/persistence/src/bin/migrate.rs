#![deny(warnings)]

use anyhow::Context;
use persistence::default_sqlite_url;
use sim_core::SimulationSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| default_sqlite_url().to_string());
    persistence::prepare_sqlite_path(&url)?;
    let pool = persistence::init_db(&url).await?;

    // Optional YAML settings file as the first argument
    let settings = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading settings file {path}"))?;
            SimulationSettings::from_yaml_str(&text)?
        }
        None => SimulationSettings::default(),
    };
    let seeded = persistence::seed_settings(&pool, &settings).await?;
    println!(
        "DB migrated at {} | settings {}",
        url,
        if seeded { "seeded" } else { "already present" }
    );
    Ok(())
}
