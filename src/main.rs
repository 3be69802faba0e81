use anyhow::Result;
use env_logger::Env;
use welcome_merge::Config;
use welcome_merge::pipeline;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let config = Config::from_cli()?;
    pipeline::run(&config)?;
    Ok(())
}
