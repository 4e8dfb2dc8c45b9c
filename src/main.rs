mod auth;
mod brands;
mod config;
mod currency;
mod db;
mod ledger;
mod logging;
mod models;
mod notify;
mod run;
mod stats;
mod ui;
mod validate;

use anyhow::Result;

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().collect();
    let username = take_flag(&mut args, "--user");

    let paths = config::AppPaths::resolve()?;
    let config = config::Config::load(&paths.config_file)?;
    let env = run::Env {
        paths: &paths,
        config: &config,
        username: username.as_deref(),
    };

    match args.len() {
        1 => {
            logging::init_file(&paths.log_file)?;
            run::as_tui(&env)
        }
        _ => {
            logging::init_stderr();
            run::as_cli(&args, &env)
        }
    }
}

/// Remove `flag <value>` from `args`, returning the value.
fn take_flag(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.remove(pos);
    if pos < args.len() {
        Some(args.remove(pos))
    } else {
        None
    }
}
