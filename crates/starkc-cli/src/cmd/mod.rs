use anyhow::Result;

use crate::args::{Cli, Command};

mod class_hash;
mod compile;
mod doctor;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let cfg = cli.core_config();
    match cli.command {
        Command::Compile { files, keep_going } => compile::run(&cfg, &cli.root, &files, keep_going).await,
        Command::ClassHash { file } => class_hash::run(&file).await,
        Command::Doctor => doctor::run(&cfg).await,
    }
}
