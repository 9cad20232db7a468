use clap::Args;
use std::path::PathBuf;

use crate::save::{SaveCodec, SaveFile};

#[derive(Debug, Args)]
pub struct Opts {
    #[arg(short, long)]
    pub sav: PathBuf,
    /// New player name, up to 7 characters in game.
    #[arg(short, long)]
    pub player: String,
    /// Write here instead of overwriting the input save.
    #[arg(short, long)]
    pub dest: Option<PathBuf>,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let codec = SaveCodec::rby_us();
    let mut save_file = SaveFile::new(&opts.sav)?;
    let mut save = save_file.decode(&codec)?;

    let previous = save.insert("player_name", opts.player.as_str());
    log::info!("Renaming player from {previous:?} to {}", opts.player);
    save_file.replace(&codec, &save)?;

    match &opts.dest {
        Some(dest) => save_file.write_to_file(dest)?,
        None => save_file.write_in_place()?,
    }
    Ok(())
}
