use clap::Args;
use std::path::PathBuf;

use crate::save::{checksum, SaveCodec, SaveFile, CHECKSUM_OFFSET, CHECKSUM_RANGE};

#[derive(Debug, Args)]
pub struct Opts {
    #[arg(short, long)]
    pub sav: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Report {
    pub stored_checksum: u8,
    pub computed_checksum: u8,
    /// Offset of the first byte that changed when decoding and re-encoding.
    pub first_difference: Option<usize>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.stored_checksum == self.computed_checksum && self.first_difference.is_none()
    }
}

pub fn check(opts: &Opts) -> anyhow::Result<Report> {
    let codec = SaveCodec::rby_us();
    let save_file = SaveFile::new(&opts.sav)?;
    let contents = save_file.contents();

    let reencoded = codec.encode(&save_file.decode(&codec)?)?;
    let computed_checksum = checksum(&contents[CHECKSUM_RANGE]);
    // A stale checksum alone should not count as a round trip difference.
    let first_difference = contents
        .iter()
        .zip(&reencoded)
        .enumerate()
        .find(|(idx, (original, written))| *idx != CHECKSUM_OFFSET && original != written)
        .map(|(idx, _)| idx);

    Ok(Report {
        stored_checksum: contents[CHECKSUM_OFFSET],
        computed_checksum,
        first_difference,
    })
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let report = check(&opts)?;
    println!(
        "Checksum: stored 0x{:02x}, computed 0x{:02x}",
        report.stored_checksum, report.computed_checksum
    );
    match report.first_difference {
        None => println!("Round trip: identical"),
        Some(idx) => println!("Round trip: differs starting at 0x{idx:04x}"),
    }
    if !report.is_clean() {
        anyhow::bail!("{} failed verification", opts.sav.display());
    }
    Ok(())
}
