use anyhow::{bail, Context as _};
use clap::Args;
use std::path::PathBuf;

use crate::{
    save::{SaveCodec, SaveFile, BOX_COUNT},
    value::{Record, Value},
    Catalog,
};

#[derive(Debug, Args)]
pub struct Opts {
    #[arg(short, long)]
    pub sav: PathBuf,
    /// One of trainer, party, items, current, or box1 through box12.
    #[arg(short, long)]
    pub location: String,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let codec = SaveCodec::rby_us();
    let save_file = SaveFile::new(&opts.sav)?;
    let save = save_file.decode(&codec)?;

    match opts.location.as_str() {
        "trainer" => print_trainer(&save)?,
        "party" => print_pokemon(save.record("party")?, codec.catalog())?,
        "current" => print_pokemon(save.record("current_box_pokemon")?, codec.catalog())?,
        "items" => {
            println!("Bag:");
            print_items(save.record("pocket_items")?, codec.catalog())?;
            println!("PC:");
            print_items(save.record("pc_items")?, codec.catalog())?;
        }
        location if location.starts_with("box") => {
            let box_number = location[3..]
                .parse::<usize>()
                .with_context(|| format!("invalid box location {location}"))?;
            if !(1..=BOX_COUNT).contains(&box_number) {
                bail!("box number must be between 1 and {BOX_COUNT}");
            }
            print_pokemon(save.record(&format!("box_{box_number}"))?, codec.catalog())?;
        }
        location => bail!("unknown location {location}"),
    }

    Ok(())
}

fn print_trainer(save: &Record) -> anyhow::Result<()> {
    println!("Player: {}", save.text("player_name")?);
    println!("Rival: {}", save.text("rival_name")?);
    println!("ID: {:05}", save.int("player_id")?);
    println!("Money: {}", save.int("money")?);
    println!("Coins: {}", save.int("casino_coins")?);
    let badges: Vec<String> = save
        .list("badges")?
        .iter()
        .map(|badge| match badge {
            Value::Symbol(name) => name.to_string(),
            other => format!("{other:?}"),
        })
        .collect();
    println!("Badges: {}", badges.join(", "));

    let play_time = save.record("play_time")?;
    println!(
        "Time played: {}:{:02}:{:02}",
        play_time.int("hours")?,
        play_time.int("minutes")?,
        play_time.int("seconds")?
    );
    let owned = save.require("pokedex_owned")?.as_set().map_or(0, |set| set.len());
    let seen = save.require("pokedex_seen")?.as_set().map_or(0, |set| set.len());
    println!("Pokedex: {owned} owned, {seen} seen");
    Ok(())
}

fn entry_name(value: Option<&Value>, catalog: &Catalog) -> String {
    match value {
        Some(Value::Entry(entry)) => catalog
            .name(*entry)
            .map_or_else(|| format!("#{}", entry.id), str::to_owned),
        _ => "-".to_owned(),
    }
}

fn print_pokemon(list: &Record, catalog: &Catalog) -> anyhow::Result<()> {
    for (idx, pokemon) in list.list("pokemon")?.iter().enumerate() {
        let Some(pokemon) = pokemon.as_record() else {
            continue;
        };
        let level = pokemon.int("level").or_else(|_| pokemon.int("box_level"))?;
        println!(
            "Slot {}: {} ({}) Lv. {level} OT {} [{:05}]",
            idx + 1,
            pokemon.text("name")?,
            entry_name(pokemon.get("species"), catalog),
            pokemon.text("ot_name")?,
            pokemon.int("ot_id")?,
        );
    }
    Ok(())
}

fn print_items(list: &Record, catalog: &Catalog) -> anyhow::Result<()> {
    for item in list.list("items")? {
        let Some(item) = item.as_record() else {
            continue;
        };
        println!(
            "  {} x{}",
            entry_name(item.get("item"), catalog),
            item.int("quantity")?
        );
    }
    Ok(())
}
