//! Lookup tables mapping raw save bytes to species, moves, types and items.
//!
//! The tables are plain configuration handed to the codec through a
//! [`crate::schema::Context`]; tests and other game revisions can build their
//! own with [`Table::from_pairs`].

use std::collections::{BTreeMap, HashMap};

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::value::Entry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatalogKind {
    Species,
    Move,
    Type,
    Item,
}

/// A bidirectional raw byte <-> canonical id table with optional names.
#[derive(Clone, Debug, Default)]
pub struct Table {
    by_raw: BTreeMap<u8, u16>,
    by_id: BTreeMap<u16, u8>,
    names: HashMap<u16, String>,
}

impl Table {
    /// Builds a table from `(raw byte, canonical id)` pairs. If two bytes share
    /// an id the first one is used when encoding.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u8, u16)>) -> Self {
        let mut table = Table::default();
        for (raw, id) in pairs {
            table.by_raw.insert(raw, id);
            table.by_id.entry(id).or_insert(raw);
        }
        table
    }

    pub fn with_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = (u16, S)>) -> Self {
        self.names
            .extend(names.into_iter().map(|(id, name)| (id, name.into())));
        self
    }

    pub fn id_of(&self, raw: u8) -> Option<u16> {
        self.by_raw.get(&raw).copied()
    }

    pub fn raw_of(&self, id: u16) -> Option<u8> {
        self.by_id.get(&id).copied()
    }

    pub fn name_of(&self, id: u16) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn id_named(&self, name: &str) -> Option<u16> {
        self.names
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.by_raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_raw.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub species: Table,
    pub moves: Table,
    pub types: Table,
    pub items: Table,
}

impl Catalog {
    /// Tables for the US releases of Red, Blue and Yellow. Species are keyed
    /// by their internal index and identified by national dex number; the
    /// unused internal slots are left out so they decode as absent.
    pub fn rby_us() -> Self {
        let species = Table::from_pairs(SPECIES_INDEX.iter().copied()).with_names(
            SPECIES_NAMES
                .iter()
                .enumerate()
                .map(|(idx, name)| (idx as u16 + 1, *name)),
        );

        let moves = Table::from_pairs((1..=NUMBER_OF_MOVES).map(|id| (id, id as u16)));

        let element_types: Vec<(u8, ElementType)> = (0..=u8::MAX)
            .filter_map(|raw| ElementType::from_u8(raw).map(|kind| (raw, kind)))
            .collect();
        let types = Table::from_pairs(element_types.iter().map(|(raw, _)| (*raw, *raw as u16)))
            .with_names(
                element_types
                    .iter()
                    .map(|(raw, kind)| (*raw as u16, format!("{kind:?}"))),
            );

        let items = Table::from_pairs(
            (0x01..=0x61u8)
                .chain(0xc4..=0xfa)
                .map(|id| (id, id as u16)),
        )
        .with_names(
            (0xc4..=0xc8u16)
                .map(|id| (id, format!("HM{:02}", id - 0xc3)))
                .chain((0xc9..=0xfau16).map(|id| (id, format!("TM{:02}", id - 0xc8)))),
        );

        Catalog {
            species,
            moves,
            types,
            items,
        }
    }

    pub fn table(&self, kind: CatalogKind) -> &Table {
        match kind {
            CatalogKind::Species => &self.species,
            CatalogKind::Move => &self.moves,
            CatalogKind::Type => &self.types,
            CatalogKind::Item => &self.items,
        }
    }

    pub fn name(&self, entry: Entry) -> Option<&str> {
        self.table(entry.kind).name_of(entry.id)
    }
}

const NUMBER_OF_MOVES: u8 = 165;

#[derive(FromPrimitive, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    Normal = 0x00,
    Fighting = 0x01,
    Flying = 0x02,
    Poison = 0x03,
    Ground = 0x04,
    Rock = 0x05,
    Bug = 0x07,
    Ghost = 0x08,
    Fire = 0x14,
    Water = 0x15,
    Grass = 0x16,
    Electric = 0x17,
    Psychic = 0x18,
    Ice = 0x19,
    Dragon = 0x1a,
}

/// Internal species index -> national dex number.
const SPECIES_INDEX: [(u8, u16); 151] = [
    (0x01, 112), (0x02, 115), (0x03, 32), (0x04, 35), (0x05, 21),
    (0x06, 100), (0x07, 34), (0x08, 80), (0x09, 2), (0x0a, 103),
    (0x0b, 108), (0x0c, 102), (0x0d, 88), (0x0e, 94), (0x0f, 29),
    (0x10, 31), (0x11, 104), (0x12, 111), (0x13, 131), (0x14, 59),
    (0x15, 151), (0x16, 130), (0x17, 90), (0x18, 72), (0x19, 92),
    (0x1a, 123), (0x1b, 120), (0x1c, 9), (0x1d, 127), (0x1e, 114),
    (0x21, 58), (0x22, 95), (0x23, 22), (0x24, 16), (0x25, 79),
    (0x26, 64), (0x27, 75), (0x28, 113), (0x29, 67), (0x2a, 122),
    (0x2b, 106), (0x2c, 107), (0x2d, 24), (0x2e, 47), (0x2f, 54),
    (0x30, 96), (0x31, 76), (0x33, 126), (0x35, 125), (0x36, 82),
    (0x37, 109), (0x39, 56), (0x3a, 86), (0x3b, 50), (0x3c, 128),
    (0x40, 83), (0x41, 48), (0x42, 149), (0x46, 84), (0x47, 60),
    (0x48, 124), (0x49, 146), (0x4a, 144), (0x4b, 145), (0x4c, 132),
    (0x4d, 52), (0x4e, 98), (0x52, 37), (0x53, 38), (0x54, 25),
    (0x55, 26), (0x58, 147), (0x59, 148), (0x5a, 140), (0x5b, 141),
    (0x5c, 116), (0x5d, 117), (0x60, 27), (0x61, 28), (0x62, 138),
    (0x63, 139), (0x64, 39), (0x65, 40), (0x66, 133), (0x67, 136),
    (0x68, 135), (0x69, 134), (0x6a, 66), (0x6b, 41), (0x6c, 23),
    (0x6d, 46), (0x6e, 61), (0x6f, 62), (0x70, 13), (0x71, 14),
    (0x72, 15), (0x74, 85), (0x75, 57), (0x76, 51), (0x77, 49),
    (0x78, 87), (0x7b, 10), (0x7c, 11), (0x7d, 12), (0x7e, 68),
    (0x80, 55), (0x81, 97), (0x82, 42), (0x83, 150), (0x84, 143),
    (0x85, 129), (0x88, 89), (0x8a, 99), (0x8b, 91), (0x8d, 101),
    (0x8e, 36), (0x8f, 110), (0x90, 53), (0x91, 105), (0x93, 93),
    (0x94, 63), (0x95, 65), (0x96, 17), (0x97, 18), (0x98, 121),
    (0x99, 1), (0x9a, 3), (0x9b, 73), (0x9d, 118), (0x9e, 119),
    (0xa3, 77), (0xa4, 78), (0xa5, 19), (0xa6, 20), (0xa7, 33),
    (0xa8, 30), (0xa9, 74), (0xaa, 137), (0xab, 142), (0xad, 81),
    (0xb0, 4), (0xb1, 7), (0xb2, 5), (0xb3, 8), (0xb4, 6),
    (0xb9, 43), (0xba, 44), (0xbb, 45), (0xbc, 69), (0xbd, 70),
    (0xbe, 71),
];

const SPECIES_NAMES: [&str; 151] = [
    "Bulbasaur", "Ivysaur", "Venusaur", "Charmander", "Charmeleon",
    "Charizard", "Squirtle", "Wartortle", "Blastoise", "Caterpie",
    "Metapod", "Butterfree", "Weedle", "Kakuna", "Beedrill",
    "Pidgey", "Pidgeotto", "Pidgeot", "Rattata", "Raticate",
    "Spearow", "Fearow", "Ekans", "Arbok", "Pikachu",
    "Raichu", "Sandshrew", "Sandslash", "Nidoran♀", "Nidorina",
    "Nidoqueen", "Nidoran♂", "Nidorino", "Nidoking", "Clefairy",
    "Clefable", "Vulpix", "Ninetales", "Jigglypuff", "Wigglytuff",
    "Zubat", "Golbat", "Oddish", "Gloom", "Vileplume",
    "Paras", "Parasect", "Venonat", "Venomoth", "Diglett",
    "Dugtrio", "Meowth", "Persian", "Psyduck", "Golduck",
    "Mankey", "Primeape", "Growlithe", "Arcanine", "Poliwag",
    "Poliwhirl", "Poliwrath", "Abra", "Kadabra", "Alakazam",
    "Machop", "Machoke", "Machamp", "Bellsprout", "Weepinbell",
    "Victreebel", "Tentacool", "Tentacruel", "Geodude", "Graveler",
    "Golem", "Ponyta", "Rapidash", "Slowpoke", "Slowbro",
    "Magnemite", "Magneton", "Farfetch'd", "Doduo", "Dodrio",
    "Seel", "Dewgong", "Grimer", "Muk", "Shellder",
    "Cloyster", "Gastly", "Haunter", "Gengar", "Onix",
    "Drowzee", "Hypno", "Krabby", "Kingler", "Voltorb",
    "Electrode", "Exeggcute", "Exeggutor", "Cubone", "Marowak",
    "Hitmonlee", "Hitmonchan", "Lickitung", "Koffing", "Weezing",
    "Rhyhorn", "Rhydon", "Chansey", "Tangela", "Kangaskhan",
    "Horsea", "Seadra", "Goldeen", "Seaking", "Staryu",
    "Starmie", "Mr. Mime", "Scyther", "Jynx", "Electabuzz",
    "Magmar", "Pinsir", "Tauros", "Magikarp", "Gyarados",
    "Lapras", "Ditto", "Eevee", "Vaporeon", "Jolteon",
    "Flareon", "Porygon", "Omanyte", "Omastar", "Kabuto",
    "Kabutops", "Aerodactyl", "Snorlax", "Articuno", "Zapdos",
    "Moltres", "Dratini", "Dragonair", "Dragonite", "Mewtwo",
    "Mew",
];
