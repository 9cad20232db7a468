//! Creature records and the party/box lists that hold them.
//!
//! A list stores its creatures as parallel arrays: species bytes, creature
//! entries, original trainer names and nicknames. Decoding stitches each
//! creature's names back onto its record; encoding splits them out again.

use crate::{
    catalog::CatalogKind,
    error::{Error, Result},
    items::backing_bytes,
    scalar::{BitField, BitRepr, Lookup, OnUnknown},
    schema::{Context, Endian, Layout, Schema, Transform},
    value::{Record, Value},
};

/// Width of a nickname or trainer name slot.
pub const NAME_WIDTH: usize = 11;
pub const SPECIES_TERMINATOR: u8 = 0xff;

pub const PARTY_CAPACITY: usize = 6;
pub const BOX_CAPACITY: usize = 20;

pub(crate) const SPECIES: Lookup = Lookup {
    catalog: CatalogKind::Species,
    on_unknown: OnUnknown::Absent,
    none_byte: None,
};

const MOVE: Lookup = Lookup {
    catalog: CatalogKind::Move,
    on_unknown: OnUnknown::Absent,
    none_byte: Some(0),
};

const ELEMENT_TYPE: Lookup = Lookup {
    catalog: CatalogKind::Type,
    on_unknown: OnUnknown::Absent,
    none_byte: Some(0),
};

/// Sleep is a turn counter; the other conditions are single bits.
const STATUS: &[BitField] = &[
    BitField {
        name: "asleep",
        shift: 0,
        width: 3,
        repr: BitRepr::Int { bias: 0 },
    },
    BitField {
        name: "poisoned",
        shift: 3,
        width: 1,
        repr: BitRepr::Flag,
    },
    BitField {
        name: "burned",
        shift: 4,
        width: 1,
        repr: BitRepr::Flag,
    },
    BitField {
        name: "frozen",
        shift: 5,
        width: 1,
        repr: BitRepr::Flag,
    },
    BitField {
        name: "paralyzed",
        shift: 6,
        width: 1,
        repr: BitRepr::Flag,
    },
    BitField {
        name: "unused",
        shift: 7,
        width: 1,
        repr: BitRepr::Int { bias: 0 },
    },
];

const IVS: &[&str] = &["attack", "defense", "speed", "special"];

fn creature_fields(schema: Schema) -> Schema {
    schema
        .field("species", Layout::Int(1), Transform::Enum(SPECIES))
        .int("current_hp", 2)
        .int("box_level", 1)
        .field("status", Layout::Int(1), Transform::Bits(STATUS))
        .field("type_1", Layout::Int(1), Transform::Enum(ELEMENT_TYPE))
        .field("type_2", Layout::Int(1), Transform::Enum(ELEMENT_TYPE))
        .int("catch_rate", 1)
        .field("move_1", Layout::Int(1), Transform::Enum(MOVE))
        .field("move_2", Layout::Int(1), Transform::Enum(MOVE))
        .field("move_3", Layout::Int(1), Transform::Enum(MOVE))
        .field("move_4", Layout::Int(1), Transform::Enum(MOVE))
        .int("ot_id", 2)
        .int("experience", 3)
        .int("hp_ev", 2)
        .int("attack_ev", 2)
        .int("defense_ev", 2)
        .int("speed_ev", 2)
        .int("special_ev", 2)
        .field("ivs", Layout::Bytes(2), Transform::Nibbles(IVS))
        // Upper two bits of each are PP Ups applied.
        .int("move_1_pp", 1)
        .int("move_2_pp", 1)
        .int("move_3_pp", 1)
        .int("move_4_pp", 1)
}

/// 33-byte creature as stored in a box.
pub fn box_pokemon_schema() -> Schema {
    creature_fields(Schema::new("box_pokemon", Endian::Big))
}

/// 44-byte creature as stored in the party, with its computed stats.
pub fn party_pokemon_schema() -> Schema {
    creature_fields(Schema::new("party_pokemon", Endian::Big))
        .int("level", 1)
        .int("max_hp", 2)
        .int("attack", 2)
        .int("defense", 2)
        .int("speed", 2)
        .int("special", 2)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Party,
    Box,
}

impl ListKind {
    pub fn capacity(self) -> usize {
        match self {
            ListKind::Party => PARTY_CAPACITY,
            ListKind::Box => BOX_CAPACITY,
        }
    }

    pub fn pokemon_schema(self) -> Schema {
        match self {
            ListKind::Party => party_pokemon_schema(),
            ListKind::Box => box_pokemon_schema(),
        }
    }

    pub fn width(self) -> usize {
        self.header().width()
    }

    fn header(self) -> Schema {
        let capacity = self.capacity();
        let name = match self {
            ListKind::Party => "party",
            ListKind::Box => "box",
        };
        Schema::new(name, Endian::Big)
            .int("count", 1)
            .bytes("species", capacity + 1)
            .bytes("pokemon", capacity * self.pokemon_schema().width())
            .bytes("ot_names", capacity * NAME_WIDTH)
            .bytes("names", capacity * NAME_WIDTH)
    }

    /// Decodes the populated slots. A count above capacity marks a box the
    /// game has never written; it decodes as empty.
    pub fn decode(self, bytes: &[u8], ctx: &Context) -> Result<Record> {
        let header = self.header().unpack(bytes, ctx)?;
        let count = header.int("count")?;
        let species_bytes = header.require("species")?.expect_bytes("species")?;
        let pokemon_bytes = header.require("pokemon")?.expect_bytes("pokemon")?;
        let ot_names = header.require("ot_names")?.expect_bytes("ot_names")?;
        let names = header.require("names")?.expect_bytes("names")?;

        let populated = if count as usize > self.capacity() {
            log::warn!("{self:?} list count {count} exceeds capacity, treating as uninitialized");
            0
        } else {
            count as usize
        };

        let species = species_bytes[..populated]
            .iter()
            .map(|&raw| SPECIES.decode(raw, ctx.catalog, "species"))
            .collect::<Result<Vec<_>>>()?;

        let schema = self.pokemon_schema();
        let pokemon = pokemon_bytes
            .chunks_exact(schema.width())
            .zip(names.chunks_exact(NAME_WIDTH))
            .zip(ot_names.chunks_exact(NAME_WIDTH))
            .take(populated)
            .map(|((entry, name), ot_name)| {
                let mut creature = schema.unpack(entry, ctx)?;
                creature.insert("name", ctx.charset.decode_field(name));
                creature.insert("ot_name", ctx.charset.decode_field(ot_name));
                Ok(Value::Record(creature))
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Decoded {} pokemon from {self:?} list", pokemon.len());

        Ok(Record::new()
            .with("count", count)
            .with("species", species)
            .with("pokemon", pokemon)
            .with("backing", Value::Bytes(bytes.to_vec())))
    }

    /// Writes the creatures over the record's backing bytes. The species array
    /// is rebuilt from each creature's own species.
    pub fn encode(self, record: &Record, ctx: &Context) -> Result<Vec<u8>> {
        let pokemon = record.list("pokemon")?;
        let capacity = self.capacity();
        if pokemon.len() > capacity {
            log::error!(
                "{} pokemon do not fit in a {self:?} list of {capacity}",
                pokemon.len()
            );
            return Err(Error::CapacityExceeded {
                field: "pokemon".to_owned(),
                capacity,
                found: pokemon.len(),
            });
        }

        let backing = backing_bytes(record, self.width())?;
        let stored_count = record.get("count").and_then(Value::as_int).unwrap_or(0);
        if pokemon.is_empty() && stored_count as usize > capacity {
            return Ok(backing);
        }

        let mut header = self.header().unpack(&backing, ctx)?;
        let schema = self.pokemon_schema();
        let width = schema.width();
        let mut species = take_bytes(&mut header, "species")?;
        let mut entries = take_bytes(&mut header, "pokemon")?;
        let mut ot_names = take_bytes(&mut header, "ot_names")?;
        let mut names = take_bytes(&mut header, "names")?;

        for (idx, creature) in pokemon.iter().enumerate() {
            let creature = creature.expect_record("pokemon")?;
            let packed = schema.pack(creature, ctx)?;
            species[idx] = packed[0];
            entries[idx * width..(idx + 1) * width].copy_from_slice(&packed);
            overlay_name(
                &mut names[idx * NAME_WIDTH..(idx + 1) * NAME_WIDTH],
                creature.text("name")?,
                ctx,
            )?;
            overlay_name(
                &mut ot_names[idx * NAME_WIDTH..(idx + 1) * NAME_WIDTH],
                creature.text("ot_name")?,
                ctx,
            )?;
        }
        species[pokemon.len()] = SPECIES_TERMINATOR;
        log::debug!("Encoded {} pokemon into {self:?} list", pokemon.len());

        header.insert("count", pokemon.len() as u64);
        header.insert("species", Value::Bytes(species));
        header.insert("pokemon", Value::Bytes(entries));
        header.insert("ot_names", Value::Bytes(ot_names));
        header.insert("names", Value::Bytes(names));
        self.header().pack(&header, ctx)
    }
}

/// Writes the name and its terminator; whatever the slot held after that stays.
fn overlay_name(slot: &mut [u8], name: &str, ctx: &Context) -> Result<()> {
    let encoded = ctx.charset.encode_field(name, slot.len())?;
    let used = encoded
        .iter()
        .position(|&byte| byte == ctx.charset.terminator())
        .map_or(encoded.len(), |end| end + 1);
    slot[..used].copy_from_slice(&encoded[..used]);
    Ok(())
}

fn take_bytes(record: &mut Record, name: &str) -> Result<Vec<u8>> {
    match record.remove(name) {
        Some(Value::Bytes(bytes)) => Ok(bytes),
        Some(other) => other.expect_bytes(name).map(<[u8]>::to_vec),
        None => Err(Error::MissingField(name.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, text::Charset, value::Entry};

    const PIKACHU: u8 = 0x54;

    fn box_entry(species: u8, level: u8) -> Vec<u8> {
        let mut entry = vec![0u8; 33];
        entry[0] = species;
        entry[1..3].copy_from_slice(&35u16.to_be_bytes());
        entry[3] = level;
        entry[4] = 0b0000_1010;
        entry[5] = 0x15;
        entry[6] = 0x15;
        entry[8] = 84;
        entry[12..14].copy_from_slice(&12345u16.to_be_bytes());
        entry[14..17].copy_from_slice(&[0x00, 0x01, 0x2c]);
        entry[27..29].copy_from_slice(&[0xa5, 0x3f]);
        entry[29] = 30;
        entry
    }

    fn list_bytes(kind: ListKind, charset: &Charset, members: &[(u8, &str)]) -> Vec<u8> {
        let capacity = kind.capacity();
        let width = kind.pokemon_schema().width();
        let mut bytes = vec![0u8; kind.width()];
        bytes[0] = members.len() as u8;
        bytes[1 + members.len()] = SPECIES_TERMINATOR;
        let entries = 2 + capacity;
        let ot_names = entries + capacity * width;
        let names = ot_names + capacity * NAME_WIDTH;
        for (idx, (species, name)) in members.iter().enumerate() {
            bytes[1 + idx] = *species;
            let mut entry = box_entry(*species, 5);
            entry.resize(width, 0);
            bytes[entries + idx * width..][..width].copy_from_slice(&entry);
            bytes[ot_names + idx * NAME_WIDTH..][..NAME_WIDTH]
                .copy_from_slice(&charset.encode_field("ASH", NAME_WIDTH).unwrap());
            bytes[names + idx * NAME_WIDTH..][..NAME_WIDTH]
                .copy_from_slice(&charset.encode_field(name, NAME_WIDTH).unwrap());
        }
        bytes
    }

    #[test]
    fn schema_widths() {
        assert_eq!(box_pokemon_schema().width(), 33);
        assert_eq!(party_pokemon_schema().width(), 44);
        assert_eq!(ListKind::Party.width(), 404);
        assert_eq!(ListKind::Box.width(), 1122);
    }

    #[test]
    fn creature_fields_decode() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let creature = box_pokemon_schema()
            .unpack(&box_entry(PIKACHU, 12), &ctx)
            .unwrap();
        assert_eq!(creature.get("species"), Some(&Value::Entry(Entry::species(25))));
        assert_eq!(creature.int("box_level").unwrap(), 12);
        assert_eq!(creature.get("move_1"), Some(&Value::Entry(Entry::move_id(84))));
        assert_eq!(creature.get("move_2"), Some(&Value::None));
        assert_eq!(creature.int("ot_id").unwrap(), 12345);
        assert_eq!(creature.int("experience").unwrap(), 300);

        let status = creature.record("status").unwrap();
        assert_eq!(status.int("asleep").unwrap(), 2);
        assert_eq!(status.get("poisoned"), Some(&Value::Bool(true)));
        assert_eq!(status.get("burned"), Some(&Value::Bool(false)));

        let ivs = creature.record("ivs").unwrap();
        assert_eq!(ivs.int("attack").unwrap(), 0xa);
        assert_eq!(ivs.int("defense").unwrap(), 0x5);
        assert_eq!(ivs.int("speed").unwrap(), 0x3);
        assert_eq!(ivs.int("special").unwrap(), 0xf);
    }

    #[test]
    fn party_attaches_names_and_round_trips() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let bytes = list_bytes(ListKind::Party, &charset, &[(PIKACHU, "SPARKY"), (0x99, "BULBY")]);

        let party = ListKind::Party.decode(&bytes, &ctx).unwrap();
        assert_eq!(
            party.list("species").unwrap(),
            [Value::Entry(Entry::species(25)), Value::Entry(Entry::species(1))]
        );
        let pokemon = party.list("pokemon").unwrap();
        assert_eq!(pokemon.len(), 2);
        let second = pokemon[1].as_record().unwrap();
        assert_eq!(second.text("name").unwrap(), "BULBY");
        assert_eq!(second.text("ot_name").unwrap(), "ASH");

        assert_eq!(ListKind::Party.encode(&party, &ctx).unwrap(), bytes);
    }

    #[test]
    fn name_padding_survives_reencode() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let mut bytes = list_bytes(ListKind::Party, &charset, &[(PIKACHU, "PIKA")]);
        let names = ListKind::Party.width() - 6 * NAME_WIDTH;
        bytes[names + 5..names + NAME_WIDTH].fill(charset.terminator());

        let party = ListKind::Party.decode(&bytes, &ctx).unwrap();
        assert_eq!(ListKind::Party.encode(&party, &ctx).unwrap(), bytes);
    }

    #[test]
    fn uninitialized_box_is_empty_and_untouched() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let mut bytes = vec![0xffu8; ListKind::Box.width()];
        bytes[40] = 0x12;

        let record = ListKind::Box.decode(&bytes, &ctx).unwrap();
        assert!(record.list("pokemon").unwrap().is_empty());
        assert_eq!(ListKind::Box.encode(&record, &ctx).unwrap(), bytes);
    }

    #[test]
    fn party_capacity_is_six() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let members = [(PIKACHU, "PIKA"); 6];
        let full = ListKind::Party
            .decode(&list_bytes(ListKind::Party, &charset, &members), &ctx)
            .unwrap();
        assert!(ListKind::Party.encode(&full, &ctx).is_ok());

        let mut pokemon = full.list("pokemon").unwrap().to_vec();
        pokemon.push(pokemon[0].clone());
        let overfull = full.with("pokemon", pokemon);
        assert!(matches!(
            ListKind::Party.encode(&overfull, &ctx),
            Err(Error::CapacityExceeded {
                capacity: 6,
                found: 7,
                ..
            })
        ));
    }

    #[test]
    fn removing_a_member_moves_the_terminator() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let bytes = list_bytes(ListKind::Box, &charset, &[(PIKACHU, "A"), (0x99, "B")]);
        let record = ListKind::Box.decode(&bytes, &ctx).unwrap();
        let first = record.list("pokemon").unwrap()[..1].to_vec();
        let record = record.with("pokemon", first);

        let encoded = ListKind::Box.encode(&record, &ctx).unwrap();
        assert_eq!(&encoded[..4], [1, PIKACHU, SPECIES_TERMINATOR, SPECIES_TERMINATOR]);
        let decoded = ListKind::Box.decode(&encoded, &ctx).unwrap();
        assert_eq!(decoded.list("pokemon").unwrap().len(), 1);
    }
}
