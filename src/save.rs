use std::{
    io::{self, Read},
    ops::Range,
    path::{Path, PathBuf},
};

use crate::{
    catalog::Catalog,
    error::{Error, Result},
    items::ItemList,
    pokemon::ListKind,
    scalar::{BitField, BitRepr, Flag},
    schema::{Context, Endian, Layout, Schema, Transform},
    text::Charset,
    value::Record,
};

pub const SAVE_SIZE: usize = 0x8000;
/// Bytes covered by the main checksum.
pub const CHECKSUM_RANGE: Range<usize> = 0x2598..0x3523;
pub const CHECKSUM_OFFSET: usize = 0x3523;

const NAME_WIDTH: usize = 11;
const POKEDEX_WIDTH: usize = 19;
pub const BOX_COUNT: usize = 12;
const BOX_NAMES: [&str; BOX_COUNT] = [
    "box_1", "box_2", "box_3", "box_4", "box_5", "box_6", "box_7", "box_8", "box_9", "box_10",
    "box_11", "box_12",
];

const OPTIONS: &[BitField] = &[
    BitField {
        name: "battle_effects",
        shift: 7,
        width: 1,
        repr: BitRepr::InvertedFlag,
    },
    BitField {
        name: "battle_style",
        shift: 6,
        width: 1,
        repr: BitRepr::Named(&[(0, "shift"), (1, "set")]),
    },
    BitField {
        name: "sound",
        shift: 4,
        width: 2,
        repr: BitRepr::Named(&[(0, "mono"), (1, "stereo"), (2, "earphone2"), (3, "earphone3")]),
    },
    BitField {
        name: "unused",
        shift: 3,
        width: 1,
        repr: BitRepr::Int { bias: 0 },
    },
    BitField {
        name: "text_speed",
        shift: 0,
        width: 3,
        repr: BitRepr::Named(&[(1, "fast"), (3, "normal"), (5, "slow")]),
    },
];

const BADGES: &[Flag] = &[
    Flag { name: "boulder", mask: 0x01 },
    Flag { name: "cascade", mask: 0x02 },
    Flag { name: "thunder", mask: 0x04 },
    Flag { name: "rainbow", mask: 0x08 },
    Flag { name: "soul", mask: 0x10 },
    Flag { name: "marsh", mask: 0x20 },
    Flag { name: "volcano", mask: 0x40 },
    Flag { name: "earth", mask: 0x80 },
];

/// The selected box is stored zero-based in the low nibble.
const CURRENT_BOX: &[BitField] = &[
    BitField {
        name: "top_bit",
        shift: 7,
        width: 1,
        repr: BitRepr::Flag,
    },
    BitField {
        name: "unused",
        shift: 4,
        width: 3,
        repr: BitRepr::Int { bias: 0 },
    },
    BitField {
        name: "current_box",
        shift: 0,
        width: 4,
        repr: BitRepr::Int { bias: 1 },
    },
];

pub fn play_time_schema() -> Schema {
    Schema::new("play_time", Endian::Little)
        .int("hours", 2)
        .int("minutes", 1)
        .int("seconds", 1)
}

fn with_boxes(schema: Schema, names: &[&'static str]) -> Schema {
    names.iter().fold(schema, |schema, name| {
        schema.field(
            *name,
            Layout::Bytes(ListKind::Box.width()),
            Transform::CreatureList(ListKind::Box),
        )
    })
}

/// The full 32 KiB image. Regions nothing interprets are kept as raw bytes.
pub fn save_schema() -> Schema {
    let schema = Schema::new("save", Endian::Big)
        .bytes("unknown_1", CHECKSUM_RANGE.start)
        .field("player_name", Layout::Bytes(NAME_WIDTH), Transform::Text)
        .field("pokedex_owned", Layout::Bytes(POKEDEX_WIDTH), Transform::BitSet)
        .field("pokedex_seen", Layout::Bytes(POKEDEX_WIDTH), Transform::BitSet)
        .field(
            "pocket_items",
            Layout::Bytes(ItemList::POCKET.width()),
            Transform::ItemList(ItemList::POCKET),
        )
        .field("money", Layout::Bytes(3), Transform::Bcd)
        .field("rival_name", Layout::Bytes(NAME_WIDTH), Transform::Text)
        .field("options", Layout::Int(1), Transform::Bits(OPTIONS))
        .field("badges", Layout::Int(1), Transform::Flags(BADGES))
        .bytes("unknown_2", 2)
        .int("player_id", 2)
        .bytes("unknown_3", 277)
        .int("pikachu_friendship", 1)
        .bytes("unknown_4", 201)
        .field(
            "pc_items",
            Layout::Bytes(ItemList::PC.width()),
            Transform::ItemList(ItemList::PC),
        )
        .field("current_box", Layout::Int(1), Transform::Bits(CURRENT_BOX))
        .bytes("unknown_5", 3)
        .field("casino_coins", Layout::Bytes(2), Transform::Bcd)
        .bytes("unknown_6", 1179)
        .field(
            "play_time",
            Layout::Bytes(4),
            Transform::Nested(Box::new(play_time_schema())),
        )
        .bytes("unknown_7", 571)
        .field(
            "party",
            Layout::Bytes(ListKind::Party.width()),
            Transform::CreatureList(ListKind::Party),
        )
        .field(
            "current_box_pokemon",
            Layout::Bytes(ListKind::Box.width()),
            Transform::CreatureList(ListKind::Box),
        )
        .bytes("unknown_8", 1)
        .int("checksum", 1)
        .bytes("unknown_9", 2780);
    let schema = with_boxes(schema, &BOX_NAMES[..6]).bytes("unknown_10", 1460);
    with_boxes(schema, &BOX_NAMES[6..]).bytes("unknown_11", 1460)
}

/// `255 - sum(region)`, modulo 256.
pub fn checksum(region: &[u8]) -> u8 {
    region.iter().fold(0xff, |sum, byte| sum.wrapping_sub(*byte))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions {
    /// Fail with [`Error::ChecksumMismatch`] instead of ignoring a bad checksum.
    pub verify_checksum: bool,
}

/// Converts between save images and record trees.
#[derive(Clone, Debug)]
pub struct SaveCodec {
    charset: Charset,
    catalog: Catalog,
    schema: Schema,
}

impl SaveCodec {
    pub fn new(charset: Charset, catalog: Catalog) -> Self {
        SaveCodec {
            charset,
            catalog,
            schema: save_schema(),
        }
    }

    /// Codec for the US releases of Red, Blue and Yellow.
    pub fn rby_us() -> Self {
        Self::new(Charset::rby_us(), Catalog::rby_us())
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn context(&self) -> Context<'_> {
        Context {
            charset: &self.charset,
            catalog: &self.catalog,
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Record> {
        self.decode_with(bytes, DecodeOptions::default())
    }

    pub fn decode_with(&self, bytes: &[u8], options: DecodeOptions) -> Result<Record> {
        check_length(bytes)?;
        if options.verify_checksum {
            Self::verify_checksum(bytes)?;
        }
        self.schema.unpack(bytes, &self.context())
    }

    /// Packs `record` into a fresh image with a recomputed checksum.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        let mut bytes = self.schema.pack(record, &self.context())?;
        let computed = checksum(&bytes[CHECKSUM_RANGE]);
        log::debug!("Writing checksum 0x{computed:02x}");
        bytes[CHECKSUM_OFFSET] = computed;
        Ok(bytes)
    }

    pub fn verify_checksum(bytes: &[u8]) -> Result<()> {
        check_length(bytes)?;
        let stored = bytes[CHECKSUM_OFFSET];
        let computed = checksum(&bytes[CHECKSUM_RANGE]);
        if stored != computed {
            log::error!("Stored checksum 0x{stored:02x} does not match computed 0x{computed:02x}");
            return Err(Error::ChecksumMismatch { stored, computed });
        }
        Ok(())
    }
}

fn check_length(bytes: &[u8]) -> Result<()> {
    if bytes.len() != SAVE_SIZE {
        log::error!(
            "Invalid length for a game save. Found: {}, Expected: {SAVE_SIZE}",
            bytes.len()
        );
        return Err(Error::InvalidImageLength {
            expected: SAVE_SIZE,
            found: bytes.len(),
        });
    }
    Ok(())
}

/// A save image loaded from disk.
pub struct SaveFile {
    source: PathBuf,
    contents: Vec<u8>,
}

impl SaveFile {
    pub fn new(p: impl AsRef<Path>) -> Result<Self> {
        if !p.as_ref().is_file() {
            log::error!("No file at path: {}", p.as_ref().display());
            return Err(io::Error::from(io::ErrorKind::NotFound).into());
        }
        let file = std::fs::File::open(&p)?;
        let mut reader = io::BufReader::new(file);
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents)?;
        check_length(&contents)?;
        Ok(SaveFile {
            source: p.as_ref().to_path_buf(),
            contents,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn decode(&self, codec: &SaveCodec) -> Result<Record> {
        codec.decode(&self.contents)
    }

    /// Re-encodes the in-memory image from `record`. Nothing is written to
    /// disk until [`SaveFile::write_to_file`] or [`SaveFile::write_in_place`].
    pub fn replace(&mut self, codec: &SaveCodec, record: &Record) -> Result<()> {
        self.contents = codec.encode(record)?;
        Ok(())
    }

    pub fn write_to_file(&self, p: impl AsRef<Path>) -> Result<()> {
        log::info!("Writing save to {}", p.as_ref().display());
        std::fs::write(p, &self.contents)?;
        Ok(())
    }

    pub fn write_in_place(&self) -> Result<()> {
        self.write_to_file(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    /// An image as a fresh game would leave it: empty lists with terminators.
    fn blank_image() -> Vec<u8> {
        let schema = save_schema();
        let mut image = vec![0u8; SAVE_SIZE];
        for list in ["pocket_items", "pc_items", "party", "current_box_pokemon"] {
            image[schema.offset_of(list).unwrap() + 1] = 0xff;
        }
        for name in BOX_NAMES {
            image[schema.offset_of(name).unwrap() + 1] = 0xff;
        }
        image[CHECKSUM_OFFSET] = checksum(&image[CHECKSUM_RANGE]);
        image
    }

    #[test]
    fn layout_matches_memory_map() {
        let schema = save_schema();
        assert_eq!(schema.width(), SAVE_SIZE);
        assert_eq!(schema.offset_of("player_name"), Some(0x2598));
        assert_eq!(schema.offset_of("pocket_items"), Some(0x25c9));
        assert_eq!(schema.offset_of("money"), Some(0x25f3));
        assert_eq!(schema.offset_of("player_id"), Some(0x2605));
        assert_eq!(schema.offset_of("play_time"), Some(0x2ced));
        assert_eq!(schema.offset_of("party"), Some(0x2f2c));
        assert_eq!(schema.offset_of("checksum"), Some(CHECKSUM_OFFSET));
        assert_eq!(schema.offset_of("box_1"), Some(0x4000));
        assert_eq!(schema.offset_of("box_7"), Some(0x6000));
    }

    #[test]
    fn checksum_of_zeroed_region() {
        assert_eq!(checksum(&[0u8; 0x3523 - 0x2598]), 0xff);
        assert_eq!(checksum(&[1, 2, 3]), 0xf9);

        let mut region = vec![0u8; 0x3523 - 0x2598];
        region[100] = 0x40;
        assert_ne!(checksum(&region), 0xff);
    }

    #[test]
    fn blank_image_round_trips() {
        let codec = SaveCodec::rby_us();
        let image = blank_image();
        let record = codec.decode(&image).unwrap();
        assert_eq!(record.int("money").unwrap(), 0);
        assert!(record.record("party").unwrap().list("pokemon").unwrap().is_empty());
        assert_eq!(
            record.record("current_box").unwrap().int("current_box").unwrap(),
            1
        );
        assert_eq!(codec.encode(&record).unwrap(), image);
    }

    #[test]
    fn encode_recomputes_checksum() {
        let codec = SaveCodec::rby_us();
        let mut record = codec.decode(&blank_image()).unwrap();
        record.insert("money", 3000u64);
        record.insert("checksum", 0u64);
        let image = codec.encode(&record).unwrap();
        assert_eq!(&image[0x25f3..0x25f6], [0x00, 0x30, 0x00]);
        assert!(SaveCodec::verify_checksum(&image).is_ok());
    }

    #[test]
    fn strict_decode_checks_checksum() {
        let codec = SaveCodec::rby_us();
        let mut image = blank_image();
        image[0x2598] ^= 0x01;
        assert!(codec.decode(&image).is_ok());
        assert!(matches!(
            codec.decode_with(
                &image,
                DecodeOptions {
                    verify_checksum: true
                }
            ),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn options_and_badges() {
        let codec = SaveCodec::rby_us();
        let mut image = blank_image();
        let schema = save_schema();
        image[schema.offset_of("options").unwrap()] = 0b1101_0011;
        image[schema.offset_of("badges").unwrap()] = 0b0000_0101;
        let record = codec.decode(&image).unwrap();

        let options = record.record("options").unwrap();
        assert_eq!(options.get("battle_effects"), Some(&Value::Bool(false)));
        assert_eq!(options.get("battle_style"), Some(&Value::Symbol("set")));
        assert_eq!(options.get("sound"), Some(&Value::Symbol("stereo")));
        assert_eq!(options.get("text_speed"), Some(&Value::Symbol("normal")));
        assert_eq!(
            record.list("badges").unwrap(),
            [Value::Symbol("boulder"), Value::Symbol("thunder")]
        );
    }

    #[test]
    fn rejects_wrong_length() {
        let codec = SaveCodec::rby_us();
        assert!(matches!(
            codec.decode(&[0u8; 100]),
            Err(Error::InvalidImageLength { found: 100, .. })
        ));
    }
}
