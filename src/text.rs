//! The single-byte character set used for names in the save.
//!
//! Every byte decodes to exactly one `char`. Glyphs without a sensible Unicode
//! equivalent (control codes, the PK/MN ligatures, contractions like `'d`)
//! decode to the private-use codepoint `U+E000 + byte`, so any byte string
//! survives a decode/encode round trip.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Codepoint the string terminator byte decodes to.
pub const TERMINATOR: char = '\u{3}';

const PLACEHOLDER_BASE: u32 = 0xe000;

#[derive(Clone, Debug)]
pub struct Charset {
    decode_table: [char; 256],
    encode_table: HashMap<char, u8>,
    terminator: u8,
}

impl Charset {
    /// The table used by the US releases of Red, Blue and Yellow.
    pub fn rby_us() -> Self {
        let mut table = ['\0'; 256];
        for (byte, slot) in table.iter_mut().enumerate() {
            *slot = rby_us_glyph(byte as u8);
        }
        let encode_table = table
            .iter()
            .enumerate()
            .map(|(byte, glyph)| (*glyph, byte as u8))
            .collect();
        Self {
            decode_table: table,
            encode_table,
            terminator: 0x50,
        }
    }

    /// Builds a charset from a 256-entry table. The table must not map two
    /// bytes to the same char, otherwise encoding would be ambiguous.
    pub fn from_table(table: [char; 256], terminator: u8) -> Result<Self> {
        let mut encode_table = HashMap::with_capacity(256);
        for (byte, glyph) in table.iter().enumerate() {
            if let Some(previous) = encode_table.insert(*glyph, byte as u8) {
                log::error!("Bytes 0x{previous:02x} and 0x{byte:02x} both decode to {glyph:?}");
                return Err(Error::Encoding(format!(
                    "{glyph:?} is mapped by more than one byte"
                )));
            }
        }
        Ok(Self {
            decode_table: table,
            encode_table,
            terminator,
        })
    }

    pub fn terminator(&self) -> u8 {
        self.terminator
    }

    /// Maps every byte through the table, terminators included.
    pub fn decode(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|byte| self.decode_table[*byte as usize])
            .collect()
    }

    /// Decodes a fixed-length string field, dropping the terminator and
    /// everything after it.
    pub fn decode_field(&self, bytes: &[u8]) -> String {
        let end = bytes
            .iter()
            .position(|byte| *byte == self.terminator)
            .unwrap_or(bytes.len());
        self.decode(&bytes[..end])
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        text.chars()
            .map(|glyph| {
                self.encode_table.get(&glyph).copied().ok_or_else(|| {
                    log::error!("No byte for {glyph:?} in {text:?}");
                    Error::Encoding(format!("{glyph:?} has no byte mapping"))
                })
            })
            .collect()
    }

    /// Encodes `text` into exactly `width` bytes: the encoded text, one
    /// terminator if there is room, then zero padding.
    pub fn encode_field(&self, text: &str, width: usize) -> Result<Vec<u8>> {
        let mut encoded = self.encode(text)?;
        if encoded.len() > width {
            log::error!(
                "{text:?} needs {} bytes, field holds {width}",
                encoded.len()
            );
            return Err(Error::Encoding(format!(
                "{text:?} does not fit in {width} bytes"
            )));
        }
        if encoded.len() < width {
            encoded.push(self.terminator);
        }
        encoded.resize(width, 0x00);
        Ok(encoded)
    }
}

fn rby_us_glyph(byte: u8) -> char {
    match byte {
        0x00 => '\0',
        0x50 => TERMINATOR,
        0x6e => 'ぃ',
        0x6f => 'ぅ',
        0x70 => '‘',
        0x71 => '’',
        0x72 => '“',
        0x73 => '”',
        0x74 => '・',
        0x75 => '…',
        0x76 => 'ぁ',
        0x77 => 'ぇ',
        0x78 => 'ぉ',
        0x7a => '=',
        0x7f => ' ',
        0x80..=0x99 => (b'A' + (byte - 0x80)) as char,
        0x9a => '(',
        0x9b => ')',
        0x9c => ':',
        0x9d => ';',
        0x9e => '[',
        0x9f => ']',
        0xa0..=0xb9 => (b'a' + (byte - 0xa0)) as char,
        0xba => 'é',
        0xe0 => '\'',
        0xe3 => '-',
        0xe6 => '?',
        0xe7 => '!',
        0xe8 => '.',
        0xe9 => 'ァ',
        0xea => 'ゥ',
        0xeb => 'ェ',
        0xec => '▷',
        0xed => '▶',
        0xee => '▼',
        0xef => '♂',
        0xf1 => '×',
        0xf3 => '/',
        0xf4 => ',',
        0xf5 => '♀',
        0xf6..=0xff => (b'0' + (byte - 0xf6)) as char,
        // 0xf2 is the decimal point; it renders like 0xe8 but needs its own codepoint
        _ => placeholder(byte),
    }
}

fn placeholder(byte: u8) -> char {
    char::from_u32(PLACEHOLDER_BASE + byte as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}
