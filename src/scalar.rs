//! Leaf codecs for values packed into one or a few bytes.

use std::collections::BTreeSet;

use crate::{
    catalog::{Catalog, CatalogKind},
    error::{Error, Result},
    value::{Entry, Record, Value},
};

/// Decodes packed binary-coded decimal, two digits per byte, high nibble first.
pub fn decode_bcd(bytes: &[u8]) -> Result<u64> {
    let mut total = 0u64;
    for byte in bytes {
        let (high, low) = (byte >> 4, byte & 0x0f);
        if high > 9 || low > 9 {
            log::error!("Byte 0x{byte:02x} is not a pair of decimal digits");
            return Err(Error::InvalidBcd(*byte));
        }
        total = total
            .checked_mul(100)
            .and_then(|total| total.checked_add((high * 10 + low) as u64))
            .ok_or_else(|| Error::ValueOutOfRange {
                field: "bcd".to_owned(),
                value: total,
            })?;
    }
    Ok(total)
}

pub fn encode_bcd(value: u64, width: usize, field: &str) -> Result<Vec<u8>> {
    let fits = 10u64
        .checked_pow(2 * width as u32)
        .map_or(true, |limit| value < limit);
    if !fits {
        log::error!("{value} has more than {} digits for {field}", 2 * width);
        return Err(Error::ValueOutOfRange {
            field: field.to_owned(),
            value,
        });
    }

    let mut bytes = vec![0u8; width];
    let mut rest = value;
    for byte in bytes.iter_mut().rev() {
        let low = (rest % 10) as u8;
        let high = ((rest / 10) % 10) as u8;
        *byte = (high << 4) | low;
        rest /= 100;
    }
    Ok(bytes)
}

/// Reads `bytes` as a little-endian bit array: bit `j` of byte `i` is index
/// `8 * i + j + 1`.
pub fn decode_bitset(bytes: &[u8]) -> BTreeSet<u16> {
    bytes
        .iter()
        .enumerate()
        .flat_map(|(idx, byte)| {
            (0..8)
                .filter(move |bit| (byte >> bit) & 1 != 0)
                .map(move |bit| (idx * 8 + bit) as u16 + 1)
        })
        .collect()
}

pub fn encode_bitset(indices: &BTreeSet<u16>, width: usize, field: &str) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; width];
    for index in indices {
        let position = (*index as usize).wrapping_sub(1);
        if position >= width * 8 {
            log::error!("Index {index} is outside the {} bits of {field}", width * 8);
            return Err(Error::ValueOutOfRange {
                field: field.to_owned(),
                value: *index as u64,
            });
        }
        bytes[position / 8] |= 1 << (position % 8);
    }
    Ok(bytes)
}

/// One named bit in a flag set.
#[derive(Clone, Copy, Debug)]
pub struct Flag {
    pub name: &'static str,
    pub mask: u64,
}

pub fn decode_flags(raw: u64, flags: &[Flag]) -> Vec<Value> {
    flags
        .iter()
        .filter(|flag| raw & flag.mask == flag.mask)
        .map(|flag| Value::Symbol(flag.name))
        .collect()
}

pub fn encode_flags(values: &[Value], flags: &[Flag], field: &str) -> Result<u64> {
    values.iter().try_fold(0u64, |raw, value| {
        let Value::Symbol(name) = value else {
            return Err(Error::TypeMismatch {
                field: field.to_owned(),
                expected: "symbol",
            });
        };
        let flag = flags.iter().find(|flag| flag.name == *name).ok_or_else(|| {
            log::error!("{name} is not a flag of {field}");
            Error::UnknownEnumValue {
                field: field.to_owned(),
                value: name.to_string(),
            }
        })?;
        Ok(raw | flag.mask)
    })
}

#[derive(Clone, Copy, Debug)]
pub enum BitRepr {
    Flag,
    /// Set bit means `false`.
    InvertedFlag,
    /// Stored value is the decoded value minus `bias`.
    Int { bias: u64 },
    /// Known values decode to their name; anything else decodes to an integer.
    Named(&'static [(u64, &'static str)]),
}

/// A run of `width` bits starting at bit `shift`.
#[derive(Clone, Copy, Debug)]
pub struct BitField {
    pub name: &'static str,
    pub shift: u8,
    pub width: u8,
    pub repr: BitRepr,
}

impl BitField {
    fn mask(&self) -> u64 {
        (1u64 << self.width) - 1
    }
}

pub fn decode_bits(raw: u64, fields: &[BitField]) -> Record {
    fields
        .iter()
        .map(|bits| {
            let part = (raw >> bits.shift) & bits.mask();
            let value = match bits.repr {
                BitRepr::Flag => Value::Bool(part != 0),
                BitRepr::InvertedFlag => Value::Bool(part == 0),
                BitRepr::Int { bias } => Value::Int(part + bias),
                BitRepr::Named(names) => names
                    .iter()
                    .find(|(value, _)| *value == part)
                    .map_or(Value::Int(part), |(_, name)| Value::Symbol(*name)),
            };
            (bits.name.to_owned(), value)
        })
        .collect()
}

pub fn encode_bits(record: &Record, fields: &[BitField], field: &str) -> Result<u64> {
    fields.iter().try_fold(0u64, |raw, bits| {
        let path = format!("{field}.{}", bits.name);
        let value = record.require(bits.name)?;
        let part = match (bits.repr, value) {
            (BitRepr::Flag, value) => value.expect_bool(&path)? as u64,
            (BitRepr::InvertedFlag, value) => !value.expect_bool(&path)? as u64,
            (BitRepr::Int { bias }, value) => {
                let value = value.expect_int(&path)?;
                value.checked_sub(bias).ok_or_else(|| Error::ValueOutOfRange {
                    field: path.clone(),
                    value,
                })?
            }
            (BitRepr::Named(names), Value::Symbol(name)) => names
                .iter()
                .find(|(_, candidate)| candidate == name)
                .map(|(value, _)| *value)
                .ok_or_else(|| {
                    log::error!("{name} is not a value of {path}");
                    Error::UnknownEnumValue {
                        field: path.clone(),
                        value: name.to_string(),
                    }
                })?,
            (BitRepr::Named(_), value) => value.expect_int(&path)?,
        };
        if part > bits.mask() {
            log::error!("{part} does not fit in the {} bits of {path}", bits.width);
            return Err(Error::ValueOutOfRange {
                field: path,
                value: part,
            });
        }
        Ok(raw | (part << bits.shift))
    })
}

/// Splits every byte into two named 4-bit values, high nibble first.
pub fn decode_nibbles(bytes: &[u8], names: &[&'static str]) -> Record {
    bytes
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .zip(names)
        .map(|(nibble, name)| (name.to_string(), Value::Int(nibble as u64)))
        .collect()
}

pub fn encode_nibbles(record: &Record, names: &[&'static str], field: &str) -> Result<Vec<u8>> {
    let nibbles = names
        .iter()
        .map(|name| {
            let value = record.int(name)?;
            if value > 0x0f {
                log::error!("{field}.{name} = {value} does not fit in a nibble");
                return Err(Error::ValueOutOfRange {
                    field: format!("{field}.{name}"),
                    value,
                });
            }
            Ok(value as u8)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnUnknown {
    /// Decode bytes with no catalog mapping to [`Value::None`].
    Absent,
    /// Fail with [`Error::UnknownEnumValue`].
    Reject,
}

/// How one byte maps through a catalog table.
#[derive(Clone, Copy, Debug)]
pub struct Lookup {
    pub catalog: CatalogKind,
    pub on_unknown: OnUnknown,
    /// Byte written for [`Value::None`]; without one, `None` cannot be encoded.
    pub none_byte: Option<u8>,
}

impl Lookup {
    pub fn decode(&self, raw: u8, catalog: &Catalog, field: &str) -> Result<Value> {
        match catalog.table(self.catalog).id_of(raw) {
            Some(id) => Ok(Value::Entry(Entry {
                kind: self.catalog,
                id,
            })),
            None if self.on_unknown == OnUnknown::Absent => {
                if Some(raw) != self.none_byte {
                    log::warn!("{field}: byte 0x{raw:02x} has no {:?} entry", self.catalog);
                }
                Ok(Value::None)
            }
            None => {
                log::error!("{field}: byte 0x{raw:02x} has no {:?} entry", self.catalog);
                Err(Error::UnknownEnumValue {
                    field: field.to_owned(),
                    value: format!("0x{raw:02x}"),
                })
            }
        }
    }

    pub fn encode(&self, value: &Value, catalog: &Catalog, field: &str) -> Result<u8> {
        let unknown = |value: String| {
            log::error!("{field}: {value} has no {:?} byte", self.catalog);
            Error::UnknownEnumValue {
                field: field.to_owned(),
                value,
            }
        };
        match value {
            Value::Entry(entry) if entry.kind == self.catalog => catalog
                .table(self.catalog)
                .raw_of(entry.id)
                .ok_or_else(|| unknown(format!("{:?} {}", entry.kind, entry.id))),
            Value::Entry(entry) => Err(unknown(format!("{:?} {}", entry.kind, entry.id))),
            Value::None => self.none_byte.ok_or_else(|| unknown("none".to_owned())),
            other => {
                log::error!("{field}: cannot encode a {} as a catalog entry", other.kind_name());
                Err(Error::TypeMismatch {
                    field: field.to_owned(),
                    expected: "catalog entry",
                })
            }
        }
    }
}
