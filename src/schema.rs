//! Declarative fixed-width record layouts.
//!
//! A [`Schema`] is an ordered list of named fields, each either an unsigned
//! integer or a byte string of fixed width. `unpack` slices a buffer field by
//! field and runs each raw value through the field's [`Transform`]; `pack`
//! runs the transforms backwards and concatenates the results. Byte order is
//! set once per schema; nested schemas pick their own.

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    catalog::Catalog,
    error::{Error, Result},
    items::ItemList,
    pokemon::ListKind,
    scalar::{self, BitField, Flag, Lookup},
    text::Charset,
    value::{Record, Value},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Unsigned integer of 1 to 8 bytes in the schema's byte order.
    Int(usize),
    Bytes(usize),
}

impl Layout {
    pub fn width(&self) -> usize {
        match self {
            Layout::Int(width) | Layout::Bytes(width) => *width,
        }
    }
}

/// A field's value as it sits in the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Raw {
    Int(u64),
    Bytes(Vec<u8>),
}

impl Raw {
    fn into_int(self, field: &str) -> Result<u64> {
        match self {
            Raw::Int(value) => Ok(value),
            Raw::Bytes(_) => Err(layout_mismatch(field, "integer")),
        }
    }

    fn into_bytes(self, field: &str) -> Result<Vec<u8>> {
        match self {
            Raw::Bytes(bytes) => Ok(bytes),
            Raw::Int(_) => Err(layout_mismatch(field, "byte string")),
        }
    }
}

fn layout_mismatch(field: &str, expected: &'static str) -> Error {
    log::error!("Field {field} is declared with a layout its transform cannot read");
    Error::TypeMismatch {
        field: field.to_owned(),
        expected,
    }
}

/// Tables the transforms consult. Nothing in the engine holds state of its own.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    pub charset: &'a Charset,
    pub catalog: &'a Catalog,
}

/// How a field's raw value maps to its decoded [`Value`] and back.
#[derive(Clone, Debug)]
pub enum Transform {
    /// Integer or byte string as-is.
    Raw,
    /// One byte through a catalog table.
    Enum(Lookup),
    /// Named single bits, decoded to a list of symbols.
    Flags(&'static [Flag]),
    /// Every bit range of an integer decoded into a record.
    Bits(&'static [BitField]),
    Bcd,
    /// Fixed-length terminated string.
    Text,
    /// Bitmap decoded to a set of 1-based indices.
    BitSet,
    /// Named 4-bit values, high nibble first.
    Nibbles(&'static [&'static str]),
    Nested(Box<Schema>),
    ItemList(ItemList),
    CreatureList(ListKind),
}

impl Transform {
    pub fn decode(&self, raw: Raw, field: &str, ctx: &Context) -> Result<Value> {
        let value = match self {
            Transform::Raw => match raw {
                Raw::Int(value) => Value::Int(value),
                Raw::Bytes(bytes) => Value::Bytes(bytes),
            },
            Transform::Enum(lookup) => {
                let raw = raw.into_int(field)?;
                let byte = u8::try_from(raw).map_err(|_| Error::ValueOutOfRange {
                    field: field.to_owned(),
                    value: raw,
                })?;
                lookup.decode(byte, ctx.catalog, field)?
            }
            Transform::Flags(flags) => Value::List(scalar::decode_flags(raw.into_int(field)?, flags)),
            Transform::Bits(bits) => Value::Record(scalar::decode_bits(raw.into_int(field)?, bits)),
            Transform::Bcd => Value::Int(scalar::decode_bcd(&raw.into_bytes(field)?)?),
            Transform::Text => Value::Text(ctx.charset.decode_field(&raw.into_bytes(field)?)),
            Transform::BitSet => Value::Set(scalar::decode_bitset(&raw.into_bytes(field)?)),
            Transform::Nibbles(names) => {
                Value::Record(scalar::decode_nibbles(&raw.into_bytes(field)?, names))
            }
            Transform::Nested(schema) => Value::Record(schema.unpack(&raw.into_bytes(field)?, ctx)?),
            Transform::ItemList(list) => Value::Record(list.decode(&raw.into_bytes(field)?, ctx)?),
            Transform::CreatureList(kind) => {
                Value::Record(kind.decode(&raw.into_bytes(field)?, ctx)?)
            }
        };
        Ok(value)
    }

    pub fn encode(&self, value: &Value, layout: Layout, field: &str, ctx: &Context) -> Result<Raw> {
        let width = layout.width();
        let raw = match self {
            Transform::Raw => match layout {
                Layout::Int(_) => Raw::Int(value.expect_int(field)?),
                Layout::Bytes(_) => Raw::Bytes(value.expect_bytes(field)?.to_vec()),
            },
            Transform::Enum(lookup) => Raw::Int(lookup.encode(value, ctx.catalog, field)? as u64),
            Transform::Flags(flags) => {
                Raw::Int(scalar::encode_flags(value.expect_list(field)?, flags, field)?)
            }
            Transform::Bits(bits) => {
                Raw::Int(scalar::encode_bits(value.expect_record(field)?, bits, field)?)
            }
            Transform::Bcd => Raw::Bytes(scalar::encode_bcd(value.expect_int(field)?, width, field)?),
            Transform::Text => Raw::Bytes(ctx.charset.encode_field(value.expect_text(field)?, width)?),
            Transform::BitSet => {
                Raw::Bytes(scalar::encode_bitset(value.expect_set(field)?, width, field)?)
            }
            Transform::Nibbles(names) => {
                Raw::Bytes(scalar::encode_nibbles(value.expect_record(field)?, names, field)?)
            }
            Transform::Nested(schema) => Raw::Bytes(schema.pack(value.expect_record(field)?, ctx)?),
            Transform::ItemList(list) => Raw::Bytes(list.encode(value.expect_record(field)?, ctx)?),
            Transform::CreatureList(kind) => {
                Raw::Bytes(kind.encode(value.expect_record(field)?, ctx)?)
            }
        };
        Ok(raw)
    }
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub layout: Layout,
    pub transform: Transform,
}

#[derive(Clone, Debug)]
pub struct Schema {
    name: &'static str,
    endian: Endian,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: &'static str, endian: Endian) -> Self {
        Schema {
            name,
            endian,
            fields: Vec::new(),
        }
    }

    /// Appends an integer field passed through unchanged.
    pub fn int(self, name: &'static str, width: usize) -> Self {
        self.field(name, Layout::Int(width), Transform::Raw)
    }

    /// Appends a byte string field passed through unchanged.
    pub fn bytes(self, name: &'static str, width: usize) -> Self {
        self.field(name, Layout::Bytes(width), Transform::Raw)
    }

    pub fn field(mut self, name: &'static str, layout: Layout, transform: Transform) -> Self {
        if let Layout::Int(width) = layout {
            assert!((1..=8).contains(&width), "{name}: integer width {width}");
        }
        self.fields.push(Field {
            name,
            layout,
            transform,
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Total width of all fields in bytes.
    pub fn width(&self) -> usize {
        self.fields.iter().map(|field| field.layout.width()).sum()
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let idx = self.fields.iter().position(|field| field.name == name)?;
        Some(
            self.fields[..idx]
                .iter()
                .map(|field| field.layout.width())
                .sum(),
        )
    }

    pub fn unpack(&self, bytes: &[u8], ctx: &Context) -> Result<Record> {
        let width = self.width();
        if bytes.len() != width {
            log::error!(
                "{} needs exactly {width} bytes, got {}",
                self.name,
                bytes.len()
            );
            return Err(Error::FieldWidthMismatch {
                field: self.name.to_owned(),
                expected: width,
                found: bytes.len(),
            });
        }

        let mut cursor = Cursor::new(bytes);
        let mut record = Record::new();
        for field in &self.fields {
            log::trace!(
                "Unpacking {}.{} at offset 0x{:x}",
                self.name,
                field.name,
                cursor.position()
            );
            let raw = match field.layout {
                Layout::Int(width) => Raw::Int(match self.endian {
                    Endian::Big => cursor.read_uint::<BigEndian>(width)?,
                    Endian::Little => cursor.read_uint::<LittleEndian>(width)?,
                }),
                Layout::Bytes(width) => {
                    let mut buffer = vec![0u8; width];
                    cursor.read_exact(&mut buffer)?;
                    Raw::Bytes(buffer)
                }
            };
            let value = field.transform.decode(raw, field.name, ctx)?;
            record.insert(field.name, value);
        }
        Ok(record)
    }

    /// Serializes the schema's fields from `record`; fields the schema does not
    /// declare are ignored.
    pub fn pack(&self, record: &Record, ctx: &Context) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.width());
        for field in &self.fields {
            log::trace!("Packing {}.{} at offset 0x{:x}", self.name, field.name, out.len());
            let value = record.require(field.name)?;
            let raw = field.transform.encode(value, field.layout, field.name, ctx)?;
            match (field.layout, raw) {
                (Layout::Int(width), Raw::Int(value)) => {
                    if width < 8 && value >> (8 * width) != 0 {
                        log::error!("{value} does not fit in the {width} bytes of {}", field.name);
                        return Err(Error::ValueOutOfRange {
                            field: field.name.to_owned(),
                            value,
                        });
                    }
                    match self.endian {
                        Endian::Big => out.write_uint::<BigEndian>(value, width)?,
                        Endian::Little => out.write_uint::<LittleEndian>(value, width)?,
                    }
                }
                (Layout::Bytes(width), Raw::Bytes(bytes)) => {
                    if bytes.len() != width {
                        log::error!(
                            "{}.{} produced {} bytes, expected {width}",
                            self.name,
                            field.name,
                            bytes.len()
                        );
                        return Err(Error::FieldWidthMismatch {
                            field: field.name.to_owned(),
                            expected: width,
                            found: bytes.len(),
                        });
                    }
                    out.write_all(&bytes)?;
                }
                (Layout::Int(_), Raw::Bytes(_)) => return Err(layout_mismatch(field.name, "integer")),
                (Layout::Bytes(width), Raw::Int(_)) => {
                    log::error!("{}.{} produced an integer for a byte field", self.name, field.name);
                    return Err(Error::FieldWidthMismatch {
                        field: field.name.to_owned(),
                        expected: width,
                        found: 0,
                    });
                }
            }
        }
        Ok(out)
    }
}
