//! Bag and PC item lists: a count byte, `(item, quantity)` pairs and a `0xFF`
//! terminator after the last populated pair.

use crate::{
    catalog::CatalogKind,
    error::{Error, Result},
    scalar::{Lookup, OnUnknown},
    schema::{Context, Endian, Layout, Schema, Transform},
    value::{Record, Value},
};

pub const LIST_TERMINATOR: u8 = 0xff;

const ITEM: Lookup = Lookup {
    catalog: CatalogKind::Item,
    on_unknown: OnUnknown::Absent,
    none_byte: None,
};

pub fn item_entry_schema() -> Schema {
    Schema::new("item_entry", Endian::Big)
        .field("item", Layout::Int(1), Transform::Enum(ITEM))
        .int("quantity", 1)
}

/// An item list holding up to `capacity` entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemList {
    capacity: usize,
}

impl ItemList {
    pub const POCKET: ItemList = ItemList { capacity: 20 };
    pub const PC: ItemList = ItemList { capacity: 50 };

    pub fn new(capacity: usize) -> Self {
        ItemList { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count byte, the pairs, and one byte for the terminator when full.
    pub fn width(&self) -> usize {
        2 * self.capacity + 2
    }

    fn header(&self) -> Schema {
        Schema::new("item_list", Endian::Big)
            .int("count", 1)
            .bytes("entries", 2 * self.capacity + 1)
    }

    pub fn decode(&self, bytes: &[u8], ctx: &Context) -> Result<Record> {
        let header = self.header().unpack(bytes, ctx)?;
        let count = header.int("count")?;
        let entries = header.require("entries")?.expect_bytes("entries")?;

        let mut items = Vec::new();
        if count as usize > self.capacity {
            log::warn!(
                "Item list count {count} exceeds capacity {}, treating as empty",
                self.capacity
            );
        } else {
            let schema = item_entry_schema();
            for pair in entries.chunks_exact(2).take(count as usize) {
                items.push(Value::Record(schema.unpack(pair, ctx)?));
            }
        }
        log::debug!("Decoded {} item(s)", items.len());

        Ok(Record::new()
            .with("count", count)
            .with("items", items)
            .with("backing", Value::Bytes(bytes.to_vec())))
    }

    pub fn encode(&self, record: &Record, ctx: &Context) -> Result<Vec<u8>> {
        let items = record.list("items")?;
        if items.len() > self.capacity {
            log::error!(
                "{} items do not fit in a list of {}",
                items.len(),
                self.capacity
            );
            return Err(Error::CapacityExceeded {
                field: "items".to_owned(),
                capacity: self.capacity,
                found: items.len(),
            });
        }

        let backing = backing_bytes(record, self.width())?;
        let stored_count = record.get("count").and_then(Value::as_int).unwrap_or(0);
        if items.is_empty() && stored_count as usize > self.capacity {
            return Ok(backing);
        }

        let mut entries = backing[1..].to_vec();
        let schema = item_entry_schema();
        for (idx, item) in items.iter().enumerate() {
            let pair = schema.pack(item.expect_record("items")?, ctx)?;
            entries[2 * idx..2 * idx + 2].copy_from_slice(&pair);
        }
        entries[2 * items.len()] = LIST_TERMINATOR;

        let header = Record::new()
            .with("count", items.len() as u64)
            .with("entries", Value::Bytes(entries));
        self.header().pack(&header, ctx)
    }
}

/// The raw bytes a list record was decoded from, or zeros for a list built
/// from scratch.
pub(crate) fn backing_bytes(record: &Record, width: usize) -> Result<Vec<u8>> {
    match record.get("backing") {
        None => Ok(vec![0u8; width]),
        Some(value) => {
            let bytes = value.expect_bytes("backing")?;
            if bytes.len() != width {
                log::error!("List backing is {} bytes, expected {width}", bytes.len());
                return Err(Error::FieldWidthMismatch {
                    field: "backing".to_owned(),
                    expected: width,
                    found: bytes.len(),
                });
            }
            Ok(bytes.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, text::Charset, value::Entry};

    fn item(id: u16, quantity: u64) -> Value {
        Value::Record(
            Record::new()
                .with("item", Entry::item(id))
                .with("quantity", quantity),
        )
    }

    #[test]
    fn decodes_pairs_up_to_count() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let mut bytes = vec![0u8; ItemList::POCKET.width()];
        bytes[..6].copy_from_slice(&[2, 0x04, 5, 0x14, 3, LIST_TERMINATOR]);

        let record = ItemList::POCKET.decode(&bytes, &ctx).unwrap();
        assert_eq!(record.list("items").unwrap(), [item(0x04, 5), item(0x14, 3)]);
        assert_eq!(ItemList::POCKET.encode(&record, &ctx).unwrap(), bytes);
    }

    #[test]
    fn empty_list_writes_count_and_terminator() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let record = Record::new().with("items", Vec::<Value>::new());
        let bytes = ItemList::PC.encode(&record, &ctx).unwrap();
        assert_eq!(bytes.len(), 102);
        assert_eq!(&bytes[..2], [0, LIST_TERMINATOR]);
        assert!(bytes[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn shrinking_keeps_stale_pairs() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let mut bytes = vec![0u8; ItemList::POCKET.width()];
        bytes[..6].copy_from_slice(&[2, 0x04, 5, 0x14, 3, LIST_TERMINATOR]);
        let mut record = ItemList::POCKET.decode(&bytes, &ctx).unwrap();
        record.insert("items", vec![item(0x04, 5)]);

        let encoded = ItemList::POCKET.encode(&record, &ctx).unwrap();
        assert_eq!(&encoded[..6], [1, 0x04, 5, LIST_TERMINATOR, 3, LIST_TERMINATOR]);
    }

    #[test]
    fn rejects_overfull_list() {
        let charset = Charset::rby_us();
        let catalog = Catalog::rby_us();
        let ctx = Context {
            charset: &charset,
            catalog: &catalog,
        };
        let record = Record::new().with("items", vec![item(0x04, 1); 21]);
        assert!(matches!(
            ItemList::POCKET.encode(&record, &ctx),
            Err(Error::CapacityExceeded {
                capacity: 20,
                found: 21,
                ..
            })
        ));
    }
}
