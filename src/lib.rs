pub mod catalog;
pub mod error;
pub mod items;
pub mod pokemon;
pub mod save;
pub mod scalar;
pub mod schema;
pub mod text;
pub mod tools;
pub mod value;

pub use catalog::{Catalog, CatalogKind};
pub use error::{Error, Result};
pub use save::{DecodeOptions, SaveCodec, SaveFile};
pub use schema::{Context, Schema};
pub use text::Charset;
pub use value::{Entry, Record, Value};
