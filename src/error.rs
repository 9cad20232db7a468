pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("field {field} has no mapping for {value}")]
    UnknownEnumValue { field: String, value: String },
    #[error("cannot encode text: {0}")]
    Encoding(String),
    #[error("{field} holds {found} entries, but only {capacity} fit")]
    CapacityExceeded {
        field: String,
        capacity: usize,
        found: usize,
    },
    #[error("field {field} expected {expected} bytes, got {found}")]
    FieldWidthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },
    #[error("value {value} does not fit in {field}")]
    ValueOutOfRange { field: String, value: u64 },
    #[error("byte 0x{0:02x} is not binary-coded decimal")]
    InvalidBcd(u8),
    #[error("record has no field {0}")]
    MissingField(String),
    #[error("field {field} expected a {expected} value")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },
    #[error("stored checksum 0x{stored:02x} does not match computed 0x{computed:02x}")]
    ChecksumMismatch { stored: u8, computed: u8 },
    #[error("save image is {found} bytes, expected {expected}")]
    InvalidImageLength { expected: usize, found: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
