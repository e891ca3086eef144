mod config;
mod decoder;
mod descriptor;
mod encoder;
mod error;
mod format;
mod json;
mod reader;
mod schema;
mod value;
mod writer;

/// Builder-validated configuration and semantic type mapping.
pub use config::{BsonConfig, BsonConfigBuilder, BsonKind, CLASS_DISCRIMINATOR};
/// Token-to-event decoding engine and element resolution outcome.
pub use decoder::{BsonDecoder, ElementIndex};
/// Expected-element-set descriptors supplied by the traversal side.
pub use descriptor::{Descriptor, Kind, PrimitiveKind};
/// Event-to-token encoding engine.
pub use encoder::BsonEncoder;
/// Error and result aliases.
pub use error::{BsonError, Result};
/// Document codec facade.
pub use format::Bson;
/// Token backend read interface and the in-memory tree reader.
pub use reader::{BsonReader, DocumentReader, ReaderState};
/// Traversal-side traits implemented per application type.
pub use schema::{BsonSchema, FromBson, ToBson};
/// Document value tree, token type tags, and binary subtypes.
pub use value::{BINARY_SUBTYPE_GENERIC, BINARY_SUBTYPE_UUID, BsonDocument, BsonType, BsonValue};
/// Token backend write interface and the in-memory tree writer.
pub use writer::{BsonWriter, DocumentWriter};
