use std::fmt;

/// Binary subtype for generic byte payloads.
pub const BINARY_SUBTYPE_GENERIC: u8 = 0;
/// Binary subtype for RFC 4122 UUIDs.
pub const BINARY_SUBTYPE_UUID: u8 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
	Double(f64),
	String(String),
	Document(BsonDocument),
	Array(Vec<BsonValue>),
	Binary { subtype: u8, bytes: Vec<u8> },
	ObjectId([u8; 12]),
	Boolean(bool),
	DateTime(i64),
	Null,
	Int32(i32),
	Int64(i64),
}

impl BsonValue {
	/// Token type tag of this value.
	pub fn bson_type(&self) -> BsonType {
		match self {
			BsonValue::Double(_) => BsonType::Double,
			BsonValue::String(_) => BsonType::String,
			BsonValue::Document(_) => BsonType::Document,
			BsonValue::Array(_) => BsonType::Array,
			BsonValue::Binary { .. } => BsonType::Binary,
			BsonValue::ObjectId(_) => BsonType::ObjectId,
			BsonValue::Boolean(_) => BsonType::Boolean,
			BsonValue::DateTime(_) => BsonType::DateTime,
			BsonValue::Null => BsonType::Null,
			BsonValue::Int32(_) => BsonType::Int32,
			BsonValue::Int64(_) => BsonType::Int64,
		}
	}
}

impl From<bool> for BsonValue {
	fn from(value: bool) -> Self {
		BsonValue::Boolean(value)
	}
}

impl From<i32> for BsonValue {
	fn from(value: i32) -> Self {
		BsonValue::Int32(value)
	}
}

impl From<i64> for BsonValue {
	fn from(value: i64) -> Self {
		BsonValue::Int64(value)
	}
}

impl From<f64> for BsonValue {
	fn from(value: f64) -> Self {
		BsonValue::Double(value)
	}
}

impl From<&str> for BsonValue {
	fn from(value: &str) -> Self {
		BsonValue::String(value.to_owned())
	}
}

impl From<String> for BsonValue {
	fn from(value: String) -> Self {
		BsonValue::String(value)
	}
}

impl From<BsonDocument> for BsonValue {
	fn from(value: BsonDocument) -> Self {
		BsonValue::Document(value)
	}
}

impl From<Vec<BsonValue>> for BsonValue {
	fn from(value: Vec<BsonValue>) -> Self {
		BsonValue::Array(value)
	}
}

/// Order-preserving named-field container. Field order is semantic: a
/// polymorphic envelope keeps its discriminator as the first entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsonDocument {
	entries: Vec<(String, BsonValue)>,
}

impl BsonDocument {
	pub fn new() -> Self {
		Self { entries: Vec::new() }
	}

	/// Append a field. An existing field with the same name is not replaced;
	/// lookups return the first match.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<BsonValue>) -> &mut Self {
		self.entries.push((name.into(), value.into()));
		self
	}

	pub fn get(&self, name: &str) -> Option<&BsonValue> {
		self.entries.iter().find(|(entry, _)| entry == name).map(|(_, value)| value)
	}

	pub fn entries(&self) -> &[(String, BsonValue)] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &BsonValue)> {
		self.entries.iter().map(|(name, value)| (name.as_str(), value))
	}
}

impl From<Vec<(String, BsonValue)>> for BsonDocument {
	fn from(entries: Vec<(String, BsonValue)>) -> Self {
		Self { entries }
	}
}

/// Token type tag used by the reader/writer protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsonType {
	Double,
	String,
	Document,
	Array,
	Binary,
	ObjectId,
	Boolean,
	DateTime,
	Null,
	Int32,
	Int64,
	/// Synthetic marker returned when a container is exhausted.
	EndOfDocument,
}

impl BsonType {
	pub fn label(self) -> &'static str {
		match self {
			BsonType::Double => "double",
			BsonType::String => "string",
			BsonType::Document => "document",
			BsonType::Array => "array",
			BsonType::Binary => "binary",
			BsonType::ObjectId => "objectId",
			BsonType::Boolean => "boolean",
			BsonType::DateTime => "dateTime",
			BsonType::Null => "null",
			BsonType::Int32 => "int32",
			BsonType::Int64 => "int64",
			BsonType::EndOfDocument => "endOfDocument",
		}
	}
}

impl fmt::Display for BsonType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}
