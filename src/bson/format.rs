use crate::bson::config::BsonConfig;
use crate::bson::decoder::BsonDecoder;
use crate::bson::encoder::BsonEncoder;
use crate::bson::error::Result;
use crate::bson::reader::DocumentReader;
use crate::bson::schema::{FromBson, ToBson};
use crate::bson::value::BsonDocument;

/// Document codec facade: one immutable configuration shared by any number
/// of encode/decode calls. Each call owns a fresh engine instance.
#[derive(Debug, Clone, Default)]
pub struct Bson {
	configuration: BsonConfig,
}

impl Bson {
	pub fn new(configuration: BsonConfig) -> Self {
		Self { configuration }
	}

	pub fn configuration(&self) -> &BsonConfig {
		&self.configuration
	}

	/// Encode a value tree into a document.
	pub fn encode_to_document<T: ToBson>(&self, value: &T) -> Result<BsonDocument> {
		let mut encoder = BsonEncoder::new(&self.configuration);
		value.encode(&mut encoder)?;
		encoder.into_document()
	}

	/// Reconstruct a value tree from a document.
	pub fn decode_from_document<T: FromBson>(&self, document: &BsonDocument) -> Result<T> {
		let mut decoder = BsonDecoder::new(DocumentReader::new(document), &self.configuration);
		T::decode(&mut decoder)
	}

	/// Encode a value tree and project the document to its JSON text form.
	pub fn encode_to_string<T: ToBson>(&self, value: &T) -> Result<String> {
		self.encode_to_document(value)?.to_json()
	}

	/// Parse the JSON text form of a document and decode a value tree.
	pub fn decode_from_string<T: FromBson>(&self, text: &str) -> Result<T> {
		self.decode_from_document(&BsonDocument::parse(text)?)
	}
}
