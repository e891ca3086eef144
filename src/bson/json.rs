//! JSON text projection of the document tree. Field order is preserved in
//! both directions; the non-JSON token types use extended forms:
//! `{"$date": <millis>}`, `{"$oid": "<hex>"}`, and
//! `{"$binary": {"hex": "...", "subtype": <n>}}`.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::bson::error::Result;
use crate::bson::value::{BsonDocument, BsonValue};

impl BsonDocument {
	/// Parse a document from its JSON text form. The root must be an
	/// object.
	pub fn parse(text: &str) -> Result<BsonDocument> {
		Ok(serde_json::from_str(text)?)
	}

	/// Project the document to its JSON text form.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}
}

#[derive(serde::Serialize)]
struct BinaryBody {
	hex: String,
	subtype: u8,
}

impl Serialize for BsonDocument {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.len()))?;
		for (name, value) in self.iter() {
			map.serialize_entry(name, value)?;
		}
		map.end()
	}
}

impl Serialize for BsonValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			BsonValue::Double(number) => serializer.serialize_f64(*number),
			BsonValue::String(text) => serializer.serialize_str(text),
			BsonValue::Document(doc) => doc.serialize(serializer),
			BsonValue::Array(items) => serializer.collect_seq(items),
			BsonValue::Binary { subtype, bytes } => {
				let mut map = serializer.serialize_map(Some(1))?;
				map.serialize_entry(
					"$binary",
					&BinaryBody { hex: hex::encode(bytes), subtype: *subtype },
				)?;
				map.end()
			}
			BsonValue::ObjectId(bytes) => {
				let mut map = serializer.serialize_map(Some(1))?;
				map.serialize_entry("$oid", &hex::encode(bytes))?;
				map.end()
			}
			BsonValue::Boolean(flag) => serializer.serialize_bool(*flag),
			BsonValue::DateTime(millis) => {
				let mut map = serializer.serialize_map(Some(1))?;
				map.serialize_entry("$date", millis)?;
				map.end()
			}
			BsonValue::Null => serializer.serialize_unit(),
			BsonValue::Int32(number) => serializer.serialize_i32(*number),
			BsonValue::Int64(number) => serializer.serialize_i64(*number),
		}
	}
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
	type Value = BsonValue;

	fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		formatter.write_str("a JSON value")
	}

	fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<BsonValue, E> {
		Ok(BsonValue::Boolean(value))
	}

	fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<BsonValue, E> {
		Ok(int_value(value))
	}

	fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<BsonValue, E> {
		i64::try_from(value)
			.map(int_value)
			.map_err(|_| de::Error::custom(format!("integer out of range: {value}")))
	}

	fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<BsonValue, E> {
		Ok(BsonValue::Double(value))
	}

	fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<BsonValue, E> {
		Ok(BsonValue::String(value.to_owned()))
	}

	fn visit_unit<E: de::Error>(self) -> std::result::Result<BsonValue, E> {
		Ok(BsonValue::Null)
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<BsonValue, A::Error> {
		let mut items = Vec::new();
		while let Some(item) = seq.next_element::<BsonValue>()? {
			items.push(item);
		}
		Ok(BsonValue::Array(items))
	}

	fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<BsonValue, A::Error> {
		let mut doc = BsonDocument::new();
		while let Some((name, value)) = map.next_entry::<String, BsonValue>()? {
			doc.insert(name, value);
		}
		unextend(doc).map_err(de::Error::custom)
	}
}

/// Integers without a fraction parse back to the narrowest stored width.
fn int_value(value: i64) -> BsonValue {
	match i32::try_from(value) {
		Ok(narrow) => BsonValue::Int32(narrow),
		Err(_) => BsonValue::Int64(value),
	}
}

/// Recognize the extended single-field forms produced by serialization.
fn unextend(doc: BsonDocument) -> std::result::Result<BsonValue, String> {
	if doc.len() != 1 {
		return Ok(BsonValue::Document(doc));
	}
	let (name, value) = &doc.entries()[0];
	match (name.as_str(), value) {
		("$date", BsonValue::Int32(millis)) => Ok(BsonValue::DateTime(i64::from(*millis))),
		("$date", BsonValue::Int64(millis)) => Ok(BsonValue::DateTime(*millis)),
		("$oid", BsonValue::String(text)) => {
			let bytes = hex::decode(text)
				.ok()
				.and_then(|bytes| <[u8; 12]>::try_from(bytes).ok())
				.ok_or_else(|| format!("invalid object id hex: '{text}'"))?;
			Ok(BsonValue::ObjectId(bytes))
		}
		("$binary", BsonValue::Document(body)) => {
			let hex_text = match body.get("hex") {
				Some(BsonValue::String(text)) => text,
				_ => return Err("binary body is missing its hex field".to_owned()),
			};
			let subtype = match body.get("subtype") {
				Some(BsonValue::Int32(subtype)) => u8::try_from(*subtype)
					.map_err(|_| format!("invalid binary subtype: {subtype}"))?,
				_ => return Err("binary body is missing its subtype field".to_owned()),
			};
			let bytes = hex::decode(hex_text)
				.map_err(|_| format!("invalid binary hex: '{hex_text}'"))?;
			Ok(BsonValue::Binary { subtype, bytes })
		}
		_ => Ok(BsonValue::Document(doc)),
	}
}

impl<'de> Deserialize<'de> for BsonValue {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		deserializer.deserialize_any(ValueVisitor)
	}
}

impl<'de> Deserialize<'de> for BsonDocument {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		match BsonValue::deserialize(deserializer)? {
			BsonValue::Document(doc) => Ok(doc),
			other => Err(de::Error::custom(format!(
				"expected a document at the root, got {}",
				other.bson_type()
			))),
		}
	}
}
