use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::bson::decoder::{BsonDecoder, ElementIndex};
use crate::bson::descriptor::{Descriptor, PrimitiveKind};
use crate::bson::encoder::BsonEncoder;
use crate::bson::error::{BsonError, Result};
use crate::bson::reader::BsonReader;
use crate::bson::writer::BsonWriter;

/// Shape of a type as seen by the codec: the descriptor the traversal side
/// hands to the engines. The codec never inspects the type itself.
pub trait BsonSchema {
	fn descriptor() -> Descriptor;
}

/// Traversal-side encode protocol: walk the value and drive the encoder
/// once per structural event.
pub trait ToBson: BsonSchema {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()>;
}

/// Traversal-side decode protocol: rebuild the value from the decoder's
/// structural events.
pub trait FromBson: BsonSchema + Sized {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self>;
}

macro_rules! primitive_schema {
	($ty:ty, $name:literal, $kind:ident, $encode:ident, $decode:ident) => {
		impl BsonSchema for $ty {
			fn descriptor() -> Descriptor {
				Descriptor::primitive($name, PrimitiveKind::$kind)
			}
		}

		impl ToBson for $ty {
			fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
				encoder.$encode(*self)
			}
		}

		impl FromBson for $ty {
			fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
				decoder.$decode()
			}
		}
	};
}

primitive_schema!(bool, "bool", Boolean, encode_boolean, decode_boolean);
primitive_schema!(i8, "i8", Byte, encode_byte, decode_byte);
primitive_schema!(i16, "i16", Short, encode_short, decode_short);
primitive_schema!(i32, "i32", Int, encode_int, decode_int);
primitive_schema!(i64, "i64", Long, encode_long, decode_long);
primitive_schema!(f32, "f32", Float, encode_float, decode_float);
primitive_schema!(f64, "f64", Double, encode_double, decode_double);
primitive_schema!(char, "char", Char, encode_char, decode_char);

impl BsonSchema for String {
	fn descriptor() -> Descriptor {
		Descriptor::primitive("String", PrimitiveKind::String)
	}
}

impl ToBson for String {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		encoder.encode_string(self)
	}
}

impl FromBson for String {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		decoder.decode_string()
	}
}

impl<T: BsonSchema> BsonSchema for Option<T> {
	fn descriptor() -> Descriptor {
		T::descriptor().nullable()
	}
}

impl<T: ToBson> ToBson for Option<T> {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		match self {
			Some(value) => value.encode(encoder),
			None => encoder.encode_null(),
		}
	}
}

impl<T: FromBson> FromBson for Option<T> {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		if decoder.decode_not_null_mark()? {
			Ok(Some(T::decode(decoder)?))
		} else {
			decoder.decode_null()?;
			Ok(None)
		}
	}
}

impl<T: BsonSchema> BsonSchema for Vec<T> {
	fn descriptor() -> Descriptor {
		Descriptor::list(T::descriptor())
	}
}

impl<T: ToBson> ToBson for Vec<T> {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		for (index, item) in self.iter().enumerate() {
			if encoder.encode_element(&descriptor, index)? {
				item.encode(encoder)?;
			}
		}
		encoder.end_structure(&descriptor)
	}
}

impl<T: FromBson> FromBson for Vec<T> {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut items = Vec::new();
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(_) => items.push(T::decode(decoder)?),
				ElementIndex::Unknown(field) => {
					return Err(BsonError::UnknownField {
						field,
						type_name: descriptor.name().to_owned(),
					});
				}
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(items)
	}
}

fn encode_map_entries<'a, K, V, W>(
	entries: impl Iterator<Item = (&'a K, &'a V)>,
	encoder: &mut BsonEncoder<'_, W>,
	descriptor: &Descriptor,
) -> Result<()>
where
	K: ToBson + 'a,
	V: ToBson + 'a,
	W: BsonWriter,
{
	encoder.begin_structure(descriptor)?;
	let mut index = 0;
	for (key, value) in entries {
		if encoder.encode_element(descriptor, index)? {
			key.encode(encoder)?;
		}
		index += 1;
		if encoder.encode_element(descriptor, index)? {
			value.encode(encoder)?;
		}
		index += 1;
	}
	encoder.end_structure(descriptor)
}

fn decode_map_entries<K, V, R>(
	decoder: &mut BsonDecoder<'_, R>,
	descriptor: &Descriptor,
	mut insert: impl FnMut(K, V),
) -> Result<()>
where
	K: FromBson,
	V: FromBson,
	R: BsonReader,
{
	decoder.begin_structure(descriptor)?;
	loop {
		match decoder.decode_element_index(descriptor)? {
			ElementIndex::Found(_) => {
				let key = K::decode(decoder)?;
				match decoder.decode_element_index(descriptor)? {
					ElementIndex::Found(_) => insert(key, V::decode(decoder)?),
					_ => return Err(BsonError::MapEntryMissing),
				}
			}
			ElementIndex::Unknown(field) => {
				return Err(BsonError::UnknownField {
					field,
					type_name: descriptor.name().to_owned(),
				});
			}
			ElementIndex::Done => break,
		}
	}
	decoder.end_structure(descriptor)
}

impl<K: BsonSchema, V: BsonSchema> BsonSchema for HashMap<K, V> {
	fn descriptor() -> Descriptor {
		Descriptor::map(K::descriptor(), V::descriptor())
	}
}

impl<K: ToBson, V: ToBson> ToBson for HashMap<K, V> {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		encode_map_entries(self.iter(), encoder, &Self::descriptor())
	}
}

impl<K, V> FromBson for HashMap<K, V>
where
	K: FromBson + Eq + Hash,
	V: FromBson,
{
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		let mut map = HashMap::new();
		decode_map_entries(decoder, &descriptor, |key, value| {
			map.insert(key, value);
		})?;
		Ok(map)
	}
}

impl<K: BsonSchema, V: BsonSchema> BsonSchema for BTreeMap<K, V> {
	fn descriptor() -> Descriptor {
		Descriptor::map(K::descriptor(), V::descriptor())
	}
}

impl<K: ToBson, V: ToBson> ToBson for BTreeMap<K, V> {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		encode_map_entries(self.iter(), encoder, &Self::descriptor())
	}
}

impl<K, V> FromBson for BTreeMap<K, V>
where
	K: FromBson + Ord,
	V: FromBson,
{
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		let mut map = BTreeMap::new();
		decode_map_entries(decoder, &descriptor, |key, value| {
			map.insert(key, value);
		})?;
		Ok(map)
	}
}
