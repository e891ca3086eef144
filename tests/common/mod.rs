#![allow(dead_code)]

use std::collections::HashMap;
use std::hash::Hash;

use bindoc::bson::{
	BsonDecoder, BsonEncoder, BsonError, BsonReader, BsonSchema, BsonWriter, Descriptor,
	ElementIndex, FromBson, PrimitiveKind, Result, ToBson,
};

fn missing_field(type_name: &str, field: &str) -> BsonError {
	BsonError::UnknownField { field: field.to_owned(), type_name: type_name.to_owned() }
}

fn unknown_field(type_name: &str, field: String) -> BsonError {
	BsonError::UnknownField { field, type_name: type_name.to_owned() }
}

/// Single-field wrapper, the workhorse of the round-trip tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapper<T> {
	pub value: T,
}

impl<T> Wrapper<T> {
	pub fn new(value: T) -> Self {
		Self { value }
	}
}

impl<T: BsonSchema> BsonSchema for Wrapper<T> {
	fn descriptor() -> Descriptor {
		Descriptor::structure("Wrapper", vec![("value", T::descriptor())])
	}
}

impl<T: ToBson> ToBson for Wrapper<T> {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			self.value.encode(encoder)?;
		}
		encoder.end_structure(&descriptor)
	}
}

impl<T: FromBson> FromBson for Wrapper<T> {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut value = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(_) => value = Some(T::decode(decoder)?),
				ElementIndex::Unknown(field) => return Err(unknown_field("Wrapper", field)),
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self { value: value.ok_or_else(|| missing_field("Wrapper", "value"))? })
	}
}

/// Two-field wrapper for field-order and mixed-type tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapper2<A, B> {
	pub x: A,
	pub y: B,
}

impl<A, B> Wrapper2<A, B> {
	pub fn new(x: A, y: B) -> Self {
		Self { x, y }
	}
}

impl<A: BsonSchema, B: BsonSchema> BsonSchema for Wrapper2<A, B> {
	fn descriptor() -> Descriptor {
		Descriptor::structure("Wrapper2", vec![("x", A::descriptor()), ("y", B::descriptor())])
	}
}

impl<A: ToBson, B: ToBson> ToBson for Wrapper2<A, B> {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			self.x.encode(encoder)?;
		}
		if encoder.encode_element(&descriptor, 1)? {
			self.y.encode(encoder)?;
		}
		encoder.end_structure(&descriptor)
	}
}

impl<A: FromBson, B: FromBson> FromBson for Wrapper2<A, B> {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut x = None;
		let mut y = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(0) => x = Some(A::decode(decoder)?),
				ElementIndex::Found(_) => y = Some(B::decode(decoder)?),
				ElementIndex::Unknown(field) => return Err(unknown_field("Wrapper2", field)),
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self {
			x: x.ok_or_else(|| missing_field("Wrapper2", "x"))?,
			y: y.ok_or_else(|| missing_field("Wrapper2", "y"))?,
		})
	}
}

/// List wrapper mirroring a `collection` field.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionWrapper<T> {
	pub collection: Vec<T>,
}

impl<T> CollectionWrapper<T> {
	pub fn new(collection: Vec<T>) -> Self {
		Self { collection }
	}
}

impl<T: BsonSchema> BsonSchema for CollectionWrapper<T> {
	fn descriptor() -> Descriptor {
		Descriptor::structure("CollectionWrapper", vec![(
			"collection",
			<Vec<T>>::descriptor(),
		)])
	}
}

impl<T: ToBson> ToBson for CollectionWrapper<T> {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			self.collection.encode(encoder)?;
		}
		encoder.end_structure(&descriptor)
	}
}

impl<T: FromBson> FromBson for CollectionWrapper<T> {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut collection = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(_) => collection = Some(<Vec<T>>::decode(decoder)?),
				ElementIndex::Unknown(field) => {
					return Err(unknown_field("CollectionWrapper", field));
				}
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self {
			collection: collection.ok_or_else(|| missing_field("CollectionWrapper", "collection"))?,
		})
	}
}

/// Map wrapper mirroring a `map` field.
#[derive(Debug, Clone, PartialEq)]
pub struct MapWrapper<K: Eq + Hash, V> {
	pub map: HashMap<K, V>,
}

impl<K: Eq + Hash, V> MapWrapper<K, V> {
	pub fn new(map: HashMap<K, V>) -> Self {
		Self { map }
	}
}

impl<K: BsonSchema + Eq + Hash, V: BsonSchema> BsonSchema for MapWrapper<K, V> {
	fn descriptor() -> Descriptor {
		Descriptor::structure("MapWrapper", vec![("map", <HashMap<K, V>>::descriptor())])
	}
}

impl<K: ToBson + Eq + Hash, V: ToBson> ToBson for MapWrapper<K, V> {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			self.map.encode(encoder)?;
		}
		encoder.end_structure(&descriptor)
	}
}

impl<K: FromBson + Eq + Hash, V: FromBson> FromBson for MapWrapper<K, V> {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut map = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(_) => map = Some(<HashMap<K, V>>::decode(decoder)?),
				ElementIndex::Unknown(field) => return Err(unknown_field("MapWrapper", field)),
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self { map: map.ok_or_else(|| missing_field("MapWrapper", "map"))? })
	}
}

/// Composite key for structured-map tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
	pub x: i32,
	pub y: i32,
}

impl BsonSchema for Point {
	fn descriptor() -> Descriptor {
		Descriptor::structure(
			"Point",
			vec![("x", i32::descriptor()), ("y", i32::descriptor())],
		)
	}
}

impl ToBson for Point {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			self.x.encode(encoder)?;
		}
		if encoder.encode_element(&descriptor, 1)? {
			self.y.encode(encoder)?;
		}
		encoder.end_structure(&descriptor)
	}
}

impl FromBson for Point {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut x = None;
		let mut y = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(0) => x = Some(i32::decode(decoder)?),
				ElementIndex::Found(_) => y = Some(i32::decode(decoder)?),
				ElementIndex::Unknown(field) => return Err(unknown_field("Point", field)),
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self {
			x: x.ok_or_else(|| missing_field("Point", "x"))?,
			y: y.ok_or_else(|| missing_field("Point", "y"))?,
		})
	}
}

/// Closed enum carried as its variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumClass {
	First,
	Second,
	Third,
	Fourth,
}

impl EnumClass {
	fn index(self) -> usize {
		match self {
			EnumClass::First => 0,
			EnumClass::Second => 1,
			EnumClass::Third => 2,
			EnumClass::Fourth => 3,
		}
	}
}

impl BsonSchema for EnumClass {
	fn descriptor() -> Descriptor {
		Descriptor::enumeration("EnumClass", &["FIRST", "SECOND", "THIRD", "FOURTH"])
	}
}

impl ToBson for EnumClass {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		encoder.encode_enum(&Self::descriptor(), self.index())
	}
}

impl FromBson for EnumClass {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		match decoder.decode_enum(&descriptor)? {
			0 => Ok(EnumClass::First),
			1 => Ok(EnumClass::Second),
			2 => Ok(EnumClass::Third),
			_ => Ok(EnumClass::Fourth),
		}
	}
}

/// Polymorphic union decoded through the discriminator envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum SealedClass {
	PolyOne(i32),
	PolyTwo(String),
	PolyList(Vec<i32>),
}

impl SealedClass {
	fn variant_name(&self) -> &'static str {
		match self {
			SealedClass::PolyOne(_) => "SealedClass.PolyOne",
			SealedClass::PolyTwo(_) => "SealedClass.PolyTwo",
			SealedClass::PolyList(_) => "SealedClass.PolyList",
		}
	}

	fn poly_one_descriptor() -> Descriptor {
		Descriptor::structure("SealedClass.PolyOne", vec![("value", i32::descriptor())])
	}

	fn poly_two_descriptor() -> Descriptor {
		Descriptor::structure("SealedClass.PolyTwo", vec![("value", String::descriptor())])
	}

	fn poly_list_descriptor() -> Descriptor {
		Descriptor::structure("SealedClass.PolyList", vec![("list", <Vec<i32>>::descriptor())])
	}
}

impl BsonSchema for SealedClass {
	fn descriptor() -> Descriptor {
		Descriptor::polymorphic("SealedClass")
	}
}

impl ToBson for SealedClass {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		encoder.encode_element(&descriptor, 0)?;
		encoder.encode_string(self.variant_name())?;
		encoder.encode_element(&descriptor, 1)?;
		match self {
			SealedClass::PolyOne(value) => {
				let payload = Self::poly_one_descriptor();
				encoder.begin_structure(&payload)?;
				if encoder.encode_element(&payload, 0)? {
					value.encode(encoder)?;
				}
				encoder.end_structure(&payload)?;
			}
			SealedClass::PolyTwo(value) => {
				let payload = Self::poly_two_descriptor();
				encoder.begin_structure(&payload)?;
				if encoder.encode_element(&payload, 0)? {
					value.encode(encoder)?;
				}
				encoder.end_structure(&payload)?;
			}
			SealedClass::PolyList(list) => {
				let payload = Self::poly_list_descriptor();
				encoder.begin_structure(&payload)?;
				if encoder.encode_element(&payload, 0)? {
					list.encode(encoder)?;
				}
				encoder.end_structure(&payload)?;
			}
		}
		encoder.end_structure(&descriptor)
	}
}

impl FromBson for SealedClass {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		match decoder.decode_element_index(&descriptor)? {
			ElementIndex::Found(0) => {}
			_ => return Err(missing_field("SealedClass", "type")),
		}
		let variant = decoder.decode_string()?;
		match decoder.decode_element_index(&descriptor)? {
			ElementIndex::Found(1) => {}
			_ => return Err(missing_field("SealedClass", "value")),
		}
		let value = match variant.as_str() {
			"SealedClass.PolyOne" => {
				let payload = Self::poly_one_descriptor();
				decoder.begin_structure(&payload)?;
				let mut value = None;
				loop {
					match decoder.decode_element_index(&payload)? {
						ElementIndex::Found(_) => value = Some(i32::decode(decoder)?),
						ElementIndex::Unknown(field) => {
							return Err(unknown_field("SealedClass.PolyOne", field));
						}
						ElementIndex::Done => break,
					}
				}
				decoder.end_structure(&payload)?;
				SealedClass::PolyOne(
					value.ok_or_else(|| missing_field("SealedClass.PolyOne", "value"))?,
				)
			}
			"SealedClass.PolyTwo" => {
				let payload = Self::poly_two_descriptor();
				decoder.begin_structure(&payload)?;
				let mut value = None;
				loop {
					match decoder.decode_element_index(&payload)? {
						ElementIndex::Found(_) => value = Some(String::decode(decoder)?),
						ElementIndex::Unknown(field) => {
							return Err(unknown_field("SealedClass.PolyTwo", field));
						}
						ElementIndex::Done => break,
					}
				}
				decoder.end_structure(&payload)?;
				SealedClass::PolyTwo(
					value.ok_or_else(|| missing_field("SealedClass.PolyTwo", "value"))?,
				)
			}
			"SealedClass.PolyList" => {
				let payload = Self::poly_list_descriptor();
				decoder.begin_structure(&payload)?;
				let mut list = None;
				loop {
					match decoder.decode_element_index(&payload)? {
						ElementIndex::Found(_) => list = Some(<Vec<i32>>::decode(decoder)?),
						ElementIndex::Unknown(field) => {
							return Err(unknown_field("SealedClass.PolyList", field));
						}
						ElementIndex::Done => break,
					}
				}
				decoder.end_structure(&payload)?;
				SealedClass::PolyList(
					list.ok_or_else(|| missing_field("SealedClass.PolyList", "list"))?,
				)
			}
			_ => {
				return Err(BsonError::UnknownVariant {
					variant,
					enum_name: "SealedClass".to_owned(),
				});
			}
		};
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Done => break,
				_ => return Err(missing_field("SealedClass", "end")),
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(value)
	}
}

/// Container with one semantically mapped field next to plain ones.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleMappedContainer {
	pub uuid: String,
	pub x: String,
	pub y: String,
}

impl BsonSchema for SingleMappedContainer {
	fn descriptor() -> Descriptor {
		Descriptor::structure("SingleMappedContainer", vec![
			("uuid", Descriptor::primitive("uuid", PrimitiveKind::String)),
			("x", String::descriptor()),
			("y", String::descriptor()),
		])
	}
}

impl ToBson for SingleMappedContainer {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			encoder.encode_string(&self.uuid)?;
		}
		if encoder.encode_element(&descriptor, 1)? {
			encoder.encode_string(&self.x)?;
		}
		if encoder.encode_element(&descriptor, 2)? {
			encoder.encode_string(&self.y)?;
		}
		encoder.end_structure(&descriptor)
	}
}

impl FromBson for SingleMappedContainer {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut uuid = None;
		let mut x = None;
		let mut y = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(0) => uuid = Some(decoder.decode_string()?),
				ElementIndex::Found(1) => x = Some(decoder.decode_string()?),
				ElementIndex::Found(_) => y = Some(decoder.decode_string()?),
				ElementIndex::Unknown(field) => {
					return Err(unknown_field("SingleMappedContainer", field));
				}
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self {
			uuid: uuid.ok_or_else(|| missing_field("SingleMappedContainer", "uuid"))?,
			x: x.ok_or_else(|| missing_field("SingleMappedContainer", "x"))?,
			y: y.ok_or_else(|| missing_field("SingleMappedContainer", "y"))?,
		})
	}
}

/// Date carried as epoch milliseconds in the value tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LongDateContainer {
	pub date: i64,
}

impl BsonSchema for LongDateContainer {
	fn descriptor() -> Descriptor {
		Descriptor::structure("LongDateContainer", vec![(
			"date",
			Descriptor::primitive("instant", PrimitiveKind::Long),
		)])
	}
}

impl ToBson for LongDateContainer {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			encoder.encode_long(self.date)?;
		}
		encoder.end_structure(&descriptor)
	}
}

impl FromBson for LongDateContainer {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut date = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(_) => date = Some(decoder.decode_long()?),
				ElementIndex::Unknown(field) => {
					return Err(unknown_field("LongDateContainer", field));
				}
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self { date: date.ok_or_else(|| missing_field("LongDateContainer", "date"))? })
	}
}

/// Date carried as RFC 3339 text in the value tree; nullable to cover the
/// mapped-nullable path.
#[derive(Debug, Clone, PartialEq)]
pub struct StringDateContainer {
	pub date: Option<String>,
}

impl BsonSchema for StringDateContainer {
	fn descriptor() -> Descriptor {
		Descriptor::structure("StringDateContainer", vec![(
			"date",
			Descriptor::primitive("instant.text", PrimitiveKind::String).nullable(),
		)])
	}
}

impl ToBson for StringDateContainer {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			match &self.date {
				Some(text) => encoder.encode_string(text)?,
				None => encoder.encode_null()?,
			}
		}
		encoder.end_structure(&descriptor)
	}
}

impl FromBson for StringDateContainer {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut date = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(_) => {
					date = if decoder.decode_not_null_mark()? {
						Some(Some(decoder.decode_string()?))
					} else {
						decoder.decode_null()?;
						Some(None)
					};
				}
				ElementIndex::Unknown(field) => {
					return Err(unknown_field("StringDateContainer", field));
				}
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self { date: date.ok_or_else(|| missing_field("StringDateContainer", "date"))? })
	}
}

/// Object reference carried as canonical hex text in the value tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectIdContainer {
	pub object_id: String,
}

impl BsonSchema for ObjectIdContainer {
	fn descriptor() -> Descriptor {
		Descriptor::structure("ObjectIdContainer", vec![(
			"objectId",
			Descriptor::primitive("oid", PrimitiveKind::String),
		)])
	}
}

impl ToBson for ObjectIdContainer {
	fn encode<W: BsonWriter>(&self, encoder: &mut BsonEncoder<'_, W>) -> Result<()> {
		let descriptor = Self::descriptor();
		encoder.begin_structure(&descriptor)?;
		if encoder.encode_element(&descriptor, 0)? {
			encoder.encode_string(&self.object_id)?;
		}
		encoder.end_structure(&descriptor)
	}
}

impl FromBson for ObjectIdContainer {
	fn decode<R: BsonReader>(decoder: &mut BsonDecoder<'_, R>) -> Result<Self> {
		let descriptor = Self::descriptor();
		decoder.begin_structure(&descriptor)?;
		let mut object_id = None;
		loop {
			match decoder.decode_element_index(&descriptor)? {
				ElementIndex::Found(_) => object_id = Some(decoder.decode_string()?),
				ElementIndex::Unknown(field) => {
					return Err(unknown_field("ObjectIdContainer", field));
				}
				ElementIndex::Done => break,
			}
		}
		decoder.end_structure(&descriptor)?;
		Ok(Self {
			object_id: object_id.ok_or_else(|| missing_field("ObjectIdContainer", "objectId"))?,
		})
	}
}
