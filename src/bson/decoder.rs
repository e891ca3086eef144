use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::bson::config::{BsonConfig, BsonKind};
use crate::bson::descriptor::{Descriptor, Kind};
use crate::bson::error::{BsonError, Result};
use crate::bson::reader::{BsonReader, ReaderState};
use crate::bson::value::{BsonType, BINARY_SUBTYPE_UUID};

/// Outcome of a next-element request against the expected element set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementIndex {
	/// Next element resolved to this index.
	Found(usize),
	/// The backend holds a field name with no matching element; resolving
	/// it is the traversal side's concern.
	Unknown(String),
	/// The current container is exhausted.
	Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
	Document,
	List,
	StructuredMap,
	MapKey,
	MapValue,
	Polymorphic,
}

/// Finite-state engine translating backend tokens into the structural
/// events the traversal side expects.
///
/// An instance is owned by one top-level decode call: it is driven once per
/// structural event, mutates its state and stack as containers open and
/// close, and is discarded afterwards. Not reusable, not thread-safe.
pub struct BsonDecoder<'c, R> {
	reader: R,
	conf: &'c BsonConfig,
	state: DecoderState,
	frames: Vec<(DecoderState, usize)>,
	index: usize,
	mapper: BsonKind,
}

impl<'c, R: BsonReader> BsonDecoder<'c, R> {
	pub fn new(reader: R, conf: &'c BsonConfig) -> Self {
		Self {
			reader,
			conf,
			state: DecoderState::Document,
			frames: Vec::new(),
			index: 0,
			mapper: BsonKind::Passthrough,
		}
	}

	/// Open the container the traversal side is about to fill.
	pub fn begin_structure(&mut self, descriptor: &Descriptor) -> Result<()> {
		// A map-value state is preserved as map-key so the parent resumes
		// at the next key once this container closes.
		let preserved = if self.state == DecoderState::MapValue {
			DecoderState::MapKey
		} else {
			self.state
		};
		self.frames.push((preserved, self.index));

		match descriptor.kind() {
			Kind::List => {
				self.state = DecoderState::List;
				self.index = 0;
				self.reader.read_start_array()
			}
			Kind::Map => {
				if descriptor.element(0).kind().is_composite() {
					if !self.conf.allow_structured_map_keys() {
						let key = descriptor.element(0);
						return Err(BsonError::InvalidMapKey {
							type_name: key.name().to_owned(),
							kind: key.kind().label(),
						});
					}
					self.state = DecoderState::StructuredMap;
					self.index = 0;
					self.reader.read_start_array()
				} else {
					self.state = DecoderState::MapKey;
					self.reader.read_start_document()
				}
			}
			Kind::Polymorphic => {
				self.state = DecoderState::Polymorphic;
				self.index = 0;
				self.reader.read_start_document()
			}
			Kind::Struct => {
				if self.state != DecoderState::Polymorphic {
					self.reader.read_start_document()?;
				}
				self.state = DecoderState::Document;
				Ok(())
			}
			kind @ (Kind::Primitive(_) | Kind::Enum) => {
				Err(BsonError::UnsupportedKind { kind: kind.label() })
			}
		}
	}

	/// Close the current container and restore the parent context.
	pub fn end_structure(&mut self, descriptor: &Descriptor) -> Result<()> {
		let (state, index) = self.frames.pop().ok_or(BsonError::ReadOutOfTurn {
			op: "end_structure",
			state: self.reader.state(),
		})?;
		self.state = state;
		self.index = index;

		match descriptor.kind() {
			Kind::List => self.reader.read_end_array(),
			Kind::Map => {
				// Structured maps were opened as arrays; plain maps as
				// documents. Close with the matching token.
				if self.reader.state() == ReaderState::EndOfArray {
					self.reader.read_end_array()
				} else {
					self.reader.read_end_document()
				}
			}
			Kind::Struct => self.reader.read_end_document(),
			Kind::Polymorphic | Kind::Primitive(_) | Kind::Enum => Ok(()),
		}
	}

	/// Resolve the next element of the current container, or report that
	/// the container is exhausted.
	pub fn decode_element_index(&mut self, descriptor: &Descriptor) -> Result<ElementIndex> {
		let element = match self.state {
			DecoderState::Document => {
				if self.reader.state() == ReaderState::Type {
					self.reader.read_bson_type()?;
				}
				if self.reader.state() == ReaderState::Name {
					let name = self.reader.read_name()?;
					match descriptor.element_index(&name) {
						Some(index) => ElementIndex::Found(index),
						None => ElementIndex::Unknown(name),
					}
				} else {
					ElementIndex::Done
				}
			}
			DecoderState::List | DecoderState::StructuredMap => {
				if self.reader.read_bson_type()? == BsonType::EndOfDocument {
					ElementIndex::Done
				} else {
					let index = self.index;
					self.index += 1;
					ElementIndex::Found(index)
				}
			}
			DecoderState::MapKey => {
				if self.reader.read_bson_type()? == BsonType::EndOfDocument {
					ElementIndex::Done
				} else {
					ElementIndex::Found(0)
				}
			}
			DecoderState::MapValue => ElementIndex::Found(1),
			DecoderState::Polymorphic => match self.index {
				0 => {
					if self.reader.state() == ReaderState::Type {
						self.reader.read_bson_type()?;
					}
					let name = self.reader.read_name()?;
					if name != self.conf.class_discriminator() {
						return Err(BsonError::MissingDiscriminator {
							expected: self.conf.class_discriminator().to_owned(),
							type_name: descriptor.name().to_owned(),
						});
					}
					self.index = 1;
					ElementIndex::Found(0)
				}
				1 => {
					self.index = 2;
					ElementIndex::Found(1)
				}
				_ => ElementIndex::Done,
			},
		};

		if let ElementIndex::Found(index) = element {
			// Map keys never carry a semantic mapping; the key slot decodes
			// from the field name as-is.
			self.mapper = if self.state == DecoderState::MapKey {
				BsonKind::Passthrough
			} else {
				self.conf.kind_for(descriptor.element(index))
			};
		}
		Ok(element)
	}

	/// True unless the current token is the null marker, which is consumed.
	pub fn decode_not_null_mark(&mut self) -> Result<bool> {
		if self.reader.current_type() == Some(BsonType::Null) {
			self.reader.read_null()?;
			Ok(false)
		} else {
			Ok(true)
		}
	}

	pub fn decode_boolean(&mut self) -> Result<bool> {
		self.decode_value(|reader| reader.read_boolean(), |text| parse_key(text, "boolean"))
	}

	pub fn decode_byte(&mut self) -> Result<i8> {
		Ok(self.decode_int()? as i8)
	}

	pub fn decode_short(&mut self) -> Result<i16> {
		Ok(self.decode_int()? as i16)
	}

	pub fn decode_int(&mut self) -> Result<i32> {
		if self.conf.implicit_integer_conversion()
			&& self.reader.current_type() == Some(BsonType::Int64)
		{
			let number =
				self.decode_value(|reader| reader.read_int64(), |text| parse_key(text, "int64"))?;
			i32::try_from(number).map_err(|_| BsonError::IntOutOfRange { value: number })
		} else {
			self.decode_value(|reader| reader.read_int32(), |text| parse_key(text, "int32"))
		}
	}

	pub fn decode_long(&mut self) -> Result<i64> {
		match self.mapper {
			BsonKind::DateTime => self.decode_date_time(),
			_ => {
				if self.conf.implicit_integer_conversion()
					&& self.reader.current_type() == Some(BsonType::Int32)
				{
					let number = self
						.decode_value(|reader| reader.read_int32(), |text| parse_key(text, "int32"))?;
					Ok(i64::from(number))
				} else {
					self.decode_value(|reader| reader.read_int64(), |text| parse_key(text, "int64"))
				}
			}
		}
	}

	pub fn decode_float(&mut self) -> Result<f32> {
		Ok(self.decode_double()? as f32)
	}

	pub fn decode_double(&mut self) -> Result<f64> {
		self.decode_value(|reader| reader.read_double(), |text| parse_key(text, "double"))
	}

	pub fn decode_char(&mut self) -> Result<char> {
		let text = self.decode_string()?;
		text.chars().next().ok_or(BsonError::CharFromEmptyString)
	}

	pub fn decode_string(&mut self) -> Result<String> {
		match self.mapper {
			BsonKind::Uuid => Ok(self.decode_uuid()?.to_string()),
			BsonKind::ObjectId => self.decode_object_id(),
			BsonKind::DateTime => {
				let millis = self.decode_date_time()?;
				let date = DateTime::<Utc>::from_timestamp_millis(millis)
					.ok_or(BsonError::DateOutOfRange { millis })?;
				Ok(date.to_rfc3339_opts(SecondsFormat::Millis, true))
			}
			_ => self.decode_value(|reader| reader.read_string(), |text| Ok(text.to_owned())),
		}
	}

	/// Null slot: consumes no token (the null marker was consumed by
	/// [`decode_not_null_mark`]) but keeps map key/value phases in step.
	///
	/// [`decode_not_null_mark`]: BsonDecoder::decode_not_null_mark
	pub fn decode_null(&mut self) -> Result<()> {
		self.decode_value(|_| Ok(()), |_| Ok(()))
	}

	/// Resolve a decoded variant name against the enum descriptor.
	pub fn decode_enum(&mut self, descriptor: &Descriptor) -> Result<usize> {
		let variant = self.decode_string()?;
		match descriptor.element_index(&variant) {
			Some(index) => Ok(index),
			None => Err(BsonError::UnknownVariant {
				variant,
				enum_name: descriptor.name().to_owned(),
			}),
		}
	}

	/// Binary token as (subtype, bytes).
	pub fn decode_binary(&mut self) -> Result<(u8, Vec<u8>)> {
		self.decode_value(
			|reader| reader.read_binary(),
			|text| Ok((0, text.as_bytes().to_vec())),
		)
	}

	/// Date token as epoch milliseconds.
	pub fn decode_date_time(&mut self) -> Result<i64> {
		self.decode_value(|reader| reader.read_date_time(), |text| parse_key(text, "int64"))
	}

	/// Object-id token in canonical 24-char hex form.
	pub fn decode_object_id(&mut self) -> Result<String> {
		let bytes = self.decode_value(
			|reader| reader.read_object_id(),
			|text| parse_object_id(text),
		)?;
		Ok(hex::encode(bytes))
	}

	/// UUID stored as a binary token with the standard subtype.
	pub fn decode_uuid(&mut self) -> Result<Uuid> {
		let (subtype, bytes) = self.decode_binary()?;
		if subtype != BINARY_SUBTYPE_UUID {
			return Err(BsonError::BinarySubtype { expected: BINARY_SUBTYPE_UUID, got: subtype });
		}
		Uuid::from_slice(&bytes).map_err(|_| BsonError::UuidParse { value: hex::encode(&bytes) })
	}

	/// Common primitive path: reject container-less reads, and inside a
	/// primitive-keyed map decode the key slot from the field name.
	fn decode_value<T>(
		&mut self,
		read: impl FnOnce(&mut R) -> Result<T>,
		parse: impl FnOnce(&str) -> Result<T>,
	) -> Result<T> {
		if self.reader.state() == ReaderState::Initial {
			return Err(BsonError::PrimitiveAtRoot);
		}
		match self.state {
			DecoderState::MapKey => {
				self.state = DecoderState::MapValue;
				let name = self.reader.read_name()?;
				parse(&name)
			}
			DecoderState::MapValue => {
				self.state = DecoderState::MapKey;
				read(&mut self.reader)
			}
			_ => read(&mut self.reader),
		}
	}
}

fn parse_key<T: FromStr>(text: &str, target: &'static str) -> Result<T> {
	text.parse().map_err(|_| BsonError::KeyParse { text: text.to_owned(), target })
}

fn parse_object_id(text: &str) -> Result<[u8; 12]> {
	let bytes = hex::decode(text).map_err(|_| BsonError::ObjectIdParse { value: text.to_owned() })?;
	bytes.try_into().map_err(|_| BsonError::ObjectIdParse { value: text.to_owned() })
}
