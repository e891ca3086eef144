use chrono::DateTime;
use uuid::Uuid;

use crate::bson::config::{BsonConfig, BsonKind};
use crate::bson::descriptor::{Descriptor, Kind};
use crate::bson::error::{BsonError, Result};
use crate::bson::value::{BINARY_SUBTYPE_GENERIC, BINARY_SUBTYPE_UUID};
use crate::bson::writer::{BsonWriter, DocumentWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncoderState {
	Root,
	Begin,
	Polymorphic,
	Map,
	StructuredMap,
	MapKey,
	MapValue,
}

/// Finite-state engine translating structural events from the traversal
/// side into backend tokens.
///
/// The encoder tracks a single state tag and no stack: nested containers
/// write through the backend's own framing, and the map key/value phases
/// only alternate within the innermost primitive-keyed map.
///
/// An instance is owned by one top-level encode call and discarded once the
/// document is taken. Not reusable, not thread-safe.
pub struct BsonEncoder<'c, W = DocumentWriter> {
	writer: W,
	conf: &'c BsonConfig,
	state: EncoderState,
	mapper: BsonKind,
}

impl<'c> BsonEncoder<'c, DocumentWriter> {
	pub fn new(conf: &'c BsonConfig) -> Self {
		Self::with_writer(DocumentWriter::new(), conf)
	}

	/// Finished document. Errors if containers are still open.
	pub fn into_document(self) -> Result<crate::bson::value::BsonDocument> {
		self.writer.into_document()
	}
}

impl<'c, W: BsonWriter> BsonEncoder<'c, W> {
	pub fn with_writer(writer: W, conf: &'c BsonConfig) -> Self {
		Self { writer, conf, state: EncoderState::Root, mapper: BsonKind::Passthrough }
	}

	/// Whether the traversal side should emit elements holding their
	/// default value.
	pub fn should_encode_defaults(&self) -> bool {
		self.conf.encode_defaults()
	}

	/// Open the container for the value the traversal side is about to walk.
	pub fn begin_structure(&mut self, descriptor: &Descriptor) -> Result<()> {
		match descriptor.kind() {
			Kind::Struct => {
				if self.state == EncoderState::Polymorphic {
					// Variant payload shares the envelope document.
					self.state = EncoderState::Begin;
				} else {
					self.writer.write_start_document()?;
				}
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
					self.writer.write_start_array()?;
					self.state = EncoderState::StructuredMap;
				} else {
					self.writer.write_start_document()?;
					self.state = EncoderState::Map;
				}
			}
			Kind::List => {
				if self.state == EncoderState::Root {
					return Err(BsonError::RootNotDocument);
				}
				self.writer.write_start_array()?;
			}
			Kind::Polymorphic => {
				self.writer.write_start_document()?;
				self.state = EncoderState::Polymorphic;
			}
			kind @ (Kind::Primitive(_) | Kind::Enum) => {
				return Err(BsonError::UnsupportedKind { kind: kind.label() });
			}
		}
		if self.state == EncoderState::Root {
			self.state = EncoderState::Begin;
		}
		Ok(())
	}

	/// Close the container opened by the matching [`begin_structure`].
	///
	/// [`begin_structure`]: BsonEncoder::begin_structure
	pub fn end_structure(&mut self, descriptor: &Descriptor) -> Result<()> {
		match descriptor.kind() {
			Kind::List => self.writer.write_end_array(),
			Kind::Map => {
				if self.state == EncoderState::StructuredMap {
					self.writer.write_end_array()
				} else {
					self.writer.write_end_document()
				}
			}
			Kind::Struct => {
				if self.state != EncoderState::Polymorphic {
					self.writer.write_end_document()?;
				}
				Ok(())
			}
			Kind::Polymorphic => {
				if self.state == EncoderState::Polymorphic {
					self.writer.write_end_document()?;
					self.state = EncoderState::Begin;
				}
				Ok(())
			}
			Kind::Primitive(_) | Kind::Enum => Ok(()),
		}
	}

	/// Announce the element about to be written. Returns whether the
	/// traversal side should encode it.
	pub fn encode_element(&mut self, descriptor: &Descriptor, index: usize) -> Result<bool> {
		match descriptor.kind() {
			Kind::Struct => self.writer.write_name(descriptor.element_name(index))?,
			Kind::Map => {
				if self.state != EncoderState::StructuredMap {
					// The name-or-value decision happens at write time; here
					// the key/value phase just alternates.
					self.state = if self.state == EncoderState::MapKey {
						EncoderState::MapValue
					} else {
						EncoderState::MapKey
					};
				}
			}
			Kind::Polymorphic => {
				if descriptor.element_name(index) == "type" {
					self.writer.write_name(self.conf.class_discriminator())?;
				}
			}
			_ => {}
		}

		self.mapper = self.conf.kind_for(descriptor.element(index));
		Ok(true)
	}

	pub fn encode_boolean(&mut self, value: bool) -> Result<()> {
		self.encode_value(value, |writer, value| writer.write_boolean(value), |value| {
			value.to_string()
		})
	}

	pub fn encode_byte(&mut self, value: i8) -> Result<()> {
		self.encode_int(i32::from(value))
	}

	pub fn encode_short(&mut self, value: i16) -> Result<()> {
		self.encode_int(i32::from(value))
	}

	pub fn encode_int(&mut self, value: i32) -> Result<()> {
		self.encode_value(value, |writer, value| writer.write_int32(value), |value| {
			value.to_string()
		})
	}

	pub fn encode_long(&mut self, value: i64) -> Result<()> {
		match self.mapper {
			BsonKind::DateTime => self.encode_date_time(value),
			_ => self.encode_value(value, |writer, value| writer.write_int64(value), |value| {
				value.to_string()
			}),
		}
	}

	pub fn encode_float(&mut self, value: f32) -> Result<()> {
		self.encode_double(f64::from(value))
	}

	pub fn encode_double(&mut self, value: f64) -> Result<()> {
		self.encode_value(value, |writer, value| writer.write_double(value), |value| {
			value.to_string()
		})
	}

	pub fn encode_char(&mut self, value: char) -> Result<()> {
		self.encode_string(&value.to_string())
	}

	pub fn encode_string(&mut self, value: &str) -> Result<()> {
		match self.mapper {
			BsonKind::ObjectId => self.encode_object_id(value),
			BsonKind::Uuid => self.encode_uuid_text(value),
			BsonKind::DateTime => self.encode_date_time_text(value),
			_ => self.encode_value(value, |writer, value| writer.write_string(value), |value| {
				(*value).to_owned()
			}),
		}
	}

	/// Enum variants are carried as their name string.
	pub fn encode_enum(&mut self, descriptor: &Descriptor, index: usize) -> Result<()> {
		let variant = descriptor.element_name(index).to_owned();
		self.encode_string(&variant)
	}

	pub fn encode_null(&mut self) -> Result<()> {
		self.writer.write_null()
	}

	pub fn encode_binary(&mut self, bytes: &[u8]) -> Result<()> {
		self.encode_value(
			bytes,
			|writer, bytes| writer.write_binary(BINARY_SUBTYPE_GENERIC, bytes),
			|bytes| hex::encode(bytes),
		)
	}

	/// Date token from epoch milliseconds.
	pub fn encode_date_time(&mut self, millis: i64) -> Result<()> {
		self.encode_value(millis, |writer, millis| writer.write_date_time(millis), |millis| {
			millis.to_string()
		})
	}

	/// Date token from RFC 3339 text.
	pub fn encode_date_time_text(&mut self, text: &str) -> Result<()> {
		let date = DateTime::parse_from_rfc3339(text)
			.map_err(|_| BsonError::DateParse { text: text.to_owned() })?;
		self.encode_date_time(date.timestamp_millis())
	}

	/// Object-id token from canonical 24-char hex text.
	pub fn encode_object_id(&mut self, text: &str) -> Result<()> {
		let bytes = hex::decode(text)
			.ok()
			.and_then(|bytes| <[u8; 12]>::try_from(bytes).ok())
			.ok_or_else(|| BsonError::ObjectIdParse { value: text.to_owned() })?;
		self.encode_value(bytes, |writer, bytes| writer.write_object_id(bytes), |bytes| {
			hex::encode(bytes)
		})
	}

	/// Binary token with the standard UUID subtype from hyphenated text.
	pub fn encode_uuid_text(&mut self, text: &str) -> Result<()> {
		let uuid = Uuid::parse_str(text)
			.map_err(|_| BsonError::UuidParse { value: text.to_owned() })?;
		self.encode_value(
			uuid,
			|writer, uuid| writer.write_binary(BINARY_SUBTYPE_UUID, uuid.as_bytes()),
			|uuid| uuid.to_string(),
		)
	}

	/// Common primitive path: reject bare scalars at the root, and inside a
	/// primitive-keyed map write the key slot as the field name.
	fn encode_value<T>(
		&mut self,
		value: T,
		write: impl FnOnce(&mut W, T) -> Result<()>,
		as_name: impl FnOnce(&T) -> String,
	) -> Result<()> {
		match self.state {
			EncoderState::Root => Err(BsonError::RootNotDocument),
			EncoderState::MapKey => {
				let name = as_name(&value);
				self.writer.write_name(&name)
			}
			_ => write(&mut self.writer, value),
		}
	}
}
