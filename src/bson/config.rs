use std::collections::HashMap;
use std::fmt;

use crate::bson::descriptor::{Descriptor, Kind, PrimitiveKind};
use crate::bson::error::{BsonError, Result};

/// Default discriminator field name for polymorphic envelopes.
pub const CLASS_DISCRIMINATOR: &str = "__type";

/// Semantic reinterpretation of a primitive's wire representation, applied
/// per declared type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsonKind {
	/// No reinterpretation; the primitive maps to its natural token.
	Passthrough,
	/// Long or string fields stored as native date tokens (epoch millis).
	DateTime,
	/// String fields stored as native object-id tokens.
	ObjectId,
	/// String fields stored as binary tokens with the UUID subtype.
	Uuid,
}

impl BsonKind {
	/// Primitive kinds this semantic kind may legally annotate.
	pub fn supported_kinds(self) -> &'static [PrimitiveKind] {
		match self {
			BsonKind::Passthrough => &[
				PrimitiveKind::Boolean,
				PrimitiveKind::Byte,
				PrimitiveKind::Char,
				PrimitiveKind::Short,
				PrimitiveKind::Int,
				PrimitiveKind::Long,
				PrimitiveKind::Float,
				PrimitiveKind::Double,
				PrimitiveKind::String,
			],
			BsonKind::DateTime => &[PrimitiveKind::Long, PrimitiveKind::String],
			BsonKind::ObjectId => &[PrimitiveKind::String],
			BsonKind::Uuid => &[PrimitiveKind::String],
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			BsonKind::Passthrough => "passthrough",
			BsonKind::DateTime => "dateTime",
			BsonKind::ObjectId => "objectId",
			BsonKind::Uuid => "uuid",
		}
	}
}

impl fmt::Display for BsonKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Immutable codec configuration. Built once via [`BsonConfigBuilder`] and
/// shared read-only by any number of encoder/decoder instances.
#[derive(Debug, Clone)]
pub struct BsonConfig {
	class_discriminator: String,
	type_mappings: HashMap<String, BsonKind>,
	allow_structured_map_keys: bool,
	implicit_integer_conversion: bool,
	encode_defaults: bool,
}

impl Default for BsonConfig {
	fn default() -> Self {
		Self {
			class_discriminator: CLASS_DISCRIMINATOR.to_owned(),
			type_mappings: HashMap::new(),
			allow_structured_map_keys: false,
			implicit_integer_conversion: true,
			encode_defaults: false,
		}
	}
}

impl BsonConfig {
	pub fn builder() -> BsonConfigBuilder {
		BsonConfigBuilder::default()
	}

	/// Field name that tags a polymorphic envelope with its variant.
	pub fn class_discriminator(&self) -> &str {
		&self.class_discriminator
	}

	pub fn allow_structured_map_keys(&self) -> bool {
		self.allow_structured_map_keys
	}

	pub fn implicit_integer_conversion(&self) -> bool {
		self.implicit_integer_conversion
	}

	pub fn encode_defaults(&self) -> bool {
		self.encode_defaults
	}

	/// Semantic kind registered for the descriptor's declared type name.
	/// Nullable declarations are normalized to their non-null name first.
	pub fn kind_for(&self, descriptor: &Descriptor) -> BsonKind {
		let name = descriptor.name();
		let name = name.strip_suffix('?').unwrap_or(name);
		self.type_mappings.get(name).copied().unwrap_or(BsonKind::Passthrough)
	}
}

/// Validating builder for [`BsonConfig`]. Illegal discriminators and
/// incompatible semantic mappings fail here, before any engine runs.
#[derive(Debug, Default)]
pub struct BsonConfigBuilder {
	config: BsonConfig,
}

impl BsonConfigBuilder {
	pub fn class_discriminator(mut self, name: impl Into<String>) -> Self {
		self.config.class_discriminator = name.into();
		self
	}

	pub fn allow_structured_map_keys(mut self, allow: bool) -> Self {
		self.config.allow_structured_map_keys = allow;
		self
	}

	pub fn implicit_integer_conversion(mut self, allow: bool) -> Self {
		self.config.implicit_integer_conversion = allow;
		self
	}

	pub fn encode_defaults(mut self, encode: bool) -> Self {
		self.config.encode_defaults = encode;
		self
	}

	/// Register a semantic kind for the descriptor's declared type name.
	/// The descriptor must be primitive and of a kind the semantic kind
	/// supports; last registration for a name wins.
	pub fn type_mapping(mut self, descriptor: &Descriptor, kind: BsonKind) -> Result<Self> {
		let primitive = match descriptor.kind() {
			Kind::Primitive(primitive) => primitive,
			other => {
				return Err(BsonError::IncompatibleMapping {
					kind,
					type_name: descriptor.name().to_owned(),
					primitive: other.label(),
				});
			}
		};
		if !kind.supported_kinds().contains(&primitive) {
			return Err(BsonError::IncompatibleMapping {
				kind,
				type_name: descriptor.name().to_owned(),
				primitive: primitive.label(),
			});
		}
		let name = descriptor.name();
		let name = name.strip_suffix('?').unwrap_or(name);
		self.config.type_mappings.insert(name.to_owned(), kind);
		Ok(self)
	}

	pub fn build(self) -> Result<BsonConfig> {
		if self.config.class_discriminator.contains(['$', '.']) {
			return Err(BsonError::InvalidDiscriminator {
				name: self.config.class_discriminator,
			});
		}
		Ok(self.config)
	}
}
