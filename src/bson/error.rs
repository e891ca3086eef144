use thiserror::Error;

use crate::bson::config::BsonKind;
use crate::bson::reader::ReaderState;
use crate::bson::value::BsonType;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BsonError>;

/// Errors produced while configuring, encoding, decoding, and projecting
/// documents.
#[derive(Debug, Error)]
pub enum BsonError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Text projection parse or print failure.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Class discriminator contains reserved document path characters.
	#[error("class discriminator '{name}' contains illegal field characters ($ or .)")]
	InvalidDiscriminator {
		/// Rejected discriminator name.
		name: String,
	},
	/// Semantic kind registered over an incompatible primitive kind.
	#[error("cannot map type '{type_name}' ({primitive}) to {kind}")]
	IncompatibleMapping {
		/// Requested semantic kind.
		kind: BsonKind,
		/// Declared name of the offending type.
		type_name: String,
		/// Structural kind the type actually has.
		primitive: &'static str,
	},
	/// The outermost encoded value is not a document.
	#[error(
		"the root structure must be a document: primitives and arrays cannot be encoded without an enclosing type"
	)]
	RootNotDocument,
	/// Map key type is neither primitive nor enum.
	#[error(
		"value of type '{type_name}' ({kind}) cannot be used as a map key; enable allow_structured_map_keys to encode such maps as flat [key1, value1, ...] arrays"
	)]
	InvalidMapKey {
		/// Declared name of the key type.
		type_name: String,
		/// Structural kind of the key type.
		kind: &'static str,
	},
	/// Container kind the engines do not handle; indicates a protocol
	/// mismatch with the traversal side.
	#[error("unsupported structure kind: {kind}")]
	UnsupportedKind {
		/// Offending structural kind.
		kind: &'static str,
	},
	/// Primitive read requested before any container was opened.
	#[error("a document cannot be decoded into a primitive type")]
	PrimitiveAtRoot,
	/// Polymorphic envelope whose first field is not the discriminator.
	#[error("expected class discriminator '{expected}' when decoding polymorphic type '{type_name}'")]
	MissingDiscriminator {
		/// Configured discriminator field name.
		expected: String,
		/// Declared name of the polymorphic type being decoded.
		type_name: String,
	},
	/// Implicitly narrowed 64-bit value does not fit 32 bits.
	#[error("cannot narrow int64 to int32: {value} is out of range")]
	IntOutOfRange {
		/// Stored 64-bit value.
		value: i64,
	},
	/// Decoded enum string has no matching variant.
	#[error("unknown variant '{variant}' for enum '{enum_name}'")]
	UnknownVariant {
		/// Decoded variant name.
		variant: String,
		/// Declared enum type name.
		enum_name: String,
	},
	/// Field name with no matching element in the expected element set.
	#[error("unknown field '{field}' on '{type_name}'")]
	UnknownField {
		/// Unmatched field name.
		field: String,
		/// Declared name of the type being decoded.
		type_name: String,
	},
	/// Char decode from an empty string token.
	#[error("cannot decode a char from an empty string")]
	CharFromEmptyString,
	/// Map key string does not parse into the requested primitive.
	#[error("cannot parse map key '{text}' as {target}")]
	KeyParse {
		/// Stored field name.
		text: String,
		/// Requested primitive type.
		target: &'static str,
	},
	/// Key-value container with a key token but no value token.
	#[error("map entry has a key but no value")]
	MapEntryMissing,
	/// Binary token with an unexpected subtype.
	#[error("expected binary subtype {expected}, got {got}")]
	BinarySubtype {
		/// Required subtype.
		expected: u8,
		/// Stored subtype.
		got: u8,
	},
	/// Stored timestamp outside the representable date range.
	#[error("timestamp {millis} is outside the representable date range")]
	DateOutOfRange {
		/// Stored epoch milliseconds.
		millis: i64,
	},
	/// Reader positioned at a token of a different type.
	#[error("unexpected token type: expected {expected}, got {got}")]
	UnexpectedType {
		/// Requested token type.
		expected: BsonType,
		/// Token type actually present.
		got: BsonType,
	},
	/// Reader operation invoked in a state that does not permit it.
	#[error("{op} called in reader state {state:?}")]
	ReadOutOfTurn {
		/// Operation name.
		op: &'static str,
		/// Reader state at the time of the call.
		state: ReaderState,
	},
	/// Writer operation invoked out of name/value turn.
	#[error("out-of-turn write: {op}")]
	WriteOutOfTurn {
		/// Operation name.
		op: &'static str,
	},
	/// Writer finished before the root document was closed.
	#[error("writer finished with unclosed containers")]
	IncompleteDocument,
	/// RFC 3339 date text failed to parse.
	#[error("invalid RFC 3339 date: '{text}'")]
	DateParse {
		/// Rejected date text.
		text: String,
	},
	/// Object id hex text failed to parse.
	#[error("invalid object id hex: '{value}'")]
	ObjectIdParse {
		/// Rejected hex text.
		value: String,
	},
	/// UUID text or bytes failed to parse.
	#[error("invalid uuid: '{value}'")]
	UuidParse {
		/// Rejected uuid representation.
		value: String,
	},
}
