/// Scalar kinds of the traversal protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
	Boolean,
	Byte,
	Char,
	Short,
	Int,
	Long,
	Float,
	Double,
	String,
}

impl PrimitiveKind {
	pub fn label(self) -> &'static str {
		match self {
			PrimitiveKind::Boolean => "boolean",
			PrimitiveKind::Byte => "byte",
			PrimitiveKind::Char => "char",
			PrimitiveKind::Short => "short",
			PrimitiveKind::Int => "int",
			PrimitiveKind::Long => "long",
			PrimitiveKind::Float => "float",
			PrimitiveKind::Double => "double",
			PrimitiveKind::String => "string",
		}
	}
}

/// Structural kind of a descriptor. Closed set: both engines match it
/// exhaustively, so a protocol mismatch surfaces as an explicit error
/// instead of a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
	Primitive(PrimitiveKind),
	Enum,
	Struct,
	List,
	Map,
	Polymorphic,
}

impl Kind {
	pub fn label(self) -> &'static str {
		match self {
			Kind::Primitive(kind) => kind.label(),
			Kind::Enum => "enum",
			Kind::Struct => "struct",
			Kind::List => "list",
			Kind::Map => "map",
			Kind::Polymorphic => "polymorphic",
		}
	}

	/// True for kinds that encode as their own container rather than a
	/// single scalar token.
	pub fn is_composite(self) -> bool {
		matches!(self, Kind::Struct | Kind::List | Kind::Map | Kind::Polymorphic)
	}
}

/// Expected-element-set descriptor supplied by the traversal side: a type
/// name, a structural kind, and the named child elements.
///
/// The codec never inspects application types; descriptors are the only
/// schema information it sees.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
	name: String,
	kind: Kind,
	nullable: bool,
	elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
struct Element {
	name: String,
	descriptor: Descriptor,
}

impl Descriptor {
	pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
		Self {
			name: name.into(),
			kind: Kind::Primitive(kind),
			nullable: false,
			elements: Vec::new(),
		}
	}

	/// Fixed-field structure (class or singleton object).
	pub fn structure(name: impl Into<String>, fields: Vec<(&str, Descriptor)>) -> Self {
		Self {
			name: name.into(),
			kind: Kind::Struct,
			nullable: false,
			elements: fields
				.into_iter()
				.map(|(name, descriptor)| Element { name: name.to_owned(), descriptor })
				.collect(),
		}
	}

	/// Index-ordered container of one element type.
	pub fn list(element: Descriptor) -> Self {
		Self {
			name: "List".to_owned(),
			kind: Kind::List,
			nullable: false,
			elements: vec![Element { name: "element".to_owned(), descriptor: element }],
		}
	}

	/// Key-value container. Element 0 is the key descriptor, element 1 the
	/// value descriptor; running indices alternate between them on parity.
	pub fn map(key: Descriptor, value: Descriptor) -> Self {
		Self {
			name: "Map".to_owned(),
			kind: Kind::Map,
			nullable: false,
			elements: vec![
				Element { name: "key".to_owned(), descriptor: key },
				Element { name: "value".to_owned(), descriptor: value },
			],
		}
	}

	/// Closed set of named variants carried as a single string token.
	pub fn enumeration(name: impl Into<String>, variants: &[&str]) -> Self {
		let name = name.into();
		let elements = variants
			.iter()
			.map(|variant| Element {
				name: (*variant).to_owned(),
				descriptor: Descriptor::structure(format!("{name}.{variant}"), Vec::new()),
			})
			.collect();
		Self { name, kind: Kind::Enum, nullable: false, elements }
	}

	/// Discriminator-tagged envelope. Element 0 is the synthetic "type"
	/// slot, element 1 the variant payload.
	pub fn polymorphic(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: Kind::Polymorphic,
			nullable: false,
			elements: vec![
				Element {
					name: "type".to_owned(),
					descriptor: Descriptor::primitive("String", PrimitiveKind::String),
				},
				Element {
					name: "value".to_owned(),
					descriptor: Descriptor::structure("Any", Vec::new()),
				},
			],
		}
	}

	/// Mark the described type as nullable.
	pub fn nullable(mut self) -> Self {
		self.nullable = true;
		self
	}

	/// Declared type name. Nullable declarations may carry a trailing `?`;
	/// semantic mapping lookups normalize it away.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> Kind {
		self.kind
	}

	pub fn is_nullable(&self) -> bool {
		self.nullable
	}

	pub fn element_count(&self) -> usize {
		self.elements.len()
	}

	pub fn element_name(&self, index: usize) -> &str {
		&self.elements[index].name
	}

	/// Descriptor of the element at `index`. Lists resolve every index to
	/// their single element descriptor; maps alternate key/value on parity.
	pub fn element(&self, index: usize) -> &Descriptor {
		match self.kind {
			Kind::List => &self.elements[0].descriptor,
			Kind::Map => &self.elements[index % 2].descriptor,
			_ => &self.elements[index].descriptor,
		}
	}

	/// Resolve an element name to its index.
	pub fn element_index(&self, name: &str) -> Option<usize> {
		self.elements.iter().position(|element| element.name == name)
	}
}
