use crate::bson::error::{BsonError, Result};
use crate::bson::value::{BsonDocument, BsonType, BsonValue};

/// Position of a token reader within the read protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
	/// Before the root container is opened.
	Initial,
	/// Expecting a token type read.
	Type,
	/// Token type read; expecting the field name.
	Name,
	/// Positioned at a value token.
	Value,
	/// Current document is exhausted.
	EndOfDocument,
	/// Current array is exhausted.
	EndOfArray,
	/// Root container closed; nothing left to read.
	Done,
}

/// Token backend read interface. The decoder engine consumes this; the
/// backend owns the actual document representation.
pub trait BsonReader {
	fn state(&self) -> ReaderState;
	/// Type of the token most recently surfaced by [`read_bson_type`],
	/// without consuming anything.
	///
	/// [`read_bson_type`]: BsonReader::read_bson_type
	fn current_type(&self) -> Option<BsonType>;
	fn read_start_document(&mut self) -> Result<()>;
	fn read_end_document(&mut self) -> Result<()>;
	fn read_start_array(&mut self) -> Result<()>;
	fn read_end_array(&mut self) -> Result<()>;
	/// Advance to the next token and return its type, or
	/// [`BsonType::EndOfDocument`] when the container is exhausted.
	fn read_bson_type(&mut self) -> Result<BsonType>;
	fn read_name(&mut self) -> Result<String>;
	fn read_boolean(&mut self) -> Result<bool>;
	fn read_int32(&mut self) -> Result<i32>;
	fn read_int64(&mut self) -> Result<i64>;
	fn read_double(&mut self) -> Result<f64>;
	fn read_string(&mut self) -> Result<String>;
	/// Date token as epoch milliseconds.
	fn read_date_time(&mut self) -> Result<i64>;
	/// Binary token as (subtype, bytes).
	fn read_binary(&mut self) -> Result<(u8, Vec<u8>)>;
	fn read_object_id(&mut self) -> Result<[u8; 12]>;
	fn read_null(&mut self) -> Result<()>;
}

enum ReadFrame<'a> {
	Document { entries: &'a [(String, BsonValue)], index: usize },
	Array { items: &'a [BsonValue], index: usize },
}

/// Tree walker implementing [`BsonReader`] over an in-memory document.
pub struct DocumentReader<'a> {
	root: &'a BsonDocument,
	frames: Vec<ReadFrame<'a>>,
	state: ReaderState,
	current_type: Option<BsonType>,
}

impl<'a> DocumentReader<'a> {
	pub fn new(root: &'a BsonDocument) -> Self {
		Self {
			root,
			frames: Vec::new(),
			state: ReaderState::Initial,
			current_type: None,
		}
	}

	fn current_value(&self, op: &'static str) -> Result<&'a BsonValue> {
		if self.state != ReaderState::Value {
			return Err(BsonError::ReadOutOfTurn { op, state: self.state });
		}
		match self.frames.last() {
			Some(ReadFrame::Document { entries, index }) => Ok(&entries[*index].1),
			Some(ReadFrame::Array { items, index }) => Ok(&items[*index]),
			None => Err(BsonError::ReadOutOfTurn { op, state: self.state }),
		}
	}

	/// Consume the current value: advance past it and expect the next type.
	fn advance(&mut self) {
		match self.frames.last_mut() {
			Some(ReadFrame::Document { index, .. }) | Some(ReadFrame::Array { index, .. }) => {
				*index += 1;
			}
			None => {}
		}
		self.state = ReaderState::Type;
	}

	fn mismatch(&self, expected: BsonType, got: &BsonValue) -> BsonError {
		BsonError::UnexpectedType { expected, got: got.bson_type() }
	}
}

impl BsonReader for DocumentReader<'_> {
	fn state(&self) -> ReaderState {
		self.state
	}

	fn current_type(&self) -> Option<BsonType> {
		self.current_type
	}

	fn read_start_document(&mut self) -> Result<()> {
		match self.state {
			ReaderState::Initial => {
				self.frames.push(ReadFrame::Document { entries: self.root.entries(), index: 0 });
				self.state = ReaderState::Type;
				Ok(())
			}
			ReaderState::Value => {
				let value = self.current_value("read_start_document")?;
				let BsonValue::Document(doc) = value else {
					return Err(self.mismatch(BsonType::Document, value));
				};
				self.advance();
				self.frames.push(ReadFrame::Document { entries: doc.entries(), index: 0 });
				self.state = ReaderState::Type;
				Ok(())
			}
			state => Err(BsonError::ReadOutOfTurn { op: "read_start_document", state }),
		}
	}

	fn read_end_document(&mut self) -> Result<()> {
		if self.state != ReaderState::EndOfDocument {
			return Err(BsonError::ReadOutOfTurn { op: "read_end_document", state: self.state });
		}
		match self.frames.pop() {
			Some(ReadFrame::Document { .. }) => {
				self.state = if self.frames.is_empty() { ReaderState::Done } else { ReaderState::Type };
				Ok(())
			}
			_ => Err(BsonError::ReadOutOfTurn { op: "read_end_document", state: self.state }),
		}
	}

	fn read_start_array(&mut self) -> Result<()> {
		let value = self.current_value("read_start_array")?;
		let BsonValue::Array(items) = value else {
			return Err(self.mismatch(BsonType::Array, value));
		};
		self.advance();
		self.frames.push(ReadFrame::Array { items, index: 0 });
		self.state = ReaderState::Type;
		Ok(())
	}

	fn read_end_array(&mut self) -> Result<()> {
		if self.state != ReaderState::EndOfArray {
			return Err(BsonError::ReadOutOfTurn { op: "read_end_array", state: self.state });
		}
		match self.frames.pop() {
			Some(ReadFrame::Array { .. }) => {
				self.state = ReaderState::Type;
				Ok(())
			}
			_ => Err(BsonError::ReadOutOfTurn { op: "read_end_array", state: self.state }),
		}
	}

	fn read_bson_type(&mut self) -> Result<BsonType> {
		if self.state != ReaderState::Type {
			return Err(BsonError::ReadOutOfTurn { op: "read_bson_type", state: self.state });
		}
		match self.frames.last() {
			Some(ReadFrame::Document { entries, index }) => {
				if *index >= entries.len() {
					self.state = ReaderState::EndOfDocument;
					self.current_type = Some(BsonType::EndOfDocument);
					Ok(BsonType::EndOfDocument)
				} else {
					let token = entries[*index].1.bson_type();
					self.current_type = Some(token);
					self.state = ReaderState::Name;
					Ok(token)
				}
			}
			Some(ReadFrame::Array { items, index }) => {
				if *index >= items.len() {
					self.state = ReaderState::EndOfArray;
					self.current_type = Some(BsonType::EndOfDocument);
					Ok(BsonType::EndOfDocument)
				} else {
					let token = items[*index].bson_type();
					self.current_type = Some(token);
					self.state = ReaderState::Value;
					Ok(token)
				}
			}
			None => Err(BsonError::ReadOutOfTurn { op: "read_bson_type", state: self.state }),
		}
	}

	fn read_name(&mut self) -> Result<String> {
		if self.state != ReaderState::Name {
			return Err(BsonError::ReadOutOfTurn { op: "read_name", state: self.state });
		}
		match self.frames.last() {
			Some(ReadFrame::Document { entries, index }) => {
				let name = entries[*index].0.clone();
				self.state = ReaderState::Value;
				Ok(name)
			}
			_ => Err(BsonError::ReadOutOfTurn { op: "read_name", state: self.state }),
		}
	}

	fn read_boolean(&mut self) -> Result<bool> {
		let value = self.current_value("read_boolean")?;
		let BsonValue::Boolean(flag) = value else {
			return Err(self.mismatch(BsonType::Boolean, value));
		};
		let flag = *flag;
		self.advance();
		Ok(flag)
	}

	fn read_int32(&mut self) -> Result<i32> {
		let value = self.current_value("read_int32")?;
		let BsonValue::Int32(number) = value else {
			return Err(self.mismatch(BsonType::Int32, value));
		};
		let number = *number;
		self.advance();
		Ok(number)
	}

	fn read_int64(&mut self) -> Result<i64> {
		let value = self.current_value("read_int64")?;
		let BsonValue::Int64(number) = value else {
			return Err(self.mismatch(BsonType::Int64, value));
		};
		let number = *number;
		self.advance();
		Ok(number)
	}

	fn read_double(&mut self) -> Result<f64> {
		let value = self.current_value("read_double")?;
		let BsonValue::Double(number) = value else {
			return Err(self.mismatch(BsonType::Double, value));
		};
		let number = *number;
		self.advance();
		Ok(number)
	}

	fn read_string(&mut self) -> Result<String> {
		let value = self.current_value("read_string")?;
		let BsonValue::String(text) = value else {
			return Err(self.mismatch(BsonType::String, value));
		};
		let text = text.clone();
		self.advance();
		Ok(text)
	}

	fn read_date_time(&mut self) -> Result<i64> {
		let value = self.current_value("read_date_time")?;
		let BsonValue::DateTime(millis) = value else {
			return Err(self.mismatch(BsonType::DateTime, value));
		};
		let millis = *millis;
		self.advance();
		Ok(millis)
	}

	fn read_binary(&mut self) -> Result<(u8, Vec<u8>)> {
		let value = self.current_value("read_binary")?;
		let BsonValue::Binary { subtype, bytes } = value else {
			return Err(self.mismatch(BsonType::Binary, value));
		};
		let out = (*subtype, bytes.clone());
		self.advance();
		Ok(out)
	}

	fn read_object_id(&mut self) -> Result<[u8; 12]> {
		let value = self.current_value("read_object_id")?;
		let BsonValue::ObjectId(bytes) = value else {
			return Err(self.mismatch(BsonType::ObjectId, value));
		};
		let bytes = *bytes;
		self.advance();
		Ok(bytes)
	}

	fn read_null(&mut self) -> Result<()> {
		let value = self.current_value("read_null")?;
		let BsonValue::Null = value else {
			return Err(self.mismatch(BsonType::Null, value));
		};
		self.advance();
		Ok(())
	}
}
