use crate::bson::error::{BsonError, Result};
use crate::bson::value::{BsonDocument, BsonValue};

/// Token backend write interface. The encoder engine drives this; the
/// backend owns the document being produced.
pub trait BsonWriter {
	fn write_start_document(&mut self) -> Result<()>;
	fn write_end_document(&mut self) -> Result<()>;
	fn write_start_array(&mut self) -> Result<()>;
	fn write_end_array(&mut self) -> Result<()>;
	/// Name the next value written into the current document.
	fn write_name(&mut self, name: &str) -> Result<()>;
	fn write_boolean(&mut self, value: bool) -> Result<()>;
	fn write_int32(&mut self, value: i32) -> Result<()>;
	fn write_int64(&mut self, value: i64) -> Result<()>;
	fn write_double(&mut self, value: f64) -> Result<()>;
	fn write_string(&mut self, value: &str) -> Result<()>;
	/// Date token from epoch milliseconds.
	fn write_date_time(&mut self, millis: i64) -> Result<()>;
	fn write_binary(&mut self, subtype: u8, bytes: &[u8]) -> Result<()>;
	fn write_object_id(&mut self, bytes: [u8; 12]) -> Result<()>;
	fn write_null(&mut self) -> Result<()>;
}

enum WriteFrame {
	Document {
		/// Field name this document is attached under in its parent, if the
		/// parent is a document.
		name: Option<String>,
		entries: Vec<(String, BsonValue)>,
		pending: Option<String>,
	},
	Array {
		name: Option<String>,
		items: Vec<BsonValue>,
	},
}

/// Tree builder implementing [`BsonWriter`]. Strict about name/value
/// alternation inside documents: a protocol violation surfaces as an error
/// rather than a malformed document.
#[derive(Default)]
pub struct DocumentWriter {
	frames: Vec<WriteFrame>,
	root: Option<BsonDocument>,
}

impl DocumentWriter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Finished root document. Errors if containers are still open or no
	/// root was ever written.
	pub fn into_document(self) -> Result<BsonDocument> {
		if !self.frames.is_empty() {
			return Err(BsonError::IncompleteDocument);
		}
		self.root.ok_or(BsonError::IncompleteDocument)
	}

	/// Take the pending field name of the innermost document, if the
	/// innermost frame is a document.
	fn take_pending(&mut self, op: &'static str) -> Result<Option<String>> {
		match self.frames.last_mut() {
			Some(WriteFrame::Document { pending, .. }) => match pending.take() {
				Some(name) => Ok(Some(name)),
				None => Err(BsonError::WriteOutOfTurn { op }),
			},
			Some(WriteFrame::Array { .. }) => Ok(None),
			None => Err(BsonError::WriteOutOfTurn { op }),
		}
	}

	fn push_value(&mut self, value: BsonValue, op: &'static str) -> Result<()> {
		match self.frames.last_mut() {
			Some(WriteFrame::Document { entries, pending, .. }) => {
				let name = pending.take().ok_or(BsonError::WriteOutOfTurn { op })?;
				entries.push((name, value));
				Ok(())
			}
			Some(WriteFrame::Array { items, .. }) => {
				items.push(value);
				Ok(())
			}
			None => Err(BsonError::WriteOutOfTurn { op }),
		}
	}

	fn attach(&mut self, name: Option<String>, value: BsonValue, op: &'static str) -> Result<()> {
		match self.frames.last_mut() {
			Some(WriteFrame::Document { entries, .. }) => {
				let name = name.ok_or(BsonError::WriteOutOfTurn { op })?;
				entries.push((name, value));
				Ok(())
			}
			Some(WriteFrame::Array { items, .. }) => {
				items.push(value);
				Ok(())
			}
			None => Err(BsonError::WriteOutOfTurn { op }),
		}
	}
}

impl BsonWriter for DocumentWriter {
	fn write_start_document(&mut self) -> Result<()> {
		if self.frames.is_empty() {
			if self.root.is_some() {
				return Err(BsonError::WriteOutOfTurn { op: "write_start_document" });
			}
			self.frames.push(WriteFrame::Document {
				name: None,
				entries: Vec::new(),
				pending: None,
			});
			return Ok(());
		}
		let name = self.take_pending("write_start_document")?;
		self.frames.push(WriteFrame::Document { name, entries: Vec::new(), pending: None });
		Ok(())
	}

	fn write_end_document(&mut self) -> Result<()> {
		match self.frames.pop() {
			Some(WriteFrame::Document { name, entries, pending: None }) => {
				let doc = BsonDocument::from(entries);
				if self.frames.is_empty() {
					self.root = Some(doc);
					Ok(())
				} else {
					self.attach(name, BsonValue::Document(doc), "write_end_document")
				}
			}
			Some(frame) => {
				self.frames.push(frame);
				Err(BsonError::WriteOutOfTurn { op: "write_end_document" })
			}
			None => Err(BsonError::WriteOutOfTurn { op: "write_end_document" }),
		}
	}

	fn write_start_array(&mut self) -> Result<()> {
		if self.frames.is_empty() {
			return Err(BsonError::WriteOutOfTurn { op: "write_start_array" });
		}
		let name = self.take_pending("write_start_array")?;
		self.frames.push(WriteFrame::Array { name, items: Vec::new() });
		Ok(())
	}

	fn write_end_array(&mut self) -> Result<()> {
		match self.frames.pop() {
			Some(WriteFrame::Array { name, items }) => {
				self.attach(name, BsonValue::Array(items), "write_end_array")
			}
			Some(frame) => {
				self.frames.push(frame);
				Err(BsonError::WriteOutOfTurn { op: "write_end_array" })
			}
			None => Err(BsonError::WriteOutOfTurn { op: "write_end_array" }),
		}
	}

	fn write_name(&mut self, name: &str) -> Result<()> {
		match self.frames.last_mut() {
			Some(WriteFrame::Document { pending: pending @ None, .. }) => {
				*pending = Some(name.to_owned());
				Ok(())
			}
			_ => Err(BsonError::WriteOutOfTurn { op: "write_name" }),
		}
	}

	fn write_boolean(&mut self, value: bool) -> Result<()> {
		self.push_value(BsonValue::Boolean(value), "write_boolean")
	}

	fn write_int32(&mut self, value: i32) -> Result<()> {
		self.push_value(BsonValue::Int32(value), "write_int32")
	}

	fn write_int64(&mut self, value: i64) -> Result<()> {
		self.push_value(BsonValue::Int64(value), "write_int64")
	}

	fn write_double(&mut self, value: f64) -> Result<()> {
		self.push_value(BsonValue::Double(value), "write_double")
	}

	fn write_string(&mut self, value: &str) -> Result<()> {
		self.push_value(BsonValue::String(value.to_owned()), "write_string")
	}

	fn write_date_time(&mut self, millis: i64) -> Result<()> {
		self.push_value(BsonValue::DateTime(millis), "write_date_time")
	}

	fn write_binary(&mut self, subtype: u8, bytes: &[u8]) -> Result<()> {
		self.push_value(BsonValue::Binary { subtype, bytes: bytes.to_vec() }, "write_binary")
	}

	fn write_object_id(&mut self, bytes: [u8; 12]) -> Result<()> {
		self.push_value(BsonValue::ObjectId(bytes), "write_object_id")
	}

	fn write_null(&mut self) -> Result<()> {
		self.push_value(BsonValue::Null, "write_null")
	}
}
