use std::path::PathBuf;

use bindoc::bson::{BsonDocument, BsonValue, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Echo the parsed document back as JSON instead of the indented tree.
	#[arg(long)]
	pub json: bool,
}

/// Print the token tree of a document.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let text = std::fs::read_to_string(&path)?;
	let document = BsonDocument::parse(&text)?;

	if json {
		println!("{}", document.to_json()?);
		return Ok(());
	}

	println!("document");
	print_document(&document, 1);
	Ok(())
}

fn print_document(document: &BsonDocument, depth: usize) {
	for (name, value) in document.iter() {
		print_value(Some(name), value, depth);
	}
}

fn print_value(name: Option<&str>, value: &BsonValue, depth: usize) {
	let indent = "  ".repeat(depth);
	let slot = match name {
		Some(name) => name.to_owned(),
		None => "-".to_owned(),
	};
	match value {
		BsonValue::Document(doc) => {
			println!("{indent}{slot}: document");
			print_document(doc, depth + 1);
		}
		BsonValue::Array(items) => {
			println!("{indent}{slot}: array[{}]", items.len());
			for item in items {
				print_value(None, item, depth + 1);
			}
		}
		scalar => {
			println!("{indent}{slot}: {} {}", scalar.bson_type(), scalar_text(scalar));
		}
	}
}

fn scalar_text(value: &BsonValue) -> String {
	match value {
		BsonValue::Double(number) => number.to_string(),
		BsonValue::String(text) => format!("{text:?}"),
		BsonValue::Binary { subtype, bytes } => {
			format!("subtype={subtype} {}", hex::encode(bytes))
		}
		BsonValue::ObjectId(bytes) => hex::encode(bytes),
		BsonValue::Boolean(flag) => flag.to_string(),
		BsonValue::DateTime(millis) => millis.to_string(),
		BsonValue::Null => "null".to_owned(),
		BsonValue::Int32(number) => number.to_string(),
		BsonValue::Int64(number) => number.to_string(),
		BsonValue::Document(_) | BsonValue::Array(_) => String::new(),
	}
}
