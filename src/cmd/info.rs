use std::collections::BTreeMap;
use std::path::PathBuf;

use bindoc::bson::{BsonDocument, BsonValue, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
}

/// Print high-level document statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path } = args;

	let text = std::fs::read_to_string(&path)?;
	let document = BsonDocument::parse(&text)?;

	let mut counts = BTreeMap::new();
	let mut max_depth = 0;
	scan_document(&document, 1, &mut counts, &mut max_depth);

	println!("path: {}", path.display());
	println!("fields: {}", document.len());
	println!("max_depth: {max_depth}");
	println!("types:");
	for (label, count) in counts {
		println!("  {label}: {count}");
	}

	Ok(())
}

fn scan_document(
	document: &BsonDocument,
	depth: usize,
	counts: &mut BTreeMap<&'static str, usize>,
	max_depth: &mut usize,
) {
	*max_depth = (*max_depth).max(depth);
	for (_, value) in document.iter() {
		scan_value(value, depth, counts, max_depth);
	}
}

fn scan_value(
	value: &BsonValue,
	depth: usize,
	counts: &mut BTreeMap<&'static str, usize>,
	max_depth: &mut usize,
) {
	*counts.entry(value.bson_type().label()).or_insert(0) += 1;
	match value {
		BsonValue::Document(doc) => scan_document(doc, depth + 1, counts, max_depth),
		BsonValue::Array(items) => {
			*max_depth = (*max_depth).max(depth + 1);
			for item in items {
				scan_value(item, depth + 1, counts, max_depth);
			}
		}
		_ => {}
	}
}
