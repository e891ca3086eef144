/// Token tree dump command.
pub mod dump;
/// Document-level information command.
pub mod info;
