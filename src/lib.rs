//! BSON-style document codec: a structural traversal protocol mapped onto
//! token-oriented documents.

/// Document value model, codec engines, configuration, and text projection.
pub mod bson;
