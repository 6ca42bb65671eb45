use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Row layout of the chunk table. `dim` is the embedder's output width.
pub fn build_arrow_schema(dim: usize) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("doc_id", DataType::Utf8, false),
		Field::new("doc_path", DataType::Utf8, false),
		Field::new("section", DataType::Utf8, true),
		Field::new("content", DataType::Utf8, false),
		Field::new("chunk_index", DataType::Int32, false),
		Field::new("total_chunks", DataType::Int32, false),
		Field::new("overlap_chars", DataType::Int32, false),
		Field::new("vector", vector_type(dim), true),
	]))
}

pub fn vector_type(dim: usize) -> DataType {
	DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim as i32)
}
