//! Arrow conversion and add-or-replace writes for chunk rows.
use anyhow::{ensure, Result};
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use lancedb::{Connection, Table};
use std::sync::Arc;
use tracing::debug;

use sciqa_core::types::IndexEntry;

use crate::schema::build_arrow_schema;
use crate::table::{count_where, open_table, quote};

pub fn entries_to_record_batch(entries: &[IndexEntry], dim: usize) -> Result<RecordBatch> {
	for e in entries {
		ensure!(e.vector.len() == dim, "chunk {} has a {}-d vector, table expects {}", e.chunk.id, e.vector.len(), dim);
	}
	let schema = build_arrow_schema(dim);
	let mut ids = Vec::with_capacity(entries.len());
	let mut doc_ids = Vec::with_capacity(entries.len());
	let mut doc_paths = Vec::with_capacity(entries.len());
	let mut sections = Vec::with_capacity(entries.len());
	let mut contents = Vec::with_capacity(entries.len());
	let mut chunk_indices = Vec::with_capacity(entries.len());
	let mut total_chunks = Vec::with_capacity(entries.len());
	let mut overlaps = Vec::with_capacity(entries.len());
	let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(entries.len());
	for IndexEntry { chunk, vector } in entries {
		ids.push(chunk.id.clone());
		doc_ids.push(chunk.doc_id.clone());
		doc_paths.push(chunk.doc_path.clone());
		sections.push(chunk.section.clone());
		contents.push(chunk.content.clone());
		chunk_indices.push(i32::try_from(chunk.chunk_index)?);
		total_chunks.push(i32::try_from(chunk.total_chunks)?);
		overlaps.push(i32::try_from(chunk.overlap_chars)?);
		vectors.push(Some(vector.iter().map(|&x| Some(x)).collect()));
	}
	let record_batch = RecordBatch::try_new(schema, vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(doc_ids)),
		Arc::new(StringArray::from(doc_paths)),
		Arc::new(StringArray::from(sections)),
		Arc::new(StringArray::from(contents)),
		Arc::new(Int32Array::from(chunk_indices)),
		Arc::new(Int32Array::from(total_chunks)),
		Arc::new(Int32Array::from(overlaps)),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim as i32)),
	])?;
	Ok(record_batch)
}

/// Add-or-replace rows by `id`. Creates the table from the first batch.
pub async fn upsert_entries(conn: &Connection, table_name: &str, entries: &[IndexEntry], dim: usize) -> Result<()> {
	if entries.is_empty() { return Ok(()); }
	let record_batch = entries_to_record_batch(entries, dim)?;
	let schema = record_batch.schema();
	let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
	match open_table(conn, table_name).await? {
		Some(table) => {
			let mut mi = table.merge_insert(&["id"]);
			mi.when_matched_update_all(None).when_not_matched_insert_all();
			let res = mi.execute(reader).await?;
			debug!(table = table_name, inserted = res.num_inserted_rows, updated = res.num_updated_rows, "merge_insert");
		}
		None => {
			conn.create_table(table_name, reader).execute().await?;
			debug!(table = table_name, rows = entries.len(), "created table");
		}
	}
	Ok(())
}

/// Delete rows of `doc_id` with `chunk_index >= keep`; returns how many went.
pub async fn delete_stale_chunks(table: &Table, doc_id: &str, keep: usize) -> Result<usize> {
	let predicate = format!("doc_id = {} AND chunk_index >= {}", quote(doc_id), keep);
	let stale = count_where(table, &predicate).await?;
	if stale > 0 {
		table.delete(&predicate).await?;
	}
	Ok(stale)
}
