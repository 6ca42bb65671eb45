use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};

use sciqa_core::types::{ChunkMeta, Hit};

/// Cosine nearest neighbours of `vector`, ascending by `_distance`.
pub async fn vector_search(table: &Table, vector: &[f32], k: usize) -> Result<Vec<Hit>> {
	let mut stream = table
		.vector_search(vector.to_vec())?
		.distance_type(DistanceType::Cosine)
		.limit(k)
		.execute()
		.await?;
	let mut hits = Vec::with_capacity(k);
	while let Some(batch) = TryStreamExt::try_next(&mut stream).await? {
		hits.extend(batch_to_hits(&batch)?);
	}
	hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
	hits.truncate(k);
	Ok(hits)
}

pub fn batch_to_hits(batch: &RecordBatch) -> Result<Vec<Hit>> {
	let doc_ids = string_col(batch, "doc_id")?;
	let paths = string_col(batch, "doc_path")?;
	let sections = string_col(batch, "section")?;
	let contents = string_col(batch, "content")?;
	let indices = column::<Int32Array>(batch, "chunk_index")?;
	let distances = column::<Float32Array>(batch, "_distance")?;

	let mut hits = Vec::with_capacity(batch.num_rows());
	for i in 0..batch.num_rows() {
		let section = sections.is_valid(i).then(|| sections.value(i).to_string());
		hits.push(Hit {
			content: contents.value(i).to_string(),
			meta: ChunkMeta {
				doc_id: doc_ids.value(i).to_string(),
				chunk_index: usize::try_from(indices.value(i))?,
				source: paths.value(i).to_string(),
				section,
			},
			distance: distances.value(i),
		});
	}
	Ok(hits)
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	column::<StringArray>(batch, name)
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<T>())
		.ok_or_else(|| anyhow!("column '{name}' missing or of unexpected type"))
}
