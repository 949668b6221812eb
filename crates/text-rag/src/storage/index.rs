//! Persistent vector index backed by SQLite

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbedderIdentity, EmbeddingProvider};
use crate::types::Chunk;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::cmp::Ordering;
use std::path::Path;
use uuid::Uuid;

const INDEX_DB_FILE: &str = "index.db";

/// Metadata recorded alongside a built index
#[derive(Debug, Clone)]
pub struct IndexMeta {
    /// Identity of the embedder the index was built with
    pub embedder: EmbedderIdentity,
    /// Chunk size the corpus was split with
    pub chunk_size: usize,
    /// Chunk overlap the corpus was split with
    pub chunk_overlap: usize,
    /// Fingerprint of the corpus the index was built from
    pub corpus_hash: String,
    /// When the index was built
    pub built_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct VectorRecord {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// An immutable in-memory snapshot of the chunk index.
///
/// Built from chunks and an embedder, persisted to a SQLite database,
/// and reopened from that database on later runs. Queries scan the
/// snapshot with cosine similarity and never touch the database.
pub struct VectorIndex {
    meta: IndexMeta,
    records: Vec<VectorRecord>,
}

impl VectorIndex {
    /// Check whether an index database exists under `dir`
    pub fn exists(dir: &Path) -> bool {
        dir.join(INDEX_DB_FILE).exists()
    }

    /// Build an index from chunks and persist it under `dir`.
    ///
    /// All chunks are embedded before anything is written, so a failed
    /// embedding leaves no partial index behind. An existing index in
    /// the same directory is replaced in a single transaction.
    pub async fn build(
        dir: &Path,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingProvider,
        chunking: &ChunkingConfig,
        corpus_hash: &str,
        batch_size: usize,
    ) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let expected_dims = embedder.dimensions();

        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let batch_embeddings = embedder
                .embed_batch(&texts)
                .await
                .map_err(|e| Error::index_build(format!("embedding failed: {}", e)))?;

            if batch_embeddings.len() != batch.len() {
                return Err(Error::index_build(format!(
                    "embedder returned {} vectors for {} chunks",
                    batch_embeddings.len(),
                    batch.len()
                )));
            }
            for embedding in &batch_embeddings {
                if embedding.len() != expected_dims {
                    return Err(Error::index_build(format!(
                        "embedder returned a {}-dimensional vector, expected {}",
                        embedding.len(),
                        expected_dims
                    )));
                }
            }
            embeddings.extend(batch_embeddings);
        }

        let meta = IndexMeta {
            embedder: embedder.identity(),
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
            corpus_hash: corpus_hash.to_string(),
            built_at: Utc::now(),
        };

        std::fs::create_dir_all(dir)?;
        let mut conn = Connection::open(dir.join(INDEX_DB_FILE))?;
        migrate(&conn)?;

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM chunks", [])?;
        tx.execute("DELETE FROM index_meta", [])?;
        tx.execute(
            "INSERT INTO index_meta (id, embed_model, embed_dimensions, chunk_size, chunk_overlap, corpus_hash, built_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                meta.embedder.model,
                meta.embedder.dimensions as i64,
                meta.chunk_size as i64,
                meta.chunk_overlap as i64,
                meta.corpus_hash,
                meta.built_at.to_rfc3339(),
            ],
        )?;

        for (position, (chunk, embedding)) in chunks.iter().zip(embeddings.iter()).enumerate() {
            tx.execute(
                "INSERT INTO chunks (position, chunk_id, document_id, source, content, char_start, char_end, chunk_index, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    position as i64,
                    chunk.id.to_string(),
                    chunk.document_id.to_string(),
                    chunk.source,
                    chunk.content,
                    chunk.char_start as i64,
                    chunk.char_end as i64,
                    chunk.chunk_index as i64,
                    embedding_to_blob(embedding),
                ],
            )?;
        }
        tx.commit()?;

        tracing::info!(
            chunks = chunks.len(),
            embedder = %meta.embedder,
            dir = %dir.display(),
            "Built vector index"
        );

        let records = chunks
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord { chunk, embedding })
            .collect();

        Ok(Self { meta, records })
    }

    /// Open a previously built index from `dir`.
    ///
    /// Fails if no index exists there or if the index was built with a
    /// different embedder than `expected`.
    pub fn open(dir: &Path, expected: &EmbedderIdentity) -> Result<Self> {
        let path = dir.join(INDEX_DB_FILE);
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }

        let conn = Connection::open(&path)?;
        let meta = read_meta(&conn)?;

        if meta.embedder != *expected {
            return Err(Error::config(format!(
                "Index was built with embedder {} but {} is configured; rebuild the index",
                meta.embedder, expected
            )));
        }

        let mut stmt = conn.prepare(
            "SELECT chunk_id, document_id, source, content, char_start, char_end, chunk_index, embedding
             FROM chunks ORDER BY position",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, Vec<u8>>(7)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (chunk_id, document_id, source, content, char_start, char_end, chunk_index, blob) in
            rows
        {
            let chunk = Chunk {
                id: parse_uuid(&chunk_id)?,
                document_id: parse_uuid(&document_id)?,
                source,
                content,
                char_start: char_start as usize,
                char_end: char_end as usize,
                chunk_index: chunk_index as u32,
            };
            records.push(VectorRecord {
                chunk,
                embedding: blob_to_embedding(&blob)?,
            });
        }

        tracing::info!(
            chunks = records.len(),
            embedder = %meta.embedder,
            dir = %dir.display(),
            "Opened vector index"
        );

        Ok(Self { meta, records })
    }

    /// Return the `k` most similar chunks to `vector`, best first.
    ///
    /// Equal scores are broken by index position, so results are
    /// deterministic for a given index and query.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<(Chunk, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .records
            .iter()
            .enumerate()
            .map(|(position, record)| (position, cosine_similarity(vector, &record.embedding)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        scored
            .into_iter()
            .take(k)
            .map(|(position, score)| (self.records[position].chunk.clone(), score))
            .collect()
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index metadata
    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// Fingerprint of the corpus the index was built from
    pub fn corpus_hash(&self) -> &str {
        &self.meta.corpus_hash
    }

    /// Identity of the embedder the index was built with
    pub fn embedder_identity(&self) -> &EmbedderIdentity {
        &self.meta.embedder
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;

         CREATE TABLE IF NOT EXISTS index_meta (
             id INTEGER PRIMARY KEY CHECK (id = 1),
             embed_model TEXT NOT NULL,
             embed_dimensions INTEGER NOT NULL,
             chunk_size INTEGER NOT NULL,
             chunk_overlap INTEGER NOT NULL,
             corpus_hash TEXT NOT NULL,
             built_at TEXT NOT NULL
         );

         CREATE TABLE IF NOT EXISTS chunks (
             position INTEGER PRIMARY KEY,
             chunk_id TEXT NOT NULL,
             document_id TEXT NOT NULL,
             source TEXT NOT NULL,
             content TEXT NOT NULL,
             char_start INTEGER NOT NULL,
             char_end INTEGER NOT NULL,
             chunk_index INTEGER NOT NULL,
             embedding BLOB NOT NULL
         );",
    )?;
    Ok(())
}

fn read_meta(conn: &Connection) -> Result<IndexMeta> {
    let row = conn
        .query_row(
            "SELECT embed_model, embed_dimensions, chunk_size, chunk_overlap, corpus_hash, built_at
             FROM index_meta WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let (model, dimensions, chunk_size, chunk_overlap, corpus_hash, built_at) =
        row.ok_or_else(|| Error::internal("Index database has no metadata row"))?;

    let built_at = DateTime::parse_from_rfc3339(&built_at)
        .map_err(|e| Error::internal(format!("Corrupt built_at timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(IndexMeta {
        embedder: EmbedderIdentity::new(model, dimensions as usize),
        chunk_size: chunk_size as usize,
        chunk_overlap: chunk_overlap as usize,
        corpus_hash,
        built_at,
    })
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::internal(format!("Corrupt UUID in index: {}", e)))
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn blob_to_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::internal(format!(
            "Corrupt embedding blob of {} bytes",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let denom = norm_a * norm_b;
    if denom <= f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Document;
    use async_trait::async_trait;

    struct MockEmbedder {
        dimensions: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut vector = vec![0.0f32; self.dimensions];
            for (i, byte) in text.bytes().enumerate() {
                vector[i % self.dimensions] += byte as f32 / 255.0;
            }
            Ok(vector)
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn model(&self) -> &str {
            "mock-embed"
        }

        fn name(&self) -> &str {
            "mock"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("mock embedder failure"))
        }

        fn dimensions(&self) -> usize {
            8
        }

        fn model(&self) -> &str {
            "failing-embed"
        }

        fn name(&self) -> &str {
            "failing"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }
    }

    fn make_chunks(texts: &[&str]) -> Vec<Chunk> {
        let document = Document::new("test.txt", texts.join(" "), "hash");
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(&document, *text, 0, text.chars().count(), i as u32))
            .collect()
    }

    fn chunking() -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }

    #[tokio::test]
    async fn test_build_indexes_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder { dimensions: 8 };
        let chunks = make_chunks(&["alpha text", "beta text", "gamma text"]);

        let index = VectorIndex::build(dir.path(), &chunks, &embedder, &chunking(), "hash", 2)
            .await
            .unwrap();

        assert_eq!(index.len(), 3);
        assert!(VectorIndex::exists(dir.path()));
        assert_eq!(index.corpus_hash(), "hash");
        assert_eq!(index.embedder_identity().model, "mock-embed");
    }

    #[tokio::test]
    async fn test_query_returns_at_most_k() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder { dimensions: 8 };
        let chunks = make_chunks(&["one", "two", "three", "four"]);
        let index = VectorIndex::build(dir.path(), &chunks, &embedder, &chunking(), "hash", 64)
            .await
            .unwrap();

        let query = embedder.embed("one").await.unwrap();
        assert_eq!(index.query(&query, 2).len(), 2);
        assert_eq!(index.query(&query, 10).len(), 4);
        assert!(index.query(&query, 0).is_empty());
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder { dimensions: 8 };
        // Different lengths spread mass over different dimensions, so the
        // vectors point in genuinely different directions. Inserted
        // farthest-first to show ordering follows similarity, not position.
        let chunks = make_chunks(&["aaaaaaaa", "aaaa", "aa"]);
        let index = VectorIndex::build(dir.path(), &chunks, &embedder, &chunking(), "hash", 64)
            .await
            .unwrap();

        let query = embedder.embed("aa").await.unwrap();
        let results = index.query(&query, 3);

        assert_eq!(results[0].0.content, "aa");
        assert_eq!(results[1].0.content, "aaaa");
        assert_eq!(results[2].0.content, "aaaaaaaa");
        assert!(results[0].1 > results[1].1);
        assert!(results[1].1 > results[2].1);
    }

    #[tokio::test]
    async fn test_equal_scores_break_ties_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder { dimensions: 8 };
        // Identical content embeds identically, so all scores tie.
        let chunks = make_chunks(&["same", "same", "same"]);
        let index = VectorIndex::build(dir.path(), &chunks, &embedder, &chunking(), "hash", 64)
            .await
            .unwrap();

        let query = embedder.embed("same").await.unwrap();
        let results = index.query(&query, 3);

        assert_eq!(results[0].0.id, chunks[0].id);
        assert_eq!(results[1].0.id, chunks[1].id);
        assert_eq!(results[2].0.id, chunks[2].id);
    }

    #[tokio::test]
    async fn test_reopen_restores_chunks_and_scores() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder { dimensions: 8 };
        let chunks = make_chunks(&["alpha text", "beta text"]);

        let built = VectorIndex::build(dir.path(), &chunks, &embedder, &chunking(), "hash", 64)
            .await
            .unwrap();
        let query = embedder.embed("alpha").await.unwrap();
        let before = built.query(&query, 2);
        drop(built);

        let reopened = VectorIndex::open(dir.path(), &embedder.identity()).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.corpus_hash(), "hash");

        let after = reopened.query(&query, 2);
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b.0.id, a.0.id);
            assert_eq!(b.0.content, a.0.content);
            assert!((b.1 - a.1).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_open_rejects_different_embedder() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder { dimensions: 8 };
        let chunks = make_chunks(&["alpha"]);
        VectorIndex::build(dir.path(), &chunks, &embedder, &chunking(), "hash", 64)
            .await
            .unwrap();

        let other = EmbedderIdentity::new("other-model", 8);
        assert!(matches!(
            VectorIndex::open(dir.path(), &other),
            Err(Error::Config(_))
        ));

        let wrong_dims = EmbedderIdentity::new("mock-embed", 16);
        assert!(matches!(
            VectorIndex::open(dir.path(), &wrong_dims),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_open_missing_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        let identity = EmbedderIdentity::new("mock-embed", 8);
        assert!(matches!(
            VectorIndex::open(dir.path(), &identity),
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_embedding_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = make_chunks(&["alpha", "beta"]);

        let result =
            VectorIndex::build(dir.path(), &chunks, &FailingEmbedder, &chunking(), "hash", 64)
                .await;

        assert!(matches!(result, Err(Error::IndexBuild(_))));
        assert!(!VectorIndex::exists(dir.path()));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder { dimensions: 8 };

        let first = make_chunks(&["old one", "old two", "old three"]);
        VectorIndex::build(dir.path(), &first, &embedder, &chunking(), "hash-1", 64)
            .await
            .unwrap();

        let second = make_chunks(&["new one"]);
        VectorIndex::build(dir.path(), &second, &embedder, &chunking(), "hash-2", 64)
            .await
            .unwrap();

        let reopened = VectorIndex::open(dir.path(), &embedder.identity()).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.corpus_hash(), "hash-2");
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn test_embedding_blob_round_trip() {
        let embedding = vec![0.25f32, -1.5, 3.125, 0.0];
        let blob = embedding_to_blob(&embedding);
        assert_eq!(blob.len(), 16);
        assert_eq!(blob_to_embedding(&blob).unwrap(), embedding);
        assert!(blob_to_embedding(&blob[..3]).is_err());
    }
}
