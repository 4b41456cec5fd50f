//! codescope-vector: semantic index over stored node embeddings.
//!
//! Vectors live in the relational store (one entry per node); search is an
//! exhaustive cosine scan sorted by score. The embedding model itself is
//! external, behind the [`Embedder`] trait; this crate only builds the
//! semantic text for a node and ranks stored vectors.

use codescope_core::{CodescopeError, Node, VectorEntry};
use codescope_store::Store;
use serde::{Deserialize, Serialize};

/// External embedding backend. The engine never talks to a network itself;
/// callers supply an implementation (local model, test stub).
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input, all the same length.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CodescopeError>;

    /// Identifier recorded on stored vectors.
    fn model_name(&self) -> &str;
}

/// Options for a semantic search.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub limit: usize,
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            min_score: 0.0,
        }
    }
}

/// One semantic search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub node_id: String,
    pub score: f32,
}

/// Semantic index over the store's vector table.
pub struct VectorIndex<'a> {
    store: &'a Store,
}

impl<'a> VectorIndex<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Upsert the vector for a node. A model different from an existing
    /// entry's is allowed but flagged, since mixed-model scores are not
    /// comparable.
    pub fn store_vector(
        &self,
        node_id: &str,
        embedding: Vec<f32>,
        model: &str,
    ) -> Result<(), CodescopeError> {
        if let Some(existing) = self.store.get_vector(node_id)? {
            if existing.model != model {
                tracing::warn!(
                    node_id,
                    old_model = %existing.model,
                    new_model = %model,
                    "replacing vector from a different embedding model"
                );
            }
        }
        self.store.upsert_vector(&VectorEntry {
            node_id: node_id.to_string(),
            embedding,
            model: model.to_string(),
        })
    }

    /// Upsert a batch of vectors in a single transaction.
    pub fn store_vector_batch(
        &self,
        entries: Vec<(String, Vec<f32>)>,
        model: &str,
    ) -> Result<(), CodescopeError> {
        let entries: Vec<VectorEntry> = entries
            .into_iter()
            .map(|(node_id, embedding)| VectorEntry {
                node_id,
                embedding,
                model: model.to_string(),
            })
            .collect();
        self.store.upsert_vectors(&entries)
    }

    pub fn delete_vector(&self, node_id: &str) -> Result<bool, CodescopeError> {
        self.store.delete_vector(node_id)
    }

    /// Embed nodes through the external backend and store the vectors in
    /// one batch. Fails with EmbeddingUnavailable when no backend is
    /// configured; structural queries are unaffected either way.
    pub fn embed_and_store(
        &self,
        embedder: Option<&dyn Embedder>,
        nodes: &[Node],
    ) -> Result<usize, CodescopeError> {
        let Some(embedder) = embedder else {
            return Err(CodescopeError::EmbeddingUnavailable(
                "no embedding backend configured".to_string(),
            ));
        };
        if nodes.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = nodes.iter().map(semantic_text).collect();
        let vectors = embedder.embed(&texts)?;
        let entries: Vec<(String, Vec<f32>)> = nodes
            .iter()
            .map(|n| n.id.clone())
            .zip(vectors)
            .collect();
        let count = entries.len();
        self.store_vector_batch(entries, embedder.model_name())?;
        Ok(count)
    }

    /// Embed a query string and rank stored vectors against it.
    pub fn semantic_search(
        &self,
        embedder: Option<&dyn Embedder>,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchHit>, CodescopeError> {
        let Some(embedder) = embedder else {
            return Err(CodescopeError::EmbeddingUnavailable(
                "no embedding backend configured".to_string(),
            ));
        };
        let mut vectors = embedder.embed(&[query.to_string()])?;
        let query_vec = vectors.pop().ok_or_else(|| {
            CodescopeError::EmbeddingUnavailable("backend returned no vector".to_string())
        })?;
        self.search(&query_vec, options)
    }

    /// Brute-force cosine search over every stored vector, descending by
    /// score, filtered by `min_score`.
    pub fn search(
        &self,
        query: &[f32],
        options: SearchOptions,
    ) -> Result<Vec<SearchHit>, CodescopeError> {
        let entries = self.store.all_vectors()?;

        let mut models_seen: Vec<&str> = Vec::new();
        let mut hits = Vec::with_capacity(entries.len());
        for entry in &entries {
            if !models_seen.contains(&entry.model.as_str()) {
                models_seen.push(&entry.model);
            }
            let score = cosine(query, &entry.embedding)?;
            if score >= options.min_score {
                hits.push(SearchHit {
                    node_id: entry.node_id.clone(),
                    score,
                });
            }
        }

        if models_seen.len() > 1 {
            tracing::warn!(
                models = ?models_seen,
                "vector index contains embeddings from multiple models; scores may not be comparable"
            );
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        hits.truncate(options.limit);
        Ok(hits)
    }
}

/// Cosine similarity: dot(a,b) / (||a||·||b||).
///
/// Returns 0 when either vector is the zero vector; mixing dimensions is an
/// error.
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32, CodescopeError> {
    if a.len() != b.len() {
        return Err(CodescopeError::Vector(format!(
            "dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Build the text a node is embedded from: its salient attributes joined
/// with labeled prefixes.
pub fn semantic_text(node: &Node) -> String {
    let mut parts = vec![
        format!("kind: {}", node.kind),
        format!("name: {}", node.name),
        format!("qualified: {}", node.qualified_name),
        format!("file: {}", node.file_path),
    ];
    if let Some(signature) = &node.signature {
        parts.push(format!("signature: {signature}"));
    }
    if let Some(docstring) = &node.docstring {
        parts.push(format!("doc: {docstring}"));
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_core::{node_id, FileRecord, NodeKind, Span};

    fn seed_node(store: &Store, name: &str) -> String {
        if store.get_file("a.ts").unwrap().is_none() {
            store
                .upsert_file(&FileRecord {
                    path: "a.ts".to_string(),
                    language: "typescript".to_string(),
                    content_hash: "h".to_string(),
                    size: 1,
                    indexed_at: chrono::Utc::now(),
                })
                .unwrap();
        }
        let id = node_id(NodeKind::Function, "a.ts", name, 1);
        store
            .upsert_node(&Node {
                id: id.clone(),
                kind: NodeKind::Function,
                name: name.to_string(),
                qualified_name: name.to_string(),
                language: "typescript".to_string(),
                file_path: "a.ts".to_string(),
                span: Span::default(),
                signature: None,
                docstring: None,
                is_exported: false,
                updated_at: chrono::Utc::now(),
            })
            .unwrap();
        id
    }

    #[test]
    fn cosine_identities() {
        let v = vec![0.6, 0.8, 0.0];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();
        let zero = vec![0.0, 0.0, 0.0];

        assert!((cosine(&v, &v).unwrap() - 1.0).abs() < 1e-5);
        assert!((cosine(&v, &neg).unwrap() + 1.0).abs() < 1e-5);
        assert_eq!(cosine(&v, &zero).unwrap(), 0.0);
    }

    #[test]
    fn cosine_rejects_mixed_dimensions() {
        let err = cosine(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(matches!(err, Err(CodescopeError::Vector(_))));
    }

    #[test]
    fn search_ranks_by_similarity() {
        let store = Store::open_in_memory().unwrap();
        let a = seed_node(&store, "a");
        let b = seed_node(&store, "b");
        let c = seed_node(&store, "c");

        let index = VectorIndex::new(&store);
        let norm = (0.9f32 * 0.9 + 0.1 * 0.1).sqrt();
        index.store_vector(&a, vec![1.0, 0.0, 0.0], "m").unwrap();
        index
            .store_vector(&b, vec![0.9 / norm, 0.1 / norm, 0.0], "m")
            .unwrap();
        index.store_vector(&c, vec![0.0, 1.0, 0.0], "m").unwrap();

        let hits = index
            .search(
                &[1.0, 0.0, 0.0],
                SearchOptions {
                    limit: 3,
                    min_score: -1.0,
                },
            )
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].node_id, a);
        assert_eq!(hits[1].node_id, b);
        assert_eq!(hits[2].node_id, c);
        assert!((hits[0].score - 1.0).abs() < 1e-5);

        let filtered = index
            .search(
                &[1.0, 0.0, 0.0],
                SearchOptions {
                    limit: 3,
                    min_score: 0.5,
                },
            )
            .unwrap();
        let ids: Vec<&str> = filtered.iter().map(|h| h.node_id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a.as_str()));
        assert!(ids.contains(&b.as_str()));
    }

    #[test]
    fn search_limit_truncates() {
        let store = Store::open_in_memory().unwrap();
        let index = VectorIndex::new(&store);
        for name in ["a", "b", "c", "d"] {
            let id = seed_node(&store, name);
            index.store_vector(&id, vec![1.0, 0.0], "m").unwrap();
        }
        let hits = index
            .search(&[1.0, 0.0], SearchOptions { limit: 2, min_score: 0.0 })
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn batch_upsert_stores_all() {
        let store = Store::open_in_memory().unwrap();
        let a = seed_node(&store, "a");
        let b = seed_node(&store, "b");
        let index = VectorIndex::new(&store);
        index
            .store_vector_batch(
                vec![(a.clone(), vec![1.0, 0.0]), (b, vec![0.0, 1.0])],
                "m",
            )
            .unwrap();
        assert_eq!(store.vector_count().unwrap(), 2);
        assert!(index.delete_vector(&a).unwrap());
    }

    /// Deterministic toy backend: counts occurrences of three keywords.
    struct KeywordEmbedder;

    impl Embedder for KeywordEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CodescopeError> {
            Ok(texts
                .iter()
                .map(|t| {
                    vec![
                        t.matches("auth").count() as f32,
                        t.matches("parse").count() as f32,
                        1.0,
                    ]
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "keyword-test"
        }
    }

    #[test]
    fn missing_backend_fails_semantic_queries_only() {
        let store = Store::open_in_memory().unwrap();
        let id = seed_node(&store, "a");
        let index = VectorIndex::new(&store);
        index.store_vector(&id, vec![1.0, 0.0], "m").unwrap();

        let err = index.semantic_search(None, "anything", SearchOptions::default());
        assert!(matches!(err, Err(CodescopeError::EmbeddingUnavailable(_))));

        // The structural path is unaffected.
        assert_eq!(index.search(&[1.0, 0.0], SearchOptions::default()).unwrap().len(), 1);
    }

    #[test]
    fn embed_and_store_then_search_ranks_by_content() {
        let store = Store::open_in_memory().unwrap();
        let auth_id = seed_node(&store, "authenticate");
        let parse_id = seed_node(&store, "parse_header");

        let auth_node = store.get_node_by_id(&auth_id).unwrap().unwrap();
        let parse_node = store.get_node_by_id(&parse_id).unwrap().unwrap();

        let index = VectorIndex::new(&store);
        let embedder = KeywordEmbedder;
        let stored = index
            .embed_and_store(Some(&embedder), &[auth_node, parse_node])
            .unwrap();
        assert_eq!(stored, 2);

        let hits = index
            .semantic_search(Some(&embedder), "auth token login", SearchOptions::default())
            .unwrap();
        assert_eq!(hits[0].node_id, auth_id);
    }

    #[test]
    fn embed_and_store_without_backend_is_unavailable() {
        let store = Store::open_in_memory().unwrap();
        let index = VectorIndex::new(&store);
        let err = index.embed_and_store(None, &[]);
        assert!(matches!(err, Err(CodescopeError::EmbeddingUnavailable(_))));
    }

    #[test]
    fn semantic_text_carries_labeled_fields() {
        let node = Node {
            id: "x".to_string(),
            kind: NodeKind::Method,
            name: "login".to_string(),
            qualified_name: "AuthService.login".to_string(),
            language: "typescript".to_string(),
            file_path: "src/auth.ts".to_string(),
            span: Span::default(),
            signature: Some("login(user: string): Token".to_string()),
            docstring: Some("Validates credentials.".to_string()),
            is_exported: true,
            updated_at: chrono::Utc::now(),
        };
        let text = semantic_text(&node);
        assert!(text.contains("kind: method"));
        assert!(text.contains("qualified: AuthService.login"));
        assert!(text.contains("signature: login(user: string): Token"));
        assert!(text.contains("doc: Validates credentials."));
    }
}
