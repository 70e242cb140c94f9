//! Dense node embeddings read back from a trained model

use crate::errors::LookupError;
use crate::graph::NodeId;
use crate::trainer::TokenVectors;

/// Row-major embedding matrix, row `i` belonging to node `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    dimensions: usize,
    data: Vec<f32>,
    expected_nodes: usize,
    missing: Vec<NodeId>,
}

impl Embedding {
    /// Copies vectors for ids `0, 1, 2, …` out of `model`, stopping at the
    /// first id the model has no vector for.
    ///
    /// The row count can therefore be smaller than the graph; nodes of
    /// `node_ids` without a row are listed by [`Embedding::missing_nodes`].
    /// Backend failures abort extraction.
    pub fn extract<V: TokenVectors + ?Sized>(
        model: &V,
        node_ids: &[NodeId],
    ) -> Result<Self, LookupError> {
        let dimensions = model.dimensions();
        let mut data = Vec::with_capacity(node_ids.len() * dimensions);
        let mut rows = 0usize;

        loop {
            let token = rows.to_string();
            match model.vector(&token) {
                Ok(vector) if vector.len() == dimensions => data.extend_from_slice(vector),
                Ok(vector) => {
                    return Err(LookupError::Backend {
                        token,
                        reason: format!("expected {dimensions} values, got {}", vector.len()),
                    })
                }
                Err(LookupError::NotInVocabulary(_)) => break,
                Err(e) => return Err(e),
            }
            rows += 1;
        }

        let mut missing: Vec<NodeId> = node_ids.iter().copied().filter(|&id| id >= rows).collect();
        missing.sort_unstable();
        missing.dedup();

        tracing::debug!(rows, expected = node_ids.len(), "Found consecutive node vectors");
        Ok(Self {
            dimensions,
            data,
            expected_nodes: node_ids.len(),
            missing,
        })
    }

    pub fn rows(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.data.len() / self.dimensions
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn row(&self, node: NodeId) -> Option<&[f32]> {
        let start = node.checked_mul(self.dimensions)?;
        let end = start.checked_add(self.dimensions)?;
        self.data.get(start..end)
    }

    /// The matrix as one flat row-major slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.data
            .chunks(self.dimensions.max(1))
            .map(<[f32]>::to_vec)
            .collect()
    }

    /// Number of nodes the graph had when the embedding was extracted.
    pub fn expected_nodes(&self) -> usize {
        self.expected_nodes
    }

    /// Graph nodes that received no row, in ascending order.
    pub fn missing_nodes(&self) -> &[NodeId] {
        &self.missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedVectors {
        dimensions: usize,
        vectors: HashMap<String, Vec<f32>>,
        broken: Option<String>,
    }

    impl FixedVectors {
        fn for_ids(ids: impl IntoIterator<Item = usize>, dimensions: usize) -> Self {
            let vectors = ids
                .into_iter()
                .map(|id| (id.to_string(), vec![id as f32; dimensions]))
                .collect();
            Self {
                dimensions,
                vectors,
                broken: None,
            }
        }
    }

    impl TokenVectors for FixedVectors {
        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn vector(&self, token: &str) -> Result<&[f32], LookupError> {
            if self.broken.as_deref() == Some(token) {
                return Err(LookupError::Backend {
                    token: token.to_string(),
                    reason: "index corrupted".to_string(),
                });
            }
            self.vectors
                .get(token)
                .map(Vec::as_slice)
                .ok_or_else(|| LookupError::NotInVocabulary(token.to_string()))
        }
    }

    #[test]
    fn stops_at_first_missing_id() {
        let model = FixedVectors::for_ids((0..42).chain(43..50), 3);
        let nodes: Vec<NodeId> = (0..50).collect();

        let embedding = Embedding::extract(&model, &nodes).unwrap();

        assert_eq!(embedding.rows(), 42);
        assert_eq!(embedding.missing_nodes(), (42..50).collect::<Vec<_>>().as_slice());
        assert!(!embedding.is_complete());
        assert_eq!(embedding.row(41), Some(&[41.0, 41.0, 41.0][..]));
        assert_eq!(embedding.row(42), None);
    }

    #[test]
    fn complete_model_fills_every_row() {
        let model = FixedVectors::for_ids(0..5, 2);
        let nodes: Vec<NodeId> = (0..5).collect();

        let embedding = Embedding::extract(&model, &nodes).unwrap();

        assert!(embedding.is_complete());
        assert_eq!(embedding.to_rows()[3], vec![3.0, 3.0]);
        assert_eq!(embedding.as_slice().len(), 10);
    }

    #[test]
    fn backend_failures_are_not_treated_as_gaps() {
        let mut model = FixedVectors::for_ids(0..5, 2);
        model.broken = Some("2".to_string());

        let err = Embedding::extract(&model, &[0, 1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, LookupError::Backend { token, .. } if token == "2"));
    }

    #[test]
    fn wrong_vector_length_is_a_backend_error() {
        let mut model = FixedVectors::for_ids(0..2, 2);
        model.vectors.insert("1".to_string(), vec![1.0]);

        let err = Embedding::extract(&model, &[0, 1]).unwrap_err();
        assert!(matches!(err, LookupError::Backend { .. }));
    }

    #[test]
    fn huge_node_id_has_no_row() {
        let model = FixedVectors::for_ids(0..2, 3);
        let embedding = Embedding::extract(&model, &[0, 1]).unwrap();

        assert_eq!(embedding.row(usize::MAX / 3), None);
        assert_eq!(embedding.row(usize::MAX), None);
    }
}
