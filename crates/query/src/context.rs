use docqa_vector_store::VectorIndex;

/// Separates retrieved passages inside a context string.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Retrieve the `k` best passages for `query_vector` and join them in rank
/// order.
///
/// An empty or wrong-dimension query vector, an empty index, or a failed
/// search all yield `""`: callers treat that as "no relevant information".
#[must_use]
pub fn build_context(index: &VectorIndex, query_vector: &[f32], k: usize) -> String {
    if query_vector.is_empty() {
        log::warn!("Query embedding resulted in an empty vector.");
        return String::new();
    }
    if query_vector.len() != index.dimension() {
        log::warn!(
            "Query embedding has dimension {}, index expects {}",
            query_vector.len(),
            index.dimension()
        );
        return String::new();
    }

    log::info!("Searching for top {k} relevant chunks.");
    match index.search(query_vector, k) {
        Ok(hits) => {
            let passages: Vec<&str> = hits.iter().map(|hit| hit.payload.as_str()).collect();
            passages.join(CONTEXT_SEPARATOR)
        }
        Err(err) => {
            log::warn!("Context search failed: {err}");
            String::new()
        }
    }
}

/// Split a context string back into its passages
#[must_use]
pub fn split_context(context: &str) -> Vec<&str> {
    if context.is_empty() {
        return Vec::new();
    }
    context.split(CONTEXT_SEPARATOR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index() -> VectorIndex {
        let mut index = VectorIndex::in_memory(2).unwrap();
        index
            .add(
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.8, 0.6]],
                &["east".to_string(), "north".to_string(), "mostly east".to_string()],
            )
            .unwrap();
        index
    }

    #[test]
    fn joins_passages_in_rank_order() {
        let context = build_context(&index(), &[1.0, 0.0], 2);
        assert_eq!(context, "east\n\n---\n\nmostly east");
        assert_eq!(split_context(&context), vec!["east", "mostly east"]);
    }

    #[test]
    fn invalid_query_or_empty_index_gives_empty_context() {
        let index = index();
        assert_eq!(build_context(&index, &[], 3), "");
        assert_eq!(build_context(&index, &[1.0, 0.0, 0.0], 3), "");
        assert_eq!(build_context(&index, &[1.0, 0.0], 0), "");

        let empty = VectorIndex::in_memory(2).unwrap();
        assert_eq!(build_context(&empty, &[1.0, 0.0], 3), "");
        assert!(split_context("").is_empty());
    }
}
