//! Snapshot tests for indexing defaults

#[cfg(test)]
mod snapshot_tests {
    use insta::assert_yaml_snapshot;
    use spchat_core::{IndexingConfig, RetrievalQuery, SearchConfig};

    #[test]
    fn test_indexing_defaults_snapshot() {
        assert_yaml_snapshot!(IndexingConfig::default(), @r###"
        ---
        chunk_size: 1000
        chunk_overlap: 200
        "###);
    }

    #[test]
    fn test_search_defaults_snapshot() {
        assert_yaml_snapshot!(SearchConfig::default(), @r###"
        ---
        top_k: 4
        score_threshold: 0.1
        "###);
    }

    #[test]
    fn test_retrieval_query_defaults() {
        let query = RetrievalQuery::default();
        assert_eq!(query.top_k, 4);
        assert!(query.query.is_empty());
    }
}
