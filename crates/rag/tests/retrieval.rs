//! Integration tests for the build -> load -> search -> enrich flow
//!
//! All tests run offline against the hash embedder.

use std::sync::Arc;

use tempfile::tempdir;

use voice_faq_config::{RetrievalConfig, SearchStrategy};
use voice_faq_core::{FaqEntry, Language, NO_MATCHES_SENTINEL};
use voice_faq_rag::{
    EmbeddingProvider, FaqContextEnricher, FaqRetrievalEngine, HashEmbedder, IndexArtifact,
    IndexBuilder, IndexPaths, KnowledgeContext, RagError,
};

const DIM: usize = 32;

fn billing() -> FaqEntry {
    FaqEntry {
        id: "1".to_string(),
        category: "billing".to_string(),
        question_en: "How do I pay?".to_string(),
        answer_en: "Use the app.".to_string(),
        question_hi: "मैं कैसे भुगतान करूं?".to_string(),
        answer_hi: "ऐप का उपयोग करें।".to_string(),
    }
}

fn ev_corpus() -> Vec<FaqEntry> {
    vec![
        billing(),
        FaqEntry {
            id: "2".to_string(),
            category: "swap".to_string(),
            question_en: "How long does a battery swap take?".to_string(),
            answer_en: "About two minutes at any station.".to_string(),
            question_hi: "बैटरी स्वैप में कितना समय लगता है?".to_string(),
            answer_hi: "किसी भी स्टेशन पर लगभग दो मिनट।".to_string(),
        },
        FaqEntry {
            id: "3".to_string(),
            category: "account".to_string(),
            question_en: "How do I change my phone number?".to_string(),
            answer_en: "Go to Profile and tap Edit.".to_string(),
            question_hi: "मैं अपना फोन नंबर कैसे बदलूं?".to_string(),
            answer_hi: "प्रोफ़ाइल में जाकर एडिट दबाएं।".to_string(),
        },
    ]
}

async fn build_and_load(
    corpus: &[FaqEntry],
    strategy: SearchStrategy,
) -> (tempfile::TempDir, FaqRetrievalEngine) {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::in_dir(dir.path());
    let embedder = Arc::new(HashEmbedder::new(DIM));

    IndexBuilder::new(embedder.as_ref())
        .build(corpus, &paths)
        .await
        .unwrap();

    let config = RetrievalConfig {
        strategy,
        ..RetrievalConfig::default()
    };
    let engine = FaqRetrievalEngine::load(&paths, embedder, config).unwrap();
    (dir, engine)
}

#[tokio::test]
async fn test_single_entry_exact_query_scores_one() {
    let (_dir, engine) = build_and_load(&[billing()], SearchStrategy::Partitioned).await;
    assert_eq!(engine.len(), 2);

    let results = engine
        .search("How do I pay? Use the app.", Some("en"), 3)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "1");
    assert_eq!(results[0].language, Language::English);
    assert_eq!(results[0].similarity_score, 1.0);
}

#[tokio::test]
async fn test_language_partition_always_answers() {
    for strategy in [SearchStrategy::Partitioned, SearchStrategy::OverFetch] {
        let (_dir, engine) = build_and_load(&[billing()], strategy).await;

        let results = engine
            .search("unrelated gibberish", Some("hi"), 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1, "strategy {:?}", strategy);
        assert_eq!(results[0].language, Language::Hindi);
        assert_eq!(results[0].question, "मैं कैसे भुगतान करूं?");
        assert!(results[0].similarity_score > 0.0 && results[0].similarity_score <= 1.0);
    }
}

#[tokio::test]
async fn test_unsupported_language_yields_nothing() {
    let (_dir, engine) = build_and_load(&[billing()], SearchStrategy::Partitioned).await;

    let results = engine.search("How do I pay?", Some("fr"), 3).await.unwrap();
    assert!(results.is_empty());

    let context = engine
        .get_context_for_llm("How do I pay?", Some("fr"), 3)
        .await
        .unwrap();
    assert_eq!(context, NO_MATCHES_SENTINEL);
}

#[tokio::test]
async fn test_filtered_results_are_ranked_and_bounded() {
    let (_dir, engine) = build_and_load(&ev_corpus(), SearchStrategy::Partitioned).await;

    let results = engine
        .search("बैटरी स्वैप में कितना समय लगता है?", Some("hi"), 2)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|m| m.language == Language::Hindi));
    assert!(results[0].similarity_score >= results[1].similarity_score);

    let everything = engine.search("battery", None, 100).await.unwrap();
    assert_eq!(everything.len(), 6);
    assert!(everything
        .windows(2)
        .all(|w| w[0].similarity_score >= w[1].similarity_score));
}

#[tokio::test]
async fn test_context_rendering_from_index() {
    let (_dir, engine) = build_and_load(&[billing()], SearchStrategy::Partitioned).await;

    let context = engine
        .get_context_for_llm("How do I pay? Use the app.", Some("en"), 3)
        .await
        .unwrap();

    assert_eq!(
        context,
        "Here are the most relevant FAQs:\n\n\n\
         1. Category: billing\n   Q: How do I pay?\n   A: Use the app.\n   (Relevance: 1.00)"
    );
}

#[tokio::test]
async fn test_artifact_rows_align_with_records() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::in_dir(dir.path());
    let embedder = HashEmbedder::new(DIM);
    let corpus = ev_corpus();

    IndexBuilder::new(&embedder).build(&corpus, &paths).await.unwrap();
    let artifact = IndexArtifact::read(&paths).unwrap();

    assert_eq!(artifact.len(), corpus.len() * 2);
    assert_eq!(artifact.vectors.len(), artifact.len() * DIM);

    for (i, record) in artifact.records.iter().enumerate() {
        let entry = &corpus[i / 2];
        let expected_language = if i % 2 == 0 {
            Language::English
        } else {
            Language::Hindi
        };
        assert_eq!(record.id, entry.id);
        assert_eq!(record.language, expected_language);
        assert_eq!(record.question, entry.question(expected_language));

        let row = &artifact.vectors[i * DIM..(i + 1) * DIM];
        let expected = embedder.embed(&entry.embedding_text(expected_language)).await.unwrap();
        assert_eq!(row, expected.as_slice());
    }
}

#[tokio::test]
async fn test_rebuild_is_byte_identical() {
    let embedder = HashEmbedder::new(DIM);
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let a = IndexPaths::in_dir(first.path());
    let b = IndexPaths::in_dir(second.path());

    IndexBuilder::new(&embedder).build(&ev_corpus(), &a).await.unwrap();
    IndexBuilder::new(&embedder).build(&ev_corpus(), &b).await.unwrap();

    assert_eq!(std::fs::read(&a.vectors).unwrap(), std::fs::read(&b.vectors).unwrap());
    assert_eq!(std::fs::read(&a.metadata).unwrap(), std::fs::read(&b.metadata).unwrap());
}

#[tokio::test]
async fn test_rebuild_replaces_previous_artifact() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let dir = tempdir().unwrap();
    let paths = IndexPaths::in_dir(dir.path());

    IndexBuilder::new(embedder.as_ref())
        .build(&ev_corpus(), &paths)
        .await
        .unwrap();
    IndexBuilder::new(embedder.as_ref())
        .build(&[billing()], &paths)
        .await
        .unwrap();

    let engine = FaqRetrievalEngine::load(&paths, embedder, RetrievalConfig::default()).unwrap();
    assert_eq!(engine.len(), 2);
}

#[tokio::test]
async fn test_missing_index_is_reported() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::in_dir(dir.path().join("absent"));
    let embedder = Arc::new(HashEmbedder::new(DIM));

    let result = FaqRetrievalEngine::load(&paths, embedder, RetrievalConfig::default());
    assert!(matches!(result, Err(RagError::IndexNotFound(_))));
}

#[tokio::test]
async fn test_embedder_must_match_index() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::in_dir(dir.path());
    IndexBuilder::new(&HashEmbedder::new(DIM))
        .build(&[billing()], &paths)
        .await
        .unwrap();

    let other = Arc::new(HashEmbedder::new(DIM * 2));
    let result = FaqRetrievalEngine::load(&paths, other, RetrievalConfig::default());

    match result {
        Err(RagError::ProviderMismatch { index, embedder }) => {
            assert_eq!(index, "hash:32");
            assert_eq!(embedder, "hash:64");
        },
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("engine loaded with the wrong embedder"),
    }
}

#[tokio::test]
async fn test_mixed_artifact_pair_is_rejected() {
    let embedder = HashEmbedder::new(DIM);
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let a = IndexPaths::in_dir(first.path());
    let b = IndexPaths::in_dir(second.path());

    IndexBuilder::new(&embedder).build(&ev_corpus(), &a).await.unwrap();
    IndexBuilder::new(&embedder).build(&[billing()], &b).await.unwrap();

    std::fs::copy(&b.metadata, &a.metadata).unwrap();
    assert!(matches!(IndexArtifact::read(&a), Err(RagError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_concurrent_queries_share_engine() {
    let (_dir, engine) = build_and_load(&ev_corpus(), SearchStrategy::Partitioned).await;
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let language = if i % 2 == 0 { "en" } else { "hi" };
                engine.search("swap time", Some(language), 2).await
            })
        })
        .collect();

    for handle in handles {
        let results = handle.await.unwrap().unwrap();
        assert_eq!(results.len(), 2);
    }
}

#[tokio::test]
async fn test_enricher_over_loaded_index() {
    let (_dir, engine) = build_and_load(&[billing()], SearchStrategy::Partitioned).await;
    let enricher = FaqContextEnricher::new(Arc::new(engine), 3);

    let english = enricher.context_for_turn("How do I pay? Use the app.").await;
    assert_eq!(english.language(), Language::English);
    let note = english.prompt_note();
    assert!(note.starts_with("RELEVANT INFORMATION FROM KNOWLEDGE BASE:\nHere are the most relevant FAQs:"));
    assert!(note.contains("Q: How do I pay?"));
    assert!(note.ends_with("Use this information to answer the user's question accurately."));

    let hindi = enricher.context_for_turn("भुगतान कैसे करें").await;
    match hindi {
        KnowledgeContext::Found { language, text } => {
            assert_eq!(language, Language::Hindi);
            assert!(text.contains("Q: मैं कैसे भुगतान करूं?"));
            assert!(!text.contains("How do I pay?"));
        },
        other => panic!("expected Hindi context, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reused_id_fails_build_without_output() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::in_dir(dir.path());
    let mut recategorised = billing();
    recategorised.category = "account".to_string();

    let result = IndexBuilder::new(&HashEmbedder::new(DIM))
        .build(&[billing(), recategorised], &paths)
        .await;

    assert!(matches!(
        result,
        Err(RagError::MalformedEntry { index: 1, field: "id", .. })
    ));
    assert!(!paths.vectors.exists());
    assert!(!paths.metadata.exists());
}
