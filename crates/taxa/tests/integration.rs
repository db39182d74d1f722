//! End-to-end tests wiring stub clients and the in-memory catalog into the
//! classification engine.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use taxa::config::load_config;
use taxa_core::engine::{ArticleOutcome, ClassificationEngine};
use taxa_core::generative::GenerativeClient;
use taxa_core::models::{Article, Category, ClassificationOptions};
use taxa_core::store::memory::InMemoryCatalog;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("taxa=debug,taxa_core=debug")
        .try_init();
}

/// A stub chat backend that always answers with the given payload.
struct StubGenerative {
    payload: String,
}

#[async_trait]
impl GenerativeClient for StubGenerative {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Ok(self.payload.clone())
    }
}

fn catalog() -> Vec<Category> {
    let mut tech = Category::new("Technology");
    tech.keywords = ["software".to_string()].into();

    let mut cloud = Category::child_of(&tech, "Cloud");
    cloud.keywords = ["azure".to_string(), "aws".to_string()].into();
    cloud.embedding = Some(vec![1.0, 0.0, 0.0]);

    vec![tech, cloud]
}

#[tokio::test]
async fn classify_merges_all_three_signals() {
    init_tracing();
    let categories = catalog();
    let cloud_id = categories[1].id;

    let payload = format!(
        r#"[{{"categoryId": "{}", "categoryName": "Cloud", "confidenceScore": 0.95, "reason": "clearly about cloud infrastructure", "exceedsAutoThreshold": true, "exceedsManualThreshold": true}}]"#,
        cloud_id
    );
    let engine = ClassificationEngine::with_generative(Arc::new(StubGenerative { payload }));
    assert!(engine.is_generative_enabled());

    let mut article = Article::new(
        "Migrating software to Azure",
        "Notes on moving software workloads to azure and aws",
    );
    article.body_embedding = Some(vec![0.99, 0.1, 0.0]);

    let suggestions = engine
        .classify(&article, &categories, &ClassificationOptions::default())
        .await
        .unwrap();

    // Cloud gathers keyword + semantic + generative evidence; the averaged
    // confidence clears the 0.5 floor thanks to the generative opinion.
    let cloud = suggestions
        .iter()
        .find(|s| s.category_id == cloud_id)
        .expect("cloud suggested");
    assert!(cloud.reason.contains("Matched keywords"));
    assert!(cloud.reason.contains("Semantic similarity"));
    assert!(cloud.reason.contains("cloud infrastructure"));
    assert!(cloud.confidence_score > 0.5 && cloud.confidence_score <= 1.0);
}

#[tokio::test]
async fn engine_degrades_without_generative_backend() {
    init_tracing();
    let categories = catalog();
    let engine = ClassificationEngine::new();
    assert!(!engine.is_generative_enabled());

    let mut article = Article::new("azure aws migration", "azure aws everywhere");
    article.body_embedding = Some(vec![1.0, 0.0, 0.0]);

    // Raise the weights so keyword+semantic evidence alone clears the floor.
    let options = ClassificationOptions {
        keyword_match_weight: 1.0,
        semantic_similarity_weight: 1.0,
        ..Default::default()
    };
    let suggestions = engine
        .classify(&article, &categories, &options)
        .await
        .unwrap();
    assert!(!suggestions.is_empty());
}

#[tokio::test]
async fn generative_garbage_never_fails_classification() {
    init_tracing();
    let categories = catalog();
    let engine = ClassificationEngine::with_generative(Arc::new(StubGenerative {
        payload: "Sorry, I cannot respond in JSON today.".to_string(),
    }));

    let article = Article::new("unrelated", "nothing matches");
    let suggestions = engine
        .classify(&article, &categories, &ClassificationOptions::default())
        .await
        .unwrap();
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn suggest_with_generative_validates_and_caps() {
    init_tracing();
    let categories = catalog();
    let cloud_id = categories[1].id;

    // One real id, one hallucinated.
    let payload = format!(
        r#"[
            {{"categoryId": "{}", "categoryName": "Cloud", "confidenceScore": 0.9, "reason": "fits", "exceedsAutoThreshold": false, "exceedsManualThreshold": false}},
            {{"categoryId": "6a2f0f3e-9f0a-4a3e-8f54-5a3f1a2b3c4d", "categoryName": "Phantom", "confidenceScore": 0.99, "reason": "made up", "exceedsAutoThreshold": true, "exceedsManualThreshold": true}}
        ]"#,
        cloud_id
    );
    let engine = ClassificationEngine::with_generative(Arc::new(StubGenerative { payload }));

    let article = Article::new("t", "s");
    let suggestions = engine
        .suggest_with_generative(&article, &categories)
        .await
        .unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].category_id, cloud_id);
    // The aggregator recomputed the flags: 0.9 clears the default cutoffs.
    assert!(suggestions[0].exceeds_auto_threshold);
    assert!(suggestions[0].exceeds_manual_threshold);
}

#[tokio::test]
async fn batch_reports_every_article_and_survives_bad_input() {
    init_tracing();
    let categories = catalog();
    let engine = ClassificationEngine::new();

    let good = Article::new("azure migration", "azure");
    let bad = {
        let mut a = Article::new("broken", "wrong embedding arity");
        a.body_embedding = Some(vec![1.0]);
        a
    };
    let articles = vec![good, bad];

    let results = engine
        .classify_batch(
            &articles,
            &categories,
            &ClassificationOptions::default(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].article_id, articles[0].id);
    assert!(matches!(results[0].outcome, ArticleOutcome::Classified { .. }));
    assert!(matches!(results[1].outcome, ArticleOutcome::Failed { .. }));
}

#[tokio::test]
async fn options_from_config_drive_classification() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[classification]
keyword_match_weight = 1.0
semantic_similarity_weight = 1.0
max_suggestions_per_article = 1
"#,
    )
    .unwrap();
    let config = load_config(file.path()).unwrap();
    assert!(!config.generative.is_enabled());

    let categories = catalog();
    let engine = ClassificationEngine::new();
    let mut article = Article::new("azure aws software roundup", "azure aws software");
    article.body_embedding = Some(vec![1.0, 0.0, 0.0]);

    let suggestions = engine
        .classify(&article, &categories, &config.classification)
        .await
        .unwrap();
    // Both categories gather evidence; the configured cap keeps only the best.
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].category_name, "Cloud");
}

#[tokio::test]
async fn classify_from_store_reads_article_and_catalog() {
    init_tracing();
    let store = InMemoryCatalog::new();
    for category in catalog() {
        store.insert_category(category);
    }
    let mut article = Article::new("azure aws software", "azure aws software");
    article.body_embedding = Some(vec![1.0, 0.0, 0.0]);
    let article_id = article.id;
    store.insert_article(article);

    let engine = ClassificationEngine::new();
    let options = ClassificationOptions {
        keyword_match_weight: 1.0,
        semantic_similarity_weight: 1.0,
        ..Default::default()
    };
    let suggestions = engine
        .classify_from_store(&store, article_id, &options)
        .await
        .unwrap();
    assert!(!suggestions.is_empty());

    let missing = engine
        .classify_from_store(&store, uuid::Uuid::new_v4(), &options)
        .await;
    assert!(missing.is_err());
}
