use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use vault_core::{
    GeminiTagger, MaterialTagger, SmartTagOutcome, SmartTagger, TagSuggestion, TaggerError,
    Taxonomy, Vault,
};

struct FixedTagger {
    suggestion: TagSuggestion,
    calls: AtomicUsize,
}

impl FixedTagger {
    fn new(category: &str, domain: &str, tags: &[&str]) -> Self {
        Self {
            suggestion: TagSuggestion {
                category: category.to_string(),
                domain: domain.to_string(),
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
            },
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MaterialTagger for FixedTagger {
    async fn suggest(
        &self,
        _text: &str,
        _taxonomy: &Taxonomy,
    ) -> Result<TagSuggestion, TaggerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.suggestion.clone())
    }
}

struct FailingTagger;

#[async_trait]
impl MaterialTagger for FailingTagger {
    async fn suggest(
        &self,
        _text: &str,
        _taxonomy: &Taxonomy,
    ) -> Result<TagSuggestion, TaggerError> {
        Err(TaggerError::EmptyResponse)
    }
}

/// Blocks until released, then answers.
struct GatedTagger {
    gate: Arc<Notify>,
}

#[async_trait]
impl MaterialTagger for GatedTagger {
    async fn suggest(
        &self,
        _text: &str,
        _taxonomy: &Taxonomy,
    ) -> Result<TagSuggestion, TaggerError> {
        self.gate.notified().await;
        Ok(TagSuggestion {
            category: "案例".to_string(),
            domain: "经济".to_string(),
            tags: Vec::new(),
        })
    }
}

/// Records the category names each request was constrained to.
#[derive(Default)]
struct RecordingTagger {
    seen: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl MaterialTagger for RecordingTagger {
    async fn suggest(
        &self,
        _text: &str,
        taxonomy: &Taxonomy,
    ) -> Result<TagSuggestion, TaggerError> {
        self.seen
            .lock()
            .unwrap()
            .push(taxonomy.categories.as_slice().to_vec());
        Err(TaggerError::EmptyResponse)
    }
}

struct SlowTagger;

#[async_trait]
impl MaterialTagger for SlowTagger {
    async fn suggest(
        &self,
        _text: &str,
        _taxonomy: &Taxonomy,
    ) -> Result<TagSuggestion, TaggerError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(TaggerError::EmptyResponse)
    }
}

#[tokio::test]
async fn empty_content_is_skipped_without_calling_tagger() {
    let taxonomy = Taxonomy::default();
    let smart = SmartTagger::new(FixedTagger::new("案例", "经济", &[]), Duration::from_secs(1));

    assert_eq!(smart.analyze("", &taxonomy).await, SmartTagOutcome::Skipped);
    assert_eq!(smart.tagger().calls.load(Ordering::SeqCst), 0);
    assert!(!smart.is_busy());
}

#[tokio::test]
async fn successful_request_returns_suggestion() {
    let taxonomy = Taxonomy::default();
    let smart = SmartTagger::new(
        FixedTagger::new("人物", "科技", &["AI", "创新"]),
        Duration::from_secs(1),
    );

    let outcome = smart.analyze("some text", &taxonomy).await;
    let suggestion = outcome.suggestion().unwrap();
    assert_eq!(suggestion.category, "人物");
    assert_eq!(suggestion.tags, vec!["AI", "创新"]);
    assert!(!smart.is_busy());
}

#[tokio::test]
async fn tagger_error_becomes_no_suggestion() {
    let taxonomy = Taxonomy::default();
    let smart = SmartTagger::new(FailingTagger, Duration::from_secs(1));

    assert_eq!(
        smart.analyze("text", &taxonomy).await,
        SmartTagOutcome::NoSuggestion
    );
    assert!(!smart.is_busy());
}

#[tokio::test(start_paused = true)]
async fn timeout_becomes_no_suggestion_and_releases_guard() {
    let taxonomy = Taxonomy::default();
    let smart = SmartTagger::new(SlowTagger, Duration::from_millis(50));

    assert_eq!(
        smart.analyze("text", &taxonomy).await,
        SmartTagOutcome::NoSuggestion
    );
    assert!(!smart.is_busy());
}

#[tokio::test]
async fn second_request_while_pending_is_busy() {
    let taxonomy = Taxonomy::default();
    let gate = Arc::new(Notify::new());
    let smart = SmartTagger::new(
        GatedTagger { gate: gate.clone() },
        Duration::from_secs(5),
    );

    let first = smart.analyze("first", &taxonomy);
    let second = async {
        tokio::task::yield_now().await;
        assert!(smart.is_busy());
        let outcome = smart.analyze("second", &taxonomy).await;
        gate.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(first, SmartTagOutcome::Suggested(_)));
    assert_eq!(second, SmartTagOutcome::Busy);
    assert!(!smart.is_busy());
}

#[tokio::test]
async fn suggestion_fills_draft_only_with_known_values() {
    let vault = Vault::open_in_memory().unwrap();
    let smart = SmartTagger::new(
        FixedTagger::new("人物", "宇宙", &["星空"]),
        Duration::from_secs(1),
    );

    let mut draft = vault.new_draft().with_text("", "一段关于人物的文字");
    let outcome = smart.analyze(&draft.content, vault.taxonomy()).await;
    let applied = draft.apply_suggestion(outcome.suggestion().unwrap(), vault.taxonomy());

    assert!(applied.category_applied);
    assert!(!applied.domain_applied);
    assert_eq!(draft.category, "人物");
    assert_eq!(draft.domain, "生态");
}

#[tokio::test]
async fn suggested_tags_are_never_attached() {
    let mut vault = Vault::open_in_memory().unwrap();
    let smart = SmartTagger::new(
        FixedTagger::new("金句", "经济", &["增长"]),
        Duration::from_secs(1),
    );

    let mut draft = vault.new_draft().with_text("", "经济增长的一句话");
    let outcome = smart.analyze(&draft.content, vault.taxonomy()).await;
    if let SmartTagOutcome::Suggested(suggestion) = outcome {
        draft.apply_suggestion(&suggestion, vault.taxonomy());
    }
    let id = vault.create_material(draft).unwrap();

    let material = vault.materials().get(&id).unwrap();
    assert_eq!(material.category, "金句");
    assert!(material.tags.is_empty());
}

#[tokio::test]
async fn request_is_constrained_to_current_taxonomy() {
    let mut vault = Vault::open_in_memory().unwrap();
    vault.add_category("政策").unwrap();
    vault.remove_category("文件").unwrap();
    let smart = SmartTagger::new(RecordingTagger::default(), Duration::from_secs(1));

    smart.analyze("政策解读", vault.taxonomy()).await;

    let seen = smart.tagger().seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], vec!["案例", "人物", "金句", "其他", "政策"]);
}

#[tokio::test]
async fn missing_api_key_is_rejected() {
    let err = GeminiTagger::new("http://127.0.0.1:1", "m", "  ", Duration::from_secs(1))
        .unwrap_err();
    assert!(matches!(err, TaggerError::MissingApiKey));
}

#[tokio::test]
async fn unreachable_endpoint_yields_no_suggestion() {
    let taxonomy = Taxonomy::default();
    let tagger = GeminiTagger::new(
        "http://127.0.0.1:1",
        "test-model",
        "key",
        Duration::from_secs(2),
    )
    .unwrap();
    let smart = SmartTagger::new(tagger, Duration::from_secs(3));

    assert_eq!(
        smart.analyze("text", &taxonomy).await,
        SmartTagOutcome::NoSuggestion
    );
    assert!(!smart.is_busy());
}
