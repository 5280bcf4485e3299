//! Integration tests for the document store

use pagebuilder_editor::model::{
    is_contiguous, PageDocument, PageStatus, Section, SectionContent, SectionType,
};
use pagebuilder_editor::{
    BackendError, BackendOp, DocumentStore, EditorConfig, EditorError, FileBackend, LocalOutcome,
    MemoryBackend, MoveDirection, NoopReason, SaveOutcome, SaveResponse, StructuralOutcome,
};
use serde_json::json;
use std::sync::Arc;

fn text_section(id: &str, order: usize) -> Section {
    let mut section = Section::new(
        id,
        SectionType::Text,
        SectionContent::default_for(&SectionType::Text),
    );
    section.order = order;
    section
}

fn seed(backend: &MemoryBackend, ids: &[&str]) {
    let mut page = PageDocument::draft("home", "Home");
    page.sections = ids
        .iter()
        .enumerate()
        .map(|(i, id)| text_section(id, i))
        .collect();
    backend.seed(page);
}

async fn open_with(ids: &[&str], config: EditorConfig) -> (Arc<MemoryBackend>, DocumentStore) {
    let backend = Arc::new(MemoryBackend::new());
    seed(&backend, ids);

    let mut store = DocumentStore::new(backend.clone(), config);
    store.load("home").await.unwrap();
    (backend, store)
}

async fn open(ids: &[&str]) -> (Arc<MemoryBackend>, DocumentStore) {
    open_with(ids, EditorConfig::default()).await
}

fn ids(store: &DocumentStore) -> Vec<String> {
    store
        .sections()
        .iter()
        .map(|s| s.id.as_str().to_string())
        .collect()
}

fn orders(store: &DocumentStore) -> Vec<usize> {
    store.sections().iter().map(|s| s.order).collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_load_missing_page_is_fatal() {
    let backend = Arc::new(MemoryBackend::new());
    let mut store = DocumentStore::new(backend, EditorConfig::default());

    let err = store.load("missing").await.unwrap_err();
    assert!(matches!(err, EditorError::NotFound { ref slug } if slug == "missing"));
    assert!(err.is_fatal());
    assert!(store.page().is_none());
}

#[tokio::test]
async fn test_load_normalizes_order() {
    let backend = Arc::new(MemoryBackend::new());
    let mut page = PageDocument::draft("home", "Home");
    page.sections = vec![text_section("b", 7), text_section("a", 2)];
    backend.seed(page);

    let mut store = DocumentStore::new(backend, EditorConfig::default());
    store.load("home").await.unwrap();

    assert_eq!(ids(&store), vec!["a", "b"]);
    assert_eq!(orders(&store), vec![0, 1]);
    assert!(!store.is_dirty());
    assert!(!store.can_undo());
}

// ---------------------------------------------------------------------------
// Structural operations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_move_up_then_undo() {
    let (_backend, mut store) = open(&["a1", "a2", "a3"]).await;

    let outcome = store.move_section(&"a2".into(), MoveDirection::Up).unwrap();
    assert!(outcome.is_applied());
    assert_eq!(ids(&store), vec!["a2", "a1", "a3"]);
    assert_eq!(orders(&store), vec![0, 1, 2]);
    assert!(store.is_dirty());

    assert!(store.undo());
    assert_eq!(ids(&store), vec!["a1", "a2", "a3"]);
    assert_eq!(orders(&store), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_move_at_boundary_is_noop() {
    let (_backend, mut store) = open(&["a1", "a2"]).await;

    let outcome = store.move_section(&"a1".into(), MoveDirection::Up).unwrap();
    assert_eq!(
        outcome,
        StructuralOutcome::Noop {
            reason: NoopReason::AtBoundary
        }
    );
    assert!(!store.is_dirty());
    assert!(!store.can_undo());
}

#[tokio::test]
async fn test_add_text_at_position_one() {
    let (backend, mut store) = open(&["a1", "a2"]).await;

    let outcome = store
        .add_section(SectionType::Text, None, Some(1))
        .await
        .unwrap();
    let new_id = outcome.section_id().unwrap().clone();

    assert_eq!(ids(&store), vec!["a1", new_id.as_str(), "a2"]);
    assert_eq!(orders(&store), vec![0, 1, 2]);
    assert_eq!(store.selected_section_id(), Some(&new_id));
    assert_eq!(backend.calls(BackendOp::CreateSection), 1);

    // Default content for the kind
    let heading = store.section_content(&new_id, "heading.text").unwrap();
    assert_eq!(heading, Some(json!("Section heading")));
}

#[tokio::test]
async fn test_add_then_undo_then_redo_restores_post_add_list() {
    let (_backend, mut store) = open(&["a1", "a2"]).await;

    store
        .add_section(SectionType::Cta, None, None)
        .await
        .unwrap();
    let after_add = store.sections().to_vec();

    assert!(store.undo());
    assert_eq!(ids(&store), vec!["a1", "a2"]);

    assert!(store.redo());
    assert_eq!(store.sections(), after_add.as_slice());
}

#[tokio::test]
async fn test_failed_structural_op_leaves_state_unchanged() {
    let (backend, mut store) = open(&["a1"]).await;
    backend.fail_next(BackendOp::CreateSection, BackendError::Network("offline".into()));

    let err = store
        .add_section(SectionType::Hero, None, None)
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(ids(&store), vec!["a1"]);
    assert!(!store.is_dirty());
    assert!(!store.can_undo());
}

#[tokio::test]
async fn test_delete_missing_section_is_noop() {
    let (backend, mut store) = open(&["a1"]).await;

    let outcome = store.delete_section(&"ghost".into()).await.unwrap();
    assert!(!outcome.is_applied());
    assert!(!store.is_dirty());
    assert_eq!(backend.calls(BackendOp::DeleteSection), 0);
}

#[tokio::test]
async fn test_delete_clears_selection() {
    let (backend, mut store) = open(&["a1", "a2"]).await;
    assert!(store.select_section(&"a2".into()));

    store.delete_section(&"a2".into()).await.unwrap();
    assert_eq!(ids(&store), vec!["a1"]);
    assert_eq!(store.selected_section_id(), None);
    assert_eq!(backend.page("home").unwrap().sections.len(), 1);

    // Undo brings the section back; selection stays cleared
    store.undo();
    assert_eq!(ids(&store), vec!["a1", "a2"]);
    assert_eq!(store.selected_section_id(), None);
}

#[tokio::test]
async fn test_delete_again_after_undo() {
    let (backend, mut store) = open(&["a1", "a2"]).await;

    store.delete_section(&"a1".into()).await.unwrap();
    assert!(store.undo());
    assert_eq!(ids(&store), vec!["a1", "a2"]);

    // The backend dropped a1 on the first delete
    let outcome = store.delete_section(&"a1".into()).await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(ids(&store), vec!["a2"]);
    assert_eq!(orders(&store), vec![0]);
    assert!(store.is_dirty());
    assert!(store.can_undo());
    assert_eq!(backend.calls(BackendOp::DeleteSection), 2);

    store.save(false, None).await.unwrap();
    assert!(!store.is_dirty());
    let stored: Vec<String> = backend
        .page("home")
        .unwrap()
        .sections
        .iter()
        .map(|s| s.id.as_str().to_string())
        .collect();
    assert_eq!(stored, vec!["a2"]);
}

#[test]
fn test_backend_missing_ids_are_not_fatal() {
    let err: EditorError = BackendError::NotFound("section a1".into()).into();
    assert!(matches!(err, EditorError::Missing(_)));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_draft_delete_of_unknown_section_is_noop() {
    let backend = Arc::new(MemoryBackend::new());
    let mut store = DocumentStore::new(backend.clone(), EditorConfig::default());
    store.begin_draft("landing", "Landing");

    let outcome = store.delete_section(&"ghost".into()).await.unwrap();
    assert!(matches!(
        outcome,
        StructuralOutcome::Noop {
            reason: NoopReason::SectionNotFound(_)
        }
    ));
    let outcome = store.duplicate_section(&"ghost".into()).await.unwrap();
    assert!(!outcome.is_applied());
    assert_eq!(backend.calls(BackendOp::DeleteSection), 0);
}

#[tokio::test]
async fn test_duplicate_is_a_deep_copy() {
    let (backend, mut store) = open(&["a1", "a2"]).await;
    store.update_section_styles(
        &"a1".into(),
        pagebuilder_editor::model::SectionStyles {
            background_color: Some("#fff".into()),
            ..Default::default()
        },
    );

    let outcome = store.duplicate_section(&"a1".into()).await.unwrap();
    let copy_id = outcome.section_id().unwrap().clone();

    assert_eq!(ids(&store)[1], copy_id.as_str());
    let copy = store.section(&copy_id).unwrap();
    assert_eq!(copy.styles.background_color.as_deref(), Some("#fff"));
    assert_eq!(copy.content, store.section(&"a1".into()).unwrap().content);

    // The stored copy carries the same styles before any save
    let stored = backend.page("home").unwrap();
    assert_eq!(stored.sections[1].id, copy_id);
    assert_eq!(stored.sections[1].styles.background_color.as_deref(), Some("#fff"));

    store.update_section_content(&copy_id, "heading.text", json!("Copy"));

    assert_eq!(
        store.section_content(&"a1".into(), "heading.text").unwrap(),
        Some(json!("Section heading"))
    );
    assert_eq!(
        store.section_content(&copy_id, "heading.text").unwrap(),
        Some(json!("Copy"))
    );
}

#[tokio::test]
async fn test_reorder_clamps_and_rejects_bad_input() {
    let (_backend, mut store) = open(&["a", "b", "c"]).await;

    store.reorder_sections(0, 99).unwrap();
    assert_eq!(ids(&store), vec!["b", "c", "a"]);

    let outcome = store.reorder_sections(5, 0).unwrap();
    assert!(!outcome.is_applied());

    let outcome = store.reorder_sections(1, 1).unwrap();
    assert_eq!(
        outcome,
        StructuralOutcome::Noop {
            reason: NoopReason::SamePosition
        }
    );
}

#[tokio::test]
async fn test_order_stays_contiguous_through_mixed_operations() {
    let (_backend, mut store) = open(&["a", "b", "c"]).await;

    let added = store
        .add_section(SectionType::Hero, None, Some(0))
        .await
        .unwrap();
    assert!(is_contiguous(store.sections()));

    store
        .duplicate_section(added.section_id().unwrap())
        .await
        .unwrap();
    assert!(is_contiguous(store.sections()));

    store.move_section(&"c".into(), MoveDirection::Up).unwrap();
    assert!(is_contiguous(store.sections()));

    store.reorder_sections(4, 0).unwrap();
    assert!(is_contiguous(store.sections()));

    store.delete_section(&"b".into()).await.unwrap();
    assert!(is_contiguous(store.sections()));

    store.undo();
    assert!(is_contiguous(store.sections()));
    store.undo();
    assert!(is_contiguous(store.sections()));
    store.redo();
    assert!(is_contiguous(store.sections()));
    assert_eq!(store.sections().len(), 5);
}

#[tokio::test]
async fn test_structural_ops_need_a_persisted_page() {
    let backend = Arc::new(MemoryBackend::new());
    let mut store = DocumentStore::new(backend.clone(), EditorConfig::default());

    let err = store.add_section(SectionType::Text, None, None).await.unwrap_err();
    assert!(matches!(err, EditorError::NoDocument));

    store.begin_draft("landing", "Landing");
    let err = store.add_section(SectionType::Text, None, None).await.unwrap_err();
    assert!(matches!(err, EditorError::Conflict(_)));
    assert_eq!(backend.calls(BackendOp::CreateSection), 0);
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_can_undo_and_redo_follow_cursor() {
    let (_backend, mut store) = open(&["a", "b"]).await;
    assert!(!store.can_undo());
    assert!(!store.can_redo());

    store.move_section(&"b".into(), MoveDirection::Up).unwrap();
    assert!(store.can_undo());
    assert!(!store.can_redo());
    assert_eq!(store.history().undo_label(), Some("move section"));

    store.undo();
    assert!(!store.can_undo());
    assert!(store.can_redo());
    assert!(!store.undo());

    store.redo();
    assert!(!store.can_redo());
    assert!(!store.redo());
}

#[tokio::test]
async fn test_history_is_bounded_by_capacity() {
    let config = EditorConfig {
        history_capacity: 5,
        ..Default::default()
    };
    let (_backend, mut store) = open_with(&["a", "b"], config).await;

    for _ in 0..20 {
        store.reorder_sections(0, 1).unwrap();
        assert!(store.history().len() <= 5);
        assert_eq!(store.history().cursor(), store.history().len() - 1);
    }

    let mut undone = 0;
    while store.undo() {
        undone += 1;
    }
    assert_eq!(undone, 4);
}

#[tokio::test]
async fn test_local_edits_do_not_touch_history() {
    let (_backend, mut store) = open(&["a"]).await;

    store.toggle_section_visibility(&"a".into());
    store.update_section_content(&"a".into(), "body", json!("changed"));

    assert!(store.is_dirty());
    assert!(!store.can_undo());
    assert!(!store.section(&"a".into()).unwrap().visible);
}

// ---------------------------------------------------------------------------
// Local edits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_content_path_creates_intermediates() {
    let backend = Arc::new(MemoryBackend::new());
    let mut page = PageDocument::draft("home", "Home");
    let content = SectionContent::from_value(
        &SectionType::Hero,
        json!({ "subheadline": { "text": "Sub" }, "overlay": true }),
    );
    page.sections = vec![Section::new("h", SectionType::Hero, content)];
    backend.seed(page);

    let mut store = DocumentStore::new(backend, EditorConfig::default());
    store.load("home").await.unwrap();

    let outcome = store.update_section_content(&"h".into(), "headline.text", json!("Welcome"));
    assert_eq!(outcome, LocalOutcome::Applied { schema_valid: true });

    let id = "h".into();
    assert_eq!(store.section_content(&id, "headline.text").unwrap(), Some(json!("Welcome")));
    assert_eq!(store.section_content(&id, "subheadline.text").unwrap(), Some(json!("Sub")));
    assert_eq!(store.section_content(&id, "overlay").unwrap(), Some(json!(true)));
    assert!(store.is_dirty());
}

#[tokio::test]
async fn test_invalid_content_fails_only_at_save() {
    let (_backend, mut store) = open(&["a"]).await;

    let outcome = store.update_section_content(&"a".into(), "body", json!(42));
    assert_eq!(outcome, LocalOutcome::Applied { schema_valid: false });
    assert_eq!(
        store.section_content(&"a".into(), "body").unwrap(),
        Some(json!(42))
    );

    let err = store.save(false, None).await.unwrap_err();
    assert!(matches!(err, EditorError::Validation(_)));
    assert!(store.is_dirty());

    // Correcting the value makes the page saveable again
    store.update_section_content(&"a".into(), "body", json!("fixed"));
    assert!(matches!(
        store.save(false, None).await.unwrap(),
        SaveOutcome::Saved { .. }
    ));
}

#[tokio::test]
async fn test_edit_on_missing_section_is_noop() {
    let (_backend, mut store) = open(&["a"]).await;

    let outcome = store.toggle_section_visibility(&"ghost".into());
    assert!(!outcome.is_applied());
    assert!(!store.is_dirty());
}

#[tokio::test]
async fn test_settings_and_seo_merge() {
    let (backend, mut store) = open(&[]).await;

    store.update_seo(pagebuilder_editor::model::Seo {
        title: Some("Welcome".into()),
        ..Default::default()
    });
    store.update_seo(pagebuilder_editor::model::Seo {
        description: Some("Our home page".into()),
        ..Default::default()
    });
    store.update_settings(pagebuilder_editor::model::PageSettings {
        theme: Some("dark".into()),
        ..Default::default()
    });

    let page = store.page().unwrap();
    assert_eq!(page.seo.title.as_deref(), Some("Welcome"));
    assert_eq!(page.seo.description.as_deref(), Some("Our home page"));
    assert_eq!(page.settings.theme.as_deref(), Some("dark"));

    store.save(false, None).await.unwrap();
    assert_eq!(
        backend.page("home").unwrap().seo.title.as_deref(),
        Some("Welcome")
    );
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unmodified_save_keeps_version() {
    let (backend, mut store) = open(&["a"]).await;

    let outcome = store.save(false, None).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Unchanged);
    assert_eq!(store.current_version(), Some(0));
    assert_eq!(backend.calls(BackendOp::UpdatePage), 0);

    let outcome = store.save(true, Some("note")).await.unwrap();
    assert!(matches!(
        outcome,
        SaveOutcome::Saved {
            current_version: 1,
            version_created: true,
            ..
        }
    ));
    assert_eq!(store.current_version(), Some(1));

    let stored = backend.page("home").unwrap();
    assert_eq!(stored.current_version, 1);
    assert_eq!(stored.versions[0].note.as_deref(), Some("note"));
    assert_eq!(store.page().unwrap().versions.len(), 1);
}

#[tokio::test]
async fn test_save_clears_dirty_and_persists() {
    let (backend, mut store) = open(&["a", "b"]).await;
    store.move_section(&"b".into(), MoveDirection::Up).unwrap();

    let outcome = store.save(false, None).await.unwrap();
    assert!(matches!(
        outcome,
        SaveOutcome::Saved {
            version_created: false,
            still_dirty: false,
            ..
        }
    ));
    assert!(!store.is_dirty());
    assert!(store.last_saved().is_some());

    let stored: Vec<_> = backend
        .page("home")
        .unwrap()
        .sections
        .iter()
        .map(|s| s.id.as_str().to_string())
        .collect();
    assert_eq!(stored, vec!["b", "a"]);
}

#[tokio::test]
async fn test_failed_save_keeps_local_state() {
    let (backend, mut store) = open(&["a", "b"]).await;
    store.move_section(&"b".into(), MoveDirection::Up).unwrap();
    backend.fail_next(BackendOp::UpdatePage, BackendError::Timeout);

    let err = store.save(false, None).await.unwrap_err();
    assert!(matches!(err, EditorError::Timeout));
    assert!(store.is_dirty());
    assert_eq!(ids(&store), vec!["b", "a"]);
}

#[tokio::test]
async fn test_edit_during_save_keeps_dirty() {
    let (backend, mut store) = open(&["a"]).await;
    store.toggle_section_visibility(&"a".into());

    let plan = store.prepare_save(false, None).unwrap().unwrap();
    store.update_section_content(&"a".into(), "body", json!("late edit"));

    let response = plan.execute(backend.as_ref()).await.unwrap();
    let outcome = store.finish_save(&plan, response);

    assert!(matches!(outcome, SaveOutcome::Saved { still_dirty: true, .. }));
    assert!(store.is_dirty());
}

#[tokio::test]
async fn test_save_result_after_close_is_discarded() {
    let (backend, mut store) = open(&["a"]).await;
    store.toggle_section_visibility(&"a".into());

    let plan = store.prepare_save(true, None).unwrap().unwrap();
    store.close();
    store.load("home").await.unwrap();

    let response = plan.execute(backend.as_ref()).await.unwrap();
    assert!(matches!(response, SaveResponse::Updated(_)));
    assert_eq!(store.finish_save(&plan, response), SaveOutcome::Discarded);

    // The reopened session did not pick up the stale answer
    assert_eq!(store.current_version(), Some(0));
}

#[tokio::test]
async fn test_draft_is_created_on_first_save() {
    let backend = Arc::new(MemoryBackend::new());
    let mut store = DocumentStore::new(backend.clone(), EditorConfig::default());
    store.begin_draft("landing", "Landing");
    assert!(!store.page().unwrap().is_persisted());

    let outcome = store.save(true, Some("initial")).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { current_version: 1, .. }));
    assert!(store.page().unwrap().is_persisted());
    assert_eq!(backend.calls(BackendOp::CreatePage), 1);

    let stored = backend.page("landing").unwrap();
    assert_eq!(stored.id, store.page().unwrap().id);

    store.add_section(SectionType::Form, None, None).await.unwrap();
    assert_eq!(store.sections().len(), 1);
}

// ---------------------------------------------------------------------------
// Versions, publish, preview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_restore_version() {
    let (_backend, mut store) = open(&["a", "b"]).await;
    store.save(true, Some("two sections")).await.unwrap();

    store.delete_section(&"a".into()).await.unwrap();
    assert_eq!(ids(&store), vec!["b"]);

    store.restore_version(1).unwrap();
    assert_eq!(ids(&store), vec!["a", "b"]);
    assert_eq!(store.history().undo_label(), Some("restore version"));

    let err = store.restore_version(9).unwrap_err();
    assert!(matches!(err, EditorError::UnknownVersion(9)));
}

#[tokio::test]
async fn test_publish_before_save_conflicts() {
    let backend = Arc::new(MemoryBackend::new());
    let mut store = DocumentStore::new(backend.clone(), EditorConfig::default());
    store.begin_draft("landing", "Landing");

    let err = store.publish().await.unwrap_err();
    assert!(matches!(err, EditorError::Conflict(_)));
    assert!(!err.is_fatal());
    assert_eq!(store.status(), Some(PageStatus::Draft));
    assert_eq!(backend.calls(BackendOp::PublishPage), 0);
}

#[tokio::test]
async fn test_publish_marks_page_published() {
    let (backend, mut store) = open(&["a"]).await;

    let ack = store.publish().await.unwrap();
    assert_eq!(store.status(), Some(PageStatus::Published));
    assert_eq!(store.page().unwrap().published_at, Some(ack.published_at));
    assert_eq!(backend.page("home").unwrap().status, PageStatus::Published);

    // Edits after publishing stay on the published page
    store.toggle_section_visibility(&"a".into());
    store.save(false, None).await.unwrap();
    assert_eq!(store.status(), Some(PageStatus::Published));
}

#[tokio::test]
async fn test_preview_link_does_not_mutate() {
    let (backend, mut store) = open(&["a"]).await;
    store.toggle_section_visibility(&"a".into());
    let before = store.page().unwrap().clone();

    let link = store.generate_preview_link().await.unwrap();
    assert!(link.url.contains(&link.token));
    assert_eq!(store.page().unwrap(), &before);
    assert!(store.is_dirty());
    assert!(backend.resolve_preview(&link.token).is_some());
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_file_backend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileBackend::new(dir.path()));

    let mut store = DocumentStore::new(backend.clone(), EditorConfig::default());
    store.begin_draft("about", "About");
    store.save(false, None).await.unwrap();

    let hero = store
        .add_section(SectionType::Hero, None, None)
        .await
        .unwrap();
    let hero_id = hero.section_id().unwrap().clone();
    store.update_section_content(&hero_id, "headline.text", json!("About us"));
    store.save(true, Some("first draft")).await.unwrap();

    let mut reopened = DocumentStore::new(backend, EditorConfig::default());
    reopened.load("about").await.unwrap();

    assert_eq!(reopened.sections(), store.sections());
    assert_eq!(reopened.current_version(), Some(1));
    assert_eq!(
        reopened.section_content(&hero_id, "headline.text").unwrap(),
        Some(json!("About us"))
    );
}
