use kitstudio_core::renderer::SHARED_MODAL_ID;
use kitstudio_core::*;
use kitstudio_markup::{ComponentDescriptor, Item, Variant};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn button() -> ComponentDescriptor {
    ComponentDescriptor::new("button", "button-demo", "Buttons").with_variant(
        Variant::new("Sizes").with_item(Item::new(r#"<button class="btn">Go</button>"#, "Default")),
    )
}

#[derive(Debug, Default)]
struct CountingRenderer {
    calls: AtomicUsize,
}

impl Renderer for CountingRenderer {
    fn render(&self, descriptor: &ComponentDescriptor) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        format!("<p>{}</p>", descriptor.title)
    }
}

#[derive(Debug)]
struct PanickingRenderer;

impl Renderer for PanickingRenderer {
    fn render(&self, _descriptor: &ComponentDescriptor) -> String {
        panic!("renderer blew up");
    }
}

fn studio_with(registry: RendererRegistry, store: DescriptorStore) -> Studio {
    Studio::new(Arc::new(registry), Arc::new(store))
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_falls_back_to_generic() {
    let registry = RendererRegistry::new();
    let generic: RendererHandle = Arc::new(GenericRenderer);
    registry.register(GENERIC_RENDERER, generic.clone());

    let resolved = registry.resolve("unregistered-type").unwrap();
    assert!(Arc::ptr_eq(&resolved, &generic));
    let resolved = registry.resolve("generic").unwrap();
    assert!(Arc::ptr_eq(&resolved, &generic));
}

#[test]
fn test_registry_exact_match_wins_and_last_write_wins() {
    let registry = RendererRegistry::with_builtins();
    let first: RendererHandle = Arc::new(CountingRenderer::default());
    let second: RendererHandle = Arc::new(CountingRenderer::default());
    registry.register("button", first.clone());
    registry.register("button", second.clone());

    let resolved = registry.resolve("button").unwrap();
    assert!(Arc::ptr_eq(&resolved, &second));
    assert!(!Arc::ptr_eq(&resolved, &first));
    assert_eq!(
        registry.list_registered(),
        vec!["button", "generic", "icon", "modal"]
    );
}

#[test]
fn test_registry_without_generic_reports_missing_renderer() {
    let registry = RendererRegistry::new();
    match registry.resolve("button") {
        Err(StudioError::RendererNotFound { component_type }) => assert_eq!(component_type, "button"),
        other => panic!("expected RendererNotFound, got {:?}", other),
    }
}

// ============================================================================
// Cache
// ============================================================================

#[tokio::test]
async fn test_render_is_memoized_until_cleared() {
    let counter = Arc::new(CountingRenderer::default());
    let registry = RendererRegistry::new();
    registry.register("button", counter.clone());
    let store = DescriptorStore::new();
    store.register(button());
    let studio = studio_with(registry, store);

    let first = studio.render_component("button", "button").await.unwrap();
    let second = studio.render_component("button", "button").await.unwrap();
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.markup, second.markup);
    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    assert!(studio.cache().entry("button-button-demo").is_some());

    studio.cache().clear();
    assert!(studio.cache().is_empty());
    studio.render_component("button", "button").await.unwrap();
    assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_specialized_renderers_use_distinct_cache_keys() {
    let store = DescriptorStore::new();
    store.register(button());
    let studio = studio_with(RendererRegistry::with_builtins(), store);

    studio.render_component("button", "button").await.unwrap();
    studio.render_component("modal", "button").await.unwrap();
    studio.render_component("icon", "button").await.unwrap();

    assert_eq!(studio.cache().len(), 3);
    assert!(studio.cache().get("button-button-demo@modal").is_some());
    assert!(studio.cache().get("button-button-demo@icon").is_some());
}

// ============================================================================
// Mount orchestration
// ============================================================================

#[test]
fn test_scan_defaults_and_outermost_points() {
    let page = Page::parse(
        r#"<main>
            <section component-type="button"><div component-type="chip"/></section>
            <section component-type=" tabs " data-source="tabs-alt" loading-text="Wait"/>
            <section component-type=""/>
        </main>"#,
    )
    .unwrap();

    let points = scan_mount_points(&page);
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].component_type, "button");
    assert_eq!(points[0].data_source, "button");
    assert_eq!(points[0].loading_text, None);
    assert_eq!(points[1].component_type, "tabs");
    assert_eq!(points[1].data_source, "tabs-alt");
    assert_eq!(points[1].loading_text.as_deref(), Some("Wait"));
}

#[tokio::test]
async fn test_one_failure_does_not_block_other_mounts() {
    let store = DescriptorStore::new();
    store.register(button());
    let studio = studio_with(RendererRegistry::with_builtins(), store);

    let mut page = Page::parse(
        r#"<main><section id="ok" component-type="button"/><section id="bad" component-type="slider"/></main>"#,
    )
    .unwrap();
    let summary = studio.mount_page(&mut page).await;

    assert_eq!(summary.mounted(), 1);
    assert_eq!(summary.failed(), 1);
    assert!(!summary.is_success());
    assert_eq!(summary.reports[0].state, MountState::Mounted);
    assert!(matches!(summary.reports[1].state, MountState::Failed(_)));

    let ok = page.element(&page.find_by_id("ok").unwrap()).unwrap().inner_html();
    assert!(ok.starts_with(r#"<div class="component-showcase" data-component="button""#));
    let bad = page.element(&page.find_by_id("bad").unwrap()).unwrap().inner_html();
    assert_eq!(
        bad,
        r#"<div class="mount-error" role="alert">Failed to load slider: No component data registered for source &#39;slider&#39;</div>"#
    );
}

#[tokio::test]
async fn test_broken_variant_degrades_without_blocking_neighbours() {
    let store = DescriptorStore::new();
    store.register(button());
    store.register(
        kitstudio_markup::parse_catalog("type: chip\nid: chip-demo\ntitle: Chips\nvariants:\n  - title: Colors\n    items: not-a-list\n")
            .unwrap()
            .remove(0),
    );
    let studio = studio_with(RendererRegistry::with_builtins(), store);

    let mut page = Page::parse(
        r#"<main><section id="chip" component-type="chip"/><section id="btn" component-type="button"/></main>"#,
    )
    .unwrap();
    let summary = studio.mount_page(&mut page).await;
    assert!(summary.is_success());

    let chip = page.element(&page.find_by_id("chip").unwrap()).unwrap().inner_html();
    assert_eq!(
        chip,
        r#"<div class="component-showcase" data-component="chip" id="chip-demo"><header class="component-header"><h2 class="component-title">Chips</h2></header></div>"#
    );
    let btn = page.element(&page.find_by_id("btn").unwrap()).unwrap().inner_html();
    assert!(btn.contains(r#"<div class="component-label">Default</div>"#));
}

#[tokio::test]
async fn test_panicking_renderer_fails_only_that_mount() {
    let registry = RendererRegistry::with_builtins();
    registry.register("boom", Arc::new(PanickingRenderer));
    let store = DescriptorStore::new();
    store.register(button());
    let studio = studio_with(registry, store);

    let mut page = Page::parse(
        r#"<main><section id="boom" component-type="boom" data-source="button"/><section id="ok" component-type="button"/></main>"#,
    )
    .unwrap();
    let summary = studio.mount_page(&mut page).await;

    match &summary.reports[0].state {
        MountState::Failed(msg) => assert!(msg.starts_with("Mount task failed"), "{}", msg),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(summary.reports[1].state, MountState::Mounted);
    assert_eq!(summary.mounted(), 1);
    assert_eq!(summary.failed(), 1);

    let boom = page.element(&page.find_by_id("boom").unwrap()).unwrap().inner_html();
    assert!(boom.starts_with(r#"<div class="mount-error" role="alert">Failed to load boom: Mount task failed"#));
    let ok = page.element(&page.find_by_id("ok").unwrap()).unwrap().inner_html();
    assert!(ok.contains("component-showcase"));
}

#[tokio::test]
async fn test_missing_renderer_fails_only_that_mount() {
    let registry = RendererRegistry::new();
    registry.register("button", Arc::new(GenericRenderer));
    let store = DescriptorStore::new();
    store.register(button());
    let studio = studio_with(registry, store);

    let mut page = Page::parse(
        r#"<main><section component-type="button"/><section component-type="chip"/></main>"#,
    )
    .unwrap();
    let summary = studio.mount_page(&mut page).await;

    assert_eq!(summary.mounted(), 1);
    match &summary.reports[1].state {
        MountState::Failed(msg) => assert!(msg.contains("No renderer registered for 'chip'")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_studio_fixture_page() {
    let config = StudioConfig {
        catalog_dir: fixture("catalog"),
        ..StudioConfig::default()
    };
    let studio = Studio::from_config(&config);
    let loaded = studio.store().load_dir(&config.catalog_dir).await.unwrap();
    assert_eq!(loaded, 4);

    let source = std::fs::read_to_string(fixture("studio.xhtml")).unwrap();
    let mut page = Page::parse(&source).unwrap();
    let summary = studio.mount_page(&mut page).await;

    let states: Vec<(&str, bool)> = summary
        .reports
        .iter()
        .map(|r| (r.component_type.as_str(), r.state == MountState::Mounted))
        .collect();
    assert_eq!(
        states,
        vec![
            ("button", true),
            ("chip", true),
            ("modal", true),
            ("icon", true),
            ("slider", false),
        ]
    );

    let html = page.to_html();
    assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
    // The "Colors" chip variant has no item list and renders as nothing.
    assert!(!html.contains("Colors"));
    assert!(html.contains(r#"<h3 class="variant-title">Sizes</h3>"#));
    assert!(html.contains(r#"<div class="icon-grid">"#));
    assert!(html.contains(r#"data-modal-title="Alert &amp; Warn">Open Alert &amp; Warn</button>"#));
    assert!(!html.contains("mount-loading"));
}

#[tokio::test]
async fn test_shared_modal_injected_once() {
    let store = DescriptorStore::new();
    store.register(button());
    let studio = studio_with(RendererRegistry::with_builtins(), store);

    let mut page = Page::parse(
        r#"<html><body><section component-type="modal" data-source="button"/><section component-type="modal" data-source="button"/></body></html>"#,
    )
    .unwrap();
    let summary = studio.mount_page(&mut page).await;
    assert_eq!(summary.mounted(), 2);

    let html = page.to_html();
    assert_eq!(html.matches(&format!("id=\"{}\"", SHARED_MODAL_ID)).count(), 1);
    assert_eq!(html.matches("class=\"modal-trigger\"").count(), 2);

    let modal = page.element(&page.find_by_id(SHARED_MODAL_ID).unwrap()).unwrap();
    assert_eq!(modal.attr("data-widget"), Some("modal"));
    assert!(modal.has_attr("hidden"));
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let store = DescriptorStore::new();
    store.register(button());
    let studio = studio_with(RendererRegistry::with_builtins(), store);
    let template = Page::parse(
        r#"<html><body><section component-type="button"/><section component-type="modal" data-source="button"/></body></html>"#,
    )
    .unwrap();

    let (first, first_summary) = studio.reload(&template).await;
    let (second, second_summary) = studio.reload(&template).await;

    assert_eq!(first.to_html(), second.to_html());
    assert_eq!(first_summary, second_summary);
    assert!(second_summary.reports.iter().all(|r| !r.cached));
    // Template itself is untouched.
    assert!(!template.to_html().contains("component-showcase"));
}

#[tokio::test]
async fn test_second_mount_pass_is_served_from_cache() {
    let store = DescriptorStore::new();
    store.register(button());
    let studio = studio_with(RendererRegistry::with_builtins(), store);
    let template = Page::parse(r#"<main><section component-type="button"/></main>"#).unwrap();

    let mut first = template.clone();
    studio.mount_page(&mut first).await;
    let mut second = template.clone();
    let summary = studio.mount_page(&mut second).await;

    assert!(summary.reports[0].cached);
    assert_eq!(first, second);
}

// ============================================================================
// Descriptor store
// ============================================================================

#[tokio::test]
async fn test_store_loads_catalog_file_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("badge.yml"),
        "type: badge\nid: badge-demo\ntitle: Badges\nvariants: []\n",
    )
    .unwrap();

    let store = DescriptorStore::with_catalog_dir(dir.path());
    assert!(store.is_empty());
    let badge = store.fetch("badge").await.unwrap();
    assert_eq!(badge.id, "badge-demo");
    assert_eq!(store.sources(), vec!["badge"]);

    assert!(matches!(
        store.fetch("tooltip").await,
        Err(StudioError::MountSourceMissing { .. })
    ));
    assert!(matches!(
        store.fetch("../badge").await,
        Err(StudioError::MountSourceMissing { .. })
    ));
}

#[tokio::test]
async fn test_load_dir_skips_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.yaml"), "type: a\nid: a-demo\ntitle: A\n").unwrap();
    std::fs::write(dir.path().join("b.yaml"), "type: [oops\n").unwrap();
    std::fs::write(dir.path().join("c.yaml"), "type: c\nid: c-demo\ntitle: C\n").unwrap();

    let store = Arc::new(DescriptorStore::new());
    assert_eq!(store.load_dir(dir.path()).await.unwrap(), 2);
    assert_eq!(store.sources(), vec!["a", "c"]);

    let studio = Studio::new(Arc::new(RendererRegistry::with_builtins()), store);
    let mut page = Page::parse(
        r#"<main><section component-type="a"/><section component-type="b"/><section component-type="c"/></main>"#,
    )
    .unwrap();
    let summary = studio.mount_page(&mut page).await;
    assert_eq!(summary.mounted(), 2);
    assert_eq!(
        summary.reports[1].state,
        MountState::Failed("No component data registered for source 'b'".to_string())
    );
}

#[tokio::test]
async fn test_load_dir_on_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = DescriptorStore::new();
    assert!(matches!(
        store.load_dir(dir.path().join("nope")).await,
        Err(StudioError::Io(_))
    ));
}

#[tokio::test]
async fn test_store_surfaces_malformed_catalog() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.yaml"), "type: [unclosed\n").unwrap();

    let store = DescriptorStore::with_catalog_dir(dir.path());
    assert!(matches!(store.fetch("broken").await, Err(StudioError::Markup(_))));
}

#[tokio::test]
async fn test_store_without_catalog_dir() {
    let store = DescriptorStore::new();
    assert!(store.catalog_dir().is_none());
    assert!(matches!(
        store.fetch("button").await,
        Err(StudioError::MountSourceMissing { source_id }) if source_id == "button"
    ));
}
