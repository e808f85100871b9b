mod common;

use beacon::{Config, Registry};
use beacon_dom::Document;
use common::{RecordingTransport, TestProvider};
use serde_json::json;

const LINK: &str = r#"
    <div id="static">
        <a id="link" data-metric-event="click" data-a-method="test" data-b-method="test">Go</a>
    </div>
    <div id="dynamic"></div>
"#;

#[test]
fn each_provider_binds_each_element_once() {
    common::init_tracing();
    let mut doc = Document::from_html(LINK);
    let link = doc.get_element_by_id("link").unwrap();
    let transport = RecordingTransport::new();
    let mut registry = Registry::new(Config {
        debug: true,
        ..Config::default()
    });

    assert_eq!(
        registry.add_provider(&mut doc, TestProvider::new("a", Some(transport.clone()))),
        1
    );
    assert_eq!(
        registry.add_provider(&mut doc, TestProvider::new("b", Some(transport.clone()))),
        1
    );
    assert_eq!(registry.binding_count("a"), 1);
    assert_eq!(registry.binding_count("b"), 1);
    assert_eq!(doc.listener_count(link), 2);

    // Providers fire in registration order
    doc.click(link);
    assert_eq!(
        transport.pushed(),
        vec![json!(["test", "a"]), json!(["test", "b"])]
    );
}

#[test]
fn removing_a_provider_leaves_the_others_firing() {
    let mut doc = Document::from_html(LINK);
    let link = doc.get_element_by_id("link").unwrap();
    let transport = RecordingTransport::new();
    let mut registry = Registry::default();
    registry.add_provider(&mut doc, TestProvider::new("a", Some(transport.clone())));
    registry.add_provider(&mut doc, TestProvider::new("b", Some(transport.clone())));

    assert!(registry.remove_provider(&mut doc, "a"));
    assert!(!registry.remove_provider(&mut doc, "a"));
    assert_eq!(registry.provider_names().collect::<Vec<_>>(), ["b"]);
    assert_eq!(registry.binding_count("a"), 0);
    assert_eq!(doc.listener_count(link), 1);

    doc.click(link);
    assert_eq!(transport.pushed(), vec![json!(["test", "b"])]);
}

#[test]
fn rescanning_inserted_markup_binds_only_the_new_elements() {
    let mut doc = Document::from_html(LINK);
    let link = doc.get_element_by_id("link").unwrap();
    let dynamic = doc.get_element_by_id("dynamic").unwrap();
    let transport = RecordingTransport::new();
    let mut registry = Registry::default();
    registry.add_provider(&mut doc, TestProvider::new("a", Some(transport.clone())));
    registry.add_provider(&mut doc, TestProvider::new("b", Some(transport.clone())));

    doc.append_html(
        dynamic,
        r#"<button id="late" data-metric-event="click" data-a-method="test">Later</button>"#,
    );
    let late = doc.get_element_by_id("late").unwrap();

    assert_eq!(registry.parse(&mut doc, Some(dynamic)), 1);
    assert_eq!(registry.binding_count("a"), 2);
    assert_eq!(registry.binding_count("b"), 1);
    assert_eq!(doc.listener_count(link), 2);
    assert_eq!(doc.listener_count(late), 1);

    doc.click(late);
    assert_eq!(transport.pushed(), vec![json!(["test", "a"])]);
}

#[test]
fn parsing_twice_binds_twice() {
    let mut doc = Document::from_html(LINK);
    let link = doc.get_element_by_id("link").unwrap();
    let transport = RecordingTransport::new();
    let mut registry = Registry::default();
    registry.add_provider(&mut doc, TestProvider::new("a", Some(transport.clone())));

    assert_eq!(registry.parse(&mut doc, None), 1);
    assert_eq!(doc.listener_count(link), 2);
    doc.click(link);
    assert_eq!(transport.pushed().len(), 2);
}

#[test]
fn disabled_registries_never_reach_the_transport() {
    let mut doc = Document::from_html(
        r#"<a id="link" data-metric-event="click" data-a-method="test"
              data-metric-condition="attr(id equals link)">Go</a>"#,
    );
    let link = doc.get_element_by_id("link").unwrap();
    let transport = RecordingTransport::new();
    let provider = TestProvider::new("a", Some(transport.clone()));
    let mut registry = Registry::new(Config {
        enabled: false,
        ..Config::default()
    });

    assert_eq!(registry.add_provider(&mut doc, provider.clone()), 1);
    doc.click(link);
    assert_eq!(provider.fired(), 1);
    assert!(transport.pushed().is_empty());

    // Switching back on applies to handlers that are already bound
    registry.set_enabled(true);
    assert!(registry.config().enabled);
    doc.click(link);
    assert_eq!(provider.fired(), 2);
    assert_eq!(transport.pushed().len(), 1);
}

#[test]
fn conditions_are_evaluated_when_the_event_fires() {
    let mut doc = Document::from_html(
        r#"<a id="tab" class="inactive" data-metric-event="click" data-a-method="test"
              data-metric-condition="attr(class equals active)">Tab</a>"#,
    );
    let tab = doc.get_element_by_id("tab").unwrap();
    let transport = RecordingTransport::new();
    let mut registry = Registry::default();
    registry.add_provider(&mut doc, TestProvider::new("a", Some(transport.clone())));

    doc.click(tab);
    assert!(transport.pushed().is_empty());

    doc.set_attribute(tab, "class", "active");
    doc.click(tab);
    assert_eq!(transport.pushed(), vec![json!(["test", "a"])]);
}

#[test]
fn malformed_conditions_bind_but_never_fire() {
    let mut doc = Document::from_html(
        r#"<a id="link" data-metric-event="click" data-a-method="test"
              data-metric-condition="attr(class equals)">Go</a>"#,
    );
    let link = doc.get_element_by_id("link").unwrap();
    let transport = RecordingTransport::new();
    let provider = TestProvider::new("a", Some(transport.clone()));
    let mut registry = Registry::default();

    assert_eq!(registry.add_provider(&mut doc, provider.clone()), 1);
    doc.click(link);
    assert_eq!(provider.fired(), 0);
    assert!(transport.pushed().is_empty());
}

#[test]
fn providers_decline_elements_they_cannot_handle() {
    let mut doc = Document::from_html(
        r#"
        <a id="plain" data-metric-event="click">No method</a>
        <a id="empty" data-metric-event="click" data-a-method="">Empty method</a>
        <a id="unknown" data-metric-event="click" data-a-method="nope">Unknown method</a>
        <a id="blank" data-metric-event="  " data-a-method="test">No event</a>
        "#,
    );
    let mut registry = Registry::new(Config {
        debug: true,
        ..Config::default()
    });

    assert_eq!(registry.add_provider(&mut doc, TestProvider::new("a", None)), 0);
    assert_eq!(doc.total_listener_count(), 0);
}

#[test]
fn delegated_events_run_for_matching_descendants() {
    let mut doc = Document::from_html(
        r#"
        <ul id="menu" data-metric-event="li click" data-a-method="test"
            data-metric-condition="attr(data-value equals item2)">
            <li id="item1" data-value="item1">One</li>
            <li id="item2" data-value="item2"><span id="label">Two</span></li>
        </ul>
        "#,
    );
    let menu = doc.get_element_by_id("menu").unwrap();
    let item1 = doc.get_element_by_id("item1").unwrap();
    let label = doc.get_element_by_id("label").unwrap();
    let transport = RecordingTransport::new();
    let mut registry = Registry::default();
    registry.add_provider(&mut doc, TestProvider::new("a", Some(transport.clone())));

    let binding = &registry.bindings("a")[0];
    assert_eq!(binding.element, menu);
    assert_eq!(binding.selector.as_deref(), Some("li"));
    assert_eq!(binding.event_type, "click");

    doc.click(menu);
    doc.click(item1);
    assert!(transport.pushed().is_empty());

    doc.click(label);
    assert_eq!(transport.pushed(), vec![json!(["test", "a"])]);

    // Delegated bindings are undelegated on removal
    registry.remove_provider(&mut doc, "a");
    assert_eq!(doc.listener_count(menu), 0);
}

#[test]
fn custom_attribute_names() {
    let mut doc = Document::from_html(
        r#"<a id="link" data-track="click" data-track-if="attr(id equals link)" data-a-method="test">Go</a>"#,
    );
    let link = doc.get_element_by_id("link").unwrap();
    let config: Config = serde_json::from_value(json!({
        "event_attribute": "data-track",
        "condition_attribute": "data-track-if",
    }))
    .unwrap();
    let transport = RecordingTransport::new();
    let mut registry = Registry::new(config);
    registry.add_provider(&mut doc, TestProvider::new("a", Some(transport.clone())));

    doc.click(link);
    assert_eq!(transport.pushed().len(), 1);
}
