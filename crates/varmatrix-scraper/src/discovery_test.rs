use super::*;

fn ident(data_id: Option<&str>, id: Option<&str>) -> NodeIdentity {
    NodeIdentity {
        data_id: data_id.map(str::to_string),
        data_value: None,
        id: id.map(str::to_string),
    }
}

fn shape_rule() -> AxisRule {
    OptionsTable::builtin()
        .rules
        .into_iter()
        .find(|r| r.param == "spf1")
        .unwrap()
}

// ---------------------------------------------------------------------------
// classify_leaf
// ---------------------------------------------------------------------------

#[test]
fn classify_anchors_on_nearest_numeric_identifier() {
    let chain = [ident(None, None), ident(Some("1390"), None), ident(Some("77"), None)];
    let value = classify_leaf("Rectangle", &chain, &shape_rule()).unwrap();
    assert_eq!(value.value, "Rectangle");
    assert_eq!(value.id, "1390");
    assert_eq!(value.param, "spf1");
}

#[test]
fn classify_skips_non_numeric_identifier_and_keeps_walking() {
    let chain = [
        ident(None, Some("shape-rect")),
        ident(Some("opt-a"), None),
        ident(Some("1399"), None),
    ];
    let value = classify_leaf("Rounded Corners", &chain, &shape_rule()).unwrap();
    assert_eq!(value.id, "1399");
}

#[test]
fn classify_rejects_non_numeric_only_chain() {
    let chain = [ident(None, Some("rectangle")), ident(Some("x12"), None)];
    assert!(classify_leaf("Rectangle", &chain, &shape_rule()).is_none());
}

#[test]
fn classify_stops_after_three_levels() {
    let chain = [
        ident(None, None),
        ident(None, None),
        ident(None, None),
        ident(Some("1390"), None),
    ];
    assert!(classify_leaf("Rectangle", &chain, &shape_rule()).is_none());
}

#[test]
fn classify_enforces_text_length_bounds() {
    let chain = [ident(Some("5"), None)];
    let rule = AxisRule {
        param: "spf9".to_string(),
        name: "Finish".to_string(),
        key: "finish".to_string(),
        keywords: vec!["a".to_string()],
    };
    assert!(classify_leaf("ab", &chain, &rule).is_none());
    assert!(classify_leaf("abc", &chain, &rule).is_some());
    assert!(classify_leaf(&"a".repeat(100), &chain, &rule).is_none());
    assert!(classify_leaf(&"a".repeat(99), &chain, &rule).is_some());
}

#[test]
fn classify_requires_keyword_case_insensitively() {
    let chain = [ident(Some("1390"), None)];
    assert!(classify_leaf("RECTANGLE", &chain, &shape_rule()).is_some());
    assert!(classify_leaf("Triangle", &chain, &shape_rule()).is_none());
}

// ---------------------------------------------------------------------------
// discover_options
// ---------------------------------------------------------------------------

const RICH_PAGE: &str = r#"<html><body>
  <ul class="shape">
    <li data-id="1390"><span>Rectangle</span></li>
    <li data-id="1399"><span>Rounded Corners</span></li>
    <li data-id="1399"><span>Rounded Corners</span></li>
    <li id="shape-odd"><span>Square</span></li>
  </ul>
  <ul class="stock">
    <li data-value="1419"><label>14pt Cardstock Gloss</label></li>
    <li data-value="1420"><label>14pt Cardstock Matte</label></li>
  </ul>
  <script>var s = "Rectangle";</script>
</body></html>"#;

#[test]
fn infers_axes_from_rich_markup() {
    let discovery = discover_options(RICH_PAGE, &OptionsTable::builtin());
    assert_eq!(discovery.source, DiscoverySource::Inferred);

    let shape = discovery.axes.iter().find(|a| a.key == "shape").unwrap();
    let shapes: Vec<(&str, &str)> = shape
        .values
        .iter()
        .map(|v| (v.value.as_str(), v.id.as_str()))
        .collect();
    assert_eq!(shapes, vec![("Rectangle", "1390"), ("Rounded Corners", "1399")]);

    let stock = discovery.axes.iter().find(|a| a.key == "paper_stock").unwrap();
    assert_eq!(stock.values.len(), 2);
    assert!(stock.values.iter().all(|v| v.param == "spf3"));
}

#[test]
fn every_discovered_identifier_is_numeric() {
    let discovery = discover_options(RICH_PAGE, &OptionsTable::builtin());
    for axis in &discovery.axes {
        for value in &axis.values {
            assert!(is_numeric_id(&value.id), "non-numeric id {}", value.id);
        }
    }
}

#[test]
fn axes_without_values_are_dropped() {
    let doc = Html::parse_document(RICH_PAGE);
    let axes = infer_axes(&doc, &OptionsTable::builtin().rules);
    assert!(axes.iter().all(|a| !a.values.is_empty()));
    assert!(axes.iter().all(|a| a.key != "product_type"));
}

#[test]
fn single_axis_falls_back_to_table() {
    let html = r#"<body><div data-id="1390"><span>Rectangle</span></div>
                  <div data-id="1391"><span>Square</span></div></body>"#;
    let options = OptionsTable::builtin();
    let discovery = discover_options(html, &options);

    assert!(discovery.used_fallback());
    assert_eq!(discovery.axes, options.fallback.table());
    match discovery.source {
        DiscoverySource::Fallback { reason } => assert!(reason.contains("1 axes")),
        DiscoverySource::Inferred => panic!("expected fallback"),
    }
}

#[test]
fn too_few_total_values_falls_back_to_table() {
    let html = r#"<body><div data-id="1390"><span>Rectangle</span></div>
                  <div data-id="1419"><span>14pt Cardstock Gloss</span></div></body>"#;
    let options = OptionsTable::builtin();
    let discovery = discover_options(html, &options);
    assert!(discovery.used_fallback());
    assert_eq!(discovery.axes, options.fallback.table());
}

#[test]
fn fallback_thresholds_are_configurable() {
    let html = r#"<body><div data-id="1390"><span>Rectangle</span></div>
                  <div data-id="1391"><span>Square</span></div></body>"#;
    let mut options = OptionsTable::builtin();
    options.fallback.min_axes = 1;
    options.fallback.min_total_values = 2;
    let discovery = discover_options(html, &options);
    assert_eq!(discovery.source, DiscoverySource::Inferred);
    assert_eq!(discovery.axes.len(), 1);
    assert_eq!(discovery.axes[0].values.len(), 2);
}

#[test]
fn empty_page_uses_fallback() {
    let options = OptionsTable::builtin();
    let discovery = discover_options("<html><body></body></html>", &options);
    assert!(discovery.used_fallback());
    assert_eq!(discovery.axes.len(), 3);
}
