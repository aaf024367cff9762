//! Lossless JSON round trips for page documents

use pagecraft_schema::{ConsistencyIssue, Page};
use serde_json::json;

#[test]
fn test_nested_settings_survive_round_trip() {
    let doc = json!({
        "order": ["hero", "content"],
        "sections": {
            "hero": {
                "id": "hero",
                "type": "image-banner",
                "settings": {
                    "title": "Welcome",
                    "layout": { "columns": [1, 2, { "span": 3 }], "dense": false },
                    "unknownKey": null
                }
            },
            "content": {
                "id": "content",
                "type": "rich-text",
                "settings": { "heading": "About Us" },
                "blocks": [
                    { "id": "b1", "type": "text", "settings": { "text": "We build editors." } },
                    { "id": "b2", "type": "table", "settings": { "rows": [["a", "b"], ["c", "d"]] } }
                ]
            }
        }
    });

    let page = Page::from_json(&doc.to_string()).unwrap();
    assert_eq!(page.to_value(), doc);

    let reparsed = Page::from_json(&page.to_json_pretty()).unwrap();
    assert_eq!(reparsed, page);
}

#[test]
fn test_settings_key_order_preserved() {
    let source = r#"{
        "order": ["s"],
        "sections": {
            "s": { "id": "s", "type": "container", "settings": { "z": 1, "a": 2, "m": 3 } }
        }
    }"#;

    let page = Page::from_json(source).unwrap();
    let keys: Vec<_> = page.sections["s"].settings.keys().cloned().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_sections_serialize_by_id_with_order_kept() {
    let source = r#"{
        "order": ["b", "a"],
        "sections": {
            "b": { "id": "b", "type": "container", "settings": { "z": 1, "a": 2 } },
            "a": { "id": "a", "type": "container" }
        }
    }"#;

    let value = Page::from_json(source).unwrap().to_value();
    let ids: Vec<_> = value["sections"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(value["order"], json!(["b", "a"]));

    let settings: Vec<_> = value["sections"]["b"]["settings"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(settings, vec!["z", "a"]);
}

#[test]
fn test_check_reports_every_issue_kind() {
    let page = Page::from_value(json!({
        "order": ["a", "missing"],
        "sections": {
            "a": { "id": "a", "type": "x", "settings": {}, "blocks": [
                { "id": "dup", "type": "text", "settings": {} }
            ] },
            "b": { "id": "other", "type": "x", "settings": {}, "blocks": [
                { "id": "dup", "type": "text", "settings": {} }
            ] }
        }
    }))
    .unwrap();

    let issues = page.check();
    assert!(issues.contains(&ConsistencyIssue::DanglingOrderId("missing".into())));
    assert!(issues.contains(&ConsistencyIssue::UnorderedSection("b".into())));
    assert!(issues.contains(&ConsistencyIssue::IdMismatch {
        key: "b".into(),
        id: "other".into()
    }));
    assert!(issues.contains(&ConsistencyIssue::DuplicateId("dup".into())));
}

#[test]
fn test_invalid_json_is_an_error() {
    let result = Page::from_json("{ \"order\": 3 }");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().starts_with("Invalid page JSON"));
}
