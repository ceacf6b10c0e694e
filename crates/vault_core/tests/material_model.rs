use vault_core::{AnnotationKind, Material};

#[test]
fn material_serializes_with_camel_case_fields() {
    let mut material = Material::new("标题", "内容", "案例", "生态");
    material.toggle_key_point();

    let json = serde_json::to_value(&material).unwrap();
    assert_eq!(json["id"], material.id.as_str());
    assert_eq!(json["createdAt"], material.created_at.as_str());
    assert_eq!(json["isKeyPoint"], true);
    assert_eq!(json["tags"], serde_json::json!([]));
    assert_eq!(json["annotations"], serde_json::json!([]));

    let decoded: Material = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, material);
}

#[test]
fn legacy_record_without_optional_fields_decodes() {
    let json = serde_json::json!({
        "id": "k3j2h1x9q",
        "title": "T",
        "content": "body",
        "category": "案例",
        "domain": "生态",
        "createdAt": "2025-01-02T03:04:05.678Z"
    });

    let material: Material = serde_json::from_value(json).unwrap();
    assert_eq!(material.id.as_str(), "k3j2h1x9q");
    assert!(!material.is_key_point);
    assert!(material.tags.is_empty());
}

#[test]
fn annotations_pass_through_unchanged() {
    let json = serde_json::json!({
        "id": "a1",
        "title": "",
        "content": "hello world",
        "category": "案例",
        "domain": "生态",
        "tags": ["x", "y", "x"],
        "annotations": [{
            "id": "n1",
            "start": 0,
            "end": 5,
            "type": "underline",
            "color": "#ff0",
            "note": "greeting",
            "text": "hello"
        }],
        "createdAt": "2025-01-02T03:04:05.678Z",
        "isKeyPoint": false
    });

    let material: Material = serde_json::from_value(json).unwrap();
    assert_eq!(material.tags, vec!["x", "y"]);
    assert_eq!(material.annotations.len(), 1);
    assert_eq!(material.annotations[0].kind, AnnotationKind::Underline);
    assert_eq!(material.annotations[0].note.as_deref(), Some("greeting"));

    let encoded = serde_json::to_value(&material).unwrap();
    assert_eq!(encoded["annotations"][0]["type"], "underline");
    assert_eq!(encoded["annotations"][0]["end"], 5);
}
