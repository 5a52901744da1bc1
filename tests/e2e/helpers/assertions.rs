use serde_json::Value;

/// The clip entry for `item_key` in a batch response
pub fn clip<'a>(body: &'a Value, item_key: &str) -> &'a Value {
    body["clips"]
        .as_array()
        .expect("Missing clips array")
        .iter()
        .find(|c| c["itemKey"] == item_key)
        .unwrap_or_else(|| panic!("No clip for '{}' in {}", item_key, body))
}

/// A clip carries exactly one of `url` / `inlineAudioBase64`
pub fn assert_clip_shape(clip: &Value) {
    assert!(clip.get("itemKey").and_then(|v| v.as_str()).is_some());
    assert!(clip.get("text").and_then(|v| v.as_str()).is_some());
    assert!(clip.get("sampleRate").and_then(|v| v.as_u64()).is_some());

    let has_url = clip.get("url").is_some();
    let has_inline = clip.get("inlineAudioBase64").is_some();
    assert!(has_url ^ has_inline, "Clip must have exactly one location: {}", clip);
}

pub fn assert_counts(body: &Value, requested: u64, generated: u64) {
    assert_eq!(body["requested"].as_u64(), Some(requested), "requested in {}", body);
    assert_eq!(body["generated"].as_u64(), Some(generated), "generated in {}", body);
}
