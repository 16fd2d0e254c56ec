//! Generate an assessment payload for manual inspection

fn main() {
    let json = r#"{
        "text": { "emotion": "anxious", "stress_score": 0.72, "confidence": 0.85 },
        "image": { "dominant_emotion": "neutral", "stress_score": 0.45, "confidence": 0.6 },
        "behavioral": {
            "emoji_counts": { "anxious": 4, "sad": 2, "happy": 1 },
            "posting_frequency": 6.5,
            "posts_timeline": [
                "2024-03-02T01:15:00Z",
                "2024-03-02T02:40:00Z",
                "2024-03-02T13:05:00Z",
                "2024-03-02T23:30:00Z"
            ]
        }
    }"#;

    match mindscope_fusion::assess_json(json.to_string()) {
        Ok(payload) => println!("{payload}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
