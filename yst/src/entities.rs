//! HTML entity handling for markers
//!
//! The two directions are asymmetric: expression text is decoded
//! from all four entities the markup encoder produces, while results are only
//! encoded for `<` and `"`.

use serde_json::Value;

/// Decode `&quot;`, `&amp;`, `&lt;` and `&gt;`, in that order
pub fn decode(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Encode `<` and `"` in text
pub fn encode_text(text: &str) -> String {
    text.replace('<', "&lt;").replace('"', "&quot;")
}

/// Encode a value for insertion; non-text values pass through unchanged
pub fn encode(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(encode_text(&text)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_decode_handles_all_four_entities() {
        assert_eq!(decode("&quot;&amp;&lt;&gt;"), "\"&<>");
    }

    #[test]
    fn test_decode_is_sequential() {
        // `&amp;lt;` becomes `&lt;` and then `<`
        assert_eq!(decode("&amp;lt;"), "<");
    }

    #[test]
    fn test_encode_handles_only_two_characters() {
        assert_eq!(encode_text("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;>&</a>");
    }

    #[test]
    fn test_encode_decode_is_not_a_round_trip() {
        let original = "&quot;&amp;&lt;&gt;";
        let decoded = decode(original);
        assert_eq!(encode_text(&decoded), "&quot;&&lt;>");
        assert_ne!(encode_text(&decoded), original);
    }

    #[test]
    fn test_encode_leaves_non_text_alone() {
        assert_eq!(encode(json!(5)), json!(5));
        assert_eq!(encode(json!(["<"])), json!(["<"]));
        assert_eq!(encode(json!("<b>")), json!("&lt;b>"));
    }

    proptest! {
        #[test]
        fn encode_output_has_no_raw_lt_or_quote(s in ".*") {
            let encoded = encode_text(&s);
            prop_assert!(!encoded.contains('<'));
            prop_assert!(!encoded.contains('"'));
        }

        #[test]
        fn decode_is_identity_without_ampersands(s in "[^&]*") {
            prop_assert_eq!(decode(&s), s);
        }
    }
}
