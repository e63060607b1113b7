use chrono::{DateTime, Utc};
use rand::Rng;

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

const QR_SERVER: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Longest URL Discord accepts for an embed image.
pub const MAX_EMBED_URL_LEN: usize = 2048;

/// Image URL of a QR code encoding `text`, or `None` when the encoded URL
/// would not fit in an embed.
pub fn qr_code_url(text: &str, size: u32) -> Option<String> {
    let size = size.clamp(100, 1000);
    let url = format!(
        "{}?size={size}x{size}&margin=10&data={}",
        QR_SERVER,
        urlencoding::encode(text)
    );
    (url.len() <= MAX_EMBED_URL_LEN).then_some(url)
}

/// Creation time embedded in a Discord snowflake.
pub fn snowflake_timestamp(id: u64) -> Option<DateTime<Utc>> {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    DateTime::from_timestamp_millis(i64::try_from(millis).ok()?)
}

/// Uniform integer in `[min, max]`; the bounds may come in either order.
pub fn random_in_range(min: i64, max: i64) -> i64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rand::rng().random_range(low..=high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake() {
        // example id from the Discord developer docs
        let ts = snowflake_timestamp(175928847299117063).unwrap();
        assert_eq!(ts.timestamp_millis(), 1462015105796);
        assert_eq!(snowflake_timestamp(0).unwrap().timestamp_millis(), 1_420_070_400_000);
    }

    #[test]
    fn test_qr_url_encodes_text() {
        let url = qr_code_url("hello world&x=1", 5000).unwrap();
        assert!(url.contains("size=1000x1000"));
        assert!(url.ends_with("data=hello%20world%26x%3D1"));
    }

    #[test]
    fn test_qr_url_rejects_text_too_long_for_embed() {
        // every kana percent-encodes to nine characters
        let kana = "あ".repeat(300);
        assert!(qr_code_url(&kana, 500).is_none());

        let ascii = "a".repeat(1900);
        let url = qr_code_url(&ascii, 500).unwrap();
        assert!(url.len() <= MAX_EMBED_URL_LEN);
    }

    #[test]
    fn test_random_bounds() {
        for _ in 0..100 {
            let n = random_in_range(10, 1);
            assert!((1..=10).contains(&n));
        }
        assert_eq!(random_in_range(7, 7), 7);
    }
}
