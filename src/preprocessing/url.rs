use crate::error::InferenceError;
use ndarray::Array2;

/// Number of columns in a tabulated [`FeatureRecord`].
pub const FEATURE_COUNT: usize = 2;

/// Features derived from a single URL. The trained model expects exactly these two columns
/// in this order, so neither the set nor the derivation may change without retraining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRecord {
    pub url_length: usize,
    pub https: u8,
}

impl FeatureRecord {
    /// Column values in model order: `url_length`, `https`.
    pub fn to_values(&self) -> [f32; FEATURE_COUNT] {
        [self.url_length as f32, f32::from(self.https)]
    }

    /// Wraps the record as a one-row table of shape `[1, FEATURE_COUNT]`.
    pub fn to_row(&self) -> Result<Array2<f32>, InferenceError> {
        let row = Array2::from_shape_vec((1, FEATURE_COUNT), self.to_values().to_vec())?;
        Ok(row)
    }
}

/// Length in characters and a case-sensitive "https" prefix flag. No parsing.
pub fn extract_features(url: &str) -> FeatureRecord {
    FeatureRecord {
        url_length: url.chars().count(),
        https: u8::from(url.starts_with("https")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_url() {
        let features = extract_features("https://example.com");
        assert_eq!(
            features,
            FeatureRecord {
                url_length: 19,
                https: 1
            }
        );
    }

    #[test]
    fn test_non_https_schemes() {
        assert_eq!(extract_features("ftp://x").https, 0);
        assert_eq!(extract_features("http://example.com").https, 0);
        assert_eq!(extract_features("HTTPS://example.com").https, 0);
        assert_eq!(extract_features(" https://example.com").https, 0);
    }

    #[test]
    fn test_prefix_only_no_parsing() {
        // Not a URL at all, but the prefix matches.
        let features = extract_features("httpsnotaurl");
        assert_eq!(features.https, 1);
        assert_eq!(features.url_length, 12);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(
            extract_features(""),
            FeatureRecord {
                url_length: 0,
                https: 0
            }
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let url = "https://bücher.de/ü";
        assert_eq!(extract_features(url).url_length, url.chars().count());
        assert!(extract_features(url).url_length < url.len());
    }

    #[test]
    fn test_length_matches_for_many_inputs() {
        let long = "x".repeat(4096);
        for url in ["a", "ab", "https", "http://a.b/c?d=e#f", "日本語", long.as_str()] {
            assert_eq!(extract_features(url).url_length, url.chars().count());
        }
    }

    #[test]
    fn test_to_row_shape_and_order() {
        let row = extract_features("https://example.com").to_row().unwrap();
        assert_eq!(row.shape(), &[1, FEATURE_COUNT]);
        assert_eq!(row[[0, 0]], 19.0);
        assert_eq!(row[[0, 1]], 1.0);
    }
}
