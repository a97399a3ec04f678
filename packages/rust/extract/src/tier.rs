//! Access-tier detection.
//!
//! Episode pages carry no explicit access field. Restricted episodes are
//! recognized by the badge asset their page embeds. The detector keeps that
//! heuristic in one place so an explicit field can replace it later.

use castindex_shared::AccessTier;

/// Classifies a document as public or restricted by an asset-path marker.
#[derive(Debug, Clone)]
pub struct AccessTierDetector {
    marker: String,
}

impl AccessTierDetector {
    /// `marker` is matched case-insensitively; an empty marker classifies
    /// everything as public.
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_ascii_lowercase(),
        }
    }

    pub fn detect(&self, doc: &str) -> AccessTier {
        if self.marker.is_empty() {
            return AccessTier::Public;
        }
        if doc.to_ascii_lowercase().contains(&self.marker) {
            AccessTier::Restricted
        } else {
            AccessTier::Public
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_present_is_restricted() {
        let detector = AccessTierDetector::new("/assets/patreon.png");
        let doc = r#"<img src="/ASSETS/Patreon.png" alt="members">"#;
        assert_eq!(detector.detect(doc), AccessTier::Restricted);
    }

    #[test]
    fn marker_absent_is_public() {
        let detector = AccessTierDetector::new("/assets/patreon.png");
        assert_eq!(detector.detect("<img src=\"/assets/public.png\">"), AccessTier::Public);
        assert_eq!(detector.detect(""), AccessTier::Public);
    }

    #[test]
    fn empty_marker_never_matches() {
        let detector = AccessTierDetector::new("");
        assert_eq!(detector.detect("anything"), AccessTier::Public);
    }
}
