// Storage bucket policies
//
// Two buckets hold uploaded event artwork. Each bucket carries its own size
// cap and extension allowlist, enforced at upload time. Buckets are
// public-read: anyone can view a cover image, only authenticated owners can
// write.

/// Policy for one upload bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketPolicy {
    /// Stable bucket identifier used in URLs and the buckets table
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Maximum accepted file size in bytes
    pub max_size_bytes: i64,
    /// Lowercase file extensions accepted by this bucket
    pub allowed_extensions: &'static [&'static str],
}

/// Cover images: 10 MB cap, raster formats only
pub const BUCKET_COVERS: BucketPolicy = BucketPolicy {
    id: "event-covers",
    name: "Event Cover Images",
    max_size_bytes: 10 * 1024 * 1024,
    allowed_extensions: &["jpg", "jpeg", "png", "gif", "webp"],
};

/// Logo images: 5 MB cap, raster formats plus svg
pub const BUCKET_LOGOS: BucketPolicy = BucketPolicy {
    id: "event-logos",
    name: "Event Logo Images",
    max_size_bytes: 5 * 1024 * 1024,
    allowed_extensions: &["jpg", "jpeg", "png", "gif", "webp", "svg"],
};

pub const ALL_BUCKETS: [BucketPolicy; 2] = [BUCKET_COVERS, BUCKET_LOGOS];

impl BucketPolicy {
    /// Look up a bucket by its identifier
    pub fn by_id(id: &str) -> Option<&'static BucketPolicy> {
        ALL_BUCKETS.iter().find(|b| b.id == id)
    }

    /// Whether a filename's extension is accepted by this bucket
    pub fn allows_filename(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.allowed_extensions.contains(&ext.as_str())
    }

    /// Whether a payload of `size` bytes fits under this bucket's cap
    pub fn allows_size(&self, size: i64) -> bool {
        size > 0 && size <= self.max_size_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(BucketPolicy::by_id("event-covers"), Some(&BUCKET_COVERS));
        assert_eq!(BucketPolicy::by_id("event-logos"), Some(&BUCKET_LOGOS));
        assert_eq!(BucketPolicy::by_id("nope"), None);
    }

    #[test]
    fn test_extension_allowlist() {
        assert!(BUCKET_COVERS.allows_filename("banner.PNG"));
        assert!(BUCKET_COVERS.allows_filename("photo.webp"));
        assert!(!BUCKET_COVERS.allows_filename("logo.svg"));
        assert!(!BUCKET_COVERS.allows_filename("noextension"));
        assert!(BUCKET_LOGOS.allows_filename("logo.svg"));
    }

    #[test]
    fn test_size_caps() {
        assert!(BUCKET_COVERS.allows_size(10 * 1024 * 1024));
        assert!(!BUCKET_COVERS.allows_size(10 * 1024 * 1024 + 1));
        assert!(!BUCKET_LOGOS.allows_size(0));
        assert!(!BUCKET_LOGOS.allows_size(6 * 1024 * 1024));
    }
}
