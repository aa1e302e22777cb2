//! Pointers into the blob store.

use std::fmt;

/// A location in a bucket. Creating one performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageRef {
    bucket: String,
    full_path: String,
}

impl StorageRef {
    /// Reference `path` in `bucket`. Leading, trailing and repeated slashes
    /// are dropped, so `"/images//a.png/"` is `images/a.png`.
    #[must_use]
    pub fn new(bucket: impl Into<String>, path: &str) -> Self {
        Self {
            bucket: bucket.into(),
            full_path: normalize(path),
        }
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Path from the bucket root, without leading slash. Empty at the root.
    #[must_use]
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.full_path
            .rsplit_once('/')
            .map_or(self.full_path.as_str(), |(_, name)| name)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.full_path.is_empty()
    }

    /// The enclosing directory, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let parent = self
            .full_path
            .rsplit_once('/')
            .map_or("", |(parent, _)| parent);
        Some(Self {
            bucket: self.bucket.clone(),
            full_path: parent.to_string(),
        })
    }

    /// A reference below this one.
    #[must_use]
    pub fn child(&self, path: &str) -> Self {
        let child = normalize(path);
        let full_path = match (self.is_root(), child.is_empty()) {
            (_, true) => self.full_path.clone(),
            (true, false) => child,
            (false, false) => format!("{}/{child}", self.full_path),
        };
        Self {
            bucket: self.bucket.clone(),
            full_path,
        }
    }
}

impl fmt::Display for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.full_path)
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = "tensura-store.appspot.com";

    #[test]
    fn test_new_normalizes_slashes() {
        let r = StorageRef::new(BUCKET, "/products//rimuru/plush.png/");
        assert_eq!(r.full_path(), "products/rimuru/plush.png");
        assert_eq!(r.name(), "plush.png");
        assert_eq!(r.bucket(), BUCKET);
    }

    #[test]
    fn test_root() {
        let root = StorageRef::new(BUCKET, "/");
        assert!(root.is_root());
        assert_eq!(root.name(), "");
        assert_eq!(root.parent(), None);
        assert_eq!(root.to_string(), "gs://tensura-store.appspot.com/");
    }

    #[test]
    fn test_parent_chain() {
        let r = StorageRef::new(BUCKET, "a/b/c.txt");
        let parent = r.parent().unwrap_or_else(|| StorageRef::new(BUCKET, "missing"));
        assert_eq!(parent.full_path(), "a/b");
        assert_eq!(StorageRef::new(BUCKET, "top.txt").parent(), Some(StorageRef::new(BUCKET, "")));
    }

    #[test]
    fn test_child() {
        let root = StorageRef::new(BUCKET, "");
        assert_eq!(root.child("images/").full_path(), "images");
        let images = StorageRef::new(BUCKET, "images");
        assert_eq!(images.child("/banners/hero.jpg").full_path(), "images/banners/hero.jpg");
        assert_eq!(images.child("").full_path(), "images");
    }

    #[test]
    fn test_display_is_gs_url() {
        let r = StorageRef::new(BUCKET, "images/hero.jpg");
        assert_eq!(r.to_string(), "gs://tensura-store.appspot.com/images/hero.jpg");
    }
}
