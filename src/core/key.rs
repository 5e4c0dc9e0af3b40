use std::fmt;
use std::ops::Deref;
use std::path::{Component, Path};

// Separator between key segments.
pub const SEPARATOR: char = '/';

// StoreKey is the full path of one imported property in the store.
// It never contains empty segments, so it never starts or ends with a
// separator and never contains two separators in a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(String);

impl Deref for StoreKey {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StoreKey {
    /// Join `prefix`, the directory segments and `property_name`.
    pub fn derive<S>(prefix: &str, relative_directory: &[S], property_name: &str) -> Self
    where
        S: AsRef<str>,
    {
        let segments = std::iter::once(prefix)
            .chain(relative_directory.iter().map(AsRef::as_ref))
            .chain(std::iter::once(property_name))
            .flat_map(|part| part.split(SEPARATOR))
            .filter(|segment| !segment.is_empty());

        let mut key = String::new();
        for segment in segments {
            if !key.is_empty() {
                key.push(SEPARATOR);
            }
            key.push_str(segment);
        }

        StoreKey(key)
    }

    /// Whether `property_name` keeps at least one segment once split on the
    /// separator. Names made only of separators would collapse onto the
    /// directory key.
    pub fn is_valid_name(property_name: &str) -> bool {
        property_name
            .split(SEPARATOR)
            .any(|segment| !segment.is_empty())
    }

    /// The key space owned by `prefix`, including the trailing separator.
    /// An empty prefix owns the whole store.
    pub fn namespace(prefix: &str) -> String {
        let root = StoreKey::derive::<&str>(prefix, &[], "");
        if root.is_empty() {
            root.0
        } else {
            format!("{}{}", root.0, SEPARATOR)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Directory segments of `file`'s parent relative to `base`.
/// Empty when the file sits directly in `base`.
pub fn relative_directory(base: &Path, file: &Path) -> Vec<String> {
    let parent = match file.parent() {
        Some(parent) => parent,
        None => return Vec::new(),
    };

    match parent.strip_prefix(base) {
        Ok(relative) => relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}
