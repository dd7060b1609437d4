use crate::{Error, Result};
use std::{collections::BTreeMap, path::Path};

/// Maps model output positions to human-readable labels.
///
/// The table is dense: every index in `0..len()` has a label.
#[derive(Debug, Clone)]
pub struct ClassIndex {
    labels: Vec<String>,
}

impl ClassIndex {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read class index {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&contents)
    }

    /// Parses a JSON object of the form `{"0": "label", "1": "label", ...}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;

        let mut by_index = BTreeMap::new();
        for (key, label) in raw {
            let index: usize = key
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("Class id is not an integer: {key:?}")))?;
            if by_index.insert(index, label).is_some() {
                return Err(Error::config(format!("Duplicate class id: {index}")));
            }
        }

        Self::from_map(by_index)
    }

    fn from_map(by_index: BTreeMap<usize, String>) -> Result<Self> {
        if by_index.is_empty() {
            return Err(Error::config("Class index is empty"));
        }

        // BTreeMap iterates in key order, so any gap shows up as a mismatch.
        let mut labels = Vec::with_capacity(by_index.len());
        for (expected, (index, label)) in by_index.into_iter().enumerate() {
            if index != expected {
                return Err(Error::config(format!("Class index has no label for id {expected}")));
            }
            labels.push(label);
        }

        Ok(Self { labels })
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl FromIterator<String> for ClassIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_string_keyed_table() {
        let index = ClassIndex::from_json(
            r#"{"1": "Apple___Black_rot", "0": "Apple___Apple_scab", "2": "Apple___healthy"}"#,
        )
        .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.label(0), Some("Apple___Apple_scab"));
        assert_eq!(index.label(1), Some("Apple___Black_rot"));
        assert_eq!(index.label(2), Some("Apple___healthy"));
        assert_eq!(index.label(3), None);
    }

    #[test]
    fn test_numeric_keys_are_ordered_numerically() {
        let json = (0..12)
            .map(|i| format!("\"{i}\": \"class-{i}\""))
            .collect::<Vec<_>>()
            .join(",");
        let index = ClassIndex::from_json(&format!("{{{json}}}")).unwrap();

        assert_eq!(index.label(10), Some("class-10"));
        assert_eq!(index.label(2), Some("class-2"));
    }

    #[test]
    fn test_gap_is_rejected() {
        let result = ClassIndex::from_json(r#"{"0": "a", "2": "c"}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("no label for id 1"));
    }

    #[test]
    fn test_non_integer_key_is_rejected() {
        assert!(ClassIndex::from_json(r#"{"zero": "a"}"#).is_err());
    }

    #[test]
    fn test_duplicate_after_normalization_is_rejected() {
        let result = ClassIndex::from_json(r#"{"0": "a", " 0": "b"}"#);
        assert!(result.unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert!(ClassIndex::from_json("{}").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class_indices.json");
        std::fs::write(&path, r#"{"0": "Tomato___healthy"}"#).unwrap();

        let index = ClassIndex::load(&path).unwrap();
        assert_eq!(index.labels().collect::<Vec<_>>(), vec!["Tomato___healthy"]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = ClassIndex::load("/nonexistent/class_indices.json");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
