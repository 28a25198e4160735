//! Read-only access to the bound data object

use serde_json::Value;

/// The externally supplied data object templates are evaluated against
///
/// Lookups are read-only; how the object is mutated and how those mutations
/// are announced is up to the host, which reports them through
/// `Rendered::invalidate` or an `Invalidator`.
pub trait DataSource {
    /// Value at the given path below the data root, `None` if any segment is
    /// missing. An empty path addresses the whole object.
    fn get(&self, segments: &[String]) -> Option<Value>;
}

impl DataSource for Value {
    fn get(&self, segments: &[String]) -> Option<Value> {
        let mut current = self;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current.clone())
    }
}

impl<F> DataSource for F
where
    F: Fn(&[String]) -> Option<Value>,
{
    fn get(&self, segments: &[String]) -> Option<Value> {
        self(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(String::from).collect()
    }

    #[test]
    fn test_json_object_lookup() {
        let data = json!({"user": {"name": "Ada"}});
        assert_eq!(DataSource::get(&data, &path("user.name")), Some(json!("Ada")));
        assert_eq!(DataSource::get(&data, &path("user.age")), None);
    }

    #[test]
    fn test_json_array_lookup() {
        let data = json!({"items": ["a", "b"]});
        assert_eq!(DataSource::get(&data, &path("items.1")), Some(json!("b")));
        assert_eq!(DataSource::get(&data, &path("items.7")), None);
        assert_eq!(DataSource::get(&data, &path("items.first")), None);
    }

    #[test]
    fn test_empty_path_is_whole_object() {
        let data = json!({"a": 1});
        assert_eq!(DataSource::get(&data, &[]), Some(json!({"a": 1})));
    }

    #[test]
    fn test_closure_source() {
        let source = |segments: &[String]| -> Option<Value> {
            (segments.join(".") == "clock.time").then(|| json!("12:00"))
        };
        assert_eq!(source.get(&path("clock.time")), Some(json!("12:00")));
        assert_eq!(source.get(&path("clock.date")), None);
    }
}
