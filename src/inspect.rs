use crate::host::HostValue;

/// Maximum number of characters kept by [`inspect`].
pub const INSPECT_LIMIT: usize = 50;

const ELLIPSIS: &str = "...";

/// Bounded, human-readable representation of a host value.
pub fn inspect(value: &HostValue) -> String {
    match value {
        HostValue::Object(object) => truncate(&object.describe()),
        HostValue::Scalar(scalar) => truncate(&scalar.to_string()),
    }
}

/// Cuts `text` to [`INSPECT_LIMIT`] characters, appending `...` when cut.
pub fn truncate(text: &str) -> String {
    match text.char_indices().nth(INSPECT_LIMIT) {
        Some((at, _)) => format!("{}{ELLIPSIS}", &text[..at]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host::Scalar, testing::FakeObject};
    use std::sync::Arc;

    #[test]
    fn test_short_values_are_unchanged() {
        assert_eq!(inspect(&HostValue::string("hello")), "hello");
        assert_eq!(inspect(&HostValue::number(42.0)), "42");
        assert_eq!(inspect(&Scalar::Null.into()), "null");
    }

    #[test]
    fn test_long_values_are_truncated() {
        let long = "x".repeat(80);
        let shown = inspect(&HostValue::string(long));
        assert_eq!(shown.len(), INSPECT_LIMIT + 3);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_limit_is_counted_in_chars() {
        let exact = "é".repeat(INSPECT_LIMIT);
        assert_eq!(truncate(&exact), exact);
        let over = "é".repeat(INSPECT_LIMIT + 1);
        assert_eq!(truncate(&over).chars().count(), INSPECT_LIMIT + 3);
    }

    #[test]
    fn test_objects_use_their_description() {
        let object = Arc::new(FakeObject::new("App.Post").with_description("<App.Post:ember42>"));
        assert_eq!(inspect(&HostValue::Object(object)), "<App.Post:ember42>");
    }
}
