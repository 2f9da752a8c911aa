//! Layered configuration merging.

/// Recursively deep-merge `overlay` into `base`.
///
/// - Tables merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

/// Set a dotted `path` (e.g. `"keygen.iterations"`) in a table tree,
/// creating intermediate tables as needed.
pub fn set_path(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut parts = path.split('.').peekable();
    let mut current = root;
    while let Some(part) = parts.next() {
        let toml::Value::Table(table) = current else {
            return;
        };
        if parts.peek().is_none() {
            table.insert(part.to_owned(), value);
            return;
        }
        current = table
            .entry(part.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_tables_merge_scalars_replace() {
        let mut base = parse(
            r#"
            [keygen]
            iterations = 300000
            output_dir = "."
            [logging]
            directives = ["a=debug", "b=info"]
        "#,
        );
        let overlay = parse(
            r#"
            [keygen]
            iterations = 500000
            [logging]
            directives = ["c=trace"]
        "#,
        );
        deep_merge(&mut base, &overlay);

        assert_eq!(base["keygen"]["iterations"].as_integer(), Some(500_000));
        assert_eq!(base["keygen"]["output_dir"].as_str(), Some("."));
        assert_eq!(base["logging"]["directives"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_new_sections_are_added() {
        let mut base = parse("[keygen]\niterations = 1");
        deep_merge(&mut base, &parse("[sign]\nextension = \"sig\""));
        assert_eq!(base["sign"]["extension"].as_str(), Some("sig"));
        assert_eq!(base["keygen"]["iterations"].as_integer(), Some(1));
    }

    #[test]
    fn test_set_path_creates_tables() {
        let mut root = toml::Value::Table(toml::Table::new());
        set_path(&mut root, "logging.level", toml::Value::from("debug"));
        assert_eq!(root["logging"]["level"].as_str(), Some("debug"));

        set_path(&mut root, "logging.level", toml::Value::from("info"));
        assert_eq!(root["logging"]["level"].as_str(), Some("info"));
    }
}
