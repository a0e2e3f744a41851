use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;
pub mod verdict;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_value_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}

pub(crate) fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.color,
    }
}

fn render_value_table(value: &Value) -> anyhow::Result<String> {
    let options = table_options();
    match value {
        Value::Array(items) => Ok(render_rows(items, options)),
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), value_to_cell(value)])
                .collect::<Vec<_>>();
            Ok(table::render_table(&["key", "value"], &rows, options))
        }
        scalar => Ok(value_to_cell(scalar)),
    }
}

/// Rows keep the key order of the first object; later objects may add columns.
fn render_rows(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }
    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_table(&["value"], &rows, options);
    }

    let mut headers = Vec::<&str>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(*header).map_or_else(|| "-".to_string(), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_table(&headers, &rows, options)
}

pub(crate) fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Row {
        persona: &'static str,
        sub_option: &'static str,
    }

    #[test]
    fn json_render_is_pretty_and_parses() {
        let row = Row {
            persona: "diabetes",
            sub_option: "type2",
        };
        let out = render(&row, OutputFormat::Json).unwrap();
        assert!(out.contains('\n'));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["persona"], "diabetes");
    }

    #[test]
    fn raw_render_is_single_line() {
        let rows = vec![Row {
            persona: "heart",
            sub_option: "cholesterol",
        }];
        let out = render(&rows, OutputFormat::Raw).unwrap();
        assert!(!out.contains('\n'));
    }

    #[test]
    fn array_table_keeps_field_order() {
        let rows = vec![
            Row {
                persona: "diabetes",
                sub_option: "type1",
            },
            Row {
                persona: "diabetes",
                sub_option: "type2",
            },
        ];
        let out = render(&rows, OutputFormat::Table).unwrap();
        let header = out.lines().next().unwrap();
        assert!(header.find("persona").unwrap() < header.find("sub_option").unwrap());
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn empty_array_renders_placeholder() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(render(&rows, OutputFormat::Table).unwrap(), "(no rows)");
    }

    #[test]
    fn cells_flatten_string_lists_and_nulls() {
        assert_eq!(value_to_cell(&json!(["a", "b"])), "a, b");
        assert_eq!(value_to_cell(&Value::Null), "-");
        assert_eq!(value_to_cell(&json!({"k": 1})), r#"{"k":1}"#);
    }
}
