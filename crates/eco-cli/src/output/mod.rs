use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(map) => {
            let mut sections = vec![render_object_table(&map)];
            // Lists of records read better as their own tables below the summary.
            for (key, value) in &map {
                if let Value::Array(items) = value
                    && is_record_list(items)
                {
                    sections.push(format!("\n{key}:\n{}", render_array_table(items)));
                }
            }
            Ok(sections.join("\n"))
        }
        scalar => {
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render_entity_table(&["value"], &rows, table_options()))
        }
    }
}

fn render_object_table(map: &Map<String, Value>) -> String {
    let mut rows = Vec::new();
    flatten_into("", map, &mut rows);
    rows.sort_by(|a, b| a[0].cmp(&b[0]));
    table::render_entity_table(&["key", "value"], &rows, table_options())
}

/// Nested objects become dotted keys; record lists are rendered separately.
fn flatten_into(prefix: &str, map: &Map<String, Value>, rows: &mut Vec<Vec<String>>) {
    for (key, value) in map {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(&key, inner, rows),
            Value::Array(items) if is_record_list(items) => {}
            Value::Null => {}
            other => rows.push(vec![key, value_to_cell(other)]),
        }
    }
}

fn is_record_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_object)
}

fn render_array_table(items: &[Value]) -> String {
    let options = table_options();

    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&["value"], &rows, options);
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_refs, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; "),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::{render, table::render_entity_table};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Line {
        name: &'static str,
        distance: &'static str,
    }

    #[derive(Serialize)]
    struct Impact {
        co2_saved_kg: &'static str,
    }

    #[derive(Serialize)]
    struct Example {
        material: &'static str,
        credits: u32,
        impact: Impact,
        citations: Vec<&'static str>,
        recyclers: Vec<Line>,
        hazard: Option<&'static str>,
    }

    fn example() -> Example {
        Example {
            material: "PET",
            credits: 15,
            impact: Impact { co2_saved_kg: "0.2" },
            citations: vec!["MSW Rules 2016", "Local guide"],
            recyclers: vec![
                Line {
                    name: "GreenCycle",
                    distance: "1.2 km",
                },
                Line {
                    name: "EcoHub",
                    distance: "3.4 km",
                },
            ],
            hazard: None,
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&example(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["material"], "PET");
        assert_eq!(parsed["credits"], 15);
        assert!(parsed["hazard"].is_null());
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&example(), OutputFormat::Raw).expect("raw render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["recyclers"][1]["name"], "EcoHub");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_flattens_nested_objects() {
        let out = render(&example(), OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("impact.co2_saved_kg"));
        assert!(out.contains("MSW Rules 2016; Local guide"));
        assert!(!out.contains("hazard"));
    }

    #[test]
    fn table_render_lists_records_below_summary() {
        let out = render(&example(), OutputFormat::Table).expect("table render should work");
        let section = out.find("recyclers:").expect("recycler section");
        let rest = &out[section..];
        assert!(rest.contains("name"));
        assert!(rest.contains("GreenCycle"));
        assert!(rest.contains("3.4 km"));
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let out = render(&Vec::<Line>::new(), OutputFormat::Table).expect("table render");
        assert_eq!(out, "(no rows)");
    }

    #[test]
    fn table_alignment_handles_mixed_widths() {
        let headers = ["name", "distance", "score"];
        let rows = vec![
            vec!["A".to_string(), "0.4 km".to_string(), "9.1".to_string()],
            vec![
                "Municipal Dry Waste Centre".to_string(),
                "12.8 km".to_string(),
                "7.0".to_string(),
            ],
        ];

        let table = render_entity_table(
            &headers,
            &rows,
            super::table::TableOptions {
                max_width: None,
                color: false,
            },
        );
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("distance"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2].len(), lines[3].len());
    }
}
