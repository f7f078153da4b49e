use otty_ui_expand::{
    ExpandOptions, ExpandSettings, ExpansionStateManager, FlattenedRow,
    RowKey, flatten_rows,
};
use serde_json::{Value, json};

const SETTINGS: &str = r#"{
    "defaultExpandAllRows": true,
    "childrenColumnName": "items"
}"#;

fn row_key(row: &FlattenedRow<'_, Value>, _index: usize) -> RowKey {
    match &row.origin()["name"] {
        Value::String(name) => RowKey::from(name.as_str()),
        other => RowKey::from(other.to_string()),
    }
}

fn print_rows(
    flat: &[FlattenedRow<'_, Value>],
    manager: &ExpansionStateManager<'_, Value>,
) {
    for (index, entry) in flat.iter().enumerate() {
        let key = row_key(entry, index);
        let marker = if !manager.is_row_expandable(entry, index) {
            " "
        } else if manager.is_expanded(&key) {
            "-"
        } else {
            "+"
        };
        let indent = "  ".repeat(entry.depth);
        println!("{indent}{marker} {key}");
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let rows = vec![
        json!({"name": "src", "items": [
            {"name": "lib.rs"},
            {"name": "row", "items": [{"name": "mod.rs"}]},
        ]}),
        json!({"name": "tests", "items": []}),
        json!({"name": "Cargo.toml"}),
    ];

    let settings = ExpandSettings::from_json(SETTINGS)?;
    let column = settings.children_column_name.clone();
    let flat = flatten_rows(&rows, &column);

    let options = ExpandOptions::from_settings(settings)
        .on_expand(|row: Option<&Value>, expanded| {
            let name = row.map(|row| row["name"].to_string());
            println!("on_expand({name:?}, {expanded})");
        })
        .on_expanded_rows_change(|keys| {
            let keys: Vec<String> =
                keys.iter().map(ToString::to_string).collect();
            println!("on_expanded_rows_change([{}])", keys.join(", "));
        });
    let mut manager = ExpansionStateManager::new(options, &flat, row_key);
    print_rows(&flat, &manager);

    for name in ["row", "Cargo.toml", "src"] {
        manager.toggle(&flat, &RowKey::from(name));
        print_rows(&flat, &manager);
    }

    Ok(())
}
