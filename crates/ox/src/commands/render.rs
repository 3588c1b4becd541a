//! Record rendering through the `ox/cli/record` extension point.
//!
//! Every record is drawn by invoking `Draw` on the point with the record in
//! the baton; the non-empty string values are joined in extension order.
//! Other code can extend or replace the built-in cells by id.

use anyhow::Result;
use colored::Colorize;
use ox_core::Record;
use ox_sdk::extensions::{Baton, Capability, Extension, ExtensionRegistry, Outcome, Point};
use serde_json::Value;

/// Extension point records are drawn through
pub const RECORD_POINT: &str = "ox/cli/record";

/// Register the built-in `index`, `id` and `fields` cells.
pub async fn register_defaults(registry: &ExtensionRegistry) -> Result<()> {
    let point = registry.declare(RECORD_POINT, [Capability::Draw]).await;

    point
        .extend([
            Extension::new("index").index(100).draw(|_, baton| {
                let cell = match record(baton).and_then(|r| r.get("index")) {
                    Some(index) => format!("{:>4}", plain(index)).dimmed().to_string(),
                    None => String::new(),
                };
                Ok(Outcome::Value(Value::String(cell)))
            }),
            Extension::new("id").index(200).draw(|_, baton| {
                let cell = record(baton)
                    .and_then(ox_sdk::collections::record_id)
                    .map(|id| id.bold().to_string())
                    .unwrap_or_default();
                Ok(Outcome::Value(Value::String(cell)))
            }),
            Extension::new("fields").index(300).draw(|_, baton| {
                let cell = record(baton)
                    .map(|r| {
                        r.iter()
                            .filter(|(key, _)| key.as_str() != "id" && key.as_str() != "index")
                            .map(|(key, value)| format!("{}={}", key.cyan(), plain(value)))
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .unwrap_or_default();
                Ok(Outcome::Value(Value::String(cell)))
            }),
        ])
        .await?;

    Ok(())
}

/// Draw one record as a single line.
pub async fn render(point: &Point, record: &Record) -> Result<String> {
    let mut baton = Baton::new().with("record", Value::Object(record.clone()));
    let values = point
        .invoke(&Capability::Draw, &mut baton)
        .await?
        .values()
        .await?;

    Ok(values
        .iter()
        .filter_map(Value::as_str)
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join("  "))
}

fn record(baton: &Baton) -> Option<&Record> {
    baton.get("record")?.as_object()
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
