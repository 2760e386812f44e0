use serde_json::{Map, Value};

use super::BookChunk;

pub const SERIAL_COLUMN: &str = "SrNo";
pub const SOURCE_COLUMN: &str = "SourceURL";

/// Flat view over every event found in a book's chunk results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Chunk results are either an object or a JSON string holding one; events
/// live under the `Events` array. Anything else contributes no rows.
fn chunk_events(result: &Value) -> Vec<Map<String, Value>> {
    let parsed;
    let obj = match result {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(v) => {
                parsed = v;
                &parsed
            }
            Err(_) => return Vec::new(),
        },
        other => other,
    };
    obj.get("Events")
        .and_then(|e| e.as_array())
        .map(|events| {
            events
                .iter()
                .filter_map(|e| e.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}

fn render_cell(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl EventTable {
    pub fn from_chunks(chunks: &[BookChunk]) -> Self {
        let mut keys: Vec<String> = Vec::new();
        let mut flat: Vec<(Map<String, Value>, Option<&str>)> = Vec::new();
        for chunk in chunks {
            for event in chunk_events(&chunk.result) {
                for k in event.keys() {
                    if k != SERIAL_COLUMN && k != SOURCE_COLUMN && !keys.iter().any(|x| x == k) {
                        keys.push(k.clone());
                    }
                }
                flat.push((event, chunk.source_url.as_deref()));
            }
        }

        let mut headers = Vec::with_capacity(keys.len() + 2);
        headers.push(SERIAL_COLUMN.to_string());
        headers.extend(keys.iter().cloned());
        headers.push(SOURCE_COLUMN.to_string());

        let rows = flat
            .into_iter()
            .enumerate()
            .map(|(i, (event, source))| {
                let mut row = Vec::with_capacity(headers.len());
                row.push((i + 1).to_string());
                for k in &keys {
                    row.push(render_cell(event.get(k)));
                }
                row.push(source.unwrap_or("").to_string());
                row
            })
            .collect();

        Self { headers, rows }
    }

    pub fn to_csv(&self) -> anyhow::Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.into_inner()
            .map_err(|e| anyhow::anyhow!("csv flush failed: {}", e))
    }
}
