use serde_json::{Value, json};

use crate::package::DecodedPackage;

/// Rendering options for the JSON projection.
#[derive(Clone, Copy)]
pub struct JsonOpts {
    /// Max name entries to include before a `$truncated` marker.
    pub max_array_elems: usize,
    /// Summarize thumbnail payloads as `{"$type":"bytes","len":N}`
    /// instead of emitting every byte.
    pub bytes_summary: bool,
}

impl Default for JsonOpts {
    fn default() -> Self {
        Self {
            max_array_elems: 128,
            bytes_summary: true,
        }
    }
}

pub fn package_to_json(pkg: &DecodedPackage, opts: &JsonOpts) -> Value {
    let max = opts.max_array_elems.min(pkg.names.len());
    let mut names: Vec<Value> = pkg.names[..max]
        .iter()
        .map(|n| serde_json::to_value(n).unwrap_or(Value::Null))
        .collect();
    if pkg.names.len() > max {
        names.push(json!({
            "$truncated": true,
            "$omitted": pkg.names.len() - max,
        }));
    }

    let thumbnails: Vec<Value> = pkg
        .thumbnails
        .iter()
        .map(|t| {
            let bytes = match (&t.bytes, opts.bytes_summary) {
                (None, _) => Value::Null,
                (Some(b), true) => json!({ "$type": "bytes", "len": b.len() }),
                (Some(b), false) => Value::Array(b.iter().map(|x| Value::from(*x)).collect()),
            };
            json!({
                "asset_class_name": t.asset_class_name,
                "object_path": t.object_path,
                "file_offset": t.file_offset,
                "width": t.width,
                "height": t.height,
                "format": t.format.to_string(),
                "size": t.size,
                "bytes": bytes,
            })
        })
        .collect();

    json!({
        "header": serde_json::to_value(&pkg.header).unwrap_or(Value::Null),
        "names": names,
        "thumbnails": thumbnails,
    })
}

/// Pretty JSON string of the whole decode result, newline-terminated.
pub fn dump_package_json(pkg: &DecodedPackage, opts: &JsonOpts) -> String {
    let v = package_to_json(pkg, opts);
    let mut s = serde_json::to_string_pretty(&v).unwrap_or_else(|_| "null".to_string());
    s.push('\n');
    s
}
