use jsonpath_rust::{JsonPath, JsonPathValue};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinitionVersion;
use serde_json::Value;

use crate::logger;

/// 値が取れなかったセルに表示する文字列
pub const EMPTY_TEXT_PLACEHOLDER: &str = "-";

/// テーブルに収まる追加カラムの上限
pub const MAX_PRINTER_COLUMNS: usize = 5;

/// `additionalPrinterColumns` から生成する表示カラム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterColumn {
    pub header: String,
    pub json_path: String,
}

impl PrinterColumn {
    pub fn new(header: impl Into<String>, json_path: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            json_path: json_path.into(),
        }
    }

    pub fn value(&self, resource: &Value) -> String {
        format_cell(resource, &self.json_path)
    }
}

/// Extra columns declared by a CRD version, in declared order, capped at
/// [`MAX_PRINTER_COLUMNS`].
pub fn printer_columns(version: &CustomResourceDefinitionVersion) -> Vec<PrinterColumn> {
    let Some(columns) = &version.additional_printer_columns else {
        return Vec::new();
    };

    if MAX_PRINTER_COLUMNS < columns.len() {
        logger!(
            debug,
            "version {} declares {} printer columns; showing the first {}",
            version.name,
            columns.len(),
            MAX_PRINTER_COLUMNS
        );
    }

    columns
        .iter()
        .take(MAX_PRINTER_COLUMNS)
        .map(|column| PrinterColumn::new(&column.name, &column.json_path))
        .collect()
}

/// `.status.phase` のような printer column の式を `$.status.phase` に変換する
fn normalize_json_path(json_path: &str) -> String {
    let json_path = json_path.trim();

    if json_path.starts_with('$') {
        json_path.to_string()
    } else if json_path.starts_with('.') || json_path.starts_with('[') {
        format!("${}", json_path)
    } else {
        format!("$.{}", json_path)
    }
}

/// First value the path selects on `resource`, if any.
pub fn select_first(resource: &Value, json_path: &str) -> Option<Value> {
    let path: JsonPath = match normalize_json_path(json_path).parse() {
        Ok(path) => path,
        Err(err) => {
            logger!(warn, "invalid json path {}: {}", json_path, err);
            return None;
        }
    };

    match path.find_slice(resource).into_iter().next() {
        Some(JsonPathValue::Slice(value, _)) => Some(value.clone()),
        Some(JsonPathValue::NewValue(value)) => Some(value),
        Some(JsonPathValue::NoValue) | None => None,
    }
}

pub fn format_cell(resource: &Value, json_path: &str) -> String {
    format_value(select_first(resource, json_path))
}

pub fn format_value(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => EMPTY_TEXT_PLACEHOLDER.to_string(),
        Some(Value::String(s)) if s.is_empty() => EMPTY_TEXT_PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s,
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(value @ (Value::Object(_) | Value::Array(_))) => value.to_string(),
    }
}
