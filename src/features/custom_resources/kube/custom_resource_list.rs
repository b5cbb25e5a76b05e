use anyhow::Result;
use chrono::{DateTime, Utc};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, CustomResourceDefinitionVersion,
};
use serde_json::Value;

use crate::{
    kube::{KubeClientRequest, KubeTable, KubeTableRow, NamespaceSelection},
    logger,
    util::creation_age,
};

use super::{
    printer_column::{format_value, printer_columns, PrinterColumn, EMPTY_TEXT_PLACEHOLDER},
    resource_url::{resource_url, resource_url_prefix},
};

/// CRD の1バージョン分のカスタムリソース一覧の定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomResourceList {
    pub title: String,
    pub resource_type: String,
    pub resource_url: String,
    pub resource_url_prefix: String,
    pub columns: Vec<PrinterColumn>,
    pub namespace: NamespaceSelection,
    /// CRD の scope が Namespaced か
    pub is_namespaced: bool,
}

impl CustomResourceList {
    pub fn new(
        crd: &CustomResourceDefinition,
        version: &CustomResourceDefinitionVersion,
        namespace: NamespaceSelection,
    ) -> Self {
        let kind = &crd.spec.names.kind;

        Self {
            title: pluralize(kind),
            resource_type: kind.to_string(),
            resource_url: resource_url(crd, version, &namespace),
            resource_url_prefix: resource_url_prefix(crd, version),
            columns: printer_columns(version),
            namespace,
            is_namespaced: crd.spec.scope == "Namespaced",
        }
    }

    /// Namespaced resources listed across all namespaces.
    fn has_namespace_column(&self) -> bool {
        self.is_namespaced && !self.namespace.is_namespaced()
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["Name".to_string()];

        if self.has_namespace_column() {
            header.push("Namespace".to_string());
        }

        header.push("Age".to_string());

        header.extend(self.columns.iter().map(|c| c.header.to_string()));

        header
    }

    fn row(&self, item: &Value, now: DateTime<Utc>) -> KubeTableRow {
        let name = item
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let namespace = item
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let mut row = vec![name.clone()];

        if self.has_namespace_column() {
            row.push(format_value(namespace.clone().map(Value::String)));
        }

        row.push(creation_age(item, now).unwrap_or_else(|| EMPTY_TEXT_PLACEHOLDER.to_string()));

        row.extend(self.columns.iter().map(|c| c.value(item)));

        KubeTableRow {
            namespace,
            name,
            row,
        }
    }

    /// `{ items: [...] }` 形式のリストをテーブルに変換する
    pub fn to_table(&self, list: &Value, now: DateTime<Utc>) -> KubeTable {
        let mut table = KubeTable::new(self.header());

        let items = list
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for item in items {
            table.push_row(self.row(item, now));
        }

        table
    }

    pub async fn fetch<C: KubeClientRequest>(&self, client: &C) -> Result<KubeTable> {
        logger!(info, "fetch {} from {}", self.title, self.resource_url);

        let list: Value = client.request(&self.resource_url).await?;

        Ok(self.to_table(&list, Utc::now()))
    }
}

/// Kind 名を英語の複数形にする
pub fn pluralize(kind: &str) -> String {
    if kind.is_empty() {
        return String::new();
    }

    let lower = kind.to_lowercase();

    let consonant_y = lower.ends_with('y')
        && !matches!(
            lower.chars().rev().nth(1),
            Some('a' | 'e' | 'i' | 'o' | 'u')
        );

    if consonant_y {
        format!("{}ies", &kind[..kind.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        format!("{}es", kind)
    } else {
        format!("{}s", kind)
    }
}
