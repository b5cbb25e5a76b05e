use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher as _};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KubeTableRow {
    pub namespace: Option<String>,
    pub name: String,
    pub row: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KubeTable {
    pub header: Vec<String>,
    pub rows: Vec<KubeTableRow>,
}

impl KubeTable {
    pub fn new(header: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> &Vec<String> {
        &self.header
    }

    pub fn rows(&self) -> &Vec<KubeTableRow> {
        &self.rows
    }

    pub fn push_row(&mut self, row: impl Into<KubeTableRow>) {
        let row = row.into();

        debug_assert!(
            self.header.len() == row.row.len(),
            "Mismatch header({}) != row({})",
            self.header.len(),
            row.row.len()
        );

        self.rows.push(row);
    }

    /// 名前と namespace に対するあいまい検索
    /// 空のクエリは全件を返す
    pub fn search(&self, query: &str) -> KubeTable {
        let query = query.trim();

        if query.is_empty() {
            return self.clone();
        }

        let matcher = SkimMatcherV2::default().ignore_case();

        let rows = self
            .rows
            .iter()
            .filter(|row| {
                matcher.fuzzy_match(&row.name, query).is_some()
                    || row
                        .namespace
                        .as_deref()
                        .is_some_and(|ns| matcher.fuzzy_match(ns, query).is_some())
            })
            .cloned()
            .collect();

        KubeTable {
            header: self.header.clone(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn table() -> KubeTable {
        let mut table = KubeTable::new(["Name", "Namespace"]);

        for (name, ns) in [("app-1", "default"), ("app-2", "kube-system"), ("db", "prod")] {
            table.push_row(KubeTableRow {
                namespace: Some(ns.to_string()),
                name: name.to_string(),
                row: vec![name.to_string(), ns.to_string()],
            });
        }

        table
    }

    #[test]
    fn search_matches_name() {
        let names: Vec<_> = table()
            .search("app")
            .rows
            .into_iter()
            .map(|r| r.name)
            .collect();

        assert_eq!(names, vec!["app-1", "app-2"]);
    }

    #[test]
    fn search_matches_namespace() {
        let names: Vec<_> = table()
            .search("prod")
            .rows
            .into_iter()
            .map(|r| r.name)
            .collect();

        assert_eq!(names, vec!["db"]);
    }

    #[test]
    fn empty_query_returns_all_rows() {
        assert_eq!(table().search("  "), table());
    }
}
