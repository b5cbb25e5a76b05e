use anyhow::Result;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIGroupList;

use crate::kube::KubeClientRequest;

/// 選択リストは空文字のキーを扱えないため core グループ用に使うキー
pub const EMPTY_API_GROUP_KEY: &str = "__core__";

pub const CORE_API_GROUP_TEXT: &str = "(core)";

const CORE_GROUP_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiGroupOption {
    pub key: String,
    pub text: String,
}

impl ApiGroupOption {
    fn from_group(group: &str) -> Self {
        if group.is_empty() {
            Self {
                key: EMPTY_API_GROUP_KEY.to_string(),
                text: CORE_API_GROUP_TEXT.to_string(),
            }
        } else {
            Self {
                key: group.to_string(),
                text: group.to_string(),
            }
        }
    }
}

/// Preferred `group/version` of every served api group; the core group is `v1`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GroupVersions(Vec<String>);

impl GroupVersions {
    pub fn new(group_versions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(group_versions.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn group_version(&self, group: &str) -> Option<&str> {
        if group.is_empty() {
            return self.iter().find(|gv| !gv.contains('/'));
        }

        self.iter().find(|gv| group_of(gv) == group)
    }

    /// API resource list の URL。未知のグループは None
    pub fn discovery_path(&self, group: &str) -> Option<String> {
        let group_version = self.group_version(group)?;

        if group.is_empty() {
            Some(format!("/api/{}", group_version))
        } else {
            Some(format!("/apis/{}", group_version))
        }
    }
}

fn group_of(group_version: &str) -> &str {
    group_version
        .split_once('/')
        .map(|(group, _)| group)
        .unwrap_or_default()
}

pub async fn fetch_group_versions<C: KubeClientRequest>(client: &C) -> Result<GroupVersions> {
    let list: APIGroupList = client.request("/apis").await?;

    let group_versions = std::iter::once(CORE_GROUP_VERSION.to_string()).chain(
        list.groups.into_iter().filter_map(|group| {
            group
                .preferred_version
                .or_else(|| group.versions.into_iter().next())
                .map(|gv| gv.group_version)
        }),
    );

    Ok(GroupVersions::new(group_versions))
}

/// 順序を保ったまま重複を取り除く
pub fn unique<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut ret: Vec<String> = Vec::new();

    for value in values {
        let value = value.into();

        if !ret.contains(&value) {
            ret.push(value);
        }
    }

    ret
}

pub fn api_group_options(group_versions: &GroupVersions) -> Vec<ApiGroupOption> {
    unique(group_versions.iter().map(group_of))
        .iter()
        .map(|group| ApiGroupOption::from_group(group))
        .collect()
}
