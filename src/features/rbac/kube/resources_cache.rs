use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use futures::future::try_join_all;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use tokio::sync::OnceCell;

use crate::{kube::KubeClientRequest, logger};

use super::api_groups::{unique, GroupVersions};

/// apiGroup ごとのリソース名
pub type ResourcesSnapshot = BTreeMap<String, Vec<String>>;

type Cell = Arc<OnceCell<Vec<String>>>;

/// Lazily populated `apiGroup -> resource names` cache.
///
/// Each group is loaded at most once: concurrent fetches of the same group
/// wait on the same in-flight request. A failed load leaves the group
/// unloaded so the next fetch retries it.
#[derive(Debug, Default, Clone)]
pub struct ResourcesCache {
    cells: Arc<Mutex<BTreeMap<String, Cell>>>,
}

impl ResourcesCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, group: &str) -> Result<Cell> {
        let mut cells = self
            .cells
            .lock()
            .map_err(|_| anyhow!("resources cache lock poisoned"))?;

        Ok(cells.entry(group.to_string()).or_default().clone())
    }

    /// Loaded groups only.
    pub fn snapshot(&self) -> ResourcesSnapshot {
        let Ok(cells) = self.cells.lock() else {
            return ResourcesSnapshot::default();
        };

        cells
            .iter()
            .filter_map(|(group, cell)| cell.get().map(|r| (group.clone(), r.clone())))
            .collect()
    }

    /// Some selected group has not been loaded yet.
    pub fn is_loadable(&self, groups: &[String]) -> bool {
        let snapshot = self.snapshot();

        groups.iter().any(|group| !snapshot.contains_key(group))
    }

    /// Loads the missing groups and returns the cache content afterwards.
    /// When every group is already cached no request is made.
    pub async fn fetch<C: KubeClientRequest>(
        &self,
        client: &C,
        group_versions: &GroupVersions,
        groups: &[String],
    ) -> Result<ResourcesSnapshot> {
        let groups = unique(groups.iter().map(String::as_str));

        let cells = groups
            .iter()
            .map(|group| Ok((group.as_str(), self.cell(group)?)))
            .collect::<Result<Vec<_>>>()?;

        try_join_all(cells.iter().map(|(group, cell)| {
            cell.get_or_try_init(|| fetch_resources(client, group_versions, group))
        }))
        .await?;

        Ok(self.snapshot())
    }
}

async fn fetch_resources<C: KubeClientRequest>(
    client: &C,
    group_versions: &GroupVersions,
    group: &str,
) -> Result<Vec<String>> {
    let Some(path) = group_versions.discovery_path(group) else {
        logger!(warn, "no served version for api group {:?}", group);
        return Ok(Vec::new());
    };

    logger!(debug, "fetch resources of api group {:?} from {}", group, path);

    let list: APIResourceList = client.request(&path).await?;

    Ok(unique(
        list.resources
            .into_iter()
            .map(|r| r.name)
            .filter(|name| !name.contains('/')),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use crate::kube::mock::MockTestKubeClient;

    use super::*;

    fn apps_resources() -> APIResourceList {
        serde_yaml::from_str(indoc! {
            "
            apiVersion: v1
            kind: APIResourceList
            groupVersion: apps/v1
            resources:
              - name: deployments
                singularName: deployment
                namespaced: true
                kind: Deployment
                verbs: [get, list]
              - name: deployments/scale
                singularName: ''
                namespaced: true
                kind: Scale
                verbs: [get]
              - name: statefulsets
                singularName: statefulset
                namespaced: true
                kind: StatefulSet
                verbs: [get, list]
            "
        })
        .unwrap()
    }

    fn group_versions() -> GroupVersions {
        GroupVersions::new(["v1", "apps/v1"])
    }

    #[tokio::test]
    async fn fetch_drops_subresources() {
        let mut client = MockTestKubeClient::new();

        client
            .expect_request::<APIResourceList>()
            .with(mockall::predicate::eq("/apis/apps/v1"))
            .times(1)
            .returning(|_| Ok(apps_resources()));

        let cache = ResourcesCache::new();

        let snapshot = cache
            .fetch(&client, &group_versions(), &["apps".into()])
            .await
            .unwrap();

        assert_eq!(
            snapshot,
            ResourcesSnapshot::from([(
                "apps".to_string(),
                vec!["deployments".to_string(), "statefulsets".to_string()]
            )])
        );
    }

    #[tokio::test]
    async fn cached_groups_are_not_requested_again() {
        let mut client = MockTestKubeClient::new();

        client
            .expect_request::<APIResourceList>()
            .times(1)
            .returning(|_| Ok(apps_resources()));

        let cache = ResourcesCache::new();
        let groups = vec!["apps".to_string()];

        assert!(cache.is_loadable(&groups));

        cache.fetch(&client, &group_versions(), &groups).await.unwrap();

        assert!(!cache.is_loadable(&groups));

        let snapshot = cache.fetch(&client, &group_versions(), &groups).await.unwrap();

        assert_eq!(snapshot["apps"].len(), 2);
    }

    #[tokio::test]
    async fn concurrent_fetches_of_the_same_group_share_one_request() {
        let calls = Arc::new(AtomicUsize::new(0));

        let mut client = MockTestKubeClient::new();

        let counter = calls.clone();
        client
            .expect_request::<APIResourceList>()
            .returning(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(apps_resources())
            });

        let cache = ResourcesCache::new();
        let groups = vec!["apps".to_string(), "apps".to_string()];
        let gv = group_versions();

        let (a, b) = tokio::join!(
            cache.fetch(&client, &gv, &groups),
            cache.fetch(&client, &gv, &groups)
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_group_stays_loadable() {
        let mut client = MockTestKubeClient::new();

        client
            .expect_request::<APIResourceList>()
            .returning(|_| Err(anyhow!("connection refused")));

        let cache = ResourcesCache::new();
        let groups = vec!["apps".to_string()];

        let result = cache.fetch(&client, &group_versions(), &groups).await;

        assert!(result.is_err());
        assert!(cache.is_loadable(&groups));
    }

    #[tokio::test]
    async fn unknown_group_resolves_to_empty_list() {
        let client = MockTestKubeClient::new();

        let snapshot = ResourcesCache::new()
            .fetch(&client, &group_versions(), &["*".into()])
            .await
            .unwrap();

        assert_eq!(snapshot["*"], Vec::<String>::new());
    }
}
