use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, CustomResourceDefinitionVersion,
};

use crate::kube::NamespaceSelection;

pub fn resource_url_prefix(
    crd: &CustomResourceDefinition,
    version: &CustomResourceDefinitionVersion,
) -> String {
    format!("/apis/{}/{}", crd.spec.group, version.name)
}

/// Collection URL of the custom resources, namespaced when a concrete
/// namespace is selected and cluster-wide otherwise.
pub fn resource_url(
    crd: &CustomResourceDefinition,
    version: &CustomResourceDefinitionVersion,
    namespace: &NamespaceSelection,
) -> String {
    let prefix = resource_url_prefix(crd, version);
    let plural = &crd.spec.names.plural;

    match namespace.namespace() {
        Some(ns) => format!("{}/namespaces/{}/{}", prefix, ns, plural),
        None => format!("{}/{}", prefix, plural),
    }
}

/// served なバージョンのうち storage のものを優先し、なければ先頭を返す
pub fn default_version(
    crd: &CustomResourceDefinition,
) -> Option<&CustomResourceDefinitionVersion> {
    let served = || crd.spec.versions.iter().filter(|v| v.served);

    served()
        .find(|v| v.storage)
        .or_else(|| served().next())
        .or_else(|| crd.spec.versions.first())
}

#[cfg(test)]
pub(crate) mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    pub fn crd() -> CustomResourceDefinition {
        serde_yaml::from_str(indoc! {
            "
            apiVersion: apiextensions.k8s.io/v1
            kind: CustomResourceDefinition
            metadata:
              name: functions.serverless.example.io
            spec:
              group: serverless.example.io
              scope: Namespaced
              names:
                kind: Function
                plural: functions
                singular: function
                listKind: FunctionList
              versions:
                - name: v1alpha1
                  served: true
                  storage: false
                - name: v1alpha2
                  served: true
                  storage: true
                  additionalPrinterColumns:
                    - name: Runtime
                      type: string
                      jsonPath: .spec.runtime
                    - name: Ready
                      type: boolean
                      jsonPath: .status.ready
            "
        })
        .unwrap()
    }

    #[rstest]
    #[case::namespaced(
        NamespaceSelection::Namespace("default".into()),
        "/apis/serverless.example.io/v1alpha2/namespaces/default/functions"
    )]
    #[case::all_namespaces(
        NamespaceSelection::All,
        "/apis/serverless.example.io/v1alpha2/functions"
    )]
    fn resource_url_depends_on_namespace(
        #[case] namespace: NamespaceSelection,
        #[case] expected: &str,
    ) {
        let crd = crd();
        let version = &crd.spec.versions[1];

        assert_eq!(resource_url(&crd, version, &namespace), expected);
    }

    #[test]
    fn all_sentinel_is_cluster_wide() {
        let crd = crd();
        let version = &crd.spec.versions[0];

        assert_eq!(
            resource_url(&crd, version, &"-all-".into()),
            "/apis/serverless.example.io/v1alpha1/functions"
        );
    }

    #[test]
    fn default_version_prefers_storage_version() {
        let crd = crd();

        assert_eq!(default_version(&crd).unwrap().name, "v1alpha2");
    }
}
