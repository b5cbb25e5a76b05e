use k8s_openapi::api::rbac::v1::PolicyRule;
use strum::Display;

use crate::kube::NamespaceSelection;

use super::rule::WILDCARD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RuleWarning {
    #[strum(to_string = "resourceNames cannot be combined with a wildcard resource")]
    ResourceNamesWithWildcard,

    #[strum(to_string = "resources require at least one apiGroup")]
    ResourcesWithoutApiGroups,

    #[strum(to_string = "nonResourceURLs cannot be combined with apiGroups or resources")]
    MixedNonResourceUrls,

    #[strum(to_string = "nonResourceURLs are only valid in a cluster-wide role")]
    NamespacedNonResourceUrls,

    #[strum(to_string = "at least one verb is required")]
    NoVerbs,

    #[strum(to_string = "a rule needs resources or nonResourceURLs")]
    Empty,
}

fn non_empty(values: &Option<Vec<String>>) -> bool {
    values.as_ref().is_some_and(|v| !v.is_empty())
}

/// ルールの組み合わせとして不正な点を列挙する
/// 警告として表示するだけでルール自体は書き換えない
pub fn validate(rule: &PolicyRule, scope: &NamespaceSelection) -> Vec<RuleWarning> {
    let has_api_groups = non_empty(&rule.api_groups);
    let has_resources = non_empty(&rule.resources);
    let has_resource_names = non_empty(&rule.resource_names);
    let has_non_resource_urls = non_empty(&rule.non_resource_urls);

    let wildcard_resource = rule
        .resources
        .iter()
        .flatten()
        .any(|r| r == WILDCARD);

    let mut warnings = Vec::new();

    if has_resource_names && wildcard_resource {
        warnings.push(RuleWarning::ResourceNamesWithWildcard);
    }

    if has_resources && !has_api_groups {
        warnings.push(RuleWarning::ResourcesWithoutApiGroups);
    }

    if has_non_resource_urls {
        if has_api_groups || has_resources {
            warnings.push(RuleWarning::MixedNonResourceUrls);
        }

        if scope.is_namespaced() {
            warnings.push(RuleWarning::NamespacedNonResourceUrls);
        }
    }

    if rule.verbs.is_empty() {
        warnings.push(RuleWarning::NoVerbs);
    }

    if !has_resources && !has_non_resource_urls {
        warnings.push(RuleWarning::Empty);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn strings(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(ToString::to_string).collect())
    }

    fn valid_rule() -> PolicyRule {
        PolicyRule {
            api_groups: strings(&[""]),
            resources: strings(&["configmaps"]),
            verbs: vec!["get".into()],
            ..Default::default()
        }
    }

    #[test]
    fn valid_rule_has_no_warnings() {
        assert_eq!(validate(&valid_rule(), &NamespaceSelection::All), vec![]);
    }

    #[test]
    fn resource_names_with_wildcard_resource() {
        let rule = PolicyRule {
            resources: strings(&["*"]),
            resource_names: strings(&["my-config"]),
            ..valid_rule()
        };

        assert_eq!(
            validate(&rule, &NamespaceSelection::All),
            vec![RuleWarning::ResourceNamesWithWildcard]
        );
    }

    #[test]
    fn non_resource_urls_in_namespaced_scope() {
        let rule = PolicyRule {
            non_resource_urls: strings(&["/healthz"]),
            verbs: vec!["get".into()],
            ..Default::default()
        };

        assert_eq!(validate(&rule, &NamespaceSelection::All), vec![]);
        assert_eq!(
            validate(&rule, &NamespaceSelection::Namespace("default".into())),
            vec![RuleWarning::NamespacedNonResourceUrls]
        );
    }

    #[test]
    fn empty_rule() {
        assert_eq!(
            validate(&PolicyRule::default(), &NamespaceSelection::All),
            vec![RuleWarning::NoVerbs, RuleWarning::Empty]
        );
    }

    #[test]
    fn warnings_render_as_messages() {
        assert_eq!(
            RuleWarning::ResourceNamesWithWildcard.to_string(),
            "resourceNames cannot be combined with a wildcard resource"
        );
    }
}
