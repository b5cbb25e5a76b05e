//! Pure operations over a single [`PolicyRule`].
//!
//! Every operation takes the current rule and returns the next one; the
//! caller decides when to store it and when to redraw.

use k8s_openapi::api::rbac::v1::PolicyRule;

use crate::kube::NamespaceSelection;

use super::kube::{unique, ApiGroupOption, ResourcesSnapshot, EMPTY_API_GROUP_KEY};

pub const WILDCARD: &str = "*";

pub const VERBS: [&str; 9] = [
    "get",
    "list",
    "watch",
    "create",
    "update",
    "patch",
    "delete",
    "deletecollection",
    WILDCARD,
];

pub const NON_RESOURCE_URLS: [&str; 12] = [
    "/healthz/ready",
    "/api",
    "/api/*",
    "/apis",
    "/apis/*",
    "/healthz",
    "/livez",
    "/openapi",
    "/openapi/*",
    "/readyz",
    "/version",
    "/version/",
];

/// `apiGroups` が無いルールは空のリストとして扱う
pub fn normalize(mut rule: PolicyRule) -> PolicyRule {
    if rule.api_groups.is_none() {
        rule.api_groups = Some(Vec::new());
    }

    rule
}

pub fn api_groups(rule: &PolicyRule) -> &[String] {
    rule.api_groups.as_deref().unwrap_or_default()
}

/// Selected api groups without duplicates, as used for fetching.
pub fn selected_api_groups(rule: &PolicyRule) -> Vec<String> {
    unique(api_groups(rule).iter().map(String::as_str))
}

/// Resources known for the selected api groups, de-duplicated, followed by
/// the wildcard.
pub fn available_resources(rule: &PolicyRule, resources: &ResourcesSnapshot) -> Vec<String> {
    let known = api_groups(rule)
        .iter()
        .flat_map(|group| resources.get(group).into_iter().flatten())
        .map(String::as_str);

    unique(known.chain(std::iter::once(WILDCARD)))
}

pub fn with_all_api_groups(rule: PolicyRule, options: &[ApiGroupOption]) -> PolicyRule {
    let groups = std::iter::once(String::new()).chain(
        options
            .iter()
            .filter(|option| option.key != EMPTY_API_GROUP_KEY)
            .map(|option| option.key.clone()),
    );

    PolicyRule {
        api_groups: Some(groups.collect()),
        ..rule
    }
}

pub fn with_all_resources(rule: PolicyRule, resources: &ResourcesSnapshot) -> PolicyRule {
    let resources = available_resources(&rule, resources)
        .into_iter()
        .filter(|r| r != WILDCARD)
        .collect();

    PolicyRule {
        resources: Some(resources),
        ..rule
    }
}

pub fn with_all_verbs(rule: PolicyRule) -> PolicyRule {
    PolicyRule {
        verbs: VERBS
            .iter()
            .filter(|verb| **verb != WILDCARD)
            .map(ToString::to_string)
            .collect(),
        ..rule
    }
}

/// 編集できるルールのフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RuleField {
    #[strum(to_string = "API Groups")]
    ApiGroups,
    #[strum(to_string = "Resources")]
    Resources,
    #[strum(to_string = "Verbs")]
    Verbs,
    #[strum(to_string = "Resource Names")]
    ResourceNames,
    #[strum(to_string = "Non-Resource URLs")]
    NonResourceUrls,
}

pub fn values(rule: &PolicyRule, field: RuleField) -> &[String] {
    match field {
        RuleField::ApiGroups => api_groups(rule),
        RuleField::Resources => rule.resources.as_deref().unwrap_or_default(),
        RuleField::Verbs => &rule.verbs,
        RuleField::ResourceNames => rule.resource_names.as_deref().unwrap_or_default(),
        RuleField::NonResourceUrls => rule.non_resource_urls.as_deref().unwrap_or_default(),
    }
}

/// Adds `value` to the field, or removes it when already present.
pub fn with_toggled(mut rule: PolicyRule, field: RuleField, value: &str) -> PolicyRule {
    let toggle = |values: &mut Vec<String>| {
        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }
    };

    match field {
        RuleField::ApiGroups => toggle(rule.api_groups.get_or_insert_with(Vec::new)),
        RuleField::Resources => toggle(rule.resources.get_or_insert_with(Vec::new)),
        RuleField::Verbs => toggle(&mut rule.verbs),
        RuleField::ResourceNames => toggle(rule.resource_names.get_or_insert_with(Vec::new)),
        RuleField::NonResourceUrls => toggle(rule.non_resource_urls.get_or_insert_with(Vec::new)),
    }

    rule
}

/// ルールのフォームで表示するフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleFields {
    pub resource_names: bool,
    pub non_resource_urls: bool,
}

/// Non-resource URLs only exist cluster-wide, so a namespaced scope hides
/// them even in advanced mode.
pub fn visible_fields(is_advanced: bool, scope: &NamespaceSelection) -> RuleFields {
    RuleFields {
        resource_names: is_advanced,
        non_resource_urls: is_advanced && !scope.is_namespaced(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn rule(api_groups: &[&str]) -> PolicyRule {
        PolicyRule {
            api_groups: Some(strings(api_groups)),
            ..Default::default()
        }
    }

    fn snapshot() -> ResourcesSnapshot {
        ResourcesSnapshot::from([
            ("a".to_string(), strings(&["x"])),
            ("b".to_string(), strings(&["y", "x"])),
        ])
    }

    #[test]
    fn normalize_initializes_missing_api_groups() {
        let actual = normalize(PolicyRule::default());

        assert_eq!(actual.api_groups, Some(vec![]));
    }

    #[test]
    fn normalize_keeps_existing_api_groups() {
        let actual = normalize(rule(&["apps"]));

        assert_eq!(actual.api_groups, Some(strings(&["apps"])));
    }

    #[test]
    fn available_resources_are_unique_and_end_with_wildcard() {
        let actual = available_resources(&rule(&["a", "a", "b"]), &snapshot());

        assert_eq!(actual, strings(&["x", "y", "*"]));
    }

    #[test]
    fn available_resources_without_cache_is_wildcard_only() {
        let actual = available_resources(&rule(&["c"]), &snapshot());

        assert_eq!(actual, strings(&["*"]));
    }

    #[test]
    fn all_resources_exclude_wildcard() {
        let resources = ResourcesSnapshot::from([
            ("a".to_string(), strings(&["x"])),
            ("b".to_string(), strings(&["y"])),
        ]);

        let actual = with_all_resources(rule(&["a", "a", "b"]), &resources);

        assert_eq!(actual.resources, Some(strings(&["x", "y"])));
    }

    #[test]
    fn all_verbs_exclude_wildcard_in_declared_order() {
        let actual = with_all_verbs(PolicyRule {
            verbs: strings(&["*"]),
            ..Default::default()
        });

        assert_eq!(
            actual.verbs,
            strings(&[
                "get",
                "list",
                "watch",
                "create",
                "update",
                "patch",
                "delete",
                "deletecollection"
            ])
        );
    }

    #[test]
    fn all_api_groups_start_with_core_and_skip_placeholder_key() {
        let options = vec![
            ApiGroupOption {
                key: EMPTY_API_GROUP_KEY.to_string(),
                text: "(core)".to_string(),
            },
            ApiGroupOption {
                key: "apps".to_string(),
                text: "apps".to_string(),
            },
            ApiGroupOption {
                key: "batch".to_string(),
                text: "batch".to_string(),
            },
        ];

        let actual = with_all_api_groups(rule(&["apps"]), &options);

        assert_eq!(actual.api_groups, Some(strings(&["", "apps", "batch"])));
    }

    #[test]
    fn other_fields_are_kept() {
        let before = PolicyRule {
            resource_names: Some(strings(&["my-config"])),
            ..rule(&["a"])
        };

        let actual = with_all_verbs(before.clone());

        assert_eq!(actual.resource_names, before.resource_names);
        assert_eq!(actual.api_groups, before.api_groups);
    }

    #[test]
    fn toggle_adds_then_removes_value() {
        let added = with_toggled(rule(&[]), RuleField::Verbs, "get");

        assert_eq!(values(&added, RuleField::Verbs), strings(&["get"]).as_slice());

        let removed = with_toggled(added, RuleField::Verbs, "get");

        assert!(values(&removed, RuleField::Verbs).is_empty());
    }

    #[test]
    fn toggle_core_api_group_uses_empty_string() {
        let actual = with_toggled(rule(&["apps"]), RuleField::ApiGroups, "");

        assert_eq!(actual.api_groups, Some(strings(&["apps", ""])));
    }

    #[rstest]
    #[case::basic_cluster(false, NamespaceSelection::All, false, false)]
    #[case::advanced_cluster(true, NamespaceSelection::All, true, true)]
    #[case::advanced_namespaced(true, NamespaceSelection::Namespace("default".into()), true, false)]
    #[case::basic_namespaced(false, NamespaceSelection::Namespace("default".into()), false, false)]
    fn fields_depend_on_mode_and_scope(
        #[case] advanced: bool,
        #[case] scope: NamespaceSelection,
        #[case] resource_names: bool,
        #[case] non_resource_urls: bool,
    ) {
        assert_eq!(
            visible_fields(advanced, &scope),
            RuleFields {
                resource_names,
                non_resource_urls
            }
        );
    }
}
