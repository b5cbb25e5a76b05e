use k8s_openapi::api::rbac::v1::PolicyRule;

use crate::{kube::NamespaceSelection, logger};

use super::{
    kube::{
        ApiGroupOption, ResourcesSnapshot, RoleRef, CORE_API_GROUP_TEXT, EMPTY_API_GROUP_KEY,
    },
    rule::{
        available_resources, normalize, selected_api_groups, values, visible_fields,
        with_all_api_groups, with_all_resources, with_all_verbs, with_toggled, RuleField,
        RuleFields, NON_RESOURCE_URLS, VERBS,
    },
    validation::{validate, RuleWarning},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcesIntent {
    /// 選択肢を読み込むだけ
    Load,
    /// 読み込んだリソースをすべてルールに追加する
    AddAll,
}

/// リソース一覧の非同期リクエスト
///
/// 発行時点の apiGroups を保持しておき、結果の適用時に照合する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcesRequest {
    pub role: RoleRef,
    pub rule_index: usize,
    pub api_groups: Vec<String>,
    pub intent: ResourcesIntent,
}

/// 選択リストの1項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOption {
    pub value: String,
    pub text: String,
}

impl RuleOption {
    fn plain(value: impl Into<String>) -> Self {
        let value = value.into();

        Self {
            text: value.clone(),
            value,
        }
    }
}

/// Editing state of the rules of one role.
#[derive(Debug, Clone)]
pub struct RuleEditor {
    role: RoleRef,
    rules: Vec<PolicyRule>,
    selected: usize,
    is_advanced: bool,
    api_group_options: Vec<ApiGroupOption>,
    resources: ResourcesSnapshot,
    pending: Option<ResourcesRequest>,
    last_error: Option<String>,
    focused_field: RuleField,
    cursor: usize,
}

impl RuleEditor {
    pub fn new(role: RoleRef, rules: Vec<PolicyRule>) -> Self {
        let mut rules: Vec<PolicyRule> = rules.into_iter().map(normalize).collect();

        if rules.is_empty() {
            rules.push(normalize(PolicyRule::default()));
        }

        Self {
            role,
            rules,
            selected: 0,
            is_advanced: false,
            api_group_options: Vec::new(),
            resources: ResourcesSnapshot::default(),
            pending: None,
            last_error: None,
            focused_field: RuleField::ApiGroups,
            cursor: 0,
        }
    }

    pub fn role(&self) -> &RoleRef {
        &self.role
    }

    pub fn scope(&self) -> NamespaceSelection {
        self.role.scope()
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_rule(&self) -> &PolicyRule {
        &self.rules[self.selected]
    }

    pub fn is_advanced(&self) -> bool {
        self.is_advanced
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn api_group_options(&self) -> &[ApiGroupOption] {
        &self.api_group_options
    }

    pub fn set_api_group_options(&mut self, options: Vec<ApiGroupOption>) {
        self.api_group_options = options;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rules.len() {
            self.selected += 1;
            self.cursor = 0;
        }
    }

    pub fn select_prev(&mut self) {
        if 0 < self.selected {
            self.selected -= 1;
            self.cursor = 0;
        }
    }

    pub fn toggle_advanced(&mut self) {
        self.is_advanced = !self.is_advanced;

        if !self.editable_fields().contains(&self.focused_field) {
            self.focused_field = RuleField::ApiGroups;
            self.cursor = 0;
        }
    }

    pub fn focused_field(&self) -> RuleField {
        self.focused_field
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Fields shown for the current mode and scope, in form order.
    pub fn editable_fields(&self) -> Vec<RuleField> {
        let visible = self.visible_fields();

        let mut fields = vec![RuleField::ApiGroups, RuleField::Resources, RuleField::Verbs];

        if visible.resource_names {
            fields.push(RuleField::ResourceNames);
        }

        if visible.non_resource_urls {
            fields.push(RuleField::NonResourceUrls);
        }

        fields
    }

    pub fn focus_next_field(&mut self) {
        let fields = self.editable_fields();

        let pos = fields
            .iter()
            .position(|f| *f == self.focused_field)
            .map(|i| (i + 1) % fields.len())
            .unwrap_or_default();

        self.focused_field = fields[pos];
        self.cursor = 0;
    }

    /// Selectable values of a field for the selected rule, followed by the
    /// selected values that are not among them.
    pub fn options(&self, field: RuleField) -> Vec<RuleOption> {
        let mut options = self.base_options(field);

        for value in values(self.selected_rule(), field) {
            if !options.iter().any(|option| option.value == *value) {
                let text = if field == RuleField::ApiGroups && value.is_empty() {
                    CORE_API_GROUP_TEXT.to_string()
                } else {
                    value.clone()
                };

                options.push(RuleOption {
                    value: value.clone(),
                    text,
                });
            }
        }

        options
    }

    fn base_options(&self, field: RuleField) -> Vec<RuleOption> {
        match field {
            RuleField::ApiGroups => self
                .api_group_options
                .iter()
                .map(|option| RuleOption {
                    value: if option.key == EMPTY_API_GROUP_KEY {
                        String::new()
                    } else {
                        option.key.clone()
                    },
                    text: option.text.clone(),
                })
                .collect(),
            RuleField::Resources => self
                .available_resources()
                .into_iter()
                .map(RuleOption::plain)
                .collect(),
            RuleField::Verbs => VERBS.iter().map(|v| RuleOption::plain(*v)).collect(),
            RuleField::ResourceNames => Vec::new(),
            RuleField::NonResourceUrls => NON_RESOURCE_URLS
                .iter()
                .map(|url| RuleOption::plain(*url))
                .collect(),
        }
    }

    pub fn cursor_next(&mut self) {
        let len = self.options(self.focused_field).len();

        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn cursor_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Adds or removes the option under the cursor.
    pub fn toggle_at_cursor(&mut self) {
        let field = self.focused_field;

        let Some(option) = self.options(field).into_iter().nth(self.cursor) else {
            return;
        };

        self.update_selected(|rule| with_toggled(rule, field, &option.value));

        let len = self.options(field).len();
        if len <= self.cursor {
            self.cursor = len.saturating_sub(1);
        }
    }

    pub fn add_rule(&mut self) {
        self.rules.push(normalize(PolicyRule::default()));
        self.selected = self.rules.len() - 1;
    }

    pub fn visible_fields(&self) -> RuleFields {
        visible_fields(self.is_advanced, &self.scope())
    }

    pub fn available_resources(&self) -> Vec<String> {
        available_resources(self.selected_rule(), &self.resources)
    }

    pub fn warnings(&self) -> Vec<RuleWarning> {
        validate(self.selected_rule(), &self.scope())
    }

    fn update_selected(&mut self, f: impl FnOnce(PolicyRule) -> PolicyRule) {
        let rule = self.rules[self.selected].clone();
        self.rules[self.selected] = f(rule);
    }

    pub fn add_all_api_groups(&mut self) {
        let options = self.api_group_options.clone();

        self.update_selected(|rule| with_all_api_groups(rule, &options));
    }

    pub fn add_all_verbs(&mut self) {
        self.update_selected(with_all_verbs);
    }

    /// Starts "add all resources" for the selected rule. Returns `None` when
    /// the rule has no api group or a request is already running.
    pub fn request_all_resources(&mut self) -> Option<ResourcesRequest> {
        self.request_resources(ResourcesIntent::AddAll)
    }

    /// Loads the resource options of the selected api groups without
    /// touching the rule. Returns `None` when every group is loaded.
    pub fn request_load_resources(&mut self) -> Option<ResourcesRequest> {
        if !self.is_resources_loadable() {
            return None;
        }

        self.request_resources(ResourcesIntent::Load)
    }

    /// Some selected api group has no loaded resources yet.
    pub fn is_resources_loadable(&self) -> bool {
        selected_api_groups(self.selected_rule())
            .iter()
            .any(|group| !self.resources.contains_key(group))
    }

    fn request_resources(&mut self, intent: ResourcesIntent) -> Option<ResourcesRequest> {
        if self.pending.is_some() {
            return None;
        }

        let api_groups = selected_api_groups(self.selected_rule());

        if api_groups.is_empty() {
            return None;
        }

        let request = ResourcesRequest {
            role: self.role.clone(),
            rule_index: self.selected,
            api_groups,
            intent,
        };

        self.pending = Some(request.clone());

        Some(request)
    }

    /// Adds a resource name to the selected rule unless it is already there.
    pub fn add_resource_name(&mut self, name: &str) {
        let name = name.trim();

        let exists = values(self.selected_rule(), RuleField::ResourceNames)
            .iter()
            .any(|n| n == name);

        if name.is_empty() || exists {
            return;
        }

        self.update_selected(|rule| with_toggled(rule, RuleField::ResourceNames, name));
    }

    /// Applies a finished resources request. The result is only written
    /// when it was requested by this role and the rule still selects the api
    /// groups it was requested for; any other result only refreshes the cache.
    pub fn apply_resources(
        &mut self,
        request: ResourcesRequest,
        result: anyhow::Result<ResourcesSnapshot>,
    ) {
        let is_own = request.role == self.role;

        if self.pending.as_ref() == Some(&request) {
            self.pending = None;
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                logger!(error, "failed to fetch resources: {}", err);
                if is_own {
                    self.last_error = Some(err.to_string());
                }
                return;
            }
        };

        self.resources.extend(snapshot);

        if !is_own {
            logger!(
                info,
                "discard resources requested by {}; editing {}",
                request.role.name(),
                self.role.name()
            );
            return;
        }

        self.last_error = None;

        if request.intent == ResourcesIntent::Load {
            return;
        }

        let Some(rule) = self.rules.get(request.rule_index) else {
            return;
        };

        if selected_api_groups(rule) != request.api_groups {
            logger!(
                info,
                "discard resources for {:?}; api groups changed to {:?}",
                request.api_groups,
                rule.api_groups
            );
            return;
        }

        let rule = with_all_resources(rule.clone(), &self.resources);
        self.rules[request.rule_index] = rule;
    }

    /// 編集中のルールを YAML で出力する
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(&self.rules)?)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn editor(api_groups: &[&str]) -> RuleEditor {
        RuleEditor::new(
            RoleRef::ClusterRole("edit".into()),
            vec![PolicyRule {
                api_groups: Some(strings(api_groups)),
                ..Default::default()
            }],
        )
    }

    fn snapshot() -> ResourcesSnapshot {
        ResourcesSnapshot::from([
            ("a".to_string(), strings(&["x"])),
            ("b".to_string(), strings(&["y"])),
        ])
    }

    #[test]
    fn new_editor_normalizes_rules() {
        let editor = RuleEditor::new(RoleRef::ClusterRole("edit".into()), vec![]);

        assert_eq!(editor.rules().len(), 1);
        assert_eq!(editor.selected_rule().api_groups, Some(vec![]));
    }

    #[test]
    fn add_all_resources_writes_unique_resources_without_wildcard() {
        let mut editor = editor(&["a", "a", "b"]);

        let request = editor.request_all_resources().unwrap();

        assert_eq!(request.api_groups, strings(&["a", "b"]));
        assert!(editor.is_loading());

        editor.apply_resources(request, Ok(snapshot()));

        assert!(!editor.is_loading());
        assert_eq!(editor.selected_rule().resources, Some(strings(&["x", "y"])));
        assert_eq!(editor.available_resources(), strings(&["x", "y", "*"]));
    }

    #[test]
    fn add_all_resources_needs_api_groups() {
        let mut editor = editor(&[]);

        assert_eq!(editor.request_all_resources(), None);
    }

    #[test]
    fn second_request_while_loading_is_ignored() {
        let mut editor = editor(&["a"]);

        assert!(editor.request_all_resources().is_some());
        assert_eq!(editor.request_all_resources(), None);
    }

    #[test]
    fn stale_result_does_not_overwrite_rule() {
        let mut editor = editor(&["a"]);

        let request = editor.request_all_resources().unwrap();

        // 結果が届く前に apiGroups を変更する
        editor.rules[0].api_groups = Some(strings(&["b"]));

        editor.apply_resources(request, Ok(snapshot()));

        assert_eq!(editor.selected_rule().resources, None);
        assert_eq!(editor.available_resources(), strings(&["y", "*"]));
    }

    #[test]
    fn result_of_another_role_only_fills_cache() {
        let mut other = editor(&["a"]);
        let request = other.request_all_resources().unwrap();

        let mut editor = RuleEditor::new(
            RoleRef::ClusterRole("view".into()),
            vec![PolicyRule {
                api_groups: Some(strings(&["a"])),
                ..Default::default()
            }],
        );

        editor.apply_resources(request.clone(), Ok(snapshot()));

        assert_eq!(editor.selected_rule().resources, None);
        assert_eq!(editor.available_resources(), strings(&["x", "*"]));

        editor.apply_resources(request, Err(anyhow!("forbidden")));

        assert_eq!(editor.last_error(), None);
    }

    #[test]
    fn failed_request_keeps_rule_and_reports_error() {
        let mut editor = editor(&["a"]);

        let request = editor.request_all_resources().unwrap();

        editor.apply_resources(request, Err(anyhow!("forbidden")));

        assert!(!editor.is_loading());
        assert_eq!(editor.selected_rule().resources, None);
        assert_eq!(editor.last_error(), Some("forbidden"));
    }

    #[test]
    fn load_resources_fills_options_only() {
        let mut editor = editor(&["a", "b"]);

        assert!(editor.is_resources_loadable());

        let request = editor.request_load_resources().unwrap();

        assert_eq!(request.intent, ResourcesIntent::Load);

        editor.apply_resources(request, Ok(snapshot()));

        assert_eq!(editor.selected_rule().resources, None);
        assert_eq!(editor.available_resources(), strings(&["x", "y", "*"]));
        assert!(!editor.is_resources_loadable());
        assert_eq!(editor.request_load_resources(), None);
    }

    #[test]
    fn add_resource_name_skips_duplicates_and_blanks() {
        let mut editor = editor(&["a"]);

        editor.add_resource_name("my-config");
        editor.add_resource_name(" my-config ");
        editor.add_resource_name("  ");

        assert_eq!(
            editor.selected_rule().resource_names,
            Some(strings(&["my-config"]))
        );
    }

    #[test]
    fn add_all_verbs_updates_selected_rule_only() {
        let mut editor = editor(&["a"]);
        editor.add_rule();

        editor.add_all_verbs();

        assert_eq!(editor.rules()[0].verbs, Vec::<String>::new());
        assert_eq!(editor.rules()[1].verbs.len(), 8);
    }

    #[test]
    fn toggle_at_cursor_maps_core_option_to_empty_group() {
        let mut editor = editor(&[]);

        editor.set_api_group_options(vec![
            ApiGroupOption {
                key: EMPTY_API_GROUP_KEY.into(),
                text: "(core)".into(),
            },
            ApiGroupOption {
                key: "apps".into(),
                text: "apps".into(),
            },
        ]);

        editor.toggle_at_cursor();
        editor.cursor_next();
        editor.toggle_at_cursor();

        assert_eq!(editor.selected_rule().api_groups, Some(strings(&["", "apps"])));
    }

    #[test]
    fn selected_values_outside_options_are_listed() {
        let editor = RuleEditor::new(
            RoleRef::ClusterRole("edit".into()),
            vec![PolicyRule {
                api_groups: Some(strings(&[""])),
                resources: Some(strings(&["pods"])),
                ..Default::default()
            }],
        );

        let resources: Vec<_> = editor
            .options(RuleField::Resources)
            .into_iter()
            .map(|o| o.value)
            .collect();

        assert_eq!(resources, strings(&["*", "pods"]));
        assert_eq!(
            editor.options(RuleField::ApiGroups),
            vec![RuleOption {
                value: String::new(),
                text: "(core)".into()
            }]
        );
    }

    #[test]
    fn focus_cycles_through_visible_fields() {
        let mut editor = editor(&[]);

        let mut seen = vec![editor.focused_field()];
        for _ in 0..3 {
            editor.focus_next_field();
            seen.push(editor.focused_field());
        }

        assert_eq!(
            seen,
            vec![
                RuleField::ApiGroups,
                RuleField::Resources,
                RuleField::Verbs,
                RuleField::ApiGroups
            ]
        );

        editor.toggle_advanced();

        assert_eq!(
            editor.editable_fields(),
            vec![
                RuleField::ApiGroups,
                RuleField::Resources,
                RuleField::Verbs,
                RuleField::ResourceNames,
                RuleField::NonResourceUrls
            ]
        );
    }

    #[test]
    fn removing_last_resource_name_moves_cursor_back() {
        let mut editor = RuleEditor::new(
            RoleRef::ClusterRole("edit".into()),
            vec![PolicyRule {
                resource_names: Some(strings(&["a", "b"])),
                ..Default::default()
            }],
        );

        editor.toggle_advanced();
        for _ in 0..3 {
            editor.focus_next_field();
        }
        assert_eq!(editor.focused_field(), RuleField::ResourceNames);

        editor.cursor_next();
        editor.toggle_at_cursor();

        assert_eq!(editor.selected_rule().resource_names, Some(strings(&["a"])));
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn namespaced_role_hides_non_resource_urls() {
        let mut editor = RuleEditor::new(
            RoleRef::Role {
                namespace: "dev".into(),
                name: "edit".into(),
            },
            vec![],
        );

        editor.toggle_advanced();

        let fields = editor.visible_fields();

        assert!(fields.resource_names);
        assert!(!fields.non_resource_urls);
    }
}
