use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use ratatui::{
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::{
    features::{
        cluster_config::kube::ClusterConfig,
        custom_resources::kube::crd_table,
        navigation::{NavTarget, Navigation, ViewId},
        preferences::PageSize,
        rbac::{
            kube::{role_table, ApiGroupOption, RoleSummary},
            rule::RuleField,
            RuleEditor,
        },
    },
    kube::{KubeTableRow, NamespaceSelection},
    logger,
    message::UserEvent,
    workers::kube::message::{KubeRequest, KubeResponse},
};

use super::widget::{NavigationWidget, PaginatedTable, RuleForm};

const NAVIGATION_WIDTH: u16 = 36;

/// 表示中の画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    ClusterRoles,
    Roles,
    Crds,
    CustomResources,
    RuleEditor,
}

impl View {
    fn title(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::ClusterRoles => "Cluster Roles",
            Self::Roles => "Roles",
            Self::Crds => "Custom Resource Definitions",
            Self::CustomResources => "Custom Resources",
            Self::RuleEditor => "Rule Editor",
        }
    }

    fn nav_id(self) -> Option<ViewId> {
        match self {
            Self::ClusterRoles => Some(ViewId::ClusterRoles),
            Self::Roles => Some(ViewId::Roles),
            Self::Crds => Some(ViewId::CustomResourceDefinitions),
            _ => None,
        }
    }
}

impl From<ViewId> for View {
    fn from(id: ViewId) -> Self {
        match id {
            ViewId::ClusterOverview | ViewId::ClusterDetails => Self::Overview,
            ViewId::ClusterRoles => Self::ClusterRoles,
            ViewId::Roles => Self::Roles,
            ViewId::CustomResourceDefinitions => Self::Crds,
        }
    }
}

const MAIN_VIEWS: [View; 4] = [View::Overview, View::ClusterRoles, View::Roles, View::Crds];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Filter(String),
    ResourceName(String),
}

/// [`Console::on_user_event`] の結果
#[derive(Debug)]
pub enum ConsoleAction {
    Continue,
    Quit,
    Requests(Vec<KubeRequest>),
}

impl From<Option<KubeRequest>> for ConsoleAction {
    fn from(req: Option<KubeRequest>) -> Self {
        match req {
            Some(req) => Self::Requests(vec![req]),
            None => Self::Continue,
        }
    }
}

/// State of the whole console.
///
/// Key events and kube responses go in, kube requests come out. Drawing is
/// done from the current state only.
pub struct Console {
    view: View,
    history: Vec<View>,
    context: Option<String>,
    scope: Option<NamespaceSelection>,
    cluster_config: ClusterConfig,
    navigation: NavigationWidget,
    page_size: PageSize,
    cluster_roles: PaginatedTable,
    cluster_role_items: Vec<RoleSummary>,
    roles: PaginatedTable,
    role_items: Vec<RoleSummary>,
    crds: PaginatedTable,
    crd_items: Vec<CustomResourceDefinition>,
    custom_resources: PaginatedTable,
    custom_resource_crd: Option<String>,
    editor: Option<RuleEditor>,
    api_group_options: Option<Vec<ApiGroupOption>>,
    show_yaml: bool,
    input: Option<Input>,
    status: Option<String>,
}

impl Console {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            view: View::Overview,
            history: Vec::new(),
            context: None,
            scope: None,
            cluster_config: ClusterConfig::default(),
            navigation: NavigationWidget::new(Navigation::default()),
            page_size,
            cluster_roles: PaginatedTable::new(View::ClusterRoles.title(), page_size),
            cluster_role_items: Vec::new(),
            roles: PaginatedTable::new(View::Roles.title(), page_size),
            role_items: Vec::new(),
            crds: PaginatedTable::new(View::Crds.title(), page_size),
            crd_items: Vec::new(),
            custom_resources: PaginatedTable::new(View::CustomResources.title(), page_size),
            custom_resource_crd: None,
            editor: None,
            api_group_options: None,
            show_yaml: true,
            input: None,
            status: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// すべての一覧に同じページサイズを適用する
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;

        for table in [
            &mut self.cluster_roles,
            &mut self.roles,
            &mut self.crds,
            &mut self.custom_resources,
        ] {
            table.set_page_size(page_size);
        }
    }

    pub fn editor(&self) -> Option<&RuleEditor> {
        self.editor.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn main_views(&self) -> Vec<View> {
        MAIN_VIEWS
            .into_iter()
            .filter(|view| {
                view.nav_id()
                    .map_or(true, |id| self.navigation.navigation().contains_view(id))
            })
            .collect()
    }

    /// 詳細画面は開いた元の一覧のタブに属する
    fn main_view(&self) -> View {
        match self.view {
            View::CustomResources => View::Crds,
            View::RuleEditor => self.history.last().copied().unwrap_or(View::ClusterRoles),
            view => view,
        }
    }

    fn table(&self, view: View) -> Option<&PaginatedTable> {
        match view {
            View::ClusterRoles => Some(&self.cluster_roles),
            View::Roles => Some(&self.roles),
            View::Crds => Some(&self.crds),
            View::CustomResources => Some(&self.custom_resources),
            View::Overview | View::RuleEditor => None,
        }
    }

    fn table_mut(&mut self, view: View) -> Option<&mut PaginatedTable> {
        match view {
            View::ClusterRoles => Some(&mut self.cluster_roles),
            View::Roles => Some(&mut self.roles),
            View::Crds => Some(&mut self.crds),
            View::CustomResources => Some(&mut self.custom_resources),
            View::Overview | View::RuleEditor => None,
        }
    }

    /// Switches to a main view. A list that was never loaded, or whose last
    /// request failed, is requested.
    fn switch_to(&mut self, view: View) -> ConsoleAction {
        self.view = view;
        self.history.clear();
        self.status = None;

        let request = match view {
            View::ClusterRoles => KubeRequest::ClusterRoles,
            View::Roles => KubeRequest::Roles,
            View::Crds => KubeRequest::Crds,
            _ => return ConsoleAction::Continue,
        };

        match self.table_mut(view) {
            Some(table) if table.is_not_loaded() || table.is_error() => {
                table.set_loading();
                ConsoleAction::Requests(vec![request])
            }
            _ => ConsoleAction::Continue,
        }
    }

    fn push_view(&mut self, view: View) {
        self.history.push(self.view);
        self.view = view;
    }

    fn back(&mut self) {
        if let Some(view) = self.history.pop() {
            if self.view == View::RuleEditor {
                self.editor = None;
            }

            self.view = view;
        }
    }

    fn next_main_view(&mut self) -> ConsoleAction {
        let views = self.main_views();
        let current = self.main_view();

        let next = views
            .iter()
            .position(|v| *v == current)
            .map(|i| views[(i + 1) % views.len()])
            .unwrap_or(View::Overview);

        self.switch_to(next)
    }
}

// Event
impl Console {
    pub fn on_user_event(&mut self, ev: UserEvent) -> ConsoleAction {
        match ev {
            UserEvent::Key(key) => self.on_key_event(key),
            UserEvent::Resize => ConsoleAction::Continue,
        }
    }

    fn on_key_event(&mut self, key: KeyEvent) -> ConsoleAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ConsoleAction::Quit;
        }

        if self.input.is_some() {
            self.on_input_key(key);
            return ConsoleAction::Continue;
        }

        match key.code {
            KeyCode::Char('q') => return ConsoleAction::Quit,
            KeyCode::Tab if self.view != View::RuleEditor => return self.next_main_view(),
            KeyCode::Char('p') => {
                self.set_page_size(self.page_size.cycle());
                return ConsoleAction::Continue;
            }
            _ => {}
        }

        match self.view {
            View::Overview => self.on_overview_key(key),
            View::RuleEditor => self.on_editor_key(key),
            view => self.on_table_key(view, key),
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) {
        let Some(input) = self.input.as_mut() else {
            return;
        };

        let buffer = match input {
            Input::Filter(buf) | Input::ResourceName(buf) => buf,
        };

        match key.code {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => {
                if let Some(Input::ResourceName(name)) = self.input.take() {
                    if let Some(editor) = self.editor.as_mut() {
                        editor.add_resource_name(&name);
                    }
                }
                return;
            }
            KeyCode::Esc => {
                if let Some(Input::Filter(_)) = self.input.take() {
                    if let Some(table) = self.table_mut(self.view) {
                        table.set_query("");
                    }
                }
                return;
            }
            _ => return,
        }

        if let Some(Input::Filter(query)) = &self.input {
            let query = query.clone();

            if let Some(table) = self.table_mut(self.view) {
                table.set_query(query);
            }
        }
    }

    fn on_overview_key(&mut self, key: KeyEvent) -> ConsoleAction {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.navigation.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.navigation.select_prev(),
            KeyCode::Enter => {
                let Some(node) = self.navigation.selected_node() else {
                    return ConsoleAction::Continue;
                };

                match node.target.clone() {
                    NavTarget::View(id) => return self.switch_to(id.into()),
                    NavTarget::Link(link) => {
                        self.status = Some(format!("External link: {}", link));
                    }
                }
            }
            _ => {}
        }

        ConsoleAction::Continue
    }

    fn on_table_key(&mut self, view: View, key: KeyEvent) -> ConsoleAction {
        let Some(table) = self.table_mut(view) else {
            return ConsoleAction::Continue;
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => table.select_next(),
            KeyCode::Char('k') | KeyCode::Up => table.select_prev(),
            KeyCode::Char('n') => table.next_page(),
            KeyCode::Char('N') => table.prev_page(),
            KeyCode::Char('/') => {
                self.input = Some(Input::Filter(table.query().to_string()));
            }
            KeyCode::Enter => {
                let row = table.selected_row().cloned();
                return self.open_row(view, row);
            }
            KeyCode::Esc => self.back(),
            _ => {}
        }

        ConsoleAction::Continue
    }

    fn open_row(&mut self, view: View, row: Option<KubeTableRow>) -> ConsoleAction {
        let Some(row) = row else {
            return ConsoleAction::Continue;
        };

        let items = match view {
            View::ClusterRoles => &self.cluster_role_items,
            View::Roles => &self.role_items,
            View::Crds => return self.open_custom_resources(&row),
            _ => return ConsoleAction::Continue,
        };

        let summary = items
            .iter()
            .find(|summary| {
                summary.role.name() == row.name
                    && summary.role.scope().namespace() == row.namespace.as_deref()
            })
            .cloned();

        match summary {
            Some(summary) => self.open_editor(summary),
            None => ConsoleAction::Continue,
        }
    }

    fn open_custom_resources(&mut self, row: &KubeTableRow) -> ConsoleAction {
        let Some(crd) = self
            .crd_items
            .iter()
            .find(|crd| crd.metadata.name.as_deref() == Some(row.name.as_str()))
            .cloned()
        else {
            return ConsoleAction::Continue;
        };

        self.custom_resources = PaginatedTable::new(crd.spec.names.kind.clone(), self.page_size);
        self.custom_resources.set_loading();
        self.custom_resource_crd = crd.metadata.name.clone();

        self.push_view(View::CustomResources);

        ConsoleAction::Requests(vec![KubeRequest::CustomResources(Box::new(crd))])
    }

    /// api groups は最初に開いたときだけ取得する
    fn open_editor(&mut self, summary: RoleSummary) -> ConsoleAction {
        let mut editor = RuleEditor::new(summary.role, summary.rules);

        let request = match &self.api_group_options {
            Some(options) => {
                editor.set_api_group_options(options.clone());
                None
            }
            None => Some(KubeRequest::ApiGroups),
        };

        self.editor = Some(editor);
        self.push_view(View::RuleEditor);

        request.into()
    }

    fn on_editor_key(&mut self, key: KeyEvent) -> ConsoleAction {
        if key.code == KeyCode::Esc {
            self.back();
            return ConsoleAction::Continue;
        }

        let Some(editor) = self.editor.as_mut() else {
            return ConsoleAction::Continue;
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => editor.cursor_next(),
            KeyCode::Char('k') | KeyCode::Up => editor.cursor_prev(),
            KeyCode::Tab => editor.focus_next_field(),
            KeyCode::Char(' ') | KeyCode::Enter => editor.toggle_at_cursor(),
            KeyCode::Char('g') => editor.add_all_api_groups(),
            KeyCode::Char('v') => editor.add_all_verbs(),
            KeyCode::Char('r') => {
                return editor.request_all_resources().map(KubeRequest::Resources).into();
            }
            KeyCode::Char('l') => {
                return editor.request_load_resources().map(KubeRequest::Resources).into();
            }
            KeyCode::Char('a') => editor.toggle_advanced(),
            KeyCode::Char(']') => editor.select_next(),
            KeyCode::Char('[') => editor.select_prev(),
            KeyCode::Char('+') => editor.add_rule(),
            KeyCode::Char('y') => self.show_yaml = !self.show_yaml,
            KeyCode::Char('i') if editor.focused_field() == RuleField::ResourceNames => {
                self.input = Some(Input::ResourceName(String::new()));
            }
            _ => {}
        }

        ConsoleAction::Continue
    }

    pub fn on_kube_response(&mut self, res: KubeResponse) {
        match res {
            KubeResponse::Connected { context, scope } => {
                self.context = Some(context);
                self.scope = Some(scope);
            }
            KubeResponse::ClusterConfig(config) => {
                self.navigation
                    .set_navigation(Navigation::from_cluster_config(&config));
                self.cluster_config = config;

                let main_view = self.main_view();
                if !self.main_views().contains(&main_view) {
                    self.editor = None;
                    self.view = View::Overview;
                    self.history.clear();
                }
            }
            KubeResponse::ClusterRoles(roles) => match roles {
                Ok(roles) => {
                    self.cluster_roles.set_table(role_table(&roles));
                    self.cluster_role_items = roles;
                }
                Err(err) => self.cluster_roles.set_error(err.to_string()),
            },
            KubeResponse::Roles(roles) => match roles {
                Ok(roles) => {
                    self.roles.set_table(role_table(&roles));
                    self.role_items = roles;
                }
                Err(err) => self.roles.set_error(err.to_string()),
            },
            KubeResponse::Crds(crds) => match crds {
                Ok(crds) => {
                    self.crds.set_table(crd_table(&crds));
                    self.crd_items = crds;
                }
                Err(err) => self.crds.set_error(err.to_string()),
            },
            KubeResponse::CustomResources { crd, result } => {
                if self.custom_resource_crd.as_deref() != Some(crd.as_str()) {
                    logger!(info, "discard custom resources of {}", crd);
                    return;
                }

                match result {
                    Ok((list, table)) => {
                        self.custom_resources.set_title(list.title);
                        self.custom_resources.set_table(table);
                    }
                    Err(err) => self.custom_resources.set_error(err.to_string()),
                }
            }
            KubeResponse::ApiGroups(options) => match options {
                Ok(options) => {
                    if let Some(editor) = self.editor.as_mut() {
                        editor.set_api_group_options(options.clone());
                    }
                    self.api_group_options = Some(options);
                }
                Err(err) => {
                    logger!(error, "failed to fetch api groups: {}", err);
                    self.status = Some(format!("failed to fetch api groups: {}", err));
                }
            },
            KubeResponse::Resources { request, result } => match self.editor.as_mut() {
                Some(editor) => editor.apply_resources(request, result),
                None => logger!(info, "discard resources for {:?}", request.api_groups),
            },
        }
    }
}

// Render
impl Console {
    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_tabs(f, chunks[0]);

        match self.view {
            View::Overview => self.render_overview(f, chunks[1]),
            View::RuleEditor => {
                if let Some(editor) = &self.editor {
                    let input = match &self.input {
                        Some(Input::ResourceName(name)) => Some(name.as_str()),
                        _ => None,
                    };

                    RuleForm::new(editor)
                        .input(input)
                        .show_yaml(self.show_yaml)
                        .render(f, chunks[1]);
                }
            }
            view => {
                if let Some(table) = self.table(view) {
                    table.render(f, chunks[1], true);
                }
            }
        }

        self.render_status(f, chunks[2]);
    }

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let views = self.main_views();
        let current = self.main_view();

        let titles: Vec<Line> = views
            .iter()
            .enumerate()
            .map(|(i, view)| Line::from(format!("{}: {}", i + 1, view.title())))
            .collect();

        let tabs = Tabs::new(titles)
            .select(views.iter().position(|v| *v == current).unwrap_or_default())
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        f.render_widget(tabs, area);
    }

    fn render_overview(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NAVIGATION_WIDTH), Constraint::Min(0)])
            .split(area);

        self.navigation.render(f, chunks[0], true);

        let field = |name: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("{:<12}", name), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ])
        };

        let mut lines = vec![
            field(
                "Context",
                self.context.clone().unwrap_or_else(|| "connecting...".into()),
            ),
            field(
                "Namespace",
                self.scope.as_ref().map(ToString::to_string).unwrap_or_default(),
            ),
            field("Storage", self.cluster_config.storage.to_string()),
            field("Page size", self.page_size.to_string()),
        ];

        if let Some(node) = self.navigation.selected_node() {
            if let NavTarget::Link(link) = &node.target {
                lines.push(Line::default());
                lines.push(field("Link", link.clone()));
            }
        }

        f.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title(" Cluster Details ")),
            chunks[1],
        );
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let line = match &self.input {
            Some(Input::Filter(query)) => Line::from(format!("/{}_", query)),
            Some(Input::ResourceName(name)) => Line::from(format!("resource name: {}_", name)),
            None => match &self.status {
                Some(status) => Line::from(status.clone().yellow()),
                None => Line::from(self.key_hints().dark_gray()),
            },
        };

        f.render_widget(Paragraph::new(line), area);
    }

    fn key_hints(&self) -> &'static str {
        match self.view {
            View::Overview => "j/k: move  Enter: open  Tab: next view  p: page size  q: quit",
            View::RuleEditor => {
                "Tab: field  Space: toggle  g/r/v: add all  l: load  a: advanced  ]/[: rule  +: add rule  i: name  y: yaml  Esc: back"
            }
            _ => "j/k: move  n/N: page  p: page size  /: filter  Enter: open  Esc: back  q: quit",
        }
    }
}
