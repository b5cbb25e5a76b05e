use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    features::preferences::{PageSize, Pagination},
    kube::{KubeTable, KubeTableRow},
};

const COLUMN_SPACING: u16 = 3;
const HIGHLIGHT_SYMBOL: &str = " ";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
enum Status {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Error(String),
}

/// ページ単位で表示するテーブル
#[derive(Debug, Default, Clone)]
pub struct PaginatedTable {
    title: String,
    table: KubeTable,
    filtered: KubeTable,
    query: String,
    pagination: Pagination,
    selected: usize,
    status: Status,
}

impl PaginatedTable {
    pub fn new(title: impl Into<String>, page_size: PageSize) -> Self {
        Self {
            title: title.into(),
            pagination: Pagination::new(page_size),
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn is_not_loaded(&self) -> bool {
        self.status == Status::NotLoaded
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, Status::Error(_))
    }

    pub fn set_loading(&mut self) {
        self.status = Status::Loading;
    }

    pub fn set_table(&mut self, table: KubeTable) {
        self.table = table;
        self.status = Status::Loaded;
        self.refilter();
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.status = Status::Error(error.into());
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = self.table.search(&self.query);
        self.pagination.first_page();
        self.selected = 0;
    }

    pub fn page_size(&self) -> PageSize {
        self.pagination.page_size()
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.pagination.set_page_size(page_size);
        self.selected = 0;
    }

    pub fn next_page(&mut self) {
        self.pagination.next_page(self.filtered.rows.len());
        self.selected = 0;
    }

    pub fn prev_page(&mut self) {
        self.pagination.prev_page();
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible_rows().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Rows of the current page.
    pub fn visible_rows(&self) -> &[KubeTableRow] {
        self.pagination.visible(&self.filtered.rows)
    }

    pub fn selected_row(&self) -> Option<&KubeTableRow> {
        self.visible_rows().get(self.selected)
    }

    fn page_text(&self) -> String {
        let total = self.filtered.rows.len();
        let range = self.pagination.visible_range(total);
        let page = range.start / self.page_size().rows() + 1;

        format!(
            "page {}/{} | {} per page | {} rows",
            page,
            self.pagination.page_count(total),
            self.page_size(),
            total
        )
    }

    fn block(&self, is_active: bool) -> Block<'_> {
        let mut title = format!(" {} ", self.title);

        if !self.query.is_empty() {
            title.push_str(&format!("[/{}] ", self.query));
        }

        let border_style = if is_active {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
            .title_bottom(Line::from(format!(" {} ", self.page_text())).right_aligned())
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect, is_active: bool) {
        let block = self.block(is_active);

        let message = match &self.status {
            Status::NotLoaded | Status::Loading => Some(" Loading...".dark_gray()),
            Status::Error(err) => Some(format!(" {}", err).red()),
            Status::Loaded if self.filtered.rows.is_empty() => Some(" No data".dark_gray()),
            Status::Loaded => None,
        };

        if let Some(message) = message {
            f.render_widget(Paragraph::new(message).block(block), area);
            return;
        }

        let rows = self.visible_rows();

        let widget = Table::new(
            rows.iter().map(|row| Row::new(row.row.clone())),
            constraints(&self.filtered.header, rows),
        )
        .header(Row::new(self.filtered.header.clone()).style(Style::default().fg(Color::DarkGray)))
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .column_spacing(COLUMN_SPACING);

        let mut state = TableState::default().with_selected(Some(self.selected));

        f.render_stateful_widget(widget, area, &mut state);
    }
}

/// 各カラムの最大表示幅
fn constraints(header: &[String], rows: &[KubeTableRow]) -> Vec<Constraint> {
    header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let width = rows
                .iter()
                .filter_map(|row| row.row.get(i))
                .map(|cell| cell.width())
                .chain(std::iter::once(h.width()))
                .max()
                .unwrap_or_default();

            Constraint::Length(width as u16)
        })
        .collect()
}
