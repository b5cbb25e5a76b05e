use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::features::navigation::{NavNode, NavTarget, Navigation};

/// サイドナビゲーション
#[derive(Debug, Default, Clone)]
pub struct NavigationWidget {
    navigation: Navigation,
    selected: usize,
}

impl NavigationWidget {
    pub fn new(navigation: Navigation) -> Self {
        Self {
            navigation,
            selected: 0,
        }
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// 選択位置はノード数に収まるよう調整する
    pub fn set_navigation(&mut self, navigation: Navigation) {
        self.navigation = navigation;

        let len = self.navigation.nodes().count();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.navigation.nodes().count() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_node(&self) -> Option<&NavNode> {
        self.navigation.nodes().nth(self.selected)
    }

    fn lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();
        let mut index = 0;

        for category in self.navigation.categories() {
            let mut header = vec![Span::styled(
                category.label.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )];

            if let Some(icon) = &category.icon {
                header.push(format!(" ({})", icon).dark_gray());
            }

            lines.push(Line::from(header));

            for node in &category.nodes {
                let mut spans = vec![Span::raw(format!("  {}", node.label))];

                if let NavTarget::Link(link) = &node.target {
                    spans.push(format!(" -> {}", link).fg(Color::Blue));
                }

                let mut line = Line::from(spans);

                if index == self.selected {
                    line = line.style(Style::default().add_modifier(Modifier::REVERSED));
                }

                lines.push(line);
                index += 1;
            }
        }

        lines
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect, is_active: bool) {
        let border_style = if is_active {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Navigation ");

        f.render_widget(Paragraph::new(self.lines()).block(block), area);
    }
}
