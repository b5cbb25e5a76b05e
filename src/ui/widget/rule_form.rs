use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::features::rbac::{
    rule::{values, RuleField},
    RuleEditor,
};

/// Renders the rule editor: the form on the left, warnings and the YAML of
/// the edited rules on the right.
pub struct RuleForm<'a> {
    editor: &'a RuleEditor,
    input: Option<&'a str>,
    show_yaml: bool,
}

impl<'a> RuleForm<'a> {
    pub fn new(editor: &'a RuleEditor) -> Self {
        Self {
            editor,
            input: None,
            show_yaml: true,
        }
    }

    pub fn show_yaml(mut self, show_yaml: bool) -> Self {
        self.show_yaml = show_yaml;
        self
    }

    /// 入力中の resourceName
    pub fn input(mut self, input: Option<&'a str>) -> Self {
        self.input = input;
        self
    }

    fn header(&self) -> Line<'a> {
        let editor = self.editor;

        let mut spans = vec![
            Span::styled(
                format!(
                    "Rule {}/{}",
                    editor.selected_index() + 1,
                    editor.rules().len()
                ),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "  advanced: {}",
                if editor.is_advanced() { "on" } else { "off" }
            )),
        ];

        if editor.is_loading() {
            spans.push("  loading resources...".yellow());
        } else if editor.is_resources_loadable() {
            spans.push("  [l] load resources".dark_gray());
        }

        Line::from(spans)
    }

    /// フォームの行とカーソル行の位置
    fn form_lines(&self) -> (Vec<Line<'a>>, usize) {
        let editor = self.editor;
        let rule = editor.selected_rule();

        let mut lines = vec![self.header()];
        let mut cursor_line = 0;

        if let Some(err) = editor.last_error() {
            lines.push(Line::from(format!("error: {}", err).red()));
        }

        for field in editor.editable_fields() {
            let is_focused = field == editor.focused_field();

            let title_style = if is_focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };

            lines.push(Line::default());
            lines.push(Line::from(Span::styled(field.to_string(), title_style)));

            let selected = values(rule, field);

            for (i, option) in editor.options(field).into_iter().enumerate() {
                let mark = if selected.contains(&option.value) {
                    "[x]"
                } else {
                    "[ ]"
                };

                let mut line = Line::from(format!("  {} {}", mark, option.text));

                if is_focused && i == editor.cursor() {
                    line = line.style(Style::default().add_modifier(Modifier::REVERSED));
                    cursor_line = lines.len();
                }

                lines.push(line);
            }

            if field == RuleField::ResourceNames {
                match self.input {
                    Some(input) => lines.push(Line::from(format!("  + {}_", input).cyan())),
                    None if is_focused => lines.push(Line::from("  [i] add name".dark_gray())),
                    None => {}
                }
            }
        }

        (lines, cursor_line)
    }

    fn side_lines(&self) -> Vec<Line<'a>> {
        let warnings = self.editor.warnings();

        let mut lines: Vec<Line> = warnings
            .iter()
            .map(|w| Line::from(format!("! {}", w).yellow()))
            .collect();

        if !self.show_yaml {
            return lines;
        }

        if !lines.is_empty() {
            lines.push(Line::default());
        }

        match self.editor.to_yaml() {
            Ok(yaml) => lines.extend(yaml.lines().map(|l| Line::from(l.to_string()))),
            Err(err) => lines.push(Line::from(err.to_string().red())),
        }

        lines
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let title = format!(" Rules of {} ", self.editor.role().name());

        let (lines, cursor_line) = self.form_lines();

        // カーソル行が見える位置までスクロールする
        let height = chunks[0].height.saturating_sub(2) as usize;
        let scroll = (cursor_line + 1).saturating_sub(height) as u16;

        f.render_widget(
            Paragraph::new(lines)
                .scroll((scroll, 0))
                .block(Block::default().borders(Borders::ALL).title(title)),
            chunks[0],
        );

        let side_title = if self.show_yaml { " YAML " } else { " Warnings " };

        f.render_widget(
            Paragraph::new(self.side_lines())
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(side_title)),
            chunks[1],
        );
    }
}
