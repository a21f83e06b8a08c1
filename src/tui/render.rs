use super::state::{AppState, Tab};
use crate::graph::{self, Anchor, Rgb, Surface};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle as CanvasCircle, Context, Line as CanvasLine},
        Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap,
    },
    Frame,
};

pub fn draw(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tabs(f, state, chunks[0]);
    match state.active_tab {
        Tab::Summary => draw_summary(f, state, chunks[1]),
        Tab::Dictionary => draw_markup_view(
            f,
            " Data Dictionary ",
            &state.dictionary,
            state,
            chunks[1],
        ),
        Tab::Duplicates => draw_markup_view(
            f,
            " Duplicate Records ",
            &state.duplicates,
            state,
            chunks[1],
        ),
        Tab::Pipeline => draw_pipeline(f, state, chunks[1]),
    }
    draw_logs(f, state, chunks[2]);
    draw_footer(f, chunks[3]);
}

fn draw_tabs(f: &mut Frame, state: &AppState, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|t| Line::from(t.label()))
        .collect();
    let title = format!(" Censo Escolar Dashboard | Up: {} ", state.uptime());
    let tabs = Tabs::new(titles)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .select(state.active_tab.index());
    f.render_widget(tabs, area);
}

/// Year strip shown above year-bound artifact views.
fn year_line(state: &AppState) -> Line<'_> {
    let mut spans: Vec<Span> = vec![Span::raw(" Year: ")];
    if state.years.is_empty() {
        spans.push(Span::styled(
            "discovering...",
            Style::default().fg(Color::DarkGray),
        ));
    }
    for year in &state.years {
        if *year == state.selected_year {
            spans.push(Span::styled(
                format!("[{}]", year),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(format!(" {} ", year)));
        }
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn draw_markup_view(
    f: &mut Frame,
    title: &str,
    content: &Option<String>,
    state: &AppState,
    area: Rect,
) {
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    f.render_widget(Paragraph::new(year_line(state)), chunks[0]);

    match content {
        Some(text) => {
            let visible = chunks[1].height as usize;
            let total = text.lines().count();
            let offset = state.scroll_offset.min(total.saturating_sub(visible));
            let para = Paragraph::new(text.as_str())
                .wrap(Wrap { trim: false })
                .scroll((offset as u16, 0));
            f.render_widget(para, chunks[1]);
        }
        None => {
            let para = Paragraph::new(Span::styled(
                "Loading...",
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center);
            f.render_widget(para, chunks[1]);
        }
    }
}

fn draw_summary(f: &mut Frame, state: &AppState, area: Rect) {
    if state.summary.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No summary statistics loaded",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Check that the artifact server is reachable",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let block = Block::default()
            .title(" Students per Census Year ")
            .borders(Borders::ALL);
        let para = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(para, area);
        return;
    }

    let header = Row::new(vec!["Year", "Students"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let visible = area.height.saturating_sub(4) as usize;
    let offset = state
        .scroll_offset
        .min(state.summary.len().saturating_sub(visible));

    let rows: Vec<Row> = state
        .summary
        .iter()
        .skip(offset)
        .take(visible)
        .map(|stat| {
            let highlight = if stat.year == state.selected_year {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(stat.year.clone()).style(highlight),
                Cell::from(stat.student_count.to_string()),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(6), Constraint::Min(10)])
        .header(header)
        .block(
            Block::default()
                .title(" Students per Census Year ")
                .borders(Borders::ALL),
        );
    f.render_widget(table, area);
}

fn draw_pipeline(f: &mut Frame, state: &AppState, area: Rect) {
    if state.steps.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Fetching pipeline graph...",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let block = Block::default()
            .title(" Processing Pipeline ")
            .borders(Borders::ALL);
        let para = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(para, area);
        return;
    }

    let height = graph::surface_height(state.steps.len());
    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(" Processing Pipeline ")
                .borders(Borders::ALL),
        )
        .x_bounds([0.0, graph::DEFAULT_WIDTH])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            let mut surface = CanvasSurface { ctx, height };
            graph::layout_and_draw(&state.steps, &mut surface);
        });
    f.render_widget(canvas, area);
}

/// Adapts the terminal canvas to the renderer's drawing surface. The paint
/// closure is the surface-ready callback: a `CanvasSurface` only exists
/// while the canvas is mounted, so the renderer never draws into a missing
/// surface. Canvas y grows upward, so coordinates are flipped.
struct CanvasSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
    height: f64,
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

impl Surface for CanvasSurface<'_, '_> {
    fn measured_width(&self) -> Option<f64> {
        // Terminal cells have no useful pixel width; the renderer's default
        // coordinate space matches the widget bounds.
        None
    }

    fn clear(&mut self, _width: f64, height: f64) {
        // A ratatui canvas starts blank on every frame; record the viewport
        // for the y flip.
        self.height = height;
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Rgb, _width: f64) {
        let (y1, y2) = (self.height - y1, self.height - y2);
        self.ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: color(stroke),
        });
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Rgb, _stroke: Rgb) {
        let y = self.height - cy;
        self.ctx.draw(&CanvasCircle {
            x: cx,
            y,
            radius: r,
            color: color(fill),
        });
    }

    fn text(&mut self, x: f64, y: f64, _anchor: Anchor, content: &str) {
        let y = self.height - y;
        self.ctx.print(x, y, Line::from(content.to_string()));
    }
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                _ => Color::DarkGray,
            };
            Line::from(vec![
                Span::styled(
                    format!(" {} [{}] ", l.time, l.level),
                    Style::default().fg(color),
                ),
                Span::raw(l.message.clone()),
            ])
        })
        .collect();

    let block = Block::default().title(" Activity ").borders(Borders::ALL);
    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("  [q]", Style::default().fg(Color::Yellow)),
        Span::raw("uit  "),
        Span::styled("[s]", Style::default().fg(Color::Yellow)),
        Span::raw("ummary  "),
        Span::styled("[d]", Style::default().fg(Color::Yellow)),
        Span::raw("ictionary  d"),
        Span::styled("[u]", Style::default().fg(Color::Yellow)),
        Span::raw("plicates  "),
        Span::styled("[p]", Style::default().fg(Color::Yellow)),
        Span::raw("ipeline  "),
        Span::styled("[←/→]", Style::default().fg(Color::Yellow)),
        Span::raw(" year  "),
        Span::styled("[j/k]", Style::default().fg(Color::Yellow)),
        Span::raw(" scroll  "),
    ]);
    let para = Paragraph::new(line);
    f.render_widget(para, area);
}
