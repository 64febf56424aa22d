use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_vtable::TableAction;
use ratatui_vtable::cell::compose_cell;
use ratatui_vtable::crossterm_input::input_event_from_crossterm;
use ratatui_vtable::prelude::*;
use std::io;
use std::time::Duration;

struct User {
    id: u32,
    name: String,
    email: String,
    score: f64,
    tags: Vec<&'static str>,
}

const TAGS: [&str; 5] = ["admin", "beta", "ops", "staff", "trial"];

fn users(n: u32) -> Vec<User> {
    (0..n)
        .map(|id| User {
            id,
            name: format!("user {id:06}"),
            email: format!("user{id}@example.com"),
            score: (id % 1000) as f64 / 10.0,
            tags: TAGS
                .iter()
                .enumerate()
                .filter(|(i, _)| id as usize % (i + 2) == 0)
                .map(|(_, t)| *t)
                .collect(),
        })
        .collect()
}

fn columns() -> Vec<Column<User>> {
    vec![
        Column::new("id", "ID", 1.0, |u: &User| u.id.into()),
        Column::new("name", "Name", 2.0, |u: &User| u.name.as_str().into()),
        Column::new("email", "Email", 3.0, |u: &User| u.email.as_str().into()),
        Column::new("score", "Score", 1.0, |u: &User| u.score.into()),
        Column::new("tags", "Tags", 2.0, |u: &User| u.tags.clone().into()),
    ]
}

/// Logs go to the file named by `VTABLE_LOG_FILE` (default `vtable.log`) when `VTABLE_LOG` holds
/// a filter such as `ratatui_vtable_core=trace`; stdout belongs to the alternate screen.
fn init_tracing() -> io::Result<()> {
    if std::env::var_os("VTABLE_LOG").is_none() {
        return Ok(());
    }
    let path = std::env::var("VTABLE_LOG_FILE").unwrap_or_else(|_| "vtable.log".to_string());
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("VTABLE_LOG"))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    init_tracing()?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::default();
    let rows = users(100_000);
    let columns = columns();
    tracing::info!(rows = rows.len(), columns = columns.len(), "table demo started");
    let mut view = TableView::with_options(TableViewOptions {
        show_header: true,
        ..Default::default()
    });

    let res = run(&mut terminal, &theme, &mut view, &rows, &columns);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

struct Status {
    size: Option<(u16, u16)>,
    clicked: Option<String>,
    error: Option<String>,
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    view: &mut TableView,
    rows: &[User],
    columns: &[Column<User>],
) -> io::Result<()> {
    let mut status = Status {
        size: None,
        clicked: None,
        error: None,
    };
    let mut striped = false;

    loop {
        let mut resized = None;
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default()
                .title("TableView (j/k/↑↓, PgUp/PgDn, Ctrl-d/u, g/G, s stripes, click a cell, q)")
                .borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let buf = f.buffer_mut();
            let table_area = Rect::new(
                inner.x,
                inner.y,
                inner.width,
                inner.height.saturating_sub(1),
            );
            let status_area = Rect::new(inner.x, inner.y + table_area.height, inner.width, 1);

            let mut props = TableProps::new(rows, columns)
                .primitize_cell(|p| match p.cell_data {
                    CellValue::List(items) => items
                        .iter()
                        .filter_map(CellValue::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                        .into(),
                    other => other
                        .as_primitive()
                        .unwrap_or_else(|| other.kind().into()),
                })
                .on_resize(|size| resized = Some((size.width, size.height)));
            if striped {
                props = props.custom_row_renderer(striped_row);
            }

            status.error = view
                .render(table_area, buf, theme, &mut props)
                .err()
                .map(|e| e.to_string());
            render_status(status_area, buf, theme, view, &status);
        })?;
        if resized.is_some() {
            status.size = resized;
        }

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let event = crossterm::event::read()?;
        if let Event::Key(key) = &event {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('s') => {
                        striped = !striped;
                        tracing::debug!(striped, "row renderer toggled");
                        continue;
                    }
                    _ => {}
                }
            }
        }
        let Some(ev) = input_event_from_crossterm(event) else {
            continue;
        };
        match view.handle_event(ev) {
            TableAction::Clicked { row, col } => {
                tracing::info!(row, col = ?col, "cell clicked");
                let col = col
                    .and_then(|c| columns.get(c))
                    .map(|c| c.header_name.as_str())
                    .unwrap_or("-");
                status.clicked = Some(format!("row {row} / {col}"));
            }
            TableAction::Redraw | TableAction::None => {}
        }
    }
}

/// Zebra rows that show list columns as a count instead of coercing them.
fn striped_row(p: &RowProps<'_, User>, cols: &[Column<User>]) -> RowElement {
    let mut row = RowElement::from_props(p);
    if p.index % 2 == 1 {
        row.style = row
            .style
            .merge(&BoxStyle::new().paint(Style::default().bg(Color::Black)));
    }
    for col in cols {
        let cell = match col.value(p.data) {
            CellValue::List(items) => CellElement::text(format!("[{}]", items.len()))
                .with_style(BoxStyle::new().flex(col.width)),
            value => match value.as_primitive() {
                Some(v) => compose_cell(v, col.width, None),
                None => CellElement::text(value.kind()).with_style(BoxStyle::new().flex(col.width)),
            },
        };
        row.push(cell);
    }
    row
}

fn render_status(
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
    theme: &Theme,
    view: &TableView,
    status: &Status,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    if let Some(err) = &status.error {
        let span = Span::styled(err.as_str(), Style::default().fg(Color::Red));
        buf.set_span(area.x, area.y, &span, area.width);
        return;
    }
    let metrics = view.metrics();
    let size = status
        .size
        .map(|(w, h)| format!("{w}x{h}"))
        .unwrap_or_else(|| "-".to_string());
    let first = view
        .window()
        .first_visible()
        .map(|i| i.to_string())
        .unwrap_or_else(|| "-".to_string());
    let s = format!(
        "top={first}  scroll={}%  size={size}  clicked={}",
        metrics.percent().unwrap_or(0),
        status.clicked.as_deref().unwrap_or("-"),
    );
    let span = Span::styled(s, theme.text_muted);
    buf.set_span(area.x, area.y, &span, area.width);
}
