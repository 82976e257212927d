use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};

use todo_api::application::error::ServiceError;
use todo_api::application::item_service::{ItemService, ItemServiceImpl};
use todo_api::application::models::{CreateItemRequest, ItemResponse, UpdateItemRequest};
use todo_api::config::{self, Settings};
use todo_api::domain::item::ItemStatus;
use todo_api::domain::repository::ItemRepository;
use todo_api::infrastructure::sqlite_repo::SqliteItemRepository;

const PAGE_SIZE: i64 = 15;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;
    config::prepare_sqlite_file(&settings.database_url)?;
    let repo = SqliteItemRepository::connect(&settings.database_url).await?;
    repo.init().await?;
    let service = ItemServiceImpl::new(repo);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, service, &settings.database_url).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit }

#[derive(Clone, Copy, PartialEq, Eq)]
enum ActiveField { Title, Description }

struct App<S: ItemService> {
    service: S,
    items: Vec<ItemResponse>,
    total: i64,
    page_number: i64,
    filter: Option<ItemStatus>,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    field: ActiveField,
    draft_title: String,
    draft_desc: String,
    message: Option<String>,
}

impl<S: ItemService> App<S> {
    fn new(service: S) -> Self {
        Self {
            service,
            items: Vec::new(),
            total: 0,
            page_number: 1,
            filter: None,
            selected: 0,
            last_tick: Instant::now(),
            mode: Mode::View,
            list_state: ListState::default(),
            field: ActiveField::Title,
            draft_title: String::new(),
            draft_desc: String::new(),
            message: None,
        }
    }

    /// Fetches the current page, stepping back when it emptied out.
    async fn load(&mut self) -> Result<(), ServiceError> {
        loop {
            let page = self.service.get_list(PAGE_SIZE, self.page_number, self.filter).await?;
            if page.to_do_items.is_empty() && self.page_number > 1 {
                self.page_number -= 1;
                continue;
            }
            self.total = page.total_count;
            self.items = page.to_do_items;
            break;
        }
        let len = self.items.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
        Ok(())
    }

    fn page_count(&self) -> i64 { ((self.total + PAGE_SIZE - 1) / PAGE_SIZE).max(1) }

    fn selected_item(&self) -> Option<&ItemResponse> { self.items.get(self.selected) }

    fn report(&mut self, result: Result<(), ServiceError>) {
        self.message = result.err().map(|e| e.to_string());
    }

    fn clear_drafts(&mut self) {
        self.mode = Mode::View;
        self.draft_title.clear();
        self.draft_desc.clear();
    }

    fn draft_field(&mut self) -> &mut String {
        match self.field { ActiveField::Title => &mut self.draft_title, ActiveField::Description => &mut self.draft_desc }
    }
}

fn filter_label(filter: Option<ItemStatus>) -> &'static str {
    match filter { None => "All", Some(ItemStatus::Active) => "Active", Some(ItemStatus::Completed) => "Completed" }
}

fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

async fn run_app<S: ItemService>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, service: S, database_url: &str) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App::new(service);
    app.load().await?;

    loop {
        let page_count = app.page_count();
        let detail = match app.selected_item() {
            Some(e) => format!(
                "Title:\n{}\n\nStatus: {}\nCreated: {}\nUpdated: {}\n\nDescription:\n{}",
                e.title,
                e.status,
                e.date_of_creation.format("%Y-%m-%d %H:%M"),
                e.updated_at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_else(|| "never".into()),
                e.description.as_deref().unwrap_or("(no description)"),
            ),
            None => String::new(),
        };
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
                .split(f.size());

            let header = Paragraph::new("Enter: toggle  n: new  e: edit  d: delete  c: delete completed  f: filter  PgUp/PgDn: page  q: quit")
                .block(Block::default().borders(Borders::ALL).title("todo-api"));
            f.render_widget(header, chunks[0]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            let list_items: Vec<ListItem> = app.items.iter().map(|e| {
                let mark = match e.status { ItemStatus::Active => "[ ]", ItemStatus::Completed => "[x]" };
                ListItem::new(format!("{} {}", mark, e.title))
            }).collect();
            // Keep list_state selection in sync with current index
            if app.items.is_empty() { app.list_state.select(None); } else { app.list_state.select(Some(app.selected)); }
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!(
                    "items [{}] page {}/{} ({} total)",
                    filter_label(app.filter), app.page_number, page_count, app.total
                )))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            let details = Paragraph::new(detail).block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let field_label = match app.field { ActiveField::Title => "Title", ActiveField::Description => "Desc" };
            let field_text = match app.field { ActiveField::Title => &app.draft_title, ActiveField::Description => &app.draft_desc };
            let footer_text = match (app.mode, &app.message) {
                (Mode::View, Some(msg)) => format!("error: {msg}"),
                (Mode::View, None) => format!("DATABASE_URL={database_url}"),
                (_, _) => format!("{field_label}: {field_text}_  |  (Tab to switch, Enter to save, Esc to cancel)"),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "create", Mode::Edit => "edit" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; repeats and releases would duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                        KeyCode::Down => { if app.selected + 1 < app.items.len() { app.selected += 1; } }
                        KeyCode::PageDown => {
                            if app.page_number < app.page_count() { app.page_number += 1; app.selected = 0; }
                            let res = app.load().await;
                            app.report(res);
                        }
                        KeyCode::PageUp => {
                            if app.page_number > 1 { app.page_number -= 1; app.selected = 0; }
                            let res = app.load().await;
                            app.report(res);
                        }
                        KeyCode::Enter => {
                            if let Some(entry) = app.selected_item() {
                                let (id, next) = (entry.id, match entry.status { ItemStatus::Active => ItemStatus::Completed, ItemStatus::Completed => ItemStatus::Active });
                                let res = app.service.update_status(id, next).await.map(|_| ());
                                app.report(res);
                                let res = app.load().await;
                                if res.is_err() { app.report(res); }
                            }
                        }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.field = ActiveField::Title;
                            app.draft_title.clear();
                            app.draft_desc.clear();
                        }
                        KeyCode::Char('e') => {
                            if let Some(entry) = app.selected_item() {
                                let (title, desc) = (entry.title.clone(), entry.description.clone().unwrap_or_default());
                                app.mode = Mode::Edit;
                                app.field = ActiveField::Title;
                                app.draft_title = title;
                                app.draft_desc = desc;
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = app.selected_item().map(|e| e.id) {
                                let res = app.service.delete(id).await;
                                app.report(res);
                                if app.selected > 0 { app.selected -= 1; }
                                let res = app.load().await;
                                if res.is_err() { app.report(res); }
                            }
                        }
                        KeyCode::Char('c') => {
                            let res = app.service.delete_all_completed().await.map(|_| ());
                            app.report(res);
                            let res = app.load().await;
                            if res.is_err() { app.report(res); }
                        }
                        KeyCode::Char('f') => {
                            app.filter = match app.filter { None => Some(ItemStatus::Active), Some(ItemStatus::Active) => Some(ItemStatus::Completed), Some(ItemStatus::Completed) => None };
                            app.page_number = 1;
                            app.selected = 0;
                            let res = app.load().await;
                            app.report(res);
                        }
                        _ => {}
                    },
                    Mode::Create | Mode::Edit => match key.code {
                        KeyCode::Esc => app.clear_drafts(),
                        KeyCode::Enter => {
                            let title = app.draft_title.trim().to_string();
                            let description = optional(&app.draft_desc);
                            let res = if app.mode == Mode::Create {
                                app.service.create(Some(CreateItemRequest { title, description })).await.map(|_| ())
                            } else if let Some(entry) = app.selected_item() {
                                let (id, status) = (entry.id, entry.status);
                                app.service.update(id, Some(UpdateItemRequest { title, description, status })).await.map(|_| ())
                            } else {
                                Ok(())
                            };
                            app.report(res);
                            app.clear_drafts();
                            let res = app.load().await;
                            if res.is_err() { app.report(res); }
                        }
                        KeyCode::Backspace => { app.draft_field().pop(); }
                        KeyCode::Char(c) => app.draft_field().push(c),
                        KeyCode::Tab => { app.field = match app.field { ActiveField::Title => ActiveField::Description, ActiveField::Description => ActiveField::Title }; }
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}
