//! TUI 标签选择器演示
//!
//! 使用 crossterm 和 ratatui 构建的终端标签/自动补全控件，核心逻辑全部来自 `choices-core`。
//!
//! # 用法
//!
//! ```bash
//! cargo run -p tui-choices -- [multi|single|text]
//! ```
//!
//! - `multi`（默认）：多选，最多 5 个标签，分组显示
//! - `single`：单选
//! - `text`：自由输入，逗号分隔，不允许重复
//!
//! # 日志（可选）
//!
//! 终端被界面占用，日志写入文件：
//!
//! ```bash
//! CHOICES_LOG=/tmp/choices.log RUST_LOG=debug cargo run -p tui-choices
//! ```
//!
//! # 快捷键
//!
//! - 字符输入: 搜索 / 输入新值
//! - 上/下方向键: 移动高亮
//! - PageUp/PageDown: 跳到第一项/最后一项
//! - Enter: 打开下拉框 / 选中高亮项 / 添加输入值
//! - Esc: 关闭下拉框
//! - Backspace/Delete: 删除字符；输入为空时删除标签
//! - Ctrl+A: 高亮全部标签
//! - Ctrl+R: 模拟异步加载更多选项
//! - Ctrl+D: 启用/禁用控件
//! - Ctrl+X: 退出

use choices_core::{
    AnimationHandle, CallbackRegistry, ChoiceDelivery, ChoiceId, ChoiceList, ChoiceListEntry,
    ChoiceSpec, Choices, ChoicesEvent, EntryBox, HostElement, Item, ItemId, Key, KeyOutcome, Mode,
    Notice, Renderer, ScrollGeometry, ScrollStep,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use serde_json::json;
use std::{
    cell::RefCell,
    env, fs,
    io::{self, stdout},
    process,
    rc::Rc,
    time::{Duration, Instant},
};
use unicode_segmentation::UnicodeSegmentation;

/// 模拟网络延迟
const FETCH_DELAY: Duration = Duration::from_millis(800);
/// 事件日志最多保留的行数
const EVENT_LOG_LIMIT: usize = 4;

/// 下拉框中的一行
#[derive(Debug, Clone)]
enum Row {
    Header {
        label: String,
        disabled: bool,
    },
    Choice {
        id: ChoiceId,
        label: String,
        disabled: bool,
    },
}

/// 把控件状态转成可直接绘制的行
#[derive(Debug, Default)]
struct TuiRenderer {
    /// 已选标签（id、显示文本、是否高亮）
    items: Vec<(ItemId, String, bool)>,
    /// 下拉框内容
    rows: Vec<Row>,
    /// 替代下拉框内容的提示
    notice: Option<Notice>,
    /// 当前高亮的选项
    highlighted: Option<ChoiceId>,
}

impl TuiRenderer {
    fn highlighted_row(&self) -> Option<usize> {
        let id = self.highlighted?;
        self.rows
            .iter()
            .position(|row| matches!(row, Row::Choice { id: row_id, .. } if *row_id == id))
    }
}

impl Renderer for TuiRenderer {
    fn render_items(&mut self, items: &[&Item]) -> usize {
        self.items = items
            .iter()
            .map(|item| (item.id, item.label.clone(), item.highlighted))
            .collect();
        self.items.len()
    }

    fn render_choices(&mut self, list: &ChoiceList) -> usize {
        self.rows = list
            .entries()
            .iter()
            .map(|entry| match entry {
                ChoiceListEntry::Group(group) => Row::Header {
                    label: group.label.clone(),
                    disabled: group.disabled,
                },
                ChoiceListEntry::Choice(choice) => Row::Choice {
                    id: choice.id,
                    label: choice.label.clone(),
                    disabled: choice.disabled,
                },
            })
            .collect();
        self.notice = None;
        self.rows.len()
    }

    fn render_notice(&mut self, notice: &Notice) {
        self.rows.clear();
        self.notice = Some(notice.clone());
    }

    fn highlight_choice(&mut self, id: Option<ChoiceId>) {
        self.highlighted = id;
    }
}

/// 应用状态
struct App {
    /// 控件
    choices: Choices<TuiRenderer>,
    /// 是否需要退出
    should_quit: bool,
    /// 状态消息
    status_message: String,
    /// 回调事件日志（由 callbackOn* 写入）
    events: Rc<RefCell<Vec<String>>>,
    /// 等待中的异步加载
    pending_fetch: Option<(ChoiceDelivery, Instant)>,
    /// 已模拟加载的批次数
    fetch_round: usize,
    /// 下拉框滚动位置（行）
    scroll_top: f64,
    /// 正在进行的滚动动画
    animation: Option<AnimationHandle>,
    /// 上一次绘制时下拉框的可见高度
    list_height: u16,
}

impl App {
    /// 创建新的应用实例
    fn new(mode: Mode) -> Result<Self, String> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallbackRegistry::new();
        let sink = Rc::clone(&events);
        registry.register("log", move |event: &ChoicesEvent| {
            let mut events = sink.borrow_mut();
            events.push(format!("{event:?}"));
            let overflow = events.len().saturating_sub(EVENT_LOG_LIMIT);
            events.drain(..overflow);
        });

        let options = match mode {
            Mode::FreeText => json!({
                "duplicateItems": false,
                "delimiter": ",",
                "regexFilter": "^[^\\s].*",
                "callbackOnAddItem": "log",
                "callbackOnRemoveItem": "log",
                "callbackOnChange": "log",
            }),
            _ => json!({
                "maxItemCount": 5,
                "searchResultLimit": 8,
                "callbackOnAddItem": "log",
                "callbackOnRemoveItem": "log",
                "callbackOnSearch": "log",
                "callbackOnChange": "log",
            }),
        };

        let host = match mode {
            Mode::FreeText => HostElement::new(mode).with_items(["rust", "tui"]),
            _ => HostElement::new(mode)
                .with_group(
                    "Europe",
                    vec![
                        ChoiceSpec::new("nl").label("Netherlands"),
                        ChoiceSpec::new("de").label("Germany").selected(),
                        ChoiceSpec::new("fr").label("France"),
                        ChoiceSpec::new("is").label("Iceland").disabled(),
                    ],
                )
                .with_group(
                    "Asia",
                    vec![
                        ChoiceSpec::new("cn").label("China"),
                        ChoiceSpec::new("jp").label("Japan"),
                        ChoiceSpec::new("kr").label("Korea"),
                    ],
                )
                .with_choice(ChoiceSpec::new("aq").label("Antarctica")),
        };

        let mut choices =
            Choices::from_json(&options, &registry, host).map_err(|err| err.to_string())?;
        choices
            .init(TuiRenderer::default())
            .map_err(|err| err.to_string())?;

        Ok(Self {
            choices,
            should_quit: false,
            status_message: String::new(),
            events,
            pending_fetch: None,
            fetch_round: 0,
            scroll_top: 0.0,
            animation: None,
            list_height: 0,
        })
    }

    fn press(&mut self, key: Key) {
        match self.choices.handle_key(key) {
            Ok(KeyOutcome::Rejected(notice)) => self.status_message = notice.text,
            Ok(KeyOutcome::Removed(count)) => {
                self.status_message = format!("已删除 {count} 个标签");
            }
            Ok(KeyOutcome::Added(id)) => self.status_message = format!("已添加 #{}", id.get()),
            Ok(_) => {}
            Err(err) => self.status_message = format!("错误: {err}"),
        }
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        let mut text = self.choices.input().to_string();
        edit(&mut text);
        if let Err(err) = self.choices.set_input(&text) {
            self.status_message = format!("错误: {err}");
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let before = self.choices.highlighted_choice();

        match key.code {
            KeyCode::Char('x') if ctrl => self.should_quit = true,
            KeyCode::Char('a') if ctrl => self.press(Key::SelectAll),
            KeyCode::Char('r') if ctrl => self.start_fetch(),
            KeyCode::Char('d') if ctrl => {
                if self.choices.is_enabled() {
                    self.choices.disable();
                    self.status_message = "控件已禁用（Ctrl+D 启用）".to_string();
                } else {
                    self.choices.enable();
                    self.status_message = "控件已启用".to_string();
                }
            }
            KeyCode::Char(c) if !ctrl => self.edit_input(|text| text.push(c)),
            KeyCode::Backspace => {
                if self.choices.input().is_empty() {
                    self.press(Key::Backspace);
                } else {
                    // 按字素删除，避免截断组合字符
                    self.edit_input(|text| {
                        if let Some((start, _)) = text.grapheme_indices(true).next_back() {
                            text.truncate(start);
                        }
                    });
                }
            }
            KeyCode::Delete => self.press(Key::Delete),
            KeyCode::Enter => self.press(Key::Enter),
            KeyCode::Esc => self.press(Key::Escape),
            KeyCode::Up => self.press(Key::Up),
            KeyCode::Down => self.press(Key::Down),
            KeyCode::PageUp => self.press(Key::PageUp),
            KeyCode::PageDown => self.press(Key::PageDown),
            _ => {}
        }

        if self.choices.highlighted_choice() != before {
            self.reveal_highlighted();
        }
    }

    /// 高亮项不在可见区域时启动滚动动画
    fn reveal_highlighted(&mut self) {
        let Some(row) = self.choices.renderer().and_then(TuiRenderer::highlighted_row) else {
            return;
        };
        let geometry = ScrollGeometry {
            scroll_top: self.scroll_top,
            viewport_height: f64::from(self.list_height),
        };
        let entry = EntryBox {
            offset_top: row as f64,
            height: 1.0,
        };
        if let Some(handle) = self.choices.reveal_highlighted(geometry, entry) {
            self.animation = Some(handle);
        }
    }

    fn start_fetch(&mut self) {
        if self.pending_fetch.is_some() {
            return;
        }
        let mut handle = None;
        match self
            .choices
            .fetch_choices(|delivery| handle = Some(delivery))
        {
            Ok(_) => {
                self.pending_fetch = handle.map(|delivery| (delivery, Instant::now()));
                self.status_message = "加载中…".to_string();
            }
            Err(err) => self.status_message = format!("无法加载: {err}"),
        }
    }

    /// 每帧推进：异步加载、滚动动画
    fn tick(&mut self) {
        let ready = self
            .pending_fetch
            .as_ref()
            .is_some_and(|(_, started)| started.elapsed() >= FETCH_DELAY);
        if ready && let Some((delivery, _)) = self.pending_fetch.take() {
            self.fetch_round += 1;
            let round = self.fetch_round;
            let results: Vec<_> = (1..=3)
                .map(|i| {
                    json!({
                        "code": format!("r{round}-{i}"),
                        "name": format!("Remote {round}.{i}"),
                    })
                })
                .collect();
            let applied = delivery
                .deliver(&results, "code", "name")
                .and_then(|_| self.choices.process_deliveries());
            self.status_message = match applied {
                Ok(count) => format!("已加载 {count} 个选项"),
                Err(err) => format!("加载失败: {err}"),
            };
        }

        if let Some(handle) = self.animation {
            match self.choices.scroll_frame(handle, self.scroll_top) {
                ScrollStep::Continue(top) => self.scroll_top = top,
                ScrollStep::Finished(top) => {
                    self.scroll_top = top;
                    self.animation = None;
                }
                ScrollStep::Cancelled => self.animation = None,
            }
        }
    }

    fn is_animating(&self) -> bool {
        self.animation.is_some() || self.pending_fetch.is_some()
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(EVENT_LOG_LIMIT as u16 + 2),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let Some(renderer) = self.choices.renderer() else {
            return;
        };

        // 输入框：标签 + 输入文本
        let mut spans: Vec<Span> = Vec::new();
        for (_, label, highlighted) in &renderer.items {
            let style = if *highlighted {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            };
            spans.push(Span::styled(format!(" {label} "), style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::raw(self.choices.input().to_string()));
        spans.push(Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)));
        let title = format!(
            " {:?}{} ",
            self.choices.mode(),
            if self.choices.is_enabled() { "" } else { "（禁用）" }
        );
        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title(title)),
            chunks[0],
        );

        // 下拉框
        self.list_height = chunks[1].height.saturating_sub(2);
        let lines: Vec<Line> = if !self.choices.is_dropdown_open() {
            vec![Line::styled(
                "（Enter 或方向键打开下拉框）",
                Style::default().fg(Color::DarkGray),
            )]
        } else if let Some(notice) = &renderer.notice {
            let color = if notice.is_rejection() {
                Color::Red
            } else {
                Color::Gray
            };
            vec![Line::styled(notice.text.clone(), Style::default().fg(color))]
        } else {
            renderer
                .rows
                .iter()
                .skip(self.scroll_top.round() as usize)
                .map(|row| match row {
                    Row::Header { label, disabled } => {
                        let mut style = Style::default().add_modifier(Modifier::BOLD);
                        if *disabled {
                            style = style.fg(Color::DarkGray);
                        }
                        Line::styled(label.clone(), style)
                    }
                    Row::Choice {
                        id,
                        label,
                        disabled,
                    } => {
                        let style = if *disabled {
                            Style::default().fg(Color::DarkGray)
                        } else if renderer.highlighted == Some(*id) {
                            Style::default().fg(Color::Black).bg(Color::White)
                        } else {
                            Style::default()
                        };
                        Line::styled(format!("  {label}"), style)
                    }
                })
                .collect()
        };
        let list_title = if self.choices.is_loading() {
            " 选项（加载中…） "
        } else {
            " 选项 "
        };
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(list_title)),
            chunks[1],
        );

        // 回调事件
        let events: Vec<Line> = self
            .events
            .borrow()
            .iter()
            .map(|event| Line::raw(event.clone()))
            .collect();
        frame.render_widget(
            Paragraph::new(events).block(Block::default().borders(Borders::ALL).title(" 事件 ")),
            chunks[2],
        );

        // 状态栏
        let status = format!(
            "值: {} | {}",
            self.choices.serialized_value(),
            self.status_message
        );
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::Black).bg(Color::Gray)),
            chunks[3],
        );
    }
}

/// `CHOICES_LOG` 指定日志文件时初始化 env_logger
fn init_logging() {
    let Ok(path) = env::var("CHOICES_LOG") else {
        return;
    };
    match fs::File::create(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(err) => eprintln!("无法创建日志文件 {path}: {err}"),
    }
}

fn main() -> io::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let mode = match args.get(1).map(String::as_str) {
        None | Some("multi") => Mode::MultiSelect,
        Some("single") => Mode::SingleSelect,
        Some("text") => Mode::FreeText,
        Some(other) => {
            eprintln!("未知模式: {other}");
            eprintln!("用法: {} [multi|single|text]", args[0]);
            process::exit(1);
        }
    };

    // 创建应用
    let mut app = match App::new(mode) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("初始化失败: {err}");
            process::exit(1);
        }
    };

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("错误: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        // 动画进行时提高帧率
        let timeout = if app.is_animating() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
        {
            app.handle_key_event(key);
        }
    }

    Ok(())
}
