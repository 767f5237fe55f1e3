use std::io::{self, stdout};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use chaocipher_rs::{
    Block as CipherBlock, Chaocipher, crack, find_anchor, helpers,
};

enum InputMode {
    Normal,
    Editing,
    SelectingOperation,
}

enum FocusedField {
    Plaintext,
    Ciphertext,
    Key1,
    Key2,
}

struct App {
    input_mode: InputMode,
    focused_field: FocusedField,

    plaintext: String,
    ciphertext: String,
    key1: String,
    key2: String,
    result: String,

    operations: Vec<&'static str>,
    operation_list_state: ListState,
    selected_operation_index: usize,
}

fn clean(input: &str) -> Vec<u8> {
    helpers::sanitize(input)
}

fn clean_str(input: &str) -> String {
    String::from_utf8_lossy(&helpers::sanitize(input)).to_string()
}

impl App {
    fn new() -> App {
        let mut operation_list_state = ListState::default();
        operation_list_state.select(Some(0));
        App {
            input_mode: InputMode::Normal,
            focused_field: FocusedField::Plaintext,
            plaintext: String::new(),
            ciphertext: String::new(),
            key1: String::new(),
            key2: String::new(),
            result: String::new(),
            operations: vec![
                "Encrypt",
                "Decrypt",
                "Keyed encrypt",
                "Keyed decrypt",
                "Crack",
            ],
            operation_list_state,
            selected_operation_index: 0,
        }
    }

    fn run_operation(&mut self) {
        let operation = self.operations[self.selected_operation_index];

        self.result = match operation {
            "Encrypt" => match Chaocipher::new(&clean_str(&self.key1), &clean_str(&self.key2)) {
                Ok(cipher) => {
                    let src = clean(&self.plaintext);
                    let mut d = vec![0u8; src.len()];
                    match cipher.encrypt(&mut d, &src) {
                        Ok(n) => helpers::output_as_block(&String::from_utf8_lossy(&d[..n])),
                        Err(e) => format!("Error: {}", e),
                    }
                }
                Err(e) => format!("Error: {}", e),
            },
            "Decrypt" => match Chaocipher::new(&clean_str(&self.key1), &clean_str(&self.key2)) {
                Ok(cipher) => {
                    let src = clean(&self.ciphertext);
                    let mut d = vec![0u8; src.len()];
                    match cipher.decrypt(&mut d, &src) {
                        Ok(n) => helpers::output_as_block(&String::from_utf8_lossy(&d[..n])),
                        Err(e) => format!("Error: {}", e),
                    }
                }
                Err(e) => format!("Error: {}", e),
            },
            "Keyed encrypt" => match Chaocipher::with_key(&clean_str(&self.key1)) {
                Ok(cipher) => {
                    let src = clean(&self.plaintext);
                    let mut d = vec![0u8; src.len()];
                    match cipher.encrypt(&mut d, &src) {
                        Ok(n) => helpers::output_as_block(&String::from_utf8_lossy(&d[..n])),
                        Err(e) => format!("Error: {}", e),
                    }
                }
                Err(e) => format!("Error: {}", e),
            },
            "Keyed decrypt" => match Chaocipher::with_key(&clean_str(&self.key1)) {
                Ok(cipher) => {
                    let src = clean(&self.ciphertext);
                    let mut d = vec![0u8; src.len()];
                    match cipher.decrypt(&mut d, &src) {
                        Ok(n) => helpers::output_as_block(&String::from_utf8_lossy(&d[..n])),
                        Err(e) => format!("Error: {}", e),
                    }
                }
                Err(e) => format!("Error: {}", e),
            },
            "Crack" => {
                let pt = clean(&self.plaintext);
                let ct = clean(&self.ciphertext);
                match find_anchor(&pt, &ct, 6).and_then(|anchor| crack(&pt, &ct, anchor)) {
                    Ok(Some(mut state)) => match state.rewind(&pt, false) {
                        Ok(_) => format!(
                            "plain:  {}\ncipher: {}",
                            state.plain_alphabet(),
                            state.cipher_alphabet()
                        ),
                        Err(e) => format!("Error: {}", e),
                    },
                    Ok(None) => "No rotor pair fits this text pair".to_string(),
                    Err(e) => format!("Error: {}", e),
                }
            }
            _ => "Not implemented".to_string(),
        };
    }
}

fn main() -> io::Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match app.input_mode {
                    InputMode::Normal => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('e') => {
                            app.input_mode = InputMode::Editing;
                        }
                        KeyCode::Char('o') => {
                            app.input_mode = InputMode::SelectingOperation;
                        }
                        KeyCode::Tab => {
                            app.focused_field = match app.focused_field {
                                FocusedField::Plaintext => FocusedField::Ciphertext,
                                FocusedField::Ciphertext => FocusedField::Key1,
                                FocusedField::Key1 => FocusedField::Key2,
                                FocusedField::Key2 => FocusedField::Plaintext,
                            };
                        }
                        KeyCode::Enter => {
                            app.run_operation();
                        }
                        _ => {}
                    },
                    InputMode::SelectingOperation => match key.code {
                        KeyCode::Esc => {
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Up => {
                            let i = match app.operation_list_state.selected() {
                                Some(i) => {
                                    if i == 0 {
                                        app.operations.len() - 1
                                    } else {
                                        i - 1
                                    }
                                }
                                None => 0,
                            };
                            app.operation_list_state.select(Some(i));
                            app.selected_operation_index = i;
                        }
                        KeyCode::Down => {
                            let i = match app.operation_list_state.selected() {
                                Some(i) => {
                                    if i >= app.operations.len() - 1 {
                                        0
                                    } else {
                                        i + 1
                                    }
                                }
                                None => 0,
                            };
                            app.operation_list_state.select(Some(i));
                            app.selected_operation_index = i;
                        }
                        KeyCode::Enter => {
                            app.input_mode = InputMode::Normal;
                        }
                        _ => {}
                    },
                    InputMode::Editing => match key.code {
                        KeyCode::Esc => {
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Char(c) => {
                            match app.focused_field {
                                FocusedField::Plaintext => app.plaintext.push(c),
                                FocusedField::Ciphertext => app.ciphertext.push(c),
                                FocusedField::Key1 => app.key1.push(c),
                                FocusedField::Key2 => app.key2.push(c),
                            }
                        }
                        KeyCode::Backspace => {
                            match app.focused_field {
                                FocusedField::Plaintext => { app.plaintext.pop(); }
                                FocusedField::Ciphertext => { app.ciphertext.pop(); }
                                FocusedField::Key1 => { app.key1.pop(); }
                                FocusedField::Key2 => { app.key2.pop(); }
                            }
                        }
                        KeyCode::Enter => {
                            app.run_operation();
                        }
                        _ => {}
                    },
                }
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let operation = app.operations[app.selected_operation_index];

    // Determine which fields this operation reads and their labels
    let field_configs: Vec<(&str, &String, FocusedField)> = match operation {
        "Encrypt" => vec![
            ("Plaintext", &app.plaintext, FocusedField::Plaintext),
            ("Plain Alphabet", &app.key1, FocusedField::Key1),
            ("Cipher Alphabet", &app.key2, FocusedField::Key2),
        ],
        "Decrypt" => vec![
            ("Ciphertext", &app.ciphertext, FocusedField::Ciphertext),
            ("Plain Alphabet", &app.key1, FocusedField::Key1),
            ("Cipher Alphabet", &app.key2, FocusedField::Key2),
        ],
        "Keyed encrypt" => vec![
            ("Plaintext", &app.plaintext, FocusedField::Plaintext),
            ("Key", &app.key1, FocusedField::Key1),
        ],
        "Keyed decrypt" => vec![
            ("Ciphertext", &app.ciphertext, FocusedField::Ciphertext),
            ("Key", &app.key1, FocusedField::Key1),
        ],
        "Crack" => vec![
            ("Plaintext", &app.plaintext, FocusedField::Plaintext),
            ("Ciphertext", &app.ciphertext, FocusedField::Ciphertext),
        ],
        _ => vec![],
    };

    let mut constraints = vec![
        Constraint::Length(3), // Operation
    ];
    for _ in 0..field_configs.len() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(4)); // Result
    constraints.push(Constraint::Length(3)); // Help

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let (msg, style) = match app.input_mode {
        InputMode::Normal => (
            vec![
                "Normal Mode".into(),
                " | ".into(),
                "q".bold(),
                " to exit, ".into(),
                "e".bold(),
                " to edit, ".into(),
                "o".bold(),
                " to select operation, ".into(),
                "TAB".bold(),
                " to switch focus, ".into(),
                "ENTER".bold(),
                " to run".into(),
            ],
            Style::default().add_modifier(Modifier::RAPID_BLINK),
        ),
        InputMode::Editing => (
            vec![
                "Editing Mode".into(),
                " | ".into(),
                "ESC".bold(),
                " to stop editing, ".into(),
                "ENTER".bold(),
                " to run".into(),
            ],
            Style::default(),
        ),
        InputMode::SelectingOperation => (
            vec![
                "Selecting Operation".into(),
                " | ".into(),
                "UP/DOWN".bold(),
                " to move, ".into(),
                "ENTER/ESC".bold(),
                " to confirm".into(),
            ],
            Style::default(),
        ),
    };
    let help_message = Paragraph::new(Line::from(msg).style(style));
    f.render_widget(help_message, chunks[chunks.len() - 1]);

    let operation_display = Paragraph::new(operation)
        .block(Block::default().borders(Borders::ALL).title("Operation (Press 'o' to change)"));
    f.render_widget(operation_display, chunks[0]);

    for (i, (label, value, field)) in field_configs.iter().enumerate() {
        let is_focused = matches!(
            (&app.focused_field, field),
            (FocusedField::Plaintext, FocusedField::Plaintext)
                | (FocusedField::Ciphertext, FocusedField::Ciphertext)
                | (FocusedField::Key1, FocusedField::Key1)
                | (FocusedField::Key2, FocusedField::Key2)
        );

        let input = Paragraph::new(value.as_str())
            .style(if is_focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            })
            .block(Block::default().borders(Borders::ALL).title(*label));
        f.render_widget(input, chunks[i + 1]);
    }

    let result_display = Paragraph::new(app.result.as_str())
        .block(Block::default().borders(Borders::ALL).title("Result"))
        .wrap(Wrap { trim: true });
    f.render_widget(result_display, chunks[chunks.len() - 2]);

    if let InputMode::SelectingOperation = app.input_mode {
        let area = centered_rect(60, 40, f.area());
        f.render_widget(Clear, area);
        let items: Vec<ListItem> = app.operations.iter().map(|i| ListItem::new(*i)).collect();
        let list = List::new(items)
            .block(Block::default().title("Select Operation").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, area, &mut app.operation_list_state);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
