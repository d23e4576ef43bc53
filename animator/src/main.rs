//! Console TUI front end for the DAP virtual machine's cooperative
//! trace/command protocol (spec's `-console` mode). The VM runs on its own
//! thread via [`dap_toolchain::vm::animator::spawn`]; this binary is the
//! observer task, rendering the accumulated trace and turning keystrokes
//! into protocol commands.

use std::io::{self, stdout};
use std::panic;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;

use dap_toolchain::assembler::assemble;
use dap_toolchain::compiler::compile_source;
use dap_toolchain::vm::animator::{self, AnimatorHandle};
use dap_toolchain::vm::trace::{Command, LogEvent, Value};

#[derive(Parser)]
#[command(name = "dap-animator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Console front end for stepping a DAP program through the VM's trace protocol")]
struct Args {
    /// `.dap` source file to run.
    source: PathBuf,

    /// Per-window instruction budget before the VM reports budget exhaustion.
    #[arg(long, default_value_t = 100_000)]
    steps: usize,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("dap-animator: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let source = std::fs::read_to_string(&args.source).map_err(|e| e.to_string())?;
    let unit = compile_source(&source).map_err(|e| e.to_string())?;
    let assembled = assemble(&unit.lines);
    let handle = animator::spawn(
        assembled.bytecode,
        source,
        unit.symbols.into_vec(),
        unit.assignments,
        args.steps,
    );

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    enable_raw_mode().map_err(|e| e.to_string())?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture).map_err(|e| e.to_string())?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend).map_err(|e| e.to_string())?;

    let result = drive(&mut terminal, handle);

    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = terminal.show_cursor();
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    /// Waiting for the VM's first reply; no input accepted yet.
    None,
    /// The VM is suspended on INPI/INPC/INPB; typed text becomes `Command::Input`.
    AwaitingInput,
    /// The VM suspended on budget exhaustion, a runtime error, or exit;
    /// only single-key c/r/q are accepted.
    AwaitingChoice,
}

struct App {
    handle: AnimatorHandle,
    trace: Vec<String>,
    input_buf: String,
    prompt: Prompt,
    quit: bool,
    started: bool,
}

impl App {
    fn new(handle: AnimatorHandle) -> Self {
        App { handle, trace: Vec::new(), input_buf: String::new(), prompt: Prompt::None, quit: false, started: false }
    }

    fn absorb(&mut self, batch: Vec<LogEvent>) {
        for event in batch {
            match event {
                LogEvent::Program(_) | LogEvent::Symbols(_) | LogEvent::Assignments(_) => {
                    self.trace.push("program loaded".into());
                    if !self.started {
                        self.started = true;
                        let _ = self.handle.commands.send(Command::Restart);
                    }
                }
                LogEvent::Line(n) => self.trace.push(format!("line {n}")),
                LogEvent::Stored(v) => self.trace.push(format!("  := {}", display(&v))),
                LogEvent::Output(v) => self.trace.push(format!("  > {}", display(&v))),
                LogEvent::AwaitingInput => {
                    self.trace.push("(awaiting input)".into());
                    self.prompt = Prompt::AwaitingInput;
                }
                LogEvent::BudgetExhausted => {
                    self.trace.push("(budget exhausted)".into());
                    self.prompt = Prompt::AwaitingChoice;
                }
                LogEvent::RuntimeError(msg) => {
                    self.trace.push(format!("(error) {msg}"));
                    self.prompt = Prompt::AwaitingChoice;
                }
                LogEvent::Done => {
                    self.trace.push("(done)".into());
                    self.prompt = Prompt::AwaitingChoice;
                }
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match (self.prompt, code) {
            (Prompt::AwaitingInput, KeyCode::Enter) => {
                let text = std::mem::take(&mut self.input_buf);
                let _ = self.handle.commands.send(Command::Input(text));
                self.prompt = Prompt::None;
            }
            (Prompt::AwaitingInput, KeyCode::Char(c)) => self.input_buf.push(c),
            (Prompt::AwaitingInput, KeyCode::Backspace) => {
                self.input_buf.pop();
            }
            (Prompt::AwaitingChoice, KeyCode::Char('c')) => {
                let _ = self.handle.commands.send(Command::Continue);
                self.prompt = Prompt::None;
            }
            (Prompt::AwaitingChoice, KeyCode::Char('r')) => {
                let _ = self.handle.commands.send(Command::Restart);
                self.prompt = Prompt::None;
            }
            (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => {
                let _ = self.handle.commands.send(Command::Terminate);
                self.quit = true;
            }
            _ => {}
        }
    }
}

fn display(v: &Value) -> String {
    match v {
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Str(s) => s.clone(),
    }
}

fn drive(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, handle: AnimatorHandle) -> Result<(), String> {
    let _ = handle.commands.send(Command::Handshake);
    let mut app = App::new(handle);

    loop {
        terminal.draw(|frame| draw(frame, &app)).map_err(|e| e.to_string())?;

        if let Ok(batch) = app.handle.log.try_recv() {
            app.absorb(batch);
        }

        if event::poll(Duration::from_millis(50)).map_err(|e| e.to_string())? {
            if let Event::Key(key) = event::read().map_err(|e| e.to_string())? {
                app.handle_key(key.code);
            }
        }

        if app.quit {
            break;
        }
    }

    let _ = app.handle.join.join();
    Ok(())
}

fn draw(frame: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(frame.area());

    let lines: Vec<Line> = app.trace.iter().map(|s| Line::from(s.as_str())).collect();
    let trace = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("trace"));
    frame.render_widget(trace, chunks[0]);

    let (prompt_text, style) = match app.prompt {
        Prompt::None => ("(running)".to_string(), Style::default().fg(Color::DarkGray)),
        Prompt::AwaitingInput => (format!("input> {}", app.input_buf), Style::default().fg(Color::Yellow)),
        Prompt::AwaitingChoice => ("[c]ontinue  [r]estart  [q]uit".to_string(), Style::default().fg(Color::Cyan)),
    };
    let status = Paragraph::new(prompt_text).style(style).block(Block::default().borders(Borders::ALL).title("command"));
    frame.render_widget(status, chunks[1]);
}
