// SPDX-License-Identifier: MIT
//
// kasa — a small modal terminal text editor.
//
// This is the main binary that wires together the two crates:
//
//   kasa-term   → raw mode, escape sequences, key decoding, resize signal
//   kasa-editor → buffer, modes, undo, selection, syntax, commands
//
// Each keypress flows through:
//
//   stdin → Terminal::read_key → Editor::handle_key → buffer mutation
//   refresh_screen → frame buffer → one write to stdout
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ gutter + text area           │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status bar (reverse video)   │  ← 1 row
//   ├──────────────────────────────┤
//   │ message / prompt line        │  ← 1 row
//   └──────────────────────────────┘
//
// The whole frame is rebuilt into a Vec<u8> and flushed in a single write,
// so a slow terminal never shows a half-drawn screen.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use unicode_width::UnicodeWidthChar;

use kasa_editor::command;
use kasa_editor::config::{Config, LineNumbers};
use kasa_editor::search::SearchSession;
use kasa_editor::syntax::Highlight;
use kasa_editor::{Action, CommandOutcome, Editor, Mode, Position};
use kasa_term::{ansi, Key, Terminal};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Splash screen row where the version line goes; the logo starts below it.
const SPLASH_TOP: usize = 4;

const LOGO: [&str; 7] = [
    r"  _                       ",
    r" | | __  __ _  ___  __ _  ",
    r" | |/ / / _` |/ __|/ _` | ",
    r" |   < | (_| |\__ \ (_| | ",
    r" |_|\_\ \__,_||___/\__,_| ",
    r"                          ",
    r"      + a text editor +   ",
];

const HELP_TEXT: &str = concat!(
    "kasa - a small modal text editor v",
    env!("CARGO_PKG_VERSION"),
    "\n\n",
    "Usage: kasa [options] [file]\n\n",
    "Options:\n",
    "  -h, --help     Show this help message\n",
    "  -v, --version  Show version information\n\n",
    "Commands:\n",
    "  Normal Mode:\n",
    "    i              Enter insert mode\n",
    "    v              Enter visual mode (character)\n",
    "    V              Enter visual mode (line)\n",
    "    h,j,k,l        Move cursor (or arrow keys)\n",
    "    0              Beginning of line\n",
    "    $              End of line\n",
    "    w              Next word\n",
    "    b              Previous word\n",
    "    :w             Save file\n",
    "    :q             Quit (fails if unsaved)\n",
    "    :q!            Force quit\n",
    "    :wq            Save and quit\n",
    "    :<number>      Jump to line number\n",
    "    /              Search\n",
    "    u              Undo\n",
    "    Ctrl-R         Redo\n",
    "    dd             Delete line\n",
    "    yy             Yank line\n",
    "    p              Paste after\n",
    "    P              Paste before\n",
    "    r              Replace character\n",
    "    J              Join lines\n",
    "    tt             Jump to top\n",
    "    bb             Jump to bottom\n",
    "    Ctrl-F         Page forward\n",
    "    Ctrl-B         Page backward\n\n",
    "  Visual Mode:\n",
    "    y              Yank selection\n",
    "    d,x            Delete/cut selection\n",
    "    c              Change selection\n",
    "    Esc            Exit visual mode\n\n",
    "  Insert Mode:\n",
    "    Esc            Return to normal mode\n",
);

fn main() {
    let mut path: Option<PathBuf> = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print!("{HELP_TEXT}");
                return;
            }
            "-v" | "--version" => {
                println!("kasa {VERSION}");
                return;
            }
            other => path = Some(PathBuf::from(other)),
        }
    }

    let config = Config::load();
    let mut editor = Editor::new(&config);
    if let Some(ref p) = path {
        if let Err(err) = editor.open(p) {
            eprintln!("kasa: {}: {err}", p.display());
            process::exit(1);
        }
    }
    editor.set_status(":h = help | :w = write | :q = quit | / = search");

    let mut terminal = match Terminal::new() {
        Ok(t) => t,
        Err(err) => {
            eprintln!("kasa: {err}");
            process::exit(1);
        }
    };
    if let Err(err) = terminal.enter(config.fg_color, config.bg_color) {
        eprintln!("kasa: failed to initialize terminal: {err}");
        process::exit(1);
    }

    let result = run(&mut terminal, &mut editor);

    // Restore before reporting, or the message lands on the alt screen.
    let restore = terminal.leave();
    if let Err(err) = result {
        eprintln!("kasa: {err}");
        process::exit(1);
    }
    if let Err(err) = restore {
        eprintln!("kasa: terminal restore failed: {err}");
    }
}

/// The main loop: draw a frame, wait for a key, dispatch it.
fn run(term: &mut Terminal, ed: &mut Editor) -> io::Result<()> {
    loop {
        refresh_screen(term, ed)?;
        match term.read_key()? {
            Key::Resize => {
                term.refresh_size()?;
            }
            key => match ed.handle_key(key) {
                Action::None => {}
                Action::OpenCommand => {
                    if run_colon(term, ed)? {
                        return Ok(());
                    }
                }
                Action::OpenSearch => run_search(term, ed)?,
            },
        }
    }
}

// ─── Prompts ────────────────────────────────────────────────────────────────

/// Run a one-line prompt on the message bar.
///
/// Returns `Some(input)` on Enter (non-empty), `None` on Escape. `on_key`
/// fires after every keystroke with the input so far — incremental search
/// hangs off this hook.
fn prompt<F>(
    term: &mut Terminal,
    ed: &mut Editor,
    prefix: &str,
    suffix: &str,
    mut on_key: F,
) -> io::Result<Option<String>>
where
    F: FnMut(&mut Editor, &str, Key),
{
    let mut input = String::new();
    loop {
        ed.set_status(format!("{prefix}{input}{suffix}"));
        refresh_screen(term, ed)?;

        let key = term.read_key()?;
        match key {
            Key::Resize => {
                term.refresh_size()?;
                continue;
            }
            Key::Backspace | Key::Ctrl('h') => {
                input.pop();
            }
            Key::Escape => {
                ed.set_status("");
                on_key(ed, &input, key);
                return Ok(None);
            }
            Key::Enter => {
                if !input.is_empty() {
                    ed.set_status("");
                    on_key(ed, &input, key);
                    return Ok(Some(input));
                }
            }
            Key::Char(c) if !c.is_control() => input.push(c),
            _ => {}
        }
        on_key(ed, &input, key);
    }
}

/// The `:` prompt. Returns `true` when the editor should exit.
fn run_colon(term: &mut Terminal, ed: &mut Editor) -> io::Result<bool> {
    let Some(input) = prompt(term, ed, ":", "", |_, _, _| {})? else {
        return Ok(false);
    };
    match ed.execute_command(&command::parse(&input)) {
        CommandOutcome::Continue => Ok(false),
        CommandOutcome::Quit => Ok(true),
        CommandOutcome::NeedsFilename { then_quit } => {
            let name = prompt(term, ed, "Save as: ", " (ESC to cancel)", |_, _, _| {})?;
            match name {
                Some(name) => Ok(ed.save_as(&name) && then_quit),
                None => {
                    ed.set_status("Save Aborted");
                    Ok(false)
                }
            }
        }
    }
}

/// The `/` prompt: incremental search with arrow-key stepping. Escape
/// restores the cursor and scroll position from before the search.
fn run_search(term: &mut Terminal, ed: &mut Editor) -> io::Result<()> {
    let mut session = SearchSession::new(ed.cx, ed.cy, ed.rowoff, ed.coloff);

    let accepted = prompt(
        term,
        ed,
        "/",
        " (ESC to cancel, arrows to step)",
        |ed, query, key| {
            session.clear_match_highlight(&mut ed.buffer);
            match key {
                Key::Enter | Key::Escape => return,
                Key::Right | Key::Down => session.set_direction(true),
                Key::Left | Key::Up => session.set_direction(false),
                _ => session.restart(),
            }
            if let Some((cx, cy)) = session.find(&mut ed.buffer, query) {
                ed.cx = cx;
                ed.cy = cy;
                // Force the scroll clamp to bring the match to the top.
                ed.rowoff = ed.buffer.num_rows();
            }
        },
    )?;

    if accepted.is_none() {
        let (cx, cy, rowoff, coloff) = session.saved();
        ed.cx = cx;
        ed.cy = cy;
        ed.rowoff = rowoff;
        ed.coloff = coloff;
    }
    Ok(())
}

// ─── Rendering ──────────────────────────────────────────────────────────────

/// Rebuild and flush one frame.
fn refresh_screen(term: &mut Terminal, ed: &mut Editor) -> io::Result<()> {
    let size = term.size();
    ed.set_viewport(size.rows as usize, size.cols as usize);
    ed.scroll();

    let mut frame: Vec<u8> = Vec::with_capacity(8 * 1024);
    ansi::cursor_hide(&mut frame)?;
    ansi::cursor_to(&mut frame, 0, 0)?;

    draw_rows(&mut frame, ed)?;
    draw_status_bar(&mut frame, ed)?;
    draw_message_bar(&mut frame, ed)?;

    let x = ed.rx - ed.coloff + ed.gutter_width();
    let y = ed.cy - ed.rowoff;
    ansi::cursor_to(&mut frame, x as u16, y as u16)?;
    ansi::cursor_show(&mut frame)?;

    let stdout = io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(&frame)?;
    lock.flush()
}

fn draw_rows(frame: &mut Vec<u8>, ed: &Editor) -> io::Result<()> {
    let text_cols = ed.screen_cols.saturating_sub(ed.gutter_width());

    for y in 0..ed.screen_rows {
        let filerow = y + ed.rowoff;
        if filerow >= ed.buffer.num_rows() {
            if ed.gutter_width() > 0 {
                draw_line_number(frame, ed, filerow)?;
            } else {
                frame.write_all(b"~")?;
            }
            if ed.buffer.num_rows() == 0 {
                draw_splash_line(frame, ed, y, text_cols)?;
            }
        } else {
            draw_line_number(frame, ed, filerow)?;
            draw_text_row(frame, ed, filerow, text_cols)?;
        }
        ansi::clear_line(frame)?;
        frame.write_all(b"\r\n")?;
    }
    Ok(())
}

/// Version banner and logo, centered in the text area, on an empty buffer.
fn draw_splash_line(frame: &mut Vec<u8>, ed: &Editor, y: usize, width: usize) -> io::Result<()> {
    let line = if y == SPLASH_TOP {
        format!("KASA -- version {VERSION}")
    } else if y > SPLASH_TOP && y <= SPLASH_TOP + LOGO.len() {
        LOGO[y - SPLASH_TOP - 1].to_string()
    } else {
        return Ok(());
    };

    let shown: String = line.chars().take(width).collect();
    let mut padding = width.saturating_sub(shown.chars().count()) / 2;
    // The tilde already occupies the first cell when the gutter is off.
    if padding > 0 && ed.gutter_width() == 0 {
        padding -= 1;
    }
    for _ in 0..padding {
        frame.write_all(b" ")?;
    }
    frame.write_all(shown.as_bytes())
}

fn draw_line_number(frame: &mut Vec<u8>, ed: &Editor, filerow: usize) -> io::Result<()> {
    let number = match ed.line_numbers {
        LineNumbers::Off => return Ok(()),
        LineNumbers::Absolute => filerow + 1,
        LineNumbers::Relative => {
            if filerow == ed.cy {
                1
            } else {
                filerow.abs_diff(ed.cy) + 1
            }
        }
    };
    ansi::sgr(frame, 90)?;
    write!(frame, "{number:>3} ")?;
    ansi::fg_default(frame)
}

/// One row of text: the visible cell window, with syntax colors emitted
/// only on change, reverse video over the visual selection, and control
/// characters shown as reversed placeholders.
fn draw_text_row(frame: &mut Vec<u8>, ed: &Editor, filerow: usize, text_cols: usize) -> io::Result<()> {
    let Some(row) = ed.buffer.row(filerow) else {
        return Ok(());
    };
    let cursor = Position::new(ed.cy, ed.cx);
    let in_visual = ed.mode.is_visual();

    let mut current_color: Option<u8> = None;
    let mut cell = 0usize;

    for (j, ch) in row.rendered.chars().enumerate() {
        let width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if cell + width <= ed.coloff {
            cell += width;
            continue;
        }
        if cell >= ed.coloff + text_cols {
            break;
        }

        let selected = in_visual
            && ed
                .selection
                .is_some_and(|sel| sel.is_selected(&ed.buffer, cursor, filerow, cell));
        if selected {
            ansi::reverse_on(frame)?;
        }

        if ch.is_control() {
            let sym = if (ch as u32) <= 26 {
                (b'@' + ch as u8) as char
            } else {
                '?'
            };
            ansi::reverse_on(frame)?;
            write!(frame, "{sym}")?;
            ansi::reset(frame)?;
            if let Some(color) = current_color {
                ansi::sgr(frame, color)?;
            }
        } else {
            let hl = row.highlight.get(j).copied().unwrap_or(Highlight::Normal);
            if hl == Highlight::Normal {
                if current_color.is_some() {
                    ansi::fg_default(frame)?;
                    current_color = None;
                }
            } else {
                let color = hl.color();
                if current_color != Some(color) {
                    current_color = Some(color);
                    ansi::sgr(frame, color)?;
                }
            }
            write!(frame, "{ch}")?;
        }

        if selected {
            ansi::reverse_off(frame)?;
        }
        cell += width;
    }
    ansi::fg_default(frame)
}

fn draw_status_bar(frame: &mut Vec<u8>, ed: &Editor) -> io::Result<()> {
    ansi::reverse_on(frame)?;

    let name = ed
        .buffer
        .filename()
        .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string());
    let shown: String = name.chars().take(20).collect();
    let left = format!(
        "{shown} - {} lines {}",
        ed.buffer.num_rows(),
        if ed.buffer.is_dirty() { "(modified)" } else { "" }
    );
    let right = format!(
        "{} | {}/{}",
        ed.buffer.language().map_or("no ft", |lang| lang.name),
        ed.cy + 1,
        ed.buffer.num_rows()
    );

    let cols = ed.screen_cols;
    let mut len = left.chars().count().min(cols);
    let truncated: String = left.chars().take(len).collect();
    frame.write_all(truncated.as_bytes())?;

    let rlen = right.chars().count();
    while len < cols {
        if cols - len == rlen {
            frame.write_all(right.as_bytes())?;
            break;
        }
        frame.write_all(b" ")?;
        len += 1;
    }

    ansi::reset(frame)?;
    frame.write_all(b"\r\n")
}

fn draw_message_bar(frame: &mut Vec<u8>, ed: &Editor) -> io::Result<()> {
    ansi::clear_line(frame)?;
    if let Some(msg) = ed.status() {
        let shown: String = msg.chars().take(ed.screen_cols).collect();
        frame.write_all(shown.as_bytes())?;
    }
    Ok(())
}
