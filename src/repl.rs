//! Line-oriented terminal front end.
//!
//! Plain lines are answers for the current group. Lines starting with `:`
//! are commands; `:help` lists them.

use crate::errors::QuizError;
use crate::quiz::engine::QuizEngine;
use crate::quiz::hint::{HintError, HintLevel, HintView};
use crate::quiz::message::{MessageKind, MessageSlot};
use crate::quiz::progress::SubmitOutcome;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(String),
    Hint,
    More,
    Full,
    Reveal,
    Close,
    Group(String),
    Next,
    Filter(String),
    Groups,
    Filters,
    Status,
    Found,
    ResetGroup,
    ResetAll,
    Start,
    Pause,
    Summary,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix(':') else {
            return Command::Answer(trimmed.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match name.to_lowercase().as_str() {
            "hint" | "h" => Command::Hint,
            "more" | "m" => Command::More,
            "full" => Command::Full,
            "reveal" => Command::Reveal,
            "close" => Command::Close,
            "group" | "g" if !arg.is_empty() => Command::Group(arg.to_string()),
            "next" | "n" => Command::Next,
            "filter" | "f" => Command::Filter(arg.to_string()),
            "groups" => Command::Groups,
            "filters" => Command::Filters,
            "status" | "s" => Command::Status,
            "found" => Command::Found,
            "reset" if arg.eq_ignore_ascii_case("all") => Command::ResetAll,
            "reset" => Command::ResetGroup,
            "start" => Command::Start,
            "pause" => Command::Pause,
            "summary" => Command::Summary,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}

/// What one command produced: lines to print and an optional transient message.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub flash: Option<(MessageKind, String)>,
    pub quit: bool,
}

impl Reply {
    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    fn flash(mut self, kind: MessageKind, text: impl Into<String>) -> Self {
        self.flash = Some((kind, text.into()));
        self
    }
}

const HELP: &[&str] = &[
    "type a name to answer for the current group",
    ":hint      open a hint (first two letters)",
    ":more      reveal one more letter",
    ":full      show the whole name",
    ":reveal    count the hinted name as found",
    ":close     close the hint",
    ":group X   switch to group X",
    ":next      next group",
    ":filter X  restrict to a region (:filter all to clear)",
    ":groups :filters :status :found :summary",
    ":reset     reset this group (:reset all for everything)",
    ":start :pause  session control",
    ":quit",
];

fn hint_line(view: &HintView) -> String {
    format!("hint: {} ({}/{})", view.masked, view.revealed, view.len)
}

fn hint_error_reply(err: HintError) -> Reply {
    Reply::default().flash(MessageKind::Error, err.to_string())
}

fn quiz_error_reply(err: QuizError) -> Reply {
    Reply::default().flash(MessageKind::Error, err.to_string())
}

fn level_marker(level: HintLevel) -> &'static str {
    match level {
        HintLevel::None => "",
        HintLevel::Light => " (light hint)",
        HintLevel::Heavy => " (heavy hint)",
    }
}

/// Applies one command to the engine.
pub fn handle(engine: &mut QuizEngine, command: Command) -> Reply {
    match command {
        Command::Answer(text) => answer(engine, &text),
        Command::Hint => match engine.open_hint() {
            Ok(view) => Reply::default().line(hint_line(&view)),
            Err(err) => hint_error_reply(err),
        },
        Command::More => match engine.reveal_next_letter() {
            Ok(view) => Reply::default().line(hint_line(&view)),
            Err(err) => hint_error_reply(err),
        },
        Command::Full => match engine.reveal_full() {
            Ok(view) => Reply::default().line(hint_line(&view)),
            Err(err) => hint_error_reply(err),
        },
        Command::Reveal => match engine.direct_reveal() {
            Ok(name) => completion_notes(engine, Reply::default())
                .flash(MessageKind::Info, format!("revealed: {}", name)),
            Err(err) => hint_error_reply(err),
        },
        Command::Close => {
            if engine.close_hint() {
                Reply::default().flash(MessageKind::Info, "hint closed")
            } else {
                hint_error_reply(HintError::NotActive)
            }
        }
        Command::Group(key) => match engine.change_group(&key) {
            Ok(()) => status(engine),
            Err(err) => quiz_error_reply(err),
        },
        Command::Next => match engine.next_group() {
            Some(_) => status(engine),
            None => Reply::default().flash(MessageKind::Error, "no groups under this filter"),
        },
        Command::Filter(tag) => match engine.change_filter(&tag) {
            Ok(()) => status(engine),
            Err(err) => quiz_error_reply(err),
        },
        Command::Groups => {
            let groups: Vec<String> = engine
                .group_overview()
                .iter()
                .map(|row| {
                    let mark = if row.is_complete() { "*" } else { "" };
                    let cell = format!("{}{} {}/{}", row.group, mark, row.found, row.total);
                    if row.current {
                        format!("[{}]", cell)
                    } else {
                        cell
                    }
                })
                .collect();
            Reply::default().line(groups.join("  "))
        }
        Command::Filters => {
            let filters: Vec<String> = engine
                .available_filters()
                .iter()
                .map(|filter| filter.as_tag().to_string())
                .collect();
            Reply::default().line(filters.join(", "))
        }
        Command::Status => status(engine),
        Command::Found => {
            let mut reply = Reply::default();
            for record in engine.found_in_group() {
                let country = engine
                    .catalog()
                    .get(&record.canonical_name)
                    .and_then(|item| item.country())
                    .map(|country| format!(", {}", country))
                    .unwrap_or_default();
                reply = reply.line(format!(
                    "  {}{}{}",
                    record.canonical_name,
                    country,
                    level_marker(record.hint_level)
                ));
            }
            if reply.lines.is_empty() {
                reply = reply.line("nothing found in this group yet");
            }
            reply
        }
        Command::ResetGroup => {
            let removed = engine.reset_group();
            Reply::default().flash(
                MessageKind::Info,
                format!("group {} reset ({} removed)", engine.current_group(), removed.len()),
            )
        }
        Command::ResetAll => {
            engine.reset_all();
            Reply::default().flash(MessageKind::Info, "all progress cleared")
        }
        Command::Start => {
            engine.start_session();
            status(engine).flash(MessageKind::Info, "session started")
        }
        Command::Pause => {
            engine.pause_session();
            Reply::default().flash(MessageKind::Info, "session paused")
        }
        Command::Summary => {
            let summary = engine.summary();
            Reply::default()
                .line(format!(
                    "{}/{} found: {} unaided, {} light, {} heavy",
                    summary.total_found,
                    summary.total_candidates,
                    summary.unaided,
                    summary.light,
                    summary.heavy
                ))
                .line(format!(
                    "score {:.1} ({}%), {}",
                    summary.effective_points, summary.effective_percentage, summary.performance
                ))
        }
        Command::Help => HELP
            .iter()
            .fold(Reply::default(), |reply, line| reply.line(*line)),
        Command::Quit => Reply {
            quit: true,
            ..Reply::default()
        },
        Command::Unknown(raw) => {
            Reply::default().flash(MessageKind::Error, format!("unknown command: {}", raw))
        }
    }
}

fn answer(engine: &mut QuizEngine, text: &str) -> Reply {
    match engine.submit(text) {
        SubmitOutcome::Ignored => Reply::default(),
        SubmitOutcome::AlreadyFound { name } => {
            Reply::default().flash(MessageKind::Info, format!("already found: {}", name))
        }
        SubmitOutcome::Matched { name, hint_level } => completion_notes(engine, Reply::default())
            .flash(
                MessageKind::Success,
                format!("correct: {}{}", name, level_marker(hint_level)),
            ),
        SubmitOutcome::NoMatch => Reply::default().flash(MessageKind::Error, "no match"),
    }
}

fn completion_notes(engine: &QuizEngine, mut reply: Reply) -> Reply {
    if engine.is_group_complete(engine.current_group()) {
        reply = reply.line(format!("group {} complete", engine.current_group()));
    }
    if engine.is_filter_complete(engine.current_filter().as_tag()) {
        reply = reply.line(format!("all of {} complete", engine.current_filter()));
    }
    reply
}

fn status(engine: &QuizEngine) -> Reply {
    let (found, total) = engine.group_progress(engine.current_group());
    let (filter_found, filter_total) = engine.filter_progress(engine.current_filter().as_tag());
    let session = match (engine.is_session_active(), engine.session_started_at()) {
        (true, Some(started)) => format!("active since {}", started.format("%H:%M")),
        (true, None) => "active".to_string(),
        (false, _) => "paused".to_string(),
    };
    let mut reply = Reply::default().line(format!(
        "group {} {}/{} | {} {}/{} | session {}",
        engine.current_group(),
        found,
        total,
        engine.current_filter(),
        filter_found,
        filter_total,
        session
    ));
    if let Some(view) = engine.hint_view() {
        reply = reply.line(hint_line(&view));
    }
    reply
}

fn prompt(engine: &QuizEngine, message: &MessageSlot) -> String {
    let (found, total) = engine.group_progress(engine.current_group());
    let note = message
        .current()
        .map(|m| {
            if m.fading {
                format!(" ({})", m.text)
            } else {
                format!(" [{}]", m.text)
            }
        })
        .unwrap_or_default();
    format!("{} {}/{}{}> ", engine.current_group(), found, total, note)
}

/// Drives `engine` from `reader` until EOF or `:quit`.
pub async fn run<R, W>(engine: &mut QuizEngine, reader: R, writer: W) -> Result<(), QuizError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut writer = BufWriter::new(writer);
    let mut message = MessageSlot::new();

    for line in status(engine).lines {
        writer.write_all(format!("{}\n", line).as_bytes()).await?;
    }
    writer.write_all(prompt(engine, &message).as_bytes()).await?;
    writer.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = handle(engine, Command::parse(&line));
        for out in &reply.lines {
            writer.write_all(format!("{}\n", out).as_bytes()).await?;
        }
        if let Some((kind, text)) = reply.flash {
            writer.write_all(format!("{}\n", text).as_bytes()).await?;
            message.show(kind, text);
        }
        if reply.quit {
            break;
        }
        writer.write_all(prompt(engine, &message).as_bytes()).await?;
        writer.flush().await?;
    }
    writer.flush().await?;
    Ok(())
}

pub async fn run_stdio(engine: &mut QuizEngine) -> Result<(), QuizError> {
    let stdin = BufReader::new(tokio::io::stdin());
    run(engine, stdin, tokio::io::stdout()).await
}
