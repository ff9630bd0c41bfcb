//! Line editor abstraction for the shell.
//!
//! The shell and the prompt-based path chooser read input through
//! [`LineEditor`], so they run over rustyline at a terminal and over plain
//! standard input or scripted lines everywhere else.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use exproj_foundation::{Error, ErrorKind, Result};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};

/// Result of reading a line from the editor.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Add a line to history.
    fn add_history(&mut self, line: &str);
}

impl<E: LineEditor + ?Sized> LineEditor for Box<E> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        (**self).read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        (**self).add_history(line);
    }
}

/// Words offered by tab completion.
const SHELL_KEYWORDS: &[&str] = &[
    "get", "update", "load", "save", "tree", "find", "open", "new", "create", "rename", "delete",
    "prop", "order", "attach", "detach", "timer", "script", "help", "quit", "add", "retype",
    "expand", "remove", "up", "down", "scene", "actor", "level", "camera", "component", "system",
    "postprocessor", "particle", "screenelement", "string", "number", "boolean", "vector",
    "object",
];

/// Helper for rustyline that provides completion, hints, prompt coloring, and
/// multi-line JSON input.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct ShellHelper {
    #[rustyline(Completer)]
    completer: ShellCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: BracketValidator,
}

impl Highlighter for ShellHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        false
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completes shell words, and file paths after `open`/`new`.
struct ShellCompleter {
    file_completer: FilenameCompleter,
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        if head.starts_with("open ") || head.starts_with("new ") {
            return self.file_completer.complete(line, pos, ctx);
        }

        let start = word_start(head);
        let word = &head[start..];
        let candidates = SHELL_KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(word))
            .map(|kw| Pair {
                display: (*kw).to_string(),
                replacement: (*kw).to_string(),
            })
            .collect();

        Ok((start, candidates))
    }
}

/// Byte offset where the last word of `head` begins.
fn word_start(head: &str) -> usize {
    head.char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// Keeps reading lines while braces or brackets are open, so JSON for
/// `update` can span several lines.
#[derive(Default)]
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_balanced(ctx.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

/// Returns true if every `{` and `[` outside string literals is closed.
#[must_use]
pub fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '[' | '{' if !in_string => depth += 1,
            ']' | '}' if !in_string => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && !in_string
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?
            .build();

        let helper = ShellHelper {
            completer: ShellCompleter {
                file_completer: FilenameCompleter::new(),
            },
            hinter: HistoryHinter::new(),
            validator: BracketValidator,
        };

        let mut editor = Editor::with_config(config)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::Internal(e.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

/// Plain line reader over standard input, with prompts written to stdout.
///
/// Used where no terminal editor is wanted, and by the path chooser, which
/// runs on the service thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdinEditor;

impl LineEditor for StdinEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        prompted_line(prompt, |line| io::stdin().read_line(line))
    }

    fn add_history(&mut self, _line: &str) {}
}

/// Line reader over any buffered input.
pub struct ReaderEditor<R> {
    input: R,
}

impl<R: BufRead> ReaderEditor<R> {
    /// Creates an editor reading from `input`.
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineEditor for ReaderEditor<R> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        prompted_line(prompt, |line| self.input.read_line(line))
    }

    fn add_history(&mut self, _line: &str) {}
}

fn prompted_line(
    prompt: &str,
    read: impl FnOnce(&mut String) -> io::Result<usize>,
) -> Result<ReadResult> {
    let mut stdout = io::stdout();
    let _ = write!(stdout, "{prompt}");
    let _ = stdout.flush();

    let mut line = String::new();
    let count = read(&mut line).map_err(|e| Error::io(format!("failed to read input: {e}")))?;
    if count == 0 {
        return Ok(ReadResult::Eof);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(ReadResult::Line(line))
}
