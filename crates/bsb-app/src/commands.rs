//! Reader commands typed at the prompt

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    /// Select a book by id, e.g. `book JHN`
    Book(String),
    /// Select a chapter of the current book
    Chapter(u32),
    /// Quick-jump text such as `Jn 3`
    Jump(String),
    Books,
    Play,
    Pause,
    Speed,
    Font,
    Theme,
    /// Show or hide footnotes
    Notes,
    /// Print the shareable query for the current reference
    Link,
    Status,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  n, next            next chapter
  p, prev            previous chapter
  b, book <ID>       select a book by id (e.g. book JHN)
  c, chapter <N>     select a chapter of the current book
  j, jump <TEXT>     quick jump (e.g. jump Jn 3); plain text also jumps
  books              list books
  play, pause        control chapter audio
  speed              cycle playback speed
  font               cycle font size
  theme              cycle theme
  notes              show or hide footnotes
  link               print the shareable reference query
  s, status          show position, audio and settings
  h, help            this help
  q, quit            exit";

/// Parse a line. Anything that is not a command is treated as quick-jump text.
pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_lowercase().as_str(), rest.is_empty()) {
        ("n" | "next", true) => Command::Next,
        ("p" | "prev" | "previous", true) => Command::Previous,
        ("books", true) => Command::Books,
        ("play", true) => Command::Play,
        ("pause", true) => Command::Pause,
        ("speed", true) => Command::Speed,
        ("font", true) => Command::Font,
        ("theme", true) => Command::Theme,
        ("notes", true) => Command::Notes,
        ("link" | "share", true) => Command::Link,
        ("s" | "status", true) => Command::Status,
        ("h" | "help" | "?", true) => Command::Help,
        ("q" | "quit" | "exit", true) => Command::Quit,
        ("b" | "book", false) => Command::Book(rest.to_uppercase()),
        ("b" | "book", true) => Command::Invalid("book needs an id".to_string()),
        ("c" | "chapter", _) => match rest.parse::<u32>() {
            Ok(chapter) if chapter > 0 => Command::Chapter(chapter),
            _ => Command::Invalid(format!("not a chapter number: '{}'", rest)),
        },
        ("j" | "jump", false) => Command::Jump(rest.to_string()),
        ("j" | "jump", true) => Command::Invalid("jump needs a reference".to_string()),
        _ => Command::Jump(line.to_string()),
    }
}
