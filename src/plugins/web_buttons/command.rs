use crate::common::query::{is_http_url, rebuild_query, tokenize_query};

/// Placeholder for the URL of the browser tab the host captured.
pub const CAPTURE_TOKEN: &str = ":cap";
/// Lets `add` replace an existing button.
pub const FORCE_FLAG: &str = "--force";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowCommand {
    Update,
    AutoUpdate,
    NoAutoUpdate,
    Prereleases,
    NoPrereleases,
}

impl WorkflowCommand {
    pub const ALL: [WorkflowCommand; 5] = [
        WorkflowCommand::Update,
        WorkflowCommand::AutoUpdate,
        WorkflowCommand::NoAutoUpdate,
        WorkflowCommand::Prereleases,
        WorkflowCommand::NoPrereleases,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            WorkflowCommand::Update => "workflow:update",
            WorkflowCommand::AutoUpdate => "workflow:autoupdate",
            WorkflowCommand::NoAutoUpdate => "workflow:noautoupdate",
            WorkflowCommand::Prereleases => "workflow:prereleases",
            WorkflowCommand::NoPrereleases => "workflow:noprereleases",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.keyword().eq_ignore_ascii_case(word))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Add,
    Adh,
    Adc,
    Adb,
    Mode,
    Remove,
    List,
    Open,
    OpenUrl,
    Workflow(WorkflowCommand),
    Search,
}

impl Verb {
    /// Verbs selected by a leading keyword, in help order.
    pub const KEYWORDS: [Verb; 8] = [
        Verb::Add,
        Verb::Adh,
        Verb::Adc,
        Verb::Adb,
        Verb::Mode,
        Verb::Remove,
        Verb::List,
        Verb::Open,
    ];

    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Verb::Add => Some("add"),
            Verb::Adh => Some("adh"),
            Verb::Adc => Some("adc"),
            Verb::Adb => Some("adb"),
            Verb::Mode => Some("mode"),
            Verb::Remove => Some("remove"),
            Verb::List => Some("list"),
            Verb::Open => Some("open"),
            Verb::Workflow(w) => Some(w.keyword()),
            Verb::OpenUrl | Verb::Search => None,
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        Self::KEYWORDS
            .into_iter()
            .find(|v| v.keyword().is_some_and(|k| k.eq_ignore_ascii_case(word)))
            .or_else(|| WorkflowCommand::from_keyword(word).map(Verb::Workflow))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub verb: Verb,
    pub args: Vec<String>,
}

impl ParsedQuery {
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }

    /// Search filter, empty when the query lists everything.
    pub fn filter(&self) -> &str {
        match self.verb {
            Verb::Search => self.args.first().map(String::as_str).unwrap_or(""),
            Verb::List => self.args.first().map(String::as_str).unwrap_or(""),
            _ => "",
        }
    }
}

pub fn parse_query(input: &str) -> ParsedQuery {
    let trimmed = input.trim();
    let mut tokens = tokenize_query(trimmed);
    if tokens.is_empty() {
        return ParsedQuery {
            verb: Verb::Search,
            args: Vec::new(),
        };
    }
    if let Some(verb) = Verb::from_keyword(&tokens[0]) {
        let args = tokens.split_off(1);
        let args = if verb == Verb::List && !args.is_empty() {
            vec![args.join(" ")]
        } else {
            args
        };
        return ParsedQuery { verb, args };
    }
    if tokens.len() == 1 && is_http_url(&tokens[0]) {
        return ParsedQuery {
            verb: Verb::OpenUrl,
            args: tokens,
        };
    }
    ParsedQuery {
        verb: Verb::Search,
        args: vec![trimmed.to_string()],
    }
}

/// Build the command line that [`parse_query`] turns back into `verb` and `args`.
pub fn command_line<S: AsRef<str>>(verb: Verb, args: &[S]) -> String {
    let mut tokens: Vec<&str> = Vec::with_capacity(args.len() + 1);
    if let Some(keyword) = verb.keyword() {
        tokens.push(keyword);
    }
    tokens.extend(args.iter().map(AsRef::as_ref));
    rebuild_query(&tokens)
}

/// Split `add` arguments into url, optional name and the overwrite flag.
pub fn split_add_args<'a>(args: &[&'a str]) -> (Option<&'a str>, Option<&'a str>, bool) {
    let force = args.iter().any(|a| *a == FORCE_FLAG);
    let mut rest = args.iter().copied().filter(|a| *a != FORCE_FLAG);
    (rest.next(), rest.next(), force)
}
