use indoc::indoc;
use std::{collections::HashMap, fmt, str::FromStr};
use thiserror::Error;

use crate::query_builder::templates::{CLIQUE_TEMPLATE, DIAMETER_TEMPLATE, RESERVED_NAMES};

pub const USAGE: &str = indoc! {r#"
    Expected format: graphsql "task=<diameter|clique>;table=<name>;source=<id>;destination=<id>;k=<max threshold>""#};

const REQUIRED_KEYS: [&str; 5] = ["task", "table", "source", "destination", "k"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Invalid argument '{0}' (expected key=value)")]
    MalformedToken(String),
    #[error("Unknown key '{0}'")]
    UnknownKey(String),
    #[error("Key '{0}' given more than once")]
    DuplicateKey(String),
    #[error("Missing value for '{0}'")]
    MissingKey(&'static str),
    #[error("Unknown task '{0}' (allowed: clique, diameter)")]
    UnknownTask(String),
    #[error("k must be an integer, got '{0}'")]
    InvalidK(String),
    #[error("k must be at least {minimum} for task {task}, got {k}")]
    KOutOfRange { task: Task, k: usize, minimum: usize },
    #[error("'{0}' is not a valid SQL identifier")]
    InvalidIdentifier(String),
    #[error("'{0}' is used by the generated query and can not be the edge table")]
    ReservedName(String),
}

/// Graph property computed by the generated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// All k-cliques of the edge relation.
    Clique,
    /// Vertex pairs at maximum shortest distance, searching at most k hops.
    Diameter,
}

impl Task {
    /// Smallest k for which the task's query is well formed.
    pub fn minimum_k(&self) -> usize {
        match self {
            Task::Clique => 2,
            Task::Diameter => 1,
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            Task::Clique => CLIQUE_TEMPLATE,
            Task::Diameter => DIAMETER_TEMPLATE,
        }
    }
}

impl FromStr for Task {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clique" => Ok(Task::Clique),
            "diameter" => Ok(Task::Diameter),
            _ => Err(TaskError::UnknownTask(s.to_string())),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Clique => write!(f, "clique"),
            Task::Diameter => write!(f, "diameter"),
        }
    }
}

/// Parameters of one run, parsed from `task=clique;table=edges;...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskParams {
    pub task: Task,
    pub table: String,
    pub source: String,
    pub destination: String,
    pub k: usize,
}

impl TaskParams {
    pub fn new(
        task: Task,
        table: &str,
        source: &str,
        destination: &str,
        k: usize,
    ) -> Result<Self, TaskError> {
        if k < task.minimum_k() {
            return Err(TaskError::KOutOfRange {
                task,
                k,
                minimum: task.minimum_k(),
            });
        }
        if !is_table_name(table) {
            return Err(TaskError::InvalidIdentifier(table.to_string()));
        }
        if RESERVED_NAMES
            .iter()
            .any(|name| table.eq_ignore_ascii_case(name))
        {
            return Err(TaskError::ReservedName(table.to_string()));
        }
        for column in [source, destination] {
            if !is_identifier(column) {
                return Err(TaskError::InvalidIdentifier(column.to_string()));
            }
        }

        Ok(Self {
            task,
            table: table.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            k,
        })
    }
}

impl FromStr for TaskParams {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pairs = parse_pairs(s)?;
        let get = |key: &'static str| pairs.get(key).copied().ok_or(TaskError::MissingKey(key));

        let task = get("task")?.parse::<Task>()?;
        let k = get("k")?;
        let k = k
            .parse::<usize>()
            .map_err(|_| TaskError::InvalidK(k.to_string()))?;

        TaskParams::new(task, get("table")?, get("source")?, get("destination")?, k)
    }
}

/// Splits `a=1;b=2` into a key-value map.
///
/// Every token must contain exactly one `=` and a non-empty value. A single
/// trailing `;` is tolerated.
fn parse_pairs(s: &str) -> Result<HashMap<&str, &str>, TaskError> {
    let mut pairs = HashMap::new();
    let s = s.trim().strip_suffix(';').unwrap_or_else(|| s.trim());

    for token in s.split(';') {
        let (key, value) = match token.split('=').collect::<Vec<_>>()[..] {
            [key, value] => (key.trim(), value.trim()),
            _ => return Err(TaskError::MalformedToken(token.to_string())),
        };
        if key.is_empty() || value.is_empty() {
            return Err(TaskError::MalformedToken(token.to_string()));
        }
        if !REQUIRED_KEYS.contains(&key) {
            return Err(TaskError::UnknownKey(key.to_string()));
        }
        if pairs.insert(key, value).is_some() {
            return Err(TaskError::DuplicateKey(key.to_string()));
        }
    }

    Ok(pairs)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Table names may carry a single schema qualifier.
fn is_table_name(s: &str) -> bool {
    match s.split_once('.') {
        Some((schema, table)) => is_identifier(schema) && is_identifier(table),
        None => is_identifier(s),
    }
}
