use std::io::BufRead;

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::model::task::{Priority, Task};

/// Timestamp format used by `task export` (`20120110T231200Z`)
const EXPORT_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read task export: {0}")]
    Io(#[from] std::io::Error),
    #[error("task {entry}: only {fields} field(s) could be parsed")]
    TooFewFields { entry: usize, fields: usize },
    #[error("task {entry}: missing required field `{field}`")]
    MissingField { entry: usize, field: &'static str },
    #[error("task {entry}: unterminated value")]
    Unterminated { entry: usize },
    #[error("task {entry}: invalid timestamp for `{key}`: {value}")]
    InvalidTimestamp {
        entry: usize,
        key: String,
        value: String,
    },
    #[error("task {entry}: invalid priority: {value}")]
    InvalidPriority { entry: usize, value: String },
}

/// Quote/bracket state carried across physical lines
#[derive(Debug, Default, Clone, Copy)]
struct ScanState {
    in_quote: bool,
    depth: usize,
    escaped: bool,
}

impl ScanState {
    fn step(&mut self, c: char) {
        if self.escaped {
            self.escaped = false;
            return;
        }
        match c {
            '\\' => self.escaped = true,
            '"' => self.in_quote = !self.in_quote,
            '[' | '{' if !self.in_quote => self.depth += 1,
            ']' | '}' if !self.in_quote => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
    }

    fn feed(&mut self, line: &str) {
        for c in line.chars() {
            self.step(c);
        }
    }

    /// True while a quoted value, list or object is still open
    fn is_open(&self) -> bool {
        self.in_quote || self.depth > 0
    }

    fn at_top_level(&self) -> bool {
        !self.in_quote && self.depth == 0 && !self.escaped
    }
}

/// Parse a full `task export` stream.
///
/// Physical lines are joined while a quoted value or bracketed list is open,
/// so every logical entry is parsed whole. Any malformed entry aborts the
/// load: a partial task list is never returned.
pub fn parse_export<R: BufRead>(reader: R) -> Result<Vec<Task>, LoadError> {
    let mut tasks = Vec::new();
    let mut pending = String::new();
    let mut state = ScanState::default();

    for line in reader.lines() {
        let line = line?;
        if pending.is_empty() && is_separator_line(&line) {
            continue;
        }
        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(&line);
        state.feed(&line);
        if state.is_open() {
            continue;
        }

        let entry = std::mem::take(&mut pending);
        state = ScanState::default();
        if let Some(body) = entry_body(&entry) {
            let mut task = parse_entry(body, tasks.len())?;
            task.index = tasks.len();
            trace!(index = task.index, uuid = %task.uuid, "parsed task");
            tasks.push(task);
        }
    }

    if !pending.trim().is_empty() {
        return Err(LoadError::Unterminated { entry: tasks.len() });
    }

    debug!(count = tasks.len(), "task export parsed");
    Ok(tasks)
}

/// Parse an export held in memory
pub fn parse_export_str(text: &str) -> Result<Vec<Task>, LoadError> {
    parse_export(text.as_bytes())
}

/// Blank lines and the JSON array brackets around a 2.x export
fn is_separator_line(line: &str) -> bool {
    matches!(line.trim(), "" | "[" | "]" | ",")
}

/// Strip the trailing separator and object braces from a logical entry
fn entry_body(entry: &str) -> Option<&str> {
    let s = entry.trim().trim_end_matches(',').trim_end();
    if s.is_empty() {
        return None;
    }
    let s = s.strip_prefix('{').unwrap_or(s);
    let s = s.strip_suffix('}').unwrap_or(s);
    Some(s)
}

/// Split `text` on `sep` wherever it occurs outside quotes and brackets
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut state = ScanState::default();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == sep && state.at_top_level() {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
            continue;
        }
        state.step(c);
    }
    parts.push(&text[start..]);
    parts
}

/// Split a field at its first top-level `:`
fn split_key_value(field: &str) -> Option<(&str, &str)> {
    let mut state = ScanState::default();
    for (i, c) in field.char_indices() {
        if c == ':' && state.at_top_level() {
            return Some((&field[..i], &field[i + 1..]));
        }
        state.step(c);
    }
    None
}

/// Remove export escapes, keeping the escaped character
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Decode a quoted string (`"..."`). `None` if the closing quote is missing.
fn decode_string(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?;
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(unescape(&inner[..i]));
        }
    }
    None
}

/// Decode a field value into its text form. Lists are comma-joined.
fn decode_value(raw: &str, entry: usize) -> Result<String, LoadError> {
    let raw = raw.trim();
    if raw.starts_with('"') {
        return decode_string(raw).ok_or(LoadError::Unterminated { entry });
    }
    if let Some(list) = raw.strip_prefix('[') {
        let inner = list
            .strip_suffix(']')
            .ok_or(LoadError::Unterminated { entry })?;
        let items = split_top_level(inner, ',')
            .into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| decode_string(item).unwrap_or_else(|| unescape(item)))
            .collect::<Vec<_>>();
        return Ok(items.join(","));
    }
    Ok(unescape(raw))
}

/// Parse an export timestamp: `YYYYMMDDTHHMMSSZ`, or plain epoch seconds
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse().ok();
    }
    let value = value.strip_suffix('Z').unwrap_or(value);
    NaiveDateTime::parse_from_str(value, EXPORT_TIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Parse one logical entry (braces already removed)
fn parse_entry(body: &str, entry: usize) -> Result<Task, LoadError> {
    let mut task = Task::new(String::new(), String::new());
    let mut fields = 0;

    for field in split_top_level(body, ',') {
        let Some((key, raw)) = split_key_value(field) else {
            break;
        };
        fields += 1;

        let key = key.trim().trim_matches('"');
        if key == "id" {
            continue;
        }
        let value = decode_value(raw, entry)?;
        trace!(entry, key, value = %value, "export field");

        match key {
            "uuid" => task.uuid = value,
            "description" => task.description = value,
            "project" => task.project = non_empty(value),
            "tags" => task.tags = non_empty(value),
            "priority" => {
                task.priority = match value.chars().next() {
                    None => None,
                    Some(c) => Some(
                        Priority::from_char(c)
                            .ok_or(LoadError::InvalidPriority { entry, value: value.clone() })?,
                    ),
                }
            }
            "due" | "entry" | "start" | "end" => {
                let stamp = parse_timestamp(&value).ok_or_else(|| LoadError::InvalidTimestamp {
                    entry,
                    key: key.to_string(),
                    value: value.clone(),
                })?;
                match key {
                    "due" => task.due = Some(stamp),
                    "entry" => task.entry = Some(stamp),
                    "start" => task.start = Some(stamp),
                    _ => task.end = Some(stamp),
                }
            }
            _ => {}
        }
    }

    if fields < 2 {
        return Err(LoadError::TooFewFields { entry, fields });
    }
    if !task.is_valid() {
        let field = if task.uuid.is_empty() { "uuid" } else { "description" };
        return Err(LoadError::MissingField { entry, field });
    }
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn minimal_record() {
        let tasks =
            parse_export_str(r#"{"uuid":"abc-1","description":"buy milk","project":"home"}"#)
                .unwrap();
        assert_eq!(tasks.len(), 1);
        let expected = Task::new("abc-1", "buy milk").with_project("home");
        assert_eq!(tasks[0], expected);
    }

    #[test]
    fn missing_uuid_is_fatal() {
        let err = parse_export_str(r#"{"description":"buy milk","project":"home"}"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingField {
                field: "uuid",
                ..
            }
        ));
    }

    #[test]
    fn missing_description_is_fatal() {
        let err = parse_export_str(r#"{"uuid":"abc-1","project":"home"}"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingField {
                field: "description",
                ..
            }
        ));
    }

    #[test]
    fn single_field_is_too_short() {
        let err = parse_export_str(r#"{"uuid":"abc-1"}"#).unwrap_err();
        assert!(matches!(err, LoadError::TooFewFields { fields: 1, .. }));
    }

    #[test]
    fn garbage_line_aborts_whole_load() {
        let input = "{\"uuid\":\"a\",\"description\":\"one\"}\nnot an entry\n{\"uuid\":\"b\",\"description\":\"two\"}\n";
        let err = parse_export_str(input).unwrap_err();
        assert!(matches!(err, LoadError::TooFewFields { entry: 1, fields: 0 }));
    }

    #[test]
    fn indices_follow_encounter_order() {
        let input = "\
{\"id\":3,\"uuid\":\"a\",\"description\":\"first\"}
{\"id\":1,\"uuid\":\"b\",\"description\":\"second\"}
{\"id\":2,\"uuid\":\"c\",\"description\":\"third\"}
";
        let tasks = parse_export_str(input).unwrap();
        let summary: Vec<(usize, &str)> = tasks
            .iter()
            .map(|t| (t.index, t.description.as_str()))
            .collect();
        assert_eq!(summary, vec![(0, "first"), (1, "second"), (2, "third")]);
    }

    #[test]
    fn full_record_fields() {
        let input = r#"{"id":1,"description":"write report","due":"20120110T231200Z","entry":"20120101T000000Z","priority":"H","project":"work","status":"pending","tags":["office","urgent"],"uuid":"d3f1","urgency":9.2}"#;
        let tasks = parse_export_str(input).unwrap();
        let t = &tasks[0];
        assert_eq!(t.uuid, "d3f1");
        assert_eq!(t.description, "write report");
        assert_eq!(t.project.as_deref(), Some("work"));
        assert_eq!(t.priority, Some(Priority::High));
        assert_eq!(t.tags.as_deref(), Some("office,urgent"));
        assert_eq!(t.due, Some(1_326_237_120));
        assert_eq!(t.entry, Some(1_325_376_000));
        assert_eq!(t.start, None);
        assert!(t.visible);
    }

    #[test]
    fn commas_inside_quotes_stay_in_value() {
        let tasks =
            parse_export_str(r#"{"uuid":"a","description":"eggs, milk, bread","project":"home"}"#)
                .unwrap();
        assert_eq!(tasks[0].description, "eggs, milk, bread");
        assert_eq!(tasks[0].project.as_deref(), Some("home"));
    }

    #[test]
    fn quoted_value_spanning_lines_is_rejoined() {
        let input = "{\"uuid\":\"a\",\"description\":\"first line,\nsecond line\",\"project\":\"p\"}\n{\"uuid\":\"b\",\"description\":\"next\"}\n";
        let tasks = parse_export_str(input).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "first line,\nsecond line");
        assert_eq!(tasks[0].project.as_deref(), Some("p"));
        assert_eq!(tasks[1].index, 1);
    }

    #[test]
    fn tag_list_spanning_lines_is_rejoined() {
        let input = "{\"uuid\":\"a\",\"description\":\"d\",\"tags\":[\"one\",\n\"two\"]}\n";
        let tasks = parse_export_str(input).unwrap();
        assert_eq!(tasks[0].tags.as_deref(), Some("one,two"));
    }

    #[test]
    fn escapes_are_stripped() {
        let input = r#"{"uuid":"a","description":"say \"hi\" to http:\/\/example.com"}"#;
        let tasks = parse_export_str(input).unwrap();
        assert_eq!(tasks[0].description, "say \"hi\" to http://example.com");
    }

    #[test]
    fn annotations_are_ignored() {
        let input = r#"{"annotations":[{"entry":"20120101T000000Z","description":"note, with comma"}],"description":"real","uuid":"a"}"#;
        let tasks = parse_export_str(input).unwrap();
        assert_eq!(tasks[0].description, "real");
    }

    #[test]
    fn json_array_wrapper_is_accepted() {
        let input = "[\n{\"uuid\":\"a\",\"description\":\"one\"},\n{\"uuid\":\"b\",\"description\":\"two\"}\n]\n";
        let tasks = parse_export_str(input).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].uuid, "b");
    }

    #[test]
    fn unterminated_entry_at_eof() {
        let err = parse_export_str("{\"uuid\":\"a\",\"description\":\"never closed\n").unwrap_err();
        assert!(matches!(err, LoadError::Unterminated { entry: 0 }));
    }

    #[test]
    fn bad_timestamp_is_fatal() {
        let err =
            parse_export_str(r#"{"uuid":"a","description":"d","due":"tomorrow"}"#).unwrap_err();
        assert!(matches!(err, LoadError::InvalidTimestamp { .. }));
    }

    #[test]
    fn bad_priority_is_fatal() {
        let err =
            parse_export_str(r#"{"uuid":"a","description":"d","priority":"X"}"#).unwrap_err();
        assert!(matches!(err, LoadError::InvalidPriority { .. }));
    }

    #[test]
    fn empty_export_is_empty_list() {
        assert!(parse_export_str("").unwrap().is_empty());
        assert!(parse_export_str("[\n]\n").unwrap().is_empty());
    }

    #[test]
    fn timestamps() {
        assert_eq!(parse_timestamp("19700101T000000Z"), Some(0));
        assert_eq!(parse_timestamp("1325376000"), Some(1_325_376_000));
        assert_eq!(parse_timestamp("2012-01-01"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
