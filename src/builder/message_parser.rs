//! Decoding of specially formatted MSBuild log messages.
//!
//! MSBuild reports item and property changes, task parameters and skipped
//! targets/tasks as plain text messages. This module recognizes those
//! messages and turns them into structured values; anything it does not
//! recognize is kept as an opaque message by the caller.
//!
//! Item lists use indentation to express structure:
//!
//! ```text
//!     Group=
//!         Item1
//!                 Meta1=Val1
//!         Item2
//! ```
//!
//! 4 spaces open a group, 8 spaces open an item, and deeper lines (MSBuild
//! writes 16 spaces; 12 or more are accepted) hold `key=value` metadata. A
//! metadata-level line without `=` continues the previous metadata value, or
//! the item name when the item has no metadata yet.

use std::sync::LazyLock;

use regex::Regex;

use super::errors::{ModelError, ParseError};
use super::info::{ItemGroupInfo, ItemInfo};
use crate::util::StringInterner;

const ITEMS_ADDED: &str = "Added Item(s): ";
const ITEMS_REMOVED: &str = "Removed Item(s): ";
const PROPERTY_SET: &str = "Set Property: ";
const OUTPUT_ITEMS: &str = "Output Item(s): ";
const OUTPUT_PROPERTY: &str = "Output Property: ";
const TASK_PARAMETER: &str = "Task Parameter:";

const GROUP_INDENT: usize = 4;
const ITEM_INDENT: usize = 8;
const METADATA_INDENT: usize = 12;

static USING_TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^Using "(?P<task>.+)" task from assembly "(?P<assembly>.+)"\.$"#)
        .expect("valid using-task regex")
});

static TARGET_SKIPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^Target "(?P<name>[^"]+)" skipped"#).expect("valid regex"));

static TASK_SKIPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^Task "(?P<name>[^"]+)" skipped"#).expect("valid regex"));

/// A message logged while a project (but no target) was running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectMessage<'a> {
    TargetSkipped { name: &'a str },
    Text,
}

/// A message logged while a target (but no task) was running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetMessage<'a> {
    ItemsAdded { block: &'a str },
    ItemsRemoved { block: &'a str },
    PropertySet { name: &'a str, value: &'a str },
    TaskSkipped { name: &'a str },
    TargetSkipped { name: &'a str },
    Text,
}

/// A message logged while a task was running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskMessage<'a> {
    OutputItems { block: &'a str },
    OutputProperty { name: &'a str, value: &'a str },
    ParameterProperty { name: &'a str, value: &'a str },
    ParameterItems { block: &'a str },
    Text,
}

pub fn classify_project_message(text: &str) -> ProjectMessage<'_> {
    match TARGET_SKIPPED.captures(text).and_then(|c| c.name("name")) {
        Some(name) => ProjectMessage::TargetSkipped {
            name: name.as_str(),
        },
        None => ProjectMessage::Text,
    }
}

pub fn classify_target_message(text: &str) -> Result<TargetMessage<'_>, ParseError> {
    if let Some(block) = text.strip_prefix(ITEMS_ADDED) {
        return Ok(TargetMessage::ItemsAdded { block });
    }
    if let Some(block) = text.strip_prefix(ITEMS_REMOVED) {
        return Ok(TargetMessage::ItemsRemoved { block });
    }
    if let Some(rest) = text.strip_prefix(PROPERTY_SET) {
        let (name, value) = split_assignment(rest)?;
        return Ok(TargetMessage::PropertySet { name, value });
    }
    if let Some(name) = TASK_SKIPPED.captures(text).and_then(|c| c.name("name")) {
        return Ok(TargetMessage::TaskSkipped {
            name: name.as_str(),
        });
    }
    if let Some(name) = TARGET_SKIPPED.captures(text).and_then(|c| c.name("name")) {
        return Ok(TargetMessage::TargetSkipped {
            name: name.as_str(),
        });
    }
    Ok(TargetMessage::Text)
}

pub fn classify_task_message(text: &str) -> Result<TaskMessage<'_>, ParseError> {
    if let Some(block) = text.strip_prefix(OUTPUT_ITEMS) {
        return Ok(TaskMessage::OutputItems { block });
    }
    if let Some(rest) = text.strip_prefix(OUTPUT_PROPERTY) {
        let (name, value) = split_assignment(rest)?;
        return Ok(TaskMessage::OutputProperty { name, value });
    }
    if let Some(rest) = text.strip_prefix(TASK_PARAMETER) {
        if rest.contains('\n') {
            return Ok(TaskMessage::ParameterItems { block: rest });
        }
        let (name, value) = split_assignment(rest)?;
        return Ok(TaskMessage::ParameterProperty { name, value });
    }
    Ok(TaskMessage::Text)
}

/// Recognize `Using "<task>" task from assembly "<assembly>".`
pub fn parse_using_task(text: &str) -> Option<(&str, &str)> {
    let caps = USING_TASK.captures(text)?;
    Some((caps.name("task")?.as_str(), caps.name("assembly")?.as_str()))
}

/// Split `name=value` at the first `=`.
fn split_assignment(text: &str) -> Result<(&str, &str), ParseError> {
    text.split_once('=')
        .map(|(name, value)| (name.trim(), value))
        .ok_or_else(|| ParseError::MissingAssignment {
            text: text.to_string(),
        })
}

struct PendingItem {
    name: String,
    metadata: Vec<(String, String)>,
}

struct PendingGroup {
    name: String,
    items: Vec<PendingItem>,
}

/// Parse an indented item list into item groups.
pub fn parse_item_groups(
    block: &str,
    strings: &StringInterner,
) -> Result<Vec<ItemGroupInfo>, ModelError> {
    let mut groups: Vec<PendingGroup> = Vec::new();

    for line in block.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start_matches(' ').len();

        match indent {
            GROUP_INDENT => {
                let content = line.trim();
                let name = content
                    .strip_suffix('=')
                    .ok_or_else(|| ParseError::InvalidGroupLine {
                        line: line.to_string(),
                    })?;
                groups.push(PendingGroup {
                    name: name.to_string(),
                    items: Vec::new(),
                });
            }
            ITEM_INDENT => {
                let group = groups.last_mut().ok_or_else(|| ParseError::ItemOutsideGroup {
                    line: line.to_string(),
                })?;
                group.items.push(PendingItem {
                    name: line.trim().to_string(),
                    metadata: Vec::new(),
                });
            }
            n if n >= METADATA_INDENT => {
                let item = groups
                    .last_mut()
                    .and_then(|g| g.items.last_mut())
                    .ok_or_else(|| ParseError::MetadataOutsideItem {
                        line: line.to_string(),
                    })?;
                let content = line.trim();

                if let Some((key, value)) = content.split_once('=') {
                    item.metadata.push((key.trim().to_string(), value.to_string()));
                } else if let Some((_, value)) = item.metadata.last_mut() {
                    value.push('\n');
                    value.push_str(content);
                } else {
                    item.name.push('\n');
                    item.name.push_str(content);
                }
            }
            _ => {
                return Err(ParseError::UnexpectedIndentation {
                    indent,
                    line: line.to_string(),
                }
                .into())
            }
        }
    }

    groups
        .into_iter()
        .map(|group| {
            let mut info = ItemGroupInfo::new(strings.intern(&group.name));
            for pending in group.items {
                let mut item = ItemInfo::new(strings.intern(&pending.name));
                for (key, value) in pending.metadata {
                    item.add_metadata(strings.intern(&key), strings.intern(&value))?;
                }
                info.items.push(item);
            }
            Ok(info)
        })
        .collect()
}
