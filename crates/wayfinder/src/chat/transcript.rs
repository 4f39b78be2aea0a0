use std::collections::HashMap;

use super::message::ChatMessage;

/// What [`Transcript::apply`] did with a fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The fragment was appended at `index`.
    Appended {
        /// Position of the new fragment.
        index: usize,
    },
    /// The fragment replaced the earlier fragment at `index` it is a status
    /// patch of.
    Updated {
        /// Position of the replaced fragment.
        index: usize,
    },
}

impl Applied {
    /// Returns the position the fragment landed at.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Applied::Appended { index } | Applied::Updated { index } => index,
        }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    message: ChatMessage,
    parent: Option<usize>,
}

/// An ordered chat transcript that understands fragment nesting.
///
/// Ids are reused across steps, so nesting is resolved when a fragment
/// arrives: `parent_id` refers to the latest fragment carrying that id.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    latest_by_id: HashMap<String, usize>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fragment, or updates the fragment it is a status patch of.
    pub fn apply(&mut self, message: ChatMessage) -> Applied {
        if let Some(id) = message.id() {
            if let Some(&index) = self.latest_by_id.get(id) {
                let entry = &mut self.entries[index];
                if message.is_status_patch_of(&entry.message) {
                    trace!("status patch for fragment {id} at {index}");
                    entry.message = message;
                    return Applied::Updated { index };
                }
            }
        }

        let index = self.entries.len();
        let parent = message
            .parent_id()
            .and_then(|parent_id| self.latest_by_id.get(parent_id).copied());
        if let Some(id) = message.id() {
            self.latest_by_id.insert(id.to_owned(), index);
        }
        self.entries.push(Entry { message, parent });
        Applied::Appended { index }
    }

    /// Returns all fragments in display order.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter().map(|entry| &entry.message)
    }

    /// Returns the fragment at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.entries.get(index).map(|entry| &entry.message)
    }

    /// Returns the position of the fragment that `index` is nested under.
    #[inline]
    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.entries.get(index)?.parent
    }

    /// Returns the fragments nested under the fragment at `index`.
    pub fn children_of(
        &self,
        index: usize,
    ) -> impl Iterator<Item = &ChatMessage> {
        self.entries
            .iter()
            .filter(move |entry| entry.parent == Some(index))
            .map(|entry| &entry.message)
    }

    /// Returns the number of fragments.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no fragments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every fragment.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.latest_by_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wayfinder_core::memory::{ActionStep, MemoryStep, ToolCall};

    use super::*;
    use crate::chat::{MessageStatus, pull_messages_from_step};

    fn tool_step(step_number: u32, tool: &str) -> MemoryStep {
        MemoryStep::Action(ActionStep {
            step_number: Some(step_number),
            tool_calls: vec![ToolCall {
                id: format!("call_{step_number}"),
                name: tool.to_owned(),
                arguments: json!({ "location": "Austin" }),
            }],
            observations: Some("Sunny, 75°F".to_owned()),
            error: Some("partial data".to_owned()),
            ..Default::default()
        })
    }

    #[test]
    fn test_status_patch_replaces_parent() {
        let mut transcript = Transcript::new();
        let applied: Vec<_> = pull_messages_from_step(&tool_step(1, "get_weather_forecast"))
            .map(|message| transcript.apply(message))
            .collect();

        // Header, tool call, logs, error, patch, footer, separator.
        assert_eq!(applied.len(), 7);
        assert_eq!(applied[4], Applied::Updated { index: 1 });
        assert_eq!(transcript.len(), 6);

        let parent = transcript.get(1).unwrap();
        assert_eq!(parent.status(), Some(MessageStatus::Done));
        let children: Vec<_> = transcript.children_of(1).collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].title(), Some("📝 Execution Logs"));
        assert_eq!(children[1].title(), Some("💥 Error"));
        assert_eq!(transcript.parent_of(2), Some(1));
        assert_eq!(transcript.parent_of(0), None);
    }

    #[test]
    fn test_reused_ids_across_steps() {
        let mut transcript = Transcript::new();
        for (number, tool) in [(1, "get_weather_forecast"), (2, "find_hotels")] {
            for message in pull_messages_from_step(&tool_step(number, tool)) {
                transcript.apply(message);
            }
        }
        assert_eq!(transcript.len(), 12);

        // Both steps use `call_1`, each keeps its own tool call and children.
        let parents: Vec<_> = transcript
            .messages()
            .enumerate()
            .filter(|(_, m)| m.id() == Some("call_1"))
            .map(|(index, _)| index)
            .collect();
        assert_eq!(parents, [1, 7]);
        for index in parents {
            assert_eq!(transcript.children_of(index).count(), 2);
            assert_eq!(
                transcript.get(index).unwrap().status(),
                Some(MessageStatus::Done)
            );
        }
        assert_eq!(
            transcript.get(7).unwrap().title(),
            Some("🛠️ Used tool find_hotels")
        );
    }

    #[test]
    fn test_plain_fragments_append() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());
        let first = transcript.apply(ChatMessage::assistant("-----"));
        let second = transcript.apply(ChatMessage::assistant("-----"));
        assert_eq!(first, Applied::Appended { index: 0 });
        assert_eq!(second.index(), 1);

        transcript.clear();
        assert!(transcript.is_empty());
    }
}
