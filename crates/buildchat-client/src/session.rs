use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use buildchat_models::{ExtractedFile, Message, Role, WireMessage};

use crate::turn::{AssistantTurn, TurnState};

/// System prompt nudging the model toward fences the extractor understands
pub const BUILDER_SYSTEM_PROMPT: &str = "You are an AI app builder. When you write code, put each file in its own \
fenced code block whose info string is the language followed by the file name, for example ```jsx App.jsx. \
The app uses App.jsx for components, styles.css for styles, script.js for plain JavaScript and index.html \
for a standalone preview page.";

/// Content of one generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFile {
    pub language: String,
    pub content: String,
    /// Times extraction has replaced this file
    pub revision: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The session's file map, keyed by file name
#[derive(Debug, Clone, Default)]
pub struct ProjectFiles {
    files: BTreeMap<String, ProjectFile>,
}

impl ProjectFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder files shown before anything has been generated
    pub fn builder_defaults() -> Self {
        let mut files = Self::new();
        files.seed("App.jsx", "jsx", "// Your JSX code will appear here\nfunction App() {\n  return (\n    <div className=\"container\">\n      <h1>Hello World</h1>\n      <p>Start describing your app...</p>\n    </div>\n  );\n}");
        files.seed("styles.css", "css", "/* Your CSS styles will appear here */\n.container {\n  max-width: 1200px;\n  margin: 0 auto;\n  padding: 2rem;\n}");
        files.seed("script.js", "javascript", "// Your JavaScript code will appear here\nconsole.log('Ready to build!');");
        files
    }

    fn seed(&mut self, name: &str, language: &str, content: &str) {
        self.files.insert(name.to_string(), ProjectFile {
            language: language.to_string(),
            content: content.to_string(),
            revision: 0,
            updated_at: None,
        });
    }

    pub fn get(&self, name: &str) -> Option<&ProjectFile> {
        self.files.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProjectFile)> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Overwrite (or add) each extracted file; all others keep their content.
    /// Returns the names that changed.
    pub fn apply(&mut self, extracted: &[ExtractedFile]) -> Vec<String> {
        let now = Utc::now();
        let mut updated = Vec::new();
        for file in extracted {
            let entry = self.files.entry(file.name.clone()).or_insert_with(|| ProjectFile {
                language: file.language.clone(),
                content: String::new(),
                revision: 0,
                updated_at: None,
            });
            if entry.revision > 0 && entry.content == file.code {
                continue;
            }
            entry.language = file.language.clone();
            entry.content = file.code.clone();
            entry.revision += 1;
            entry.updated_at = Some(now);
            updated.push(file.name.clone());
        }
        updated
    }
}

/// Outcome of a finished turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    pub state: TurnState,
    pub text: String,
    pub updated_files: Vec<String>,
}

/// All state for one builder conversation
#[derive(Debug, Clone)]
pub struct Session {
    system_prompt: Option<String>,
    messages: Vec<Message>,
    files: ProjectFiles,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            system_prompt: None,
            messages: Vec::new(),
            files: ProjectFiles::builder_defaults(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn files(&self) -> &ProjectFiles {
        &self.files
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &Message {
        self.messages.push(Message::new(Role::User, content));
        &self.messages[self.messages.len() - 1]
    }

    /// Record the user's message and return the conversation to send for the reply
    pub fn begin_turn(&mut self, user_text: impl Into<String>) -> Vec<WireMessage> {
        self.push_user(user_text);
        self.wire_messages()
    }

    /// The conversation as sent to the proxy: system prompt first, then every message in order
    pub fn wire_messages(&self) -> Vec<WireMessage> {
        self.system_prompt
            .iter()
            .map(|prompt| WireMessage::system(prompt.clone()))
            .chain(self.messages.iter().map(Message::to_wire))
            .collect()
    }

    /// Drop the user message of a turn that got no reply, so the next turn
    /// does not send two user messages in a row
    pub fn abandon_turn(&mut self) {
        if matches!(self.messages.last(), Some(last) if last.role == Role::User) {
            self.messages.pop();
        }
    }

    /// Record a finished turn.
    ///
    /// Any received text becomes the assistant message, even when the turn
    /// failed. A failed turn with no text is abandoned. Files are only
    /// updated from a complete turn.
    pub fn finish_turn(&mut self, turn: &AssistantTurn) -> TurnSummary {
        if !turn.text().is_empty() {
            self.messages.push(Message::new(Role::Assistant, turn.text()));
        } else if matches!(turn.state(), TurnState::Failed(_)) {
            self.abandon_turn();
        }

        let updated_files = match turn.state() {
            TurnState::Complete => self.files.apply(turn.files()),
            _ => Vec::new(),
        };

        TurnSummary {
            state: turn.state().clone(),
            text: turn.text().to_string(),
            updated_files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extracted(name: &str, code: &str) -> ExtractedFile {
        ExtractedFile {
            name: name.to_string(),
            language: "css".to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_apply_leaves_unmatched_files_untouched() {
        let mut files = ProjectFiles::builder_defaults();
        let jsx_before = files.get("App.jsx").unwrap().clone();

        let updated = files.apply(&[extracted("styles.css", "h1 { color: red; }")]);

        assert_eq!(updated, vec!["styles.css".to_string()]);
        assert_eq!(files.get("styles.css").unwrap().content, "h1 { color: red; }");
        assert_eq!(files.get("styles.css").unwrap().revision, 1);
        assert_eq!(files.get("App.jsx").unwrap(), &jsx_before);
    }

    #[test]
    fn test_apply_adds_new_files() {
        let mut files = ProjectFiles::new();
        files.apply(&[extracted("theme.css", "body {}")]);
        assert_eq!(files.len(), 1);
        assert!(files.get("theme.css").is_some());
    }

    #[test]
    fn test_apply_same_content_twice_is_not_an_update() {
        let mut files = ProjectFiles::new();
        assert_eq!(files.apply(&[extracted("a.css", "x")]).len(), 1);
        assert!(files.apply(&[extracted("a.css", "x")]).is_empty());
        assert_eq!(files.get("a.css").unwrap().revision, 1);
    }

    #[test]
    fn test_wire_messages_keep_order_behind_system_prompt() {
        let mut session = Session::new().with_system_prompt("build apps");
        session.push_user("first");
        session.push_user("second");
        assert_eq!(
            session.wire_messages(),
            vec![
                WireMessage::system("build apps"),
                WireMessage::user("first"),
                WireMessage::user("second"),
            ]
        );
    }

    #[test]
    fn test_begin_turn_sends_history_plus_new_message() {
        let mut session = Session::new();
        session.push_user("first");
        let mut turn = AssistantTurn::new();
        turn.push_bytes(b"ok");
        turn.complete();
        session.finish_turn(&turn);

        let wire = session.begin_turn("second");
        assert_eq!(
            wire,
            vec![
                WireMessage::user("first"),
                WireMessage::assistant("ok"),
                WireMessage::user("second"),
            ]
        );
    }

    #[test]
    fn test_finish_complete_turn_updates_files() {
        let mut session = Session::new();
        session.push_user("make it red");

        let mut turn = AssistantTurn::new();
        turn.push_bytes(b"```css\nh1 { color: red; }\n```");
        turn.complete();

        let summary = session.finish_turn(&turn);
        assert_eq!(summary.state, TurnState::Complete);
        assert_eq!(summary.updated_files, vec!["styles.css".to_string()]);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn test_finish_failed_turn_keeps_text_but_not_files() {
        let mut session = Session::new();
        session.push_user("make it red");
        let css_before = session.files().get("styles.css").unwrap().content.clone();

        let mut turn = AssistantTurn::new();
        turn.push_bytes(b"```css\nh1 { color: red; }\n```\nAlso");
        turn.fail("stream interrupted");

        let summary = session.finish_turn(&turn);
        assert!(summary.updated_files.is_empty());
        assert_eq!(session.messages()[1].content, turn.text());
        assert_eq!(session.files().get("styles.css").unwrap().content, css_before);
    }

    #[test]
    fn test_finish_empty_failed_turn_drops_user_message() {
        let mut session = Session::new();
        session.push_user("hello");
        let mut turn = AssistantTurn::new();
        turn.cancel();
        session.finish_turn(&turn);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_abandon_turn_only_removes_trailing_user_message() {
        let mut session = Session::new();
        session.push_user("first");
        let mut turn = AssistantTurn::new();
        turn.push_bytes(b"reply");
        turn.complete();
        session.finish_turn(&turn);

        session.abandon_turn();
        assert_eq!(session.messages().len(), 2);

        session.begin_turn("second");
        session.abandon_turn();
        assert_eq!(session.wire_messages(), vec![WireMessage::user("first"), WireMessage::assistant("reply")]);
    }
}
