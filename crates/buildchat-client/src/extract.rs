//! Heuristic extraction of generated files from assistant replies.
//!
//! Models rarely follow one convention for labelling code, so this is a
//! best-effort matcher rather than a markdown parser: it recognizes fenced
//! blocks, a handful of ways of naming the file they belong to, and bare
//! HTML documents. Anything it does not recognize is skipped.

use regex::Regex;
use std::sync::OnceLock;

use buildchat_models::ExtractedFile;

/// Extensions accepted when guessing that a token is a file name
const FILE_EXTENSIONS: &str =
    "html|htm|css|scss|sass|less|js|mjs|cjs|jsx|ts|tsx|json|md|py|rs|vue|svelte|txt|sh|ya?ml|toml|xml|svg";

/// Opening fence line: three or more backticks or tildes, then the info string
fn fence_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(`{3,}|~{3,})([^\n]*)$")
            .expect("fence pattern is valid")
    })
}

fn file_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)^[\w./-]*\w\.(?:{})$", FILE_EXTENSIONS))
            .expect("file name pattern is valid")
    })
}

fn info_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:title|file(?:name)?|path)\s*=\s*["']?([^"'\s]+)"#)
            .expect("info attribute pattern is valid")
    })
}

/// A line above a fence that names the file: `// App.jsx`, `**App.jsx**`,
/// `### src/App.jsx`, `File: App.jsx`, `` `App.jsx`: ``
fn label_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)^\s*(?://+|#+|/\*+|<!--|--|[-*]\s)?\s*(?:(?:file(?:name)?|path)\s*:\s*)?[`*]*([\w./-]*\w\.(?:{}))[`*]*\s*(?:\*+/|-->)?\s*:?\s*$",
            FILE_EXTENSIONS
        ))
        .expect("label line pattern is valid")
    })
}

/// First line inside a block naming its file. Requires a comment marker so
/// that code such as `#header.active {` is not mistaken for a name.
fn leading_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)^\s*(?://+|#+\s|/\*+|<!--|--\s)\s*(?:(?:file(?:name)?|path)\s*:\s*)?([\w./-]*\w\.(?:{}))\s*(?:\*+/|-->)?\s*$",
            FILE_EXTENSIONS
        ))
        .expect("leading comment pattern is valid")
    })
}

fn html_document_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)(?:<!doctype\s+html[^>]*>\s*)?<html\b.*?</html\s*>")
            .expect("html document pattern is valid")
    })
}

/// File a bare block of `language` lands in, matching the builder's tabs
pub fn default_file_for_language(language: &str) -> Option<&'static str> {
    match language.to_ascii_lowercase().as_str() {
        "jsx" | "tsx" | "react" => Some("App.jsx"),
        "css" => Some("styles.css"),
        "js" | "javascript" => Some("script.js"),
        "html" | "htm" => Some("index.html"),
        _ => None,
    }
}

fn is_file_name(token: &str) -> bool {
    file_name_re().is_match(token)
}

fn language_from_name(name: &str) -> Option<String> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    let language = match ext.as_str() {
        "htm" => "html".to_string(),
        "js" | "mjs" | "cjs" => "javascript".to_string(),
        "yml" => "yaml".to_string(),
        _ => ext,
    };
    Some(language)
}

/// Split a fence info string into (language, file name)
fn parse_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    let mut tokens = info.split_whitespace();
    let Some(first) = tokens.next() else {
        return (None, None);
    };

    let attr_name = info_attr_re()
        .captures(info)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    // ```jsx:App.jsx
    if let Some((lang, name)) = first.split_once(':') {
        if is_file_name(name) {
            return (Some(lang.to_ascii_lowercase()), Some(name.to_string()));
        }
    }

    // ```App.jsx
    if is_file_name(first) {
        return (language_from_name(first), Some(first.to_string()));
    }

    let language = if first.contains('=') {
        None
    } else {
        Some(first.trim_start_matches('.').to_ascii_lowercase())
    };
    let name = attr_name.or_else(|| tokens.find(|t| is_file_name(t)).map(str::to_string));
    (language, name)
}

fn label_above(text: &str, fence_start: usize) -> Option<String> {
    let line = text[..fence_start].trim_end().rsplit('\n').next()?;
    label_line_re()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn label_inside(body: &str) -> Option<String> {
    let line = body.trim_start().lines().next()?;
    leading_comment_re()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// One fenced block; offsets are byte positions in the reply
struct Fence<'a> {
    start: usize,
    end: usize,
    info: &'a str,
    body: &'a str,
}

/// Closing line for a fence opened with `len` copies of `marker`: the same
/// character, at least as many times, and nothing else
fn is_closing_line(line: &str, marker: char, len: usize) -> bool {
    let line = line.trim();
    line.len() >= len && line.chars().all(|c| c == marker)
}

/// Fenced blocks in order. An unterminated fence ends the scan.
fn fences(text: &str) -> Vec<Fence<'_>> {
    let mut found = Vec::new();
    let mut search_from = 0;

    while let Some(caps) = fence_open_re().captures_at(text, search_from) {
        let (Some(open), Some(run)) = (caps.get(0), caps.get(1)) else { break };
        let info = caps.get(2).map_or("", |m| m.as_str());
        let marker = if run.as_str().starts_with('`') { '`' } else { '~' };

        // ```a``` on one line is inline code, not a fence
        if marker == '`' && info.contains('`') {
            search_from = open.end();
            continue;
        }

        let body_start = (open.end() + 1).min(text.len());
        let mut pos = body_start;
        let mut close = None;
        while pos < text.len() {
            let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
            if is_closing_line(&text[pos..line_end], marker, run.as_str().len()) {
                close = Some((pos, line_end));
                break;
            }
            pos = line_end + 1;
        }

        let Some((close_start, close_end)) = close else { break };
        found.push(Fence {
            start: open.start(),
            end: close_end,
            info,
            body: &text[body_start..close_start],
        });
        search_from = close_end;
    }
    found
}

fn upsert(files: &mut Vec<ExtractedFile>, file: ExtractedFile) {
    // later blocks are later revisions of the same file
    match files.iter_mut().find(|f| f.name == file.name) {
        Some(existing) => *existing = file,
        None => files.push(file),
    }
}

/// First complete `<html>…</html>` document in `text`, trimmed
pub fn extract_html_document(text: &str) -> Option<String> {
    html_document_re()
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

/// Pull every recognizable file out of a complete assistant reply.
///
/// Fenced blocks are named by their info string, a label line above the
/// fence, a comment on their first line, or else their language's default
/// file. Blocks that stay unnamed are dropped, as are empty ones. A bare
/// HTML document outside any fence fills `index.html` if no block did.
pub fn extract_files(text: &str) -> Vec<ExtractedFile> {
    let mut files: Vec<ExtractedFile> = Vec::new();
    let mut outside = String::with_capacity(text.len());
    let mut last_end = 0;

    for fence in fences(text) {
        outside.push_str(&text[last_end..fence.start]);
        outside.push('\n');
        last_end = fence.end;

        let info = fence.info.trim();
        let body = fence.body;

        let (language, name) = parse_info(info);
        let name = name
            .or_else(|| label_above(text, fence.start))
            .or_else(|| label_inside(body));
        let language = language.or_else(|| name.as_deref().and_then(language_from_name));
        let name = name.or_else(|| {
            language
                .as_deref()
                .and_then(default_file_for_language)
                .map(str::to_string)
        });

        let Some(name) = name else {
            tracing::debug!(info = %info, "skipping unnamed code block");
            continue;
        };
        let code = body.trim();
        if code.is_empty() {
            continue;
        }

        upsert(&mut files, ExtractedFile {
            name,
            language: language.unwrap_or_else(|| "text".to_string()),
            code: code.to_string(),
        });
    }
    outside.push_str(&text[last_end..]);

    if !files.iter().any(|f| f.name.eq_ignore_ascii_case("index.html")) {
        if let Some(document) = extract_html_document(&outside) {
            files.push(ExtractedFile {
                name: "index.html".to_string(),
                language: "html".to_string(),
                code: document,
            });
        }
    }

    files
}
