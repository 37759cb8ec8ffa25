// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Text rendering for the suggestions and history panels.

use crate::markup::{clean_markup, extract_code_block};
use crate::models::HistoryEntry;
use crate::time_utils::format_display;
use std::fmt::Write;

/// Rendered suggestions: the cleaned prose, plus the first embedded code
/// block when the text carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionsPanel {
    pub text: String,
    pub code: Option<String>,
}

impl SuggestionsPanel {
    pub fn new(raw: &str) -> Self {
        Self {
            text: clean_markup(raw),
            code: extract_code_block(raw),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.code.is_none()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(code) = &self.code {
            let _ = writeln!(out, "Optimized code:\n{}\n", indent(code));
        }
        out.push_str(&self.text);
        out
    }
}

/// History list with at most one expanded entry.
#[derive(Debug, Clone, Default)]
pub struct HistoryPanel {
    expanded: Option<u64>,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<u64> {
        self.expanded
    }

    /// Expand `id`, or collapse it if it is already expanded.
    pub fn toggle(&mut self, id: u64) {
        self.expanded = if self.expanded == Some(id) { None } else { Some(id) };
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    /// Forget the expansion if its entry is no longer listed.
    pub fn retain(&mut self, entries: &[HistoryEntry]) {
        if let Some(id) = self.expanded {
            if !entries.iter().any(|entry| entry.id == id) {
                self.expanded = None;
            }
        }
    }

    pub fn render(&self, entries: &[HistoryEntry]) -> String {
        if entries.is_empty() {
            return "No history yet.\n".to_string();
        }

        let mut out = String::new();
        for entry in entries {
            let marker = if self.expanded == Some(entry.id) { "-" } else { "+" };
            let _ = writeln!(
                out,
                "{} [{}] {}  {}",
                marker,
                entry.id,
                entry.language,
                format_display(&entry.created_at)
            );

            if self.expanded == Some(entry.id) {
                let _ = writeln!(out, "  Original code:\n{}", indent(&entry.original_code));
                let _ = writeln!(
                    out,
                    "  Suggestions:\n{}",
                    indent(&clean_markup(&entry.optimization_suggestions))
                );
                let _ = writeln!(out, "  Optimized code:\n{}", indent(&entry.optimized_code));
            } else {
                let _ = writeln!(out, "    {}", preview(&entry.original_code));
            }
        }
        out
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First non-blank line, shortened for the collapsed view.
fn preview(code: &str) -> String {
    const MAX_CHARS: usize = 60;

    let line = code.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.chars().count() > MAX_CHARS {
        let cut: String = line.chars().take(MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
