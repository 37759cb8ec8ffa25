// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Helpers for the markdown the LLM returns.

use regex::Regex;
use std::sync::LazyLock;

/// First fenced block, any (or no) language tag.
static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+#.-]*[ \t]*\r?\n([\s\S]*?)```").unwrap());

/// Opening fence including its language tag and newline.
static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+#.-]*\r?\n").unwrap());

/// Extract the contents of the first fenced code block, trimmed.
///
/// Returns `None` if the text has no complete fenced block or the block is
/// empty.
pub fn extract_code_block(text: &str) -> Option<String> {
    CODE_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|code| !code.is_empty())
}

/// Strip bold markers and code fences for plain-text display.
pub fn clean_markup(text: &str) -> String {
    let text = text.replace("**", "");
    let text = FENCE_OPEN.replace_all(&text, "");
    text.replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tagged_block() {
        let text = "Here you go:\n```python\nprint(f\"{x}\")\n```\nDone.";
        assert_eq!(extract_code_block(text).as_deref(), Some("print(f\"{x}\")"));
    }

    #[test]
    fn test_extract_untagged_block() {
        let text = "```\nlet x = 1;\n```";
        assert_eq!(extract_code_block(text).as_deref(), Some("let x = 1;"));
    }

    #[test]
    fn test_extract_first_of_several() {
        let text = "```rust\nfn a() {}\n```\nand\n```cpp\nint b();\n```";
        assert_eq!(extract_code_block(text).as_deref(), Some("fn a() {}"));
    }

    #[test]
    fn test_extract_unterminated_block() {
        assert_eq!(extract_code_block("```js\nconsole.log(1)"), None);
        assert_eq!(extract_code_block("no code here"), None);
    }

    #[test]
    fn test_extract_empty_block() {
        assert_eq!(extract_code_block("```\n\n```"), None);
    }

    #[test]
    fn test_clean_markup() {
        let text = "**Analysis**\n```python\nx = 1\n```\n";
        assert_eq!(clean_markup(text), "Analysis\nx = 1");
    }

    #[test]
    fn test_clean_markup_plain_text_untouched() {
        assert_eq!(clean_markup("  a * b  "), "a * b");
    }
}
