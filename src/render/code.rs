//! Code block presentation

use crate::document::{is_terminal_language, CodeBlock};

use super::widget::{CodeView, FileIcon};

/// Blocks longer than this start collapsed
pub const COLLAPSE_THRESHOLD: usize = 20;

/// Human-readable language name; unknown languages are upper-cased
pub fn display_name(language: &str) -> String {
    let name = match language {
        "js" | "javascript" => "JavaScript",
        "ts" | "typescript" => "TypeScript",
        "jsx" => "React JSX",
        "tsx" => "React TSX",
        "py" | "python" => "Python",
        "html" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "sass" => "Sass",
        "json" => "JSON",
        "bash" => "Bash",
        "shell" => "Shell",
        "sql" => "SQL",
        "yaml" | "yml" => "YAML",
        "md" | "markdown" => "Markdown",
        "php" => "PHP",
        "java" => "Java",
        "c" => "C",
        "cpp" => "C++",
        "csharp" => "C#",
        "go" => "Go",
        "rust" => "Rust",
        "swift" => "Swift",
        "kotlin" => "Kotlin",
        "dart" => "Dart",
        "ruby" => "Ruby",
        "vue" => "Vue",
        "svelte" => "Svelte",
        other => return other.to_uppercase(),
    };
    name.to_string()
}

/// Filename shown in the code header: the block title, else a per-language
/// default
pub fn default_filename(language: &str, title: Option<&str>) -> String {
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        return title.to_string();
    }

    match language {
        "js" | "javascript" => "example.js",
        "ts" | "typescript" => "example.ts",
        "jsx" => "Component.jsx",
        "tsx" => "Component.tsx",
        "py" | "python" => "example.py",
        "html" => "index.html",
        "css" => "styles.css",
        "scss" => "styles.scss",
        "sass" => "styles.sass",
        "json" => "data.json",
        "bash" | "shell" => "script.sh",
        "sql" => "query.sql",
        "yaml" => "config.yaml",
        "yml" => "config.yml",
        "md" | "markdown" => "README.md",
        "php" => "index.php",
        "java" => "Main.java",
        "c" => "main.c",
        "cpp" => "main.cpp",
        "csharp" => "Program.cs",
        "go" => "main.go",
        "rust" => "main.rs",
        "swift" => "main.swift",
        "kotlin" => "Main.kt",
        "dart" => "main.dart",
        "ruby" => "main.rb",
        "vue" => "App.vue",
        "svelte" => "App.svelte",
        _ => "example.txt",
    }
    .to_string()
}

pub fn file_icon(language: &str) -> FileIcon {
    match language {
        "js" | "javascript" | "ts" | "typescript" | "jsx" | "tsx" => FileIcon::Script,
        "json" => FileIcon::Data,
        "html" => FileIcon::Markup,
        "css" => FileIcon::Style,
        lang if is_terminal_language(lang) => FileIcon::Terminal,
        _ => FileIcon::Generic,
    }
}

pub fn code_view(block: &CodeBlock) -> CodeView {
    let language = block.language.as_str();
    CodeView {
        language: block.language.clone(),
        display_name: display_name(language),
        filename: default_filename(language, block.title.as_deref()),
        icon: file_icon(language),
        terminal: is_terminal_language(language),
        show_line_numbers: true,
        collapsed: block.lines.len() > COLLAPSE_THRESHOLD,
        lines: block.lines.clone(),
        copy_text: block.raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{build_lines, HighlightSet};

    fn block(language: &str, title: Option<&str>, line_count: usize) -> CodeBlock {
        let content: Vec<String> = (0..line_count).map(|i| format!("line {}", i)).collect();
        let content: Vec<&str> = content.iter().map(String::as_str).collect();
        CodeBlock {
            language: language.to_string(),
            title: title.map(str::to_string),
            meta: None,
            raw: content.join("\n"),
            lines: build_lines(&content, language, &HighlightSet::default(), 2),
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(display_name("ts"), "TypeScript");
        assert_eq!(display_name("toml"), "TOML");
        assert_eq!(default_filename("rust", None), "main.rs");
        assert_eq!(default_filename("rust", Some("lib.rs")), "lib.rs");
        assert_eq!(default_filename("haskell", None), "example.txt");
    }

    #[test]
    fn test_code_view() {
        let view = code_view(&block("zsh", None, 3));
        assert!(view.terminal);
        assert_eq!(view.icon, FileIcon::Terminal);
        assert_eq!(view.display_name, "ZSH");
        assert_eq!(view.lines.len(), 3);
        assert!(!view.collapsed);
    }

    #[test]
    fn test_collapse_threshold() {
        assert!(!code_view(&block("rust", None, 20)).collapsed);
        assert!(code_view(&block("rust", None, 21)).collapsed);
    }
}
