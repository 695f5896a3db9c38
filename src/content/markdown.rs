//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::html_escape;

/// Renders content bodies to HTML
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Option<Theme>,
    line_numbers: bool,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::from_config(&HighlightConfig::default())
    }

    pub fn from_config(config: &HighlightConfig) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = if config.enable {
            if !themes.contains_key(&config.theme) {
                tracing::warn!(
                    "Unknown highlight theme {:?}, code blocks will not be colored",
                    config.theme
                );
            }
            themes.remove(&config.theme)
        } else {
            None
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers: config.line_number,
        }
    }

    /// Render a Markdown body to HTML
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a code block
        let mut code_lang: Option<String> = None;
        let mut code = String::new();

        for event in Parser::new_ext(markdown, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_lang = Some(match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .unwrap_or_default()
                            .to_string(),
                        CodeBlockKind::Indented => String::new(),
                    });
                    code.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_lang.take().unwrap_or_default();
                    let block = self.highlight_code(&code, &lang);
                    events.push(Event::Html(CowStr::from(block)));
                }
                Event::Text(text) if code_lang.is_some() => code.push_str(&text),
                other => events.push(other),
            }
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        output
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let class = if lang.is_empty() { "text" } else { lang };

        let highlighted = self.theme.as_ref().and_then(|theme| {
            let syntax = self
                .syntax_set
                .find_syntax_by_token(class)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        let class = html_escape(class);
        match highlighted {
            Some(html) if self.line_numbers => with_line_numbers(&html, &class),
            Some(html) => format!(r#"<figure class="highlight {}">{}</figure>"#, class, html),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                class,
                html_escape(code)
            ),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap highlighted lines in a gutter table
fn with_line_numbers(highlighted: &str, class: &str) -> String {
    let count = highlighted.lines().count().max(1);
    let gutter = (1..=count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        class, gutter, highlighted
    )
}
