//! Terminal renderer for transcript views.

use std::io::Write;

use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use super::content::{PanelContent, PanelFormat};
use super::disclosure::PanelLayout;
use super::render::{
    AssistantEntry, HandoffEntry, InternalEntry, RenderedEntry, ToolCallCard, ToolCallEntry,
    TranscriptView,
};

const CHEVRON_COLLAPSED: &str = "▶";
const CHEVRON_EXPANDED: &str = "▼";

/// Render style configuration.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub user_color: Color,
    pub assistant_color: Color,
    pub internal_color: Color,
    pub tool_color: Color,
    pub handoff_color: Color,
    pub muted_color: Color,
    /// Syntax-highlight preformatted JSON panels
    pub highlight_json: bool,
    /// Column to wrap panel text at when wrapping is on
    pub wrap_width: usize,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            user_color: Color::Blue,
            assistant_color: Color::Magenta,
            internal_color: Color::DarkYellow,
            tool_color: Color::Cyan,
            handoff_color: Color::Green,
            muted_color: Color::DarkGrey,
            highlight_json: true,
            wrap_width: terminal_width(),
        }
    }
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| cols as usize)
        .unwrap_or(100)
        .saturating_sub(4)
        .max(20)
}

/// Draws a [`TranscriptView`] to any writer.
pub struct TerminalRenderer {
    style: RenderStyle,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::with_style(RenderStyle::default())
    }

    pub fn with_style(style: RenderStyle) -> Self {
        Self {
            style,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Render the whole view.
    pub fn render<W: Write>(&self, out: &mut W, view: &TranscriptView) -> std::io::Result<()> {
        match view {
            TranscriptView::SystemMessage { content } => self.render_system_message(out, content)?,
            TranscriptView::Entries(entries) => {
                for entry in entries {
                    self.render_entry(out, entry)?;
                }
            }
        }
        out.flush()
    }

    pub fn render_entry<W: Write>(&self, out: &mut W, entry: &RenderedEntry) -> std::io::Result<()> {
        match entry {
            RenderedEntry::User { content, .. } => self.render_user(out, content),
            RenderedEntry::Assistant(entry) => self.render_assistant(out, entry),
            RenderedEntry::Internal(entry) => self.render_internal(out, entry),
            RenderedEntry::ToolCalls { calls, .. } => {
                for call in calls {
                    match call {
                        ToolCallEntry::Handoff(handoff) => self.render_handoff(out, handoff)?,
                        ToolCallEntry::Card(card) => self.render_card(out, card)?,
                    }
                }
                Ok(())
            }
            RenderedEntry::Composing => {
                queue!(
                    out,
                    SetForegroundColor(self.style.muted_color),
                    Print("  ● ● ●\n\n"),
                    ResetColor
                )
            }
        }
    }

    fn header<W: Write>(&self, out: &mut W, label: &str, color: Color) -> std::io::Result<()> {
        queue!(
            out,
            SetForegroundColor(color),
            SetAttribute(Attribute::Bold),
            Print(label),
            SetAttribute(Attribute::Reset),
            ResetColor
        )
    }

    fn render_user<W: Write>(&self, out: &mut W, content: &str) -> std::io::Result<()> {
        self.header(out, "User", self.style.user_color)?;
        queue!(out, Print("\n"))?;
        self.render_markdown(out, content)?;
        queue!(out, Print("\n"))
    }

    fn render_fix_marker<W: Write>(&self, out: &mut W, has_fix: bool) -> std::io::Result<()> {
        if has_fix {
            queue!(
                out,
                SetForegroundColor(Color::Red),
                Print("  ⚑ Fix"),
                ResetColor
            )?;
        }
        Ok(())
    }

    fn render_assistant<W: Write>(
        &self,
        out: &mut W,
        entry: &AssistantEntry,
    ) -> std::io::Result<()> {
        self.header(out, &entry.sender, self.style.assistant_color)?;
        self.render_fix_marker(out, entry.fix.is_some())?;
        queue!(out, Print("\n"))?;
        self.render_markdown(out, &entry.content)?;
        if entry.latency_secs > 0 {
            queue!(
                out,
                SetForegroundColor(self.style.muted_color),
                Print(format!("{}s\n", entry.latency_secs)),
                ResetColor
            )?;
        }
        queue!(out, Print("\n"))
    }

    fn render_internal<W: Write>(&self, out: &mut W, entry: &InternalEntry) -> std::io::Result<()> {
        self.header(out, &entry.sender, self.style.internal_color)?;
        queue!(
            out,
            SetForegroundColor(self.style.muted_color),
            Print(" [internal]"),
            ResetColor
        )?;
        self.render_fix_marker(out, entry.fix.is_some())?;
        queue!(out, Print("\n"))?;

        match entry.json_view {
            Some(view) if view.json_mode => {
                self.render_preformatted(out, &entry.formatted_json, view.wrap_text, true)?;
            }
            _ => self.render_markdown(out, entry.visible_text())?,
        }

        queue!(
            out,
            SetForegroundColor(self.style.muted_color),
            Print(format!("+{}s\n\n", entry.latency_secs)),
            ResetColor
        )
    }

    fn render_handoff<W: Write>(&self, out: &mut W, handoff: &HandoffEntry) -> std::io::Result<()> {
        queue!(
            out,
            SetForegroundColor(self.style.handoff_color),
            Print(format!("{} → {}", handoff.from, handoff.to)),
            ResetColor,
            SetForegroundColor(self.style.muted_color),
            Print(format!("  +{}s\n\n", handoff.latency_secs)),
            ResetColor
        )
    }

    fn render_card<W: Write>(&self, out: &mut W, card: &ToolCallCard) -> std::io::Result<()> {
        if let Some(sender) = &card.sender {
            self.header(out, sender, self.style.tool_color)?;
            self.render_fix_marker(out, card.fix.is_some())?;
            queue!(out, Print("\n"))?;
        }

        let status = if card.is_pending() { "⋯ " } else { "✓ " };
        queue!(
            out,
            SetForegroundColor(self.style.muted_color),
            Print(status),
            ResetColor,
            Print(format!("Invoked Tool: {}", card.name)),
        )?;
        if card.layout() == PanelLayout::Expanded {
            let wrap_label = if card.disclosure.wrap_text {
                "  [overflow]"
            } else {
                "  [wrap]"
            };
            queue!(
                out,
                SetForegroundColor(self.style.muted_color),
                Print(wrap_label),
                ResetColor
            )?;
        }
        queue!(out, Print("\n"))?;

        if let Some(description) = &card.description {
            queue!(
                out,
                SetForegroundColor(self.style.muted_color),
                Print(format!("  {}\n", description)),
                ResetColor
            )?;
        }

        let wrap = card.disclosure.wrap_text;
        self.render_panel(out, &card.params, card.params_visible(), wrap)?;
        if let Some(result) = &card.result {
            self.render_panel(out, result, card.result_visible(), wrap)?;
        }
        queue!(out, Print("\n"))
    }

    fn render_panel<W: Write>(
        &self,
        out: &mut W,
        panel: &PanelContent,
        expanded: bool,
        wrap: bool,
    ) -> std::io::Result<()> {
        let chevron = if expanded {
            CHEVRON_EXPANDED
        } else {
            CHEVRON_COLLAPSED
        };
        queue!(
            out,
            SetForegroundColor(self.style.muted_color),
            Print(format!("  {} ", chevron)),
            ResetColor,
            Print(format!("{}\n", panel.kind.label()))
        )?;
        if !expanded {
            return Ok(());
        }
        match panel.format {
            PanelFormat::Markdown => self.render_markdown(out, &panel.body),
            PanelFormat::Preformatted => self.render_preformatted(out, &panel.body, wrap, true),
        }
    }

    fn render_system_message<W: Write>(&self, out: &mut W, content: &str) -> std::io::Result<()> {
        self.header(out, "System message", self.style.tool_color)?;
        queue!(out, Print("\n"))?;
        if content.is_empty() {
            queue!(
                out,
                SetForegroundColor(self.style.muted_color),
                Print("(empty)\n"),
                ResetColor
            )
        } else {
            queue!(out, Print(content), Print("\n"))
        }
    }

    /// Preformatted block, optionally JSON-highlighted.
    fn render_preformatted<W: Write>(
        &self,
        out: &mut W,
        text: &str,
        wrap: bool,
        json: bool,
    ) -> std::io::Result<()> {
        let lines: Vec<String> = text
            .lines()
            .flat_map(|line| {
                if wrap {
                    wrap_line(line, self.style.wrap_width)
                } else {
                    vec![line.to_string()]
                }
            })
            .collect();
        let body = lines.join("\n") + "\n";

        if json && self.style.highlight_json {
            self.render_code_block(out, "json", &body)
        } else {
            for line in body.lines() {
                queue!(
                    out,
                    SetForegroundColor(self.style.muted_color),
                    Print("│ "),
                    ResetColor,
                    Print(line),
                    Print("\n")
                )?;
            }
            Ok(())
        }
    }

    /// Render a code block with syntax highlighting.
    fn render_code_block<W: Write>(&self, out: &mut W, lang: &str, code: &str) -> std::io::Result<()> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self.theme_set.themes.get("base16-ocean.dark") else {
            // Theme set without the default theme: fall back to plain text
            for line in code.lines() {
                queue!(out, Print("│ "), Print(line), Print("\n"))?;
            }
            return Ok(());
        };
        let mut highlighter = HighlightLines::new(syntax, theme);

        for line in LinesWithEndings::from(code) {
            queue!(
                out,
                SetForegroundColor(self.style.muted_color),
                Print("│ "),
                ResetColor
            )?;
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
                    queue!(out, Print(escaped))?;
                }
                Err(_) => queue!(out, Print(line))?,
            }
        }
        queue!(out, ResetColor)
    }

    /// Render markdown content with fenced code blocks highlighted.
    pub fn render_markdown<W: Write>(&self, out: &mut W, content: &str) -> std::io::Result<()> {
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buffer = String::new();

        for line in content.lines() {
            if let Some(rest) = line.strip_prefix("```") {
                if in_code_block {
                    self.render_code_block(out, &code_lang, &code_buffer)?;
                    code_buffer.clear();
                    code_lang.clear();
                    in_code_block = false;
                } else {
                    in_code_block = true;
                    code_lang = rest.trim().to_string();
                }
            } else if in_code_block {
                code_buffer.push_str(line);
                code_buffer.push('\n');
            } else {
                self.render_markdown_line(out, line)?;
            }
        }

        // Unclosed fence
        if in_code_block && !code_buffer.is_empty() {
            self.render_code_block(out, &code_lang, &code_buffer)?;
        }

        Ok(())
    }

    fn render_markdown_line<W: Write>(&self, out: &mut W, line: &str) -> std::io::Result<()> {
        let heading = line
            .strip_prefix("### ")
            .or_else(|| line.strip_prefix("## "))
            .or_else(|| line.strip_prefix("# "));
        if let Some(rest) = heading {
            return queue!(
                out,
                SetForegroundColor(Color::Cyan),
                SetAttribute(Attribute::Bold),
                Print(rest),
                SetAttribute(Attribute::Reset),
                ResetColor,
                Print("\n")
            );
        }

        if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            queue!(
                out,
                SetForegroundColor(Color::Yellow),
                Print("• "),
                ResetColor
            )?;
            self.render_inline_markdown(out, rest)?;
            return queue!(out, Print("\n"));
        }

        if let Some(rest) = line.strip_prefix("> ") {
            queue!(
                out,
                SetForegroundColor(self.style.muted_color),
                Print("│ "),
                ResetColor
            )?;
            self.render_inline_markdown(out, rest)?;
            return queue!(out, Print("\n"));
        }

        if line == "---" || line == "***" || line == "___" {
            return queue!(
                out,
                SetForegroundColor(self.style.muted_color),
                Print("─".repeat(40)),
                ResetColor,
                Print("\n")
            );
        }

        self.render_inline_markdown(out, line)?;
        queue!(out, Print("\n"))
    }

    /// Inline code and bold spans; everything else passes through.
    fn render_inline_markdown<W: Write>(&self, out: &mut W, text: &str) -> std::io::Result<()> {
        let mut rest = text;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('`') {
                if let Some(end) = after.find('`') {
                    queue!(
                        out,
                        SetForegroundColor(Color::Magenta),
                        Print(&after[..end]),
                        ResetColor
                    )?;
                    rest = &after[end + 1..];
                    continue;
                }
            }
            if let Some(after) = rest.strip_prefix("**") {
                if let Some(end) = after.find("**") {
                    queue!(
                        out,
                        SetAttribute(Attribute::Bold),
                        Print(&after[..end]),
                        SetAttribute(Attribute::Reset)
                    )?;
                    rest = &after[end + 2..];
                    continue;
                }
            }

            // Plain run up to the next marker candidate
            let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
            let next = rest[first..]
                .find(['`', '*'])
                .map(|i| i + first)
                .unwrap_or(rest.len());
            queue!(out, Print(&rest[..next]))?;
            rest = &rest[next..];
        }
        Ok(())
    }
}

/// Break a line into chunks of at most `width` characters.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || line.chars().count() <= width {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
