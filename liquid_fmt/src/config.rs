//! Types about configuration.

#[cfg(feature = "config_serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// The whole configuration of liquid_fmt.
pub struct FormatOptions {
    #[cfg_attr(feature = "config_serde", serde(flatten))]
    pub layout: LayoutOptions,
    #[cfg_attr(feature = "config_serde", serde(flatten))]
    pub language: LanguageOptions,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// Configuration related to layout, such as indentation or print width.
pub struct LayoutOptions {
    /// Line width that the printer will try to fit in.
    pub print_width: usize,
    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,
    /// Size of one indentation level, also the width of a tab.
    pub indent_width: usize,
    pub line_break: LineBreak,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            print_width: 80,
            use_tabs: false,
            indent_width: 2,
            line_break: LineBreak::Lf,
        }
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase"))]
pub enum LineBreak {
    #[default]
    Lf,
    Crlf,
}

impl From<LineBreak> for tiny_pretty::LineBreak {
    fn from(value: LineBreak) -> Self {
        match value {
            LineBreak::Lf => tiny_pretty::LineBreak::Lf,
            LineBreak::Crlf => tiny_pretty::LineBreak::Crlf,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// Configuration related to syntax.
pub struct LanguageOptions {
    /// Preferred quotes of Liquid string literals.
    pub liquid_quotes: Quotes,

    /// Preferred quotes of HTML attribute values.
    pub html_quotes: Quotes,

    /// Put every attribute on its own line when an element has more than one.
    pub single_attribute_per_line: bool,

    pub whitespace_sensitivity: WhitespaceSensitivity,

    /// Keep `<link>` tags on a single line whatever their width.
    pub single_line_link_tags: bool,

    /// Indent the content of `<script>` tags.
    pub script_indent: bool,

    /// Indent the content of `<style>` tags.
    pub style_indent: bool,

    /// Text of a leading comment that disables formatting for the whole file.
    pub ignore_file_comment_directive: String,

    /// Text of a comment that disables formatting for the next node.
    pub ignore_comment_directive: String,
}

impl Default for LanguageOptions {
    fn default() -> Self {
        Self {
            liquid_quotes: Quotes::Double,
            html_quotes: Quotes::Double,
            single_attribute_per_line: false,
            whitespace_sensitivity: WhitespaceSensitivity::Css,
            single_line_link_tags: false,
            script_indent: true,
            style_indent: true,
            ignore_file_comment_directive: "liquid-fmt-ignore-file".into(),
            ignore_comment_directive: "liquid-fmt-ignore".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase"))]
pub enum Quotes {
    #[default]
    Double,
    Single,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase"))]
/// How whitespace around and inside HTML elements is treated.
pub enum WhitespaceSensitivity {
    /// Follow the default CSS `display` of each element.
    #[default]
    Css,
    /// Treat every element as inline.
    Strict,
    /// Treat every element as block.
    Ignore,
}
