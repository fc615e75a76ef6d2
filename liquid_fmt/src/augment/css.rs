//! Default CSS `display` and `white-space` of HTML elements and Liquid tags.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CssDisplay {
    #[default]
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Table,
    TableCaption,
    TableColumnGroup,
    TableColumn,
    TableHeaderGroup,
    TableRowGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
    None,
}

impl CssDisplay {
    pub fn is_block_like(self) -> bool {
        matches!(self, CssDisplay::Block | CssDisplay::ListItem) || self.is_table()
    }

    pub fn is_table(self) -> bool {
        matches!(
            self,
            CssDisplay::Table
                | CssDisplay::TableCaption
                | CssDisplay::TableColumnGroup
                | CssDisplay::TableColumn
                | CssDisplay::TableHeaderGroup
                | CssDisplay::TableRowGroup
                | CssDisplay::TableFooterGroup
                | CssDisplay::TableRow
                | CssDisplay::TableCell
        )
    }

    /// Whitespace just inside the parent's boundaries only matters for
    /// these displays.
    pub(crate) fn is_inner_sensitive(self) -> bool {
        !self.is_block_like() && self != CssDisplay::InlineBlock
    }

    pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "inline" => Some(CssDisplay::Inline),
            "block" => Some(CssDisplay::Block),
            "inline-block" => Some(CssDisplay::InlineBlock),
            "list-item" => Some(CssDisplay::ListItem),
            "table" => Some(CssDisplay::Table),
            "table-caption" => Some(CssDisplay::TableCaption),
            "table-column-group" => Some(CssDisplay::TableColumnGroup),
            "table-column" => Some(CssDisplay::TableColumn),
            "table-header-group" => Some(CssDisplay::TableHeaderGroup),
            "table-row-group" => Some(CssDisplay::TableRowGroup),
            "table-footer-group" => Some(CssDisplay::TableFooterGroup),
            "table-row" => Some(CssDisplay::TableRow),
            "table-cell" => Some(CssDisplay::TableCell),
            "none" => Some(CssDisplay::None),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CssWhitespace {
    #[default]
    Normal,
    Pre,
    PreWrap,
    PreLine,
    NoWrap,
}

impl CssWhitespace {
    pub fn is_pre_like(self) -> bool {
        matches!(
            self,
            CssWhitespace::Pre | CssWhitespace::PreWrap | CssWhitespace::PreLine
        )
    }
}

static BLOCK_ELEMENTS: [&str; 48] = [
    "html",
    "body",
    "address",
    "blockquote",
    "center",
    "div",
    "figure",
    "figcaption",
    "footer",
    "form",
    "header",
    "hr",
    "legend",
    "listing",
    "main",
    "p",
    "plaintext",
    "pre",
    "xmp",
    "search",
    "article",
    "aside",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hgroup",
    "nav",
    "section",
    "dir",
    "dd",
    "dl",
    "dt",
    "menu",
    "ol",
    "ul",
    "fieldset",
    "details",
    "summary",
    "dialog",
    "option",
    "optgroup",
    "source",
    "track",
    "script",
    "param",
];

static HIDDEN_ELEMENTS: [&str; 12] = [
    "area", "base", "basefont", "datalist", "head", "link", "meta", "noembed", "noframes", "rp",
    "style", "title",
];

static INLINE_BLOCK_ELEMENTS: [&str; 7] = [
    "button", "meter", "progress", "object", "video", "audio", "select",
];

/// Default display of an HTML element.
pub(crate) fn element_display(name: &str) -> CssDisplay {
    let name = name.to_ascii_lowercase();
    let name = name.as_str();
    match name {
        "li" => CssDisplay::ListItem,
        "table" => CssDisplay::Table,
        "caption" => CssDisplay::TableCaption,
        "colgroup" => CssDisplay::TableColumnGroup,
        "col" => CssDisplay::TableColumn,
        "thead" => CssDisplay::TableHeaderGroup,
        "tbody" => CssDisplay::TableRowGroup,
        "tfoot" => CssDisplay::TableFooterGroup,
        "tr" => CssDisplay::TableRow,
        "td" | "th" => CssDisplay::TableCell,
        _ if BLOCK_ELEMENTS.contains(&name) => CssDisplay::Block,
        _ if HIDDEN_ELEMENTS.contains(&name) => CssDisplay::None,
        _ if INLINE_BLOCK_ELEMENTS.contains(&name) => CssDisplay::InlineBlock,
        _ => CssDisplay::Inline,
    }
}

/// Default display of a Liquid tag, by tag name.
pub(crate) fn liquid_tag_display(name: &str) -> CssDisplay {
    match name {
        "assign" | "capture" | "comment" | "#" | "layout" | "increment" | "decrement" => {
            CssDisplay::None
        }
        "schema" | "javascript" | "stylesheet" | "style" | "section" | "sections" => {
            CssDisplay::Block
        }
        _ => CssDisplay::Inline,
    }
}

/// Default `white-space` of an HTML element.
pub(crate) fn element_whitespace(name: &str) -> CssWhitespace {
    match name.to_ascii_lowercase().as_str() {
        "pre" | "listing" | "xmp" => CssWhitespace::Pre,
        "textarea" | "plaintext" => CssWhitespace::PreWrap,
        "nobr" => CssWhitespace::NoWrap,
        _ => CssWhitespace::Normal,
    }
}

/// Display given by a `display: block` style directive, found in HTML
/// comments and `{% # %}` tags.
pub(crate) fn display_directive(text: &str) -> Option<CssDisplay> {
    text.trim()
        .strip_prefix("display:")
        .and_then(|value| CssDisplay::from_keyword(value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_defaults() {
        assert_eq!(element_display("DIV"), CssDisplay::Block);
        assert_eq!(element_display("span"), CssDisplay::Inline);
        assert_eq!(element_display("li"), CssDisplay::ListItem);
        assert_eq!(element_display("td"), CssDisplay::TableCell);
        assert_eq!(element_display("meta"), CssDisplay::None);
        assert_eq!(element_display("button"), CssDisplay::InlineBlock);
        assert_eq!(element_display("my-widget"), CssDisplay::Inline);
        assert_eq!(element_whitespace("pre"), CssWhitespace::Pre);
        assert_eq!(element_whitespace("textarea"), CssWhitespace::PreWrap);
    }

    #[test]
    fn liquid_defaults() {
        assert_eq!(liquid_tag_display("assign"), CssDisplay::None);
        assert_eq!(liquid_tag_display("schema"), CssDisplay::Block);
        assert_eq!(liquid_tag_display("if"), CssDisplay::Inline);
    }

    #[test]
    fn directives() {
        assert_eq!(display_directive(" display: block "), Some(CssDisplay::Block));
        assert_eq!(display_directive("display:inline-block"), Some(CssDisplay::InlineBlock));
        assert_eq!(display_directive("display: grid"), None);
        assert_eq!(display_directive("note"), None);
    }
}
