//! Two-stage parser.
//!
//! The pest grammar in `grammar/liquid_html.pest` produces a flat sequence of
//! [concrete nodes](concrete::ConcreteNode), which the tree builder then nests
//! into a [`Document`].

mod concrete;
mod markup;
mod tree;

use crate::{ast::Document, error::ParseError};
use pest_derive::Parser;

pub use tree::ParseMode;
pub(crate) use concrete::parse_concrete;
pub(crate) use tree::build_tree;

#[derive(Parser)]
#[grammar = "grammar/liquid_html.pest"]
pub(crate) struct LiquidHtmlParser;

/// Parse source text into a [`Document`].
///
/// The returned tree isn't augmented yet, see [`crate::augment`].
pub fn parse(source: &str, mode: ParseMode) -> Result<Document<'_>, ParseError> {
    let concrete = parse_concrete(source)?;
    log::debug!("parsed {} concrete nodes", concrete.len());
    let document = build_tree(source, concrete, mode)?;
    log::debug!("built document with {} nodes", document.len());
    Ok(document)
}
