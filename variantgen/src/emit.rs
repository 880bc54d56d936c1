//! Ordered output directives and the renderers that consume them
//!
//! Every generated artifact is first expressed as a list of [`Directive`]s.
//! Layout lives entirely in the [`Renderer`]; the directives only fix order and
//! nesting.

use crate::attributes::{AttributeKind, AttributeOption, AttributeSpec, AttributeValue};
use crate::config::GenerationConfig;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum Directive {
    /// Text emitted verbatim at the current indentation
    Literal { text: String },
    /// A comment line
    Comment { text: String },
    Attribute { spec: AttributeSpec },
    /// A header followed by a nested body one level deeper
    Block { header: String, body: Vec<Directive> },
    Blank,
}

impl Directive {
    pub fn literal(text: impl Into<String>) -> Self {
        Directive::Literal { text: text.into() }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Directive::Comment { text: text.into() }
    }

    pub fn attribute(spec: AttributeSpec) -> Self {
        Directive::Attribute { spec }
    }

    pub fn block(header: impl Into<String>, body: Vec<Directive>) -> Self {
        Directive::Block {
            header: header.into(),
            body,
        }
    }
}

/// Turns directives into text in some target syntax
pub trait Renderer {
    fn render(&self, directives: &[Directive]) -> String;
}

/// Plain-text renderer with brace blocks and bracketed attributes
#[derive(Debug, Clone)]
pub struct TextRenderer {
    indent: String,
    item_separator: String,
}

impl TextRenderer {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            indent: config.indent(),
            item_separator: config.item_separator.clone(),
        }
    }

    fn render_into(&self, out: &mut String, directives: &[Directive], depth: usize) {
        let indent = self.indent.repeat(depth);
        for directive in directives {
            match directive {
                Directive::Literal { text } => {
                    for line in text.lines() {
                        out.push_str(&indent);
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                Directive::Comment { text } => {
                    if text.is_empty() {
                        out.push_str(&indent);
                        out.push_str("#\n");
                    }
                    for line in text.lines() {
                        out.push_str(&indent);
                        out.push_str("# ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                Directive::Attribute { spec } => {
                    out.push_str(&indent);
                    out.push_str(&self.attribute(spec));
                    out.push('\n');
                }
                Directive::Block { header, body } => {
                    out.push_str(&indent);
                    out.push_str(header);
                    out.push_str(" {\n");
                    self.render_into(out, body, depth + 1);
                    out.push_str(&indent);
                    out.push_str("}\n");
                }
                Directive::Blank => out.push('\n'),
            }
        }
    }

    /// `[Kind(option, Name=value)]`; a parameter type renders as `[Type]`
    pub fn attribute(&self, spec: &AttributeSpec) -> String {
        if spec.kind == AttributeKind::ParameterType {
            let type_name = spec
                .present_options()
                .map(|o| self.value(&o.value))
                .collect::<Vec<_>>()
                .join(&self.item_separator);
            return type_name;
        }
        let options = spec
            .present_options()
            .map(|o| self.option(o))
            .collect::<Vec<_>>()
            .join(&self.item_separator);
        format!("[{}({})]", spec.kind, options)
    }

    fn option(&self, option: &AttributeOption) -> String {
        match (&option.name, &option.value) {
            (Some(name), AttributeValue::Flag) => name.clone(),
            (Some(name), value) => format!("{name}={}", self.value(value)),
            (None, value) => self.value(value),
        }
    }

    fn value(&self, value: &AttributeValue) -> String {
        match value {
            AttributeValue::Flag => String::new(),
            AttributeValue::Bool(b) => format!("${b}"),
            AttributeValue::Int(i) => i.to_string(),
            AttributeValue::Str(s) => format!("'{}'", escape_single_quoted(s)),
            AttributeValue::TypeRef(t) => format!("[{t}]"),
            AttributeValue::Script(s) => format!("{{{s}}}"),
            AttributeValue::List(items) => format!(
                "({})",
                items
                    .iter()
                    .map(|i| self.value(i))
                    .collect::<Vec<_>>()
                    .join(&self.item_separator)
            ),
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(&GenerationConfig::default())
    }
}

impl Renderer for TextRenderer {
    fn render(&self, directives: &[Directive]) -> String {
        let mut out = String::new();
        self.render_into(&mut out, directives, 0);
        out
    }
}

/// Double single quotes (including typographic ones) and drop line breaks
pub fn escape_single_quoted(value: &str) -> String {
    crate::attributes::single_line(
        &value
            .replace('\'', "''")
            .replace('\u{2018}', "''")
            .replace('\u{2019}', "''"),
        " ",
    )
}
