use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::display::format::escape_html;

/// The closed set of rich-text node kinds the front end knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "doc")]
    Doc,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "mention")]
    Mention,
    #[serde(rename = "contract-mention")]
    ContractMention,
    #[serde(rename = "tweet")]
    Tweet,
    #[serde(rename = "iframe")]
    Iframe,
    #[serde(rename = "image")]
    Image,
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Text => "text",
            NodeKind::Mention => "mention",
            NodeKind::ContractMention => "contract-mention",
            NodeKind::Tweet => "tweet",
            NodeKind::Iframe => "iframe",
            NodeKind::Image => "image",
            NodeKind::Unknown => "unknown",
        }
    }
}

/// Editor document node in the editor's JSON shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub attrs: Map<String, Value>,
    #[serde(default)]
    pub content: Vec<Node>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Renders a node from its attributes and its already rendered children.
pub type RenderFn = fn(&Map<String, Value>, &str) -> String;

#[derive(Clone, Copy)]
pub enum NodeView {
    /// Plain HTML for the kind.
    Native,
    /// Custom markup, wrapped in `<div class="{kind} contents">`.
    Custom(RenderFn),
}

/// Node-kind to rendering-strategy table, built once at startup.
#[derive(Clone, Default)]
pub struct NodeViewRegistry {
    views: HashMap<NodeKind, NodeView>,
}

impl NodeViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the front end's custom views for embeds and mentions.
    pub fn standard() -> Self {
        Self::new()
            .with_view(NodeKind::Mention, NodeView::Custom(render_mention))
            .with_view(NodeKind::ContractMention, NodeView::Custom(render_contract_mention))
            .with_view(NodeKind::Tweet, NodeView::Custom(render_tweet))
            .with_view(NodeKind::Iframe, NodeView::Custom(render_iframe))
            .with_view(NodeKind::Image, NodeView::Custom(render_image))
    }

    pub fn with_view(mut self, kind: NodeKind, view: NodeView) -> Self {
        self.views.insert(kind, view);
        self
    }

    pub fn is_custom(&self, kind: NodeKind) -> bool {
        matches!(self.views.get(&kind), Some(NodeView::Custom(_)))
    }

    pub fn render(&self, node: &Node) -> String {
        let children: String = node.content.iter().map(|child| self.render(child)).collect();

        match self.views.get(&node.kind).copied().unwrap_or(NodeView::Native) {
            NodeView::Custom(render) => format!(
                r#"<div class="{} contents">{}</div>"#,
                node.kind.name(),
                render(&node.attrs, &children)
            ),
            NodeView::Native => match node.kind {
                NodeKind::Paragraph => format!("<p>{}</p>", children),
                NodeKind::Text => escape_html(node.text.as_deref().unwrap_or_default()),
                _ => children,
            },
        }
    }
}

fn attr(attrs: &Map<String, Value>, key: &str) -> String {
    match attrs.get(key) {
        Some(Value::String(s)) => escape_html(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn render_mention(attrs: &Map<String, Value>, _children: &str) -> String {
    let mut label = attr(attrs, "label");
    if label.is_empty() {
        label = attr(attrs, "id");
    }
    format!(r#"<a href="/{0}">@{0}</a>"#, label)
}

fn render_contract_mention(attrs: &Map<String, Value>, _children: &str) -> String {
    let label = attr(attrs, "label");
    format!(r#"<a href="/{0}">{0}</a>"#, label)
}

fn render_tweet(attrs: &Map<String, Value>, _children: &str) -> String {
    format!(
        r#"<blockquote class="twitter-tweet"><a href="https://twitter.com/x/status/{}"></a></blockquote>"#,
        attr(attrs, "tweetId")
    )
}

fn render_iframe(attrs: &Map<String, Value>, _children: &str) -> String {
    format!(
        r#"<iframe src="{}" frameborder="0" allowfullscreen></iframe>"#,
        attr(attrs, "src")
    )
}

fn render_image(attrs: &Map<String, Value>, _children: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}">"#,
        attr(attrs, "src"),
        attr(attrs, "alt")
    )
}
