//! Static HTML output for a view subtree.

use crate::view::{NodeId, NodeKind, ViewTree};

/// Options for HTML output
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Keep `editor-*` classes, `data-*` tags and `draggable`
    pub editor_markup: bool,
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            editor_markup: false,
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlOptions {
    pub fn editor() -> Self {
        Self {
            editor_markup: true,
            ..Self::default()
        }
    }
}

struct Context<'a> {
    view: &'a ViewTree,
    options: &'a HtmlOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }
}

/// Serialize a subtree to HTML
pub fn to_html(view: &ViewTree, root: NodeId, options: &HtmlOptions) -> String {
    let mut ctx = Context {
        view,
        options,
        depth: 0,
        buffer: String::new(),
    };
    write_node(root, &mut ctx);
    ctx.buffer
}

impl ViewTree {
    /// Serialize the subtree under `root` to HTML
    pub fn to_html(&self, root: NodeId, options: &HtmlOptions) -> String {
        to_html(self, root, options)
    }
}

/// Wrap body markup in a complete HTML page.
///
/// The body is embedded as-is so whitespace inside text content survives.
pub fn render_document(title: &str, body: &str, options: &HtmlOptions) -> String {
    let view = ViewTree::new();
    let mut ctx = Context {
        view: &view,
        options,
        depth: 0,
        buffer: String::new(),
    };

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.depth += 1;
    ctx.add_line("<head>");
    ctx.depth += 1;
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.add_line(&format!("<title>{}</title>", escape_html(title)));
    ctx.depth -= 1;
    ctx.add_line("</head>");
    ctx.add_line("<body>");
    ctx.add(body);
    if options.pretty && !body.is_empty() && !body.ends_with('\n') {
        ctx.add("\n");
    }
    ctx.add_line("</body>");
    ctx.depth -= 1;
    ctx.add_line("</html>");

    ctx.buffer
}

fn write_node(id: NodeId, ctx: &mut Context<'_>) {
    let view = ctx.view;
    let Some(node) = view.get(id) else {
        return;
    };

    let tag = match &node.kind {
        NodeKind::Text(text) => {
            let escaped = escape_html(text);
            ctx.add_line(&escaped);
            return;
        }
        NodeKind::Element(tag) => tag.clone(),
    };

    let mut open = format!("<{}", tag);

    let classes: Vec<&str> = node
        .classes
        .iter()
        .map(String::as_str)
        .filter(|c| ctx.options.editor_markup || !is_editor_class(c))
        .collect();
    if !classes.is_empty() {
        open.push_str(&format!(" class=\"{}\"", escape_html(&classes.join(" "))));
    }

    for (name, value) in &node.attributes {
        if name == "draggable" && !ctx.options.editor_markup {
            continue;
        }
        open.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
    }

    if ctx.options.editor_markup {
        for (name, value) in &node.data {
            open.push_str(&format!(" data-{}=\"{}\"", name, escape_html(value)));
        }
    }

    if !node.styles.is_empty() {
        let style: Vec<String> = node
            .styles
            .iter()
            .map(|(key, value)| format!("{}: {};", key, value))
            .collect();
        open.push_str(&format!(" style=\"{}\"", escape_html(&style.join(" "))));
    }

    let children = node.children().to_vec();

    if children.is_empty() && is_self_closing(&tag) {
        open.push_str(" />");
        ctx.add_line(&open);
        return;
    }

    open.push('>');

    // Single text child stays on one line
    if let [only] = children.as_slice() {
        if let Some(NodeKind::Text(text)) = view.get(*only).map(|n| &n.kind) {
            let line = format!("{}{}</{}>", open, escape_html(text), tag);
            ctx.add_line(&line);
            return;
        }
    }

    if children.is_empty() {
        ctx.add_line(&format!("{}</{}>", open, tag));
        return;
    }

    ctx.add_line(&open);
    ctx.depth += 1;
    for child in children {
        write_node(child, ctx);
    }
    ctx.depth -= 1;
    ctx.add_line(&format!("</{}>", tag));
}

fn is_editor_class(class: &str) -> bool {
    class.starts_with("editor-") || class == crate::drag::DRAGGING_CLASS
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "img"
            | "input"
            | "br"
            | "hr"
            | "meta"
            | "link"
            | "area"
            | "base"
            | "col"
            | "embed"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::VNode;

    #[test]
    fn test_plain_output_strips_editor_markup() {
        let mut view = ViewTree::new();
        let (root, _) = view.build(
            &VNode::element("section")
                .with_class("rich-text")
                .with_class("editor-section")
                .with_attr("draggable", "true")
                .with_child(VNode::element("h2").with_text("Tom & Jerry"))
                .with_child(VNode::element("img").with_attr("src", "/a.png")),
        );
        view.set_data(root, "section-id", "s1");

        let html = to_html(&view, root, &HtmlOptions::default());
        assert_eq!(
            html,
            "<section class=\"rich-text\">\n  <h2>Tom &amp; Jerry</h2>\n  <img src=\"/a.png\" />\n</section>\n"
        );

        let editor = to_html(&view, root, &HtmlOptions::editor());
        assert!(editor.contains("class=\"rich-text editor-section\""));
        assert!(editor.contains("data-section-id=\"s1\""));
        assert!(editor.contains("draggable=\"true\""));
    }

    #[test]
    fn test_styles_are_inlined() {
        let mut view = ViewTree::new();
        let (root, _) = view.build(
            &VNode::element("p")
                .with_style("color", "red")
                .with_style("font-size", "12px"),
        );
        let html = to_html(
            &view,
            root,
            &HtmlOptions {
                pretty: false,
                ..HtmlOptions::default()
            },
        );
        assert_eq!(html, "<p style=\"color: red; font-size: 12px;\"></p>");
    }

    #[test]
    fn test_document_wrapper() {
        let page = render_document("Home <1>", "<p>hi</p>\n", &HtmlOptions::default());
        assert!(page.starts_with("<!DOCTYPE html>\n<html>\n"));
        assert!(page.contains("<title>Home &lt;1&gt;</title>"));
        assert!(page.contains("  <body>\n<p>hi</p>\n  </body>\n"));
    }

    #[test]
    fn test_document_keeps_multiline_text() {
        let mut view = ViewTree::new();
        let (root, _) = view.build(
            &VNode::element("div").with_child(VNode::element("textarea").with_text("a\n\nb")),
        );
        let body = to_html(&view, root, &HtmlOptions::default());
        let page = render_document("Notes", &body, &HtmlOptions::default());

        assert!(page.contains("<textarea>a\n\nb</textarea>"));
    }
}
