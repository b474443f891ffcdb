use html_escape::encode_text;

use crate::annotation::Segment;
use crate::editing::{Document, Inline, Node};

impl Document {
    /// Renders the document as HTML.
    ///
    /// Each block becomes a `<div>` (an empty one holds a `<br>` so it keeps
    /// its height), converted runs are wrapped in
    /// `<span data-converted="true">` and readings sit in
    /// `<span class="reading">`.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Block(block) if block.is_empty() => out.push_str("<div><br></div>"),
                Node::Block(block) => {
                    out.push_str("<div>");
                    for inline in block.inlines() {
                        push_inline(&mut out, inline);
                    }
                    out.push_str("</div>");
                }
                Node::Loose(inline) => push_inline(&mut out, inline),
            }
        }
        out
    }
}

fn push_inline(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(text) => out.push_str(&encode_text(text)),
        Inline::Annotated(span) => {
            out.push_str(r#"<span data-converted="true">"#);
            for segment in span.segments() {
                match segment {
                    Segment::Plain(text) => out.push_str(&encode_text(text)),
                    Segment::Ruby { base, reading } => {
                        out.push_str(&encode_text(base));
                        out.push_str(r#"<span class="reading">("#);
                        out.push_str(&encode_text(reading));
                        out.push_str(")</span>");
                    }
                }
            }
            out.push_str("</span>");
        }
    }
}
