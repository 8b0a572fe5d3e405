//! Tolerant markup tree for wiki pages.
//!
//! Wiki HTML is parsed into an arena of element and text nodes. The parser
//! never fails: unknown closing tags are ignored, unclosed elements are closed
//! at the end, and the implicit end tags of `li`, `dt`, `dd`, `p` and table
//! rows are inferred. Selection supports compound selectors of the form
//! `tag.class#id[attr]`.

use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

impl Document {
    pub fn parse(html: &str) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Element {
                    tag: "#root".to_string(),
                    attrs: Vec::new(),
                },
            }],
        };
        let mut stack = vec![NodeId(0)];
        let mut rest = html;

        while !rest.is_empty() {
            let Some(lt) = rest.find('<') else {
                doc.push_text(&stack, rest);
                break;
            };
            if lt > 0 {
                doc.push_text(&stack, &rest[..lt]);
            }
            rest = &rest[lt..];

            if let Some(after) = rest.strip_prefix("<!--") {
                rest = after.find("-->").map_or("", |end| &after[end + 3..]);
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
                continue;
            }
            if let Some(after) = rest.strip_prefix("</") {
                let end = after.find('>').unwrap_or(after.len());
                let name = after[..end].trim().to_ascii_lowercase();
                doc.close(&mut stack, &name);
                rest = after.get(end + 1..).unwrap_or("");
                continue;
            }

            let Some((tag, attrs, self_closing, consumed)) = parse_open_tag(rest) else {
                // a stray '<' is text
                doc.push_text(&stack, "<");
                rest = &rest[1..];
                continue;
            };
            rest = &rest[consumed..];

            doc.close_implied(&mut stack, &tag);
            let id = doc.push_element(&stack, tag.clone(), attrs);
            if RAW_TEXT_TAGS.contains(&tag.as_str()) {
                let closing = format!("</{tag}");
                let end = find_ascii_case_insensitive(rest, &closing).unwrap_or(rest.len());
                rest = rest[end..].find('>').map_or("", |gt| &rest[end + gt + 1..]);
                continue;
            }
            if !self_closing && !VOID_TAGS.contains(&tag.as_str()) {
                stack.push(id);
            }
        }
        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_text(&mut self, stack: &[NodeId], raw: &str) {
        let parent = stack.last().copied().unwrap_or(NodeId(0));
        self.push_node(parent, NodeKind::Text(decode_entities(raw)));
    }

    fn push_element(&mut self, stack: &[NodeId], tag: String, attrs: Vec<(String, String)>) -> NodeId {
        let parent = stack.last().copied().unwrap_or(NodeId(0));
        self.push_node(parent, NodeKind::Element { tag, attrs })
    }

    fn close(&self, stack: &mut Vec<NodeId>, name: &str) {
        if let Some(pos) = stack.iter().rposition(|id| self.tag(*id) == Some(name)) {
            if pos > 0 {
                stack.truncate(pos);
            }
        }
    }

    /// Close elements whose end tag is implied by opening `tag`.
    fn close_implied(&self, stack: &mut Vec<NodeId>, tag: &str) {
        let (closes, scope): (&[&str], &[&str]) = match tag {
            "li" => (&["li"], &["ul", "ol"]),
            "dt" | "dd" => (&["dt", "dd"], &["dl"]),
            "tr" => (&["tr", "td", "th"], &["table", "tbody", "thead"]),
            "td" | "th" => (&["td", "th"], &["tr"]),
            "p" | "div" | "ul" | "ol" | "dl" | "table" | "h1" | "h2" | "h3" | "h4" => {
                (&["p"], &["div", "td", "li", "dd"])
            }
            _ => return,
        };
        for pos in (1..stack.len()).rev() {
            let Some(open) = self.tag(stack[pos]) else {
                continue;
            };
            if scope.contains(&open) {
                return;
            }
            if closes.contains(&open) {
                stack.truncate(pos);
                return;
            }
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[][..], |node| node.children.as_slice())
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    /// Element siblings after `id`, in document order.
    pub fn next_element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        self.element_children(parent)
            .skip_while(|sibling| *sibling != id)
            .skip(1)
            .collect()
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.next_element_siblings(id).into_iter().next()
    }

    /// Nearest ancestor with the given tag.
    pub fn ancestor(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.tag(node) == Some(tag) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// All descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn find_all(&self, id: NodeId, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        self.descendants(id)
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect()
    }

    pub fn find(&self, id: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector);
        self.descendants(id)
            .into_iter()
            .find(|node| selector.matches(self, *node))
    }

    /// Matching element children of `id` only.
    pub fn find_children(&self, id: NodeId, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        self.element_children(id)
            .filter(|node| selector.matches(self, *node))
            .collect()
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text(text)) = self.nodes.get(id.0).map(|node| &node.kind) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(text) = &self.nodes[node.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    /// Text of the direct text children of `id`.
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|child| match &self.nodes[child.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                NodeKind::Element { .. } => None,
            })
            .collect()
    }

    /// [clean_text] of [Document::text].
    pub fn clean_text(&self, id: NodeId) -> String {
        clean_text(&self.text(id))
    }
}

/// NFKD-normalise, trim, and collapse runs of whitespace.
pub fn clean_text(raw: &str) -> String {
    let normalized: String = raw.nfkd().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Default)]
struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
    id: Option<String>,
    attrs: Vec<String>,
}

impl Selector {
    fn parse(raw: &str) -> Self {
        let mut selector = Self::default();
        let mut rest = raw.trim();
        let tag_end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
        if tag_end > 0 {
            selector.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            match marker {
                '[' => {
                    let end = body.find(']').unwrap_or(body.len());
                    selector.attrs.push(body[..end].to_string());
                    rest = body.get(end + 1..).unwrap_or("");
                }
                _ => {
                    let end = body.find(['.', '#', '[']).unwrap_or(body.len());
                    let name = body[..end].to_string();
                    if marker == '#' {
                        selector.id = Some(name);
                    } else {
                        selector.classes.push(name);
                    }
                    rest = &body[end..];
                }
            }
        }
        selector
    }

    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag(id) else {
            return false;
        };
        self.tag.as_deref().map_or(true, |want| want == tag)
            && self.classes.iter().all(|class| doc.has_class(id, class))
            && self
                .id
                .as_deref()
                .map_or(true, |want| doc.attr(id, "id") == Some(want))
            && self.attrs.iter().all(|attr| doc.has_attr(id, attr))
    }
}

type OpenTag = (String, Vec<(String, String)>, bool, usize);

fn parse_open_tag(input: &str) -> Option<OpenTag> {
    let bytes = input.as_bytes();
    let mut i = 1;
    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':') {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    let tag = input[name_start..i].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            None => return Some((tag, attrs, self_closing, input.len())),
            Some(b'>') => return Some((tag, attrs, self_closing, i + 1)),
            Some(b'/') => {
                self_closing = true;
                i += 1;
            }
            Some(_) => {
                let key_start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                {
                    i += 1;
                }
                let key = input[key_start..i].to_ascii_lowercase();
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                let mut value = String::new();
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    match bytes.get(i) {
                        Some(&quote @ (b'"' | b'\'')) => {
                            let start = i + 1;
                            let end = input[start..]
                                .find(quote as char)
                                .map_or(input.len(), |offset| start + offset);
                            value = decode_entities(&input[start..end]);
                            i = (end + 1).min(input.len());
                        }
                        _ => {
                            let start = i;
                            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                                i += 1;
                            }
                            value = decode_entities(&input[start..i]);
                        }
                    }
                }
                if !key.is_empty() {
                    self_closing = false;
                    attrs.push((key, value));
                }
            }
        }
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    lower.find(&needle.to_ascii_lowercase())
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';').filter(|semi| *semi <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            "ndash" => Some('\u{2013}'),
            "mdash" => Some('\u{2014}'),
            "minus" => Some('\u{2212}'),
            "times" => Some('\u{d7}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implied_list_item_ends() {
        let doc = Document::parse("<ul><li>one<li>two <ul><li>nested</ul></ul>");
        let ul = doc.find(doc.root(), "ul").unwrap();
        let items = doc.find_children(ul, "li");
        assert_eq!(items.len(), 2);
        assert_eq!(doc.clean_text(items[1]), "two nested");
    }

    #[test]
    fn selectors_match_tag_class_id_and_attribute() {
        let doc = Document::parse(
            r#"<div class="skill skill_q"><span id="Items" data-param="x">A</span></div>"#,
        );
        assert!(doc.find(doc.root(), "div.skill.skill_q").is_some());
        assert!(doc.find(doc.root(), "span#Items").is_some());
        assert!(doc.find(doc.root(), "span[data-param]").is_some());
        assert!(doc.find(doc.root(), "span[data-item]").is_none());
    }

    #[test]
    fn entities_and_nfkd_cleanup() {
        let doc = Document::parse("<p>Unique&nbsp;&ndash; Bonus &amp; more &#8722;5</p>");
        let p = doc.find(doc.root(), "p").unwrap();
        assert_eq!(doc.clean_text(p), "Unique \u{2013} Bonus & more \u{2212}5");
    }

    #[test]
    fn comments_and_scripts_are_skipped() {
        let doc = Document::parse("<div><!-- <p>x</p> --><script>if (a < b) {}</script>ok</div>");
        let div = doc.find(doc.root(), "div").unwrap();
        assert_eq!(doc.clean_text(div), "ok");
    }

    #[test]
    fn siblings_follow_document_order() {
        let doc = Document::parse("<h3>A</h3><dl><dt>x</dt></dl><ul><li>y</li></ul><h2>B</h2>");
        let h3 = doc.find(doc.root(), "h3").unwrap();
        let tags: Vec<_> = doc
            .next_element_siblings(h3)
            .into_iter()
            .filter_map(|id| doc.tag(id))
            .collect();
        assert_eq!(tags, vec!["dl", "ul", "h2"]);
    }
}
