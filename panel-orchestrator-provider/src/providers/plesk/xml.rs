//! Minimal XML tree for Plesk API packets.
//!
//! Packets are small and shallow, so requests are built and responses read
//! through one owned element type instead of per-operation serde structs.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn leaf(name: &str, text: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_all(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn with_text(self, name: &str, text: impl Into<String>) -> Self {
        self.with(Self::leaf(name, text))
    }

    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Descend through `path`, taking the first match at every level.
    pub fn find(&self, path: &[&str]) -> Option<&Self> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Trimmed text at `path`, or `""`.
    pub fn text_at(&self, path: &[&str]) -> &str {
        self.find(path).map_or("", |n| n.text.trim())
    }

    /// Detach the first child called `name`.
    pub fn take_child(&mut self, name: &str) -> Option<Self> {
        let index = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(index))
    }

    fn write(&self, out: &mut String) {
        if self.children.is_empty() && self.text.is_empty() {
            out.push_str(&format!("<{}/>", self.name));
            return;
        }
        out.push_str(&format!("<{}>", self.name));
        out.push_str(&escape(self.text.as_str()));
        for child in &self.children {
            child.write(out);
        }
        out.push_str(&format!("</{}>", self.name));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    /// Parse a document into its root element.
    pub fn parse(document: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(document);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Self> = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(Self::new(&String::from_utf8_lossy(e.local_name().as_ref())));
                }
                Ok(Event::Empty(e)) => {
                    let node = Self::new(&String::from_utf8_lossy(e.local_name().as_ref()));
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| e.to_string())?;
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::End(_)) => {
                    let node = stack.pop().ok_or("unbalanced closing tag")?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                }
                Ok(Event::Eof) => return Err("unexpected end of document".to_string()),
                Ok(_) => {}
                Err(e) => {
                    return Err(format!(
                        "at position {}: {e}",
                        reader.buffer_position()
                    ));
                }
            }
        }
    }
}

/// Wrap one operator element into a complete request packet.
pub(crate) fn packet(operator: &XmlNode) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><packet>{}</packet>",
        operator.render()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_packet_with_escaping() {
        let op = XmlNode::new("webspace").with(
            XmlNode::new("del").with(XmlNode::new("filter").with_text("name", "a&b.com")),
        );
        assert_eq!(
            packet(&op),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><packet><webspace><del><filter>\
             <name>a&amp;b.com</name></filter></del></webspace></packet>"
        );
        assert_eq!(XmlNode::new("gen_info").render(), "<gen_info/>");
    }

    #[test]
    fn parses_response_tree() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
            <packet version="1.6.9.1">
              <webspace><add><result>
                <status>ok</status>
                <id>57</id>
                <guid/>
              </result></add></webspace>
            </packet>"#;
        let root = XmlNode::parse(doc).unwrap();
        assert_eq!(root.name, "packet");
        assert_eq!(root.text_at(&["webspace", "add", "result", "id"]), "57");
        assert_eq!(root.text_at(&["webspace", "add", "result", "guid"]), "");
        assert!(root.find(&["webspace", "get"]).is_none());
    }

    #[test]
    fn unescapes_text_and_collects_repeats() {
        let doc = "<r><v>a &amp; b</v><v><![CDATA[<raw>]]></v></r>";
        let root = XmlNode::parse(doc).unwrap();
        let values: Vec<&str> = root.children_named("v").map(|v| v.text.as_str()).collect();
        assert_eq!(values, vec!["a & b", "<raw>"]);
    }

    #[test]
    fn truncated_document_is_an_error() {
        assert!(XmlNode::parse("<packet><webspace>").is_err());
        assert!(XmlNode::parse("not xml at all").is_err());
    }

    #[test]
    fn take_child_detaches() {
        let mut root = XmlNode::new("r").with_text("a", "1").with_text("b", "2");
        let b = root.take_child("b").unwrap();
        assert_eq!(b.text, "2");
        assert_eq!(root.children.len(), 1);
    }
}
