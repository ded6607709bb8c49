//! Key diagram: the mutable SVG element tree
//!
//! The SVG markup is parsed once with roxmltree into an owned element tree that
//! supports the handful of mutations the keyboard needs (fill attributes,
//! class lists, appending and removing child shapes) and can be written back
//! out as SVG markup for rasterization.

use kurbo::Rect;

/// Element names that carry a fill and can act as a key's primary shape
pub const FILL_SHAPES: &[&str] = &["rect", "path", "circle", "ellipse", "polygon"];

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Class names applied to the diagram and its key visuals
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyClasses {
    /// Root class while keys respond to physical keypresses
    pub normal: String,
    /// Root class while keys respond to clicks
    pub editing: String,
    /// Class on a selected key visual
    pub selected: String,
    /// Class on a pressed-key shadow shape
    pub shadow: String,
}

impl Default for KeyClasses {
    fn default() -> Self {
        Self {
            normal: "normalKeys".to_string(),
            editing: "editingModeKeys".to_string(),
            selected: "selectedKeys".to_string(),
            shadow: "shadowKeys".to_string(),
        }
    }
}

/// A node in the diagram tree
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An SVG element with ordered attributes and children
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Qualified tag name (prefix included for foreign namespaces)
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Add a class to the class list (no duplicates)
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let list = match self.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute("class", list);
    }

    /// Remove a class from the class list, dropping the attribute when empty
    pub fn remove_class(&mut self, class: &str) {
        let Some(existing) = self.attribute("class") else {
            return;
        };
        let remaining: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attribute("class");
        } else {
            self.set_attribute("class", remaining.join(" "));
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn append_child(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Remove the first direct child element matching `predicate`
    pub fn remove_child_where(&mut self, predicate: impl Fn(&Element) -> bool) -> Option<Element> {
        let index = self.children.iter().position(|node| match node {
            Node::Element(element) => predicate(element),
            Node::Text(_) => false,
        })?;
        match self.children.remove(index) {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Whether this element is a fill-bearing shape
    pub fn is_fill_shape(&self) -> bool {
        FILL_SHAPES.contains(&self.name.as_str())
    }

    /// First fill-bearing descendant in document order, skipping elements with `exclude_class`
    pub fn first_shape(&self, exclude_class: &str) -> Option<&Element> {
        self.child_elements()
            .filter(|child| !child.has_class(exclude_class))
            .find_map(|child| {
                if child.is_fill_shape() {
                    Some(child)
                } else {
                    child.first_shape(exclude_class)
                }
            })
    }

    pub fn first_shape_mut(&mut self, exclude_class: &str) -> Option<&mut Element> {
        self.child_elements_mut()
            .filter(|child| !child.has_class(exclude_class))
            .find_map(|child| {
                if child.is_fill_shape() {
                    Some(child)
                } else {
                    child.first_shape_mut(exclude_class)
                }
            })
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.child_elements_mut().find_map(|child| child.find_by_id_mut(id))
    }

    /// Chain of elements from `self` down to the first element matching `predicate`
    pub fn path_to<'a>(&'a self, predicate: &dyn Fn(&Element) -> bool) -> Option<Vec<&'a Element>> {
        if predicate(self) {
            return Some(vec![self]);
        }
        for child in self.child_elements() {
            if let Some(mut path) = child.path_to(predicate) {
                path.insert(0, self);
                return Some(path);
            }
        }
        None
    }

    fn write(&self, out: &mut String) {
        self.write_with_leading(out, None);
    }

    /// Write this element, emitting `leading` raw markup before the first child
    fn write_with_leading(&self, out: &mut String, leading: Option<&str>) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        if self.children.is_empty() && leading.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(leading) = leading {
            out.push_str(leading);
        }
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(out),
                Node::Text(text) => escape_into(text, false, out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// The whole keyboard diagram
#[derive(Clone, Debug, PartialEq)]
pub struct KeyDiagram {
    root: Element,
}

impl KeyDiagram {
    /// Parse SVG markup into a diagram
    pub fn parse(svg: &str) -> Result<Self, String> {
        let document = roxmltree::Document::parse(svg)
            .map_err(|e| format!("Failed to parse SVG: {}", e))?;
        let root = document.root_element();
        if root.tag_name().name() != "svg" {
            return Err(format!(
                "Expected <svg> root element, found <{}>",
                root.tag_name().name()
            ));
        }
        Ok(Self {
            root: convert_element(root, None),
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Equivalent of `getElementById`
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.root.find_by_id(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.root.find_by_id_mut(id)
    }

    /// Set the root element's class attribute wholesale
    pub fn set_root_class(&mut self, class: &str) {
        self.root.set_attribute("class", class);
    }

    /// User-space extent: the viewBox, or 0,0,width,height when absent
    pub fn view_box(&self) -> Option<Rect> {
        if let Some(view_box) = self.root.attribute("viewBox") {
            let values: Vec<f64> = view_box
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
            if let [x, y, w, h] = values[..] {
                if w > 0.0 && h > 0.0 {
                    return Some(Rect::new(x, y, x + w, y + h));
                }
            }
        }
        let width = parse_length(self.root.attribute("width")?)?;
        let height = parse_length(self.root.attribute("height")?)?;
        Some(Rect::new(0.0, 0.0, width, height))
    }

    /// Serialize back to SVG markup
    ///
    /// When `stylesheet` is given it is embedded as the root's first child so
    /// the class-based key styling applies during rasterization.
    pub fn to_svg_string(&self, stylesheet: Option<&str>) -> String {
        let mut out = String::new();
        let style = stylesheet.map(|css| {
            format!(
                "<style type=\"text/css\"><![CDATA[{}]]></style>",
                css.replace("]]>", "")
            )
        });
        self.root.write_with_leading(&mut out, style.as_deref());
        out
    }
}

fn convert_element(node: roxmltree::Node, parent: Option<roxmltree::Node>) -> Element {
    let mut element = Element::new(qualified_name(node, node.tag_name().namespace(), node.tag_name().name()));

    // Emit namespace declarations introduced on this element
    for namespace in node.namespaces() {
        let inherited = parent
            .map(|p| {
                p.namespaces()
                    .any(|n| n.name() == namespace.name() && n.uri() == namespace.uri())
            })
            .unwrap_or(false);
        if inherited || namespace.uri() == XML_NAMESPACE {
            continue;
        }
        let name = match namespace.name() {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        element.attributes.push((name, namespace.uri().to_string()));
    }

    for attribute in node.attributes() {
        let name = qualified_name(node, attribute.namespace(), attribute.name());
        element.attributes.push((name, attribute.value().to_string()));
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(Node::Element(convert_element(child, Some(node))));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.children.push(Node::Text(text.to_string()));
            }
        }
    }

    element
}

fn qualified_name(node: roxmltree::Node, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(SVG_NAMESPACE) | None => None,
        Some(XML_NAMESPACE) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
    };
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Parse an SVG length, ignoring a trailing `px`
pub(crate) fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}
