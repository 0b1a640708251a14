//! Arena-backed element tree with parent links.
//!
//! Every tree owns a synthetic document node (empty tag) at index 0; the
//! registry's top-level element is its first child. Nodes are addressed by
//! [`NodeId`] and read through the borrowed [`Node`] handle.

use std::fmt;

/// Index of a node inside its [`SpecTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The synthetic document node every tree starts with.
    pub const DOCUMENT: NodeId = NodeId(0);
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: String, attributes: Vec<(String, String)>, parent: Option<NodeId>) -> Self {
        Self {
            tag,
            attributes,
            text: String::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// A specification document held as an element tree.
#[derive(Debug, Clone)]
pub struct SpecTree {
    nodes: Vec<NodeData>,
}

impl Default for SpecTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecTree {
    /// Create a tree containing only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(String::new(), Vec::new(), None)],
        }
    }

    /// Number of nodes, including the document node.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no element besides the document node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Handle to the document node.
    pub fn document(&self) -> Node<'_> {
        Node {
            tree: self,
            id: NodeId::DOCUMENT,
        }
    }

    /// The top-level element, if any.
    pub fn root_element(&self) -> Option<Node<'_>> {
        self.document().children().next()
    }

    /// Handle to a node by ID, or `None` if the ID is not part of this tree.
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { tree: self, id })
    }

    /// Append an element under `parent` and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn append<I, K, V>(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        attributes: I,
    ) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let id = NodeId(self.nodes.len());
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.nodes
            .push(NodeData::new(tag.into(), attributes, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element without attributes.
    pub fn append_element(&mut self, parent: NodeId, tag: impl Into<String>) -> NodeId {
        self.append(parent, tag, Vec::<(String, String)>::new())
    }

    /// Append character data to a node's text content.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not belong to this tree.
    pub fn append_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text.push_str(text);
    }

    pub(crate) fn data_tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }
}

/// A borrowed handle to one node of a [`SpecTree`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a SpecTree,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("id", &self.id).field("tag", &self.tag());
        if let Some(name) = self.attr("name") {
            s.field("name", &name);
        }
        s.finish()
    }
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id.0]
    }

    fn at(&self, id: NodeId) -> Node<'a> {
        Node {
            tree: self.tree,
            id,
        }
    }

    /// This node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'a SpecTree {
        self.tree
    }

    /// Element tag; empty for the document node.
    pub fn tag(&self) -> &'a str {
        &self.data().tag
    }

    /// Whether this is the synthetic document node.
    pub fn is_document(&self) -> bool {
        self.id == NodeId::DOCUMENT
    }

    /// Value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.data()
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Character data directly inside this element.
    pub fn text(&self) -> &'a str {
        &self.data().text
    }

    /// Parent node; `None` only for the document node.
    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|id| self.at(id))
    }

    /// Walk parent links up to the document node.
    pub fn document_root(&self) -> Node<'a> {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Nearest ancestor element with the given tag.
    pub fn ancestor(&self, tag: &str) -> Option<Node<'a>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.tag() == tag {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Direct children in document order.
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Direct children with the given tag.
    pub fn children_named(&self, tag: &str) -> Vec<Node<'a>> {
        self.children().filter(|c| c.tag() == tag).collect()
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.tag() == tag)
    }

    /// All descendants in pre-order, excluding this node.
    pub fn descendants(&self) -> Descendants<'a> {
        let mut stack = self.data().children.clone();
        stack.reverse();
        Descendants {
            tree: self.tree,
            stack,
        }
    }

    /// Child-path query such as `"require/enum"`.
    ///
    /// Each `/`-separated segment selects the children with that tag from
    /// the previous step's results.
    pub fn select(&self, path: &str) -> Vec<Node<'a>> {
        let mut frontier = vec![*self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            frontier = frontier
                .iter()
                .flat_map(|n| n.children_named(segment))
                .collect();
        }
        frontier
    }

    /// First descendant element with this tag and `name` attribute.
    pub fn find_declaration(&self, tag: &str, name: &str) -> Option<Node<'a>> {
        self.descendants()
            .find(|n| n.tag() == tag && n.attr("name") == Some(name))
    }
}

/// Pre-order iterator over a node's descendants.
pub struct Descendants<'a> {
    tree: &'a SpecTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = &self.tree.nodes[id.0].children;
        self.stack.extend(children.iter().rev());
        Some(Node {
            tree: self.tree,
            id,
        })
    }
}
