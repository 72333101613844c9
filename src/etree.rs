//! Element tree with the text/tail model.
//!
//! The extraction pipeline operates on a mutable tree of elements where
//! each node carries a tag, an attribute map, the text that appears
//! before its first child (`text`) and the text that follows its
//! closing tag (`tail`):
//!
//! ```html
//! <div>
//!   TEXT HERE          <!-- this is div's "text" -->
//!   <span>inner</span>
//!   TAIL HERE          <!-- this is span's "tail" -->
//! </div>
//! ```
//!
//! Nodes live in an arena owned by [`Tree`] and are addressed by
//! [`NodeId`]. Detached nodes simply stay in the arena without a
//! parent; the whole arena is dropped with the tree, so removal is a
//! constant-time unlink.

/// Handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    text: Option<String>,
    tail: Option<String>,
    attrs: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed element tree.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0 as usize]
    }

    /// Create a new detached element.
    pub fn new_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(NodeData {
            tag: tag.to_string(),
            text: None,
            tail: None,
            attrs: Vec::new(),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a new element and append it to `parent`.
    pub fn sub_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let child = self.new_element(tag);
        self.append(parent, child);
        child
    }

    // === Accessors ===

    #[must_use]
    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    pub fn set_tag(&mut self, id: NodeId, tag: &str) {
        self.node_mut(id).tag = tag.to_string();
    }

    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    pub fn set_text(&mut self, id: NodeId, text: Option<String>) {
        self.node_mut(id).text = text;
    }

    #[must_use]
    pub fn tail(&self, id: NodeId) -> Option<&str> {
        self.node(id).tail.as_deref()
    }

    pub fn set_tail(&mut self, id: NodeId, tail: Option<String>) {
        self.node_mut(id).tail = tail;
    }

    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let attrs = &mut self.node_mut(id).attrs;
        if let Some(entry) = attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        self.node_mut(id).attrs.retain(|(k, _)| k != name);
    }

    pub fn clear_attrs(&mut self, id: NodeId) {
        self.node_mut(id).attrs.clear();
    }

    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        &self.node(id).attrs
    }

    // === Structure ===

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Direct children, copied out so the tree can be mutated while
    /// walking them.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).children.clone()
    }

    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.node(id).parent?;
        let idx = self.node(parent).children.iter().position(|&c| c == id)?;
        Some((parent, idx))
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, idx) = self.index_in_parent(id)?;
        if idx == 0 {
            None
        } else {
            Some(self.node(parent).children[idx - 1])
        }
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, idx) = self.index_in_parent(id)?;
        self.node(parent).children.get(idx + 1).copied()
    }

    /// Detach `child` from its current parent (if any) and append it
    /// to `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Detach `child` and insert it among `parent`'s children at `index`.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some((parent, idx)) = self.index_in_parent(id) {
            self.node_mut(parent).children.remove(idx);
        }
        self.node_mut(id).parent = None;
    }

    /// Remove the node (and its subtree) from the tree. The node's
    /// tail is discarded with it.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    // === Iteration ===

    /// Pre-order walk including `root` itself.
    #[must_use]
    pub fn iter(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(root, &mut out);
        out
    }

    /// Pre-order walk including `root`, keeping only the given tags.
    #[must_use]
    pub fn iter_tags(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.iter(root)
            .into_iter()
            .filter(|&id| tags.contains(&self.tag(id)))
            .collect()
    }

    /// Pre-order walk excluding `root` itself.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in &self.node(root).children {
            self.walk(*child, &mut out);
        }
        out
    }

    fn walk(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in &self.node(id).children {
            self.walk(*child, out);
        }
    }

    /// All text and tail fragments below `root` in document order.
    /// The root's own tail is not included, matching the flattening
    /// contract of the extraction result.
    #[must_use]
    pub fn itertext(&self, root: NodeId) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_text(root, &mut out);
        out
    }

    fn collect_text<'a>(&'a self, id: NodeId, out: &mut Vec<&'a str>) {
        if let Some(text) = self.node(id).text.as_deref() {
            out.push(text);
        }
        for &child in &self.node(id).children {
            self.collect_text(child, out);
            if let Some(tail) = self.node(child).tail.as_deref() {
                out.push(tail);
            }
        }
    }

    /// Concatenation of all text/tail fragments below `root`.
    #[must_use]
    pub fn text_content(&self, root: NodeId) -> String {
        self.itertext(root).concat()
    }

    // === Copying ===

    /// Deep-copy the subtree rooted at `id`. The copy is detached and
    /// carries no tail.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let (tag, text, attrs, children) = {
            let n = self.node(id);
            (n.tag.clone(), n.text.clone(), n.attrs.clone(), n.children.clone())
        };
        let copy = self.new_element(&tag);
        self.node_mut(copy).text = text;
        self.node_mut(copy).attrs = attrs;
        for child in children {
            let tail = self.node(child).tail.clone();
            let child_copy = self.deep_copy(child);
            self.node_mut(child_copy).tail = tail;
            self.append(copy, child_copy);
        }
        copy
    }

    // === Structural rewriting ===

    /// Remove matching descendant elements but keep their content:
    /// children are hoisted into the parent at the element's position,
    /// text merges into the preceding text run and the tail attaches
    /// to the last hoisted child (or the preceding run when there is
    /// none). The root itself is never stripped.
    pub fn strip_tags(&mut self, root: NodeId, tags: &[&str]) {
        loop {
            let target = self
                .descendants(root)
                .into_iter()
                .find(|&id| tags.contains(&self.tag(id)));
            let Some(id) = target else { break };
            self.strip_one(id);
        }
    }

    fn strip_one(&mut self, id: NodeId) {
        let Some((parent, idx)) = self.index_in_parent(id) else {
            return;
        };
        let (text, tail, children) = {
            let n = self.node(id);
            (n.text.clone(), n.tail.clone(), n.children.clone())
        };
        self.node_mut(parent).children.remove(idx);
        self.node_mut(id).parent = None;

        if let Some(t) = text {
            self.merge_at(parent, idx, &t);
        }
        for (offset, &child) in children.iter().enumerate() {
            self.insert(parent, idx + offset, child);
        }
        if let Some(t) = tail {
            if let Some(&last) = children.last() {
                let merged = concat_text(self.node_mut(last).tail.take(), &t);
                self.node_mut(last).tail = Some(merged);
            } else {
                self.merge_at(parent, idx, &t);
            }
        }
    }

    /// Append `fragment` to the text run preceding child position
    /// `idx` of `parent`: the previous sibling's tail, or the parent's
    /// text when the position is first.
    fn merge_at(&mut self, parent: NodeId, idx: usize, fragment: &str) {
        if idx == 0 {
            let merged = concat_text(self.node_mut(parent).text.take(), fragment);
            self.node_mut(parent).text = Some(merged);
        } else {
            let prev = self.node(parent).children[idx - 1];
            let merged = concat_text(self.node_mut(prev).tail.take(), fragment);
            self.node_mut(prev).tail = Some(merged);
        }
    }

    /// Remove matching descendant elements together with their
    /// subtrees and tails. The root itself is never removed.
    pub fn strip_elements(&mut self, root: NodeId, tags: &[&str]) {
        loop {
            let target = self
                .descendants(root)
                .into_iter()
                .find(|&id| tags.contains(&self.tag(id)));
            let Some(id) = target else { break };
            self.remove(id);
        }
    }
}

fn concat_text(existing: Option<String>, fragment: &str) -> String {
    match existing {
        Some(mut s) => {
            s.push_str(fragment);
            s
        }
        None => fragment.to_string(),
    }
}
