//! In-process document implementing [`DomPort`].
//!
//! Nodes live in an arena; styles come from inline `style` attributes and the `hidden`
//! attribute, so visibility rules can be exercised without a layout engine. Every side effect
//! the adapters cause (focus, value writes, synthetic events, editing commands, highlights) is
//! recorded in an action log that tests assert against. Contenteditable hosts behave like a
//! rich-text editor that accepts `paste` events, while `execCommand('paste')` is blocked unless
//! explicitly enabled, matching what pages allow for untrusted scripts.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::trace;

use crate::errors::DomError;
use crate::events::{DomEvent, EditCommand};
use crate::port::{DomPort, MutationRecord, MutationStream, ReadyState};
use crate::selector::{SelectorList, SelectorTree};
use crate::types::{ComputedStyle, ElementRef, ElementSnapshot, Rect};

type NodeId = usize;

const HIGHLIGHT_SHADOW: &str = "0 0 10px 3px rgba(66, 153, 225, 0.6)";

/// Side effect recorded against an element.
#[derive(Clone, Debug, PartialEq)]
pub enum DomAction {
    Focus,
    ValueSet(String),
    Cleared,
    Event(DomEvent),
    Activated,
    FrameworkHandler,
    Command(EditCommand),
    Highlight(bool),
}

/// Declarative element description used to build documents.
#[derive(Clone, Debug, Default)]
pub struct ElementSpec {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<ElementSpec>,
    framework_click: bool,
    rect: Option<Rect>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            rect: Some(Rect::new(0.0, 0.0, 80.0, 32.0)),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name: String = name.into();
        set_attr(&mut self.attributes, &name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        let class = class.into();
        let merged = match self.attributes.iter().find(|(name, _)| name == "class") {
            Some((_, existing)) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class,
        };
        self.attr("class", merged)
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Inline style declarations, e.g. `"display: none; opacity: 0.5"`.
    pub fn style(self, declarations: impl Into<String>) -> Self {
        self.attr("style", declarations)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Attaches a framework-managed click handler reachable only through instance properties.
    pub fn framework_click(mut self) -> Self {
        self.framework_click = true;
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }
}

enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        value: Option<String>,
        framework_click: bool,
        rect: Option<Rect>,
    },
    Text(String),
}

struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Observer {
    root: NodeId,
    tx: mpsc::UnboundedSender<MutationRecord>,
}

struct DomState {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    clipboard_available: bool,
    clipboard: Option<String>,
    paste_command_enabled: bool,
    editor_handles_paste: bool,
    paste_rejected: bool,
    log: Vec<(ElementRef, DomAction)>,
    observers: Vec<Observer>,
}

/// Shared in-memory document. Clones observe the same state.
#[derive(Clone)]
pub struct MemoryDom {
    state: Arc<Mutex<DomState>>,
    ready: Arc<watch::Sender<ReadyState>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Fully loaded document with an empty `<body>`.
    pub fn new() -> Self {
        Self::with_ready_state(ReadyState::Complete)
    }

    /// Document still in the `loading` state until [`MemoryDom::finish_loading`].
    pub fn loading() -> Self {
        Self::with_ready_state(ReadyState::Loading)
    }

    fn with_ready_state(ready: ReadyState) -> Self {
        let mut nodes = Vec::new();
        nodes.push(Node {
            data: element_data("html", Vec::new(), None, false, None),
            parent: None,
            children: vec![1],
        });
        nodes.push(Node {
            data: element_data("body", Vec::new(), None, false, None),
            parent: Some(0),
            children: Vec::new(),
        });
        let state = DomState {
            nodes,
            root: 0,
            body: 1,
            focused: None,
            clipboard_available: true,
            clipboard: None,
            paste_command_enabled: false,
            editor_handles_paste: true,
            paste_rejected: false,
            log: Vec::new(),
            observers: Vec::new(),
        };
        let (ready, _) = watch::channel(ready);
        Self {
            state: Arc::new(Mutex::new(state)),
            ready: Arc::new(ready),
        }
    }

    pub fn body_ref(&self) -> ElementRef {
        let state = self.state.lock();
        element_ref(state.body)
    }

    pub fn finish_loading(&self) {
        self.ready.send_replace(ReadyState::Complete);
    }

    pub fn append_to_body(&self, spec: ElementSpec) -> ElementRef {
        let mut state = self.state.lock();
        let body = state.body;
        let id = state.insert(body, &spec);
        state.notify(body, 1);
        element_ref(id)
    }

    pub fn append(&self, parent: &ElementRef, spec: ElementSpec) -> Result<ElementRef, DomError> {
        let mut state = self.state.lock();
        let parent = state.element_id(parent)?;
        let id = state.insert(parent, &spec);
        state.notify(parent, 1);
        Ok(element_ref(id))
    }

    /// Appends a text node, the way a streaming answer grows.
    pub fn append_text(&self, element: &ElementRef, text: &str) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        state.push_text(id, text);
        Ok(())
    }

    pub fn set_text(&self, element: &ElementRef, text: &str) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        state.detach_children(id);
        state.push_text(id, text);
        Ok(())
    }

    /// Detaches the element; handles to it go stale.
    pub fn remove(&self, element: &ElementRef) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        if let Some(parent) = state.nodes[id].parent.take() {
            state.nodes[parent].children.retain(|child| *child != id);
        }
        if state.focused.map_or(false, |focused| !state.is_connected(focused)) {
            state.focused = None;
        }
        Ok(())
    }

    pub fn set_attribute(
        &self,
        element: &ElementRef,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        if let NodeData::Element { attributes, .. } = &mut state.nodes[id].data {
            set_attr(attributes, &name.to_ascii_lowercase(), value.to_string());
        }
        Ok(())
    }

    pub fn value_of(&self, element: &ElementRef) -> Option<String> {
        let state = self.state.lock();
        let id = state.element_id(element).ok()?;
        match &state.nodes[id].data {
            NodeData::Element { value, .. } => value.clone(),
            NodeData::Text(_) => None,
        }
    }

    pub fn text_of(&self, element: &ElementRef) -> Option<String> {
        let state = self.state.lock();
        let id = state.element_id(element).ok()?;
        Some(state.text_of(id))
    }

    pub fn style_property(&self, element: &ElementRef, property: &str) -> Option<String> {
        let state = self.state.lock();
        let id = state.element_id(element).ok()?;
        state.style_value(id, property)
    }

    pub fn actions(&self) -> Vec<(ElementRef, DomAction)> {
        self.state.lock().log.clone()
    }

    pub fn actions_for(&self, element: &ElementRef) -> Vec<DomAction> {
        self.state
            .lock()
            .log
            .iter()
            .filter(|(target, _)| target == element)
            .map(|(_, action)| action.clone())
            .collect()
    }

    pub fn clear_actions(&self) {
        self.state.lock().log.clear();
    }

    pub fn focused(&self) -> Option<ElementRef> {
        self.state.lock().focused.map(element_ref)
    }

    pub fn clipboard(&self) -> Option<String> {
        self.state.lock().clipboard.clone()
    }

    pub fn set_clipboard_available(&self, available: bool) {
        self.state.lock().clipboard_available = available;
    }

    pub fn set_paste_command_enabled(&self, enabled: bool) {
        self.state.lock().paste_command_enabled = enabled;
    }

    /// Whether contenteditable hosts insert the payload of a dispatched `paste` event.
    pub fn set_editor_handles_paste(&self, handles: bool) {
        self.state.lock().editor_handles_paste = handles;
    }

    /// Makes every dispatched `paste` event fail, as a page whose paste handler throws.
    pub fn set_paste_rejected(&self, rejected: bool) {
        self.state.lock().paste_rejected = rejected;
    }

    pub fn observer_count(&self) -> usize {
        let mut state = self.state.lock();
        state.observers.retain(|observer| !observer.tx.is_closed());
        state.observers.len()
    }
}

fn element_ref(id: NodeId) -> ElementRef {
    ElementRef(format!("mem-{id}"))
}

fn element_data(
    tag: &str,
    attributes: Vec<(String, String)>,
    value: Option<String>,
    framework_click: bool,
    rect: Option<Rect>,
) -> NodeData {
    NodeData::Element {
        tag: tag.to_string(),
        attributes,
        value,
        framework_click,
        rect,
    }
}

fn set_attr(attributes: &mut Vec<(String, String)>, name: &str, value: String) {
    match attributes.iter_mut().find(|(key, _)| key == name) {
        Some(entry) => entry.1 = value,
        None => attributes.push((name.to_string(), value)),
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

fn render_style(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn is_text_control_tag(tag: &str) -> bool {
    matches!(tag, "textarea" | "input")
}

impl DomState {
    fn element_id(&self, element: &ElementRef) -> Result<NodeId, DomError> {
        let stale = || DomError::StaleElement(element.to_string());
        let id: NodeId = element
            .as_str()
            .strip_prefix("mem-")
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(stale)?;
        match self.nodes.get(id) {
            Some(Node {
                data: NodeData::Element { .. },
                ..
            }) if self.is_connected(id) => Ok(id),
            _ => Err(stale()),
        }
    }

    fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.nodes[node].parent;
        }
        false
    }

    fn inclusive_ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.nodes[node].parent;
        }
        chain
    }

    fn insert(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let id = self.nodes.len();
        let value = if is_text_control_tag(&spec.tag) {
            let initial = spec
                .attributes
                .iter()
                .find(|(name, _)| name == "value")
                .map(|(_, value)| value.clone());
            Some(initial.or_else(|| spec.text.clone()).unwrap_or_default())
        } else {
            None
        };
        self.nodes.push(Node {
            data: element_data(
                &spec.tag,
                spec.attributes.clone(),
                value,
                spec.framework_click,
                spec.rect,
            ),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        if let Some(text) = &spec.text {
            self.insert_text_node(id, text);
        }
        for child in &spec.children {
            self.insert(id, child);
        }
        id
    }

    fn insert_text_node(&mut self, parent: NodeId, text: &str) {
        let id = self.nodes.len();
        self.nodes.push(Node {
            data: NodeData::Text(text.to_string()),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
    }

    fn push_text(&mut self, id: NodeId, text: &str) {
        self.insert_text_node(id, text);
        self.notify(id, 1);
    }

    fn detach_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in children {
            self.nodes[child].parent = None;
        }
    }

    fn notify(&mut self, target: NodeId, added_nodes: usize) {
        let chain = self.inclusive_ancestors(target);
        let record = MutationRecord {
            target: element_ref(target),
            added_nodes,
        };
        self.observers.retain(|observer| {
            if !chain.contains(&observer.root) {
                return !observer.tx.is_closed();
            }
            observer.tx.send(record.clone()).is_ok()
        });
    }

    fn record(&mut self, id: NodeId, action: DomAction) {
        trace!(element = %element_ref(id), ?action, "memory dom action");
        self.log.push((element_ref(id), action));
    }

    fn tag(&self, id: NodeId) -> &str {
        match &self.nodes[id].data {
            NodeData::Element { tag, .. } => tag,
            NodeData::Text(_) => "",
        }
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id].data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    fn style_value(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attr(id, "style")?;
        parse_style(style)
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    fn display(&self, id: NodeId) -> String {
        if self.attr(id, "hidden").is_some() {
            return "none".to_string();
        }
        self.style_value(id, "display").unwrap_or_else(|| {
            let default = match self.tag(id) {
                "span" | "a" | "img" | "svg" | "i" | "use" | "path" => "inline",
                _ => "block",
            };
            default.to_string()
        })
    }

    fn computed_style(&self, id: NodeId) -> ComputedStyle {
        let visibility = self
            .inclusive_ancestors(id)
            .into_iter()
            .find_map(|node| self.style_value(node, "visibility"))
            .unwrap_or_else(|| "visible".to_string());
        ComputedStyle {
            display: self.display(id),
            visibility,
            opacity: self
                .style_value(id, "opacity")
                .unwrap_or_else(|| "1".to_string()),
        }
    }

    /// `offsetParent !== null`: connected, no `display: none` on the inclusive ancestor chain,
    /// not `position: fixed`, and not `<body>`/`<html>` themselves.
    fn has_layout(&self, id: NodeId) -> bool {
        if id == self.body || id == self.root || !self.is_connected(id) {
            return false;
        }
        if self.style_value(id, "position").as_deref() == Some("fixed") {
            return false;
        }
        self.inclusive_ancestors(id)
            .into_iter()
            .all(|node| self.display(node) != "none")
    }

    fn text_of(&self, id: NodeId) -> String {
        match &self.nodes[id].data {
            NodeData::Text(text) => text.clone(),
            NodeData::Element { .. } => self.nodes[id]
                .children
                .iter()
                .map(|child| self.text_of(*child))
                .collect(),
        }
    }

    fn snapshot(&self, id: NodeId) -> ElementSnapshot {
        let (tag, attributes, rect): (String, BTreeMap<String, String>, Option<Rect>) =
            match &self.nodes[id].data {
            NodeData::Element {
                tag,
                attributes,
                rect,
                ..
            } => (tag.clone(), attributes.iter().cloned().collect(), *rect),
            NodeData::Text(_) => (String::new(), BTreeMap::new(), None),
        };
        let has_layout = self.has_layout(id);
        ElementSnapshot {
            element: element_ref(id),
            tag,
            attributes,
            text: self.text_of(id),
            style: self.computed_style(id),
            has_layout,
            rect: if has_layout { rect } else { None },
        }
    }

    fn elements_under(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[id].children {
            if matches!(self.nodes[*child].data, NodeData::Element { .. }) {
                out.push(*child);
                self.elements_under(*child, out);
            }
        }
    }

    fn is_editable(&self, id: NodeId) -> bool {
        self.inclusive_ancestors(id).into_iter().any(|node| {
            matches!(
                self.attr(node, "contenteditable"),
                Some("") | Some("true") | Some("plaintext-only")
            )
        })
    }

    fn insert_text_at(&mut self, id: NodeId, text: &str) -> bool {
        if let NodeData::Element {
            tag,
            value: Some(value),
            ..
        } = &mut self.nodes[id].data
        {
            if is_text_control_tag(tag) {
                value.push_str(text);
                return true;
            }
        }
        if self.is_editable(id) {
            self.push_text(id, text);
            return true;
        }
        false
    }
}

impl SelectorTree for DomState {
    type Node = NodeId;

    fn tag_name(&self, node: NodeId) -> &str {
        self.tag(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attr(node, name)
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.elements_under(node, &mut out);
        out
    }
}

fn parse_selector(selector: &str) -> Result<SelectorList, DomError> {
    SelectorList::parse(selector).map_err(|err| DomError::InvalidSelector {
        selector: selector.to_string(),
        reason: err.to_string(),
    })
}

#[async_trait]
impl DomPort for MemoryDom {
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, DomError> {
        let list = parse_selector(selector)?;
        let state = self.state.lock();
        let mut candidates = vec![state.root];
        state.elements_under(state.root, &mut candidates);
        Ok(candidates
            .into_iter()
            .filter(|id| list.matches(&*state, *id))
            .map(element_ref)
            .collect())
    }

    async fn snapshot(&self, element: &ElementRef) -> Result<ElementSnapshot, DomError> {
        let state = self.state.lock();
        let id = state.element_id(element)?;
        Ok(state.snapshot(id))
    }

    async fn body(&self) -> Result<ElementRef, DomError> {
        Ok(self.body_ref())
    }

    async fn closest(
        &self,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>, DomError> {
        let list = parse_selector(selector)?;
        let state = self.state.lock();
        let id = state.element_id(element)?;
        Ok(state
            .inclusive_ancestors(id)
            .into_iter()
            .find(|node| list.matches(&*state, *node))
            .map(element_ref))
    }

    async fn parent(&self, element: &ElementRef) -> Result<Option<ElementRef>, DomError> {
        let state = self.state.lock();
        let id = state.element_id(element)?;
        Ok(state.nodes[id].parent.map(element_ref))
    }

    async fn text_content(&self, element: &ElementRef) -> Result<String, DomError> {
        let state = self.state.lock();
        let id = state.element_id(element)?;
        Ok(state.text_of(id))
    }

    async fn focus(&self, element: &ElementRef) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        state.focused = Some(id);
        state.record(id, DomAction::Focus);
        Ok(())
    }

    async fn set_native_value(&self, element: &ElementRef, value: &str) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        match &mut state.nodes[id].data {
            NodeData::Element {
                tag, value: slot, ..
            } if is_text_control_tag(tag) => {
                *slot = Some(value.to_string());
            }
            _ => {
                return Err(DomError::Unsupported(format!(
                    "{element} has no native value setter"
                )))
            }
        }
        state.record(id, DomAction::ValueSet(value.to_string()));
        Ok(())
    }

    async fn clear_content(&self, element: &ElementRef) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        state.detach_children(id);
        if let NodeData::Element {
            value: Some(value), ..
        } = &mut state.nodes[id].data
        {
            value.clear();
        }
        state.record(id, DomAction::Cleared);
        Ok(())
    }

    async fn dispatch(&self, element: &ElementRef, event: DomEvent) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        state.record(id, DomAction::Event(event.clone()));
        if let DomEvent::Paste { text } = &event {
            if state.paste_rejected {
                return Err(DomError::Script("paste handler threw".to_string()));
            }
            if state.editor_handles_paste && state.is_editable(id) {
                state.push_text(id, text);
            }
        }
        Ok(())
    }

    async fn activate(&self, element: &ElementRef) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        state.record(id, DomAction::Activated);
        Ok(())
    }

    async fn invoke_framework_handler(&self, element: &ElementRef) -> Result<bool, DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        let present = matches!(
            state.nodes[id].data,
            NodeData::Element {
                framework_click: true,
                ..
            }
        );
        if present {
            state.record(id, DomAction::FrameworkHandler);
        }
        Ok(present)
    }

    async fn clipboard_write(&self, text: &str) -> Result<(), DomError> {
        let mut state = self.state.lock();
        if !state.clipboard_available {
            return Err(DomError::ClipboardUnavailable(
                "navigator.clipboard is not exposed".to_string(),
            ));
        }
        state.clipboard = Some(text.to_string());
        Ok(())
    }

    async fn exec_command(&self, command: EditCommand) -> Result<bool, DomError> {
        let mut state = self.state.lock();
        let target = state.focused.unwrap_or(state.body);
        state.record(target, DomAction::Command(command.clone()));
        let Some(focused) = state.focused else {
            return Ok(false);
        };
        match command {
            EditCommand::Paste => {
                if !state.paste_command_enabled {
                    return Ok(false);
                }
                let Some(text) = state.clipboard.clone() else {
                    return Ok(false);
                };
                Ok(state.insert_text_at(focused, &text))
            }
            EditCommand::InsertText(text) => Ok(state.insert_text_at(focused, &text)),
        }
    }

    async fn set_highlight(&self, element: &ElementRef, on: bool) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(element)?;
        let mut decls = state
            .attr(id, "style")
            .map(parse_style)
            .unwrap_or_default();
        decls.retain(|(name, _)| name != "box-shadow" && name != "transition");
        if on {
            decls.push(("box-shadow".to_string(), HIGHLIGHT_SHADOW.to_string()));
            decls.push(("transition".to_string(), "box-shadow 0.3s".to_string()));
        }
        if let NodeData::Element { attributes, .. } = &mut state.nodes[id].data {
            set_attr(attributes, "style", render_style(&decls));
        }
        state.record(id, DomAction::Highlight(on));
        Ok(())
    }

    async fn ready_state(&self) -> Result<ReadyState, DomError> {
        Ok(*self.ready.borrow())
    }

    async fn dom_content_loaded(&self) -> Result<(), DomError> {
        let mut rx = self.ready.subscribe();
        loop {
            if !rx.borrow_and_update().is_loading() {
                return Ok(());
            }
            rx.changed()
                .await
                .map_err(|_| DomError::Transport("document closed while loading".to_string()))?;
        }
    }

    async fn observe_mutations(&self, root: &ElementRef) -> Result<MutationStream, DomError> {
        let mut state = self.state.lock();
        let id = state.element_id(root)?;
        let (tx, rx) = mpsc::unbounded_channel();
        state.observers.push(Observer { root: id, tx });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queries_follow_document_order() {
        let dom = MemoryDom::new();
        dom.append_to_body(ElementSpec::new("button").class("first"));
        dom.append_to_body(
            ElementSpec::new("div").child(ElementSpec::new("button").class("second")),
        );
        let all = dom.query_all("button").await.unwrap();
        assert_eq!(all.len(), 2);
        let first = dom.snapshot(&all[0]).await.unwrap();
        assert_eq!(first.class_name(), "first");
    }

    #[tokio::test]
    async fn invalid_selector_is_reported() {
        let dom = MemoryDom::new();
        let err = dom.query_all("div[").await.unwrap_err();
        assert!(matches!(err, DomError::InvalidSelector { .. }));
    }

    #[tokio::test]
    async fn detached_elements_go_stale() {
        let dom = MemoryDom::new();
        let el = dom.append_to_body(ElementSpec::new("textarea"));
        dom.remove(&el).unwrap();
        let err = dom.set_native_value(&el, "x").await.unwrap_err();
        assert!(err.is_stale());
        assert!(dom.query_all("textarea").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn computed_style_inherits_visibility_and_display() {
        let dom = MemoryDom::new();
        let outer = dom.append_to_body(
            ElementSpec::new("div")
                .style("visibility: hidden")
                .child(ElementSpec::new("span").class("inner")),
        );
        let inner = dom.query_first("span.inner").await.unwrap().unwrap();
        let snap = dom.snapshot(&inner).await.unwrap();
        assert_eq!(snap.style.visibility, "hidden");
        assert!(snap.has_layout);

        dom.set_attribute(&outer, "style", "display: none").unwrap();
        let snap = dom.snapshot(&inner).await.unwrap();
        assert!(!snap.has_layout);
        assert!(snap.rect.is_none());
    }

    #[tokio::test]
    async fn paste_event_reaches_rich_text_editor() {
        let dom = MemoryDom::new();
        let editor = dom.append_to_body(ElementSpec::new("div").attr("contenteditable", "true"));
        dom.dispatch(
            &editor,
            DomEvent::Paste {
                text: "hello".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(dom.text_of(&editor).as_deref(), Some("hello"));
        assert!(!dom.exec_command(EditCommand::Paste).await.unwrap());
    }

    #[tokio::test]
    async fn mutations_are_delivered_to_ancestor_observers() {
        let dom = MemoryDom::new();
        let chat = dom.append_to_body(ElementSpec::new("div").class("chat"));
        let mut rx = dom.observe_mutations(&chat).await.unwrap();
        let msg = dom
            .append(&chat, ElementSpec::new("div").class("assistant-msg"))
            .unwrap();
        dom.append_text(&msg, "h").unwrap();
        assert_eq!(rx.recv().await.unwrap().target, chat);
        assert_eq!(rx.recv().await.unwrap().target, msg);

        dom.append_to_body(ElementSpec::new("footer"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn loading_document_resolves_after_finish() {
        let dom = MemoryDom::loading();
        assert_eq!(dom.ready_state().await.unwrap(), ReadyState::Loading);
        let waiter = {
            let dom = dom.clone();
            tokio::spawn(async move { dom.dom_content_loaded().await })
        };
        tokio::task::yield_now().await;
        dom.finish_loading();
        tokio_test::assert_ok!(waiter.await.unwrap());
    }
}
