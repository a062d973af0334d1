//! Page-side scripts evaluated by [`crate::CdpDom`].
//!
//! Every script shares one prelude that installs `window.__aipanel`, a registry mapping opaque
//! ids to nodes. Nodes are held weakly and detached entries are swept once the registry
//! doubles in size. Scripts resolve to `{ok: value}` or `{err: {kind, detail}}`.

use dom_port::{DomEvent, EditCommand, EventFlags};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::CdpDomError;

const PRELUDE: &str = r#"
const reg = (window.__aipanel ||= {
  seq: 0, nodes: new Map(), ids: new WeakMap(), sweepAt: 256,
  counters: new Map(), roots: new Map(), observers: new Map(),
});
const sweep = () => {
  for (const [id, ref] of reg.nodes) {
    const node = ref.deref();
    if (!node || !node.isConnected) reg.nodes.delete(id);
  }
  reg.sweepAt = Math.max(256, reg.nodes.size * 2);
};
const put = (el) => {
  let id = reg.ids.get(el);
  if (!id) { id = 'el-' + (++reg.seq); reg.ids.set(el, id); }
  reg.nodes.set(id, new WeakRef(el));
  if (reg.nodes.size > reg.sweepAt) sweep();
  return id;
};
const get = (id) => {
  const ref = reg.nodes.get(id);
  const el = ref && ref.deref();
  if (!el || !el.isConnected) { reg.nodes.delete(id); throw { kind: 'stale', detail: id }; }
  return el;
};
const fault = (e) => (e && e.kind) ? e : {
  kind: (e && e.name === 'SyntaxError') ? 'selector' : 'script',
  detail: String((e && e.message) || e),
};
"#;

const HIGHLIGHT: &str = "0 0 10px 3px rgba(66, 153, 225, 0.6)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Envelope<T> {
    Ok(T),
    Err(Fault),
}

#[derive(Debug, Deserialize)]
pub(crate) struct Fault {
    kind: String,
    #[serde(default)]
    detail: String,
}

impl Fault {
    pub(crate) fn into_error(self, selector: Option<&str>) -> CdpDomError {
        match self.kind.as_str() {
            "stale" => CdpDomError::Stale(self.detail),
            "selector" => CdpDomError::Selector {
                selector: selector.unwrap_or_default().to_string(),
                reason: self.detail,
            },
            "unsupported" => CdpDomError::Unsupported(self.detail),
            "clipboard" => CdpDomError::Clipboard(self.detail),
            _ => CdpDomError::Script(self.detail),
        }
    }
}

/// JSON string literal, safe to splice into a script.
fn lit(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

fn wrap(body: &str) -> String {
    format!(
        "(async () => {{ {PRELUDE}\ntry {{ const ok = await (async () => {{ {body} }})(); \
         return {{ ok: ok === undefined ? null : ok }}; }} catch (e) {{ return {{ err: fault(e) }}; }} }})()"
    )
}

pub(crate) fn query_all(selector: &str) -> String {
    wrap(&format!(
        "return Array.from(document.querySelectorAll({})).map(put);",
        lit(selector)
    ))
}

pub(crate) fn query_first(selector: &str) -> String {
    wrap(&format!(
        "const el = document.querySelector({}); return el ? put(el) : null;",
        lit(selector)
    ))
}

pub(crate) fn snapshot(id: &str) -> String {
    wrap(&format!(
        r#"const el = get({id});
const cs = getComputedStyle(el);
const r = el.getBoundingClientRect();
const attributes = {{}};
for (const a of el.attributes) attributes[a.name] = a.value;
return {{
  element: {id}, tag: el.tagName.toLowerCase(), attributes, text: el.textContent || '',
  style: {{ display: cs.display, visibility: cs.visibility, opacity: cs.opacity }},
  has_layout: el.offsetParent !== null,
  rect: {{ x: r.x, y: r.y, width: r.width, height: r.height }},
}};"#,
        id = lit(id)
    ))
}

pub(crate) fn body() -> String {
    wrap("return put(document.body);")
}

pub(crate) fn closest(id: &str, selector: &str) -> String {
    wrap(&format!(
        "const found = get({}).closest({}); return found ? put(found) : null;",
        lit(id),
        lit(selector)
    ))
}

pub(crate) fn parent(id: &str) -> String {
    wrap(&format!(
        "const p = get({}).parentElement; return p ? put(p) : null;",
        lit(id)
    ))
}

pub(crate) fn text_content(id: &str) -> String {
    wrap(&format!("return get({}).textContent || '';", lit(id)))
}

pub(crate) fn focus(id: &str) -> String {
    wrap(&format!("get({}).focus(); return null;", lit(id)))
}

pub(crate) fn set_native_value(id: &str, value: &str) -> String {
    wrap(&format!(
        r#"const el = get({});
const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype
  : el instanceof HTMLInputElement ? HTMLInputElement.prototype : null;
if (!proto) throw {{ kind: 'unsupported', detail: 'no native value setter on ' + el.tagName.toLowerCase() }};
Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {});
return null;"#,
        lit(id),
        lit(value)
    ))
}

pub(crate) fn clear_content(id: &str) -> String {
    wrap(&format!(
        "const el = get({}); while (el.firstChild) el.removeChild(el.firstChild); return null;",
        lit(id)
    ))
}

fn event_constructor(event: &DomEvent) -> String {
    let flags = event.flags();
    let init = format!(
        "bubbles: {}, cancelable: {}",
        flags.contains(EventFlags::BUBBLES),
        flags.contains(EventFlags::CANCELABLE)
    );
    let kind = lit(event.type_name());
    match event {
        DomEvent::Input | DomEvent::Change => format!("new Event({kind}, {{ {init} }})"),
        DomEvent::KeyDown(key) | DomEvent::KeyPress(key) | DomEvent::KeyUp(key) => format!(
            "new KeyboardEvent({kind}, {{ {init}, key: {}, code: {}, keyCode: {code}, which: {code} }})",
            lit(&key.key),
            lit(&key.code),
            code = key.key_code
        ),
        DomEvent::Paste { text } => format!(
            "(() => {{ const data = new DataTransfer(); data.setData('text/plain', {}); \
             return new ClipboardEvent({kind}, {{ {init}, clipboardData: data }}); }})()",
            lit(text)
        ),
        DomEvent::Pointer { at, .. } => format!(
            "new PointerEvent({kind}, {{ {init}, clientX: {}, clientY: {}, pointerType: 'mouse', isPrimary: true }})",
            at.x, at.y
        ),
        DomEvent::Mouse { at, .. } => format!(
            "new MouseEvent({kind}, {{ {init}, view: window, clientX: {}, clientY: {}, button: 0 }})",
            at.x, at.y
        ),
    }
}

pub(crate) fn dispatch(id: &str, event: &DomEvent) -> String {
    wrap(&format!(
        "get({}).dispatchEvent({}); return null;",
        lit(id),
        event_constructor(event)
    ))
}

pub(crate) fn activate(id: &str) -> String {
    wrap(&format!("get({}).click(); return null;", lit(id)))
}

pub(crate) fn invoke_framework_handler(id: &str) -> String {
    wrap(&format!(
        r#"const el = get({});
for (const key of Object.keys(el)) {{
  if (!key.startsWith('__reactProps') && !key.startsWith('__reactEventHandlers')) continue;
  const props = el[key];
  if (props && typeof props.onClick === 'function') {{
    const nativeEvent = new MouseEvent('click', {{ bubbles: true, cancelable: true }});
    props.onClick({{
      type: 'click', target: el, currentTarget: el, nativeEvent,
      preventDefault() {{}}, stopPropagation() {{}}, persist() {{}},
    }});
    return true;
  }}
}}
return false;"#,
        lit(id)
    ))
}

pub(crate) fn clipboard_write(text: &str) -> String {
    wrap(&format!(
        r#"if (!navigator.clipboard || !navigator.clipboard.writeText) {{
  throw {{ kind: 'clipboard', detail: 'navigator.clipboard is not exposed' }};
}}
try {{ await navigator.clipboard.writeText({}); }}
catch (e) {{ throw {{ kind: 'clipboard', detail: String((e && e.message) || e) }}; }}
return null;"#,
        lit(text)
    ))
}

pub(crate) fn exec_command(command: &EditCommand) -> String {
    match command {
        EditCommand::Paste => wrap("return document.execCommand('paste');"),
        EditCommand::InsertText(text) => wrap(&format!(
            "return document.execCommand('insertText', false, {});",
            lit(text)
        )),
    }
}

pub(crate) fn set_highlight(id: &str, on: bool) -> String {
    let shadow = if on { HIGHLIGHT } else { "" };
    wrap(&format!(
        "get({}).style.boxShadow = {}; return null;",
        lit(id),
        lit(shadow)
    ))
}

pub(crate) fn ready_state() -> String {
    wrap("return document.readyState;")
}

/// Installs a counting observer on `id` and returns its key.
pub(crate) fn observe(id: &str) -> String {
    wrap(&format!(
        r#"const root = get({});
const key = 'obs-' + (++reg.seq);
reg.counters.set(key, 0);
reg.roots.set(key, root);
const mo = new MutationObserver((list) => {{
  let added = 0;
  for (const m of list) added += m.addedNodes.length;
  reg.counters.set(key, (reg.counters.get(key) || 0) + added);
}});
mo.observe(root, {{ childList: true, subtree: true }});
reg.observers.set(key, mo);
return key;"#,
        lit(id)
    ))
}

/// Added-node count since the previous call, or `null` once the observer is gone.
pub(crate) fn take_mutations(key: &str) -> String {
    wrap(&format!(
        r#"const key = {};
const count = reg.counters.get(key);
const root = reg.roots.get(key);
if (count === undefined || !root || !root.isConnected) return null;
reg.counters.set(key, 0);
return count;"#,
        lit(key)
    ))
}

pub(crate) fn disconnect(key: &str) -> String {
    wrap(&format!(
        r#"const key = {};
const mo = reg.observers.get(key);
if (mo) mo.disconnect();
reg.observers.delete(key); reg.counters.delete(key); reg.roots.delete(key);
return null;"#,
        lit(key)
    ))
}
