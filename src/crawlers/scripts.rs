//! Scripts executed inside the rendered page.
//!
//! Each is a WebDriver `execute` body; inputs arrive through `arguments` so
//! selectors never need escaping into source.

/// Scroll down one viewport to trigger lazy-loaded catalog items
pub const SCROLL_VIEWPORT: &str = "window.scrollBy(0, window.innerHeight);";

/// Nudge an item page so above-the-fold media starts loading
pub const SCROLL_ITEM_INTRO: &str = "window.scrollTo(0, 200);";

/// Bring the description area of an item page into view
pub const SCROLL_ITEM_BODY: &str = "window.scrollTo(0, document.body.scrollHeight / 3);";

/// Count anchors for the first selector in `arguments[0]` that matches anything
pub const COUNT_ANCHORS: &str = r#"
const selectors = arguments[0] || [];
for (const sel of selectors) {
    try {
        const n = document.querySelectorAll(sel).length;
        if (n > 0) return n;
    } catch (e) {}
}
return 0;
"#;

/// Absolute, query-less, page-unique hrefs for the first selector in `arguments[0]` that matches
///
/// Blank `href` attributes are skipped, but a selector that matched still ends the search.
pub const COLLECT_LINKS: &str = r#"
const selectors = arguments[0] || [];
let nodes = [];
for (const sel of selectors) {
    try {
        nodes = Array.from(document.querySelectorAll(sel));
    } catch (e) {
        nodes = [];
    }
    if (nodes.length > 0) break;
}
const out = [];
for (const n of nodes) {
    try {
        const raw = (n.getAttribute('href') || '').trim();
        if (!raw) continue;
        out.push(new URL(raw, location.href).href.split('?')[0]);
    } catch (e) {}
}
return Array.from(new Set(out));
"#;

/// Field map built from the per-field strategy lists in `arguments[0]`
///
/// Every key of the strategy object appears in the result; a field whose
/// strategies all come back empty is returned as "".
pub const EXTRACT_FIELDS: &str = r#"
const strategies = arguments[0] || {};
function read(s) {
    try {
        const el = document.querySelector(s.selector);
        if (!el) return "";
        const v = s.mode === "attribute" ? el.getAttribute(s.name) : el.innerText;
        return (v || "").trim();
    } catch (e) {
        return "";
    }
}
const out = {};
for (const field of Object.keys(strategies)) {
    out[field] = "";
    for (const s of strategies[field]) {
        const v = read(s);
        if (v) {
            out[field] = v;
            break;
        }
    }
}
return out;
"#;
