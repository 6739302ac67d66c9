//! Labels shown for views, controllers and models.
//!
//! Names are derived from the metadata the host supplies (class name,
//! container key, template) instead of parsing stringified constructors.

use crate::{
    host::{ObjectRef, ViewKind, ViewNode, same_optional},
    inspect::truncate,
};

const INLINE_VIEW: &str = "(inline view)";

/// Class name without resolver prefixes (`app@view:foo:` becomes `foo`).
pub(crate) fn short_view_class(class_name: &str) -> String {
    let start = ["view:", "component:"]
        .iter()
        .filter_map(|marker| {
            class_name
                .rfind(marker)
                .filter(|at| *at > 0)
                .map(|at| at + marker.len())
        })
        .max()
        .unwrap_or(0);
    strip_trailing_colon(&class_name[start..]).to_string()
}

/// Controller class name without the resolver prefix (`app@controller:posts:`).
pub(crate) fn short_controller_name(class_name: &str) -> String {
    const MARKER: &str = "@controller:";
    let start = class_name
        .rfind(MARKER)
        .filter(|at| *at > 0)
        .map_or(0, |at| at + MARKER.len());
    strip_trailing_colon(&class_name[start..]).to_string()
}

/// Bounded description of a model object.
pub(crate) fn model_name(model: &ObjectRef) -> String {
    truncate(&model.describe())
}

/// [`model_name`] with `<app@model:post:ember1>` shortened to `<post:ember1>`.
pub(crate) fn short_model_name(model: &ObjectRef) -> String {
    const MARKER: &str = "@model:";
    let name = model_name(model);
    let mut out = String::with_capacity(name.len());
    let mut rest = name.as_str();
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..=open]);
        let after = &rest[open + 1..];
        let end = after.find('>').unwrap_or(after.len());
        rest = match after[..end].rfind(MARKER) {
            Some(at) if at > 0 => &after[at + MARKER.len()..],
            _ => after,
        };
    }
    out.push_str(rest);
    out
}

fn strip_trailing_colon(name: &str) -> &str {
    name.strip_suffix(':').unwrap_or(name)
}

/// `foo-bar_baz.qux` becomes `fooBarBazQux`; the first letter of every
/// `/`-separated segment is lowercased (`Posts/Index` becomes `posts/index`).
pub(crate) fn camelize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut upper_next = false;
    for c in text.chars() {
        if matches!(c, '-' | '_' | '.') || c.is_whitespace() {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    let mut segment_start = true;
    out.chars()
        .map(|c| {
            let c = if segment_start { c.to_ascii_lowercase() } else { c };
            segment_start = c == '/';
            c
        })
        .collect()
}

/// Display name of a view in the tree.
pub(crate) fn view_description(object: &ObjectRef, view: &dyn ViewNode) -> String {
    if let Some(template) = view.template_name().filter(|t| !t.is_empty()) {
        return template.into_owned();
    }
    if view.kind() == ViewKind::Link {
        return "link".to_string();
    }

    let controller = view.controller();
    let parent_controller = view
        .parent()
        .and_then(|parent| parent.as_view().and_then(|p| p.controller()));

    let shares_controller = same_optional(parent_controller.as_ref(), controller.as_ref());
    let name = if view.is_component() || shares_controller {
        name_from_view(object)
    } else {
        controller.as_ref().and_then(name_from_controller)
    };

    name.filter(|n| !n.is_empty())
        .unwrap_or_else(|| INLINE_VIEW.to_string())
}

fn name_from_view(object: &ObjectRef) -> Option<String> {
    let keyed = object
        .container_key()
        .and_then(|key| key.split_once(':').map(|(_, name)| name.to_string()))
        .filter(|name| !name.is_empty());
    if let Some(name) = keyed {
        return Some(camelize(&name));
    }

    let class = short_view_class(&object.class_name());
    let innermost = class.rsplit('.').next().unwrap_or(&class);
    let short = innermost
        .strip_suffix("View")
        .or_else(|| innermost.strip_suffix("Component"))
        .unwrap_or(innermost);
    (!short.is_empty()).then(|| camelize(short))
}

fn name_from_controller(controller: &ObjectRef) -> Option<String> {
    if let Some(key) = controller.container_key() {
        return key.split(':').nth(1).map(str::to_string);
    }
    let class = controller.class_name();
    let innermost = class.rsplit('.').next().unwrap_or(&class);
    Some(camelize(innermost))
}
