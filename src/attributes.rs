//! Rendering and diffing of custom attributes.

use crate::change::ApiChange;
use crate::model::CustomAttribute;

/// Renders an attribute the way it would be written in C#.
///
/// `System.ObsoleteAttribute` with `Message = "Use Bar"` renders as
/// `[Obsolete("Use Bar")]`; other attributes list their named properties.
pub fn render_attribute(attribute: &CustomAttribute) -> String {
    if let Some(obsolete) = attribute.as_obsolete() {
        return match (obsolete.message, obsolete.is_error) {
            (Some(message), true) => format!("[Obsolete(\"{}\", true)]", message),
            (Some(message), false) => format!("[Obsolete(\"{}\")]", message),
            (None, true) => "[Obsolete(null, true)]".to_string(),
            (None, false) => "[Obsolete]".to_string(),
        };
    }

    if attribute.properties.is_empty() {
        return format!("[{}]", attribute.display_name());
    }

    let arguments: Vec<String> = attribute
        .properties
        .iter()
        .map(|p| format!("{} = {}", p.name, literal(&p.value)))
        .collect();
    format!("[{}({})]", attribute.display_name(), arguments.join(", "))
}

fn literal(value: &str) -> String {
    let is_bare = value == "true"
        || value == "false"
        || value == "null"
        || value.parse::<f64>().is_ok();
    if is_bare {
        value.to_string()
    } else {
        format!("\"{}\"", value)
    }
}

/// Adding an attribute is breaking only when it turns the element into an
/// obsolete-as-error one.
fn is_breaking_addition(attribute: &CustomAttribute) -> bool {
    attribute.as_obsolete().is_some_and(|o| o.is_error)
}

/// Appends one line per attribute to `change`: unchanged attributes as plain
/// text, dropped ones as removals and new ones as additions.
pub fn diff_attributes(
    change: &mut ApiChange,
    source: &[CustomAttribute],
    target: &[CustomAttribute],
) {
    let source_rendered: Vec<String> = source.iter().map(render_attribute).collect();
    let target_rendered: Vec<String> = target.iter().map(render_attribute).collect();

    for rendered in &source_rendered {
        change.new_line();
        if target_rendered.contains(rendered) {
            change.append(rendered.as_str());
        } else {
            change.removed(rendered.as_str(), false);
        }
    }

    for (attribute, rendered) in target.iter().zip(&target_rendered) {
        if !source_rendered.contains(rendered) {
            change
                .new_line()
                .added(rendered.as_str(), is_breaking_addition(attribute));
        }
    }
}

/// Diff of a type's own attributes, or `None` if they did not change.
pub fn attribute_change(
    header: &str,
    source: &[CustomAttribute],
    target: &[CustomAttribute],
) -> Option<ApiChange> {
    let mut change = ApiChange::new(header);
    diff_attributes(&mut change, source, target);
    change.has_changes().then_some(change)
}
