use serde::{Deserialize, Serialize};

use crate::host::{HostValue, ObjectRef, ViewNode, is_component, same_optional};

/// Visibility toggles sent by the panel with `setOptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Show every view, not only those owning a controller or context.
    pub all_views: bool,
    /// Show component views.
    pub components: bool,
}

/// Whether a view appears as its own entry in the snapshot.
///
/// Views failing the predicate are skipped but their children are still
/// walked and attached to the nearest shown ancestor.
pub fn should_show(view: &dyn ViewNode, options: &Options) -> bool {
    let owns_scope = has_own_controller(view) || has_own_context(view);
    (options.all_views || owns_scope)
        && (options.components || !view.is_component())
        && (!view.is_virtual() || owns_scope)
}

fn parent_view_value<T>(view: &dyn ViewNode, f: impl Fn(&dyn ViewNode) -> Option<T>) -> Option<T> {
    view.parent()
        .and_then(|parent| parent.as_view().and_then(|p| f(p)))
}

/// The view's controller differs from its parent's, and the parent's
/// controller is not a component (unless the view itself is one).
pub(crate) fn has_own_controller(view: &dyn ViewNode) -> bool {
    let controller = view.controller();
    let parent_controller: Option<ObjectRef> = parent_view_value(view, |p| p.controller());
    !same_optional(controller.as_ref(), parent_controller.as_ref())
        && (view.is_component() || !parent_controller.as_ref().is_some_and(is_component))
}

/// The view's context differs from its parent's, excluding views yielded
/// inside a component.
pub(crate) fn has_own_context(view: &dyn ViewNode) -> bool {
    let context = view.context();
    let parent_context: Option<HostValue> = parent_view_value(view, |p| p.context());
    let differs = match (&context, &parent_context) {
        (Some(a), Some(b)) => !a.same_as(b),
        (None, None) => false,
        _ => true,
    };
    differs
        && !parent_context
            .as_ref()
            .and_then(HostValue::as_object)
            .is_some_and(is_component)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeObject, FakeView};

    #[test]
    fn test_options_wire_format() {
        let options: Options =
            serde_json::from_str(r#"{"allViews": true, "components": false}"#).unwrap();
        assert!(options.all_views);
        assert!(!options.components);
        let partial: Options = serde_json::from_str(r#"{"components": true}"#).unwrap();
        assert_eq!(
            partial,
            Options {
                all_views: false,
                components: true
            }
        );
    }

    #[test]
    fn test_view_sharing_parent_controller_is_hidden_by_default() {
        let controller = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView")
            .with_controller(&controller)
            .build();
        let child = FakeView::plain("Ember.View").with_controller(&controller).build();
        FakeView::append(&root, &child);

        assert!(!should_show(child.as_ref(), &Options::default()));
        let all = Options {
            all_views: true,
            ..Options::default()
        };
        assert!(should_show(child.as_ref(), &all));
    }

    #[test]
    fn test_view_with_own_controller_is_shown() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let b = FakeObject::controller("App.PostsController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let child = FakeView::plain("App.PostsView").with_controller(&b).build();
        FakeView::append(&root, &child);
        assert!(has_own_controller(child.as_ref()));
        assert!(should_show(child.as_ref(), &Options::default()));
    }

    #[test]
    fn test_components_need_the_components_option() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let component = FakeView::component("App.XFooComponent")
            .with_controller(&FakeObject::controller("App.XFooComponent").build())
            .build();
        FakeView::append(&root, &component);

        assert!(!should_show(component.as_ref(), &Options::default()));
        let with_components = Options {
            components: true,
            ..Options::default()
        };
        assert!(should_show(component.as_ref(), &with_components));
    }

    #[test]
    fn test_virtual_views_need_their_own_scope() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let each = FakeView::plain("Ember._MetamorphView")
            .virtual_view()
            .with_controller(&a)
            .build();
        FakeView::append(&root, &each);
        let all = Options {
            all_views: true,
            components: true,
        };
        assert!(!should_show(each.as_ref(), &all));
    }

    #[test]
    fn test_context_switch_counts_as_own_scope() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let item = FakeObject::new("App.Post").build();
        let each = FakeView::plain("Ember.View")
            .with_controller(&a)
            .with_context(HostValue::Object(item))
            .build();
        FakeView::append(&root, &each);
        assert!(!has_own_controller(each.as_ref()));
        assert!(has_own_context(each.as_ref()));
        assert!(should_show(each.as_ref(), &Options::default()));
    }

    #[test]
    fn test_views_yielded_inside_component_are_not_own_context() {
        let component = FakeView::component("App.XFooComponent").build();
        let component_ref: ObjectRef = component.clone();
        component.set_context(HostValue::Object(component_ref));
        let yielded = FakeView::plain("Ember.View")
            .with_context(HostValue::string("outer"))
            .build();
        FakeView::append(&component, &yielded);
        assert!(!has_own_context(yielded.as_ref()));
    }
}
