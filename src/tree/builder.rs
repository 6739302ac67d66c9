use std::{borrow::Cow, collections::HashSet, sync::Arc};

use crate::{
    ObjectId, ObjectRegistry,
    host::{HostObject, HostValue, LiveTree, ObjectRef, ViewNode, same_optional},
    inspect::inspect,
};

use super::{
    ControllerDescriptor, Durations, ModelDescriptor, NodeDescriptor, Options, TreeNode, naming,
    visibility,
};

/// Builds display trees from the live view tree.
///
/// Every build is a new generation: the ids of all objects it describes are
/// retained, and ids of the previous generation that are no longer described
/// are released. Objects present in both keep their id.
pub struct SnapshotBuilder {
    registry: Arc<ObjectRegistry>,
    generation: Vec<ObjectId>,
    durations: Durations,
}

/// The object behind a snapshot's `tree_id`: the ids of its generation.
struct Generation {
    ids: Vec<ObjectId>,
}

impl HostObject for Generation {
    fn class_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("RetainedGeneration")
    }

    fn describe(&self) -> String {
        format!("<RetainedGeneration: {} objects>", self.ids.len())
    }
}

impl SnapshotBuilder {
    pub fn new(registry: Arc<ObjectRegistry>) -> Self {
        Self {
            registry,
            generation: Vec::new(),
            durations: Durations::default(),
        }
    }

    pub fn update_durations<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (ObjectId, f64)>,
    {
        self.durations.merge(entries);
    }

    /// Ids retained by the most recent snapshot, including its tree id.
    pub fn generation(&self) -> &[ObjectId] {
        &self.generation
    }

    /// Walks the live tree and returns the new snapshot.
    ///
    /// Returns `None` when the tree currently has no root; the previous
    /// generation is released in that case too, since its views are gone.
    pub fn build(&mut self, tree: &dyn LiveTree, options: &Options) -> Option<TreeNode> {
        let Some(root) = tree.root() else {
            tracing::debug!("view tree has no root, skipping snapshot");
            self.release_generation();
            return None;
        };
        let Some(root_view) = root.as_view() else {
            tracing::debug!(
                class = %root.class_name(),
                "tree root is not a view, skipping snapshot"
            );
            self.release_generation();
            return None;
        };

        let mut pass = Pass {
            registry: &self.registry,
            durations: &self.durations,
            options,
            retained: Vec::new(),
            seen: HashSet::new(),
        };
        let value = pass.describe(&root, root_view);
        let mut children = Vec::new();
        pass.append_children(root_view, &mut children);
        let mut retained = pass.retained;

        let generation: ObjectRef = Arc::new(Generation {
            ids: retained.clone(),
        });
        let tree_id = self.registry.retain(&generation);
        retained.push(tree_id.clone());
        self.swap_generation(retained);

        tracing::debug!(%tree_id, retained = self.generation.len(), "snapshot built");
        Some(TreeNode {
            value,
            children,
            tree_id: Some(tree_id),
        })
    }

    fn swap_generation(&mut self, next: Vec<ObjectId>) {
        let previous = std::mem::replace(&mut self.generation, next);
        let kept: HashSet<&ObjectId> = self.generation.iter().collect();
        self.registry
            .release_all(previous.iter().filter(|id| !kept.contains(id)));
    }

    /// Releases every id of the current generation.
    pub fn release_generation(&mut self) {
        self.registry.release_all(&self.generation);
        self.generation.clear();
    }
}

/// State of a single build.
struct Pass<'a> {
    registry: &'a ObjectRegistry,
    durations: &'a Durations,
    options: &'a Options,
    retained: Vec<ObjectId>,
    seen: HashSet<ObjectId>,
}

impl Pass<'_> {
    fn retain(&mut self, object: &ObjectRef) -> ObjectId {
        let id = self.registry.retain(object);
        if self.seen.insert(id.clone()) {
            self.retained.push(id.clone());
        }
        id
    }

    /// Appends the shown descendants of `view` to `out`. Hidden views are
    /// flattened: their shown descendants land in `out` in render order.
    fn append_children(&mut self, view: &dyn ViewNode, out: &mut Vec<TreeNode>) {
        for child in view.children() {
            let Some(child_view) = child.as_view() else {
                continue;
            };
            if visibility::should_show(child_view, self.options) {
                let value = self.describe(&child, child_view);
                let mut grandchildren = Vec::new();
                self.append_children(child_view, &mut grandchildren);
                out.push(TreeNode::new(value, grandchildren));
            } else {
                self.append_children(child_view, out);
            }
        }
    }

    fn describe(&mut self, object: &ObjectRef, view: &dyn ViewNode) -> NodeDescriptor {
        let complete_view_class = object.class_name().into_owned();
        let tag_name = match view.tag_name() {
            Some(tag) if tag.is_empty() => "(virtual)".to_string(),
            Some(tag) => tag.into_owned(),
            None => "div".to_string(),
        };
        let template = view
            .template_name()
            .filter(|t| !t.is_empty())
            .map_or_else(|| "(inline)".to_string(), Cow::into_owned);
        let name = naming::view_description(object, view);

        let object_id = self.retain(object);
        let duration = self.durations.get(&object_id);

        let mut value = NodeDescriptor {
            view_class: naming::short_view_class(&complete_view_class),
            complete_view_class,
            object_id,
            duration,
            name,
            template,
            tag_name,
            is_virtual: view.is_virtual(),
            is_component: view.is_component(),
            controller: None,
            model: None,
        };

        if !view.is_component() {
            if let Some(controller) = own_controller(view) {
                let complete_name = controller.class_name().into_owned();
                value.controller = Some(ControllerDescriptor {
                    name: naming::short_controller_name(&complete_name),
                    complete_name,
                    object_id: self.retain(&controller),
                });
                value.model = model_for_view(view)
                    .filter(HostValue::is_truthy)
                    .map(|model| self.describe_model(&model));
            }
        }

        value
    }

    fn describe_model(&mut self, model: &HostValue) -> ModelDescriptor {
        match model {
            HostValue::Object(object) => ModelDescriptor::object(
                naming::short_model_name(object),
                naming::model_name(object),
                self.retain(object),
            ),
            HostValue::Scalar(scalar) => {
                ModelDescriptor::scalar(inspect(model), scalar.type_name())
            }
        }
    }
}

/// The view's controller when it differs from its parent's.
fn own_controller(view: &dyn ViewNode) -> Option<ObjectRef> {
    let controller = view.controller()?;
    let parent_controller = view
        .parent()
        .and_then(|parent| parent.as_view().and_then(|p| p.controller()));
    (!same_optional(Some(&controller), parent_controller.as_ref())).then_some(controller)
}

/// The model a view presents: its controller's model, or its context when
/// the context was switched away from the controller.
pub(crate) fn model_for_view(view: &dyn ViewNode) -> Option<HostValue> {
    let controller = view.controller()?;
    let controller_value = HostValue::Object(controller.clone());
    match view.context() {
        Some(context) if context.same_as(&controller_value) => controller.model(),
        context => context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::Scalar,
        testing::{FakeObject, FakeTree, FakeView},
    };

    fn registry() -> Arc<ObjectRegistry> {
        Arc::new(ObjectRegistry::new("obj"))
    }

    fn names(tree: &TreeNode) -> Vec<String> {
        tree.iter().map(|n| n.value.name.clone()).collect()
    }

    #[test]
    fn test_missing_root_builds_nothing() {
        let tree = FakeTree::new();
        let mut builder = SnapshotBuilder::new(registry());
        assert!(builder.build(&tree, &Options::default()).is_none());
        assert!(builder.generation().is_empty());
    }

    #[test]
    fn test_component_is_flattened_and_descendant_reparented() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let b = FakeObject::controller("App.YController").build();
        let root = FakeView::plain("App.ApplicationView")
            .with_template("application")
            .with_controller(&a)
            .build();
        let x = FakeView::component("App.XComponent")
            .with_template("x")
            .with_controller(&a)
            .build();
        let y = FakeView::plain("App.YView")
            .with_template("y")
            .with_controller(&b)
            .build();
        FakeView::append(&root, &x);
        FakeView::append(&x, &y);
        let tree = FakeTree::with_root(&root);

        let mut builder = SnapshotBuilder::new(registry());
        let snapshot = builder.build(&tree, &Options::default()).unwrap();

        assert_eq!(names(&snapshot), ["application", "y"]);
        assert_eq!(snapshot.children.len(), 1);
        assert_eq!(snapshot.children[0].value.name, "y");
        assert!(snapshot.tree_id.is_some());
    }

    #[test]
    fn test_flattening_preserves_render_order() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let hidden = FakeView::plain("Ember.ContainerView").with_controller(&a).build();
        let first = FakeView::plain("App.FirstView")
            .with_template("first")
            .with_controller(&FakeObject::controller("App.FirstController").build())
            .build();
        let second = FakeView::plain("App.SecondView")
            .with_template("second")
            .with_controller(&FakeObject::controller("App.SecondController").build())
            .build();
        let third = FakeView::plain("App.ThirdView")
            .with_template("third")
            .with_controller(&FakeObject::controller("App.ThirdController").build())
            .build();
        FakeView::append(&root, &first);
        FakeView::append(&root, &hidden);
        FakeView::append(&hidden, &second);
        FakeView::append(&root, &third);
        let tree = FakeTree::with_root(&root);

        let snapshot = SnapshotBuilder::new(registry())
            .build(&tree, &Options::default())
            .unwrap();
        let children: Vec<_> = snapshot.children.iter().map(|c| c.value.name.as_str()).collect();
        assert_eq!(children, ["first", "second", "third"]);
    }

    #[test]
    fn test_all_views_option_shows_hidden_views() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let child = FakeView::plain("App.ChildView")
            .with_template("child")
            .with_controller(&a)
            .build();
        FakeView::append(&root, &child);
        let tree = FakeTree::with_root(&root);
        let mut builder = SnapshotBuilder::new(registry());

        let hidden = builder.build(&tree, &Options::default()).unwrap();
        assert!(hidden.children.is_empty());

        let all = Options {
            all_views: true,
            components: false,
        };
        let shown = builder.build(&tree, &all).unwrap();
        assert_eq!(shown.children[0].value.name, "child");
    }

    #[test]
    fn test_ids_are_stable_across_generations() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let tree = FakeTree::with_root(&root);
        let mut builder = SnapshotBuilder::new(registry());

        let first = builder.build(&tree, &Options::default()).unwrap();
        let second = builder.build(&tree, &Options::default()).unwrap();
        assert_eq!(first.value.object_id, second.value.object_id);
        assert_eq!(
            first.value.controller.as_ref().unwrap().object_id,
            second.value.controller.as_ref().unwrap().object_id
        );
        assert_ne!(first.tree_id, second.tree_id);
    }

    #[test]
    fn test_removed_views_are_released_on_next_generation() {
        let registry = registry();
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let child = FakeView::plain("App.PostsView")
            .with_controller(&FakeObject::controller("App.PostsController").build())
            .build();
        FakeView::append(&root, &child);
        let tree = FakeTree::with_root(&root);
        let mut builder = SnapshotBuilder::new(registry.clone());

        let first = builder.build(&tree, &Options::default()).unwrap();
        let child_id = first.children[0].value.object_id.clone();
        let first_tree_id = first.tree_id.clone().unwrap();
        for id in first.object_ids() {
            assert!(registry.contains(id));
        }

        FakeView::remove(&root, &child);
        let second = builder.build(&tree, &Options::default()).unwrap();
        assert!(second.children.is_empty());
        assert!(!registry.contains(&child_id));
        assert!(!registry.contains(&first_tree_id));
        assert!(registry.contains(&second.value.object_id));
    }

    #[test]
    fn test_missing_root_releases_previous_generation() {
        let registry = registry();
        let root = FakeView::plain("App.ApplicationView")
            .with_controller(&FakeObject::controller("App.ApplicationController").build())
            .build();
        let tree = FakeTree::with_root(&root);
        let mut builder = SnapshotBuilder::new(registry.clone());
        builder.build(&tree, &Options::default()).unwrap();
        assert!(!registry.is_empty());

        tree.set_root(None);
        assert!(builder.build(&tree, &Options::default()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_tree_id_resolves_to_generation() {
        let registry = registry();
        let root = FakeView::plain("App.ApplicationView").build();
        let tree = FakeTree::with_root(&root);
        let mut builder = SnapshotBuilder::new(registry.clone());
        let snapshot = builder.build(&tree, &Options::default()).unwrap();
        let generation = registry.resolve(snapshot.tree_id.as_ref().unwrap()).unwrap();
        assert_eq!(generation.class_name(), "RetainedGeneration");
        assert_eq!(builder.generation().len(), registry.len());
    }

    #[test]
    fn test_scalar_model_is_described_but_not_retained() {
        let registry = registry();
        let controller = FakeObject::controller("App.GreetingController")
            .with_model(HostValue::string("hello"))
            .build();
        let root = FakeView::plain("App.ApplicationView")
            .with_controller(&controller)
            .build();
        let tree = FakeTree::with_root(&root);
        let snapshot = SnapshotBuilder::new(registry.clone())
            .build(&tree, &Options::default())
            .unwrap();

        let model = snapshot.value.model.as_ref().unwrap();
        assert_eq!(model, &ModelDescriptor::scalar("hello".into(), "string"));
        assert!(model.object_id.is_none());
        // view, controller and the generation itself
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_object_model_is_retained() {
        let registry = registry();
        let post = FakeObject::new("App.Post")
            .with_description("<app@model:post::ember7:1>")
            .build();
        let controller = FakeObject::controller("App.PostController")
            .with_model(HostValue::Object(post.clone()))
            .build();
        let root = FakeView::plain("App.PostView").with_controller(&controller).build();
        let tree = FakeTree::with_root(&root);
        let snapshot = SnapshotBuilder::new(registry.clone())
            .build(&tree, &Options::default())
            .unwrap();

        let model = snapshot.value.model.as_ref().unwrap();
        assert!(model.is_object());
        assert_eq!(model.name, "<post::ember7:1>");
        assert_eq!(model.complete_name.as_deref(), Some("<app@model:post::ember7:1>"));
        let post_ref: ObjectRef = post;
        assert_eq!(model.object_id, registry.id_of(&post_ref));
    }

    #[test]
    fn test_falsy_models_are_omitted() {
        let controller = FakeObject::controller("App.EmptyController")
            .with_model(HostValue::Scalar(Scalar::Null))
            .build();
        let root = FakeView::plain("App.ApplicationView")
            .with_controller(&controller)
            .build();
        let snapshot = SnapshotBuilder::new(registry())
            .build(&FakeTree::with_root(&root), &Options::default())
            .unwrap();
        assert!(snapshot.value.controller.is_some());
        assert!(snapshot.value.model.is_none());
    }

    #[test]
    fn test_context_override_becomes_model() {
        let a = FakeObject::controller("App.PostsController")
            .with_model(HostValue::string("posts"))
            .build();
        let root = FakeView::plain("App.PostsView").with_controller(&a).build();
        let item = FakeObject::new("App.Post").with_description("<App.Post:1>").build();
        let each = FakeView::plain("App.PostItemView")
            .with_controller(&FakeObject::controller("App.PostItemController").build())
            .with_context(HostValue::Object(item))
            .build();
        FakeView::append(&root, &each);
        let snapshot = SnapshotBuilder::new(registry())
            .build(&FakeTree::with_root(&root), &Options::default())
            .unwrap();
        let model = snapshot.children[0].value.model.as_ref().unwrap();
        assert_eq!(model.name, "<App.Post:1>");
    }

    #[test]
    fn test_components_carry_no_controller_metadata() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let component = FakeView::component("App.XFooComponent")
            .with_controller(&FakeObject::controller("App.XFooComponent").build())
            .build();
        FakeView::append(&root, &component);
        let options = Options {
            all_views: false,
            components: true,
        };
        let snapshot = SnapshotBuilder::new(registry())
            .build(&FakeTree::with_root(&root), &options)
            .unwrap();
        let node = &snapshot.children[0].value;
        assert!(node.is_component);
        assert!(node.controller.is_none());
        assert!(node.model.is_none());
    }

    #[test]
    fn test_durations_are_merged_by_id() {
        let root = FakeView::plain("App.ApplicationView").build();
        let tree = FakeTree::with_root(&root);
        let mut builder = SnapshotBuilder::new(registry());
        let first = builder.build(&tree, &Options::default()).unwrap();
        assert!(first.value.duration.is_none());

        builder.update_durations([(first.value.object_id.clone(), 12.5)]);
        let second = builder.build(&tree, &Options::default()).unwrap();
        assert_eq!(second.value.duration, Some(12.5));
    }

    #[test]
    fn test_tag_and_template_labels() {
        let a = FakeObject::controller("App.ApplicationController").build();
        let root = FakeView::plain("App.ApplicationView").with_controller(&a).build();
        let tagless = FakeView::plain("App.TaglessView")
            .with_tag("")
            .with_controller(&FakeObject::controller("App.TaglessController").build())
            .build();
        FakeView::append(&root, &tagless);
        let snapshot = SnapshotBuilder::new(registry())
            .build(&FakeTree::with_root(&root), &Options::default())
            .unwrap();
        assert_eq!(snapshot.value.tag_name, "div");
        assert_eq!(snapshot.value.template, "(inline)");
        assert_eq!(snapshot.children[0].value.tag_name, "(virtual)");
    }
}
