use plwasm_engine::Node;

/// Attribute marking a node as an editable property: `property(category, display_name)`.
pub const PROPERTY_ATTRIBUTE: &str = "property";

/// A node that passed the property filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNode {
    /// Position in the collected list; stays stable across identical runs.
    pub id: usize,
    pub category: String,
    pub name: String,
    pub node: Node,
}

/// Keep the nodes whose `property` attribute has exactly `(category, name)`, in the order the
/// engine produced them.
pub fn collect(nodes: impl IntoIterator<Item = Node>) -> Vec<PropertyNode> {
    nodes
        .into_iter()
        .filter_map(|node| {
            let (category, name) = match node.attribute_args(PROPERTY_ATTRIBUTE)? {
                [category, name] => (category.clone(), name.clone()),
                args => {
                    log::debug!(
                        "skipping '{}': property attribute takes 2 arguments, got {}",
                        node.name,
                        args.len()
                    );
                    return None;
                }
            };
            Some((category, name, node))
        })
        .enumerate()
        .map(|(id, (category, name, node))| PropertyNode { id, category, name, node })
        .collect()
}
