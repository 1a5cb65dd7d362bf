use super::types::{IrSpec, NormalizedName};
use crate::transform::name_normalizer::normalize_name;
use indexmap::IndexMap;

/// How operations are grouped for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Service,
    Operation,
    Route,
}

/// A group of operations.
#[derive(Debug, Clone)]
pub struct OperationGroup {
    pub name: NormalizedName,
    pub operation_indices: Vec<usize>,
}

/// Group operations in the IR spec according to the strategy.
pub fn group_operations(ir: &IrSpec, group_by: GroupBy) -> Vec<OperationGroup> {
    match group_by {
        GroupBy::Service => group_by_service(ir),
        GroupBy::Operation => group_by_operation(ir),
        GroupBy::Route => group_by_route(ir),
    }
}

/// Group by service, reusing the `IrModule` groupings.
fn group_by_service(ir: &IrSpec) -> Vec<OperationGroup> {
    ir.modules
        .iter()
        .map(|m| OperationGroup {
            name: m.name.clone(),
            operation_indices: m.operations.clone(),
        })
        .collect()
}

/// One group per operation.
fn group_by_operation(ir: &IrSpec) -> Vec<OperationGroup> {
    ir.operations
        .iter()
        .enumerate()
        .map(|(i, op)| OperationGroup {
            name: op.name.clone(),
            operation_indices: vec![i],
        })
        .collect()
}

/// Group operations by their first literal path segment.
fn group_by_route(ir: &IrSpec) -> Vec<OperationGroup> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();

    for (i, op) in ir.operations.iter().enumerate() {
        let prefix = extract_path_prefix(&op.path);
        groups.entry(prefix).or_default().push(i);
    }

    groups
        .into_iter()
        .map(|(prefix, indices)| OperationGroup {
            name: normalize_name(&prefix),
            operation_indices: indices,
        })
        .collect()
}

/// Extract the first meaningful path segment as a group name.
/// e.g. "/pets/{petId}" → "pets", "/store/inventory" → "store"
fn extract_path_prefix(path: &str) -> String {
    path.split('/')
        .find(|s| !s.is_empty() && !s.starts_with('{'))
        .unwrap_or("default")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_path_prefix() {
        assert_eq!(extract_path_prefix("/pets"), "pets");
        assert_eq!(extract_path_prefix("/pets/{petId}"), "pets");
        assert_eq!(extract_path_prefix("/store/inventory"), "store");
        assert_eq!(extract_path_prefix("/{tenant}/users"), "users");
        assert_eq!(extract_path_prefix("/"), "default");
    }
}
