//! Runtime registry of custom transforms.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::access::Data;
use crate::expression::arg::Operand;
use crate::expression::function::CustomFunction;

static CUSTOM_FUNCTIONS: LazyLock<DashMap<String, CustomFunction>> = LazyLock::new(DashMap::new);

/// Register a custom transform which can from then on be referenced by name.
///
/// Registering an existing name replaces the previous function.
pub fn register<F>(name: impl Into<String>, func: F)
where
    F: Fn(&[Operand], &BTreeMap<String, Operand>) -> anyhow::Result<Data> + Send + Sync + 'static,
{
    let name = name.into();
    log::debug!("registering custom transform '{}'", name);
    CUSTOM_FUNCTIONS.insert(name.clone(), CustomFunction::new(name, func));
}

/// Remove a registered transform, returning whether it existed
pub fn unregister(name: &str) -> bool {
    CUSTOM_FUNCTIONS.remove(name).is_some()
}

pub fn lookup(name: &str) -> Option<CustomFunction> {
    CUSTOM_FUNCTIONS.get(name).map(|entry| entry.value().clone())
}

/// Names of all registered transforms, sorted
pub fn registered_names() -> Vec<String> {
    let mut names: Vec<String> = CUSTOM_FUNCTIONS
        .iter()
        .map(|entry| entry.key().clone())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Value;

    #[test]
    fn test_register_and_lookup() {
        register("registry_test_identity", |args, _| {
            Ok(args[0].as_data().cloned().unwrap_or(Data::Array(vec![])))
        });
        let func = lookup("registry_test_identity").unwrap();
        assert_eq!(func.name(), "registry_test_identity");
        assert!(registered_names().contains(&"registry_test_identity".to_string()));

        let args = vec![Operand::Data(Data::Scalar(Value::Int(4)))];
        assert_eq!(
            func.call(&args, &BTreeMap::new()).unwrap(),
            Data::Scalar(Value::Int(4))
        );

        assert!(unregister("registry_test_identity"));
        assert!(lookup("registry_test_identity").is_none());
        assert!(!unregister("registry_test_identity"));
    }

    #[test]
    fn test_register_replaces_existing() {
        register("registry_test_replace", |_, _| Ok(Data::Scalar(Value::Int(1))));
        register("registry_test_replace", |_, _| Ok(Data::Scalar(Value::Int(2))));
        let result = lookup("registry_test_replace")
            .unwrap()
            .call(&[], &BTreeMap::new())
            .unwrap();
        assert_eq!(result, Data::Scalar(Value::Int(2)));
        unregister("registry_test_replace");
    }
}
