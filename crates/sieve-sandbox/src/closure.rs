// closure.rs — Transitive dependency closure.
//
// Starting from the requested packages, walk the accumulated list and
// resolve every dependency name not seen before, appending it to the end.
// The walk stops when it reaches the end of a list that no longer grows.
// Each name is resolved at most once, so cycles and diamonds terminate.
// The result is in first-discovery order; it is a set, not a build order.

use std::collections::HashSet;

use crate::error::SandboxError;
use crate::package::Package;
use crate::resolver::PackageResolver;

/// Expand `requested` to every package it transitively depends on.
///
/// The requested packages come first, in their given order.
pub fn dependency_closure(
    requested: Vec<Package>,
    resolver: &dyn PackageResolver,
) -> Result<Vec<Package>, SandboxError> {
    let mut seen: HashSet<String> = requested.iter().map(|p| p.name.clone()).collect();
    let mut closure = requested;
    let mut index = 0;

    while index < closure.len() {
        let dependencies = closure[index].dependency_names.clone();
        for name in dependencies {
            if !seen.insert(name.clone()) {
                continue;
            }
            tracing::debug!(dependency = %name, of = %closure[index].name, "resolving dependency");
            let package = resolver.resolve(&name)?;
            // A store may hand back a package whose metadata name differs
            // from the directory we asked for.
            if package.name != name && !seen.insert(package.name.clone()) {
                continue;
            }
            closure.push(package);
        }
        index += 1;
    }

    Ok(closure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Resolver backed by a map, counting lookups per name.
    struct MapResolver {
        packages: HashMap<String, Package>,
        calls: RefCell<Vec<String>>,
    }

    impl MapResolver {
        fn new(graph: &[(&str, &[&str])]) -> Self {
            let packages = graph
                .iter()
                .map(|(name, deps)| {
                    let pkg = Package::new(*name, "1.0.0", format!("/store/{name}"))
                        .with_dependencies(deps.iter().copied());
                    (name.to_string(), pkg)
                })
                .collect();
            Self {
                packages,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn root(&self, name: &str) -> Package {
            self.packages[name].clone()
        }
    }

    impl PackageResolver for MapResolver {
        fn resolve(&self, name: &str) -> Result<Package, SandboxError> {
            self.calls.borrow_mut().push(name.to_string());
            self.packages
                .get(name)
                .cloned()
                .ok_or_else(|| SandboxError::PackageNotFound {
                    name: name.to_string(),
                    searched: Vec::new(),
                })
        }
    }

    fn names(packages: &[Package]) -> Vec<&str> {
        packages.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn cycle_terminates_with_both_packages() {
        let resolver = MapResolver::new(&[("a", &["b"]), ("b", &["a"])]);
        let closure = dependency_closure(vec![resolver.root("a")], &resolver).unwrap();
        assert_eq!(names(&closure), vec!["a", "b"]);
        assert_eq!(*resolver.calls.borrow(), vec!["b"]);
    }

    #[test]
    fn diamond_resolves_shared_dependency_once() {
        let resolver = MapResolver::new(&[
            ("app", &["left", "right"]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("base", &[]),
        ]);
        let closure = dependency_closure(vec![resolver.root("app")], &resolver).unwrap();
        assert_eq!(names(&closure), vec!["app", "left", "right", "base"]);
        assert_eq!(*resolver.calls.borrow(), vec!["left", "right", "base"]);
    }

    #[test]
    fn requested_packages_are_never_re_resolved() {
        let resolver = MapResolver::new(&[("a", &["b"]), ("b", &[])]);
        let requested = vec![resolver.root("a"), resolver.root("b")];
        let closure = dependency_closure(requested, &resolver).unwrap();
        assert_eq!(names(&closure), vec!["a", "b"]);
        assert!(resolver.calls.borrow().is_empty());
    }

    #[test]
    fn closure_is_idempotent() {
        let resolver = MapResolver::new(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let once = dependency_closure(vec![resolver.root("a")], &resolver).unwrap();
        let twice = dependency_closure(once.clone(), &resolver).unwrap();
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn missing_dependency_fails() {
        let resolver = MapResolver::new(&[("a", &["ghost"])]);
        let result = dependency_closure(vec![resolver.root("a")], &resolver);
        match result {
            Err(SandboxError::PackageNotFound { name, .. }) => assert_eq!(name, "ghost"),
            other => panic!("expected PackageNotFound, got {:?}", other),
        }
    }
}
