//! Dependency Resolver
//!
//! Pure functions over a selected capability list plus the catalog's
//! prerequisite declarations. Prerequisite edges are restricted to
//! capabilities present in the input list; dangling prerequisites are
//! dropped rather than left referencing absent capabilities.
//!
//! Cycles never fail resolution: forward progress wins over strict
//! ordering. Both operations always return a permutation of their input.

use std::collections::{HashMap, HashSet, VecDeque};

use review_catalog::CapabilityCatalog;

use crate::plan::SelectedCapability;

/// Resolve capabilities into dependency levels for parallel execution.
///
/// Greedily peels off all capabilities whose in-list prerequisites are
/// satisfied by previously peeled levels. When no capability can be peeled
/// but some remain (a cycle or unsatisfiable prerequisite), the remainder
/// becomes one final flattened level.
pub fn resolve_into_levels(
    capabilities: &[SelectedCapability],
    catalog: &CapabilityCatalog,
) -> Vec<Vec<SelectedCapability>> {
    let members: HashSet<&str> = capabilities.iter().map(|c| c.name.as_str()).collect();

    let mut levels: Vec<Vec<SelectedCapability>> = Vec::new();
    let mut remaining: Vec<SelectedCapability> = capabilities.to_vec();
    let mut completed: HashSet<String> = HashSet::new();

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<SelectedCapability>, Vec<SelectedCapability>) =
            remaining.into_iter().partition(|capability| {
                catalog
                    .prerequisites_of(&capability.name)
                    .iter()
                    .filter(|prereq| members.contains(prereq.as_str()))
                    .all(|prereq| completed.contains(prereq))
            });

        if ready.is_empty() {
            // Cycle or unsatisfiable prerequisite: flatten the remainder.
            levels.push(blocked);
            break;
        }

        for capability in &ready {
            completed.insert(capability.name.clone());
        }
        levels.push(ready);
        remaining = blocked;
    }

    levels
}

/// Topologically sort capabilities for sequential execution (Kahn's
/// algorithm over the in-list prerequisite graph). Capabilities left over
/// from an undetected cycle are appended in input order, so the output is
/// always a permutation of the input.
pub fn topological_sort(
    capabilities: &[SelectedCapability],
    catalog: &CapabilityCatalog,
) -> Vec<SelectedCapability> {
    let members: HashSet<&str> = capabilities.iter().map(|c| c.name.as_str()).collect();

    // prerequisite -> dependents, in-list edges only
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = capabilities
        .iter()
        .map(|c| (c.name.as_str(), 0))
        .collect();

    for capability in capabilities {
        for prereq in catalog.prerequisites_of(&capability.name) {
            if members.contains(prereq.as_str()) {
                dependents
                    .entry(prereq.as_str())
                    .or_default()
                    .push(capability.name.as_str());
                *in_degree.entry(capability.name.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = capabilities
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| in_degree[name] == 0)
        .collect();

    let mut ordered_names: Vec<&str> = Vec::with_capacity(capabilities.len());
    while let Some(current) = queue.pop_front() {
        ordered_names.push(current);
        if let Some(deps) = dependents.get(current) {
            for dependent in deps {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }
    }

    let placed: HashSet<&str> = ordered_names.iter().copied().collect();
    let by_name: HashMap<&str, &SelectedCapability> = capabilities
        .iter()
        .map(|c| (c.name.as_str(), c))
        .collect();

    let mut result: Vec<SelectedCapability> = ordered_names
        .iter()
        .map(|name| by_name[name].clone())
        .collect();

    // Cycle leftovers, in input order.
    result.extend(
        capabilities
            .iter()
            .filter(|c| !placed.contains(c.name.as_str()))
            .cloned(),
    );

    result
}
