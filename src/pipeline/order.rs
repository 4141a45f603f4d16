//! Dependency ordering for pipeline runs.

use std::collections::BTreeSet;

/// Topologically order `count` nodes given each node's dependencies
/// (indices that must come earlier). Among nodes with no ordering
/// constraint between them, lower input indices come first, so the result
/// is deterministic and preserves caller order.
///
/// Returns `Err` with the indices stuck in a cycle when no valid order
/// exists. Self-references and out-of-range indices are ignored.
pub fn topological_order<F>(count: usize, mut dependencies: F) -> Result<Vec<usize>, Vec<usize>>
where
    F: FnMut(usize) -> Vec<usize>,
{
    let mut deps: Vec<BTreeSet<usize>> = Vec::with_capacity(count);
    for i in 0..count {
        let set: BTreeSet<usize> = dependencies(i)
            .into_iter()
            .filter(|&d| d != i && d < count)
            .collect();
        deps.push(set);
    }

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut indegree: Vec<usize> = vec![0; count];
    for (i, set) in deps.iter().enumerate() {
        indegree[i] = set.len();
        for &d in set {
            dependents[d].push(i);
        }
    }

    let mut ready: BTreeSet<usize> = (0..count).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(count);

    while let Some(&next) = ready.iter().next() {
        ready.remove(&next);
        order.push(next);
        for &dependent in &dependents[next] {
            indegree[dependent] -= 1;
            if indegree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() == count {
        Ok(order)
    } else {
        let placed: BTreeSet<usize> = order.into_iter().collect();
        Err((0..count).filter(|i| !placed.contains(i)).collect())
    }
}
