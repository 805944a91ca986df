//! Reference graph among formula-valued parameters.

use std::collections::HashSet;

use crate::engine::Evaluator;
use crate::refs;

/// Every reference cycle among formula-valued parameters.
///
/// Each cycle is listed once, as parameter names starting from the
/// earliest parameter in input order and repeating it at the end
/// (`["A", "B", "A"]`). Token matching follows the evaluator's mode.
pub fn find_cycles(evaluator: &Evaluator<'_>) -> Vec<Vec<String>> {
    let params = evaluator.parameters();
    let edges: Vec<Vec<usize>> = params
        .iter()
        .map(|p| {
            if !p.is_formula() {
                return Vec::new();
            }
            let formula = p.formula.as_deref().unwrap_or("");
            refs::references(formula)
                .iter()
                .filter_map(|t| evaluator.lookup_index(t))
                .filter(|&j| params[j].is_formula())
                .collect()
        })
        .collect();

    let mut state = vec![Mark::Unvisited; params.len()];
    let mut seen = HashSet::new();
    let mut cycles = Vec::new();
    for start in 0..params.len() {
        if state[start] == Mark::Unvisited {
            visit(start, &edges, &mut state, &mut seen, &mut cycles);
        }
    }

    cycles
        .into_iter()
        .map(|cycle: Vec<usize>| {
            let mut names: Vec<String> = cycle.iter().map(|&i| params[i].name.clone()).collect();
            names.push(params[cycle[0]].name.clone());
            names
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Depth-first walk from `root` with an explicit stack of
/// `(node, next edge)` frames, so long chains cannot overflow the call stack.
fn visit(
    root: usize,
    edges: &[Vec<usize>],
    state: &mut [Mark],
    seen: &mut HashSet<Vec<usize>>,
    cycles: &mut Vec<Vec<usize>>,
) {
    let mut path = vec![root];
    let mut frames = vec![(root, 0usize)];
    state[root] = Mark::OnPath;

    while let Some(frame) = frames.last_mut() {
        let (node, edge) = *frame;
        let Some(&next) = edges[node].get(edge) else {
            frames.pop();
            path.pop();
            state[node] = Mark::Done;
            continue;
        };
        frame.1 += 1;

        match state[next] {
            Mark::Unvisited => {
                state[next] = Mark::OnPath;
                path.push(next);
                frames.push((next, 0));
            }
            Mark::OnPath => {
                if let Some(pos) = path.iter().position(|&i| i == next) {
                    let cycle = rotate_to_min(&path[pos..]);
                    if seen.insert(cycle.clone()) {
                        cycles.push(cycle);
                    }
                }
            }
            Mark::Done => {}
        }
    }
}

/// Rotate a cycle so its smallest index comes first.
fn rotate_to_min(cycle: &[usize]) -> Vec<usize> {
    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by_key(|&(_, &v)| v)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[min_pos..]
        .iter()
        .chain(&cycle[..min_pos])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenMatch;
    use pretty_assertions::assert_eq;
    use takeoff_core::model::{Parameter, ParameterBuilder};

    fn formula(name: &str, f: &str) -> Parameter {
        ParameterBuilder::new(name).formula(f).build()
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let params = vec![
            ParameterBuilder::new("A").value(1.0).build(),
            formula("B", "{A} * 2"),
            formula("C", "{B} + {A}"),
        ];
        assert!(find_cycles(&Evaluator::new(&params)).is_empty());
    }

    #[test]
    fn two_cycle_listed_once() {
        let params = vec![formula("A", "{B}"), formula("B", "{A}")];
        assert_eq!(
            find_cycles(&Evaluator::new(&params)),
            vec![vec!["A".to_string(), "B".to_string(), "A".to_string()]]
        );
    }

    #[test]
    fn self_loop_and_longer_cycle() {
        let params = vec![
            formula("Self", "{Self} + 1"),
            formula("X", "{Y}"),
            formula("Y", "{Z}"),
            formula("Z", "{X} * 2"),
        ];
        let cycles = find_cycles(&Evaluator::new(&params));
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0], vec!["Self", "Self"]);
        assert_eq!(cycles[1], vec!["X", "Y", "Z", "X"]);
    }

    #[test]
    fn cycle_entered_midway_is_rotated() {
        let params = vec![
            formula("Entry", "{B}"),
            formula("A", "{B}"),
            formula("B", "{A}"),
        ];
        assert_eq!(find_cycles(&Evaluator::new(&params)), vec![vec!["A", "B", "A"]]);
    }

    #[test]
    fn follows_token_match_mode() {
        let params = vec![
            ParameterBuilder::new("A").id("a").formula("{b}").build(),
            ParameterBuilder::new("B").id("b").formula("{a}").build(),
        ];
        assert_eq!(find_cycles(&Evaluator::new(&params)).len(), 1);
        let by_id = Evaluator::new(&params).with_token_match(TokenMatch::Id);
        assert_eq!(find_cycles(&by_id).len(), 1);

        let named = vec![
            ParameterBuilder::new("A").id("a").formula("{B}").build(),
            ParameterBuilder::new("B").id("b").formula("{A}").build(),
        ];
        let by_id = Evaluator::new(&named).with_token_match(TokenMatch::Id);
        assert!(find_cycles(&by_id).is_empty());
    }

    #[test]
    fn long_chain_does_not_overflow() {
        let mut params = vec![ParameterBuilder::new("P0").value(1.0).build()];
        for i in 1..=50_000 {
            params.push(formula(&format!("P{}", i), &format!("{{P{}}} + 1", i - 1)));
        }
        // Walking from P0 upward makes every parameter a fresh root; reversing
        // puts the deepest parameter first so the walk descends the whole chain.
        params.reverse();
        assert!(find_cycles(&Evaluator::new(&params)).is_empty());

        params.push(formula("P0", "{P50000}"));
        params.remove(params.len() - 2);
        let cycles = find_cycles(&Evaluator::new(&params));
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 50_002);
    }
}
