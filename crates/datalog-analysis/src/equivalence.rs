//! Bijective equivalence of normalised clauses.
//!
//! Two normalised clauses are bijectively equivalent when some permutation
//! of their elements, restricted to name-compatible positions, admits a
//! consistent variable renaming. The search enumerates permutations
//! depth-first with an explicit stack; the name filter prunes aggressively
//! in practice.

use crate::NormalisedClause;
use std::collections::BTreeMap;

/// Decide bijective equivalence of two normalised clauses.
pub fn are_bijectively_equivalent(left: &NormalisedClause, right: &NormalisedClause) -> bool {
    // rules must be fully normalised
    if !left.is_fully_normalised() || !right.is_fully_normalised() {
        return false;
    }

    let left_elements = left.elements();
    let right_elements = right.elements();

    // rules must be the same length to be equal
    if left_elements.len() != right_elements.len() {
        return false;
    }

    // head atoms must have the same concrete and lattice arity (names do
    // not matter)
    if left_elements[0].concrete_params.len() != right_elements[0].concrete_params.len() {
        return false;
    }
    if left_elements[0].lattice_params.len() != right_elements[0].lattice_params.len() {
        return false;
    }

    // rules must have the same number of distinct variables
    if left.variables().len() != right.variables().len() {
        return false;
    }

    // rules must have the exact same set of constants
    if left.constants() != right.constants() {
        return false;
    }

    // the n x n permutation candidate matrix: position i of the left clause
    // may map to position j of the right clause iff the element names match
    let size = left_elements.len();
    let mut matrix = vec![vec![false; size]; size];
    for i in 0..size {
        for j in 0..size {
            if left_elements[i].name == right_elements[j].name {
                matrix[i][j] = true;
            }
        }
    }

    exists_valid_permutation(left, right, &matrix)
}

/// Search for a permutation allowed by the candidate matrix whose induced
/// variable map is consistent.
fn exists_valid_permutation(
    left: &NormalisedClause,
    right: &NormalisedClause,
    matrix: &[Vec<bool>],
) -> bool {
    let clause_size = matrix.len();

    // the possible end-positions of each element of the left clause, in
    // ascending column order
    let valid_moves: Vec<Vec<usize>> = matrix
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter_map(|(j, &ok)| ok.then_some(j))
                .collect()
        })
        .collect();

    let mut seen = vec![false; clause_size];
    let mut current_permutation: Vec<usize> = Vec::new();
    let mut todo_stack: Vec<Vec<usize>> = vec![valid_moves[0].clone()];
    let mut current_idx = 0;

    while !todo_stack.is_empty() {
        if current_idx == clause_size {
            // permutation complete: check the variable mapping
            if is_valid_permutation(left, right, &current_permutation) {
                return true;
            }

            // not valid, undo the last choice and keep searching
            current_idx -= 1;
            seen[current_permutation[current_idx]] = false;
            current_permutation.pop();
            continue;
        }

        let mut possibilities = todo_stack.pop().expect("loop condition guarantees a frame");
        if possibilities.is_empty() {
            // no more candidates at this position, backtrack
            if current_idx == 0 {
                break;
            }
            current_idx -= 1;
            seen[current_permutation[current_idx]] = false;
            current_permutation.pop();
            continue;
        }

        // try the next candidate column
        let next = possibilities.remove(0);
        todo_stack.push(possibilities);

        if seen[next] {
            continue;
        }
        seen[next] = true;
        current_permutation.push(next);
        current_idx += 1;

        if current_idx < clause_size {
            todo_stack.push(valid_moves[current_idx].clone());
        }
    }

    false
}

/// Scan the paired parameters under the permutation, building the variable
/// map left-to-right: constants are fixed to themselves, each variable may
/// acquire exactly one image.
fn is_valid_permutation(
    left: &NormalisedClause,
    right: &NormalisedClause,
    permutation: &[usize],
) -> bool {
    let left_elements = left.elements();
    let right_elements = right.elements();
    assert_eq!(
        left_elements.len(),
        right_elements.len(),
        "clauses should have equal size"
    );

    let mut variable_map: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    for cst in left.constants() {
        variable_map.insert(cst, Some(cst));
    }
    for var in left.variables() {
        variable_map.insert(var, None);
    }

    for (i, &pi) in permutation.iter().enumerate() {
        let pairs = [
            (
                &left_elements[i].concrete_params,
                &right_elements[pi].concrete_params,
            ),
            (
                &left_elements[i].lattice_params,
                &right_elements[pi].lattice_params,
            ),
        ];
        for (left_params, right_params) in pairs {
            if left_params.len() != right_params.len() {
                return false;
            }
            for (left_param, right_param) in left_params.iter().zip(right_params.iter()) {
                let slot = variable_map.entry(left_param).or_insert(None);
                match slot {
                    None => *slot = Some(right_param),
                    Some(mapped) if *mapped != right_param.as_str() => {
                        // inconsistent mapping, clauses cannot be
                        // equivalent under this permutation
                        return false;
                    }
                    _ => {}
                }
            }
        }
    }

    true
}
