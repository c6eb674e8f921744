use std::collections::VecDeque;

/// Longest-path layering over node indices `0..node_count`.
///
/// Nodes with no incoming edges start at layer 0 and every other node lands one
/// below its deepest predecessor. When the queue drains while nodes remain, the
/// graph has a cycle: the earliest unprocessed node (in input order) is seeded
/// and its unprocessed incoming edges are treated as back edges. Self-loops are
/// ignored.
pub(super) fn assign_layers(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indeg = vec![0usize; node_count];
    for &(from, to) in edges {
        if from == to || from >= node_count || to >= node_count {
            continue;
        }
        successors[from].push(to);
        indeg[to] += 1;
    }

    let mut layer = vec![0usize; node_count];
    let mut processed = vec![false; node_count];
    let mut queued = vec![false; node_count];
    let mut ready: VecDeque<usize> = VecDeque::new();
    for idx in 0..node_count {
        if indeg[idx] == 0 {
            ready.push_back(idx);
            queued[idx] = true;
        }
    }

    let mut done = 0usize;
    loop {
        while let Some(node) = ready.pop_front() {
            processed[node] = true;
            done += 1;
            for &next in &successors[node] {
                if processed[next] {
                    continue;
                }
                layer[next] = layer[next].max(layer[node] + 1);
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 && !queued[next] {
                    ready.push_back(next);
                    queued[next] = true;
                }
            }
        }

        if done >= node_count {
            break;
        }

        // Cycle: seed the earliest remaining node.
        let Some(seed) = (0..node_count).find(|&idx| !queued[idx]) else {
            break;
        };
        ready.push_back(seed);
        queued[seed] = true;
    }

    layer
}

/// Barycenter crossing reduction.
///
/// `rows[i]` lists the slots of layer `i` in their current order and `segments`
/// are the edges between adjacent layers as `(upper, lower)` slot pairs. Each
/// pass sweeps down, ordering a layer by the mean position of its neighbours in
/// the layer above, then sweeps up using the layer below. Slots without a
/// neighbour in the reference layer score `+inf` and keep their relative order
/// at the end of the row.
pub(super) fn order_layers(
    rows: &mut [Vec<usize>],
    slot_count: usize,
    segments: &[(usize, usize)],
    passes: usize,
) {
    if rows.len() <= 1 {
        return;
    }
    let mut upper: Vec<Vec<usize>> = vec![Vec::new(); slot_count];
    let mut lower: Vec<Vec<usize>> = vec![Vec::new(); slot_count];
    for &(up, down) in segments {
        if up < slot_count && down < slot_count {
            lower[up].push(down);
            upper[down].push(up);
        }
    }

    let mut position = vec![0usize; slot_count];
    let update_positions = |rows: &[Vec<usize>], position: &mut [usize]| {
        for row in rows {
            for (idx, &slot) in row.iter().enumerate() {
                position[slot] = idx;
            }
        }
    };
    update_positions(rows, &mut position);

    let passes = passes.max(1);
    for _ in 0..passes {
        for layer in 1..rows.len() {
            sort_row(&mut rows[layer], &upper, &position);
            update_positions(&rows[layer..=layer], &mut position);
        }
        for layer in (0..rows.len() - 1).rev() {
            sort_row(&mut rows[layer], &lower, &position);
            update_positions(&rows[layer..=layer], &mut position);
        }
    }
}

fn sort_row(row: &mut [usize], neighbors: &[Vec<usize>], position: &[usize]) {
    if row.len() <= 1 {
        return;
    }
    let mut scored: Vec<(f32, usize)> = row
        .iter()
        .map(|&slot| (barycenter(&neighbors[slot], position), slot))
        .collect();
    // `sort_by` is stable, so equal scores keep the previous order.
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    for (target, (_, slot)) in row.iter_mut().zip(scored) {
        *target = slot;
    }
}

pub(super) fn barycenter(neighbors: &[usize], position: &[usize]) -> f32 {
    if neighbors.is_empty() {
        return f32::INFINITY;
    }
    let sum: usize = neighbors.iter().map(|&n| position[n]).sum();
    sum as f32 / neighbors.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_with_skip_edge_uses_longest_path() {
        // a=0, b=1, d=2
        let layers = assign_layers(3, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(layers, vec![0, 1, 2]);
    }

    #[test]
    fn cycle_is_seeded_from_earliest_node() {
        let layers = assign_layers(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(layers, vec![0, 1, 2]);
    }

    #[test]
    fn cycle_below_a_source_keeps_depth() {
        // 0 -> 1 -> 2 -> 1
        let layers = assign_layers(3, &[(0, 1), (1, 2), (2, 1)]);
        assert_eq!(layers[0], 0);
        assert_eq!(layers[1], 1);
        assert_eq!(layers[2], 2);
    }

    #[test]
    fn self_loops_and_isolated_nodes_sit_on_top() {
        let layers = assign_layers(3, &[(1, 1)]);
        assert_eq!(layers, vec![0, 0, 0]);
    }

    #[test]
    fn barycenter_uncrosses_a_swapped_pair() {
        // top: 0 1, bottom: 2 3 with 0->3 and 1->2
        let mut rows = vec![vec![0, 1], vec![2, 3]];
        order_layers(&mut rows, 4, &[(0, 3), (1, 2)], 4);
        assert_eq!(rows[0].iter().position(|&s| s == 0), rows[1].iter().position(|&s| s == 3));
        assert_eq!(rows[0].iter().position(|&s| s == 1), rows[1].iter().position(|&s| s == 2));
    }

    #[test]
    fn unconnected_slots_sort_last_stably() {
        let mut rows = vec![vec![0], vec![1, 2, 3]];
        order_layers(&mut rows, 4, &[(0, 3)], 1);
        assert_eq!(rows[1], vec![3, 1, 2]);
    }

    #[test]
    fn barycenter_of_nothing_is_infinite() {
        assert!(barycenter(&[], &[0, 1]).is_infinite());
        assert_eq!(barycenter(&[0, 1], &[0, 3]), 1.5);
    }
}
