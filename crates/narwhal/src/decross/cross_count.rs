use crate::sugi::SugiGraph;

/// Total number of edge crossings between all adjacent layer pairs.
pub fn crossings(g: &SugiGraph) -> usize {
    let layers = g.layers();
    (1..layers.len())
        .map(|i| two_layer_crossings(g, &layers[i - 1], &layers[i]))
        .sum()
}

/// Crossings between `north` and the layer directly below it, `south`.
///
/// Each edge is inserted into an accumulator tree over south positions in north order; the
/// crossings it adds are the already-inserted edges that end further right.
pub fn two_layer_crossings(g: &SugiGraph, north: &[usize], south: &[usize]) -> usize {
    if south.is_empty() || north.is_empty() {
        return 0;
    }

    let mut south_pos: Vec<Option<usize>> = vec![None; g.len()];
    for (i, &v) in south.iter().enumerate() {
        south_pos[v] = Some(i);
    }

    let mut entries: Vec<usize> = Vec::new();
    for &v in north {
        let mut ends: Vec<usize> = g
            .children(v)
            .iter()
            .filter_map(|&w| south_pos[w])
            .collect();
        ends.sort_unstable();
        entries.extend(ends);
    }

    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<usize> = vec![0; tree_size];

    let mut cc: usize = 0;
    for pos in entries {
        let mut index = pos + first_index;
        tree[index] += 1;
        let mut weight_sum: usize = 0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        cc += weight_sum;
    }
    cc
}
