//! Node-list expressions reduced to node counts.

/// Count the nodes named by a SLURM node-list expression.
///
/// `nodeA,nodeB` counts explicit tokens; `node[3-7]` counts the inclusive
/// span; bracket groups may contain comma-separated items and ranges
/// (`node[1-3,9]`). Only the count matters here, never the identities.
pub fn parse_node_range_count(s: &str) -> u64 {
    let s = s.trim();
    if s.is_empty() {
        return 0;
    }

    split_top_level(s)
        .into_iter()
        .map(count_group)
        .sum()
}

/// Split on commas that sit outside any bracket group.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                groups.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&s[start..]);
    groups
}

fn count_group(group: &str) -> u64 {
    let group = group.trim();
    if group.is_empty() {
        return 0;
    }

    let Some(open) = group.find('[') else {
        return 1;
    };
    let Some(close) = group.rfind(']') else {
        return 1;
    };

    group[open + 1..close].split(',').map(count_item).sum()
}

fn count_item(item: &str) -> u64 {
    match item.split_once('-') {
        Some((a, b)) => {
            match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
                (Ok(start), Ok(end)) if end >= start => end - start + 1,
                _ => 1,
            }
        }
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_tokens() {
        assert_eq!(parse_node_range_count("a,b,c"), 3);
        assert_eq!(parse_node_range_count("node01"), 1);
    }

    #[test]
    fn test_ranges() {
        assert_eq!(parse_node_range_count("node[1-10]"), 10);
        assert_eq!(parse_node_range_count("a,node[1-3]"), 4);
    }

    #[test]
    fn test_bracket_lists() {
        assert_eq!(parse_node_range_count("node[1-3,9]"), 4);
        assert_eq!(parse_node_range_count("n[1,2],m[5-6]"), 4);
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse_node_range_count(""), 0);
    }
}
