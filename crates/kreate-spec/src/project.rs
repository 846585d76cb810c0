use kreate_core::SimplifiedSpec;

use crate::error::SpecError;

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Copy of `spec` where every subtree is cut `max_depth` levels below its root.
#[must_use]
pub fn limit_depth(spec: &SimplifiedSpec, max_depth: usize) -> SimplifiedSpec {
    let children = match max_depth {
        0 => Vec::new(),
        depth => spec
            .children
            .iter()
            .map(|child| limit_depth(child, depth - 1))
            .collect(),
    };
    SimplifiedSpec {
        name: spec.name.clone(),
        type_name: spec.type_name.clone(),
        is_array: spec.is_array,
        description: spec.description.clone(),
        type_description: spec.type_description.clone(),
        children,
    }
}

/// Walk `path` down `tree` and return the node found there, depth-limited.
///
/// Numeric segments address sequence entries and are skipped, since a
/// simplified tree describes all elements of an array with one node.
///
/// # Errors
///
/// Returns [`SpecError::PathNotFound`] when a segment matches no child.
pub fn project<S: AsRef<str>>(
    tree: &SimplifiedSpec,
    path: &[S],
    max_depth: usize,
) -> Result<SimplifiedSpec, SpecError> {
    let mut current = tree;
    for segment in path.iter().map(AsRef::as_ref) {
        if is_index(segment) {
            continue;
        }
        current = current
            .child(segment)
            .ok_or_else(|| SpecError::PathNotFound {
                path: path.iter().map(|s| s.as_ref().to_string()).collect(),
            })?;
    }
    Ok(limit_depth(current, max_depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, children: Vec<SimplifiedSpec>) -> SimplifiedSpec {
        SimplifiedSpec {
            name: name.to_string(),
            children,
            ..SimplifiedSpec::default()
        }
    }

    fn tree() -> SimplifiedSpec {
        node(
            "",
            vec![node(
                "spec",
                vec![node(
                    "containers",
                    vec![node("ports", vec![node("containerPort", vec![])])],
                )],
            )],
        )
    }

    #[test]
    fn numeric_segments_are_skipped() {
        let found = project(&tree(), &["spec", "containers", "0", "ports"], 5).expect("project");
        assert_eq!(found.name, "ports");
        assert_eq!(found.child_names(), vec!["containerPort"]);
    }

    #[test]
    fn depth_is_limited_in_every_subtree() {
        let root = project::<&str>(&tree(), &[], 2).expect("project");
        let containers = &root.children[0].children[0];
        assert_eq!(containers.name, "containers");
        assert!(containers.is_leaf());

        assert!(project::<&str>(&tree(), &[], 0).expect("project").is_leaf());
    }

    #[test]
    fn shallower_projection_is_a_truncation_of_a_deeper_one() {
        for depth in 0..4 {
            let shallow = project(&tree(), &["spec"], depth).expect("shallow");
            let deep = project(&tree(), &["spec"], depth + 1).expect("deep");
            assert_eq!(limit_depth(&deep, depth), shallow);
        }
    }

    #[test]
    fn unknown_segment_names_the_requested_path() {
        let err = project(&tree(), &["spec", "nope"], 2).expect_err("missing");
        assert_eq!(err.to_string(), "pathInSpec spec,nope not found in spec");
        assert!(err.is_path_not_found());
    }
}
