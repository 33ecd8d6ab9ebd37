use crate::error::{LevelError, OrgError};
use crate::types::OrgLevel;
use std::collections::{HashMap, HashSet};

/// Check that a set of levels forms a single strictly-decreasing chain.
///
/// Exactly one root, every other level pointing at an existing parent
/// with a strictly higher `level` value, no level parenting more than
/// one child, no duplicate names or level values.
pub fn validate_level_chain(levels: &[OrgLevel]) -> Result<(), LevelError> {
    if levels.is_empty() {
        return Ok(());
    }

    let mut names: HashSet<&str> = HashSet::new();
    let mut values: HashSet<i64> = HashSet::new();
    for level in levels {
        if !names.insert(level.name.as_str()) {
            return Err(LevelError::BrokenChain {
                message: format!("duplicate level name {}", level.name),
            });
        }
        if !values.insert(level.level) {
            return Err(LevelError::BrokenChain {
                message: format!("duplicate level value {}", level.level),
            });
        }
    }

    let by_id: HashMap<&str, &OrgLevel> = levels
        .iter()
        .map(|level| (level.id.as_str(), level))
        .collect();

    let roots: Vec<&OrgLevel> = levels.iter().filter(|level| level.is_root()).collect();
    if roots.len() != 1 {
        return Err(LevelError::BrokenChain {
            message: format!("expected exactly one root level, found {}", roots.len()),
        });
    }

    let mut child_count: HashMap<&str, u32> = HashMap::new();
    for level in levels {
        let Some(parent_id) = &level.parent_id else {
            continue;
        };
        let Some(parent) = by_id.get(parent_id.as_str()) else {
            return Err(LevelError::BrokenChain {
                message: format!("level {} has missing parent {parent_id}", level.name),
            });
        };
        if parent.level <= level.level {
            return Err(LevelError::BrokenChain {
                message: format!(
                    "level {} ({}) has parent {} with lower or equal value ({})",
                    level.name, level.level, parent.name, parent.level
                ),
            });
        }
        let count = child_count.entry(parent_id.as_str()).or_insert(0);
        *count += 1;
        if *count > 1 {
            return Err(LevelError::BrokenChain {
                message: format!("level {} has more than one child", parent.name),
            });
        }
    }

    // Single root + every non-root has a valid parent + no branching
    // already implies one connected chain of len(levels) nodes.
    Ok(())
}

/// Check that a new tier value sits strictly between its neighbors.
pub fn validate_level_slot(
    value: i64,
    parent: Option<&OrgLevel>,
    child: Option<&OrgLevel>,
) -> Result<(), LevelError> {
    if let Some(parent) = parent {
        if parent.level <= value {
            return Err(LevelError::InvalidInput {
                message: format!(
                    "level value {value} must be below parent {} ({})",
                    parent.name, parent.level
                ),
            });
        }
    }
    if let Some(child) = child {
        if child.level >= value {
            return Err(LevelError::InvalidInput {
                message: format!(
                    "level value {value} must be above child {} ({})",
                    child.name, child.level
                ),
            });
        }
    }
    Ok(())
}

/// Codes are joined with `-` to build fullcodes, so they may not
/// contain one themselves.
pub fn validate_org_code(code: &str) -> Result<(), OrgError> {
    if code.trim().is_empty() {
        return Err(OrgError::InvalidInput {
            message: "code must not be empty".to_string(),
        });
    }
    if code.contains('-') {
        return Err(OrgError::InvalidInput {
            message: format!("code {code} may not contain a hyphen"),
        });
    }
    Ok(())
}

/// Check that an organization's tier matches its parent's tier.
///
/// A parentless organization must sit at the root tier; otherwise the
/// parent organization's tier must be the tier directly above ours.
pub fn validate_org_placement(
    org_level: &OrgLevel,
    parent_org_level: Option<&OrgLevel>,
) -> Result<(), OrgError> {
    match (&org_level.parent_id, parent_org_level) {
        (None, None) => Ok(()),
        (None, Some(parent_level)) => Err(OrgError::InvalidPlacement {
            message: format!(
                "level {} is the root tier, but a parent at tier {} was given",
                org_level.name, parent_level.name
            ),
        }),
        (Some(_), None) => Err(OrgError::InvalidPlacement {
            message: format!(
                "level {} is not the root tier, but no parent was given",
                org_level.name
            ),
        }),
        (Some(expected), Some(parent_level)) => {
            if parent_level.id == *expected {
                Ok(())
            } else {
                Err(OrgError::InvalidPlacement {
                    message: format!(
                        "parent is at tier {}, expected the tier above {} ({})",
                        parent_level.name, org_level.name, expected
                    ),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LevelId;
    use chrono::Utc;

    fn level(name: &str, value: i64, parent: Option<&OrgLevel>) -> OrgLevel {
        let now = Utc::now();
        OrgLevel {
            id: LevelId::generate(),
            name: name.to_string(),
            level: value,
            parent_id: parent.map(|p| p.id.clone()),
            export_to_xdmod: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn chain() -> Vec<OrgLevel> {
        let university = level("University", 40, None);
        let college = level("College", 30, Some(&university));
        let department = level("Department", 20, Some(&college));
        vec![university, college, department]
    }

    #[test]
    fn valid_chain_passes() {
        assert!(validate_level_chain(&chain()).is_ok());
    }

    #[test]
    fn empty_chain_passes() {
        assert!(validate_level_chain(&[]).is_ok());
    }

    #[test]
    fn two_roots_fail() {
        let mut levels = chain();
        levels.push(level("Country", 50, None));
        let err = validate_level_chain(&levels).unwrap_err();
        assert!(matches!(err, LevelError::BrokenChain { .. }));
    }

    #[test]
    fn branching_parent_fails() {
        let mut levels = chain();
        let college = levels[1].clone();
        levels.push(level("Center", 25, Some(&college)));
        let err = validate_level_chain(&levels).unwrap_err();
        assert!(matches!(err, LevelError::BrokenChain { .. }));
    }

    #[test]
    fn parent_with_lower_value_fails() {
        let root = level("University", 40, None);
        let bad = level("College", 45, Some(&root));
        let err = validate_level_chain(&[root, bad]).unwrap_err();
        assert!(matches!(err, LevelError::BrokenChain { .. }));
    }

    #[test]
    fn slot_must_sit_between_neighbors() {
        let levels = chain();
        assert!(validate_level_slot(25, Some(&levels[1]), Some(&levels[2])).is_ok());
        assert!(validate_level_slot(30, Some(&levels[1]), Some(&levels[2])).is_err());
        assert!(validate_level_slot(20, Some(&levels[1]), Some(&levels[2])).is_err());
        assert!(validate_level_slot(50, None, Some(&levels[0])).is_ok());
        assert!(validate_level_slot(10, Some(&levels[2]), None).is_ok());
    }

    #[test]
    fn hyphenated_code_is_rejected() {
        assert!(validate_org_code("engr").is_ok());
        assert!(validate_org_code("eng-r").is_err());
        assert!(validate_org_code("  ").is_err());
    }

    #[test]
    fn org_placement_follows_level_chain() {
        let levels = chain();
        assert!(validate_org_placement(&levels[0], None).is_ok());
        assert!(validate_org_placement(&levels[1], Some(&levels[0])).is_ok());
        assert!(validate_org_placement(&levels[1], None).is_err());
        assert!(validate_org_placement(&levels[2], Some(&levels[0])).is_err());
        assert!(validate_org_placement(&levels[0], Some(&levels[1])).is_err());
    }
}
