use crate::types::OrgLevel;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The `hierarchy.json` setup object consumed by XDMoD.
///
/// XDMoD understands at most three hierarchy tiers, so the bottom-most
/// three exportable levels are emitted, assigned bottom-up: the least
/// encompassing exportable level is always the bottom tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct XdmodHierarchySetup {
    pub top_level_label: Option<String>,
    pub top_level_info: Option<String>,
    pub middle_level_label: Option<String>,
    pub middle_level_info: Option<String>,
    pub bottom_level_label: Option<String>,
    pub bottom_level_info: Option<String>,
}

/// One row of the XDMoD names CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct XdmodNameRow {
    pub fullcode: String,
    pub longname: String,
    pub parent_fullcode: Option<String>,
}

/// Build the setup object from the chain in root→leaf order.
pub fn xdmod_hierarchy_setup(levels: &[OrgLevel]) -> XdmodHierarchySetup {
    let exported: Vec<&OrgLevel> = levels.iter().filter(|level| level.export_to_xdmod).collect();
    let tail = if exported.len() > 3 {
        &exported[exported.len() - 3..]
    } else {
        &exported[..]
    };

    let mut setup = XdmodHierarchySetup::default();
    let mut slots = [
        (
            &mut setup.bottom_level_label,
            &mut setup.bottom_level_info,
        ),
        (
            &mut setup.middle_level_label,
            &mut setup.middle_level_info,
        ),
        (&mut setup.top_level_label, &mut setup.top_level_info),
    ]
    .into_iter();
    for level in tail.iter().rev() {
        let Some((label, info)) = slots.next() else {
            break;
        };
        *label = Some(level.name.clone());
        *info = Some(level.name.clone());
    }
    drop(slots);
    setup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LevelId;
    use chrono::Utc;

    fn level(name: &str, value: i64, parent: Option<&OrgLevel>, export: bool) -> OrgLevel {
        let now = Utc::now();
        OrgLevel {
            id: LevelId::generate(),
            name: name.to_string(),
            level: value,
            parent_id: parent.map(|p| p.id.clone()),
            export_to_xdmod: export,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn three_exported_levels_fill_all_slots() {
        let university = level("University", 40, None, true);
        let college = level("College", 30, Some(&university), true);
        let department = level("Department", 20, Some(&college), true);
        let setup = xdmod_hierarchy_setup(&[university, college, department]);
        assert_eq!(setup.top_level_label.as_deref(), Some("University"));
        assert_eq!(setup.middle_level_label.as_deref(), Some("College"));
        assert_eq!(setup.bottom_level_label.as_deref(), Some("Department"));
    }

    #[test]
    fn single_exported_level_lands_in_bottom_slot() {
        let university = level("University", 40, None, false);
        let college = level("College", 30, Some(&university), true);
        let department = level("Department", 20, Some(&college), false);
        let setup = xdmod_hierarchy_setup(&[university, college, department]);
        assert_eq!(setup.bottom_level_label.as_deref(), Some("College"));
        assert!(setup.middle_level_label.is_none());
        assert!(setup.top_level_label.is_none());
    }

    #[test]
    fn more_than_three_keeps_the_bottom_most() {
        let country = level("Country", 50, None, true);
        let university = level("University", 40, Some(&country), true);
        let college = level("College", 30, Some(&university), true);
        let department = level("Department", 20, Some(&college), true);
        let setup = xdmod_hierarchy_setup(&[country, university, college, department]);
        assert_eq!(setup.top_level_label.as_deref(), Some("University"));
        assert_eq!(setup.bottom_level_label.as_deref(), Some("Department"));
    }
}
