use crate::schema;
use crate::store::DbStore;
use om_core::error::{LevelError, OrgError, OrgmapError};
use om_core::levels::LevelRepository;
use om_core::orgs::OrgRepository;
use om_core::store::Store;
use om_core::types::{
    CreateLevelInput, CreateOrgInput, CreateProjectInput, CreateUserInput, DeleteOrgOpts,
    NewLevel, Org, OrgFilter, OrgId, ProjectOrgQuery, ProjectStatus, SyncOpts,
};
use om_core::orgmap::{Orgmap, RequestContext};
use om_events::bus::EventBus;
use om_events::types::EventSource;

fn setup() -> Orgmap<DbStore> {
    let conn = schema::with_test_db().unwrap();
    Orgmap::new(DbStore::new(conn), EventBus::new(64))
}

fn ctx() -> RequestContext {
    RequestContext::new(EventSource::Cli, None)
}

fn seeded() -> Orgmap<DbStore> {
    let orgmap = setup();
    orgmap.seed_defaults(&ctx()).unwrap();
    orgmap
}

fn level_input(name: &str, value: i64, parent: Option<&str>) -> CreateLevelInput {
    CreateLevelInput {
        name: name.to_string(),
        level: value,
        parent_name: parent.map(str::to_string),
        export_to_xdmod: true,
    }
}

fn org_input(code: &str, level_name: &str, parent: Option<&Org>, orgmap: &Orgmap<DbStore>) -> CreateOrgInput {
    let level = orgmap.levels().get(level_name).unwrap();
    CreateOrgInput {
        parent_id: parent.map(|org| org.id.clone()),
        level_id: level.id,
        code: code.to_string(),
        shortname: Some(format!("{code}-short")),
        longname: Some(format!("{code}-long")),
        is_selectable_for_user: None,
        is_selectable_for_project: None,
    }
}

fn chain_summary(orgmap: &Orgmap<DbStore>) -> Vec<(String, i64, Option<String>)> {
    let levels = orgmap.levels().list().unwrap();
    levels
        .iter()
        .map(|level| {
            let parent = level.parent_id.as_ref().map(|parent_id| {
                levels
                    .iter()
                    .find(|candidate| candidate.id == *parent_id)
                    .unwrap()
                    .name
                    .clone()
            });
            (level.name.clone(), level.level, parent)
        })
        .collect()
}

#[test]
fn test_seeded_hierarchy_list() {
    let orgmap = seeded();
    assert_eq!(
        chain_summary(&orgmap),
        vec![
            ("University".to_string(), 40, None),
            ("College".to_string(), 30, Some("University".to_string())),
            ("Department".to_string(), 20, Some("College".to_string())),
        ]
    );
}

#[test]
fn test_seed_is_idempotent() {
    let orgmap = seeded();
    orgmap.seed_defaults(&ctx()).unwrap();
    assert_eq!(orgmap.levels().list().unwrap().len(), 3);
    assert_eq!(
        orgmap
            .orgs()
            .list(&OrgFilter::default())
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_validate_succeeds_on_seeded_hierarchy() {
    let orgmap = seeded();
    orgmap.levels().validate().unwrap();
}

#[test]
fn test_create_and_remove_leaf_tier() {
    let orgmap = seeded();
    orgmap
        .levels()
        .create(&ctx(), level_input("ResearchGroup", 10, Some("Department")))
        .unwrap();
    let summary = chain_summary(&orgmap);
    assert_eq!(summary.len(), 4);
    assert_eq!(
        summary[3],
        (
            "ResearchGroup".to_string(),
            10,
            Some("Department".to_string())
        )
    );

    orgmap.levels().remove(&ctx(), "ResearchGroup").unwrap();
    assert_eq!(chain_summary(&orgmap).len(), 3);
    orgmap.levels().validate().unwrap();
}

#[test]
fn test_cannot_create_second_root_tier() {
    let orgmap = seeded();
    let err = orgmap
        .levels()
        .create(&ctx(), level_input("Country", 50, None))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Level(LevelError::BrokenChain { .. })
    ));
}

#[test]
fn test_cannot_create_middle_tier_without_insert() {
    let orgmap = seeded();
    let err = orgmap
        .levels()
        .create(&ctx(), level_input("Center", 25, Some("College")))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Level(LevelError::BrokenChain { .. })
    ));
}

#[test]
fn test_cannot_create_leaf_above_its_parent() {
    let orgmap = seeded();
    orgmap
        .levels()
        .create(&ctx(), level_input("ResearchGroup", 10, Some("Department")))
        .unwrap();
    let err = orgmap
        .levels()
        .create(&ctx(), level_input("Lab", 15, Some("ResearchGroup")))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Level(LevelError::InvalidInput { .. })
    ));
}

#[test]
fn test_duplicate_level_name_and_value_conflict() {
    let orgmap = seeded();
    let err = orgmap
        .levels()
        .create(&ctx(), level_input("College", 10, Some("Department")))
        .unwrap_err();
    assert!(matches!(err, OrgmapError::Level(LevelError::NameConflict)));

    let err = orgmap
        .levels()
        .create(&ctx(), level_input("ResearchGroup", 20, Some("Department")))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Level(LevelError::LevelValueConflict)
    ));
}

#[test]
fn test_insert_root_tier_gathers_old_roots_under_placeholder() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();

    let country = orgmap
        .levels()
        .insert(&ctx(), level_input("Country", 50, None))
        .unwrap();

    let summary = chain_summary(&orgmap);
    assert_eq!(summary[0], ("Country".to_string(), 50, None));
    assert_eq!(
        summary[1],
        ("University".to_string(), 40, Some("Country".to_string()))
    );

    // One container at the new tier, old roots beneath it.
    let containers = orgmap
        .store()
        .orgs()
        .list_by_level(&country.id)
        .unwrap();
    assert_eq!(containers.len(), 1);
    let container = &containers[0];
    assert_eq!(container.code, "Unknown");
    let umd_now = orgmap.orgs().get(&umd.id).unwrap();
    assert_eq!(umd_now.parent_id.as_ref(), Some(&container.id));

    // Unmoved descendants keep their parents.
    let engineering_now = orgmap.orgs().get(&engineering.id).unwrap();
    assert_eq!(engineering_now.parent_id.as_ref(), Some(&umd.id));

    orgmap.levels().validate().unwrap();

    // Removing the tier splices the container back out.
    orgmap.levels().remove(&ctx(), "Country").unwrap();
    assert_eq!(chain_summary(&orgmap).len(), 3);
    let umd_back = orgmap.orgs().get(&umd.id).unwrap();
    assert_eq!(umd_back.parent_id, None);
    assert!(orgmap.orgs().get(&container.id).is_err());
    orgmap.levels().validate().unwrap();
}

#[test]
fn test_insert_middle_tier_creates_placeholder_per_parent() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    let arts = orgmap
        .orgs()
        .create(&ctx(), org_input("ARTS", "College", Some(&umd), &orgmap))
        .unwrap();

    let division = orgmap
        .levels()
        .insert(&ctx(), level_input("Division", 35, Some("University")))
        .unwrap();

    let summary = chain_summary(&orgmap);
    assert_eq!(
        summary,
        vec![
            ("University".to_string(), 40, None),
            ("Division".to_string(), 35, Some("University".to_string())),
            ("College".to_string(), 30, Some("Division".to_string())),
            ("Department".to_string(), 20, Some("College".to_string())),
        ]
    );

    let containers = orgmap
        .store()
        .orgs()
        .list_by_level(&division.id)
        .unwrap();
    assert_eq!(containers.len(), 1);
    let container = &containers[0];
    assert_eq!(container.parent_id.as_ref(), Some(&umd.id));
    for college in [&engineering, &arts] {
        let now = orgmap.orgs().get(&college.id).unwrap();
        assert_eq!(now.parent_id.as_ref(), Some(&container.id));
    }
    orgmap.levels().validate().unwrap();
}

#[test]
fn test_insert_leaf_tier_is_plain_append() {
    let orgmap = seeded();
    orgmap
        .levels()
        .insert(&ctx(), level_input("ResearchGroup", 10, Some("Department")))
        .unwrap();
    assert_eq!(chain_summary(&orgmap).len(), 4);
    orgmap.levels().validate().unwrap();
}

#[test]
fn test_remove_middle_tier_splices_orgs() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    let physics = orgmap
        .orgs()
        .create(
            &ctx(),
            org_input("PHYS", "Department", Some(&engineering), &orgmap),
        )
        .unwrap();

    orgmap.levels().remove(&ctx(), "College").unwrap();

    assert_eq!(
        chain_summary(&orgmap),
        vec![
            ("University".to_string(), 40, None),
            ("Department".to_string(), 20, Some("University".to_string())),
        ]
    );
    assert!(orgmap.orgs().get(&engineering.id).is_err());
    let physics_now = orgmap.orgs().get(&physics.id).unwrap();
    assert_eq!(physics_now.parent_id.as_ref(), Some(&umd.id));
    orgmap.levels().validate().unwrap();
}

#[test]
fn test_validate_fails_on_forced_second_root() {
    let orgmap = seeded();
    // Raw repo write, bypassing the service checks.
    orgmap
        .store()
        .levels()
        .insert(NewLevel {
            name: "Country".to_string(),
            level: 50,
            parent_id: None,
            export_to_xdmod: true,
        })
        .unwrap();
    let err = orgmap.levels().validate().unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Level(LevelError::BrokenChain { .. })
    ));
}

#[test]
fn test_insert_rolls_back_on_bad_slot() {
    let orgmap = seeded();
    let err = orgmap
        .levels()
        .insert(&ctx(), level_input("Center", 45, Some("College")))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Level(LevelError::InvalidInput { .. })
    ));
    assert_eq!(chain_summary(&orgmap).len(), 3);
    orgmap.levels().validate().unwrap();
}

#[test]
fn test_fullcode_and_lookup() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    let physics = orgmap
        .orgs()
        .create(
            &ctx(),
            org_input("PHYS", "Department", Some(&engineering), &orgmap),
        )
        .unwrap();

    let orgs = orgmap.orgs();
    assert_eq!(orgs.fullcode(&physics).unwrap(), "UMD-ENGR-PHYS");
    assert_eq!(orgs.semifullcode(&physics).unwrap(), "UMD-ENGR-PHYS-short");

    let found = orgs.get_by_fullcode("UMD-ENGR-PHYS").unwrap().unwrap();
    assert_eq!(found.id, physics.id);
    assert!(orgs.get_by_fullcode("UMD-ENGR-NOPE").unwrap().is_none());

    let found = orgs
        .get_by_semifullcode("UMD-ENGR-PHYS-short")
        .unwrap()
        .unwrap();
    assert_eq!(found.id, physics.id);

    let ancestors = orgs.ancestors(&physics).unwrap();
    assert_eq!(
        ancestors.iter().map(|org| org.code.as_str()).collect::<Vec<_>>(),
        vec!["UMD", "ENGR"]
    );
    let descendants = orgs.descendants(&umd).unwrap();
    assert_eq!(descendants.len(), 2);
}

#[test]
fn test_org_placement_is_enforced() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();

    // Root-tier org with a parent.
    let err = orgmap
        .orgs()
        .create(&ctx(), org_input("UMBC", "University", Some(&umd), &orgmap))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Org(OrgError::InvalidPlacement { .. })
    ));

    // Skipping a tier.
    let err = orgmap
        .orgs()
        .create(&ctx(), org_input("PHYS", "Department", Some(&umd), &orgmap))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Org(OrgError::InvalidPlacement { .. })
    ));

    // Non-root org without a parent.
    let err = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", None, &orgmap))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Org(OrgError::InvalidPlacement { .. })
    ));
}

#[test]
fn test_sibling_uniqueness_is_scoped_by_parent() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    let arts = orgmap
        .orgs()
        .create(&ctx(), org_input("ARTS", "College", Some(&umd), &orgmap))
        .unwrap();

    let err = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap_err();
    assert!(matches!(
        err,
        OrgmapError::Org(OrgError::SiblingConflict { .. })
    ));

    // Same code under different parents is fine.
    orgmap
        .orgs()
        .create(
            &ctx(),
            org_input("MATH", "Department", Some(&engineering), &orgmap),
        )
        .unwrap();
    orgmap
        .orgs()
        .create(&ctx(), org_input("MATH", "Department", Some(&arts), &orgmap))
        .unwrap();

    let err = orgmap
        .orgs()
        .create(&ctx(), org_input("UM-D", "University", None, &orgmap))
        .unwrap_err();
    assert!(matches!(err, OrgmapError::Org(OrgError::InvalidInput { .. })));
}

#[test]
fn test_delete_org_guards_and_dissociation() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();

    let err = orgmap
        .orgs()
        .delete(&ctx(), &umd.id, DeleteOrgOpts::default())
        .unwrap_err();
    assert!(matches!(err, OrgmapError::Org(OrgError::HasChildren)));

    orgmap
        .users()
        .create(
            &ctx(),
            CreateUserInput {
                username: "jdoe".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jdoe@example.edu".to_string(),
                is_pi: None,
                is_active: None,
                primary_org_id: Some(engineering.id.clone()),
            },
        )
        .unwrap();

    let err = orgmap
        .orgs()
        .delete(&ctx(), &engineering.id, DeleteOrgOpts::default())
        .unwrap_err();
    assert!(matches!(err, OrgmapError::Org(OrgError::InUse { .. })));

    orgmap
        .orgs()
        .delete(
            &ctx(),
            &engineering.id,
            DeleteOrgOpts {
                dissociate_users: true,
                dissociate_projects: false,
            },
        )
        .unwrap();
    let user = orgmap.users().get_by_username("jdoe").unwrap();
    assert_eq!(user.primary_org_id, None);
}

#[test]
fn test_convert_strings_creates_placeholders() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    orgmap
        .directory()
        .map(&ctx(), &engineering.id, "ENGR-College of Engineering")
        .unwrap();

    let orgs = orgmap
        .directory()
        .convert_strings_to_orgs(
            &ctx(),
            &[
                "ENGR-College of Engineering".to_string(),
                "BSOS-Behavioral Sciences".to_string(),
                "ENGR-College of Engineering".to_string(),
            ],
            true,
        )
        .unwrap();

    assert_eq!(orgs.len(), 2);
    assert_eq!(orgs[0].id, engineering.id);

    // Placeholder lives under the root container, one tier down.
    let placeholder = &orgs[1];
    assert_eq!(placeholder.code, "BSOS_Behavioral_Sciences");
    assert_eq!(placeholder.shortname, "BSOS-Behavioral Sciences");
    let container = orgmap
        .orgs()
        .get(placeholder.parent_id.as_ref().unwrap())
        .unwrap();
    assert_eq!(container.code, "Unknown");
    assert!(
        orgmap
            .directory()
            .get_by_string("BSOS-Behavioral Sciences")
            .unwrap()
            .is_some()
    );

    // Unknown strings are skipped without the placeholder flag.
    let orgs = orgmap
        .directory()
        .convert_strings_to_orgs(&ctx(), &["CMNS-Computer Science".to_string()], false)
        .unwrap();
    assert!(orgs.is_empty());
}

#[test]
fn test_sync_user_orgs_adds_parents_and_deletes() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    let physics = orgmap
        .orgs()
        .create(
            &ctx(),
            org_input("PHYS", "Department", Some(&engineering), &orgmap),
        )
        .unwrap();
    let arts = orgmap
        .orgs()
        .create(&ctx(), org_input("ARTS", "College", Some(&umd), &orgmap))
        .unwrap();
    orgmap
        .directory()
        .map(&ctx(), &physics.id, "PHYS-Dept of Physics")
        .unwrap();

    let user = orgmap
        .users()
        .create(
            &ctx(),
            CreateUserInput {
                username: "jdoe".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jdoe@example.edu".to_string(),
                is_pi: None,
                is_active: None,
                primary_org_id: None,
            },
        )
        .unwrap();
    orgmap.users().add_org(&ctx(), &user.id, &arts.id).unwrap();

    let outcome = orgmap
        .directory()
        .sync_user_orgs(
            &ctx(),
            "jdoe",
            &["PHYS-Dept of Physics".to_string()],
            SyncOpts {
                add_parents: true,
                create_placeholder: false,
                delete: true,
                dry_run: false,
            },
        )
        .unwrap();

    let added: Vec<&OrgId> = outcome.added.iter().collect();
    assert_eq!(added.len(), 3);
    assert_eq!(outcome.removed, vec![arts.id.clone()]);

    let user = orgmap.users().get_by_username("jdoe").unwrap();
    assert_eq!(user.primary_org_id.as_ref(), Some(&physics.id));
    let member_orgs = orgmap.users().orgs(&user).unwrap();
    let codes: Vec<&str> = member_orgs.iter().map(|org| org.code.as_str()).collect();
    assert!(codes.contains(&"PHYS"));
    assert!(codes.contains(&"ENGR"));
    assert!(codes.contains(&"UMD"));
    assert!(!codes.contains(&"ARTS"));
}

#[test]
fn test_sync_dry_run_changes_nothing() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    orgmap
        .directory()
        .map(&ctx(), &engineering.id, "ENGR-College of Engineering")
        .unwrap();
    let user = orgmap
        .users()
        .create(
            &ctx(),
            CreateUserInput {
                username: "jdoe".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jdoe@example.edu".to_string(),
                is_pi: None,
                is_active: None,
                primary_org_id: None,
            },
        )
        .unwrap();

    let outcome = orgmap
        .directory()
        .sync_user_orgs(
            &ctx(),
            "jdoe",
            &["ENGR-College of Engineering".to_string()],
            SyncOpts {
                add_parents: false,
                create_placeholder: false,
                delete: false,
                dry_run: true,
            },
        )
        .unwrap();
    assert_eq!(outcome.added, vec![engineering.id.clone()]);

    let user = orgmap.users().get(&user.id).unwrap();
    assert_eq!(user.primary_org_id, None);
    assert!(orgmap.users().orgs(&user).unwrap().is_empty());
}

#[test]
fn test_users_by_orgs_union_and_intersection() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    let arts = orgmap
        .orgs()
        .create(&ctx(), org_input("ARTS", "College", Some(&umd), &orgmap))
        .unwrap();

    let make_user = |name: &str, orgs: &[&Org]| {
        let user = orgmap
            .users()
            .create(
                &ctx(),
                CreateUserInput {
                    username: name.to_string(),
                    first_name: name.to_string(),
                    last_name: name.to_string(),
                    email: format!("{name}@example.edu"),
                    is_pi: None,
                    is_active: None,
                    primary_org_id: None,
                },
            )
            .unwrap();
        for org in orgs {
            orgmap.users().add_org(&ctx(), &user.id, &org.id).unwrap();
        }
        user
    };
    make_user("alice", &[&engineering]);
    make_user("bob", &[&arts]);
    make_user("carol", &[&engineering, &arts]);

    let any = orgmap
        .users()
        .list_by_orgs(&[engineering.clone(), arts.clone()], false)
        .unwrap();
    assert_eq!(any.len(), 3);

    let all = orgmap
        .users()
        .list_by_orgs(&[engineering.clone(), arts.clone()], true)
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].username, "carol");
}

#[test]
fn test_projects_by_orgs_with_descendants_and_status() {
    let orgmap = seeded();
    let umd = orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let engineering = orgmap
        .orgs()
        .create(&ctx(), org_input("ENGR", "College", Some(&umd), &orgmap))
        .unwrap();
    let physics = orgmap
        .orgs()
        .create(
            &ctx(),
            org_input("PHYS", "Department", Some(&engineering), &orgmap),
        )
        .unwrap();

    let cosmology = orgmap
        .projects()
        .create(
            &ctx(),
            CreateProjectInput {
                title: "Cosmology".to_string(),
                status: Some(ProjectStatus::Active),
                primary_org_id: Some(physics.id.clone()),
            },
        )
        .unwrap();
    orgmap
        .projects()
        .create(
            &ctx(),
            CreateProjectInput {
                title: "Bridges".to_string(),
                status: Some(ProjectStatus::Archived),
                primary_org_id: Some(engineering.id.clone()),
            },
        )
        .unwrap();
    let shared = orgmap
        .projects()
        .create(
            &ctx(),
            CreateProjectInput {
                title: "Shared".to_string(),
                status: Some(ProjectStatus::Active),
                primary_org_id: None,
            },
        )
        .unwrap();
    orgmap
        .projects()
        .add_org(&ctx(), &shared.id, &engineering.id)
        .unwrap();

    // Direct match only.
    let direct = orgmap
        .projects()
        .list_by_orgs(
            std::slice::from_ref(&engineering),
            &ProjectOrgQuery::default(),
        )
        .unwrap();
    assert_eq!(direct.len(), 2);

    // Descendants pull in the department project.
    let with_children = orgmap
        .projects()
        .list_by_orgs(
            std::slice::from_ref(&engineering),
            &ProjectOrgQuery {
                include_descendants: true,
                ..ProjectOrgQuery::default()
            },
        )
        .unwrap();
    assert_eq!(with_children.len(), 3);

    // Status filter.
    let active = orgmap
        .projects()
        .list_by_orgs(
            std::slice::from_ref(&engineering),
            &ProjectOrgQuery {
                include_descendants: true,
                statuses: vec![ProjectStatus::Active],
                ..ProjectOrgQuery::default()
            },
        )
        .unwrap();
    assert_eq!(
        active.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
        vec!["Cosmology", "Shared"]
    );

    // Primary-only ignores the additional association.
    let primary_only = orgmap
        .projects()
        .list_by_orgs(
            std::slice::from_ref(&engineering),
            &ProjectOrgQuery {
                primary_only: true,
                ..ProjectOrgQuery::default()
            },
        )
        .unwrap();
    assert_eq!(primary_only.len(), 1);
    assert_eq!(primary_only[0].id, cosmology.id);
}

#[test]
fn test_events_are_recorded_in_order() {
    let orgmap = seeded();
    orgmap
        .orgs()
        .create(&ctx(), org_input("UMD", "University", None, &orgmap))
        .unwrap();
    let events = orgmap.events().list(None, None).unwrap();
    assert!(events.len() >= 4);
    for window in events.windows(2) {
        assert!(window[0].seq < window[1].seq);
    }
    let after = orgmap.events().list(Some(events[1].seq), None).unwrap();
    assert_eq!(after.len(), events.len() - 2);
}

#[test]
fn test_xdmod_setup_from_seeded_chain() {
    let orgmap = seeded();
    let setup = orgmap.levels().xdmod_setup().unwrap();
    assert_eq!(setup.top_level_label.as_deref(), Some("University"));
    assert_eq!(setup.middle_level_label.as_deref(), Some("College"));
    assert_eq!(setup.bottom_level_label.as_deref(), Some("Department"));
}
