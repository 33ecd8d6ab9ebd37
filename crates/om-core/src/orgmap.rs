use crate::config::{DEFAULT_PLACEHOLDER_CODE, DEFAULT_PLACEHOLDER_LONGNAME};
use crate::directory::DirectoryRepository;
use crate::error::{DirectoryError, LevelError, OrgError, OrgmapError, ProjectError, UserError};
use crate::events::EventRepository;
use crate::levels::LevelRepository;
use crate::orgs::OrgRepository;
use crate::projects::ProjectRepository;
use crate::store::Store;
use crate::types::{
    CreateLevelInput, CreateOrgInput, CreateProjectInput, CreateUserInput, DeleteOrgOpts,
    DirectoryId, DirectoryMapping, EventBody, LevelId, NewLevel, NewOrg, Org, OrgDetail,
    OrgFilter, OrgId, OrgLevel, Project, ProjectId, ProjectOrgQuery, SyncOpts, SyncOutcome,
    UpdateOrgInput, UpdateProjectInput, UpdateUserInput, UserId, UserProfile,
};
use crate::users::UserRepository;
use crate::validation::{
    validate_level_chain, validate_level_slot, validate_org_code, validate_org_placement,
};
use crate::xdmod::{xdmod_hierarchy_setup, XdmodHierarchySetup, XdmodNameRow};
use chrono::Utc;
use om_events::bus::EventBus;
use om_events::types::{EventRecord, EventSource};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: EventSource,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(source: EventSource, correlation_id: Option<String>) -> Self {
        Self {
            source,
            correlation_id,
        }
    }
}

/// Service facade over a [`Store`].
///
/// All mutations run inside a single transaction; event records are
/// appended in the same transaction and published on the bus after the
/// commit succeeds.
pub struct Orgmap<S: Store> {
    store: S,
    event_bus: EventBus,
    placeholder_code: String,
    placeholder_longname: String,
}

impl<S: Store> Orgmap<S> {
    pub fn new(store: S, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            placeholder_code: DEFAULT_PLACEHOLDER_CODE.to_string(),
            placeholder_longname: DEFAULT_PLACEHOLDER_LONGNAME.to_string(),
        }
    }

    pub fn with_placeholder(
        mut self,
        code: impl Into<String>,
        longname: impl Into<String>,
    ) -> Self {
        self.placeholder_code = code.into();
        self.placeholder_longname = longname.into();
        self
    }

    pub fn levels(&self) -> LevelsApi<'_, S> {
        LevelsApi { core: self }
    }

    pub fn orgs(&self) -> OrgsApi<'_, S> {
        OrgsApi { core: self }
    }

    pub fn directory(&self) -> DirectoryApi<'_, S> {
        DirectoryApi { core: self }
    }

    pub fn users(&self) -> UsersApi<'_, S> {
        UsersApi { core: self }
    }

    pub fn projects(&self) -> ProjectsApi<'_, S> {
        ProjectsApi { core: self }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Seed the default tiers and the root placeholder container.
    ///
    /// Idempotent: existing rows with matching names are left alone.
    pub fn seed_defaults(&self, ctx: &RequestContext) -> Result<(), OrgmapError> {
        let defaults = [
            ("University", 40_i64, None::<&str>),
            ("College", 30, Some("University")),
            ("Department", 20, Some("College")),
        ];
        self.with_events(ctx, |store| {
            let mut events = Vec::new();
            for (name, value, parent) in defaults {
                if store.levels().get_by_name(name)?.is_some() {
                    continue;
                }
                let parent_id = match parent {
                    Some(parent_name) => Some(
                        store
                            .levels()
                            .get_by_name(parent_name)?
                            .ok_or(LevelError::NotFound)?
                            .id,
                    ),
                    None => None,
                };
                let level = store.levels().insert(NewLevel {
                    name: name.to_string(),
                    level: value,
                    parent_id,
                    export_to_xdmod: true,
                })?;
                events.push(EventBody::LevelCreated { level });
            }
            let (root, created) = placeholder_root(
                store,
                &self.placeholder_code,
                &self.placeholder_longname,
            )?;
            if created {
                events.push(EventBody::OrgCreated { org: root });
            }
            validate_within(store)?;
            Ok(((), events))
        })
    }

    fn with_events<T, F>(&self, ctx: &RequestContext, f: F) -> Result<T, OrgmapError>
    where
        F: FnOnce(&S) -> Result<(T, Vec<EventBody>), OrgmapError>,
    {
        let (value, records) = self.store.with_tx(|store| {
            let (value, bodies) = f(store)?;
            let mut records = Vec::new();
            for body in bodies {
                let record = build_event_record(ctx, body)?;
                let record = store.events().append(record)?;
                records.push(record);
            }
            Ok((value, records))
        })?;
        for record in records {
            let _ = self.event_bus.publish(record);
        }
        Ok(value)
    }
}

pub struct LevelsApi<'a, S: Store> {
    core: &'a Orgmap<S>,
}

impl<'a, S: Store> LevelsApi<'a, S> {
    /// The chain in root→leaf order.
    pub fn list(&self) -> Result<Vec<OrgLevel>, OrgmapError> {
        Ok(self.core.store.levels().list()?)
    }

    pub fn get(&self, name: &str) -> Result<OrgLevel, OrgmapError> {
        self.core
            .store
            .levels()
            .get_by_name(name)?
            .ok_or(OrgmapError::Level(LevelError::NotFound))
    }

    /// Plain validated create: first root, or a leaf appended below the
    /// current bottom tier. Anything else needs [`LevelsApi::insert`].
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateLevelInput,
    ) -> Result<OrgLevel, OrgmapError> {
        self.core.with_events(ctx, |store| {
            let levels = store.levels().list()?;
            check_level_conflicts(&levels, &input)?;
            let parent = resolve_parent(&levels, input.parent_name.as_deref())?;

            match &parent {
                None => {
                    if !levels.is_empty() {
                        return Err(OrgmapError::Level(LevelError::BrokenChain {
                            message: format!(
                                "cannot create a second root level {}; {} levels exist",
                                input.name,
                                levels.len()
                            ),
                        }));
                    }
                }
                Some(parent) => {
                    if child_of(&levels, &parent.id).is_some() {
                        return Err(OrgmapError::Level(LevelError::BrokenChain {
                            message: format!(
                                "level {} already has a child; use insert to splice a tier",
                                parent.name
                            ),
                        }));
                    }
                    validate_level_slot(input.level, Some(parent), None)?;
                }
            }

            let level = store.levels().insert(NewLevel {
                name: input.name,
                level: input.level,
                parent_id: parent.map(|p| p.id),
                export_to_xdmod: input.export_to_xdmod,
            })?;
            validate_within(store)?;
            let events = vec![EventBody::LevelCreated {
                level: level.clone(),
            }];
            Ok((level, events))
        })
    }

    /// Splice a tier into the chain at any position, repairing the
    /// organization tree as needed.
    ///
    /// Inserting a new root reparents the displaced root tier and, when
    /// root organizations exist, gathers them under a single placeholder
    /// organization at the new tier. A middle insert does the same per
    /// parent organization with children. A leaf insert is a plain
    /// append.
    pub fn insert(
        &self,
        ctx: &RequestContext,
        input: CreateLevelInput,
    ) -> Result<OrgLevel, OrgmapError> {
        self.core.with_events(ctx, |store| {
            let levels = store.levels().list()?;
            check_level_conflicts(&levels, &input)?;
            let parent = resolve_parent(&levels, input.parent_name.as_deref())?;

            let displaced = match &parent {
                Some(parent) => child_of(&levels, &parent.id).cloned(),
                None => levels.first().cloned(),
            };
            validate_level_slot(input.level, parent.as_ref(), displaced.as_ref())?;

            // Insert detached, rewire the displaced tier, then attach:
            // each level may parent only one other, so the new tier
            // cannot point at the parent while the displaced tier
            // still does.
            let level = store.levels().insert(NewLevel {
                name: input.name.clone(),
                level: input.level,
                parent_id: None,
                export_to_xdmod: input.export_to_xdmod,
            })?;

            let mut placeholders = Vec::new();
            if let Some(displaced) = &displaced {
                store.levels().set_parent(&displaced.id, Some(&level.id))?;

                match &parent {
                    None => {
                        // New root: gather the old root orgs under one
                        // placeholder container at the new tier.
                        let old_roots = store.orgs().list_children(None)?;
                        if !old_roots.is_empty() {
                            let container = gather_under_placeholder(
                                store,
                                None,
                                &level.id,
                                &old_roots,
                                &self.core.placeholder_code,
                                &self.core.placeholder_longname,
                            )?;
                            placeholders.push(container.id);
                        }
                    }
                    Some(parent_level) => {
                        // Middle insert: one placeholder per parent org
                        // that has children to keep.
                        for parent_org in store.orgs().list_by_level(&parent_level.id)? {
                            let children = store.orgs().list_children(Some(&parent_org.id))?;
                            if children.is_empty() {
                                continue;
                            }
                            let container = gather_under_placeholder(
                                store,
                                Some(&parent_org.id),
                                &level.id,
                                &children,
                                &self.core.placeholder_code,
                                &self.core.placeholder_longname,
                            )?;
                            placeholders.push(container.id);
                        }
                    }
                }
            }

            if let Some(parent_level) = &parent {
                store
                    .levels()
                    .set_parent(&level.id, Some(&parent_level.id))?;
            }
            let level = store
                .levels()
                .get(&level.id)?
                .ok_or(LevelError::NotFound)?;

            validate_within(store)?;
            let events = vec![EventBody::LevelInserted {
                level: level.clone(),
                placeholders,
            }];
            Ok((level, events))
        })
    }

    /// Remove a tier, splicing its organizations out of the tree.
    ///
    /// Organizations at the removed tier are deleted after their
    /// children are reparented to the grandparent (children become roots
    /// when the removed tier was the root).
    pub fn remove(&self, ctx: &RequestContext, name: &str) -> Result<(), OrgmapError> {
        self.core.with_events(ctx, |store| {
            let levels = store.levels().list()?;
            let level = levels
                .iter()
                .find(|level| level.name == name)
                .cloned()
                .ok_or(LevelError::NotFound)?;
            let child = child_of(&levels, &level.id).cloned();

            // Move the doomed orgs aside first: a reparented child may
            // otherwise collide with the very org it is leaving behind
            // (same code, same destination scope).
            let tier_orgs = store.orgs().list_by_level(&level.id)?;
            for org in &tier_orgs {
                let transient = format!("{}_{}", org.code, ulid::Ulid::new());
                store.orgs().update(
                    &org.id,
                    UpdateOrgInput {
                        code: Some(transient.clone()),
                        shortname: Some(transient.clone()),
                        longname: Some(transient),
                        is_selectable_for_user: None,
                        is_selectable_for_project: None,
                    },
                )?;
            }
            for org in &tier_orgs {
                for grandchild in store.orgs().list_children(Some(&org.id))? {
                    store
                        .orgs()
                        .set_parent(&grandchild.id, org.parent_id.as_ref())?;
                }
            }
            let mut removed_orgs = Vec::new();
            for org in &tier_orgs {
                store.orgs().delete(&org.id)?;
                removed_orgs.push(org.id.clone());
            }

            // Detach before rewiring the child, for the same
            // one-child-per-level reason as in insert.
            store.levels().set_parent(&level.id, None)?;
            if let Some(child) = &child {
                store.levels().set_parent(&child.id, level.parent_id.as_ref())?;
            }
            store.levels().delete(&level.id)?;

            validate_within(store)?;
            let events = vec![EventBody::LevelRemoved {
                level_id: level.id.clone(),
                removed_orgs,
            }];
            Ok(((), events))
        })
    }

    /// Full structural check of the chain and every organization's
    /// placement on it.
    pub fn validate(&self) -> Result<(), OrgmapError> {
        validate_within(&self.core.store)
    }

    pub fn xdmod_setup(&self) -> Result<XdmodHierarchySetup, OrgmapError> {
        let levels = self.core.store.levels().list()?;
        Ok(xdmod_hierarchy_setup(&levels))
    }

    /// `fullcode,longname,parent-fullcode` rows for every organization
    /// at a tier flagged for XDMoD export.
    pub fn xdmod_names(&self) -> Result<Vec<XdmodNameRow>, OrgmapError> {
        let levels = self.core.store.levels().list()?;
        let orgs_api = self.core.orgs();
        let mut rows = Vec::new();
        for level in levels.iter().filter(|level| level.export_to_xdmod) {
            for org in self.core.store.orgs().list_by_level(&level.id)? {
                let fullcode = orgs_api.fullcode(&org)?;
                let parent_fullcode = match &org.parent_id {
                    Some(parent_id) => {
                        let parent = self
                            .core
                            .store
                            .orgs()
                            .get(parent_id)?
                            .ok_or(OrgError::NotFound)?;
                        Some(orgs_api.fullcode(&parent)?)
                    }
                    None => None,
                };
                rows.push(XdmodNameRow {
                    fullcode,
                    longname: org.longname.clone(),
                    parent_fullcode,
                });
            }
        }
        Ok(rows)
    }
}

pub struct OrgsApi<'a, S: Store> {
    core: &'a Orgmap<S>,
}

impl<'a, S: Store> OrgsApi<'a, S> {
    pub fn create(&self, ctx: &RequestContext, input: CreateOrgInput) -> Result<Org, OrgmapError> {
        self.core.with_events(ctx, |store| {
            let org = create_org_within(store, input)?;
            let events = vec![EventBody::OrgCreated { org: org.clone() }];
            Ok((org, events))
        })
    }

    pub fn get(&self, id: &OrgId) -> Result<Org, OrgmapError> {
        self.core
            .store
            .orgs()
            .get(id)?
            .ok_or(OrgmapError::Org(OrgError::NotFound))
    }

    pub fn detail(&self, id: &OrgId) -> Result<OrgDetail, OrgmapError> {
        let org = self.get(id)?;
        let fullcode = self.fullcode(&org)?;
        Ok(OrgDetail { org, fullcode })
    }

    pub fn list(&self, filter: &OrgFilter) -> Result<Vec<Org>, OrgmapError> {
        Ok(self.core.store.orgs().list(filter)?)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &OrgId,
        input: UpdateOrgInput,
    ) -> Result<Org, OrgmapError> {
        self.core.with_events(ctx, |store| {
            let current = store.orgs().get(id)?.ok_or(OrgError::NotFound)?;
            if let Some(code) = &input.code {
                validate_org_code(code)?;
                check_sibling_free(store, current.parent_id.as_ref(), Some(id), code, None, None)?;
            }
            if let Some(shortname) = &input.shortname {
                check_sibling_free(
                    store,
                    current.parent_id.as_ref(),
                    Some(id),
                    "",
                    Some(shortname),
                    None,
                )?;
            }
            if let Some(longname) = &input.longname {
                check_sibling_free(
                    store,
                    current.parent_id.as_ref(),
                    Some(id),
                    "",
                    None,
                    Some(longname),
                )?;
            }
            let org = store.orgs().update(id, input)?;
            let events = vec![EventBody::OrgUpdated { org: org.clone() }];
            Ok((org, events))
        })
    }

    /// Delete an organization with no children. References from users
    /// and projects either block the delete or are dissociated first,
    /// depending on `opts`.
    pub fn delete(
        &self,
        ctx: &RequestContext,
        id: &OrgId,
        opts: DeleteOrgOpts,
    ) -> Result<(), OrgmapError> {
        self.core.with_events(ctx, |store| {
            let org = store.orgs().get(id)?.ok_or(OrgError::NotFound)?;
            if !store.orgs().list_children(Some(&org.id))?.is_empty() {
                return Err(OrgmapError::Org(OrgError::HasChildren));
            }

            let user_refs = store.users().count_org_refs(&org.id)?;
            if user_refs > 0 {
                if opts.dissociate_users {
                    store.users().dissociate_org(&org.id)?;
                } else {
                    return Err(OrgmapError::Org(OrgError::InUse {
                        message: format!("{user_refs} user association(s)"),
                    }));
                }
            }

            let project_refs = store.projects().count_org_refs(&org.id)?;
            if project_refs > 0 {
                if opts.dissociate_projects {
                    store.projects().dissociate_org(&org.id)?;
                } else {
                    return Err(OrgmapError::Org(OrgError::InUse {
                        message: format!("{project_refs} project association(s)"),
                    }));
                }
            }

            store.orgs().delete(&org.id)?;
            let events = vec![EventBody::OrgDeleted {
                org_id: org.id.clone(),
            }];
            Ok(((), events))
        })
    }

    /// Hyphen-joined codes from the root ancestor down to `org`.
    pub fn fullcode(&self, org: &Org) -> Result<String, OrgmapError> {
        let mut parts: Vec<String> = self
            .ancestors(org)?
            .into_iter()
            .map(|ancestor| ancestor.code)
            .collect();
        parts.push(org.code.clone());
        Ok(parts.join("-"))
    }

    /// Parent's fullcode joined with our shortname.
    pub fn semifullcode(&self, org: &Org) -> Result<String, OrgmapError> {
        let mut parts = Vec::new();
        for ancestor in self.ancestors(org)? {
            parts.push(ancestor.code.clone());
        }
        parts.push(org.shortname.clone());
        Ok(parts.join("-"))
    }

    /// Transitive parents, root first.
    pub fn ancestors(&self, org: &Org) -> Result<Vec<Org>, OrgmapError> {
        let orgs = self.core.store.orgs();
        let mut seen: HashSet<OrgId> = HashSet::new();
        let mut chain = Vec::new();
        let mut current = org.parent_id.clone();
        while let Some(parent_id) = current {
            if !seen.insert(parent_id.clone()) {
                return Err(OrgmapError::Org(OrgError::InvalidPlacement {
                    message: format!("parent cycle at {parent_id}"),
                }));
            }
            let parent = orgs.get(&parent_id)?.ok_or(OrgError::NotFound)?;
            current = parent.parent_id.clone();
            chain.push(parent);
        }
        chain.reverse();
        Ok(chain)
    }

    /// All transitive children.
    pub fn descendants(&self, org: &Org) -> Result<Vec<Org>, OrgmapError> {
        let orgs = self.core.store.orgs();
        let mut result = Vec::new();
        let mut queue = vec![org.id.clone()];
        while let Some(id) = queue.pop() {
            for child in orgs.list_children(Some(&id))? {
                queue.push(child.id.clone());
                result.push(child);
            }
        }
        Ok(result)
    }

    /// Expand a list of organizations with all their ancestors,
    /// deduplicated, input order preserved.
    pub fn add_ancestors(&self, orgs: &[Org]) -> Result<Vec<Org>, OrgmapError> {
        let mut seen: HashSet<OrgId> = HashSet::new();
        let mut result = Vec::new();
        for org in orgs {
            if seen.insert(org.id.clone()) {
                result.push(org.clone());
            }
            for ancestor in self.ancestors(org)? {
                if seen.insert(ancestor.id.clone()) {
                    result.push(ancestor);
                }
            }
        }
        Ok(result)
    }

    pub fn get_by_fullcode(&self, fullcode: &str) -> Result<Option<Org>, OrgmapError> {
        let orgs = self.core.store.orgs();
        let mut current: Option<Org> = None;
        for part in fullcode.split('-') {
            let next = orgs.get_child_by_code(current.as_ref().map(|org| &org.id), part)?;
            match next {
                Some(org) => current = Some(org),
                None => return Ok(None),
            }
        }
        Ok(current)
    }

    /// Resolve a parent-fullcode + shortname reference. The longest
    /// prefix of components matching codes wins; the remainder (which
    /// may itself contain hyphens) is matched as a shortname.
    pub fn get_by_semifullcode(&self, value: &str) -> Result<Option<Org>, OrgmapError> {
        let orgs = self.core.store.orgs();
        let parts: Vec<&str> = value.split('-').collect();
        for split_at in (0..parts.len()).rev() {
            let mut current: Option<Org> = None;
            let mut matched = true;
            for part in &parts[..split_at] {
                match orgs.get_child_by_code(current.as_ref().map(|org| &org.id), part)? {
                    Some(org) => current = Some(org),
                    None => {
                        matched = false;
                        break;
                    }
                }
            }
            if !matched {
                continue;
            }
            let shortname = parts[split_at..].join("-");
            if let Some(org) = orgs
                .get_child_by_shortname(current.as_ref().map(|org| &org.id), &shortname)?
            {
                return Ok(Some(org));
            }
        }
        Ok(None)
    }
}

pub struct DirectoryApi<'a, S: Store> {
    core: &'a Orgmap<S>,
}

impl<'a, S: Store> DirectoryApi<'a, S> {
    pub fn map(
        &self,
        ctx: &RequestContext,
        org_id: &OrgId,
        directory_string: &str,
    ) -> Result<DirectoryMapping, OrgmapError> {
        self.core.with_events(ctx, |store| {
            if store.orgs().get(org_id)?.is_none() {
                return Err(OrgmapError::Org(OrgError::NotFound));
            }
            if store
                .directory()
                .get_by_string(directory_string)?
                .is_some()
            {
                return Err(OrgmapError::Directory(DirectoryError::StringConflict));
            }
            let mapping = store.directory().insert(org_id, directory_string)?;
            let events = vec![EventBody::DirectoryMapped {
                mapping: mapping.clone(),
            }];
            Ok((mapping, events))
        })
    }

    pub fn unmap(&self, ctx: &RequestContext, id: &DirectoryId) -> Result<(), OrgmapError> {
        self.core.with_events(ctx, |store| {
            store.directory().delete(id)?;
            let events = vec![EventBody::DirectoryUnmapped {
                mapping_id: id.clone(),
            }];
            Ok(((), events))
        })
    }

    pub fn list(&self) -> Result<Vec<DirectoryMapping>, OrgmapError> {
        Ok(self.core.store.directory().list()?)
    }

    pub fn get_by_string(&self, value: &str) -> Result<Option<DirectoryMapping>, OrgmapError> {
        Ok(self.core.store.directory().get_by_string(value)?)
    }

    /// Resolve directory strings to organizations, optionally creating
    /// placeholder organizations (and mappings) for unknown strings.
    pub fn convert_strings_to_orgs(
        &self,
        ctx: &RequestContext,
        strings: &[String],
        create_placeholder: bool,
    ) -> Result<Vec<Org>, OrgmapError> {
        self.core.with_events(ctx, |store| {
            let mut events = Vec::new();
            let orgs = convert_strings_within(
                store,
                strings,
                create_placeholder,
                &self.core.placeholder_code,
                &self.core.placeholder_longname,
                &mut events,
            )?;
            Ok((orgs, events))
        })
    }

    /// Reconcile one user's memberships against a directory extract.
    pub fn sync_user_orgs(
        &self,
        ctx: &RequestContext,
        username: &str,
        dirstrings: &[String],
        opts: SyncOpts,
    ) -> Result<SyncOutcome, OrgmapError> {
        self.core.with_events(ctx, |store| {
            let user = store
                .users()
                .get_by_username(username)?
                .ok_or(UserError::NotFound)?;

            let mut events = Vec::new();
            let mut resolved = convert_strings_within(
                store,
                dirstrings,
                opts.create_placeholder && !opts.dry_run,
                &self.core.placeholder_code,
                &self.core.placeholder_longname,
                &mut events,
            )?;
            if opts.add_parents {
                resolved = add_ancestors_within(store, &resolved)?;
            }
            let resolved_ids: HashSet<OrgId> =
                resolved.iter().map(|org| org.id.clone()).collect();

            let additional: HashSet<OrgId> = store.users().org_ids(&user.id)?.into_iter().collect();
            let mut current = additional.clone();
            if let Some(primary) = &user.primary_org_id {
                current.insert(primary.clone());
            }

            let added: Vec<OrgId> = resolved
                .iter()
                .map(|org| org.id.clone())
                .filter(|id| !current.contains(id))
                .collect();
            let mut removed: Vec<OrgId> = Vec::new();
            if opts.delete {
                for id in &additional {
                    if !resolved_ids.contains(id) {
                        removed.push(id.clone());
                    }
                }
            }

            let mut new_primary: Option<Option<OrgId>> = None;
            match &user.primary_org_id {
                None => {
                    if let Some(first) = resolved.first() {
                        new_primary = Some(Some(first.id.clone()));
                    }
                }
                Some(primary) => {
                    if opts.delete && !resolved_ids.contains(primary) {
                        removed.push(primary.clone());
                        new_primary = Some(resolved.first().map(|org| org.id.clone()));
                    }
                }
            }

            let outcome = SyncOutcome {
                added: added.clone(),
                removed: removed.clone(),
            };
            if opts.dry_run {
                // Resolution-only pass: report, change nothing.
                return Ok((outcome, Vec::new()));
            }

            for id in &added {
                store.users().add_org(&user.id, id)?;
            }
            for id in &removed {
                if additional.contains(id) {
                    store.users().remove_org(&user.id, id)?;
                }
            }
            if let Some(primary) = new_primary {
                store
                    .users()
                    .set_primary_org(&user.id, primary.as_ref())?;
            }

            if !outcome.is_noop() {
                events.push(EventBody::UserOrgsSynced {
                    user_id: user.id.clone(),
                    added,
                    removed,
                });
            }
            Ok((outcome, events))
        })
    }
}

pub struct UsersApi<'a, S: Store> {
    core: &'a Orgmap<S>,
}

impl<'a, S: Store> UsersApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> Result<UserProfile, OrgmapError> {
        self.core.with_events(ctx, |store| {
            if store.users().get_by_username(&input.username)?.is_some() {
                return Err(OrgmapError::User(UserError::UsernameConflict));
            }
            if let Some(org_id) = &input.primary_org_id {
                if store.orgs().get(org_id)?.is_none() {
                    return Err(OrgmapError::Org(OrgError::NotFound));
                }
            }
            let user = store.users().create(input)?;
            let events = vec![EventBody::UserCreated { user: user.clone() }];
            Ok((user, events))
        })
    }

    pub fn get(&self, id: &UserId) -> Result<UserProfile, OrgmapError> {
        self.core
            .store
            .users()
            .get(id)?
            .ok_or(OrgmapError::User(UserError::NotFound))
    }

    pub fn get_by_username(&self, username: &str) -> Result<UserProfile, OrgmapError> {
        self.core
            .store
            .users()
            .get_by_username(username)?
            .ok_or(OrgmapError::User(UserError::NotFound))
    }

    pub fn list(&self, active_only: bool) -> Result<Vec<UserProfile>, OrgmapError> {
        Ok(self.core.store.users().list(active_only)?)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        input: UpdateUserInput,
    ) -> Result<UserProfile, OrgmapError> {
        self.core.with_events(ctx, |store| {
            let user = store.users().update(id, input)?;
            let events = vec![EventBody::UserUpdated { user: user.clone() }];
            Ok((user, events))
        })
    }

    pub fn set_primary_org(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        org_id: Option<&OrgId>,
    ) -> Result<UserProfile, OrgmapError> {
        self.core.with_events(ctx, |store| {
            if let Some(org_id) = org_id {
                if store.orgs().get(org_id)?.is_none() {
                    return Err(OrgmapError::Org(OrgError::NotFound));
                }
            }
            store.users().set_primary_org(id, org_id)?;
            let user = store.users().get(id)?.ok_or(UserError::NotFound)?;
            let events = vec![EventBody::UserUpdated { user: user.clone() }];
            Ok((user, events))
        })
    }

    pub fn add_org(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        org_id: &OrgId,
    ) -> Result<(), OrgmapError> {
        self.core.with_events(ctx, |store| {
            if store.users().get(id)?.is_none() {
                return Err(OrgmapError::User(UserError::NotFound));
            }
            if store.orgs().get(org_id)?.is_none() {
                return Err(OrgmapError::Org(OrgError::NotFound));
            }
            store.users().add_org(id, org_id)?;
            let events = vec![EventBody::UserOrgAdded {
                user_id: id.clone(),
                org_id: org_id.clone(),
            }];
            Ok(((), events))
        })
    }

    pub fn remove_org(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        org_id: &OrgId,
    ) -> Result<(), OrgmapError> {
        self.core.with_events(ctx, |store| {
            store.users().remove_org(id, org_id)?;
            let events = vec![EventBody::UserOrgRemoved {
                user_id: id.clone(),
                org_id: org_id.clone(),
            }];
            Ok(((), events))
        })
    }

    /// Primary plus additional memberships, primary first.
    pub fn orgs(&self, user: &UserProfile) -> Result<Vec<Org>, OrgmapError> {
        let orgs = self.core.store.orgs();
        let mut result = Vec::new();
        let mut seen: HashSet<OrgId> = HashSet::new();
        if let Some(primary) = &user.primary_org_id {
            let org = orgs.get(primary)?.ok_or(OrgError::NotFound)?;
            seen.insert(org.id.clone());
            result.push(org);
        }
        for org_id in self.core.store.users().org_ids(&user.id)? {
            if seen.insert(org_id.clone()) {
                result.push(orgs.get(&org_id)?.ok_or(OrgError::NotFound)?);
            }
        }
        Ok(result)
    }

    /// Memberships the user may pick in selection UIs.
    pub fn selectable_orgs(&self, user: &UserProfile) -> Result<Vec<Org>, OrgmapError> {
        Ok(self
            .orgs(user)?
            .into_iter()
            .filter(|org| org.is_selectable_for_user)
            .collect())
    }

    /// Users found in every org (`match_all`) or in any of them.
    pub fn list_by_orgs(
        &self,
        orgs: &[Org],
        match_all: bool,
    ) -> Result<Vec<UserProfile>, OrgmapError> {
        let mut combined: Option<HashMap<UserId, UserProfile>> = None;
        for org in orgs {
            let members: HashMap<UserId, UserProfile> = self
                .core
                .store
                .users()
                .list_by_org(&org.id)?
                .into_iter()
                .map(|user| (user.id.clone(), user))
                .collect();
            combined = Some(match combined {
                None => members,
                Some(mut acc) => {
                    if match_all {
                        acc.retain(|id, _| members.contains_key(id));
                        acc
                    } else {
                        acc.extend(members);
                        acc
                    }
                }
            });
        }
        let mut users: Vec<UserProfile> =
            combined.unwrap_or_default().into_values().collect();
        users.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str(), a.username.as_str()).cmp(&(
                b.last_name.as_str(),
                b.first_name.as_str(),
                b.username.as_str(),
            ))
        });
        Ok(users)
    }
}

pub struct ProjectsApi<'a, S: Store> {
    core: &'a Orgmap<S>,
}

impl<'a, S: Store> ProjectsApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateProjectInput,
    ) -> Result<Project, OrgmapError> {
        self.core.with_events(ctx, |store| {
            if store.projects().get_by_title(&input.title)?.is_some() {
                return Err(OrgmapError::Project(ProjectError::TitleConflict));
            }
            if let Some(org_id) = &input.primary_org_id {
                if store.orgs().get(org_id)?.is_none() {
                    return Err(OrgmapError::Org(OrgError::NotFound));
                }
            }
            let project = store.projects().create(input)?;
            let events = vec![EventBody::ProjectCreated {
                project: project.clone(),
            }];
            Ok((project, events))
        })
    }

    pub fn get(&self, id: &ProjectId) -> Result<Project, OrgmapError> {
        self.core
            .store
            .projects()
            .get(id)?
            .ok_or(OrgmapError::Project(ProjectError::NotFound))
    }

    pub fn get_by_title(&self, title: &str) -> Result<Project, OrgmapError> {
        self.core
            .store
            .projects()
            .get_by_title(title)?
            .ok_or(OrgmapError::Project(ProjectError::NotFound))
    }

    pub fn list(&self) -> Result<Vec<Project>, OrgmapError> {
        Ok(self.core.store.projects().list()?)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &ProjectId,
        input: UpdateProjectInput,
    ) -> Result<Project, OrgmapError> {
        self.core.with_events(ctx, |store| {
            if let Some(Some(org_id)) = &input.primary_org_id {
                if store.orgs().get(org_id)?.is_none() {
                    return Err(OrgmapError::Org(OrgError::NotFound));
                }
            }
            let project = store.projects().update(id, input)?;
            let events = vec![EventBody::ProjectUpdated {
                project: project.clone(),
            }];
            Ok((project, events))
        })
    }

    pub fn add_org(
        &self,
        ctx: &RequestContext,
        id: &ProjectId,
        org_id: &OrgId,
    ) -> Result<(), OrgmapError> {
        self.core.with_events(ctx, |store| {
            if store.projects().get(id)?.is_none() {
                return Err(OrgmapError::Project(ProjectError::NotFound));
            }
            if store.orgs().get(org_id)?.is_none() {
                return Err(OrgmapError::Org(OrgError::NotFound));
            }
            store.projects().add_org(id, org_id)?;
            let events = vec![EventBody::ProjectOrgAdded {
                project_id: id.clone(),
                org_id: org_id.clone(),
            }];
            Ok(((), events))
        })
    }

    pub fn remove_org(
        &self,
        ctx: &RequestContext,
        id: &ProjectId,
        org_id: &OrgId,
    ) -> Result<(), OrgmapError> {
        self.core.with_events(ctx, |store| {
            store.projects().remove_org(id, org_id)?;
            let events = vec![EventBody::ProjectOrgRemoved {
                project_id: id.clone(),
                org_id: org_id.clone(),
            }];
            Ok(((), events))
        })
    }

    /// Projects matched against a set of organizations, see
    /// [`ProjectOrgQuery`] for the knobs.
    pub fn list_by_orgs(
        &self,
        orgs: &[Org],
        query: &ProjectOrgQuery,
    ) -> Result<Vec<Project>, OrgmapError> {
        let orgs_api = self.core.orgs();
        let mut combined: Option<HashMap<ProjectId, Project>> = None;
        for org in orgs {
            let mut targets = vec![org.clone()];
            if query.include_descendants {
                targets.extend(orgs_api.descendants(org)?);
            }
            let mut members: HashMap<ProjectId, Project> = HashMap::new();
            for target in &targets {
                for project in self
                    .core
                    .store
                    .projects()
                    .list_by_org(&target.id, query.primary_only)?
                {
                    members.insert(project.id.clone(), project);
                }
            }
            combined = Some(match combined {
                None => members,
                Some(mut acc) => {
                    if query.match_all {
                        acc.retain(|id, _| members.contains_key(id));
                        acc
                    } else {
                        acc.extend(members);
                        acc
                    }
                }
            });
        }
        let mut projects: Vec<Project> = combined
            .unwrap_or_default()
            .into_values()
            .filter(|project| {
                query.statuses.is_empty() || query.statuses.contains(&project.status)
            })
            .collect();
        projects.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(projects)
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a Orgmap<S>,
}

impl<'a, S: Store> EventsApi<'a, S> {
    pub fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, OrgmapError> {
        self.core.store.events().list(after, limit)
    }
}

fn build_event_record(ctx: &RequestContext, body: EventBody) -> Result<EventRecord, OrgmapError> {
    let value = serde_json::to_value(body).map_err(|err| OrgmapError::Internal {
        message: err.to_string(),
    })?;
    Ok(EventRecord {
        id: String::new(),
        seq: 0,
        at: Utc::now(),
        correlation_id: ctx.correlation_id.clone(),
        source: ctx.source,
        body: value,
    })
}

fn resolve_parent(
    levels: &[OrgLevel],
    parent_name: Option<&str>,
) -> Result<Option<OrgLevel>, OrgmapError> {
    match parent_name {
        Some(name) => {
            let parent = levels
                .iter()
                .find(|level| level.name == name)
                .cloned()
                .ok_or(LevelError::NotFound)?;
            Ok(Some(parent))
        }
        None => Ok(None),
    }
}

fn child_of<'a>(levels: &'a [OrgLevel], id: &LevelId) -> Option<&'a OrgLevel> {
    levels
        .iter()
        .find(|level| level.parent_id.as_ref() == Some(id))
}

fn check_level_conflicts(
    levels: &[OrgLevel],
    input: &CreateLevelInput,
) -> Result<(), OrgmapError> {
    if levels.iter().any(|level| level.name == input.name) {
        return Err(OrgmapError::Level(LevelError::NameConflict));
    }
    if levels.iter().any(|level| level.level == input.level) {
        return Err(OrgmapError::Level(LevelError::LevelValueConflict));
    }
    Ok(())
}

/// Chain check plus a placement sweep over every organization.
fn validate_within<S: Store>(store: &S) -> Result<(), OrgmapError> {
    let levels = store.levels().list()?;
    validate_level_chain(&levels)?;

    let by_id: HashMap<&str, &OrgLevel> = levels
        .iter()
        .map(|level| (level.id.as_str(), level))
        .collect();
    let orgs = store.orgs().list(&OrgFilter::default())?;
    let org_levels: HashMap<&str, &str> = orgs
        .iter()
        .map(|org| (org.id.as_str(), org.level_id.as_str()))
        .collect();
    for org in &orgs {
        let level = by_id
            .get(org.level_id.as_str())
            .ok_or_else(|| OrgmapError::Org(OrgError::InvalidPlacement {
                message: format!("org {} references missing level", org.code),
            }))?;
        let parent_level = match &org.parent_id {
            Some(parent_id) => {
                let parent_level_id = org_levels.get(parent_id.as_str()).ok_or_else(|| {
                    OrgmapError::Org(OrgError::InvalidPlacement {
                        message: format!("org {} references missing parent", org.code),
                    })
                })?;
                Some(*by_id.get(parent_level_id).ok_or_else(|| {
                    OrgmapError::Org(OrgError::InvalidPlacement {
                        message: format!("org {} parent references missing level", org.code),
                    })
                })?)
            }
            None => None,
        };
        validate_org_placement(level, parent_level)?;
    }
    Ok(())
}

fn check_sibling_free<S: Store>(
    store: &S,
    parent_id: Option<&OrgId>,
    exclude: Option<&OrgId>,
    code: &str,
    shortname: Option<&str>,
    longname: Option<&str>,
) -> Result<(), OrgmapError> {
    if !code.is_empty() {
        if let Some(existing) = store.orgs().get_child_by_code(parent_id, code)? {
            if Some(&existing.id) != exclude {
                return Err(OrgmapError::Org(OrgError::SiblingConflict {
                    message: format!("code {code}"),
                }));
            }
        }
    }
    if let Some(shortname) = shortname {
        if let Some(existing) = store.orgs().get_child_by_shortname(parent_id, shortname)? {
            if Some(&existing.id) != exclude {
                return Err(OrgmapError::Org(OrgError::SiblingConflict {
                    message: format!("shortname {shortname}"),
                }));
            }
        }
    }
    if let Some(longname) = longname {
        if let Some(existing) = store.orgs().get_child_by_longname(parent_id, longname)? {
            if Some(&existing.id) != exclude {
                return Err(OrgmapError::Org(OrgError::SiblingConflict {
                    message: format!("longname {longname}"),
                }));
            }
        }
    }
    Ok(())
}

/// Validated organization create, shared by the API and the seeding and
/// placeholder paths.
fn create_org_within<S: Store>(store: &S, input: CreateOrgInput) -> Result<Org, OrgmapError> {
    validate_org_code(&input.code)?;
    let level = store
        .levels()
        .get(&input.level_id)?
        .ok_or(LevelError::NotFound)?;
    let parent_level = match &input.parent_id {
        Some(parent_id) => {
            let parent = store.orgs().get(parent_id)?.ok_or(OrgError::NotFound)?;
            Some(
                store
                    .levels()
                    .get(&parent.level_id)?
                    .ok_or(LevelError::NotFound)?,
            )
        }
        None => None,
    };
    validate_org_placement(&level, parent_level.as_ref())?;

    let shortname = input
        .shortname
        .clone()
        .or_else(|| input.longname.clone())
        .unwrap_or_else(|| input.code.clone());
    let longname = input
        .longname
        .clone()
        .or_else(|| input.shortname.clone())
        .unwrap_or_else(|| input.code.clone());
    check_sibling_free(
        store,
        input.parent_id.as_ref(),
        None,
        &input.code,
        Some(&shortname),
        Some(&longname),
    )?;

    Ok(store.orgs().insert(NewOrg {
        parent_id: input.parent_id,
        level_id: input.level_id,
        code: input.code,
        shortname,
        longname,
        is_selectable_for_user: input.is_selectable_for_user.unwrap_or(true),
        is_selectable_for_project: input.is_selectable_for_project.unwrap_or(true),
    })?)
}

/// Get or create the root placeholder container. Returns whether it was
/// created by this call.
fn placeholder_root<S: Store>(
    store: &S,
    code: &str,
    longname: &str,
) -> Result<(Org, bool), OrgmapError> {
    if let Some(existing) = store.orgs().get_child_by_code(None, code)? {
        return Ok((existing, false));
    }
    let levels = store.levels().list()?;
    let root_level = levels
        .first()
        .ok_or_else(|| OrgmapError::Level(LevelError::BrokenChain {
            message: "no levels defined".to_string(),
        }))?;
    let org = create_org_within(
        store,
        CreateOrgInput {
            parent_id: None,
            level_id: root_level.id.clone(),
            code: code.to_string(),
            shortname: Some(code.to_string()),
            longname: Some(longname.to_string()),
            is_selectable_for_user: None,
            is_selectable_for_project: None,
        },
    )?;
    Ok((org, true))
}

/// Create a placeholder container at a freshly spliced tier and move
/// `children` beneath it.
///
/// The container is first inserted under a transient code: until the
/// children are reparented they are still siblings of the container, so
/// inserting it under its final code/shortname/longname would trip the
/// per-parent uniqueness indexes whenever a child already uses them
/// (the seeded root container does). Once the children have moved, the
/// container is the only remaining sibling and takes its real names.
/// Placement validation is skipped on purpose: the chain is in flux
/// until the surrounding transaction finishes and re-validates.
fn gather_under_placeholder<S: Store>(
    store: &S,
    parent_id: Option<&OrgId>,
    level_id: &LevelId,
    children: &[Org],
    code: &str,
    longname: &str,
) -> Result<Org, OrgmapError> {
    let transient = format!("{code}_{}", ulid::Ulid::new());
    let container = store.orgs().insert(NewOrg {
        parent_id: parent_id.cloned(),
        level_id: level_id.clone(),
        code: transient.clone(),
        shortname: transient.clone(),
        longname: transient,
        is_selectable_for_user: true,
        is_selectable_for_project: true,
    })?;
    for child in children {
        store.orgs().set_parent(&child.id, Some(&container.id))?;
    }
    Ok(store.orgs().update(
        &container.id,
        UpdateOrgInput {
            code: Some(code.to_string()),
            shortname: Some(code.to_string()),
            longname: Some(longname.to_string()),
            is_selectable_for_user: None,
            is_selectable_for_project: None,
        },
    )?)
}

fn sanitize_directory_string(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn add_ancestors_within<S: Store>(store: &S, orgs: &[Org]) -> Result<Vec<Org>, OrgmapError> {
    let repo = store.orgs();
    let mut seen: HashSet<OrgId> = HashSet::new();
    let mut result = Vec::new();
    for org in orgs {
        if seen.insert(org.id.clone()) {
            result.push(org.clone());
        }
        let mut current = org.parent_id.clone();
        while let Some(parent_id) = current {
            let parent = repo.get(&parent_id)?.ok_or(OrgError::NotFound)?;
            current = parent.parent_id.clone();
            if seen.insert(parent.id.clone()) {
                result.push(parent);
            } else {
                break;
            }
        }
    }
    Ok(result)
}

fn convert_strings_within<S: Store>(
    store: &S,
    strings: &[String],
    create_placeholder: bool,
    placeholder_code: &str,
    placeholder_longname: &str,
    events: &mut Vec<EventBody>,
) -> Result<Vec<Org>, OrgmapError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();
    for value in strings {
        if !seen.insert(value.as_str()) {
            continue;
        }
        if let Some(mapping) = store.directory().get_by_string(value)? {
            let org = store.orgs().get(&mapping.org_id)?.ok_or(OrgError::NotFound)?;
            result.push(org);
            continue;
        }
        if !create_placeholder {
            continue;
        }

        let (container, created) =
            placeholder_root(store, placeholder_code, placeholder_longname)?;
        if created {
            events.push(EventBody::OrgCreated {
                org: container.clone(),
            });
        }
        let levels = store.levels().list()?;
        let child_level = levels
            .iter()
            .find(|level| level.parent_id.as_ref() == Some(&container.level_id))
            .ok_or_else(|| OrgmapError::Level(LevelError::BrokenChain {
                message: "no tier below the root to hold placeholder organizations".to_string(),
            }))?;

        let code = sanitize_directory_string(value);
        let org = match store.orgs().get_child_by_code(Some(&container.id), &code)? {
            Some(existing) => existing,
            None => {
                let org = create_org_within(
                    store,
                    CreateOrgInput {
                        parent_id: Some(container.id.clone()),
                        level_id: child_level.id.clone(),
                        code,
                        shortname: Some(value.clone()),
                        longname: Some(value.clone()),
                        is_selectable_for_user: None,
                        is_selectable_for_project: None,
                    },
                )?;
                events.push(EventBody::OrgCreated { org: org.clone() });
                org
            }
        };
        let mapping = store.directory().insert(&org.id, value)?;
        events.push(EventBody::DirectoryMapped { mapping });
        result.push(org);
    }
    Ok(result)
}
