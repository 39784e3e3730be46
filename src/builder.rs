//! Folds flat rows (or single add requests) into the nested hierarchy.
//!
//! Countries, regions and provinces are keyed by external code. Cliffs, sectors
//! and routes get ordinal ids and are reused only when the most recently created
//! sibling carries the same name, so rows describing one cliff must be contiguous.
//! A name repeated after a different sibling was created becomes a new node.

use std::fmt;

use tracing::debug;

use crate::{
    error::{AtlasError, Result},
    ids,
    lookup::LookupTable,
    models::{
        AddCliffRequest, Cliff, Country, Hierarchy, Maps, Province, Region, Route, Sector,
        SourceRow,
    },
};

/// What to do when a region or province name has no code in the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Drop the rest of the row below the unresolved level. Batch conversion.
    SkipOnUnresolved,
    /// Reject the whole request with a validation error. Interactive add.
    FailOnUnresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Region,
    Province,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region => f.write_str("region"),
            Self::Province => f.write_str("province"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Applied,
    Skipped(Level),
}

trait Node {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! impl_node {
    ($($ty:ty),*) => {
        $(impl Node for $ty {
            fn id(&self) -> &str {
                &self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_node!(Country, Region, Province, Cliff, Sector, Route);

pub struct HierarchyBuilder<'a> {
    lookup: &'a LookupTable,
    hierarchy: &'a mut Hierarchy,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(lookup: &'a LookupTable, hierarchy: &'a mut Hierarchy) -> Self {
        Self { lookup, hierarchy }
    }

    /// Batch path: fold one source row. Unknown region or province names skip
    /// the remainder of the row; nodes created above that point are kept.
    pub fn apply_row(&mut self, row: &SourceRow) -> Result<RowOutcome> {
        let lookup = self.lookup;
        let policy = ResolutionPolicy::SkipOnUnresolved;
        let country = select_or_insert(&mut self.hierarchy.countries, &row.country_id, || {
            Country {
                id: row.country_id.clone(),
                name: row.country_name.clone(),
                regions: Vec::new(),
            }
        })?;

        let region_code = lookup.region_code(&row.region_name);
        let Some(region_id) = resolve(Level::Region, &row.region_name, region_code, policy)? else {
            debug!(region = %row.region_name, "Skipping row: unknown region");
            return Ok(RowOutcome::Skipped(Level::Region));
        };
        let region = select_or_insert(&mut country.regions, region_id, || Region {
            id: region_id.to_string(),
            name: row.region_name.clone(),
            provinces: Vec::new(),
        })?;

        let province_code = lookup.province_code(&row.province_name);
        let Some(province_id) = resolve(Level::Province, &row.province_name, province_code, policy)?
        else {
            debug!(province = %row.province_name, "Skipping row: unknown province");
            return Ok(RowOutcome::Skipped(Level::Province));
        };
        let province = select_or_insert(&mut region.provinces, province_id, || Province {
            id: province_id.to_string(),
            name: row.province_name.clone(),
            cliffs: Vec::new(),
        })?;

        let cliff_name = row.cliff_name.trim();
        if cliff_name.is_empty() {
            return Ok(RowOutcome::Applied);
        }
        let province_id = province.id.clone();
        let cliff = create_or_reuse(&mut province.cliffs, cliff_name, |count| {
            Ok(Cliff {
                id: ids::cliff_id(&province_id, count + 1),
                name: cliff_name.to_string(),
                maps: Maps::new(
                    parse_coordinate("cliff_latitude", &row.cliff_latitude)?,
                    parse_coordinate("cliff_longitude", &row.cliff_longitude)?,
                ),
                sectors: Vec::new(),
            })
        })?;

        let sector_name = row.sector_name.trim();
        if sector_name.is_empty() {
            return Ok(RowOutcome::Applied);
        }
        let cliff_id = cliff.id.clone();
        let sector = create_or_reuse(&mut cliff.sectors, sector_name, |count| {
            Ok(Sector {
                id: ids::sector_id(&cliff_id, count),
                name: sector_name.to_string(),
                maps: Maps::new(
                    parse_optional_coordinate("sector_latitude", &row.sector_latitude)?,
                    parse_optional_coordinate("sector_longitude", &row.sector_longitude)?,
                ),
                routes: Vec::new(),
            })
        })?;

        let route_name = row.route_name.trim();
        if route_name.is_empty() {
            return Ok(RowOutcome::Applied);
        }
        let sector_id = sector.id.clone();
        create_or_reuse(&mut sector.routes, route_name, |count| {
            Ok(Route {
                id: ids::route_id(&sector_id, count + 1),
                name: route_name.to_string(),
                grade: row.route_grade.clone(),
                photos: Vec::new(),
            })
        })?;

        Ok(RowOutcome::Applied)
    }

    /// Incremental path: always creates one new cliff under the resolved
    /// province and returns its id. Every input is validated before the
    /// hierarchy is touched, so a rejected request leaves it unchanged.
    pub fn add_cliff(
        &mut self,
        country_id: &str,
        country_name: &str,
        request: &AddCliffRequest,
    ) -> Result<String> {
        let cliff_name = request.cliff_name.trim();
        if cliff_name.is_empty() {
            return Err(AtlasError::Validation("cliff_name must not be empty".to_string()));
        }
        let maps = Maps::new(
            parse_coordinate("cliff_latitude", &request.cliff_latitude)?,
            parse_coordinate("cliff_longitude", &request.cliff_longitude)?,
        );

        let lookup = self.lookup;
        let policy = ResolutionPolicy::FailOnUnresolved;
        let region_id = resolve(
            Level::Region,
            &request.region_name,
            lookup.region_code(&request.region_name),
            policy,
        )?
        .ok_or_else(|| unresolved(Level::Region, &request.region_name))?;
        let province_id = resolve(
            Level::Province,
            &request.province_name,
            lookup.province_code(&request.province_name),
            policy,
        )?
        .ok_or_else(|| unresolved(Level::Province, &request.province_name))?;

        let country = select_or_insert(&mut self.hierarchy.countries, country_id, || Country {
            id: country_id.to_string(),
            name: country_name.to_string(),
            regions: Vec::new(),
        })?;
        let region = select_or_insert(&mut country.regions, region_id, || Region {
            id: region_id.to_string(),
            name: request.region_name.clone(),
            provinces: Vec::new(),
        })?;
        let province = select_or_insert(&mut region.provinces, province_id, || Province {
            id: province_id.to_string(),
            name: request.province_name.clone(),
            cliffs: Vec::new(),
        })?;

        let cliff_id = ids::cliff_id(&province.id, province.cliffs.len() + 1);
        province.cliffs.push(Cliff {
            id: cliff_id.clone(),
            name: cliff_name.to_string(),
            maps,
            sectors: Vec::new(),
        });
        debug!(cliff_id = %cliff_id, "Added cliff");
        Ok(cliff_id)
    }
}

fn resolve<'t>(
    level: Level,
    name: &str,
    code: Option<&'t str>,
    policy: ResolutionPolicy,
) -> Result<Option<&'t str>> {
    match (code, policy) {
        (Some(code), _) => Ok(Some(code)),
        (None, ResolutionPolicy::SkipOnUnresolved) => Ok(None),
        (None, ResolutionPolicy::FailOnUnresolved) => Err(unresolved(level, name)),
    }
}

fn unresolved(level: Level, name: &str) -> AtlasError {
    AtlasError::Validation(format!("Unknown {level} name: {name:?}"))
}

/// Appends a node keyed by external id if absent, then selects it by id.
fn select_or_insert<'c, T: Node>(
    children: &'c mut Vec<T>,
    id: &str,
    make: impl FnOnce() -> T,
) -> Result<&'c mut T> {
    if !children.iter().any(|c| c.id() == id) {
        let node = make();
        debug!(id = %node.id(), name = %node.name(), "Created node");
        children.push(node);
    }
    select(children, id)
}

/// Reuses the most recent sibling when its name matches, otherwise appends a
/// node built from the count of existing siblings. The result is selected by id.
fn create_or_reuse<'c, T: Node>(
    children: &'c mut Vec<T>,
    name: &str,
    make: impl FnOnce(usize) -> Result<T>,
) -> Result<&'c mut T> {
    let candidate = match children.last() {
        Some(last) if last.name() == name => last.id().to_string(),
        _ => {
            let node = make(children.len())?;
            let id = node.id().to_string();
            debug!(id = %id, name = %name, "Created node");
            children.push(node);
            id
        }
    };
    select(children, &candidate)
}

fn select<'c, T: Node>(children: &'c mut [T], id: &str) -> Result<&'c mut T> {
    let mut matches = children.iter_mut().filter(|c| c.id() == id);
    match (matches.next(), matches.next()) {
        (Some(node), None) => Ok(node),
        (None, _) => Err(AtlasError::LookupInconsistency(format!("no node with id {id}"))),
        (Some(_), Some(_)) => Err(AtlasError::LookupInconsistency(format!(
            "duplicate node id {id}"
        ))),
    }
}

/// Non-finite values are rejected: JSON has no representation for them.
fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| AtlasError::InvalidCoordinate {
            field,
            value: raw.to_string(),
        })
}

fn parse_optional_coordinate(field: &'static str, raw: &str) -> Result<f64> {
    if raw.trim().is_empty() {
        Ok(0.0)
    } else {
        parse_coordinate(field, raw)
    }
}
