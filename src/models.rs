use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::map_link;

/// Root of the output document: `{"countries": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub countries: Vec<Country>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub provinces: Vec<Province>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Province {
    pub id: String,
    pub name: String,
    pub cliffs: Vec<Cliff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cliff {
    pub id: String,
    pub name: String,
    pub maps: Maps,
    pub sectors: Vec<Sector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    pub name: String,
    pub maps: Maps,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub photos: Vec<String>,
}

/// Coordinates plus the map link derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maps {
    pub latitude: f64,
    pub longitude: f64,
    pub link: String,
}

impl Maps {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            link: map_link(latitude, longitude),
        }
    }
}

/// Node counts per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HierarchySummary {
    pub countries: usize,
    pub regions: usize,
    pub provinces: usize,
    pub cliffs: usize,
    pub sectors: usize,
    pub routes: usize,
}

impl Hierarchy {
    pub fn summary(&self) -> HierarchySummary {
        let mut summary = HierarchySummary {
            countries: self.countries.len(),
            ..Default::default()
        };
        for region in self.countries.iter().flat_map(|c| &c.regions) {
            summary.regions += 1;
            for province in &region.provinces {
                summary.provinces += 1;
                for cliff in &province.cliffs {
                    summary.cliffs += 1;
                    summary.sectors += cliff.sectors.len();
                    summary.routes += cliff.sectors.iter().map(|s| s.routes.len()).sum::<usize>();
                }
            }
        }
        summary
    }
}

/// One flat source row: a route with its full ancestry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRow {
    pub country_id: String,
    pub country_name: String,
    pub region_name: String,
    pub province_name: String,
    pub cliff_name: String,
    pub cliff_latitude: String,
    pub cliff_longitude: String,
    pub sector_name: String,
    pub sector_latitude: String,
    pub sector_longitude: String,
    pub route_name: String,
    pub route_grade: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddCliffRequest {
    #[serde(default)]
    pub region_name: String,
    #[serde(default)]
    pub province_name: String,
    #[serde(default)]
    pub cliff_name: String,
    #[serde(default)]
    pub cliff_latitude: String,
    #[serde(default)]
    pub cliff_longitude: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCliffResponse {
    pub message: String,
    pub cliff_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}
