use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::models::Hierarchy;

pub async fn load_document(path: &Path) -> Result<Hierarchy> {
    let raw = fs::read(path)
        .await
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to parse document {}", path.display()))
}

/// A missing file is an empty hierarchy; any other failure is an error.
pub async fn load_or_default(path: &Path) -> Result<Hierarchy> {
    match fs::try_exists(path).await {
        Ok(false) => Ok(Hierarchy::default()),
        Ok(true) => load_document(path).await,
        Err(err) => Err(err).with_context(|| format!("Failed to stat document {}", path.display())),
    }
}

/// Rewrites the whole document as pretty-printed JSON.
pub async fn save_document(path: &Path, hierarchy: &Hierarchy) -> Result<()> {
    ensure_parent_dir(path).await?;
    let body = serde_json::to_vec_pretty(hierarchy).context("Failed to serialize document")?;

    let staging = staging_path(path);
    fs::write(&staging, body)
        .await
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    fs::rename(&staging, path)
        .await
        .with_context(|| format!("Failed to replace document {}", path.display()))
}

async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::HierarchyBuilder,
        lookup::LookupTable,
        models::{AddCliffRequest, SourceRow},
    };

    fn sample() -> Hierarchy {
        let lookup = LookupTable::from_pairs(
            [("Lombardia".to_string(), "LOM".to_string())],
            [("Lecco".to_string(), "LC".to_string())],
        );
        let mut hierarchy = Hierarchy::default();
        let mut builder = HierarchyBuilder::new(&lookup, &mut hierarchy);
        for (sector, route) in [("Sud", "Via del Sole"), ("Sud", "Spigolo"), ("Ovest", "Diedro")] {
            builder
                .apply_row(&SourceRow {
                    country_id: "ITA".to_string(),
                    country_name: "Italia".to_string(),
                    region_name: "Lombardia".to_string(),
                    province_name: "Lecco".to_string(),
                    cliff_name: "Medale".to_string(),
                    cliff_latitude: "45.86".to_string(),
                    cliff_longitude: "9.41".to_string(),
                    sector_name: sector.to_string(),
                    route_name: route.to_string(),
                    route_grade: "6a+".to_string(),
                    ..Default::default()
                })
                .unwrap();
        }
        builder
            .add_cliff(
                "ITA",
                "Italia",
                &AddCliffRequest {
                    region_name: "Lombardia".to_string(),
                    province_name: "Lecco".to_string(),
                    cliff_name: "Corna di Medale".to_string(),
                    cliff_latitude: "45.87".to_string(),
                    cliff_longitude: "9.42".to_string(),
                },
            )
            .unwrap();
        hierarchy
    }

    #[tokio::test]
    async fn save_then_load_reproduces_the_hierarchy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("climbing_spots.json");
        let hierarchy = sample();

        save_document(&path, &hierarchy).await.unwrap();
        let reloaded = load_document(&path).await.unwrap();

        assert_eq!(reloaded, hierarchy);
        assert!(!staging_path(&path).exists());
    }

    #[tokio::test]
    async fn document_uses_nested_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climbing_spots.json");
        save_document(&path, &sample()).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let cliff = &value["countries"][0]["regions"][0]["provinces"][0]["cliffs"][0];
        assert_eq!(cliff["id"], "LC00001");
        assert_eq!(cliff["maps"]["link"], "https://maps.google.com/?q=45.86,9.41");
        assert_eq!(cliff["sectors"][1]["id"], "LC00001B");
        assert_eq!(cliff["sectors"][0]["routes"][1]["id"], "LC00001A0002");
        assert_eq!(cliff["sectors"][0]["routes"][1]["photos"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn missing_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let hierarchy = load_or_default(&dir.path().join("absent.json")).await.unwrap();
        assert!(hierarchy.countries.is_empty());
    }
}
