use std::{collections::HashMap, fs::File, io::Read, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{AtlasError, Result},
    source::require_columns,
};

const LOOKUP_COLUMNS: [&str; 4] = ["region_name", "region_id", "province_name", "province_id"];

#[derive(Debug, Deserialize)]
struct LookupRecord {
    region_name: String,
    region_id: String,
    province_name: String,
    province_id: String,
}

/// Region and province name to code mappings, read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    regions: HashMap<String, String>,
    provinces: HashMap<String, String>,
}

impl LookupTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| AtlasError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }

    /// `origin` only labels errors.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        require_columns(rdr.headers()?, &LOOKUP_COLUMNS, origin)?;

        let mut table = Self::default();
        for result in rdr.deserialize() {
            let record: LookupRecord = result?;
            table.regions.insert(record.region_name, record.region_id);
            table.provinces.insert(record.province_name, record.province_id);
        }

        debug!(
            regions = table.regions.len(),
            provinces = table.provinces.len(),
            "Loaded lookup table from {}",
            origin.display()
        );
        Ok(table)
    }

    #[cfg(test)]
    pub fn from_pairs<I, J>(regions: I, provinces: J) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
        J: IntoIterator<Item = (String, String)>,
    {
        Self {
            regions: regions.into_iter().collect(),
            provinces: provinces.into_iter().collect(),
        }
    }

    pub fn region_code(&self, name: &str) -> Option<&str> {
        self.regions.get(name).map(String::as_str)
    }

    pub fn province_code(&self, name: &str) -> Option<&str> {
        self.provinces.get(name).map(String::as_str)
    }

    pub fn sizes(&self) -> (usize, usize) {
        (self.regions.len(), self.provinces.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_both_mappings() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "region_name,region_id,province_name,province_id").unwrap();
        writeln!(file, "Lombardia,LOM,Bergamo,BG").unwrap();
        writeln!(file, "Lombardia,LOM,Lecco,LC").unwrap();
        writeln!(file, "Trentino-Alto Adige,TAA,Trento,TN").unwrap();

        let table = LookupTable::load(file.path()).unwrap();
        assert_eq!(table.region_code("Lombardia"), Some("LOM"));
        assert_eq!(table.region_code("Trentino-Alto Adige"), Some("TAA"));
        assert_eq!(table.province_code("Lecco"), Some("LC"));
        assert_eq!(table.province_code("Milano"), None);
        assert_eq!(table.sizes(), (2, 3));
    }

    #[test]
    fn later_rows_overwrite_earlier_codes() {
        let data = "region_name,region_id,province_name,province_id\n\
                    Lombardia,LOM,Bergamo,BG\n\
                    Lombardia,LMB,Bergamo,BGX\n";
        let table = LookupTable::from_reader(data.as_bytes(), Path::new("inline")).unwrap();
        assert_eq!(table.region_code("Lombardia"), Some("LMB"));
        assert_eq!(table.province_code("Bergamo"), Some("BGX"));
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LookupTable::load(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, AtlasError::FileAccess { .. }));
    }

    #[test]
    fn missing_columns_is_schema_error() {
        let data = "region_name,region_id,province_name\nLombardia,LOM,Bergamo\n";
        let err = LookupTable::from_reader(data.as_bytes(), Path::new("inline")).unwrap_err();
        match err {
            AtlasError::Schema { missing, .. } => assert_eq!(missing, vec!["province_id"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
