use std::{fs::File, io::Read, path::Path};

use csv::StringRecord;

use crate::{
    error::{AtlasError, Result},
    models::SourceRow,
};

pub const SOURCE_COLUMNS: [&str; 12] = [
    "country_id",
    "country_name",
    "region_name",
    "province_name",
    "cliff_name",
    "cliff_latitude",
    "cliff_longitude",
    "sector_name",
    "sector_latitude",
    "sector_longitude",
    "route_name",
    "route_grade",
];

pub fn require_columns(headers: &StringRecord, expected: &[&str], origin: &Path) -> Result<()> {
    let missing: Vec<String> = expected
        .iter()
        .filter(|column| !headers.iter().any(|h| h.trim() == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AtlasError::Schema {
            path: origin.to_path_buf(),
            missing,
        })
    }
}

/// Reads every source row, preserving file order.
pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<SourceRow>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AtlasError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    rows_from_reader(file, path)
}

pub fn rows_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Vec<SourceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    require_columns(rdr.headers()?, &SOURCE_COLUMNS, origin)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: SourceRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "country_id,country_name,region_name,province_name,cliff_name,\
cliff_latitude,cliff_longitude,sector_name,sector_latitude,sector_longitude,route_name,route_grade";

    #[test]
    fn reads_rows_in_order_with_blank_fields() {
        let data = format!(
            "{HEADER}\n\
             ITA,Italia,Lombardia,Bergamo,Monte Nero,45.1,9.3,Settore 1,,,Via Diretta,6a\n\
             ITA,Italia,Lombardia,Bergamo,Monte Nero,45.1,9.3,Settore 1,,,Via Nuova,6b\n"
        );
        let rows = rows_from_reader(data.as_bytes(), Path::new("inline")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].route_name, "Via Diretta");
        assert_eq!(rows[1].route_grade, "6b");
        assert_eq!(rows[0].sector_latitude, "");
    }

    #[test]
    fn reports_every_missing_column() {
        let data = "country_id,country_name,region_name\nITA,Italia,Lombardia\n";
        let err = rows_from_reader(data.as_bytes(), Path::new("inline")).unwrap_err();
        match err {
            AtlasError::Schema { missing, .. } => {
                assert_eq!(missing.len(), 9);
                assert_eq!(missing[0], "province_name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
