//! Renderer-facing output for a reconciled table.

use crate::error::YieldError;
use crate::summary::RegionYieldTable;
use serde::Serialize;

/// Sequential color scale used for yield maps.
pub const COLOR_SCALE: &str = "YlGn";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethRow {
    pub region: String,
    #[serde(rename = "yield")]
    pub value: f64,
}

/// Everything a choropleth renderer needs: title, join key, scale, and values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethPayload {
    pub title: String,
    /// Path of the geometry property the rows join on.
    pub feature_id_key: String,
    pub color_scale: String,
    pub rows: Vec<ChoroplethRow>,
}

impl ChoroplethPayload {
    pub fn new(table: &RegionYieldTable, name_property: &str) -> Self {
        Self {
            title: format!("State-wise Average Yield for {}", table.crop.title()),
            feature_id_key: format!("properties.{name_property}"),
            color_scale: COLOR_SCALE.to_string(),
            rows: table
                .rows
                .iter()
                .map(|r| ChoroplethRow {
                    region: r.region.clone(),
                    value: r.value,
                })
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, YieldError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write `region,yield` rows with a header.
pub fn write_csv<W: std::io::Write>(table: &RegionYieldTable, out: W) -> Result<(), YieldError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["region", "yield"])?;
    for row in &table.rows {
        let value = row.value.to_string();
        writer.write_record([row.region.as_str(), value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::CropType;
    use crate::summary::RegionYield;

    fn table() -> RegionYieldTable {
        RegionYieldTable {
            crop: CropType::Chickpea,
            rows: vec![
                RegionYield {
                    region: "Bihar".into(),
                    value: 2500.0,
                    matched: true,
                    observations: 2,
                },
                RegionYield {
                    region: "Jammu, Kashmir".into(),
                    value: 0.0,
                    matched: false,
                    observations: 0,
                },
            ],
            unmatched_regions: vec![],
        }
    }

    #[test]
    fn test_payload_fields() {
        let payload = ChoroplethPayload::new(&table(), "name");
        assert_eq!(payload.title, "State-wise Average Yield for Chickpea");
        assert_eq!(payload.feature_id_key, "properties.name");
        assert_eq!(payload.color_scale, "YlGn");
        assert_eq!(payload.rows.len(), 2);
    }

    #[test]
    fn test_payload_json_uses_yield_key() {
        let json = ChoroplethPayload::new(&table(), "ST_NM").to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"][0]["yield"], 2500.0);
        assert_eq!(value["feature_id_key"], "properties.ST_NM");
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&table(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "region,yield\nBihar,2500\n\"Jammu, Kashmir\",0\n");
    }
}
