use crate::model::ShiftRecord;
use anyhow::Context;
use csv::WriterBuilder;
use std::fs;
use std::path::Path;

/// Export JSON des services (jolie mise en forme)
pub fn export_shifts_json<P: AsRef<Path>>(path: P, shifts: &[ShiftRecord]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let s = serde_json::to_string_pretty(shifts)?;
    fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Export CSV des services: header `id,date,taxi_id,shift,driver_type`
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, shifts: &[ShiftRecord]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_path(path)?;
    w.write_record(["id", "date", "taxi_id", "shift", "driver_type"])?;
    for s in shifts {
        let date = s.date.format("%Y-%m-%d").to_string();
        w.write_record([
            s.id.as_str(),
            date.as_str(),
            s.taxi_id.as_str(),
            s.shift.as_str(),
            s.driver_type.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
