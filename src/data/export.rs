use super::model::{Dataset, View};

/// Write the rows of `view` as comma-separated text with a header row.
/// Cells use their display form; nulls become empty fields.
pub fn to_csv(dataset: &Dataset, view: &View) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(dataset.columns().iter().map(|c| c.name.as_str()))?;
    for row in view.iter() {
        writer.write_record(dataset.columns().iter().map(|c| c.values[row].to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    log::info!("exported {} rows as CSV ({} bytes)", view.len(), bytes.len());
    Ok(bytes)
}
