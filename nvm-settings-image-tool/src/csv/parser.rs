use nvm_settings::error::Error as SettingsError;
use nvm_settings::Value;

use crate::error::Error;
use crate::image::{
    ImageEntry,
    ImageValue,
};
use crate::RegionImage;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    #[serde(rename = "type")]
    entry_type: String,
    value: String,
}

/// Parse CSV content from a string into a validated [`RegionImage`].
pub(crate) fn parse_csv(content: &str) -> Result<RegionImage, Error> {
    let mut image = RegionImage::default();
    let mut reader = csv::Reader::from_reader(content.as_bytes());

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        image.entries.push(parse_row(row)?);
    }

    image.validate()?;
    Ok(image)
}

fn parse_row(row: CsvRow) -> Result<ImageEntry, Error> {
    let id = row
        .id
        .trim()
        .parse::<i32>()
        .map_err(|_| Error::InvalidId(row.id.clone()))?;

    let value = match Value::parse(row.entry_type.trim(), &row.value) {
        Ok(Value::Integer(v)) => ImageValue::Integer(v),
        Ok(Value::String(s)) => ImageValue::String(s.to_string()),
        Err(SettingsError::UnknownType) => return Err(Error::InvalidType(row.entry_type)),
        Err(_) => {
            return Err(Error::InvalidValue(format!(
                "invalid integer value: {}",
                row.value
            )))
        }
    };

    Ok(ImageEntry { id, value })
}
