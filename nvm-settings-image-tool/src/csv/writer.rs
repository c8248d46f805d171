use std::path::Path;

use csv::Writer;

use crate::error::Error;
use crate::RegionImage;

/// Serialize a region image to a CSV file at the given `output_path`.
pub(crate) fn write_csv<P: AsRef<Path>>(image: &RegionImage, output_path: P) -> Result<(), Error> {
    let mut wtr = Writer::from_path(output_path)?;
    write_records(&mut wtr, image)
}

/// Serialize a region image to CSV and return the content as a `String`.
pub(crate) fn write_csv_content(image: &RegionImage) -> Result<String, Error> {
    let mut wtr = Writer::from_writer(Vec::new());
    write_records(&mut wtr, image)?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::InvalidValue(format!("CSV output is not valid UTF-8: {}", e)))
}

fn write_records<W: std::io::Write>(wtr: &mut Writer<W>, image: &RegionImage) -> Result<(), Error> {
    wtr.write_record(["id", "type", "value"])?;

    for entry in &image.entries {
        wtr.write_record([
            entry.id.to_string().as_str(),
            entry.value.type_str(),
            entry.value.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::write_csv_content;
    use crate::{
        ImageEntry,
        RegionImage,
    };

    #[test]
    fn header_only() {
        let image = RegionImage::default();
        assert_eq!(write_csv_content(&image).unwrap(), "id,type,value\n");
    }

    #[test]
    fn entries_in_order() {
        let image = RegionImage {
            entries: vec![
                ImageEntry::new_string(3, "device"),
                ImageEntry::new_integer(1, -5),
            ],
        };

        assert_eq!(
            write_csv_content(&image).unwrap(),
            "id,type,value\n3,string,device\n1,integer,-5\n"
        );
    }

    #[test]
    fn quotes_separators() {
        let image = RegionImage {
            entries: vec![ImageEntry::new_string(1, "a,b")],
        };

        assert_eq!(
            write_csv_content(&image).unwrap(),
            "id,type,value\n1,string,\"a,b\"\n"
        );
    }
}
