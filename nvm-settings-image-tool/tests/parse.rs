use nvm_settings::error::Error as SettingsError;
use nvm_settings_image_tool::{
    Error,
    ImageEntry,
    ImageValue,
    RegionImage,
};

mod image {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_erased_image_is_empty() {
        let image = RegionImage::parse_image(&[0xFF; 256]).unwrap();
        assert!(image.entries.is_empty());
    }

    #[test]
    fn test_parse_generated_image() {
        let original = RegionImage::from_csv_file("tests/assets/basic.csv").unwrap();
        let data = original.generate_image(256).unwrap();

        let parsed = RegionImage::parse_image(&data).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_integers_come_first() {
        let original = RegionImage {
            entries: vec![
                ImageEntry::new_string(1, "s"),
                ImageEntry::new_integer(2, 2),
            ],
        };
        let data = original.generate_image(64).unwrap();

        let parsed = RegionImage::parse_image(&data).unwrap();
        assert_eq!(
            parsed.entries,
            vec![ImageEntry::new_integer(2, 2), ImageEntry::new_string(1, "s")]
        );
    }

    #[test]
    fn test_malformed_image() {
        // claims nine integers
        let mut data = vec![9, 0, 0, 0, 0, 0, 0, 0];
        data.resize(256, 0xFF);

        assert!(matches!(
            RegionImage::parse_image(&data),
            Err(Error::Settings(SettingsError::MalformedBuffer))
        ));
        assert!(matches!(
            RegionImage::parse_image(&[0; 4]),
            Err(Error::Settings(SettingsError::MalformedBuffer))
        ));
    }
}

mod csv {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(rows: &str) -> Result<RegionImage, Error> {
        RegionImage::from_csv(&format!("id,type,value\n{rows}"))
    }

    #[test]
    fn test_types() {
        let image = parse("1,integer, 17 \n2,string, padded \n").unwrap();

        assert_eq!(image.entries[0].value, ImageValue::Integer(17));
        assert_eq!(image.entries[1].value, ImageValue::String(" padded ".to_string()));
    }

    #[test]
    fn test_same_id_in_both_kinds() {
        let image = parse("1,integer,1\n1,string,one\n").unwrap();
        assert_eq!(image.entries.len(), 2);
    }

    #[test]
    fn test_invalid_id() {
        assert!(matches!(parse("x,integer,1\n"), Err(Error::InvalidId(id)) if id == "x"));
        assert!(matches!(parse("-1,integer,1\n"), Err(Error::InvalidId(id)) if id == "-1"));
    }

    #[test]
    fn test_invalid_type() {
        assert!(matches!(
            parse("1,float,1.5\n"),
            Err(Error::InvalidType(t)) if t == "float"
        ));
    }

    #[test]
    fn test_invalid_integer() {
        assert!(matches!(parse("1,integer,ten\n"), Err(Error::InvalidValue(_))));
        assert!(matches!(
            parse("1,integer,2147483648\n"),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_string_too_long() {
        assert!(matches!(
            parse("1,string,twenty characters!!!\n"),
            Err(Error::InvalidValue(_))
        ));
        assert!(parse("1,string,nineteen characters\n").is_ok());
    }

    #[test]
    fn test_duplicate_id() {
        assert!(matches!(
            parse("1,integer,1\n1,integer,2\n"),
            Err(Error::DuplicateId {
                kind: "integer",
                id: 1
            })
        ));
    }

    #[test]
    fn test_too_many_entries() {
        let rows: String = (0..6).map(|id| format!("{id},string,v\n")).collect();

        assert!(matches!(
            parse(&rows),
            Err(Error::TooManyEntries("string"))
        ));
    }

    #[test]
    fn test_missing_column() {
        assert!(matches!(
            RegionImage::from_csv("id,type\n1,integer\n"),
            Err(Error::CsvError(_))
        ));
    }
}
