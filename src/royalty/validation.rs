use super::models::{MappedRoyalty, RoyaltyRecord};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Field `{field}` must be a number, got \"{value}\"")]
    NotANumber { field: &'static str, value: String },

    #[error("Field `{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("Field `{field}` must be a whole number, got {value}")]
    NotWholeNumber { field: &'static str, value: f64 },

    #[error("Field `{field}` is too large, got {value}")]
    TooLarge { field: &'static str, value: f64 },

    #[error("`{value}` is not a valid value for `{field}`")]
    InvalidVariant { field: &'static str, value: String },
}

/// Per-upload values attached to every record.
#[derive(Debug, Clone)]
pub struct RecordContext<'a> {
    pub date: NaiveDate,
    pub source_file: &'a str,
    pub created_at: i64,
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn non_negative(value: Option<f64>, field: &'static str) -> Result<f64, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

/// Checks a mapped row and turns it into a record ready to be persisted.
pub fn validate(
    mapped: MappedRoyalty,
    id: String,
    context: &RecordContext<'_>,
) -> Result<RoyaltyRecord, ValidationError> {
    let isrc = required_text(mapped.isrc, "isrc")?;
    let song_name = required_text(mapped.song_name, "songName")?;
    let artist_name = required_text(mapped.artist_name, "artistName")?;

    let total_plays = non_negative(mapped.total_plays, "totalPlays")?;
    if total_plays.fract() != 0.0 {
        return Err(ValidationError::NotWholeNumber {
            field: "totalPlays",
            value: total_plays,
        });
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if total_plays >= i64::MAX as f64 {
        return Err(ValidationError::TooLarge {
            field: "totalPlays",
            value: total_plays,
        });
    }
    let royalty = non_negative(mapped.royalty, "royalty")?;

    let country_code = if mapped.platform.has_territory() {
        Some(required_text(mapped.country_code, "countryCode")?)
    } else {
        None
    };

    if let Some(data) = &mapped.platform_data {
        debug_assert_eq!(data.platform(), mapped.platform);
    }

    Ok(RoyaltyRecord {
        id,
        platform: mapped.platform,
        isrc,
        song_name,
        artist_name,
        label: mapped.label.filter(|l| !l.trim().is_empty()),
        total_plays: total_plays as i64,
        royalty,
        country_code,
        platform_data: mapped.platform_data,
        source_file: context.source_file.to_string(),
        processed: false,
        date: context.date,
        created_at: context.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::royalty::models::Platform;

    fn context() -> RecordContext<'static> {
        RecordContext {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            source_file: "report.xlsx",
            created_at: 1_700_000_000,
        }
    }

    fn complete(platform: Platform) -> MappedRoyalty {
        MappedRoyalty {
            isrc: Some("INA012300001".to_string()),
            song_name: Some("Song".to_string()),
            artist_name: Some("Artist".to_string()),
            label: Some("Label".to_string()),
            total_plays: Some(100.0),
            royalty: Some(2.75),
            country_code: Some("IN".to_string()),
            ..MappedRoyalty::empty(platform)
        }
    }

    #[test]
    fn complete_row_becomes_record() {
        let record = validate(complete(Platform::AppleMusic), "r1".to_string(), &context()).unwrap();
        assert_eq!(record.id, "r1");
        assert_eq!(record.total_plays, 100);
        assert_eq!(record.royalty, 2.75);
        assert_eq!(record.country_code.as_deref(), Some("IN"));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(record.source_file, "report.xlsx");
        assert!(!record.processed);
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let mut mapped = complete(Platform::Spotify);
        mapped.artist_name = Some("   ".to_string());
        assert_eq!(
            validate(mapped, "r".to_string(), &context()),
            Err(ValidationError::MissingField("artistName"))
        );

        let mut mapped = complete(Platform::Spotify);
        mapped.royalty = None;
        assert_eq!(
            validate(mapped, "r".to_string(), &context()),
            Err(ValidationError::MissingField("royalty"))
        );

        let mut mapped = complete(Platform::TikTok);
        mapped.country_code = None;
        assert_eq!(
            validate(mapped, "r".to_string(), &context()),
            Err(ValidationError::MissingField("countryCode"))
        );
    }

    #[test]
    fn territory_is_not_required_without_a_territory_column() {
        for platform in [Platform::Ganna, Platform::JioSaavn] {
            let mut mapped = complete(platform);
            mapped.country_code = None;
            let record = validate(mapped, "r".to_string(), &context()).unwrap();
            assert_eq!(record.country_code, None);
        }
    }

    #[test]
    fn negative_and_fractional_amounts_are_rejected() {
        let mut mapped = complete(Platform::Ganna);
        mapped.royalty = Some(-0.01);
        assert_eq!(
            validate(mapped, "r".to_string(), &context()),
            Err(ValidationError::Negative {
                field: "royalty",
                value: -0.01
            })
        );

        let mut mapped = complete(Platform::Ganna);
        mapped.total_plays = Some(1.5);
        assert!(matches!(
            validate(mapped, "r".to_string(), &context()),
            Err(ValidationError::NotWholeNumber { .. })
        ));
    }

    #[test]
    fn plays_beyond_integer_range_are_rejected() {
        let mut mapped = complete(Platform::Ganna);
        mapped.total_plays = Some(1e30);
        assert_eq!(
            validate(mapped, "r".to_string(), &context()),
            Err(ValidationError::TooLarge {
                field: "totalPlays",
                value: 1e30
            })
        );

        let mut mapped = complete(Platform::Ganna);
        mapped.total_plays = Some(9_007_199_254_740_992.0);
        let record = validate(mapped, "r".to_string(), &context()).unwrap();
        assert_eq!(record.total_plays, 9_007_199_254_740_992);
    }

    #[test]
    fn blank_label_is_dropped() {
        let mut mapped = complete(Platform::Ganna);
        mapped.label = Some(" ".to_string());
        let record = validate(mapped, "r".to_string(), &context()).unwrap();
        assert_eq!(record.label, None);
    }

    #[test]
    fn zero_values_are_accepted() {
        let mut mapped = complete(Platform::YouTube);
        mapped.total_plays = Some(0.0);
        mapped.royalty = Some(0.0);
        let record = validate(mapped, "r".to_string(), &context()).unwrap();
        assert_eq!(record.total_plays, 0);
        assert_eq!(record.royalty, 0.0);
    }
}
