//! Market calendar payloads.

use super::validation::{Validate, ValidationError, optional};
use crate::db::MarketCalendar;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Body of `POST /api/market-calendars`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MarketCalendarRequest {
    /// Market the day belongs to.
    pub stock_market_id: Uuid,
    /// Calendar date, `YYYY-MM-DD`.
    pub calendar_date: NaiveDate,
    /// Whether the market trades on this date.
    pub is_trading_day: bool,
    /// Whether the session is shortened. Only valid on trading days.
    #[serde(default)]
    pub is_half_day: bool,
    /// Session open, `HH:MM:SS` local exchange time. Required on trading days.
    #[serde(default)]
    pub open_time: Option<NaiveTime>,
    /// Session close, `HH:MM:SS` local exchange time. Required on trading days.
    #[serde(default)]
    pub close_time: Option<NaiveTime>,
    /// Holiday name or note.
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for MarketCalendarRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        optional("description", self.description.as_deref(), 256)?;

        if self.is_trading_day {
            let (Some(open), Some(close)) = (self.open_time, self.close_time) else {
                return Err(ValidationError::Rule(
                    "open_time and close_time are required on trading days".to_string(),
                ));
            };
            if open >= close {
                return Err(ValidationError::Rule(
                    "open_time must be before close_time".to_string(),
                ));
            }
        } else {
            if self.open_time.is_some() || self.close_time.is_some() {
                return Err(ValidationError::Rule(
                    "non-trading days cannot have session times".to_string(),
                ));
            }
            if self.is_half_day {
                return Err(ValidationError::Rule(
                    "a non-trading day cannot be a half day".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Body of `PUT /api/market-calendars/{id}`.
///
/// `row_version` must echo the version the caller last read; a mismatch
/// means someone else changed the day in between and yields 409.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MarketCalendarUpdateRequest {
    /// New contents of the day.
    #[serde(flatten)]
    pub day: MarketCalendarRequest,
    /// Version the change is based on.
    pub row_version: i64,
}

impl Validate for MarketCalendarUpdateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.row_version < 1 {
            return Err(ValidationError::Format {
                field: "row_version",
                expected: "a positive version",
            });
        }
        self.day.validate()
    }
}

/// One day of a market's trading calendar.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarketCalendarResponse {
    /// Entry id.
    pub id: Uuid,
    /// Market the day belongs to.
    pub stock_market_id: Uuid,
    /// Calendar date.
    pub calendar_date: NaiveDate,
    /// Whether the market trades on this date.
    pub is_trading_day: bool,
    /// Whether the session is shortened.
    pub is_half_day: bool,
    /// Session open.
    pub open_time: Option<NaiveTime>,
    /// Session close.
    pub close_time: Option<NaiveTime>,
    /// Holiday name or note.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Concurrency token to send back on update.
    pub row_version: i64,
}

impl From<MarketCalendar> for MarketCalendarResponse {
    fn from(day: MarketCalendar) -> Self {
        Self {
            id: day.meta.id,
            stock_market_id: day.stock_market_id,
            calendar_date: day.calendar_date,
            is_trading_day: day.is_trading_day,
            is_half_day: day.is_half_day,
            open_time: day.open_time,
            close_time: day.close_time,
            description: day.description,
            created_at: day.meta.created_at,
            updated_at: day.meta.updated_at,
            row_version: day.meta.row_version,
        }
    }
}
