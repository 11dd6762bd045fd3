//! Database schema types.

use super::repository::{Record, SqlValue};
use crate::auth::Role;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit header shared by every entity table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AuditMeta {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// User that created the record.
    pub created_by: Uuid,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// User that last updated the record.
    pub updated_by: Option<Uuid>,
    /// Soft delete flag.
    pub is_deleted: bool,
    /// Soft delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// User that deleted the record.
    pub deleted_by: Option<Uuid>,
    /// Optimistic concurrency token, incremented on every write.
    pub row_version: i64,
}

impl AuditMeta {
    /// Header for a row about to be inserted.
    #[must_use]
    pub fn new(tenant_id: Uuid, created_by: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            created_at: now,
            created_by,
            updated_at: None,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            row_version: 1,
        }
    }

    /// Stamps an update.
    pub fn touch(&mut self, actor: Uuid, now: DateTime<Utc>) {
        self.updated_at = Some(now);
        self.updated_by = Some(actor);
    }

    /// Stamps a soft delete.
    pub fn mark_deleted(&mut self, actor: Uuid, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = Some(actor);
        self.row_version += 1;
    }
}

fn lower(value: &str) -> String {
    value.to_lowercase()
}

// ============================================================================
// Reference Data
// ============================================================================

/// Country record.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Country {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Country name.
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub iso_code: String,
    /// ISO 3166-1 alpha-3 code.
    pub iso3_code: Option<String>,
    /// ISO 4217 currency code.
    pub currency_code: Option<String>,
    /// Whether the country is selectable.
    pub is_active: bool,
}

impl Record for Country {
    const KIND: &'static str = "Country";
    const TABLE: &'static str = "countries";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["iso_code"];
    const SEARCH_COLUMN: &'static str = "name";
    const ORDER_BY: &'static str = "lower(name)";
    const ACTIVE_COLUMN: Option<&'static str> = Some("is_active");

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![self.iso_code.clone()]
    }

    fn search_text(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self) -> String {
        lower(&self.name)
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(self.name.clone())),
            ("iso_code", SqlValue::Text(self.iso_code.clone())),
            ("iso3_code", SqlValue::OptText(self.iso3_code.clone())),
            ("currency_code", SqlValue::OptText(self.currency_code.clone())),
            ("is_active", SqlValue::Bool(self.is_active)),
        ]
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Exchange record.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Exchange {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Exchange name.
    pub name: String,
    /// ISO 10383 market identifier code.
    pub code: String,
    /// Country the exchange operates in.
    pub country_id: Uuid,
    /// IANA time zone name.
    pub timezone: String,
    /// Public website.
    pub website: Option<String>,
    /// Whether the exchange is selectable.
    pub is_active: bool,
}

impl Record for Exchange {
    const KIND: &'static str = "Exchange";
    const TABLE: &'static str = "exchanges";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["code"];
    const SEARCH_COLUMN: &'static str = "name";
    const ORDER_BY: &'static str = "lower(name)";
    const PARENT_COLUMN: Option<&'static str> = Some("country_id");
    const ACTIVE_COLUMN: Option<&'static str> = Some("is_active");

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![self.code.clone()]
    }

    fn search_text(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self) -> String {
        lower(&self.name)
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(self.name.clone())),
            ("code", SqlValue::Text(self.code.clone())),
            ("country_id", SqlValue::Uuid(self.country_id)),
            ("timezone", SqlValue::Text(self.timezone.clone())),
            ("website", SqlValue::OptText(self.website.clone())),
            ("is_active", SqlValue::Bool(self.is_active)),
        ]
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.country_id)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Sector record.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Sector {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Sector name.
    pub name: String,
    /// Optional classification code (e.g. GICS).
    pub code: Option<String>,
    /// Free text description.
    pub description: Option<String>,
}

impl Record for Sector {
    const KIND: &'static str = "Sector";
    const TABLE: &'static str = "sectors";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["name"];
    const SEARCH_COLUMN: &'static str = "name";
    const ORDER_BY: &'static str = "lower(name)";

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn search_text(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self) -> String {
        lower(&self.name)
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(self.name.clone())),
            ("code", SqlValue::OptText(self.code.clone())),
            ("description", SqlValue::OptText(self.description.clone())),
        ]
    }
}

/// Industry record.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Industry {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Industry name.
    pub name: String,
    /// Optional classification code.
    pub code: Option<String>,
    /// Parent sector.
    pub sector_id: Uuid,
    /// Free text description.
    pub description: Option<String>,
}

impl Record for Industry {
    const KIND: &'static str = "Industry";
    const TABLE: &'static str = "industries";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["name"];
    const SEARCH_COLUMN: &'static str = "name";
    const ORDER_BY: &'static str = "lower(name)";
    const PARENT_COLUMN: Option<&'static str> = Some("sector_id");

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn search_text(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self) -> String {
        lower(&self.name)
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(self.name.clone())),
            ("code", SqlValue::OptText(self.code.clone())),
            ("sector_id", SqlValue::Uuid(self.sector_id)),
            ("description", SqlValue::OptText(self.description.clone())),
        ]
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.sector_id)
    }
}

/// Classification tag record.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ClassificationTag {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Tag name.
    pub name: String,
    /// Grouping the tag belongs to (e.g. "style", "theme").
    pub category: String,
    /// Free text description.
    pub description: Option<String>,
    /// Display color, `#RRGGBB`.
    pub color: Option<String>,
}

impl Record for ClassificationTag {
    const KIND: &'static str = "ClassificationTag";
    const TABLE: &'static str = "classification_tags";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["category", "name"];
    const SEARCH_COLUMN: &'static str = "name";
    const ORDER_BY: &'static str = "lower(category), lower(name)";

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![self.category.clone(), self.name.clone()]
    }

    fn search_text(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self) -> String {
        format!("{}\u{0}{}", lower(&self.category), lower(&self.name))
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(self.name.clone())),
            ("category", SqlValue::Text(self.category.clone())),
            ("description", SqlValue::OptText(self.description.clone())),
            ("color", SqlValue::OptText(self.color.clone())),
        ]
    }
}

/// Stock market (trading segment of an exchange) record.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StockMarket {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Market name.
    pub name: String,
    /// Market code.
    pub code: String,
    /// Exchange hosting the market.
    pub exchange_id: Uuid,
    /// Trading currency, ISO 4217.
    pub currency_code: String,
    /// Whether the market is selectable.
    pub is_active: bool,
}

impl Record for StockMarket {
    const KIND: &'static str = "StockMarket";
    const TABLE: &'static str = "stock_markets";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["code"];
    const SEARCH_COLUMN: &'static str = "name";
    const ORDER_BY: &'static str = "lower(name)";
    const PARENT_COLUMN: Option<&'static str> = Some("exchange_id");
    const ACTIVE_COLUMN: Option<&'static str> = Some("is_active");

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![self.code.clone()]
    }

    fn search_text(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self) -> String {
        lower(&self.name)
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(self.name.clone())),
            ("code", SqlValue::Text(self.code.clone())),
            ("exchange_id", SqlValue::Uuid(self.exchange_id)),
            ("currency_code", SqlValue::Text(self.currency_code.clone())),
            ("is_active", SqlValue::Bool(self.is_active)),
        ]
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.exchange_id)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// One day of a stock market's trading calendar.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MarketCalendar {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Market the day belongs to.
    pub stock_market_id: Uuid,
    /// Calendar date.
    pub calendar_date: NaiveDate,
    /// Whether the market trades on this date.
    pub is_trading_day: bool,
    /// Whether the session is shortened.
    pub is_half_day: bool,
    /// Session open, local exchange time.
    pub open_time: Option<NaiveTime>,
    /// Session close, local exchange time.
    pub close_time: Option<NaiveTime>,
    /// Holiday name or note.
    pub description: Option<String>,
}

impl Record for MarketCalendar {
    const KIND: &'static str = "MarketCalendar";
    const TABLE: &'static str = "market_calendars";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["stock_market_id", "calendar_date"];
    const SEARCH_COLUMN: &'static str = "description";
    const ORDER_BY: &'static str = "calendar_date";
    const PARENT_COLUMN: Option<&'static str> = Some("stock_market_id");
    const DATE_COLUMN: Option<&'static str> = Some("calendar_date");

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![
            self.stock_market_id.to_string(),
            self.calendar_date.format("%Y-%m-%d").to_string(),
        ]
    }

    fn search_text(&self) -> String {
        self.description.clone().unwrap_or_default()
    }

    fn sort_key(&self) -> String {
        self.calendar_date.format("%Y-%m-%d").to_string()
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("stock_market_id", SqlValue::Uuid(self.stock_market_id)),
            ("calendar_date", SqlValue::Date(self.calendar_date)),
            ("is_trading_day", SqlValue::Bool(self.is_trading_day)),
            ("is_half_day", SqlValue::Bool(self.is_half_day)),
            ("open_time", SqlValue::OptTime(self.open_time)),
            ("close_time", SqlValue::OptTime(self.close_time)),
            ("description", SqlValue::OptText(self.description.clone())),
        ]
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.stock_market_id)
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.calendar_date)
    }
}

// ============================================================================
// Users and Quotes
// ============================================================================

/// Application user.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Login name, unique across tenants.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Name shown in the UI.
    pub display_name: Option<String>,
    /// Role.
    #[sqlx(try_from = "String")]
    pub role: Role,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Inactive users cannot sign in.
    pub is_active: bool,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Record for User {
    const KIND: &'static str = "User";
    const TABLE: &'static str = "users";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["username"];
    const TENANT_SCOPED_UNIQUE: bool = false;
    const SEARCH_COLUMN: &'static str = "username";
    const ORDER_BY: &'static str = "lower(username)";
    const ACTIVE_COLUMN: Option<&'static str> = Some("is_active");

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![self.username.clone()]
    }

    fn search_text(&self) -> String {
        self.username.clone()
    }

    fn sort_key(&self) -> String {
        lower(&self.username)
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("username", SqlValue::Text(self.username.clone())),
            ("email", SqlValue::Text(self.email.clone())),
            ("display_name", SqlValue::OptText(self.display_name.clone())),
            ("role", SqlValue::Text(self.role.as_str().to_string())),
            ("is_active", SqlValue::Bool(self.is_active)),
        ]
    }

    fn credential_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("password_hash", SqlValue::Text(self.password_hash.clone())),
            ("last_login_at", SqlValue::OptTimestamp(self.last_login_at)),
        ]
    }

    fn carry_credentials(&mut self, stored: &Self) {
        self.password_hash.clone_from(&stored.password_hash);
        self.last_login_at = stored.last_login_at;
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Motivational quote.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Quote {
    /// Audit header.
    #[sqlx(flatten)]
    pub meta: AuditMeta,
    /// Quote text.
    pub text: String,
    /// Attributed author.
    pub author: Option<String>,
    /// Theme, e.g. "discipline".
    pub category: Option<String>,
    /// Only active quotes are served by the random and daily endpoints.
    pub is_active: bool,
}

impl Record for Quote {
    const KIND: &'static str = "Quote";
    const TABLE: &'static str = "quotes";
    const UNIQUE_COLUMNS: &'static [&'static str] = &["text"];
    const SEARCH_COLUMN: &'static str = "text";
    const ORDER_BY: &'static str = "lower(text)";
    const ACTIVE_COLUMN: Option<&'static str> = Some("is_active");

    fn meta(&self) -> &AuditMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut AuditMeta {
        &mut self.meta
    }

    fn unique_key(&self) -> Vec<String> {
        vec![self.text.clone()]
    }

    fn search_text(&self) -> String {
        self.text.clone()
    }

    fn sort_key(&self) -> String {
        lower(&self.text)
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("text", SqlValue::Text(self.text.clone())),
            ("author", SqlValue::OptText(self.author.clone())),
            ("category", SqlValue::OptText(self.category.clone())),
            ("is_active", SqlValue::Bool(self.is_active)),
        ]
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Stored refresh token. The raw value is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RefreshToken {
    /// Unique identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// SHA-256 of the raw token, hex.
    pub token_hash: String,
    /// Issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Revocation timestamp.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Token issued when this one was rotated.
    pub replaced_by: Option<Uuid>,
}

impl RefreshToken {
    /// Whether the token can still be exchanged at `now`.
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn calendar_day() -> MarketCalendar {
        MarketCalendar {
            meta: AuditMeta::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now()),
            stock_market_id: Uuid::new_v4(),
            calendar_date: NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
            is_trading_day: true,
            is_half_day: true,
            open_time: NaiveTime::from_hms_opt(9, 30, 0),
            close_time: NaiveTime::from_hms_opt(13, 0, 0),
            description: Some("Christmas Eve".to_string()),
        }
    }

    #[test]
    fn test_audit_meta_new() {
        let tenant = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let meta = AuditMeta::new(tenant, actor, Utc::now());

        assert_eq!(meta.tenant_id, tenant);
        assert_eq!(meta.created_by, actor);
        assert_eq!(meta.row_version, 1);
        assert!(!meta.is_deleted);
        assert!(meta.updated_at.is_none());
    }

    #[test]
    fn test_audit_meta_touch_and_delete() {
        let mut meta = AuditMeta::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        let actor = Uuid::new_v4();
        let now = Utc::now();

        meta.touch(actor, now);
        assert_eq!(meta.updated_by, Some(actor));
        assert_eq!(meta.updated_at, Some(now));

        meta.mark_deleted(actor, now);
        assert!(meta.is_deleted);
        assert_eq!(meta.deleted_by, Some(actor));
        assert_eq!(meta.row_version, 2);
    }

    #[test]
    fn test_calendar_unique_key_matches_columns() {
        let day = calendar_day();
        let key = day.unique_key();

        assert_eq!(key.len(), MarketCalendar::UNIQUE_COLUMNS.len());
        assert_eq!(key[0], day.stock_market_id.to_string());
        assert_eq!(key[1], "2025-12-24");
        assert_eq!(day.sort_key(), "2025-12-24");
        assert_eq!(day.parent_id(), Some(day.stock_market_id));
    }

    #[test]
    fn test_column_values_cover_data_columns() {
        let day = calendar_day();
        let columns: Vec<&str> = day.column_values().iter().map(|(c, _)| *c).collect();
        assert!(columns.contains(&"calendar_date"));
        assert!(!columns.contains(&"row_version"));
        assert!(!columns.contains(&"id"));
    }

    #[test]
    fn test_classification_tag_sort_key_groups_by_category() {
        let meta = AuditMeta::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        let tag = |category: &str, name: &str| ClassificationTag {
            meta: meta.clone(),
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            color: None,
        };

        assert!(tag("esg", "Zeta").sort_key() < tag("style", "Alpha").sort_key());
        assert_eq!(tag("style", "Value").unique_key(), vec!["style", "Value"]);
    }

    #[test]
    fn test_user_role_column_uses_wire_name() {
        let user = User {
            meta: AuditMeta::new(Uuid::new_v4(), Uuid::nil(), Utc::now()),
            username: "ops".to_string(),
            email: "ops@example.com".to_string(),
            display_name: None,
            role: Role::Trader,
            password_hash: "hash".to_string(),
            is_active: true,
            last_login_at: None,
        };

        let values = user.column_values();
        let role = values.iter().find(|(c, _)| *c == "role").unwrap();
        assert_eq!(role.1, SqlValue::Text("trader".to_string()));
        assert!(!User::TENANT_SCOPED_UNIQUE);
    }

    #[test]
    fn test_user_credentials_not_in_update_columns() {
        let mut user = User {
            meta: AuditMeta::new(Uuid::new_v4(), Uuid::nil(), Utc::now()),
            username: "ops".to_string(),
            email: "ops@example.com".to_string(),
            display_name: None,
            role: Role::Admin,
            password_hash: "stale".to_string(),
            is_active: true,
            last_login_at: None,
        };

        let columns: Vec<&str> = user.column_values().iter().map(|(c, _)| *c).collect();
        assert!(!columns.contains(&"password_hash"));
        assert!(!columns.contains(&"last_login_at"));

        let credentials: Vec<&str> = user.credential_values().iter().map(|(c, _)| *c).collect();
        assert_eq!(credentials, vec!["password_hash", "last_login_at"]);

        let stored = User {
            password_hash: "fresh".to_string(),
            last_login_at: Some(Utc::now()),
            ..user.clone()
        };
        user.carry_credentials(&stored);
        assert_eq!(user.password_hash, "fresh");
        assert_eq!(user.last_login_at, stored.last_login_at);
    }

    #[test]
    fn test_refresh_token_usable() {
        let now = Utc::now();
        let mut token = RefreshToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "abc".to_string(),
            issued_at: now,
            expires_at: now + Duration::hours(1),
            revoked_at: None,
            replaced_by: None,
        };

        assert!(token.is_usable(now));
        assert!(!token.is_usable(now + Duration::hours(2)));

        token.revoked_at = Some(now);
        assert!(!token.is_usable(now));
    }
}
