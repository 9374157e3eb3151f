//! Site settings: store details, delivery, tax and custom cake notice.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::Currency;
use hearth_core::pricing::SiteSettings;
use hearth_core::validation::ValidationErrors;

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{CspNonce, RequireAdminAuth, RequireOrderManager};
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

/// Raw settings form. Every field arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub whatsapp_number: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub delivery_fee: String,
    /// Blank disables free delivery.
    #[serde(default)]
    pub free_delivery_threshold: String,
    #[serde(default)]
    pub tax_rate: String,
    pub tax_inclusive: Option<String>,
    #[serde(default)]
    pub minimum_order: String,
    #[serde(default)]
    pub custom_cake_min_notice_days: String,
    /// One slot per line.
    #[serde(default)]
    pub delivery_slots: String,
    #[serde(default)]
    pub pickup_address: String,
    #[serde(default)]
    pub instagram_handle: String,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn amount(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
) -> Decimal {
    match raw.trim() {
        "" => Decimal::ZERO,
        raw => Decimal::from_str(raw).map_or_else(
            |_| {
                errors.add(field, "Enter a number such as 5.00");
                Decimal::ZERO
            },
            |d| d.round_dp(2),
        ),
    }
}

impl SettingsForm {
    fn from_settings(s: &SiteSettings) -> Self {
        Self {
            store_name: s.store_name.clone(),
            tagline: s.tagline.clone(),
            contact_email: s.contact_email.clone().unwrap_or_default(),
            contact_phone: s.contact_phone.clone().unwrap_or_default(),
            whatsapp_number: s.whatsapp_number.clone().unwrap_or_default(),
            currency: s.currency.code().to_owned(),
            delivery_fee: s.delivery_fee.to_string(),
            free_delivery_threshold: s
                .free_delivery_threshold
                .map(|t| t.to_string())
                .unwrap_or_default(),
            tax_rate: s.tax_rate.to_string(),
            tax_inclusive: s.tax_inclusive.then(|| "on".to_owned()),
            minimum_order: s.minimum_order.to_string(),
            custom_cake_min_notice_days: s.custom_cake_min_notice_days.to_string(),
            delivery_slots: s.delivery_slots.join("\n"),
            pickup_address: s.pickup_address.clone().unwrap_or_default(),
            instagram_handle: s.instagram_handle.clone().unwrap_or_default(),
        }
    }

    /// Parse and range-check the form.
    ///
    /// # Errors
    ///
    /// Returns every field that failed to parse or is out of range.
    pub fn parse(&self) -> std::result::Result<SiteSettings, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let currency = Currency::from_str(&self.currency).unwrap_or_else(|_| {
            errors.add("currency", "Choose a currency");
            Currency::default()
        });
        let delivery_fee = amount(&mut errors, "delivery_fee", &self.delivery_fee);
        let free_delivery_threshold = optional(&self.free_delivery_threshold)
            .map(|raw| amount(&mut errors, "free_delivery_threshold", &raw));
        let tax_rate = amount(&mut errors, "tax_rate", &self.tax_rate);
        let minimum_order = amount(&mut errors, "minimum_order", &self.minimum_order);
        let custom_cake_min_notice_days = match self.custom_cake_min_notice_days.trim() {
            "" => 0,
            raw => raw.parse().unwrap_or_else(|_| {
                errors.add(
                    "custom_cake_min_notice_days",
                    "Enter a whole number of days",
                );
                0
            }),
        };

        let contact_email = optional(&self.contact_email);
        if contact_email
            .as_deref()
            .is_some_and(|e| hearth_core::Email::parse(e).is_err())
        {
            errors.add("contact_email", "Enter a valid email address");
        }

        let settings = SiteSettings {
            store_name: self.store_name.trim().to_owned(),
            tagline: self.tagline.trim().to_owned(),
            contact_email,
            contact_phone: optional(&self.contact_phone),
            whatsapp_number: optional(&self.whatsapp_number),
            currency,
            delivery_fee,
            free_delivery_threshold,
            tax_rate,
            tax_inclusive: self.tax_inclusive.is_some(),
            minimum_order,
            custom_cake_min_notice_days,
            delivery_slots: self
                .delivery_slots
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_owned)
                .collect(),
            pickup_address: optional(&self.pickup_address),
            instagram_handle: optional(&self.instagram_handle)
                .map(|h| h.trim_start_matches('@').to_owned()),
        };

        if let Err(range_errors) = settings.validate() {
            errors.merge(range_errors);
        }
        errors.into_result()?;
        Ok(settings)
    }
}

/// A currency choice in the settings dropdown.
#[derive(Debug, Clone)]
pub struct CurrencyOption {
    pub code: &'static str,
    pub symbol: &'static str,
    pub selected: bool,
}

fn currency_options(current: &str) -> Vec<CurrencyOption> {
    Currency::ALL
        .iter()
        .map(|c| CurrencyOption {
            code: c.code(),
            symbol: c.symbol(),
            selected: c.code().eq_ignore_ascii_case(current.trim()),
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub ctx: PageContext,
    pub form: SettingsForm,
    pub currencies: Vec<CurrencyOption>,
    pub errors: ValidationErrors,
}

impl SettingsTemplate {
    fn new(ctx: PageContext, form: SettingsForm, errors: ValidationErrors) -> Self {
        Self {
            ctx,
            currencies: currency_options(&form.currency),
            form,
            errors,
        }
    }
}

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(show).post(save))
}

/// GET /settings
#[instrument(skip_all)]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<SettingsTemplate> {
    // The layout copy may be a fallback; never fill the form from it.
    let settings = state.site_settings().await?;
    let form = SettingsForm::from_settings(&settings);
    Ok(SettingsTemplate::new(ctx, form, ValidationErrors::new()))
}

/// POST /settings
#[instrument(skip_all)]
async fn save(
    RequireOrderManager(admin): RequireOrderManager,
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<SettingsForm>,
) -> Result<Response> {
    match form.parse() {
        Ok(settings) => {
            SettingsRepository::new(state.pool())
                .save_site_settings(&settings)
                .await?;
            tracing::info!(admin_id = %admin.id, "Site settings saved");

            Flash::success("Settings saved").push(&session).await?;
            Ok(Redirect::to("/settings").into_response())
        }
        Err(errors) => {
            let ctx = PageContext::build(&state, Some(&session), nonce, "/settings").await;
            Ok(SettingsTemplate::new(ctx, form, errors).into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_round_trips_defaults() {
        let defaults = SiteSettings::default();
        let parsed = SettingsForm::from_settings(&defaults).parse().unwrap();
        assert_eq!(parsed, defaults);
    }

    #[test]
    fn test_parse_slots_and_handle() {
        let form = SettingsForm {
            delivery_slots: "  08:00 - 10:00 \n\n10:00 - 12:00\n".to_owned(),
            instagram_handle: "@hearthbakes".to_owned(),
            free_delivery_threshold: String::new(),
            ..SettingsForm::from_settings(&SiteSettings::default())
        };
        let parsed = form.parse().unwrap();
        assert_eq!(parsed.delivery_slots, ["08:00 - 10:00", "10:00 - 12:00"]);
        assert_eq!(parsed.instagram_handle.as_deref(), Some("hearthbakes"));
        assert_eq!(parsed.free_delivery_threshold, None);
    }

    #[test]
    fn test_parse_collects_errors() {
        let form = SettingsForm {
            store_name: " ".to_owned(),
            currency: "XYZ".to_owned(),
            tax_rate: "150".to_owned(),
            delivery_fee: "five".to_owned(),
            custom_cake_min_notice_days: "90".to_owned(),
            contact_email: "not-an-email".to_owned(),
            ..SettingsForm::default()
        };
        let errors = form.parse().unwrap_err();
        for field in [
            "store_name",
            "currency",
            "tax_rate",
            "delivery_fee",
            "custom_cake_min_notice_days",
            "contact_email",
        ] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_currency_options_mark_selection() {
        let options = currency_options("gbp");
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.code == "GBP" && o.selected));
    }
}
