//! The custom cake request wizard.
//!
//! A request is collected over several steps. The draft is kept as raw form
//! strings between requests so a half-filled step can be re-rendered exactly
//! as typed. Each step validates only its own fields. [`CustomCakeWizard::finish`]
//! validates everything and produces a typed [`NewCustomRequest`].

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, FulfillmentMethod, Phone};
pub use crate::validation::ValidationErrors;

/// Occasions offered on the first step, as `(value, label)`.
pub const OCCASIONS: &[(&str, &str)] = &[
    ("birthday", "Birthday"),
    ("wedding", "Wedding"),
    ("anniversary", "Anniversary"),
    ("baby_shower", "Baby shower"),
    ("graduation", "Graduation"),
    ("corporate", "Corporate event"),
    ("other", "Other"),
];

/// Cake shapes offered on the cake step.
pub const SHAPES: &[&str] = &["round", "square", "heart", "rectangle", "number", "custom"];

pub const MAX_SERVINGS: u32 = 500;
pub const MAX_TIERS: u32 = 6;
pub const MIN_DESIGN_DESCRIPTION: usize = 10;

// =============================================================================
// Steps
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Occasion,
    Cake,
    Design,
    Delivery,
    Contact,
    Review,
}

impl WizardStep {
    pub const ALL: &'static [Self] = &[
        Self::Occasion,
        Self::Cake,
        Self::Design,
        Self::Delivery,
        Self::Contact,
        Self::Review,
    ];

    /// 1-based position for "Step 2 of 6".
    #[must_use]
    pub const fn number(self) -> usize {
        self as usize + 1
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Occasion => "Occasion",
            Self::Cake => "Your cake",
            Self::Design => "Design",
            Self::Delivery => "Delivery",
            Self::Contact => "Contact details",
            Self::Review => "Review",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Occasion => "occasion",
            Self::Cake => "cake",
            Self::Design => "design",
            Self::Delivery => "delivery",
            Self::Contact => "contact",
            Self::Review => "review",
        }
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self as usize + 1).copied()
    }

    #[must_use]
    pub fn prev(self) -> Option<Self> {
        (self as usize).checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Form fields collected on this step.
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Occasion => &["occasion", "occasion_other"],
            Self::Cake => &[
                "servings",
                "tiers",
                "shape",
                "flavor",
                "filling",
                "frosting",
                "dietary_notes",
            ],
            Self::Design => &[
                "design_description",
                "cake_message",
                "color_theme",
                "reference_image_url",
                "budget",
            ],
            Self::Delivery => &[
                "fulfillment_method",
                "delivery_date",
                "delivery_slot",
                "delivery_address",
            ],
            Self::Contact => &["name", "email", "phone", "notes"],
            Self::Review => &[],
        }
    }
}

impl std::str::FromStr for WizardStep {
    type Err = crate::types::ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| crate::types::ParseStatusError {
                kind: "wizard step",
                value: s.to_owned(),
            })
    }
}

// =============================================================================
// Draft
// =============================================================================

/// Raw wizard input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCakeDraft {
    pub occasion: String,
    pub occasion_other: String,
    pub servings: String,
    pub tiers: String,
    pub shape: String,
    pub flavor: String,
    pub filling: String,
    pub frosting: String,
    pub dietary_notes: String,
    pub design_description: String,
    pub cake_message: String,
    pub color_theme: String,
    pub reference_image_url: String,
    pub budget: String,
    pub fulfillment_method: String,
    pub delivery_date: String,
    pub delivery_slot: String,
    pub delivery_address: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
}

impl CustomCakeDraft {
    /// Copy this step's fields from a submitted form. Fields belonging to other
    /// steps are ignored; fields missing from the form are cleared.
    pub fn apply_form(&mut self, step: WizardStep, form: &HashMap<String, String>) {
        for &field in step.fields() {
            let value = form.get(field).map(|v| v.trim().to_owned()).unwrap_or_default();
            if let Some(slot) = self.field_mut(field) {
                *slot = value;
            }
        }
    }

    /// Pre-fill contact details for a signed-in customer without overwriting
    /// anything already typed.
    pub fn prefill_contact(&mut self, name: &str, email: &str, phone: Option<&str>) {
        if self.name.is_empty() {
            name.clone_into(&mut self.name);
        }
        if self.email.is_empty() {
            email.clone_into(&mut self.email);
        }
        if self.phone.is_empty() {
            if let Some(phone) = phone {
                phone.clone_into(&mut self.phone);
            }
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        Some(match field {
            "occasion" => &mut self.occasion,
            "occasion_other" => &mut self.occasion_other,
            "servings" => &mut self.servings,
            "tiers" => &mut self.tiers,
            "shape" => &mut self.shape,
            "flavor" => &mut self.flavor,
            "filling" => &mut self.filling,
            "frosting" => &mut self.frosting,
            "dietary_notes" => &mut self.dietary_notes,
            "design_description" => &mut self.design_description,
            "cake_message" => &mut self.cake_message,
            "color_theme" => &mut self.color_theme,
            "reference_image_url" => &mut self.reference_image_url,
            "budget" => &mut self.budget,
            "fulfillment_method" => &mut self.fulfillment_method,
            "delivery_date" => &mut self.delivery_date,
            "delivery_slot" => &mut self.delivery_slot,
            "delivery_address" => &mut self.delivery_address,
            "name" => &mut self.name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "notes" => &mut self.notes,
            _ => return None,
        })
    }

    /// Label for the chosen occasion, using the free-text value for "other".
    #[must_use]
    pub fn occasion_label(&self) -> String {
        if self.occasion == "other" {
            return self.occasion_other.clone();
        }
        OCCASIONS
            .iter()
            .find(|(value, _)| *value == self.occasion)
            .map_or_else(|| self.occasion.clone(), |(_, label)| (*label).to_owned())
    }

    /// The method chosen on the delivery step; delivery until chosen.
    #[must_use]
    pub fn method(&self) -> FulfillmentMethod {
        FulfillmentMethod::from_db(Some(self.fulfillment_method.as_str()))
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validate the fields collected on one step.
///
/// The review step validates every other step.
///
/// # Errors
///
/// Returns each failed field with a message suitable for display.
pub fn validate_step(
    step: WizardStep,
    draft: &CustomCakeDraft,
    today: NaiveDate,
    min_notice_days: u32,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match step {
        WizardStep::Occasion => check_occasion(draft, &mut errors),
        WizardStep::Cake => check_cake(draft, &mut errors),
        WizardStep::Design => check_design(draft, &mut errors),
        WizardStep::Delivery => check_delivery(draft, today, min_notice_days, &mut errors),
        WizardStep::Contact => check_contact(draft, &mut errors),
        WizardStep::Review => {
            check_occasion(draft, &mut errors);
            check_cake(draft, &mut errors);
            check_design(draft, &mut errors);
            check_delivery(draft, today, min_notice_days, &mut errors);
            check_contact(draft, &mut errors);
        }
    }
    errors.into_result()
}

fn check_occasion(draft: &CustomCakeDraft, errors: &mut ValidationErrors) {
    if draft.occasion.is_empty() {
        errors.add("occasion", "Please choose an occasion");
    } else if draft.occasion == "other" && draft.occasion_other.is_empty() {
        errors.add("occasion_other", "Tell us about the occasion");
    }
}

fn check_cake(draft: &CustomCakeDraft, errors: &mut ValidationErrors) {
    check_count(&draft.servings, "servings", "Servings", MAX_SERVINGS, errors);
    check_count(&draft.tiers, "tiers", "Tiers", MAX_TIERS, errors);
    if draft.shape.is_empty() {
        errors.add("shape", "Please choose a shape");
    }
    if draft.flavor.is_empty() {
        errors.add("flavor", "Please choose a flavor");
    }
}

fn check_count(
    raw: &str,
    field: &'static str,
    label: &str,
    max: u32,
    errors: &mut ValidationErrors,
) {
    if raw.is_empty() {
        errors.add(field, format!("{label} is required"));
        return;
    }
    match raw.parse::<u32>() {
        Ok(n) if (1..=max).contains(&n) => {}
        Ok(_) => errors.add(field, format!("{label} must be between 1 and {max}")),
        Err(_) => errors.add(field, format!("{label} must be a whole number")),
    }
}

fn check_design(draft: &CustomCakeDraft, errors: &mut ValidationErrors) {
    if draft.design_description.chars().count() < MIN_DESIGN_DESCRIPTION {
        errors.add(
            "design_description",
            format!("Describe your design in at least {MIN_DESIGN_DESCRIPTION} characters"),
        );
    }
    if !draft.reference_image_url.is_empty()
        && !(draft.reference_image_url.starts_with("https://")
            || draft.reference_image_url.starts_with("http://"))
    {
        errors.add("reference_image_url", "Reference image must be a web link");
    }
    if !draft.budget.is_empty() {
        match draft.budget.parse::<Decimal>() {
            Ok(b) if b > Decimal::ZERO => {}
            _ => errors.add("budget", "Budget must be a positive amount"),
        }
    }
}

fn check_delivery(
    draft: &CustomCakeDraft,
    today: NaiveDate,
    min_notice_days: u32,
    errors: &mut ValidationErrors,
) {
    let method = match draft.fulfillment_method.parse::<FulfillmentMethod>() {
        Ok(method) => method,
        Err(_) => {
            errors.add("fulfillment_method", "Choose delivery or pickup");
            FulfillmentMethod::Delivery
        }
    };

    if let Err(message) = check_date(&draft.delivery_date, today, min_notice_days) {
        errors.add("delivery_date", message);
    }

    if method == FulfillmentMethod::Delivery && draft.delivery_address.is_empty() {
        errors.add("delivery_address", "Delivery address is required");
    }
}

/// Validate a requested date string against today and the notice period.
///
/// # Errors
///
/// Returns a display message when the date is missing, malformed, in the
/// past, or too soon.
pub fn check_date(raw: &str, today: NaiveDate, min_notice_days: u32) -> Result<NaiveDate, String> {
    if raw.is_empty() {
        return Err("Please choose a date".to_owned());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| "Enter the date as YYYY-MM-DD".to_owned())?;
    if date < today {
        return Err("Date cannot be in the past".to_owned());
    }
    let earliest = today
        .checked_add_days(Days::new(u64::from(min_notice_days)))
        .unwrap_or(NaiveDate::MAX);
    if date < earliest {
        return Err(format!(
            "We need at least {min_notice_days} days' notice, the earliest date is {earliest}"
        ));
    }
    Ok(date)
}

fn check_contact(draft: &CustomCakeDraft, errors: &mut ValidationErrors) {
    if draft.name.is_empty() {
        errors.add("name", "Name is required");
    }
    if let Err(e) = Email::parse(&draft.email) {
        errors.add("email", capitalize(&e.to_string()));
    }
    if let Err(e) = Phone::parse(&draft.phone) {
        errors.add("phone", capitalize(&e.to_string()));
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// =============================================================================
// Wizard
// =============================================================================

/// The composite document written when the wizard completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomRequest {
    pub occasion: String,
    pub servings: i32,
    pub tiers: i32,
    pub shape: String,
    pub flavor: String,
    pub filling: Option<String>,
    pub frosting: Option<String>,
    pub dietary_notes: Option<String>,
    pub design_description: String,
    pub cake_message: Option<String>,
    pub color_theme: Option<String>,
    pub reference_image_url: Option<String>,
    pub budget: Option<Decimal>,
    pub fulfillment_method: FulfillmentMethod,
    pub delivery_date: NaiveDate,
    pub delivery_slot: Option<String>,
    /// Always `None` for pickup.
    pub delivery_address: Option<String>,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub notes: Option<String>,
}

/// Multi-step state: the current step plus the draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCakeWizard {
    pub step: WizardStep,
    pub draft: CustomCakeDraft,
}

impl CustomCakeWizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the current step and move to the next one.
    ///
    /// # Errors
    ///
    /// Returns the current step's errors and stays on the step.
    pub fn advance(&mut self, today: NaiveDate, min_notice_days: u32) -> Result<WizardStep, ValidationErrors> {
        validate_step(self.step, &self.draft, today, min_notice_days)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Move back one step without validating.
    pub fn back(&mut self) -> WizardStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// Jump to `target`. Going backwards is always allowed; going forwards
    /// requires every earlier step to validate.
    ///
    /// # Errors
    ///
    /// Returns the errors of the first invalid step before `target`.
    pub fn goto(
        &mut self,
        target: WizardStep,
        today: NaiveDate,
        min_notice_days: u32,
    ) -> Result<WizardStep, ValidationErrors> {
        if target > self.step {
            for &step in WizardStep::ALL.iter().take_while(|s| **s < target) {
                validate_step(step, &self.draft, today, min_notice_days)?;
            }
        }
        self.step = target;
        Ok(self.step)
    }

    /// Validate every step and build the request document.
    ///
    /// # Errors
    ///
    /// Returns all validation errors across all steps.
    pub fn finish(&self, today: NaiveDate, min_notice_days: u32) -> Result<NewCustomRequest, ValidationErrors> {
        validate_step(WizardStep::Review, &self.draft, today, min_notice_days)?;
        build(&self.draft, today, min_notice_days)
    }
}

fn optional(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

fn build(
    d: &CustomCakeDraft,
    today: NaiveDate,
    min_notice_days: u32,
) -> Result<NewCustomRequest, ValidationErrors> {
    // Re-parsed after validation; failures still surface as field errors.
    let mut errors = ValidationErrors::new();
    let servings = d.servings.parse::<i32>().unwrap_or_else(|_| {
        errors.add("servings", "Servings is required");
        0
    });
    let tiers = d.tiers.parse::<i32>().unwrap_or_else(|_| {
        errors.add("tiers", "Tiers is required");
        0
    });
    let delivery_date = match check_date(&d.delivery_date, today, min_notice_days) {
        Ok(date) => Some(date),
        Err(message) => {
            errors.add("delivery_date", message);
            None
        }
    };
    let email = Email::parse(&d.email).map_err(|e| errors.add("email", e.to_string())).ok();
    let phone = Phone::parse(&d.phone).map_err(|e| errors.add("phone", e.to_string())).ok();

    let (Some(delivery_date), Some(email), Some(phone)) = (delivery_date, email, phone) else {
        return Err(errors);
    };
    errors.into_result()?;

    let fulfillment_method = d.method();
    Ok(NewCustomRequest {
        occasion: d.occasion_label(),
        servings,
        tiers,
        shape: d.shape.clone(),
        flavor: d.flavor.clone(),
        filling: optional(&d.filling),
        frosting: optional(&d.frosting),
        dietary_notes: optional(&d.dietary_notes),
        design_description: d.design_description.clone(),
        cake_message: optional(&d.cake_message),
        color_theme: optional(&d.color_theme),
        reference_image_url: optional(&d.reference_image_url),
        budget: d.budget.parse().ok(),
        fulfillment_method,
        delivery_date,
        delivery_slot: optional(&d.delivery_slot),
        delivery_address: match fulfillment_method {
            FulfillmentMethod::Delivery => optional(&d.delivery_address),
            FulfillmentMethod::Pickup => None,
        },
        name: d.name.clone(),
        email,
        phone,
        notes: optional(&d.notes),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 10).unwrap()
    }

    fn complete_draft() -> CustomCakeDraft {
        CustomCakeDraft {
            occasion: "birthday".to_owned(),
            servings: "24".to_owned(),
            tiers: "2".to_owned(),
            shape: "round".to_owned(),
            flavor: "Lemon".to_owned(),
            design_description: "Pale yellow with pressed flowers".to_owned(),
            budget: "120".to_owned(),
            fulfillment_method: "delivery".to_owned(),
            delivery_date: "2026-05-14".to_owned(),
            delivery_address: "12 Mill Lane".to_owned(),
            name: "Sam Rivera".to_owned(),
            email: "Sam@Example.com".to_owned(),
            phone: "+1 555 010 9999".to_owned(),
            ..CustomCakeDraft::default()
        }
    }

    #[test]
    fn test_missing_delivery_date_is_rejected() {
        let draft = CustomCakeDraft {
            delivery_date: String::new(),
            ..complete_draft()
        };
        let errors = validate_step(WizardStep::Delivery, &draft, today(), 2).unwrap_err();
        assert_eq!(errors.get("delivery_date"), Some("Please choose a date"));

        let wizard = CustomCakeWizard {
            step: WizardStep::Review,
            draft,
        };
        assert!(wizard.finish(today(), 2).unwrap_err().has("delivery_date"));
    }

    #[test]
    fn test_delivery_date_in_past_and_notice() {
        let mut draft = complete_draft();

        draft.delivery_date = "2026-05-09".to_owned();
        let errors = validate_step(WizardStep::Delivery, &draft, today(), 2).unwrap_err();
        assert_eq!(errors.get("delivery_date"), Some("Date cannot be in the past"));

        draft.delivery_date = "2026-05-11".to_owned();
        let errors = validate_step(WizardStep::Delivery, &draft, today(), 2).unwrap_err();
        assert!(errors.get("delivery_date").unwrap().contains("2 days' notice"));

        draft.delivery_date = "2026-05-12".to_owned();
        assert!(validate_step(WizardStep::Delivery, &draft, today(), 2).is_ok());

        draft.delivery_date = "2026-05-10".to_owned();
        assert!(validate_step(WizardStep::Delivery, &draft, today(), 0).is_ok());

        draft.delivery_date = "12/05/2026".to_owned();
        assert!(validate_step(WizardStep::Delivery, &draft, today(), 2).is_err());
    }

    #[test]
    fn test_address_required_only_for_delivery() {
        let mut draft = CustomCakeDraft {
            delivery_address: String::new(),
            ..complete_draft()
        };
        assert!(
            validate_step(WizardStep::Delivery, &draft, today(), 2)
                .unwrap_err()
                .has("delivery_address")
        );

        draft.fulfillment_method = "pickup".to_owned();
        assert!(validate_step(WizardStep::Delivery, &draft, today(), 2).is_ok());
    }

    #[test]
    fn test_other_occasion_needs_description() {
        let mut draft = CustomCakeDraft {
            occasion: "other".to_owned(),
            ..complete_draft()
        };
        let errors = validate_step(WizardStep::Occasion, &draft, today(), 2).unwrap_err();
        assert!(errors.has("occasion_other"));

        draft.occasion_other = "Retirement".to_owned();
        assert!(validate_step(WizardStep::Occasion, &draft, today(), 2).is_ok());
        assert_eq!(draft.occasion_label(), "Retirement");
    }

    #[test]
    fn test_cake_ranges() {
        let mut draft = complete_draft();
        draft.servings = "0".to_owned();
        draft.tiers = "seven".to_owned();
        draft.flavor = String::new();
        let errors = validate_step(WizardStep::Cake, &draft, today(), 2).unwrap_err();
        assert_eq!(errors.get("servings"), Some("Servings must be between 1 and 500"));
        assert_eq!(errors.get("tiers"), Some("Tiers must be a whole number"));
        assert!(errors.has("flavor"));
        assert!(!errors.has("shape"));
    }

    #[test]
    fn test_budget_must_be_positive() {
        let mut draft = complete_draft();
        for rejected in ["0", "0.00", "-20", "lots"] {
            draft.budget = rejected.to_owned();
            let errors = validate_step(WizardStep::Design, &draft, today(), 2).unwrap_err();
            assert_eq!(errors.get("budget"), Some("Budget must be a positive amount"));
        }

        draft.budget = String::new();
        assert!(validate_step(WizardStep::Design, &draft, today(), 2).is_ok());
        draft.budget = "0.50".to_owned();
        assert!(validate_step(WizardStep::Design, &draft, today(), 2).is_ok());
    }

    #[test]
    fn test_advance_stops_on_invalid_step() {
        let mut wizard = CustomCakeWizard::new();
        assert!(wizard.advance(today(), 2).is_err());
        assert_eq!(wizard.step, WizardStep::Occasion);

        wizard.draft.occasion = "wedding".to_owned();
        assert_eq!(wizard.advance(today(), 2).unwrap(), WizardStep::Cake);
        assert_eq!(wizard.back(), WizardStep::Occasion);
        assert_eq!(wizard.back(), WizardStep::Occasion);
    }

    #[test]
    fn test_goto_only_reaches_valid_steps() {
        let mut wizard = CustomCakeWizard {
            step: WizardStep::Occasion,
            draft: CustomCakeDraft {
                design_description: String::new(),
                ..complete_draft()
            },
        };

        let errors = wizard.goto(WizardStep::Contact, today(), 2).unwrap_err();
        assert!(errors.has("design_description"));
        assert_eq!(wizard.step, WizardStep::Occasion);

        assert_eq!(wizard.goto(WizardStep::Design, today(), 2).unwrap(), WizardStep::Design);
        assert_eq!(wizard.goto(WizardStep::Occasion, today(), 2).unwrap(), WizardStep::Occasion);
    }

    #[test]
    fn test_finish_builds_document() {
        let wizard = CustomCakeWizard {
            step: WizardStep::Review,
            draft: complete_draft(),
        };
        let request = wizard.finish(today(), 2).unwrap();
        assert_eq!(request.occasion, "Birthday");
        assert_eq!(request.servings, 24);
        assert_eq!(request.email.as_str(), "sam@example.com");
        assert_eq!(request.phone.as_str(), "+15550109999");
        assert_eq!(request.budget, Some(Decimal::new(120, 0)));
        assert_eq!(request.filling, None);
        assert_eq!(request.delivery_address.as_deref(), Some("12 Mill Lane"));
    }

    #[test]
    fn test_finish_drops_address_for_pickup() {
        let wizard = CustomCakeWizard {
            step: WizardStep::Review,
            draft: CustomCakeDraft {
                fulfillment_method: "pickup".to_owned(),
                ..complete_draft()
            },
        };
        let request = wizard.finish(today(), 2).unwrap();
        assert_eq!(request.fulfillment_method, FulfillmentMethod::Pickup);
        assert_eq!(request.delivery_address, None);
    }

    #[test]
    fn test_apply_form_only_touches_step_fields() {
        let mut draft = complete_draft();
        let form: HashMap<String, String> = [
            ("name".to_owned(), "  Alex  ".to_owned()),
            ("flavor".to_owned(), "Chocolate".to_owned()),
        ]
        .into_iter()
        .collect();

        draft.apply_form(WizardStep::Contact, &form);
        assert_eq!(draft.name, "Alex");
        assert_eq!(draft.email, "");
        assert_eq!(draft.flavor, "Lemon");
    }

    #[test]
    fn test_step_order() {
        assert_eq!(WizardStep::Occasion.next(), Some(WizardStep::Cake));
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::Occasion.prev(), None);
        assert_eq!(WizardStep::Review.number(), 6);
        assert_eq!("delivery".parse::<WizardStep>().unwrap(), WizardStep::Delivery);
    }
}
