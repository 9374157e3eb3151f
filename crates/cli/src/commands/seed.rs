//! Starter data: the catalog from YAML and default site settings.
//!
//! The catalog file lists categories, each with its products:
//!
//! ```yaml
//! categories:
//!   - name: Breads
//!     description: Baked every morning.
//!     products:
//!       - name: Country Sourdough
//!         price: "9.50"
//!         featured: true
//! ```
//!
//! Rows are matched on slug, so running the seed again updates names,
//! prices and descriptions in place rather than duplicating them.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use hearth_admin::db::{RepositoryError, SettingsRepository};
use hearth_core::pricing::SiteSettings;
use hearth_core::slug::slugify;

use super::{ConnectError, connect};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub featured: bool,
}

const fn default_true() -> bool {
    true
}

impl CategorySeed {
    #[must_use]
    pub fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

impl ProductSeed {
    #[must_use]
    pub fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

impl CatalogFile {
    /// Problems that would make the seed fail half way through.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut category_slugs = HashSet::new();
        let mut product_slugs = HashSet::new();

        for category in &self.categories {
            let slug = category.slug();
            if category.name.trim().is_empty() || slug.is_empty() {
                errors.push(format!("category {:?} needs a name", category.name));
            } else if !category_slugs.insert(slug.clone()) {
                errors.push(format!("duplicate category slug {slug}"));
            }

            for product in &category.products {
                let slug = product.slug();
                if product.name.trim().is_empty() || slug.is_empty() {
                    errors.push(format!("product {:?} needs a name", product.name));
                } else if !product_slugs.insert(slug.clone()) {
                    errors.push(format!("duplicate product slug {slug}"));
                }
                if product.price.is_sign_negative() {
                    errors.push(format!("product {slug} has a negative price"));
                }
            }
        }

        errors
    }

    fn product_count(&self) -> usize {
        self.categories.iter().map(|c| c.products.len()).sum()
    }
}

/// Upsert categories and products from a YAML file in one transaction.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or any write fails.
/// Nothing is written when an error is returned.
pub async fn catalog(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    tracing::info!(path = %file_path, "Loading catalog");
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = catalog.validate();
    if !errors.is_empty() {
        tracing::error!("Catalog validation failed:");
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    tracing::info!(
        categories = catalog.categories.len(),
        products = catalog.product_count(),
        "Catalog validated"
    );

    let pool = connect().await?;
    let mut tx = pool.begin().await?;

    for (position, category) in catalog.categories.iter().enumerate() {
        let sort_order = i32::try_from(position).unwrap_or(i32::MAX);
        let category_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO bakery.category (name, slug, description, sort_order)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE
                SET name = $1, description = $3, sort_order = $4
            RETURNING id
            ",
        )
        .bind(category.name.trim())
        .bind(category.slug())
        .bind(category.description.as_deref())
        .bind(sort_order)
        .fetch_one(&mut *tx)
        .await?;

        for product in &category.products {
            sqlx::query(
                r"
                INSERT INTO bakery.product
                    (category_id, name, slug, description, price, image_url, is_available, is_featured)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (slug) DO UPDATE
                    SET category_id = $1, name = $2, description = $4, price = $5,
                        image_url = $6, is_available = $7, is_featured = $8,
                        updated_at = NOW()
                ",
            )
            .bind(category_id)
            .bind(product.name.trim())
            .bind(product.slug())
            .bind(product.description.trim())
            .bind(product.price.round_dp(2))
            .bind(product.image_url.as_deref())
            .bind(product.available)
            .bind(product.featured)
            .execute(&mut *tx)
            .await?;
        }

        tracing::info!(
            "  {} ({} products)",
            category.name,
            category.products.len()
        );
    }

    tx.commit().await?;
    tracing::info!("Catalog seeded");
    Ok(())
}

/// Store the default site settings unless some are already saved.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the write fails.
pub async fn settings() -> Result<(), SeedError> {
    let pool = connect().await?;
    let repo = SettingsRepository::new(&pool);

    if repo.has_site_settings().await? {
        tracing::info!("Site settings already exist, leaving them unchanged");
        return Ok(());
    }

    repo.save_site_settings(&SiteSettings::default()).await?;
    tracing::info!("Default site settings stored");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
categories:
  - name: Celebration Cakes
    products:
      - name: Lemon Drizzle
        price: "32.00"
        featured: true
      - name: Chocolate Fudge
        slug: fudge-cake
        price: "35.50"
        available: false
  - name: Breads
    description: Baked every morning.
"#;

    #[test]
    fn test_parse_sample() {
        let catalog: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(catalog.categories.len(), 2);
        assert_eq!(catalog.product_count(), 2);

        let cakes = &catalog.categories[0];
        assert_eq!(cakes.slug(), "celebration-cakes");
        assert_eq!(cakes.products[0].slug(), "lemon-drizzle");
        assert!(cakes.products[0].available);
        assert!(cakes.products[0].featured);
        assert_eq!(cakes.products[1].slug(), "fudge-cake");
        assert!(!cakes.products[1].available);
        assert_eq!(cakes.products[1].price, Decimal::new(3550, 2));
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn test_validate_duplicates_and_prices() {
        let yaml = r#"
categories:
  - name: Pies
    products:
      - name: Apple Pie
        price: "12"
      - name: "Apple  Pie!"
        price: "-1"
  - name: "PIES"
"#;
        let catalog: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        let errors = catalog.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("duplicate product slug apple-pie")));
        assert!(errors.iter().any(|e| e.contains("negative price")));
        assert!(errors.iter().any(|e| e.contains("duplicate category slug pies")));
    }

    #[test]
    fn test_missing_price_is_rejected() {
        let yaml = "categories:\n  - name: Pies\n    products:\n      - name: Apple Pie\n";
        assert!(serde_yaml::from_str::<CatalogFile>(yaml).is_err());
    }
}
