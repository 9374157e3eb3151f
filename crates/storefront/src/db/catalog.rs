//! Catalog repository: categories and products.
//!
//! The storefront only ever shows available products; the back office edits
//! the catalog through its own repository.

use sqlx::PgPool;

use hearth_core::models::{Category, Product};
use hearth_core::rows::{CATEGORY_COLUMNS, CategoryRow, PRODUCT_COLUMNS, ProductRow};
use hearth_core::ProductId;

use super::RepositoryError;

/// Upper bound on catalog page size; the bakery's range is small.
const MAX_PRODUCTS: i64 = 200;

pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM bakery.category ORDER BY sort_order, name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Available products, optionally narrowed to a category slug and a
    /// case-insensitive search over name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(
        &self,
        category_slug: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let pattern = search.map(|q| format!("%{}%", escape_like(q)));
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM bakery.product p
            WHERE p.is_available
              AND ($1::TEXT IS NULL OR p.category_id = (SELECT id FROM bakery.category WHERE slug = $1))
              AND ($2::TEXT IS NULL OR p.name ILIKE $2 OR p.description ILIKE $2)
            ORDER BY p.is_featured DESC, p.name
            LIMIT $3
            "
        ))
        .bind(category_slug)
        .bind(pattern)
        .bind(MAX_PRODUCTS)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Featured, available products for the home page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM bakery.product
            WHERE is_available AND is_featured
            ORDER BY updated_at DESC
            LIMIT $1
            "
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// A product by slug, available or not. Callers decide how to show
    /// unavailable products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bakery.product WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bakery.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    /// Available products among `ids`, used to price a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn available_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bakery.product WHERE is_available AND id = ANY($1)"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("rye"), "rye");
        assert_eq!(escape_like("100%_rye\\"), "100\\%\\_rye\\\\");
    }
}
