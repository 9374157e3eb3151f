//! Catalog management: categories and products.

use rust_decimal::Decimal;
use sqlx::PgPool;

use hearth_core::models::{Category, Product};
use hearth_core::rows::{CATEGORY_COLUMNS, CategoryRow, PRODUCT_COLUMNS, ProductRow};
use hearth_core::{CategoryId, ProductId};

use super::{RepositoryError, conflict_on_unique, expect_one};

/// Fields written by the product form.
#[derive(Debug, Clone)]
pub struct ProductInput<'a> {
    pub category_id: Option<CategoryId>,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub price: Decimal,
    pub image_url: Option<&'a str>,
    pub is_available: bool,
    pub is_featured: bool,
}

/// A category with the number of products filed under it.
#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: Category,
    pub product_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CategorySummaryRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    product_count: i64,
}

pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

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

    /// Categories in display order with product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_summaries(&self) -> Result<Vec<CategorySummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategorySummaryRow>(
            r"
            SELECT c.id, c.name, c.slug, c.description, c.sort_order,
                   COUNT(p.id) AS product_count
            FROM bakery.category c
            LEFT JOIN bakery.product p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.sort_order, c.name
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| CategorySummary {
                category: Category::from(r.category),
                product_count: r.product_count,
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create_category(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
        sort_order: i32,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r"
            INSERT INTO bakery.category (name, slug, description, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category slug"))?;
        Ok(Category::from(row))
    }

    /// Delete a category. Its products become uncategorised.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such category exists.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bakery.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    /// Every product, available or not, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bakery.product ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bakery.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create_product(&self, input: &ProductInput<'_>) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO bakery.product
                (category_id, name, slug, description, price, image_url, is_available, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(input.category_id)
        .bind(input.name)
        .bind(input.slug)
        .bind(input.description)
        .bind(input.price)
        .bind(input.image_url)
        .bind(input.is_available)
        .bind(input.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product slug"))?;
        Ok(Product::from(row))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput<'_>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE bakery.product
            SET category_id = $2, name = $3, slug = $4, description = $5, price = $6,
                image_url = $7, is_available = $8, is_featured = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.category_id)
        .bind(input.name)
        .bind(input.slug)
        .bind(input.description)
        .bind(input.price)
        .bind(input.image_url)
        .bind(input.is_available)
        .bind(input.is_featured)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product slug"))?;
        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Past order lines keep their name and price snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bakery.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }
}
