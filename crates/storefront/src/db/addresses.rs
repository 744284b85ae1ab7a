//! Address repository.
//!
//! Saved addresses are per user and per kind (billing/shipping); at most one of
//! each kind is the default. Writes that change the default clear the previous
//! one first so the partial unique index never trips.

use sqlx::{PgConnection, PgPool};

use wardrobe_core::models::Address;
use wardrobe_core::{AddressId, AddressKind, CountryCode, UserId};

use super::RepositoryError;

const ADDRESS_COLUMNS: &str =
    "id, user_id, street_address, apartment_address, country, zip, kind, is_default";

/// Address fields entered on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub street_address: String,
    pub apartment_address: String,
    pub country: CountryCode,
    pub zip: String,
    /// Make this the user's default address of its kind.
    pub is_default: bool,
}

/// Where the order's shipping address comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShippingChoice {
    /// A saved address.
    Existing(AddressId),
    /// A newly entered address.
    New(NewAddress),
}

/// Where the order's billing address comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingChoice {
    /// A saved address.
    Existing(AddressId),
    /// A newly entered address.
    New(NewAddress),
    /// A billing copy of the chosen shipping address.
    SameAsShipping { is_default: bool },
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's default address of the given kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn default_for(
        &self,
        user_id: UserId,
        kind: AddressKind,
    ) -> Result<Option<Address>, RepositoryError> {
        let sql = format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.address WHERE user_id = $1 AND kind = $2 AND is_default"
        );
        let address = sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .bind(kind)
            .fetch_optional(self.pool)
            .await?;
        Ok(address)
    }

    /// Get one of the user's addresses by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM shop.address WHERE id = $1 AND user_id = $2");
        let address = sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(address)
    }
}

/// Insert an address, clearing the previous default of its kind when needed.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    user_id: UserId,
    kind: AddressKind,
    address: &NewAddress,
) -> Result<AddressId, RepositoryError> {
    if address.is_default {
        clear_default(conn, user_id, kind).await?;
    }

    let (id,): (AddressId,) = sqlx::query_as(
        r"
        INSERT INTO shop.address
            (user_id, street_address, apartment_address, country, zip, kind, is_default)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(&address.street_address)
    .bind(&address.apartment_address)
    .bind(&address.country)
    .bind(&address.zip)
    .bind(kind)
    .bind(address.is_default)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// Copy an existing address of the user as a billing address.
pub(crate) async fn copy_as_billing(
    conn: &mut PgConnection,
    user_id: UserId,
    source: AddressId,
    is_default: bool,
) -> Result<AddressId, RepositoryError> {
    if is_default {
        clear_default(conn, user_id, AddressKind::Billing).await?;
    }

    let row: Option<(AddressId,)> = sqlx::query_as(
        r"
        INSERT INTO shop.address
            (user_id, street_address, apartment_address, country, zip, kind, is_default)
        SELECT user_id, street_address, apartment_address, country, zip, 'billing'::shop.address_kind, $3
        FROM shop.address
        WHERE id = $1 AND user_id = $2
        RETURNING id
        ",
    )
    .bind(source)
    .bind(user_id)
    .bind(is_default)
    .fetch_optional(conn)
    .await?;

    row.map(|(id,)| id).ok_or(RepositoryError::NotFound)
}

/// Ensure an address id belongs to the user and has the expected kind.
pub(crate) async fn ensure_owned(
    conn: &mut PgConnection,
    user_id: UserId,
    id: AddressId,
    kind: AddressKind,
) -> Result<AddressId, RepositoryError> {
    let row: Option<(AddressId,)> = sqlx::query_as(
        "SELECT id FROM shop.address WHERE id = $1 AND user_id = $2 AND kind = $3",
    )
    .bind(id)
    .bind(user_id)
    .bind(kind)
    .fetch_optional(conn)
    .await?;

    row.map(|(id,)| id).ok_or(RepositoryError::NotFound)
}

async fn clear_default(
    conn: &mut PgConnection,
    user_id: UserId,
    kind: AddressKind,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE shop.address SET is_default = FALSE WHERE user_id = $1 AND kind = $2 AND is_default",
    )
    .bind(user_id)
    .bind(kind)
    .execute(conn)
    .await?;
    Ok(())
}
