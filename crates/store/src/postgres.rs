//! PostgreSQL-backed store implementations.
//!
//! Orders live in columns (statuses and the audited price fields are
//! queryable); line items, the address, and the gateway capture are JSON
//! documents. Conditional status updates take a `SELECT … FOR UPDATE` row
//! lock inside a transaction, the per-order mutual-exclusion scope, and
//! run the domain transition between read and write, so the rules live in
//! one place. Dropping the transaction on any error path releases the
//! lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, SessionId, UserId};
use domain::{
    Checkout, Currency, DeliveryStatus, Money, Order, OrderRecord, PaymentCapture, PaymentMethod,
    PaymentStatus,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{CartStore, OrderRepository, Result, StoreError};

/// Schema for the order and cart tables.
///
/// Applied idempotently at startup; the two tables don't warrant a
/// migration framework.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    items JSONB NOT NULL,
    shipping_address JSONB NOT NULL,
    payment_method TEXT NOT NULL,
    currency TEXT NOT NULL,
    items_price BIGINT NOT NULL,
    shipping_price BIGINT NOT NULL,
    tax_price BIGINT NOT NULL,
    total_price BIGINT NOT NULL,
    payment_status TEXT NOT NULL DEFAULT 'Unpaid',
    paid_at TIMESTAMPTZ,
    payment_result JSONB,
    delivery_status TEXT NOT NULL DEFAULT 'Pending',
    delivered_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_user_created
    ON orders (user_id, created_at DESC);

CREATE TABLE IF NOT EXISTS carts (
    session_id TEXT PRIMARY KEY,
    data JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
"#;

/// Applies the schema to the connected database.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const ORDER_COLUMNS: &str = "id, user_id, items, shipping_address, payment_method, currency, \
     items_price, shipping_price, tax_price, total_price, \
     payment_status, paid_at, payment_result, delivery_status, delivered_at, created_at";

/// PostgreSQL-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let items: serde_json::Value = row.try_get("items")?;
        let shipping_address: serde_json::Value = row.try_get("shipping_address")?;
        let payment_result: Option<serde_json::Value> = row.try_get("payment_result")?;

        let currency = parse_currency(row.try_get("currency")?)?;

        let record = OrderRecord {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            items: serde_json::from_value(items)?,
            shipping_address: serde_json::from_value(shipping_address)?,
            payment_method: parse_payment_method(row.try_get("payment_method")?)?,
            items_price: money(row.try_get("items_price")?, currency)?,
            shipping_price: money(row.try_get("shipping_price")?, currency)?,
            tax_price: money(row.try_get("tax_price")?, currency)?,
            total_price: money(row.try_get("total_price")?, currency)?,
            payment_status: parse_payment_status(row.try_get("payment_status")?)?,
            paid_at: row.try_get("paid_at")?,
            payment_result: payment_result
                .map(serde_json::from_value::<PaymentCapture>)
                .transpose()?,
            delivery_status: parse_delivery_status(row.try_get("delivery_status")?)?,
            delivered_at: row.try_get("delivered_at")?,
            created_at: row.try_get("created_at")?,
        };

        Ok(Order::from_record(record)?)
    }

    async fn persist_status(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: &Order,
    ) -> Result<()> {
        let payment_result = order
            .payment_result()
            .map(serde_json::to_value)
            .transpose()?;

        sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = $2, paid_at = $3, payment_result = $4,
                delivery_status = $5, delivered_at = $6
            WHERE id = $1
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.payment_status().as_str())
        .bind(order.paid_at())
        .bind(payment_result)
        .bind(order.delivery_status().as_str())
        .bind(order.delivered_at())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn lock_order(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: OrderId,
    ) -> Result<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StoreError::OrderNotFound(id))?;

        Self::row_to_order(row)
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: Order) -> Result<Order> {
        let record = order.to_record();
        let items = serde_json::to_value(&record.items)?;
        let shipping_address = serde_json::to_value(&record.shipping_address)?;
        let payment_result = record
            .payment_result
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, items, shipping_address, payment_method, currency,
                items_price, shipping_price, tax_price, total_price,
                payment_status, paid_at, payment_result, delivery_status, delivered_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(items)
        .bind(shipping_address)
        .bind(record.payment_method.as_str())
        .bind(record.items_price.currency().code())
        .bind(record.items_price.amount())
        .bind(record.shipping_price.amount())
        .bind(record.tax_price.amount())
        .bind(record.total_price.amount())
        .bind(record.payment_status.as_str())
        .bind(record.paid_at)
        .bind(payment_result)
        .bind(record.delivery_status.as_str())
        .bind(record.delivered_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::DuplicateOrder(order.id());
            }
            StoreError::Database(e)
        })?;

        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let sql =
            format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC");
        let rows = sqlx::query(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    #[tracing::instrument(skip(self, capture))]
    async fn mark_paid(
        &self,
        id: OrderId,
        capture: PaymentCapture,
        at: DateTime<Utc>,
    ) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = Self::lock_order(&mut tx, id).await?;
        order.record_payment(capture, at)?;
        Self::persist_status(&mut tx, &order).await?;

        tx.commit().await?;
        tracing::debug!(%id, "payment transition committed");
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn mark_delivered(&self, id: OrderId, at: DateTime<Utc>) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = Self::lock_order(&mut tx, id).await?;
        order.mark_delivered(at)?;
        Self::persist_status(&mut tx, &order).await?;

        tx.commit().await?;
        tracing::debug!(%id, "delivery transition committed");
        Ok(order)
    }
}

/// PostgreSQL-backed cart store.
///
/// One JSON document per session key; the upsert makes each save atomic
/// per key, and the table survives process restarts for logged-in
/// sessions.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PostgresCartStore {
    async fn load(&self, session_id: &SessionId) -> Result<Option<Checkout>> {
        let row = sqlx::query("SELECT data FROM carts WHERE session_id = $1")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };
        let data: serde_json::Value = row.try_get("data")?;
        Ok(Some(serde_json::from_value(data)?))
    }

    async fn save(&self, checkout: &Checkout) -> Result<()> {
        let data = serde_json::to_value(checkout)?;

        sqlx::query(
            r#"
            INSERT INTO carts (session_id, data, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id) DO UPDATE
                SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(checkout.cart().session_id().as_str())
        .bind(data)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, session_id: &SessionId) -> Result<()> {
        sqlx::query("DELETE FROM carts WHERE session_id = $1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn money(amount: i64, currency: Currency) -> Result<Money> {
    Money::from_minor(amount, currency).map_err(|e| StoreError::Decode(e.to_string()))
}

fn parse_currency(code: &str) -> Result<Currency> {
    match code {
        "INR" => Ok(Currency::Inr),
        "USD" => Ok(Currency::Usd),
        other => Err(StoreError::Decode(format!("unknown currency: {other}"))),
    }
}

fn parse_payment_method(value: &str) -> Result<PaymentMethod> {
    match value {
        "PayPal" => Ok(PaymentMethod::PayPal),
        "CashOnDelivery" => Ok(PaymentMethod::CashOnDelivery),
        other => Err(StoreError::Decode(format!(
            "unknown payment method: {other}"
        ))),
    }
}

fn parse_payment_status(value: &str) -> Result<PaymentStatus> {
    match value {
        "Unpaid" => Ok(PaymentStatus::Unpaid),
        "Paid" => Ok(PaymentStatus::Paid),
        other => Err(StoreError::Decode(format!(
            "unknown payment status: {other}"
        ))),
    }
}

fn parse_delivery_status(value: &str) -> Result<DeliveryStatus> {
    match value {
        "Pending" => Ok(DeliveryStatus::Pending),
        "Delivered" => Ok(DeliveryStatus::Delivered),
        other => Err(StoreError::Decode(format!(
            "unknown delivery status: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_helpers_accept_stored_names() {
        assert_eq!(parse_currency("INR").unwrap(), Currency::Inr);
        assert_eq!(
            parse_payment_method("CashOnDelivery").unwrap(),
            PaymentMethod::CashOnDelivery
        );
        assert_eq!(parse_payment_status("Paid").unwrap(), PaymentStatus::Paid);
        assert_eq!(
            parse_delivery_status("Pending").unwrap(),
            DeliveryStatus::Pending
        );
    }

    #[test]
    fn parse_helpers_reject_unknown_values() {
        assert!(matches!(parse_currency("GBP"), Err(StoreError::Decode(_))));
        assert!(matches!(
            parse_payment_method("Stripe"),
            Err(StoreError::Decode(_))
        ));
        assert!(matches!(
            parse_payment_status("Refunded"),
            Err(StoreError::Decode(_))
        ));
    }
}
