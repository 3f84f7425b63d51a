pub mod seed;

use crate::domain::models::{AnswerSource, BidStatus, OrderStatus, ReviewStatus, Role};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hash: String,
    pub role: Role,
    pub balance: f64,
    pub salary: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub chef_id: Option<Uuid>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub delivery_person_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub subtotal: f64,
}

/// A line going into a new order; subtotal is computed from the menu price
/// before this ever reaches the database.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub subtotal: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DeliveryBid {
    pub id: Uuid,
    pub order_id: Uuid,
    pub delivery_person_id: Uuid,
    pub bid_amount: Option<f64>,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Complaint {
    pub id: Uuid,
    pub filed_by: Uuid,
    pub filed_against: Uuid,
    pub order_id: Option<Uuid>,
    pub kind: Option<String>,
    pub description: String,
    pub status: ReviewStatus,
    pub decision: Option<String>,
    pub manager_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Compliment {
    pub id: Uuid,
    pub filed_by: Uuid,
    pub filed_against: Uuid,
    pub order_id: Option<Uuid>,
    pub kind: Option<String>,
    pub description: String,
    pub status: ReviewStatus,
    pub decision: Option<String>,
    pub manager_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Warning {
    pub id: Uuid,
    pub account_id: Uuid,
    pub reason: String,
    pub complaint_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct BlacklistEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct KbEntry {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub rating: f64,
    pub rating_count: i32,
    pub flagged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AiResponseRating {
    pub id: Uuid,
    pub kb_entry_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub query: String,
    pub response: String,
    pub rating: i16,
    pub source: AnswerSource,
    pub created_at: DateTime<Utc>,
}

const ACCOUNT_COLUMNS: &str =
    "id, username, email, hash, role, balance, salary, is_active, created_at";

// ---------------------------------------------------------------------------
// accounts
// ---------------------------------------------------------------------------

pub async fn find_account_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

pub async fn find_account_by_username(pool: &PgPool, username: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

pub async fn username_taken(pool: &PgPool, username: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE username = $1")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn email_taken(pool: &PgPool, email: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn insert_account(
    pool: &PgPool,
    username: &str,
    email: &str,
    hash: &str,
    role: Role,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO accounts (id, username, email, hash, role)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(hash)
    .bind(role)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn set_account_role(pool: &PgPool, id: Uuid, role: Role) -> Result<()> {
    sqlx::query("UPDATE accounts SET role = $1 WHERE id = $2")
        .bind(role)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_account_active(pool: &PgPool, id: Uuid, active: bool) -> Result<()> {
    sqlx::query("UPDATE accounts SET is_active = $1 WHERE id = $2")
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_account_salary(pool: &PgPool, id: Uuid, salary: f64) -> Result<()> {
    sqlx::query("UPDATE accounts SET salary = $1 WHERE id = $2")
        .bind(salary)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn add_balance(pool: &PgPool, id: Uuid, amount: f64) -> Result<f64> {
    let balance: f64 =
        sqlx::query_scalar("UPDATE accounts SET balance = balance + $1 WHERE id = $2 RETURNING balance")
            .bind(amount)
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(balance)
}

pub async fn list_staff(pool: &PgPool) -> Result<Vec<Account>> {
    let staff = sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT {ACCOUNT_COLUMNS}
        FROM accounts
        WHERE role IN ('CHEF', 'DELIVERY_PERSON')
        ORDER BY username
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(staff)
}

// ---------------------------------------------------------------------------
// warnings / blacklist
// ---------------------------------------------------------------------------

pub async fn insert_warning(
    pool: &PgPool,
    account_id: Uuid,
    reason: &str,
    complaint_id: Option<Uuid>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO warnings (id, account_id, reason, complaint_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account_id)
    .bind(reason)
    .bind(complaint_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn warning_count(pool: &PgPool, account_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM warnings WHERE account_id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn is_blacklisted(pool: &PgPool, account_id: Uuid) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blacklist WHERE account_id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Idempotent: a second blacklisting of the same account is a no-op.
pub async fn blacklist_account(pool: &PgPool, account_id: Uuid, reason: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO blacklist (id, account_id, reason)
        VALUES ($1, $2, $3)
        ON CONFLICT (account_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account_id)
    .bind(reason)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_blacklist(pool: &PgPool) -> Result<Vec<BlacklistEntry>> {
    let entries = sqlx::query_as::<_, BlacklistEntry>(
        "SELECT id, account_id, reason, created_at FROM blacklist ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

// ---------------------------------------------------------------------------
// menu
// ---------------------------------------------------------------------------

const MENU_COLUMNS: &str =
    "id, name, description, price, category, chef_id, is_available, created_at";

pub async fn list_menu(
    pool: &PgPool,
    search: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<MenuItem>> {
    let pattern = search.map(|s| format!("%{s}%"));
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        r#"
        SELECT {MENU_COLUMNS}
        FROM menu_items
        WHERE is_available = TRUE
          AND ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1)
          AND ($2::text IS NULL OR category = $2)
        ORDER BY name
        "#
    ))
    .bind(pattern)
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_menu_item(pool: &PgPool, id: Uuid) -> Result<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {MENU_COLUMNS} FROM menu_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

pub async fn insert_menu_item(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    price: f64,
    category: Option<&str>,
    chef_id: Option<Uuid>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO menu_items (id, name, description, price, category, chef_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(category)
    .bind(chef_id)
    .execute(pool)
    .await?;
    Ok(id)
}

/// The customer's most-ordered items across delivered orders.
pub async fn most_ordered_items(
    pool: &PgPool,
    customer_id: Uuid,
    limit: i64,
) -> Result<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(
        r#"
        SELECT m.id, m.name, m.description, m.price, m.category, m.chef_id,
               m.is_available, m.created_at
        FROM menu_items m
        JOIN order_items oi ON oi.menu_item_id = m.id
        JOIN orders o ON o.id = oi.order_id
        WHERE o.customer_id = $1
          AND o.status = 'DELIVERED'
        GROUP BY m.id
        ORDER BY SUM(oi.quantity) DESC
        LIMIT $2
        "#,
    )
    .bind(customer_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

// ---------------------------------------------------------------------------
// orders
// ---------------------------------------------------------------------------

const ORDER_COLUMNS: &str = "id, customer_id, delivery_person_id, status, total_amount, \
                             delivery_address, notes, created_at";

/// Debits the customer's balance and creates the order with its line items in
/// one transaction. Returns `None` (nothing mutated) when the balance does
/// not cover the total.
pub async fn place_order(
    pool: &PgPool,
    customer_id: Uuid,
    items: &[NewOrderItem],
    total: f64,
    delivery_address: Option<&str>,
    notes: Option<&str>,
) -> Result<Option<Uuid>> {
    let mut tx = pool.begin().await?;

    let debited = sqlx::query(
        "UPDATE accounts SET balance = balance - $1 WHERE id = $2 AND balance >= $1",
    )
    .bind(total)
    .bind(customer_id)
    .execute(&mut *tx)
    .await?;
    if debited.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    let order_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO orders (id, customer_id, status, total_amount, delivery_address, notes)
        VALUES ($1, $2, 'PENDING', $3, $4, $5)
        "#,
    )
    .bind(order_id)
    .bind(customer_id)
    .bind(total)
    .bind(delivery_address)
    .bind(notes)
    .execute(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, menu_item_id, quantity, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .bind(item.subtotal)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(Some(order_id))
}

pub async fn find_order(pool: &PgPool, id: Uuid) -> Result<Option<Order>> {
    let order =
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(order)
}

pub async fn orders_by_customer(pool: &PgPool, customer_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn orders_by_courier(pool: &PgPool, courier_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE delivery_person_id = $1 ORDER BY created_at DESC"
    ))
    .bind(courier_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Orders containing at least one of the chef's dishes.
pub async fn orders_for_chef(pool: &PgPool, chef_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
        SELECT DISTINCT o.id, o.customer_id, o.delivery_person_id, o.status, o.total_amount,
                        o.delivery_address, o.notes, o.created_at
        FROM orders o
        JOIN order_items oi ON oi.order_id = o.id
        JOIN menu_items m ON m.id = oi.menu_item_id
        WHERE m.chef_id = $1
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(chef_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Orders still waiting for a courier, i.e. biddable.
pub async fn open_delivery_orders(pool: &PgPool) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        r#"
        SELECT {ORDER_COLUMNS}
        FROM orders
        WHERE status IN ('PENDING', 'READY')
          AND delivery_person_id IS NULL
        ORDER BY created_at
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn set_order_status(pool: &PgPool, id: Uuid, status: OrderStatus) -> Result<()> {
    sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn order_items(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, menu_item_id, quantity, subtotal FROM order_items WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Assigns a courier and resolves the order's bids in one transaction: the
/// courier's bid becomes Accepted, every other Pending bid is Rejected.
pub async fn assign_courier(pool: &PgPool, order_id: Uuid, courier_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE orders SET delivery_person_id = $1, status = 'OUT_FOR_DELIVERY' WHERE id = $2",
    )
    .bind(courier_id)
    .bind(order_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE delivery_bids SET status = 'ACCEPTED' WHERE order_id = $1 AND delivery_person_id = $2",
    )
    .bind(order_id)
    .bind(courier_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE delivery_bids SET status = 'REJECTED' WHERE order_id = $1 AND status = 'PENDING'",
    )
    .bind(order_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn delivered_total(pool: &PgPool, customer_id: Uuid) -> Result<f64> {
    let total: Option<f64> = sqlx::query_scalar(
        "SELECT SUM(total_amount) FROM orders WHERE customer_id = $1 AND status = 'DELIVERED'",
    )
    .bind(customer_id)
    .fetch_one(pool)
    .await?;
    Ok(total.unwrap_or(0.0))
}

pub async fn delivered_order_ids(pool: &PgPool, customer_id: Uuid) -> Result<Vec<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM orders WHERE customer_id = $1 AND status = 'DELIVERED'",
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn approved_complaints_for_orders(pool: &PgPool, order_ids: &[Uuid]) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM complaints WHERE order_id = ANY($1) AND status = 'APPROVED'",
    )
    .bind(order_ids)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

// ---------------------------------------------------------------------------
// delivery bids
// ---------------------------------------------------------------------------

const BID_COLUMNS: &str = "id, order_id, delivery_person_id, bid_amount, status, created_at";

/// One bid per (order, courier); a repeat insert reports `false`.
pub async fn insert_bid(
    pool: &PgPool,
    order_id: Uuid,
    delivery_person_id: Uuid,
    bid_amount: Option<f64>,
) -> Result<bool> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO delivery_bids (id, order_id, delivery_person_id, bid_amount)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (order_id, delivery_person_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(delivery_person_id)
    .bind(bid_amount)
    .execute(pool)
    .await?;
    Ok(inserted.rows_affected() > 0)
}

pub async fn pending_bids(pool: &PgPool) -> Result<Vec<DeliveryBid>> {
    let bids = sqlx::query_as::<_, DeliveryBid>(&format!(
        "SELECT {BID_COLUMNS} FROM delivery_bids WHERE status = 'PENDING' ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;
    Ok(bids)
}

// ---------------------------------------------------------------------------
// complaints / compliments
// ---------------------------------------------------------------------------

const COMPLAINT_COLUMNS: &str = "id, filed_by, filed_against, order_id, kind, description, \
                                 status, decision, manager_notes, created_at, reviewed_at";

pub async fn insert_complaint(
    pool: &PgPool,
    filed_by: Uuid,
    filed_against: Uuid,
    order_id: Option<Uuid>,
    kind: Option<&str>,
    description: &str,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO complaints (id, filed_by, filed_against, order_id, kind, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(filed_by)
    .bind(filed_against)
    .bind(order_id)
    .bind(kind)
    .bind(description)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn find_complaint(pool: &PgPool, id: Uuid) -> Result<Option<Complaint>> {
    let complaint = sqlx::query_as::<_, Complaint>(&format!(
        "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(complaint)
}

pub async fn complaints_by_filer(pool: &PgPool, filed_by: Uuid) -> Result<Vec<Complaint>> {
    let complaints = sqlx::query_as::<_, Complaint>(&format!(
        "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE filed_by = $1 ORDER BY created_at DESC"
    ))
    .bind(filed_by)
    .fetch_all(pool)
    .await?;
    Ok(complaints)
}

pub async fn pending_complaints(pool: &PgPool) -> Result<Vec<Complaint>> {
    let complaints = sqlx::query_as::<_, Complaint>(&format!(
        "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE status = 'PENDING' ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;
    Ok(complaints)
}

pub async fn mark_complaint_reviewed(
    pool: &PgPool,
    id: Uuid,
    status: ReviewStatus,
    decision: &str,
    notes: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE complaints
        SET status = $1, decision = $2, manager_notes = $3, reviewed_at = $4
        WHERE id = $5
        "#,
    )
    .bind(status)
    .bind(decision)
    .bind(notes)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_compliment(
    pool: &PgPool,
    filed_by: Uuid,
    filed_against: Uuid,
    order_id: Option<Uuid>,
    kind: Option<&str>,
    description: &str,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO compliments (id, filed_by, filed_against, order_id, kind, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(filed_by)
    .bind(filed_against)
    .bind(order_id)
    .bind(kind)
    .bind(description)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn find_compliment(pool: &PgPool, id: Uuid) -> Result<Option<Compliment>> {
    let compliment = sqlx::query_as::<_, Compliment>(&format!(
        "SELECT {COMPLAINT_COLUMNS} FROM compliments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(compliment)
}

pub async fn pending_compliments(pool: &PgPool) -> Result<Vec<Compliment>> {
    let compliments = sqlx::query_as::<_, Compliment>(&format!(
        "SELECT {COMPLAINT_COLUMNS} FROM compliments WHERE status = 'PENDING' ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;
    Ok(compliments)
}

pub async fn mark_compliment_reviewed(
    pool: &PgPool,
    id: Uuid,
    status: ReviewStatus,
    decision: &str,
    notes: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE compliments
        SET status = $1, decision = $2, manager_notes = $3, reviewed_at = $4
        WHERE id = $5
        "#,
    )
    .bind(status)
    .bind(decision)
    .bind(notes)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// chef ratings
// ---------------------------------------------------------------------------

pub async fn insert_rating(
    pool: &PgPool,
    order_id: Uuid,
    chef_id: Uuid,
    customer_id: Uuid,
    menu_item_id: Option<Uuid>,
    rating: i16,
    comment: Option<&str>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO ratings (id, order_id, chef_id, customer_id, menu_item_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(chef_id)
    .bind(customer_id)
    .bind(menu_item_id)
    .bind(rating)
    .bind(comment)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn chef_average_rating(pool: &PgPool, chef_id: Uuid) -> Result<Option<f64>> {
    let avg: Option<f64> =
        sqlx::query_scalar("SELECT AVG(rating::float8) FROM ratings WHERE chef_id = $1")
            .bind(chef_id)
            .fetch_one(pool)
            .await?;
    Ok(avg)
}

// ---------------------------------------------------------------------------
// knowledge base
// ---------------------------------------------------------------------------

const KB_COLUMNS: &str =
    "id, question, answer, rating, rating_count, flagged, created_at, updated_at";

pub async fn find_kb_entry_by_question(pool: &PgPool, question: &str) -> Result<Option<KbEntry>> {
    let entry = sqlx::query_as::<_, KbEntry>(&format!(
        "SELECT {KB_COLUMNS} FROM knowledge_base_entries WHERE question = $1"
    ))
    .bind(question)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

/// Find-or-create keyed by the exact question string.
pub async fn upsert_kb_entry(pool: &PgPool, question: &str, answer: &str) -> Result<KbEntry> {
    sqlx::query(
        r#"
        INSERT INTO knowledge_base_entries (id, question, answer)
        VALUES ($1, $2, $3)
        ON CONFLICT (question) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(question)
    .bind(answer)
    .execute(pool)
    .await?;

    let entry = find_kb_entry_by_question(pool, question)
        .await?
        .ok_or_else(|| anyhow::anyhow!("knowledge base entry vanished after upsert"))?;
    Ok(entry)
}

/// Flagged entries first, then newest.
pub async fn list_kb_entries(pool: &PgPool) -> Result<Vec<KbEntry>> {
    let entries = sqlx::query_as::<_, KbEntry>(&format!(
        "SELECT {KB_COLUMNS} FROM knowledge_base_entries ORDER BY flagged DESC, created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn flagged_kb_entries(pool: &PgPool) -> Result<Vec<KbEntry>> {
    let entries = sqlx::query_as::<_, KbEntry>(&format!(
        "SELECT {KB_COLUMNS} FROM knowledge_base_entries WHERE flagged = TRUE ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn set_kb_flagged(pool: &PgPool, id: Uuid, flagged: bool) -> Result<bool> {
    let updated = sqlx::query(
        "UPDATE knowledge_base_entries SET flagged = $1, updated_at = $2 WHERE id = $3",
    )
    .bind(flagged)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(updated.rows_affected() > 0)
}

pub async fn delete_kb_entry(pool: &PgPool, id: Uuid) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM knowledge_base_entries WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(deleted.rows_affected() > 0)
}

pub async fn update_kb_aggregate(pool: &PgPool, id: Uuid, rating: f64, count: i32) -> Result<()> {
    sqlx::query(
        "UPDATE knowledge_base_entries SET rating = $1, rating_count = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(rating)
    .bind(count)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// assistant response ratings
// ---------------------------------------------------------------------------

const AI_RATING_COLUMNS: &str =
    "id, kb_entry_id, account_id, query, response, rating, source, created_at";

pub async fn insert_ai_rating(
    pool: &PgPool,
    kb_entry_id: Option<Uuid>,
    account_id: Option<Uuid>,
    query: &str,
    response: &str,
    source: AnswerSource,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO ai_response_ratings (id, kb_entry_id, account_id, query, response, rating, source)
        VALUES ($1, $2, $3, $4, $5, 0, $6)
        "#,
    )
    .bind(id)
    .bind(kb_entry_id)
    .bind(account_id)
    .bind(query)
    .bind(response)
    .bind(source)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn find_ai_rating(pool: &PgPool, id: Uuid) -> Result<Option<AiResponseRating>> {
    let record = sqlx::query_as::<_, AiResponseRating>(&format!(
        "SELECT {AI_RATING_COLUMNS} FROM ai_response_ratings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn set_ai_rating_value(pool: &PgPool, id: Uuid, value: i16) -> Result<()> {
    sqlx::query("UPDATE ai_response_ratings SET rating = $1 WHERE id = $2")
        .bind(value)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Average and count over an entry's scored ratings; zero (unrated or
/// flag-votes) never enters the aggregate.
pub async fn kb_positive_rating_stats(pool: &PgPool, kb_entry_id: Uuid) -> Result<(f64, i64)> {
    let row: (Option<f64>, i64) = sqlx::query_as(
        r#"
        SELECT AVG(rating::float8), COUNT(*)
        FROM ai_response_ratings
        WHERE kb_entry_id = $1 AND rating > 0
        "#,
    )
    .bind(kb_entry_id)
    .fetch_one(pool)
    .await?;
    Ok((row.0.unwrap_or(0.0), row.1))
}
