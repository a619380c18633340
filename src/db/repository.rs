//! Database repository for CRUD operations.
//!
//! Owns every Lead and Notification record. Ownership and visibility rules
//! live here: all reads are projected through the acting user's role, and all
//! mutations check that the actor is the owning partner or an admin.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::commission;
use crate::errors::AppError;
use crate::models::{
    dedup_products, CreateLeadRequest, Datastore, Lead, LeadStatus, Notification,
    NotificationType, ProductType, RevisionInfo, Role, UpdateLeadRequest, User,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Get the bootstrap snapshot for the acting user: meta, the leads they
    /// may see, and their own notifications.
    pub async fn get_datastore(&self, actor: &User) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let leads = self.list_leads_for(actor).await?;
        let notifications = self.list_notifications_for(actor).await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            leads,
            notifications,
        })
    }

    // ==================== USER / SESSION OPERATIONS ====================

    /// Find a user by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, name, email, role FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Create a new user.
    pub async fn create_user(&self, name: &str, email: &str, role: Role) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO users (id, name, email, role) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(email)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
        })
    }

    /// Open a session for a user and return the opaque token.
    pub async fn create_session(&self, user_id: &str) -> Result<String, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Resolve a session token to its user, if the session exists.
    pub async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            r#"SELECT u.id, u.name, u.email, u.role
               FROM sessions s JOIN users u ON u.id = s.user_id
               WHERE s.token = ?"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Close a session. Unknown tokens are a no-op: logout is idempotent.
    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== LEAD OPERATIONS ====================

    /// List the leads visible to the acting user: all of them for an admin,
    /// only their own for a partner. Most recent first.
    pub async fn list_leads_for(&self, actor: &User) -> Result<Vec<Lead>, AppError> {
        let rows = if actor.is_admin() {
            sqlx::query(
                r#"SELECT id, partner_id, partner_name, name, phone, email, products,
                          status, date_added, estimated_commission, version
                   FROM leads ORDER BY date_added DESC, id"#,
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"SELECT id, partner_id, partner_name, name, phone, email, products,
                          status, date_added, estimated_commission, version
                   FROM leads WHERE partner_id = ? ORDER BY date_added DESC, id"#,
            )
            .bind(&actor.id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.iter().map(lead_from_row).collect())
    }

    /// Get a lead by ID, unprojected.
    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, partner_id, partner_name, name, phone, email, products,
                      status, date_added, estimated_commission, version
               FROM leads WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(lead_from_row))
    }

    /// Get a lead by ID through the acting user's visibility. A partner
    /// fetching someone else's lead gets None, not a Forbidden hint.
    pub async fn get_lead_for(&self, actor: &User, id: &str) -> Result<Option<Lead>, AppError> {
        let lead = self.get_lead(id).await?;
        Ok(lead.filter(|l| actor.is_admin() || l.partner_id == actor.id))
    }

    /// Create a new lead owned by the acting user.
    pub async fn create_lead(
        &self,
        actor: &User,
        request: &CreateLeadRequest,
    ) -> Result<Lead, AppError> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if request.phone.trim().is_empty() {
            return Err(AppError::Validation("Phone is required".to_string()));
        }
        let products = dedup_products(&request.products);
        if products.is_empty() {
            return Err(AppError::Validation(
                "At least one product is required".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let estimated_commission = commission::estimate(&products);
        let products_json = products_to_json(&products);

        sqlx::query(
            r#"INSERT INTO leads (
                id, partner_id, partner_name, name, phone, email, products,
                status, date_added, estimated_commission, version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"#,
        )
        .bind(&id)
        .bind(&actor.id)
        .bind(&actor.name)
        .bind(&request.name)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&products_json)
        .bind(LeadStatus::New.as_str())
        .bind(&now)
        .bind(estimated_commission)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(Lead {
            id,
            partner_id: actor.id.clone(),
            partner_name: actor.name.clone(),
            name: request.name.clone(),
            phone: request.phone.clone(),
            email: request.email.clone(),
            products,
            status: LeadStatus::New,
            date_added: now,
            estimated_commission,
            version: 1,
        })
    }

    /// Update a lead with ownership checks and optimistic concurrency control.
    ///
    /// `id`, `partner_id`, `partner_name` and `date_added` are never
    /// overwritten. When an admin changes the status of a lead they do not
    /// own, a STATUS_CHANGE notification for the owner is written in the same
    /// transaction.
    pub async fn update_lead(
        &self,
        actor: &User,
        id: &str,
        request: &UpdateLeadRequest,
    ) -> Result<Lead, AppError> {
        let existing = self
            .get_lead(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;

        if !actor.is_admin() && existing.partner_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the owning partner or an admin may modify this lead".to_string(),
            ));
        }

        // Check version for optimistic concurrency
        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Name cannot be empty".to_string()));
            }
        }
        if let Some(phone) = &request.phone {
            if phone.trim().is_empty() {
                return Err(AppError::Validation("Phone cannot be empty".to_string()));
            }
        }

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let phone = request.phone.as_ref().unwrap_or(&existing.phone);
        let email = request.email.clone().or(existing.email.clone());
        let products = match &request.products {
            Some(products) => {
                let products = dedup_products(products);
                if products.is_empty() {
                    return Err(AppError::Validation(
                        "At least one product is required".to_string(),
                    ));
                }
                products
            }
            None => existing.products.clone(),
        };
        let status = request.status.unwrap_or(existing.status);
        let estimated_commission = commission::estimate(&products);
        let products_json = products_to_json(&products);
        let new_version = existing.version + 1;

        let mut tx = self.pool.begin().await?;

        // Conditional UPDATE with version check to prevent race conditions
        let result = sqlx::query(
            r#"UPDATE leads SET
                name = ?, phone = ?, email = ?, products = ?, status = ?,
                estimated_commission = ?, version = ?
            WHERE id = ? AND version = ?"#,
        )
        .bind(name)
        .bind(phone)
        .bind(&email)
        .bind(&products_json)
        .bind(status.as_str())
        .bind(estimated_commission)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Race condition - version changed between read and write
            drop(tx);
            let current = self.get_lead(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|l| l.version).unwrap_or(0),
            });
        }

        let updated = Lead {
            id: id.to_string(),
            partner_id: existing.partner_id.clone(),
            partner_name: existing.partner_name.clone(),
            name: name.clone(),
            phone: phone.clone(),
            email,
            products,
            status,
            date_added: existing.date_added.clone(),
            estimated_commission,
            version: new_version,
        };

        // A third-party status change notifies the owning partner. Owner
        // edits and admin edits of the admin's own leads stay silent.
        if actor.is_admin() && actor.id != existing.partner_id && status != existing.status {
            let notification = Notification::status_change(&updated, existing.status, status);
            insert_notification(&mut tx, &notification).await?;
        }

        increment_revision_tx(&mut tx).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a lead permanently. Same ownership rule as update.
    pub async fn delete_lead(&self, actor: &User, id: &str) -> Result<(), AppError> {
        let existing = self
            .get_lead(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;

        if !actor.is_admin() && existing.partner_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the owning partner or an admin may delete this lead".to_string(),
            ));
        }

        sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;
        Ok(())
    }

    // ==================== NOTIFICATION OPERATIONS ====================

    /// List the acting user's notifications, newest first.
    pub async fn list_notifications_for(&self, actor: &User) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, lead_id, title, message, date, is_read, kind
               FROM notifications WHERE user_id = ? ORDER BY date DESC, id"#,
        )
        .bind(&actor.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(notification_from_row).collect())
    }

    /// Mark one of the acting user's notifications as read.
    ///
    /// Someone else's notification id reads as NotFound: recipients only.
    pub async fn mark_notification_read(&self, actor: &User, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&actor.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Notification {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    /// Mark all of the acting user's notifications as read.
    pub async fn mark_all_notifications_read(&self, actor: &User) -> Result<(), AppError> {
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ?")
            .bind(&actor.id)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;
        Ok(())
    }

    /// Delete all of the acting user's notifications.
    pub async fn clear_notifications(&self, actor: &User) -> Result<(), AppError> {
        sqlx::query("DELETE FROM notifications WHERE user_id = ?")
            .bind(&actor.id)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;
        Ok(())
    }
}

/// Insert a notification inside an open transaction.
async fn insert_notification(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    notification: &Notification,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO notifications (id, user_id, lead_id, title, message, date, is_read, kind)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&notification.id)
    .bind(&notification.user_id)
    .bind(&notification.lead_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.date)
    .bind(notification.is_read as i32)
    .bind(notification.kind.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Bump the revision counter inside an open transaction.
async fn increment_revision_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
) -> Result<i64, AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut **tx)
        .await?;

    let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
        .fetch_one(&mut **tx)
        .await?;
    Ok(row.get("revision_id"))
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let role_str: String = row.get("role");
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role: Role::from_str(&role_str).unwrap_or(Role::Partner),
    }
}

fn lead_from_row(row: &sqlx::sqlite::SqliteRow) -> Lead {
    let products_str: String = row.get("products");
    let status_str: String = row.get("status");
    Lead {
        id: row.get("id"),
        partner_id: row.get("partner_id"),
        partner_name: row.get("partner_name"),
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        products: parse_products(&products_str),
        status: LeadStatus::from_str(&status_str).unwrap_or(LeadStatus::New),
        date_added: row.get("date_added"),
        estimated_commission: row.get("estimated_commission"),
        version: row.get("version"),
    }
}

fn notification_from_row(row: &sqlx::sqlite::SqliteRow) -> Notification {
    let is_read: i32 = row.get("is_read");
    let kind_str: String = row.get("kind");
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        lead_id: row.get("lead_id"),
        title: row.get("title"),
        message: row.get("message"),
        date: row.get("date"),
        is_read: is_read != 0,
        kind: NotificationType::from_str(&kind_str).unwrap_or(NotificationType::Info),
    }
}

fn products_to_json(products: &[ProductType]) -> String {
    let codes: Vec<&str> = products.iter().map(|p| p.as_str()).collect();
    serde_json::to_string(&codes).unwrap_or_default()
}

fn parse_products(s: &str) -> Vec<ProductType> {
    let codes: Vec<String> = serde_json::from_str(s).unwrap_or_default();
    codes
        .iter()
        .filter_map(|c| ProductType::from_str(c))
        .collect()
}
