use axum::{extract::Extension, extract::State, Json};

use crate::dtos::transaction::TransactionEntry;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

// GET /api/reseller/transactions
//
// There is no transactions table; the history is derived from the two
// places a transaction reference is recorded: approved withdrawals and
// submitted advance payments.
pub async fn list_transactions(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<TransactionEntry>>, AppError> {
    let entries = sqlx::query_as::<_, TransactionEntry>(
        "SELECT w.id AS id, w.transaction_id AS transaction_id, 'withdrawal' AS type, \
                w.amount AS amount, 'Withdrawal via ' || w.method AS description, \
                w.created_at AS created_at \
         FROM withdrawals w \
         WHERE w.reseller_id = ? AND w.status = 'Approved' \
         UNION ALL \
         SELECT o.id, o.transaction_id, 'payment', \
                o.admin_price + o.delivery_charge, \
                'Advance payment for order #' || o.id, o.created_at \
         FROM orders o \
         WHERE o.reseller_id = ? AND o.transaction_id IS NOT NULL \
         ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .bind(auth.user_id)
    .fetch_all(&db_pool)
    .await?;
    Ok(Json(entries))
}
