use axum::{extract::Extension, extract::State, Json};

use crate::dtos::affiliate::{AffiliateSummary, ReferredUser};
use crate::error::AppError;
use crate::ledger;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

// GET /api/reseller/affiliate
pub async fn affiliate_summary(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AffiliateSummary>, AppError> {
    let code: Option<String> =
        sqlx::query_scalar("SELECT referral_code FROM resellers WHERE id = ?")
            .bind(auth.user_id)
            .fetch_optional(&db_pool)
            .await?
            .ok_or_else(|| AppError::not_found("Reseller not found"))?;

    // Accounts that predate the referral program have no code yet;
    // allocate one on first visit.
    let referral_code = match code {
        Some(code) => code,
        None => {
            let mut tx = db_pool.begin().await?;
            let code = ledger::generate_referral_code(&mut tx).await?;
            sqlx::query("UPDATE resellers SET referral_code = ? WHERE id = ?")
                .bind(&code)
                .bind(auth.user_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            code
        }
    };

    let total_earnings: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM referral_earnings WHERE referrer_id = ?",
    )
    .bind(auth.user_id)
    .fetch_one(&db_pool)
    .await?;

    let referred_users = sqlx::query_as::<_, ReferredUser>(
        "SELECT id, name, email FROM resellers WHERE referred_by = ? ORDER BY id DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(AffiliateSummary {
        referral_code,
        total_earnings,
        referred_users,
    }))
}
