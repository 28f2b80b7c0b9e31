use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define `app.user_id` (a "chave" lida pelas políticas RLS).
/// `set_config(..., true)` só vale dentro da transação, por isso ela precisa ficar aberta
/// até o handler terminar e chamar `commit()`.
pub async fn begin_rls_transaction(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = app_state.db_pool.begin().await?;

    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user.0.id.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
