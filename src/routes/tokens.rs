use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::{
    models::account_token::TokenPurpose,
    responses::{JsonResponse, LOGIN_PAGE},
    state::AppState,
    utils::{
        password::{hash_password, is_acceptable_password, MIN_PASSWORD_LEN},
        token::digest_token,
    },
};

pub const RESET_PASSWORD_PAGE: &str = "/redefinir-senha.html";

const INVALID_CONFIRMATION_LINK: &str = "Link de confirmação inválido ou expirado.";
const INVALID_RESET_LINK: &str = "Link de redefinição inválido ou expirado.";
const TRY_AGAIN: &str = "Não foi possível concluir a operação. Tente novamente.";

#[derive(Deserialize)]
pub struct ResetPasswordPayload {
    pub senha: String,
}

/// Target of the link in the registration email.
pub async fn handle_confirm_registration(
    State(state): State<AppState>,
    Path((apelido, token)): Path<(String, String)>,
) -> Response {
    let token_hash = digest_token(&token);
    let now = OffsetDateTime::now_utc();
    let purpose = TokenPurpose::ConfirmRegistration;

    let stored = match state.tokens.find_valid_token(&token_hash, purpose, now).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            warn!("Rejected unknown, expired or used confirmation token");
            return JsonResponse::redirect_to_login_with_error(INVALID_CONFIRMATION_LINK)
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "DB error verifying confirmation token");
            return JsonResponse::redirect_to_login_with_error(TRY_AGAIN).into_response();
        }
    };

    // The link names the account; a token presented under someone else's
    // apelido is rejected without being spent.
    match state.db.find_user_by_id(stored.user_id).await {
        Ok(Some(user)) if user.apelido == apelido => {}
        Ok(_) => {
            warn!(user_id = %stored.user_id, "Confirmation token presented with mismatched apelido");
            return JsonResponse::redirect_to_login_with_error(INVALID_CONFIRMATION_LINK)
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "DB error loading user for confirmation");
            return JsonResponse::redirect_to_login_with_error(TRY_AGAIN).into_response();
        }
    }

    let user_id = match state.tokens.consume_token(&token_hash, purpose, now).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            return JsonResponse::redirect_to_login_with_error(INVALID_CONFIRMATION_LINK)
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "DB error consuming confirmation token");
            return JsonResponse::redirect_to_login_with_error(TRY_AGAIN).into_response();
        }
    };

    if let Err(e) = state.db.set_user_verified(user_id).await {
        error!(%user_id, error = %e, "Failed to set user as verified");
        return JsonResponse::redirect_to_login_with_error(TRY_AGAIN).into_response();
    }

    info!(%user_id, "Email confirmed");
    Redirect::to(&format!("{}?cadastro=confirmado", LOGIN_PAGE)).into_response()
}

/// Target of the link in the reset email. Checks the token without spending
/// it and forwards to the page holding the new-password form.
pub async fn handle_verify_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Response {
    let now = OffsetDateTime::now_utc();

    match state
        .tokens
        .find_valid_token(&digest_token(&token), TokenPurpose::PasswordReset, now)
        .await
    {
        Ok(Some(_)) => Redirect::to(&format!(
            "{}?token={}",
            RESET_PASSWORD_PAGE,
            urlencoding::encode(&token)
        ))
        .into_response(),
        Ok(None) => JsonResponse::redirect_to_login_with_error(INVALID_RESET_LINK).into_response(),
        Err(e) => {
            error!(error = %e, "DB error verifying reset token");
            JsonResponse::redirect_to_login_with_error(TRY_AGAIN).into_response()
        }
    }
}

pub async fn handle_reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Response {
    if !is_acceptable_password(&payload.senha) {
        return JsonResponse::bad_request(&format!(
            "A senha deve ter pelo menos {} caracteres.",
            MIN_PASSWORD_LEN
        ))
        .into_response();
    }

    let password_hash = match hash_password(&payload.senha) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return JsonResponse::server_error("Erro interno.").into_response();
        }
    };

    let now = OffsetDateTime::now_utc();
    let user_id = match state
        .tokens
        .redeem_password_reset(&digest_token(&token), &password_hash, now)
        .await
    {
        Ok(Some(id)) => id,
        Ok(None) => return JsonResponse::bad_request(INVALID_RESET_LINK).into_response(),
        Err(e) => {
            error!(error = %e, "DB error redeeming reset token");
            return JsonResponse::server_error("Erro interno.").into_response();
        }
    };

    info!(%user_id, "Password reset");
    JsonResponse::success("Senha redefinida com sucesso.").into_response()
}
