use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    models::user::{
        is_acceptable_apelido, normalize_email, EmailPayload, LoginPayload, SignupPayload,
    },
    responses::JsonResponse,
    routes::helpers::{send_confirmation_email, send_password_reset_email},
    session::{removal_cookie, session_cookie, SESSION_COOKIE},
    state::AppState,
    utils::password::{hash_password, is_acceptable_password, verify_password, MIN_PASSWORD_LEN},
};

const FORGOT_PASSWORD_MESSAGE: &str =
    "Se o e-mail estiver cadastrado, enviaremos um link para redefinir a senha.";
const RESEND_CONFIRMATION_MESSAGE: &str =
    "Se houver um cadastro pendente para este e-mail, enviaremos um novo link de confirmação.";

pub async fn handle_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Response {
    let email = normalize_email(&payload.email);
    let apelido = payload.apelido.trim();

    if email.is_empty() || apelido.is_empty() || payload.senha.is_empty() {
        return JsonResponse::bad_request("Preencha e-mail, apelido e senha.").into_response();
    }
    if !email.contains('@') {
        return JsonResponse::bad_request("E-mail inválido.").into_response();
    }
    if !is_acceptable_apelido(apelido) {
        return JsonResponse::bad_request("Apelido inválido.").into_response();
    }
    if !is_acceptable_password(&payload.senha) {
        return JsonResponse::bad_request(&format!(
            "A senha deve ter pelo menos {} caracteres.",
            MIN_PASSWORD_LEN
        ))
        .into_response();
    }

    match state.db.is_email_taken(&email).await {
        Ok(true) => return JsonResponse::conflict("E-mail já cadastrado.").into_response(),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Failed to check email availability");
            return JsonResponse::server_error("Erro interno.").into_response();
        }
    }
    match state.db.is_apelido_taken(apelido).await {
        Ok(true) => return JsonResponse::conflict("Apelido já está em uso.").into_response(),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Failed to check apelido availability");
            return JsonResponse::server_error("Erro interno.").into_response();
        }
    }

    let password_hash = match hash_password(&payload.senha) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return JsonResponse::server_error("Erro interno.").into_response();
        }
    };

    let user_id = match state.db.create_user(&email, apelido, &password_hash).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "Failed to insert user");
            return JsonResponse::server_error("Não foi possível criar o cadastro.").into_response();
        }
    };

    if let Err(e) = send_confirmation_email(&state, user_id, &email, apelido).await {
        warn!(%user_id, error = %e, "Rolling back sign-up after confirmation email failure");
        if let Err(e) = state.db.delete_user(user_id).await {
            error!(%user_id, error = %e, "Failed to roll back user after sign-up failure");
        }
        return JsonResponse::server_error("Não foi possível enviar o e-mail de confirmação.")
            .into_response();
    }

    info!(%user_id, "User registered, confirmation email sent");
    JsonResponse::created("Cadastro realizado. Verifique seu e-mail para confirmar a conta.")
        .into_response()
}

pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let email = normalize_email(&payload.email);

    let user = match state.db.find_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return JsonResponse::unauthorized("E-mail ou senha inválidos.").into_response(),
        Err(e) => {
            error!(error = %e, "Failed to look up user for login");
            return JsonResponse::server_error("Erro interno.").into_response();
        }
    };

    match verify_password(&payload.senha, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return JsonResponse::unauthorized("E-mail ou senha inválidos.").into_response()
        }
        Err(e) => {
            error!(user_id = %user.id, error = %e, "Stored password hash could not be parsed");
            return JsonResponse::server_error("Erro interno.").into_response();
        }
    }

    if !user.is_verified {
        return JsonResponse::forbidden_with_code(
            "Confirme seu cadastro pelo link enviado ao seu e-mail.",
            "email_not_verified",
        )
        .into_response();
    }

    let session_id = state.sessions.create(user.id, &user.apelido);
    let cookie = session_cookie(session_id, state.config.production, state.sessions.ttl());

    (
        jar.add(cookie),
        JsonResponse::success("Login realizado com sucesso."),
    )
        .into_response()
}

pub async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(session_id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        state.sessions.remove(session_id);
    }

    (
        jar.remove(removal_cookie()),
        JsonResponse::success("Sessão encerrada."),
    )
        .into_response()
}

pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Response {
    let email = normalize_email(&payload.email);
    let lookup = state.db.find_user_by_email(&email).await;

    match lookup {
        Ok(Some(user)) => {
            // Response time must not depend on the provider call.
            tokio::spawn(async move {
                if let Err(e) = send_password_reset_email(&state, user.id, &user.email).await {
                    warn!(user_id = %user.id, error = %e, "Password reset email not sent");
                }
            });
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Error looking up user by email");
        }
    }

    JsonResponse::success(FORGOT_PASSWORD_MESSAGE).into_response()
}

pub async fn handle_resend_confirmation(
    State(state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Response {
    let email = normalize_email(&payload.email);
    let lookup = state.db.find_user_by_email(&email).await;

    match lookup {
        Ok(Some(user)) if !user.is_verified => {
            tokio::spawn(async move {
                if let Err(e) =
                    send_confirmation_email(&state, user.id, &user.email, &user.apelido).await
                {
                    warn!(user_id = %user.id, error = %e, "Confirmation email not re-sent");
                }
            });
        }
        Ok(_) => {}
        Err(e) => {
            error!(error = %e, "Error looking up user by email");
        }
    }

    JsonResponse::success(RESEND_CONFIRMATION_MESSAGE).into_response()
}
