use std::path::Path;

use axum::{
    http::StatusCode,
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower_http::{
    services::{ServeDir, ServeFile},
    set_status::SetStatus,
    trace::TraceLayer,
};

use crate::{
    routes::{
        tokens::{handle_confirm_registration, handle_reset_password, handle_verify_reset_token},
        usuario::{
            handle_forgot_password, handle_login, handle_logout, handle_resend_confirmation,
            handle_signup,
        },
    },
    session::redirect_authenticated,
    state::AppState,
};

pub const NOT_FOUND_PAGE: &str = "erro-404.html";

/// Guest-only pages: signed-in users are sent to the home page instead.
const GUEST_PAGES: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/cadastro.html", "cadastro.html"),
    ("/login.html", "login.html"),
    ("/admin/login.html", "login-admin.html"),
];

const VIEW_PAGES: &[(&str, &str)] = &[
    ("/home.html", "home.html"),
    ("/cadastro-noticia.html", "cadastro-noticia.html"),
    ("/editar-noticia.html", "editar-noticia.html"),
    ("/resultados-pesquisa.html", "resultados-pesquisa.html"),
    ("/editar-perfil.html", "editar-perfil.html"),
    ("/perfil.html", "perfil.html"),
    ("/redefinir-senha.html", "redefinir-senha.html"),
    ("/admin/consultar-usuarios.html", "consultar-usuarios.html"),
    ("/admin/consultar-noticias.html", "consultar-noticias.html"),
    ("/admin/consultar-comentarios.html", "consultar-comentarios.html"),
    ("/perfil/{apelido}", "perfil-outro-usuario.html"),
    ("/noticias/{apelido}/{id_noticia}", "noticia.html"),
];

pub fn usuario_routes() -> Router<AppState> {
    Router::new()
        .route("/cadastro", post(handle_signup))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/esqueci-senha", post(handle_forgot_password))
        .route("/reenviar-confirmacao", post(handle_resend_confirmation))
}

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/token-confirmar-cadastro/{apelido}/{token}",
            get(handle_confirm_registration),
        )
        .route(
            "/token-redefinir-senha/{token}",
            get(handle_verify_reset_token).post(handle_reset_password),
        )
}

fn not_found_page(views_dir: &Path) -> SetStatus<ServeFile> {
    SetStatus::new(
        ServeFile::new(views_dir.join(NOT_FOUND_PAGE)),
        StatusCode::NOT_FOUND,
    )
}

pub fn build_router(state: AppState) -> Router {
    build_router_with(state, usuario_routes())
}

/// Assembles the application around an already layered `/usuario` group, so
/// the binary can put a rate limiter in front of it.
pub fn build_router_with(state: AppState, usuario: Router<AppState>) -> Router {
    let views_dir = state.config.views_dir.clone();

    let guest_pages = GUEST_PAGES
        .iter()
        .fold(Router::new(), |router, (path, file)| {
            router.route_service(path, ServeFile::new(views_dir.join(file)))
        })
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            redirect_authenticated,
        ));

    let view_pages = VIEW_PAGES
        .iter()
        .fold(Router::new(), |router, (path, file)| {
            router.route_service(path, ServeFile::new(views_dir.join(file)))
        });

    let not_found: Router = Router::new()
        .fallback_service(not_found_page(&views_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            redirect_authenticated,
        ));

    let static_files = ServeDir::new(&state.config.public_dir).fallback(not_found);

    Router::new()
        .merge(guest_pages)
        .merge(view_pages)
        .route("/index.html", get(|| async { Redirect::to("/") }))
        .route("/admin", get(|| async { Redirect::to("/admin/login.html") }))
        .route("/admin/", get(|| async { Redirect::to("/admin/login.html") }))
        .route(
            "/admin/login",
            get(|| async { Redirect::to("/admin/login.html") }),
        )
        .nest("/usuario", usuario)
        .nest("/tokens", token_routes())
        .fallback_service(static_files)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
