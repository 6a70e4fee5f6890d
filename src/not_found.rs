//! The page to display when a route or resource does not exist.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(
            error_view(
                "Não encontrado",
                "404",
                "Página não encontrada.",
                "O endereço pode estar errado ou a página não existe mais.",
            )
            .into_string(),
        ),
    )
        .into_response()
}
