//! The landing page, where a user ID is entered to open its history.

use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    endpoints::{self, format_endpoint},
    history::is_valid_user_id,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
};

/// The query string submitted by the landing page form.
#[derive(Debug, Deserialize)]
pub struct HistoryLookup {
    /// The user ID as typed, surrounding whitespace is ignored.
    #[serde(default)]
    pub user_id: String,
}

fn lookup_form(user_id: &str, error_message: Option<&str>) -> Markup {
    html! {
        form method="get" action=(endpoints::HISTORY_LOOKUP) class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="user_id" class=(FORM_LABEL_STYLE) { "ID do usuário" }

                input
                    type="text"
                    name="user_id"
                    id="user_id"
                    placeholder="3fa85f64-5717-4562-b3fc-2c963f66afa6"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(user_id)
                    required
                    autofocus;

                @if let Some(error_message) = error_message
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Ver histórico" }
        }
    }
}

fn index_view(user_id: &str, error_message: Option<&str>) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="my-6 text-xl font-bold leading-tight tracking-tight md:text-2xl"
            {
                "Histórico de Transações"
            }

            (lookup_form(user_id, error_message))
        }
    };

    base("Início", &content)
}

/// Display the landing page.
pub async fn get_index_page() -> Markup {
    index_view("", None)
}

/// Redirect to the history page of the submitted user ID.
///
/// Shows the form again with an error if the ID is blank or malformed.
pub async fn get_history_lookup(Query(lookup): Query<HistoryLookup>) -> Response {
    let user_id = lookup.user_id.trim();

    if is_valid_user_id(user_id) {
        Redirect::to(&format_endpoint(endpoints::HISTORY_VIEW, &[&user_id])).into_response()
    } else {
        let message = if user_id.is_empty() {
            "Informe o ID do usuário."
        } else {
            "O ID deve conter apenas letras, números, '-' ou '_'."
        };

        index_view(user_id, Some(message)).into_response()
    }
}
