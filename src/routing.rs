//! Application router configuration.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::get_dashboard_page,
    endpoints,
    import::{get_import_page, import_statement_endpoint},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        bulk_delete_transactions_endpoint, create_transaction_endpoint,
        delete_transaction_endpoint, edit_transaction_endpoint, get_create_transaction_page,
        get_edit_transaction_page, get_transactions_page,
    },
};

/// The largest bank statement that can be uploaded.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let view_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::IMPORT_VIEW, get(get_import_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BULK_DELETE_TRANSACTIONS,
            post(bulk_delete_transactions_endpoint),
        )
        .route(
            endpoints::IMPORT,
            post(import_statement_endpoint).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        );

    view_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{http::StatusCode, response::IntoResponse};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, routing::get_index_page, test_utils::StubModel};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "Etc/UTC",
            Arc::new(StubModel::answering("[]")),
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn serves_every_page() {
        let server = get_test_server();
        let pages = [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::IMPORT_VIEW,
        ];

        for page in pages {
            server.get(page).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn dashboard_accepts_hebrew_period() {
        let server = get_test_server();

        server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_param("period", "hebrew")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn error_page_is_internal_server_error() {
        let server = get_test_server();

        server
            .get(endpoints::INTERNAL_ERROR_VIEW)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server.get("/budgets").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn editing_missing_transaction_is_not_found() {
        let server = get_test_server();

        server
            .get("/transactions/42/edit")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn deleting_missing_transaction_is_not_found() {
        let server = get_test_server();

        server
            .delete("/api/transactions/42")
            .await
            .assert_status_not_found();
    }
}
