use api_types::error::{ErrorBody, FieldErrorView};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{Credentials, ServerState, router, run, run_with_listener};

mod categories;
mod cost_centers;
mod entries;
mod server;

pub mod types {
    pub mod category {
        pub use api_types::category::{CategoryNew, CategoryView};
    }

    pub mod cost_center {
        pub use api_types::cost_center::{CostCenterNew, CostCenterView};
    }

    pub mod entry {
        pub use api_types::entry::{
            EntryFilter, EntryListQuery, EntryListResponse, EntryNew, EntryPage, EntryView,
            MarkPaid, RecentQuery, Summary,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InUse(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_) | EngineError::InvalidName(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ErrorBody {
                error: "internal server error".to_string(),
                fields: Vec::new(),
            }
        }
        EngineError::Validation(errors) => ErrorBody {
            error: "invalid entry".to_string(),
            fields: errors
                .into_iter()
                .map(|e| FieldErrorView {
                    field: e.field,
                    message: e.message,
                })
                .collect(),
        },
        other => ErrorBody {
            error: other.to_string(),
            fields: Vec::new(),
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    fields: Vec::new(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
