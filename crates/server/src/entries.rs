//! Entries API endpoints.

use api_types::entry::{
    EntryFilter, EntryKind, EntryListQuery, EntryListResponse, EntryNew, EntryPage, EntryStatus,
    EntryView, MarkPaid, PaymentMethod, RecentQuery, Summary,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EntryInput, Money};
use uuid::Uuid;

use crate::{
    ServerError, categories::map_category, cost_centers::map_cost_center, server::ServerState,
};

const RECENT_DEFAULT: u64 = 10;

fn payment_method_to_engine(method: PaymentMethod) -> engine::PaymentMethod {
    match method {
        PaymentMethod::Pix => engine::PaymentMethod::Pix,
        PaymentMethod::Cash => engine::PaymentMethod::Cash,
        PaymentMethod::Credit => engine::PaymentMethod::Credit,
        PaymentMethod::Debit => engine::PaymentMethod::Debit,
    }
}

fn payment_method_from_engine(method: engine::PaymentMethod) -> PaymentMethod {
    match method {
        engine::PaymentMethod::Pix => PaymentMethod::Pix,
        engine::PaymentMethod::Cash => PaymentMethod::Cash,
        engine::PaymentMethod::Credit => PaymentMethod::Credit,
        engine::PaymentMethod::Debit => PaymentMethod::Debit,
    }
}

fn filter_to_engine(filter: EntryFilter) -> engine::EntryFilter {
    match filter {
        EntryFilter::All => engine::EntryFilter::All,
        EntryFilter::Receivables => engine::EntryFilter::Receivables,
        EntryFilter::Payables => engine::EntryFilter::Payables,
        EntryFilter::Open => engine::EntryFilter::Open,
        EntryFilter::Settled => engine::EntryFilter::Settled,
    }
}

fn to_input(payload: EntryNew) -> EntryInput {
    EntryInput {
        description: payload.description,
        category_id: payload.category_id,
        cost_center_id: payload.cost_center_id,
        payment_method: payment_method_to_engine(payload.payment_method),
        due_date: payload.due_date,
        original_value: Money::new(payload.original_minor),
        received_value: payload.received_minor.map(Money::new),
        payment_date: payload.payment_date,
    }
}

pub(crate) fn map_entry(entry: engine::Entry) -> EntryView {
    let kind = match entry.kind() {
        engine::EntryKind::Receivable => EntryKind::Receivable,
        engine::EntryKind::Payable => EntryKind::Payable,
    };
    let status = match entry.status() {
        engine::EntryStatus::Open => EntryStatus::Open,
        engine::EntryStatus::Settled => EntryStatus::Settled,
    };
    let outstanding_minor = entry.outstanding_value().minor();

    EntryView {
        id: entry.id,
        description: entry.description,
        kind,
        status,
        category: map_category(entry.category),
        cost_center: entry.cost_center.map(map_cost_center),
        payment_method: payment_method_from_engine(entry.payment_method),
        due_date: entry.due_date,
        original_minor: entry.original_value.minor(),
        received_minor: entry.received_value.map(Money::minor),
        outstanding_minor,
        payment_date: entry.payment_date,
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

/// Anything that is not a positive integer is the first page.
fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EntryListQuery>,
) -> Result<Json<EntryPage>, ServerError> {
    let search = query.q.unwrap_or_default();
    let page = state
        .engine
        .list_entries(
            &search,
            filter_to_engine(query.filter.unwrap_or_default()),
            parse_page(query.page.as_deref()),
        )
        .await?;

    Ok(Json(EntryPage {
        entries: page.entries.into_iter().map(map_entry).collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_entries: page.total_entries,
    }))
}

pub async fn recent(
    State(state): State<ServerState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<EntryListResponse>, ServerError> {
    let limit = query.limit.unwrap_or(RECENT_DEFAULT);
    let entries = state
        .engine
        .list_recent_entries(limit)
        .await?
        .into_iter()
        .map(map_entry)
        .collect();
    Ok(Json(EntryListResponse { entries }))
}

pub async fn summary(State(state): State<ServerState>) -> Result<Json<Summary>, ServerError> {
    let totals = state.engine.totals().await?;
    Ok(Json(Summary {
        receivables_minor: totals.receivables.minor(),
        payables_minor: totals.payables.minor(),
        result_minor: totals.result.minor(),
        outstanding_minor: totals.outstanding.minor(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let entry = state.engine.create_entry(&to_input(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_entry(entry))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state.engine.entry(id).await?;
    Ok(Json(map_entry(entry)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EntryNew>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state.engine.update_entry(id, &to_input(payload)).await?;
    Ok(Json(map_entry(entry)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let entry = state.engine.clone_entry(id).await?;
    Ok((StatusCode::CREATED, Json(map_entry(entry))))
}

pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkPaid>,
) -> Result<Json<EntryView>, ServerError> {
    let date = payload.payment_date.unwrap_or_else(|| state.today());
    let entry = state
        .engine
        .mark_as_paid(id, payload.amount_minor.map(Money::new), date)
        .await?;
    Ok(Json(map_entry(entry)))
}
