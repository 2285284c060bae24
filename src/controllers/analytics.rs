use axum::{Json, extract::State};
use chrono::{Days, Utc};

use crate::{
    db::analytics::{daily_view_sums, fill_daily_window, top_mangas_by_views, totals},
    error::Error,
    model::AnalyticsReport,
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] analytics", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
) -> Result<Json<AnalyticsReport>, Error> {
    let today = Utc::now().date_naive();
    let window_start = today
        .checked_sub_days(Days::new(6))
        .ok_or_else(|| Error::Other(anyhow::anyhow!("date out of range")))?;

    let totals = totals(&app_state.pool).await?;
    let sums = daily_view_sums(&app_state.pool, window_start, today).await?;
    let top_mangas = top_mangas_by_views(&app_state.pool, 5).await?;

    Ok(Json(AnalyticsReport {
        total_mangas: totals.total_mangas,
        total_views: totals.total_views,
        total_chapters: totals.total_chapters,
        chart_data: fill_daily_window(today, &sums),
        top_mangas,
    }))
}
