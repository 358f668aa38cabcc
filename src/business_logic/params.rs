use validator::Validate;

use crate::business_logic::annotations::AnnotationStore;
use crate::business_logic::controls::{ControlName, ControlSurface};
use crate::business_logic::mode::ModeController;
use crate::errors::AppError;
use crate::models::annotation::ElliottPoint;
use crate::models::chart::PlotRequest;

pub const EMPTY_TICKER_MESSAGE: &str = "Please enter a valid ticker symbol";

/// Comma-joined periods, empty when none
pub fn moving_averages_param(periods: &[u32]) -> String {
    periods
        .iter()
        .map(|period| period.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// JSON list of points, empty when none
pub fn elliott_points_param(points: &[ElliottPoint]) -> Result<String, AppError> {
    if points.is_empty() {
        return Ok(String::new());
    }
    serde_json::to_string(points).map_err(|err| AppError::Internal(err.to_string()))
}

/// Assemble the `/plot` payload from the current controls and session state.
/// Fibonacci, moving-average and Elliott settings are sent whatever mode is
/// active so they keep applying after a mode switch.
pub fn build_request_params(
    controls: &dyn ControlSurface,
    modes: &ModeController,
    annotations: &AnnotationStore,
    include_financials: bool,
) -> Result<PlotRequest, AppError> {
    let selected_mas = annotations.selected_moving_averages(&controls.checked_standard_mas());
    let indicators = modes.indicators();

    let request = PlotRequest {
        ticker: controls.read_text(ControlName::Ticker),
        period: controls.read_text(ControlName::Period),
        chart_mode: modes.click_mode().as_str().to_string(),
        manual_fib: controls.is_checked(ControlName::ManualFib),
        show_extensions: controls.is_checked(ControlName::ShowExtensions),
        fib_high: controls.read_text(ControlName::FibHigh),
        show_fib: controls.is_checked(ControlName::ShowFib),
        moving_averages: moving_averages_param(&selected_mas),
        elliott_points: elliott_points_param(annotations.elliott_points())?,
        show_elliott_auto_waves: controls.is_checked(ControlName::ElliottAutoWaves),
        show_elliott_fib_levels: controls.is_checked(ControlName::ElliottFibLevels),
        extend_elliott_projections: controls.is_checked(ControlName::ExtendElliottProjections),
        show_rsi: indicators.rsi,
        show_macd: indicators.macd,
        show_volume: indicators.volume,
        show_candlestick: indicators.candlestick,
        include_financials,
    };

    request
        .validate()
        .map_err(|_| AppError::Validation(EMPTY_TICKER_MESSAGE.to_string()))?;

    Ok(request)
}
