use crate::business_logic::annotations::{AnnotationError, AnnotationStore};
use crate::business_logic::controls::{ControlName, ControlPanel, ControlSurface, STANDARD_MA_PERIODS};
use crate::business_logic::mode::{ClickOutcome, Indicator, ModeChange, ModeController, AnalysisMode};
use crate::business_logic::params::build_request_params;
use crate::errors::AppError;
use crate::models::annotation::{ChartPoint, XValue};
use crate::models::chart::PlotRequest;
use crate::models::session::{ChartStateSnapshot, FibSettings, MaPreset, SessionView};

/// What the caller must do after a control change, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ControlEffect {
    None,
    /// Redraw the chart without the statistics payload
    ChartRefresh,
    /// Reload every dashboard region
    FullReload,
}

/// State of one chart instance: its controls, mode and annotations.
/// Every mutation reports whether a chart-only refresh must follow.
#[derive(Debug, Clone, Default)]
pub struct ChartSession {
    pub controls: ControlPanel,
    pub modes: ModeController,
    pub annotations: AnnotationStore,
    request_seq: u64,
    rendered_seq: u64,
    stats_seq: u64,
    click_binding: Option<u64>,
}

impl ChartSession {
    /// Assemble the next `/plot` request and tag it with a sequence number
    pub fn next_request(&mut self, include_financials: bool) -> Result<(u64, PlotRequest), AppError> {
        let request = build_request_params(
            &self.controls,
            &self.modes,
            &self.annotations,
            include_financials,
        )?;
        self.request_seq += 1;
        Ok((self.request_seq, request))
    }

    /// Accept a response for request `seq` unless a newer one was already drawn
    pub fn accept_response(&mut self, seq: u64) -> bool {
        if seq < self.rendered_seq {
            return false;
        }
        self.rendered_seq = seq;
        true
    }

    /// Accept the statistics of full request `seq` unless newer statistics
    /// were already applied. Chart-only requests never advance this fence.
    pub fn accept_stats(&mut self, seq: u64) -> bool {
        if seq < self.stats_seq {
            return false;
        }
        self.stats_seq = seq;
        true
    }

    /// Replace the chart click binding; returns the new binding generation
    pub fn bind_click_handler(&mut self) -> u64 {
        let generation = self.click_binding.map_or(1, |current| current + 1);
        self.click_binding = Some(generation);
        generation
    }

    pub fn click_binding(&self) -> Option<u64> {
        self.click_binding
    }

    pub fn set_mode(&mut self, mode: AnalysisMode) -> ModeChange {
        self.modes.set_mode(mode, &mut self.controls)
    }

    pub fn set_indicator(&mut self, indicator: Indicator, enabled: bool) -> bool {
        self.modes.set_indicator(indicator, enabled)
    }

    /// Route a chart click; ignored until a chart has been drawn
    pub fn on_chart_click(&mut self, point: &ChartPoint) -> ClickOutcome {
        if self.click_binding.is_none() {
            tracing::debug!("Ignoring click before the first render");
            return ClickOutcome::Ignored;
        }
        self.modes
            .on_chart_click(point, &mut self.controls, &mut self.annotations)
    }

    pub fn update_control(&mut self, name: ControlName, value: String) -> ControlEffect {
        let effect = match name {
            ControlName::Ticker | ControlName::TrendlineTool => ControlEffect::None,
            ControlName::Period => ControlEffect::FullReload,
            ControlName::FibHigh if value.trim().is_empty() => ControlEffect::None,
            _ => ControlEffect::ChartRefresh,
        };

        let unchecking_manual_fib = name == ControlName::ManualFib && value != "true";
        self.controls.set_control_value(name, value);
        if unchecking_manual_fib {
            self.controls.set_control_value(ControlName::FibHigh, String::new());
        }

        effect
    }

    pub fn clear_all_trendlines(&mut self) -> bool {
        self.annotations.clear_all_trendlines();
        true
    }

    pub fn add_custom_ma(&mut self, period: i64) -> Result<u32, AnnotationError> {
        self.annotations.add_custom_ma(period)
    }

    pub fn remove_custom_ma(&mut self, period: u32) -> bool {
        self.annotations.remove_custom_ma(period)
    }

    pub fn apply_ma_preset(&mut self, preset: MaPreset) -> bool {
        for period in STANDARD_MA_PERIODS {
            self.controls.set_checked(
                ControlName::MovingAverage(period),
                preset.periods().contains(&period),
            );
        }
        true
    }

    pub fn add_elliott_point(&mut self, x: XValue, y: f64) -> bool {
        self.annotations.add_elliott_point(x, y);
        true
    }

    pub fn remove_elliott_point_at(&mut self, index: usize) -> bool {
        self.annotations.remove_elliott_point_at(index)
    }

    pub fn clear_elliott_points(&mut self) -> bool {
        self.annotations.clear_elliott_points();
        true
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            mode: self.modes.mode(),
            click_mode: self.modes.click_mode(),
            visible_panel: self.controls.visible_panel(),
            indicators: self.modes.indicators(),
            controls: self.controls.values().into_iter().collect(),
            trendlines: self.annotations.trendlines().to_vec(),
            pending_point: self.annotations.pending_point().cloned(),
            custom_mas: self.annotations.custom_mas().to_vec(),
            moving_averages: self
                .annotations
                .selected_moving_averages(&self.controls.checked_standard_mas()),
            elliott_points: self.annotations.elliott_points().to_vec(),
            has_chart: self.click_binding().is_some(),
        }
    }

    pub fn snapshot(&self) -> ChartStateSnapshot {
        let controls = &self.controls;
        ChartStateSnapshot {
            ticker: controls.read_text(ControlName::Ticker),
            period: controls.read_text(ControlName::Period),
            mode: self.modes.mode(),
            chart_mode: self.modes.click_mode(),
            indicators: self.modes.indicators(),
            moving_averages: self
                .annotations
                .selected_moving_averages(&controls.checked_standard_mas()),
            standard_mas: Some(controls.checked_standard_mas()),
            custom_mas: self.annotations.custom_mas().to_vec(),
            elliott_points: self.annotations.elliott_points().to_vec(),
            trendlines: self.annotations.trendlines().to_vec(),
            fib_settings: FibSettings {
                manual_mode: controls.is_checked(ControlName::ManualFib),
                fib_high: controls.read_text(ControlName::FibHigh),
                show_extensions: controls.is_checked(ControlName::ShowExtensions),
                show_fib: controls.is_checked(ControlName::ShowFib),
            },
            elliott_auto_waves: controls.is_checked(ControlName::ElliottAutoWaves),
            elliott_fib_levels: controls.is_checked(ControlName::ElliottFibLevels),
            extend_elliott_projections: controls.is_checked(ControlName::ExtendElliottProjections),
        }
    }

    /// Replace the selection and annotation state with a saved snapshot
    pub fn restore(&mut self, snapshot: ChartStateSnapshot) {
        let controls = &mut self.controls;
        if !snapshot.ticker.is_empty() {
            controls.set_control_value(ControlName::Ticker, snapshot.ticker);
        }
        if !snapshot.period.is_empty() {
            controls.set_control_value(ControlName::Period, snapshot.period);
        }

        // Older snapshots only carry the merged selection
        let standard_mas = snapshot.standard_mas.unwrap_or_else(|| {
            snapshot
                .moving_averages
                .iter()
                .copied()
                .filter(|period| !snapshot.custom_mas.contains(period))
                .collect()
        });
        for period in STANDARD_MA_PERIODS {
            controls.set_checked(
                ControlName::MovingAverage(period),
                standard_mas.contains(&period),
            );
        }

        let fib = snapshot.fib_settings;
        controls.set_checked(ControlName::ManualFib, fib.manual_mode);
        controls.set_control_value(ControlName::FibHigh, fib.fib_high);
        controls.set_checked(ControlName::ShowExtensions, fib.show_extensions);
        controls.set_checked(ControlName::ShowFib, fib.show_fib);
        controls.set_checked(ControlName::ElliottAutoWaves, snapshot.elliott_auto_waves);
        controls.set_checked(ControlName::ElliottFibLevels, snapshot.elliott_fib_levels);
        controls.set_checked(
            ControlName::ExtendElliottProjections,
            snapshot.extend_elliott_projections,
        );

        self.modes
            .restore(snapshot.mode, snapshot.indicators, &mut self.controls);
        self.annotations.restore(
            snapshot.trendlines,
            snapshot.custom_mas,
            snapshot.elliott_points,
        );
    }
}
