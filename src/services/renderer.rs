use crate::business_logic::presentation::Presentation;
use crate::business_logic::session::ChartSession;
use crate::models::chart::ChartDescription;

/// Draws backend chart descriptions and replays the user's overlays on them
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    presentation: Presentation,
}

impl ChartRenderer {
    pub fn new(presentation: Presentation) -> Self {
        Self { presentation }
    }

    /// Normalize `chart`, rebind the click handler and append every stored
    /// trendline as an overlay trace in insertion order
    pub fn render(&self, session: &mut ChartSession, mut chart: ChartDescription) -> ChartDescription {
        self.presentation.apply(&mut chart);

        session.annotations.cache_x_values(chart.primary_x_values());
        let binding = session.bind_click_handler();

        let mut replayed = 0;
        for line in session.annotations.trendlines() {
            match line.overlay_trace() {
                Ok(trace) => {
                    chart.data.push(trace);
                    replayed += 1;
                }
                Err(error) => tracing::warn!("Skipping trendline on replay: {}", error),
            }
        }

        tracing::debug!(
            "Rendered chart with {} series ({} overlays, click binding {})",
            chart.data.len(),
            replayed,
            binding
        );
        chart
    }
}
