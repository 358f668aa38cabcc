use thiserror::Error;

use crate::models::annotation::{ChartPoint, ElliottPoint, TrendLine, TrendLineKind, XValue};

pub const MIN_MA_PERIOD: u32 = 1;
pub const MAX_MA_PERIOD: u32 = 500;

/// Colors handed out to new trendlines in rotation
pub const TRENDLINE_COLORS: [&str; 6] = [
    "#FF5733", "#33FFCC", "#FF33A6", "#3371FF", "#FFD633", "#4CAF50",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("Please enter a valid period between 1 and 500.")]
    PeriodOutOfRange(i64),
    #[error("This moving average period is already added.")]
    DuplicatePeriod(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrendlineOutcome {
    Created(TrendLine),
    /// First click of a two-click line stored
    Pending,
    /// Not enough chart data to place the line
    Skipped,
}

/// Session-scoped user overlays. Survives refreshes; wiped by explicit clears.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    trendlines: Vec<TrendLine>,
    trendline_count: u64,
    pending_point: Option<ChartPoint>,
    custom_mas: Vec<u32>,
    elliott_points: Vec<ElliottPoint>,
    x_values: Vec<XValue>,
}

impl AnnotationStore {
    pub fn trendlines(&self) -> &[TrendLine] {
        &self.trendlines
    }

    pub fn pending_point(&self) -> Option<&ChartPoint> {
        self.pending_point.as_ref()
    }

    pub fn custom_mas(&self) -> &[u32] {
        &self.custom_mas
    }

    pub fn elliott_points(&self) -> &[ElliottPoint] {
        &self.elliott_points
    }

    #[cfg(test)]
    pub fn x_values(&self) -> &[XValue] {
        &self.x_values
    }

    /// Replace the x-axis cache with the primary series of the latest render
    pub fn cache_x_values(&mut self, x_values: Vec<XValue>) {
        self.x_values = x_values;
    }

    fn next_trendline_number(&mut self) -> u64 {
        self.trendline_count += 1;
        self.trendline_count
    }

    fn color_for(number: u64) -> String {
        let index = (number.saturating_sub(1) as usize) % TRENDLINE_COLORS.len();
        TRENDLINE_COLORS[index].to_string()
    }

    /// Line across the whole cached x-range at height `y`
    pub fn add_horizontal_trendline(&mut self, y: f64) -> TrendlineOutcome {
        let (start, end) = match (self.x_values.first(), self.x_values.last()) {
            (Some(start), Some(end)) if self.x_values.len() >= 2 => (start.clone(), end.clone()),
            _ => {
                tracing::debug!(
                    "Skipping horizontal trendline: {} cached x values",
                    self.x_values.len()
                );
                return TrendlineOutcome::Skipped;
            }
        };

        let number = self.next_trendline_number();
        let line = TrendLine {
            id: format!("H-Line-{number}"),
            kind: TrendLineKind::Horizontal,
            endpoints: [ChartPoint { x: start, y }, ChartPoint { x: end, y }],
            color: Self::color_for(number),
        };

        tracing::info!("Added horizontal trendline at {:.2}", y);
        self.trendlines.push(line.clone());
        TrendlineOutcome::Created(line)
    }

    /// First call stores a pending point; the second completes the line
    pub fn add_point_to_point_trendline(&mut self, x: XValue, y: f64) -> TrendlineOutcome {
        let Some(first) = self.pending_point.take() else {
            self.pending_point = Some(ChartPoint { x, y });
            tracing::debug!("First point selected for trendline");
            return TrendlineOutcome::Pending;
        };

        let number = self.next_trendline_number();
        let line = TrendLine {
            id: format!("P2P-Line-{number}"),
            kind: TrendLineKind::PointToPoint,
            endpoints: [first, ChartPoint { x, y }],
            color: Self::color_for(number),
        };

        tracing::info!("Added point-to-point trendline {}", line.id);
        self.trendlines.push(line.clone());
        TrendlineOutcome::Created(line)
    }

    /// Drop every line, the id counter and any half-drawn line
    pub fn clear_all_trendlines(&mut self) {
        self.trendlines.clear();
        self.trendline_count = 0;
        self.pending_point = None;
        tracing::info!("Cleared all trendlines");
    }

    pub fn add_custom_ma(&mut self, period: i64) -> Result<u32, AnnotationError> {
        let period = u32::try_from(period)
            .ok()
            .filter(|period| (MIN_MA_PERIOD..=MAX_MA_PERIOD).contains(period))
            .ok_or(AnnotationError::PeriodOutOfRange(period))?;

        if self.custom_mas.contains(&period) {
            return Err(AnnotationError::DuplicatePeriod(period));
        }

        self.custom_mas.push(period);
        Ok(period)
    }

    pub fn remove_custom_ma(&mut self, period: u32) -> bool {
        match self.custom_mas.iter().position(|existing| *existing == period) {
            Some(index) => {
                self.custom_mas.remove(index);
                true
            }
            None => false,
        }
    }

    /// Append a wave point; returns the new point count
    pub fn add_elliott_point(&mut self, x: XValue, y: f64) -> usize {
        self.elliott_points.push(ElliottPoint::new(x, y));
        self.elliott_points.len()
    }

    /// Remove by display position; later points keep their relative order
    pub fn remove_elliott_point_at(&mut self, index: usize) -> bool {
        if index >= self.elliott_points.len() {
            return false;
        }
        self.elliott_points.remove(index);
        true
    }

    pub fn clear_elliott_points(&mut self) {
        self.elliott_points.clear();
    }

    /// Sorted ascending, de-duplicated union of standard and custom periods
    pub fn selected_moving_averages(&self, checked_standard: &[u32]) -> Vec<u32> {
        let mut periods: Vec<u32> = checked_standard
            .iter()
            .chain(self.custom_mas.iter())
            .copied()
            .collect();
        periods.sort_unstable();
        periods.dedup();
        periods
    }

    /// Replace everything from a saved snapshot. The id counter resumes after
    /// the highest restored line number.
    pub fn restore(
        &mut self,
        trendlines: Vec<TrendLine>,
        custom_mas: Vec<u32>,
        elliott_points: Vec<ElliottPoint>,
    ) {
        self.trendline_count = trendlines
            .iter()
            .filter_map(|line| line.id.rsplit('-').next()?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.trendlines = trendlines;
        self.pending_point = None;
        self.custom_mas = custom_mas;
        self.elliott_points = elliott_points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_axis() -> AnnotationStore {
        let mut store = AnnotationStore::default();
        store.cache_x_values(vec![
            "2024-01-02".into(),
            "2024-01-03".into(),
            "2024-01-04".into(),
        ]);
        store
    }

    #[test]
    fn horizontal_line_spans_cached_axis() {
        let mut store = store_with_axis();

        let TrendlineOutcome::Created(line) = store.add_horizontal_trendline(150.25) else {
            panic!("expected a line");
        };

        assert_eq!(line.id, "H-Line-1");
        assert_eq!(line.endpoints[0], ChartPoint { x: "2024-01-02".into(), y: 150.25 });
        assert_eq!(line.endpoints[1], ChartPoint { x: "2024-01-04".into(), y: 150.25 });
        assert_eq!(store.trendlines().len(), 1);
    }

    #[test]
    fn horizontal_line_needs_two_x_values() {
        let mut store = AnnotationStore::default();
        assert_eq!(store.add_horizontal_trendline(1.0), TrendlineOutcome::Skipped);

        store.cache_x_values(vec!["2024-01-02".into()]);
        assert_eq!(store.add_horizontal_trendline(1.0), TrendlineOutcome::Skipped);
        assert!(store.trendlines().is_empty());
    }

    #[test]
    fn line_count_tracks_completed_operations() {
        let mut store = store_with_axis();
        let mut completed = 0;

        let clicks: [(bool, f64); 7] = [
            (false, 1.0),
            (true, 2.0),
            (false, 3.0),
            (false, 4.0),
            (false, 5.0),
            (true, 6.0),
            (false, 7.0),
        ];
        for (horizontal, y) in clicks {
            let outcome = if horizontal {
                store.add_horizontal_trendline(y)
            } else {
                store.add_point_to_point_trendline("2024-01-03".into(), y)
            };
            if matches!(outcome, TrendlineOutcome::Created(_)) {
                completed += 1;
            }
            assert_eq!(store.trendlines().len(), completed);
        }

        // p2p clicks: 1,3 complete; 4,5 complete; 7 pending
        assert_eq!(completed, 4);
        assert_eq!(store.pending_point().map(|p| p.y), Some(7.0));
    }

    #[test]
    fn line_ids_strictly_increase() {
        let mut store = store_with_axis();
        store.add_horizontal_trendline(1.0);
        store.add_point_to_point_trendline("2024-01-02".into(), 1.0);
        store.add_point_to_point_trendline("2024-01-04".into(), 2.0);
        store.add_horizontal_trendline(3.0);

        let ids: Vec<&str> = store.trendlines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["H-Line-1", "P2P-Line-2", "H-Line-3"]);
        assert_eq!(store.trendlines()[1].color, TRENDLINE_COLORS[1]);
    }

    #[test]
    fn clear_resets_counter_and_pending_point() {
        let mut store = store_with_axis();
        store.add_horizontal_trendline(1.0);
        store.add_horizontal_trendline(2.0);
        store.add_point_to_point_trendline("2024-01-02".into(), 1.0);

        store.clear_all_trendlines();

        assert!(store.trendlines().is_empty());
        assert!(store.pending_point().is_none());
        let TrendlineOutcome::Created(line) = store.add_horizontal_trendline(5.0) else {
            panic!("expected a line");
        };
        assert_eq!(line.id, "H-Line-1");
    }

    #[test]
    fn custom_ma_rejects_duplicates() {
        let mut store = AnnotationStore::default();
        assert_eq!(store.add_custom_ma(21), Ok(21));
        assert_eq!(store.add_custom_ma(21), Err(AnnotationError::DuplicatePeriod(21)));
        assert_eq!(store.custom_mas(), &[21]);
    }

    #[test]
    fn custom_ma_rejects_out_of_range() {
        let mut store = AnnotationStore::default();
        for period in [0, 501, -3] {
            assert_eq!(
                store.add_custom_ma(period),
                Err(AnnotationError::PeriodOutOfRange(period))
            );
        }
        assert!(store.custom_mas().is_empty());
        assert_eq!(store.add_custom_ma(1), Ok(1));
        assert_eq!(store.add_custom_ma(500), Ok(500));
        assert_eq!(
            AnnotationError::PeriodOutOfRange(0).to_string(),
            "Please enter a valid period between 1 and 500."
        );
    }

    #[test]
    fn remove_custom_ma_reports_presence() {
        let mut store = AnnotationStore::default();
        store.add_custom_ma(30).unwrap();

        assert!(store.remove_custom_ma(30));
        assert!(!store.remove_custom_ma(30));
    }

    #[test]
    fn selected_mas_sorted_and_unique() {
        let mut store = AnnotationStore::default();
        store.add_custom_ma(50).unwrap();
        store.add_custom_ma(7).unwrap();
        store.add_custom_ma(300).unwrap();

        assert_eq!(
            store.selected_moving_averages(&[200, 20, 50]),
            vec![7, 20, 50, 200, 300]
        );
        assert!(AnnotationStore::default().selected_moving_averages(&[]).is_empty());
    }

    #[test]
    fn removing_elliott_point_keeps_order() {
        let mut store = AnnotationStore::default();
        for (i, y) in [10.0, 20.0, 15.0, 30.0].into_iter().enumerate() {
            store.add_elliott_point(XValue::from(i as i64), y);
        }

        assert!(store.remove_elliott_point_at(1));
        assert!(!store.remove_elliott_point_at(3));

        let ys: Vec<&str> = store.elliott_points().iter().map(|p| p.y.as_str()).collect();
        assert_eq!(ys, vec!["10.00", "15.00", "30.00"]);

        store.clear_elliott_points();
        assert!(store.elliott_points().is_empty());
    }

    #[test]
    fn restore_resumes_line_numbering() {
        let mut source = store_with_axis();
        source.add_horizontal_trendline(1.0);
        source.add_horizontal_trendline(2.0);

        let mut store = AnnotationStore::default();
        store.restore(source.trendlines().to_vec(), vec![9], Vec::new());
        store.cache_x_values(source.x_values().to_vec());

        let TrendlineOutcome::Created(line) = store.add_horizontal_trendline(3.0) else {
            panic!("expected a line");
        };
        assert_eq!(line.id, "H-Line-3");
        assert_eq!(store.custom_mas(), &[9]);
    }
}
