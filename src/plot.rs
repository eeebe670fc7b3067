use egui::{Response, Ui};
use egui_plot::{
    Legend, Line, LineStyle, MarkerShape, Plot, PlotBounds, PlotItem, PlotPoints, Points,
};

use crate::process::YearTable;

// ---------------------------------------------------------------------------
// Styling shared by every series
// ---------------------------------------------------------------------------

pub const LINE_STYLE: LineStyle = LineStyle::Solid;
pub const MARKER_SHAPE: MarkerShape = MarkerShape::Circle;
pub const MARKER_RADIUS: f32 = 3.0;

// ---------------------------------------------------------------------------
// Plot handle
// ---------------------------------------------------------------------------

/// One column of a [`YearTable`] as plot points: x is the year (or the row
/// position when the label is not a number), y the value.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPlot {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

impl SeriesPlot {
    /// Solid line through the points.
    pub fn line(&self) -> Line {
        Line::new(PlotPoints::from(self.points.clone()))
            .name(&self.name)
            .style(LINE_STYLE)
    }

    /// Small circular markers on the points.
    pub fn markers(&self) -> Points {
        Points::new(PlotPoints::from(self.points.clone()))
            .name(&self.name)
            .shape(MARKER_SHAPE)
            .radius(MARKER_RADIUS)
    }
}

/// Line chart over a [`YearTable`], one series per column. Building it draws
/// nothing; call [`YearPlot::show`] from an egui frame to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct YearPlot {
    pub x_labels: Vec<String>,
    pub series: Vec<SeriesPlot>,
}

impl YearPlot {
    /// Min and max y over every series, or `None` when there are no points.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        let mut bounds = PlotBounds::NOTHING;
        for s in &self.series {
            bounds.merge(&s.line().bounds());
        }
        bounds
            .is_valid()
            .then(|| (bounds.min()[1], bounds.max()[1]))
    }

    pub fn show(&self, ui: &mut Ui) -> Response {
        Plot::new("year_plot")
            .legend(Legend::default())
            .x_axis_label("Year")
            .show(ui, |plot_ui| {
                for s in &self.series {
                    plot_ui.line(s.line());
                    plot_ui.points(s.markers());
                }
            })
            .response
    }
}

/// Build the chart for `data`: each column becomes a solid line with small
/// circular markers.
pub fn plot(data: &YearTable) -> YearPlot {
    let xs: Vec<f64> = data
        .years
        .iter()
        .enumerate()
        .map(|(i, y)| y.trim().parse::<f64>().unwrap_or(i as f64))
        .collect();

    let series = data
        .codes()
        .into_iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let column = data.series(i)?;
            let points = xs
                .iter()
                .zip(column.values().iter())
                .map(|(&x, &y)| [x, y])
                .collect();
            Some(SeriesPlot { name, points })
        })
        .collect();

    YearPlot {
        x_labels: data.years.clone(),
        series,
    }
}
