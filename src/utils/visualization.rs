//! Visualization utilities for highway_planner
//!
//! Collects lines and points and renders them into a single gnuplot axes.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::behavior::Lane;
use crate::common::{Path2D, PlannerError, PlannerResult, Point2D};
use crate::map::FrenetConverter;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const BLUE: &str = "#0000FF";
    pub const GRAY: &str = "#808080";

    pub const LANE_LINE: &str = GRAY;
    pub const CENTERLINE: &str = BLACK;
    pub const EGO: &str = "#35C788";
    pub const PLANNED: &str = RED;
    pub const TRAFFIC: &str = BLUE;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Series {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

pub struct Visualizer {
    series: Vec<Series>,
    title: String,
    x_label: String,
    y_label: String,
    aspect_ratio: f64,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            aspect_ratio: 1.0,
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.series.push(Series::Lines {
            x: path.x_coords(),
            y: path.y_coords(),
            style: style.clone(),
        });
        self
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        self.series.push(Series::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Centerline plus the outer lane lines of the carriageway, sampled every `ds` along `s`
    pub fn plot_track(&mut self, converter: &FrenetConverter, lane_width: f64, ds: f64) -> &mut Self {
        let max_s = converter.map().max_s();
        let n = (max_s / ds).ceil().max(1.0) as usize;
        let outer = lane_width * Lane::ALL.len() as f64;

        for (d, color, caption) in [
            (0.0, colors::CENTERLINE, "Centerline"),
            (outer, colors::LANE_LINE, "Road edge"),
        ] {
            let points: Vec<Point2D> = (0..=n)
                .map(|i| converter.to_cartesian(i as f64 * ds, d))
                .collect();
            self.plot_path(
                &Path2D::from_points(points),
                &PathStyle::new(color, caption).with_line_width(1.0),
            );
        }
        self
    }

    /// Render and save to a PNG file
    pub fn save_png(&self, path: &str, width: u32, height: u32) -> PlannerResult<()> {
        let mut figure = self.render();
        figure
            .save_to_png(path, width, height)
            .map_err(|e| PlannerError::VisualizationError(e.to_string()))
    }

    pub fn save_svg(&self, path: &str, width: u32, height: u32) -> PlannerResult<()> {
        let mut figure = self.render();
        figure
            .save_to_svg(path, width, height)
            .map_err(|e| PlannerError::VisualizationError(e.to_string()))
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();
        for series in &self.series {
            match series {
                Series::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Series::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);
        axes.set_aspect_ratio(AutoOption::Fix(self.aspect_ratio));
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
