//! Graph façade: resolves the chart variant and backend once, then runs
//! layout, drawing and output.

use crate::backend::raster::pixel_buffer_len;
use crate::backend::{Backend, GraphicBackend, RasterBackend, Renderable, Rendered, Surface, VectorBackend};
use crate::bar::{bar_canvas, layout_bars, layout_pie, BarLayout, BarSpec, PieLayout};
use crate::data::{CategoryDatum, ChartData};
use crate::error::{GraphError, Result};
use crate::layout::{grid_canvas, layout_grid, Canvas, GridLayout, GridSpec};
use crate::shapes::{draw_symbols, Shape};
use crate::style::{is_none_color, parse_color, Palette, Style};
use crate::{ChartStyle, GraphOptions, OutputKind};
use image::ImageFormat;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Chart variant, a pure function of output kind and style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    Count(Shape),
    Symbol,
    Bar,
    Pie,
}

impl Chart {
    pub fn select(kind: OutputKind, style: ChartStyle) -> Chart {
        if kind == OutputKind::Txt {
            return Chart::Symbol;
        }
        match style {
            ChartStyle::Circle => Chart::Count(Shape::Circle),
            ChartStyle::Cross => Chart::Count(Shape::Cross),
            ChartStyle::Manikin => Chart::Count(Shape::Manikin),
            ChartStyle::Bar => Chart::Bar,
            ChartStyle::Pie => Chart::Pie,
        }
    }
}

/// What `Graph::render` produced: content for the caller, or a saved file
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rendered(Rendered),
    Saved(PathBuf),
}

/// Data converted to the shape its chart needs, checked once up front
#[derive(Debug, Clone)]
enum Plot {
    Counts(Vec<CategoryDatum>),
    Groups(Vec<Vec<f64>>),
    Values(Vec<f64>),
}

/// Layout result for one render pass
enum Layout {
    Grid(GridLayout, Shape),
    Symbols(GridLayout),
    Bars(BarLayout),
    Pie(PieLayout),
}

impl Layout {
    fn canvas(&self) -> Canvas {
        match self {
            Layout::Grid(grid, _) | Layout::Symbols(grid) => grid.canvas,
            Layout::Bars(bars) => bars.canvas,
            Layout::Pie(pie) => pie.canvas,
        }
    }

    fn paint(&self, backend: &mut dyn Backend, inner_margin: f64) {
        match self {
            Layout::Grid(grid, shape) => {
                for item in &grid.items {
                    shape.draw(backend, item.interior(inner_margin), &item.color);
                }
            }
            Layout::Bars(bars) => {
                for bar in &bars.bars {
                    let r = bar.rect;
                    backend.rect(r.x, r.y, r.width, r.height, &Style::fill(&bar.color).with_class("bar"));
                }
            }
            Layout::Pie(pie) => {
                for wedge in &pie.wedges {
                    backend.polygon(&wedge.points, &Style::fill(&wedge.color).with_class("wedge"));
                }
            }
            Layout::Symbols(_) => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct Graph {
    data: ChartData,
    options: GraphOptions,
    chart: Chart,
    plot: Plot,
}

impl Graph {
    /// Validate data and options and resolve the chart variant. Nothing is
    /// drawn yet; every rejection happens here.
    pub fn new(data: ChartData, options: GraphOptions) -> Result<Self> {
        data.validate()?;

        let chart = Chart::select(options.kind, options.style);
        let plot = match chart {
            Chart::Count(_) | Chart::Symbol => Plot::Counts(data.to_counts(&options.labels)?),
            Chart::Bar => Plot::Groups(data.to_groups()),
            Chart::Pie => Plot::Values(data.to_values()?),
        };

        if options.kind.is_raster() {
            for color in options.colors.iter().chain(options.background_color.iter()) {
                if parse_color(color).is_none() && !is_none_color(color) {
                    return Err(GraphError::Configuration(format!(
                        "unknown color '{}' for {} output",
                        color, options.kind
                    )));
                }
            }
        }

        let canvas = planned_canvas(&plot, &options).ok_or_else(|| {
            GraphError::Configuration(format!(
                "canvas does not fit in 32 bits (item {}x{}, track length {})",
                options.item_width, options.item_height, options.track_length
            ))
        })?;
        if options.kind.is_raster() && pixel_buffer_len(canvas.width, canvas.height).is_none() {
            return Err(GraphError::Configuration(format!(
                "{}x{} canvas is too large for {} output",
                canvas.width, canvas.height, options.kind
            )));
        }

        debug!(?chart, kind = %options.kind, "graph resolved");
        Ok(Graph {
            data,
            options,
            chart,
            plot,
        })
    }

    /// Build a graph from one JSON object holding `data` and option keys
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            GraphError::Configuration("graph configuration must be a JSON object".to_string())
        })?;
        let data = object
            .get("data")
            .ok_or_else(|| GraphError::InvalidData("configuration has no 'data' key".to_string()))?;
        let data = ChartData::from_json(data)?;
        let options = GraphOptions::from_json(value)?;
        Graph::new(data, options)
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    pub fn chart(&self) -> Chart {
        self.chart
    }

    /// Final canvas size, after any width/height override
    pub fn canvas(&self) -> Canvas {
        self.layout()
            .canvas()
            .with_override(self.options.width, self.options.height)
    }

    fn palette(&self) -> Palette {
        Palette::new(&self.options.colors)
    }

    /// Category labels: the data's own keys, else the `labels` option
    fn labels(&self) -> Vec<String> {
        let labels = self.data.labels();
        if labels.is_empty() {
            self.options.labels.clone()
        } else {
            labels
        }
    }

    fn layout(&self) -> Layout {
        let palette = self.palette();
        let labels = self.labels();
        let grid_spec = grid_spec(&self.options);
        let bar_spec = bar_spec(&self.options);

        match (&self.plot, self.chart) {
            (Plot::Counts(data), Chart::Count(shape)) => {
                Layout::Grid(layout_grid(data, &palette, &grid_spec), shape)
            }
            (Plot::Counts(data), _) => Layout::Symbols(layout_grid(data, &palette, &grid_spec)),
            (Plot::Groups(groups), _) => {
                Layout::Bars(layout_bars(groups, &palette, &labels, &bar_spec))
            }
            (Plot::Values(values), _) => {
                Layout::Pie(layout_pie(values, &palette, &labels, bar_spec.track_length))
            }
        }
    }

    /// Create the backend for the requested output kind
    fn pre_draw(&self, canvas: Canvas) -> Result<GraphicBackend> {
        let Canvas { width, height } = canvas;
        let format = match self.options.kind {
            OutputKind::Svg => {
                let backend = VectorBackend::new(width, height)
                    .with_title(self.options.title.clone())
                    .with_background(self.options.background_color.clone());
                return Ok(GraphicBackend::Vector(backend));
            }
            OutputKind::Png => ImageFormat::Png,
            OutputKind::Jpg => ImageFormat::Jpeg,
            OutputKind::Gif => ImageFormat::Gif,
            OutputKind::Txt => {
                return Err(GraphError::Configuration(
                    "text output has no graphical backend".to_string(),
                ))
            }
        };

        let mut backend = RasterBackend::new(width, height, format);
        if let Some(color) = self.options.background_color.as_deref().and_then(parse_color) {
            backend = backend.with_background(color);
        }
        Ok(GraphicBackend::Raster(backend))
    }

    /// Lay out and draw, returning the surface that holds the drawing
    pub fn draw(&self) -> Result<Surface> {
        let layout = self.layout();
        let canvas = layout
            .canvas()
            .with_override(self.options.width, self.options.height);
        debug!(width = canvas.width, height = canvas.height, "canvas");

        if let Layout::Symbols(grid) = &layout {
            return Ok(Surface::Text(draw_symbols(grid, &self.options.symbols)));
        }

        let mut backend = self.pre_draw(canvas)?;
        layout.paint(&mut backend, self.options.inner_margin as f64);
        Ok(Surface::Graphic(backend))
    }

    /// Draw, then either save to `filename` or hand the encoded image back
    pub fn render(&self) -> Result<Outcome> {
        let surface = self.draw()?;
        self.post_draw(&surface)
    }

    fn post_draw(&self, surface: &dyn Renderable) -> Result<Outcome> {
        match &self.options.filename {
            Some(path) => {
                surface.save(path)?;
                Ok(Outcome::Saved(path.clone()))
            }
            None => Ok(Outcome::Rendered(surface.render()?)),
        }
    }
}

fn grid_spec(options: &GraphOptions) -> GridSpec {
    GridSpec {
        columns: options.columns,
        item_width: options.item_width,
        item_height: options.item_height,
    }
}

fn bar_spec(options: &GraphOptions) -> BarSpec {
    BarSpec {
        bar_width: options.item_width as f64,
        track_length: options.track_length as f64,
    }
}

/// Final canvas size worked out without laying anything out, `None` when a
/// side or the item total overflows
fn planned_canvas(plot: &Plot, options: &GraphOptions) -> Option<Canvas> {
    let canvas = match plot {
        Plot::Counts(data) => {
            let total = data.iter().try_fold(0usize, |acc, d| {
                acc.checked_add(usize::try_from(d.count).ok()?)
            })?;
            grid_canvas(total, &grid_spec(options))?
        }
        Plot::Groups(groups) => bar_canvas(groups, &bar_spec(options))?,
        Plot::Values(values) if values.iter().any(|&v| v > 0.0) => {
            Canvas::new(options.track_length, options.track_length)
        }
        Plot::Values(_) => Canvas::default(),
    };
    Some(canvas.with_override(options.width, options.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::raster::{DrawOp, Paint};
    use std::cell::Cell;
    use std::path::Path;

    fn options(kind: OutputKind, style: ChartStyle) -> GraphOptions {
        GraphOptions {
            kind,
            style,
            ..GraphOptions::default()
        }
    }

    fn svg(graph: &Graph) -> String {
        match graph.render().unwrap() {
            Outcome::Rendered(Rendered::Text(svg)) => svg,
            other => panic!("expected svg text, got {:?}", other),
        }
    }

    #[test]
    fn test_txt_always_selects_symbol() {
        for style in [ChartStyle::Circle, ChartStyle::Cross, ChartStyle::Manikin, ChartStyle::Bar, ChartStyle::Pie] {
            assert_eq!(Chart::select(OutputKind::Txt, style), Chart::Symbol);
        }
    }

    #[test]
    fn test_style_selects_chart() {
        assert_eq!(Chart::select(OutputKind::Svg, ChartStyle::Circle), Chart::Count(Shape::Circle));
        assert_eq!(Chart::select(OutputKind::Png, ChartStyle::Cross), Chart::Count(Shape::Cross));
        assert_eq!(Chart::select(OutputKind::Gif, ChartStyle::Manikin), Chart::Count(Shape::Manikin));
        assert_eq!(Chart::select(OutputKind::Jpg, ChartStyle::Bar), Chart::Bar);
        assert_eq!(Chart::select(OutputKind::Svg, ChartStyle::Pie), Chart::Pie);
    }

    #[test]
    fn test_new_rejects_bad_data_before_drawing() {
        let result = Graph::new(ChartData::Values(vec![3.0, -1.0]), GraphOptions::default());
        assert!(matches!(result, Err(GraphError::InvalidData(_))));

        let groups = ChartData::Groups(vec![vec![1.0]]);
        assert!(Graph::new(groups.clone(), options(OutputKind::Svg, ChartStyle::Pie)).is_err());
        assert!(Graph::new(groups, options(OutputKind::Svg, ChartStyle::Bar)).is_ok());
    }

    #[test]
    fn test_raster_rejects_unknown_color() {
        let mut opts = options(OutputKind::Png, ChartStyle::Circle);
        opts.colors = vec!["blurple".to_string()];
        let err = Graph::new(ChartData::counts([("a", 1)]), opts).unwrap_err();
        assert!(matches!(err, GraphError::Configuration(_)));
        assert!(err.to_string().contains("blurple"));
    }

    #[test]
    fn test_new_rejects_canvas_overflow() {
        let mut opts = options(OutputKind::Svg, ChartStyle::Circle);
        opts.item_width = 3_000_000_000;
        let err = Graph::new(ChartData::counts([("red", 2)]), opts.clone()).unwrap_err();
        assert!(matches!(err, GraphError::Configuration(_)));
        // one item still fits
        let graph = Graph::new(ChartData::counts([("red", 1)]), opts).unwrap();
        assert_eq!(graph.canvas(), Canvas::new(3_000_000_000, 20));

        let mut opts = options(OutputKind::Svg, ChartStyle::Bar);
        opts.item_width = 3_000_000_000;
        assert!(Graph::new(ChartData::Values(vec![1.0, 2.0]), opts).is_err());

        let totals = ChartData::counts([("red", u64::MAX), ("green", u64::MAX)]);
        assert!(matches!(
            Graph::new(totals, GraphOptions::default()),
            Err(GraphError::Configuration(_))
        ));
    }

    #[test]
    fn test_raster_rejects_oversized_buffer() {
        let mut opts = options(OutputKind::Png, ChartStyle::Circle);
        opts.width = Some(u32::MAX);
        opts.height = Some(u32::MAX);
        let err = Graph::new(ChartData::counts([("red", 1)]), opts.clone()).unwrap_err();
        assert!(matches!(err, GraphError::Configuration(_)));

        // vector output never allocates pixels
        opts.kind = OutputKind::Svg;
        let graph = Graph::new(ChartData::counts([("red", 1)]), opts).unwrap();
        assert_eq!(graph.canvas(), Canvas::new(u32::MAX, u32::MAX));
    }

    #[test]
    fn test_cross_svg_coordinates() {
        let mut opts = options(OutputKind::Svg, ChartStyle::Cross);
        opts.item_width = 100;
        opts.item_height = 100;
        let graph = Graph::new(ChartData::counts([("red", 1), ("green", 1)]), opts).unwrap();
        let svg = svg(&graph);
        assert!(svg.contains("stroke=\"red\" x1=\"4\" y1=\"4\" x2=\"96\" y2=\"96\""));
        assert!(svg.contains("stroke=\"red\" x1=\"4\" y1=\"96\" x2=\"96\" y2=\"4\""));
        assert!(svg.contains("stroke=\"green\" x1=\"104\" y1=\"4\" x2=\"196\" y2=\"96\""));
        assert!(svg.contains("stroke=\"green\" x1=\"104\" y1=\"96\" x2=\"196\" y2=\"4\""));
        assert_eq!(svg.matches("<line").count(), 4);
    }

    #[test]
    fn test_raster_cross_ops() {
        let mut opts = options(OutputKind::Png, ChartStyle::Cross);
        opts.columns = Some(2);
        opts.item_width = 100;
        opts.item_height = 100;
        let graph = Graph::new(ChartData::counts([("red", 2)]), opts).unwrap();
        let raster = match graph.draw().unwrap() {
            Surface::Graphic(GraphicBackend::Raster(raster)) => raster,
            other => panic!("expected raster surface, got {:?}", other),
        };

        let lines: Vec<&DrawOp> = raster
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .collect();
        assert_eq!(
            lines,
            vec![
                &DrawOp::Line { from: (4, 4), to: (96, 96) },
                &DrawOp::Line { from: (4, 96), to: (96, 4) },
                &DrawOp::Line { from: (104, 4), to: (196, 96) },
                &DrawOp::Line { from: (104, 96), to: (196, 4) },
            ]
        );
        let red_strokes = raster
            .ops()
            .iter()
            .filter(|op| **op == DrawOp::Stroke(Paint::Rgb(255, 0, 0)))
            .count();
        assert_eq!(red_strokes, 4);
    }

    #[test]
    fn test_canvas_override() {
        let mut opts = options(OutputKind::Svg, ChartStyle::Circle);
        opts.width = Some(300);
        let graph = Graph::new(ChartData::counts([("red", 2)]), opts).unwrap();
        assert_eq!(graph.canvas(), Canvas::new(300, 20));
        assert!(svg(&graph).contains("<svg width=\"300\" height=\"20\""));
    }

    #[test]
    fn test_text_output() {
        let mut opts = options(OutputKind::Txt, ChartStyle::Cross);
        opts.columns = Some(3);
        opts.symbols = vec!["R".to_string(), "G".to_string()];
        let graph = Graph::new(ChartData::counts([("red", 4), ("green", 1)]), opts).unwrap();
        assert_eq!(
            graph.render().unwrap(),
            Outcome::Rendered(Rendered::Text("RRR\nRG".to_string()))
        );
    }

    #[test]
    fn test_empty_counts_draw_nothing() {
        let graph = Graph::new(ChartData::counts([("red", 0)]), GraphOptions::default()).unwrap();
        let svg = svg(&graph);
        assert!(svg.contains("<svg width=\"0\" height=\"0\""));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn test_bar_and_pie_svg() {
        let mut opts = options(OutputKind::Svg, ChartStyle::Bar);
        opts.colors = vec!["blue".to_string(), "green".to_string()];
        let bars = Graph::new(ChartData::Groups(vec![vec![5.0, 2.0]]), opts.clone()).unwrap();
        let svg_bars = svg(&bars);
        assert_eq!(svg_bars.matches("<rect").count(), 2);
        assert!(svg_bars.contains("class=\"bar\" fill=\"green\" x=\"24\" y=\"120\" width=\"20\" height=\"80\""));

        opts.style = ChartStyle::Pie;
        let pie = Graph::new(ChartData::Values(vec![1.0, 1.0]), opts).unwrap();
        let svg_pie = svg(&pie);
        assert_eq!(svg_pie.matches("<polygon").count(), 2);
        assert!(svg_pie.contains("<svg width=\"200\" height=\"200\""));
    }

    #[test]
    fn test_post_draw_saves_or_renders_never_both() {
        struct Probe {
            renders: Cell<usize>,
            saves: Cell<usize>,
        }
        impl Renderable for Probe {
            fn render(&self) -> Result<Rendered> {
                self.renders.set(self.renders.get() + 1);
                Ok(Rendered::Text("SVG_CONTENT".to_string()))
            }
            fn save(&self, _path: &Path) -> Result<()> {
                self.saves.set(self.saves.get() + 1);
                Ok(())
            }
        }

        let probe = Probe { renders: Cell::new(0), saves: Cell::new(0) };
        let graph = Graph::new(ChartData::counts([("red", 1)]), GraphOptions::default()).unwrap();
        let outcome = graph.post_draw(&probe).unwrap();
        assert_eq!(outcome, Outcome::Rendered(Rendered::Text("SVG_CONTENT".to_string())));
        assert_eq!((probe.renders.get(), probe.saves.get()), (1, 0));

        let probe = Probe { renders: Cell::new(0), saves: Cell::new(0) };
        let mut opts = GraphOptions::default();
        opts.filename = Some(PathBuf::from("dots.svg"));
        let graph = Graph::new(ChartData::counts([("red", 1)]), opts).unwrap();
        let outcome = graph.post_draw(&probe).unwrap();
        assert_eq!(outcome, Outcome::Saved(PathBuf::from("dots.svg")));
        assert_eq!((probe.renders.get(), probe.saves.get()), (0, 1));
    }

    #[test]
    fn test_from_json() {
        let graph = Graph::from_json(&serde_json::json!({
            "data": [5, 2],
            "type": "svg",
            "style": "circle",
            "colors": ["blue", "green"],
            "bogus_option": "123123"
        }))
        .unwrap();
        assert_eq!(graph.chart(), Chart::Count(Shape::Circle));
        assert_eq!(graph.data(), &ChartData::Values(vec![5.0, 2.0]));
        assert_eq!(graph.options().colors, vec!["blue", "green"]);
        assert_eq!(svg(&graph).matches("fill=\"blue\"").count(), 5);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            Graph::from_json(&serde_json::json!({ "type": "svg" })),
            Err(GraphError::InvalidData(_))
        ));
        assert!(matches!(
            Graph::from_json(&serde_json::json!({ "data": { "red": 1 }, "style": "star" })),
            Err(GraphError::Configuration(_))
        ));
        assert!(Graph::from_json(&serde_json::json!([1, 2])).is_err());
    }
}
