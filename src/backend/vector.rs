use super::{write_file, Backend, Renderable, Rendered};
use crate::error::Result;
use crate::style::Style;
use std::path::Path;

const SVG_HEADER: &str = concat!(
    "<?xml version=\"1.0\" standalone=\"no\"?>\n",
    "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" ",
    "\"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
);

/// One declarative SVG element, e.g. `<line x1=".." .. />`
#[derive(Debug, Clone, PartialEq)]
struct Node {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
}

impl Node {
    fn new(name: &'static str, style: &Style) -> Self {
        let mut attributes = Vec::new();
        if let Some(class) = &style.class {
            attributes.push(("class", class.clone()));
        }
        if let Some(stroke) = &style.stroke {
            attributes.push(("stroke", stroke.clone()));
        }
        if let Some(width) = style.stroke_width {
            attributes.push(("stroke-width", format_number(width)));
        }
        if let Some(fill) = &style.fill {
            attributes.push(("fill", fill.clone()));
        }
        Node { name, attributes }
    }

    fn attr(mut self, key: &'static str, value: f64) -> Self {
        self.attributes.push((key, format_number(value)));
        self
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        for (key, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", key, escape(value)));
        }
        out.push_str("/>\n");
    }
}

/// SVG document builder. Shapes accumulate as nodes and are serialized on
/// `render`.
#[derive(Debug, Clone)]
pub struct VectorBackend {
    width: u32,
    height: u32,
    title: Option<String>,
    background: Option<String>,
    nodes: Vec<Node>,
}

impl VectorBackend {
    pub fn new(width: u32, height: u32) -> Self {
        VectorBackend {
            width,
            height,
            title: None,
            background: None,
            nodes: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_background(mut self, color: Option<String>) -> Self {
        self.background = color;
        self
    }

    /// Number of shape nodes drawn so far
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn to_svg(&self) -> String {
        let mut out = String::from(SVG_HEADER);
        out.push_str(&format!(
            "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\"",
            w = self.width,
            h = self.height,
        ));
        if let Some(background) = &self.background {
            out.push_str(&format!(" style=\"background-color: {}\"", escape(background)));
        }
        out.push_str(">\n");
        if let Some(title) = &self.title {
            out.push_str(&format!("<title>{}</title>\n", escape(title)));
        }
        for node in &self.nodes {
            node.write_to(&mut out);
        }
        out.push_str("</svg>\n");
        out
    }
}

impl Backend for VectorBackend {
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &Style) {
        let node = Node::new("line", style)
            .attr("x1", x1)
            .attr("y1", y1)
            .attr("x2", x2)
            .attr("y2", y2);
        self.nodes.push(node);
    }

    fn circle(&mut self, cx: f64, cy: f64, radius: f64, style: &Style) {
        let node = Node::new("circle", style)
            .attr("cx", cx)
            .attr("cy", cy)
            .attr("r", radius);
        self.nodes.push(node);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &Style) {
        let node = Node::new("rect", style)
            .attr("x", x)
            .attr("y", y)
            .attr("width", width)
            .attr("height", height);
        self.nodes.push(node);
    }

    fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        let points = points
            .iter()
            .map(|&(x, y)| format!("{},{}", format_number(x), format_number(y)))
            .collect::<Vec<_>>()
            .join(" ");
        let mut node = Node::new("polygon", style);
        node.attributes.push(("points", points));
        self.nodes.push(node);
    }
}

impl Renderable for VectorBackend {
    fn render(&self) -> Result<Rendered> {
        Ok(Rendered::Text(self.to_svg()))
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_file(path, self.to_svg().as_bytes())
    }
}

/// Whole numbers print without a fraction, everything else keeps two decimals
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(backend: &VectorBackend) -> String {
        match backend.render().unwrap() {
            Rendered::Text(svg) => svg,
            Rendered::Binary(_) => panic!("vector backend must render text"),
        }
    }

    #[test]
    fn test_header_and_root() {
        let svg = render(&VectorBackend::new(40, 20));
        assert!(svg.contains("DOCTYPE svg PUBLIC"));
        assert!(svg.contains("<svg width=\"40\" height=\"20\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_line_attributes() {
        let mut backend = VectorBackend::new(100, 100);
        backend.line(4.0, 4.0, 96.0, 96.0, &Style::stroke("red").with_class("cross"));
        let svg = render(&backend);
        assert!(svg.contains(
            "<line class=\"cross\" stroke=\"red\" x1=\"4\" y1=\"4\" x2=\"96\" y2=\"96\"/>"
        ));
    }

    #[test]
    fn test_circle_and_rect() {
        let mut backend = VectorBackend::new(20, 20);
        backend.circle(10.0, 10.0, 6.0, &Style::fill("blue"));
        backend.rect(0.0, 2.5, 8.0, 12.0, &Style::fill("#FACADE"));
        let svg = render(&backend);
        assert!(svg.contains("<circle fill=\"blue\" cx=\"10\" cy=\"10\" r=\"6\"/>"));
        assert!(svg.contains("<rect fill=\"#FACADE\" x=\"0\" y=\"2.5\" width=\"8\" height=\"12\"/>"));
        assert_eq!(backend.node_count(), 2);
    }

    #[test]
    fn test_polygon_points() {
        let mut backend = VectorBackend::new(10, 10);
        backend.polygon(&[(5.0, 5.0), (5.0, 0.0), (10.0, 5.0)], &Style::fill("red"));
        assert!(render(&backend).contains("points=\"5,5 5,0 10,5\""));
    }

    #[test]
    fn test_title_and_background() {
        let backend = VectorBackend::new(10, 10)
            .with_title(Some("Fruit <count>".to_string()))
            .with_background(Some("Silver".to_string()));
        let svg = render(&backend);
        assert!(svg.contains("<title>Fruit &lt;count&gt;</title>"));
        assert!(svg.contains("style=\"background-color: Silver\""));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(33.333333), "33.33");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut backend = VectorBackend::new(20, 20);
        backend.line(0.0, 0.0, 20.0, 20.0, &Style::stroke("red"));
        assert_eq!(backend.render().unwrap(), backend.render().unwrap());
    }
}
