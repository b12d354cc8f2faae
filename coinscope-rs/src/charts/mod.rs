//! Chart module
//!
//! A serde model of the subset of the Plotly figure schema the dashboard
//! uses. Figures are serialized to JSON and drawn by plotly.js in the page.

pub mod dashboard;

pub use dashboard::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A complete Plotly figure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Trace names, in drawing order
    pub fn trace_names(&self) -> Vec<Option<&str>> {
        self.data.iter().map(|t| t.name.as_deref()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    None,
    Tonexty,
}

/// One series on a figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceType,
    pub x: Vec<String>,
    /// `None` serializes as `null`, which Plotly draws as a gap
    pub y: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl Trace {
    /// Line trace over dated values
    pub fn line<I>(name: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let (x, y) = split_points(points);
        Self {
            kind: TraceType::Scatter,
            x,
            y,
            mode: Some("lines".to_string()),
            name: Some(name.into()),
            line: None,
            fill: None,
            fillcolor: None,
            showlegend: None,
        }
    }

    /// Bar trace over dated values
    pub fn bar<I>(name: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let (x, y) = split_points(points);
        Self {
            kind: TraceType::Bar,
            mode: None,
            ..Self::line(name, std::iter::empty()).with_xy(x, y)
        }
    }

    fn with_xy(mut self, x: Vec<String>, y: Vec<Option<f64>>) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.line.get_or_insert_with(Line::default).color = Some(color.into());
        self
    }

    /// Invisible line, used for cloud boundaries
    pub fn hidden_line(mut self) -> Self {
        self.line.get_or_insert_with(Line::default).width = Some(0.0);
        self
    }

    pub fn fill_to_previous(mut self, color: impl Into<String>) -> Self {
        self.fill = Some(Fill::Tonexty);
        self.fillcolor = Some(color.into());
        self
    }

    pub fn no_fill(mut self) -> Self {
        self.fill = Some(Fill::None);
        self
    }

    pub fn unnamed(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn hide_legend(mut self) -> Self {
        self.showlegend = Some(false);
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn split_points<I>(points: I) -> (Vec<String>, Vec<Option<f64>>)
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    points
        .into_iter()
        .map(|(date, value)| (date.format("%Y-%m-%d").to_string(), value))
        .unzip()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Font {
    pub fn colored(color: &str) -> Self {
        Self {
            color: Some(color.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Title {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickfont: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<String>,
}

impl Axis {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Some(Title::text(text)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Page colors the Ichimoku chart adopts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub background_color: String,
    pub text_color: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            text_color: "#31333f".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background_color: "#0e1117".to_string(),
            text_color: "#fafafa".to_string(),
        }
    }

    /// `dark` selects the dark palette, anything else the light one
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("dark") {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_serializes_gaps_as_null() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let trace = Trace::line("Close", vec![(date, Some(1.5)), (date, None)]).color("red");
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["type"], "scatter");
        assert_eq!(json["x"][0], "2024-01-01");
        assert_eq!(json["y"][1], serde_json::Value::Null);
        assert_eq!(json["line"]["color"], "red");
        assert!(json.get("fill").is_none());
    }

    #[test]
    fn test_bar_trace_has_no_mode() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let trace = Trace::bar("BTC-USD", vec![(date, Some(12.0))]);
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["type"], "bar");
        assert!(json.get("mode").is_none());
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name("DARK"), Theme::dark());
        assert_eq!(Theme::from_name("sepia"), Theme::light());
    }
}
