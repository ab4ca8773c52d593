use tracing::Subscriber;
use tracing_subscriber::{fmt, registry::LookupSpan, Layer};

/// Basic tracing configuration
#[derive(Debug, Clone, Copy, Default, serde::Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    /// Pretty print
    #[default]
    Pretty,
    /// JSON
    Json,
    /// Compact
    Compact,
    /// Default style
    #[serde(other)]
    Full,
}

impl Style {
    /// A stdout fmt layer in this style. Each style produces a different
    /// layer type, so the result is boxed.
    pub fn layer<S>(self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        match self {
            Style::Full => fmt::layer().boxed(),
            Style::Pretty => fmt::layer().pretty().boxed(),
            Style::Compact => fmt::layer().compact().boxed(),
            Style::Json => fmt::layer().json().boxed(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(serde::Deserialize)]
    struct TestStyle {
        style: Style,
    }

    fn style(name: &str) -> Style {
        serde_json::from_str::<TestStyle>(&format!(r#"{{"style": "{name}"}}"#))
            .unwrap()
            .style
    }

    #[test]
    fn it_deserializes_formatting_strings() {
        assert_eq!(style("pretty"), Style::Pretty);
        assert_eq!(style("compact"), Style::Compact);
        assert_eq!(style("full"), Style::Full);
        assert_eq!(style("json"), Style::Json);
        assert_eq!(style("toast"), Style::Full);
    }
}
