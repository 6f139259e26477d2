/// The parse events the transducer consumes. They are independent of the XML
/// library, so the state machine can be driven directly from tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Start { name: String, attributes: Attributes },
    End { name: String },
    Text(String),
}

impl XmlEvent {
    pub fn start<'a>(name: &str, attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        XmlEvent::Start {
            name: name.to_string(),
            attributes: attributes.into_iter().collect(),
        }
    }

    /// A start tag without attributes.
    pub fn tag(name: &str) -> Self {
        XmlEvent::Start {
            name: name.to_string(),
            attributes: Attributes::new(),
        }
    }

    pub fn end(name: &str) -> Self {
        XmlEvent::End {
            name: name.to_string(),
        }
    }

    pub fn text(text: &str) -> Self {
        XmlEvent::Text(text.to_string())
    }
}

/// Attributes of a start tag, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}
