/// A single HTTP header as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Header {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A request or response payload. Also used for a resource's embedded object,
/// which is structurally the same container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    /// Status code, request label, or object name. Empty for bare markers.
    pub name: String,
    pub description: String,
    pub headers: Vec<Header>,
    /// Literal body text; opaque to the parser.
    pub body: String,
    /// Literal schema text, when a schema section is present.
    pub schema: String,
}

/// One HTTP method of a resource, with its payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Method {
    /// The HTTP verb as written (e.g. "GET").
    pub method: String,
    pub description: String,
    pub headers: Vec<Header>,
    pub requests: Vec<Payload>,
    pub responses: Vec<Payload>,
}

/// An addressable entity identified by a URI template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    /// Identity name; empty for a nameless `/uri` resource.
    pub name: String,
    pub uri_template: String,
    pub description: String,
    /// Embedded object definition, when one is declared.
    pub object: Option<Payload>,
    pub headers: Vec<Header>,
    pub methods: Vec<Method>,
}

/// A named set of resources. Resources defined before any group header are
/// collected into an anonymous group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceGroup {
    pub name: String,
    pub description: String,
    pub resources: Vec<Resource>,
}

/// The parsed API description document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blueprint {
    /// Leading `key: value` metadata lines, in document order.
    pub metadata: Vec<(String, String)>,
    /// The API name, from the first plain header.
    pub name: String,
    pub description: String,
    pub resource_groups: Vec<ResourceGroup>,
}
