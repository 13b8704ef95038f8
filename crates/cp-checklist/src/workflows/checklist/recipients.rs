/// Static property-to-address table deciding who receives each checklist.
///
/// Lookups compare identifiers on their letters and digits only, ignoring case,
/// so `property1`, `Property 1` and `PROPERTY-1` name the same property.
/// Unknown or absent identifiers resolve to the default recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecipientMap {
    entries: Vec<(String, String)>,
    default_recipient: String,
}

impl PropertyRecipientMap {
    pub const STANDARD_DEFAULT: &'static str = "inspections@example.com";

    pub fn new(entries: Vec<(String, String)>, default_recipient: impl Into<String>) -> Self {
        Self {
            entries,
            default_recipient: default_recipient.into(),
        }
    }

    /// Table covering both property vocabularies the inspection form has used.
    pub fn standard() -> Self {
        let entries = [
            ("Property 1", "property1.inspections@example.com"),
            ("Property 2", "property2.inspections@example.com"),
            ("Property 3", "property3.inspections@example.com"),
            ("San Clemente", "sanclemente.inspections@example.com"),
        ]
        .into_iter()
        .map(|(property, address)| (property.to_string(), address.to_string()))
        .collect();

        Self::new(entries, Self::STANDARD_DEFAULT)
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn default_recipient(&self) -> &str {
        &self.default_recipient
    }

    pub fn lookup(&self, property: &str) -> Option<&str> {
        let wanted = identifier_key(property);
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(key, _)| identifier_key(key) == wanted)
            .map(|(_, address)| address.as_str())
    }

    pub fn resolve(&self, property: Option<&str>) -> &str {
        property
            .and_then(|property| self.lookup(property))
            .unwrap_or(&self.default_recipient)
    }
}

fn identifier_key(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

impl Default for PropertyRecipientMap {
    fn default() -> Self {
        Self::standard()
    }
}
