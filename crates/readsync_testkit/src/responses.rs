//! Builders for service response documents.

use chrono::{DateTime, Utc};

/// Escapes text for inclusion in an XML element.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// A successful registration document.
pub fn registration_success(adp_token: &str, device_private_key: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <response>\
         <adp_token>{}</adp_token>\
         <device_private_key>{}</device_private_key>\
         <user_directed_id>amzn1.account.TEST</user_directed_id>\
         </response>",
        escape_xml(adp_token),
        escape_xml(device_private_key)
    )
}

/// The document returned for unknown credentials.
pub fn customer_not_found() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?><customer_not_found/>".to_string()
}

/// The generic error document.
pub fn error_document() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?><error/>".to_string()
}

/// One `meta_data` entry of a sync response.
#[derive(Debug, Clone, Default)]
pub struct MetaData {
    asin: Option<String>,
    title: Option<String>,
    authors: Vec<String>,
    publisher: Option<String>,
    publication_date: Option<String>,
}

impl MetaData {
    /// Creates an entry with an ASIN.
    pub fn new(asin: impl Into<String>) -> Self {
        Self {
            asin: Some(asin.into()),
            ..Self::default()
        }
    }

    /// Creates an entry without an ASIN, which the client must reject.
    pub fn without_asin() -> Self {
        Self::default()
    }

    /// Returns the ASIN, if set.
    pub fn asin(&self) -> Option<&str> {
        self.asin.as_deref()
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends an author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Sets the publisher.
    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Sets the publication date, formatted the way the service does.
    pub fn published(mut self, date: DateTime<Utc>) -> Self {
        self.publication_date = Some(date.format("%Y-%m-%dT%H:%M:%S+0000").to_string());
        self
    }

    /// Sets a raw publication date string.
    pub fn published_raw(mut self, date: impl Into<String>) -> Self {
        self.publication_date = Some(date.into());
        self
    }

    fn render(&self, out: &mut String) {
        out.push_str("<meta_data>");
        let mut field = |name: &str, value: &Option<String>| {
            if let Some(value) = value {
                out.push_str(&format!("<{name}>{}</{name}>", escape_xml(value)));
            }
        };
        field("ASIN", &self.asin);
        field("title", &self.title);
        field("publisher", &self.publisher);
        field("publication_date", &self.publication_date);
        if !self.authors.is_empty() {
            out.push_str("<authors>");
            for author in &self.authors {
                out.push_str(&format!("<author>{}</author>", escape_xml(author)));
            }
            out.push_str("</authors>");
        }
        out.push_str("</meta_data>");
    }
}

/// Builds a sync response document.
#[derive(Debug, Clone)]
pub struct SyncResponseBuilder {
    sync_time: String,
    sync_type: String,
    additions: Vec<MetaData>,
    removals: Vec<MetaData>,
}

impl SyncResponseBuilder {
    /// Starts a full-sync response whose `sync_time` is `sync_time`.
    pub fn new(sync_time: impl Into<String>) -> Self {
        Self {
            sync_time: sync_time.into(),
            sync_type: "full".into(),
            additions: Vec::new(),
            removals: Vec::new(),
        }
    }

    /// Sets the `syncType` attribute.
    pub fn sync_type(mut self, sync_type: impl Into<String>) -> Self {
        self.sync_type = sync_type.into();
        self
    }

    /// Appends an entry to `add_update_list`.
    pub fn add(mut self, entry: MetaData) -> Self {
        self.additions.push(entry);
        self
    }

    /// Appends an ASIN to `removal_list`.
    pub fn remove(mut self, asin: impl Into<String>) -> Self {
        self.removals.push(MetaData::new(asin));
        self
    }

    /// Renders the document.
    pub fn build(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        out.push_str(&format!(
            "<response syncType=\"{}\">",
            escape_xml(&self.sync_type)
        ));
        out.push_str(&format!("<sync_time>{}</sync_time>", escape_xml(&self.sync_time)));

        out.push_str("<add_update_list>");
        for entry in &self.additions {
            entry.render(&mut out);
        }
        out.push_str("</add_update_list>");

        out.push_str("<removal_list>");
        for entry in &self.removals {
            entry.render(&mut out);
        }
        out.push_str("</removal_list>");

        out.push_str("</response>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }

    #[test]
    fn sync_response_shape() {
        let body = SyncResponseBuilder::new("cp;1")
            .sync_type("incremental")
            .add(MetaData::new("A1").title("T").author("X").author("Y"))
            .remove("A2")
            .build();

        assert!(body.contains("<response syncType=\"incremental\">"));
        assert!(body.contains("<sync_time>cp;1</sync_time>"));
        assert!(body.contains("<authors><author>X</author><author>Y</author></authors>"));
        assert!(body.contains("<removal_list><meta_data><ASIN>A2</ASIN></meta_data></removal_list>"));
    }
}
