use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "ISBN_13")]
    pub isbn_13: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub ebook: String,
    #[serde(default)]
    pub cover: Option<String>,
}
