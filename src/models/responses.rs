use serde::{Deserialize, Serialize};

use crate::models::book::Book;

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub data: Book,
    pub message: String,
}

// Failure bodies carry { "message": ... } when the lookup service is
// well-behaved; the field stays optional so other shapes still decode.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}
