//! Sample Confluence REST API payloads.

use serde_json::json;

// Page with storage body, space, version, and links expanded
pub fn sample_page() -> serde_json::Value {
  json!({
    "id": "123456",
    "type": "page",
    "status": "current",
    "title": "Getting Started Guide",
    "space": { "key": "DOCS", "name": "Documentation", "type": "global" },
    "version": { "number": 4, "when": "2024-03-01T10:00:00.000Z" },
    "body": {
      "storage": {
        "value": "<h1>Getting Started</h1><p>Welcome to our documentation!</p>",
        "representation": "storage"
      }
    },
    "_links": {
      "webui": "/spaces/DOCS/pages/123456/Getting+Started+Guide",
      "base": "https://wiki.example.com"
    }
  })
}

pub fn sample_spaces() -> serde_json::Value {
  json!({
    "results": [
      { "key": "DOCS", "name": "Documentation", "type": "global" },
      { "key": "~jdoe", "name": "Jane Doe", "type": "personal" }
    ],
    "start": 0,
    "limit": 100,
    "size": 2
  })
}

pub fn sample_children() -> serde_json::Value {
  json!({
    "results": [
      { "id": "200", "type": "page", "title": "Installation" },
      { "id": "201", "type": "page", "title": "Configuration" }
    ],
    "size": 2
  })
}

// CQL results nest the content object
pub fn sample_search_results() -> serde_json::Value {
  json!({
    "results": [
      {
        "content": {
          "id": "123456",
          "type": "page",
          "title": "Getting Started Guide",
          "space": { "key": "DOCS" }
        },
        "title": "Getting Started Guide",
        "excerpt": "Welcome to our @@@hl@@@documentation@@@endhl@@@"
      }
    ],
    "size": 1
  })
}
