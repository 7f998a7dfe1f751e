/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Response encoding for the control port.
//!
//! Every response carries `Server`, `Content-Type` and `Connection: close`
//! headers; the connection is closed once the response is flushed.
//! Successful reads use a JSON body of the form `{"data":["v1","v2",…]}`.

use serde_json::json;

use super::error::ProtocolError;

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!("stationd/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    Forbidden,
    NotFound,
    PayloadTooLarge,
    InternalServerError,
}

impl StatusCode {
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::PayloadTooLarge => "Request Entity Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Ordered module fields, sent as `{"data":[...]}`.
    Data(Vec<String>),
    /// Plain status text.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Body,
}

impl Response {
    pub fn data(fields: Vec<String>) -> Self {
        Self {
            status: StatusCode::Ok,
            body: Body::Data(fields),
        }
    }

    pub fn status_only(status: StatusCode) -> Self {
        Self {
            status,
            body: Body::Text(format!("{} {}", status.code(), status.reason())),
        }
    }

    /// Serialises the status line, headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (content_type, body) = match &self.body {
            Body::Data(fields) => ("application/json", json!({ "data": fields }).to_string()),
            Body::Text(text) => ("text/html", text.clone()),
        };

        let mut out = format!(
            "HTTP/1.1 {} {}\r\nServer: {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            SERVER_NAME,
            content_type,
        );
        out.push_str(&body);
        out.push('\n');
        out.into_bytes()
    }
}

impl From<&ProtocolError> for Response {
    fn from(err: &ProtocolError) -> Self {
        Response::status_only(err.status())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(resp: &Response) -> String {
        String::from_utf8(resp.to_bytes()).unwrap()
    }

    #[test]
    fn data_response_is_json_with_headers() {
        let resp = Response::data(vec!["1".into(), "two".into()]);
        let out = text(&resp);
        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.contains(&format!("Server: {SERVER_NAME}\r\n")));
        assert!(out.contains("Content-Type: application/json\r\n"));
        assert!(out.contains("Connection: close\r\n\r\n"));
        assert!(out.ends_with("\r\n\r\n{\"data\":[\"1\",\"two\"]}\n"));
    }

    #[test]
    fn data_values_are_escaped() {
        let resp = Response::data(vec!["say \"hi\"".into()]);
        assert!(text(&resp).ends_with("{\"data\":[\"say \\\"hi\\\"\"]}\n"));
    }

    #[test]
    fn error_statuses_map_to_codes() {
        let cases = [
            (ProtocolError::BadRequest("x".into()), "400 Bad Request"),
            (ProtocolError::Forbidden, "403 Forbidden"),
            (ProtocolError::NotFound("/x".into()), "404 Not Found"),
            (
                ProtocolError::PayloadTooLarge { limit: 256 },
                "413 Request Entity Too Large",
            ),
        ];
        for (err, line) in cases {
            let out = text(&Response::from(&err));
            assert!(out.starts_with(&format!("HTTP/1.1 {line}\r\n")), "{out}");
            assert!(out.contains("Content-Type: text/html\r\n"));
        }
    }
}
