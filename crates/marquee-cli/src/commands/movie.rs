//! Movie command handlers
//!
//! Each command builds the request an HTTP gateway would have delivered
//! (path parameters and raw body) and runs the matching handler.

use std::io::Read;

use anyhow::{Context, Result};

use marquee_core::handlers::{self, TITLE_PARAM, YEAR_PARAM};
use marquee_core::{MovieTable, Request, Response};

/// Get one movie by year and title slug
pub fn get(table: &MovieTable, year: String, title: String) -> Response {
    handlers::get_movie(table, &key_request(year, title))
}

/// List movies of a year
pub fn list(table: &MovieTable, year: String) -> Response {
    let request = Request::new().with_path_parameter(YEAR_PARAM, year);
    handlers::list_by_year(table, &request)
}

/// Create a movie from a JSON body
pub fn create(table: &MovieTable, body: Option<String>) -> Result<Response> {
    let request = Request::new().with_body(read_body(body, std::io::stdin())?);
    Ok(handlers::create_movie(table, &request))
}

/// Update plot and rating from a JSON body
pub fn update(table: &MovieTable, body: Option<String>) -> Result<Response> {
    let request = Request::new().with_body(read_body(body, std::io::stdin())?);
    Ok(handlers::update_movie(table, &request))
}

/// Delete one movie by year and title slug
pub fn delete(table: &MovieTable, year: String, title: String) -> Response {
    handlers::delete_movie(table, &key_request(year, title))
}

fn key_request(year: String, title: String) -> Request {
    Request::new()
        .with_path_parameter(YEAR_PARAM, year)
        .with_path_parameter(TITLE_PARAM, title)
}

/// Use the `--body` argument, or read the body from `input` when absent
fn read_body(body: Option<String>, mut input: impl Read) -> Result<String> {
    match body {
        Some(body) => Ok(body),
        None => {
            let mut body = String::new();
            input
                .read_to_string(&mut body)
                .context("Failed to read request body from stdin")?;
            Ok(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_body_argument_wins() {
        let body = read_body(Some("{}".to_string()), Cursor::new("ignored")).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn test_body_from_input() {
        let body = read_body(None, Cursor::new(r#"{"year":1975,"title":"Jaws"}"#)).unwrap();
        assert_eq!(body, r#"{"year":1975,"title":"Jaws"}"#);
    }

    #[test]
    fn test_key_request() {
        let request = key_request("1975".to_string(), "Jaws-2".to_string());
        assert_eq!(request.path_parameters[YEAR_PARAM], "1975");
        assert_eq!(request.path_parameters[TITLE_PARAM], "Jaws-2");
        assert!(request.body.is_empty());
    }
}
