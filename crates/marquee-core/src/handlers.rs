//! Request handlers
//!
//! One handler per entrypoint. Each takes a `Request` (path parameters and
//! raw body), calls the data access layer, and maps the outcome to a
//! `Response`.
//!
//! | handler          | success                | miss / empty              |
//! |------------------|------------------------|---------------------------|
//! | `get_movie`      | 200, record + newline  | 500, request body echoed  |
//! | `list_by_year`   | 200, record list       | 500, request body echoed  |
//! | `create_movie`   | 200, `Success\n`       | -                         |
//! | `update_movie`   | 200, `Success\n`       | 500, `Error`              |
//! | `delete_movie`   | 200, `Success\n`       | -                         |
//!
//! Every `DalError`, and any failure to render a response body, becomes 500
//! with body `Error` through `failure`, which logs it once. No handler panics
//! or aborts on a store failure.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::dal::{DalError, DalResult, Lookup, MovieTable};
use crate::models::MovieRecord;
use crate::slug::parse_slug;

/// Body returned by successful writes
pub const SUCCESS_BODY: &str = "Success\n";

/// Body returned for any failure
pub const ERROR_BODY: &str = "Error";

/// Path parameter carrying the year
pub const YEAR_PARAM: &str = "year";

/// Path parameter carrying the title slug
pub const TITLE_PARAM: &str = "title";

/// An incoming request
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub path_parameters: HashMap<String, String>,
    pub body: String,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.path_parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    fn path_parameter(&self, name: &'static str) -> DalResult<&str> {
        self.path_parameters
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| DalError::Validation {
                field: name,
                message: "missing path parameter".to_string(),
            })
    }

    /// The title path parameter, turned from a slug into a title
    fn title(&self) -> DalResult<String> {
        self.path_parameter(TITLE_PARAM).map(parse_slug)
    }
}

/// A status code and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn server_error(body: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Fetch one movie by `year` and `title` slug
pub fn get_movie(table: &MovieTable, request: &Request) -> Response {
    let lookup = request.path_parameter(YEAR_PARAM).and_then(|year| {
        let title = request.title()?;
        debug!(year, title = %title, "Path vars");
        table.find_by_key(year, &title)
    });

    match lookup {
        Ok(Lookup::Found(movie)) => match movie.to_json() {
            Ok(json) => {
                info!(key = %movie.key(), "Found item");
                Response::ok(json + "\n")
            }
            Err(e) => failure("get", &e),
        },
        Ok(Lookup::NotFound) => {
            warn!("Could not find movie");
            Response::server_error(request.body.clone())
        }
        Err(e) => failure("get", &e),
    }
}

/// List the movies of a `year`, titles and years only
pub fn list_by_year(table: &MovieTable, request: &Request) -> Response {
    let movies = request
        .path_parameter(YEAR_PARAM)
        .and_then(|year| table.scan_by_year(year));

    match movies {
        Ok(movies) if movies.is_empty() => {
            let year = request.path_parameters.get(YEAR_PARAM);
            warn!(year = ?year, "Could not find movies for year");
            Response::server_error(request.body.clone())
        }
        Ok(movies) => match render_list(&movies) {
            Ok(body) => {
                info!(count = movies.len(), "Found items");
                Response::ok(body)
            }
            Err(e) => failure("list", &e),
        },
        Err(e) => failure("list", &e),
    }
}

/// Store the movie in the body, replacing any movie with the same key
pub fn create_movie(table: &MovieTable, request: &Request) -> Response {
    debug!(body = %request.body, "Received body");
    match table.insert(&request.body) {
        Ok(movie) => {
            info!(key = %movie.key(), "Wrote item");
            Response::ok(SUCCESS_BODY)
        }
        Err(e) => failure("create", &e),
    }
}

/// Overwrite plot and rating of the movie named in the body
pub fn update_movie(table: &MovieTable, request: &Request) -> Response {
    debug!(body = %request.body, "Received body");
    match table.update(&request.body) {
        Ok(Lookup::Found(movie)) => {
            info!(key = %movie.key(), "Updated item");
            Response::ok(SUCCESS_BODY)
        }
        Ok(Lookup::NotFound) => {
            warn!("Update target does not exist");
            Response::server_error(ERROR_BODY)
        }
        Err(e) => failure("update", &e),
    }
}

/// Delete the movie at `year` and `title` slug
pub fn delete_movie(table: &MovieTable, request: &Request) -> Response {
    let deleted = request.path_parameter(YEAR_PARAM).and_then(|year| {
        let title = request.title()?;
        debug!(year, title = %title, "Path vars");
        table.delete(year, &title)
    });

    match deleted {
        Ok(()) => Response::ok(SUCCESS_BODY),
        Err(e) => failure("delete", &e),
    }
}

/// Render records as a JSON array, one record per line
///
/// ```text
/// [{"year":1994,...},
/// {"year":1994,...}]
/// ```
pub fn render_list(movies: &[MovieRecord]) -> serde_json::Result<String> {
    let items = movies
        .iter()
        .map(MovieRecord::to_json)
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(format!("[{}]\n", items.join(",\n")))
}

/// The single place failures become responses
fn failure(handler: &'static str, err: &dyn std::error::Error) -> Response {
    error!(handler, error = %err, "Request failed");
    Response::server_error(ERROR_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Log output collected in memory
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines_containing(&self, needle: &str) -> usize {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes)
                .lines()
                .filter(|line| line.contains(needle))
                .count()
        }
    }

    fn test_table(temp_dir: &TempDir) -> MovieTable {
        let table = MovieTable::new(Config::for_table(temp_dir.path(), "Movies"));
        table.provision().unwrap();
        table
    }

    fn key_request(year: &str, title: &str) -> Request {
        Request::new()
            .with_path_parameter(YEAR_PARAM, year)
            .with_path_parameter(TITLE_PARAM, title)
    }

    fn create(table: &MovieTable, body: &str) {
        let response = create_movie(table, &Request::new().with_body(body));
        assert_eq!(response, Response::ok(SUCCESS_BODY));
    }

    const JAWS: &str = r#"{"year":1975,"title":"Jaws","info":{"plot":"Shark.","rating":8.0}}"#;

    #[test]
    fn test_get_found() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);
        create(
            &table,
            r#"{"year":1978,"title":"Jaws 2!","info":{"plot":"Another shark.","rating":5.8}}"#,
        );

        let response = get_movie(&table, &key_request("1978", "Jaws-2"));
        assert_eq!(response.status_code, 200);
        assert!(response.body.ends_with("}\n"));

        let movie = MovieRecord::from_json(response.body.trim_end()).unwrap();
        assert_eq!(
            movie,
            MovieRecord::new(1978, "Jaws 2").with_info("Another shark.", 5.8)
        );
    }

    #[test]
    fn test_get_plus_slug() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);
        create(&table, r#"{"year":1978,"title":"Jaws 2","info":{"plot":"","rating":5.8}}"#);

        let response = get_movie(&table, &key_request("1978", "Jaws+2"));
        assert!(response.is_success());
    }

    #[test]
    fn test_get_missing_echoes_body() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);

        let request = key_request("1975", "Jaws").with_body("original body");
        let response = get_movie(&table, &request);
        assert_eq!(response, Response::server_error("original body"));
    }

    #[test]
    fn test_get_bad_year() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);

        let response = get_movie(&table, &key_request("seventies", "Jaws"));
        assert_eq!(response, Response::server_error(ERROR_BODY));
    }

    #[test]
    fn test_get_missing_parameters() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);

        let no_title = Request::new().with_path_parameter(YEAR_PARAM, "1975");
        assert_eq!(get_movie(&table, &no_title), Response::server_error(ERROR_BODY));

        let no_year = Request::new().with_path_parameter(TITLE_PARAM, "Jaws");
        assert_eq!(get_movie(&table, &no_year), Response::server_error(ERROR_BODY));
    }

    #[test]
    fn test_store_failure_is_a_response() {
        let temp_dir = TempDir::new().unwrap();
        let unprovisioned = MovieTable::new(Config::for_table(temp_dir.path(), "Movies"));

        let error = Response::server_error(ERROR_BODY);
        assert_eq!(get_movie(&unprovisioned, &key_request("1975", "Jaws")), error);
        assert_eq!(
            list_by_year(&unprovisioned, &Request::new().with_path_parameter(YEAR_PARAM, "1975")),
            error
        );
        assert_eq!(delete_movie(&unprovisioned, &key_request("1975", "Jaws")), error);
        assert_eq!(create_movie(&unprovisioned, &Request::new().with_body(JAWS)), error);
        assert_eq!(update_movie(&unprovisioned, &Request::new().with_body(JAWS)), error);
    }

    #[test]
    fn test_failure_logged_once() {
        let temp_dir = TempDir::new().unwrap();
        let unprovisioned = MovieTable::new(Config::for_table(temp_dir.path(), "Movies"));

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        let response = tracing::subscriber::with_default(subscriber, || {
            create_movie(&unprovisioned, &Request::new().with_body(JAWS))
        });

        assert_eq!(response, Response::server_error(ERROR_BODY));
        assert_eq!(logs.lines_containing("ERROR"), 1);
        assert_eq!(logs.lines_containing("does not exist"), 1);
    }

    #[test]
    fn test_render_error_is_a_response() {
        let err = serde_json::from_str::<MovieRecord>("{").unwrap_err();
        assert_eq!(failure("get", &err), Response::server_error(ERROR_BODY));
    }

    #[test]
    fn test_list_by_year() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);
        create(&table, JAWS);
        create(
            &table,
            r#"{"year":1975,"title":"Nashville","info":{"plot":"Music.","rating":7.6}}"#,
        );
        create(&table, r#"{"year":1976,"title":"Rocky","info":{"plot":"Boxing.","rating":8.1}}"#);

        let request = Request::new().with_path_parameter(YEAR_PARAM, "1975");
        let response = list_by_year(&table, &request);
        assert_eq!(response.status_code, 200);
        assert!(response.body.starts_with('['));
        assert!(response.body.ends_with("]\n"));
        assert_eq!(response.body.matches(",\n").count(), 1);

        let movies: Vec<MovieRecord> = serde_json::from_str(&response.body).unwrap();
        assert_eq!(movies.len(), 2);
        for movie in movies {
            assert_eq!(movie.year, 1975);
            assert_eq!(movie.info.plot, "");
            assert_eq!(movie.info.rating, 0.0);
        }
    }

    #[test]
    fn test_list_empty_echoes_body() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);
        create(&table, JAWS);

        let request = Request::new()
            .with_path_parameter(YEAR_PARAM, "1994")
            .with_body("echo me");
        assert_eq!(list_by_year(&table, &request), Response::server_error("echo me"));
    }

    #[test]
    fn test_create_bad_body() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);

        let response = create_movie(&table, &Request::new().with_body("{\"year\":"));
        assert_eq!(response, Response::server_error(ERROR_BODY));
    }

    #[test]
    fn test_update_existing() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);
        create(&table, JAWS);

        let body = r#"{"year":1975,"title":"Jaws","info":{"plot":"Bigger boat.","rating":8.1}}"#;
        let response = update_movie(&table, &Request::new().with_body(body));
        assert_eq!(response, Response::ok(SUCCESS_BODY));

        let response = get_movie(&table, &key_request("1975", "Jaws"));
        let movie = MovieRecord::from_json(response.body.trim_end()).unwrap();
        assert_eq!(movie.info.plot, "Bigger boat.");
        assert_eq!(movie.info.rating, 8.1);
    }

    #[test]
    fn test_update_missing() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);

        let response = update_movie(&table, &Request::new().with_body(JAWS));
        assert_eq!(response, Response::server_error(ERROR_BODY));
        assert!(!get_movie(&table, &key_request("1975", "Jaws")).is_success());
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let table = test_table(&temp_dir);
        create(&table, JAWS);

        assert_eq!(
            delete_movie(&table, &key_request("1975", "Jaws")),
            Response::ok(SUCCESS_BODY)
        );
        assert!(!get_movie(&table, &key_request("1975", "Jaws")).is_success());

        // Again, nothing left to delete
        assert_eq!(
            delete_movie(&table, &key_request("1975", "Jaws")),
            Response::ok(SUCCESS_BODY)
        );
    }

    #[test]
    fn test_render_list() {
        let movies = vec![MovieRecord::new(1975, "Jaws"), MovieRecord::new(1975, "Nashville")];
        let body = render_list(&movies).unwrap();

        assert_eq!(
            body,
            "[{\"year\":1975,\"title\":\"Jaws\",\"info\":{\"plot\":\"\",\"rating\":0.0}},\n\
             {\"year\":1975,\"title\":\"Nashville\",\"info\":{\"plot\":\"\",\"rating\":0.0}}]\n"
        );
    }

    #[test]
    fn test_render_single_item_list() {
        let body = render_list(&[MovieRecord::new(1975, "Jaws")]).unwrap();
        assert!(!body.contains(",\n"));
        assert!(body.ends_with("}]\n"));
    }
}
