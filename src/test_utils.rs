use crate::clock::{Clock, DateTime, Utc};
use crate::reddit::Reddit;
use crate::reddit::service::{Params, Service, ServiceError, ServiceResult};
use hypertyper::HTTPError;
use reqwest::StatusCode;
use std::fs;
use std::sync::Mutex;

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn load_data(file: &str) -> String {
    fs::read_to_string(format!("tests/data/{file}.json")).expect("could not find test data")
}

pub fn load_output(filename: &str) -> String {
    let filename = format!("tests/output/{filename}.out");
    String::from(
        fs::read_to_string(&filename)
            .expect(&format!("could not load test data from {filename}"))
            .trim_end(),
    )
}

/// Serves canned responses from `tests/data`.
///
/// A request for `/user/test_user/saved` is answered with
/// `tests/data/user_test_user_saved.json`; query parameters are ignored
/// when choosing the file but recorded, so tests can check what was sent.
/// Missing files are answered with HTTP 404.
pub struct TestService {
    authorized: bool,
    requests: Mutex<Vec<String>>,
}

impl TestService {
    pub fn new() -> Self {
        Self {
            authorized: true,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            authorized: false,
            ..Self::new()
        }
    }

    /// Every request made so far, e.g. `GET /r/all/new?limit=20`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &str, resource: &str, params: &Params<'_>) {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let request = if query.is_empty() {
            format!("{method} {resource}")
        } else {
            format!("{method} {resource}?{query}")
        };
        self.requests.lock().unwrap().push(request);
    }

    fn respond(&self, resource: &str) -> ServiceResult<String> {
        if !self.authorized {
            return Err(ServiceError::Auth("invalid_grant".to_string()));
        }
        let filename = resource.trim_matches('/').replace('/', "_");
        fs::read_to_string(format!("tests/data/{filename}.json"))
            .map_err(|_| HTTPError::Http(StatusCode::NOT_FOUND).into())
    }
}

impl Service for TestService {
    async fn get_resource(&self, resource: &str, params: &Params<'_>) -> ServiceResult<String> {
        self.record("GET", resource, params);
        self.respond(resource)
    }

    async fn post_resource(&self, resource: &str, form: &Params<'_>) -> ServiceResult<String> {
        self.record("POST", resource, form);
        if !self.authorized {
            return Err(ServiceError::Auth("invalid_grant".to_string()));
        }
        Ok(String::from("{}"))
    }
}

pub struct FrozenClock {
    datetime: DateTime<Utc>,
}

impl FrozenClock {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        FrozenClock { datetime }
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        let datetime = DateTime::parse_from_rfc3339("2025-05-23T10:13:00-07:00")
            .expect("invalid date supplied")
            .with_timezone(&Utc);
        Self::new(datetime)
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.datetime
    }
}

impl Reddit<TestService> {
    /// Returns a client for `test_user` backed by canned responses.
    pub fn test() -> Self {
        do_logging();
        Reddit::new(TestService::new())
    }

    /// Returns a client whose every request fails authentication.
    pub fn test_unauthorized() -> Self {
        do_logging();
        Reddit::new(TestService::unauthorized())
    }
}
