//! Программируемый агент для тестов: ответы по OID и журнал запросов.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tokio::time::Duration;

use super::auth::SnmpVersion;
use super::error::SnmpError;
use super::oid::Oid;
use super::session::{Exchange, Response, ScalarResult};

/// Что вернуть на GET конкретного OID
#[derive(Debug, Clone)]
pub enum MockReply {
    Value(String),
    NoSuchInstance,
    ErrorStatus(u32),
    SessionError(String),
}

/// Записанный запрос
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRequest {
    Get(Oid),
    GetBulk(Oid, u32),
}

struct MockInner {
    replies: BTreeMap<Oid, MockReply>,
    delays: BTreeMap<Oid, Duration>,
    bulk_pages: Vec<Response>,
    requests: Vec<MockRequest>,
}

/// Mock обмена. Клоны разделяют состояние, поэтому журнал виден из теста.
#[derive(Clone)]
pub struct MockExchange {
    version: SnmpVersion,
    inner: Arc<Mutex<MockInner>>,
}

impl MockExchange {
    pub fn new(version: SnmpVersion) -> Self {
        Self {
            version,
            inner: Arc::new(Mutex::new(MockInner {
                replies: BTreeMap::new(),
                delays: BTreeMap::new(),
                bulk_pages: Vec::new(),
                requests: Vec::new(),
            })),
        }
    }

    pub fn reply(self, oid: &str, reply: MockReply) -> Self {
        let oid = Oid::parse(oid).expect("valid mock OID");
        self.inner.lock().unwrap().replies.insert(oid, reply);
        self
    }

    pub fn value(self, oid: &str, value: impl Into<String>) -> Self {
        self.reply(oid, MockReply::Value(value.into()))
    }

    /// Ответ на GET этого OID приходит с задержкой
    pub fn delay(self, oid: &str, delay: Duration) -> Self {
        let oid = Oid::parse(oid).expect("valid mock OID");
        self.inner.lock().unwrap().delays.insert(oid, delay);
        self
    }

    /// Следующая страница GETBULK (выдаются по порядку)
    pub fn bulk_page(self, varbinds: &[(&str, &str)]) -> Self {
        let page = Response {
            error_status: 0,
            error_index: 0,
            varbinds: varbinds
                .iter()
                .map(|(oid, value)| {
                    (
                        Oid::parse(oid).expect("valid mock OID"),
                        ScalarResult::Value(value.to_string()),
                    )
                })
                .collect(),
        };
        self.inner.lock().unwrap().bulk_pages.push(page);
        self
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Все GET запросы в порядке отправки
    pub fn gets(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                MockRequest::Get(oid) => Some(oid.to_string()),
                MockRequest::GetBulk(..) => None,
            })
            .collect()
    }
}

impl Exchange for MockExchange {
    fn version(&self) -> SnmpVersion {
        self.version
    }

    async fn get(&self, oid: &Oid) -> Result<Response, SnmpError> {
        let (delay, reply) = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(MockRequest::Get(oid.clone()));
            let delay = inner.delays.get(oid).copied();
            (delay, inner.replies.get(oid).cloned())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reading = match reply {
            Some(MockReply::Value(value)) => ScalarResult::Value(value),
            Some(MockReply::NoSuchInstance) | None => ScalarResult::NoSuchInstance,
            Some(MockReply::ErrorStatus(status)) => {
                return Ok(Response {
                    error_status: status,
                    error_index: 1,
                    varbinds: vec![(oid.clone(), ScalarResult::NoSuchInstance)],
                });
            }
            Some(MockReply::SessionError(reason)) => return Err(SnmpError::Session(reason)),
        };

        Ok(Response {
            error_status: 0,
            error_index: 0,
            varbinds: vec![(oid.clone(), reading)],
        })
    }

    async fn get_bulk(&self, oid: &Oid, max_repetitions: u32) -> Result<Response, SnmpError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .requests
            .push(MockRequest::GetBulk(oid.clone(), max_repetitions));

        if inner.bulk_pages.is_empty() {
            return Ok(Response::default());
        }
        Ok(inner.bulk_pages.remove(0))
    }
}
