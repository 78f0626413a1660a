use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

/// Canned reply for one endpoint path (without the leading slash).
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct Received {
    pub path: String,
    pub body: Value,
}

/// Plays the TOC and script services on one local port.
pub struct ServiceStub {
    pub base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ServiceStub {
    pub fn spawn(replies: HashMap<&'static str, StubReply>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start service stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().trim_start_matches('/').to_owned();
                let reply = match replies.get(path.as_str()) {
                    Some(reply) if request.method() == &tiny_http::Method::Post => reply,
                    _ => {
                        let _ = request.respond(
                            tiny_http::Response::from_string("not found").with_status_code(404),
                        );
                        continue;
                    }
                };

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid request body")
                            .with_status_code(400),
                    );
                    continue;
                }
                let Ok(parsed) = serde_json::from_str::<Value>(&body) else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid json").with_status_code(400),
                    );
                    continue;
                };
                log.lock().expect("lock received").push(Received {
                    path: path.clone(),
                    body: parsed,
                });

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(reply.body.to_string())
                    .with_status_code(reply.status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            received,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().expect("lock received").clone()
    }
}

impl Drop for ServiceStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A small course in the envelope shape the TOC service answers with.
#[allow(dead_code)]
pub fn sample_toc_response() -> Value {
    serde_json::json!({
        "toc": {
            "maintopics_with_subtopics": [
                {
                    "maintopic": {
                        "maintopic_number": 1,
                        "title": "Getting Started",
                        "duration": "2 hours",
                        "difficulty_level": "Beginner"
                    },
                    "subtopics": [
                        {
                            "subtopic_number": 1,
                            "title": "Installing Python",
                            "description": "Set up the interpreter and an editor.",
                            "duration_minutes": 30,
                            "subnodes": [{"title": "Windows"}, {"name": "macOS"}]
                        },
                        {
                            "subtopic_number": "2",
                            "title": "First Program",
                            "duration_minutes": 0
                        }
                    ]
                },
                {
                    "maintopic": {"maintopic_number": 2.0, "title": "Data Types"},
                    "subtopics": [
                        {
                            "subtopic_number": 1,
                            "title": "Numbers",
                            "duration_minutes": 45,
                            "subnodes": ["Integers"]
                        }
                    ]
                }
            ]
        },
        "course_metadata": {
            "title": "Python Programming",
            "course_hours": 10,
            "learner_path": "Intermediate",
            "regionality": "Global",
            "course_objectives": ["Master Python fundamentals"]
        },
        "cost_summary": {"total_cost_usd": 0.0421},
        "execution_time_s": 42.5
    })
}
